//! Scene conditions.

use serde::{Deserialize, Deserializer};

use super::flag::FlagValue;

/// A boolean expression over flags, written in scene data as one of:
///
/// ```json
/// { "not": C }
/// { "and": [C, ...] }
/// { "or": [C, ...] }
/// { "flag": "hp", "op": ">=", "value": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    Not {
        not: Box<Condition>,
    },
    And {
        and: Vec<Condition>,
    },
    Or {
        or: Vec<Condition>,
    },
    Compare {
        /// `None` when the key is absent; such a leaf reads an unset flag.
        #[serde(default)]
        flag: Option<String>,
        #[serde(default)]
        op: CompareOp,
        /// `None` when the key is absent; an explicit `null` is `Some(Null)`.
        #[serde(default, deserialize_with = "present")]
        value: Option<FlagValue>,
    },
}

/// Comparison operator of a leaf condition. Defaults to `==`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CompareOp {
    #[default]
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    /// Any unrecognised operator: the flag's truthiness decides.
    Truthy,
}

impl From<String> for CompareOp {
    fn from(op: String) -> Self {
        match op.as_str() {
            "==" => Self::Eq,
            "!=" => Self::Ne,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "<" => Self::Lt,
            "<=" => Self::Le,
            _ => Self::Truthy,
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<FlagValue>, D::Error>
where
    D: Deserializer<'de>,
{
    FlagValue::deserialize(deserializer).map(Some)
}
