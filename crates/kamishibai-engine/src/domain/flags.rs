//! Session flag store.

use std::collections::BTreeMap;

use kamishibai_scenario::domain::flag::{FlagValue, to_number};
use serde::Serialize;
use serde_json::{Map, Value};

/// Largest magnitude at which every integer is exactly representable.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Name → value map mutated by scene `set` blocks.
///
/// Lives for the duration of a session; there is no reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FlagStore(BTreeMap<String, FlagValue>);

impl FlagStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Applies a `set` block. A number is added to the current numeric value
    /// of the flag (unset or non-numeric counts as 0); any other value
    /// replaces the flag.
    pub fn apply(&mut self, updates: &BTreeMap<String, FlagValue>) {
        for (name, value) in updates {
            let next = match value {
                FlagValue::Number(delta) => {
                    let base = to_number(self.0.get(name));
                    let base = if base.is_nan() { 0.0 } else { base };
                    FlagValue::Number(base + delta)
                }
                other => other.clone(),
            };
            self.0.insert(name.clone(), next);
        }
    }

    /// Compact JSON rendering for diagnostics. Integral numbers print
    /// without a fraction and non-finite numbers as `null`.
    #[must_use]
    pub fn to_json(&self) -> String {
        let map: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, value)| (name.clone(), json_value(value)))
            .collect();
        Value::Object(map).to_string()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn json_value(value: &FlagValue) -> Value {
    match value {
        FlagValue::Null => Value::Null,
        FlagValue::Bool(b) => Value::Bool(*b),
        FlagValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
            Value::from(*n as i64)
        }
        FlagValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
        FlagValue::Text(s) => Value::String(s.clone()),
    }
}
