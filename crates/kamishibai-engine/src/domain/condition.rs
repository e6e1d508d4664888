//! Condition evaluation against the flag store.

use kamishibai_scenario::domain::condition::{CompareOp, Condition};
use kamishibai_scenario::domain::flag::{loose_eq, to_number, truthy};

use super::flags::FlagStore;

/// Whether a scene with this condition should play. An absent condition
/// always passes.
#[must_use]
pub fn evaluate(condition: Option<&Condition>, flags: &FlagStore) -> bool {
    condition.is_none_or(|c| holds(c, flags))
}

fn holds(condition: &Condition, flags: &FlagStore) -> bool {
    match condition {
        Condition::Not { not } => !holds(not, flags),
        Condition::And { and } => and.iter().all(|c| holds(c, flags)),
        Condition::Or { or } => or.iter().any(|c| holds(c, flags)),
        Condition::Compare { flag, op, value } => {
            let actual = flag.as_deref().and_then(|name| flags.get(name));
            let expected = value.as_ref();
            match op {
                CompareOp::Eq => loose_eq(actual, expected),
                CompareOp::Ne => !loose_eq(actual, expected),
                CompareOp::Gt => to_number(actual) > to_number(expected),
                CompareOp::Ge => to_number(actual) >= to_number(expected),
                CompareOp::Lt => to_number(actual) < to_number(expected),
                CompareOp::Le => to_number(actual) <= to_number(expected),
                CompareOp::Truthy => truthy(actual),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use kamishibai_scenario::domain::flag::FlagValue;

    use super::*;

    fn cond(raw: &str) -> Condition {
        serde_json::from_str(raw).unwrap()
    }

    fn flags(raw: &str) -> FlagStore {
        let updates: BTreeMap<String, FlagValue> = serde_json::from_str(raw).unwrap();
        let mut store = FlagStore::new();
        store.apply(&updates);
        store
    }

    #[test]
    fn test_absent_condition_passes() {
        assert!(evaluate(None, &FlagStore::new()));
    }

    #[test]
    fn test_unset_flag_equals_absent_value() {
        assert!(evaluate(Some(&cond(r#"{"flag":"x"}"#)), &FlagStore::new()));
    }

    #[test]
    fn test_unset_flag_equals_explicit_null() {
        assert!(evaluate(
            Some(&cond(r#"{"flag":"x","value":null}"#)),
            &FlagStore::new()
        ));
    }

    #[test]
    fn test_set_flag_does_not_equal_absent_value() {
        assert!(!evaluate(Some(&cond(r#"{"flag":"x"}"#)), &flags(r#"{"x":0}"#)));
    }

    #[test]
    fn test_number_and_numeric_string_compare_loosely() {
        assert!(evaluate(
            Some(&cond(r#"{"flag":"x","value":"2"}"#)),
            &flags(r#"{"x":2}"#)
        ));
    }

    #[test]
    fn test_ordering_on_unset_flag_is_false() {
        let store = FlagStore::new();

        assert!(!evaluate(Some(&cond(r#"{"flag":"hp","op":">","value":0}"#)), &store));
        assert!(!evaluate(Some(&cond(r#"{"flag":"hp","op":"<=","value":0}"#)), &store));
    }

    #[test]
    fn test_ordering_operators() {
        let store = flags(r#"{"hp":3}"#);

        assert!(evaluate(Some(&cond(r#"{"flag":"hp","op":">=","value":3}"#)), &store));
        assert!(evaluate(Some(&cond(r#"{"flag":"hp","op":"<","value":"4"}"#)), &store));
        assert!(!evaluate(Some(&cond(r#"{"flag":"hp","op":">","value":3}"#)), &store));
        assert!(evaluate(Some(&cond(r#"{"flag":"hp","op":"!=","value":4}"#)), &store));
    }

    #[test]
    fn test_unknown_operator_uses_truthiness() {
        let op = r#"{"flag":"met","op":"exists"}"#;

        assert!(evaluate(Some(&cond(op)), &flags(r#"{"met":"yes"}"#)));
        assert!(!evaluate(Some(&cond(op)), &flags(r#"{"met":""}"#)));
        assert!(!evaluate(Some(&cond(op)), &FlagStore::new()));
    }

    #[test]
    fn test_combinators() {
        let store = flags(r#"{"a":true,"b":false}"#);

        assert!(evaluate(
            Some(&cond(r#"{"and":[{"flag":"a","value":true},{"not":{"flag":"b","value":true}}]}"#)),
            &store
        ));
        assert!(evaluate(
            Some(&cond(r#"{"or":[{"flag":"b","value":true},{"flag":"a","value":true}]}"#)),
            &store
        ));
    }

    #[test]
    fn test_leaf_without_flag_reads_unset_flag() {
        let store = flags(r#"{"hp":3}"#);

        assert!(!evaluate(Some(&cond(r#"{"op":">=","value":1}"#)), &store));
        assert!(evaluate(Some(&cond(r#"{"value":null}"#)), &store));
    }

    #[test]
    fn test_empty_combinators() {
        let store = FlagStore::new();

        assert!(evaluate(Some(&cond(r#"{"and":[]}"#)), &store));
        assert!(!evaluate(Some(&cond(r#"{"or":[]}"#)), &store));
    }
}
