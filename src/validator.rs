//! This module validates machine definitions before execution.
//!
//! `validate` runs a fixed sequence of checks and reports the first one that fails, so the
//! error for a given definition is always the same. `warnings` reports findings that do not
//! make a definition unusable, such as states that can never be reached.

use crate::definition::{is_representable_state, is_reserved_symbol, MachineDefinition};
use crate::types::ValidationError;
use std::collections::BTreeSet;

type Check = fn(&MachineDefinition) -> Result<(), ValidationError>;

/// Checks in reporting order.
const CHECKS: [Check; 7] = [
    check_states,
    check_start_state,
    check_halt_states,
    check_ambiguous_halt_states,
    check_alphabets,
    check_transitions,
    check_representable,
];

/// Non-fatal findings about a valid definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// States that cannot be reached from the start state by any transition.
    UnreachableStates(Vec<String>),
    /// No accept state is declared, so no input can ever be accepted.
    NoAcceptState,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::UnreachableStates(states) => {
                write!(f, "Unreachable states: {}", states.join(", "))
            }
            ValidationWarning::NoAcceptState => write!(f, "No accept state is declared"),
        }
    }
}

/// Validates `def`, returning the first failing check.
///
/// # Returns
///
/// * `Ok(())` if every check passes.
/// * `Err(ValidationError)` describing the first violated rule.
pub fn validate(def: &MachineDefinition) -> Result<(), ValidationError> {
    CHECKS.iter().try_for_each(|check| check(def))
}

/// Collects non-fatal findings about `def`. Meaningful only for a valid definition.
pub fn warnings(def: &MachineDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if def.accept_states.is_empty() {
        warnings.push(ValidationWarning::NoAcceptState);
    }

    let unreachable = unreachable_states(def);
    if !unreachable.is_empty() {
        warnings.push(ValidationWarning::UnreachableStates(unreachable));
    }

    warnings
}

fn check_states(def: &MachineDefinition) -> Result<(), ValidationError> {
    if def.states.is_empty() {
        return Err(ValidationError::EmptyStateSet);
    }

    Ok(())
}

fn check_start_state(def: &MachineDefinition) -> Result<(), ValidationError> {
    if !def.states.contains(&def.start_state) {
        return Err(ValidationError::UnknownStartState(def.start_state.clone()));
    }

    Ok(())
}

fn check_halt_states(def: &MachineDefinition) -> Result<(), ValidationError> {
    def.accept_states
        .iter()
        .chain(&def.reject_states)
        .find(|state| !def.states.contains(*state))
        .map_or(Ok(()), |state| {
            Err(ValidationError::UnknownHaltState(state.clone()))
        })
}

fn check_ambiguous_halt_states(def: &MachineDefinition) -> Result<(), ValidationError> {
    def.accept_states
        .intersection(&def.reject_states)
        .next()
        .map_or(Ok(()), |state| {
            Err(ValidationError::AmbiguousHaltState(state.clone()))
        })
}

fn check_alphabets(def: &MachineDefinition) -> Result<(), ValidationError> {
    let blank = def.blank();

    if let Some(symbol) = def.input_alphabet.difference(&def.tape_alphabet).next() {
        return Err(ValidationError::AlphabetInconsistency(format!(
            "input symbol {symbol:?} is not in the tape alphabet"
        )));
    }

    if !def.tape_alphabet.contains(&blank) {
        return Err(ValidationError::AlphabetInconsistency(format!(
            "blank symbol {blank:?} is not in the tape alphabet"
        )));
    }

    if def.input_alphabet.contains(&blank) {
        return Err(ValidationError::AlphabetInconsistency(format!(
            "blank symbol {blank:?} must not be in the input alphabet"
        )));
    }

    Ok(())
}

fn check_transitions(def: &MachineDefinition) -> Result<(), ValidationError> {
    for ((state, symbol), transition) in &def.transitions {
        let reason = if !def.states.contains(state) {
            Some(format!("source state '{state}' is not declared"))
        } else if !def.tape_alphabet.contains(symbol) {
            Some(format!("read symbol {symbol:?} is not in the tape alphabet"))
        } else if !def.states.contains(&transition.next_state) {
            Some(format!(
                "next state '{}' is not declared",
                transition.next_state
            ))
        } else if !def.tape_alphabet.contains(&transition.write) {
            Some(format!(
                "write symbol {:?} is not in the tape alphabet",
                transition.write
            ))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(ValidationError::InvalidTransition {
                state: state.clone(),
                symbol: *symbol,
                reason,
            });
        }
    }

    Ok(())
}

/// Earlier checks tie every other name and symbol to `states` and the tape alphabet, so
/// only those two sets are inspected.
fn check_representable(def: &MachineDefinition) -> Result<(), ValidationError> {
    if let Some(state) = def.states.iter().find(|state| !is_representable_state(state)) {
        return Err(ValidationError::UnrepresentableToken(format!(
            "state name {state:?}"
        )));
    }

    if let Some(symbol) = def.tape_alphabet.iter().find(|symbol| is_reserved_symbol(**symbol)) {
        return Err(ValidationError::UnrepresentableToken(format!(
            "symbol {symbol:?}"
        )));
    }

    Ok(())
}

/// Depth-first traversal of the transition graph from the start state.
fn unreachable_states(def: &MachineDefinition) -> Vec<String> {
    let mut visited = BTreeSet::new();
    let mut stack = vec![def.start_state.as_str()];

    while let Some(state) = stack.pop() {
        if !visited.insert(state) {
            continue;
        }

        for ((from, _), transition) in &def.transitions {
            if from == state && !visited.contains(transition.next_state.as_str()) {
                stack.push(transition.next_state.as_str());
            }
        }
    }

    def.states
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn create_test_definition() -> MachineDefinition {
        let mut def = MachineDefinition::default()
            .with_states(["q0", "accept", "reject"])
            .with_input_alphabet(['a'])
            .with_tape_alphabet(['a', '_'])
            .with_start("q0")
            .with_accept(["accept"])
            .with_reject(["reject"]);
        def.add_transition("q0", 'a', "q0", 'a', Direction::Right);
        def.add_transition("q0", '_', "accept", '_', Direction::Left);
        def
    }

    #[test]
    fn test_valid_definition() {
        let def = create_test_definition();
        assert_eq!(validate(&def), Ok(()));
    }

    #[test]
    fn test_validate_is_deterministic() {
        let mut def = create_test_definition();
        def.start_state = "missing".into();

        let first = validate(&def);
        let second = validate(&def);
        assert_eq!(first, second);
        assert!(first.is_err());
    }

    #[test]
    fn test_empty_state_set() {
        let def = MachineDefinition::default();
        assert_eq!(validate(&def), Err(ValidationError::EmptyStateSet));
    }

    #[test]
    fn test_unknown_start_state() {
        let mut def = create_test_definition();
        def.start_state = "q9".into();

        assert_eq!(
            validate(&def),
            Err(ValidationError::UnknownStartState("q9".into()))
        );
    }

    #[test]
    fn test_unknown_halt_state() {
        let mut def = create_test_definition();
        def.reject_states.insert("nowhere".into());

        assert_eq!(
            validate(&def),
            Err(ValidationError::UnknownHaltState("nowhere".into()))
        );
    }

    #[test]
    fn test_ambiguous_halt_state() {
        let mut def = create_test_definition();
        def.reject_states.insert("accept".into());

        assert_eq!(
            validate(&def),
            Err(ValidationError::AmbiguousHaltState("accept".into()))
        );
    }

    #[test]
    fn test_input_not_subset_of_tape_alphabet() {
        let mut def = create_test_definition();
        def.input_alphabet.insert('b');

        assert!(matches!(
            validate(&def),
            Err(ValidationError::AlphabetInconsistency(msg)) if msg.contains("'b'")
        ));
    }

    #[test]
    fn test_blank_missing_from_tape_alphabet() {
        let mut def = create_test_definition();
        def.tape_alphabet.remove(&'_');
        def.transitions.clear();

        assert!(matches!(
            validate(&def),
            Err(ValidationError::AlphabetInconsistency(msg)) if msg.contains("blank")
        ));
    }

    #[test]
    fn test_blank_in_input_alphabet() {
        let mut def = create_test_definition();
        def.input_alphabet.insert('_');

        assert!(matches!(
            validate(&def),
            Err(ValidationError::AlphabetInconsistency(msg)) if msg.contains("must not")
        ));
    }

    #[test]
    fn test_transition_with_unknown_next_state() {
        let mut def = create_test_definition();
        def.add_transition("q0", 'a', "q7", 'a', Direction::Right);

        match validate(&def) {
            Err(ValidationError::InvalidTransition { state, symbol, reason }) => {
                assert_eq!(state, "q0");
                assert_eq!(symbol, 'a');
                assert!(reason.contains("q7"));
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }
    }

    #[test]
    fn test_transition_with_unknown_symbols() {
        let mut def = create_test_definition();
        def.add_transition("q0", 'z', "q0", 'a', Direction::Right);
        assert!(matches!(
            validate(&def),
            Err(ValidationError::InvalidTransition { symbol: 'z', .. })
        ));

        let mut def = create_test_definition();
        def.add_transition("q0", 'a', "q0", 'z', Direction::Right);
        assert!(matches!(
            validate(&def),
            Err(ValidationError::InvalidTransition { reason, .. }) if reason.contains("write")
        ));
    }

    #[test]
    fn test_transition_from_unknown_state() {
        let mut def = create_test_definition();
        def.add_transition("ghost", 'a', "q0", 'a', Direction::Right);

        assert!(matches!(
            validate(&def),
            Err(ValidationError::InvalidTransition { state, .. }) if state == "ghost"
        ));
    }

    #[test]
    fn test_first_failing_check_is_reported() {
        let mut def = create_test_definition();
        def.start_state = "q9".into();
        def.input_alphabet.insert('_');

        assert_eq!(
            validate(&def),
            Err(ValidationError::UnknownStartState("q9".into()))
        );
    }

    #[test]
    fn test_reserved_tape_symbols_are_rejected() {
        for reserved in ['#', ',', ' ', '\t'] {
            let mut def = create_test_definition();
            def.tape_alphabet.insert(reserved);

            assert_eq!(
                validate(&def),
                Err(ValidationError::UnrepresentableToken(format!(
                    "symbol {reserved:?}"
                )))
            );
        }
    }

    #[test]
    fn test_unrepresentable_state_names_are_rejected() {
        for name in ["Accept:", "two words", "a,b", "x->y", "#hidden", ""] {
            let mut def = create_test_definition();
            def.states.insert(name.to_string());
            def.start_state = name.to_string();

            assert!(
                matches!(
                    validate(&def),
                    Err(ValidationError::UnrepresentableToken(msg)) if msg.contains("state")
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_unusual_but_representable_tokens_are_accepted() {
        let mut def = create_test_definition();
        for name in ["q-", "a:b", "x#y", ">"] {
            def.states.insert(name.to_string());
        }
        def.tape_alphabet.extend(['-', '>', ':', 'é']);

        assert_eq!(validate(&def), Ok(()));
    }

    #[test]
    fn test_warnings_report_unreachable_states() {
        let def = create_test_definition();

        assert_eq!(
            warnings(&def),
            vec![ValidationWarning::UnreachableStates(vec!["reject".into()])]
        );
    }

    #[test]
    fn test_warnings_report_missing_accept_state() {
        let mut def = create_test_definition();
        def.accept_states.clear();

        assert!(warnings(&def).contains(&ValidationWarning::NoAcceptState));
    }
}
