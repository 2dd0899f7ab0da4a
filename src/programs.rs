//! Built-in machine definitions.
//!
//! Both machines are plain [`MachineDefinition`]s; the engine has no special handling for them.

use crate::definition::MachineDefinition;
use crate::types::Direction::{Left, Right};

/// A named generator for a built-in machine.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn() -> MachineDefinition,
}

/// All built-in machines, in listing order.
pub const BUILTINS: [Builtin; 2] = [
    Builtin {
        name: "0n1n",
        description: "Accepts 0^n 1^n over {0,1} by marking pairs with X and Y",
        build: zero_n_one_n,
    },
    Builtin {
        name: "palindrome",
        description: "Accepts palindromes over {a,b} by erasing and matching both ends",
        build: palindrome,
    },
];

/// Looks up a built-in machine by name.
pub fn by_name(name: &str) -> Option<MachineDefinition> {
    BUILTINS
        .iter()
        .find(|builtin| builtin.name == name)
        .map(|builtin| (builtin.build)())
}

/// Builds a machine for `{0ⁿ1ⁿ | n ≥ 0}`.
///
/// Each pass replaces the leftmost `0` with `X`, sweeps right to the first `1` and replaces it
/// with `Y`, then sweeps back to the `X`. Once no `0` is left, only `Y`s may remain.
pub fn zero_n_one_n() -> MachineDefinition {
    let mut def = MachineDefinition::default()
        .with_states(["q0", "q1", "q2", "q3", "accept", "reject"])
        .with_input_alphabet(['0', '1'])
        .with_tape_alphabet(['0', '1', 'X', 'Y', '_'])
        .with_start("q0")
        .with_accept(["accept"])
        .with_reject(["reject"]);

    // Mark the next 0, or check that only Ys are left.
    def.add_transition("q0", '0', "q1", 'X', Right);
    def.add_transition("q0", 'Y', "q3", 'Y', Right);
    def.add_transition("q0", '_', "accept", '_', Right);
    def.add_transition("q0", '1', "reject", '1', Right);

    // Find the matching 1.
    def.add_transition("q1", '0', "q1", '0', Right);
    def.add_transition("q1", 'Y', "q1", 'Y', Right);
    def.add_transition("q1", '1', "q2", 'Y', Left);
    def.add_transition("q1", '_', "reject", '_', Right);

    // Return to the last X.
    def.add_transition("q2", '0', "q2", '0', Left);
    def.add_transition("q2", 'Y', "q2", 'Y', Left);
    def.add_transition("q2", 'X', "q0", 'X', Right);

    def.add_transition("q3", 'Y', "q3", 'Y', Right);
    def.add_transition("q3", '_', "accept", '_', Right);
    def.add_transition("q3", '0', "reject", '0', Right);
    def.add_transition("q3", '1', "reject", '1', Right);

    def
}

/// Builds a machine accepting palindromes over `{a, b}`.
///
/// The leftmost symbol is erased and remembered in the state, the head runs to the right
/// end and compares it with the rightmost symbol, which is erased on a match.
pub fn palindrome() -> MachineDefinition {
    let mut def = MachineDefinition::default()
        .with_states([
            "q0", "carry_a", "carry_b", "match_a", "match_b", "back", "accept", "reject",
        ])
        .with_input_alphabet(['a', 'b'])
        .with_tape_alphabet(['a', 'b', '_'])
        .with_start("q0")
        .with_accept(["accept"])
        .with_reject(["reject"]);

    def.add_transition("q0", '_', "accept", '_', Right);

    for (symbol, carry, matcher, other) in [
        ('a', "carry_a", "match_a", 'b'),
        ('b', "carry_b", "match_b", 'a'),
    ] {
        def.add_transition("q0", symbol, carry, '_', Right);

        for seen in ['a', 'b'] {
            def.add_transition(carry, seen, carry, seen, Right);
        }
        def.add_transition(carry, '_', matcher, '_', Left);

        def.add_transition(matcher, symbol, "back", '_', Left);
        // The carried symbol was the middle one.
        def.add_transition(matcher, '_', "accept", '_', Right);
        def.add_transition(matcher, other, "reject", other, Right);
    }

    for seen in ['a', 'b'] {
        def.add_transition("back", seen, "back", seen, Left);
    }
    def.add_transition("back", '_', "q0", '_', Right);

    def
}
