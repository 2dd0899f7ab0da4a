//! This module defines `MachineDefinition`, the static description of a single-tape Turing
//! Machine, together with the `Settings` it is constructed from.

use crate::types::{
    ConstructionError, Direction, Transition, DEFAULT_BLANK_SYMBOL, DEFAULT_PADDING,
};
use std::collections::{BTreeMap, BTreeSet};

/// Construction arguments shared by every definition: the blank symbol, the number of blank
/// cells shown around the tape in snapshots, and the direction used by [`MachineDefinition::add_rule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    blank: char,
    padding: usize,
    default_direction: Direction,
}

impl Settings {
    /// Builds settings from caller-supplied values.
    ///
    /// # Returns
    ///
    /// * `Err(ConstructionError::ReservedBlank)` if the blank is whitespace, `,` or `#`,
    ///   which the configuration format cannot represent.
    /// * `Err(ConstructionError::NegativePadding)` if `padding` is negative.
    pub fn new(
        blank: char,
        padding: i64,
        default_direction: Direction,
    ) -> Result<Self, ConstructionError> {
        if is_reserved_symbol(blank) {
            return Err(ConstructionError::ReservedBlank(blank));
        }

        let padding =
            usize::try_from(padding).map_err(|_| ConstructionError::NegativePadding(padding))?;

        Ok(Self {
            blank,
            padding,
            default_direction,
        })
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn default_direction(&self) -> Direction {
        self.default_direction
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            blank: DEFAULT_BLANK_SYMBOL,
            padding: DEFAULT_PADDING,
            default_direction: Direction::Right,
        }
    }
}

/// Whether `symbol` collides with the configuration format's separators or comments.
pub fn is_reserved_symbol(symbol: char) -> bool {
    symbol.is_whitespace() || symbol == ',' || symbol == '#'
}

/// Whether `state` can be written to and read back from the configuration format.
///
/// A state name is a non-empty token with no whitespace, `,` or `->`. It may not start with
/// `#` (a comment) or end with `:` (a section header).
pub fn is_representable_state(state: &str) -> bool {
    !state.is_empty()
        && !state.contains(|c: char| c.is_whitespace() || c == ',')
        && !state.contains("->")
        && !state.starts_with('#')
        && !state.ends_with(':')
}

/// The static description of a deterministic single-tape Turing Machine.
///
/// Collections are ordered so validation, serialization and error reporting are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MachineDefinition {
    pub settings: Settings,
    pub states: BTreeSet<String>,
    pub input_alphabet: BTreeSet<char>,
    pub tape_alphabet: BTreeSet<char>,
    /// Partial transition function keyed by `(state, symbol read)`.
    pub transitions: BTreeMap<(String, char), Transition>,
    pub start_state: String,
    pub accept_states: BTreeSet<String>,
    pub reject_states: BTreeSet<String>,
}

impl MachineDefinition {
    /// Creates an empty definition using `settings`.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn blank(&self) -> char {
        self.settings.blank()
    }

    pub fn with_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn with_input_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.input_alphabet.extend(symbols);
        self
    }

    pub fn with_tape_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.tape_alphabet.extend(symbols);
        self
    }

    pub fn with_start(mut self, state: impl Into<String>) -> Self {
        self.start_state = state.into();
        self
    }

    pub fn with_accept<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept_states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn with_reject<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reject_states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds `(state, read) -> (next_state, write, direction)`, returning the transition it
    /// replaced, if any.
    pub fn add_transition(
        &mut self,
        state: impl Into<String>,
        read: char,
        next_state: impl Into<String>,
        write: char,
        direction: Direction,
    ) -> Option<Transition> {
        self.transitions.insert(
            (state.into(), read),
            Transition::new(next_state, write, direction),
        )
    }

    /// Like [`MachineDefinition::add_transition`], moving in the configured default direction.
    pub fn add_rule(
        &mut self,
        state: impl Into<String>,
        read: char,
        next_state: impl Into<String>,
        write: char,
    ) -> Option<Transition> {
        let direction = self.settings.default_direction();
        self.add_transition(state, read, next_state, write, direction)
    }

    /// Looks up the transition for `state` reading `symbol`.
    pub fn transition(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.transitions.get(&(state.to_string(), symbol))
    }

    pub fn is_accept(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    pub fn is_reject(&self, state: &str) -> bool {
        self.reject_states.contains(state)
    }
}
