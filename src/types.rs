//! This module defines the core data structures and types shared across the simulator:
//! transitions, head directions, halting outcomes, execution snapshots and the error types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The default blank symbol used on the tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The default number of blank cells shown on either side of a trace snapshot.
pub const DEFAULT_PADDING: usize = 3;
/// The farthest a snapshot window reaches from the head, unless the padding is wider.
pub const MAX_WINDOW_RADIUS: usize = 40;
/// The maximum number of characters accepted as machine input.
pub const MAX_INPUT_LENGTH: usize = 10_000;
/// The default number of steps to execute before a run times out.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// The signed head offset for this direction.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    /// The single-letter form used by the configuration format.
    pub fn as_char(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Direction {
    type Err = ConstructionError;

    /// Accepts `L`, `R`, `Left` or `Right`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Direction::Left),
            "r" | "right" => Ok(Direction::Right),
            _ => Err(ConstructionError::InvalidDirection(s.to_string())),
        }
    }
}

/// The right-hand side of a transition rule.
///
/// The left-hand side `(state, symbol)` is the key under which the transition is stored
/// in [`crate::MachineDefinition::transitions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The next state the machine moves to.
    pub next_state: String,
    /// The symbol written under the head.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(next_state: impl Into<String>, write: char, direction: Direction) -> Self {
        Self {
            next_state: next_state.into(),
            write,
            direction,
        }
    }
}

/// The terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// The machine entered an accept state.
    Accepted,
    /// The machine entered a reject state or had no transition for the symbol under the head.
    Rejected,
    /// The step budget ran out before the machine halted.
    TimedOut,
}

impl Halt {
    /// Whether the run accepted its input. A timeout is not an acceptance.
    pub fn is_accepted(self) -> bool {
        matches!(self, Halt::Accepted)
    }
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Halt::Accepted => "ACCEPT",
            Halt::Rejected => "REJECT",
            Halt::TimedOut => "TIMEOUT",
        };
        f.write_str(label)
    }
}

/// A view of the run state after a step, used for traces and step mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Number of steps taken so far.
    pub step: usize,
    /// The current machine state.
    pub state: String,
    /// The head position.
    pub head: i64,
    /// The symbol under the head.
    pub symbol: char,
    /// Tape position of the first character of `window`.
    pub window_start: i64,
    /// The visible portion of the tape.
    pub window: String,
}

/// Authorship information stored as comments at the top of a configuration file.
///
/// The codec only carries it; collecting the creator and timestamp is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub creator: String,
    pub created_at: DateTime<Utc>,
}

impl Metadata {
    pub fn new(creator: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            creator: creator.into(),
            created_at,
        }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a transition and keeps running.
    Continue(Snapshot),
    /// The machine has halted.
    Halt(Halt),
}

/// Errors raised while building [`crate::Settings`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("Padding must not be negative, got {0}")]
    NegativePadding(i64),
    #[error("Invalid direction '{0}', expected L or R")]
    InvalidDirection(String),
    #[error("Symbol {0:?} cannot be used as the blank symbol")]
    ReservedBlank(char),
}

/// Errors reported by the validator. Each variant corresponds to one check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The set of states is empty")]
    EmptyStateSet,
    #[error("Start state '{0}' is not a declared state")]
    UnknownStartState(String),
    #[error("Halt state '{0}' is not a declared state")]
    UnknownHaltState(String),
    #[error("State '{0}' is both an accept and a reject state")]
    AmbiguousHaltState(String),
    #[error("Inconsistent alphabets: {0}")]
    AlphabetInconsistency(String),
    #[error("Invalid transition ({state}, {symbol}): {reason}")]
    InvalidTransition {
        state: String,
        symbol: char,
        reason: String,
    },
    #[error("Cannot be written in the configuration format: {0}")]
    UnrepresentableToken(String),
}

/// Errors reported while reading the configuration format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing '{0}' section")]
    MissingSection(String),
    #[error("Malformed '{0}' section")]
    MalformedSection(String),
    #[error("Malformed transition: {0}")]
    MalformedTransition(String),
    #[error("Line outside of any section: {0}")]
    OrphanLine(String),
    #[error("Machine validation failed: {0}")]
    Invalid(#[from] ValidationError),
}

/// Errors that prevent a run from starting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("Input is {len} symbols long, the limit is {max}")]
    InputTooLong { len: usize, max: usize },
    #[error("Input symbol {0:?} is not in the input alphabet")]
    InvalidInputSymbol(char),
    #[error("The machine definition has not been validated")]
    NotValidated,
}

/// Represents every error the simulator can surface to a caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    #[error("Construction error: {0}")]
    Construction(#[from] ConstructionError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Configuration parsing error: {0}")]
    Parse(#[from] ParseError),
    #[error("Run error: {0}")]
    Run(#[from] RunError),
    #[error("Unknown built-in machine '{0}'")]
    UnknownBuiltin(String),
    /// Indicates an error related to file system operations, such as reading or writing configuration files.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let right_json = serde_json::to_string(&Direction::Right).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(right_json, "\"Right\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_direction_from_str() {
        assert_eq!("L".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("right".parse::<Direction>(), Ok(Direction::Right));
        assert_eq!(" r ".parse::<Direction>(), Ok(Direction::Right));
        assert_eq!(
            "S".parse::<Direction>(),
            Err(ConstructionError::InvalidDirection("S".into()))
        );
    }

    #[test]
    fn test_direction_offset() {
        assert_eq!(Direction::Left.offset(), -1);
        assert_eq!(Direction::Right.offset(), 1);
    }

    #[test]
    fn test_halt_classification() {
        assert!(Halt::Accepted.is_accepted());
        assert!(!Halt::Rejected.is_accepted());
        assert!(!Halt::TimedOut.is_accepted());
        assert_eq!(Halt::TimedOut.to_string(), "TIMEOUT");
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError::InvalidTransition {
            state: "q0".into(),
            symbol: 'x',
            reason: "symbol not in tape alphabet".into(),
        };

        let error_msg = error.to_string();
        assert!(error_msg.contains("(q0, x)"));
        assert!(error_msg.contains("tape alphabet"));

        let wrapped: TuringMachineError = ParseError::from(error).into();
        assert!(wrapped.to_string().starts_with("Configuration parsing error"));
    }
}
