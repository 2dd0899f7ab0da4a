//! This crate provides the core logic for a single-tape Turing Machine simulator.
//! It includes modules for describing and validating machines, executing them on a sparse
//! unbounded tape, reading and writing the text configuration format, and a pair of
//! built-in machines.

pub mod definition;
pub mod encoder;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;
pub mod validator;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the machine definition and its construction settings.
pub use definition::{MachineDefinition, Settings};
/// Re-exports the serialization functions from the encoder module.
pub use encoder::{serialize, to_text};
/// Re-exports the execution engine and its run cursor.
pub use machine::{Execution, Stats, Status, Trace, TuringMachine};
/// Re-exports the parsing functions from the parser module.
pub use parser::{parse, parse_document, parse_with};
/// Re-exports the built-in machine generators.
pub use programs::{palindrome, zero_n_one_n, BUILTINS};
/// Re-exports the sparse tape.
pub use tape::Tape;
/// Re-exports the shared types and error enums.
pub use types::{
    ConstructionError, Direction, Halt, Metadata, ParseError, RunError, Snapshot, Step,
    Transition, TuringMachineError, ValidationError, DEFAULT_MAX_STEPS, MAX_INPUT_LENGTH,
    MAX_WINDOW_RADIUS,
};
/// Re-exports the validation entry points.
pub use validator::{validate, warnings, ValidationWarning};
