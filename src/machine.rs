//! This module defines the `TuringMachine` struct, which owns a machine definition and the
//! run state (tape, head, current state, step count) used to execute it.
//!
//! A run is started with [`TuringMachine::start`], which returns an [`Execution`] cursor that
//! advances one step at a time. [`TuringMachine::run`] drives the cursor to completion.

use crate::definition::MachineDefinition;
use crate::loader;
use crate::tape::Tape;
use crate::types::{
    Halt, Metadata, RunError, Snapshot, Step, TuringMachineError, DEFAULT_MAX_STEPS,
    MAX_INPUT_LENGTH, MAX_WINDOW_RADIUS,
};
use crate::validator::{validate, warnings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// The control state of the engine, as opposed to the states of the machine it runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No run in progress; entered on construction and by `reset`.
    Ready,
    /// A run has started and has not halted yet.
    Running,
    /// The last run halted with the given classification.
    Halted(Halt),
}

/// Summary statistics of the machine and its most recent run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub tape_size: usize,
    pub num_states: usize,
    pub num_transitions: usize,
    pub steps_taken: usize,
    pub last_run_duration: Option<Duration>,
}

/// The full trace of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// The configuration before the first step.
    pub initial: Snapshot,
    /// One snapshot per executed step.
    pub steps: Vec<Snapshot>,
    pub halt: Halt,
}

#[derive(Debug, Clone)]
struct RunState {
    tape: Tape,
    head: i64,
    state: String,
    steps_taken: usize,
    max_steps: usize,
}

impl RunState {
    fn new(definition: &MachineDefinition) -> Self {
        Self {
            tape: Tape::new(definition.blank()),
            head: 0,
            state: definition.start_state.clone(),
            steps_taken: 0,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Represents a single-tape Turing Machine together with its run state.
///
/// The definition must pass [`TuringMachine::validate`] before it can be run. Runs never modify
/// the definition; concurrent runs of one definition each need their own `TuringMachine`.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    definition: MachineDefinition,
    validated: bool,
    run: RunState,
    status: Status,
    started_at: Option<Instant>,
    last_run_duration: Option<Duration>,
}

impl TuringMachine {
    /// Creates an unvalidated machine from `definition`.
    pub fn new(definition: MachineDefinition) -> Self {
        Self {
            run: RunState::new(&definition),
            definition,
            validated: false,
            status: Status::Ready,
            started_at: None,
            last_run_duration: None,
        }
    }

    /// Creates a machine and validates its definition.
    pub fn validated(definition: MachineDefinition) -> Result<Self, TuringMachineError> {
        let mut machine = Self::new(definition);
        machine.validate()?;
        Ok(machine)
    }

    /// Validates the definition, logging any non-fatal warnings.
    ///
    /// A failed validation leaves the machine unable to run.
    pub fn validate(&mut self) -> Result<(), TuringMachineError> {
        self.validated = false;
        validate(&self.definition)?;

        for warning in warnings(&self.definition) {
            warn!(%warning, "Machine definition warning");
        }

        self.validated = true;
        self.reset();
        Ok(())
    }

    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn definition(&self) -> &MachineDefinition {
        &self.definition
    }

    /// Gives mutable access to the definition. The machine must be validated again afterwards.
    pub fn definition_mut(&mut self) -> &mut MachineDefinition {
        self.validated = false;
        &mut self.definition
    }

    /// Prepares a run of `input` and returns a cursor that executes it step by step.
    ///
    /// # Returns
    ///
    /// * `Err(RunError::NotValidated)` if the definition has not passed validation.
    /// * `Err(RunError::InputTooLong)` if `input` exceeds [`MAX_INPUT_LENGTH`] symbols.
    /// * `Err(RunError::InvalidInputSymbol)` if `input` holds a symbol outside the input alphabet.
    ///
    /// On error the run state is left untouched.
    pub fn start(&mut self, input: &str, max_steps: usize) -> Result<Execution<'_>, RunError> {
        if !self.validated {
            return Err(RunError::NotValidated);
        }

        let len = input.chars().count();
        if len > MAX_INPUT_LENGTH {
            return Err(RunError::InputTooLong {
                len,
                max: MAX_INPUT_LENGTH,
            });
        }

        if let Some(symbol) = input
            .chars()
            .find(|symbol| !self.definition.input_alphabet.contains(symbol))
        {
            return Err(RunError::InvalidInputSymbol(symbol));
        }

        self.reset();
        self.run.tape.load(input);
        self.run.max_steps = max_steps;
        self.status = Status::Running;
        self.started_at = Some(Instant::now());

        debug!(input_len = len, max_steps, start = %self.run.state, "Run started");

        Ok(Execution { machine: self })
    }

    /// Runs `input` until the machine halts or `max_steps` steps have been taken.
    pub fn run(&mut self, input: &str, max_steps: usize) -> Result<Halt, RunError> {
        Ok(self.start(input, max_steps)?.finish())
    }

    /// Like [`TuringMachine::run`], calling `on_step` with a snapshot after every step.
    pub fn run_with<F>(
        &mut self,
        input: &str,
        max_steps: usize,
        mut on_step: F,
    ) -> Result<Halt, RunError>
    where
        F: FnMut(&Snapshot),
    {
        let mut execution = self.start(input, max_steps)?;
        loop {
            match execution.step() {
                Step::Continue(snapshot) => on_step(&snapshot),
                Step::Halt(halt) => return Ok(halt),
            }
        }
    }

    /// Runs `input` and collects every snapshot.
    pub fn trace(&mut self, input: &str, max_steps: usize) -> Result<Trace, RunError> {
        let mut execution = self.start(input, max_steps)?;
        let initial = execution.snapshot();
        let steps: Vec<Snapshot> = execution.by_ref().collect();
        let halt = execution.finish();

        Ok(Trace {
            initial,
            steps,
            halt,
        })
    }

    /// Restores the initial run state: empty tape, head at 0, start state, zero steps.
    pub fn reset(&mut self) {
        self.run = RunState::new(&self.definition);
        self.status = Status::Ready;
        self.started_at = None;
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Returns the current machine state.
    pub fn state(&self) -> &str {
        &self.run.state
    }

    pub fn head(&self) -> i64 {
        self.run.head
    }

    pub fn steps_taken(&self) -> usize {
        self.run.steps_taken
    }

    pub fn tape(&self) -> &Tape {
        &self.run.tape
    }

    /// Wall-clock duration of the most recently completed run.
    pub fn last_run_duration(&self) -> Option<Duration> {
        self.last_run_duration
    }

    pub fn stats(&self) -> Stats {
        Stats {
            tape_size: self.run.tape.occupied_size(),
            num_states: self.definition.states.len(),
            num_transitions: self.definition.transitions.len(),
            steps_taken: self.run.steps_taken,
            last_run_duration: self.last_run_duration,
        }
    }

    /// Captures the current run state. The tape window covers every non-blank cell and the
    /// head, widened by the configured padding, and is cut off [`MAX_WINDOW_RADIUS`] cells
    /// (or the padding, if larger) either side of the head.
    pub fn snapshot(&self) -> Snapshot {
        let padding = self.definition.settings.padding() as i64;
        let radius = padding.max(MAX_WINDOW_RADIUS as i64);
        let head = self.run.head;
        let (left, right) = match self.run.tape.bounds() {
            Some((first, last)) => (first.min(head), last.max(head)),
            None => (head, head),
        };
        let window_start = (left - padding).max(head - radius);
        let window_end = (right + padding).min(head + radius);

        Snapshot {
            step: self.run.steps_taken,
            state: self.run.state.clone(),
            head,
            symbol: self.run.tape.read(head),
            window_start,
            window: self.run.tape.window(window_start, window_end),
        }
    }

    /// Writes the definition to `path` in the configuration format.
    pub fn save_config(
        &self,
        path: &Path,
        metadata: Option<&Metadata>,
    ) -> Result<(), TuringMachineError> {
        loader::save(path, &self.definition, metadata)
    }

    /// Replaces the definition with the one stored at `path`, keeping the current settings.
    ///
    /// The loaded definition is validated and the run state reset. Returns the file's
    /// metadata, if any.
    pub fn load_config(&mut self, path: &Path) -> Result<Option<Metadata>, TuringMachineError> {
        let (definition, metadata) = loader::load(path, self.definition.settings)?;
        self.definition = definition;
        self.validate()?;
        Ok(metadata)
    }

    /// Executes one step. Returns the halt classification once the machine has halted.
    fn advance(&mut self) -> Option<Halt> {
        if let Status::Halted(halt) = self.status {
            return Some(halt);
        }

        let definition = &self.definition;
        let run = &mut self.run;

        let halt = if definition.is_accept(&run.state) {
            Some(Halt::Accepted)
        } else if definition.is_reject(&run.state) {
            Some(Halt::Rejected)
        } else if run.steps_taken >= run.max_steps {
            Some(Halt::TimedOut)
        } else {
            let symbol = run.tape.read(run.head);
            match definition.transition(&run.state, symbol) {
                Some(transition) => {
                    trace!(
                        step = run.steps_taken,
                        state = %run.state,
                        head = run.head,
                        %symbol,
                        "Transition"
                    );
                    run.tape.write(run.head, transition.write);
                    run.state.clone_from(&transition.next_state);
                    run.head += transition.direction.offset();
                    run.steps_taken += 1;
                    None
                }
                // No transition defined: a normal rejection.
                None => Some(Halt::Rejected),
            }
        };

        if let Some(halt) = halt {
            self.halt(halt);
        }

        halt
    }

    fn halt(&mut self, halt: Halt) {
        self.status = Status::Halted(halt);
        self.last_run_duration = self.started_at.map(|started| started.elapsed());

        debug!(
            outcome = %halt,
            steps = self.run.steps_taken,
            state = %self.run.state,
            "Run halted"
        );
    }
}

/// A run in progress, advanced one step at a time.
///
/// The cursor borrows its machine for the duration of the run. Dropping it before the machine
/// halts leaves the machine in [`Status::Running`].
pub struct Execution<'a> {
    machine: &'a mut TuringMachine,
}

impl Execution<'_> {
    /// Executes one step.
    ///
    /// # Returns
    ///
    /// * `Step::Continue(snapshot)` after a transition was applied.
    /// * `Step::Halt(halt)` once the machine has halted; repeated calls return the same value.
    pub fn step(&mut self) -> Step {
        match self.machine.advance() {
            Some(halt) => Step::Halt(halt),
            None => Step::Continue(self.machine.snapshot()),
        }
    }

    /// Runs the remaining steps and returns the halt classification.
    pub fn finish(mut self) -> Halt {
        loop {
            if let Some(halt) = self.machine.advance() {
                return halt;
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.machine.snapshot()
    }

    /// The halt classification, if the machine has halted.
    pub fn halt(&self) -> Option<Halt> {
        match self.machine.status {
            Status::Halted(halt) => Some(halt),
            _ => None,
        }
    }

    pub fn machine(&self) -> &TuringMachine {
        &*self.machine
    }
}

impl Iterator for Execution<'_> {
    type Item = Snapshot;

    fn next(&mut self) -> Option<Snapshot> {
        match self.step() {
            Step::Continue(snapshot) => Some(snapshot),
            Step::Halt(_) => None,
        }
    }
}
