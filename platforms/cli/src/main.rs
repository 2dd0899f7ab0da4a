mod logging;

use chrono::Utc;
use clap::builder::PossibleValuesParser;
use clap::{ArgGroup, Args, Parser, Subcommand};
use serde_json::json;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tmsim::{
    loader, programs, to_text, Direction, Halt, MachineDefinition, Metadata, Settings, Snapshot,
    Step, TuringMachine, TuringMachineError, BUILTINS, DEFAULT_MAX_STEPS,
};

#[derive(Parser)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
struct Cli {
    #[clap(flatten)]
    settings: SettingsArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Args)]
struct SettingsArgs {
    /// The blank symbol of the tape
    #[clap(long, global = true, default_value_t = '_')]
    blank: char,

    /// Blank cells shown on each side of the tape when tracing
    #[clap(long, global = true, default_value_t = 3, allow_negative_numbers = true)]
    padding: i64,

    /// Head direction for rules without an explicit one (L or R)
    #[clap(long, global = true, default_value = "R")]
    direction: String,
}

impl SettingsArgs {
    fn build(&self) -> Result<Settings, TuringMachineError> {
        let direction: Direction = self.direction.parse()?;
        Ok(Settings::new(self.blank, self.padding, direction)?)
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run a machine on one or more inputs
    Run(RunArgs),
    /// Check that a configuration file describes a valid machine
    Validate {
        /// The configuration file
        config: PathBuf,
    },
    /// Print a configuration file in canonical form
    Show {
        /// The configuration file
        config: PathBuf,
    },
    /// Write a built-in machine to a configuration file
    Export {
        /// Name of the built-in machine (see `list`)
        #[clap(value_parser = builtin_names())]
        builtin: String,
        /// Destination file
        path: PathBuf,
        /// Creator recorded in the file header. Defaults to $USER
        #[clap(long)]
        creator: Option<String>,
    },
    /// List the built-in machines
    List,
}

#[derive(Args)]
#[clap(group(ArgGroup::new("source").required(true).args(["config", "builtin"])))]
struct RunArgs {
    /// The configuration file of the machine to run
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Run a built-in machine instead of a configuration file
    #[clap(short, long, value_parser = builtin_names())]
    builtin: Option<String>,

    /// The inputs to run, one run per input
    inputs: Vec<String>,

    /// Maximum number of steps before a run times out
    #[clap(short, long, default_value_t = DEFAULT_MAX_STEPS)]
    max_steps: usize,

    /// Pause after every step until Enter is pressed
    #[clap(short, long)]
    step: bool,

    /// Print the tape after every step
    #[clap(short = 'd', long)]
    trace: bool,

    /// Print results as JSON
    #[clap(long)]
    json: bool,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), TuringMachineError> {
    let settings = cli.settings.build()?;

    match cli.command {
        Command::Run(args) => run(&args, settings),
        Command::Validate { config } => {
            let (definition, _) = loader::load(&config, settings)?;
            println!("{}: OK", config.display());
            for warning in tmsim::warnings(&definition) {
                println!("warning: {warning}");
            }
            Ok(())
        }
        Command::Show { config } => {
            let (definition, metadata) = loader::load(&config, settings)?;
            print!("{}", to_text(&definition, metadata.as_ref()));
            Ok(())
        }
        Command::Export {
            builtin,
            path,
            creator,
        } => {
            let machine = TuringMachine::validated(builtin_definition(&builtin, settings)?)?;
            let creator = creator
                .or_else(|| std::env::var("USER").ok())
                .unwrap_or_else(|| "unknown".to_string());
            machine.save_config(&path, Some(&Metadata::new(creator, Utc::now())))?;
            println!("Wrote '{}' to {}", builtin, path.display());
            Ok(())
        }
        Command::List => {
            for builtin in BUILTINS {
                println!("{:<12} {}", builtin.name, builtin.description);
            }
            Ok(())
        }
    }
}

fn builtin_names() -> PossibleValuesParser {
    PossibleValuesParser::new(BUILTINS.map(|builtin| builtin.name))
}

fn builtin_definition(
    name: &str,
    settings: Settings,
) -> Result<MachineDefinition, TuringMachineError> {
    let mut definition = programs::by_name(name)
        .ok_or_else(|| TuringMachineError::UnknownBuiltin(name.to_string()))?;
    definition.settings = settings;
    Ok(definition)
}

fn load_machine(args: &RunArgs, settings: Settings) -> Result<TuringMachine, TuringMachineError> {
    match (&args.config, &args.builtin) {
        (Some(config), _) => {
            let mut machine = TuringMachine::new(MachineDefinition::new(settings));
            machine.load_config(config)?;
            Ok(machine)
        }
        (None, Some(name)) => TuringMachine::validated(builtin_definition(name, settings)?),
        (None, None) => Err(TuringMachineError::FileError(
            "No machine given".to_string(),
        )),
    }
}

fn run(args: &RunArgs, settings: Settings) -> Result<(), TuringMachineError> {
    let mut machine = load_machine(args, settings)?;

    for input in &args.inputs {
        let halt = if args.step {
            run_stepwise(&mut machine, input, args.max_steps)?
        } else if args.trace {
            print_header(input);
            Some(machine.run_with(input, args.max_steps, print_snapshot)?)
        } else {
            Some(machine.run(input, args.max_steps)?)
        };

        report(&machine, input, halt, args.json);
    }

    Ok(())
}

/// Runs `input` one step at a time. Returns `None` if the user stopped the run.
fn run_stepwise(
    machine: &mut TuringMachine,
    input: &str,
    max_steps: usize,
) -> Result<Option<Halt>, TuringMachineError> {
    let interactive = atty::is(atty::Stream::Stdin);
    let mut execution = machine.start(input, max_steps)?;
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    print_header(input);
    print_snapshot(&execution.snapshot());

    loop {
        match execution.step() {
            Step::Continue(snapshot) => print_snapshot(&snapshot),
            Step::Halt(halt) => return Ok(Some(halt)),
        }

        if interactive {
            print!("[Enter] next step, [q] stop: ");
            let _ = io::stdout().flush();
            match lines.next() {
                Some(Ok(line)) if line.trim() == "q" => return Ok(None),
                None => return Ok(None),
                _ => {}
            }
        }
    }
}

fn report(machine: &TuringMachine, input: &str, halt: Option<Halt>, as_json: bool) {
    let stats = machine.stats();

    if as_json {
        println!(
            "{}",
            json!({
                "input": input,
                "outcome": halt,
                "state": machine.state(),
                "stats": stats,
            })
        );
        return;
    }

    let outcome = halt.map_or_else(|| "STOPPED".to_string(), |halt| halt.to_string());
    println!(
        "{:?}: {} in state {} after {} steps (tape cells: {}, time: {:?})",
        input,
        outcome,
        machine.state(),
        stats.steps_taken,
        stats.tape_size,
        stats.last_run_duration.unwrap_or_default()
    );
}

fn print_header(input: &str) {
    println!("Input {:?}", input);
    println!("{:>6}  {:<12} tape", "step", "state");
}

fn print_snapshot(snapshot: &Snapshot) {
    let offset = (snapshot.head - snapshot.window_start).max(0) as usize;
    println!("{:>6}  {:<12} {}", snapshot.step, snapshot.state, snapshot.window);
    println!("{:>6}  {:<12} {}^", "", "", " ".repeat(offset));
}
