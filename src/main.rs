//! Command line front end of the NCL wavefront simulator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use nclsim::config::CircuitFile;
use nclsim::waveform::render_table;
use nclsim::{
    dual_rail_demo, Circuit, Fsm, NclResult, Pipeline, SimConfig, Signal, SimulationReport, Simulator,
};

#[derive(Parser)]
#[command(name = "nclsim", about = "NULL Convention Logic wavefront simulator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a circuit description file.
    ///
    /// Prints the final output values and the signal of every node at every step.
    Run(RunArgs),

    /// Write a circuit description file as a Graphviz DOT graph.
    Dot {
        /// Circuit description (JSON).
        circuit: PathBuf,
        /// Output path of the DOT file.
        dot_out: PathBuf,
    },

    /// Simulate the built-in two gate demo circuit.
    Demo,

    /// Feed a signal through a pipeline description file.
    Pipeline {
        /// Pipeline description (JSON).
        pipeline: PathBuf,
        /// Signal fed into the first stage.
        #[clap(long, default_value = "DATA1")]
        input: Signal,
    },

    /// Run a Moore or Mealy state machine description file on an input sequence.
    Fsm {
        /// State machine description (JSON).
        fsm: PathBuf,
        /// Comma separated input symbols.
        #[clap(long, value_delimiter = ',')]
        inputs: Vec<String>,
        /// Maximum number of symbols consumed.
        #[clap(long, default_value_t = 20)]
        steps: usize,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Circuit description (JSON).
    circuit: PathBuf,

    /// Override the simulation step from the file.
    #[clap(long)]
    step: Option<f64>,

    /// Override the simulation time bound from the file.
    #[clap(long)]
    max_time: Option<f64>,

    /// Fail on references to nodes that don't exist instead of reading them as NULL.
    #[clap(long)]
    strict: bool,

    /// Override input values, e.g. `--set A=DATA1 --set B=NULL`.
    #[clap(long = "set", value_parser = parse_assignment)]
    assignments: Vec<(String, Signal)>,

    /// Log every change of these nodes.
    #[cfg(feature = "debug_gates")]
    #[clap(long, value_delimiter = ',')]
    probe: Vec<String>,

    /// Write the full simulation report as JSON to this path.
    #[clap(long)]
    report: Option<PathBuf>,

    /// Don't print the step table.
    #[clap(long)]
    quiet: bool,
}

fn parse_assignment(s: &str) -> Result<(String, Signal), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=SIGNAL, got `{}`", s))?;
    let signal = value
        .parse::<Signal>()
        .map_err(|_| format!("`{}` is not a signal (NULL, DATA0, DATA1, QUAD)", value))?;
    Ok((name.trim().to_owned(), signal))
}

fn print_signal(sig: Signal) {
    match sig {
        Signal::Null => {
            colour::white_ln!("{:#}", sig);
        }
        Signal::Data0 => {
            colour::cyan_ln!("{:#}", sig);
        }
        Signal::Data1 => {
            colour::green_ln!("{:#}", sig);
        }
        Signal::Quad => {
            colour::magenta_ln!("{:#}", sig);
        }
    }
}

fn print_report(circuit: &Circuit, report: &SimulationReport, quiet: bool) {
    if !quiet {
        print!("{}", render_table(circuit, &report.timeline));
    }
    if report.settled {
        colour::green_ln!("Settled after {} passes", report.passes);
    } else {
        colour::yellow_ln!(
            "Did not settle, stopped after {} passes; last snapshot may be oscillating",
            report.passes
        );
    }
    for (name, sig) in &report.outputs {
        print!("{} -> ", name);
        print_signal(*sig);
    }
}

fn run(args: RunArgs) -> NclResult<()> {
    let file = CircuitFile::from_path(&args.circuit)?;
    #[allow(unused_mut)]
    let mut circuit = file.build()?;
    #[cfg(feature = "debug_gates")]
    for name in &args.probe {
        circuit.probe(name.as_str());
    }

    let mut config: SimConfig = file.simulation;
    if let Some(step) = args.step {
        config.step = step;
    }
    if let Some(max_time) = args.max_time {
        config.max_time = max_time;
    }
    config.strict |= args.strict;
    clilog::info!("Simulation config: {:?}", config);

    let report = Simulator::with_config(&circuit, config).run_with_inputs(
        args.assignments
            .iter()
            .map(|(name, sig)| (name.as_str(), *sig)),
    )?;
    print_report(&circuit, &report, args.quiet);

    if let Some(path) = &args.report {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        clilog::info!("Wrote report to {}", path.display());
    }
    Ok(())
}

fn dispatch(command: Commands) -> NclResult<()> {
    match command {
        Commands::Run(args) => run(args)?,
        Commands::Dot { circuit, dot_out } => {
            let circuit = CircuitFile::from_path(&circuit)?.build()?;
            let mut f = std::fs::File::create(&dot_out)?;
            circuit.dump_dot(&mut f)?;
            clilog::info!("Wrote {}", dot_out.display());
        }
        Commands::Demo => {
            let circuit = dual_rail_demo()?;
            let report = Simulator::new(&circuit).run()?;
            print_report(&circuit, &report, false);
        }
        Commands::Pipeline { pipeline, input } => {
            let pipeline = Pipeline::from_json(&std::fs::read_to_string(&pipeline)?)?;
            let report = pipeline.simulate(input)?;
            for stage in &report.stages {
                print!("{} -> ", stage.label);
                print_signal(stage.signal);
            }
            if report.needs_completion() {
                colour::yellow_ln!(
                    "{} NULL cycle(s): consider early-completion gates or completion signals between stages",
                    report.null_cycles
                );
            } else {
                colour::green_ln!("No NULL cycles, every stage passes DATA");
            }
        }
        Commands::Fsm { fsm, inputs, steps } => {
            let fsm = Fsm::from_json(&std::fs::read_to_string(&fsm)?)?;
            for step in fsm.simulate(&inputs, steps) {
                print!(
                    "Step {}: input={} -> state={} -> out=",
                    step.index, step.input, step.state
                );
                print_signal(step.output);
            }
        }
    }
    Ok(())
}

fn main() {
    clilog::init_stderr_color_debug();
    let cli = Cli::parse();
    if let Err(e) = dispatch(cli.command) {
        clilog::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("A=DATA1").unwrap(),
            ("A".to_string(), Signal::Data1)
        );
        assert_eq!(
            parse_assignment(" B =11(quads)").unwrap(),
            ("B".to_string(), Signal::Quad)
        );
        assert!(parse_assignment("A").unwrap_err().contains("NAME=SIGNAL"));
        assert!(parse_assignment("A=HIGH").unwrap_err().contains("`HIGH`"));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from([
            "nclsim", "run", "c.json", "--set", "A=DATA0", "--max-time", "3", "--strict",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.assignments, [("A".to_string(), Signal::Data0)]);
                assert_eq!(args.max_time, Some(3.0));
                assert!(args.strict);
                assert_eq!(args.step, None);
            }
            _ => panic!("expected the run subcommand"),
        }

        let cli = Cli::try_parse_from(["nclsim", "fsm", "m.json", "--inputs", "1,0,1"]).unwrap();
        match cli.command {
            Commands::Fsm { inputs, steps, .. } => {
                assert_eq!(inputs, ["1", "0", "1"]);
                assert_eq!(steps, 20);
            }
            _ => panic!("expected the fsm subcommand"),
        }

        assert!(Cli::try_parse_from(["nclsim", "run", "c.json", "--set", "A"]).is_err());
        assert!(Cli::try_parse_from(["nclsim", "pipeline", "p.json", "--input", "DATA2"]).is_err());
    }
}
