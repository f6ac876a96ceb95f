use lutsim::{load_circuit_from_file, Sim, DEFAULT_MAX_ITERATIONS};

mod repl;
use repl::*;

use anyhow::Context;
use clap::Parser;
use log::*;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    filename: String,

    /// Run the commands in this file instead of starting the REPL.
    #[arg(long)]
    tb: Option<String>,

    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Print the circuit back out as HDL after the initial stabilization and exit.
    #[arg(long, default_value_t = false)]
    dump: bool,

    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.debug)?;

    let circuit = load_circuit_from_file(&args.filename)?;
    info!(
        "Loaded {}: {} luts, {} wires, {} units",
        args.filename,
        circuit.luts().len(),
        circuit.wires().len(),
        circuit.units().len(),
    );

    let warnings = circuit.check();
    for warning in &warnings {
        warn!("{warning}");
    }
    if !warnings.is_empty() {
        warn!("Circuit has {} warnings.", warnings.len());
    }

    let sim = Sim::new_with_max_iterations(circuit, args.max_iterations);
    if args.dump {
        print!("{}", sim.circuit());
        return Ok(());
    }

    let mut repl = Repl::new(sim, args.max_iterations);
    if let Some(tb_filename) = args.tb {
        info!("Using command file: {tb_filename}");
        let text = std::fs::read_to_string(&tb_filename)
            .with_context(|| format!("Couldn't read {tb_filename}"))?;
        repl.run_script(&text)
    } else {
        repl.run()
    }
}

fn init_logging(debug: bool) -> anyhow::Result<()> {
    use chrono::{DateTime, Utc};

    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let now: DateTime<Utc> = Utc::now();
            out.finish(format_args!(
                "[{} {} {}] {}",
                now.format("%Y-%m-%dT%H:%M:%S%.fZ"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    let level = std::env::var("LEVEL").unwrap_or_default();

    if level == "TRACE" {
        dispatch = dispatch.level(log::LevelFilter::Trace);
    } else if debug || level == "DEBUG" {
        dispatch = dispatch.level(log::LevelFilter::Debug);
    } else {
        dispatch = dispatch.level(log::LevelFilter::Info);
    }

    dispatch.apply()?;
    Ok(())
}
