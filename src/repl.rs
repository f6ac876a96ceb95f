use lutsim::{Sim, WireId};

use anyhow::{anyhow, bail};
use log::*;
use std::str::FromStr;

const HELP: &str = "\
show                 list every wire, * marks wires whose change hasn't propagated yet
wire <name>          print the state of a wire
toggle <name>        flip a wire
set <name> <0|1>     set a wire
step                 run a single round of propagation
stabilize [n]        propagate until stable, for at most n rounds
check                report structural warnings
dump                 print the circuit as HDL
quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Wire(String),
    Toggle(String),
    Set(String, bool),
    Step,
    Stabilize(Option<usize>),
    Check,
    Dump,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Command, Self::Err> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let command = match words.as_slice() {
            ["show"] => Command::Show,
            ["wire", name] => Command::Wire(name.to_string()),
            ["toggle", name] => Command::Toggle(name.to_string()),
            ["set", name, "0"] => Command::Set(name.to_string(), false),
            ["set", name, "1"] => Command::Set(name.to_string(), true),
            ["set", _name, value] => bail!("Wire state must be 0 or 1: {value}"),
            ["step"] => Command::Step,
            ["stabilize"] => Command::Stabilize(None),
            ["stabilize", n] => {
                let n = n.parse().map_err(|_| anyhow!("Not a number of rounds: {n}"))?;
                Command::Stabilize(Some(n))
            },
            ["check"] => Command::Check,
            ["dump"] => Command::Dump,
            ["help"] => Command::Help,
            ["quit"] | ["exit"] => Command::Quit,
            _ => bail!("Unknown command: {line} (try help)"),
        };
        Ok(command)
    }
}

/// Drives a [`Sim`] from commands, typed interactively or read from a file.
///
/// No command stabilizes implicitly.
pub struct Repl {
    sim: Sim,
    max_iterations: usize,
}

impl Repl {
    pub fn new(sim: Sim, max_iterations: usize) -> Repl {
        Repl {
            sim,
            max_iterations,
        }
    }

    #[allow(dead_code)]
    pub fn sim(&self) -> &Sim {
        &self.sim
    }

    pub fn run(&mut self) -> anyhow::Result<()> {
        let mut readline = rustyline::DefaultEditor::new()?;

        loop {
            match readline.readline("lutsim> ") {
                Ok(line) => {
                    readline.add_history_entry(line.as_str())?;
                    match self.exec_line(&line) {
                        Ok(true) => (),
                        Ok(false) => break,
                        Err(err) => eprintln!("{err}"),
                    }
                },
                Err(rustyline::error::ReadlineError::Eof) => break,
                Err(rustyline::error::ReadlineError::Interrupted) => (),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Runs one command per line, stopping at the first which fails.
    pub fn run_script(&mut self, text: &str) -> anyhow::Result<()> {
        for (i, line) in text.lines().enumerate() {
            match self.exec_line(line) {
                Ok(true) => (),
                Ok(false) => break,
                Err(err) => bail!("Line {}: {err}", i + 1),
            }
        }
        Ok(())
    }

    // Returns false once the session should end.
    fn exec_line(&mut self, line: &str) -> anyhow::Result<bool> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(true);
        }

        let command: Command = line.parse()?;
        debug!("{command:?}");
        self.exec(command)
    }

    fn exec(&mut self, command: Command) -> anyhow::Result<bool> {
        match command {
            Command::Show => print!("{:?}", self.sim),
            Command::Wire(name) => {
                let wire_id = self.wire_id(&name)?;
                let state = self.sim.wire_state(wire_id).unwrap_or(false);
                println!("{name} = {}", if state { 1 } else { 0 });
            },
            Command::Toggle(name) => {
                let wire_id = self.wire_id(&name)?;
                self.sim.toggle_wire(wire_id);
            },
            Command::Set(name, state) => {
                let wire_id = self.wire_id(&name)?;
                self.sim.set_wire_state(wire_id, state);
            },
            Command::Step => {
                self.sim.advance();
                println!("{} wires changed", self.sim.changed_wires().len());
            },
            Command::Stabilize(max_iterations) => {
                let rounds = self.sim.stabilize(max_iterations.unwrap_or(self.max_iterations));
                if self.sim.is_stable() {
                    println!("Stable after {rounds} rounds");
                } else {
                    println!("Not stable after {rounds} rounds");
                }
            },
            Command::Check => {
                let warnings = self.sim.circuit().check();
                for warning in &warnings {
                    println!("{warning}");
                }
                println!("{} warnings", warnings.len());
            },
            Command::Dump => print!("{}", self.sim.circuit()),
            Command::Help => println!("{HELP}"),
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn wire_id(&self, name: &str) -> anyhow::Result<WireId> {
        match self.sim.wire_by_name(name) {
            Some(wire) => Ok(wire.id()),
            None => bail!("No such wire: {name}"),
        }
    }
}
