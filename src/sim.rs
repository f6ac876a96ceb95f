use crate::circuit::{Circuit, UnitId, Wire, WireId};

use log::*;
use std::collections::BTreeSet;


/// How many rounds [`Sim::new`] lets a circuit take to settle.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Change-driven simulator for a [`Circuit`].
///
/// Mutating a wire only marks it as changed.
/// Nothing propagates until [`Sim::advance`] or [`Sim::stabilize`] is called.
///
/// Every operation which changes state takes `&mut self`.
/// To drive one simulator from several threads, hold a lock across each
/// whole sequence of mutations and the `stabilize` that follows them.
pub struct Sim {
    circuit: Circuit,
    changed_wires: BTreeSet<WireId>,
}

impl Sim {
    /// Wraps the circuit and stabilizes it with [`DEFAULT_MAX_ITERATIONS`].
    pub fn new(circuit: Circuit) -> Sim {
        Sim::new_with_max_iterations(circuit, DEFAULT_MAX_ITERATIONS)
    }

    pub fn new_with_max_iterations(circuit: Circuit, max_iterations: usize) -> Sim {
        let mut sim = Sim {
            circuit,
            changed_wires: BTreeSet::new(),
        };
        sim.stabilize(max_iterations);
        sim
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn into_circuit(self) -> Circuit {
        self.circuit
    }

    pub fn wire_state(&self, wire_id: WireId) -> Option<bool> {
        self.circuit.wire(wire_id).map(Wire::state)
    }

    pub fn wire_by_name(&self, name: &str) -> Option<&Wire> {
        self.circuit.wire_by_name(name)
    }

    /// Wires which changed since the last round and whose readers haven't been re-evaluated yet.
    pub fn changed_wires(&self) -> &BTreeSet<WireId> {
        &self.changed_wires
    }

    /// True when the last [`Sim::stabilize`] reached a fixed point
    /// rather than running out of iterations, and no wire has been changed since.
    pub fn is_stable(&self) -> bool {
        self.changed_wires.is_empty()
    }

    /// Does nothing if there is no such wire or it already has this state.
    pub fn set_wire_state(&mut self, wire_id: WireId, state: bool) {
        if let Some(wire) = self.circuit.wire_mut(wire_id) {
            if wire.state() != state {
                wire.set_state(state);
                self.changed_wires.insert(wire_id);
            }
        }
    }

    pub fn toggle_wire(&mut self, wire_id: WireId) {
        if let Some(state) = self.wire_state(wire_id) {
            self.set_wire_state(wire_id, !state);
        }
    }

    /// One round of propagation.
    ///
    /// Every unit reading a changed wire is evaluated once.
    /// Outputs which change are updated right away and marked for the next round.
    pub fn advance(&mut self) {
        let changed_wires = std::mem::take(&mut self.changed_wires);

        let mut affected_units: BTreeSet<UnitId> = BTreeSet::new();
        for wire_id in &changed_wires {
            if let Some(wire) = self.circuit.wire(*wire_id) {
                affected_units.extend(wire.affects().iter().copied());
            }
        }

        trace!("Advancing: {} changed wires affect {} units", changed_wires.len(), affected_units.len());
        for unit_id in affected_units {
            self.eval_unit(unit_id);
        }
    }

    fn eval_unit(&mut self, unit_id: UnitId) {
        let Some(unit) = self.circuit.unit(unit_id) else {
            return;
        };
        let Some(lut) = self.circuit.lut(unit.lut_id()) else {
            trace!("Skipping unit {}: no such lut", unit.name());
            return;
        };

        let inputs: Vec<bool> = unit
            .input_wires()
            .iter()
            .map(|wire_id| self.wire_state(*wire_id).unwrap_or(false))
            .collect();
        let outputs = lut.lookup(&inputs);
        trace!("Unit {}: {inputs:?} => {outputs:?}", unit.name());

        let updates: Vec<(WireId, bool)> = unit.output_wires().iter().copied().zip(outputs).collect();
        for (wire_id, state) in updates {
            self.set_wire_state(wire_id, state);
        }
    }

    /// Propagates until no wire changes, or `max_iterations` rounds have run.
    /// Returns the number of rounds.
    ///
    /// Every input wire of every unit is first marked as changed, so each call
    /// re-evaluates the whole circuit, even one which was already stable.
    /// This also picks up units whose input wires were declared after them.
    ///
    /// A circuit with a feedback loop may never settle.
    /// It is then left in whatever state the last round produced,
    /// and [`Sim::is_stable`] returns false.
    pub fn stabilize(&mut self, max_iterations: usize) -> usize {
        let links: Vec<(WireId, UnitId)> = self
            .circuit
            .units()
            .values()
            .flat_map(|unit| unit.input_wires().iter().map(move |wire_id| (*wire_id, unit.id())))
            .collect();

        for (wire_id, unit_id) in links {
            if let Some(wire) = self.circuit.wire_mut(wire_id) {
                wire.add_affect(unit_id);
                self.changed_wires.insert(wire_id);
            }
        }

        let mut iterations = 0;
        while !self.changed_wires.is_empty() && iterations < max_iterations {
            self.advance();
            iterations += 1;
        }

        if self.is_stable() {
            debug!("Stabilized after {iterations} rounds");
        } else {
            warn!(
                "Circuit did not stabilize within {max_iterations} rounds ({} wires still changing)",
                self.changed_wires.len(),
            );
        }
        iterations
    }
}

impl std::fmt::Debug for Sim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        for wire in self.circuit.wires().values() {
            let changed = if self.changed_wires.contains(&wire.id()) { "*" } else { " " };
            writeln!(f, "    {}{}   {}", if wire.state() { 1 } else { 0 }, changed, wire.name())?;
        }
        Ok(())
    }
}
