use crate::ident::{IdentId, Idents};
use crate::table::Table;

use std::collections::{BTreeMap, BTreeSet};

mod check;
mod hdl;

pub type LutId = IdentId;
pub type WireId = IdentId;
pub type UnitId = IdentId;

/// A lookup table: a logic function of `input_size` bits to `output_size` bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lut {
    id: LutId,
    name: String,
    input_size: usize,
    output_size: usize,
    bits: Vec<bool>,
    table: Table,
}

impl Lut {
    /// `bits` holds the outputs for each input combination in turn:
    /// output `j` of input combination `index` is `bits[index * output_size + j]`.
    pub fn new(
        id: LutId,
        name: &str,
        input_size: usize,
        output_size: usize,
        bits: Vec<bool>,
        table: Table,
    ) -> Lut {
        Lut {
            id,
            name: name.to_string(),
            input_size,
            output_size,
            bits,
            table,
        }
    }

    pub fn id(&self) -> LutId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The number of distinct input combinations, `2^input_size`.
    pub fn input_variant_count(&self) -> Option<usize> {
        u32::try_from(self.input_size)
            .ok()
            .and_then(|input_size| 1usize.checked_shl(input_size))
    }

    /// Applies the truth table to `inputs`, where `inputs[0]` is the least significant bit.
    ///
    /// Always returns `output_size` bits.
    /// Any bit which falls outside of the truth table reads as `false`.
    pub fn lookup(&self, inputs: &[bool]) -> Vec<bool> {
        let index = inputs.iter().enumerate().try_fold(0usize, |index, (i, input)| {
            if *input {
                let bit = u32::try_from(i).ok().and_then(|i| 1usize.checked_shl(i))?;
                Some(index | bit)
            } else {
                Some(index)
            }
        });

        (0..self.output_size)
            .map(|j| {
                index
                    .and_then(|index| index.checked_mul(self.output_size))
                    .and_then(|offset| offset.checked_add(j))
                    .and_then(|pos| self.bits.get(pos).copied())
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// A single-bit signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wire {
    id: WireId,
    name: String,
    state: bool,
    table: Table,
    affects: BTreeSet<UnitId>,
}

impl Wire {
    pub fn new(id: WireId, name: &str, state: bool, table: Table) -> Wire {
        Wire {
            id,
            name: name.to_string(),
            state,
            table,
            affects: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> WireId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> bool {
        self.state
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The units which read this wire.
    pub fn affects(&self) -> &BTreeSet<UnitId> {
        &self.affects
    }

    pub(crate) fn set_state(&mut self, state: bool) {
        self.state = state;
    }

    pub(crate) fn add_affect(&mut self, unit_id: UnitId) {
        self.affects.insert(unit_id);
    }
}

/// An instance of a [`Lut`] with its inputs and outputs connected to wires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    id: UnitId,
    name: String,
    lut_id: LutId,
    input_wires: Vec<WireId>,
    output_wires: Vec<WireId>,
    table: Table,
}

impl Unit {
    pub fn new(
        id: UnitId,
        name: &str,
        lut_id: LutId,
        input_wires: Vec<WireId>,
        output_wires: Vec<WireId>,
        table: Table,
    ) -> Unit {
        Unit {
            id,
            name: name.to_string(),
            lut_id,
            input_wires,
            output_wires,
            table,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lut_id(&self) -> LutId {
        self.lut_id
    }

    pub fn input_wires(&self) -> &[WireId] {
        &self.input_wires
    }

    pub fn output_wires(&self) -> &[WireId] {
        &self.output_wires
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}

/// The structural model of a circuit, as read from HDL source.
///
/// LUTs, wires and units are each kept in a map keyed by their identifier,
/// so iterating over them is in ascending id order, which is the order the names first appeared in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    idents: Idents,
    luts: BTreeMap<LutId, Lut>,
    wires: BTreeMap<WireId, Wire>,
    units: BTreeMap<UnitId, Unit>,
}

impl Circuit {
    /// Every wire's set of affected units is completed here,
    /// including for units declared before their input wires.
    pub fn new(
        idents: Idents,
        luts: BTreeMap<LutId, Lut>,
        wires: BTreeMap<WireId, Wire>,
        units: BTreeMap<UnitId, Unit>,
    ) -> Circuit {
        let mut circuit = Circuit {
            idents,
            luts,
            wires,
            units,
        };
        circuit.link_affects();
        circuit
    }

    fn link_affects(&mut self) {
        for unit in self.units.values() {
            for wire_id in unit.input_wires() {
                if let Some(wire) = self.wires.get_mut(wire_id) {
                    wire.add_affect(unit.id());
                }
            }
        }
    }

    pub fn idents(&self) -> &Idents {
        &self.idents
    }

    /// The name behind an identifier.
    pub fn name(&self, id: IdentId) -> Option<&str> {
        self.idents.name(id)
    }

    pub fn luts(&self) -> &BTreeMap<LutId, Lut> {
        &self.luts
    }

    pub fn wires(&self) -> &BTreeMap<WireId, Wire> {
        &self.wires
    }

    pub fn units(&self) -> &BTreeMap<UnitId, Unit> {
        &self.units
    }

    pub fn lut(&self, id: LutId) -> Option<&Lut> {
        self.luts.get(&id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(&id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn lut_by_name(&self, name: &str) -> Option<&Lut> {
        self.idents.get(name).and_then(|id| self.lut(id))
    }

    pub fn wire_by_name(&self, name: &str) -> Option<&Wire> {
        self.idents.get(name).and_then(|id| self.wire(id))
    }

    pub fn unit_by_name(&self, name: &str) -> Option<&Unit> {
        self.idents.get(name).and_then(|id| self.unit(id))
    }

    pub(crate) fn wire_mut(&mut self, id: WireId) -> Option<&mut Wire> {
        self.wires.get_mut(&id)
    }

    /// The name of an identifier, or a placeholder if the id was never interned.
    fn display_name(&self, id: IdentId) -> String {
        match self.idents.name(id) {
            Some(name) => name.to_string(),
            None => format!("_{id}"),
        }
    }
}
