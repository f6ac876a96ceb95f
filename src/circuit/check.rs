use super::*;
use crate::error::CircuitWarning;

impl Circuit {
    /// Looks for structural problems.
    ///
    /// None of these stop a circuit from being simulated:
    /// unknown luts are skipped, undeclared wires read as `false`,
    /// and a feedback loop simply runs until the iteration cap.
    pub fn check(&self) -> Vec<CircuitWarning> {
        let mut warnings = vec![];
        warnings.extend(self.check_unit_connections());
        warnings.extend(self.check_multiple_drivers());
        warnings.extend(self.check_feedback_loops());
        warnings
    }

    fn check_unit_connections(&self) -> Vec<CircuitWarning> {
        let mut warnings = vec![];

        for unit in self.units.values() {
            match self.lut(unit.lut_id()) {
                None => warnings.push(CircuitWarning::UnknownLut {
                    unit: unit.name().to_string(),
                    lut: self.display_name(unit.lut_id()),
                }),
                Some(lut) => {
                    if lut.input_size() != unit.input_wires().len() {
                        warnings.push(CircuitWarning::InputCount {
                            unit: unit.name().to_string(),
                            expected: lut.input_size(),
                            actual: unit.input_wires().len(),
                        });
                    }
                    if lut.output_size() != unit.output_wires().len() {
                        warnings.push(CircuitWarning::OutputCount {
                            unit: unit.name().to_string(),
                            expected: lut.output_size(),
                            actual: unit.output_wires().len(),
                        });
                    }
                },
            }

            let mut seen: BTreeSet<WireId> = BTreeSet::new();
            let undeclared: Vec<WireId> = unit
                .input_wires()
                .iter()
                .chain(unit.output_wires())
                .copied()
                .filter(|wire_id| self.wire(*wire_id).is_none() && seen.insert(*wire_id))
                .collect();

            for wire_id in undeclared {
                warnings.push(CircuitWarning::UndeclaredWire {
                    unit: unit.name().to_string(),
                    wire: self.display_name(wire_id),
                });
            }
        }

        warnings
    }

    fn check_multiple_drivers(&self) -> Vec<CircuitWarning> {
        let mut drivers: BTreeMap<WireId, BTreeSet<UnitId>> = BTreeMap::new();
        for unit in self.units.values() {
            for wire_id in unit.output_wires() {
                drivers.entry(*wire_id).or_default().insert(unit.id());
            }
        }

        drivers
            .into_iter()
            .filter(|(_wire_id, units)| units.len() > 1)
            .map(|(wire_id, units)| CircuitWarning::MultipleDrivers {
                wire: self.display_name(wire_id),
                units: units.into_iter().map(|unit_id| self.display_name(unit_id)).collect(),
            })
            .collect()
    }

    fn check_feedback_loops(&self) -> Vec<CircuitWarning> {
        use petgraph::algo::tarjan_scc;
        use petgraph::graph::{DiGraph, NodeIndex};

        let mut graph: DiGraph<UnitId, ()> = DiGraph::new();
        let mut node_by_unit: BTreeMap<UnitId, NodeIndex> = BTreeMap::new();

        for unit_id in self.units.keys() {
            node_by_unit.insert(*unit_id, graph.add_node(*unit_id));
        }

        let mut readers: BTreeMap<WireId, Vec<UnitId>> = BTreeMap::new();
        for unit in self.units.values() {
            for wire_id in unit.input_wires() {
                readers.entry(*wire_id).or_default().push(unit.id());
            }
        }

        for unit in self.units.values() {
            let node = node_by_unit[&unit.id()];
            for wire_id in unit.output_wires() {
                for reader in readers.get(wire_id).into_iter().flatten() {
                    let reader_node = node_by_unit[reader];
                    if !graph.contains_edge(node, reader_node) {
                        graph.add_edge(node, reader_node, ());
                    }
                }
            }
        }

        let mut warnings = vec![];
        for component in tarjan_scc(&graph) {
            let is_loop = match component.as_slice() {
                [node] => graph.contains_edge(*node, *node),
                _ => true,
            };

            if is_loop {
                let mut units: Vec<UnitId> = component.iter().map(|node| graph[*node]).collect();
                units.sort();
                warnings.push(CircuitWarning::FeedbackLoop {
                    units: units.into_iter().map(|unit_id| self.display_name(unit_id)).collect(),
                });
            }
        }
        warnings.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
        warnings
    }
}
