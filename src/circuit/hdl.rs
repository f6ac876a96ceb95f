use super::*;
use crate::table::{Path, Point, TableValue};

use std::fmt::{self, Display, Formatter};

/// Writes the circuit back out as HDL source, with every wire at its current state.
impl Display for Circuit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for lut in self.luts.values() {
            write!(f, "lut<{}, {}> {} = (0b", lut.input_size(), lut.output_size(), lut.name())?;
            self.fmt_bits(f, lut.bits())?;
            write!(f, ")")?;
            self.fmt_table(f, lut.table())?;
            writeln!(f, ";")?;
        }

        if !self.luts.is_empty() && !self.wires.is_empty() {
            writeln!(f)?;
        }

        for wire in self.wires.values() {
            write!(f, "wire {} = {}", wire.name(), if wire.state() { 1 } else { 0 })?;
            self.fmt_table(f, wire.table())?;
            writeln!(f, ";")?;
        }

        if !self.wires.is_empty() && !self.units.is_empty() {
            writeln!(f)?;
        }

        for unit in self.units.values() {
            write!(f, "unit<{}> {} = (", self.display_name(unit.lut_id()), unit.name())?;
            self.fmt_wire_list(f, unit.input_wires())?;
            write!(f, ") -> (")?;
            self.fmt_wire_list(f, unit.output_wires())?;
            write!(f, ")")?;
            self.fmt_table(f, unit.table())?;
            writeln!(f, ";")?;
        }

        Ok(())
    }
}

impl Circuit {
    // Most significant bit first, without leading zeros.
    fn fmt_bits(&self, f: &mut Formatter<'_>, bits: &[bool]) -> fmt::Result {
        let Some(highest) = bits.iter().rposition(|bit| *bit) else {
            return write!(f, "0");
        };

        for bit in bits[..=highest].iter().rev() {
            write!(f, "{}", if *bit { 1 } else { 0 })?;
        }
        Ok(())
    }

    fn fmt_wire_list(&self, f: &mut Formatter<'_>, wire_ids: &[WireId]) -> fmt::Result {
        let names: Vec<String> = wire_ids.iter().map(|wire_id| self.display_name(*wire_id)).collect();
        write!(f, "{}", names.join(", "))
    }

    fn fmt_table(&self, f: &mut Formatter<'_>, table: &Table) -> fmt::Result {
        if table.is_empty() {
            return write!(f, " {{}}");
        }

        write!(f, " {{ ")?;
        for (i, (key, value)) in table.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: ", self.display_name(key))?;
            match value {
                TableValue::Number(n) => write!(f, "{n}")?,
                TableValue::Point(point) => self.fmt_point(f, point)?,
                TableValue::Path(path) => self.fmt_path(f, path)?,
            }
        }
        write!(f, " }}")
    }

    fn fmt_point(&self, f: &mut Formatter<'_>, point: &Point) -> fmt::Result {
        match point {
            Point::Numeric { x, y } => write!(f, "({x}, {y})"),
            Point::Reference(id) => write!(f, "{}", self.display_name(*id)),
        }
    }

    fn fmt_path(&self, f: &mut Formatter<'_>, path: &Path) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in path.segments().iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            for (j, point) in segment.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                self.fmt_point(f, point)?;
            }
        }
        write!(f, "]")
    }
}
