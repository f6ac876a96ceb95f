//! A small LUT-based hardware description language.
//!
//! Source text declares lookup tables (`lut`), single-bit signals (`wire`)
//! and instances of lookup tables connected to wires (`unit`).
//! [`parse_circuit`] turns it into a [`Circuit`], and [`Sim`] propagates wire changes
//! through the units until the circuit settles.

pub mod loc;
pub mod ident;
pub mod lex;
pub mod table;
pub mod error;
pub mod circuit;
pub mod parse;
pub mod sim;

#[cfg(test)]
mod tests;

pub use loc::{HasLoc, LineCol};
pub use ident::{IdentId, Idents, INPUT_KEY, OUTPUT_KEY, PATH_KEY, POS_KEY, SHAPE_KEY};
pub use lex::{Lexer, Token, TokenKind};
pub use table::{Path, Point, Table, TableValue};
pub use error::{CircuitWarning, ParseError};
pub use circuit::{Circuit, Lut, LutId, Unit, UnitId, Wire, WireId};
pub use parse::{load_circuit_from_file, parse_circuit, Parser, MAX_LUT_BITS};
pub use sim::{Sim, DEFAULT_MAX_ITERATIONS};
