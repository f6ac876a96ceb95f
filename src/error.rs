use crate::lex::TokenKind;
use crate::loc::{HasLoc, LineCol};

/// Why a source failed to parse.
/// Parsing stops at the first error; no partial circuit is produced.
///
/// Every variant records where the offending token starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedToken {
        expected: Vec<TokenKind>,
        actual: TokenKind,
        line: usize,
        column: usize,
    },
    /// A table entry's value is not a number, a point or a path.
    UnexpectedTableValue { line: usize, column: usize },
    MissingNumber { line: usize, column: usize },
    /// A size, coordinate or table number doesn't fit in 64 bits.
    NumberTooLarge { line: usize, column: usize },
    /// The truth table of `lut<input_size, output_size>` would exceed [`crate::parse::MAX_LUT_BITS`].
    LutTooLarge { input_size: u64, output_size: u64, line: usize, column: usize },
    /// A truth table given one literal per output has the wrong number of literals.
    LutLiteralCount { expected: usize, actual: usize, line: usize, column: usize },
}

impl ParseError {
    pub fn line(&self) -> usize {
        self.loc().line()
    }
}

impl HasLoc for ParseError {
    fn loc(&self) -> LineCol {
        let (line, column) = match self {
            ParseError::UnexpectedToken { line, column, .. } => (line, column),
            ParseError::UnexpectedTableValue { line, column } => (line, column),
            ParseError::MissingNumber { line, column } => (line, column),
            ParseError::NumberTooLarge { line, column } => (line, column),
            ParseError::LutTooLarge { line, column, .. } => (line, column),
            ParseError::LutLiteralCount { line, column, .. } => (line, column),
        };
        LineCol::new(*line, *column)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}: ", self.loc())?;
        match self {
            ParseError::UnexpectedToken { expected, actual, .. } => {
                let expected = match expected.as_slice() {
                    [kind] => kind.to_string(),
                    kinds => {
                        let kinds: Vec<String> = kinds.iter().map(|kind| kind.to_string()).collect();
                        format!("one of {}", kinds.join(", "))
                    },
                };
                write!(f, "Expected {expected}, found {actual}")
            },
            ParseError::UnexpectedTableValue { .. } => write!(f, "Unexpected table value: expected a number, a point or a path"),
            ParseError::MissingNumber { .. } => write!(f, "Expected a number"),
            ParseError::NumberTooLarge { .. } => write!(f, "Number is too large"),
            ParseError::LutTooLarge { input_size, output_size, .. } => write!(f, "Truth table of lut<{input_size}, {output_size}> is too large"),
            ParseError::LutLiteralCount { expected, actual, .. } => write!(f, "Expected 1 or {expected} truth table literals, found {actual}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Something suspicious about a circuit which the simulator will nonetheless tolerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CircuitWarning {
    UnknownLut { unit: String, lut: String },
    UndeclaredWire { unit: String, wire: String },
    InputCount { unit: String, expected: usize, actual: usize },
    OutputCount { unit: String, expected: usize, actual: usize },
    MultipleDrivers { wire: String, units: Vec<String> },
    FeedbackLoop { units: Vec<String> },
}

impl std::fmt::Display for CircuitWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CircuitWarning::UnknownLut { unit, lut } => write!(f, "Unit {unit} uses an unknown lut: {lut}"),
            CircuitWarning::UndeclaredWire { unit, wire } => write!(f, "Unit {unit} is connected to an undeclared wire: {wire}"),
            CircuitWarning::InputCount { unit, expected, actual } => write!(f, "Unit {unit} has {actual} inputs but its lut takes {expected}"),
            CircuitWarning::OutputCount { unit, expected, actual } => write!(f, "Unit {unit} has {actual} outputs but its lut produces {expected}"),
            CircuitWarning::MultipleDrivers { wire, units } => write!(f, "Wire {wire} is driven by multiple units: {}", units.join(", ")),
            CircuitWarning::FeedbackLoop { units } => write!(f, "Units form a feedback loop and may not stabilize: {}", units.join(", ")),
        }
    }
}
