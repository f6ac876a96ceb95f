use crate::circuit::{Circuit, Lut, LutId, Unit, UnitId, Wire, WireId};
use crate::error::ParseError;
use crate::ident::{IdentId, Idents};
use crate::lex::{Lexer, Token, TokenKind};
use crate::loc::LineCol;
use crate::table::{Path, Point, Table, TableValue};

use anyhow::Context;
use log::*;
use std::collections::BTreeMap;
use std::num::IntErrorKind;

/// The largest truth table a `lut` declaration may ask for, in bits.
pub const MAX_LUT_BITS: usize = 1 << 24;

const DECLARATION: &[TokenKind] = &[TokenKind::Lut, TokenKind::Wire, TokenKind::Unit];
const POINT: &[TokenKind] = &[TokenKind::LParen, TokenKind::Ident];

pub fn load_circuit_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Circuit> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Couldn't read {}", path.display()))?;
    let circuit = parse_circuit(&text)
        .with_context(|| format!("Couldn't parse {}", path.display()))?;
    Ok(circuit)
}

/// Tokenizes and parses HDL source.
///
/// The identifier table starts out with the well-known table keys
/// (see [`Idents::with_well_known_keys`]).
pub fn parse_circuit(text: &str) -> Result<Circuit, ParseError> {
    let mut idents = Idents::with_well_known_keys();
    let tokens: Vec<Token> = Lexer::new(text, &mut idents).tokenize().collect();
    Parser::new(tokens, idents).parse()
}

/// Recursive-descent parser over a fully tokenized source.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    idents: Idents,

    luts: BTreeMap<LutId, Lut>,
    wires: BTreeMap<WireId, Wire>,
    units: BTreeMap<UnitId, Unit>,
}

impl Parser {
    /// `idents` should be the table the tokens were lexed with.
    pub fn new(mut tokens: Vec<Token>, idents: Idents) -> Parser {
        if tokens.last().map(|token| token.kind()) != Some(TokenKind::Eof) {
            let loc = tokens
                .last()
                .map(|token| LineCol::new(token.line(), token.column()))
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, "", loc));
        }

        Parser {
            tokens,
            pos: 0,
            idents,
            luts: BTreeMap::new(),
            wires: BTreeMap::new(),
            units: BTreeMap::new(),
        }
    }

    pub fn parse(mut self) -> Result<Circuit, ParseError> {
        loop {
            match self.peek().kind() {
                TokenKind::Lut => self.parse_lut()?,
                TokenKind::Wire => self.parse_wire()?,
                TokenKind::Unit => self.parse_unit()?,
                TokenKind::Eof => break,
                _ => return Err(self.unexpected(DECLARATION)),
            }
        }

        debug!(
            "Parsed {} luts, {} wires, {} units",
            self.luts.len(),
            self.wires.len(),
            self.units.len(),
        );
        Ok(Circuit::new(self.idents, self.luts, self.wires, self.units))
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind() == kind
    }

    // Never moves past the final Eof.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[kind]))
        }
    }

    fn expect_ident(&mut self) -> Result<(IdentId, Token), ParseError> {
        let token = self.expect(TokenKind::Ident)?;
        let id = self.idents.intern(token.text());
        Ok((id, token))
    }

    fn unexpected(&self, expected: &[TokenKind]) -> ParseError {
        let token = self.peek();
        ParseError::UnexpectedToken {
            expected: expected.to_vec(),
            actual: token.kind(),
            line: token.line(),
            column: token.column(),
        }
    }

    /// After an item in a list, expect one of `separators` or the `end` of the list.
    /// A separator right before the end is allowed.
    fn list_separator(&mut self, separators: &[TokenKind], end: TokenKind) -> Result<Option<TokenKind>, ParseError> {
        let kind = self.peek().kind();
        if kind == end {
            Ok(None)
        } else if separators.contains(&kind) {
            self.advance();
            Ok(Some(kind))
        } else {
            let mut expected = separators.to_vec();
            expected.push(end);
            Err(self.unexpected(&expected))
        }
    }

    fn parse_number(&mut self) -> Result<u64, ParseError> {
        let token = self.peek().clone();
        let (line, column) = (token.line(), token.column());
        let radix = match token.kind() {
            TokenKind::NumDec => 10,
            TokenKind::NumBin => 2,
            TokenKind::NumHex => 16,
            _ => return Err(ParseError::MissingNumber { line, column }),
        };

        let value = u64::from_str_radix(token.text(), radix).map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => ParseError::NumberTooLarge { line, column },
            _ => ParseError::MissingNumber { line, column },
        })?;
        self.advance();
        Ok(value)
    }

    /// The numeric literal under the cursor, unevaluated.
    fn parse_literal(&mut self) -> Result<Token, ParseError> {
        let token = self.peek().clone();
        if !token.kind().is_number() || token.text().is_empty() {
            return Err(missing_number(&token));
        }
        self.advance();
        Ok(token)
    }

    /// The body of a `lut`: either a single literal holding the whole truth table,
    /// or one literal per output, each holding that output's bit for every input combination.
    /// Either way the result is laid out as described on [`Lut::new`].
    fn parse_lut_bits(&mut self, input_size: u64, output_size: u64) -> Result<Vec<bool>, ParseError> {
        let (line, column) = (self.peek().line(), self.peek().column());

        let (variants, outputs) = u32::try_from(input_size)
            .ok()
            .and_then(|input_size| 1usize.checked_shl(input_size))
            .zip(usize::try_from(output_size).ok())
            .filter(|(variants, outputs)| {
                variants.checked_mul(*outputs).map_or(false, |len| len <= MAX_LUT_BITS)
            })
            .ok_or(ParseError::LutTooLarge { input_size, output_size, line, column })?;
        let len = variants * outputs;

        let mut literals = vec![self.parse_literal()?];
        while self.list_separator(&[TokenKind::Comma], TokenKind::RParen)?.is_some() {
            if self.check(TokenKind::RParen) {
                break;
            }
            literals.push(self.parse_literal()?);
        }

        match literals.as_slice() {
            [literal] => literal_bits(literal, len),
            _ if literals.len() == outputs => {
                let mut bits = vec![false; len];
                for (j, literal) in literals.iter().enumerate() {
                    for (i, bit) in literal_bits(literal, variants)?.into_iter().enumerate() {
                        bits[i * outputs + j] = bit;
                    }
                }
                Ok(bits)
            },
            _ => Err(ParseError::LutLiteralCount {
                expected: outputs,
                actual: literals.len(),
                line,
                column,
            }),
        }
    }

    fn parse_point(&mut self) -> Result<Point, ParseError> {
        match self.peek().kind() {
            TokenKind::LParen => {
                self.advance();
                let x = self.parse_number()?;
                self.expect(TokenKind::Comma)?;
                let y = self.parse_number()?;
                self.expect(TokenKind::RParen)?;
                Ok(Point::Numeric { x, y })
            },
            TokenKind::Ident => {
                let (id, _token) = self.expect_ident()?;
                Ok(Point::Reference(id))
            },
            _ => Err(self.unexpected(POINT)),
        }
    }

    fn parse_path(&mut self) -> Result<Path, ParseError> {
        self.expect(TokenKind::LBracket)?;

        let mut segments = vec![];
        let mut segment = vec![];

        while !self.check(TokenKind::RBracket) {
            segment.push(self.parse_point()?);

            let separators = [TokenKind::Comma, TokenKind::Semicolon];
            if let Some(TokenKind::Semicolon) = self.list_separator(&separators, TokenKind::RBracket)? {
                segments.push(std::mem::take(&mut segment));
            }
        }

        if !segment.is_empty() {
            segments.push(segment);
        }

        self.expect(TokenKind::RBracket)?;
        Ok(Path::new(segments))
    }

    fn parse_table(&mut self) -> Result<Table, ParseError> {
        self.expect(TokenKind::LBrace)?;

        let mut table = Table::new();
        while !self.check(TokenKind::RBrace) {
            let (key, _token) = self.expect_ident()?;
            self.expect(TokenKind::Colon)?;

            let (line, column) = (self.peek().line(), self.peek().column());
            let value = match self.peek().kind() {
                TokenKind::LBracket => TableValue::Path(self.parse_path()?),
                TokenKind::LParen => TableValue::Point(self.parse_point()?),
                kind if kind.is_number() => TableValue::Number(self.parse_number()?),
                _ => return Err(ParseError::UnexpectedTableValue { line, column }),
            };
            table.insert(key, value);

            self.list_separator(&[TokenKind::Comma], TokenKind::RBrace)?;
        }

        self.expect(TokenKind::RBrace)?;
        Ok(table)
    }

    fn parse_wire_list(&mut self) -> Result<Vec<WireId>, ParseError> {
        self.expect(TokenKind::LParen)?;

        let mut wire_ids = vec![];
        while !self.check(TokenKind::RParen) {
            let (wire_id, _token) = self.expect_ident()?;
            wire_ids.push(wire_id);
            self.list_separator(&[TokenKind::Comma], TokenKind::RParen)?;
        }

        self.expect(TokenKind::RParen)?;
        Ok(wire_ids)
    }

    // lut<IN, OUT> name = (bits) { table };
    fn parse_lut(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Lut)?;
        self.expect(TokenKind::LAngle)?;
        let input_size = self.parse_number()?;
        self.expect(TokenKind::Comma)?;
        let output_size = self.parse_number()?;
        self.expect(TokenKind::RAngle)?;

        let (id, name) = self.expect_ident()?;
        self.expect(TokenKind::Equals)?;
        self.expect(TokenKind::LParen)?;
        let bits = self.parse_lut_bits(input_size, output_size)?;
        self.expect(TokenKind::RParen)?;

        let table = self.parse_table()?;
        self.expect(TokenKind::Semicolon)?;

        debug!("lut<{input_size}, {output_size}> {}", name.text());
        // Both sizes were bounded by parse_lut_bits.
        let lut = Lut::new(id, name.text(), input_size as usize, output_size as usize, bits, table);
        self.luts.insert(id, lut);
        Ok(())
    }

    // wire name = state { table };
    fn parse_wire(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Wire)?;
        let (id, name) = self.expect_ident()?;
        self.expect(TokenKind::Equals)?;
        // Any non-zero digit makes the wire high, however wide the literal.
        let state = self.parse_literal()?.text().chars().any(|ch| ch != '0');

        let table = self.parse_table()?;
        self.expect(TokenKind::Semicolon)?;

        debug!("wire {} = {}", name.text(), state);
        self.wires.insert(id, Wire::new(id, name.text(), state, table));
        Ok(())
    }

    // unit<lut> name = (inputs) -> (outputs) { table };
    fn parse_unit(&mut self) -> Result<(), ParseError> {
        self.expect(TokenKind::Unit)?;
        self.expect(TokenKind::LAngle)?;
        let (lut_id, _lut_name) = self.expect_ident()?;
        self.expect(TokenKind::RAngle)?;

        let (id, name) = self.expect_ident()?;
        self.expect(TokenKind::Equals)?;

        let input_wires = self.parse_wire_list()?;
        self.expect(TokenKind::Arrow)?;
        let output_wires = self.parse_wire_list()?;

        let table = self.parse_table()?;
        self.expect(TokenKind::Semicolon)?;

        for wire_id in &input_wires {
            if let Some(wire) = self.wires.get_mut(wire_id) {
                wire.add_affect(id);
            }
        }

        debug!("unit {} with {} inputs, {} outputs", name.text(), input_wires.len(), output_wires.len());
        self.units.insert(id, Unit::new(id, name.text(), lut_id, input_wires, output_wires, table));
        Ok(())
    }
}

fn missing_number(token: &Token) -> ParseError {
    ParseError::MissingNumber {
        line: token.line(),
        column: token.column(),
    }
}

/// Expands a numeric literal into exactly `width` bits, least significant first.
/// Digits beyond `width` are dropped and missing high bits are zero.
fn literal_bits(token: &Token, width: usize) -> Result<Vec<bool>, ParseError> {
    let mut bits: Vec<bool> = Vec::with_capacity(width);
    match token.kind() {
        TokenKind::NumBin | TokenKind::NumHex => {
            let (radix, bits_per_digit) = if token.kind() == TokenKind::NumBin { (2, 1) } else { (16, 4) };
            for ch in token.text().chars().rev() {
                if bits.len() >= width {
                    break;
                }
                let digit = ch.to_digit(radix).ok_or_else(|| missing_number(token))?;
                for b in 0..bits_per_digit {
                    if bits.len() < width {
                        bits.push((digit >> b) & 1 == 1);
                    }
                }
            }
        },
        TokenKind::NumDec => {
            // Long division by two over the decimal digits, one remainder bit per pass.
            let mut digits: Vec<u32> = token
                .text()
                .chars()
                .map(|ch| ch.to_digit(10))
                .collect::<Option<_>>()
                .ok_or_else(|| missing_number(token))?;

            while bits.len() < width && digits.iter().any(|digit| *digit != 0) {
                let mut remainder = 0;
                for digit in digits.iter_mut() {
                    let value = remainder * 10 + *digit;
                    *digit = value / 2;
                    remainder = value % 2;
                }
                bits.push(remainder == 1);
            }
        },
        _ => return Err(missing_number(token)),
    }
    bits.resize(width, false);
    Ok(bits)
}
