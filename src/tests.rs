use super::*;

const INVERTER: &str = "
    lut<1, 1> inv = (0b01) {};
    wire a = 0 {};
    wire b = 0 {};
    unit<inv> u = (a) -> (b) {};
";

fn id(circuit: &Circuit, name: &str) -> IdentId {
    circuit.idents().get(name).unwrap()
}

fn unexpected_token(text: &str) -> (Vec<TokenKind>, TokenKind, usize, usize) {
    match parse_circuit(text) {
        Err(ParseError::UnexpectedToken { expected, actual, line, column }) => (expected, actual, line, column),
        result => panic!("Expected an unexpected token error for {text:?}, got {result:?}"),
    }
}

#[test]
fn identifiers_are_numbered_in_order() {
    let circuit = parse_circuit(INVERTER).unwrap();
    assert_eq!(id(&circuit, "inv"), 5);
    assert_eq!(id(&circuit, "a"), 6);
    assert_eq!(id(&circuit, "b"), 7);
    assert_eq!(id(&circuit, "u"), 8);
    assert_eq!(circuit.idents().len(), 9);
    assert_eq!(circuit.name(8), Some("u"));
    assert_eq!(circuit.name(9), None);

    assert_eq!(parse_circuit(INVERTER).unwrap(), circuit);
}

#[test]
fn well_known_keys() {
    let circuit = parse_circuit("wire a = 0 { _pos: (1, 2), _input: 3 };").unwrap();
    assert_eq!(id(&circuit, "_shape"), SHAPE_KEY);
    assert_eq!(id(&circuit, "_input"), INPUT_KEY);
    assert_eq!(id(&circuit, "_output"), OUTPUT_KEY);
    assert_eq!(id(&circuit, "_path"), PATH_KEY);
    assert_eq!(id(&circuit, "_pos"), POS_KEY);
    assert_eq!(id(&circuit, "a"), 5);

    let wire = circuit.wire_by_name("a").unwrap();
    assert_eq!(wire.table().point(POS_KEY), Some(&Point::Numeric { x: 1, y: 2 }));
    assert_eq!(wire.table().number(INPUT_KEY), Some(3));
    assert_eq!(wire.table().len(), 2);
}

#[test]
fn declarations() {
    let circuit = parse_circuit(INVERTER).unwrap();
    assert_eq!(circuit.luts().len(), 1);
    assert_eq!(circuit.wires().len(), 2);
    assert_eq!(circuit.units().len(), 1);

    let lut = circuit.lut_by_name("inv").unwrap();
    assert_eq!(lut.input_size(), 1);
    assert_eq!(lut.output_size(), 1);
    assert_eq!(lut.bits(), &[true, false]);
    assert!(lut.table().is_empty());

    let unit = circuit.unit_by_name("u").unwrap();
    assert_eq!(unit.lut_id(), id(&circuit, "inv"));
    assert_eq!(unit.input_wires(), &[id(&circuit, "a")]);
    assert_eq!(unit.output_wires(), &[id(&circuit, "b")]);

    let a = circuit.wire_by_name("a").unwrap();
    assert_eq!(a.state(), false);
    assert!(a.affects().contains(&unit.id()));
    assert!(circuit.wire_by_name("b").unwrap().affects().is_empty());
}

#[test]
fn wire_states() {
    let circuit = parse_circuit("
        wire a = 0 {};
        wire b = 1 {};
        wire c = 0x10 {};
        wire d = 0b0 {};
        wire e = 18446744073709551616 {};
        wire f = 000 {};
        wire g = 0x00 {};
        wire h = 100000000000000000000000000000000000000000000 {};
    ").unwrap();
    let states: Vec<bool> = circuit.wires().values().map(|wire| wire.state()).collect();
    assert_eq!(states, vec![false, true, true, false, true, false, false, true]);
}

#[test]
fn lut_bits() {
    let circuit = parse_circuit("
        lut<2, 1> and2 = (0b1000) {};
        lut<1, 1> short = (1) {};
        lut<1, 1> long = (0b111) {};
        lut<2, 1> dec = (6) {};
        lut<1, 2> hex = (0xc) {};
        lut<1, 1> dec_long = (6) {};
        lut<2, 1> dec_zeros = (007) {};
    ").unwrap();

    assert_eq!(circuit.lut_by_name("and2").unwrap().bits(), &[false, false, false, true]);
    assert_eq!(circuit.lut_by_name("short").unwrap().bits(), &[true, false]);
    assert_eq!(circuit.lut_by_name("long").unwrap().bits(), &[true, true]);
    assert_eq!(circuit.lut_by_name("dec").unwrap().bits(), &[false, true, true, false]);
    assert_eq!(circuit.lut_by_name("hex").unwrap().bits(), &[false, false, true, true]);
    assert_eq!(circuit.lut_by_name("dec_long").unwrap().bits(), &[false, true]);
    assert_eq!(circuit.lut_by_name("dec_zeros").unwrap().bits(), &[true, true, true, false]);
}

#[test]
fn lut_bits_per_output() {
    let circuit = parse_circuit("
        lut<2, 2> packed = (0b10010100) {};
        lut<2, 2> split = (0b0110, 0b1000) {};
        lut<2, 2> trailing = (6, 0x8,) {};
        lut<1, 1> single = (0b10,) {};
    ").unwrap();

    let packed = circuit.lut_by_name("packed").unwrap().bits();
    assert_eq!(circuit.lut_by_name("split").unwrap().bits(), packed);
    assert_eq!(circuit.lut_by_name("trailing").unwrap().bits(), packed);
    assert_eq!(circuit.lut_by_name("single").unwrap().bits(), &[false, true]);
}

#[test]
fn lookup() {
    let circuit = parse_circuit("
        lut<2, 1> and2 = (0b1000) {};
        lut<2, 2> half_adder = (0b10010100) {};
    ").unwrap();

    let and2 = circuit.lut_by_name("and2").unwrap();
    assert_eq!(and2.input_variant_count(), Some(4));
    assert_eq!(and2.lookup(&[true, true]), vec![true]);
    assert_eq!(and2.lookup(&[true, false]), vec![false]);
    assert_eq!(and2.lookup(&[false, true]), vec![false]);

    // [sum, carry]
    let half_adder = circuit.lut_by_name("half_adder").unwrap();
    assert_eq!(half_adder.lookup(&[false, false]), vec![false, false]);
    assert_eq!(half_adder.lookup(&[true, false]), vec![true, false]);
    assert_eq!(half_adder.lookup(&[false, true]), vec![true, false]);
    assert_eq!(half_adder.lookup(&[true, true]), vec![false, true]);
}

#[test]
fn lookup_out_of_range() {
    let lut = Lut::new(0, "short", 2, 2, vec![true, true, true], Table::new());
    assert_eq!(lut.lookup(&[true, false]), vec![true, false]);
    assert_eq!(lut.lookup(&[true, true]), vec![false, false]);
    assert_eq!(lut.lookup(&[true, true, true, true, true]), vec![false, false]);

    let mut inputs = vec![false; 200];
    inputs[150] = true;
    assert_eq!(lut.lookup(&inputs), vec![false, false]);
}

#[test]
fn wide_truth_tables() {
    let hex_digits = format!("8{}1", "0".repeat(30));
    let circuit = parse_circuit(&format!("
        lut<6, 2> wide_hex = (0x{hex_digits}) {{}};
        lut<7, 1> wide_dec = (18446744073709551616) {{}};
        lut<8, 1> wider_dec = (1361129467683753853853498429727072845824) {{}};
    ")).unwrap();

    let bits = circuit.lut_by_name("wide_hex").unwrap().bits();
    assert_eq!(bits.len(), 128);
    let set: Vec<usize> = (0..bits.len()).filter(|i| bits[*i]).collect();
    assert_eq!(set, vec![0, 127]);

    let bits = circuit.lut_by_name("wide_dec").unwrap().bits();
    assert_eq!(bits.len(), 128);
    let set: Vec<usize> = (0..bits.len()).filter(|i| bits[*i]).collect();
    assert_eq!(set, vec![64]);

    // 2^130
    let bits = circuit.lut_by_name("wider_dec").unwrap().bits();
    assert_eq!(bits.len(), 256);
    let set: Vec<usize> = (0..bits.len()).filter(|i| bits[*i]).collect();
    assert_eq!(set, vec![130]);
}

#[test]
fn paths() {
    let circuit = parse_circuit("
        wire w = 0 {
            _path: [(0, 0), (1, 0); (1, 1), a;],
            one: [(5, 5),],
            none: [],
        };
    ").unwrap();
    let a = id(&circuit, "a");
    let table = circuit.wire_by_name("w").unwrap().table();

    let path = table.path(PATH_KEY).unwrap();
    assert_eq!(
        path.segments(),
        &[
            vec![Point::Numeric { x: 0, y: 0 }, Point::Numeric { x: 1, y: 0 }],
            vec![Point::Numeric { x: 1, y: 1 }, Point::Reference(a)],
        ],
    );
    assert_eq!(path.points().count(), 4);

    let one = table.path(id(&circuit, "one")).unwrap();
    assert_eq!(one.segments(), &[vec![Point::Numeric { x: 5, y: 5 }]]);

    let none = table.path(id(&circuit, "none")).unwrap();
    assert!(none.is_empty());
}

#[test]
fn table_values() {
    let circuit = parse_circuit("
        unit<inv> u = () -> () { count: 12, mask: 0xff, flag: 0b1, at: (3, 4), to: [b], };
    ").unwrap();
    let table = circuit.unit_by_name("u").unwrap().table();

    assert_eq!(table.number(id(&circuit, "count")), Some(12));
    assert_eq!(table.number(id(&circuit, "mask")), Some(255));
    assert_eq!(table.number(id(&circuit, "flag")), Some(1));
    assert_eq!(table.point(id(&circuit, "at")), Some(&Point::Numeric { x: 3, y: 4 }));
    assert_eq!(table.get(id(&circuit, "at")).and_then(TableValue::as_number), None);

    let to = table.path(id(&circuit, "to")).unwrap();
    assert_eq!(to.segments(), &[vec![Point::Reference(id(&circuit, "b"))]]);
}

#[test]
fn units_may_reference_anything() {
    let circuit = parse_circuit("
        unit<nope> u = (x, x) -> (y) {};
        wire x = 1 {};
    ").unwrap();
    let unit = circuit.unit_by_name("u").unwrap();
    let x = id(&circuit, "x");

    assert!(circuit.lut(unit.lut_id()).is_none());
    assert_eq!(unit.input_wires(), &[x, x]);
    assert!(circuit.wire_by_name("y").is_none());
    assert_eq!(circuit.wire(x).unwrap().affects().len(), 1);
}

#[test]
fn later_declarations_replace_earlier_ones() {
    let circuit = parse_circuit("wire a = 0 {}; wire a = 1 { k: 1 };").unwrap();
    assert_eq!(circuit.wires().len(), 1);
    let a = circuit.wire_by_name("a").unwrap();
    assert_eq!(a.state(), true);
    assert_eq!(a.table().len(), 1);
}

#[test]
fn empty_source() {
    let circuit = parse_circuit("  // nothing here\n /* or here */ ").unwrap();
    assert!(circuit.luts().is_empty());
    assert!(circuit.wires().is_empty());
    assert!(circuit.units().is_empty());
}

#[test]
fn unexpected_tokens() {
    assert_eq!(
        unexpected_token("wire a = 0 {}"),
        (vec![TokenKind::Semicolon], TokenKind::Eof, 1, 14),
    );
    assert_eq!(
        unexpected_token("\n\n  foo"),
        (vec![TokenKind::Lut, TokenKind::Wire, TokenKind::Unit], TokenKind::Ident, 3, 3),
    );
    assert_eq!(
        unexpected_token("wire a = 0 { _pos: (1 2) };"),
        (vec![TokenKind::Comma], TokenKind::NumDec, 1, 23),
    );
    assert_eq!(
        unexpected_token("wire a = 0 { _path: [(0, 0) (1, 1)] };"),
        (vec![TokenKind::Comma, TokenKind::Semicolon, TokenKind::RBracket], TokenKind::LParen, 1, 29),
    );
    assert_eq!(
        unexpected_token("wire a = 0 { _path: [5] };"),
        (vec![TokenKind::LParen, TokenKind::Ident], TokenKind::NumDec, 1, 22),
    );
    assert_eq!(
        unexpected_token("unit<inv> u = (a b) -> () {};"),
        (vec![TokenKind::Comma, TokenKind::RParen], TokenKind::Ident, 1, 18),
    );
    assert_eq!(
        unexpected_token("lut<1, 1> x = (0b01 0b10) {};"),
        (vec![TokenKind::Comma, TokenKind::RParen], TokenKind::NumBin, 1, 21),
    );
    assert_eq!(
        unexpected_token("wire $ = 0 {};"),
        (vec![TokenKind::Ident], TokenKind::NoToken, 1, 6),
    );
}

#[test]
fn other_errors() {
    assert_eq!(
        parse_circuit("wire a = 0 { k: v };"),
        Err(ParseError::UnexpectedTableValue { line: 1, column: 17 }),
    );
    assert_eq!(parse_circuit("wire a = {};"), Err(ParseError::MissingNumber { line: 1, column: 10 }));
    assert_eq!(parse_circuit("\nwire a = 0b {};"), Err(ParseError::MissingNumber { line: 2, column: 10 }));
    assert_eq!(parse_circuit("lut<1, 1> x = (0x) {};"), Err(ParseError::MissingNumber { line: 1, column: 16 }));
    assert_eq!(parse_circuit("lut<1, 1> x = () {};"), Err(ParseError::MissingNumber { line: 1, column: 16 }));
    assert_eq!(
        parse_circuit("wire a = 0 { k: 99999999999999999999 };"),
        Err(ParseError::NumberTooLarge { line: 1, column: 17 }),
    );
    assert_eq!(
        parse_circuit("lut<64, 1> big = (0) {};"),
        Err(ParseError::LutTooLarge { input_size: 64, output_size: 1, line: 1, column: 19 }),
    );
    assert_eq!(
        parse_circuit("lut<24, 2> big = (0) {};"),
        Err(ParseError::LutTooLarge { input_size: 24, output_size: 2, line: 1, column: 19 }),
    );
    assert_eq!(
        parse_circuit("lut<1, 3> x = (0b01, 0b10) {};"),
        Err(ParseError::LutLiteralCount { expected: 3, actual: 2, line: 1, column: 16 }),
    );
}

#[test]
fn error_messages() {
    let err = parse_circuit("wire a = 0 {}").unwrap_err();
    assert_eq!(err.to_string(), "1:14: Expected `;`, found end of input");
    assert_eq!(err.line(), 1);

    let err = parse_circuit("foo").unwrap_err();
    assert_eq!(err.to_string(), "1:1: Expected one of `lut`, `wire`, `unit`, found identifier");

    let err = parse_circuit("\n\nwire a = 0 { k: v };").unwrap_err();
    assert_eq!(err.loc(), LineCol::new(3, 17));
    assert_eq!(err.line(), 3);

    let err = parse_circuit("wire a = {};").unwrap_err();
    assert_eq!(err.to_string(), "1:10: Expected a number");

    let err = parse_circuit("lut<1, 3> x = (1, 2) {};").unwrap_err();
    assert_eq!(err.to_string(), "1:16: Expected 1 or 3 truth table literals, found 2");
}

#[test]
fn parser_accepts_tokens_without_eof() {
    let mut idents = Idents::with_well_known_keys();
    let tokens: Vec<Token> = Lexer::new("wire a = 1 {};", &mut idents)
        .tokenize()
        .filter(|token| token.kind() != TokenKind::Eof)
        .collect();

    let circuit = Parser::new(tokens, idents).parse().unwrap();
    assert_eq!(circuit.wire_by_name("a").unwrap().state(), true);
}

#[test]
fn load_from_file() {
    let path = std::env::temp_dir().join(format!("lutsim-load-{}.lut", std::process::id()));
    std::fs::write(&path, INVERTER).unwrap();
    let circuit = load_circuit_from_file(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(circuit, parse_circuit(INVERTER).unwrap());

    let err = load_circuit_from_file(&path).unwrap_err();
    assert!(err.to_string().starts_with("Couldn't read"));
}
