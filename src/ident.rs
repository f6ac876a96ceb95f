use std::collections::HashMap;

/// Identifiers are referred to by small, dense integers.
/// LUTs, wires, units and table keys all share one namespace.
pub type IdentId = usize;

/// Table key for the outline a renderer draws for a LUT.
pub const SHAPE_KEY: IdentId = 0;
/// Table key for the input port positions of a LUT.
pub const INPUT_KEY: IdentId = 1;
/// Table key for the output port positions of a LUT.
pub const OUTPUT_KEY: IdentId = 2;
/// Table key for the route of a wire.
pub const PATH_KEY: IdentId = 3;
/// Table key for the placement of a unit.
pub const POS_KEY: IdentId = 4;

const WELL_KNOWN_KEYS: [(&str, IdentId); 5] = [
    ("_shape", SHAPE_KEY),
    ("_input", INPUT_KEY),
    ("_output", OUTPUT_KEY),
    ("_path", PATH_KEY),
    ("_pos", POS_KEY),
];

/// An append-only, bidirectional table of identifier names.
///
/// The first time a name is interned it gets the next free [`IdentId`].
/// Interning the same name again always returns the same id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Idents {
    ids: HashMap<String, IdentId>,
    names: Vec<String>,
}

impl Idents {
    /// An empty table. The first interned name gets id 0.
    pub fn new() -> Idents {
        Idents::default()
    }

    /// A table seeded with the table keys renderers look for,
    /// so that they can be found through [`SHAPE_KEY`], [`INPUT_KEY`], [`OUTPUT_KEY`],
    /// [`PATH_KEY`] and [`POS_KEY`].
    pub fn with_well_known_keys() -> Idents {
        let mut idents = Idents::new();
        for (name, id) in WELL_KNOWN_KEYS {
            let interned = idents.intern(name);
            debug_assert_eq!(interned, id);
        }
        idents
    }

    pub fn intern(&mut self, name: &str) -> IdentId {
        if let Some(id) = self.ids.get(name) {
            return *id;
        }

        let id = self.names.len();
        self.ids.insert(name.to_string(), id);
        self.names.push(name.to_string());
        id
    }

    /// Looks up a name without interning it.
    pub fn get(&self, name: &str) -> Option<IdentId> {
        self.ids.get(name).copied()
    }

    pub fn name(&self, id: IdentId) -> Option<&str> {
        self.names.get(id).map(|name| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
