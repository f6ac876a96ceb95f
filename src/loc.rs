/// A [`LineCol`] is a container for a line and column.
/// Both start at 1, the way editors report them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineCol(usize, usize);

impl LineCol {
    pub fn new(line: usize, col: usize) -> LineCol {
        LineCol(line, col)
    }

    /// The position of the first character of a source.
    pub fn start() -> LineCol {
        LineCol(1, 1)
    }

    /// The line number. Starts with line 1.
    pub fn line(&self) -> usize {
        self.0
    }

    /// The column. Starts with column 1.
    pub fn col(&self) -> usize {
        self.1
    }

    /// Step over `ch`. A newline moves to the start of the next line.
    pub(crate) fn advance(&mut self, ch: char) {
        if ch == '\n' {
            self.0 += 1;
            self.1 = 1;
        } else {
            self.1 += 1;
        }
    }
}

impl Default for LineCol {
    fn default() -> LineCol {
        LineCol::start()
    }
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}:{}", self.line(), self.col())
    }
}

/// Many objects have location information.
/// [`HasLoc`] allows you to call [`HasLoc::loc`] to get where they start in the source.
pub trait HasLoc {
    fn loc(&self) -> LineCol;
}

#[test]
fn linecol_advance() {
    let mut linecol = LineCol::start();
    for ch in "ab\ncd".chars() {
        linecol.advance(ch);
    }
    assert_eq!(linecol.to_string(), "2:3".to_string());

    linecol.advance('\n');
    assert_eq!(linecol, LineCol::new(3, 1));
}
