use crate::ident::Idents;
use crate::loc::{HasLoc, LineCol};

use lazy_static::lazy_static;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // keywords
    Lut,
    Wire,
    Unit,

    Ident,
    /// Decimal digits.
    NumDec,
    /// Binary digits, without the `0b` prefix.
    NumBin,
    /// Hexadecimal digits, without the `0x` prefix.
    NumHex,

    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LAngle,
    RAngle,
    Comma,
    Colon,
    Semicolon,
    Equals,
    Arrow,

    Eof,
    /// A character which doesn't start any token.
    NoToken,
}

impl TokenKind {
    pub fn is_number(&self) -> bool {
        matches!(self, TokenKind::NumDec | TokenKind::NumBin | TokenKind::NumHex)
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self, TokenKind::Lut | TokenKind::Wire | TokenKind::Unit)
    }

    fn punctuation(ch: char) -> Option<TokenKind> {
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '<' => TokenKind::LAngle,
            '>' => TokenKind::RAngle,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Equals,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Lut => write!(f, "`lut`"),
            TokenKind::Wire => write!(f, "`wire`"),
            TokenKind::Unit => write!(f, "`unit`"),
            TokenKind::Ident => write!(f, "identifier"),
            TokenKind::NumDec => write!(f, "decimal number"),
            TokenKind::NumBin => write!(f, "binary number"),
            TokenKind::NumHex => write!(f, "hexadecimal number"),
            TokenKind::LParen => write!(f, "`(`"),
            TokenKind::RParen => write!(f, "`)`"),
            TokenKind::LBrace => write!(f, "`{{`"),
            TokenKind::RBrace => write!(f, "`}}`"),
            TokenKind::LBracket => write!(f, "`[`"),
            TokenKind::RBracket => write!(f, "`]`"),
            TokenKind::LAngle => write!(f, "`<`"),
            TokenKind::RAngle => write!(f, "`>`"),
            TokenKind::Comma => write!(f, "`,`"),
            TokenKind::Colon => write!(f, "`:`"),
            TokenKind::Semicolon => write!(f, "`;`"),
            TokenKind::Equals => write!(f, "`=`"),
            TokenKind::Arrow => write!(f, "`->`"),
            TokenKind::Eof => write!(f, "end of input"),
            TokenKind::NoToken => write!(f, "unrecognized character"),
        }
    }
}

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenKind> = {
        let mut keywords = HashMap::new();
        keywords.insert("lut", TokenKind::Lut);
        keywords.insert("wire", TokenKind::Wire);
        keywords.insert("unit", TokenKind::Unit);
        keywords
    };
}

/// A [`Token`] is a piece of source text together with where it starts.
/// Numeric literals keep their digits verbatim; evaluating them is left to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
    loc: LineCol,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S, loc: LineCol) -> Token {
        Token {
            kind,
            text: text.into(),
            loc,
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn line(&self) -> usize {
        self.loc.line()
    }

    pub fn column(&self) -> usize {
        self.loc.col()
    }
}

impl HasLoc for Token {
    fn loc(&self) -> LineCol {
        self.loc
    }
}

/// Hand-written tokenizer over a source string.
///
/// Every identifier which isn't a keyword is interned into the [`Idents`] table
/// the lexer was given, in the order they appear.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    linecol: LineCol,
    idents: &'a mut Idents,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, idents: &'a mut Idents) -> Lexer<'a> {
        Lexer {
            source,
            pos: 0,
            linecol: LineCol::start(),
            idents,
        }
    }

    /// Returns every token from the start of the source, ending with exactly one [`TokenKind::Eof`].
    /// Tokens are produced as the iterator is pulled.
    pub fn tokenize(&mut self) -> Tokenize<'_, 'a> {
        self.pos = 0;
        self.linecol = LineCol::start();
        Tokenize {
            lexer: self,
            done: false,
        }
    }

    /// The next token. Once the source is exhausted, this keeps returning [`TokenKind::Eof`].
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Token {
        self.skip_space_and_comments();

        let start = self.linecol;
        let Some(ch) = self.peek() else {
            return Token::new(TokenKind::Eof, "", start);
        };

        if ch == '-' && self.peek_nth(1) == Some('>') {
            self.bump();
            self.bump();
            return Token::new(TokenKind::Arrow, "->", start);
        }

        if let Some(kind) = TokenKind::punctuation(ch) {
            self.bump();
            return Token::new(kind, ch.to_string(), start);
        }

        if ch.is_ascii_digit() {
            return self.lex_num(start);
        }

        if ch.is_alphabetic() || ch == '_' {
            return self.lex_ident_or_keyword(start);
        }

        self.bump();
        Token::new(TokenKind::NoToken, ch.to_string(), start)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        self.linecol.advance(ch);
        Some(ch)
    }

    fn eat_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let source = self.source;
        let start = self.pos;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.bump();
        }
        &source[start..self.pos]
    }

    fn skip_space_and_comments(&mut self) {
        loop {
            self.eat_while(char::is_whitespace);

            match (self.peek(), self.peek_nth(1)) {
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    self.skip_block_comment();
                },
                (Some('/'), Some('/')) => {
                    self.eat_while(|ch| ch != '\n');
                },
                _ => break,
            }
        }
    }

    // An unterminated block comment runs to the end of the source.
    fn skip_block_comment(&mut self) {
        loop {
            match (self.peek(), self.peek_nth(1)) {
                (Some('*'), Some('/')) => {
                    self.bump();
                    self.bump();
                    return;
                },
                (Some(_), _) => {
                    self.bump();
                },
                (None, _) => return,
            }
        }
    }

    fn lex_num(&mut self, start: LineCol) -> Token {
        match (self.peek(), self.peek_nth(1)) {
            (Some('0'), Some('b' | 'B')) => {
                self.bump();
                self.bump();
                let digits = self.eat_while(|ch| ch == '0' || ch == '1');
                Token::new(TokenKind::NumBin, digits, start)
            },
            (Some('0'), Some('x' | 'X')) => {
                self.bump();
                self.bump();
                let digits = self.eat_while(|ch| ch.is_ascii_hexdigit());
                Token::new(TokenKind::NumHex, digits, start)
            },
            _ => {
                let digits = self.eat_while(|ch| ch.is_ascii_digit());
                Token::new(TokenKind::NumDec, digits, start)
            },
        }
    }

    fn lex_ident_or_keyword(&mut self, start: LineCol) -> Token {
        let text = self.eat_while(|ch| ch.is_alphanumeric() || ch == '_');

        if let Some(kind) = KEYWORDS.get(text) {
            return Token::new(*kind, text, start);
        }

        self.idents.intern(text);
        Token::new(TokenKind::Ident, text, start)
    }
}

/// Iterator returned by [`Lexer::tokenize`].
pub struct Tokenize<'l, 'a> {
    lexer: &'l mut Lexer<'a>,
    done: bool,
}

impl<'l, 'a> Iterator for Tokenize<'l, 'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }

        let token = self.lexer.next();
        if token.kind() == TokenKind::Eof {
            self.done = true;
        }
        Some(token)
    }
}
