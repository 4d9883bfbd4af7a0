//! Hand-written SQL tokenizer.
//!
//! [`lex`] walks the source once, left to right. At every position it skips
//! whitespace and `--` comments, then tries the sub-lexers in a fixed order:
//! keyword/symbol, string, identifier, numeric. The first one that matches
//! produces the token. Each sub-lexer is exposed so it can be exercised on
//! its own; all of them leave the caller's cursor untouched on failure.

use std::fmt;

use crate::error::{LexError, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    Insert,
    Values,
    Table,
    Create,
    Where,
    From,
    Into,
    Text,
    Int,
    Boolean,
    Drop,
    Delete,
    Update,
    Set,
    Order,
    By,
    Asc,
    Desc,
    And,
    Or,
    Not,
    As,
    Null,
}

impl Keyword {
    pub const ALL: [Keyword; 24] = [
        Keyword::Select,
        Keyword::Insert,
        Keyword::Values,
        Keyword::Table,
        Keyword::Create,
        Keyword::Where,
        Keyword::From,
        Keyword::Into,
        Keyword::Text,
        Keyword::Int,
        Keyword::Boolean,
        Keyword::Drop,
        Keyword::Delete,
        Keyword::Update,
        Keyword::Set,
        Keyword::Order,
        Keyword::By,
        Keyword::Asc,
        Keyword::Desc,
        Keyword::And,
        Keyword::Or,
        Keyword::Not,
        Keyword::As,
        Keyword::Null,
    ];

    /// Lowercase spelling as matched in source text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "select",
            Keyword::Insert => "insert",
            Keyword::Values => "values",
            Keyword::Table => "table",
            Keyword::Create => "create",
            Keyword::Where => "where",
            Keyword::From => "from",
            Keyword::Into => "into",
            Keyword::Text => "text",
            Keyword::Int => "int",
            Keyword::Boolean => "boolean",
            Keyword::Drop => "drop",
            Keyword::Delete => "delete",
            Keyword::Update => "update",
            Keyword::Set => "set",
            Keyword::Order => "order",
            Keyword::By => "by",
            Keyword::Asc => "asc",
            Keyword::Desc => "desc",
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::As => "as",
            Keyword::Null => "null",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    Semicolon,     // ;
    Asterisk,      // *
    Comma,         // ,
    LeftParen,     // (
    RightParen,    // )
    Equal,         // =
    NotEqual,      // <>
    LessThan,      // <
    GreaterThan,   // >
    LessThanEq,    // <=
    GreaterThanEq, // >=
    Plus,          // +
    Minus,         // -
    Slash,         // /
}

impl Symbol {
    pub const ALL: [Symbol; 14] = [
        Symbol::Semicolon,
        Symbol::Asterisk,
        Symbol::Comma,
        Symbol::LeftParen,
        Symbol::RightParen,
        Symbol::Equal,
        Symbol::NotEqual,
        Symbol::LessThan,
        Symbol::GreaterThan,
        Symbol::LessThanEq,
        Symbol::GreaterThanEq,
        Symbol::Plus,
        Symbol::Minus,
        Symbol::Slash,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Symbol::Semicolon => ";",
            Symbol::Asterisk => "*",
            Symbol::Comma => ",",
            Symbol::LeftParen => "(",
            Symbol::RightParen => ")",
            Symbol::Equal => "=",
            Symbol::NotEqual => "<>",
            Symbol::LessThan => "<",
            Symbol::GreaterThan => ">",
            Symbol::LessThanEq => "<=",
            Symbol::GreaterThanEq => ">=",
            Symbol::Plus => "+",
            Symbol::Minus => "-",
            Symbol::Slash => "/",
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.as_str())
    }
}

/// Token classification. Numeric and boolean literals keep their source
/// text; the executor decides how to coerce them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),
    Symbol(Symbol),
    Identifier(String),
    String(String),
    Numeric(String),
    Boolean(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub location: Location,
}

impl Token {
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Self { kind, location }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }

    /// The token's value: identifier name, literal contents, or the
    /// keyword/symbol spelling.
    pub fn text(&self) -> &str {
        match &self.kind {
            TokenKind::Keyword(k) => k.as_str(),
            TokenKind::Symbol(s) => s.as_str(),
            TokenKind::Identifier(v)
            | TokenKind::String(v)
            | TokenKind::Numeric(v)
            | TokenKind::Boolean(v) => v,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Keyword(k) => write!(f, "{}", k),
            TokenKind::Symbol(s) => write!(f, "{}", s),
            TokenKind::Identifier(v) => write!(f, "identifier {}", v),
            TokenKind::String(v) => write!(f, "string '{}'", v),
            TokenKind::Numeric(v) => write!(f, "number {}", v),
            TokenKind::Boolean(v) => write!(f, "boolean {}", v),
        }
    }
}

/// Position in the source plus line/column bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub pointer: usize,
    pub location: Location,
}

impl Cursor {
    fn advance(&mut self, ch: char) {
        self.pointer += 1;
        if ch == '\n' {
            self.location.line += 1;
            self.location.column = 0;
        } else {
            self.location.column += 1;
        }
    }

    fn advance_by(&mut self, source: &[char], count: usize) {
        for &ch in &source[self.pointer..self.pointer + count] {
            self.advance(ch);
        }
    }
}

/// Tokenize `source`.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

pub struct Lexer {
    source: Vec<char>,
    cursor: Cursor,
}

type SubLexer = fn(&[char], Cursor) -> Option<(Token, Cursor)>;

const SUB_LEXERS: [SubLexer; 4] = [lex_keyword_or_symbol, lex_string, lex_identifier, lex_numeric];

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            cursor: Cursor::default(),
        }
    }

    fn current_char(&self) -> Option<char> {
        self.source.get(self.cursor.pointer).copied()
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.cursor.pointer + 1).copied()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.cursor.advance(ch);
            } else if ch == '-' && self.peek() == Some('-') {
                // -- runs to end of line
                while let Some(ch) = self.current_char() {
                    self.cursor.advance(ch);
                    if ch == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments();
            if self.current_char().is_none() {
                return Ok(tokens);
            }

            let lexed = SUB_LEXERS
                .iter()
                .find_map(|sub_lexer| sub_lexer(&self.source, self.cursor));

            match lexed {
                Some((token, cursor)) => {
                    tokens.push(token);
                    self.cursor = cursor;
                }
                None => {
                    return Err(LexError {
                        location: self.cursor.location,
                    })
                }
            }
        }
    }
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

#[derive(Clone, Copy)]
enum FixedToken {
    Keyword(Keyword),
    Symbol(Symbol),
    Boolean(&'static str),
}

impl FixedToken {
    fn spelling(&self) -> &'static str {
        match self {
            FixedToken::Keyword(k) => k.as_str(),
            FixedToken::Symbol(s) => s.as_str(),
            FixedToken::Boolean(b) => b,
        }
    }

    fn is_word(&self) -> bool {
        !matches!(self, FixedToken::Symbol(_))
    }

    fn into_kind(self) -> TokenKind {
        match self {
            FixedToken::Keyword(k) => TokenKind::Keyword(k),
            FixedToken::Symbol(s) => TokenKind::Symbol(s),
            FixedToken::Boolean(b) => TokenKind::Boolean(b.to_string()),
        }
    }

    /// Words compare case-insensitively and need a word boundary after them.
    fn matches(&self, rest: &[char]) -> bool {
        let spelling = self.spelling();
        let len = spelling.len();
        if rest.len() < len {
            return false;
        }

        let head = &rest[..len];
        if self.is_word() {
            let same = head
                .iter()
                .zip(spelling.chars())
                .all(|(a, b)| a.to_ascii_lowercase() == b);
            same && rest.get(len).map_or(true, |&next| !is_identifier_char(next))
        } else {
            head.iter().copied().eq(spelling.chars())
        }
    }
}

/// Longest keyword, symbol or boolean spelling at the cursor.
pub fn lex_keyword_or_symbol(source: &[char], cursor: Cursor) -> Option<(Token, Cursor)> {
    let rest = source.get(cursor.pointer..)?;

    let candidates = Keyword::ALL
        .into_iter()
        .map(FixedToken::Keyword)
        .chain(["true", "false"].into_iter().map(FixedToken::Boolean))
        .chain(Symbol::ALL.into_iter().map(FixedToken::Symbol));

    let best = candidates
        .filter(|candidate| candidate.matches(rest))
        .max_by_key(|candidate| candidate.spelling().len())?;

    let mut next = cursor;
    next.advance_by(source, best.spelling().len());
    Some((Token::new(best.into_kind(), cursor.location), next))
}

/// Digits with an optional fraction and exponent. A dangling exponent, a
/// second decimal point, or a point inside the exponent rejects the whole
/// literal rather than stopping short.
pub fn lex_numeric(source: &[char], cursor: Cursor) -> Option<(Token, Cursor)> {
    let mut next = cursor;
    let mut period_found = false;
    let mut exponent_found = false;
    let mut mantissa_digits = false;

    while let Some(&ch) = source.get(next.pointer) {
        match ch {
            '0'..='9' => {
                if !exponent_found {
                    mantissa_digits = true;
                }
                next.advance(ch);
            }
            '.' => {
                if period_found || exponent_found {
                    return None;
                }
                period_found = true;
                next.advance(ch);
            }
            'e' | 'E' => {
                if exponent_found || !mantissa_digits {
                    return None;
                }
                exponent_found = true;
                next.advance(ch);

                if let Some(&sign) = source.get(next.pointer) {
                    if sign == '+' || sign == '-' {
                        next.advance(sign);
                    }
                }
                if !source.get(next.pointer).is_some_and(|d| d.is_ascii_digit()) {
                    return None;
                }
            }
            _ => break,
        }
    }

    if !mantissa_digits {
        return None;
    }

    let text: String = source[cursor.pointer..next.pointer].iter().collect();
    Some((Token::new(TokenKind::Numeric(text), cursor.location), next))
}

/// Consume a run enclosed in `delimiter`, where a doubled delimiter stands
/// for one literal delimiter character.
fn lex_character_delimited(
    source: &[char],
    cursor: Cursor,
    delimiter: char,
) -> Option<(String, Cursor)> {
    if source.get(cursor.pointer) != Some(&delimiter) {
        return None;
    }

    let mut next = cursor;
    next.advance(delimiter);
    let mut value = String::new();

    while let Some(&ch) = source.get(next.pointer) {
        if ch == delimiter {
            if source.get(next.pointer + 1) == Some(&delimiter) {
                value.push(ch);
                next.advance(ch);
                next.advance(ch);
                continue;
            }
            next.advance(ch);
            return Some((value, next));
        }
        value.push(ch);
        next.advance(ch);
    }

    None
}

/// Single-quoted string literal.
pub fn lex_string(source: &[char], cursor: Cursor) -> Option<(Token, Cursor)> {
    let (value, next) = lex_character_delimited(source, cursor, '\'')?;
    Some((Token::new(TokenKind::String(value), cursor.location), next))
}

/// Bare identifiers are folded to lowercase; `"quoted"` and `` `quoted` ``
/// identifiers keep their exact contents.
pub fn lex_identifier(source: &[char], cursor: Cursor) -> Option<(Token, Cursor)> {
    for delimiter in ['"', '`'] {
        if let Some((value, next)) = lex_character_delimited(source, cursor, delimiter) {
            return Some((Token::new(TokenKind::Identifier(value), cursor.location), next));
        }
    }

    let first = *source.get(cursor.pointer)?;
    if !(first.is_alphabetic() || first == '_') {
        return None;
    }

    let mut next = cursor;
    let mut value = String::new();
    while let Some(&ch) = source.get(next.pointer) {
        if !is_identifier_char(ch) {
            break;
        }
        value.extend(ch.to_lowercase());
        next.advance(ch);
    }

    Some((Token::new(TokenKind::Identifier(value), cursor.location), next))
}
