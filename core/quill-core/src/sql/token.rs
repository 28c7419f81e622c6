//! SQL token types.
//!
//! Tokens keep their source text; numeric literals are parsed by the parser.

use std::fmt;

/// A token and where it starts in the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub offset: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, offset: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            offset,
        }
    }

    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }

    pub fn is_symbol(&self, symbol: Symbol) -> bool {
        self.kind == TokenKind::Symbol(symbol)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({}) at {}", self.kind, self.text, self.offset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Keyword(Keyword),
    Symbol(Symbol),
    /// Quoted string literal; the text excludes the quotes.
    Str,
    Long,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Select,
    From,
    Where,
    Group,
    By,
    Having,
    Order,
    As,
    Asc,
    Desc,
    And,
    Or,
    Not,
    Cast,
    Max,
    Min,
    Sum,
    Count,
    Avg,
    Int,
    Double,
}

impl Keyword {
    /// Case-insensitive keyword lookup.
    pub fn from_word(word: &str) -> Option<Keyword> {
        let keyword = match word.to_ascii_uppercase().as_str() {
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "GROUP" => Keyword::Group,
            "BY" => Keyword::By,
            "HAVING" => Keyword::Having,
            "ORDER" => Keyword::Order,
            "AS" => Keyword::As,
            "ASC" => Keyword::Asc,
            "DESC" => Keyword::Desc,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "NOT" => Keyword::Not,
            "CAST" => Keyword::Cast,
            "MAX" => Keyword::Max,
            "MIN" => Keyword::Min,
            "SUM" => Keyword::Sum,
            "COUNT" => Keyword::Count,
            "AVG" => Keyword::Avg,
            "INT" => Keyword::Int,
            "DOUBLE" => Keyword::Double,
            _ => return None,
        };
        Some(keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Semicolon,
    Comma,
    Dot,
    DoubleDot,
    Plus,
    Minus,
    Star,
    Slash,
    Question,
    Eq,
    Gt,
    Lt,
    Bang,
    Tilde,
    Caret,
    Percent,
    Colon,
    DoubleColon,
    ColonEq,
    LtEq,
    GtEq,
    LtEqGt,
    LtGt,
    BangEq,
    BangGt,
    BangLt,
    Amp,
    Bar,
    DoubleAmp,
    DoubleBar,
    Shl,
    Shr,
    At,
    Pound,
}

impl Symbol {
    /// Exact lookup of a symbol's text.
    pub fn from_text(text: &str) -> Option<Symbol> {
        let symbol = match text {
            "(" => Symbol::LeftParen,
            ")" => Symbol::RightParen,
            "{" => Symbol::LeftBrace,
            "}" => Symbol::RightBrace,
            "[" => Symbol::LeftBracket,
            "]" => Symbol::RightBracket,
            ";" => Symbol::Semicolon,
            "," => Symbol::Comma,
            "." => Symbol::Dot,
            ".." => Symbol::DoubleDot,
            "+" => Symbol::Plus,
            "-" => Symbol::Minus,
            "*" => Symbol::Star,
            "/" => Symbol::Slash,
            "?" => Symbol::Question,
            "=" => Symbol::Eq,
            ">" => Symbol::Gt,
            "<" => Symbol::Lt,
            "!" => Symbol::Bang,
            "~" => Symbol::Tilde,
            "^" => Symbol::Caret,
            "%" => Symbol::Percent,
            ":" => Symbol::Colon,
            "::" => Symbol::DoubleColon,
            ":=" => Symbol::ColonEq,
            "<=" => Symbol::LtEq,
            ">=" => Symbol::GtEq,
            "<=>" => Symbol::LtEqGt,
            "<>" => Symbol::LtGt,
            "!=" => Symbol::BangEq,
            "!>" => Symbol::BangGt,
            "!<" => Symbol::BangLt,
            "&" => Symbol::Amp,
            "|" => Symbol::Bar,
            "&&" => Symbol::DoubleAmp,
            "||" => Symbol::DoubleBar,
            "<<" => Symbol::Shl,
            ">>" => Symbol::Shr,
            "@" => Symbol::At,
            "#" => Symbol::Pound,
            _ => return None,
        };
        Some(symbol)
    }

    /// Characters that can appear in a symbol.
    pub fn is_symbol_char(ch: char) -> bool {
        matches!(
            ch,
            '(' | ')'
                | '{'
                | '}'
                | '['
                | ']'
                | ';'
                | ','
                | '.'
                | '+'
                | '-'
                | '*'
                | '/'
                | '?'
                | '='
                | '>'
                | '<'
                | '!'
                | '~'
                | '^'
                | '%'
                | ':'
                | '&'
                | '|'
                | '@'
                | '#'
        )
    }
}
