//! SQL lexer.
//!
//! [`Lexer::tokenize`] turns SQL text into a token list. It recognises:
//! - identifiers (bare or back-tick quoted)
//! - keywords, case-insensitive; `GROUP`/`ORDER` only when followed by `BY`
//! - long and double literals, optionally negative
//! - `'` or `"` quoted strings
//! - symbols, matched by the longest known prefix

use super::token::{Keyword, Symbol, Token, TokenKind};
use crate::error::{QuillError, QuillResult};
use tracing::trace;

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Tokenize the whole input.
    pub fn tokenize(mut self) -> QuillResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        trace!(target: "quill::sql", count = tokens.len(), "tokenized");
        Ok(tokens)
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.rest().chars().nth(offset)
    }

    fn error(&self, message: impl Into<String>, position: usize) -> QuillError {
        QuillError::Tokenize {
            message: message.into(),
            position,
        }
    }

    /// Byte offset of the first char at or after `from` failing `pred`.
    fn scan_while(&self, from: usize, pred: impl Fn(char) -> bool) -> usize {
        self.input[from..]
            .char_indices()
            .find(|(_, ch)| !pred(*ch))
            .map_or(self.input.len(), |(i, _)| from + i)
    }

    fn skip_whitespace(&mut self) {
        self.pos = self.scan_while(self.pos, char::is_whitespace);
    }

    fn next_token(&mut self) -> QuillResult<Option<Token>> {
        self.skip_whitespace();
        let Some(ch) = self.peek(0) else {
            return Ok(None);
        };

        let token = if ch == '`' {
            self.scan_quoted_identifier()?
        } else if ch.is_alphabetic() || ch == '_' {
            self.scan_word()
        } else if ch.is_ascii_digit() || (ch == '-' && self.peek(1).is_some_and(|c| c.is_ascii_digit()))
        {
            self.scan_number()
        } else if Symbol::is_symbol_char(ch) {
            self.scan_symbol()?
        } else if ch == '\'' || ch == '"' {
            self.scan_string(ch)?
        } else {
            return Err(self.error(format!("unexpected character '{ch}'"), self.pos));
        };
        Ok(Some(token))
    }

    fn scan_quoted_identifier(&mut self) -> QuillResult<Token> {
        let start = self.pos;
        let body = start + 1;
        let end = self.input[body..]
            .find('`')
            .map(|i| body + i)
            .ok_or_else(|| self.error("unterminated quoted identifier", start))?;
        self.pos = end + 1;
        Ok(Token::new(&self.input[body..end], TokenKind::Identifier, start))
    }

    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        let end = self.scan_while(start, |c| c.is_alphanumeric() || c == '_');
        let text = &self.input[start..end];
        self.pos = end;

        let kind = match Keyword::from_word(text) {
            Some(Keyword::Group) | Some(Keyword::Order) if !self.followed_by_by(end) => {
                TokenKind::Identifier
            }
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        };
        Token::new(text, kind, start)
    }

    /// Whether the next two non-whitespace characters after `from` spell `BY`.
    fn followed_by_by(&self, from: usize) -> bool {
        let next = self.scan_while(from, char::is_whitespace);
        self.input[next..]
            .get(..2)
            .is_some_and(|s| s.eq_ignore_ascii_case("by"))
    }

    fn scan_number(&mut self) -> Token {
        let start = self.pos;
        let digits_from = if self.input[start..].starts_with('-') {
            start + 1
        } else {
            start
        };
        let mut end = self.scan_while(digits_from, |c| c.is_ascii_digit());
        let mut kind = TokenKind::Long;
        if self.input[end..].starts_with('.') {
            kind = TokenKind::Double;
            end = self.scan_while(end + 1, |c| c.is_ascii_digit());
        }
        self.pos = end;
        Token::new(&self.input[start..end], kind, start)
    }

    fn scan_symbol(&mut self) -> QuillResult<Token> {
        let start = self.pos;
        let mut end = self.scan_while(start, Symbol::is_symbol_char);
        // Symbol chars are ASCII, so byte steps are char steps.
        while end > start {
            let text = &self.input[start..end];
            if let Some(symbol) = Symbol::from_text(text) {
                self.pos = end;
                return Ok(Token::new(text, TokenKind::Symbol(symbol), start));
            }
            end -= 1;
        }
        Err(self.error("symbol matches no known operator", start))
    }

    fn scan_string(&mut self, quote: char) -> QuillResult<Token> {
        let start = self.pos;
        let body = start + quote.len_utf8();
        let end = self.input[body..]
            .find(quote)
            .map(|i| body + i)
            .ok_or_else(|| self.error("unterminated string literal", start))?;
        self.pos = end + quote.len_utf8();
        Ok(Token::new(&self.input[body..end], TokenKind::Str, start))
    }
}

/// Convenience wrapper around [`Lexer::tokenize`].
pub fn tokenize(sql: &str) -> QuillResult<Vec<Token>> {
    Lexer::new(sql).tokenize()
}
