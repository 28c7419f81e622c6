//! Top-down operator precedence (Pratt) parsing.

use crate::error::QuillResult;

/// A Pratt parser: grammars supply prefix/infix rules and a precedence
/// table, the provided [`PrattParser::parse`] loop folds them together.
pub trait PrattParser {
    type Expr;

    /// Parse the next prefix expression; `None` at end of input.
    fn parse_prefix(&mut self) -> QuillResult<Option<Self::Expr>>;

    /// Precedence of the next token, 0 when it cannot continue an expression.
    fn next_precedence(&self) -> u8;

    /// Fold `left` with the next infix operator.
    fn parse_infix(&mut self, left: Self::Expr, precedence: u8) -> QuillResult<Self::Expr>;

    /// Parse an expression binding tighter than `precedence`.
    fn parse(&mut self, precedence: u8) -> QuillResult<Option<Self::Expr>> {
        let Some(mut expr) = self.parse_prefix()? else {
            return Ok(None);
        };
        while precedence < self.next_precedence() {
            let next = self.next_precedence();
            expr = self.parse_infix(expr, next)?;
        }
        Ok(Some(expr))
    }
}
