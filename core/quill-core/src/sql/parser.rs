//! SQL parser — Pratt grammar for `SELECT` statements.

use super::ast::{SqlExpr, SqlSelect};
use super::lexer::Lexer;
use super::pratt::PrattParser;
use super::token::{Keyword, Symbol, Token, TokenKind};
use crate::error::{QuillError, QuillResult};
use tracing::{debug, trace};

/// SQL 파서 — SQL 문자열을 `SqlSelect` AST로 변환
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlParser;

impl SqlParser {
    pub fn new() -> Self {
        Self
    }

    /// SQL 문자열을 AST로 파싱
    pub fn parse(&self, sql: &str) -> QuillResult<SqlSelect> {
        let tokens = Lexer::new(sql).tokenize()?;
        let mut parser = Parser::new(sql, tokens);
        let select = parser.parse_statement()?;
        debug!(target: "quill::sql", %select, "parsed statement");
        Ok(select)
    }
}

/// Cursor over one statement's tokens.
struct Parser<'a> {
    sql: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(sql: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            sql,
            tokens,
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> QuillError {
        QuillError::SqlParse {
            message: message.into(),
            sql: self.sql.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn describe_next(&self) -> String {
        self.peek()
            .map_or_else(|| "end of input".to_string(), |t| t.to_string())
    }

    fn consume_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek().is_some_and(|t| t.is_keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `keywords` only if all of them come next.
    fn consume_keywords(&mut self, keywords: &[Keyword]) -> bool {
        let matches = keywords.iter().enumerate().all(|(i, k)| {
            self.tokens
                .get(self.pos + i)
                .is_some_and(|t| t.is_keyword(*k))
        });
        if matches {
            self.pos += keywords.len();
        }
        matches
    }

    fn consume_symbol(&mut self, symbol: Symbol) -> bool {
        if self.peek().is_some_and(|t| t.is_symbol(symbol)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_symbol(&mut self, symbol: Symbol, context: &str) -> QuillResult<()> {
        if self.consume_symbol(symbol) {
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {symbol:?} {context}, found {}",
                self.describe_next()
            )))
        }
    }

    fn parse_expr(&mut self) -> QuillResult<Option<SqlExpr>> {
        self.parse(0)
    }

    fn require_expr(&mut self, context: &str) -> QuillResult<SqlExpr> {
        self.parse_expr()?
            .ok_or_else(|| self.error(format!("expected expression {context}")))
    }

    /// A full statement: one `SELECT`, an optional `;`, then nothing.
    fn parse_statement(&mut self) -> QuillResult<SqlSelect> {
        let select = match self.parse_expr()? {
            Some(SqlExpr::Select(select)) => *select,
            Some(other) => {
                return Err(self.error(format!("expected SELECT statement, found {other}")));
            }
            None => return Err(self.error("empty statement")),
        };
        self.consume_symbol(Symbol::Semicolon);
        if self.peek().is_some() {
            return Err(self.error(format!(
                "unexpected {} after statement",
                self.describe_next()
            )));
        }
        Ok(select)
    }

    fn parse_select(&mut self) -> QuillResult<SqlExpr> {
        let projection = self.parse_expr_list()?;
        if !self.consume_keyword(Keyword::From) {
            return Err(self.error(format!(
                "expected FROM, found {}",
                self.describe_next()
            )));
        }
        let table_name = match self.parse_expr()? {
            Some(SqlExpr::Identifier(name)) => name,
            Some(other) => return Err(self.error(format!("expected table name, found {other}"))),
            None => return Err(self.error("expected table name after FROM")),
        };

        let selection = if self.consume_keyword(Keyword::Where) {
            Some(self.require_expr("after WHERE")?)
        } else {
            None
        };

        let group_by = if self.consume_keywords(&[Keyword::Group, Keyword::By]) {
            self.parse_expr_list()?
        } else {
            Vec::new()
        };

        let having = if self.consume_keyword(Keyword::Having) {
            Some(self.require_expr("after HAVING")?)
        } else {
            None
        };

        let order_by = if self.consume_keywords(&[Keyword::Order, Keyword::By]) {
            self.parse_order()?
        } else {
            Vec::new()
        };

        Ok(SqlExpr::Select(Box::new(SqlSelect {
            projection,
            selection,
            group_by,
            order_by,
            having,
            table_name,
        })))
    }

    fn parse_order(&mut self) -> QuillResult<Vec<SqlExpr>> {
        self.parse_expr_list()?
            .into_iter()
            .map(|expr| match expr {
                SqlExpr::Sort { .. } => Ok(expr),
                SqlExpr::Identifier(_) => Ok(SqlExpr::Sort {
                    expr: Box::new(expr),
                    asc: true,
                }),
                other => Err(self.error(format!("unexpected expression {other} after ORDER BY"))),
            })
            .collect()
    }

    fn parse_expr_list(&mut self) -> QuillResult<Vec<SqlExpr>> {
        let mut list = Vec::new();
        while let Some(expr) = self.parse_expr()? {
            list.push(expr);
            if !self.consume_symbol(Symbol::Comma) {
                break;
            }
        }
        Ok(list)
    }

    /// `CAST` has been consumed; parse `( expr AS type )`.
    fn parse_cast(&mut self) -> QuillResult<SqlExpr> {
        self.expect_symbol(Symbol::LeftParen, "after CAST")?;
        let cast = match self.require_expr("inside CAST")? {
            SqlExpr::Alias { expr, alias } => SqlExpr::Cast {
                expr,
                data_type: alias,
            },
            other => return Err(self.error(format!("expected `expr AS type` in CAST, found {other}"))),
        };
        self.expect_symbol(Symbol::RightParen, "to close CAST")?;
        Ok(cast)
    }

    fn parse_identifier(&mut self, precedence: u8) -> QuillResult<String> {
        match self.parse(precedence)? {
            Some(SqlExpr::Identifier(id)) => Ok(id),
            Some(other) => Err(self.error(format!("expected identifier, found {other}"))),
            None => Err(self.error("expected identifier, found end of input")),
        }
    }

    /// `(` after a function name has been consumed.
    fn parse_function_args(&mut self) -> QuillResult<Vec<SqlExpr>> {
        if self.consume_symbol(Symbol::RightParen) {
            return Ok(Vec::new());
        }
        let args = self.parse_expr_list()?;
        self.expect_symbol(Symbol::RightParen, "to close argument list")?;
        Ok(args)
    }
}

impl PrattParser for Parser<'_> {
    type Expr = SqlExpr;

    fn parse_prefix(&mut self) -> QuillResult<Option<SqlExpr>> {
        let Some(token) = self.next_token() else {
            return Ok(None);
        };
        trace!(target: "quill::sql", %token, "parse_prefix");
        let expr = match token.kind {
            TokenKind::Keyword(Keyword::Select) => self.parse_select()?,
            TokenKind::Keyword(Keyword::Cast) => self.parse_cast()?,
            TokenKind::Keyword(
                Keyword::Max
                | Keyword::Min
                | Keyword::Sum
                | Keyword::Count
                | Keyword::Avg
                | Keyword::Int
                | Keyword::Double,
            ) => SqlExpr::Identifier(token.text),
            TokenKind::Identifier => SqlExpr::Identifier(token.text),
            TokenKind::Str => SqlExpr::Str(token.text),
            TokenKind::Long => SqlExpr::Long(
                token
                    .text
                    .parse()
                    .map_err(|_| self.error(format!("invalid integer literal {}", token.text)))?,
            ),
            TokenKind::Double => SqlExpr::Double(
                token
                    .text
                    .parse()
                    .map_err(|_| self.error(format!("invalid float literal {}", token.text)))?,
            ),
            _ => return Err(self.error(format!("unexpected token {token}"))),
        };
        Ok(Some(expr))
    }

    fn next_precedence(&self) -> u8 {
        let Some(token) = self.peek() else {
            return 0;
        };
        match token.kind {
            TokenKind::Keyword(Keyword::As | Keyword::Asc | Keyword::Desc) => 10,
            TokenKind::Keyword(Keyword::Or) => 20,
            TokenKind::Keyword(Keyword::And) => 30,
            TokenKind::Symbol(
                Symbol::Lt
                | Symbol::LtEq
                | Symbol::Eq
                | Symbol::BangEq
                | Symbol::LtGt
                | Symbol::GtEq
                | Symbol::Gt,
            ) => 40,
            TokenKind::Symbol(Symbol::Plus | Symbol::Minus) => 50,
            TokenKind::Symbol(Symbol::Star | Symbol::Slash) => 60,
            TokenKind::Symbol(Symbol::LeftParen) => 70,
            _ => 0,
        }
    }

    fn parse_infix(&mut self, left: SqlExpr, precedence: u8) -> QuillResult<SqlExpr> {
        let Some(token) = self.next_token() else {
            return Err(self.error("expected operator, found end of input"));
        };
        trace!(target: "quill::sql", %token, precedence, "parse_infix");
        let expr = match token.kind {
            TokenKind::Symbol(Symbol::LeftParen) => match left {
                SqlExpr::Identifier(name) => SqlExpr::Function {
                    name,
                    args: self.parse_function_args()?,
                },
                other => return Err(self.error(format!("unexpected '(' after {other}"))),
            },
            TokenKind::Symbol(_) | TokenKind::Keyword(Keyword::And | Keyword::Or) => {
                let op = match token.kind {
                    TokenKind::Symbol(Symbol::LtGt) => "!=".to_string(),
                    TokenKind::Keyword(_) => token.text.to_ascii_uppercase(),
                    _ => token.text,
                };
                let right = self
                    .parse(precedence)?
                    .ok_or_else(|| self.error(format!("expected expression after {op}")))?;
                SqlExpr::BinaryExpr {
                    left: Box::new(left),
                    op,
                    right: Box::new(right),
                }
            }
            TokenKind::Keyword(Keyword::As) => SqlExpr::Alias {
                expr: Box::new(left),
                alias: self.parse_identifier(precedence)?,
            },
            TokenKind::Keyword(Keyword::Asc | Keyword::Desc) => SqlExpr::Sort {
                expr: Box::new(left),
                asc: token.is_keyword(Keyword::Asc),
            },
            _ => return Err(self.error(format!("unexpected infix token {token}"))),
        };
        Ok(expr)
    }
}
