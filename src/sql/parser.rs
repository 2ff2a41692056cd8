//! SQL parser
//!
//! Recursive descent over the token stream with a single buffered lookahead
//! token; whitespace tokens are skipped when the lookahead advances, so the
//! buffered token is always meaningful. Parsing stops at the first error,
//! and every error carries a 1-based byte position into the query text.

use bumpalo::Bump;

use super::ast::{
    ColumnDef, CreateStmt, SelectExpr, SelectExprKind, SelectStmt, Span, Statement, TableRef,
};
use super::lexer::Lexer;
use super::token::{Keyword, Token, TokenKind};
use crate::error::{Error, Result};

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    /// Lookahead token, never whitespace
    token: Token<'a>,
    arena: &'a Bump,
}

impl<'a> Parser<'a> {
    pub fn new(sql: &'a str, arena: &'a Bump) -> Self {
        let mut lexer = Lexer::new(sql);
        let token = next_skip_space(&mut lexer);
        Self {
            lexer,
            token,
            arena,
        }
    }

    /// Parse one statement. Tokens after a terminating semicolon are
    /// ignored.
    pub fn parse(&mut self) -> Result<Statement<'a>> {
        match self.token.kind {
            TokenKind::Keyword(Keyword::Select) => {
                self.advance();
                let select = self.parse_select()?;
                Ok(Statement::Select(self.arena.alloc(select)))
            }
            TokenKind::Keyword(Keyword::Create) => {
                self.advance();
                let create = self.parse_create()?;
                Ok(Statement::Create(self.arena.alloc(create)))
            }
            _ => Err(Error::feature_not_supported(
                "only SELECT and CREATE TABLE are supported",
                self.token.pos(),
            )),
        }
    }

    fn advance(&mut self) {
        self.token = next_skip_space(&mut self.lexer);
    }

    fn expect(&mut self, kind: TokenKind<'a>, detail: &'static str) -> Result<()> {
        if self.token.kind == kind {
            self.advance();
            Ok(())
        } else {
            Err(Error::syntax(detail, self.token.pos()))
        }
    }

    // ========== SELECT ==========

    fn parse_select(&mut self) -> Result<SelectStmt<'a>> {
        let select_list = self.parse_select_list()?;

        let from = match self.token.kind {
            TokenKind::Semicolon | TokenKind::Eof => None,
            TokenKind::Keyword(Keyword::From) => {
                self.advance();
                Some(self.parse_table_ref()?)
            }
            _ => {
                return Err(Error::syntax(
                    "expected FROM or end of query",
                    self.token.pos(),
                ))
            }
        };

        if from.is_none() {
            // A star cannot be expanded without a source table.
            if let Some(star) = select_list
                .iter()
                .find(|expr| expr.kind == SelectExprKind::Star)
            {
                return Err(Error::syntax(
                    "SELECT * requires a FROM clause",
                    star.span.pos(),
                ));
            }
        }

        Ok(SelectStmt { select_list, from })
    }

    fn parse_select_list(&mut self) -> Result<&'a [SelectExpr<'a>]> {
        let mut exprs: Vec<SelectExpr<'a>> = Vec::new();
        loop {
            exprs.push(self.parse_select_expr()?);
            if self.token.kind != TokenKind::Comma {
                break;
            }
            self.advance();
        }
        Ok(self.arena.alloc_slice_copy(&exprs))
    }

    fn parse_select_expr(&mut self) -> Result<SelectExpr<'a>> {
        let token = self.token;
        let kind = match token.kind {
            TokenKind::Star => SelectExprKind::Star,
            TokenKind::Number(value) => SelectExprKind::Number(value),
            TokenKind::Str(value) => SelectExprKind::Str(value),
            TokenKind::Ident(name) => SelectExprKind::Field(name),
            _ => {
                return Err(Error::syntax(
                    "expected an expression in the select list",
                    token.pos(),
                ))
            }
        };
        self.advance();

        let mut alias = None;
        if self.token.kind == TokenKind::Keyword(Keyword::As) {
            if kind == SelectExprKind::Star {
                return Err(Error::syntax("cannot alias *", self.token.pos()));
            }
            self.advance();
            match self.token.kind {
                TokenKind::Ident(name) => {
                    alias = Some(name);
                    self.advance();
                }
                _ => {
                    return Err(Error::syntax(
                        "expected an identifier after AS",
                        self.token.pos(),
                    ))
                }
            }
        }

        Ok(SelectExpr {
            kind,
            alias,
            span: Span {
                begin: token.begin,
                end: token.end,
            },
        })
    }

    fn parse_table_ref(&mut self) -> Result<TableRef<'a>> {
        let token = self.token;
        let name = match token.kind {
            TokenKind::Ident(name) => name,
            _ => {
                return Err(Error::syntax(
                    "expected a table name after FROM",
                    token.pos(),
                ))
            }
        };
        self.advance();

        match self.token.kind {
            TokenKind::Semicolon | TokenKind::Eof => {}
            TokenKind::Comma => {
                return Err(Error::feature_not_supported(
                    "joins are not supported",
                    self.token.pos(),
                ))
            }
            _ => return Err(Error::syntax("expected end of query", self.token.pos())),
        }

        Ok(TableRef {
            name,
            span: Span {
                begin: token.begin,
                end: token.end,
            },
        })
    }

    // ========== CREATE TABLE ==========

    fn parse_create(&mut self) -> Result<CreateStmt<'a>> {
        self.expect(
            TokenKind::Keyword(Keyword::Table),
            "expected TABLE after CREATE",
        )?;

        let table_name = match self.token.kind {
            TokenKind::Ident(name) => name,
            _ => return Err(Error::syntax("expected a table name", self.token.pos())),
        };
        self.advance();

        self.expect(TokenKind::LParen, "expected ( after the table name")?;

        let mut columns: Vec<ColumnDef<'a>> = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            match self.token.kind {
                TokenKind::Comma => self.advance(),
                TokenKind::RParen => break,
                _ => {
                    return Err(Error::syntax(
                        "expected , or ) in the column list",
                        self.token.pos(),
                    ))
                }
            }
        }
        self.advance();

        match self.token.kind {
            TokenKind::Semicolon | TokenKind::Eof => {}
            _ => return Err(Error::syntax("expected end of query", self.token.pos())),
        }

        Ok(CreateStmt {
            table_name,
            columns: self.arena.alloc_slice_copy(&columns),
        })
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef<'a>> {
        let token = self.token;
        let name = match token.kind {
            TokenKind::Ident(name) => name,
            _ => return Err(Error::syntax("expected a column name", token.pos())),
        };
        self.advance();

        let (type_kw, type_id) = match self.token.kind {
            TokenKind::Keyword(keyword) => match keyword.type_id() {
                Some(type_id) => (keyword, type_id),
                None => return Err(Error::syntax("expected a type name", self.token.pos())),
            },
            _ => return Err(Error::syntax("expected a type name", self.token.pos())),
        };
        self.advance();

        let mut length = None;
        if self.token.kind == TokenKind::LParen {
            if type_id.fixed_len().is_some() {
                return Err(Error::syntax(
                    "type does not take a length argument",
                    self.token.pos(),
                ));
            }
            self.advance();
            match self.token.kind {
                TokenKind::Number(value) if value > 0 && value <= i32::MAX as i64 => {
                    length = Some(value);
                    self.advance();
                }
                TokenKind::Number(_) => {
                    return Err(Error::syntax(
                        "length must be a positive integer",
                        self.token.pos(),
                    ))
                }
                _ => {
                    return Err(Error::syntax(
                        "expected a length in parentheses",
                        self.token.pos(),
                    ))
                }
            }
            self.expect(TokenKind::RParen, "expected ) after the length argument")?;
        }

        Ok(ColumnDef {
            name,
            type_kw,
            length,
            span: Span {
                begin: token.begin,
                end: token.end,
            },
        })
    }
}

fn next_skip_space<'a>(lexer: &mut Lexer<'a>) -> Token<'a> {
    loop {
        let token = lexer.next_token();
        if token.kind != TokenKind::Space {
            return token;
        }
    }
}
