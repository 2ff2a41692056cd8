//! SQL lexer
//!
//! Produces one classified token at a time over the raw query bytes.
//! Whitespace is a token class of its own so byte positions stay exact;
//! skipping it is the parser's decision, not the lexer's. An unterminated
//! quote yields an `Invalid` token, never a failure.

use super::token::{Keyword, Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Classify the token starting at the current position and advance
    /// past it.
    pub fn next_token(&mut self) -> Token<'a> {
        let begin = self.pos;
        let kind = self.scan();
        Token {
            kind,
            begin,
            end: self.pos,
        }
    }

    fn scan(&mut self) -> TokenKind<'a> {
        let bytes = self.src.as_bytes();
        let first = match bytes.get(self.pos) {
            Some(&b) => b,
            None => return TokenKind::Eof,
        };

        if first.is_ascii_whitespace() {
            while matches!(bytes.get(self.pos), Some(b) if b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            return TokenKind::Space;
        }

        match first {
            b',' => self.single(TokenKind::Comma),
            b';' => self.single(TokenKind::Semicolon),
            b'.' => self.single(TokenKind::Dot),
            b'(' => self.single(TokenKind::LParen),
            b')' => self.single(TokenKind::RParen),
            b'+' => self.single(TokenKind::Plus),
            b'-' => {
                if matches!(bytes.get(self.pos + 1), Some(b) if b.is_ascii_digit()) {
                    self.scan_number()
                } else {
                    self.single(TokenKind::Minus)
                }
            }
            b'*' => self.single(TokenKind::Star),
            b'\'' => match self.scan_quoted(b'\'') {
                Some(value) => TokenKind::Str(value),
                None => TokenKind::Invalid,
            },
            b'"' => match self.scan_quoted(b'"') {
                Some(name) => TokenKind::Ident(name),
                None => TokenKind::Invalid,
            },
            _ if first.is_ascii_digit() => self.scan_number(),
            _ if first.is_ascii_alphabetic() => self.scan_word(),
            _ => {
                // Step over the whole character so we stay on a UTF-8
                // boundary.
                let len = self.src[self.pos..]
                    .chars()
                    .next()
                    .map(char::len_utf8)
                    .unwrap_or(1);
                self.pos += len;
                TokenKind::Invalid
            }
        }
    }

    fn single(&mut self, kind: TokenKind<'a>) -> TokenKind<'a> {
        self.pos += 1;
        kind
    }

    /// Digits with an optional leading minus.
    fn scan_number(&mut self) -> TokenKind<'a> {
        let begin = self.pos;
        let bytes = self.src.as_bytes();
        if bytes[self.pos] == b'-' {
            self.pos += 1;
        }
        while matches!(bytes.get(self.pos), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        match self.src[begin..self.pos].parse::<i64>() {
            Ok(value) => TokenKind::Number(value),
            Err(_) => TokenKind::Invalid,
        }
    }

    /// Scan to the closing quote; `None` when the input ends first.
    fn scan_quoted(&mut self, quote: u8) -> Option<&'a str> {
        let bytes = self.src.as_bytes();
        let start = self.pos + 1;
        let mut end = start;
        while end < bytes.len() && bytes[end] != quote {
            end += 1;
        }
        if end == bytes.len() {
            self.pos = end;
            None
        } else {
            self.pos = end + 1;
            Some(&self.src[start..end])
        }
    }

    /// Unquoted word: alphabetic first character, alphanumeric rest. A word
    /// that matches the keyword list case-insensitively is that keyword,
    /// never an identifier.
    fn scan_word(&mut self) -> TokenKind<'a> {
        let begin = self.pos;
        let bytes = self.src.as_bytes();
        while matches!(bytes.get(self.pos), Some(b) if b.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let word = &self.src[begin..self.pos];
        match Keyword::from_ident(word) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident(word),
        }
    }
}
