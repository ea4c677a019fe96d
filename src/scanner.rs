//! Character-stream scanner: turns source bytes into a token stream.
//!
//! Mirrors `examples/original_source/src/scanner.c` one-character-lookahead
//! design, but keeps its position-tracking trick (`last_read`) as an
//! explicit struct field instead of a function-local `static`, per
//! `spec.md` §9's "bundle the globals into one context" recommendation.

use crate::error::{CompileError, Result};
use crate::position::SourcePos;
use crate::token::{lookup_reserved, Token, TokenKind};

/// Maximum identifier length in bytes. See SPEC_FULL.md §3 / DESIGN.md
/// for why this constant, rather than the original's, is authoritative.
pub const MAX_ID_LENGTH: usize = 127;

pub struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    ch: Option<char>,
    line: u32,
    col: u32,
    /// Whether the character just consumed was a newline; the line/col
    /// bump happens on the *next* `next_char`, matching the original's
    /// deferred increment (`scanner.c::next_char`).
    last_was_newline: bool,
    max_id_length: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_max_id_length(source, MAX_ID_LENGTH)
    }

    /// Like [`Scanner::new`], but overriding the maximum identifier
    /// length instead of using [`MAX_ID_LENGTH`] — wired from
    /// [`crate::config::CompilerConfig::max_identifier_length`].
    pub fn with_max_id_length(source: &'a str, max_id_length: usize) -> Self {
        let mut scanner = Scanner {
            chars: source.chars().peekable(),
            ch: None,
            line: 1,
            col: 0,
            last_was_newline: false,
            max_id_length,
        };
        scanner.next_char();
        scanner
    }

    fn pos(&self) -> SourcePos {
        SourcePos::new(self.line, self.col)
    }

    fn next_char(&mut self) {
        let c = self.chars.next();
        if c.is_none() {
            self.ch = None;
            return;
        }
        if self.last_was_newline {
            self.line += 1;
            self.col = 0;
        }
        self.col += 1;
        self.last_was_newline = c == Some('\n');
        self.ch = c;
    }

    /// Produce the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        while let Some(c) = self.ch {
            if c.is_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }

        let start = self.pos();

        let Some(c) = self.ch else {
            return Ok(Token::new(TokenKind::Eof, start));
        };

        if c.is_alphabetic() || c == '_' {
            return self.scan_word(start);
        }
        if c.is_ascii_digit() {
            return self.scan_number(start);
        }

        match c {
            '"' => self.scan_string(),
            '=' => {
                self.next_char();
                Ok(Token::new(TokenKind::Eq, start))
            }
            '#' => {
                self.next_char();
                Ok(Token::new(TokenKind::Ne, start))
            }
            '>' => {
                self.next_char();
                if self.ch == Some('=') {
                    self.next_char();
                    Ok(Token::new(TokenKind::Ge, start))
                } else {
                    Ok(Token::new(TokenKind::Gt, start))
                }
            }
            '<' => {
                self.next_char();
                match self.ch {
                    Some('=') => {
                        self.next_char();
                        Ok(Token::new(TokenKind::Le, start))
                    }
                    Some('-') => {
                        self.next_char();
                        Ok(Token::new(TokenKind::Gets, start))
                    }
                    _ => Ok(Token::new(TokenKind::Lt, start)),
                }
            }
            '-' => {
                self.next_char();
                if self.ch == Some('>') {
                    self.next_char();
                    Ok(Token::new(TokenKind::To, start))
                } else {
                    Ok(Token::new(TokenKind::Minus, start))
                }
            }
            '+' => {
                self.next_char();
                Ok(Token::new(TokenKind::Plus, start))
            }
            '*' => {
                self.next_char();
                Ok(Token::new(TokenKind::Mul, start))
            }
            '/' => {
                self.next_char();
                Ok(Token::new(TokenKind::Div, start))
            }
            '&' => {
                self.next_char();
                Ok(Token::new(TokenKind::Ampersand, start))
            }
            '[' => {
                self.next_char();
                Ok(Token::new(TokenKind::LBrack, start))
            }
            ']' => {
                self.next_char();
                Ok(Token::new(TokenKind::RBrack, start))
            }
            ',' => {
                self.next_char();
                Ok(Token::new(TokenKind::Comma, start))
            }
            ';' => {
                self.next_char();
                Ok(Token::new(TokenKind::Semicolon, start))
            }
            '(' => {
                self.next_char();
                if self.ch == Some('*') {
                    self.next_char();
                    self.skip_comment(start)?;
                    self.next_token()
                } else {
                    Ok(Token::new(TokenKind::LPar, start))
                }
            }
            ')' => {
                self.next_char();
                Ok(Token::new(TokenKind::RPar, start))
            }
            other => Err(CompileError::IllegalCharacter {
                pos: start,
                ch: other,
                code: other as u32,
            }),
        }
    }

    fn scan_word(&mut self, start: SourcePos) -> Result<Token> {
        let mut lexeme = String::new();
        while let Some(c) = self.ch {
            if c.is_alphanumeric() || c == '_' {
                if lexeme.len() == self.max_id_length {
                    return Err(CompileError::IdentifierTooLong {
                        pos: start,
                        max: self.max_id_length,
                    });
                }
                lexeme.push(c);
                self.next_char();
            } else {
                break;
            }
        }

        let kind = lookup_reserved(&lexeme).unwrap_or(TokenKind::Ident(lexeme));
        Ok(Token::new(kind, start))
    }

    fn scan_number(&mut self, start: SourcePos) -> Result<Token> {
        let mut num: i32 = 0;
        while let Some(c) = self.ch {
            if !c.is_ascii_digit() {
                break;
            }
            let digit = c.to_digit(10).unwrap() as i32;
            if num > (i32::MAX - digit) / 10 {
                return Err(CompileError::NumberTooLarge { pos: start });
            }
            num = num * 10 + digit;
            self.next_char();
        }
        Ok(Token::new(TokenKind::Number(num), start))
    }

    fn scan_string(&mut self) -> Result<Token> {
        let start = self.pos();
        self.next_char(); // consume opening quote
        let mut s = String::new();
        loop {
            match self.ch {
                None => return Err(CompileError::StringNotClosed { pos: start }),
                Some('"') => {
                    self.next_char();
                    break;
                }
                Some('\\') => {
                    let escape_pos = self.pos();
                    self.next_char();
                    match self.ch {
                        Some(e @ ('n' | 't' | '"' | '\\')) => {
                            // Stored literally as two bytes (backslash, then
                            // the trailing character) so the emitter can
                            // forward the escape to Jasmin's own string
                            // escaping unchanged (spec.md §4.2).
                            s.push('\\');
                            s.push(e);
                            self.next_char();
                        }
                        Some(other) => {
                            return Err(CompileError::IllegalEscape {
                                pos: escape_pos,
                                ch: other,
                            })
                        }
                        None => return Err(CompileError::StringNotClosed { pos: start }),
                    }
                }
                Some(c) if c.is_ascii() && !c.is_control() => {
                    s.push(c);
                    self.next_char();
                }
                Some(c) => {
                    return Err(CompileError::NonPrintableInString {
                        pos: self.pos(),
                        code: c as u32,
                    })
                }
            }
        }
        Ok(Token::new(TokenKind::Str(s), start))
    }

    /// Skip a `(* ... *)` comment, which may nest arbitrarily. `start` is
    /// the position of the outermost `(*`; on an unterminated comment the
    /// error is reported there, not at the point EOF was reached
    /// (`scanner.c::skip_comment`).
    fn skip_comment(&mut self, start: SourcePos) -> Result<()> {
        let mut depth = 1u32;
        loop {
            match self.ch {
                None => return Err(CompileError::CommentNotClosed { pos: start }),
                Some('*') => {
                    self.next_char();
                    if self.ch == Some(')') {
                        self.next_char();
                        depth -= 1;
                        if depth == 0 {
                            return Ok(());
                        }
                    }
                }
                Some('(') => {
                    self.next_char();
                    if self.ch == Some('*') {
                        self.next_char();
                        depth += 1;
                    }
                }
                Some(_) => self.next_char(),
            }
        }
    }
}
