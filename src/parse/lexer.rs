use std::fmt;

use winnow::ascii::digit1;
use winnow::combinator::{alt, not, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

use crate::config::Lexing;
use crate::BinOp;

use super::ParseError;

/// One lexical unit of a rule string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Op(BinOp),
    LParen,
    RParen,
    /// A quoted literal (quotes included), a number, or an identifier.
    Operand(&'a str),
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Op(op) => write!(f, "{op}"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::Operand(text) => f.write_str(text),
        }
    }
}

// -- Grammar ----------------------------------------------------------------

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn quoted<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    alt((
        ('"', take_till(0.., '"'), '"').take(),
        ('\'', take_till(0.., '\''), '\'').take(),
    ))
    .parse_next(input)
}

fn keyword(input: &mut &str) -> ModalResult<BinOp> {
    terminated(
        alt((
            "NAND".value(BinOp::Nand),
            "XNOR".value(BinOp::Xnor),
            "AND".value(BinOp::And),
            "NOR".value(BinOp::Nor),
            "XOR".value(BinOp::Xor),
            "OR".value(BinOp::Or),
        )),
        not(one_of(is_word_char)),
    )
    .parse_next(input)
}

fn symbol(input: &mut &str) -> ModalResult<BinOp> {
    alt((
        ">=".value(BinOp::Gte),
        "<=".value(BinOp::Lte),
        "!=".value(BinOp::Neq),
        "==".value(BinOp::Eq),
        '='.value(BinOp::Assign),
        '>'.value(BinOp::Gt),
        '<'.value(BinOp::Lt),
        '+'.value(BinOp::Add),
        '-'.value(BinOp::Sub),
        '*'.value(BinOp::Mul),
        '/'.value(BinOp::Div),
        '%'.value(BinOp::Rem),
    ))
    .parse_next(input)
}

fn decimal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (digit1, '.', digit1).take().parse_next(input)
}

fn identifier<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (one_of(is_word_start), take_while(0.., is_word_char))
        .take()
        .parse_next(input)
}

fn token<'i>(input: &mut &'i str) -> ModalResult<Token<'i>> {
    alt((
        quoted.map(Token::Operand),
        keyword.map(Token::Op),
        symbol.map(Token::Op),
        '('.value(Token::LParen),
        ')'.value(Token::RParen),
        decimal.map(Token::Operand),
        identifier.map(Token::Operand),
    ))
    .parse_next(input)
}

// -- Lexer ------------------------------------------------------------------

/// Pull-based tokenizer over a rule string.
///
/// Yields `Err` at most once (only under [`Lexing::Strict`]) and is
/// exhausted afterwards. Cloning a lexer snapshots its position.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    rest: &'a str,
    lexing: Lexing,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            rest: source,
            lexing: Lexing::Lenient,
        }
    }

    #[must_use]
    pub fn with_lexing(mut self, lexing: Lexing) -> Self {
        self.lexing = lexing;
        self
    }

    /// Byte offset of the next unread character.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.source.len() - self.rest.len()
    }

    /// Read the next token, or `None` once the input is exhausted.
    ///
    /// # Errors
    ///
    /// Under [`Lexing::Strict`], returns [`ParseError::UnexpectedInput`] for
    /// the first character that starts no token.
    pub fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        loop {
            self.rest = self.rest.trim_start();
            let Some(found) = self.rest.chars().next() else {
                return Ok(None);
            };

            let mut input = self.rest;
            if let Ok(tok) = token(&mut input) {
                self.rest = input;
                return Ok(Some(tok));
            }

            let position = self.offset();
            match self.lexing {
                Lexing::Strict => {
                    self.rest = "";
                    return Err(ParseError::UnexpectedInput { position, found });
                }
                Lexing::Lenient => {
                    tracing::trace!(position, %found, "skipping unrecognized character");
                    self.rest = &self.rest[found.len_utf8()..];
                }
            }
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Lenient token stream returned by [`tokenize`]. Clone it to restart.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        // lenient lexers never fail
        self.lexer.next_token().ok().flatten()
    }
}

/// Split a rule string into tokens, dropping characters that start no token.
#[must_use]
pub fn tokenize(source: &str) -> Tokens<'_> {
    Tokens {
        lexer: Lexer::new(source),
    }
}

/// Tokenize eagerly under the given lexing mode.
///
/// # Errors
///
/// Returns [`ParseError::UnexpectedInput`] under [`Lexing::Strict`].
pub fn tokenize_with(source: &str, lexing: Lexing) -> Result<Vec<Token<'_>>, ParseError> {
    Lexer::new(source).with_lexing(lexing).collect()
}
