//! Boolean filter patterns over record ids and sequences.
//!
//! ```text
//! "Boophis" and not "Madagascar"
//! ("ACGT" or "TTGA") and not "NNNN"
//! ```
//!
//! Literals are double-quoted and matched as case-sensitive substrings.
//! Keywords `and`, `or`, `not` are case-insensitive. `and` and `or` share one
//! precedence level and group left to right, so `"a" or "b" and "c"` reads as
//! `("a" or "b") and "c"`. Use parentheses for anything else.
//!
//! Nesting of parentheses, `not` and operator chains is capped at
//! [`MAX_NESTING`] levels.

use crate::error::SyntaxError;
use crate::record::Record;

use memchr::memmem;
use std::fmt;
use std::str::FromStr;

/// Deepest expression tree a pattern may produce.
pub const MAX_NESTING: usize = 256;

/// Parsed filter pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Literal(String),
    Not(Box<FilterExpr>),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Or(Box<FilterExpr>, Box<FilterExpr>),
}

impl FilterExpr {
    pub fn parse(text: &str) -> Result<Self, SyntaxError> {
        if text.trim().is_empty() {
            return Err(SyntaxError::Empty);
        }
        let mut parser = Parser {
            tokens: Tokens::new(text),
            depth: 0,
        };
        let expr = parser.expr()?;
        match parser.tokens.next()? {
            None => Ok(expr),
            Some((offset, Token::Close)) => Err(SyntaxError::UnmatchedClose { offset }),
            Some((offset, tok)) => Err(tok.unexpected(offset)),
        }
    }

    /// Evaluate against `haystack`.
    pub fn matches(&self, haystack: &[u8]) -> bool {
        match self {
            FilterExpr::Literal(text) => memmem::find(haystack, text.as_bytes()).is_some(),
            FilterExpr::Not(inner) => !inner.matches(haystack),
            FilterExpr::And(l, r) => l.matches(haystack) && r.matches(haystack),
            FilterExpr::Or(l, r) => l.matches(haystack) || r.matches(haystack),
        }
    }
}

impl FromStr for FilterExpr {
    type Err = SyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterExpr::parse(s)
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Literal(text) => write!(f, "\"{text}\""),
            FilterExpr::Not(inner) => write!(f, "not {inner}"),
            FilterExpr::And(l, r) => write!(f, "({l} and {r})"),
            FilterExpr::Or(l, r) => write!(f, "({l} or {r})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open,
    Close,
    And,
    Or,
    Not,
    Literal(&'a str),
}

impl Token<'_> {
    fn unexpected(self, offset: usize) -> SyntaxError {
        let token = match self {
            Token::Open => "(".to_string(),
            Token::Close => ")".to_string(),
            Token::And => "and".to_string(),
            Token::Or => "or".to_string(),
            Token::Not => "not".to_string(),
            Token::Literal(text) => format!("\"{text}\""),
        };
        SyntaxError::UnexpectedToken { token, offset }
    }
}

/// Tokenizer with one token of lookahead.
struct Tokens<'a> {
    text: &'a str,
    pos: usize,
    peeked: Option<(usize, Token<'a>)>,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            peeked: None,
        }
    }

    fn peek(&mut self) -> Result<Option<(usize, Token<'a>)>, SyntaxError> {
        if self.peeked.is_none() {
            self.peeked = self.scan()?;
        }
        Ok(self.peeked)
    }

    fn next(&mut self) -> Result<Option<(usize, Token<'a>)>, SyntaxError> {
        match self.peeked.take() {
            Some(tok) => Ok(Some(tok)),
            None => self.scan(),
        }
    }

    fn scan(&mut self) -> Result<Option<(usize, Token<'a>)>, SyntaxError> {
        let rest = &self.text[self.pos..];
        let trimmed = rest.trim_start();
        let start = self.pos + (rest.len() - trimmed.len());
        let Some(c) = trimmed.chars().next() else {
            self.pos = self.text.len();
            return Ok(None);
        };

        let tok = match c {
            '(' => {
                self.pos = start + 1;
                Token::Open
            }
            ')' => {
                self.pos = start + 1;
                Token::Close
            }
            '"' => {
                let body = &trimmed[1..];
                let end = body
                    .find('"')
                    .ok_or(SyntaxError::UnterminatedLiteral { offset: start })?;
                self.pos = start + 1 + end + 1;
                Token::Literal(&body[..end])
            }
            _ => {
                let len = trimmed
                    .find(|ch: char| ch.is_whitespace() || matches!(ch, '(' | ')' | '"'))
                    .unwrap_or(trimmed.len());
                let word = &trimmed[..len];
                self.pos = start + len;
                if word.eq_ignore_ascii_case("and") {
                    Token::And
                } else if word.eq_ignore_ascii_case("or") {
                    Token::Or
                } else if word.eq_ignore_ascii_case("not") {
                    Token::Not
                } else {
                    return Err(SyntaxError::UnexpectedToken {
                        token: word.to_string(),
                        offset: start,
                    });
                }
            }
        };
        Ok(Some((start, tok)))
    }
}

struct Parser<'a> {
    tokens: Tokens<'a>,
    // Upper bound on the depth of the tree built so far.
    depth: usize,
}

impl Parser<'_> {
    fn descend(&mut self, offset: usize) -> Result<(), SyntaxError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(SyntaxError::TooDeep {
                limit: MAX_NESTING,
                offset,
            });
        }
        Ok(())
    }

    // expr := term (("and"|"or") term)*
    fn expr(&mut self) -> Result<FilterExpr, SyntaxError> {
        let base = self.depth;
        let mut lhs = self.term()?;
        loop {
            match self.tokens.peek()? {
                Some((offset, Token::And)) => {
                    self.tokens.next()?;
                    self.descend(offset)?;
                    let rhs = self.term()?;
                    lhs = FilterExpr::And(Box::new(lhs), Box::new(rhs));
                }
                Some((offset, Token::Or)) => {
                    self.tokens.next()?;
                    self.descend(offset)?;
                    let rhs = self.term()?;
                    lhs = FilterExpr::Or(Box::new(lhs), Box::new(rhs));
                }
                _ => {
                    self.depth = base;
                    return Ok(lhs);
                }
            }
        }
    }

    // term := "not" term | atom
    fn term(&mut self) -> Result<FilterExpr, SyntaxError> {
        if let Some((offset, Token::Not)) = self.tokens.peek()? {
            self.tokens.next()?;
            self.descend(offset)?;
            let inner = self.term()?;
            self.depth -= 1;
            return Ok(FilterExpr::Not(Box::new(inner)));
        }
        self.atom()
    }

    // atom := literal | "(" expr ")"
    fn atom(&mut self) -> Result<FilterExpr, SyntaxError> {
        match self.tokens.next()? {
            None => Err(SyntaxError::UnexpectedEnd),
            Some((_, Token::Literal(text))) => Ok(FilterExpr::Literal(text.to_string())),
            Some((open, Token::Open)) => {
                self.descend(open)?;
                let inner = self.expr()?;
                match self.tokens.next()? {
                    Some((_, Token::Close)) => {
                        self.depth -= 1;
                        Ok(inner)
                    }
                    None => Err(SyntaxError::UnclosedParen { offset: open }),
                    Some((offset, tok)) => Err(tok.unexpected(offset)),
                }
            }
            Some((offset, Token::Close)) => Err(SyntaxError::UnmatchedClose { offset }),
            Some((offset, tok)) => Err(tok.unexpected(offset)),
        }
    }
}

/// Optional seqid and sequence patterns applied together.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    seqid: Option<FilterExpr>,
    sequence: Option<FilterExpr>,
}

impl RecordFilter {
    /// Accepts every record.
    pub const fn empty() -> Self {
        Self {
            seqid: None,
            sequence: None,
        }
    }

    /// Build from pattern text. Missing or blank patterns are not applied.
    pub fn new(seqid: Option<&str>, sequence: Option<&str>) -> Result<Self, SyntaxError> {
        let parse = |p: Option<&str>| {
            p.filter(|s| !s.trim().is_empty())
                .map(FilterExpr::parse)
                .transpose()
        };
        Ok(Self {
            seqid: parse(seqid)?,
            sequence: parse(sequence)?,
        })
    }

    pub fn seqid(&self) -> Option<&FilterExpr> {
        self.seqid.as_ref()
    }

    pub fn sequence(&self) -> Option<&FilterExpr> {
        self.sequence.as_ref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seqid.is_none() && self.sequence.is_none()
    }

    pub fn accepts(&self, rec: &Record) -> bool {
        self.seqid
            .as_ref()
            .is_none_or(|p| p.matches(rec.id().as_bytes()))
            && self.sequence.as_ref().is_none_or(|p| p.matches(rec.seq()))
    }
}
