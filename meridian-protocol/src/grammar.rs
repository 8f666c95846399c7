//! Declarative token grammar for command bodies
//!
//! A pattern is a sequence of [`Token`]s matched left to right. Integer
//! tokens append a [`Capture`]; literals only consume input. A pattern
//! matches a command only when it consumes the whole input.

use heapless::Vec;

use crate::frame::ParseError;

/// Maximum number of integer captures in one pattern
pub const MAX_CAPTURES: usize = 6;

/// A single grammar element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Exact text
    Literal(&'static str),
    /// One or more decimal digits
    UnsignedInt,
    /// Optional `+` or `-` followed by one or more decimal digits
    SignedInt,
}

/// A sequence of tokens
pub type Pattern = [Token];

/// Value captured by an integer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capture {
    Unsigned(u32),
    /// Sign kept separately so `-00` stays negative
    Signed { negative: bool, magnitude: u32 },
}

impl Capture {
    pub fn unsigned(self) -> Option<u32> {
        match self {
            Capture::Unsigned(value) => Some(value),
            Capture::Signed { .. } => None,
        }
    }

    pub fn signed(self) -> Option<(bool, u32)> {
        match self {
            Capture::Signed { negative, magnitude } => Some((negative, magnitude)),
            Capture::Unsigned(_) => None,
        }
    }
}

/// Captures collected by a successful match
pub type Captures = Vec<Capture, MAX_CAPTURES>;

/// Result of matching a pattern against a prefix of the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match<'a> {
    pub remaining: &'a str,
    pub captures: Captures,
}

fn take_digits(input: &str) -> Option<(u32, &str)> {
    let len = input.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 {
        return None;
    }

    let (digits, rest) = input.split_at(len);
    let mut value: u32 = 0;
    for digit in digits.bytes() {
        value = value.checked_mul(10)?.checked_add(u32::from(digit - b'0'))?;
    }
    Some((value, rest))
}

/// Match a single token, returning the unconsumed input
pub fn match_token<'a>(token: Token, input: &'a str, captures: &mut Captures) -> Option<&'a str> {
    match token {
        Token::Literal(text) => input.strip_prefix(text),
        Token::UnsignedInt => {
            let (value, rest) = take_digits(input)?;
            captures.push(Capture::Unsigned(value)).ok()?;
            Some(rest)
        }
        Token::SignedInt => {
            let (negative, digits) = match input.as_bytes().first() {
                Some(b'+') => (false, &input[1..]),
                Some(b'-') => (true, &input[1..]),
                _ => (false, input),
            };
            let (magnitude, rest) = take_digits(digits)?;
            captures
                .push(Capture::Signed {
                    negative,
                    magnitude,
                })
                .ok()?;
            Some(rest)
        }
    }
}

/// Match a pattern against a prefix of the input
///
/// Returns `None` as soon as one token fails; trailing input is allowed.
pub fn evaluate<'a>(pattern: &Pattern, input: &'a str) -> Option<Match<'a>> {
    let mut captures = Captures::new();
    let mut remaining = input;
    for &token in pattern {
        remaining = match_token(token, remaining, &mut captures)?;
    }
    Some(Match {
        remaining,
        captures,
    })
}

/// Match a pattern against the whole input
pub fn match_exact(pattern: &Pattern, input: &str) -> Result<Captures, ParseError> {
    match evaluate(pattern, input) {
        Some(Match {
            remaining: "",
            captures,
        }) => Ok(captures),
        _ => Err(ParseError::InvalidFormat),
    }
}

/// Match a pattern against the whole input and hand the captures to `on_match`
///
/// `on_match` runs only on a full match. Returns whether it ran.
pub fn eval<F>(pattern: &Pattern, input: &str, on_match: F) -> bool
where
    F: FnOnce(&[Capture]),
{
    match match_exact(pattern, input) {
        Ok(captures) => {
            on_match(&captures);
            true
        }
        Err(_) => false,
    }
}
