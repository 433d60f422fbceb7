//! Strict parsing against caller-supplied token patterns.
//!
//! Supported tokens: `YYYY YY MMMM MMM MM M DD D HH H hh h mm m ss s`,
//! runs of `S` (fractional seconds), `A a` (meridiem), `Z ZZ` (offset),
//! `X` (epoch seconds), `x` (epoch milliseconds) and `[...]` for literal
//! text. Every other pattern character must appear verbatim in the input.
//! The whole input has to be consumed; there is no fallback.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::grammar::fraction_to_millis;

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Year4,
    Year2,
    MonthName,
    MonthAbbr,
    Month2,
    Month,
    Day2,
    Day,
    Hour2,
    Hour,
    Hour12Padded,
    Hour12,
    Minute2,
    Minute,
    Second2,
    Second,
    Fraction(usize),
    Meridiem,
    Offset,
    UnixSeconds,
    UnixMillis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Field(Token),
    Literal(String),
}

/// Longest aliases first so `MMMM` wins over `MM`.
const TOKENS: &[(&str, Token)] = &[
    ("YYYY", Token::Year4),
    ("MMMM", Token::MonthName),
    ("MMM", Token::MonthAbbr),
    ("YY", Token::Year2),
    ("MM", Token::Month2),
    ("DD", Token::Day2),
    ("HH", Token::Hour2),
    ("hh", Token::Hour12Padded),
    ("mm", Token::Minute2),
    ("ss", Token::Second2),
    ("ZZ", Token::Offset),
    ("M", Token::Month),
    ("D", Token::Day),
    ("H", Token::Hour),
    ("h", Token::Hour12),
    ("m", Token::Minute),
    ("s", Token::Second),
    ("A", Token::Meridiem),
    ("a", Token::Meridiem),
    ("Z", Token::Offset),
    ("X", Token::UnixSeconds),
    ("x", Token::UnixMillis),
];

fn tokenize(pattern: &str) -> Vec<Piece> {
    let mut tokens = Vec::new();
    let mut rest = pattern;
    while let Some(ch) = rest.chars().next() {
        if ch == '[' {
            let body = &rest[1..];
            let end = body.find(']').unwrap_or(body.len());
            tokens.push(Piece::Literal(body[..end].to_string()));
            rest = body.get(end + 1..).unwrap_or_default();
            continue;
        }
        if ch == 'S' {
            let run = rest.chars().take_while(|c| *c == 'S').count();
            tokens.push(Piece::Field(Token::Fraction(run)));
            rest = &rest[run..];
            continue;
        }
        if let Some((alias, token)) = TOKENS.iter().find(|(alias, _)| rest.starts_with(alias)) {
            tokens.push(Piece::Field(*token));
            rest = &rest[alias.len()..];
            continue;
        }
        tokens.push(Piece::Literal(ch.to_string()));
        rest = &rest[ch.len_utf8()..];
    }
    tokens
}

/// Fields read from the input. Anything the pattern did not mention stays
/// `None` and is defaulted when the value is assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Parsed {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub hour: Option<u32>,
    pub minute: Option<u32>,
    pub second: Option<u32>,
    pub millis: Option<u32>,
    pub pm: Option<bool>,
    pub twelve_hour: bool,
    pub offset: Option<FixedOffset>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Parsed {
    /// Assemble a wall-clock reading. Missing year falls back to
    /// `default_year`, missing month/day to 1, missing time fields to 0.
    pub(crate) fn wall_clock(&self, default_year: i32) -> Option<NaiveDateTime> {
        let mut hour = self.hour.unwrap_or(0);
        if self.twelve_hour && !(1..=12).contains(&hour) {
            return None;
        }
        match self.pm {
            Some(true) if hour < 12 => hour += 12,
            Some(false) if hour == 12 => hour = 0,
            _ => {}
        }
        NaiveDate::from_ymd_opt(
            self.year.unwrap_or(default_year),
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
        )?
        .and_hms_milli_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.millis.unwrap_or(0),
        )
    }
}

struct Cursor<'a> {
    rest: &'a str,
}

impl<'a> Cursor<'a> {
    fn digits(&mut self, min: usize, max: usize) -> Option<&'a str> {
        let len = self
            .rest
            .bytes()
            .take(max)
            .take_while(u8::is_ascii_digit)
            .count();
        if len < min {
            return None;
        }
        let (head, tail) = self.rest.split_at(len);
        self.rest = tail;
        Some(head)
    }

    fn number(&mut self, min: usize, max: usize) -> Option<u32> {
        self.digits(min, max)?.parse().ok()
    }

    fn signed_integer(&mut self) -> Option<i64> {
        let negative = self.eat("-");
        let value: i64 = self.digits(1, 18)?.parse().ok()?;
        Some(if negative { -value } else { value })
    }

    fn eat(&mut self, literal: &str) -> bool {
        match self.rest.strip_prefix(literal) {
            Some(tail) => {
                self.rest = tail;
                true
            }
            None => false,
        }
    }

    fn eat_ignore_case(&mut self, word: &str) -> bool {
        match self.rest.get(..word.len()) {
            Some(head) if head.eq_ignore_ascii_case(word) => {
                self.rest = &self.rest[word.len()..];
                true
            }
            _ => false,
        }
    }

    fn month_name(&mut self, abbreviated: bool) -> Option<u32> {
        let index = MONTH_NAMES.iter().position(|name| {
            let name: &str = if abbreviated { &name[..3] } else { name };
            self.eat_ignore_case(name)
        })?;
        Some(index as u32 + 1)
    }

    fn offset(&mut self) -> Option<FixedOffset> {
        if self.eat("Z") || self.eat("z") {
            return FixedOffset::east_opt(0);
        }
        let sign = if self.eat("+") {
            1
        } else if self.eat("-") {
            -1
        } else {
            return None;
        };
        let hours = self.number(2, 2)? as i32;
        self.eat(":");
        let minutes = self.number(2, 2)? as i32;
        if minutes >= 60 {
            return None;
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
    }
}

/// Parse `text` against `pattern`. `None` when the text does not match.
pub(crate) fn parse(text: &str, pattern: &str) -> Option<Parsed> {
    let mut cursor = Cursor { rest: text };
    let mut parsed = Parsed::default();
    for piece in tokenize(pattern) {
        let token = match piece {
            Piece::Field(token) => token,
            Piece::Literal(text) => {
                if !cursor.eat(&text) {
                    return None;
                }
                continue;
            }
        };
        match token {
            Token::Year4 => parsed.year = Some(cursor.digits(4, 4)?.parse().ok()?),
            Token::Year2 => {
                let yy = cursor.number(2, 2)? as i32;
                parsed.year = Some(yy + if yy > 68 { 1900 } else { 2000 });
            }
            Token::MonthName => parsed.month = Some(cursor.month_name(false)?),
            Token::MonthAbbr => parsed.month = Some(cursor.month_name(true)?),
            Token::Month2 => parsed.month = Some(cursor.number(2, 2)?),
            Token::Month => parsed.month = Some(cursor.number(1, 2)?),
            Token::Day2 => parsed.day = Some(cursor.number(2, 2)?),
            Token::Day => parsed.day = Some(cursor.number(1, 2)?),
            Token::Hour2 => parsed.hour = Some(cursor.number(2, 2)?),
            Token::Hour => parsed.hour = Some(cursor.number(1, 2)?),
            Token::Hour12Padded => {
                parsed.hour = Some(cursor.number(2, 2)?);
                parsed.twelve_hour = true;
            }
            Token::Hour12 => {
                parsed.hour = Some(cursor.number(1, 2)?);
                parsed.twelve_hour = true;
            }
            Token::Minute2 => parsed.minute = Some(cursor.number(2, 2)?),
            Token::Minute => parsed.minute = Some(cursor.number(1, 2)?),
            Token::Second2 => parsed.second = Some(cursor.number(2, 2)?),
            Token::Second => parsed.second = Some(cursor.number(1, 2)?),
            Token::Fraction(width) => {
                parsed.millis = Some(fraction_to_millis(cursor.digits(width, width)?)?)
            }
            Token::Meridiem => {
                parsed.pm = if cursor.eat_ignore_case("pm") {
                    Some(true)
                } else if cursor.eat_ignore_case("am") {
                    Some(false)
                } else {
                    return None;
                };
            }
            Token::Offset => parsed.offset = Some(cursor.offset()?),
            Token::UnixSeconds => {
                let negative = cursor.eat("-");
                let seconds: i64 = cursor.digits(1, 18)?.parse().ok()?;
                let millis = if cursor.eat(".") {
                    i64::from(fraction_to_millis(cursor.digits(1, 9)?)?)
                } else {
                    0
                };
                let total = seconds.checked_mul(1000)?.checked_add(millis)?;
                let total = if negative { -total } else { total };
                parsed.timestamp = Some(DateTime::from_timestamp_millis(total)?);
            }
            Token::UnixMillis => {
                parsed.timestamp = Some(DateTime::from_timestamp_millis(cursor.signed_integer()?)?);
            }
        }
    }
    cursor.rest.is_empty().then_some(parsed)
}
