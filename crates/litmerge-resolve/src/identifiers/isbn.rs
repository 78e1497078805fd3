use std::fmt;

use crate::error::{ResolveError, Result};

/// A checksum-valid ISBN-13, the form every identifier is compared in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalIsbn(String);

impl CanonicalIsbn {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalIsbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Isbn {
    pub raw: String,
    pub isbn13: String,
    pub isbn10: Option<String>,
    pub formatted: String,
}

/// Canonical ISBN-13 for a raw ISBN-10 or ISBN-13 string, or `None` when the
/// input is blank, a placeholder, or fails its checksum.
pub fn normalize_identifier(raw: &str) -> Option<CanonicalIsbn> {
    Isbn::parse(raw).ok().map(|isbn| CanonicalIsbn(isbn.isbn13))
}

fn strip_isbn(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

fn check_isbn10(digits: &[u8]) -> bool {
    // digits[9] may be 10 (X)
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| (10 - i as u32) * d as u32)
        .sum();
    sum % 11 == 0
}

fn isbn13_weighted_sum(digits: &[u8]) -> u32 {
    digits
        .iter()
        .enumerate()
        .map(|(i, &d)| if i % 2 == 0 { d as u32 } else { d as u32 * 3 })
        .sum()
}

fn check_isbn13(digits: &[u8]) -> bool {
    isbn13_weighted_sum(digits) % 10 == 0
}

/// Prefix 978, keep the nine body digits, recompute the mod-10 check digit.
fn isbn10_to_isbn13(digits10: &[u8]) -> String {
    let mut d13: Vec<u8> = vec![9, 7, 8];
    d13.extend_from_slice(&digits10[..9]);
    let check = (10 - (isbn13_weighted_sum(&d13) % 10)) % 10;
    d13.push(check as u8);
    digits_to_string(&d13)
}

/// Only 978-prefixed ISBN-13s have an ISBN-10 form.
fn isbn13_to_isbn10(digits13: &[u8]) -> Option<String> {
    if digits13[..3] != [9, 7, 8] {
        return None;
    }
    let body = &digits13[3..12];
    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, &d)| (10 - i as u32) * d as u32)
        .sum();
    let check = (11 - (sum % 11)) % 11;
    let mut s = digits_to_string(body);
    s.push(if check == 10 {
        'X'
    } else {
        char::from(b'0' + check as u8)
    });
    Some(s)
}

fn digits_to_string(digits: &[u8]) -> String {
    digits.iter().map(|&d| char::from(b'0' + d)).collect()
}

fn format_isbn13(s: &str) -> String {
    // Registrant ranges vary by group; use a fixed 3-1-4-4-1 grouping.
    if s.len() == 13 {
        format!(
            "{}-{}-{}-{}-{}",
            &s[0..3],
            &s[3..4],
            &s[4..8],
            &s[8..12],
            &s[12..13]
        )
    } else {
        s.to_string()
    }
}

impl Isbn {
    pub fn parse(input: &str) -> Result<Self> {
        let stripped = strip_isbn(input);
        let invalid = || ResolveError::InvalidIsbn(input.to_string());

        if stripped.len() == 13 {
            let digits: Vec<u8> = stripped
                .chars()
                .map(|c| c.to_digit(10).map(|d| d as u8))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(invalid)?;
            if !check_isbn13(&digits) {
                return Err(invalid());
            }
            let isbn10 = isbn13_to_isbn10(&digits);
            let formatted = format_isbn13(&stripped);
            return Ok(Self {
                raw: input.to_string(),
                isbn13: stripped,
                isbn10,
                formatted,
            });
        }

        if stripped.len() == 10 {
            // Last char may be X
            let mut digits: Vec<u8> = Vec::with_capacity(10);
            for (i, c) in stripped.chars().enumerate() {
                match c.to_digit(10) {
                    Some(d) => digits.push(d as u8),
                    None if i == 9 && c == 'X' => digits.push(10),
                    None => return Err(invalid()),
                }
            }
            if !check_isbn10(&digits) {
                return Err(invalid());
            }
            let isbn13 = isbn10_to_isbn13(&digits);
            let formatted = format_isbn13(&isbn13);
            return Ok(Self {
                raw: input.to_string(),
                isbn13,
                isbn10: Some(stripped),
                formatted,
            });
        }

        Err(invalid())
    }

    pub fn canonical(&self) -> CanonicalIsbn {
        CanonicalIsbn(self.isbn13.clone())
    }
}
