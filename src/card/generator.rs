//! Synthetic card number generation.
//!
//! Numbers keep the fixed digits of a base pattern, fill wildcards and any
//! missing tail with random digits, and end with a computed Luhn check digit.
//! All randomness comes from the caller's RNG so batches can be reproduced
//! with a seeded generator.

use crate::card::luhn;
use crate::types::{Cvv, GeneratedCard, MonthYear};
use rand::Rng;

/// Default number of cards per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Inclusive range of years drawn when the user gave no date.
pub const YEAR_RANGE: std::ops::RangeInclusive<u32> = 2025..=2035;

/// Total card length implied by a BIN prefix.
///
/// Amex-style (`3`) numbers are 15 long, UnionPay-style (`62`) 19, everything
/// else 16. This is deliberately not a full issuer table.
pub fn card_length(prefix: &str) -> usize {
    if prefix.starts_with('3') {
        15
    } else if prefix.starts_with("62") {
        19
    } else {
        16
    }
}

/// Six-digit prefix used for length classification and BIN lookups.
///
/// Takes the digits among the first six characters of `base_card` and
/// right-pads with `0`. The padding never reaches generated numbers.
pub fn classification_prefix(base_card: &str) -> String {
    let digits: String = base_card
        .chars()
        .take(6)
        .filter(|c| c.is_ascii_digit())
        .collect();
    format!("{:0<6}", digits)
}

/// Expected CVV length for a complete number.
pub fn cvv_length(number: &str) -> usize {
    if number.starts_with('3') && number.len() == 15 {
        4
    } else {
        3
    }
}

/// Generate one complete number of `total_length` digits from `base_card`.
pub fn generate_one<R: Rng + ?Sized>(base_card: &str, total_length: usize, rng: &mut R) -> String {
    let body_length = total_length.saturating_sub(1);

    let mut body: String = base_card
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, 'x' | 'X'))
        .map(|c| {
            if c.is_ascii_digit() {
                c
            } else {
                random_digit(rng)
            }
        })
        .collect();

    // Fixed positions beyond the body length are dropped from the tail.
    body.truncate(body_length);
    while body.len() < body_length {
        body.push(random_digit(rng));
    }

    let check = luhn::check_digit(&body);
    body.push(char::from(b'0' + check));
    debug_assert!(
        total_length < 2 || luhn::is_valid(&body),
        "generated number fails Luhn: {}",
        body
    );
    body
}

/// Generate `count` independent numbers sharing `base_card`'s fixed digits.
///
/// Collisions inside a batch are possible and not filtered.
pub fn generate_batch<R: Rng + ?Sized>(base_card: &str, count: usize, rng: &mut R) -> Vec<String> {
    let total_length = card_length(&classification_prefix(base_card));
    (0..count)
        .map(|_| generate_one(base_card, total_length, rng))
        .collect()
}

/// Attach expiry and CVV to each generated number.
///
/// A concrete month/year is reused for every card; otherwise each card gets
/// its own random date. A concrete CVV is reused unless its length disagrees
/// with the card's brand, in which case a fresh one of the right length is drawn.
pub fn resolve_cards<R: Rng + ?Sized>(
    numbers: Vec<String>,
    month: Option<&str>,
    year: Option<&str>,
    cvv: &Cvv,
    rng: &mut R,
) -> Vec<GeneratedCard> {
    numbers
        .into_iter()
        .map(|number| {
            let (month, year) = match (month, year) {
                (Some(m), Some(y)) => (m.to_string(), y.to_string()),
                _ => (
                    format!("{:02}", rng.random_range(1..=12u32)),
                    rng.random_range(YEAR_RANGE).to_string(),
                ),
            };

            let wanted = cvv_length(&number);
            let cvv = match cvv {
                Cvv::Known(code) if code.len() == wanted => code.clone(),
                _ => random_cvv(wanted, rng),
            };

            GeneratedCard {
                number,
                month,
                year,
                cvv,
            }
        })
        .collect()
}

/// Split a parsed date into the month and four-digit year reused per card.
pub fn resolve_date(month_year: &MonthYear) -> (Option<String>, Option<String>) {
    match month_year {
        MonthYear::Unknown => (None, None),
        MonthYear::Known { month, year } => {
            let year = if year.len() == 2 {
                format!("20{}", year)
            } else {
                year.clone()
            };
            (Some(month.clone()), Some(year))
        }
    }
}

fn random_digit<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(b'0' + rng.random_range(0..10u8))
}

fn random_cvv<R: Rng + ?Sized>(length: usize, rng: &mut R) -> String {
    if length == 4 {
        rng.random_range(1000..=9999u32).to_string()
    } else {
        rng.random_range(100..=999u32).to_string()
    }
}
