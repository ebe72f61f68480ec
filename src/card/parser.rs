//! Free-form card text parser.
//!
//! Recognizes a card number (with optional `x` wildcards), an optional
//! expiration date and an optional CVV across the layouts users actually
//! paste. Layouts are tried in [`CardFormat::PRIORITY`] order and the first
//! match wins; input that matches nothing degrades to [`CardSpec::fallback`].

use crate::types::{CardSpec, Cvv, MonthYear, WILDCARD};
use regex::Regex;
use tracing::{debug, trace};

/// Input layouts understood by [`CardParser`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardFormat {
    /// `NUM|MM|YYYY|CVV`
    PipeFullYear,
    /// `NUM|MM|YY|CVV`
    PipeShortYear,
    /// `NUM/MM/YYYY/CVV`
    SlashFullYearCvv,
    /// `NUM/MM/YY/CVV`, year 2-4 digits
    SlashCvv,
    /// `NUM/MM/YYYY`
    SlashFullYear,
    /// `NUM/MM/YY`, year 2-4 digits
    SlashNoCvv,
    /// `NUM MM/YYYY CVV`
    SpacedFullYear,
    /// `NUM MM/YY CVV`, year 2-4 digits
    SpacedCvv,
    /// `NUM MM YY CVV`, year 2-4 digits
    SpaceSeparated,
    /// `NUM`
    NumberOnly,
}

impl CardFormat {
    /// Match order. Strict 4-digit-year layouts precede their 2-4 digit
    /// counterparts so equivalent inputs always resolve to the same layout.
    pub const PRIORITY: [CardFormat; 10] = [
        CardFormat::PipeFullYear,
        CardFormat::PipeShortYear,
        CardFormat::SlashFullYearCvv,
        CardFormat::SlashCvv,
        CardFormat::SlashFullYear,
        CardFormat::SlashNoCvv,
        CardFormat::SpacedFullYear,
        CardFormat::SpacedCvv,
        CardFormat::SpaceSeparated,
        CardFormat::NumberOnly,
    ];

    /// Anchored pattern over normalized (upper-cased) input.
    fn pattern(self) -> &'static str {
        match self {
            CardFormat::PipeFullYear => {
                r"^(?P<num>[0-9X]{6,19})\|(?P<month>[0-9]{1,2})\|(?P<year>[0-9]{4})\|(?P<cvv>[0-9]{3,4})$"
            }
            CardFormat::PipeShortYear => {
                r"^(?P<num>[0-9X]{6,19})\|(?P<month>[0-9]{1,2})\|(?P<year>[0-9]{2})\|(?P<cvv>[0-9]{3,4})$"
            }
            CardFormat::SlashFullYearCvv => {
                r"^(?P<num>[0-9X]{6,19})/(?P<month>[0-9]{1,2})/(?P<year>[0-9]{4})/(?P<cvv>[0-9]{3,4})$"
            }
            CardFormat::SlashCvv => {
                r"^(?P<num>[0-9X]{6,19})/(?P<month>[0-9]{1,2})/(?P<year>[0-9]{2,4})/(?P<cvv>[0-9]{3,4})$"
            }
            CardFormat::SlashFullYear => {
                r"^(?P<num>[0-9X]{6,19})/(?P<month>[0-9]{1,2})/(?P<year>[0-9]{4})$"
            }
            CardFormat::SlashNoCvv => {
                r"^(?P<num>[0-9X]{6,19})/(?P<month>[0-9]{1,2})/(?P<year>[0-9]{2,4})$"
            }
            CardFormat::SpacedFullYear => {
                r"^(?P<num>[0-9X]{6,19})\s+(?P<month>[0-9]{1,2})/(?P<year>[0-9]{4})\s+(?P<cvv>[0-9]{3,4})$"
            }
            CardFormat::SpacedCvv => {
                r"^(?P<num>[0-9X]{6,19})\s+(?P<month>[0-9]{1,2})/(?P<year>[0-9]{2,4})\s+(?P<cvv>[0-9]{3,4})$"
            }
            CardFormat::SpaceSeparated => {
                r"^(?P<num>[0-9X]{6,19})\s+(?P<month>[0-9]{1,2})\s+(?P<year>[0-9]{2,4})\s+(?P<cvv>[0-9]{3,4})$"
            }
            CardFormat::NumberOnly => r"^(?P<num>[0-9X]{6,19})$",
        }
    }
}

/// Parser holding the compiled layout patterns in priority order.
#[derive(Clone)]
pub struct CardParser {
    patterns: Vec<(CardFormat, Regex)>,
}

impl CardParser {
    /// Create a new parser with all layout patterns compiled.
    pub fn new() -> Self {
        let patterns = CardFormat::PRIORITY
            .iter()
            .map(|&format| {
                let re = Regex::new(format.pattern()).expect("card layout pattern is valid");
                (format, re)
            })
            .collect();

        Self { patterns }
    }

    /// Parse free-form text into a [`CardSpec`]. Never fails.
    pub fn parse(&self, text: &str) -> CardSpec {
        self.parse_with_format(text)
            .map(|(_, spec)| spec)
            .unwrap_or_else(|| {
                debug!("No card layout matched, using fallback");
                CardSpec::fallback()
            })
    }

    /// Parse and report which layout matched, or `None` if nothing did.
    pub fn parse_with_format(&self, text: &str) -> Option<(CardFormat, CardSpec)> {
        let normalized = normalize(text);

        for (format, re) in &self.patterns {
            let Some(caps) = re.captures(&normalized) else {
                continue;
            };
            trace!("Matched layout {:?}: {}", format, normalized);

            let card_number = caps["num"].replace('X', &WILDCARD.to_string());

            let month_year = match (caps.name("month"), caps.name("year")) {
                (Some(month), Some(year)) => MonthYear::Known {
                    month: format!("{:0>2}", month.as_str()),
                    year: shorten_year(year.as_str()).to_string(),
                },
                _ => MonthYear::Unknown,
            };

            let cvv = caps
                .name("cvv")
                .map(|m| Cvv::Known(m.as_str().to_string()))
                .unwrap_or(Cvv::Unknown);

            return Some((
                *format,
                CardSpec {
                    card_number,
                    month_year,
                    cvv,
                },
            ));
        }

        None
    }
}

impl Default for CardParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse whitespace runs, trim and upper-case.
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Keep the last two digits of a 4-digit year; other lengths pass through.
fn shorten_year(year: &str) -> &str {
    match year.char_indices().nth(2) {
        Some((start, _)) if year.chars().count() == 4 => &year[start..],
        _ => year,
    }
}
