//! BIN metadata lookup.
//!
//! Lookups are best effort: callers receive `None` on any failure and carry
//! on without issuer metadata.

mod client;

pub use client::{BinLookupClient, DEFAULT_BIN_API_URL};

use crate::types::{BinInfo, CardgenError, Result};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::info;

/// Source of issuer metadata for a six-digit BIN.
pub trait BinLookup {
    fn lookup(&self, bin: &str) -> impl Future<Output = Option<BinInfo>> + Send;
}

/// `None` disables lookups entirely.
impl<L: BinLookup + Sync> BinLookup for Option<L> {
    async fn lookup(&self, bin: &str) -> Option<BinInfo> {
        match self {
            Some(inner) => inner.lookup(bin).await,
            None => None,
        }
    }
}

/// Outcome of a standalone BIN query.
#[derive(Debug, Clone)]
pub struct BinReport {
    /// The six digits actually queried.
    pub bin: String,
    pub info: Option<BinInfo>,
    pub elapsed: Duration,
}

/// Reduce a raw BIN argument to six digits.
///
/// Takes the first six digits found anywhere in `raw` and right-pads with `0`.
pub fn normalize_bin_query(raw: &str) -> Result<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).take(6).collect();
    if digits.is_empty() {
        return Err(CardgenError::InvalidBin(raw.to_string()));
    }
    Ok(format!("{:0<6}", digits))
}

/// Normalize `raw` and look it up.
pub async fn query_bin<L: BinLookup>(lookup: &L, raw: &str) -> Result<BinReport> {
    let bin = normalize_bin_query(raw)?;
    info!("Looking up BIN {}", bin);

    let start = Instant::now();
    let info = lookup.lookup(&bin).await;

    Ok(BinReport {
        bin,
        info,
        elapsed: start.elapsed(),
    })
}
