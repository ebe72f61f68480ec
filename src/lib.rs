//! cardgen - Telegram bot generating Luhn-valid test card numbers.
//!
//! This library provides:
//! - A multi-layout parser for card patterns with `x` wildcards, expiry and CVV
//! - Luhn check digit computation
//! - Batch generation honoring brand-dependent lengths
//! - Best-effort BIN metadata lookup
//! - Generate / regenerate sessions backed by an injectable store
//!
//! # Example
//!
//! ```no_run
//! use cardgen::lookup::BinLookupClient;
//! use cardgen::session::{GenerationSession, MemorySessionStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let lookup = BinLookupClient::new(cardgen::lookup::DEFAULT_BIN_API_URL, 5, 5).unwrap();
//!     let session = GenerationSession::new(lookup, MemorySessionStore::new());
//!     let report = session.generate("411111xxxxxxxxxx|12|2026").await;
//!     for card in &report.cards {
//!         println!("{}", card);
//!     }
//! }
//! ```

pub mod bot;
pub mod card;
pub mod config;
pub mod lookup;
pub mod session;
pub mod types;

pub use config::{BinConfig, Commands, Config, GenConfig, ServeConfig};
pub use session::{GenerationReport, GenerationSession, MemorySessionStore, SessionStore};
pub use types::{
    BinInfo, CardSpec, CardgenError, Cvv, GeneratedCard, MonthYear, Result, SessionRecord,
};
