//! Card text parsing, Luhn checksums and number generation.

pub mod generator;
pub mod luhn;
pub mod parser;

pub use generator::{classification_prefix, generate_batch, DEFAULT_BATCH_SIZE};
pub use parser::{CardFormat, CardParser};
