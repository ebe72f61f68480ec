//! Generate and regenerate card batches.
//!
//! A generation parses the user's text, looks up the BIN, produces a batch
//! and stores the base parameters under a fresh session id. Regenerating that
//! id reruns the lookup and the batch with the stored parameters; the record
//! itself is never modified.

mod store;

pub use store::{MemorySessionStore, SessionStore};

use crate::card::{classification_prefix, generator, CardParser, DEFAULT_BATCH_SIZE};
use crate::lookup::BinLookup;
use crate::types::{BinInfo, CardgenError, GeneratedCard, Result, SessionRecord};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Prefix of every minted session id.
pub const SESSION_ID_PREFIX: &str = "regen_";

/// Result of a generation or regeneration.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub session_id: String,
    pub record: SessionRecord,
    pub cards: Vec<GeneratedCard>,
    pub bin_info: Option<BinInfo>,
    pub elapsed: Duration,
}

/// Orchestrates generation requests over an injected lookup and store.
pub struct GenerationSession<L, S> {
    lookup: L,
    store: S,
    parser: CardParser,
    rng: Mutex<StdRng>,
    batch_size: usize,
}

impl<L: BinLookup, S: SessionStore> GenerationSession<L, S> {
    /// Create a session seeded from the operating system.
    pub fn new(lookup: L, store: S) -> Self {
        Self::with_rng(lookup, store, StdRng::from_os_rng())
    }

    /// Create a session drawing from the given RNG.
    pub fn with_rng(lookup: L, store: S, rng: StdRng) -> Self {
        Self {
            lookup,
            store,
            parser: CardParser::new(),
            rng: Mutex::new(rng),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the number of cards per batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    /// Parse `text`, generate a batch and remember it under a new session id.
    pub async fn generate(&self, text: &str) -> GenerationReport {
        let start = Instant::now();

        let spec = self.parser.parse(text);
        debug!("Parsed card spec: {:?}", spec);

        let (resolved_month, resolved_year) = generator::resolve_date(&spec.month_year);
        let record = SessionRecord {
            bin_prefix: classification_prefix(&spec.card_number),
            base_card: spec.card_number,
            base_month_year: spec.month_year,
            base_cvv: spec.cvv,
            resolved_month,
            resolved_year,
        };

        let bin_info = self.lookup.lookup(&record.bin_prefix).await;
        let (session_id, cards) = {
            let mut rng = self.rng.lock();
            let cards = self.draw_cards(&record, &mut *rng);
            (self.mint_session_id(&mut *rng), cards)
        };

        self.store.put(&session_id, record.clone());
        info!(
            "Generated {} cards for {} (session {})",
            cards.len(),
            record.base_card,
            session_id
        );

        GenerationReport {
            session_id,
            record,
            cards,
            bin_info,
            elapsed: start.elapsed(),
        }
    }

    /// Produce a fresh batch for a previously minted session id.
    pub async fn regenerate(&self, session_id: &str) -> Result<GenerationReport> {
        let start = Instant::now();

        let record = self
            .store
            .get(session_id)
            .ok_or_else(|| CardgenError::SessionNotFound(session_id.to_string()))?;

        let bin_info = self.lookup.lookup(&record.bin_prefix).await;
        let cards = {
            let mut rng = self.rng.lock();
            self.draw_cards(&record, &mut *rng)
        };
        info!("Regenerated {} cards for session {}", cards.len(), session_id);

        Ok(GenerationReport {
            session_id: session_id.to_string(),
            record,
            cards,
            bin_info,
            elapsed: start.elapsed(),
        })
    }

    fn draw_cards<R: Rng + ?Sized>(&self, record: &SessionRecord, rng: &mut R) -> Vec<GeneratedCard> {
        let numbers = generator::generate_batch(&record.base_card, self.batch_size, rng);
        generator::resolve_cards(
            numbers,
            record.resolved_month.as_deref(),
            record.resolved_year.as_deref(),
            &record.base_cvv,
            rng,
        )
    }

    /// Timestamp plus random suffix, retried until unused in the store.
    fn mint_session_id<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        loop {
            let id = format!(
                "{}{}_{:04x}",
                SESSION_ID_PREFIX,
                chrono::Utc::now().timestamp_millis(),
                rng.random::<u16>()
            );
            if self.store.get(&id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::luhn;
    use crate::types::{Cvv, MonthYear};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingLookup {
        info: Option<BinInfo>,
        calls: AtomicUsize,
    }

    impl BinLookup for CountingLookup {
        async fn lookup(&self, _bin: &str) -> Option<BinInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.info.clone()
        }
    }

    fn session(info: Option<BinInfo>) -> GenerationSession<CountingLookup, MemorySessionStore> {
        let lookup = CountingLookup {
            info,
            calls: AtomicUsize::new(0),
        };
        GenerationSession::with_rng(lookup, MemorySessionStore::new(), StdRng::seed_from_u64(1))
    }

    #[tokio::test]
    async fn test_generate_stores_record() {
        let session = session(None);
        let report = session.generate("4111111111111111|12|2026|123").await;

        assert!(report.session_id.starts_with(SESSION_ID_PREFIX));
        assert_eq!(report.cards.len(), DEFAULT_BATCH_SIZE);
        assert_eq!(report.record.bin_prefix, "411111");
        assert_eq!(report.record.resolved_month.as_deref(), Some("12"));
        assert_eq!(report.record.resolved_year.as_deref(), Some("2026"));
        assert_eq!(session.store.get(&report.session_id), Some(report.record.clone()));

        for card in &report.cards {
            assert!(luhn::is_valid(&card.number));
            assert_eq!(card.number.len(), 16);
            assert_eq!((card.month.as_str(), card.year.as_str()), ("12", "2026"));
            assert_eq!(card.cvv, "123");
        }
    }

    #[tokio::test]
    async fn test_missing_bin_info_is_not_an_error() {
        let session = session(None);
        let report = session.generate("622126xxxxxxxxxxxxx").await;

        assert!(report.bin_info.is_none());
        assert!(report.cards.iter().all(|c| c.number.len() == 19));
        assert_eq!(session.lookup().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_garbage_input_generates_from_fallback() {
        let session = session(None);
        let report = session.generate("not a card").await;

        assert_eq!(report.record.base_card, "xxxxxxxxxxxxxxxx");
        assert_eq!(report.record.base_month_year, MonthYear::Unknown);
        assert_eq!(report.record.base_cvv, Cvv::Unknown);
        assert_eq!(report.record.bin_prefix, "000000");
        assert!(report.cards.iter().all(|c| c.number.len() == 16));
    }

    #[tokio::test]
    async fn test_regenerate_keeps_base_parameters() {
        let info = BinInfo {
            brand: Some("VISA".to_string()),
            ..Default::default()
        };
        let session = session(Some(info.clone()));
        let first = session.generate("411111xxxxxxxxxx").await;

        let again = session.regenerate(&first.session_id).await.unwrap();
        let third = session.regenerate(&first.session_id).await.unwrap();

        assert_eq!(again.session_id, first.session_id);
        assert_eq!(again.record, first.record);
        assert_eq!(third.record, first.record);
        assert_eq!(again.bin_info, Some(info));
        assert_ne!(again.cards, third.cards);
        assert_eq!(session.lookup().calls.load(Ordering::SeqCst), 3);
        assert_eq!(session.store.len(), 1);
    }

    #[tokio::test]
    async fn test_regenerate_unknown_session() {
        let session = session(None);
        let result = session.regenerate("regen_0_0000").await;

        assert!(matches!(result, Err(CardgenError::SessionNotFound(_))));
        assert!(session.store.is_empty());
        assert_eq!(session.lookup().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_ids_are_unique() {
        let session = session(None);
        let a = session.generate("411111").await;
        let b = session.generate("411111").await;

        assert_ne!(a.session_id, b.session_id);
        assert_eq!(session.store.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_size() {
        let session = session(None).with_batch_size(3);
        let report = session.generate("511111").await;
        assert_eq!(report.cards.len(), 3);
    }
}
