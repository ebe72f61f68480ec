//! HTTP client for the public BIN lookup service.

use crate::lookup::BinLookup;
use crate::types::{BinInfo, Result};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

/// Default lookup service endpoint; the BIN is appended as the last path segment.
pub const DEFAULT_BIN_API_URL: &str = "https://bins.antipublic.cc/bins/";

/// Client for the BIN lookup service.
pub struct BinLookupClient {
    client: Client,
    rate_limiter: Arc<RateLimiter<governor::state::NotKeyed, governor::state::InMemoryState, governor::clock::DefaultClock>>,
    base_url: Url,
}

impl BinLookupClient {
    /// Create a new lookup client.
    pub fn new(base_url: &str, timeout_secs: u64, rate_limit: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("cardgen/", env!("CARGO_PKG_VERSION")))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        let quota = Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            client,
            rate_limiter,
            base_url: normalize_base(base_url)?,
        })
    }

    /// Endpoint for a given BIN.
    pub fn endpoint(&self, bin: &str) -> Result<Url> {
        Ok(self.base_url.join(bin)?)
    }

    /// Query the service. A non-success status means "no data" and is not an error.
    pub async fn fetch(&self, bin: &str) -> Result<Option<BinInfo>> {
        self.rate_limiter.until_ready().await;

        let url = self.endpoint(bin)?;
        trace!("Querying BIN service: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            debug!("BIN service returned HTTP {} for {}", response.status(), bin);
            return Ok(None);
        }

        let info = response.json::<BinInfo>().await?;
        debug!("BIN data for {}: {:?}", bin, info);
        Ok(Some(info))
    }
}

impl BinLookup for BinLookupClient {
    async fn lookup(&self, bin: &str) -> Option<BinInfo> {
        match self.fetch(bin).await {
            Ok(info) => info,
            Err(e) => {
                warn!("BIN lookup for {} failed: {}", bin, e);
                None
            }
        }
    }
}

/// Make sure the base URL ends with `/` so `join` appends instead of replacing.
fn normalize_base(base_url: &str) -> Result<Url> {
    if base_url.ends_with('/') {
        Ok(Url::parse(base_url)?)
    } else {
        Ok(Url::parse(&format!("{}/", base_url))?)
    }
}
