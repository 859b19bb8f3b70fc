use reqwest::Client;
use tokio::sync::Mutex;

use crate::auth::credentials::{fetch_client_credentials_token_with_expiry, now_secs};
use crate::error::Result;
use crate::ngsild::settings::DataSourceSettings;

const REFRESH_SKEW_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: Option<u64>,
}

impl CachedToken {
    fn is_usable(&self, now: u64) -> bool {
        !self.access_token.trim().is_empty() && !is_expiring_soon(self.expires_at, now)
    }
}

pub fn is_expiring_soon(expires_at: Option<u64>, now: u64) -> bool {
    let Some(exp) = expires_at else {
        return true;
    };
    now.saturating_add(REFRESH_SKEW_SECS) >= exp
}

/// Holds the most recent access token for one data source instance.
#[derive(Debug, Default)]
pub struct TokenCache {
    cached: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the cache, e.g. with a token obtained out of band.
    pub async fn prime(&self, token: CachedToken) {
        *self.cached.lock().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.cached.lock().await = None;
    }

    /// Return the cached token, fetching a new one when it is missing or about to expire.
    pub async fn access_token(
        &self,
        client: &Client,
        settings: &DataSourceSettings,
    ) -> Result<String> {
        let mut guard = self.cached.lock().await;
        let now = now_secs()?;

        if let Some(cached) = guard.as_ref() {
            if cached.is_usable(now) {
                return Ok(cached.access_token.clone());
            }
            log::debug!("Cached token expires at {:?}, refreshing", cached.expires_at);
        }

        let fresh = fetch_client_credentials_token_with_expiry(client, settings).await?;
        let access_token = fresh.access_token.clone();
        *guard = Some(CachedToken {
            access_token: fresh.access_token,
            expires_at: Some(fresh.expires_at),
        });
        Ok(access_token)
    }
}
