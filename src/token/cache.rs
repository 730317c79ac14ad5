use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::{AccessToken, BoxFuture, Credentials, TokenError, TokenFetcher, TokenProvider};
use crate::config::DEFAULT_TOKEN_TTL;

/// Outcome of one fetch, shared by every caller that joined it.
type Flight = OnceCell<Result<AccessToken, TokenError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Behaviour of a [`TokenCache`].
pub struct TokenCacheOptions {
    /// How long a fetched token is served before it is fetched again.
    pub ttl: Duration,
    /// Fetch on every [`TokenCache::get`] and never store the result.
    pub disable_cache: bool,
}

impl Default for TokenCacheOptions {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TOKEN_TTL,
            disable_cache: false,
        }
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: AccessToken,
    acquired_at: Instant,
    ttl: Duration,
}

impl CachedToken {
    fn is_valid(&self, now: Instant) -> bool {
        self.acquired_at
            .checked_add(self.ttl)
            .is_none_or(|expires_at| now < expires_at)
    }
}

#[derive(Default)]
struct CacheState {
    token: Option<CachedToken>,
    in_flight: Option<Arc<Flight>>,
}

/// In-memory cache of the current [`AccessToken`].
///
/// [`TokenCache::get`] returns the cached token while it is within its TTL. Otherwise the
/// first caller starts a fetch through the injected [`TokenFetcher`]; callers arriving while
/// that fetch runs wait for it and receive the same token or the same error. A failed fetch
/// leaves the cache empty so the next call fetches again.
///
/// If the caller driving a fetch is cancelled, one of the waiting callers starts it over.
pub struct TokenCache {
    credentials: Credentials,
    fetcher: Arc<dyn TokenFetcher>,
    options: TokenCacheOptions,
    state: Mutex<CacheState>,
}

impl TokenCache {
    pub fn new(
        credentials: Credentials,
        fetcher: Arc<dyn TokenFetcher>,
        options: TokenCacheOptions,
    ) -> Self {
        Self {
            credentials,
            fetcher,
            options,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn options(&self) -> TokenCacheOptions {
        self.options
    }

    /// Return a valid token, fetching one when the cache is empty or expired.
    pub async fn get(&self) -> Result<AccessToken, TokenError> {
        if self.options.disable_cache {
            return self.fetch().await;
        }

        let flight = {
            let mut state = self.lock_state();
            let now = Instant::now();
            if let Some(cached) = state.token.as_ref().filter(|cached| cached.is_valid(now)) {
                debug!("serving cached access token");
                return Ok(cached.value.clone());
            }
            state.token = None;
            Arc::clone(
                state
                    .in_flight
                    .get_or_insert_with(|| Arc::new(OnceCell::new())),
            )
        };

        flight
            .get_or_init(|| self.complete_flight(&flight))
            .await
            .clone()
    }

    /// Forget `rejected` so the next [`TokenCache::get`] fetches a new token.
    ///
    /// Useful when the provider rejects a token before its TTL elapsed. Nothing happens if
    /// the cache already holds a different token, e.g. one refreshed by another caller.
    pub fn invalidate(&self, rejected: &AccessToken) {
        let mut state = self.lock_state();
        if state
            .token
            .as_ref()
            .is_some_and(|cached| &cached.value == rejected)
        {
            state.token = None;
            debug!("cached access token invalidated");
        }
    }

    async fn complete_flight(&self, flight: &Arc<Flight>) -> Result<AccessToken, TokenError> {
        // The token is issued during the round trip; its lifetime counts from the request.
        let requested_at = Instant::now();
        let result = self.fetch().await;

        let mut state = self.lock_state();
        if let Ok(token) = &result {
            state.token = Some(CachedToken {
                value: token.clone(),
                acquired_at: requested_at,
                ttl: self.options.ttl,
            });
        }
        if state
            .in_flight
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, flight))
        {
            state.in_flight = None;
        }
        result
    }

    async fn fetch(&self) -> Result<AccessToken, TokenError> {
        info!(disable_cache = self.options.disable_cache, "fetching access token");
        let result = self.fetcher.fetch(&self.credentials).await;
        if let Err(err) = &result {
            warn!(error = %err, "access token fetch failed");
        }
        result
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState> {
        // The state is consistent after every write, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock_state();
        f.debug_struct("TokenCache")
            .field("credentials", &self.credentials)
            .field("options", &self.options)
            .field("cached", &state.token.is_some())
            .field("in_flight", &state.in_flight.is_some())
            .finish()
    }
}

impl TokenProvider for TokenCache {
    fn access_token(&self) -> BoxFuture<'_, Result<AccessToken, TokenError>> {
        Box::pin(self.get())
    }

    fn invalidate(&self, rejected: &AccessToken) {
        TokenCache::invalidate(self, rejected);
    }
}
