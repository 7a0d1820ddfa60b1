//! Time-bounded token cache layered in front of another [`TokenProvider`].
//!
//! The client resolves a token on every operation. Wrapping the real provider in a
//! [`CachedTokenProvider`] keeps that contract while avoiding a round trip per request: the
//! cached token is reused until its TTL elapses, concurrent callers that find the cache stale
//! share a single refresh, and failures are never cached.

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenFuture, TokenProvider},
};

struct CachedToken {
	token: AccessToken,
	expires_at: OffsetDateTime,
}
impl CachedToken {
	fn is_fresh_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at
	}
}

/// Reuses the inner provider's token for a fixed TTL.
pub struct CachedTokenProvider<P>
where
	P: ?Sized + TokenProvider,
{
	inner: Arc<P>,
	ttl: Duration,
	entry: Arc<RwLock<Option<CachedToken>>>,
	refresh_guard: Arc<AsyncMutex<()>>,
}
impl<P> CachedTokenProvider<P>
where
	P: ?Sized + TokenProvider,
{
	/// Wraps `inner`, caching each resolved token for `ttl`.
	///
	/// Negative TTLs are clamped to zero, which disables reuse.
	pub fn new(inner: Arc<P>, ttl: Duration) -> Self {
		Self {
			inner,
			ttl: if ttl.is_negative() { Duration::ZERO } else { ttl },
			entry: Default::default(),
			refresh_guard: Default::default(),
		}
	}

	/// Drops the cached token so the next call consults the inner provider.
	pub fn invalidate(&self) {
		*self.entry.write() = None;
	}

	/// Returns the configured TTL.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	fn fresh(&self, now: OffsetDateTime) -> Option<AccessToken> {
		self.entry
			.read()
			.as_ref()
			.filter(|cached| cached.is_fresh_at(now))
			.map(|cached| cached.token.clone())
	}
}
impl<P> Clone for CachedTokenProvider<P>
where
	P: ?Sized + TokenProvider,
{
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
			ttl: self.ttl,
			entry: self.entry.clone(),
			refresh_guard: self.refresh_guard.clone(),
		}
	}
}
impl<P> TokenProvider for CachedTokenProvider<P>
where
	P: ?Sized + TokenProvider,
{
	fn access_token(&self) -> TokenFuture<'_> {
		Box::pin(async move {
			if let Some(token) = self.fresh(OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let _singleflight = self.refresh_guard.lock().await;

			// Another caller may have refreshed while we waited.
			if let Some(token) = self.fresh(OffsetDateTime::now_utc()) {
				return Ok(token);
			}

			let token = self.inner.access_token().await?;

			*self.entry.write() = Some(CachedToken {
				token: token.clone(),
				expires_at: OffsetDateTime::now_utc() + self.ttl,
			});

			Ok(token)
		})
	}
}
impl<P> Debug for CachedTokenProvider<P>
where
	P: ?Sized + TokenProvider,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CachedTokenProvider")
			.field("ttl", &self.ttl)
			.field("cached", &self.entry.read().is_some())
			.finish()
	}
}
