//! Token provider contract consulted before every outbound request.

// self
use crate::{_prelude::*, auth::AccessToken, error::TokenError};

/// Boxed future returned by [`TokenProvider::access_token`].
pub type TokenFuture<'a> =
	Pin<Box<dyn Future<Output = Result<AccessToken, TokenError>> + 'a + Send>>;

/// Supplies a bearer token for the next request.
///
/// Implementations may read a static value, a cache, or call out over the network. The client
/// invokes the provider once per operation and never retries; any failure becomes the visible
/// operation error unchanged.
pub trait TokenProvider
where
	Self: Send + Sync,
{
	/// Resolves the access token to attach to the next request.
	fn access_token(&self) -> TokenFuture<'_>;
}
impl<P> TokenProvider for Arc<P>
where
	P: ?Sized + TokenProvider,
{
	fn access_token(&self) -> TokenFuture<'_> {
		(**self).access_token()
	}
}

/// Provider that always yields the same token.
#[derive(Clone, Debug)]
pub struct StaticTokenProvider(AccessToken);
impl StaticTokenProvider {
	/// Creates a provider handing out `token` on every call.
	pub fn new(token: impl Into<AccessToken>) -> Self {
		Self(token.into())
	}
}
impl TokenProvider for StaticTokenProvider {
	fn access_token(&self) -> TokenFuture<'_> {
		let token = self.0.clone();

		Box::pin(async move { Ok(token) })
	}
}
