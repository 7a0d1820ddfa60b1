//! Shared fixtures for integration tests.

#![allow(dead_code)]

// std
use std::sync::Arc;
// self
use authed_rest::{
	auth::{StaticTokenProvider, TokenFuture, TokenProvider},
	client::ReqwestRestClient,
	error::TokenError,
	options::RequestOptions,
};

/// Token value handed out by [`token_provider`].
pub const ACCESS_TOKEN: &str = "access_token";

/// Provider that always yields [`ACCESS_TOKEN`].
pub fn token_provider() -> Arc<dyn TokenProvider> {
	Arc::new(StaticTokenProvider::new(ACCESS_TOKEN))
}

/// Provider that always rejects with `Some Error`.
pub struct FailingProvider;
impl TokenProvider for FailingProvider {
	fn access_token(&self) -> TokenFuture<'_> {
		Box::pin(async { Err(TokenError::message("Some Error")) })
	}
}

/// Builds a reqwest-backed client for `resource_url` with the static test provider.
pub fn reqwest_client(resource_url: &str, options: RequestOptions) -> ReqwestRestClient {
	ReqwestRestClient::new(resource_url, options, token_provider())
		.expect("Failed to build reqwest test client.")
}
