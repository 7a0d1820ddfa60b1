//! Demonstrates fetching and updating a templated resource with a bearer token resolved per call,
//! including the redacted error handed back when the server rejects the credential.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use serde_json::json;
// self
use authed_rest::{
	auth::{StaticTokenProvider, TokenProvider},
	client::ReqwestRestClient,
	error::Error,
	options::RequestOptions,
	template::Params,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let read_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/users/1234").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"1234\",\"name\":\"Ada\"}");
		})
		.await;
	let rejected_mock = server
		.mock_async(|when, then| {
			when.method(PATCH).path("/users/5678");
			then.status(401).body("{\"error\":\"invalid_token\"}");
		})
		.await;
	let provider: Arc<dyn TokenProvider> = Arc::new(StaticTokenProvider::new("demo-access"));
	let client = ReqwestRestClient::builder()
		.resource_url(server.url("/users/:id"))
		.options(RequestOptions::default().with_include_response_headers(true))
		.token_provider(provider)
		.build()?;
	let user = client.get(Params::from([("id", "1234")])).await?;

	println!("Fetched user: {}.", user.data());
	println!("Response headers: {:?}.", user.headers());

	match client.patch(Params::from([("id", "5678")]), json!({ "name": "Grace" })).await {
		Err(Error::Transport(e)) => println!(
			"Update rejected with {:?}; sent authorization {:?}.",
			e.status(),
			e.captured_request().and_then(|request| request.authorization()),
		),
		other => println!("Unexpected update outcome: {other:?}."),
	}

	read_mock.assert_async().await;
	rejected_mock.assert_async().await;

	Ok(())
}
