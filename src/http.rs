//! Reqwest-backed [`RequestExecutor`].
//!
//! [`ReqwestExecutorFactory`] builds one [`ReqwestExecutor`] per client. When the options carry
//! a `proxy`, the factory provisions a dedicated [`ReqwestClient`] routed through it; otherwise
//! the shared client is reused. Every request reads headers from the live [`SharedOptions`], so
//! the client's freshly injected `Authorization` header is what goes on the wire. The sent
//! headers are captured for error introspection.

// crates.io
use reqwest::{Method, Proxy, Request, Response, header::HeaderMap};
// self
use crate::{
	_prelude::*,
	error::{CapturedRequest, CapturedResponse, ConfigError, TransportError},
	executor::{
		ExecutorFactory, ExecutorFuture, ExecutorRequest, ExecutorResponse, RequestExecutor, Verb,
	},
	options::SharedOptions,
	template::ResourceUrlTemplate,
};

/// Factory for [`ReqwestExecutor`] values.
#[derive(Clone, Debug, Default)]
pub struct ReqwestExecutorFactory {
	client: Option<ReqwestClient>,
}
impl ReqwestExecutorFactory {
	/// Reuses `client` for executors that do not need a proxy.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client: Some(client) }
	}

	fn client_for(&self, proxy: Option<&str>) -> Result<ReqwestClient> {
		match proxy {
			Some(proxy) => {
				let route = Proxy::all(proxy).map_err(|e| ConfigError::InvalidProxy {
					proxy: proxy.to_owned(),
					source: Box::new(e),
				})?;

				ReqwestClient::builder()
					.proxy(route)
					.build()
					.map_err(|e| ConfigError::http_client_build(e).into())
			},
			None => Ok(self.client.clone().unwrap_or_default()),
		}
	}
}
impl ExecutorFactory for ReqwestExecutorFactory {
	type Executor = ReqwestExecutor;

	fn build(
		&self,
		template: &ResourceUrlTemplate,
		options: SharedOptions,
	) -> Result<Self::Executor> {
		let proxy = options.read(|options| options.proxy.clone());
		let client = self.client_for(proxy.as_deref())?;

		Ok(ReqwestExecutor { client, template: template.clone(), options })
	}
}

/// Executes verbs for one resource template over reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestExecutor {
	client: ReqwestClient,
	template: ResourceUrlTemplate,
	options: SharedOptions,
}
impl ReqwestExecutor {
	/// Template this executor renders.
	pub fn template(&self) -> &ResourceUrlTemplate {
		&self.template
	}

	/// Live options handle shared with the owning client.
	pub fn options(&self) -> &SharedOptions {
		&self.options
	}

	/// Assembles the outgoing request without sending it.
	pub fn build_request(&self, request: &ExecutorRequest) -> Result<Request, TransportError> {
		let url = self.template.render(&request.params);
		let parsed = Url::parse(&url)
			.map_err(|source| TransportError::InvalidUrl { url: url.clone(), source })?;
		let headers = self.options.read(|options| options.headers.clone());
		let method = Method::from_bytes(request.verb.method().as_bytes()).map_err(|e| {
			TransportError::network(unsent_request(request.verb, &url, &headers), e)
		})?;
		let mut builder = self.client.request(method, parsed);

		for (name, value) in &headers {
			builder = builder.header(name.as_str(), value.as_str());
		}
		if let Some(body) = &request.body {
			builder = builder.json(body);
		}

		builder
			.build()
			.map_err(|e| TransportError::network(unsent_request(request.verb, &url, &headers), e))
	}

	async fn send(&self, request: ExecutorRequest) -> Result<ExecutorResponse, TransportError> {
		let outgoing = self.build_request(&request)?;
		let captured = capture_request(&outgoing);
		let response = match self.client.execute(outgoing).await {
			Ok(response) => response,
			Err(e) => return Err(TransportError::network(captured, e)),
		};

		read_response(captured, response).await
	}
}
impl RequestExecutor for ReqwestExecutor {
	fn execute(&self, request: ExecutorRequest) -> ExecutorFuture<'_> {
		Box::pin(self.send(request))
	}
}

// Captures a request that never reached the transport.
fn unsent_request(verb: Verb, url: &str, headers: &BTreeMap<String, String>) -> CapturedRequest {
	CapturedRequest {
		method: verb.method().to_owned(),
		url: url.to_owned(),
		headers: headers.iter().map(|(k, v)| (k.to_ascii_lowercase(), v.clone())).collect(),
	}
}

fn capture_request(request: &Request) -> CapturedRequest {
	CapturedRequest {
		method: request.method().to_string(),
		url: request.url().to_string(),
		headers: capture_headers(request.headers()),
	}
}

fn capture_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
	headers
		.iter()
		.map(|(name, value)| {
			(name.as_str().to_owned(), String::from_utf8_lossy(value.as_bytes()).into_owned())
		})
		.collect()
}

async fn read_response(
	request: CapturedRequest,
	response: Response,
) -> Result<ExecutorResponse, TransportError> {
	let status = response.status();
	let headers = capture_headers(response.headers());
	let bytes = match response.bytes().await {
		Ok(bytes) => bytes,
		Err(e) => return Err(TransportError::network(request, e)),
	};

	if !status.is_success() {
		let body = decode_body(&bytes)
			.unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

		return Err(TransportError::Status {
			status: status.as_u16(),
			response: Some(CapturedResponse { status: status.as_u16(), headers, body }),
			request,
		});
	}

	let body = decode_body(&bytes).map_err(|source| TransportError::Decode {
		url: request.url.clone(),
		status: status.as_u16(),
		source,
	})?;

	Ok(ExecutorResponse { status: status.as_u16(), headers, body })
}

fn decode_body(bytes: &[u8]) -> Result<Value, serde_path_to_error::Error<serde_json::Error>> {
	if bytes.iter().all(u8::is_ascii_whitespace) {
		return Ok(Value::Null);
	}

	let mut de = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut de)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{options::RequestOptions, template::Params};

	const RESOURCE: &str = "https://tenant.auth0.com/some-resource";
	const RESOURCE_ID: &str = "https://tenant.auth0.com/some-resource/:id";

	fn executor(template: &str, options: RequestOptions) -> ReqwestExecutor {
		let template = ResourceUrlTemplate::parse(template).expect("Template should parse.");

		ReqwestExecutorFactory::default()
			.build(&template, SharedOptions::new(options))
			.expect("Executor should build.")
	}

	fn request(verb: Verb, params: Params, body: Option<Value>) -> ExecutorRequest {
		ExecutorRequest { verb, params, body }
	}

	#[test]
	fn built_requests_keep_encoded_path_segments() {
		let executor = executor(RESOURCE_ID, RequestOptions::default());

		for verb in [Verb::Get, Verb::Patch, Verb::Update, Verb::Delete] {
			let built = executor
				.build_request(&request(verb, Params::from([("id", "auth0|1234/5678")]), None))
				.expect("Request should build.");

			assert_eq!(built.method().as_str(), verb.method());
			assert_eq!(built.url().path(), "/some-resource/auth0%7C1234%2F5678");
		}
	}

	#[test]
	fn built_requests_encode_query_pairs_independently() {
		let executor = executor(RESOURCE_ID, RequestOptions::default());
		let params = Params::new()
			.with("id", "1234")
			.with("other", "foobar")
			.with("otherEncoded", "auth0|6789");
		let built = executor
			.build_request(&request(Verb::Get, params, None))
			.expect("Request should build.");

		assert_eq!(built.url().path(), "/some-resource/1234");
		assert_eq!(built.url().query(), Some("other=foobar&otherEncoded=auth0%7C6789"));
	}

	#[test]
	fn built_requests_read_live_headers() {
		let executor = executor(RESOURCE, RequestOptions::default());

		executor.options().set_authorization("Bearer live".into());

		let body = Some(serde_json::json!({ "a": 1 }));
		let built = executor
			.build_request(&request(Verb::Create, Params::new(), body))
			.expect("Request should build.");
		let captured = capture_request(&built);

		assert_eq!(captured.method, "POST");
		assert_eq!(captured.authorization(), Some("Bearer live"));
		assert_eq!(
			captured.headers.get("content-type").map(String::as_str),
			Some("application/json")
		);
	}

	#[test]
	fn injected_bearer_replaces_caller_authorization() {
		let executor = executor(
			RESOURCE,
			RequestOptions::default().with_header("authorization", "Basic stale"),
		);

		executor.options().set_authorization("Bearer fresh".into());

		let built = executor
			.build_request(&request(Verb::GetAll, Params::new(), None))
			.expect("Request should build.");
		let sent = built
			.headers()
			.get_all("authorization")
			.iter()
			.map(|value| value.to_str().expect("Header should be ASCII."))
			.collect::<Vec<_>>();

		assert_eq!(sent, vec!["Bearer fresh"]);
	}

	#[test]
	fn relative_templates_fail_at_request_time() {
		let executor = executor("/some-resource", RequestOptions::default());
		let err = executor
			.build_request(&request(Verb::GetAll, Params::new(), None))
			.expect_err("Relative URLs cannot be sent.");

		assert!(matches!(err, TransportError::InvalidUrl { .. }));
	}

	#[test]
	fn factory_honors_proxy_option() {
		let template = ResourceUrlTemplate::parse(RESOURCE).expect("Template should parse.");
		let options = SharedOptions::new(RequestOptions::default().with_proxy("http://proxy"));
		let executor = ReqwestExecutorFactory::default()
			.build(&template, options.clone())
			.expect("Proxied executor should build.");

		assert!(executor.options().ptr_eq(&options));
		assert_eq!(executor.options().snapshot().proxy.as_deref(), Some("http://proxy"));
	}

	#[test]
	fn empty_bodies_decode_to_null() {
		assert_eq!(decode_body(b"").expect("Empty body should decode."), Value::Null);
		assert_eq!(
			decode_body(br#"{"data":"value"}"#).expect("JSON body should decode."),
			serde_json::json!({"data": "value"})
		);
		assert!(decode_body(b"{oops").is_err());
	}
}
