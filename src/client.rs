//! Bearer-authenticated REST resource client.
//!
//! [`AuthenticatingRestClient`] wraps a [`RequestExecutor`] for one resource template. Every
//! verb follows the same path:
//!
//! 1. resolve a token from the [`TokenProvider`] (failures short-circuit, the executor is never
//!    called);
//! 2. overwrite `Authorization: Bearer <token>` in the client's live options, which the executor
//!    shares by reference;
//! 3. delegate to the executor, passing parameters through untouched;
//! 4. redact the captured credential from any executor failure, then shape the payload.
//!
//! Verbs return an [`Operation`], which is a future ("promise" mode) and can also be handed a
//! completion callback via [`Operation::callback`]. Both modes run the same dispatch.

// std
use std::task::{Context, Poll};
// crates.io
use tokio::task::JoinHandle;
// self
#[cfg(feature = "reqwest")]
use crate::http::{ReqwestExecutor, ReqwestExecutorFactory};
use crate::{
	_prelude::*,
	auth::TokenProvider,
	error::ArgumentError,
	executor::{ExecutorFactory, ExecutorRequest, ExecutorResponse, RequestExecutor, Verb},
	obs::{self, OperationOutcome, OperationSpan},
	options::{RequestOptions, SharedOptions},
	sanitize,
	template::{Params, ResourceUrlTemplate},
};

type OperationFuture = Pin<Box<dyn Future<Output = Result<OperationResult>> + Send>>;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest executor.
pub type ReqwestRestClient = AuthenticatingRestClient<ReqwestExecutor>;

/// Value an operation resolves with.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
	/// Decoded payload (the default shape).
	Payload(Value),
	/// Payload plus response headers, produced when `include_response_headers` is set.
	WithHeaders {
		/// Decoded payload.
		data: Value,
		/// Response headers with lower-cased names.
		headers: BTreeMap<String, String>,
	},
}
impl OperationResult {
	fn shape(response: ExecutorResponse, include_headers: bool) -> Self {
		if include_headers {
			Self::WithHeaders { data: response.body, headers: response.headers }
		} else {
			Self::Payload(response.body)
		}
	}

	/// Returns the decoded payload regardless of shape.
	pub fn data(&self) -> &Value {
		match self {
			Self::Payload(data) | Self::WithHeaders { data, .. } => data,
		}
	}

	/// Returns the response headers when they were requested.
	pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
		match self {
			Self::Payload(_) => None,
			Self::WithHeaders { headers, .. } => Some(headers),
		}
	}

	/// Consumes the result, keeping only the payload.
	pub fn into_data(self) -> Value {
		match self {
			Self::Payload(data) | Self::WithHeaders { data, .. } => data,
		}
	}
}

/// In-flight client operation.
///
/// Await it to get the result, or pass a callback to [`Operation::callback`]. An operation runs
/// to completion once started; there is no cancellation beyond dropping the future before it is
/// polled.
#[must_use = "operations do nothing unless awaited or given a callback"]
pub struct Operation(OperationFuture);
impl Operation {
	/// Runs the operation on the current Tokio runtime and calls `callback` once with its
	/// outcome.
	///
	/// The returned handle may be ignored.
	///
	/// # Panics
	///
	/// Panics when called outside a Tokio runtime.
	pub fn callback<F>(self, callback: F) -> JoinHandle<()>
	where
		F: 'static + Send + FnOnce(Result<OperationResult>),
	{
		tokio::spawn(async move { callback(self.await) })
	}
}
impl Future for Operation {
	type Output = Result<OperationResult>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.get_mut().0.as_mut().poll(cx)
	}
}
impl Debug for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("Operation(..)")
	}
}

/// Builder for [`AuthenticatingRestClient`] values.
///
/// Every input is optional at the type level so missing pieces surface as [`ArgumentError`]s,
/// checked in order: resource URL, options, token provider.
#[derive(Clone, Default)]
pub struct AuthenticatingRestClientBuilder {
	/// Resource URL template.
	pub resource_url: Option<String>,
	/// Request options the client will own.
	pub options: Option<RequestOptions>,
	/// Token provider consulted before every call.
	pub token_provider: Option<Arc<dyn TokenProvider>>,
}
impl AuthenticatingRestClientBuilder {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the resource URL template.
	pub fn resource_url(mut self, url: impl Into<String>) -> Self {
		self.resource_url = Some(url.into());

		self
	}

	/// Sets the request options.
	pub fn options(mut self, options: RequestOptions) -> Self {
		self.options = Some(options);

		self
	}

	/// Sets the token provider.
	pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
		self.token_provider = Some(provider);

		self
	}

	/// Validates the inputs and builds the executor through `factory`.
	///
	/// The factory runs exactly once and receives the client's own [`SharedOptions`] handle.
	/// The token provider is not consulted.
	pub fn build_with<F>(self, factory: &F) -> Result<AuthenticatingRestClient<F::Executor>>
	where
		F: ?Sized + ExecutorFactory,
	{
		let raw = self.resource_url.ok_or(ArgumentError::MissingResourceUrl)?;
		let template = ResourceUrlTemplate::parse(raw)?;
		let options = SharedOptions::new(self.options.ok_or(ArgumentError::MissingOptions)?);
		let token_provider = self.token_provider.ok_or(ArgumentError::MissingTokenProvider)?;
		let executor = factory.build(&template, options.clone())?;

		Ok(AuthenticatingRestClient {
			template,
			options,
			token_provider,
			executor: Arc::new(executor),
		})
	}

	#[cfg(feature = "reqwest")]
	/// Builds a client backed by the default reqwest executor.
	pub fn build(self) -> Result<ReqwestRestClient> {
		self.build_with(&ReqwestExecutorFactory::default())
	}
}
impl Debug for AuthenticatingRestClientBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatingRestClientBuilder")
			.field("resource_url", &self.resource_url)
			.field("options_set", &self.options.is_some())
			.field("token_provider_set", &self.token_provider.is_some())
			.finish()
	}
}

/// REST resource client that authenticates every call with a freshly resolved bearer token.
///
/// Cloning is cheap; clones share the template, the live options, the token provider, and the
/// executor.
pub struct AuthenticatingRestClient<E>
where
	E: RequestExecutor,
{
	template: ResourceUrlTemplate,
	options: SharedOptions,
	token_provider: Arc<dyn TokenProvider>,
	executor: Arc<E>,
}
impl<E> AuthenticatingRestClient<E>
where
	E: RequestExecutor,
{
	/// Builds a client whose executor comes from `factory`.
	pub fn with_executor_factory<F>(
		resource_url: impl Into<String>,
		options: RequestOptions,
		token_provider: Arc<dyn TokenProvider>,
		factory: &F,
	) -> Result<Self>
	where
		F: ?Sized + ExecutorFactory<Executor = E>,
	{
		AuthenticatingRestClientBuilder::new()
			.resource_url(resource_url)
			.options(options)
			.token_provider(token_provider)
			.build_with(factory)
	}

	/// Fetches a single resource.
	pub fn get(&self, params: impl Into<Params>) -> Operation {
		self.dispatch(Verb::Get, params.into(), None)
	}

	/// Fetches a collection.
	pub fn get_all(&self, params: impl Into<Params>) -> Operation {
		self.dispatch(Verb::GetAll, params.into(), None)
	}

	/// Creates a resource (`POST`).
	pub fn create(&self, params: impl Into<Params>, body: impl Into<Value>) -> Operation {
		self.dispatch(Verb::Create, params.into(), Some(body.into()))
	}

	/// Partially updates a resource (`PATCH`).
	pub fn patch(&self, params: impl Into<Params>, body: impl Into<Value>) -> Operation {
		self.dispatch(Verb::Patch, params.into(), Some(body.into()))
	}

	/// Replaces a resource (`PUT`).
	pub fn update(&self, params: impl Into<Params>, body: impl Into<Value>) -> Operation {
		self.dispatch(Verb::Update, params.into(), Some(body.into()))
	}

	/// Deletes a resource.
	pub fn delete(&self, params: impl Into<Params>) -> Operation {
		self.dispatch(Verb::Delete, params.into(), None)
	}

	/// Parsed resource URL template.
	pub fn template(&self) -> &ResourceUrlTemplate {
		&self.template
	}

	/// Copy of the current live options, including the last injected `Authorization` header.
	pub fn options(&self) -> RequestOptions {
		self.options.snapshot()
	}

	/// Live options handle shared with the executor.
	pub fn shared_options(&self) -> &SharedOptions {
		&self.options
	}

	/// Executor this client delegates to.
	pub fn executor(&self) -> &E {
		&self.executor
	}

	fn dispatch(&self, verb: Verb, params: Params, body: Option<Value>) -> Operation {
		let span = OperationSpan::new(verb, "dispatch");
		let options = self.options.clone();
		let token_provider = self.token_provider.clone();
		let executor = self.executor.clone();

		obs::record_operation_outcome(verb, OperationOutcome::Attempt);

		Operation(Box::pin(async move {
			let result = span
				.instrument(async move {
					let token = token_provider.access_token().await.map_err(|e| {
						obs::record_token_failure(verb);

						Error::from(e)
					})?;

					options.set_authorization(token.bearer_header());

					let response = executor
						.execute(ExecutorRequest { verb, params, body })
						.await
						.map_err(|e| {
							obs::record_transport_failure(verb, e.status());

							sanitize::sanitize(e.into())
						})?;
					let include_headers = options.read(|options| options.include_response_headers);

					Ok(OperationResult::shape(response, include_headers))
				})
				.await;

			match &result {
				Ok(_) => obs::record_operation_outcome(verb, OperationOutcome::Success),
				Err(_) => obs::record_operation_outcome(verb, OperationOutcome::Failure),
			}

			result
		}))
	}
}
#[cfg(feature = "reqwest")]
impl AuthenticatingRestClient<ReqwestExecutor> {
	/// Returns a builder for reqwest-backed clients.
	pub fn builder() -> AuthenticatingRestClientBuilder {
		AuthenticatingRestClientBuilder::new()
	}

	/// Creates a client backed by the default reqwest executor.
	///
	/// Fails with an [`ArgumentError`] when the resource URL is empty or malformed, and with a
	/// [`ConfigError`](crate::error::ConfigError) when the configured proxy is unusable.
	pub fn new(
		resource_url: impl Into<String>,
		options: RequestOptions,
		token_provider: Arc<dyn TokenProvider>,
	) -> Result<Self> {
		Self::with_executor_factory(
			resource_url,
			options,
			token_provider,
			&ReqwestExecutorFactory::default(),
		)
	}
}
impl<E> Clone for AuthenticatingRestClient<E>
where
	E: RequestExecutor,
{
	fn clone(&self) -> Self {
		Self {
			template: self.template.clone(),
			options: self.options.clone(),
			token_provider: self.token_provider.clone(),
			executor: self.executor.clone(),
		}
	}
}
impl<E> Debug for AuthenticatingRestClient<E>
where
	E: RequestExecutor,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		let headers =
			self.options.read(|options| options.headers.keys().cloned().collect::<Vec<_>>());

		f.debug_struct("AuthenticatingRestClient")
			.field("template", &self.template.as_str())
			.field("headers", &headers)
			.finish_non_exhaustive()
	}
}
