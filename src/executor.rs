//! Request executor contract.
//!
//! The executor performs URL assembly, parameter encoding, and transport I/O for one resource.
//! The client builds it once through an [`ExecutorFactory`], handing over the parsed template
//! and a [`SharedOptions`] handle to its own live options, then routes every verb through
//! [`RequestExecutor::execute`]. Implementations must read headers from the shared options at
//! send time so the freshly injected `Authorization` value is used, and must report non-2xx
//! responses as [`TransportError::Status`] carrying the captured outgoing request.

// self
use crate::{
	_prelude::*,
	error::TransportError,
	options::SharedOptions,
	template::{Params, ResourceUrlTemplate},
};

/// Boxed future returned by [`RequestExecutor::execute`].
pub type ExecutorFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ExecutorResponse, TransportError>> + 'a + Send>>;

/// CRUD verbs exposed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
	/// Fetch a single resource.
	Get,
	/// Fetch a collection.
	GetAll,
	/// Create a resource.
	Create,
	/// Partially update a resource.
	Patch,
	/// Replace a resource.
	Update,
	/// Delete a resource.
	Delete,
}
impl Verb {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Verb::Get => "get",
			Verb::GetAll => "get_all",
			Verb::Create => "create",
			Verb::Patch => "patch",
			Verb::Update => "update",
			Verb::Delete => "delete",
		}
	}

	/// HTTP method the verb maps onto.
	pub const fn method(self) -> &'static str {
		match self {
			Verb::Get | Verb::GetAll => "GET",
			Verb::Create => "POST",
			Verb::Patch => "PATCH",
			Verb::Update => "PUT",
			Verb::Delete => "DELETE",
		}
	}
}
impl Display for Verb {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// One operation handed to the executor.
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutorRequest {
	/// Verb being executed.
	pub verb: Verb,
	/// Caller parameters, unchanged and in caller order.
	pub params: Params,
	/// JSON body for `create`, `patch`, and `update`.
	pub body: Option<Value>,
}

/// Successful executor outcome.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutorResponse {
	/// HTTP status code.
	pub status: u16,
	/// Response headers with lower-cased names.
	pub headers: BTreeMap<String, String>,
	/// Decoded JSON payload; `null` for empty bodies.
	pub body: Value,
}

/// Performs CRUD requests against one resource template.
pub trait RequestExecutor
where
	Self: 'static + Send + Sync,
{
	/// Executes `request` and resolves with the decoded response.
	fn execute(&self, request: ExecutorRequest) -> ExecutorFuture<'_>;
}

/// Builds the executor a client delegates to.
///
/// The factory receives the *same* [`SharedOptions`] handle the client mutates; it must keep
/// that handle (not a snapshot) wherever headers are read.
pub trait ExecutorFactory {
	/// Executor produced by this factory.
	type Executor: RequestExecutor;

	/// Constructs the executor for `template`.
	fn build(
		&self,
		template: &ResourceUrlTemplate,
		options: SharedOptions,
	) -> Result<Self::Executor>;
}
impl<F, E> ExecutorFactory for F
where
	F: Fn(&ResourceUrlTemplate, SharedOptions) -> Result<E>,
	E: RequestExecutor,
{
	type Executor = E;

	fn build(&self, template: &ResourceUrlTemplate, options: SharedOptions) -> Result<E> {
		self(template, options)
	}
}
