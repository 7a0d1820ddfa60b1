//! Live transport configuration shared between the client and its request executor.
//!
//! A client owns exactly one [`RequestOptions`] value for its whole lifetime and hands the
//! executor a [`SharedOptions`] handle to the *same* value. Before every operation the client
//! overwrites the `Authorization` header in place; the executor reads the headers at send time,
//! so it always sees the most recently resolved token. Overlapping operations on one client are
//! therefore not isolated from each other's token refresh. Nothing resets the options between
//! calls.

// self
use crate::_prelude::*;

/// Header name the client writes the bearer credential into.
pub const AUTHORIZATION: &str = "Authorization";

/// Transport configuration recognized by the client and its executor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestOptions {
	/// Headers sent with every request.
	pub headers: BTreeMap<String, String>,
	/// Proxy URL forwarded verbatim to the executor.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub proxy: Option<String>,
	/// Resolve operations with `{ data, headers }` instead of the bare payload.
	pub include_response_headers: bool,
}
impl RequestOptions {
	/// Adds or replaces a header.
	pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.insert(name.into(), value.into());

		self
	}

	/// Routes requests through `proxy`.
	pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
		self.proxy = Some(proxy.into());

		self
	}

	/// Toggles the `{ data, headers }` result shape.
	pub fn with_include_response_headers(mut self, include: bool) -> Self {
		self.include_response_headers = include;

		self
	}

	/// Returns the current `Authorization` header value, matching the name case-insensitively.
	pub fn bearer(&self) -> Option<&str> {
		self.headers
			.iter()
			.find(|(name, _)| name.eq_ignore_ascii_case(AUTHORIZATION))
			.map(|(_, value)| value.as_str())
	}
}

/// Handle to the client's live [`RequestOptions`].
///
/// Clones point at the same value; this is how the executor observes header mutations made by
/// the client.
#[derive(Clone, Debug, Default)]
pub struct SharedOptions(Arc<RwLock<RequestOptions>>);
impl SharedOptions {
	/// Takes ownership of `options`.
	pub fn new(options: RequestOptions) -> Self {
		Self(Arc::new(RwLock::new(options)))
	}

	/// Returns a copy of the current options.
	pub fn snapshot(&self) -> RequestOptions {
		self.0.read().clone()
	}

	/// Reads the current options without copying them.
	pub fn read<T>(&self, f: impl FnOnce(&RequestOptions) -> T) -> T {
		f(&self.0.read())
	}

	/// Overwrites the `Authorization` header with `value`.
	///
	/// Any caller-supplied spelling of the header (`authorization`, `AUTHORIZATION`, ...) is
	/// dropped first so exactly one credential goes on the wire.
	pub fn set_authorization(&self, value: String) {
		let mut options = self.0.write();

		options.headers.retain(|name, _| !name.eq_ignore_ascii_case(AUTHORIZATION));
		options.headers.insert(AUTHORIZATION.into(), value);
	}

	/// Reports whether both handles point at the same options value.
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}
}
impl From<RequestOptions> for SharedOptions {
	fn from(options: RequestOptions) -> Self {
		Self::new(options)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn options_deserialize_from_camel_case() {
		let options: RequestOptions = serde_json::from_str(
			r#"{"headers":{"X-Tenant":"acme"},"proxy":"http://proxy","includeResponseHeaders":true}"#,
		)
		.expect("Options JSON should deserialize.");

		assert_eq!(options.headers.get("X-Tenant").map(String::as_str), Some("acme"));
		assert_eq!(options.proxy.as_deref(), Some("http://proxy"));
		assert!(options.include_response_headers);

		let options: RequestOptions =
			serde_json::from_str("{}").expect("Empty options JSON should deserialize.");

		assert_eq!(options, RequestOptions::default());
	}

	#[test]
	fn authorization_updates_are_visible_through_clones() {
		let shared = SharedOptions::new(RequestOptions::default().with_header("Accept", "json"));
		let executor_view = shared.clone();

		shared.set_authorization("Bearer first".into());

		let seen = executor_view.read(|options| options.bearer().map(str::to_owned));

		assert_eq!(seen.as_deref(), Some("Bearer first"));

		shared.set_authorization("Bearer second".into());

		let snapshot = executor_view.snapshot();

		assert_eq!(snapshot.bearer(), Some("Bearer second"));
		assert_eq!(snapshot.headers.get("Accept").map(String::as_str), Some("json"));
		assert!(shared.ptr_eq(&executor_view));
	}

	#[test]
	fn authorization_replaces_any_header_spelling() {
		let shared = SharedOptions::new(
			RequestOptions::default()
				.with_header("authorization", "Basic stale")
				.with_header("AUTHORIZATION", "Basic older")
				.with_header("Accept", "json"),
		);

		assert_eq!(shared.snapshot().bearer().map(|v| v.starts_with("Basic")), Some(true));

		shared.set_authorization("Bearer fresh".into());

		let snapshot = shared.snapshot();
		let credentials = snapshot
			.headers
			.keys()
			.filter(|name| name.eq_ignore_ascii_case(AUTHORIZATION))
			.collect::<Vec<_>>();

		assert_eq!(credentials, vec![AUTHORIZATION]);
		assert_eq!(snapshot.bearer(), Some("Bearer fresh"));
		assert_eq!(snapshot.headers.get("Accept").map(String::as_str), Some("json"));
	}
}
