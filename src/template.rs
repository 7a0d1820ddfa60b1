//! Resource URL templates and the parameters rendered into them.
//!
//! A template is a URL string with at most one path placeholder, written as a `:name` path
//! segment (conventionally `:id`). Rendering substitutes the parameter named like the
//! placeholder into the path and turns every other parameter into a query pair. Each value is
//! percent-encoded exactly once with the URI component encode set, so `auth0|1234/5678`
//! becomes `auth0%7C1234%2F5678`.

// crates.io
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
// self
use crate::{_prelude::*, error::ArgumentError};

/// Characters left untouched by URI component encoding.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'_')
	.remove(b'.')
	.remove(b'!')
	.remove(b'~')
	.remove(b'*')
	.remove(b'\'')
	.remove(b'(')
	.remove(b')');

/// Percent-encodes a single path segment or query component.
pub fn encode_component(value: &str) -> String {
	utf8_percent_encode(value, COMPONENT).to_string()
}

/// Ordered operation parameters.
///
/// Keys keep the order they were inserted in; the client passes them to the executor untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);
impl Params {
	/// Creates an empty parameter list.
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a parameter, replacing the value of an existing key in place.
	pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
		self.insert(key, value);

		self
	}

	/// Sets `key` to `value`, keeping the original position of an existing key.
	pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
		let key = key.into();
		let value = value.to_string();

		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => *slot = value,
			None => self.0.push((key, value)),
		}
	}

	/// Returns the value stored for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Iterates over `(key, value)` pairs in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns `true` when no parameters are set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<()> for Params {
	fn from(_: ()) -> Self {
		Self::default()
	}
}
impl<K, V, const N: usize> From<[(K, V); N]> for Params
where
	K: Into<String>,
	V: ToString,
{
	fn from(pairs: [(K, V); N]) -> Self {
		pairs.into_iter().collect()
	}
}
impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: ToString,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		let mut params = Self::default();

		for (key, value) in iter {
			params.insert(key, value);
		}

		params
	}
}

/// Parsed resource URL template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceUrlTemplate {
	raw: String,
	placeholder: Option<String>,
}
impl ResourceUrlTemplate {
	/// Validates `raw` and records its placeholder, if any.
	///
	/// Rejects empty templates, templates with more than one placeholder, and absolute URLs that
	/// do not parse. Relative templates are accepted as-is.
	pub fn parse(raw: impl Into<String>) -> Result<Self, ArgumentError> {
		let raw = raw.into();
		let invalid = |reason| ArgumentError::InvalidResourceUrl { url: raw.clone(), reason };

		if raw.trim().is_empty() {
			return Err(invalid("template is empty"));
		}

		let mut placeholders = path_of(&raw).split('/').filter_map(placeholder_name);
		let placeholder = placeholders.next().map(str::to_owned);

		if placeholders.next().is_some() {
			return Err(invalid("template declares more than one placeholder"));
		}
		if raw.contains("://") && Url::parse(&raw).is_err() {
			return Err(invalid("template is not a valid URL"));
		}

		Ok(Self { raw, placeholder })
	}

	/// Template string exactly as supplied.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Name of the path placeholder (without the leading `:`).
	pub fn placeholder(&self) -> Option<&str> {
		self.placeholder.as_deref()
	}

	/// Renders the template against `params`.
	///
	/// The placeholder parameter is encoded into the path; an unset placeholder drops its
	/// segment. Remaining parameters are appended as `key=value` query pairs in order.
	pub fn render(&self, params: &Params) -> String {
		let (base, existing_query) = match self.raw.split_once('?') {
			Some((base, query)) => (base, Some(query)),
			None => (self.raw.as_str(), None),
		};
		let path_start = path_start(base);
		let (head, path) = base.split_at(path_start);
		let mut rendered = String::from(head);
		let mut first = true;

		for segment in path.split('/') {
			let piece = match placeholder_name(segment) {
				Some(name) => match params.get(name) {
					Some(value) => encode_component(value),
					None => continue,
				},
				None => segment.to_owned(),
			};

			if !first {
				rendered.push('/');
			}

			rendered.push_str(&piece);

			first = false;
		}

		let query = params
			.iter()
			.filter(|(key, _)| Some(*key) != self.placeholder())
			.map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
			.collect::<Vec<_>>();
		let mut separator = '?';

		if let Some(existing) = existing_query.filter(|q| !q.is_empty()) {
			rendered.push('?');
			rendered.push_str(existing);

			separator = '&';
		}
		if !query.is_empty() {
			rendered.push(separator);
			rendered.push_str(&query.join("&"));
		}

		rendered
	}
}
impl Display for ResourceUrlTemplate {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.raw)
	}
}

fn placeholder_name(segment: &str) -> Option<&str> {
	let name = segment.strip_prefix(':')?;

	(!name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_'))
		.then_some(name)
}

// Byte offset where the path begins, skipping `scheme://authority` for absolute templates.
fn path_start(base: &str) -> usize {
	match base.find("://") {
		Some(idx) => {
			let authority = idx + 3;

			base[authority..].find('/').map_or(base.len(), |offset| authority + offset)
		},
		None => 0,
	}
}

fn path_of(raw: &str) -> &str {
	let base = raw.split_once('?').map_or(raw, |(base, _)| base);

	&base[path_start(base)..]
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const API_URL: &str = "https://tenant.auth0.com";

	fn template(raw: &str) -> ResourceUrlTemplate {
		ResourceUrlTemplate::parse(raw).expect("Template should parse.")
	}

	#[test]
	fn placeholder_value_is_fully_encoded() {
		let tpl = template(&format!("{API_URL}/some-resource/:id"));

		assert_eq!(tpl.placeholder(), Some("id"));
		assert_eq!(
			tpl.render(&Params::from([("id", "auth0|1234")])),
			"https://tenant.auth0.com/some-resource/auth0%7C1234"
		);
		assert_eq!(
			tpl.render(&Params::from([("id", "auth0|1234/5678")])),
			"https://tenant.auth0.com/some-resource/auth0%7C1234%2F5678"
		);
	}

	#[test]
	fn other_params_become_independent_query_pairs() {
		let tpl = template(&format!("{API_URL}/some-resource/:id"));
		let params = Params::new()
			.with("id", "1234")
			.with("otherEncoded", "auth0|6789")
			.with("other", "foobar");

		assert_eq!(
			tpl.render(&params),
			"https://tenant.auth0.com/some-resource/1234?otherEncoded=auth0%7C6789&other=foobar"
		);
	}

	#[test]
	fn encoded_looking_values_are_encoded_once() {
		let tpl = template(&format!("{API_URL}/some-resource"));

		assert_eq!(
			tpl.render(&Params::from([("q", "auth0%7C1")])),
			"https://tenant.auth0.com/some-resource?q=auth0%257C1"
		);
	}

	#[test]
	fn missing_placeholder_drops_segment() {
		let tpl = template(&format!("{API_URL}/some-resource/:id"));

		assert_eq!(tpl.render(&Params::default()), "https://tenant.auth0.com/some-resource");
		assert_eq!(tpl.render(&Params::from(())), tpl.render(&Params::new()));
	}

	#[test]
	fn ports_and_existing_queries_survive() {
		let tpl = template("http://localhost:8080/api/v2/users/:id?fields=name");

		assert_eq!(tpl.placeholder(), Some("id"));
		assert_eq!(
			tpl.render(&Params::new().with("id", "a b").with("page", 2)),
			"http://localhost:8080/api/v2/users/a%20b?fields=name&page=2"
		);
	}

	#[test]
	fn relative_templates_render() {
		let tpl = template("/some-resource/:id");

		assert_eq!(tpl.render(&Params::from([("id", "7")])), "/some-resource/7");
	}

	#[test]
	fn invalid_templates_are_rejected() {
		for raw in ["", "   ", "https://tenant.auth0.com/:a/:b", "https://:/x"] {
			let err = ResourceUrlTemplate::parse(raw).expect_err("Template should be rejected.");

			assert!(matches!(err, ArgumentError::InvalidResourceUrl { .. }), "{raw}: {err:?}");
		}
	}

	#[test]
	fn params_keep_insertion_order_and_replace_in_place() {
		let params = Params::new().with("b", 1).with("a", 2).with("b", 3);

		assert_eq!(params.iter().collect::<Vec<_>>(), vec![("b", "3"), ("a", "2")]);
		assert_eq!(params.len(), 2);
	}
}
