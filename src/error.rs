//! Ledger-level error types shared across flows, providers, fetchers, and facades.

// self
use crate::_prelude::*;

/// Ledger-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Canonical ledger error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller input was malformed or out of range.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Token exchange, refresh, or interactive authorization failed.
	#[error(transparent)]
	Auth(#[from] AuthError),
	/// Upstream call failed at the network layer or returned a non-success status.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Upstream response could not be decoded.
	#[error(transparent)]
	Decode(#[from] DecodeError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),

	/// A paginated listing did not terminate within the page cap.
	#[error("Pagination of {endpoint} did not terminate within {max_pages} pages.")]
	PaginationLimit {
		/// Endpoint (without query) that kept yielding pages.
		endpoint: String,
		/// Cap that was exceeded.
		max_pages: usize,
	},
}
impl Error {
	/// Returns `true` when the error stems from caller input rather than upstream state.
	pub fn is_validation(&self) -> bool {
		matches!(self, Self::Validation(_))
	}
}

/// Caller input failures reported as 4xx/InvalidArgument by the facades.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// One or more period parameters were absent.
	#[error("Missing date parameters. Required: year1, month1, year2, month2")]
	MissingParameters,
	/// A period parameter was not an integer or was out of range.
	#[error("Invalid {name} parameter")]
	InvalidParameter {
		/// Parameter name as seen by the caller.
		name: &'static str,
	},
	/// The first period is after the second one.
	#[error("Invalid date range")]
	InvalidRange,
}

/// Authorization failures; unrecoverable within the current process.
#[derive(Debug, ThisError)]
pub enum AuthError {
	/// Provider rejected a code or refresh exchange.
	#[error("Provider `{provider}` rejected the {grant} exchange (status {status:?}): {body}.")]
	Rejected {
		/// Provider identifier.
		provider: String,
		/// Grant label (`authorization_code` or `refresh_token`).
		grant: &'static str,
		/// HTTP status, when the rejection came with one.
		status: Option<u16>,
		/// Provider error body or summarized OAuth error.
		body: String,
	},
	/// No credential is available and no interactive prompt is configured.
	#[error("Provider `{provider}` needs interactive authorization but no prompt is configured.")]
	InteractionUnavailable {
		/// Provider identifier.
		provider: String,
	},
	/// The pasted redirect URL could not be used.
	#[error("Authorization callback is invalid: {reason}.")]
	InvalidCallback {
		/// Human-readable reason.
		reason: String,
	},
	/// The callback `state` does not match the value sent with the authorize URL.
	#[error("Authorization state mismatch.")]
	StateMismatch,
	/// Token endpoint response omitted a required field.
	#[error("Token endpoint response is missing {field}.")]
	IncompleteResponse {
		/// Missing or invalid field name.
		field: &'static str,
	},
	/// The interactive prompt failed to read the callback.
	#[error("Authorization prompt failed.")]
	Prompt(#[source] std::io::Error),
}

/// Transport-level failures (network, IO, non-success statuses).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the marketplace.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the marketplace.")]
	Io(#[from] std::io::Error),
	/// Upstream replied with a status outside {200, 201}.
	#[error("{url} returned status {status}: {body}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Request URL without its query string.
		url: String,
		/// Response body preview for diagnostics.
		body: String,
	},
	/// Upstream replied 2xx but reported an error inside the payload.
	#[error("Marketplace API error `{error}`: {message}.")]
	Api {
		/// Provider error code.
		error: String,
		/// Provider error message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Builds a [`TransportError::Status`] while keeping queries and oversized bodies out.
	pub fn status(status: u16, url: &Url, body: &[u8]) -> Self {
		Self::Status { status, url: redact_query(url), body: body_preview(body) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Malformed upstream payloads.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// JSON could not be decoded into the expected schema.
	#[error("Failed to decode {context}.")]
	Json {
		/// Payload being decoded.
		context: &'static str,
		/// Structured parsing failure carrying the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A documented field was present but semantically unusable.
	#[error("Field `{field}` in {context} is invalid.")]
	InvalidField {
		/// Payload being decoded.
		context: &'static str,
		/// Offending field name.
		field: &'static str,
	},
}

/// Configuration and wiring failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Required environment variable is absent.
	#[error("Missing environment variable: {0}.")]
	MissingEnvVar(&'static str),
	/// Environment variable could not be interpreted.
	#[error("Invalid environment variable {name}: {reason}.")]
	InvalidEnvVar {
		/// Variable name.
		name: &'static str,
		/// Human-readable reason.
		reason: String,
	},
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// A configured or derived URL is invalid.
	#[error("URL is invalid.")]
	InvalidUrl(#[from] url::ParseError),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// A configured identifier is invalid.
	#[error(transparent)]
	Identifier(#[from] crate::auth::IdentifierError),
	/// Credential builder validation failed.
	#[error("Unable to build credential.")]
	CredentialBuild(#[from] crate::auth::CredentialBuilderError),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Decodes `bytes` as JSON, attaching the failing path to errors.
pub(crate) fn decode_json<T>(context: &'static str, bytes: &[u8]) -> Result<T, DecodeError>
where
	T: serde::de::DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(bytes);

	serde_path_to_error::deserialize(&mut de).map_err(|source| DecodeError::Json { context, source })
}

/// Renders a response body for diagnostics, truncated on a char boundary.
pub(crate) fn body_preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	if text.len() <= BODY_PREVIEW_LIMIT {
		return text.into_owned();
	}

	let mut end = BODY_PREVIEW_LIMIT;

	while !text.is_char_boundary(end) {
		end -= 1;
	}

	format!("{}...", &text[..end])
}

/// Drops the query string, which may carry signed access tokens.
pub(crate) fn redact_query(url: &Url) -> String {
	let mut url = url.clone();

	url.set_query(None);

	url.to_string()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_error_strips_query_and_truncates_body() {
		let url = Url::parse("https://partner.example.com/api/v2/order?access_token=secret&shop_id=1")
			.expect("Fixture URL should parse.");
		let body = "x".repeat(BODY_PREVIEW_LIMIT + 10);
		let err = TransportError::status(500, &url, body.as_bytes());

		match err {
			TransportError::Status { status, url, body } => {
				assert_eq!(status, 500);
				assert_eq!(url, "https://partner.example.com/api/v2/order");
				assert!(body.ends_with("..."));
				assert_eq!(body.len(), BODY_PREVIEW_LIMIT + 3);
			},
			other => panic!("Unexpected transport error: {other:?}."),
		}
	}

	#[test]
	fn decode_json_reports_the_failing_path() {
		#[derive(Debug, Deserialize)]
		struct Page {
			#[allow(dead_code)]
			results: Vec<u32>,
		}

		let err = decode_json::<Page>("fixture page", br#"{"results":[1,"two"]}"#)
			.expect_err("Mistyped element should fail.");
		let DecodeError::Json { source, .. } = err else {
			panic!("Decode failure should be a JSON error.");
		};

		assert_eq!(source.path().to_string(), "results[1]");
	}

	#[test]
	fn validation_messages_match_facade_contract() {
		assert_eq!(
			ValidationError::MissingParameters.to_string(),
			"Missing date parameters. Required: year1, month1, year2, month2"
		);
		assert_eq!(
			ValidationError::InvalidParameter { name: "month1" }.to_string(),
			"Invalid month1 parameter"
		);
		assert_eq!(ValidationError::InvalidRange.to_string(), "Invalid date range");
		assert!(Error::from(ValidationError::InvalidRange).is_validation());
	}
}
