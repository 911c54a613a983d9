//! Provider descriptor data structures shared by token flows and order sources.
//!
//! A descriptor names the provider and pins every endpoint the ledger talks to, so tests can
//! point a provider at a mock server without touching adapter code.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Grant labels used in errors and observability.
pub mod grant;

pub use builder::*;
pub use grant::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Page the seller is sent to in order to grant access.
	pub authorization: Url,
	/// Endpoint exchanging an authorization code for tokens.
	pub token: Url,
	/// Endpoint exchanging a refresh token; equals `token` for standard OAuth providers.
	pub refresh: Url,
	/// Base URL for marketplace API calls.
	pub api_base: Url,
}

/// Immutable provider descriptor consumed by flows and order sources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Resolves an API path (e.g. `/orders/search`) against [`ProviderEndpoints::api_base`].
	pub fn api_url(&self, path: &str) -> Url {
		let mut url = self.endpoints.api_base.clone();
		let base = url.path().trim_end_matches('/').to_owned();

		url.set_path(&format!("{base}/{}", path.trim_start_matches('/')));

		url
	}
}
