//! Marketplace descriptors (data) and strategies (behavior).
//!
//! `descriptor` pins the endpoints a marketplace exposes. [`ProviderStrategy`] is the seam
//! the token broker and the authenticated fetcher use to build authorize URLs, run token
//! exchanges, and sign API calls without knowing which marketplace they talk to.

pub mod descriptor;
pub mod mercadolibre;
pub mod shopee;
pub mod signing;
pub mod strategy;

pub use descriptor::*;
pub use mercadolibre::MercadoLibre;
pub use shopee::Shopee;
pub use strategy::*;

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Application credentials registered with a marketplace.
///
/// For Shopee `client_id` is the numeric partner id and `client_secret` the partner key.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
	/// Application (or partner) identifier.
	pub client_id: String,
	/// Application secret (or partner key).
	pub client_secret: TokenSecret,
	/// Redirect URI registered for the authorization callback.
	pub redirect_uri: Url,
}
