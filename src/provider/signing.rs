//! Shopee request signing.
//!
//! Every call to the Shopee partner API carries a `sign` query parameter: the lowercase hex
//! HMAC-SHA256 of a base string keyed with the partner key. Token calls sign
//! `partner_id + path + timestamp`; shop-level calls append the access token and shop id.

// crates.io
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{_prelude::*, error::ConfigError};

type HmacSha256 = Hmac<Sha256>;

/// Builds the string that is signed for a call to `path` at `timestamp` (unix seconds).
///
/// `shop` carries `(access_token, shop_id)` for shop-level calls.
pub fn base_string(partner_id: i64, path: &str, timestamp: i64, shop: Option<(&str, i64)>) -> String {
	match shop {
		Some((access_token, shop_id)) =>
			format!("{partner_id}{path}{timestamp}{access_token}{shop_id}"),
		None => format!("{partner_id}{path}{timestamp}"),
	}
}

/// Signs `base` with the partner key.
pub fn signature(partner_key: &[u8], base: &str) -> Result<String, ConfigError> {
	let mut mac = HmacSha256::new_from_slice(partner_key).map_err(|e| {
		ConfigError::InvalidEnvVar { name: "APP_SECRET_KEY_SHP", reason: e.to_string() }
	})?;

	mac.update(base.as_bytes());

	Ok(hex::encode(mac.finalize().into_bytes()))
}
