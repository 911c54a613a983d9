//! Pure parsers from marketplace payloads to [`Order`](crate::orders::Order)s.
//!
//! Nullable or absent numerics decode as zero; malformed JSON surfaces as
//! [`DecodeError::Json`](crate::error::DecodeError::Json) with the failing path.

pub mod mercadolibre;
pub mod shopee;

// crates.io
use serde::Deserializer;
// self
use crate::_prelude::*;

/// Accepts a JSON number, a numeric string, or `null`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(f64),
		Text(String),
	}

	match Option::<Raw>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Raw::Number(value)) => Ok(Some(value)),
		Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
		Some(Raw::Text(text)) => text.trim().parse().map(Some).map_err(serde::de::Error::custom),
	}
}
