//! Identifiers for the supported marketplaces and the accounts that own credentials.

// std
use std::ops::Deref;
// self
use crate::_prelude::*;

const KNOWN_PROVIDERS: [&str; 2] = ["mercadolibre", "shopee"];

/// Error returned when an identifier does not name a known marketplace or account.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentifierError {
	/// The provider is not one of the supported marketplaces.
	#[error("Unknown marketplace provider `{value}`; expected one of: mercadolibre, shopee.")]
	UnknownProvider {
		/// Rejected value.
		value: String,
	},
	/// The owner id was empty.
	#[error("Owner identifier cannot be empty.")]
	EmptyOwner,
	/// The owner id is not an unsigned decimal number.
	#[error("Owner identifier `{value}` is not a numeric seller or shop id.")]
	NonNumericOwner {
		/// Rejected value.
		value: String,
	},
}

/// Marketplace a credential was issued by; only `mercadolibre` and `shopee` are accepted.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProviderId(String);
impl ProviderId {
	/// Accepts the lowercase name of a supported marketplace.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		match KNOWN_PROVIDERS.iter().find(|known| **known == view) {
			Some(known) => Ok(Self((*known).to_owned())),
			None => Err(IdentifierError::UnknownProvider { value: view.to_owned() }),
		}
	}
}
impl Deref for ProviderId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for ProviderId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<ProviderId> for String {
	fn from(value: ProviderId) -> Self {
		value.0
	}
}
impl TryFrom<String> for ProviderId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Debug for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Provider({})", self.0)
	}
}
impl Display for ProviderId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Numeric account id: the Mercado Libre `user_id` or the Shopee `shop_id`.
///
/// Kept in its decimal text form since both marketplaces echo it back in paths and query strings.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);
impl OwnerId {
	/// Accepts a non-empty run of ASCII digits that fits in a `u64`.
	pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
		let view = value.as_ref();

		if view.is_empty() {
			return Err(IdentifierError::EmptyOwner);
		}
		// `u64::from_str` tolerates a leading `+`, which never appears in marketplace ids.
		if !view.bytes().all(|b| b.is_ascii_digit()) || view.parse::<u64>().is_err() {
			return Err(IdentifierError::NonNumericOwner { value: view.to_owned() });
		}

		Ok(Self(view.to_owned()))
	}

	/// Numeric value of the id.
	pub fn as_u64(&self) -> u64 {
		self.0.parse().unwrap_or_default()
	}
}
impl Deref for OwnerId {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for OwnerId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl From<OwnerId> for String {
	fn from(value: OwnerId) -> Self {
		value.0
	}
}
impl From<u64> for OwnerId {
	fn from(value: u64) -> Self {
		Self(value.to_string())
	}
}
impl TryFrom<String> for OwnerId {
	type Error = IdentifierError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Self::new(value)
	}
}
impl Debug for OwnerId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Owner({})", self.0)
	}
}
impl Display for OwnerId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
