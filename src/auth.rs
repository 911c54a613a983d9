//! Auth-domain identifiers, secrets, and the persisted marketplace credential.

pub mod credential;
pub mod id;
pub mod secret;

pub use credential::*;
pub use id::*;
pub use secret::*;
