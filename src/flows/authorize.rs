//! First-time authorization: authorize URL, human approval, pasted redirect, code exchange.

// std
use std::{
	io,
	process::{Command, Stdio},
};
// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::Credential,
	error::AuthError,
	flows::{TokenBroker, TokenState},
	obs::{self, FlowKind},
	provider::AuthorizationCallback,
};

const STATE_LEN: usize = 32;

/// Future returned by [`AuthorizationPrompt::request_authorization`].
pub type PromptFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a + Send>>;

/// Hands an authorize URL to a human and returns the redirect URL they paste back.
pub trait AuthorizationPrompt
where
	Self: Send + Sync,
{
	/// Presents `url` and resolves with the pasted redirect URL.
	fn request_authorization<'a>(&'a self, url: &'a Url) -> PromptFuture<'a>;
}

/// Terminal prompt: opens the browser when possible, prints the URL, and reads one line from
/// stdin on a blocking task.
#[derive(Clone, Debug)]
pub struct ConsolePrompt {
	open_browser: bool,
}
impl ConsolePrompt {
	/// Creates a prompt that also tries to open the system browser.
	pub fn new() -> Self {
		Self { open_browser: true }
	}

	/// Only prints the URL; useful on headless hosts.
	pub fn without_browser(mut self) -> Self {
		self.open_browser = false;

		self
	}
}
impl Default for ConsolePrompt {
	fn default() -> Self {
		Self::new()
	}
}
impl AuthorizationPrompt for ConsolePrompt {
	fn request_authorization<'a>(&'a self, url: &'a Url) -> PromptFuture<'a> {
		Box::pin(async move {
			if self.open_browser && open_in_browser(url).is_err() {
				tracing::debug!("could not open a browser");
			}

			eprintln!("Open the following URL and authorize the application:\n\n{url}\n");
			eprint!("Paste the redirect URL here: ");

			let line = tokio::task::spawn_blocking(|| {
				let mut line = String::new();

				io::stdin().read_line(&mut line).map(|_| line)
			})
			.await
			.map_err(|e| AuthError::Prompt(io::Error::other(e)))?
			.map_err(AuthError::Prompt)?;

			Ok(line)
		})
	}
}

impl TokenBroker {
	pub(crate) async fn authorize_interactively(&self) -> Result<Credential> {
		let prompt = self.prompt.as_ref().ok_or_else(|| AuthError::InteractionUnavailable {
			provider: self.strategy.descriptor().id.to_string(),
		})?;

		self.set_state(TokenState::AwaitingUserAction);
		self.metrics.record_attempt();

		let marketplace = &*self.strategy.descriptor().id;
		let authorize = async {
			let state = random_state();
			let url = self.strategy.authorization_url(&state, OffsetDateTime::now_utc())?;

			tracing::info!(
				provider = %self.strategy.descriptor().id,
				"waiting for the seller to authorize the application"
			);

			let pasted = prompt.request_authorization(&url).await?;
			let callback = AuthorizationCallback::parse(&pasted)?;

			self.strategy.validate_callback(&callback, &state)?;

			let credential = self.strategy.exchange_code(&self.http, &callback).await?;

			self.store.save(credential.clone()).await?;

			tracing::info!(
				provider = %credential.provider,
				owner = %credential.owner_id,
				expires_at = %credential.expires_at,
				"authorization code exchanged"
			);

			Ok(credential)
		};
		let result =
			obs::observe(FlowKind::AuthorizationCode, marketplace, "authorize_interactively", authorize)
				.await;

		match &result {
			Ok(_) => self.metrics.record_authorization(),
			Err(_) => self.metrics.record_failure(),
		}

		result
	}
}

fn random_state() -> String {
	rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
}

fn open_in_browser(url: &Url) -> io::Result<()> {
	let program = if cfg!(target_os = "macos") {
		"open"
	} else if cfg!(target_os = "windows") {
		"explorer"
	} else {
		"xdg-open"
	};

	Command::new(program)
		.arg(url.as_str())
		.stdin(Stdio::null())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn()
		.map(|_| ())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn state_is_alphanumeric_and_unique() {
		let first = random_state();
		let second = random_state();

		assert_eq!(first.len(), STATE_LEN);
		assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(first, second);
	}
}
