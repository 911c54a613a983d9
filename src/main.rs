//! `seller-ledger` binary: authorizes against the configured marketplace, then serves order
//! totals over HTTP until Ctrl-C or SIGTERM.

// std
use std::sync::Arc;
// crates.io
use color_eyre::{Result, eyre::WrapErr};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
// self
use seller_ledger::{
	config::{ProviderKind, Settings},
	fetch::AuthenticatedFetcher,
	flows::{ConsolePrompt, TokenBroker},
	http::ReqwestHttpClient,
	market::{MercadoLibreOrders, ShopeeOrders},
	provider::{MercadoLibre, ProviderStrategy, Shopee},
	server,
	service::{OrderService, OrdersBackend},
	store::FileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	dotenvy::dotenv().ok();

	let settings = Settings::from_env()?;
	let filter =
		EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&settings.log_filter))?;

	tracing_subscriber::fmt().with_env_filter(filter).init();

	let http = ReqwestHttpClient::with_timeout(settings.http_timeout)?;
	let strategy: Arc<dyn ProviderStrategy> = match settings.provider {
		ProviderKind::MercadoLibre =>
			Arc::new(MercadoLibre::new(MercadoLibre::default_descriptor()?, settings.client.clone())),
		ProviderKind::Shopee =>
			Arc::new(Shopee::new(Shopee::default_descriptor()?, settings.client.clone())?),
	};
	let store = Arc::new(FileStore::new(settings.credentials_path()));
	let broker = Arc::new(
		TokenBroker::new(strategy, store, http).with_prompt(Arc::new(ConsolePrompt::new())),
	);

	broker.credential().await.wrap_err("Initial authorization failed.")?;

	let fetcher = AuthenticatedFetcher::new(broker);
	let backend: Arc<dyn OrdersBackend> = match settings.provider {
		ProviderKind::MercadoLibre => Arc::new(
			MercadoLibreOrders::new(fetcher).with_snapshot_path(settings.snapshot_path.clone()),
		),
		ProviderKind::Shopee =>
			Arc::new(ShopeeOrders::new(fetcher).with_batch_delay(settings.shopee_batch_delay)),
	};
	let app = server::router(OrderService::new(backend));
	let listener = TcpListener::bind(settings.bind_addr)
		.await
		.wrap_err_with(|| format!("Failed to bind {}.", settings.bind_addr))?;

	tracing::info!(provider = %settings.provider, addr = %settings.bind_addr, "serving order totals");

	axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			tracing::warn!(error = %e, "ctrl-c handler unavailable");
			std::future::pending::<()>().await;
		}
	};
	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			},
			Err(e) => {
				tracing::warn!(error = %e, "SIGTERM handler unavailable");
				std::future::pending::<()>().await;
			},
		}
	};
	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}

	tracing::info!("shutdown signal received");
}
