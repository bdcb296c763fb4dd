//! Trace Backend
//!
//! REST backend for a transparent crowdfunding platform: project catalog,
//! company dashboard, donation wizard, wallet session, Stellar network access
//! and a SQLite marketplace ledger.

mod api;
mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod marketplace;
mod models;
mod stellar;
mod wallet;
mod wizard;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::{Repository, SqliteSessionStore};
use marketplace::Marketplace;
use stellar::StellarService;
use wallet::{MockWalletKit, WalletConnector, WalletSession};
use wizard::{Settlement, SimulatedSettlement, WizardRegistry};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub market: Arc<Marketplace>,
    pub config: Arc<Config>,
    pub wizards: WizardRegistry,
    pub settlement: Arc<dyn Settlement>,
    pub wallet: Arc<WalletSession>,
    pub stellar: Arc<StellarService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Trace Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!("Horizon: {}", config.network.horizon_url);

    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (TRACE_API_PSK). Authentication is disabled!");
    }

    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool.clone()));
    let market = Arc::new(Marketplace::new(&repo));

    // The mock is the only kit that runs server-side
    let kit = Arc::new(MockWalletKit::new(config.mock_wallet_delay));
    let connector = WalletConnector::new(
        kit,
        config.network.network_passphrase.clone(),
        config.wallet_connect_timeout,
    );
    let wallet = Arc::new(WalletSession::new(
        connector,
        Arc::new(SqliteSessionStore::new(pool)),
    ));
    let restored = wallet.load().await?;
    if let Some(address) = restored.short_address {
        tracing::info!("Wallet session restored: {}", address);
    }

    let stellar = Arc::new(StellarService::new(
        config.network.clone(),
        config.http_timeout,
    )?);

    let wizards = WizardRegistry::with_idle_timeout(config.wizard_idle_timeout);
    {
        let wizards = wizards.clone();
        let period = config.wizard_idle_timeout.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = wizards.sweep().await;
                if evicted > 0 {
                    tracing::debug!("Swept {} idle donation wizards", evicted);
                }
            }
        });
    }

    let state = AppState {
        repo,
        market,
        config: Arc::new(config.clone()),
        wizards,
        settlement: Arc::new(SimulatedSettlement::new(config.settlement_delay)),
        wallet,
        stellar,
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let psk = state.config.api_psk.clone();

    let api_routes = Router::new()
        .route("/revision", get(api::get_revision))
        // Catalog
        .route("/projects", get(api::list_projects))
        .route("/projects/{id}", get(api::get_project))
        .route("/catalog/summary", get(api::catalog_summary))
        .route("/catalog/filters", get(api::catalog_filters))
        // Company dashboard
        .route("/company/dashboard", get(api::company_dashboard))
        .route("/company/donations", get(api::company_donations))
        // Donation wizard
        .route("/projects/{id}/wizard", post(api::start_wizard))
        .route("/wizards/{id}", get(api::get_wizard).delete(api::discard_wizard))
        .route("/wizards/{id}/amount", post(api::submit_amount))
        .route("/wizards/{id}/payment", post(api::select_payment))
        .route("/wizards/{id}/back", post(api::go_back))
        .route("/wizards/{id}/confirm", post(api::confirm_donation))
        .route("/wizards/{id}/reset", post(api::reset_wizard))
        // Wallet
        .route("/wallet", get(api::wallet_status))
        .route("/wallet/connect", post(api::connect_wallet))
        .route("/wallet/cancel", post(api::cancel_wallet_connect))
        .route("/wallet/disconnect", post(api::disconnect_wallet))
        .route("/wallet/sign", post(api::sign_transaction))
        // Network
        .route("/network", get(api::network_info))
        .route("/network/health", get(api::network_health))
        .route("/accounts/{address}", get(api::load_account))
        .route("/accounts/{address}/transactions", get(api::account_transactions))
        .route("/accounts/{address}/payments", get(api::account_payments))
        .route("/transactions", post(api::submit_transaction))
        // Marketplace
        .route(
            "/marketplace/projects",
            get(api::list_market_projects).post(api::create_market_project),
        )
        .route("/marketplace/projects/{id}", get(api::get_market_project))
        .route(
            "/marketplace/projects/{id}/donations",
            get(api::list_market_donations).post(api::donate),
        )
        .route(
            "/marketplace/projects/{id}/updates",
            get(api::list_market_updates).post(api::add_market_update),
        )
        .route(
            "/marketplace/projects/{id}/milestones",
            get(api::list_market_milestones),
        )
        .route(
            "/marketplace/projects/{id}/milestones/{index}/complete",
            post(api::complete_market_milestone),
        )
        .route("/marketplace/projects/{id}/summary", get(api::market_summary))
        .route("/marketplace/projects/{id}/stats", get(api::market_stats))
        .route("/marketplace/projects/{id}/location", get(api::market_location))
        .route(
            "/marketplace/projects/{id}/impact-area",
            get(api::market_impact_area),
        )
        .route(
            "/marketplace/projects/{id}/problem-statement",
            get(api::market_problem_statement),
        )
        .route(
            "/marketplace/projects/{id}/impact",
            get(api::get_impacted_people).put(api::set_impacted_people),
        )
        .route(
            "/marketplace/donors/{donor}/impact",
            get(api::get_donor_impacted_people),
        )
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
