//! HTTP API server

use axum::{
    http::{
        header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{
    access_gate, AccessGate, Authenticator, CredentialStore, InMemoryCredentialStore,
    PasswordHasher, Requirement, RouteAuthorizationPolicy, TokenCodec,
};
use crate::config::{Config, CorsConfig, DEFAULT_JWT_SECRET};
use crate::error::{Error, Result};

use super::routes;

/// Application state shared across handlers.
///
/// Built once at startup and never mutated afterwards.
pub struct AppState {
    pub config: Config,
    pub authenticator: Authenticator,
    pub codec: Arc<TokenCodec>,
    pub gate: Arc<AccessGate>,
}

pub type SharedState = Arc<AppState>;

/// Routes mounted under the API prefix that must never be served anonymously
pub const PROTECTED_ROUTES: [&str; 2] = ["/testing/me", "/testing/admin"];

impl AppState {
    /// Build state with an in-memory store seeded from `[[accounts]]`
    pub fn from_config(config: Config) -> Result<Self> {
        let accounts = config
            .accounts
            .iter()
            .map(|account| account.to_principal())
            .collect::<Result<Vec<_>>>()?;
        let store = InMemoryCredentialStore::with_accounts(accounts)?;
        tracing::info!("Loaded {} account(s) into the credential store", store.len());

        Self::with_store(config, Arc::new(store))
    }

    pub fn with_store(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("Using the built-in JWT secret; set auth.jwt_secret for production");
        }

        let codec = Arc::new(TokenCodec::from_config(&config.auth)?);
        let policy = RouteAuthorizationPolicy::from_rules(&config.route_rules())?;
        ensure_protected_routes_covered(&policy, config.api_prefix())?;
        let policy = Arc::new(policy);
        let gate = Arc::new(AccessGate::new(codec.clone(), policy));
        let authenticator =
            Authenticator::new(store, PasswordHasher::new(config.auth.bcrypt_cost))?;

        Ok(Self {
            config,
            authenticator,
            codec,
            gate,
        })
    }
}

fn ensure_protected_routes_covered(policy: &RouteAuthorizationPolicy, prefix: &str) -> Result<()> {
    for route in PROTECTED_ROUTES {
        let path = format!("{}{}", prefix, route);
        if policy.requirement_for(&path) != Requirement::Authenticated {
            return Err(Error::Config(format!(
                "no route rule requires authentication for '{}'",
                path
            )));
        }
    }
    Ok(())
}

/// Run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);

    let app = create_router(state)?;

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: SharedState) -> Result<Router> {
    let prefix = state.config.api_prefix().to_string();
    let cors = cors_layer(&state.config.cors)?;
    let gate = state.gate.clone();

    let mut router = Router::new().route("/api/health", get(routes::health));

    for login in ["login", "patient/login", "doctor/login", "admin/login"] {
        router = router.route(&format!("{}/public/{}", prefix, login), post(routes::login));
    }

    Ok(router
        .route(
            &format!("{}/public/patient/create", prefix),
            post(routes::create_patient),
        )
        .route(&format!("{}{}", prefix, PROTECTED_ROUTES[0]), get(routes::me))
        .route(&format!("{}{}", prefix, PROTECTED_ROUTES[1]), get(routes::admin_only))
        // Middleware, innermost first
        .layer(middleware::from_fn_with_state(gate, access_gate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state))
}

/// CORS policy: configured origins, fixed methods and headers, credentials allowed
pub fn cors_layer(config: &CorsConfig) -> Result<CorsLayer> {
    let origins = config
        .allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| Error::Config(format!("invalid CORS origin '{}'", origin)))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE])
        .allow_credentials(true))
}
