//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::services::{
    CatalogRegistry, PropagationEngine, RateRegistry, TariffResolver,
};
use crate::domain::FallbackTariff;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::repositories::SeaOrmRatebookLookup;
use crate::interfaces::http::common::{ApiResponse, ListResponse};
use crate::interfaces::http::middleware::{identity_middleware, IdentityState};
use crate::interfaces::http::modules::health::{self, HealthState};
use crate::interfaces::http::modules::metrics::{
    http_metrics_middleware, prometheus_metrics, MetricsState,
};
use crate::interfaces::http::modules::request_id::request_id_middleware;
use crate::interfaces::http::modules::{catalogs, ratebook, rates};

/// Services shared by every API handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub rates: Arc<RateRegistry>,
    pub catalogs: Arc<CatalogRegistry>,
    pub ratebook: Arc<PropagationEngine>,
    pub resolver: Arc<TariffResolver>,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, fallback: FallbackTariff) -> Self {
        let lookup = Arc::new(SeaOrmRatebookLookup::new(db.clone()));
        Self {
            rates: Arc::new(RateRegistry::new(db.clone())),
            catalogs: Arc::new(CatalogRegistry::new(db.clone())),
            ratebook: Arc::new(PropagationEngine::new(db.clone())),
            resolver: Arc::new(TariffResolver::new(lookup, fallback)),
            started_at: Arc::new(Instant::now()),
            db,
        }
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Optional router features
#[derive(Clone, Default)]
pub struct RouterOptions {
    /// Require a bearer JWT on `/api/v1` routes
    pub identity: Option<JwtConfig>,
    /// Serve `/metrics` and record HTTP metrics
    pub metrics: Option<PrometheusHandle>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token (HS256)"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Rates
        rates::list_rates,
        rates::create_rate,
        rates::get_rate,
        rates::update_rate,
        rates::delete_rate,
        // Catalogs
        catalogs::list_catalogs,
        catalogs::create_catalog,
        catalogs::get_catalog,
        catalogs::update_catalog,
        catalogs::delete_catalog,
        catalogs::list_catalog_rates,
        catalogs::assign_rate,
        catalogs::unassign_rate,
        // Ratebook
        ratebook::list_entries,
        ratebook::create_entry,
        ratebook::subscribe,
        ratebook::match_tariff,
        ratebook::get_entry,
        ratebook::edit_entry,
        ratebook::delete_entry,
    ),
    components(
        schemas(
            ApiResponse<String>,
            ListResponse<rates::RateResponse>,
            health::HealthResponse,
            health::ComponentHealth,
            rates::PricingDto,
            rates::PricingPatchDto,
            rates::RateResponse,
            catalogs::CatalogResponse,
            catalogs::CatalogRequest,
            catalogs::AssignmentResponse,
            ratebook::EntryResponse,
            ratebook::CreateEntryRequest,
            ratebook::SubscribeRequest,
            ratebook::TariffResponse,
            ratebook::TariffBody,
            ratebook::DefaultTariffResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Rates", description = "Canonical pricing rules; updates fan out to dependent ratebook entries"),
        (name = "Catalogs", description = "Named groups of rates and their assignments"),
        (name = "Ratebook", description = "Per client/warehouse tariffs and tariff resolution"),
    ),
    info(
        title = "Ratebook Tariff Engine API",
        version = "1.0.0",
        description = "Rates, catalogs and per client/warehouse ratebooks with reactive propagation",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/rates", get(rates::list_rates).post(rates::create_rate))
        .route(
            "/rates/{id}",
            get(rates::get_rate)
                .put(rates::update_rate)
                .delete(rates::delete_rate),
        )
        .route(
            "/catalogs",
            get(catalogs::list_catalogs).post(catalogs::create_catalog),
        )
        .route(
            "/catalogs/{id}",
            get(catalogs::get_catalog)
                .put(catalogs::update_catalog)
                .delete(catalogs::delete_catalog),
        )
        .route("/catalogs/{id}/rates", get(catalogs::list_catalog_rates))
        .route(
            "/catalogs/{id}/rates/{rate_id}",
            put(catalogs::assign_rate).delete(catalogs::unassign_rate),
        )
        .route(
            "/ratebook",
            get(ratebook::list_entries).post(ratebook::create_entry),
        )
        .route("/ratebook/subscriptions", post(ratebook::subscribe))
        .route("/ratebook/match", get(ratebook::match_tariff))
        .route(
            "/ratebook/{id}",
            get(ratebook::get_entry)
                .put(ratebook::edit_entry)
                .delete(ratebook::delete_entry),
        )
}

/// Create the API router with all routes
pub fn create_api_router(state: AppState, options: RouterOptions) -> Router {
    let mut api = api_routes();
    if let Some(jwt_config) = options.identity {
        api = api.layer(middleware::from_fn_with_state(
            IdentityState { jwt_config },
            identity_middleware,
        ));
    }

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(HealthState::from_ref(&state));

    let mut app = Router::new()
        .nest("/api/v1", api.with_state(state))
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()));

    if let Some(handle) = options.metrics {
        app = app
            .layer(middleware::from_fn(http_metrics_middleware))
            .merge(
                Router::new()
                    .route("/metrics", get(prometheus_metrics))
                    .with_state(MetricsState { handle }),
            );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
}
