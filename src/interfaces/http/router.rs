//! API Router with Swagger UI

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{
    AdmissionController, AdmissionSettings, BookingQueries, CancellationHandler,
    CapacityAggregator, CatalogAdmin, PaymentRecorder,
};
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ErrorResponse, PaginatedResponse};
use crate::interfaces::http::middleware::{auth_middleware, require_admin, AuthState};
use crate::interfaces::http::modules::{admin, bookings, health, metrics};
use crate::notifications::SharedEventBus;
use crate::shared::time::SharedClock;

/// Everything the HTTP layer needs. Handlers extract their own slice of it
/// through `FromRef`.
#[derive(Clone)]
pub struct ApiContext {
    pub repos: Arc<dyn RepositoryProvider>,
    pub admission: Arc<AdmissionController>,
    pub cancellation: Arc<CancellationHandler>,
    pub queries: Arc<BookingQueries>,
    pub payments: Arc<PaymentRecorder>,
    pub capacity: Arc<CapacityAggregator>,
    pub catalog: Arc<CatalogAdmin>,
    pub jwt_config: JwtConfig,
    pub prometheus: Option<PrometheusHandle>,
    pub started_at: Arc<Instant>,
}

impl ApiContext {
    /// Wire every application service over one repository provider and bus.
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        event_bus: SharedEventBus,
        clock: SharedClock,
        settings: AdmissionSettings,
        jwt_config: JwtConfig,
    ) -> Self {
        let timeout: Duration = settings.storage_timeout;
        Self {
            admission: Arc::new(AdmissionController::new(
                repos.clone(),
                event_bus.clone(),
                clock.clone(),
                settings,
            )),
            cancellation: Arc::new(CancellationHandler::new(
                repos.clone(),
                event_bus.clone(),
                clock.clone(),
                timeout,
            )),
            queries: Arc::new(BookingQueries::new(repos.clone(), timeout)),
            payments: Arc::new(PaymentRecorder::new(repos.clone(), event_bus, clock, timeout)),
            capacity: Arc::new(CapacityAggregator::new(repos.clone(), timeout)),
            catalog: Arc::new(CatalogAdmin::new(repos.clone(), timeout)),
            repos,
            jwt_config,
            prometheus: None,
            started_at: Arc::new(Instant::now()),
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<ApiContext> for bookings::BookingsState {
    fn from_ref(c: &ApiContext) -> Self {
        Self {
            admission: Arc::clone(&c.admission),
            cancellation: Arc::clone(&c.cancellation),
            queries: Arc::clone(&c.queries),
        }
    }
}

impl FromRef<ApiContext> for admin::AdminState {
    fn from_ref(c: &ApiContext) -> Self {
        Self {
            queries: Arc::clone(&c.queries),
            payments: Arc::clone(&c.payments),
            capacity: Arc::clone(&c.capacity),
            catalog: Arc::clone(&c.catalog),
        }
    }
}

impl FromRef<ApiContext> for health::HealthState {
    fn from_ref(c: &ApiContext) -> Self {
        Self {
            repos: Arc::clone(&c.repos),
            started_at: Arc::clone(&c.started_at),
        }
    }
}

impl FromRef<ApiContext> for AuthState {
    fn from_ref(c: &ApiContext) -> Self {
        Self {
            jwt_config: c.jwt_config.clone(),
        }
    }
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
                        .description(Some("Session token issued by the identity provider"))
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
        health::health_check,
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::get_booking,
        bookings::cancel_booking,
        admin::list_all_bookings,
        admin::mark_booking_paid,
        admin::get_stats,
        admin::get_occupancy,
        admin::list_sold_out,
        admin::update_tour_status,
        admin::update_tour_capacity,
    ),
    components(
        schemas(
            ErrorResponse,
            PaginatedResponse<bookings::BookingDto>,
            health::HealthResponse,
            health::ComponentHealth,
            bookings::CreateBookingRequest,
            bookings::CreatedBooking,
            bookings::CreatedBookingResponse,
            bookings::BookingDto,
            bookings::BookingResponse,
            bookings::BookingListResponse,
            admin::StatsResponse,
            admin::TourActivityDto,
            admin::OccupancyResponse,
            admin::SoldOutDto,
            admin::SoldOutResponse,
            admin::TourStatusDto,
            admin::UpdateTourStatusRequest,
            admin::UpdateTourCapacityRequest,
            admin::TourDto,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Bookings", description = "Booking submission, listing and cancellation"),
        (
            name = "Admin",
            description = "Ledger, payment confirmation, capacity and catalog administration"
        ),
    ),
    info(
        title = "Tour Booking API",
        version = "1.0.0",
        description = "Admission, pricing and capacity tracking for tour bookings",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState::from_ref(&ctx);

    let booking_routes = Router::new()
        .route(
            "/",
            get(bookings::list_my_bookings).post(bookings::create_booking),
        )
        .route("/{id}", get(bookings::get_booking))
        .route("/{id}/cancel", post(bookings::cancel_booking))
        .layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
        .with_state(ctx.clone());

    // require_admin runs inside auth_middleware (last layer added runs first)
    let admin_routes = Router::new()
        .route("/bookings", get(admin::list_all_bookings))
        .route("/bookings/{id}/paid", post(admin::mark_booking_paid))
        .route("/stats", get(admin::get_stats))
        .route("/occupancy", get(admin::get_occupancy))
        .route("/sold-out", get(admin::list_sold_out))
        .route("/tours/{id}/status", put(admin::update_tour_status))
        .route("/tours/{id}/capacity", put(admin::update_tour_capacity))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(ctx.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(ctx.clone());

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/admin", admin_routes);

    if let Some(handle) = ctx.prometheus {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
