//! Travel pricing service.
//!
//! Tiered pricing, discount stacking, cancellation refunds and booking
//! limits for flights, hotels, cars, packages and attractions, served over
//! a small JSON API.

pub mod bookings;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod pricing;
pub mod routes;
pub mod session;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::bookings::{BookingRepository, BookingService, InMemoryBookingRepository};
use crate::cache::AppCache;
use crate::pricing::PolicyBook;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingService,
    pub cache: AppCache,
    pub policies: Arc<PolicyBook>,
}

impl AppState {
    pub fn new(repo: Arc<dyn BookingRepository>, policies: PolicyBook, cache: AppCache) -> Self {
        let policies = Arc::new(policies);
        Self {
            bookings: BookingService::new(repo, cache.clone(), policies.clone()),
            cache,
            policies,
        }
    }

    /// State backed by the in-memory repository
    pub fn in_memory(policies: PolicyBook) -> Self {
        Self::new(
            Arc::new(InMemoryBookingRepository::new()),
            policies,
            AppCache::new(),
        )
    }
}

/// Router with request tracing and CORS applied
pub fn build_router(state: AppState) -> Router {
    routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
