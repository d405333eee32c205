//! HTTP routes

pub mod bookings;
pub mod extract;
pub mod quotes;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::pricing::{ServiceType, Tier};
use crate::session::Caller;
use crate::AppState;

/// Success body shared by every endpoint: `{ success, message, ...payload }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data,
        })
    }
}

/// Which front end a vertical route serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    User,
    Business,
}

impl Audience {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Audience::User),
            "business" => Some(Audience::Business),
            _ => None,
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Audience::User => Tier::Individual,
            Audience::Business => Tier::Corporate,
        }
    }
}

/// Resolve `/:service/:audience` and check the caller may use it
pub fn resolve_vertical(caller: &Caller, service: &str, audience: &str) -> Result<ServiceType> {
    let service_type = ServiceType::parse(service)
        .ok_or_else(|| AppError::NotFound(format!("Unknown service '{}'", service)))?;
    let audience = Audience::parse(audience)
        .ok_or_else(|| AppError::NotFound(format!("Unknown audience '{}'", audience)))?;

    if audience.tier() != caller.tier {
        return Err(AppError::Forbidden(format!(
            "{} callers cannot use {} endpoints",
            caller.tier.as_str(),
            match audience {
                Audience::User => "user",
                Audience::Business => "business",
            }
        )));
    }

    Ok(service_type)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "ok",
        "service": "travel-pricing",
        "version": env!("CARGO_PKG_VERSION"),
        "cache": state.cache.stats(),
    }))
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/:service/:audience/quote", post(quotes::quote))
        .route("/:service/:audience/quote/bulk", post(quotes::bulk_quote))
        .route("/:service/:audience/bookings", post(bookings::create))
        .route("/:service/:audience/bulk", post(bookings::create_bulk))
        .route("/bookings", get(bookings::list))
        .route("/bookings/:id", get(bookings::get))
        .route("/bookings/:id/confirm", post(bookings::confirm))
        .route("/bookings/:id/complete", post(bookings::complete))
        .route("/bookings/:id/refund-quote", get(bookings::refund_quote))
        .route("/bookings/:id/cancel", post(bookings::cancel))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_vertical_matches_tier() {
        let user = Caller::new("u1", Tier::Individual);
        assert_eq!(
            resolve_vertical(&user, "hotel", "user").unwrap(),
            ServiceType::Hotel
        );
        assert!(matches!(
            resolve_vertical(&user, "hotel", "business"),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_resolve_vertical_unknown_service() {
        let corp = Caller::new("c1", Tier::Corporate);
        assert!(matches!(
            resolve_vertical(&corp, "boat", "business"),
            Err(AppError::NotFound(_))
        ));
    }
}
