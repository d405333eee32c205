//! Caller identity carried through each request.
//!
//! The gateway in front of this service authenticates the user and forwards
//! `X-Caller-Id` and `X-Caller-Tier`. Handlers receive an explicit [`Caller`]
//! instead of reading any shared session state.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::pricing::Tier;

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_TIER_HEADER: &str = "x-caller-tier";

/// Authenticated caller of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: String,
    pub tier: Tier,
}

impl Caller {
    pub fn new(id: impl Into<String>, tier: Tier) -> Self {
        Self {
            id: id.into(),
            tier,
        }
    }

    pub fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        let id = parts
            .headers
            .get(CALLER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty() && v.len() <= 128)
            .ok_or_else(|| AppError::Unauthorized("Missing X-Caller-Id header".to_string()))?;

        let tier = parts
            .headers
            .get(CALLER_TIER_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing X-Caller-Tier header".to_string()))?;
        let tier = Tier::parse(tier)
            .ok_or_else(|| AppError::Unauthorized(format!("Unknown caller tier '{}'", tier)))?;

        Ok(Caller::new(id, tier))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Caller::from_parts(parts)
    }
}
