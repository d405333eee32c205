//! Quote route handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::pricing::requests::{BulkQuoteRequest, QuoteRequest};
use crate::pricing::responses::{BatchQuoteResponse, PricingBreakdownResponse, QuoteResponse};
use crate::pricing::{quote_batch, quote_item};
use crate::session::Caller;
use crate::AppState;

use super::extract::ValidatedJson;
use super::{resolve_vertical, ApiResponse};

/// Price a single line without storing anything
pub async fn quote(
    State(state): State<AppState>,
    caller: Caller,
    Path((service, audience)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>> {
    let service = resolve_vertical(&caller, &service, &audience)?;
    let policy = state.policies.policy(caller.tier, service);

    let pricing = quote_item(&policy, &req.to_line())?;

    tracing::debug!(
        caller = %caller.id,
        service = service.as_str(),
        total = %pricing.total_price,
        "Quote computed"
    );

    Ok(ApiResponse::ok(
        "Quote calculated",
        QuoteResponse {
            service,
            tier: caller.tier,
            pricing: PricingBreakdownResponse::from(&pricing),
        },
    ))
}

/// Price several independent lines and sum them
pub async fn bulk_quote(
    State(state): State<AppState>,
    caller: Caller,
    Path((service, audience)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<BulkQuoteRequest>,
) -> Result<Json<ApiResponse<BatchQuoteResponse>>> {
    let service = resolve_vertical(&caller, &service, &audience)?;
    let policy = state.policies.policy(caller.tier, service);

    let quote = quote_batch(&policy, &req.to_lines())?;

    Ok(ApiResponse::ok(
        "Bulk quote calculated",
        BatchQuoteResponse::new(service, caller.tier, &quote),
    ))
}
