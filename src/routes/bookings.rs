//! Booking route handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::bookings::responses::{
    BookingListResponse, BookingResponse, BulkBookingResponse, RefundBookingResponse,
};
use crate::error::{AppError, Result};
use crate::pricing::requests::{BulkQuoteRequest, QuoteRequest, RefundQuoteQuery};
use crate::session::Caller;
use crate::AppState;

use super::extract::ValidatedJson;
use super::{resolve_vertical, ApiResponse};

fn parse_booking_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::Validation(format!("'{}' is not a valid booking id", raw)))
}

/// Create a pending booking
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Path((service, audience)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<QuoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingResponse>>)> {
    let service = resolve_vertical(&caller, &service, &audience)?;
    let booking = state
        .bookings
        .create(&caller, service, &req, Utc::now())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Booking created", BookingResponse::from(&booking)),
    ))
}

/// Create every line of a bulk request, or nothing
pub async fn create_bulk(
    State(state): State<AppState>,
    caller: Caller,
    Path((service, audience)): Path<(String, String)>,
    ValidatedJson(req): ValidatedJson<BulkQuoteRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BulkBookingResponse>>)> {
    let service = resolve_vertical(&caller, &service, &audience)?;
    let bulk = state
        .bookings
        .create_bulk(&caller, service, &req, Utc::now())
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            format!("{} bookings created", bulk.bookings.len()),
            BulkBookingResponse::from(&bulk),
        ),
    ))
}

/// List the caller's bookings, newest first
pub async fn list(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<ApiResponse<BookingListResponse>>> {
    let bookings = state.bookings.list(&caller).await?;
    Ok(ApiResponse::ok(
        "Bookings retrieved",
        BookingListResponse::from(bookings.as_slice()),
    ))
}

pub async fn get(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingResponse>>> {
    let id = parse_booking_id(&id)?;
    let booking = state.bookings.get(&caller, id).await?;
    Ok(ApiResponse::ok(
        "Booking retrieved",
        BookingResponse::from(&booking),
    ))
}

pub async fn confirm(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingResponse>>> {
    let id = parse_booking_id(&id)?;
    let booking = state.bookings.confirm(&caller, id, Utc::now()).await?;
    Ok(ApiResponse::ok(
        "Booking confirmed",
        BookingResponse::from(&booking),
    ))
}

pub async fn complete(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<BookingResponse>>> {
    let id = parse_booking_id(&id)?;
    let booking = state.bookings.complete(&caller, id, Utc::now()).await?;
    Ok(ApiResponse::ok(
        "Booking completed",
        BookingResponse::from(&booking),
    ))
}

/// Preview the refund for cancelling now (or at `?as_of=`)
pub async fn refund_quote(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
    Query(query): Query<RefundQuoteQuery>,
) -> Result<Json<ApiResponse<RefundBookingResponse>>> {
    let at = query.as_of.unwrap_or_else(Utc::now);
    let id = parse_booking_id(&id)?;
    let (booking, quote) = state.bookings.refund_quote(&caller, id, at).await?;
    Ok(ApiResponse::ok(
        "Refund quote calculated",
        RefundBookingResponse::new(&booking, &quote),
    ))
}

pub async fn cancel(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RefundBookingResponse>>> {
    let id = parse_booking_id(&id)?;
    let (booking, quote) = state.bookings.cancel(&caller, id, Utc::now()).await?;
    Ok(ApiResponse::ok(
        "Booking cancelled",
        RefundBookingResponse::new(&booking, &quote),
    ))
}
