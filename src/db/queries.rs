//! Postgres-backed booking repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::bookings::repository::{booking_not_found, status_conflict};
use crate::bookings::{Booking, BookingRepository, BookingStatus};
use crate::error::{AppError, Result};
use crate::pricing::{PricingBreakdown, ServiceType, Tier};

const BOOKING_COLUMNS: &str = r#"
    id, owner_id, owner_tier, service_type, listing_id,
    start_at, end_at, unit_rate, extras_count, traveler_count, status,
    unit_count, base_price, taxes, fees, extras_price,
    discount_percent, discount_amount, total_price, applied_discounts,
    batch_id, notes, created_at, updated_at
"#;

/// Row from the bookings table
#[derive(Debug, Clone, FromRow)]
struct BookingRow {
    id: Uuid,
    owner_id: String,
    owner_tier: String,
    service_type: String,
    listing_id: String,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    unit_rate: Decimal,
    extras_count: i32,
    traveler_count: i32,
    status: String,
    unit_count: i32,
    base_price: Decimal,
    taxes: Decimal,
    fees: Decimal,
    extras_price: Decimal,
    discount_percent: Decimal,
    discount_amount: Decimal,
    total_price: Decimal,
    applied_discounts: Json<Vec<String>>,
    batch_id: Option<Uuid>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn non_negative(value: i32, column: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| AppError::Internal(format!("negative {} in bookings row", column)))
}

fn as_i32(value: u32, column: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| AppError::Internal(format!("{} out of range", column)))
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self> {
        let owner_tier = Tier::parse(&row.owner_tier)
            .ok_or_else(|| AppError::Internal(format!("unknown tier '{}'", row.owner_tier)))?;
        let service_type = ServiceType::parse(&row.service_type).ok_or_else(|| {
            AppError::Internal(format!("unknown service type '{}'", row.service_type))
        })?;
        let status = BookingStatus::parse(&row.status)
            .ok_or_else(|| AppError::Internal(format!("unknown status '{}'", row.status)))?;

        Ok(Booking {
            id: row.id,
            owner_id: row.owner_id,
            owner_tier,
            service_type,
            listing_id: row.listing_id,
            start_at: row.start_at,
            end_at: row.end_at,
            unit_rate: row.unit_rate,
            extras_count: non_negative(row.extras_count, "extras_count")?,
            traveler_count: non_negative(row.traveler_count, "traveler_count")?,
            status,
            pricing: PricingBreakdown {
                unit_count: non_negative(row.unit_count, "unit_count")?,
                base_price: row.base_price,
                taxes: row.taxes,
                fees: row.fees,
                extras_price: row.extras_price,
                discount_percent: row.discount_percent,
                discount_amount: row.discount_amount,
                total_price: row.total_price,
                applied_discounts: row.applied_discounts.0,
            },
            batch_id: row.batch_id,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Booking repository over a Postgres pool
#[derive(Clone)]
pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the bookings table if it is missing
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bookings (
                id UUID PRIMARY KEY,
                owner_id TEXT NOT NULL,
                owner_tier TEXT NOT NULL,
                service_type TEXT NOT NULL,
                listing_id TEXT NOT NULL,
                start_at TIMESTAMPTZ NOT NULL,
                end_at TIMESTAMPTZ NOT NULL,
                unit_rate NUMERIC(12, 2) NOT NULL,
                extras_count INTEGER NOT NULL,
                traveler_count INTEGER NOT NULL,
                status TEXT NOT NULL,
                unit_count INTEGER NOT NULL,
                base_price NUMERIC(14, 2) NOT NULL,
                taxes NUMERIC(14, 2) NOT NULL,
                fees NUMERIC(14, 2) NOT NULL,
                extras_price NUMERIC(14, 2) NOT NULL,
                discount_percent NUMERIC(5, 2) NOT NULL,
                discount_amount NUMERIC(14, 2) NOT NULL,
                total_price NUMERIC(14, 2) NOT NULL,
                applied_discounts JSONB NOT NULL DEFAULT '[]',
                batch_id UUID,
                notes TEXT,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS bookings_owner_idx ON bookings (owner_id, created_at DESC)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn push_values(
        builder: &mut QueryBuilder<'_, Postgres>,
        bookings: &[Booking],
    ) -> Result<()> {
        let mut rows = Vec::with_capacity(bookings.len());
        for b in bookings {
            rows.push((
                b,
                as_i32(b.extras_count, "extras_count")?,
                as_i32(b.traveler_count, "traveler_count")?,
                as_i32(b.pricing.unit_count, "unit_count")?,
            ));
        }

        builder.push_values(rows, |mut row, (b, extras, travelers, units)| {
            row.push_bind(b.id)
                .push_bind(b.owner_id.clone())
                .push_bind(b.owner_tier.as_str())
                .push_bind(b.service_type.as_str())
                .push_bind(b.listing_id.clone())
                .push_bind(b.start_at)
                .push_bind(b.end_at)
                .push_bind(b.unit_rate)
                .push_bind(extras)
                .push_bind(travelers)
                .push_bind(b.status.as_str())
                .push_bind(units)
                .push_bind(b.pricing.base_price)
                .push_bind(b.pricing.taxes)
                .push_bind(b.pricing.fees)
                .push_bind(b.pricing.extras_price)
                .push_bind(b.pricing.discount_percent)
                .push_bind(b.pricing.discount_amount)
                .push_bind(b.pricing.total_price)
                .push_bind(Json(b.pricing.applied_discounts.clone()))
                .push_bind(b.batch_id)
                .push_bind(b.notes.clone())
                .push_bind(b.created_at)
                .push_bind(b.updated_at);
        });
        Ok(())
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn save(&self, booking: &Booking) -> Result<()> {
        self.save_batch(std::slice::from_ref(booking)).await
    }

    async fn save_batch(&self, bookings: &[Booking]) -> Result<()> {
        if bookings.is_empty() {
            return Ok(());
        }

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO bookings ({}) ",
            BOOKING_COLUMNS
        ));
        Self::push_values(&mut builder, bookings)?;

        // A single multi-row INSERT is atomic on its own
        builder.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE owner_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: BookingStatus,
        next: BookingStatus,
        at: DateTime<Utc>,
    ) -> Result<Booking> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET status = $3, updated_at = $4
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Booking::try_from(row),
            None => match self.find(id).await? {
                Some(current) => Err(status_conflict(id, expected, current.status)),
                None => Err(booking_not_found(id)),
            },
        }
    }
}
