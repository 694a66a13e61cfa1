use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::CoreResult;

/// Analytics sink for confirmed bookings, read for urgency messaging
/// ("12 people booked this in the last 24 hours"). The checkout flow never
/// depends on it for correctness.
#[async_trait]
pub trait BookingStatsRepository: Send + Sync {
    async fn record_confirmed(
        &self,
        product_id: &str,
        booking_id: &str,
        at: DateTime<Utc>,
    ) -> CoreResult<()>;

    async fn count_since(&self, product_id: &str, since: DateTime<Utc>) -> CoreResult<u64>;
}
