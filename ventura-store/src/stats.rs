use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use ventura_core::repository::BookingStatsRepository;
use ventura_core::CoreResult;

/// Confirmed bookings per product, kept in memory.
#[derive(Default)]
pub struct InMemoryBookingStats {
    confirmed: RwLock<HashMap<String, Vec<(String, DateTime<Utc>)>>>,
}

impl InMemoryBookingStats {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingStatsRepository for InMemoryBookingStats {
    async fn record_confirmed(&self, product_id: &str, booking_id: &str, at: DateTime<Utc>) -> CoreResult<()> {
        let mut confirmed = self.confirmed.write().await;
        let entries = confirmed.entry(product_id.to_string()).or_default();
        // a booking is counted once however often its confirmation is seen
        if !entries.iter().any(|(id, _)| id == booking_id) {
            entries.push((booking_id.to_string(), at));
        }
        Ok(())
    }

    async fn count_since(&self, product_id: &str, since: DateTime<Utc>) -> CoreResult<u64> {
        let confirmed = self.confirmed.read().await;
        let count = confirmed
            .get(product_id)
            .map(|entries| entries.iter().filter(|(_, at)| *at >= since).count())
            .unwrap_or(0);
        Ok(count as u64)
    }
}
