use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};
use ventura_core::supplier::SupplierBookingApi;
use ventura_core::{CoreError, CoreResult};
use ventura_shared::{Booking, BookingState};

/// Longest confirmation wait a caller may ask for.
pub const MAX_WAIT_CEILING: Duration = Duration::from_secs(600);

/// Fixed-interval polling with a hard deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_wait: Duration) -> Self {
        Self { interval, max_wait }
    }

    /// Caller-supplied wait, capped at [`MAX_WAIT_CEILING`].
    pub fn with_max_wait_seconds(self, seconds: u64) -> Self {
        Self {
            max_wait: Duration::from_secs(seconds).min(MAX_WAIT_CEILING),
            ..self
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_wait: Duration::from_secs(60),
        }
    }
}

/// Where a committed booking ended up once we stopped waiting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ConfirmationOutcome {
    Confirmed,
    /// Supplier-side business decision; reported, never retried
    Rejected,
    /// Still PENDING when the wait ended: "processing, check back later"
    Pending,
}

impl ConfirmationOutcome {
    fn from_state(state: BookingState) -> Option<Self> {
        match state {
            BookingState::Confirmed | BookingState::Completed => Some(Self::Confirmed),
            BookingState::Rejected => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitResult {
    pub booking: Booking,
    pub outcome: ConfirmationOutcome,
    pub is_confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher_url: Option<String>,
}

impl CommitResult {
    fn new(booking: Booking, outcome: ConfirmationOutcome) -> Self {
        let is_confirmed = outcome == ConfirmationOutcome::Confirmed;
        let voucher_url = if is_confirmed {
            booking.voucher_url.clone()
        } else {
            None
        };
        Self {
            booking,
            outcome,
            is_confirmed,
            voucher_url,
        }
    }
}

/// Commits a booking with the supplier and optionally waits for its decision.
pub struct CommitPoller {
    supplier: Arc<dyn SupplierBookingApi>,
    policy: PollPolicy,
}

impl CommitPoller {
    pub fn new(supplier: Arc<dyn SupplierBookingApi>, policy: PollPolicy) -> Self {
        Self { supplier, policy }
    }

    pub fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Commit, then (when asked) poll until CONFIRMED, REJECTED or `max_wait_seconds`.
    ///
    /// Errors from the commit call itself are returned as-is. A timeout is not an
    /// error: the still-pending booking comes back with `is_confirmed == false`.
    pub async fn commit(
        &self,
        booking_id: &str,
        wait_for_confirmation: bool,
        max_wait_seconds: u64,
    ) -> CoreResult<CommitResult> {
        let booking = self.supplier.commit(booking_id).await?;
        info!(booking_id, state = booking.state.as_str(), "Booking committed");

        if let Some(outcome) = ConfirmationOutcome::from_state(booking.state) {
            return Ok(CommitResult::new(booking, outcome));
        }
        if !wait_for_confirmation {
            return Ok(CommitResult::new(booking, ConfirmationOutcome::Pending));
        }

        let policy = self.policy.with_max_wait_seconds(max_wait_seconds);
        let (outcome, booking) = self.wait_for_decision(booking, policy).await?;
        match outcome {
            ConfirmationOutcome::Confirmed => {
                info!(booking_id, code = booking.code.as_deref().unwrap_or("-"), "Booking confirmed")
            }
            ConfirmationOutcome::Rejected => warn!(booking_id, "Booking rejected by supplier"),
            ConfirmationOutcome::Pending => {
                warn!(booking_id, max_wait_seconds, "Booking still pending after wait")
            }
        }
        Ok(CommitResult::new(booking, outcome))
    }

    /// Poll at a fixed interval until the booking settles or the deadline passes.
    ///
    /// Dropping the returned future stops the wait; the commit itself stands.
    /// A failed status read keeps the last known booking and carries on.
    pub async fn wait_for_decision(
        &self,
        booking: Booking,
        policy: PollPolicy,
    ) -> CoreResult<(ConfirmationOutcome, Booking)> {
        let started = Instant::now();
        let deadline = started
            .checked_add(policy.max_wait)
            .unwrap_or(started + MAX_WAIT_CEILING);
        let mut latest = booking;

        loop {
            if let Some(outcome) = ConfirmationOutcome::from_state(latest.state) {
                return Ok((outcome, latest));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok((ConfirmationOutcome::Pending, latest));
            }
            sleep(policy.interval.min(deadline - now)).await;

            match self.supplier.get_booking(&latest.id).await {
                Ok(Some(fresh)) => {
                    debug!(booking_id = %fresh.id, state = fresh.state.as_str(), "Polled booking");
                    latest = fresh;
                }
                Ok(None) => return Err(CoreError::NotFound(latest.id.clone())),
                Err(e) => warn!(booking_id = %latest.id, error = %e, "Booking status poll failed"),
            }
        }
    }
}
