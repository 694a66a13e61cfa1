use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ventura_core::payment::{PaymentProvider, PaymentSession, PaymentStatus};
use ventura_core::{CoreError, CoreResult};
use ventura_shared::{Booking, Price};

pub const DECLINED_MESSAGE: &str =
    "Your card was declined. Please try a different payment method.";
pub const RETRY_MESSAGE: &str = "Your payment could not be confirmed. Please try again.";
pub const ACTION_REQUIRED_MESSAGE: &str =
    "Additional verification is required to complete your payment.";

/// What a payment confirmation means for the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PaymentOutcome {
    /// succeeded, processing or requires_capture: go on and commit
    Succeeded {
        status: PaymentStatus,
        payment_intent_id: Option<String>,
    },
    /// The guest still has a verification step to complete
    ActionRequired { message: String },
    /// Hard decline; the guest should use another method
    Declined { message: String },
    /// Confirmation did not go through; the same method may be retried
    Retry { message: String },
    Unexpected { message: String },
}

impl PaymentOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Succeeded { .. } => None,
            Self::ActionRequired { message }
            | Self::Declined { message }
            | Self::Retry { message }
            | Self::Unexpected { message } => Some(message),
        }
    }
}

/// Map a provider status onto a checkout outcome.
pub fn classify(status: PaymentStatus, payment_intent_id: Option<String>) -> PaymentOutcome {
    match status {
        s if s.is_success() => PaymentOutcome::Succeeded {
            status: s,
            payment_intent_id,
        },
        PaymentStatus::RequiresAction => PaymentOutcome::ActionRequired {
            message: ACTION_REQUIRED_MESSAGE.to_string(),
        },
        PaymentStatus::RequiresPaymentMethod => PaymentOutcome::Declined {
            message: DECLINED_MESSAGE.to_string(),
        },
        PaymentStatus::RequiresConfirmation => PaymentOutcome::Retry {
            message: RETRY_MESSAGE.to_string(),
        },
        other => PaymentOutcome::Unexpected {
            message: format!("Unexpected payment status: {}", other.as_str()),
        },
    }
}

pub struct PaymentOrchestrator {
    provider: Arc<dyn PaymentProvider>,
}

impl PaymentOrchestrator {
    pub fn new(provider: Arc<dyn PaymentProvider>) -> Self {
        Self { provider }
    }

    /// Initialize payment for a booking that is ready to commit.
    pub async fn initialize_payment(&self, booking: &Booking) -> CoreResult<PaymentSession> {
        if !booking.can_commit {
            return Err(CoreError::ValidationError(
                "Booking has unanswered required questions".to_string(),
            ));
        }

        let amount = booking
            .total_price
            .clone()
            .unwrap_or_else(|| Price::zero("GBP"));
        if amount.gross == 0 {
            info!(booking_id = %booking.id, "Nothing to charge, skipping payment");
            return Ok(PaymentSession::skip());
        }

        self.provider
            .create_payment_intent(&booking.id, &amount)
            .await
    }

    /// Confirm the payment and classify the result. An explicit decline from the
    /// provider becomes `Declined`; transport failures stay errors.
    pub async fn confirm(&self, client_secret: &str) -> CoreResult<PaymentOutcome> {
        match self.provider.confirm_payment(client_secret).await {
            Ok(confirmation) => {
                let outcome = classify(confirmation.status, confirmation.payment_intent_id);
                if !outcome.is_success() {
                    warn!(message = outcome.message().unwrap_or(""), "Payment not completed");
                }
                Ok(outcome)
            }
            Err(CoreError::PaymentDeclined(message)) => {
                warn!(%message, "Payment declined by provider");
                Ok(PaymentOutcome::Declined { message })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_capture_is_success() {
        let outcome = classify(PaymentStatus::RequiresCapture, Some("pi_1".to_string()));
        assert!(outcome.is_success());
        assert!(classify(PaymentStatus::Processing, None).is_success());
        assert!(classify(PaymentStatus::Succeeded, None).is_success());
    }

    #[test]
    fn test_failures_carry_messages() {
        assert_eq!(
            classify(PaymentStatus::RequiresPaymentMethod, None).message(),
            Some(DECLINED_MESSAGE)
        );
        assert_eq!(
            classify(PaymentStatus::RequiresConfirmation, None).message(),
            Some(RETRY_MESSAGE)
        );
        assert!(matches!(
            classify(PaymentStatus::RequiresAction, None),
            PaymentOutcome::ActionRequired { .. }
        ));
        assert_eq!(
            classify(PaymentStatus::Other("canceled".to_string()), None).message(),
            Some("Unexpected payment status: canceled")
        );
    }
}
