use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use ventura_shared::Price;

use crate::CoreResult;

/// Status reported by the payment provider after client-side confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Succeeded,
    Processing,
    RequiresCapture,
    RequiresAction,
    RequiresPaymentMethod,
    RequiresConfirmation,
    Other(String),
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "succeeded" => Self::Succeeded,
            "processing" => Self::Processing,
            "requires_capture" => Self::RequiresCapture,
            "requires_action" => Self::RequiresAction,
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::RequiresAction => "requires_action",
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::Other(raw) => raw,
        }
    }

    /// Succeeded, processing and requires_capture all mean the money is secured
    /// (or will be) and the booking can be committed.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Processing | Self::RequiresCapture
        )
    }
}

impl From<String> for PaymentStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

/// What the client needs to collect payment, or a signal that none is due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaymentSession {
    Skip {
        #[serde(rename = "skipPayment")]
        skip_payment: bool,
    },
    Intent {
        #[serde(rename = "publishableKey")]
        publishable_key: String,
        #[serde(rename = "clientSecret")]
        client_secret: String,
    },
}

impl PaymentSession {
    pub fn skip() -> Self {
        Self::Skip { skip_payment: true }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip { skip_payment: true })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub status: PaymentStatus,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a payment intent covering the booking total
    async fn create_payment_intent(
        &self,
        booking_id: &str,
        amount: &Price,
    ) -> CoreResult<PaymentSession>;

    /// Confirm the intent; an explicit decline comes back as `CoreError::PaymentDeclined`
    async fn confirm_payment(&self, client_secret: &str) -> CoreResult<PaymentConfirmation>;
}
