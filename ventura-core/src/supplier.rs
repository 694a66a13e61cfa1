use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ventura_shared::{
    AvailabilityDetail, AvailabilityDiscovery, Booking, CategoryUnits, Masked, OptionAnswer,
    QuestionTree,
};

use crate::CoreResult;

/// Availability side of the supplier inventory API.
#[async_trait]
pub trait SupplierAvailabilityApi: Send + Sync {
    /// List bookable slots for a product between two dates (inclusive)
    async fn discover_availability(
        &self,
        product_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> CoreResult<AvailabilityDiscovery>;

    /// Answer configuration options; the response may reveal further required options
    async fn set_options(
        &self,
        availability_id: &str,
        answers: &[OptionAnswer],
    ) -> CoreResult<AvailabilityDetail>;

    /// Set guest counts per pricing category; recomputes total price and validity
    async fn set_pricing(
        &self,
        availability_id: &str,
        categories: &[CategoryUnits],
    ) -> CoreResult<AvailabilityDetail>;
}

/// Booking side of the supplier inventory API.
#[async_trait]
pub trait SupplierBookingApi: Send + Sync {
    async fn create_booking(&self) -> CoreResult<Booking>;

    async fn add_availability(&self, booking_id: &str, availability_id: &str)
        -> CoreResult<Booking>;

    async fn get_questions(&self, booking_id: &str) -> CoreResult<QuestionTree>;

    async fn answer_questions(
        &self,
        booking_id: &str,
        submission: &AnswerSubmission,
    ) -> CoreResult<AnswerReceipt>;

    /// Finalize the booking; it enters PENDING until the supplier decides
    async fn commit(&self, booking_id: &str) -> CoreResult<Booking>;

    /// `Ok(None)` when the supplier has no such booking
    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>>;
}

/// One guest record per person slot across every attached availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecord {
    pub person_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Masked<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<Masked<String>>,
    pub is_lead_guest: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    pub question_id: String,
    pub value: String,
}

impl QuestionAnswer {
    pub fn new(question_id: &str, value: &str) -> Self {
        Self {
            question_id: question_id.to_string(),
            value: value.to_string(),
        }
    }
}

/// Payload for the supplier's answer endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub customer_first_name: String,
    pub customer_last_name: String,
    pub customer_email: Masked<String>,
    pub customer_phone: Masked<String>,
    pub terms_accepted: bool,
    pub guests: Vec<GuestRecord>,
    pub question_answers: Vec<QuestionAnswer>,
}

/// Supplier response to an answer submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReceipt {
    pub can_commit: bool,
    pub booking: Booking,
}
