use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::price::Price;
use super::question::{Person, Question};

/// Booking lifecycle as the supplier reports it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    Open,
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    /// Display-only: a confirmed booking whose experience has taken place
    Completed,
}

impl BookingState {
    /// Confirmed or completed: nothing left to collect, go to confirmation.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }
}

/// An availability attached to a booking, with its per-availability questions and guests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedAvailability {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub persons: Vec<Person>,
}

/// The reservation in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    /// Supplier booking reference, set once confirmed
    #[serde(default)]
    pub code: Option<String>,
    pub state: BookingState,
    #[serde(default)]
    pub can_commit: bool,
    #[serde(default)]
    pub total_price: Option<Price>,
    #[serde(default)]
    pub voucher_url: Option<String>,
    #[serde(default)]
    pub lead_passenger_name: Option<String>,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub availabilities: Vec<BookedAvailability>,
}

impl Booking {
    pub fn open(id: &str) -> Self {
        Self {
            id: id.to_string(),
            code: None,
            state: BookingState::Open,
            can_commit: false,
            total_price: None,
            voucher_url: None,
            lead_passenger_name: None,
            questions: Vec::new(),
            availabilities: Vec::new(),
        }
    }

    pub fn person_count(&self) -> usize {
        self.availabilities.iter().map(|a| a.persons.len()).sum()
    }

    pub fn question_tree(&self) -> QuestionTree {
        QuestionTree {
            booking_id: self.id.clone(),
            can_commit: self.can_commit,
            questions: self.questions.clone(),
            availabilities: self.availabilities.clone(),
        }
    }
}

/// The three-level question tree attached to an open booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionTree {
    pub booking_id: String,
    #[serde(default)]
    pub can_commit: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub availabilities: Vec<BookedAvailability>,
}

impl QuestionTree {
    /// Every question at every level, in display order.
    pub fn all_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter().chain(self.availabilities.iter().flat_map(|a| {
            a.questions
                .iter()
                .chain(a.persons.iter().flat_map(|p| p.questions.iter()))
        }))
    }

    /// Required questions still missing an answer, across all levels.
    pub fn unanswered_required_count(&self) -> usize {
        self.all_questions().filter(|q| q.is_outstanding()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&BookingState::Confirmed).unwrap();
        assert_eq!(json, "\"CONFIRMED\"");
        let state: BookingState = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert!(state.is_confirmed());
        assert!(!BookingState::Pending.is_confirmed());
    }

    #[test]
    fn test_unanswered_count_spans_all_levels() {
        let mut booking = Booking::open("bk-1");
        booking.questions.push(
            Question::new("b1", "Special requirements", QuestionType::Text).required(),
        );
        booking.availabilities.push(BookedAvailability {
            id: "av-1".to_string(),
            product_id: "p-1".to_string(),
            product_name: "Harbour cruise".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            start_time: None,
            questions: vec![Question::new("a1", "Pickup hotel", QuestionType::Text)
                .required()
                .with_answer("Grand")],
            persons: vec![Person {
                id: "p-0".to_string(),
                pricing_category_label: "Adult".to_string(),
                is_questions_complete: false,
                questions: vec![
                    Question::new("x1", "Waiver", QuestionType::Boolean).required(),
                    Question::new("x2", "Notes", QuestionType::Text),
                ],
            }],
        });

        let tree = booking.question_tree();
        assert_eq!(tree.all_questions().count(), 4);
        assert_eq!(tree.unanswered_required_count(), 2);
        assert_eq!(booking.person_count(), 1);
    }
}
