//! Label heuristics and filtering for the booking question tree.
//!
//! A supplier question whose label asks for something the lead-guest form
//! already collects (name, email, phone) is filled from that form and never
//! shown. The exemption covers booking-level and availability-level questions
//! and the lead guest only; every other guest sees all of its unanswered questions.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use ventura_shared::{Question, QuestionTree};

use crate::models::{AdditionalQuestions, AvailabilityQuestions, GuestData, PersonQuestions};

static TELEPHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\btel(ephone)?\b").expect("valid telephone pattern"));

/// Lead-guest field a question label maps onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoFillField {
    FirstName,
    LastName,
    FullName,
    Email,
    Phone,
}

impl AutoFillField {
    /// The lead-guest value that answers a question of this kind.
    pub fn value_from(&self, guest: &GuestData) -> String {
        match self {
            Self::FirstName => guest.first_name.trim().to_string(),
            Self::LastName => guest.last_name.trim().to_string(),
            Self::FullName => guest.full_name(),
            Self::Email => guest.email.expose().trim().to_string(),
            Self::Phone => guest.customer_phone(),
        }
    }
}

/// Classify a label. Pure function of the lowercased label text.
pub fn auto_fill_field(label: &str) -> Option<AutoFillField> {
    let l = label.trim().to_lowercase();

    if l.contains("first") && l.contains("name") {
        Some(AutoFillField::FirstName)
    } else if (l.contains("last") && l.contains("name"))
        || l.contains("surname")
        || l.contains("family name")
    {
        Some(AutoFillField::LastName)
    } else if l == "name" || l.contains("full name") {
        Some(AutoFillField::FullName)
    } else if l.contains("email") {
        Some(AutoFillField::Email)
    } else if l.contains("phone") || l.contains("mobile") || TELEPHONE.is_match(&l) {
        Some(AutoFillField::Phone)
    } else {
        None
    }
}

pub fn is_auto_fillable(label: &str) -> bool {
    auto_fill_field(label).is_some()
}

/// Keep the questions that still need manual input.
fn unanswered(questions: &[Question], apply_auto_fill: bool) -> Vec<Question> {
    questions
        .iter()
        .filter(|q| !q.is_answered())
        .filter(|q| !(apply_auto_fill && is_auto_fillable(&q.label)))
        .cloned()
        .collect()
}

/// Reduce the full tree to the questions the guest must answer by hand.
pub fn additional_questions(tree: &QuestionTree) -> AdditionalQuestions {
    let availabilities = tree
        .availabilities
        .iter()
        .map(|availability| {
            let persons = availability
                .persons
                .iter()
                .enumerate()
                .filter(|(_, person)| !person.is_questions_complete)
                .map(|(index, person)| PersonQuestions {
                    person_id: person.id.clone(),
                    index,
                    pricing_category_label: person.pricing_category_label.clone(),
                    questions: unanswered(&person.questions, index == 0),
                })
                .filter(|p| !p.questions.is_empty())
                .collect();

            AvailabilityQuestions {
                availability_id: availability.id.clone(),
                product_name: availability.product_name.clone(),
                date: availability.date,
                questions: unanswered(&availability.questions, true),
                persons,
            }
        })
        .filter(|a| !a.questions.is_empty() || !a.persons.is_empty())
        .collect();

    let additional = AdditionalQuestions {
        booking_questions: unanswered(&tree.questions, true),
        availabilities,
    };

    debug!(
        booking_id = %tree.booking_id,
        displayed = additional.iter().count(),
        required = additional.required_count(),
        "Filtered question tree"
    );
    additional
}

/// Banner text after a submission that left required questions open.
pub fn outstanding_message(count: usize) -> String {
    match count {
        0 => "Please complete all required information before continuing.".to_string(),
        1 => "There is 1 additional question that requires your attention.".to_string(),
        n => format!("There are {n} additional questions that require your attention."),
    }
}
