use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use ventura_shared::QuestionType;

use crate::models::{AdditionalQuestions, GuestData};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

/// Form fields in focus priority order; dynamic questions follow in list order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum FormField {
    FirstName,
    LastName,
    Email,
    Phone,
    Terms,
    Question(String),
}

impl FormField {
    /// Key used in error maps sent to the client.
    pub fn key(&self) -> String {
        match self {
            Self::FirstName => "firstName".to_string(),
            Self::LastName => "lastName".to_string(),
            Self::Email => "email".to_string(),
            Self::Phone => "phone".to_string(),
            Self::Terms => "terms".to_string(),
            Self::Question(id) => format!("question:{id}"),
        }
    }
}

/// Every failing field with its message, in focus priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) need attention", .entries.len())]
pub struct ValidationErrors {
    entries: Vec<(FormField, String)>,
}

impl ValidationErrors {
    fn push(&mut self, field: FormField, message: &str) {
        self.entries.push((field, message.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, field: &FormField) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    /// The field the form should scroll to and focus.
    pub fn focus_target(&self) -> Option<&FormField> {
        self.entries.first().map(|(f, _)| f)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FormField> {
        self.entries.iter().map(|(f, _)| f)
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .map(|(f, m)| (f.key(), m.clone()))
            .collect()
    }
}

/// Client-facing checks run before anything is sent to the supplier.
pub fn validate_guest(
    guest: &GuestData,
    displayed: &AdditionalQuestions,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if guest.first_name.trim().is_empty() {
        errors.push(FormField::FirstName, "First name is required");
    }
    if guest.last_name.trim().is_empty() {
        errors.push(FormField::LastName, "Last name is required");
    }

    let email = guest.email.expose().trim();
    if email.is_empty() {
        errors.push(FormField::Email, "Email is required");
    } else if !EMAIL.is_match(email) {
        errors.push(FormField::Email, "Please enter a valid email address");
    }

    if guest.phone_number.expose().trim().is_empty() {
        errors.push(FormField::Phone, "Phone number is required");
    }
    if !guest.terms_accepted {
        errors.push(FormField::Terms, "You must accept the terms and conditions");
    }

    for question in displayed.iter().filter(|q| q.is_required) {
        let value = guest.answer_for(&question.id).unwrap_or("");
        if !question.accepts(value) {
            let message = match question.question_type {
                QuestionType::Boolean => "Please confirm to continue",
                _ => "This field is required",
            };
            errors.push(FormField::Question(question.id.clone()), message);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Run `on_submit` only when the form validates.
pub fn submit_with<T>(
    guest: &GuestData,
    displayed: &AdditionalQuestions,
    on_submit: impl FnOnce(&GuestData) -> T,
) -> Result<T, ValidationErrors> {
    validate_guest(guest, displayed)?;
    Ok(on_submit(guest))
}
