use serde::{Deserialize, Serialize};
use tracing::warn;

/// Declared input type of a supplier question.
///
/// The supplier sends an open string; anything unrecognised is read as `Text`
/// so new supplier types still render as a plain input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QuestionType {
    Text,
    Textarea,
    Select,
    Multiselect,
    Boolean,
    Date,
    Number,
    Email,
    Phone,
}

impl QuestionType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "TEXT" => Self::Text,
            "TEXTAREA" => Self::Textarea,
            "SELECT" => Self::Select,
            "MULTISELECT" | "MULTI_SELECT" => Self::Multiselect,
            "BOOLEAN" | "CHECKBOX" => Self::Boolean,
            "DATE" => Self::Date,
            "NUMBER" | "INTEGER" => Self::Number,
            "EMAIL" => Self::Email,
            "PHONE" | "TEL" => Self::Phone,
            _ => {
                warn!(question_type = raw, "Unknown question type, reading as TEXT");
                Self::Text
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Textarea => "TEXTAREA",
            Self::Select => "SELECT",
            Self::Multiselect => "MULTISELECT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Number => "NUMBER",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }
}

impl From<String> for QuestionType {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<QuestionType> for String {
    fn from(value: QuestionType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub value: String,
}

/// A single data-collection field; the same shape at booking, availability and person level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub data_format: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub answer_value: Option<String>,
    #[serde(default)]
    pub available_options: Vec<QuestionOption>,
}

impl Question {
    pub fn new(id: &str, label: &str, question_type: QuestionType) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            question_type,
            data_type: None,
            data_format: None,
            is_required: false,
            answer_value: None,
            available_options: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn with_answer(mut self, value: &str) -> Self {
        self.answer_value = Some(value.to_string());
        self
    }

    pub fn with_options(mut self, options: &[(&str, &str)]) -> Self {
        self.available_options = options
            .iter()
            .map(|(label, value)| QuestionOption {
                label: label.to_string(),
                value: value.to_string(),
            })
            .collect();
        self
    }

    /// Would `value` satisfy this question if it were required?
    ///
    /// Booleans only accept the literal `"true"`: an unchecked acknowledgment
    /// counts as unanswered.
    pub fn accepts(&self, value: &str) -> bool {
        match self.question_type {
            QuestionType::Boolean => value == "true",
            _ => !value.trim().is_empty(),
        }
    }

    /// Whether the current answer counts as given.
    pub fn is_answered(&self) -> bool {
        match self.answer_value.as_deref() {
            None => false,
            Some(value) if self.is_required => self.accepts(value),
            Some(value) => !value.trim().is_empty(),
        }
    }

    /// Required and not yet answered.
    pub fn is_outstanding(&self) -> bool {
        self.is_required && !self.is_answered()
    }
}

/// One guest slot within an availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    /// Pricing category the slot was created from, e.g. "Adult"
    pub pricing_category_label: String,
    #[serde(default)]
    pub is_questions_complete: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Person {
    pub fn outstanding_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_outstanding()).count()
    }
}
