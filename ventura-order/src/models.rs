use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ventura_core::supplier::QuestionAnswer;
use ventura_shared::{Masked, Question};

/// The simplified guest form: lead contact details plus answers to whatever
/// dynamic questions are on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestData {
    pub first_name: String,
    pub last_name: String,
    pub email: Masked<String>,
    #[serde(default)]
    pub phone_country_code: String,
    pub phone_number: Masked<String>,
    #[serde(default)]
    pub terms_accepted: bool,
    #[serde(default)]
    pub question_answers: Vec<QuestionAnswer>,
}

impl GuestData {
    /// `"{code} {number}"`, trimmed: `+44` and `7700900123` give `+44 7700900123`.
    pub fn customer_phone(&self) -> String {
        format!("{} {}", self.phone_country_code, self.phone_number.expose())
            .trim()
            .to_string()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// The value typed for a dynamic question, if any.
    pub fn answer_for(&self, question_id: &str) -> Option<&str> {
        self.question_answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| a.value.as_str())
    }
}

/// Questions still needing input for one guest slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonQuestions {
    pub person_id: String,
    /// Position in the availability's guest list; 0 is the lead guest
    pub index: usize,
    pub pricing_category_label: String,
    pub questions: Vec<Question>,
}

impl PersonQuestions {
    pub fn is_lead(&self) -> bool {
        self.index == 0
    }
}

/// Questions still needing input for one attached availability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuestions {
    pub availability_id: String,
    pub product_name: String,
    pub date: NaiveDate,
    pub questions: Vec<Question>,
    pub persons: Vec<PersonQuestions>,
}

/// The "additional questions" shown beside the lead-guest form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdditionalQuestions {
    pub booking_questions: Vec<Question>,
    pub availabilities: Vec<AvailabilityQuestions>,
}

impl AdditionalQuestions {
    /// Displayed questions in list order: booking, then per availability its own
    /// questions followed by each guest's.
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.booking_questions
            .iter()
            .chain(self.availabilities.iter().flat_map(|a| {
                a.questions
                    .iter()
                    .chain(a.persons.iter().flat_map(|p| p.questions.iter()))
            }))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Displayed questions marked required.
    pub fn required_count(&self) -> usize {
        self.iter().filter(|q| q.is_required).count()
    }
}
