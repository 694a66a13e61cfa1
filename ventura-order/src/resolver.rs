use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ventura_core::supplier::{AnswerSubmission, GuestRecord, QuestionAnswer, SupplierBookingApi};
use ventura_core::CoreResult;
use ventura_shared::{Booking, Masked, Question, QuestionTree};

use crate::models::{AdditionalQuestions, GuestData};
use crate::questions::{additional_questions, auto_fill_field, outstanding_message};

/// The question tree of a booking, reduced to what still needs manual input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedQuestions {
    pub booking_id: String,
    pub can_commit: bool,
    pub additional: AdditionalQuestions,
    /// Required questions without an answer anywhere in the tree
    pub unanswered_required: usize,
}

impl ResolvedQuestions {
    fn from_tree(tree: &QuestionTree) -> Self {
        Self {
            booking_id: tree.booking_id.clone(),
            can_commit: tree.can_commit,
            additional: additional_questions(tree),
            unanswered_required: tree.unanswered_required_count(),
        }
    }
}

/// First phase of answering: what the supplier said about readiness.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// `canCommit` came back true
    Complete(Booking),
    /// `canCommit` came back false; the tree must be fetched again before
    /// telling the guest what is missing
    Incomplete(Booking),
}

/// Second phase: the re-fetched questions still open after a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outstanding {
    pub questions: AdditionalQuestions,
    pub count: usize,
    pub message: String,
}

/// Combined result of `answer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerReport {
    pub can_commit: bool,
    pub booking: Booking,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outstanding: Option<Outstanding>,
}

impl AnswerReport {
    pub fn message(&self) -> Option<&str> {
        self.outstanding.as_ref().map(|o| o.message.as_str())
    }
}

/// Fetches the three-level question tree and turns guest form data into supplier answers.
pub struct QuestionResolver {
    supplier: Arc<dyn SupplierBookingApi>,
}

impl QuestionResolver {
    pub fn new(supplier: Arc<dyn SupplierBookingApi>) -> Self {
        Self { supplier }
    }

    pub async fn resolve(&self, booking_id: &str) -> CoreResult<ResolvedQuestions> {
        let tree = self.supplier.get_questions(booking_id).await?;
        Ok(ResolvedQuestions::from_tree(&tree))
    }

    /// Phase one: build the submission from a fresh tree and send it.
    pub async fn submit_answers(
        &self,
        booking_id: &str,
        guest: &GuestData,
    ) -> CoreResult<SubmitOutcome> {
        let tree = self.supplier.get_questions(booking_id).await?;
        let submission = build_submission(&tree, guest);

        debug!(
            booking_id,
            guests = submission.guests.len(),
            answers = submission.question_answers.len(),
            "Submitting booking answers"
        );
        let receipt = self
            .supplier
            .answer_questions(booking_id, &submission)
            .await?;

        if receipt.can_commit {
            info!(booking_id, "Booking ready to commit");
            Ok(SubmitOutcome::Complete(receipt.booking))
        } else {
            Ok(SubmitOutcome::Incomplete(receipt.booking))
        }
    }

    /// Phase two: re-fetch (conditional questions may have appeared) and recount.
    pub async fn recheck(&self, booking_id: &str) -> CoreResult<Outstanding> {
        let resolved = self.resolve(booking_id).await?;
        let count = resolved.additional.required_count();
        debug!(booking_id, count, "Questions still outstanding");
        Ok(Outstanding {
            questions: resolved.additional,
            count,
            message: outstanding_message(count),
        })
    }

    /// Submit, then recheck only when the supplier is not ready to commit.
    pub async fn answer(&self, booking_id: &str, guest: &GuestData) -> CoreResult<AnswerReport> {
        match self.submit_answers(booking_id, guest).await? {
            SubmitOutcome::Complete(booking) => Ok(AnswerReport {
                can_commit: true,
                booking,
                outstanding: None,
            }),
            SubmitOutcome::Incomplete(booking) => {
                let outstanding = self.recheck(booking_id).await?;
                Ok(AnswerReport {
                    can_commit: false,
                    booking,
                    outstanding: Some(outstanding),
                })
            }
        }
    }
}

/// Turn the guest form into the supplier's answer format.
///
/// One guest record per person slot across all attached availabilities; the
/// first slot is the lead guest and carries the contact details. Unanswered
/// auto-fillable questions at booking level, availability level and on each
/// availability's lead guest are answered from the form.
pub fn build_submission(tree: &QuestionTree, guest: &GuestData) -> AnswerSubmission {
    let first_name = guest.first_name.trim().to_string();
    let last_name = guest.last_name.trim().to_string();
    let email = guest.email.expose().trim().to_string();
    let phone = guest.customer_phone();

    let guests = tree
        .availabilities
        .iter()
        .flat_map(|a| a.persons.iter())
        .enumerate()
        .map(|(index, person)| {
            let lead = index == 0;
            GuestRecord {
                person_id: person.id.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: lead.then(|| Masked::new(email.clone())),
                phone: lead.then(|| Masked::new(phone.clone())),
                is_lead_guest: lead,
            }
        })
        .collect();

    let mut question_answers = guest.question_answers.clone();
    let mut answered: HashSet<String> = question_answers
        .iter()
        .map(|a| a.question_id.clone())
        .collect();

    let auto_fill_scope = tree
        .questions
        .iter()
        .chain(tree.availabilities.iter().flat_map(|a| {
            a.questions
                .iter()
                .chain(a.persons.first().into_iter().flat_map(|p| p.questions.iter()))
        }));

    for question in auto_fill_scope {
        if let Some(answer) = auto_fill_answer(question, guest) {
            if answered.insert(answer.question_id.clone()) {
                question_answers.push(answer);
            }
        }
    }

    AnswerSubmission {
        customer_first_name: first_name,
        customer_last_name: last_name,
        customer_email: Masked::new(email),
        customer_phone: Masked::new(phone),
        terms_accepted: guest.terms_accepted,
        guests,
        question_answers,
    }
}

fn auto_fill_answer(question: &Question, guest: &GuestData) -> Option<QuestionAnswer> {
    if question.is_answered() {
        return None;
    }
    let field = auto_fill_field(&question.label)?;
    let value = field.value_from(guest);
    if value.is_empty() {
        return None;
    }
    Some(QuestionAnswer {
        question_id: question.id.clone(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::Mutex;
    use ventura_core::supplier::AnswerReceipt;
    use ventura_core::CoreError;
    use ventura_shared::{BookedAvailability, Person, QuestionType};

    fn guest() -> GuestData {
        GuestData {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Masked::from("ada@example.com"),
            phone_country_code: "+44".to_string(),
            phone_number: Masked::from("7700900123"),
            terms_accepted: true,
            question_answers: vec![QuestionAnswer::new("diet", "Vegetarian")],
        }
    }

    fn availability(id: &str, persons: Vec<Person>) -> BookedAvailability {
        BookedAvailability {
            id: id.to_string(),
            product_id: "prod-1".to_string(),
            product_name: "Sunset sail".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 11, 4).unwrap(),
            start_time: Some("18:00".to_string()),
            questions: Vec::new(),
            persons,
        }
    }

    fn slot(id: &str, questions: Vec<Question>) -> Person {
        Person {
            id: id.to_string(),
            pricing_category_label: "Adult".to_string(),
            is_questions_complete: false,
            questions,
        }
    }

    #[test]
    fn test_guest_records_span_availabilities() {
        let tree = QuestionTree {
            booking_id: "bk-1".to_string(),
            can_commit: false,
            questions: Vec::new(),
            availabilities: vec![
                availability("av-1", vec![slot("p0", Vec::new()), slot("p1", Vec::new())]),
                availability("av-2", vec![slot("p2", Vec::new())]),
            ],
        };

        let submission = build_submission(&tree, &guest());
        assert_eq!(submission.guests.len(), 3);

        let lead = &submission.guests[0];
        assert!(lead.is_lead_guest);
        assert_eq!(lead.email.as_ref().unwrap().expose(), "ada@example.com");
        assert_eq!(lead.phone.as_ref().unwrap().expose(), "+44 7700900123");

        for other in &submission.guests[1..] {
            assert!(!other.is_lead_guest);
            assert!(other.email.is_none());
            assert!(other.phone.is_none());
            assert_eq!(other.first_name, "Ada");
        }
        assert_eq!(submission.customer_phone.expose(), "+44 7700900123");
    }

    #[test]
    fn test_auto_fill_scope() {
        let email = |id: &str| Question::new(id, "Email address", QuestionType::Email).required();
        let mut first = availability(
            "av-1",
            vec![slot("p0", vec![email("lead-email")]), slot("p1", vec![email("second-email")])],
        );
        first.questions = vec![Question::new("contact", "Mobile number", QuestionType::Phone)];

        let tree = QuestionTree {
            booking_id: "bk-1".to_string(),
            can_commit: false,
            questions: vec![
                Question::new("name", "Name", QuestionType::Text).required(),
                Question::new("surname", "Surname", QuestionType::Text)
                    .required()
                    .with_answer("Byron"),
            ],
            availabilities: vec![first],
        };

        let submission = build_submission(&tree, &guest());
        let find = |id: &str| {
            submission
                .question_answers
                .iter()
                .find(|a| a.question_id == id)
                .map(|a| a.value.as_str())
        };

        assert_eq!(find("diet"), Some("Vegetarian"));
        assert_eq!(find("name"), Some("Ada Lovelace"));
        assert_eq!(find("contact"), Some("+44 7700900123"));
        assert_eq!(find("lead-email"), Some("ada@example.com"));
        // Already answered, and non-lead guests are never auto-filled
        assert_eq!(find("surname"), None);
        assert_eq!(find("second-email"), None);
    }

    #[test]
    fn test_typed_answer_wins_over_auto_fill() {
        let tree = QuestionTree {
            booking_id: "bk-1".to_string(),
            can_commit: false,
            questions: vec![Question::new("em", "Email", QuestionType::Email).required()],
            availabilities: Vec::new(),
        };
        let mut data = guest();
        data.question_answers = vec![QuestionAnswer::new("em", "other@example.com")];

        let submission = build_submission(&tree, &data);
        let values: Vec<_> = submission
            .question_answers
            .iter()
            .filter(|a| a.question_id == "em")
            .map(|a| a.value.as_str())
            .collect();
        assert_eq!(values, vec!["other@example.com"]);
    }

    /// Keeps one question tree and answers it the way the supplier does:
    /// `canCommit` holds once no required question is left open.
    struct TreeSupplier {
        tree: Mutex<QuestionTree>,
        submissions: Mutex<usize>,
    }

    impl TreeSupplier {
        fn new(questions: Vec<Question>) -> Self {
            Self {
                tree: Mutex::new(QuestionTree {
                    booking_id: "bk-1".to_string(),
                    can_commit: false,
                    questions,
                    availabilities: Vec::new(),
                }),
                submissions: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl SupplierBookingApi for TreeSupplier {
        async fn create_booking(&self) -> CoreResult<Booking> {
            unimplemented!()
        }

        async fn add_availability(&self, _: &str, _: &str) -> CoreResult<Booking> {
            unimplemented!()
        }

        async fn get_questions(&self, _: &str) -> CoreResult<QuestionTree> {
            Ok(self.tree.lock().await.clone())
        }

        async fn answer_questions(
            &self,
            booking_id: &str,
            submission: &AnswerSubmission,
        ) -> CoreResult<AnswerReceipt> {
            *self.submissions.lock().await += 1;
            let mut tree = self.tree.lock().await;
            for answer in &submission.question_answers {
                if let Some(q) = tree.questions.iter_mut().find(|q| q.id == answer.question_id) {
                    q.answer_value = Some(answer.value.clone());
                }
            }
            tree.can_commit = tree.unanswered_required_count() == 0;

            let mut booking = Booking::open(booking_id);
            booking.can_commit = tree.can_commit;
            Ok(AnswerReceipt {
                can_commit: tree.can_commit,
                booking,
            })
        }

        async fn commit(&self, _: &str) -> CoreResult<Booking> {
            Err(CoreError::InternalError("not committable here".to_string()))
        }

        async fn get_booking(&self, _: &str) -> CoreResult<Option<Booking>> {
            Ok(None)
        }
    }

    fn lead_only() -> GuestData {
        GuestData {
            question_answers: Vec::new(),
            ..guest()
        }
    }

    #[tokio::test]
    async fn test_unanswered_booking_question_is_outstanding() {
        let supplier = Arc::new(TreeSupplier::new(vec![
            Question::new("email", "Email", QuestionType::Email).required(),
            Question::new("special", "Special requirements", QuestionType::Textarea).required(),
        ]));
        let resolver = QuestionResolver::new(supplier.clone());

        let report = resolver.answer("bk-1", &lead_only()).await.unwrap();

        assert!(!report.can_commit);
        let outstanding = report.outstanding.as_ref().unwrap();
        assert_eq!(outstanding.count, 1);
        let ids: Vec<_> = outstanding.questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["special"]);
        assert_eq!(
            report.message(),
            Some("There is 1 additional question that requires your attention.")
        );
    }

    #[tokio::test]
    async fn test_complete_answer_leaves_nothing_required() {
        let supplier = Arc::new(TreeSupplier::new(vec![
            Question::new("email", "Email", QuestionType::Email).required(),
            Question::new("special", "Special requirements", QuestionType::Textarea).required(),
        ]));
        let resolver = QuestionResolver::new(supplier.clone());

        let mut data = lead_only();
        data.question_answers = vec![QuestionAnswer::new("special", "Window seat")];
        let report = resolver.answer("bk-1", &data).await.unwrap();

        assert!(report.can_commit);
        assert!(report.outstanding.is_none());
        let tree = supplier.get_questions("bk-1").await.unwrap();
        assert_eq!(tree.unanswered_required_count(), 0);
        assert_eq!(*supplier.submissions.lock().await, 1);

        let resolved = resolver.resolve("bk-1").await.unwrap();
        assert!(resolved.can_commit);
        assert_eq!(resolved.unanswered_required, 0);
        assert!(resolved.additional.is_empty());
    }
}
