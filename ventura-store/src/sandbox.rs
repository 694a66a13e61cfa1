use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;
use ventura_catalog::pricing;
use ventura_core::supplier::{
    AnswerReceipt, AnswerSubmission, SupplierAvailabilityApi, SupplierBookingApi,
};
use ventura_core::{CoreError, CoreResult};
use ventura_shared::{
    AvailabilityDetail, AvailabilityDiscovery, AvailabilityOption, AvailabilitySlot,
    BookedAvailability, Booking, BookingState, CategoryUnits, OptionChoice, OptionAnswer,
    OptionList, ParticipantDependency, Person, Price, PricingCategory, PricingCategoryList,
    Question, QuestionTree, QuestionType,
};

use crate::app_config::SandboxSettings;

const MAX_DISCOVERY_DAYS: i64 = 31;

/// A booking-level question that appears once another question gets a given answer.
#[derive(Debug, Clone)]
pub struct ConditionalQuestion {
    pub trigger_id: String,
    pub trigger_value: String,
    pub question: Question,
}

/// Everything the sandbox needs to serve one product.
#[derive(Debug, Clone)]
pub struct ProductTemplate {
    pub product_id: String,
    pub product_name: String,
    pub options: Vec<AvailabilityOption>,
    /// Shown only after every option in `options` is answered
    pub revealed_options: Vec<AvailabilityOption>,
    pub pricing: Vec<PricingCategory>,
    pub booking_questions: Vec<Question>,
    pub availability_questions: Vec<Question>,
    pub person_questions: Vec<Question>,
    pub conditional: Option<ConditionalQuestion>,
    pub sold_out: Vec<NaiveDate>,
}

impl ProductTemplate {
    /// A walking tour with a language option, a time slot revealed afterwards,
    /// adults and children (two per adult) and questions at every level.
    pub fn walking_tour(product_id: &str) -> Self {
        Self {
            product_id: product_id.to_string(),
            product_name: "Old Town Walking Tour".to_string(),
            options: vec![option(
                "language",
                "Tour language",
                "LANGUAGE",
                &[("English", "en"), ("Français", "fr")],
            )],
            revealed_options: vec![option(
                "startTime",
                "Start time",
                "TIME",
                &[("09:30", "09:30"), ("14:00", "14:00")],
            )],
            pricing: vec![
                category("adult", "Adult", 1, 10, None, 1, 2500),
                category("child", "Child", 0, 10, Some(("adult", 2)), 0, 1200),
            ],
            booking_questions: vec![
                Question::new("leadFirstName", "First name", QuestionType::Text).required(),
                Question::new("leadLastName", "Last name", QuestionType::Text).required(),
                Question::new("leadEmail", "Email address", QuestionType::Email).required(),
                Question::new("leadPhone", "Mobile number", QuestionType::Phone).required(),
                Question::new("wheelchair", "Do you need wheelchair access?", QuestionType::Boolean),
            ],
            availability_questions: vec![Question::new(
                "pickup",
                "Hotel name for pickup",
                QuestionType::Text,
            )
            .required()],
            person_questions: vec![
                Question::new("firstName", "First name", QuestionType::Text).required(),
                Question::new("diet", "Dietary requirements", QuestionType::Select)
                    .required()
                    .with_options(&[("None", "none"), ("Vegetarian", "vegetarian"), ("Vegan", "vegan")]),
            ],
            conditional: Some(ConditionalQuestion {
                trigger_id: "wheelchair".to_string(),
                trigger_value: "true".to_string(),
                question: Question::new(
                    "wheelchairDetails",
                    "Describe the assistance you need",
                    QuestionType::Textarea,
                )
                .required(),
            }),
            sold_out: Vec::new(),
        }
    }

    fn currency(&self) -> &str {
        self.pricing
            .first()
            .map(|c| c.unit_price.currency.as_str())
            .unwrap_or("GBP")
    }

    fn guide_price(&self) -> Option<Price> {
        self.pricing
            .iter()
            .map(|c| &c.unit_price)
            .min_by_key(|p| p.gross)
            .cloned()
    }
}

fn option(id: &str, label: &str, option_type: &str, choices: &[(&str, &str)]) -> AvailabilityOption {
    AvailabilityOption {
        id: id.to_string(),
        label: label.to_string(),
        option_type: option_type.to_string(),
        is_required: true,
        answer_value: None,
        choices: choices
            .iter()
            .map(|(label, value)| OptionChoice {
                label: label.to_string(),
                value: value.to_string(),
            })
            .collect(),
    }
}

fn category(
    id: &str,
    label: &str,
    min: u32,
    max: u32,
    depends: Option<(&str, u32)>,
    units: u32,
    unit_price: i64,
) -> PricingCategory {
    PricingCategory {
        id: id.to_string(),
        label: label.to_string(),
        min_participants: min,
        max_participants: max,
        max_participants_depends: depends.map(|(parent, multiplier)| ParticipantDependency {
            pricing_category_id: parent.to_string(),
            multiplier,
        }),
        units,
        unit_price: Price::new(unit_price, "GBP"),
    }
}

struct AvailabilityRecord {
    detail: AvailabilityDetail,
    revealed: bool,
}

struct BookingRecord {
    booking: Booking,
    polls_until_decision: u32,
    submissions: Vec<AnswerSubmission>,
}

#[derive(Default)]
struct SandboxState {
    products: HashMap<String, ProductTemplate>,
    availabilities: HashMap<String, AvailabilityRecord>,
    bookings: HashMap<String, BookingRecord>,
}

/// In-memory supplier that behaves like the real inventory API: options reveal
/// further options, pricing rules are enforced, questions live at three levels
/// and committed bookings are decided after a few status reads.
pub struct SandboxSupplier {
    state: RwLock<SandboxState>,
    settings: SandboxSettings,
}

impl SandboxSupplier {
    pub fn new(settings: SandboxSettings) -> Self {
        Self {
            state: RwLock::new(SandboxState::default()),
            settings,
        }
    }

    /// Sandbox seeded with the walking tour under `tour-1`.
    pub async fn demo(settings: SandboxSettings) -> Self {
        let sandbox = Self::new(settings);
        sandbox.seed_product(ProductTemplate::walking_tour("tour-1")).await;
        sandbox
    }

    pub async fn seed_product(&self, template: ProductTemplate) {
        info!(product_id = %template.product_id, "Seeding sandbox product");
        let mut state = self.state.write().await;
        state.products.insert(template.product_id.clone(), template);
    }

    /// Cancel a booking out of band, as the supplier's back office would.
    pub async fn cancel(&self, booking_id: &str) -> CoreResult<()> {
        let mut state = self.state.write().await;
        let record = state
            .bookings
            .get_mut(booking_id)
            .ok_or_else(|| CoreError::NotFound(booking_id.to_string()))?;
        record.booking.state = BookingState::Cancelled;
        record.booking.can_commit = false;
        Ok(())
    }

    /// The most recent answer payload received for a booking.
    pub async fn last_submission(&self, booking_id: &str) -> Option<AnswerSubmission> {
        let state = self.state.read().await;
        state
            .bookings
            .get(booking_id)
            .and_then(|r| r.submissions.last().cloned())
    }

    pub async fn submission_count(&self, booking_id: &str) -> usize {
        let state = self.state.read().await;
        state
            .bookings
            .get(booking_id)
            .map(|r| r.submissions.len())
            .unwrap_or(0)
    }

    fn decide(&self, booking: &mut Booking) {
        if self.settings.reject_bookings {
            warn!(booking_id = %booking.id, "Sandbox rejecting booking");
            booking.state = BookingState::Rejected;
            return;
        }
        let code = booking.id.replace('-', "")[..8].to_uppercase();
        booking.voucher_url = Some(format!("https://vouchers.sandbox.test/{}.pdf", booking.id));
        booking.code = Some(format!("VEN-{code}"));
        booking.state = BookingState::Confirmed;
        info!(booking_id = %booking.id, code = ?booking.code, "Sandbox confirmed booking");
    }
}

fn refresh_options(record: &mut AvailabilityRecord, template: &ProductTemplate) {
    let list = &mut record.detail.option_list;
    if !record.revealed && list.nodes.iter().all(|o| o.is_answered()) {
        list.nodes.extend(template.revealed_options.iter().cloned());
        record.revealed = true;
    }
    list.is_complete = list.nodes.iter().all(|o| !o.is_required || o.is_answered());

    record.detail.start_time = list
        .nodes
        .iter()
        .find(|o| o.option_type == "TIME")
        .and_then(|o| o.answer_value.clone());
}

fn refresh_pricing(detail: &mut AvailabilityDetail) {
    detail.total_price = pricing::total_price(&detail.pricing_category_list);
    detail.is_valid =
        detail.option_list.is_complete && pricing::is_valid(&detail.pricing_category_list);
}

/// Recompute per-person completeness, the booking total and `canCommit`.
fn refresh_booking(booking: &mut Booking) {
    for availability in booking.availabilities.iter_mut() {
        for person in availability.persons.iter_mut() {
            person.is_questions_complete = person.outstanding_count() == 0;
        }
    }
    booking.can_commit = booking.state == BookingState::Open
        && !booking.availabilities.is_empty()
        && booking.lead_passenger_name.is_some()
        && booking.question_tree().unanswered_required_count() == 0;
}

/// Scope a template question to its owner so every slot has a distinct id.
fn scoped(owner: &str, questions: &[Question]) -> Vec<Question> {
    questions
        .iter()
        .cloned()
        .map(|mut q| {
            q.id = format!("{owner}:{}", q.id);
            q
        })
        .collect()
}

fn answer_in(questions: &mut [Question], question_id: &str, value: &str) -> bool {
    match questions.iter_mut().find(|q| q.id == question_id) {
        Some(question) => {
            question.answer_value = Some(value.to_string());
            true
        }
        None => false,
    }
}

fn apply_answer(booking: &mut Booking, question_id: &str, value: &str) -> bool {
    if answer_in(&mut booking.questions, question_id, value) {
        return true;
    }
    booking.availabilities.iter_mut().any(|a| {
        answer_in(&mut a.questions, question_id, value)
            || a
                .persons
                .iter_mut()
                .any(|p| answer_in(&mut p.questions, question_id, value))
    })
}

#[async_trait]
impl SupplierAvailabilityApi for SandboxSupplier {
    async fn discover_availability(
        &self,
        product_id: &str,
        date_from: NaiveDate,
        date_to: NaiveDate,
    ) -> CoreResult<AvailabilityDiscovery> {
        if date_to < date_from {
            return Err(CoreError::ValidationError(
                "dateTo must not be before dateFrom".to_string(),
            ));
        }
        if (date_to - date_from).num_days() >= MAX_DISCOVERY_DAYS {
            return Err(CoreError::ValidationError(format!(
                "Date range is limited to {MAX_DISCOVERY_DAYS} days"
            )));
        }

        let mut state = self.state.write().await;
        let template = state
            .products
            .get(product_id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(product_id.to_string()))?;

        let mut slots = Vec::new();
        let mut date = date_from;
        while date <= date_to {
            let sold_out = template.sold_out.contains(&date);
            let id = Uuid::new_v4().to_string();
            if !sold_out {
                let mut record = AvailabilityRecord {
                    detail: AvailabilityDetail {
                        id: id.clone(),
                        product_id: template.product_id.clone(),
                        product_name: template.product_name.clone(),
                        date,
                        start_time: None,
                        option_list: OptionList {
                            is_complete: false,
                            nodes: template.options.clone(),
                        },
                        pricing_category_list: PricingCategoryList {
                            nodes: template.pricing.clone(),
                        },
                        total_price: None,
                        is_valid: false,
                    },
                    revealed: false,
                };
                refresh_options(&mut record, &template);
                refresh_pricing(&mut record.detail);
                state.availabilities.insert(id.clone(), record);
            }
            slots.push(AvailabilitySlot {
                id,
                date,
                sold_out,
                guide_price: template.guide_price(),
            });
            date += Duration::days(1);
        }

        debug!(product_id, slots = slots.len(), "Sandbox availability discovered");
        Ok(AvailabilityDiscovery {
            session_id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            slots,
            option_list: OptionList {
                is_complete: template.options.is_empty(),
                nodes: template.options,
            },
        })
    }

    async fn set_options(
        &self,
        availability_id: &str,
        answers: &[OptionAnswer],
    ) -> CoreResult<AvailabilityDetail> {
        let mut state = self.state.write().await;
        let SandboxState {
            products,
            availabilities,
            ..
        } = &mut *state;
        let record = availabilities
            .get_mut(availability_id)
            .ok_or_else(|| CoreError::NotFound(availability_id.to_string()))?;
        let template = products
            .get(&record.detail.product_id)
            .ok_or_else(|| CoreError::InternalError("availability without product".to_string()))?;

        for answer in answers {
            let option = record
                .detail
                .option_list
                .nodes
                .iter_mut()
                .find(|o| o.id == answer.id)
                .ok_or_else(|| CoreError::api(format!("Unknown option: {}", answer.id)))?;
            if !option.choices.is_empty() && !option.choices.iter().any(|c| c.value == answer.value) {
                return Err(CoreError::api(format!(
                    "{} is not a valid choice for {}",
                    answer.value, option.label
                )));
            }
            option.answer_value = Some(answer.value.clone());
        }

        refresh_options(record, template);
        refresh_pricing(&mut record.detail);
        Ok(record.detail.clone())
    }

    async fn set_pricing(
        &self,
        availability_id: &str,
        categories: &[CategoryUnits],
    ) -> CoreResult<AvailabilityDetail> {
        let mut state = self.state.write().await;
        let record = state
            .availabilities
            .get_mut(availability_id)
            .ok_or_else(|| CoreError::NotFound(availability_id.to_string()))?;

        pricing::apply_units(&mut record.detail.pricing_category_list, categories)
            .map_err(|e| CoreError::api(e.to_string()))?;
        refresh_pricing(&mut record.detail);
        Ok(record.detail.clone())
    }
}

#[async_trait]
impl SupplierBookingApi for SandboxSupplier {
    async fn create_booking(&self) -> CoreResult<Booking> {
        let booking = Booking::open(&Uuid::new_v4().to_string());
        info!(booking_id = %booking.id, "Sandbox booking created");

        let mut state = self.state.write().await;
        state.bookings.insert(
            booking.id.clone(),
            BookingRecord {
                booking: booking.clone(),
                polls_until_decision: 0,
                submissions: Vec::new(),
            },
        );
        Ok(booking)
    }

    async fn add_availability(&self, booking_id: &str, availability_id: &str) -> CoreResult<Booking> {
        let mut state = self.state.write().await;
        let SandboxState {
            products,
            availabilities,
            bookings,
        } = &mut *state;

        let detail = &availabilities
            .get(availability_id)
            .ok_or_else(|| CoreError::NotFound(availability_id.to_string()))?
            .detail;
        if !detail.is_attachable() {
            return Err(CoreError::ConfigurationInvalid(
                "Availability is not fully configured".to_string(),
            ));
        }
        let template = products
            .get(&detail.product_id)
            .ok_or_else(|| CoreError::InternalError("availability without product".to_string()))?;
        let record = bookings
            .get_mut(booking_id)
            .ok_or_else(|| CoreError::NotFound(booking_id.to_string()))?;
        let booking = &mut record.booking;
        if booking.state != BookingState::Open {
            return Err(CoreError::api("Booking is no longer open"));
        }
        if booking.availabilities.iter().any(|a| a.id == detail.id) {
            return Err(CoreError::api("Availability is already on this booking"));
        }

        let mut persons = Vec::new();
        for category in detail.pricing_category_list.nodes.iter() {
            for _ in 0..category.units {
                let id = format!("{}-p{}", detail.id, persons.len() + 1);
                persons.push(Person {
                    questions: scoped(&id, &template.person_questions),
                    id,
                    pricing_category_label: category.label.clone(),
                    is_questions_complete: false,
                });
            }
        }

        for question in template.booking_questions.iter() {
            if !booking.questions.iter().any(|q| q.id == question.id) {
                booking.questions.push(question.clone());
            }
        }
        booking.availabilities.push(BookedAvailability {
            id: detail.id.clone(),
            product_id: detail.product_id.clone(),
            product_name: detail.product_name.clone(),
            date: detail.date,
            start_time: detail.start_time.clone(),
            questions: scoped(&detail.id, &template.availability_questions),
            persons,
        });

        let currency = template.currency();
        booking.total_price = Some(match (&booking.total_price, &detail.total_price) {
            (Some(total), Some(price)) => total.plus(price),
            (None, Some(price)) => price.clone(),
            (Some(total), None) => total.clone(),
            (None, None) => Price::zero(currency),
        });
        refresh_booking(booking);

        debug!(booking_id, availability_id, persons = booking.person_count(), "Availability added");
        Ok(booking.clone())
    }

    async fn get_questions(&self, booking_id: &str) -> CoreResult<QuestionTree> {
        let state = self.state.read().await;
        state
            .bookings
            .get(booking_id)
            .map(|r| r.booking.question_tree())
            .ok_or_else(|| CoreError::NotFound(booking_id.to_string()))
    }

    async fn answer_questions(
        &self,
        booking_id: &str,
        submission: &AnswerSubmission,
    ) -> CoreResult<AnswerReceipt> {
        let mut state = self.state.write().await;
        let SandboxState {
            products, bookings, ..
        } = &mut *state;
        let record = bookings
            .get_mut(booking_id)
            .ok_or_else(|| CoreError::NotFound(booking_id.to_string()))?;
        if record.booking.state != BookingState::Open {
            return Err(CoreError::api("Booking is no longer open"));
        }
        if !submission.terms_accepted {
            return Err(CoreError::Api {
                status: Some(422),
                message: "Terms and conditions must be accepted".to_string(),
            });
        }

        let booking = &mut record.booking;
        booking.lead_passenger_name = Some(
            format!(
                "{} {}",
                submission.customer_first_name, submission.customer_last_name
            )
            .trim()
            .to_string(),
        );
        for answer in submission.question_answers.iter() {
            if !apply_answer(booking, &answer.question_id, &answer.value) {
                debug!(booking_id, question_id = %answer.question_id, "Ignoring answer to unknown question");
            }
        }

        for availability in booking.availabilities.iter() {
            let Some(conditional) = products
                .get(&availability.product_id)
                .and_then(|t| t.conditional.as_ref())
            else {
                continue;
            };
            let triggered = booking.questions.iter().any(|q| {
                q.id == conditional.trigger_id
                    && q.answer_value.as_deref() == Some(conditional.trigger_value.as_str())
            });
            let present = booking.questions.iter().any(|q| q.id == conditional.question.id);
            if triggered && !present {
                debug!(booking_id, question_id = %conditional.question.id, "Conditional question revealed");
                booking.questions.push(conditional.question.clone());
            }
        }

        refresh_booking(booking);
        record.submissions.push(submission.clone());

        Ok(AnswerReceipt {
            can_commit: record.booking.can_commit,
            booking: record.booking.clone(),
        })
    }

    async fn commit(&self, booking_id: &str) -> CoreResult<Booking> {
        let mut state = self.state.write().await;
        let record = state
            .bookings
            .get_mut(booking_id)
            .ok_or_else(|| CoreError::NotFound(booking_id.to_string()))?;
        if record.booking.state != BookingState::Open {
            return Err(CoreError::api("Booking is no longer open"));
        }
        if !record.booking.can_commit {
            return Err(CoreError::Api {
                status: Some(422),
                message: "Booking has unanswered required questions".to_string(),
            });
        }

        record.booking.state = BookingState::Pending;
        record.booking.can_commit = false;
        record.polls_until_decision = self.settings.confirm_after_polls;
        Ok(record.booking.clone())
    }

    async fn get_booking(&self, booking_id: &str) -> CoreResult<Option<Booking>> {
        let mut state = self.state.write().await;
        let Some(record) = state.bookings.get_mut(booking_id) else {
            return Ok(None);
        };

        if record.booking.state == BookingState::Pending {
            record.polls_until_decision = record.polls_until_decision.saturating_sub(1);
            if record.polls_until_decision == 0 {
                self.decide(&mut record.booking);
            }
        }
        Ok(Some(record.booking.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ventura_core::supplier::{GuestRecord, QuestionAnswer};
    use ventura_shared::Masked;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, day).unwrap()
    }

    fn submission(answers: &[(&str, &str)]) -> AnswerSubmission {
        AnswerSubmission {
            customer_first_name: "Ada".to_string(),
            customer_last_name: "Lovelace".to_string(),
            customer_email: Masked::from("ada@example.com"),
            customer_phone: Masked::from("+44 7700900123"),
            terms_accepted: true,
            guests: Vec::<GuestRecord>::new(),
            question_answers: answers
                .iter()
                .map(|(id, value)| QuestionAnswer::new(id, value))
                .collect(),
        }
    }

    async fn configured(sandbox: &SandboxSupplier) -> AvailabilityDetail {
        let discovery = sandbox
            .discover_availability("tour-1", date(3), date(3))
            .await
            .unwrap();
        let id = &discovery.slots[0].id;
        sandbox
            .set_options(id, &[OptionAnswer::new("language", "en")])
            .await
            .unwrap();
        sandbox
            .set_options(id, &[OptionAnswer::new("startTime", "09:30")])
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_option_reveals_time_slot() {
        let sandbox = SandboxSupplier::demo(SandboxSettings::default()).await;
        let discovery = sandbox
            .discover_availability("tour-1", date(1), date(3))
            .await
            .unwrap();
        assert_eq!(discovery.slots.len(), 3);

        let id = &discovery.slots[0].id;
        let detail = sandbox
            .set_options(id, &[OptionAnswer::new("language", "en")])
            .await
            .unwrap();
        assert!(!detail.option_list.is_complete);
        assert_eq!(detail.option_list.pending().next().unwrap().id, "startTime");

        let detail = sandbox
            .set_options(id, &[OptionAnswer::new("startTime", "09:30")])
            .await
            .unwrap();
        assert!(detail.option_list.is_complete);
        assert!(detail.is_valid);
        assert_eq!(detail.start_time.as_deref(), Some("09:30"));
    }

    #[tokio::test]
    async fn test_invalid_choice_is_refused() {
        let sandbox = SandboxSupplier::demo(SandboxSettings::default()).await;
        let discovery = sandbox
            .discover_availability("tour-1", date(1), date(1))
            .await
            .unwrap();
        let err = sandbox
            .set_options(&discovery.slots[0].id, &[OptionAnswer::new("language", "de")])
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Api { .. }));
    }

    #[tokio::test]
    async fn test_children_bounded_by_adults() {
        let sandbox = SandboxSupplier::demo(SandboxSettings::default()).await;
        let detail = configured(&sandbox).await;

        let detail = sandbox
            .set_pricing(
                &detail.id,
                &[CategoryUnits::new("adult", 1), CategoryUnits::new("child", 3)],
            )
            .await
            .unwrap();
        assert!(!detail.is_valid);

        let detail = sandbox
            .set_pricing(&detail.id, &[CategoryUnits::new("child", 2)])
            .await
            .unwrap();
        assert!(detail.is_valid);
        assert_eq!(detail.total_price.unwrap().gross, 2500 + 2 * 1200);
    }

    #[tokio::test]
    async fn test_conditional_question_blocks_commit() {
        let sandbox = SandboxSupplier::demo(SandboxSettings::default()).await;
        let detail = configured(&sandbox).await;
        let booking = sandbox.create_booking().await.unwrap();
        let booking = sandbox.add_availability(&booking.id, &detail.id).await.unwrap();
        assert_eq!(booking.person_count(), 1);
        assert!(!booking.can_commit);

        let person = &booking.availabilities[0].persons[0].id;
        let pickup = format!("{}:pickup", detail.id);
        let first = format!("{person}:firstName");
        let diet = format!("{person}:diet");
        let answers = [
            ("leadFirstName", "Ada"),
            ("leadLastName", "Lovelace"),
            ("leadEmail", "ada@example.com"),
            ("leadPhone", "+44 7700900123"),
            ("wheelchair", "true"),
            (pickup.as_str(), "The Grand"),
            (first.as_str(), "Ada"),
            (diet.as_str(), "vegan"),
        ];
        let receipt = sandbox
            .answer_questions(&booking.id, &submission(&answers))
            .await
            .unwrap();
        assert!(!receipt.can_commit);
        let tree = sandbox.get_questions(&booking.id).await.unwrap();
        assert_eq!(tree.unanswered_required_count(), 1);

        let receipt = sandbox
            .answer_questions(&booking.id, &submission(&[("wheelchairDetails", "Ramp")]))
            .await
            .unwrap();
        assert!(receipt.can_commit);
        assert_eq!(sandbox.submission_count(&booking.id).await, 2);
    }

    #[tokio::test]
    async fn test_commit_confirms_after_polls() {
        let sandbox = SandboxSupplier::demo(SandboxSettings::default()).await;
        let detail = configured(&sandbox).await;
        let booking = sandbox.create_booking().await.unwrap();
        sandbox.add_availability(&booking.id, &detail.id).await.unwrap();

        let err = sandbox.commit(&booking.id).await.unwrap_err();
        assert!(matches!(err, CoreError::Api { status: Some(422), .. }));

        let tree = sandbox.get_questions(&booking.id).await.unwrap();
        let answers: Vec<(String, String)> = tree
            .all_questions()
            .filter(|q| q.is_required)
            .map(|q| {
                let value = q.available_options.first().map(|o| o.value.clone());
                (q.id.clone(), value.unwrap_or_else(|| "x".to_string()))
            })
            .collect();
        let answers: Vec<(&str, &str)> = answers.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        sandbox
            .answer_questions(&booking.id, &submission(&answers))
            .await
            .unwrap();

        let committed = sandbox.commit(&booking.id).await.unwrap();
        assert_eq!(committed.state, BookingState::Pending);

        let first = sandbox.get_booking(&booking.id).await.unwrap().unwrap();
        assert_eq!(first.state, BookingState::Pending);
        let second = sandbox.get_booking(&booking.id).await.unwrap().unwrap();
        assert_eq!(second.state, BookingState::Confirmed);
        assert!(second.voucher_url.is_some());
        assert!(second.code.unwrap().starts_with("VEN-"));
    }

    #[tokio::test]
    async fn test_unknown_booking_reads_as_none() {
        let sandbox = SandboxSupplier::new(SandboxSettings::default());
        assert!(sandbox.get_booking("missing").await.unwrap().is_none());
        assert!(sandbox.cancel("missing").await.is_err());
    }
}
