use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;
use ventura_core::payment::PaymentSession;
use ventura_core::{CoreError, CoreResult};
use ventura_shared::{Booking, BookingState};

use crate::commit::{CommitResult, ConfirmationOutcome};
use crate::orchestrator::PaymentOutcome;
use crate::questions::outstanding_message;
use crate::resolver::AnswerReport;
use crate::validation::ValidationErrors;

/// Checkout stages as the guest sees them
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutStage {
    Loading,
    NotFound,
    Cancelled,
    Questions,
    Review,
    Payment,
    Committing,
    /// Redirect to the confirmation view
    Done,
    /// The supplier turned the booking down
    Rejected,
}

impl CheckoutStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::Cancelled | Self::Done | Self::Rejected
        )
    }
}

/// A request the machine is waiting on. While one is in flight its control is disabled.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PendingAction {
    SubmitAnswers,
    /// Creating the payment intent
    InitPayment,
    Pay,
    Commit,
}

impl PendingAction {
    fn stage(&self) -> CheckoutStage {
        match self {
            Self::SubmitAnswers => CheckoutStage::Questions,
            Self::InitPayment | Self::Pay => CheckoutStage::Payment,
            Self::Commit => CheckoutStage::Committing,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub booking_id: String,
    /// Committed but the supplier had not decided when we stopped waiting
    pub pending: bool,
}

impl Confirmation {
    pub fn url(&self) -> String {
        let base = format!("/booking/{}/confirmation", self.booking_id);
        if self.pending {
            format!("{base}?pending=true")
        } else {
            base
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Invalid checkout transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: CheckoutStage,
        to: CheckoutStage,
    },

    #[error("{0:?} is already in progress")]
    InFlight(PendingAction),

    #[error("No {0:?} in progress")]
    NotInFlight(PendingAction),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Serializable checkout state: stage, banner, in-flight guard and the form
/// state the page keeps between renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutMachine {
    booking_id: String,
    stage: CheckoutStage,
    can_commit: bool,
    submissions: u32,
    in_flight: Option<PendingAction>,
    error: Option<String>,
    notice: Option<String>,
    answers: BTreeMap<String, String>,
    expanded_persons: BTreeSet<String>,
    confirmation: Option<Confirmation>,
}

impl CheckoutMachine {
    pub fn new(booking_id: &str) -> Self {
        Self {
            booking_id: booking_id.to_string(),
            stage: CheckoutStage::Loading,
            can_commit: false,
            submissions: 0,
            in_flight: None,
            error: None,
            notice: None,
            answers: BTreeMap::new(),
            expanded_persons: BTreeSet::new(),
            confirmation: None,
        }
    }

    pub fn booking_id(&self) -> &str {
        &self.booking_id
    }

    pub fn stage(&self) -> CheckoutStage {
        self.stage
    }

    pub fn can_commit(&self) -> bool {
        self.can_commit
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn in_flight(&self) -> Option<PendingAction> {
        self.in_flight
    }

    /// Whether the control for `action` should be disabled.
    pub fn is_busy(&self, action: PendingAction) -> bool {
        self.in_flight == Some(action)
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        self.confirmation.as_ref()
    }

    /// A previous submission came back; UI copy changes from here on.
    pub fn is_resubmission(&self) -> bool {
        self.submissions > 0
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_resubmission() {
            "Submit Answers"
        } else {
            "Proceed to Payment"
        }
    }

    /// Feed the initial booking fetch. `None` covers both "missing" and "fetch failed".
    pub fn booking_loaded(&mut self, booking: Option<&Booking>) -> Result<CheckoutStage, CheckoutError> {
        let target = match booking.map(|b| b.state) {
            None => CheckoutStage::NotFound,
            Some(BookingState::Cancelled) => CheckoutStage::Cancelled,
            Some(BookingState::Rejected) => CheckoutStage::Rejected,
            Some(state) if state.is_confirmed() => CheckoutStage::Done,
            Some(BookingState::Pending) => CheckoutStage::Done,
            Some(_) => CheckoutStage::Questions,
        };
        self.expect_stage(CheckoutStage::Loading, target)?;

        if let Some(booking) = booking {
            self.can_commit = booking.can_commit;
            if target == CheckoutStage::Done {
                self.confirmation = Some(Confirmation {
                    booking_id: self.booking_id.clone(),
                    pending: booking.state == BookingState::Pending,
                });
            }
        }
        self.transition(target);
        Ok(target)
    }

    /// Claim the control for `action`; fails if anything is already in flight.
    pub fn begin(&mut self, action: PendingAction) -> Result<(), CheckoutError> {
        if let Some(current) = self.in_flight {
            return Err(CheckoutError::InFlight(current));
        }
        self.expect_stage(action.stage(), action.stage())?;
        self.in_flight = Some(action);
        self.error = None;
        self.notice = None;
        Ok(())
    }

    pub fn answers_submitted(
        &mut self,
        result: &CoreResult<AnswerReport>,
    ) -> Result<CheckoutStage, CheckoutError> {
        self.finish(PendingAction::SubmitAnswers)?;
        self.submissions += 1;

        match result {
            Ok(report) if report.can_commit => {
                self.can_commit = true;
                self.transition(CheckoutStage::Review);
            }
            Ok(report) => {
                self.can_commit = false;
                self.error = Some(
                    report
                        .message()
                        .map(str::to_string)
                        .unwrap_or_else(|| outstanding_message(0)),
                );
            }
            Err(e) => self.error = Some(e.user_message()),
        }
        Ok(self.stage)
    }

    pub fn proceed_to_payment(&mut self) -> Result<CheckoutStage, CheckoutError> {
        self.expect_stage(CheckoutStage::Review, CheckoutStage::Payment)?;
        if !self.can_commit {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                to: CheckoutStage::Payment,
            });
        }
        self.transition(CheckoutStage::Payment);
        Ok(self.stage)
    }

    /// Back to the questions. The supplier keeps what was already submitted.
    pub fn edit_answers(&mut self) -> Result<CheckoutStage, CheckoutError> {
        self.expect_stage(CheckoutStage::Review, CheckoutStage::Questions)?;
        self.transition(CheckoutStage::Questions);
        Ok(self.stage)
    }

    /// Payment intent came back. No payment due means straight to committing.
    pub fn payment_initialized(
        &mut self,
        result: &CoreResult<PaymentSession>,
    ) -> Result<CheckoutStage, CheckoutError> {
        self.finish(PendingAction::InitPayment)?;

        match result {
            Ok(session) if session.is_skip() => self.transition(CheckoutStage::Committing),
            Ok(_) => {}
            Err(e) => self.error = Some(e.user_message()),
        }
        Ok(self.stage)
    }

    pub fn payment_confirmed(
        &mut self,
        result: &CoreResult<PaymentOutcome>,
    ) -> Result<CheckoutStage, CheckoutError> {
        self.finish(PendingAction::Pay)?;

        match result {
            Ok(PaymentOutcome::Succeeded { .. }) => self.transition(CheckoutStage::Committing),
            Ok(PaymentOutcome::ActionRequired { message }) => self.notice = Some(message.clone()),
            Ok(outcome) => self.error = outcome.message().map(str::to_string),
            Err(e) => self.error = Some(e.user_message()),
        }
        Ok(self.stage)
    }

    pub fn commit_finished(
        &mut self,
        result: &CoreResult<CommitResult>,
    ) -> Result<CheckoutStage, CheckoutError> {
        self.finish(PendingAction::Commit)?;

        match result {
            Ok(commit) => {
                let target = match commit.outcome {
                    ConfirmationOutcome::Rejected => CheckoutStage::Rejected,
                    ConfirmationOutcome::Confirmed | ConfirmationOutcome::Pending => {
                        self.confirmation = Some(Confirmation {
                            booking_id: self.booking_id.clone(),
                            pending: commit.outcome == ConfirmationOutcome::Pending,
                        });
                        CheckoutStage::Done
                    }
                };
                self.transition(target);
            }
            Err(e) => self.error = Some(e.user_message()),
        }
        Ok(self.stage)
    }

    /// Surface a failure from outside the tracked actions (e.g. loading questions).
    pub fn report_error(&mut self, error: &CoreError) {
        self.error = Some(error.user_message());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn set_answer(&mut self, question_id: &str, value: &str) {
        self.answers
            .insert(question_id.to_string(), value.to_string());
    }

    pub fn answer(&self, question_id: &str) -> Option<&str> {
        self.answers.get(question_id).map(String::as_str)
    }

    pub fn answers(&self) -> &BTreeMap<String, String> {
        &self.answers
    }

    /// Expand or collapse a guest's question panel; returns the new state.
    pub fn toggle_person(&mut self, person_id: &str) -> bool {
        if self.expanded_persons.remove(person_id) {
            false
        } else {
            self.expanded_persons.insert(person_id.to_string());
            true
        }
    }

    pub fn is_person_expanded(&self, person_id: &str) -> bool {
        self.expanded_persons.contains(person_id)
    }

    fn expect_stage(&self, expected: CheckoutStage, to: CheckoutStage) -> Result<(), CheckoutError> {
        if self.stage != expected {
            return Err(CheckoutError::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        Ok(())
    }

    fn finish(&mut self, action: PendingAction) -> Result<(), CheckoutError> {
        if self.in_flight != Some(action) {
            return Err(CheckoutError::NotInFlight(action));
        }
        self.in_flight = None;
        Ok(())
    }

    fn transition(&mut self, to: CheckoutStage) {
        debug!(booking_id = %self.booking_id, from = ?self.stage, to = ?to, "Checkout transition");
        self.stage = to;
    }
}
