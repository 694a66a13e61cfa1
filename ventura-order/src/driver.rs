use std::sync::Arc;

use tracing::{info, warn};
use ventura_core::payment::{PaymentProvider, PaymentSession};
use ventura_core::supplier::SupplierBookingApi;
use ventura_core::CoreError;
use ventura_shared::Booking;

use crate::checkout::{CheckoutError, CheckoutMachine, CheckoutStage, PendingAction};
use crate::commit::{CommitPoller, PollPolicy};
use crate::models::{AdditionalQuestions, GuestData};
use crate::orchestrator::PaymentOrchestrator;
use crate::resolver::QuestionResolver;
use crate::validation::validate_guest;

/// Runs one guest's checkout against the supplier and payment provider,
/// feeding every result into a [`CheckoutMachine`].
pub struct CheckoutDriver {
    supplier: Arc<dyn SupplierBookingApi>,
    resolver: QuestionResolver,
    payments: PaymentOrchestrator,
    poller: CommitPoller,
    wait_for_confirmation: bool,
    machine: CheckoutMachine,
    displayed: AdditionalQuestions,
    booking: Option<Booking>,
}

impl CheckoutDriver {
    pub fn new(
        booking_id: &str,
        supplier: Arc<dyn SupplierBookingApi>,
        provider: Arc<dyn PaymentProvider>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            resolver: QuestionResolver::new(supplier.clone()),
            payments: PaymentOrchestrator::new(provider),
            poller: CommitPoller::new(supplier.clone(), policy),
            supplier,
            wait_for_confirmation: true,
            machine: CheckoutMachine::new(booking_id),
            displayed: AdditionalQuestions::default(),
            booking: None,
        }
    }

    pub fn wait_for_confirmation(mut self, wait: bool) -> Self {
        self.wait_for_confirmation = wait;
        self
    }

    pub fn machine(&self) -> &CheckoutMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut CheckoutMachine {
        &mut self.machine
    }

    /// Questions the guest still has to answer by hand.
    pub fn displayed_questions(&self) -> &AdditionalQuestions {
        &self.displayed
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    fn booking_id(&self) -> String {
        self.machine.booking_id().to_string()
    }

    pub async fn load(&mut self) -> Result<CheckoutStage, CheckoutError> {
        let booking_id = self.booking_id();
        let booking = match self.supplier.get_booking(&booking_id).await {
            Ok(booking) => booking,
            Err(e) => {
                warn!(%booking_id, error = %e, "Failed to load booking");
                None
            }
        };

        let stage = self.machine.booking_loaded(booking.as_ref())?;
        self.booking = booking;

        if stage == CheckoutStage::Questions {
            match self.resolver.resolve(&booking_id).await {
                Ok(resolved) => self.displayed = resolved.additional,
                Err(e) => {
                    warn!(%booking_id, error = %e, "Failed to load booking questions");
                    self.machine.report_error(&e);
                }
            }
        }
        Ok(stage)
    }

    /// Validate locally, then submit. Nothing reaches the supplier when validation fails.
    pub async fn submit_answers(&mut self, guest: &GuestData) -> Result<CheckoutStage, CheckoutError> {
        validate_guest(guest, &self.displayed)?;
        self.machine.begin(PendingAction::SubmitAnswers)?;

        let booking_id = self.booking_id();
        let result = self.resolver.answer(&booking_id, guest).await;
        if let Ok(report) = &result {
            self.booking = Some(report.booking.clone());
            if let Some(outstanding) = &report.outstanding {
                self.displayed = outstanding.questions.clone();
            }
        }
        self.machine.answers_submitted(&result)
    }

    pub fn proceed_to_payment(&mut self) -> Result<CheckoutStage, CheckoutError> {
        self.machine.proceed_to_payment()
    }

    pub fn edit_answers(&mut self) -> Result<CheckoutStage, CheckoutError> {
        self.machine.edit_answers()
    }

    /// Open a payment session for the booking. When nothing is due the
    /// booking is committed straight away.
    pub async fn start_payment(&mut self) -> Result<PaymentSession, CheckoutError> {
        self.machine.begin(PendingAction::InitPayment)?;

        let booking_id = self.booking_id();
        let result = match self.fresh_booking(&booking_id).await {
            Ok(booking) => {
                let session = self.payments.initialize_payment(&booking).await;
                self.booking = Some(booking);
                session
            }
            Err(e) => Err(e),
        };
        let stage = self.machine.payment_initialized(&result)?;
        let session = result?;

        if stage == CheckoutStage::Committing {
            info!(%booking_id, "Payment skipped, committing");
            self.commit().await?;
        }
        Ok(session)
    }

    pub async fn complete_payment(&mut self, client_secret: &str) -> Result<CheckoutStage, CheckoutError> {
        self.machine.begin(PendingAction::Pay)?;
        let result = self.payments.confirm(client_secret).await;
        let stage = self.machine.payment_confirmed(&result)?;
        if stage == CheckoutStage::Committing {
            return self.commit().await;
        }
        Ok(stage)
    }

    /// Commit and wait for the supplier. Also the retry path after a failed commit.
    pub async fn commit(&mut self) -> Result<CheckoutStage, CheckoutError> {
        self.machine.begin(PendingAction::Commit)?;
        let booking_id = self.booking_id();
        let max_wait = self.poller.policy().max_wait.as_secs();
        let result = self
            .poller
            .commit(&booking_id, self.wait_for_confirmation, max_wait)
            .await;
        if let Ok(commit) = &result {
            self.booking = Some(commit.booking.clone());
        }
        self.machine.commit_finished(&result)
    }

    async fn fresh_booking(&self, booking_id: &str) -> Result<Booking, CoreError> {
        self.supplier
            .get_booking(booking_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(booking_id.to_string()))
    }
}
