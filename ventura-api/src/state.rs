use std::sync::Arc;

use ventura_catalog::AvailabilityConfigurator;
use ventura_core::payment::PaymentProvider;
use ventura_core::repository::BookingStatsRepository;
use ventura_core::supplier::{SupplierAvailabilityApi, SupplierBookingApi};
use ventura_order::{CommitPoller, PaymentOrchestrator, PollPolicy, QuestionResolver};
use ventura_store::app_config::CheckoutSettings;
use ventura_store::{InMemoryBookingStats, MockPaymentProvider, SandboxSupplier};

#[derive(Clone)]
pub struct AppState {
    pub availability: Arc<dyn SupplierAvailabilityApi>,
    pub bookings: Arc<dyn SupplierBookingApi>,
    pub payments: Arc<dyn PaymentProvider>,
    pub stats: Arc<dyn BookingStatsRepository>,
    pub checkout: CheckoutSettings,
}

impl AppState {
    /// Wire every port to the in-memory sandbox adapters.
    pub fn sandbox(
        supplier: Arc<SandboxSupplier>,
        payments: Arc<MockPaymentProvider>,
        checkout: CheckoutSettings,
    ) -> Self {
        Self {
            availability: supplier.clone(),
            bookings: supplier,
            payments,
            stats: Arc::new(InMemoryBookingStats::new()),
            checkout,
        }
    }

    pub fn configurator(&self) -> AvailabilityConfigurator {
        AvailabilityConfigurator::new(self.availability.clone())
    }

    pub fn resolver(&self) -> QuestionResolver {
        QuestionResolver::new(self.bookings.clone())
    }

    pub fn orchestrator(&self) -> PaymentOrchestrator {
        PaymentOrchestrator::new(self.payments.clone())
    }

    pub fn poller(&self) -> CommitPoller {
        let policy = PollPolicy::new(self.checkout.poll_interval(), self.checkout.max_wait());
        CommitPoller::new(self.bookings.clone(), policy)
    }
}
