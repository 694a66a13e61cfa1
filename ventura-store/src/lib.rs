pub mod app_config;
pub mod payment;
pub mod sandbox;
pub mod stats;

pub use app_config::Config;
pub use payment::MockPaymentProvider;
pub use sandbox::{ProductTemplate, SandboxSupplier};
pub use stats::InMemoryBookingStats;
