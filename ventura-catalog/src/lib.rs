pub mod configurator;
pub mod pricing;

pub use configurator::AvailabilityConfigurator;
pub use pricing::PricingError;
