pub mod models;
pub mod pii;

pub use models::availability::{
    AvailabilityDetail, AvailabilityDiscovery, AvailabilityOption, AvailabilitySlot,
    CategoryUnits, OptionAnswer, OptionChoice, OptionList, ParticipantDependency,
    PricingCategory, PricingCategoryList,
};
pub use models::booking::{BookedAvailability, Booking, BookingState, QuestionTree};
pub use models::price::Price;
pub use models::question::{Person, Question, QuestionOption, QuestionType};
pub use pii::Masked;
