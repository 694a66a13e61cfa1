pub mod checkout;
pub mod commit;
pub mod driver;
pub mod models;
pub mod orchestrator;
pub mod questions;
pub mod resolver;
pub mod validation;

pub use checkout::{CheckoutError, CheckoutMachine, CheckoutStage, PendingAction};
pub use commit::{CommitPoller, CommitResult, ConfirmationOutcome, PollPolicy};
pub use driver::CheckoutDriver;
pub use models::{AdditionalQuestions, GuestData};
pub use orchestrator::{PaymentOrchestrator, PaymentOutcome};
pub use resolver::{AnswerReport, QuestionResolver, ResolvedQuestions};
pub use validation::{validate_guest, FormField, ValidationErrors};
