use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use ventura_catalog::AvailabilityConfigurator;
use ventura_core::payment::{PaymentSession, PaymentStatus};
use ventura_core::supplier::{QuestionAnswer, SupplierAvailabilityApi, SupplierBookingApi};
use ventura_order::orchestrator::DECLINED_MESSAGE;
use ventura_order::{
    AdditionalQuestions, CheckoutDriver, CheckoutError, CheckoutStage, FormField, GuestData,
    PollPolicy,
};
use ventura_shared::{CategoryUnits, Masked, OptionAnswer, QuestionType};
use ventura_store::app_config::SandboxSettings;
use ventura_store::{MockPaymentProvider, SandboxSupplier};

struct Fixture {
    sandbox: Arc<SandboxSupplier>,
    payments: Arc<MockPaymentProvider>,
    booking_id: String,
}

impl Fixture {
    async fn new(settings: SandboxSettings, skip_payment: bool) -> Self {
        let sandbox = Arc::new(SandboxSupplier::demo(settings).await);
        let payments = Arc::new(MockPaymentProvider::new("pk_test", skip_payment));

        let date = NaiveDate::from_ymd_opt(2026, 11, 3).unwrap();
        let discovery = sandbox
            .discover_availability("tour-1", date, date)
            .await
            .unwrap();
        let availability_id = discovery.slots[0].id.clone();

        let configurator = AvailabilityConfigurator::new(sandbox.clone());
        let detail = configurator
            .configure(&availability_id, &[OptionAnswer::new("language", "en")], &[])
            .await
            .unwrap();
        assert!(!detail.option_list.is_complete);
        let detail = configurator
            .configure(
                &availability_id,
                &[OptionAnswer::new("startTime", "09:30")],
                &[CategoryUnits::new("adult", 1), CategoryUnits::new("child", 1)],
            )
            .await
            .unwrap();
        assert!(detail.is_attachable());

        let booking = sandbox.create_booking().await.unwrap();
        sandbox
            .add_availability(&booking.id, &availability_id)
            .await
            .unwrap();

        Self {
            sandbox,
            payments,
            booking_id: booking.id,
        }
    }

    fn driver(&self) -> CheckoutDriver {
        CheckoutDriver::new(
            &self.booking_id,
            self.sandbox.clone(),
            self.payments.clone(),
            PollPolicy::new(Duration::from_secs(1), Duration::from_secs(5)),
        )
    }
}

fn lead_guest() -> GuestData {
    GuestData {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: Masked::from("ada@example.com"),
        phone_country_code: "+44".to_string(),
        phone_number: Masked::from("7700900123"),
        terms_accepted: true,
        question_answers: Vec::new(),
    }
}

/// Answer every displayed required question with something acceptable.
fn answer_required(guest: &mut GuestData, displayed: &AdditionalQuestions) {
    for question in displayed.iter().filter(|q| q.is_required) {
        let value = match question.question_type {
            QuestionType::Boolean => "true".to_string(),
            _ => question
                .available_options
                .first()
                .map(|o| o.value.clone())
                .unwrap_or_else(|| "Grace".to_string()),
        };
        guest
            .question_answers
            .push(QuestionAnswer::new(&question.id, &value));
    }
}

async fn at_payment(fixture: &Fixture) -> CheckoutDriver {
    let mut driver = fixture.driver();
    driver.load().await.unwrap();
    let mut guest = lead_guest();
    answer_required(&mut guest, driver.displayed_questions());
    assert_eq!(driver.submit_answers(&guest).await.unwrap(), CheckoutStage::Review);
    assert_eq!(driver.proceed_to_payment().unwrap(), CheckoutStage::Payment);
    driver
}

fn client_secret(session: PaymentSession) -> String {
    match session {
        PaymentSession::Intent { client_secret, .. } => client_secret,
        PaymentSession::Skip { .. } => panic!("expected a payment intent"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_full_checkout_confirms() {
    let fixture = Fixture::new(SandboxSettings::default(), false).await;
    let mut driver = fixture.driver();

    assert_eq!(driver.load().await.unwrap(), CheckoutStage::Questions);
    let displayed = driver.displayed_questions().clone();
    // contact questions are filled from the form, the lead's first name too
    assert!(displayed.booking_questions.iter().all(|q| q.id == "wheelchair"));
    assert_eq!(displayed.required_count(), 4);

    let mut guest = lead_guest();
    answer_required(&mut guest, &displayed);
    assert_eq!(driver.submit_answers(&guest).await.unwrap(), CheckoutStage::Review);
    driver.proceed_to_payment().unwrap();

    let session = driver.start_payment().await.unwrap();
    assert_eq!(
        fixture.payments.amount_for(&fixture.booking_id).await.unwrap().gross,
        2500 + 1200
    );
    let stage = driver.complete_payment(&client_secret(session)).await.unwrap();

    assert_eq!(stage, CheckoutStage::Done);
    assert_eq!(
        driver.machine().confirmation().unwrap().url(),
        format!("/booking/{}/confirmation", fixture.booking_id)
    );
    assert!(driver.booking().unwrap().voucher_url.is_some());
}

#[tokio::test]
async fn test_submission_fills_lead_details() {
    let fixture = Fixture::new(SandboxSettings::default(), false).await;
    let mut driver = fixture.driver();
    driver.load().await.unwrap();

    let mut guest = lead_guest();
    answer_required(&mut guest, driver.displayed_questions());
    driver.submit_answers(&guest).await.unwrap();

    let submission = fixture
        .sandbox
        .last_submission(&fixture.booking_id)
        .await
        .unwrap();
    assert_eq!(submission.customer_phone.expose(), "+44 7700900123");
    assert_eq!(submission.guests.len(), 2);
    assert!(submission.guests[0].is_lead_guest);
    assert!(submission.guests[0].email.is_some());
    assert!(submission.guests[1].email.is_none());

    let answer = |id: &str| {
        submission
            .question_answers
            .iter()
            .find(|a| a.question_id == id)
            .map(|a| a.value.clone())
    };
    assert_eq!(answer("leadEmail").as_deref(), Some("ada@example.com"));
    assert_eq!(answer("leadPhone").as_deref(), Some("+44 7700900123"));
    let lead_first_name = format!("{}:firstName", submission.guests[0].person_id);
    assert_eq!(answer(&lead_first_name).as_deref(), Some("Ada"));
}

#[tokio::test]
async fn test_conditional_question_needs_second_submission() {
    let fixture = Fixture::new(SandboxSettings::default(), false).await;
    let mut driver = fixture.driver();
    driver.load().await.unwrap();

    let mut guest = lead_guest();
    answer_required(&mut guest, driver.displayed_questions());
    guest
        .question_answers
        .push(QuestionAnswer::new("wheelchair", "true"));

    let stage = driver.submit_answers(&guest).await.unwrap();
    assert_eq!(stage, CheckoutStage::Questions);
    assert!(!driver.machine().can_commit());
    assert_eq!(
        driver.machine().error(),
        Some("There is 1 additional question that requires your attention.")
    );
    assert_eq!(driver.machine().submit_label(), "Submit Answers");

    let displayed = driver.displayed_questions().clone();
    assert!(displayed.iter().any(|q| q.id == "wheelchairDetails"));

    answer_required(&mut guest, &displayed);
    assert_eq!(driver.submit_answers(&guest).await.unwrap(), CheckoutStage::Review);
    assert_eq!(fixture.sandbox.submission_count(&fixture.booking_id).await, 2);
}

#[tokio::test]
async fn test_invalid_form_never_reaches_supplier() {
    let fixture = Fixture::new(SandboxSettings::default(), false).await;
    let mut driver = fixture.driver();
    driver.load().await.unwrap();

    let mut guest = lead_guest();
    guest.terms_accepted = false;
    guest.email = Masked::from("not-an-email");

    let Err(CheckoutError::Validation(errors)) = driver.submit_answers(&guest).await else {
        panic!("expected validation errors");
    };
    assert_eq!(errors.focus_target(), Some(&FormField::Email));
    assert!(errors.get(&FormField::Terms).is_some());
    assert_eq!(driver.machine().stage(), CheckoutStage::Questions);
    assert!(driver.machine().in_flight().is_none());
    assert_eq!(fixture.sandbox.submission_count(&fixture.booking_id).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_requires_capture_commits() {
    let fixture = Fixture::new(SandboxSettings::default(), false).await;
    let mut driver = at_payment(&fixture).await;
    fixture.payments.respond_with(PaymentStatus::RequiresCapture).await;

    let session = driver.start_payment().await.unwrap();
    assert_eq!(driver.machine().stage(), CheckoutStage::Payment);
    assert!(driver.machine().in_flight().is_none());
    assert!(driver.start_payment().await.is_ok());

    let stage = driver.complete_payment(&client_secret(session)).await.unwrap();
    assert_eq!(stage, CheckoutStage::Done);
}

#[tokio::test]
async fn test_declined_payment_can_be_retried() {
    let fixture = Fixture::new(SandboxSettings::default(), false).await;
    let mut driver = at_payment(&fixture).await;
    fixture.payments.respond_with(PaymentStatus::RequiresPaymentMethod).await;

    let secret = client_secret(driver.start_payment().await.unwrap());
    let stage = driver.complete_payment(&secret).await.unwrap();
    assert_eq!(stage, CheckoutStage::Payment);
    assert_eq!(driver.machine().error(), Some(DECLINED_MESSAGE));

    fixture.payments.decline_with("Your card has insufficient funds.").await;
    let stage = driver.complete_payment(&secret).await.unwrap();
    assert_eq!(stage, CheckoutStage::Payment);
    assert_eq!(driver.machine().error(), Some("Your card has insufficient funds."));
}

#[tokio::test(start_paused = true)]
async fn test_rejected_booking_is_terminal() {
    let settings = SandboxSettings {
        reject_bookings: true,
        ..SandboxSettings::default()
    };
    let fixture = Fixture::new(settings, false).await;
    let mut driver = at_payment(&fixture).await;

    let secret = client_secret(driver.start_payment().await.unwrap());
    let stage = driver.complete_payment(&secret).await.unwrap();
    assert_eq!(stage, CheckoutStage::Rejected);
    assert!(driver.machine().confirmation().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_slow_supplier_lands_on_pending_confirmation() {
    let settings = SandboxSettings {
        confirm_after_polls: 100,
        ..SandboxSettings::default()
    };
    let fixture = Fixture::new(settings, false).await;
    let mut driver = at_payment(&fixture).await;

    let secret = client_secret(driver.start_payment().await.unwrap());
    let stage = driver.complete_payment(&secret).await.unwrap();
    assert_eq!(stage, CheckoutStage::Done);
    assert_eq!(
        driver.machine().confirmation().unwrap().url(),
        format!("/booking/{}/confirmation?pending=true", fixture.booking_id)
    );
}

#[tokio::test(start_paused = true)]
async fn test_skip_payment_commits_straight_away() {
    let fixture = Fixture::new(SandboxSettings::default(), true).await;
    let mut driver = at_payment(&fixture).await;

    let session = driver.start_payment().await.unwrap();
    assert!(session.is_skip());
    assert_eq!(driver.machine().stage(), CheckoutStage::Done);
}

#[tokio::test]
async fn test_load_terminal_bookings() {
    let fixture = Fixture::new(SandboxSettings::default(), false).await;
    fixture.sandbox.cancel(&fixture.booking_id).await.unwrap();
    let mut driver = fixture.driver();
    assert_eq!(driver.load().await.unwrap(), CheckoutStage::Cancelled);

    let mut missing = CheckoutDriver::new(
        "no-such-booking",
        fixture.sandbox.clone(),
        fixture.payments.clone(),
        PollPolicy::default(),
    );
    assert_eq!(missing.load().await.unwrap(), CheckoutStage::NotFound);
}
