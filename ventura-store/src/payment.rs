use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;
use ventura_core::payment::{PaymentConfirmation, PaymentProvider, PaymentSession, PaymentStatus};
use ventura_core::{CoreError, CoreResult};
use ventura_shared::Price;

#[derive(Debug, Clone)]
enum Script {
    Status(PaymentStatus),
    Decline(String),
}

/// Stand-in for the card processor. Confirmation answers with whatever was scripted.
pub struct MockPaymentProvider {
    publishable_key: String,
    skip_payment: bool,
    script: RwLock<Script>,
    intents: RwLock<HashMap<String, (String, Price)>>,
}

impl MockPaymentProvider {
    pub fn new(publishable_key: &str, skip_payment: bool) -> Self {
        Self {
            publishable_key: publishable_key.to_string(),
            skip_payment,
            script: RwLock::new(Script::Status(PaymentStatus::Succeeded)),
            intents: RwLock::new(HashMap::new()),
        }
    }

    /// Status returned by the next confirmations
    pub async fn respond_with(&self, status: PaymentStatus) {
        *self.script.write().await = Script::Status(status);
    }

    /// Make confirmations fail with an explicit decline
    pub async fn decline_with(&self, message: &str) {
        *self.script.write().await = Script::Decline(message.to_string());
    }

    /// Amount held for a booking's intent, if one was created.
    pub async fn amount_for(&self, booking_id: &str) -> Option<Price> {
        let intents = self.intents.read().await;
        intents
            .values()
            .find(|(id, _)| id == booking_id)
            .map(|(_, price)| price.clone())
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_payment_intent(&self, booking_id: &str, amount: &Price) -> CoreResult<PaymentSession> {
        if self.skip_payment {
            return Ok(PaymentSession::skip());
        }

        let intent_id = format!("pi_{}", Uuid::new_v4().simple());
        let client_secret = format!("{intent_id}_secret");
        info!(booking_id, amount = %amount.gross_formatted_text, "Payment intent created");

        self.intents
            .write()
            .await
            .insert(client_secret.clone(), (booking_id.to_string(), amount.clone()));
        Ok(PaymentSession::Intent {
            publishable_key: self.publishable_key.clone(),
            client_secret,
        })
    }

    async fn confirm_payment(&self, client_secret: &str) -> CoreResult<PaymentConfirmation> {
        if !self.intents.read().await.contains_key(client_secret) {
            return Err(CoreError::NotFound(format!("payment intent {client_secret}")));
        }

        match self.script.read().await.clone() {
            Script::Status(status) => Ok(PaymentConfirmation {
                status,
                payment_intent_id: client_secret.strip_suffix("_secret").map(str::to_string),
            }),
            Script::Decline(message) => Err(CoreError::PaymentDeclined(message)),
        }
    }
}
