use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub supplier: SupplierConfig,
    #[serde(default)]
    pub checkout: CheckoutSettings,
    pub payment: PaymentConfig,
    #[serde(default)]
    pub sandbox: SandboxSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SupplierConfig {
    pub base_url: String,
    /// Tenant channel the supplier bills bookings to
    pub partner_channel_id: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_wait_seconds")]
    pub max_wait_seconds: u64,
    #[serde(default = "default_true")]
    pub wait_for_confirmation: bool,
}

impl CheckoutSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_secs(self.max_wait_seconds)
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_wait_seconds: default_max_wait_seconds(),
            wait_for_confirmation: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub publishable_key: String,
    #[serde(default)]
    pub skip_payment: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SandboxSettings {
    /// Status reads before a PENDING booking is decided
    #[serde(default = "default_confirm_after_polls")]
    pub confirm_after_polls: u32,
    #[serde(default)]
    pub reject_bookings: bool,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            confirm_after_polls: default_confirm_after_polls(),
            reject_bookings: false,
        }
    }
}

fn default_poll_interval_ms() -> u64 { 2000 }
fn default_max_wait_seconds() -> u64 { 60 }
fn default_confirm_after_polls() -> u32 { 2 }
fn default_true() -> bool { true }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Optional per-environment overrides, 'development' by default
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `VENTURA_CHECKOUT__MAX_WAIT_SECONDS=30`
            .add_source(config::Environment::with_prefix("VENTURA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_defaults() {
        let settings = CheckoutSettings::default();
        assert_eq!(settings.poll_interval(), Duration::from_secs(2));
        assert_eq!(settings.max_wait(), Duration::from_secs(60));
        assert!(settings.wait_for_confirmation);
    }

    #[test]
    fn test_sections_fill_defaults() {
        let toml = r#"
            [server]
            port = 8080

            [supplier]
            base_url = "https://supplier.test"
            partner_channel_id = "ch-1"

            [checkout]
            max_wait_seconds = 30

            [payment]
            publishable_key = "pk_test"
        "#;
        let config: Config = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.checkout.max_wait_seconds, 30);
        assert_eq!(config.checkout.poll_interval_ms, 2000);
        assert!(!config.payment.skip_payment);
        assert_eq!(config.sandbox, SandboxSettings::default());
    }
}
