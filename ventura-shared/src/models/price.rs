use serde::{Deserialize, Serialize};

/// A monetary amount as the supplier reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    /// Amount in minor units (e.g. pence, cents)
    pub gross: i64,
    pub currency: String,
    pub gross_formatted_text: String,
}

impl Price {
    pub fn new(gross: i64, currency: &str) -> Self {
        Self {
            gross,
            currency: currency.to_uppercase(),
            gross_formatted_text: format_minor(gross, currency),
        }
    }

    pub fn zero(currency: &str) -> Self {
        Self::new(0, currency)
    }

    /// Price of `units` items at this unit price.
    pub fn times(&self, units: u32) -> Self {
        Self::new(self.gross * i64::from(units), &self.currency)
    }

    /// Sum two prices. Currencies are expected to match; the left side wins otherwise.
    pub fn plus(&self, other: &Price) -> Self {
        Self::new(self.gross + other.gross, &self.currency)
    }
}

/// Render a minor-unit amount for display, e.g. `1250, "GBP"` -> `£12.50`.
pub fn format_minor(amount: i64, currency: &str) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let major = abs / 100;
    let minor = abs % 100;

    match currency.to_uppercase().as_str() {
        "GBP" => format!("{sign}£{major}.{minor:02}"),
        "EUR" => format!("{sign}€{major}.{minor:02}"),
        "USD" => format!("{sign}${major}.{minor:02}"),
        other => format!("{sign}{other} {major}.{minor:02}"),
    }
}
