use std::sync::Arc;

use tracing::{debug, warn};
use ventura_core::supplier::SupplierAvailabilityApi;
use ventura_core::{CoreError, CoreResult};
use ventura_shared::{AvailabilityDetail, CategoryUnits, OptionAnswer};

use crate::pricing;

/// Resolves an availability into a priced, valid slot ready to attach to a booking.
pub struct AvailabilityConfigurator {
    supplier: Arc<dyn SupplierAvailabilityApi>,
}

impl AvailabilityConfigurator {
    pub fn new(supplier: Arc<dyn SupplierAvailabilityApi>) -> Self {
        Self { supplier }
    }

    /// One configuration pass: options, then guest counts, then the validity check.
    ///
    /// Answering options may reveal new required options. When that happens the
    /// returned detail has `option_list.is_complete == false` and pricing is left
    /// untouched; the caller decides whether to ask again.
    pub async fn configure(
        &self,
        availability_id: &str,
        options: &[OptionAnswer],
        pricing_categories: &[CategoryUnits],
    ) -> CoreResult<AvailabilityDetail> {
        let detail = self.supplier.set_options(availability_id, options).await?;

        if !detail.option_list.is_complete {
            debug!(
                availability_id,
                pending = detail.option_list.pending().count(),
                "Availability options incomplete"
            );
            return Ok(detail);
        }

        let detail = if pricing_categories.is_empty() {
            detail
        } else {
            self.supplier
                .set_pricing(availability_id, pricing_categories)
                .await?
        };

        if !detail.is_valid {
            let reason = invalid_reason(&detail);
            warn!(availability_id, %reason, "Availability configuration rejected");
            return Err(CoreError::ConfigurationInvalid(reason));
        }

        debug!(
            availability_id,
            total = detail
                .total_price
                .as_ref()
                .map(|p| p.gross_formatted_text.as_str())
                .unwrap_or("-"),
            "Availability configured"
        );
        Ok(detail)
    }
}

/// Explain an `is_valid == false` response using the local pricing rules.
/// Falls back to a generic message when the supplier knows something we don't.
fn invalid_reason(detail: &AvailabilityDetail) -> String {
    let violations = pricing::violations(&detail.pricing_category_list);
    if violations.is_empty() {
        "The selected guests are not bookable for this date".to_string()
    } else {
        violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
