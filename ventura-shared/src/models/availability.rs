use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::price::Price;

/// A dated slot returned by availability discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlot {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub sold_out: bool,
    #[serde(default)]
    pub guide_price: Option<Price>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionChoice {
    pub label: String,
    pub value: String,
}

/// A configuration question on an availability, e.g. time slot or variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityOption {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub option_type: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub answer_value: Option<String>,
    #[serde(default)]
    pub choices: Vec<OptionChoice>,
}

impl AvailabilityOption {
    pub fn is_answered(&self) -> bool {
        self.answer_value
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionList {
    pub is_complete: bool,
    #[serde(default)]
    pub nodes: Vec<AvailabilityOption>,
}

impl OptionList {
    /// Required options still waiting for an answer.
    pub fn pending(&self) -> impl Iterator<Item = &AvailabilityOption> {
        self.nodes.iter().filter(|o| o.is_required && !o.is_answered())
    }
}

/// Caps a category's count as a multiple of another category's count,
/// e.g. "max 2 children per adult".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDependency {
    pub pricing_category_id: String,
    pub multiplier: u32,
}

/// A guest-type price bracket (Adult, Child, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCategory {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub min_participants: u32,
    pub max_participants: u32,
    #[serde(default)]
    pub max_participants_depends: Option<ParticipantDependency>,
    #[serde(default)]
    pub units: u32,
    pub unit_price: Price,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PricingCategoryList {
    #[serde(default)]
    pub nodes: Vec<PricingCategory>,
}

impl PricingCategoryList {
    pub fn get(&self, id: &str) -> Option<&PricingCategory> {
        self.nodes.iter().find(|c| c.id == id)
    }

    pub fn total_units(&self) -> u32 {
        self.nodes.iter().map(|c| c.units).sum()
    }
}

/// An availability after (partial) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDetail {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<String>,
    pub option_list: OptionList,
    pub pricing_category_list: PricingCategoryList,
    #[serde(default)]
    pub total_price: Option<Price>,
    #[serde(default)]
    pub is_valid: bool,
}

impl AvailabilityDetail {
    /// Options complete and pricing valid: the availability may be added to a booking.
    pub fn is_attachable(&self) -> bool {
        self.option_list.is_complete && self.is_valid
    }
}

/// Result of `discoverAvailability` for a product and date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDiscovery {
    pub session_id: String,
    pub product_id: String,
    pub slots: Vec<AvailabilitySlot>,
    #[serde(default)]
    pub option_list: OptionList,
}

/// Answer to an availability option, `(optionId, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionAnswer {
    pub id: String,
    pub value: String,
}

impl OptionAnswer {
    pub fn new(id: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            value: value.to_string(),
        }
    }
}

/// Guest count for a pricing category, `(pricingCategoryId, units)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUnits {
    pub id: String,
    pub units: u32,
}

impl CategoryUnits {
    pub fn new(id: &str, units: u32) -> Self {
        Self {
            id: id.to_string(),
            units,
        }
    }
}
