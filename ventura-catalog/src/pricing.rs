use ventura_shared::{CategoryUnits, Price, PricingCategory, PricingCategoryList};

/// A pricing-category bound broken by the selected guest counts
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("At least one participant is required")]
    NoParticipants,

    #[error("{label}: at least {min} required, {units} selected")]
    BelowMinimum { label: String, min: u32, units: u32 },

    #[error("{label}: at most {max} allowed, {units} selected")]
    AboveMaximum { label: String, max: u32, units: u32 },

    #[error("{label}: at most {multiplier} per {parent}, {units} selected for {parent_units} {parent}")]
    DependencyExceeded {
        label: String,
        parent: String,
        multiplier: u32,
        units: u32,
        parent_units: u32,
    },

    #[error("Unknown pricing category: {0}")]
    UnknownCategory(String),
}

/// Write guest counts onto the matching categories. Categories not mentioned keep their count.
pub fn apply_units(
    list: &mut PricingCategoryList,
    counts: &[CategoryUnits],
) -> Result<(), PricingError> {
    for count in counts {
        let category = list
            .nodes
            .iter_mut()
            .find(|c| c.id == count.id)
            .ok_or_else(|| PricingError::UnknownCategory(count.id.clone()))?;
        category.units = count.units;
    }
    Ok(())
}

/// Upper bound for a category once its dependency (if any) is taken into account.
///
/// The dependent bound is inclusive: "max 2 children per adult" allows exactly 2 per adult.
pub fn effective_max(list: &PricingCategoryList, category: &PricingCategory) -> u32 {
    match &category.max_participants_depends {
        Some(dep) => {
            let parent_units = list
                .get(&dep.pricing_category_id)
                .map(|p| p.units)
                .unwrap_or(0);
            category
                .max_participants
                .min(parent_units.saturating_mul(dep.multiplier))
        }
        None => category.max_participants,
    }
}

/// Check every bound and return all violations, in category order.
pub fn violations(list: &PricingCategoryList) -> Vec<PricingError> {
    let mut errors = Vec::new();

    if list.total_units() == 0 {
        errors.push(PricingError::NoParticipants);
    }

    for category in &list.nodes {
        if category.units < category.min_participants {
            errors.push(PricingError::BelowMinimum {
                label: category.label.clone(),
                min: category.min_participants,
                units: category.units,
            });
        }

        if category.units > category.max_participants {
            errors.push(PricingError::AboveMaximum {
                label: category.label.clone(),
                max: category.max_participants,
                units: category.units,
            });
            continue;
        }

        if let Some(dep) = &category.max_participants_depends {
            let limit = effective_max(list, category);
            if category.units > limit {
                let (parent, parent_units) = list
                    .get(&dep.pricing_category_id)
                    .map(|p| (p.label.clone(), p.units))
                    .unwrap_or_else(|| (dep.pricing_category_id.clone(), 0));
                errors.push(PricingError::DependencyExceeded {
                    label: category.label.clone(),
                    parent,
                    multiplier: dep.multiplier,
                    units: category.units,
                    parent_units,
                });
            }
        }
    }

    errors
}

pub fn is_valid(list: &PricingCategoryList) -> bool {
    violations(list).is_empty()
}

/// Sum of `unit_price * units`; `None` when nothing is selected.
pub fn total_price(list: &PricingCategoryList) -> Option<Price> {
    list.nodes
        .iter()
        .filter(|c| c.units > 0)
        .map(|c| c.unit_price.times(c.units))
        .reduce(|acc, p| acc.plus(&p))
}
