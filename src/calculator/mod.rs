//! Item value calculator
//!
//! `value = base_value * (weight / weight_divisor) * mutation * variant`,
//! rounded to two decimal places.
//!
//! Items match on id or display name, case-insensitively, and the first
//! match in [`data::ITEMS`] wins. Unknown mutation or variant names count as
//! a multiplier of 1.

pub mod data;

use thiserror::Error;

use crate::notifications::{colors, MessageContent};
use data::{ItemSpec, Multiplier, ITEMS, MUTATIONS, VARIANTS};

/// Name used when no mutation or variant is given
pub const DEFAULT_MODIFIER: &str = "normal";

/// Calculator errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("Item '{0}' not found")]
    UnknownItem(String),

    #[error("Weight must be a positive number, got {0}")]
    InvalidWeight(f64),
}

/// Result of a calculation
#[derive(Debug, Clone, PartialEq)]
pub struct Valuation {
    pub item: &'static ItemSpec,
    pub weight: f64,
    /// Mutation name as entered
    pub mutation: String,
    pub mutation_factor: f64,
    /// Variant name as entered
    pub variant: String,
    pub variant_factor: f64,
    pub value: f64,
}

impl Valuation {
    /// Value formatted with a dollar sign and thousands separators
    pub fn formatted_value(&self) -> String {
        format_currency(self.value)
    }

    /// Render as a message
    pub fn to_message(&self) -> MessageContent {
        MessageContent::new("🍇 Item Value Calculator", colors::CALCULATOR)
            .with_field("Item", self.item.display_name, true)
            .with_field("Weight", self.weight.to_string(), true)
            .with_field("Mutation", title_case(&self.mutation), true)
            .with_field("Variant", title_case(&self.variant), true)
            .with_field("Calculated Value", self.formatted_value(), false)
    }
}

/// Find an item by id or display name
pub fn find_item(name: &str) -> Option<&'static ItemSpec> {
    let needle = name.trim().to_lowercase();
    ITEMS
        .iter()
        .find(|item| item.id == needle || item.display_name.to_lowercase() == needle)
}

fn lookup(table: &'static [Multiplier], name: &str) -> f64 {
    let needle = name.trim().to_lowercase();
    table
        .iter()
        .find(|m| m.id == needle || m.display_name.to_lowercase() == needle)
        .map_or(1.0, |m| m.factor)
}

/// Multiplier for a mutation name (1 when unknown)
pub fn mutation_factor(name: &str) -> f64 {
    lookup(MUTATIONS, name)
}

/// Multiplier for a variant name (1 when unknown)
pub fn variant_factor(name: &str) -> f64 {
    lookup(VARIANTS, name)
}

/// Calculate the value of an item
pub fn calculate(
    item_name: &str,
    weight: f64,
    mutation: &str,
    variant: &str,
) -> Result<Valuation, CalcError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(CalcError::InvalidWeight(weight));
    }

    let item = find_item(item_name).ok_or_else(|| CalcError::UnknownItem(item_name.to_string()))?;
    let mutation_factor = mutation_factor(mutation);
    let variant_factor = variant_factor(variant);

    let raw = item.base_value * (weight / item.weight_divisor) * mutation_factor * variant_factor;

    Ok(Valuation {
        item,
        weight,
        mutation: mutation.to_string(),
        mutation_factor,
        variant: variant.to_string(),
        variant_factor,
        value: round2(raw),
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format as `$1,234.56`
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

/// Capitalize the first letter of each word
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}
