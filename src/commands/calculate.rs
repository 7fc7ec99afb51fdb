use anyhow::Result;

use crate::calculator::{self, Valuation};

/// Print the value of an item
pub fn calculate(item: &str, weight: f64, mutation: &str, variant: &str) -> Result<Valuation> {
    let valuation = calculator::calculate(item, weight, mutation, variant)?;
    let message = valuation.to_message();

    println!("{}", message.title);
    println!("{}", "=".repeat(24));
    for field in &message.fields {
        println!("  {:<18} {}", format!("{}:", field.name), field.value);
    }

    tracing::debug!(
        item = valuation.item.id,
        weight,
        mutation_factor = valuation.mutation_factor,
        variant_factor = valuation.variant_factor,
        value = valuation.value,
        "Calculated item value"
    );
    Ok(valuation)
}
