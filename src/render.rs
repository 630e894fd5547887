//! Plain-text presentation for the terminal.

use crate::aggregator::Progress;
use crate::constants::{EMPTY_RESULTS_MESSAGE, NO_INGREDIENTS_MESSAGE};
use crate::types::Drink;
use std::fmt::Write;

/// `[##########----------]  50% (18/36)`
pub fn progress_bar(progress: Progress, width: usize) -> String {
    let fraction = progress.fraction();
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!(
        "[{}{}] {:>3}% ({}/{})",
        "#".repeat(filled),
        "-".repeat(width - filled),
        (fraction * 100.0).round() as u32,
        progress.completed,
        progress.total
    )
}

/// "12 of 431"
pub fn count_line(shown: usize, total: usize) -> String {
    format!("{} of {}", shown, total)
}

pub fn drink_row(drink: &Drink) -> String {
    match &drink.category {
        Some(category) => format!("🍸 {}\n   {}", drink.name, category),
        None => format!("🍸 {}", drink.name),
    }
}

/// Rows for a filtered list, or the empty-state message.
pub fn drink_list(drinks: &[&Drink], limit: Option<usize>) -> String {
    if drinks.is_empty() {
        return EMPTY_RESULTS_MESSAGE.to_string();
    }
    let shown = limit.unwrap_or(drinks.len()).min(drinks.len());
    let mut out = drinks[..shown]
        .iter()
        .map(|d| drink_row(d))
        .collect::<Vec<_>>()
        .join("\n");
    if shown < drinks.len() {
        let _ = write!(out, "\n… {} more", drinks.len() - shown);
    }
    out
}

/// "Alcoholic • Cocktail", with either half optional.
pub fn meta_line(drink: &Drink) -> Option<String> {
    match (drink.alcoholic.as_deref(), drink.category.as_deref()) {
        (Some(a), Some(c)) => Some(format!("{} • {}", a, c)),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(c)) => Some(c.to_string()),
        (None, None) => None,
    }
}

/// Full detail view of one drink.
pub fn drink_card(drink: &Drink) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", drink.name);
    let _ = writeln!(out, "{}", "=".repeat(drink.name.chars().count().max(3)));
    if let Some(meta) = meta_line(drink) {
        let _ = writeln!(out, "{}", meta);
    }
    if let Some(glass) = &drink.glass {
        let _ = writeln!(out, "Glass: {}", glass);
    }
    if let Some(thumb) = &drink.thumbnail {
        let _ = writeln!(out, "Image: {}", thumb);
    }

    let _ = writeln!(out, "\nIngredients");
    let ingredients = drink.ingredients();
    if ingredients.is_empty() {
        let _ = writeln!(out, "  {}", NO_INGREDIENTS_MESSAGE);
    } else {
        for line in ingredients {
            let _ = writeln!(out, "  • {}", line);
        }
    }

    if let Some(instructions) = drink.instructions.as_deref().filter(|s| !s.trim().is_empty()) {
        let _ = writeln!(out, "\nInstructions");
        let _ = writeln!(out, "  {}", instructions.trim());
    }
    out
}
