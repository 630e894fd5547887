//! Locale-aware string ordering for display names.
//!
//! Uses the CLDR root collation at tertiary strength: base letters decide
//! first, then accents, then case. Ligatures such as Æ and Œ expand to their
//! letters, so "Ætna" sorts next to "Aetna" rather than after "Z".

use icu_collator::{Collator, CollatorOptions, Strength};
use std::cmp::Ordering;

thread_local! {
    // Collator data is not `Sync`; one instance per thread.
    static ROOT_COLLATOR: Option<Collator> = root_collator();
}

fn root_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!("Root collator unavailable, sorting by code point: {}", e);
            None
        }
    }
}

/// Compare two strings the way a locale-aware `localeCompare` would, ascending.
///
/// Strings the collator considers equal fall back to code point order so the
/// result stays total.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR
        .with(|collator| match collator {
            Some(collator) => collator.compare(a, b),
            None => Ordering::Equal,
        })
        .then_with(|| a.cmp(b))
}
