// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable labels for the closed enums of the domain model.
//!
//! Each enum has one static table used in both directions, so `label` and
//! `from_label` cannot drift apart.

use crate::types::{Allergen, DietaryRestriction};

const DIETARY_LABELS: [(DietaryRestriction, &str); 6] = [
    (DietaryRestriction::None, "None"),
    (DietaryRestriction::Vegetarian, "Vegetarian"),
    (DietaryRestriction::Vegan, "Vegan"),
    (DietaryRestriction::Halal, "Halal"),
    (DietaryRestriction::Kosher, "Kosher"),
    (DietaryRestriction::Pescetarian, "Pescetarian"),
];

const ALLERGEN_LABELS: [(Allergen, &str); 10] = [
    (Allergen::Peanut, "Peanut"),
    (Allergen::TreeNut, "Tree nut"),
    (Allergen::Milk, "Milk"),
    (Allergen::Egg, "Egg"),
    (Allergen::Fish, "Fish"),
    (Allergen::Shellfish, "Shellfish"),
    (Allergen::Wheat, "Wheat"),
    (Allergen::Soy, "Soy"),
    (Allergen::Sesame, "Sesame"),
    (Allergen::Gluten, "Gluten"),
];

fn label_of<T: Copy + PartialEq>(table: &[(T, &'static str)], value: T) -> &'static str {
    table
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
        .unwrap_or_default()
}

/// Case-insensitive, whitespace-tolerant reverse lookup.
fn value_of<T: Copy>(table: &[(T, &'static str)], label: &str) -> Option<T> {
    let label = label.trim();
    table
        .iter()
        .find(|(_, l)| l.eq_ignore_ascii_case(label))
        .map(|(v, _)| *v)
}

impl DietaryRestriction {
    /// Display label, e.g. "Pescetarian".
    pub fn label(self) -> &'static str {
        label_of(&DIETARY_LABELS, self)
    }

    /// Parse a display label back into a restriction.
    pub fn from_label(label: &str) -> Option<Self> {
        value_of(&DIETARY_LABELS, label)
    }

    /// Every label in declaration order, for pickers.
    pub fn labels() -> impl Iterator<Item = &'static str> {
        DIETARY_LABELS.iter().map(|(_, label)| *label)
    }
}

impl Allergen {
    /// Display label, e.g. "Tree nut".
    pub fn label(self) -> &'static str {
        label_of(&ALLERGEN_LABELS, self)
    }

    /// Parse a display label back into an allergen.
    pub fn from_label(label: &str) -> Option<Self> {
        value_of(&ALLERGEN_LABELS, label)
    }

    /// Every label in declaration order, for pickers.
    pub fn labels() -> impl Iterator<Item = &'static str> {
        ALLERGEN_LABELS.iter().map(|(_, label)| *label)
    }
}
