// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation between domain records and their persisted row form.
//!
//! Every backend stores the row records defined here, so both backends apply
//! the same enum token tables, the same blank-to-null rules and the same date
//! translation. Nothing in this module fails: unknown tokens are skipped and
//! unparsable dates become empty.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::types::{Allergen, Cart, DietaryRestriction, FoodItem, Group, UserProfile};

/// Date format used by the domain model and callers, e.g. `2025/10/05`.
pub const DOMAIN_DATE_FORMAT: &str = "%Y/%m/%d";

/// Date format written to storage, e.g. `2025-10-05`.
pub const STORAGE_DATE_FORMAT: &str = "%Y-%m-%d";

const DIETARY_TOKENS: [(DietaryRestriction, &str); 6] = [
    (DietaryRestriction::None, "NONE"),
    (DietaryRestriction::Vegetarian, "VEGETARIAN"),
    (DietaryRestriction::Vegan, "VEGAN"),
    (DietaryRestriction::Halal, "HALAL"),
    (DietaryRestriction::Kosher, "KOSHER"),
    (DietaryRestriction::Pescetarian, "PESCETARIAN"),
];

const ALLERGEN_TOKENS: [(Allergen, &str); 10] = [
    (Allergen::Peanut, "PEANUT"),
    (Allergen::TreeNut, "TREE_NUT"),
    (Allergen::Milk, "MILK"),
    (Allergen::Egg, "EGG"),
    (Allergen::Fish, "FISH"),
    (Allergen::Shellfish, "SHELLFISH"),
    (Allergen::Wheat, "WHEAT"),
    (Allergen::Soy, "SOY"),
    (Allergen::Sesame, "SESAME"),
    (Allergen::Gluten, "GLUTEN"),
];

impl DietaryRestriction {
    /// Storage token, e.g. `PESCETARIAN`.
    pub fn to_token(self) -> &'static str {
        DIETARY_TOKENS
            .iter()
            .find(|(v, _)| *v == self)
            .map(|(_, token)| *token)
            .unwrap_or_default()
    }

    pub fn from_token(token: &str) -> Option<Self> {
        DIETARY_TOKENS
            .iter()
            .find(|(_, t)| *t == token)
            .map(|(v, _)| *v)
    }
}

impl Allergen {
    /// Storage token, e.g. `TREE_NUT`.
    pub fn to_token(self) -> &'static str {
        ALLERGEN_TOKENS
            .iter()
            .find(|(v, _)| *v == self)
            .map(|(_, token)| *token)
            .unwrap_or_default()
    }

    pub fn from_token(token: &str) -> Option<Self> {
        ALLERGEN_TOKENS
            .iter()
            .find(|(_, t)| *t == token)
            .map(|(v, _)| *v)
    }
}

fn decode_tokens<T: Ord>(
    tokens: Option<Vec<String>>,
    kind: &'static str,
    from_token: fn(&str) -> Option<T>,
) -> BTreeSet<T> {
    tokens
        .unwrap_or_default()
        .iter()
        .filter_map(|token| {
            let value = from_token(token);
            if value.is_none() {
                debug!(kind, token = %token, "skipping unknown storage token");
            }
            value
        })
        .collect()
}

/// Parse a domain date (`yyyy/MM/dd`). Blank or malformed input yields `None`.
///
/// Month and day may omit their leading zero: `2025/1/5` parses as
/// 2025-01-05. Formatting always pads, so such input reads back normalized
/// as `2025/01/05`.
pub fn parse_domain_date(domain: &str) -> Option<NaiveDate> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DOMAIN_DATE_FORMAT).ok()
}

/// Translate a domain date into its stored form. Blank or malformed input
/// yields `None` (stored as NULL).
pub fn to_storage_date(domain: &str) -> Option<String> {
    parse_domain_date(domain).map(|date| date.format(STORAGE_DATE_FORMAT).to_string())
}

/// Translate a stored date back into the domain format.
///
/// Accepts both a plain date (`2025-10-05`) and a date-time
/// (`2025-10-05T13:45:00+00:00`, `2025-10-05 13:45:00`). Anything else,
/// including NULL, yields an empty string.
pub fn to_domain_date(stored: Option<&str>) -> String {
    let Some(raw) = stored.map(str::trim).filter(|s| !s.is_empty()) else {
        return String::new();
    };
    parse_storage_date(raw)
        .map(|date| date.format(DOMAIN_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_storage_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, STORAGE_DATE_FORMAT) {
        return Some(date);
    }
    if let Ok(date_time) = DateTime::parse_from_rfc3339(raw) {
        return Some(date_time.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|date_time| date_time.date())
}

/// NaN and infinities have no stored form and are written as NULL.
fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn non_blank(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Persisted form of a [`UserProfile`]. Relationship collections are not part
/// of the row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub auth_id: Option<Uuid>,
    pub username: String,
    pub dietary_restrictions: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub personal_cart_id: Uuid,
}

impl From<&UserProfile> for UserRecord {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id,
            auth_id: user.auth_id,
            username: user.username.clone(),
            dietary_restrictions: Some(
                user.dietary_restrictions
                    .iter()
                    .map(|r| r.to_token().to_string())
                    .collect(),
            ),
            allergies: Some(
                user.allergies
                    .iter()
                    .map(|a| a.to_token().to_string())
                    .collect(),
            ),
            personal_cart_id: user.personal_cart_id,
        }
    }
}

impl UserRecord {
    /// Domain profile with empty relationship collections.
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            dietary_restrictions: decode_tokens(
                self.dietary_restrictions,
                "dietary_restriction",
                DietaryRestriction::from_token,
            ),
            allergies: decode_tokens(self.allergies, "allergen", Allergen::from_token),
            auth_id: self.auth_id,
            id: self.id,
            ..UserProfile::new(self.username, self.personal_cart_id)
        }
    }
}

/// Persisted form of a [`Group`]. Members and cart contents live in junctions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: Uuid,
    pub name: String,
    pub owner: String,
    pub shared_cart_id: Uuid,
}

impl From<&Group> for GroupRecord {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            name: group.name.clone(),
            owner: group.owner.clone(),
            shared_cart_id: group.shared_cart_id,
        }
    }
}

impl GroupRecord {
    /// Domain group with no members and an empty shared cart.
    pub fn into_group(self) -> Group {
        Group {
            id: self.id,
            ..Group::new(self.name, self.owner, self.shared_cart_id)
        }
    }
}

/// Persisted form of a [`Cart`]: only its identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartRecord {
    pub id: Uuid,
}

impl From<&Cart> for CartRecord {
    fn from(cart: &Cart) -> Self {
        Self { id: cart.id }
    }
}

impl CartRecord {
    pub fn into_cart(self) -> Cart {
        Cart::with_id(self.id)
    }
}

/// Persisted form of a [`FoodItem`].
///
/// Blank strings, empty lists and non-finite numbers are stored as NULL;
/// dates use [`STORAGE_DATE_FORMAT`]. Owners live in the containment junction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItemRecord {
    pub id: Uuid,
    pub name: String,
    pub price: Option<f64>,
    pub barcode: Option<String>,
    pub purchase_date: Option<String>,
    pub expiration_date: Option<String>,
    pub image_url: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub allergens: Option<Vec<String>>,
    pub quantity: Option<f64>,
}

impl From<&FoodItem> for FoodItemRecord {
    fn from(item: &FoodItem) -> Self {
        Self {
            id: item.id,
            name: item.name.clone(),
            price: finite(item.price),
            barcode: non_blank(&item.barcode),
            purchase_date: to_storage_date(&item.purchased_date),
            expiration_date: to_storage_date(&item.expiration_date),
            image_url: non_blank(&item.image_url),
            ingredients: (!item.ingredients.is_empty()).then(|| item.ingredients.clone()),
            allergens: (!item.allergens.is_empty()).then(|| {
                item.allergens
                    .iter()
                    .map(|a| a.to_token().to_string())
                    .collect()
            }),
            quantity: finite(item.quantity),
        }
    }
}

impl FoodItemRecord {
    /// Domain item with no owners.
    pub fn into_item(self) -> FoodItem {
        FoodItem {
            id: self.id,
            name: self.name,
            price: self.price.unwrap_or(0.0),
            barcode: self.barcode.unwrap_or_default(),
            ingredients: self.ingredients.unwrap_or_default(),
            allergens: decode_tokens(self.allergens, "allergen", Allergen::from_token),
            purchased_date: to_domain_date(self.purchase_date.as_deref()),
            expiration_date: to_domain_date(self.expiration_date.as_deref()),
            owners: Vec::new(),
            quantity: self.quantity.unwrap_or(1.0),
            image_url: self.image_url.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use strum::IntoEnumIterator;
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn dietary_tokens_round_trip_for_every_variant() {
        for restriction in DietaryRestriction::iter() {
            let token = restriction.to_token();
            assert!(!token.is_empty());
            assert_eq!(DietaryRestriction::from_token(token), Some(restriction));
        }
    }

    #[test]
    fn allergen_tokens_round_trip_for_every_variant() {
        for allergen in Allergen::iter() {
            let token = allergen.to_token();
            assert!(!token.is_empty());
            assert_eq!(Allergen::from_token(token), Some(allergen));
        }
        assert_eq!(Allergen::TreeNut.to_token(), "TREE_NUT");
    }

    #[test]
    fn domain_date_converts_to_iso() {
        assert_eq!(to_storage_date("2025/10/05").as_deref(), Some("2025-10-05"));
        assert_eq!(to_storage_date(""), None);
        assert_eq!(to_storage_date(" "), None);
        assert_eq!(to_storage_date("2025-10-05"), None);
        assert_eq!(to_storage_date("2025/13/40"), None);
    }

    #[test]
    fn stored_date_accepts_date_and_date_time() {
        assert_eq!(to_domain_date(Some("2025-10-05")), "2025/10/05");
        assert_eq!(to_domain_date(Some("2025-10-05T13:45:00+00:00")), "2025/10/05");
        assert_eq!(to_domain_date(Some("2025-10-05T13:45:00Z")), "2025/10/05");
        assert_eq!(to_domain_date(Some("2025-10-05 13:45:00")), "2025/10/05");
        assert_eq!(to_domain_date(Some("2025-10-05T13:45:00.123")), "2025/10/05");
    }

    #[test]
    fn stored_date_failures_become_empty() {
        assert_eq!(to_domain_date(None), "");
        assert_eq!(to_domain_date(Some("")), "");
        assert_eq!(to_domain_date(Some("yesterday")), "");
        assert_eq!(to_domain_date(Some("2025/10/05")), "");
    }

    #[test]
    fn user_record_keeps_attributes_and_drops_relationships() {
        let mut user = UserProfile::new("alice", Uuid::new_v4());
        user.auth_id = Some(Uuid::new_v4());
        user.add_allergy(Allergen::Sesame);
        user.add_restriction(DietaryRestriction::Halal);
        user.friend_ids.insert("bob".to_string());

        let record = UserRecord::from(&user);
        assert_eq!(record.allergies, Some(vec!["SESAME".to_string()]));
        assert_eq!(record.dietary_restrictions, Some(vec!["HALAL".to_string()]));

        let restored = record.into_profile();
        assert_eq!(restored.id, user.id);
        assert_eq!(restored.auth_id, user.auth_id);
        assert_eq!(restored.allergies, user.allergies);
        assert_eq!(restored.dietary_restrictions, user.dietary_restrictions);
        assert!(restored.friend_ids.is_empty());
    }

    #[traced_test]
    #[test]
    fn unknown_and_null_tokens_decode_to_empty() {
        let record = UserRecord {
            id: Uuid::new_v4(),
            auth_id: None,
            username: "alice".to_string(),
            dietary_restrictions: None,
            allergies: Some(vec!["PEANUT".to_string(), "KRYPTONITE".to_string()]),
            personal_cart_id: Uuid::new_v4(),
        };
        let user = record.into_profile();
        assert!(user.dietary_restrictions.is_empty());
        assert_eq!(user.allergies.len(), 1);
        assert!(user.allergies.contains(&Allergen::Peanut));
        assert!(logs_contain("skipping unknown storage token"));
    }

    #[test]
    fn food_item_blank_fields_are_stored_as_null() {
        let item = FoodItem::new("Apple");
        let record = FoodItemRecord::from(&item);
        assert_eq!(record.barcode, None);
        assert_eq!(record.image_url, None);
        assert_eq!(record.ingredients, None);
        assert_eq!(record.allergens, None);
        assert_eq!(record.purchase_date, None);
        assert_eq!(record.price, Some(0.0));

        let restored = record.into_item();
        assert_eq!(restored, item);
    }

    #[test]
    fn food_item_null_numbers_use_defaults() {
        let record = FoodItemRecord {
            id: Uuid::new_v4(),
            name: "Pear".to_string(),
            price: None,
            barcode: None,
            purchase_date: Some("2025-01-02T00:00:00+00:00".to_string()),
            expiration_date: Some("garbage".to_string()),
            image_url: None,
            ingredients: None,
            allergens: None,
            quantity: None,
        };
        let item = record.into_item();
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.purchased_date, "2025/01/02");
        assert_eq!(item.expiration_date, "");
    }

    #[test]
    fn non_finite_numbers_are_stored_as_null() {
        let mut item = FoodItem::new("Milk");
        item.price = f64::NAN;
        item.quantity = f64::INFINITY;
        let record = FoodItemRecord::from(&item);
        assert_eq!(record.price, None);
        assert_eq!(record.quantity, None);

        let restored = record.into_item();
        assert_eq!(restored.price, 0.0);
        assert_eq!(restored.quantity, 1.0);

        item.price = f64::NEG_INFINITY;
        assert_eq!(FoodItemRecord::from(&item).price, None);
    }

    #[test]
    fn unpadded_domain_dates_are_normalized() {
        assert_eq!(to_storage_date("2025/1/5").as_deref(), Some("2025-01-05"));
        let stored = to_storage_date("2025/1/5");
        assert_eq!(to_domain_date(stored.as_deref()), "2025/01/05");
    }

    proptest! {
        #[test]
        fn valid_domain_dates_round_trip(days in 0i64..200_000) {
            let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap() + chrono::Duration::days(days);
            let domain = date.format(DOMAIN_DATE_FORMAT).to_string();
            let stored = to_storage_date(&domain);
            prop_assert_eq!(to_domain_date(stored.as_deref()), domain);
        }

        #[test]
        fn arbitrary_input_never_panics(input in ".*") {
            let stored = to_storage_date(&input);
            let domain = to_domain_date(stored.as_deref());
            prop_assert!(domain.is_empty() || parse_domain_date(&domain).is_some());
        }
    }
}
