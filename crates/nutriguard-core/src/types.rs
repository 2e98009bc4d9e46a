// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model shared by every backend and by callers of the store contract.
//!
//! These are plain records: identity, attributes and in-memory convenience
//! operations. Relationship collections (`friend_ids`, `group_ids`,
//! `personal_cart`, `members`, `shared_cart`, `owners`) are projections that
//! only a store read fills in.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::EnumIter;
use uuid::Uuid;

use crate::codec::parse_domain_date;

/// Health status reported by backend health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is fully operational.
    Healthy,
    /// Backend is operational but experiencing issues.
    Degraded(String),
    /// Backend is not operational.
    Unhealthy(String),
}

/// A dietary restriction a user follows.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
pub enum DietaryRestriction {
    None,
    Vegetarian,
    Vegan,
    Halal,
    Kosher,
    Pescetarian,
}

/// An allergen a product may contain or a user may be allergic to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
pub enum Allergen {
    Peanut,
    TreeNut,
    Milk,
    Egg,
    Fish,
    Shellfish,
    Wheat,
    Soy,
    Sesame,
    Gluten,
}

/// A user profile.
///
/// `username` is the join key for every relationship (friends, group
/// membership, group ownership), not `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    /// Reference to the identity held by the external identity provider.
    pub auth_id: Option<Uuid>,
    pub dietary_restrictions: BTreeSet<DietaryRestriction>,
    pub allergies: BTreeSet<Allergen>,
    /// Groups the user belongs to, as owner or member. Filled by full reads.
    pub group_ids: BTreeSet<Uuid>,
    /// Usernames this user has added as friends. Filled by full reads.
    pub friend_ids: BTreeSet<String>,
    /// Items in the personal cart. Filled by full reads.
    pub personal_cart: Vec<FoodItem>,
    /// Set once at account creation and never reassigned.
    pub personal_cart_id: Uuid,
}

impl UserProfile {
    /// Create a profile with a fresh id and empty attribute sets.
    pub fn new(username: impl Into<String>, personal_cart_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            auth_id: None,
            dietary_restrictions: BTreeSet::new(),
            allergies: BTreeSet::new(),
            group_ids: BTreeSet::new(),
            friend_ids: BTreeSet::new(),
            personal_cart: Vec::new(),
            personal_cart_id,
        }
    }

    pub fn add_restriction(&mut self, restriction: DietaryRestriction) {
        self.dietary_restrictions.insert(restriction);
    }

    pub fn remove_restriction(&mut self, restriction: DietaryRestriction) {
        self.dietary_restrictions.remove(&restriction);
    }

    pub fn add_allergy(&mut self, allergen: Allergen) {
        self.allergies.insert(allergen);
    }

    pub fn remove_allergy(&mut self, allergen: Allergen) {
        self.allergies.remove(&allergen);
    }
}

/// A group of users sharing one cart.
///
/// Ownership and membership are disjoint: the owner never appears in
/// `members`, yet always counts as a member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    /// Username of the owner. Immutable after creation.
    pub owner: String,
    pub members: BTreeSet<String>,
    /// Items in the shared cart. Filled by store reads.
    pub shared_cart: Vec<FoodItem>,
    pub shared_cart_id: Uuid,
}

impl Group {
    /// Create a group with a fresh id and no members.
    pub fn new(name: impl Into<String>, owner: impl Into<String>, shared_cart_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner: owner.into(),
            members: BTreeSet::new(),
            shared_cart: Vec::new(),
            shared_cart_id,
        }
    }

    /// True for the owner and for every explicit member.
    pub fn is_member(&self, username: &str) -> bool {
        username == self.owner || self.members.contains(username)
    }

    /// Add a member. Adding the owner or an existing member does nothing.
    pub fn add_user(&mut self, username: &str) {
        if username != self.owner {
            self.members.insert(username.to_string());
        }
    }

    /// Remove a member. The owner cannot be removed.
    pub fn remove_user(&mut self, username: &str) {
        if username != self.owner {
            self.members.remove(username);
        }
    }

    /// Add an item to the shared cart unless an item with the same id is present.
    pub fn add_item(&mut self, item: FoodItem) {
        if !self.shared_cart.iter().any(|existing| existing.id == item.id) {
            self.shared_cart.push(item);
        }
    }

    /// Remove every shared-cart item matching `predicate`.
    pub fn remove_items<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&FoodItem) -> bool,
    {
        self.shared_cart.retain(|item| !predicate(item));
    }
}

/// An ordered collection of food items.
///
/// A cart carries no owner: it belongs to whichever user or group
/// references its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub items: Vec<FoodItem>,
}

impl Cart {
    /// Create an empty cart with a fresh id.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            items: Vec::new(),
        }
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    pub fn add_food_item(&mut self, item: FoodItem) {
        self.items.push(item);
    }

    /// Remove the first item with the given id. Returns whether one was removed.
    pub fn remove_food_item(&mut self, item_id: Uuid) -> bool {
        match self.items.iter().position(|item| item.id == item_id) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Sum of item prices.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(|item| item.price).sum()
    }

    /// Number of items whose expiration date is before `today`.
    pub fn expired_count(&self, today: NaiveDate) -> usize {
        self.items.iter().filter(|item| item.is_expired(today)).count()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

/// A food product tracked in one or more carts.
///
/// Dates use the domain text format `yyyy/MM/dd`; an empty string means
/// "unknown".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    pub barcode: String,
    pub ingredients: Vec<String>,
    pub allergens: BTreeSet<Allergen>,
    pub purchased_date: String,
    pub expiration_date: String,
    /// Ids of the carts that contain this item. A read projection of the
    /// cart/item containment relation.
    pub owners: Vec<Uuid>,
    pub quantity: f64,
    pub image_url: String,
}

impl FoodItem {
    /// Create an item with a fresh id, quantity 1 and no other data.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price: 0.0,
            barcode: String::new(),
            ingredients: Vec::new(),
            allergens: BTreeSet::new(),
            purchased_date: String::new(),
            expiration_date: String::new(),
            owners: Vec::new(),
            quantity: 1.0,
            image_url: String::new(),
        }
    }

    /// True when the item contains at least one allergen the user is allergic to.
    pub fn contains_allergen(&self, user: &UserProfile) -> bool {
        self.allergens.iter().any(|a| user.allergies.contains(a))
    }

    /// True when the expiration date is strictly before `today`.
    ///
    /// A blank or unparsable expiration date never counts as expired.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        parse_domain_date(&self.expiration_date).is_some_and(|expiry| expiry < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    fn item(name: &str, price: f64, expiration: &str) -> FoodItem {
        FoodItem {
            price,
            expiration_date: expiration.to_string(),
            ..FoodItem::new(name)
        }
    }

    #[test]
    fn owner_is_always_a_member() {
        let group = Group::new("Roommates", "owner", Uuid::new_v4());
        assert!(group.is_member("owner"));
        assert!(!group.members.contains("owner"));
    }

    #[test]
    fn regular_member_is_recognized_and_non_member_is_not() {
        let mut group = Group::new("Roommates", "owner", Uuid::new_v4());
        group.add_user("masood");
        assert!(group.is_member("masood"));
        assert!(!group.is_member("sam"));
    }

    #[test]
    fn add_user_is_idempotent_and_skips_owner() {
        let mut group = Group::new("Roommates", "owner", Uuid::new_v4());
        group.add_user("masood");
        group.add_user("masood");
        group.add_user("owner");
        assert_eq!(group.members.len(), 1);
        assert!(!group.members.contains("owner"));
    }

    #[test]
    fn remove_user_cannot_remove_owner() {
        let mut group = Group::new("Roommates", "owner", Uuid::new_v4());
        group.add_user("masood");
        group.add_user("sam");

        group.remove_user("owner");
        assert!(group.is_member("owner"));

        group.remove_user("masood");
        assert!(!group.is_member("masood"));
        assert!(group.is_member("sam"));
    }

    #[test]
    fn group_items_dedupe_by_id_and_remove_by_predicate() {
        let mut group = Group::new("Roommates", "owner", Uuid::new_v4());
        let milk = item("milk", 2.0, "");
        let bread = item("bread", 3.0, "");
        group.add_item(milk.clone());
        group.add_item(milk);
        group.add_item(bread);
        assert_eq!(group.shared_cart.len(), 2);

        group.remove_items(|i| i.name == "milk");
        assert_eq!(group.shared_cart.len(), 1);
        assert_eq!(group.shared_cart[0].name, "bread");
    }

    #[test]
    fn cart_totals_and_removal() {
        let mut cart = Cart::new();
        assert_eq!(cart.total_price(), 0.0);

        let milk = item("milk", 2.5, "2025/06/01");
        let bread = item("bread", 1.5, "2025/07/01");
        let milk_id = milk.id;
        cart.add_food_item(milk);
        cart.add_food_item(bread);

        assert!((cart.total_price() - 4.0).abs() < f64::EPSILON);
        assert_eq!(cart.expired_count(today()), 1);

        assert!(cart.remove_food_item(milk_id));
        assert!(!cart.remove_food_item(milk_id));
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.expired_count(today()), 0);
    }

    #[test]
    fn blank_or_malformed_expiration_is_never_expired() {
        assert!(!item("a", 0.0, "").is_expired(today()));
        assert!(!item("b", 0.0, "   ").is_expired(today()));
        assert!(!item("c", 0.0, "15-06-2020").is_expired(today()));
        assert!(!item("d", 0.0, "2025/06/15").is_expired(today()));
        assert!(item("e", 0.0, "2025/06/14").is_expired(today()));
    }

    #[test]
    fn contains_allergen_checks_intersection() {
        let mut user = UserProfile::new("alice", Uuid::new_v4());
        let mut snack = FoodItem::new("trail mix");
        snack.allergens.insert(Allergen::TreeNut);
        assert!(!snack.contains_allergen(&user));

        user.add_allergy(Allergen::Peanut);
        assert!(!snack.contains_allergen(&user));

        user.add_allergy(Allergen::TreeNut);
        assert!(snack.contains_allergen(&user));

        user.remove_allergy(Allergen::TreeNut);
        assert!(!snack.contains_allergen(&user));
    }

    #[test]
    fn restrictions_are_a_set() {
        let mut user = UserProfile::new("alice", Uuid::new_v4());
        user.add_restriction(DietaryRestriction::Vegan);
        user.add_restriction(DietaryRestriction::Vegan);
        assert_eq!(user.dietary_restrictions.len(), 1);
        user.remove_restriction(DietaryRestriction::Vegan);
        assert!(user.dietary_restrictions.is_empty());
    }
}
