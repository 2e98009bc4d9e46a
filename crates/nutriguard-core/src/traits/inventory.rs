// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The data access contract implemented by every inventory backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::NutriguardError;
use crate::traits::adapter::BackendAdapter;
use crate::types::{Cart, FoodItem, Group, UserProfile};

/// Persistence operations over users, groups, carts and food items, plus the
/// three junction relations that connect them:
///
/// - friendship: `(user_name, friend_name)`, directional
/// - membership: `(group_id, username)`, never recording the owner
/// - containment: `(cart_id, fooditem_id)`, the only truth for cart contents
///
/// Absence and failed writes are answered with `None`, `false` or an empty
/// list. Unexpected backend failures are logged by the backend and reported
/// the same way; they never reach the caller as errors. Composite reads are
/// all-or-nothing: if any hydration step fails the read returns `None`.
///
/// Relationship writes: `add_*` returns `true` when the pair holds afterwards
/// (even if it already did) and `false` when a referenced entity is missing.
/// `remove_*` returns `true` only when a pair was actually removed.
#[async_trait]
pub trait InventoryStore: BackendAdapter {
    /// Prepares the backend (opens connections, runs migrations).
    async fn initialize(&self) -> Result<(), NutriguardError>;

    /// Flushes pending writes and releases the backend.
    async fn close(&self) -> Result<(), NutriguardError>;

    // --- Users ---

    /// Inserts a user row. The personal cart must already exist and the
    /// username must be free. Returns the stored row without relationships.
    async fn create_user(&self, user: &UserProfile) -> Option<UserProfile>;

    /// Full read: the user row plus friends, groups (owned or joined) and the
    /// items of the personal cart.
    async fn get_user(&self, username: &str) -> Option<UserProfile>;

    /// Basic read: the user row only, with empty relationship collections.
    async fn get_user_basic(&self, username: &str) -> Option<UserProfile>;

    /// Looks a user up by identity reference, then performs a full read.
    async fn get_user_by_auth_id(&self, auth_id: Uuid) -> Option<UserProfile>;

    /// Updates the identity reference, restrictions and allergies of the user
    /// with the same username. Id and personal cart are never changed.
    async fn update_user(&self, user: &UserProfile) -> bool;

    /// Deletes the user and every friendship and membership naming them.
    async fn delete_user(&self, username: &str) -> bool;

    // --- Groups ---

    /// Inserts a group row. The shared cart must already exist. No membership
    /// row is written for the owner.
    async fn create_group(&self, group: &Group) -> Option<Group>;

    /// The group row plus its members and shared cart items.
    async fn get_group(&self, group_id: Uuid) -> Option<Group>;

    /// Renames the group. Fails when the stored owner differs from `group.owner`.
    async fn update_group(&self, group: &Group) -> bool;

    /// Deletes the group and its membership rows. The shared cart survives.
    async fn delete_group(&self, group_id: Uuid) -> bool;

    // --- Carts ---

    /// Inserts an empty cart under the caller's id.
    async fn create_cart(&self, cart: &Cart) -> Option<Cart>;

    /// The cart plus its items in containment order.
    async fn get_cart(&self, cart_id: Uuid) -> Option<Cart>;

    /// Deletes the cart and its containment rows. Fails while a user or group
    /// still references it.
    async fn delete_cart(&self, cart_id: Uuid) -> bool;

    // --- Food items ---

    /// Inserts the item and a containment row for every distinct existing cart
    /// in `item.owners`. The returned owners are the carts actually linked.
    async fn create_food_item(&self, item: &FoodItem) -> Option<FoodItem>;

    /// The item plus the ids of every cart containing it.
    async fn get_food_item(&self, item_id: Uuid) -> Option<FoodItem>;

    /// Updates the item's attributes. `owners` is ignored.
    async fn update_food_item(&self, item: &FoodItem) -> bool;

    /// Deletes the item and its containment rows.
    async fn delete_food_item(&self, item_id: Uuid) -> bool;

    // --- Friendship ---

    /// Records `username -> friend_username`. Both users must exist and differ.
    async fn add_friend(&self, username: &str, friend_username: &str) -> bool;

    /// Profiles (basic reads) of the users `username` has added, in the order
    /// they were added.
    async fn get_friends(&self, username: &str) -> Vec<UserProfile>;

    async fn remove_friend(&self, username: &str, friend_username: &str) -> bool;

    // --- Group membership ---

    /// Adds an explicit member. Adding the owner succeeds without writing.
    async fn add_user_to_group(&self, group_id: Uuid, username: &str) -> bool;

    /// Profiles (basic reads) of the explicit members, in join order. The
    /// owner is not included.
    async fn get_group_members(&self, group_id: Uuid) -> Vec<UserProfile>;

    /// Every group the user owns or has joined, hydrated, without duplicates,
    /// sorted by name then id.
    async fn get_user_groups(&self, username: &str) -> Vec<Group>;

    /// Removes an explicit member. Removing the owner is a no-op.
    async fn remove_user_from_group(&self, group_id: Uuid, username: &str) -> bool;

    // --- Cart contents ---

    /// Puts an existing item into an existing cart.
    async fn add_item_to_cart(&self, cart_id: Uuid, item_id: Uuid) -> bool;

    /// Items of the cart in containment order, each with its owners.
    async fn get_cart_items(&self, cart_id: Uuid) -> Vec<FoodItem>;

    async fn remove_item_from_cart(&self, cart_id: Uuid, item_id: Uuid) -> bool;
}
