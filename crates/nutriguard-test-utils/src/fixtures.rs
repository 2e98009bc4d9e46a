// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for common store states.

use nutriguard_core::{Cart, FoodItem, Group, InventoryStore, UserProfile};

/// Create a personal cart and a user owning it. Panics if either write fails.
pub async fn seed_user(store: &dyn InventoryStore, username: &str) -> UserProfile {
    let cart = store
        .create_cart(&Cart::new())
        .await
        .expect("fixture cart should be created");
    store
        .create_user(&UserProfile::new(username, cart.id))
        .await
        .expect("fixture user should be created")
}

/// Create a shared cart and a group owned by `owner`.
pub async fn seed_group(store: &dyn InventoryStore, name: &str, owner: &str) -> Group {
    let cart = store
        .create_cart(&Cart::new())
        .await
        .expect("fixture cart should be created");
    store
        .create_group(&Group::new(name, owner, cart.id))
        .await
        .expect("fixture group should be created")
}

/// Create a food item with no owners.
pub async fn seed_item(store: &dyn InventoryStore, name: &str) -> FoodItem {
    store
        .create_food_item(&FoodItem::new(name))
        .await
        .expect("fixture item should be created")
}
