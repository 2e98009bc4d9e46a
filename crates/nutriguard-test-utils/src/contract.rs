// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behavioral test suite for [`InventoryStore`] implementations.
//!
//! Each function exercises one rule of the contract against a fresh store.
//! Backends instantiate the whole suite with [`inventory_contract_tests!`],
//! so every backend is held to exactly the same assertions.
//!
//! [`inventory_contract_tests!`]: crate::inventory_contract_tests

use std::future::Future;

use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, TestCaseError, TestRunner};
use uuid::Uuid;

use nutriguard_core::{
    Allergen, Cart, DietaryRestriction, FoodItem, Group, InventoryStore, UserProfile,
};

use crate::fixtures::{seed_group, seed_item, seed_user};

fn usernames(profiles: &[UserProfile]) -> Vec<&str> {
    profiles.iter().map(|p| p.username.as_str()).collect()
}

fn item_names(items: &[FoodItem]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

// --- Users ---

pub async fn new_user_has_empty_personal_cart(store: &dyn InventoryStore) {
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let created = store
        .create_user(&UserProfile::new("alice", cart.id))
        .await
        .expect("user");
    assert_eq!(created.personal_cart_id, cart.id);
    assert!(created.personal_cart.is_empty());

    let basic = store.get_user_basic("alice").await.expect("basic read");
    assert_eq!(basic.personal_cart_id, cart.id);
    assert!(basic.personal_cart.is_empty());

    let full = store.get_user("alice").await.expect("full read");
    assert_eq!(full.personal_cart_id, cart.id);
    assert!(full.personal_cart.is_empty());
    assert!(full.friend_ids.is_empty());
    assert!(full.group_ids.is_empty());
}

pub async fn user_attributes_round_trip(store: &dyn InventoryStore) {
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let mut user = UserProfile::new("alice", cart.id);
    user.auth_id = Some(Uuid::new_v4());
    user.add_restriction(DietaryRestriction::Pescetarian);
    user.add_allergy(Allergen::TreeNut);
    user.add_allergy(Allergen::Sesame);
    store.create_user(&user).await.expect("user");

    let read = store.get_user_basic("alice").await.expect("basic read");
    assert_eq!(read.id, user.id);
    assert_eq!(read.auth_id, user.auth_id);
    assert_eq!(read.dietary_restrictions, user.dietary_restrictions);
    assert_eq!(read.allergies, user.allergies);
}

pub async fn user_requires_existing_cart(store: &dyn InventoryStore) {
    let orphan = UserProfile::new("alice", Uuid::new_v4());
    assert!(store.create_user(&orphan).await.is_none());
    assert!(store.get_user_basic("alice").await.is_none());
}

pub async fn duplicate_username_is_rejected(store: &dyn InventoryStore) {
    let first = seed_user(store, "alice").await;
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let mut second = UserProfile::new("alice", cart.id);
    second.add_allergy(Allergen::Egg);
    assert!(store.create_user(&second).await.is_none());

    let stored = store.get_user_basic("alice").await.expect("original user");
    assert_eq!(stored.id, first.id);
    assert!(stored.allergies.is_empty());
}

pub async fn duplicate_ids_are_rejected(store: &dyn InventoryStore) {
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    assert!(store.create_cart(&cart).await.is_none());

    let item = seed_item(store, "Apple").await;
    let mut clash = FoodItem::new("Pear");
    clash.id = item.id;
    assert!(store.create_food_item(&clash).await.is_none());
    assert_eq!(store.get_food_item(item.id).await.expect("item").name, "Apple");

    let group = seed_group(store, "Home", "alice").await;
    let mut clash = Group::new("Other", "bob", cart.id);
    clash.id = group.id;
    assert!(store.create_group(&clash).await.is_none());

    let user = seed_user(store, "alice").await;
    let mut clash = UserProfile::new("bob", cart.id);
    clash.id = user.id;
    assert!(store.create_user(&clash).await.is_none());
}

pub async fn update_user_keys_on_username(store: &dyn InventoryStore) {
    let mut user = seed_user(store, "alice").await;
    user.auth_id = Some(Uuid::new_v4());
    user.add_restriction(DietaryRestriction::Kosher);
    user.add_allergy(Allergen::Milk);
    user.personal_cart_id = Uuid::new_v4();
    assert!(store.update_user(&user).await);

    let read = store.get_user_basic("alice").await.expect("user");
    assert_eq!(read.auth_id, user.auth_id);
    assert!(read.dietary_restrictions.contains(&DietaryRestriction::Kosher));
    assert!(read.allergies.contains(&Allergen::Milk));
    assert_ne!(read.personal_cart_id, user.personal_cart_id);

    user.remove_allergy(Allergen::Milk);
    assert!(store.update_user(&user).await);
    assert!(store.get_user_basic("alice").await.expect("user").allergies.is_empty());

    let ghost = UserProfile::new("ghost", Uuid::new_v4());
    assert!(!store.update_user(&ghost).await);
}

pub async fn identity_reference_is_unique(store: &dyn InventoryStore) {
    let auth_id = Uuid::new_v4();
    let mut alice = seed_user(store, "alice").await;
    alice.auth_id = Some(auth_id);
    assert!(store.update_user(&alice).await);

    let mut bob = seed_user(store, "bob").await;
    bob.auth_id = Some(auth_id);
    assert!(!store.update_user(&bob).await);

    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let mut carol = UserProfile::new("carol", cart.id);
    carol.auth_id = Some(auth_id);
    assert!(store.create_user(&carol).await.is_none());

    let owner = store.get_user_by_auth_id(auth_id).await.expect("owner");
    assert_eq!(owner.username, "alice");
}

pub async fn auth_lookup_performs_full_read(store: &dyn InventoryStore) {
    let mut alice = seed_user(store, "alice").await;
    seed_user(store, "bob").await;
    alice.auth_id = Some(Uuid::new_v4());
    assert!(store.update_user(&alice).await);
    assert!(store.add_friend("alice", "bob").await);
    let item = seed_item(store, "Apple").await;
    assert!(store.add_item_to_cart(alice.personal_cart_id, item.id).await);

    let read = store
        .get_user_by_auth_id(alice.auth_id.expect("auth id"))
        .await
        .expect("user by auth id");
    assert_eq!(read.username, "alice");
    assert!(read.friend_ids.contains("bob"));
    assert_eq!(item_names(&read.personal_cart), vec!["Apple"]);

    assert!(store.get_user_by_auth_id(Uuid::new_v4()).await.is_none());
}

pub async fn delete_user_cascades_relationships(store: &dyn InventoryStore) {
    seed_user(store, "alice").await;
    seed_user(store, "bob").await;
    let group = seed_group(store, "Home", "alice").await;
    assert!(store.add_user_to_group(group.id, "bob").await);
    assert!(store.add_friend("alice", "bob").await);
    assert!(store.add_friend("bob", "alice").await);

    assert!(store.delete_user("bob").await);
    assert!(!store.delete_user("bob").await);
    assert!(store.get_user("bob").await.is_none());
    assert!(store.get_friends("alice").await.is_empty());
    assert!(store.get_group_members(group.id).await.is_empty());
    assert!(store.get_user("alice").await.expect("alice").friend_ids.is_empty());
}

// --- Cart contents ---

pub async fn cart_membership_agrees_with_item_owners(store: &dyn InventoryStore) {
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let item = seed_item(store, "Apple").await;

    assert!(store.add_item_to_cart(cart.id, item.id).await);
    assert!(store.get_cart_items(cart.id).await.iter().any(|i| i.id == item.id));
    assert!(store.get_food_item(item.id).await.expect("item").owners.contains(&cart.id));

    assert!(store.remove_item_from_cart(cart.id, item.id).await);
    assert!(!store.get_cart_items(cart.id).await.iter().any(|i| i.id == item.id));
    assert!(!store.get_food_item(item.id).await.expect("item").owners.contains(&cart.id));
    assert!(!store.remove_item_from_cart(cart.id, item.id).await);
}

pub async fn cart_items_keep_insertion_order(store: &dyn InventoryStore) {
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let other = store.create_cart(&Cart::new()).await.expect("cart");
    let pear = seed_item(store, "Pear").await;
    let apple = seed_item(store, "Apple").await;
    let fig = seed_item(store, "Fig").await;

    for item in [&pear, &apple, &fig, &pear] {
        assert!(store.add_item_to_cart(cart.id, item.id).await);
    }
    assert!(store.add_item_to_cart(other.id, apple.id).await);

    let items = store.get_cart_items(cart.id).await;
    assert_eq!(item_names(&items), vec!["Pear", "Apple", "Fig"]);
    let shared = items.iter().find(|i| i.id == apple.id).expect("apple");
    assert_eq!(shared.owners, vec![cart.id, other.id]);

    let read = store.get_cart(cart.id).await.expect("cart");
    assert_eq!(item_names(&read.items), vec!["Pear", "Apple", "Fig"]);
}

pub async fn cart_links_require_both_sides(store: &dyn InventoryStore) {
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let item = seed_item(store, "Apple").await;
    assert!(!store.add_item_to_cart(cart.id, Uuid::new_v4()).await);
    assert!(!store.add_item_to_cart(Uuid::new_v4(), item.id).await);
    assert!(store.get_cart_items(Uuid::new_v4()).await.is_empty());
    assert!(store.get_food_item(item.id).await.expect("item").owners.is_empty());
}

pub async fn delete_cart_refused_while_referenced(store: &dyn InventoryStore) {
    let alice = seed_user(store, "alice").await;
    let group = seed_group(store, "Home", "alice").await;
    assert!(!store.delete_cart(alice.personal_cart_id).await);
    assert!(!store.delete_cart(group.shared_cart_id).await);

    let loose = store.create_cart(&Cart::new()).await.expect("cart");
    let item = seed_item(store, "Apple").await;
    assert!(store.add_item_to_cart(loose.id, item.id).await);
    assert!(store.delete_cart(loose.id).await);
    assert!(store.get_cart(loose.id).await.is_none());
    assert!(store.get_food_item(item.id).await.expect("item").owners.is_empty());
    assert!(!store.delete_cart(loose.id).await);
}

// --- Food items ---

pub async fn create_food_item_links_existing_owner_carts(store: &dyn InventoryStore) {
    let c1 = store.create_cart(&Cart::new()).await.expect("cart");
    let c2 = store.create_cart(&Cart::new()).await.expect("cart");
    let mut item = FoodItem::new("Milk");
    item.owners = vec![c2.id, Uuid::new_v4(), c1.id, c2.id];

    let created = store.create_food_item(&item).await.expect("item");
    assert_eq!(created.owners, vec![c2.id, c1.id]);
    assert_eq!(store.get_cart_items(c1.id).await.len(), 1);
    assert_eq!(store.get_cart_items(c2.id).await.len(), 1);
    let read = store.get_food_item(item.id).await.expect("item");
    assert_eq!(read.owners.len(), 2);
}

pub async fn food_item_attributes_round_trip(store: &dyn InventoryStore) {
    let mut item = FoodItem::new("Granola");
    item.price = 3.25;
    item.barcode = "4006381333931".to_string();
    item.ingredients = vec!["oats".to_string(), "almonds".to_string()];
    item.allergens.insert(Allergen::TreeNut);
    item.allergens.insert(Allergen::Gluten);
    item.purchased_date = "2025/09/28".to_string();
    item.expiration_date = "2025/10/05".to_string();
    item.quantity = 2.0;
    item.image_url = "https://images.example/granola.png".to_string();

    store.create_food_item(&item).await.expect("item");
    let read = store.get_food_item(item.id).await.expect("item");
    assert_eq!(read, item);
}

pub async fn dates_round_trip_through_store(store: &dyn InventoryStore) {
    let mut item = FoodItem::new("Yogurt");
    item.expiration_date = "2025/10/05".to_string();
    store.create_food_item(&item).await.expect("item");
    let read = store.get_food_item(item.id).await.expect("item");
    assert_eq!(read.expiration_date, "2025/10/05");
    assert_eq!(read.purchased_date, "");

    for bad in ["", "   ", "05/10/2025", "2025-10-05", "tomorrow", "2025/02/30"] {
        let mut item = FoodItem::new("Mystery");
        item.expiration_date = bad.to_string();
        store.create_food_item(&item).await.expect("item");
        let read = store.get_food_item(item.id).await.expect("item");
        assert_eq!(read.expiration_date, "", "{bad:?} should read back empty");
    }
}

pub async fn update_food_item_ignores_owners(store: &dyn InventoryStore) {
    let cart = store.create_cart(&Cart::new()).await.expect("cart");
    let mut item = FoodItem::new("Bread");
    item.owners = vec![cart.id];
    let mut item = store.create_food_item(&item).await.expect("item");

    item.name = "Rye bread".to_string();
    item.price = 2.5;
    item.owners.clear();
    assert!(store.update_food_item(&item).await);

    let read = store.get_food_item(item.id).await.expect("item");
    assert_eq!(read.name, "Rye bread");
    assert_eq!(read.price, 2.5);
    assert_eq!(read.owners, vec![cart.id]);

    assert!(!store.update_food_item(&FoodItem::new("Ghost")).await);
}

pub async fn non_finite_numbers_read_back_as_defaults(store: &dyn InventoryStore) {
    let mut item = FoodItem::new("Loose carrots");
    item.price = f64::NAN;
    item.quantity = f64::INFINITY;
    store.create_food_item(&item).await.expect("item");

    let read = store.get_food_item(item.id).await.expect("item");
    assert_eq!(read.price, 0.0);
    assert_eq!(read.quantity, 1.0);

    let mut update = read.clone();
    update.price = f64::NEG_INFINITY;
    update.quantity = 3.0;
    assert!(store.update_food_item(&update).await);
    let read = store.get_food_item(item.id).await.expect("item");
    assert_eq!(read.price, 0.0);
    assert_eq!(read.quantity, 3.0);
}

// --- Groups ---

pub async fn owner_never_listed_as_member(store: &dyn InventoryStore) {
    seed_user(store, "bob").await;
    seed_user(store, "carol").await;
    let group = seed_group(store, "Roommates", "bob").await;
    assert!(!group.members.contains("bob"));

    assert!(store.add_user_to_group(group.id, "bob").await);
    assert!(store.add_user_to_group(group.id, "carol").await);
    assert!(store.remove_user_from_group(group.id, "carol").await);
    assert!(store.add_user_to_group(group.id, "carol").await);
    assert!(!store.remove_user_from_group(group.id, "bob").await);

    let read = store.get_group(group.id).await.expect("group");
    assert_eq!(read.owner, "bob");
    assert!(!read.members.contains("bob"));
    assert!(read.is_member("bob"));
    assert!(!usernames(&store.get_group_members(group.id).await).contains(&"bob"));
}

pub async fn add_user_to_group_is_idempotent(store: &dyn InventoryStore) {
    seed_user(store, "carol").await;
    let group = seed_group(store, "Roommates", "bob").await;
    assert!(store.add_user_to_group(group.id, "carol").await);
    assert!(store.add_user_to_group(group.id, "carol").await);

    assert_eq!(usernames(&store.get_group_members(group.id).await), vec!["carol"]);
    assert_eq!(store.get_user_groups("carol").await.len(), 1);
}

pub async fn membership_requires_group_and_user(store: &dyn InventoryStore) {
    seed_user(store, "carol").await;
    let group = seed_group(store, "Roommates", "bob").await;
    assert!(!store.add_user_to_group(Uuid::new_v4(), "carol").await);
    assert!(!store.add_user_to_group(group.id, "nobody").await);
    assert!(!store.remove_user_from_group(group.id, "carol").await);
    assert!(store.get_group_members(Uuid::new_v4()).await.is_empty());
}

pub async fn group_members_keep_join_order(store: &dyn InventoryStore) {
    for name in ["bob", "carol", "dave", "erin"] {
        seed_user(store, name).await;
    }
    let group = seed_group(store, "Club", "bob").await;
    for name in ["erin", "carol", "dave"] {
        assert!(store.add_user_to_group(group.id, name).await);
    }
    assert_eq!(
        usernames(&store.get_group_members(group.id).await),
        vec!["erin", "carol", "dave"]
    );
}

pub async fn user_groups_are_union_of_owned_and_joined(store: &dyn InventoryStore) {
    seed_user(store, "alice").await;
    seed_user(store, "bob").await;
    // Joined first, then owned.
    let joined = seed_group(store, "Book club", "bob").await;
    assert!(store.add_user_to_group(joined.id, "alice").await);
    let owned = seed_group(store, "Apartment", "alice").await;
    // Owner membership attempt leaves no duplicate.
    assert!(store.add_user_to_group(owned.id, "alice").await);
    seed_group(store, "Unrelated", "bob").await;

    let groups = store.get_user_groups("alice").await;
    let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Apartment", "Book club"]);

    let full = store.get_user("alice").await.expect("alice");
    assert_eq!(full.group_ids.len(), 2);
    assert!(full.group_ids.contains(&joined.id));
    assert!(full.group_ids.contains(&owned.id));
}

pub async fn update_group_renames_only_for_owner(store: &dyn InventoryStore) {
    let mut group = seed_group(store, "Old name", "bob").await;
    group.name = "New name".to_string();
    assert!(store.update_group(&group).await);

    let mut impostor = group.clone();
    impostor.owner = "mallory".to_string();
    impostor.name = "Hijacked".to_string();
    assert!(!store.update_group(&impostor).await);

    let read = store.get_group(group.id).await.expect("group");
    assert_eq!(read.name, "New name");
    assert_eq!(read.owner, "bob");
}

pub async fn delete_group_keeps_shared_cart(store: &dyn InventoryStore) {
    seed_user(store, "carol").await;
    let group = seed_group(store, "Temp", "bob").await;
    assert!(store.add_user_to_group(group.id, "carol").await);

    assert!(store.delete_group(group.id).await);
    assert!(!store.delete_group(group.id).await);
    assert!(store.get_group(group.id).await.is_none());
    assert!(store.get_user_groups("carol").await.is_empty());
    assert!(store.get_cart(group.shared_cart_id).await.is_some());
    assert!(store.delete_cart(group.shared_cart_id).await);
}

pub async fn group_reads_hydrate_shared_cart_items(store: &dyn InventoryStore) {
    let owner = seed_user(store, "bob").await;
    seed_user(store, "carol").await;
    let group = seed_group(store, "Roommates", "bob").await;
    assert!(store.add_user_to_group(group.id, "carol").await);

    let mut milk = FoodItem::new("Milk");
    milk.owners = vec![group.shared_cart_id, owner.personal_cart_id];
    let milk = store.create_food_item(&milk).await.expect("milk");
    let bread = seed_item(store, "Bread").await;
    assert!(store.add_item_to_cart(group.shared_cart_id, bread.id).await);

    let read = store.get_group(group.id).await.expect("group");
    assert_eq!(item_names(&read.shared_cart), vec!["Milk", "Bread"]);
    assert_eq!(
        read.shared_cart[0].owners,
        vec![group.shared_cart_id, owner.personal_cart_id]
    );
    assert_eq!(read.shared_cart[1].owners, vec![group.shared_cart_id]);

    for username in ["bob", "carol"] {
        let groups = store.get_user_groups(username).await;
        assert_eq!(groups.len(), 1, "{username} sees the group once");
        assert_eq!(groups[0].shared_cart, read.shared_cart);
    }

    assert!(store.remove_item_from_cart(group.shared_cart_id, milk.id).await);
    let read = store.get_group(group.id).await.expect("group");
    assert_eq!(item_names(&read.shared_cart), vec!["Bread"]);
    let owner = store.get_user("bob").await.expect("bob");
    assert_eq!(item_names(&owner.personal_cart), vec!["Milk"]);
}

// --- Friendship ---

pub async fn friendship_is_directional(store: &dyn InventoryStore) {
    seed_user(store, "alice").await;
    seed_user(store, "bob").await;

    assert!(store.add_friend("alice", "bob").await);
    assert!(store.add_friend("alice", "bob").await);
    assert_eq!(usernames(&store.get_friends("alice").await), vec!["bob"]);
    assert!(store.get_friends("bob").await.is_empty());
    assert!(store.get_user("alice").await.expect("alice").friend_ids.contains("bob"));
    assert!(store.get_user("bob").await.expect("bob").friend_ids.is_empty());

    assert!(store.remove_friend("alice", "bob").await);
    assert!(store.get_friends("alice").await.is_empty());
    assert!(!store.remove_friend("alice", "bob").await);
}

pub async fn friendship_rejects_self_and_unknown(store: &dyn InventoryStore) {
    seed_user(store, "alice").await;
    assert!(!store.add_friend("alice", "alice").await);
    assert!(!store.add_friend("alice", "nobody").await);
    assert!(!store.add_friend("nobody", "alice").await);
    assert!(store.get_friends("alice").await.is_empty());
    assert!(store.get_friends("nobody").await.is_empty());
}

// --- Absence ---

pub async fn absent_entities_read_as_none(store: &dyn InventoryStore) {
    let id = Uuid::new_v4();
    assert!(store.get_user("nobody").await.is_none());
    assert!(store.get_user_basic("nobody").await.is_none());
    assert!(store.get_group(id).await.is_none());
    assert!(store.get_cart(id).await.is_none());
    assert!(store.get_food_item(id).await.is_none());
    assert!(store.get_user_groups("nobody").await.is_empty());
    assert!(!store.delete_user("nobody").await);
    assert!(!store.delete_food_item(id).await);
    assert!(!store.update_group(&Group::new("x", "y", id)).await);
}

// --- Scenarios ---

pub async fn pantry_scenario(store: &dyn InventoryStore) {
    let c1 = store.create_cart(&Cart::new()).await.expect("C1");
    store
        .create_user(&UserProfile::new("alice", c1.id))
        .await
        .expect("alice");
    let mut apple = FoodItem::new("Apple");
    apple.owners = vec![c1.id];
    let apple = store.create_food_item(&apple).await.expect("Apple");

    let alice = store.get_user("alice").await.expect("alice");
    assert!(alice.personal_cart.iter().any(|i| i.id == apple.id && i.name == "Apple"));

    assert!(store.delete_food_item(apple.id).await);
    assert!(store.get_cart_items(c1.id).await.is_empty());
    assert!(store.get_user("alice").await.expect("alice").personal_cart.is_empty());
}

pub async fn roommates_scenario(store: &dyn InventoryStore) {
    seed_user(store, "bob").await;
    seed_user(store, "carol").await;
    let c2 = store.create_cart(&Cart::new()).await.expect("C2");
    let g = store
        .create_group(&Group::new("Roommates", "bob", c2.id))
        .await
        .expect("G");
    assert!(store.add_user_to_group(g.id, "carol").await);

    let read = store.get_group(g.id).await.expect("G");
    assert_eq!(read.owner, "bob");
    assert_eq!(read.members.iter().map(String::as_str).collect::<Vec<_>>(), vec!["carol"]);
    assert!(!read.members.contains(&read.owner));
    assert!(read.is_member("bob"));
    assert!(!read.members.contains("bob"));
    assert!(read.is_member("carol"));
    assert_eq!(read.shared_cart_id, c2.id);
}

// --- Membership sequences ---

const CANDIDATES: [&str; 4] = ["owner", "ann", "ben", "cat"];

/// One membership write against a group owned by `CANDIDATES[0]`.
#[derive(Debug, Clone, Copy)]
pub enum MembershipOp {
    Add(usize),
    Remove(usize),
}

fn membership_ops() -> impl Strategy<Value = Vec<MembershipOp>> {
    let op = prop_oneof![
        (0..CANDIDATES.len()).prop_map(MembershipOp::Add),
        (0..CANDIDATES.len()).prop_map(MembershipOp::Remove),
    ];
    prop::collection::vec(op, 1..24)
}

/// Apply `ops` and compare every answer with a join-ordered model of the
/// explicit members.
async fn replay_membership(
    store: &dyn InventoryStore,
    ops: &[MembershipOp],
) -> Result<(), TestCaseError> {
    for name in CANDIDATES {
        seed_user(store, name).await;
    }
    let owner = CANDIDATES[0];
    let group = seed_group(store, "Household", owner).await;
    let mut model: Vec<&str> = Vec::new();

    for op in ops {
        match *op {
            MembershipOp::Add(i) => {
                let name = CANDIDATES[i];
                prop_assert!(store.add_user_to_group(group.id, name).await);
                if name != owner && !model.contains(&name) {
                    model.push(name);
                }
            }
            MembershipOp::Remove(i) => {
                let name = CANDIDATES[i];
                let expected = model.contains(&name);
                prop_assert_eq!(store.remove_user_from_group(group.id, name).await, expected);
                model.retain(|member| *member != name);
            }
        }
        let members = store.get_group_members(group.id).await;
        prop_assert!(!usernames(&members).contains(&owner));
        prop_assert_eq!(usernames(&members), model.clone());
    }

    let read = store.get_group(group.id).await.expect("group");
    prop_assert!(!read.members.contains(owner));
    prop_assert!(read.is_member(owner));
    prop_assert_eq!(read.members.len(), model.len());
    Ok(())
}

/// Random add/remove sequences never turn the owner into a member row, and
/// removing the owner always answers `false`.
///
/// Runs its own runtime so each case gets a fresh store from `make_store`.
pub fn owner_is_never_a_member_row<S, F, Fut>(make_store: F)
where
    S: InventoryStore,
    F: Fn() -> Fut,
    Fut: Future<Output = S>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime");
    let mut runner = TestRunner::new(ProptestConfig::with_cases(48));
    let outcome = runner.run(&membership_ops(), |ops| {
        runtime.block_on(async {
            let store = make_store().await;
            replay_membership(&store, &ops).await
        })
    });
    if let Err(failure) = outcome {
        panic!("{failure}");
    }
}

/// Generate one `#[tokio::test]` per contract check, plus a property test
/// over membership sequences.
///
/// `$make_store` is evaluated inside each test (it may use `.await`) and must
/// yield a value implementing [`InventoryStore`].
///
/// ```ignore
/// nutriguard_test_utils::inventory_contract_tests!(MemoryStore::new());
/// ```
#[macro_export]
macro_rules! inventory_contract_tests {
    (@tests $make_store:expr; $($name:ident),+ $(,)?) => {
        $(
            #[tokio::test]
            async fn $name() {
                let store = $make_store;
                $crate::contract::$name(&store).await;
            }
        )+

        #[test]
        fn owner_is_never_a_member_row() {
            $crate::contract::owner_is_never_a_member_row(|| async { $make_store });
        }
    };
    ($make_store:expr) => {
        $crate::inventory_contract_tests!(@tests $make_store;
            new_user_has_empty_personal_cart,
            user_attributes_round_trip,
            user_requires_existing_cart,
            duplicate_username_is_rejected,
            duplicate_ids_are_rejected,
            update_user_keys_on_username,
            identity_reference_is_unique,
            auth_lookup_performs_full_read,
            delete_user_cascades_relationships,
            cart_membership_agrees_with_item_owners,
            cart_items_keep_insertion_order,
            cart_links_require_both_sides,
            delete_cart_refused_while_referenced,
            create_food_item_links_existing_owner_carts,
            food_item_attributes_round_trip,
            dates_round_trip_through_store,
            update_food_item_ignores_owners,
            non_finite_numbers_read_back_as_defaults,
            owner_never_listed_as_member,
            add_user_to_group_is_idempotent,
            membership_requires_group_and_user,
            group_members_keep_join_order,
            user_groups_are_union_of_owned_and_joined,
            update_group_renames_only_for_owner,
            delete_group_keeps_shared_cart,
            group_reads_hydrate_shared_cart_items,
            friendship_is_directional,
            friendship_rejects_self_and_unknown,
            absent_entities_read_as_none,
            pantry_scenario,
            roommates_scenario,
        );
    };
}
