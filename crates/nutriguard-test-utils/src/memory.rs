// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory implementation of the [`InventoryStore`] contract.
//!
//! `MemoryStore` keeps the same row records the SQLite backend writes, so
//! every value passes through the same codec on the way in and out. Junctions
//! are insertion-ordered pair lists without duplicates, mirroring rowid order.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use nutriguard_core::codec::{CartRecord, FoodItemRecord, GroupRecord, UserRecord};
use nutriguard_core::{
    BackendAdapter, Cart, FoodItem, Group, HealthStatus, InventoryStore, NutriguardError,
    UserProfile,
};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    groups: HashMap<Uuid, GroupRecord>,
    carts: HashMap<Uuid, CartRecord>,
    items: HashMap<Uuid, FoodItemRecord>,
    /// `(user_name, friend_name)`
    friends: Vec<(String, String)>,
    /// `(group_id, username)`
    members: Vec<(Uuid, String)>,
    /// `(cart_id, fooditem_id)`
    cart_items: Vec<(Uuid, Uuid)>,
}

fn dangling(relation: &str, entity: &str, key: impl std::fmt::Display) -> NutriguardError {
    NutriguardError::Internal(format!("{relation} references missing {entity} `{key}`"))
}

fn rejected(reason: impl Into<String>) -> NutriguardError {
    NutriguardError::storage(reason.into())
}

/// Log a failed operation and substitute the contract's fallback value.
fn settle<T: Default>(operation: &'static str, outcome: Result<T, NutriguardError>) -> T {
    outcome.unwrap_or_else(|error| {
        warn!(operation, error = %error, "inventory operation failed");
        T::default()
    })
}

fn insert_pair<T: PartialEq>(pairs: &mut Vec<T>, pair: T) {
    if !pairs.contains(&pair) {
        pairs.push(pair);
    }
}

fn remove_pair<T: PartialEq>(pairs: &mut Vec<T>, pair: &T) -> bool {
    let before = pairs.len();
    pairs.retain(|p| p != pair);
    pairs.len() != before
}

impl Tables {
    fn profiles(
        &self,
        usernames: &[String],
        relation: &str,
    ) -> Result<Vec<UserProfile>, NutriguardError> {
        usernames
            .iter()
            .map(|name| {
                self.users
                    .get(name)
                    .cloned()
                    .map(UserRecord::into_profile)
                    .ok_or_else(|| dangling(relation, "user", name))
            })
            .collect()
    }

    fn item(&self, item_id: Uuid) -> Option<FoodItem> {
        let mut item = self.items.get(&item_id)?.clone().into_item();
        item.owners = self
            .cart_items
            .iter()
            .filter(|(_, id)| *id == item_id)
            .map(|(cart_id, _)| *cart_id)
            .collect();
        Some(item)
    }

    fn cart_contents(&self, cart_id: Uuid) -> Result<Vec<FoodItem>, NutriguardError> {
        if !self.carts.contains_key(&cart_id) {
            return Err(dangling("cart reference", "cart", cart_id));
        }
        self.cart_items
            .iter()
            .filter(|(id, _)| *id == cart_id)
            .map(|(_, item_id)| {
                self.item(*item_id)
                    .ok_or_else(|| dangling("cart_items", "food item", item_id))
            })
            .collect()
    }

    fn member_names(&self, group: &GroupRecord) -> Vec<String> {
        self.members
            .iter()
            .filter(|(id, name)| *id == group.id && *name != group.owner)
            .map(|(_, name)| name.clone())
            .collect()
    }

    fn hydrate_group(&self, record: GroupRecord) -> Result<Group, NutriguardError> {
        let members = self.member_names(&record);
        let shared_cart = self.cart_contents(record.shared_cart_id)?;
        let mut group = record.into_group();
        group.members = members.into_iter().collect();
        group.shared_cart = shared_cart;
        Ok(group)
    }

    fn user_group_ids(&self, username: &str) -> Vec<Uuid> {
        let mut seen = HashSet::new();
        self.members
            .iter()
            .filter(|(_, name)| name == username)
            .map(|(id, _)| *id)
            .chain(
                self.groups
                    .values()
                    .filter(|g| g.owner == username)
                    .map(|g| g.id),
            )
            .filter(|id| seen.insert(*id))
            .collect()
    }

    fn friend_names(&self, username: &str) -> Vec<String> {
        self.friends
            .iter()
            .filter(|(user, _)| user == username)
            .map(|(_, friend)| friend.clone())
            .collect()
    }

    fn hydrate_user(&self, record: UserRecord) -> Result<UserProfile, NutriguardError> {
        let friend_ids = self.friend_names(&record.username);
        let group_ids = self.user_group_ids(&record.username);
        let personal_cart = self.cart_contents(record.personal_cart_id)?;
        let mut user = record.into_profile();
        user.friend_ids = friend_ids.into_iter().collect();
        user.group_ids = group_ids.into_iter().collect();
        user.personal_cart = personal_cart;
        Ok(user)
    }

    fn auth_id_taken(&self, auth_id: Option<Uuid>, username: &str) -> bool {
        auth_id.is_some_and(|auth_id| {
            self.users
                .values()
                .any(|u| u.auth_id == Some(auth_id) && u.username != username)
        })
    }
}

/// Thread-safe in-memory inventory store.
///
/// Suitable as a test double for the SQLite backend: it enforces the same
/// uniqueness, referential and cascade rules and produces the same results.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackendAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, NutriguardError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NutriguardError> {
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn initialize(&self) -> Result<(), NutriguardError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), NutriguardError> {
        Ok(())
    }

    // --- Users ---

    async fn create_user(&self, user: &UserProfile) -> Option<UserProfile> {
        let record = UserRecord::from(user);
        let mut t = self.tables.lock().await;
        let outcome = if t.users.contains_key(&record.username) {
            Err(rejected(format!("username `{}` is taken", record.username)))
        } else if t.users.values().any(|u| u.id == record.id) {
            Err(rejected(format!("user id `{}` is taken", record.id)))
        } else if t.auth_id_taken(record.auth_id, &record.username) {
            Err(rejected("identity reference is already linked"))
        } else if !t.carts.contains_key(&record.personal_cart_id) {
            Err(rejected(format!("cart `{}` does not exist", record.personal_cart_id)))
        } else {
            t.users.insert(record.username.clone(), record.clone());
            Ok(Some(record.into_profile()))
        };
        settle("create_user", outcome)
    }

    async fn get_user(&self, username: &str) -> Option<UserProfile> {
        let t = self.tables.lock().await;
        let outcome = t
            .users
            .get(username)
            .cloned()
            .map(|record| t.hydrate_user(record))
            .transpose();
        settle("get_user", outcome)
    }

    async fn get_user_basic(&self, username: &str) -> Option<UserProfile> {
        let t = self.tables.lock().await;
        t.users.get(username).cloned().map(UserRecord::into_profile)
    }

    async fn get_user_by_auth_id(&self, auth_id: Uuid) -> Option<UserProfile> {
        let t = self.tables.lock().await;
        let outcome = t
            .users
            .values()
            .find(|u| u.auth_id == Some(auth_id))
            .cloned()
            .map(|record| t.hydrate_user(record))
            .transpose();
        settle("get_user_by_auth_id", outcome)
    }

    async fn update_user(&self, user: &UserProfile) -> bool {
        let incoming = UserRecord::from(user);
        let mut t = self.tables.lock().await;
        if t.auth_id_taken(incoming.auth_id, &incoming.username) {
            return settle::<bool>(
                "update_user",
                Err(rejected("identity reference is already linked")),
            );
        }
        match t.users.get_mut(&incoming.username) {
            Some(stored) => {
                stored.auth_id = incoming.auth_id;
                stored.dietary_restrictions = incoming.dietary_restrictions;
                stored.allergies = incoming.allergies;
                true
            }
            None => false,
        }
    }

    async fn delete_user(&self, username: &str) -> bool {
        let mut t = self.tables.lock().await;
        if t.users.remove(username).is_none() {
            return false;
        }
        t.friends
            .retain(|(user, friend)| user != username && friend != username);
        t.members.retain(|(_, name)| name != username);
        true
    }

    // --- Groups ---

    async fn create_group(&self, group: &Group) -> Option<Group> {
        let record = GroupRecord::from(group);
        let mut t = self.tables.lock().await;
        let outcome = if t.groups.contains_key(&record.id) {
            Err(rejected(format!("group id `{}` is taken", record.id)))
        } else if !t.carts.contains_key(&record.shared_cart_id) {
            Err(rejected(format!("cart `{}` does not exist", record.shared_cart_id)))
        } else {
            t.groups.insert(record.id, record.clone());
            Ok(Some(record.into_group()))
        };
        settle("create_group", outcome)
    }

    async fn get_group(&self, group_id: Uuid) -> Option<Group> {
        let t = self.tables.lock().await;
        let outcome = t
            .groups
            .get(&group_id)
            .cloned()
            .map(|record| t.hydrate_group(record))
            .transpose();
        settle("get_group", outcome)
    }

    async fn update_group(&self, group: &Group) -> bool {
        let mut t = self.tables.lock().await;
        match t.groups.get_mut(&group.id) {
            Some(stored) if stored.owner == group.owner => {
                stored.name = group.name.clone();
                true
            }
            _ => false,
        }
    }

    async fn delete_group(&self, group_id: Uuid) -> bool {
        let mut t = self.tables.lock().await;
        if t.groups.remove(&group_id).is_none() {
            return false;
        }
        t.members.retain(|(id, _)| *id != group_id);
        true
    }

    // --- Carts ---

    async fn create_cart(&self, cart: &Cart) -> Option<Cart> {
        let record = CartRecord::from(cart);
        let mut t = self.tables.lock().await;
        let outcome = if t.carts.contains_key(&record.id) {
            Err(rejected(format!("cart id `{}` is taken", record.id)))
        } else {
            t.carts.insert(record.id, record);
            Ok(Some(record.into_cart()))
        };
        settle("create_cart", outcome)
    }

    async fn get_cart(&self, cart_id: Uuid) -> Option<Cart> {
        let t = self.tables.lock().await;
        let record = *t.carts.get(&cart_id)?;
        let outcome = t.cart_contents(cart_id).map(|items| {
            let mut cart = record.into_cart();
            cart.items = items;
            Some(cart)
        });
        settle("get_cart", outcome)
    }

    async fn delete_cart(&self, cart_id: Uuid) -> bool {
        let mut t = self.tables.lock().await;
        if !t.carts.contains_key(&cart_id) {
            return false;
        }
        let referenced = t.users.values().any(|u| u.personal_cart_id == cart_id)
            || t.groups.values().any(|g| g.shared_cart_id == cart_id);
        if referenced {
            return settle::<bool>(
                "delete_cart",
                Err(rejected(format!("cart `{cart_id}` is still referenced"))),
            );
        }
        t.carts.remove(&cart_id);
        t.cart_items.retain(|(id, _)| *id != cart_id);
        true
    }

    // --- Food items ---

    async fn create_food_item(&self, item: &FoodItem) -> Option<FoodItem> {
        let record = FoodItemRecord::from(item);
        let mut t = self.tables.lock().await;
        if t.items.contains_key(&record.id) {
            return settle(
                "create_food_item",
                Err(rejected(format!("food item id `{}` is taken", record.id))),
            );
        }
        let mut owners = Vec::new();
        for cart_id in &item.owners {
            if t.carts.contains_key(cart_id) && !owners.contains(cart_id) {
                owners.push(*cart_id);
            }
        }
        for cart_id in &owners {
            insert_pair(&mut t.cart_items, (*cart_id, record.id));
        }
        t.items.insert(record.id, record.clone());
        let mut stored = record.into_item();
        stored.owners = owners;
        Some(stored)
    }

    async fn get_food_item(&self, item_id: Uuid) -> Option<FoodItem> {
        self.tables.lock().await.item(item_id)
    }

    async fn update_food_item(&self, item: &FoodItem) -> bool {
        let record = FoodItemRecord::from(item);
        let mut t = self.tables.lock().await;
        match t.items.get_mut(&record.id) {
            Some(stored) => {
                *stored = record;
                true
            }
            None => false,
        }
    }

    async fn delete_food_item(&self, item_id: Uuid) -> bool {
        let mut t = self.tables.lock().await;
        if t.items.remove(&item_id).is_none() {
            return false;
        }
        t.cart_items.retain(|(_, id)| *id != item_id);
        true
    }

    // --- Friendship ---

    async fn add_friend(&self, username: &str, friend_username: &str) -> bool {
        if username == friend_username {
            return false;
        }
        let mut t = self.tables.lock().await;
        if !t.users.contains_key(username) || !t.users.contains_key(friend_username) {
            return false;
        }
        insert_pair(
            &mut t.friends,
            (username.to_string(), friend_username.to_string()),
        );
        true
    }

    async fn get_friends(&self, username: &str) -> Vec<UserProfile> {
        let t = self.tables.lock().await;
        let names = t.friend_names(username);
        settle("get_friends", t.profiles(&names, "user_friends"))
    }

    async fn remove_friend(&self, username: &str, friend_username: &str) -> bool {
        let mut t = self.tables.lock().await;
        remove_pair(
            &mut t.friends,
            &(username.to_string(), friend_username.to_string()),
        )
    }

    // --- Group membership ---

    async fn add_user_to_group(&self, group_id: Uuid, username: &str) -> bool {
        let mut t = self.tables.lock().await;
        let Some(group) = t.groups.get(&group_id) else {
            return false;
        };
        if group.owner == username {
            return true;
        }
        if !t.users.contains_key(username) {
            return false;
        }
        insert_pair(&mut t.members, (group_id, username.to_string()));
        true
    }

    async fn get_group_members(&self, group_id: Uuid) -> Vec<UserProfile> {
        let t = self.tables.lock().await;
        let Some(group) = t.groups.get(&group_id) else {
            return Vec::new();
        };
        let names = t.member_names(group);
        settle("get_group_members", t.profiles(&names, "group_members"))
    }

    async fn get_user_groups(&self, username: &str) -> Vec<Group> {
        let t = self.tables.lock().await;
        let outcome = t
            .user_group_ids(username)
            .into_iter()
            .map(|id| {
                let record = t
                    .groups
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| dangling("group_members", "group", id))?;
                t.hydrate_group(record)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|mut groups| {
                groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
                groups
            });
        settle("get_user_groups", outcome)
    }

    async fn remove_user_from_group(&self, group_id: Uuid, username: &str) -> bool {
        let mut t = self.tables.lock().await;
        remove_pair(&mut t.members, &(group_id, username.to_string()))
    }

    // --- Cart contents ---

    async fn add_item_to_cart(&self, cart_id: Uuid, item_id: Uuid) -> bool {
        let mut t = self.tables.lock().await;
        if !t.carts.contains_key(&cart_id) || !t.items.contains_key(&item_id) {
            return false;
        }
        insert_pair(&mut t.cart_items, (cart_id, item_id));
        true
    }

    async fn get_cart_items(&self, cart_id: Uuid) -> Vec<FoodItem> {
        let t = self.tables.lock().await;
        if !t.carts.contains_key(&cart_id) {
            return Vec::new();
        }
        settle("get_cart_items", t.cart_contents(cart_id))
    }

    async fn remove_item_from_cart(&self, cart_id: Uuid, item_id: Uuid) -> bool {
        let mut t = self.tables.lock().await;
        remove_pair(&mut t.cart_items, &(cart_id, item_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn memory_store_identifies_itself() {
        let store = MemoryStore::new();
        assert_eq!(store.name(), "memory");
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
        store.initialize().await.unwrap();
        store.close().await.unwrap();
    }

    #[traced_test]
    #[tokio::test]
    async fn rejected_writes_are_logged() {
        let store = MemoryStore::new();
        let orphan = UserProfile::new("alice", Uuid::new_v4());
        assert!(store.create_user(&orphan).await.is_none());
        assert!(logs_contain("create_user"));
        assert!(logs_contain("does not exist"));
    }

    /// Store whose tables were written without referential checks.
    fn seeded(seed: impl FnOnce(&mut Tables)) -> MemoryStore {
        let mut tables = Tables::default();
        seed(&mut tables);
        MemoryStore {
            tables: Mutex::new(tables),
        }
    }

    fn user_record(username: &str, cart_id: Uuid) -> UserRecord {
        UserRecord::from(&UserProfile::new(username, cart_id))
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_personal_cart_fails_the_full_read() {
        let store = seeded(|t| {
            t.users
                .insert("alice".to_string(), user_record("alice", Uuid::new_v4()));
        });
        assert!(store.get_user_basic("alice").await.is_some());
        assert!(store.get_user("alice").await.is_none());
        assert!(logs_contain("get_user"));
        assert!(logs_contain("references missing cart"));
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_cart_item_fails_cart_and_group_reads() {
        let cart = Cart::new();
        let group = Group::new("Flat", "alice", cart.id);
        let present = FoodItem::new("Apple");
        let present_id = present.id;
        let store = seeded(|t| {
            t.carts.insert(cart.id, CartRecord::from(&cart));
            t.items.insert(present.id, FoodItemRecord::from(&present));
            t.groups.insert(group.id, GroupRecord::from(&group));
            t.cart_items.push((cart.id, present_id));
            t.cart_items.push((cart.id, Uuid::new_v4()));
        });

        assert!(store.get_cart_items(cart.id).await.is_empty());
        assert!(store.get_cart(cart.id).await.is_none());
        assert!(store.get_group(group.id).await.is_none());
        assert!(logs_contain("cart_items references missing food item"));
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_member_profile_empties_member_list() {
        let cart = Cart::new();
        let group = Group::new("Flat", "alice", cart.id);
        let store = seeded(|t| {
            t.carts.insert(cart.id, CartRecord::from(&cart));
            t.users.insert("bob".to_string(), user_record("bob", cart.id));
            t.groups.insert(group.id, GroupRecord::from(&group));
            t.members.push((group.id, "bob".to_string()));
            t.members.push((group.id, "ghost".to_string()));
        });

        assert!(store.get_group_members(group.id).await.is_empty());
        assert!(logs_contain("group_members references missing user"));
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_group_fails_user_groups() {
        let cart = Cart::new();
        let store = seeded(|t| {
            t.carts.insert(cart.id, CartRecord::from(&cart));
            t.users.insert("bob".to_string(), user_record("bob", cart.id));
            t.members.push((Uuid::new_v4(), "bob".to_string()));
        });

        assert!(store.get_user_groups("bob").await.is_empty());
        assert!(store.get_user("bob").await.is_some());
        assert!(logs_contain("references missing group"));
    }

    #[test]
    fn reinserted_pair_moves_to_the_end() {
        let mut pairs = vec![(1, 2), (3, 4)];
        assert!(remove_pair(&mut pairs, &(1, 2)));
        insert_pair(&mut pairs, (1, 2));
        insert_pair(&mut pairs, (3, 4));
        assert_eq!(pairs, vec![(3, 4), (1, 2)]);
    }
}
