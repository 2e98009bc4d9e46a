// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`InventoryStore`] contract.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, warn};
use uuid::Uuid;

use nutriguard_config::ConfigError;
use nutriguard_config::model::StorageConfig;
use nutriguard_core::{
    BackendAdapter, Cart, FoodItem, Group, HealthStatus, InventoryStore, NutriguardError,
    UserProfile,
};

use crate::database::{Database, QueryError, map_tr_err};
use crate::queries;

/// SQLite-backed inventory store.
///
/// Wraps a [`Database`] handle and delegates every operation to the typed
/// query modules. The database is opened by [`InventoryStore::initialize`].
/// Query errors stop here: they are logged and answered with the contract's
/// fallback value.
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a store for the given configuration. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// A store configured from the layered `nutriguard.toml` files and
    /// `NUTRIGUARD_*` variables. Nothing is opened yet.
    pub fn from_config_files() -> Result<Self, NutriguardError> {
        nutriguard_config::load_and_validate()
            .map(|config| Self::new(config.storage))
            .map_err(config_error)
    }

    /// A store configured from a single TOML document. Nothing is opened yet.
    pub fn from_toml(content: &str) -> Result<Self, NutriguardError> {
        nutriguard_config::load_and_validate_str(content)
            .map(|config| Self::new(config.storage))
            .map_err(config_error)
    }

    /// An initialized store over a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, NutriguardError> {
        let store = Self::new(StorageConfig::in_memory());
        store.initialize().await?;
        Ok(store)
    }

    fn db(&self) -> Result<&Database, NutriguardError> {
        self.db.get().ok_or_else(|| NutriguardError::NotInitialized {
            backend: self.name().to_string(),
        })
    }
}

fn config_error(errors: Vec<ConfigError>) -> NutriguardError {
    warn!(count = errors.len(), "storage configuration rejected");
    NutriguardError::Config(nutriguard_config::report(&errors))
}

/// Log a failed operation and substitute the contract's fallback value.
fn settle<T: Default>(operation: &'static str, outcome: Result<T, NutriguardError>) -> T {
    outcome.unwrap_or_else(|error| {
        warn!(operation, error = %error, "inventory operation failed");
        T::default()
    })
}

#[async_trait]
impl BackendAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, NutriguardError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), QueryError> {
                conn.query_row("SELECT 1", [], |_| Ok(()))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), NutriguardError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for SqliteStore {
    async fn initialize(&self) -> Result<(), NutriguardError> {
        let db = Database::open(&self.config).await?;
        self.db.set(db).map_err(|_| {
            NutriguardError::storage("storage already initialized")
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), NutriguardError> {
        self.db()?.checkpoint().await
    }

    // --- Users ---

    async fn create_user(&self, user: &UserProfile) -> Option<UserProfile> {
        let outcome = async { queries::users::create_user(self.db()?, user).await.map(Some) }.await;
        settle("create_user", outcome)
    }

    async fn get_user(&self, username: &str) -> Option<UserProfile> {
        let outcome = async { queries::users::get_user(self.db()?, username).await }.await;
        settle("get_user", outcome)
    }

    async fn get_user_basic(&self, username: &str) -> Option<UserProfile> {
        let outcome = async { queries::users::get_user_basic(self.db()?, username).await }.await;
        settle("get_user_basic", outcome)
    }

    async fn get_user_by_auth_id(&self, auth_id: Uuid) -> Option<UserProfile> {
        let outcome =
            async { queries::users::get_user_by_auth_id(self.db()?, auth_id).await }.await;
        settle("get_user_by_auth_id", outcome)
    }

    async fn update_user(&self, user: &UserProfile) -> bool {
        let outcome = async { queries::users::update_user(self.db()?, user).await }.await;
        settle("update_user", outcome)
    }

    async fn delete_user(&self, username: &str) -> bool {
        let outcome = async { queries::users::delete_user(self.db()?, username).await }.await;
        settle("delete_user", outcome)
    }

    // --- Groups ---

    async fn create_group(&self, group: &Group) -> Option<Group> {
        let outcome =
            async { queries::groups::create_group(self.db()?, group).await.map(Some) }.await;
        settle("create_group", outcome)
    }

    async fn get_group(&self, group_id: Uuid) -> Option<Group> {
        let outcome = async { queries::groups::get_group(self.db()?, group_id).await }.await;
        settle("get_group", outcome)
    }

    async fn update_group(&self, group: &Group) -> bool {
        let outcome = async { queries::groups::update_group(self.db()?, group).await }.await;
        settle("update_group", outcome)
    }

    async fn delete_group(&self, group_id: Uuid) -> bool {
        let outcome = async { queries::groups::delete_group(self.db()?, group_id).await }.await;
        settle("delete_group", outcome)
    }

    // --- Carts ---

    async fn create_cart(&self, cart: &Cart) -> Option<Cart> {
        let outcome = async { queries::carts::create_cart(self.db()?, cart).await.map(Some) }.await;
        settle("create_cart", outcome)
    }

    async fn get_cart(&self, cart_id: Uuid) -> Option<Cart> {
        let outcome = async { queries::carts::get_cart(self.db()?, cart_id).await }.await;
        settle("get_cart", outcome)
    }

    async fn delete_cart(&self, cart_id: Uuid) -> bool {
        let outcome = async { queries::carts::delete_cart(self.db()?, cart_id).await }.await;
        settle("delete_cart", outcome)
    }

    // --- Food items ---

    async fn create_food_item(&self, item: &FoodItem) -> Option<FoodItem> {
        let outcome =
            async { queries::food_items::create_food_item(self.db()?, item).await.map(Some) }.await;
        settle("create_food_item", outcome)
    }

    async fn get_food_item(&self, item_id: Uuid) -> Option<FoodItem> {
        let outcome = async { queries::food_items::get_food_item(self.db()?, item_id).await }.await;
        settle("get_food_item", outcome)
    }

    async fn update_food_item(&self, item: &FoodItem) -> bool {
        let outcome = async { queries::food_items::update_food_item(self.db()?, item).await }.await;
        settle("update_food_item", outcome)
    }

    async fn delete_food_item(&self, item_id: Uuid) -> bool {
        let outcome =
            async { queries::food_items::delete_food_item(self.db()?, item_id).await }.await;
        settle("delete_food_item", outcome)
    }

    // --- Friendship ---

    async fn add_friend(&self, username: &str, friend_username: &str) -> bool {
        let outcome =
            async { queries::friends::add_friend(self.db()?, username, friend_username).await }
                .await;
        settle("add_friend", outcome)
    }

    async fn get_friends(&self, username: &str) -> Vec<UserProfile> {
        let outcome = async { queries::friends::get_friends(self.db()?, username).await }.await;
        settle("get_friends", outcome)
    }

    async fn remove_friend(&self, username: &str, friend_username: &str) -> bool {
        let outcome =
            async { queries::friends::remove_friend(self.db()?, username, friend_username).await }
                .await;
        settle("remove_friend", outcome)
    }

    // --- Group membership ---

    async fn add_user_to_group(&self, group_id: Uuid, username: &str) -> bool {
        let outcome =
            async { queries::members::add_user_to_group(self.db()?, group_id, username).await }
                .await;
        settle("add_user_to_group", outcome)
    }

    async fn get_group_members(&self, group_id: Uuid) -> Vec<UserProfile> {
        let outcome =
            async { queries::members::get_group_members(self.db()?, group_id).await }.await;
        settle("get_group_members", outcome)
    }

    async fn get_user_groups(&self, username: &str) -> Vec<Group> {
        let outcome = async { queries::groups::get_user_groups(self.db()?, username).await }.await;
        settle("get_user_groups", outcome)
    }

    async fn remove_user_from_group(&self, group_id: Uuid, username: &str) -> bool {
        let outcome =
            async { queries::members::remove_user_from_group(self.db()?, group_id, username).await }
                .await;
        settle("remove_user_from_group", outcome)
    }

    // --- Cart contents ---

    async fn add_item_to_cart(&self, cart_id: Uuid, item_id: Uuid) -> bool {
        let outcome =
            async { queries::carts::add_item_to_cart(self.db()?, cart_id, item_id).await }.await;
        settle("add_item_to_cart", outcome)
    }

    async fn get_cart_items(&self, cart_id: Uuid) -> Vec<FoodItem> {
        let outcome = async { queries::carts::get_cart_items(self.db()?, cart_id).await }.await;
        settle("get_cart_items", outcome)
    }

    async fn remove_item_from_cart(&self, cart_id: Uuid, item_id: Uuid) -> bool {
        let outcome =
            async { queries::carts::remove_item_from_cart(self.db()?, cart_id, item_id).await }
                .await;
        settle("remove_item_from_cart", outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tracing_test::traced_test;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
            busy_timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn sqlite_store_implements_backend_adapter() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("test.db")));
        assert_eq!(store.name(), "sqlite");
        assert_eq!(store.version(), semver::Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let store = SqliteStore::new(make_config(&db_path));

        store.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("double_init.db")));

        store.initialize().await.unwrap();
        assert!(store.initialize().await.is_err(), "second initialize should fail");
    }

    #[tokio::test]
    async fn from_toml_opens_configured_database() {
        let store = SqliteStore::from_toml(
            "[storage]\ndatabase_path = \":memory:\"\nwal_mode = false\n",
        )
        .unwrap();
        store.initialize().await.unwrap();
        assert!(store.create_cart(&Cart::new()).await.is_some());
    }

    #[traced_test]
    #[test]
    fn from_toml_reports_misspelled_key_with_suggestion() {
        let Err(NutriguardError::Config(report)) =
            SqliteStore::from_toml("[storage]\nwal_mdoe = false\n")
        else {
            panic!("misspelled key should be rejected");
        };
        assert!(report.contains("wal_mdoe"), "got: {report}");
        assert!(report.contains("did you mean `wal_mode`"), "got: {report}");
        assert!(logs_contain("storage configuration rejected"));
    }

    #[test]
    fn from_toml_collects_every_invalid_setting() {
        let Err(NutriguardError::Config(report)) = SqliteStore::from_toml(
            "[storage]\ndatabase_path = \":memory:\"\nbusy_timeout_ms = 0\n",
        ) else {
            panic!("invalid settings should be rejected");
        };
        assert!(report.contains("storage.busy_timeout_ms"), "got: {report}");
        assert!(report.contains("storage.wal_mode"), "got: {report}");
    }

    #[tokio::test]
    async fn health_check_reflects_initialization() {
        let dir = tempdir().unwrap();
        let store = SqliteStore::new(make_config(&dir.path().join("health.db")));
        assert!(store.health_check().await.is_err());

        store.initialize().await.unwrap();
        assert_eq!(store.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn data_survives_close_and_reopen() {
        let dir = tempdir().unwrap();
        let config = make_config(&dir.path().join("reopen.db"));

        let store = SqliteStore::new(config.clone());
        store.initialize().await.unwrap();
        let cart = store.create_cart(&Cart::new()).await.unwrap();
        store.close().await.unwrap();
        store.shutdown().await.unwrap();
        drop(store);

        let reopened = SqliteStore::new(config);
        reopened.initialize().await.unwrap();
        assert!(reopened.get_cart(cart.id).await.is_some());
    }

    #[traced_test]
    #[tokio::test]
    async fn operations_before_initialize_are_logged_failures() {
        let store = SqliteStore::new(StorageConfig::in_memory());
        assert!(store.get_user("alice").await.is_none());
        assert!(!store.delete_cart(Uuid::new_v4()).await);
        assert!(store.get_cart_items(Uuid::new_v4()).await.is_empty());
        assert!(logs_contain("inventory operation failed"));
        assert!(logs_contain("not initialized"));
    }

    #[traced_test]
    #[tokio::test]
    async fn constraint_violations_are_logged_failures() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let orphan = UserProfile::new("alice", Uuid::new_v4());
        assert!(store.create_user(&orphan).await.is_none());
        assert!(logs_contain("create_user"));
    }

    /// Write rows that bypass the foreign keys, as a damaged database would.
    async fn seed_unchecked(store: &SqliteStore, sql: String) {
        store
            .db()
            .unwrap()
            .connection()
            .call(move |conn| -> Result<(), QueryError> {
                conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
                conn.execute_batch(&sql)?;
                conn.execute_batch("PRAGMA foreign_keys = ON;")?;
                Ok(())
            })
            .await
            .unwrap();
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_personal_cart_fails_the_full_read() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        seed_unchecked(
            &store,
            format!(
                "INSERT INTO userprofile (id, username, personal_cart_id) \
                 VALUES ('{}', 'alice', '{}');",
                Uuid::new_v4(),
                Uuid::new_v4()
            ),
        )
        .await;

        assert!(store.get_user_basic("alice").await.is_some());
        assert!(store.get_user("alice").await.is_none());
        assert!(logs_contain("get_user"));
        assert!(logs_contain("references missing cart"));
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_cart_item_fails_cart_and_group_reads() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let cart = store.create_cart(&Cart::new()).await.unwrap();
        let group = store
            .create_group(&Group::new("Flat", "alice", cart.id))
            .await
            .unwrap();
        let apple = FoodItem {
            owners: vec![cart.id],
            ..FoodItem::new("Apple")
        };
        store.create_food_item(&apple).await.unwrap();
        seed_unchecked(
            &store,
            format!(
                "INSERT INTO cart_items (cart_id, fooditem_id) VALUES ('{}', '{}');",
                cart.id,
                Uuid::new_v4()
            ),
        )
        .await;

        assert!(store.get_cart_items(cart.id).await.is_empty());
        assert!(store.get_cart(cart.id).await.is_none());
        assert!(store.get_group(group.id).await.is_none());
        assert!(logs_contain("cart_items references missing food item"));
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_member_profile_empties_member_list() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let cart = store.create_cart(&Cart::new()).await.unwrap();
        store
            .create_user(&UserProfile::new("bob", cart.id))
            .await
            .unwrap();
        let group = store
            .create_group(&Group::new("Flat", "alice", cart.id))
            .await
            .unwrap();
        assert!(store.add_user_to_group(group.id, "bob").await);
        seed_unchecked(
            &store,
            format!(
                "INSERT INTO group_members (group_id, username) VALUES ('{}', 'ghost');",
                group.id
            ),
        )
        .await;

        assert!(store.get_group_members(group.id).await.is_empty());
        assert!(logs_contain("group_members references missing user"));
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_group_fails_user_groups() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let cart = store.create_cart(&Cart::new()).await.unwrap();
        store
            .create_user(&UserProfile::new("bob", cart.id))
            .await
            .unwrap();
        seed_unchecked(
            &store,
            format!(
                "INSERT INTO group_members (group_id, username) VALUES ('{}', 'bob');",
                Uuid::new_v4()
            ),
        )
        .await;

        assert!(store.get_user_groups("bob").await.is_empty());
        assert!(store.get_user("bob").await.is_some());
        assert!(logs_contain("references missing group"));
    }
}
