// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD operations for user profiles.

use nutriguard_core::{NutriguardError, UserProfile};
use uuid::Uuid;

use crate::database::{Database, QueryError, map_tr_err};
use crate::models::{USER_COLUMNS, UserRecord, json_list, user_from_row};
use crate::queries::hydrate;

/// Insert a user row and return it as stored.
pub async fn create_user(
    db: &Database,
    user: &UserProfile,
) -> Result<UserProfile, NutriguardError> {
    let record = UserRecord::from(user);
    db.connection()
        .call(move |conn| -> Result<UserRecord, QueryError> {
            let sql = format!(
                "INSERT INTO userprofile \
                 (id, auth_id, username, dietary_restrictions, allergies, personal_cart_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) RETURNING {USER_COLUMNS}"
            );
            let stored = conn.query_row(
                &sql,
                rusqlite::params![
                    record.id.to_string(),
                    record.auth_id.map(|id| id.to_string()),
                    record.username,
                    json_list(&record.dietary_restrictions),
                    json_list(&record.allergies),
                    record.personal_cart_id.to_string(),
                ],
                user_from_row,
            )?;
            Ok(stored)
        })
        .await
        .map(UserRecord::into_profile)
        .map_err(map_tr_err)
}

/// The user row only.
pub async fn get_user_basic(
    db: &Database,
    username: &str,
) -> Result<Option<UserProfile>, NutriguardError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| hydrate::select_user(conn, &username))
        .await
        .map(|record| record.map(UserRecord::into_profile))
        .map_err(map_tr_err)
}

/// The user row plus friends, groups and personal cart contents.
pub async fn get_user(
    db: &Database,
    username: &str,
) -> Result<Option<UserProfile>, NutriguardError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<UserProfile>, QueryError> {
            hydrate::select_user(conn, &username)?
                .map(|record| hydrate::hydrate_user(conn, record))
                .transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// Full read of the user holding `auth_id`.
pub async fn get_user_by_auth_id(
    db: &Database,
    auth_id: Uuid,
) -> Result<Option<UserProfile>, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<Option<UserProfile>, QueryError> {
            hydrate::select_user_by_auth_id(conn, auth_id)?
                .map(|record| hydrate::hydrate_user(conn, record))
                .transpose()
        })
        .await
        .map_err(map_tr_err)
}

/// Update identity reference, restrictions and allergies by username.
/// Returns whether a row matched.
pub async fn update_user(db: &Database, user: &UserProfile) -> Result<bool, NutriguardError> {
    let record = UserRecord::from(user);
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let updated = conn.execute(
                "UPDATE userprofile SET auth_id = ?1, dietary_restrictions = ?2, allergies = ?3 \
                 WHERE username = ?4",
                rusqlite::params![
                    record.auth_id.map(|id| id.to_string()),
                    json_list(&record.dietary_restrictions),
                    json_list(&record.allergies),
                    record.username,
                ],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a user. Friendships and memberships naming them cascade.
pub async fn delete_user(db: &Database, username: &str) -> Result<bool, NutriguardError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let deleted = conn.execute("DELETE FROM userprofile WHERE username = ?1", [&username])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::carts;
    use nutriguard_core::{Allergen, Cart, DietaryRestriction};

    async fn setup() -> (Database, Uuid) {
        let db = Database::open_in_memory().await.unwrap();
        let cart = carts::create_cart(&db, &Cart::new()).await.unwrap();
        (db, cart.id)
    }

    #[tokio::test]
    async fn create_then_read_basic_and_full() {
        let (db, cart_id) = setup().await;
        let mut user = UserProfile::new("alice", cart_id);
        user.add_allergy(Allergen::Peanut);
        user.add_restriction(DietaryRestriction::Vegan);

        let stored = create_user(&db, &user).await.unwrap();
        assert_eq!(stored.id, user.id);
        assert_eq!(stored.allergies, user.allergies);

        let basic = get_user_basic(&db, "alice").await.unwrap().unwrap();
        assert_eq!(basic.dietary_restrictions, user.dietary_restrictions);
        let full = get_user(&db, "alice").await.unwrap().unwrap();
        assert_eq!(full.personal_cart_id, cart_id);
        assert!(full.personal_cart.is_empty());
    }

    #[tokio::test]
    async fn duplicate_username_is_an_error() {
        let (db, cart_id) = setup().await;
        create_user(&db, &UserProfile::new("alice", cart_id)).await.unwrap();
        let result = create_user(&db, &UserProfile::new("alice", cart_id)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_cart_violates_foreign_key() {
        let db = Database::open_in_memory().await.unwrap();
        let result = create_user(&db, &UserProfile::new("alice", Uuid::new_v4())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn update_changes_attributes_only() {
        let (db, cart_id) = setup().await;
        let mut user = create_user(&db, &UserProfile::new("alice", cart_id)).await.unwrap();
        user.auth_id = Some(Uuid::new_v4());
        user.add_allergy(Allergen::Milk);
        assert!(update_user(&db, &user).await.unwrap());

        let read = get_user_by_auth_id(&db, user.auth_id.unwrap()).await.unwrap().unwrap();
        assert_eq!(read.username, "alice");
        assert!(read.allergies.contains(&Allergen::Milk));

        let ghost = UserProfile::new("ghost", cart_id);
        assert!(!update_user(&db, &ghost).await.unwrap());
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let (db, cart_id) = setup().await;
        create_user(&db, &UserProfile::new("alice", cart_id)).await.unwrap();
        assert!(delete_user(&db, "alice").await.unwrap());
        assert!(!delete_user(&db, "alice").await.unwrap());
        assert!(get_user(&db, "alice").await.unwrap().is_none());
    }
}
