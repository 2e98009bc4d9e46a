// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The membership junction (`group_members`).
//!
//! The owner of a group never has a membership row: ownership alone makes
//! them part of the group.

use nutriguard_core::{NutriguardError, UserProfile};
use uuid::Uuid;

use crate::database::{Database, QueryError, map_tr_err};
use crate::queries::hydrate;

/// Add an explicit member. Adding the owner succeeds without writing.
pub async fn add_user_to_group(
    db: &Database,
    group_id: Uuid,
    username: &str,
) -> Result<bool, NutriguardError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let Some(group) = hydrate::select_group(conn, group_id)? else {
                return Ok(false);
            };
            if group.owner == username {
                return Ok(true);
            }
            if !hydrate::user_exists(conn, &username)? {
                return Ok(false);
            }
            conn.execute(
                "INSERT OR IGNORE INTO group_members (group_id, username) VALUES (?1, ?2)",
                [group_id.to_string(), username],
            )?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Basic profiles of the explicit members, in join order.
pub async fn get_group_members(
    db: &Database,
    group_id: Uuid,
) -> Result<Vec<UserProfile>, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<UserProfile>, QueryError> {
            let names = hydrate::query_in(
                conn,
                "SELECT gm.username FROM group_members gm JOIN groups g ON g.id = gm.group_id \
                 WHERE gm.group_id IN ({in}) AND gm.username <> g.owner ORDER BY gm.rowid",
                &[group_id.to_string()],
                |row| row.get::<_, String>(0),
            )?;
            hydrate::load_profiles(conn, &names, "group_members")
        })
        .await
        .map_err(map_tr_err)
}

/// Remove an explicit member. The owner has no row, so removing them is a
/// no-op that returns `false`.
pub async fn remove_user_from_group(
    db: &Database,
    group_id: Uuid,
    username: &str,
) -> Result<bool, NutriguardError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let removed = conn.execute(
                "DELETE FROM group_members WHERE group_id = ?1 AND username = ?2",
                [group_id.to_string(), username],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{carts, groups, users};
    use nutriguard_core::{Cart, Group};

    async fn setup() -> (Database, Uuid) {
        let db = Database::open_in_memory().await.unwrap();
        for name in ["bob", "carol", "dave"] {
            let cart = carts::create_cart(&db, &Cart::new()).await.unwrap();
            users::create_user(&db, &UserProfile::new(name, cart.id)).await.unwrap();
        }
        let shared = carts::create_cart(&db, &Cart::new()).await.unwrap();
        let group = groups::create_group(&db, &Group::new("Roommates", "bob", shared.id))
            .await
            .unwrap();
        (db, group.id)
    }

    #[tokio::test]
    async fn owner_is_never_a_member_row() {
        let (db, group_id) = setup().await;
        assert!(add_user_to_group(&db, group_id, "bob").await.unwrap());
        assert!(get_group_members(&db, group_id).await.unwrap().is_empty());
        assert!(!remove_user_from_group(&db, group_id, "bob").await.unwrap());
    }

    #[tokio::test]
    async fn members_listed_in_join_order_once() {
        let (db, group_id) = setup().await;
        assert!(add_user_to_group(&db, group_id, "dave").await.unwrap());
        assert!(add_user_to_group(&db, group_id, "carol").await.unwrap());
        assert!(add_user_to_group(&db, group_id, "dave").await.unwrap());

        let names: Vec<_> = get_group_members(&db, group_id)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["dave", "carol"]);
    }

    #[tokio::test]
    async fn unknown_group_or_user_is_rejected() {
        let (db, group_id) = setup().await;
        assert!(!add_user_to_group(&db, Uuid::new_v4(), "carol").await.unwrap());
        assert!(!add_user_to_group(&db, group_id, "nobody").await.unwrap());
        assert!(get_group_members(&db, Uuid::new_v4()).await.unwrap().is_empty());
    }
}
