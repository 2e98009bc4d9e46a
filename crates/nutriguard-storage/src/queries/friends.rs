// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The friendship junction (`user_friends`). Pairs are directional.

use nutriguard_core::{NutriguardError, UserProfile};

use crate::database::{Database, QueryError, map_tr_err};
use crate::queries::hydrate;

/// Record `username -> friend_username`. Returns `false` for a self pair or
/// when either user is missing.
pub async fn add_friend(
    db: &Database,
    username: &str,
    friend_username: &str,
) -> Result<bool, NutriguardError> {
    if username == friend_username {
        return Ok(false);
    }
    let (username, friend) = (username.to_string(), friend_username.to_string());
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            if !hydrate::user_exists(conn, &username)? || !hydrate::user_exists(conn, &friend)? {
                return Ok(false);
            }
            conn.execute(
                "INSERT OR IGNORE INTO user_friends (user_name, friend_name) VALUES (?1, ?2)",
                [&username, &friend],
            )?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Basic profiles of the users `username` has added, in the order added.
pub async fn get_friends(
    db: &Database,
    username: &str,
) -> Result<Vec<UserProfile>, NutriguardError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<UserProfile>, QueryError> {
            let names = hydrate::friend_names(conn, &username)?;
            hydrate::load_profiles(conn, &names, "user_friends")
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_friend(
    db: &Database,
    username: &str,
    friend_username: &str,
) -> Result<bool, NutriguardError> {
    let (username, friend) = (username.to_string(), friend_username.to_string());
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let removed = conn.execute(
                "DELETE FROM user_friends WHERE user_name = ?1 AND friend_name = ?2",
                [&username, &friend],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{carts, users};
    use nutriguard_core::Cart;

    async fn with_users(names: &[&str]) -> Database {
        let db = Database::open_in_memory().await.unwrap();
        for name in names {
            let cart = carts::create_cart(&db, &Cart::new()).await.unwrap();
            users::create_user(&db, &UserProfile::new(*name, cart.id)).await.unwrap();
        }
        db
    }

    #[tokio::test]
    async fn friendship_is_directional() {
        let db = with_users(&["alice", "bob"]).await;
        assert!(add_friend(&db, "alice", "bob").await.unwrap());

        let alice_friends = get_friends(&db, "alice").await.unwrap();
        assert_eq!(alice_friends.len(), 1);
        assert_eq!(alice_friends[0].username, "bob");
        assert!(get_friends(&db, "bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn self_and_unknown_friends_are_rejected() {
        let db = with_users(&["alice"]).await;
        assert!(!add_friend(&db, "alice", "alice").await.unwrap());
        assert!(!add_friend(&db, "alice", "nobody").await.unwrap());
    }

    #[tokio::test]
    async fn deleting_a_user_drops_their_friendships() {
        let db = with_users(&["alice", "bob", "carol"]).await;
        add_friend(&db, "alice", "bob").await.unwrap();
        add_friend(&db, "alice", "carol").await.unwrap();
        users::delete_user(&db, "bob").await.unwrap();

        let names: Vec<_> = get_friends(&db, "alice")
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["carol"]);
        assert!(!remove_friend(&db, "alice", "bob").await.unwrap());
        assert!(remove_friend(&db, "alice", "carol").await.unwrap());
    }
}
