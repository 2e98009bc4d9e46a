// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Carts and the containment junction (`cart_items`).

use nutriguard_core::{Cart, FoodItem, NutriguardError};
use uuid::Uuid;

use crate::database::{Database, QueryError, map_tr_err};
use crate::models::uuid_at;
use crate::queries::hydrate;

/// Insert an empty cart under the caller's id.
pub async fn create_cart(db: &Database, cart: &Cart) -> Result<Cart, NutriguardError> {
    let id = cart.id.to_string();
    db.connection()
        .call(move |conn| -> Result<Uuid, QueryError> {
            Ok(conn.query_row("INSERT INTO cart (id) VALUES (?1) RETURNING id", [&id], |row| {
                uuid_at(row, 0)
            })?)
        })
        .await
        .map(Cart::with_id)
        .map_err(map_tr_err)
}

/// The cart with its items in containment order.
pub async fn get_cart(db: &Database, cart_id: Uuid) -> Result<Option<Cart>, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<Option<Cart>, QueryError> {
            if !hydrate::cart_exists(conn, cart_id)? {
                return Ok(None);
            }
            let mut contents = hydrate::load_cart_contents(conn, &[cart_id])?;
            Ok(Some(Cart {
                id: cart_id,
                items: contents.remove(&cart_id).unwrap_or_default(),
            }))
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a cart and its containment rows. A cart still referenced by a user
/// or group violates a foreign key and is left in place.
pub async fn delete_cart(db: &Database, cart_id: Uuid) -> Result<bool, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let deleted = conn.execute("DELETE FROM cart WHERE id = ?1", [cart_id.to_string()])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Record that `cart_id` contains `item_id`. Returns `false` when either
/// side is missing; an existing pair is left as is.
pub async fn add_item_to_cart(
    db: &Database,
    cart_id: Uuid,
    item_id: Uuid,
) -> Result<bool, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            if !hydrate::cart_exists(conn, cart_id)? || !hydrate::food_item_exists(conn, item_id)? {
                return Ok(false);
            }
            conn.execute(
                "INSERT OR IGNORE INTO cart_items (cart_id, fooditem_id) VALUES (?1, ?2)",
                [cart_id.to_string(), item_id.to_string()],
            )?;
            Ok(true)
        })
        .await
        .map_err(map_tr_err)
}

/// Items of the cart, each with its owners. Unknown carts are empty.
pub async fn get_cart_items(
    db: &Database,
    cart_id: Uuid,
) -> Result<Vec<FoodItem>, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<Vec<FoodItem>, QueryError> {
            if !hydrate::cart_exists(conn, cart_id)? {
                return Ok(Vec::new());
            }
            let mut contents = hydrate::load_cart_contents(conn, &[cart_id])?;
            Ok(contents.remove(&cart_id).unwrap_or_default())
        })
        .await
        .map_err(map_tr_err)
}

pub async fn remove_item_from_cart(
    db: &Database,
    cart_id: Uuid,
    item_id: Uuid,
) -> Result<bool, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let removed = conn.execute(
                "DELETE FROM cart_items WHERE cart_id = ?1 AND fooditem_id = ?2",
                [cart_id.to_string(), item_id.to_string()],
            )?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
