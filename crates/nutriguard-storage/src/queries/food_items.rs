// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD operations for food items.

use std::collections::HashSet;

use nutriguard_core::{FoodItem, NutriguardError};
use uuid::Uuid;

use crate::database::{Database, QueryError, map_tr_err};
use crate::models::{FoodItemRecord, json_list};
use crate::queries::hydrate;

/// Insert the item and link it to each distinct existing cart in
/// `item.owners`, in one transaction. The returned owners are the carts
/// actually linked.
pub async fn create_food_item(db: &Database, item: &FoodItem) -> Result<FoodItem, NutriguardError> {
    let record = FoodItemRecord::from(item);
    let requested = item.owners.clone();
    db.connection()
        .call(move |conn| -> Result<FoodItem, QueryError> {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO fooditem (id, name, price, barcode, purchase_date, expiration_date, \
                 image_url, ingredients, allergens, quantity) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                rusqlite::params![
                    record.id.to_string(),
                    record.name,
                    record.price,
                    record.barcode,
                    record.purchase_date,
                    record.expiration_date,
                    record.image_url,
                    json_list(&record.ingredients),
                    json_list(&record.allergens),
                    record.quantity,
                ],
            )?;

            let mut seen = HashSet::new();
            let mut owners = Vec::new();
            for cart_id in requested.into_iter().filter(|id| seen.insert(*id)) {
                if hydrate::cart_exists(&tx, cart_id)? {
                    tx.execute(
                        "INSERT INTO cart_items (cart_id, fooditem_id) VALUES (?1, ?2)",
                        [cart_id.to_string(), record.id.to_string()],
                    )?;
                    owners.push(cart_id);
                }
            }
            tx.commit()?;

            let mut stored = record.into_item();
            stored.owners = owners;
            Ok(stored)
        })
        .await
        .map_err(map_tr_err)
}

/// The item plus the ids of every cart containing it.
pub async fn get_food_item(
    db: &Database,
    item_id: Uuid,
) -> Result<Option<FoodItem>, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<Option<FoodItem>, QueryError> {
            let mut items = hydrate::load_items(conn, &[item_id])?;
            Ok(items.remove(&item_id))
        })
        .await
        .map_err(map_tr_err)
}

/// Update every attribute except owners. Returns whether a row matched.
pub async fn update_food_item(db: &Database, item: &FoodItem) -> Result<bool, NutriguardError> {
    let record = FoodItemRecord::from(item);
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let updated = conn.execute(
                "UPDATE fooditem SET name = ?2, price = ?3, barcode = ?4, purchase_date = ?5, \
                 expiration_date = ?6, image_url = ?7, ingredients = ?8, allergens = ?9, \
                 quantity = ?10 WHERE id = ?1",
                rusqlite::params![
                    record.id.to_string(),
                    record.name,
                    record.price,
                    record.barcode,
                    record.purchase_date,
                    record.expiration_date,
                    record.image_url,
                    json_list(&record.ingredients),
                    json_list(&record.allergens),
                    record.quantity,
                ],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete an item. Its containment rows cascade.
pub async fn delete_food_item(db: &Database, item_id: Uuid) -> Result<bool, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let deleted =
                conn.execute("DELETE FROM fooditem WHERE id = ?1", [item_id.to_string()])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}
