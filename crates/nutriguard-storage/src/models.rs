// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row mapping for the inventory tables.
//!
//! The record types are defined in `nutriguard-core::codec` so that every
//! backend persists the same shape. This module converts them to and from
//! SQLite rows: UUIDs as text, token and ingredient lists as JSON text.

use rusqlite::Row;
use rusqlite::types::Type;
use tracing::debug;
use uuid::Uuid;

pub use nutriguard_core::codec::{CartRecord, FoodItemRecord, GroupRecord, UserRecord};

pub(crate) const USER_COLUMNS: &str =
    "id, auth_id, username, dietary_restrictions, allergies, personal_cart_id";

pub(crate) const GROUP_COLUMNS: &str = "id, name, owner, shared_cart";

pub(crate) const FOOD_ITEM_COLUMNS: &str = "id, name, price, barcode, purchase_date, \
     expiration_date, image_url, ingredients, allergens, quantity";

pub(crate) fn uuid_at(row: &Row, idx: usize) -> rusqlite::Result<Uuid> {
    let text: String = row.get(idx)?;
    parse_uuid(idx, &text)
}

fn opt_uuid_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| parse_uuid(idx, &t)).transpose()
}

fn parse_uuid(idx: usize, text: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// A JSON list column. Malformed JSON reads as NULL.
fn json_list_at(row: &Row, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    let text: Option<String> = row.get(idx)?;
    Ok(text.and_then(|t| match serde_json::from_str(&t) {
        Ok(list) => Some(list),
        Err(e) => {
            debug!(column = idx, error = %e, "ignoring malformed list column");
            None
        }
    }))
}

/// Serialize a list column; `None` stays NULL.
pub(crate) fn json_list(list: &Option<Vec<String>>) -> Option<String> {
    list.as_ref().and_then(|l| serde_json::to_string(l).ok())
}

/// Map a row selected with [`USER_COLUMNS`].
pub(crate) fn user_from_row(row: &Row) -> rusqlite::Result<UserRecord> {
    Ok(UserRecord {
        id: uuid_at(row, 0)?,
        auth_id: opt_uuid_at(row, 1)?,
        username: row.get(2)?,
        dietary_restrictions: json_list_at(row, 3)?,
        allergies: json_list_at(row, 4)?,
        personal_cart_id: uuid_at(row, 5)?,
    })
}

/// Map a row selected with [`GROUP_COLUMNS`].
pub(crate) fn group_from_row(row: &Row) -> rusqlite::Result<GroupRecord> {
    Ok(GroupRecord {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        owner: row.get(2)?,
        shared_cart_id: uuid_at(row, 3)?,
    })
}

/// Map a row selected with [`FOOD_ITEM_COLUMNS`].
pub(crate) fn food_item_from_row(row: &Row) -> rusqlite::Result<FoodItemRecord> {
    Ok(FoodItemRecord {
        id: uuid_at(row, 0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        barcode: row.get(3)?,
        purchase_date: row.get(4)?,
        expiration_date: row.get(5)?,
        image_url: row.get(6)?,
        ingredients: json_list_at(row, 7)?,
        allergens: json_list_at(row, 8)?,
        quantity: row.get(9)?,
    })
}

/// `?1, ?2, ..., ?n` for an `IN (...)` clause.
pub(crate) fn placeholders(n: usize) -> String {
    (1..=n)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_numbered() {
        assert_eq!(placeholders(3), "?1, ?2, ?3");
        assert_eq!(placeholders(1), "?1");
    }

    #[test]
    fn json_list_keeps_null() {
        assert_eq!(json_list(&None), None);
        assert_eq!(
            json_list(&Some(vec!["PEANUT".to_string()])).as_deref(),
            Some(r#"["PEANUT"]"#)
        );
    }

    #[test]
    fn malformed_list_column_reads_as_null() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let value = conn
            .query_row("SELECT 'not json', '[\"EGG\"]'", [], |row| {
                Ok((json_list_at(row, 0)?, json_list_at(row, 1)?))
            })
            .unwrap();
        assert_eq!(value, (None, Some(vec!["EGG".to_string()])));
    }

    #[test]
    fn bad_uuid_is_a_conversion_error() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err = conn
            .query_row("SELECT 'nope'", [], |row| uuid_at(row, 0))
            .unwrap_err();
        assert!(matches!(err, rusqlite::Error::FromSqlConversionFailure(0, _, _)));
    }
}
