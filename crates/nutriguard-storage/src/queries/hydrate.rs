// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous building blocks for composite reads.
//!
//! Every function here runs inside a single `Connection::call` closure, so a
//! composite read issues its queries back to back on the writer thread.
//! Referenced rows are always fetched with one batched `IN (...)` query per
//! relation, never one query per id. Any dangling reference fails the whole
//! read.

use std::collections::{HashMap, HashSet};

use rusqlite::types::ToSql;
use rusqlite::{Connection, Row};
use uuid::Uuid;

use nutriguard_core::{FoodItem, Group, UserProfile};

use crate::database::{OptionalExt, QueryError};
use crate::models::{
    FOOD_ITEM_COLUMNS, GROUP_COLUMNS, GroupRecord, USER_COLUMNS, UserRecord, food_item_from_row,
    group_from_row, placeholders, user_from_row, uuid_at,
};

/// Run `sql`, whose `{in}` marker becomes a placeholder list, over `keys`.
pub(crate) fn query_in<T, F>(
    conn: &Connection,
    sql: &str,
    keys: &[String],
    map: F,
) -> Result<Vec<T>, QueryError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let sql = sql.replace("{in}", &placeholders(keys.len()));
    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn ToSql> = keys.iter().map(|k| k as &dyn ToSql).collect();
    let rows = stmt
        .query_map(params.as_slice(), map)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Single-key query returning one column per row.
fn query_column<T, F>(conn: &Connection, sql: &str, key: &str, map: F) -> Result<Vec<T>, QueryError>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([key], map)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn exists(conn: &Connection, sql: &str, key: &str) -> Result<bool, QueryError> {
    Ok(conn.query_row(sql, [key], |row| row.get(0))?)
}

pub(crate) fn user_exists(conn: &Connection, username: &str) -> Result<bool, QueryError> {
    exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM userprofile WHERE username = ?1)",
        username,
    )
}

pub(crate) fn cart_exists(conn: &Connection, cart_id: Uuid) -> Result<bool, QueryError> {
    exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM cart WHERE id = ?1)",
        &cart_id.to_string(),
    )
}

pub(crate) fn food_item_exists(conn: &Connection, item_id: Uuid) -> Result<bool, QueryError> {
    exists(
        conn,
        "SELECT EXISTS(SELECT 1 FROM fooditem WHERE id = ?1)",
        &item_id.to_string(),
    )
}

pub(crate) fn select_user(
    conn: &Connection,
    username: &str,
) -> Result<Option<UserRecord>, QueryError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM userprofile WHERE username = ?1");
    Ok(conn.query_row(&sql, [username], user_from_row).optional()?)
}

pub(crate) fn select_user_by_auth_id(
    conn: &Connection,
    auth_id: Uuid,
) -> Result<Option<UserRecord>, QueryError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM userprofile WHERE auth_id = ?1");
    Ok(conn
        .query_row(&sql, [auth_id.to_string()], user_from_row)
        .optional()?)
}

pub(crate) fn select_group(
    conn: &Connection,
    group_id: Uuid,
) -> Result<Option<GroupRecord>, QueryError> {
    let sql = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = ?1");
    Ok(conn
        .query_row(&sql, [group_id.to_string()], group_from_row)
        .optional()?)
}

/// Basic profiles for `usernames`, in the given order.
pub(crate) fn load_profiles(
    conn: &Connection,
    usernames: &[String],
    relation: &'static str,
) -> Result<Vec<UserProfile>, QueryError> {
    let records = query_in(
        conn,
        &format!("SELECT {USER_COLUMNS} FROM userprofile WHERE username IN ({{in}})"),
        usernames,
        user_from_row,
    )?;
    let mut by_name: HashMap<String, UserRecord> = records
        .into_iter()
        .map(|r| (r.username.clone(), r))
        .collect();
    usernames
        .iter()
        .map(|name| {
            by_name
                .remove(name)
                .map(UserRecord::into_profile)
                .ok_or_else(|| QueryError::Dangling {
                    relation,
                    entity: "user",
                    key: name.clone(),
                })
        })
        .collect()
}

/// Items by id, each with the carts that contain it.
pub(crate) fn load_items(
    conn: &Connection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, FoodItem>, QueryError> {
    let keys: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    let records = query_in(
        conn,
        &format!("SELECT {FOOD_ITEM_COLUMNS} FROM fooditem WHERE id IN ({{in}})"),
        &keys,
        food_item_from_row,
    )?;
    let mut items: HashMap<Uuid, FoodItem> = records
        .into_iter()
        .map(|r| (r.id, r.into_item()))
        .collect();

    let links = query_in(
        conn,
        "SELECT cart_id, fooditem_id FROM cart_items WHERE fooditem_id IN ({in}) ORDER BY rowid",
        &keys,
        |row| Ok((uuid_at(row, 0)?, uuid_at(row, 1)?)),
    )?;
    for (cart_id, item_id) in links {
        if let Some(item) = items.get_mut(&item_id) {
            item.owners.push(cart_id);
        }
    }
    Ok(items)
}

/// Contents of each cart in containment order. Every requested cart must exist.
pub(crate) fn load_cart_contents(
    conn: &Connection,
    cart_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<FoodItem>>, QueryError> {
    let keys: Vec<String> = cart_ids.iter().map(Uuid::to_string).collect();
    let found: HashSet<Uuid> =
        query_in(conn, "SELECT id FROM cart WHERE id IN ({in})", &keys, |row| uuid_at(row, 0))?
            .into_iter()
            .collect();
    if let Some(missing) = cart_ids.iter().find(|id| !found.contains(id)) {
        return Err(QueryError::Dangling {
            relation: "cart reference",
            entity: "cart",
            key: missing.to_string(),
        });
    }

    let links = query_in(
        conn,
        "SELECT cart_id, fooditem_id FROM cart_items WHERE cart_id IN ({in}) ORDER BY rowid",
        &keys,
        |row| Ok((uuid_at(row, 0)?, uuid_at(row, 1)?)),
    )?;
    let mut seen = HashSet::new();
    let item_ids: Vec<Uuid> = links
        .iter()
        .map(|(_, item_id)| *item_id)
        .filter(|id| seen.insert(*id))
        .collect();
    let items = load_items(conn, &item_ids)?;

    let mut contents: HashMap<Uuid, Vec<FoodItem>> =
        cart_ids.iter().map(|id| (*id, Vec::new())).collect();
    for (cart_id, item_id) in links {
        let item = items.get(&item_id).cloned().ok_or_else(|| QueryError::Dangling {
            relation: "cart_items",
            entity: "food item",
            key: item_id.to_string(),
        })?;
        contents.entry(cart_id).or_default().push(item);
    }
    Ok(contents)
}

/// Attach members and shared cart contents to each group row.
pub(crate) fn hydrate_groups(
    conn: &Connection,
    records: Vec<GroupRecord>,
) -> Result<Vec<Group>, QueryError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let keys: Vec<String> = records.iter().map(|r| r.id.to_string()).collect();
    let memberships = query_in(
        conn,
        "SELECT group_id, username FROM group_members WHERE group_id IN ({in}) ORDER BY rowid",
        &keys,
        |row| Ok((uuid_at(row, 0)?, row.get::<_, String>(1)?)),
    )?;

    let mut cart_ids: Vec<Uuid> = records.iter().map(|r| r.shared_cart_id).collect();
    cart_ids.sort();
    cart_ids.dedup();
    let carts = load_cart_contents(conn, &cart_ids)?;

    let groups = records
        .into_iter()
        .map(|record| {
            let mut group = record.into_group();
            group.members = memberships
                .iter()
                .filter(|(group_id, username)| *group_id == group.id && *username != group.owner)
                .map(|(_, username)| username.clone())
                .collect();
            group.shared_cart = carts.get(&group.shared_cart_id).cloned().unwrap_or_default();
            group
        })
        .collect();
    Ok(groups)
}

/// Ids of the groups a user has joined or owns.
pub(crate) fn user_group_ids(conn: &Connection, username: &str) -> Result<Vec<Uuid>, QueryError> {
    let mut ids = query_column(
        conn,
        "SELECT group_id FROM group_members WHERE username = ?1 ORDER BY rowid",
        username,
        |row| uuid_at(row, 0),
    )?;
    ids.extend(query_column(
        conn,
        "SELECT id FROM groups WHERE owner = ?1 ORDER BY rowid",
        username,
        |row| uuid_at(row, 0),
    )?);
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    Ok(ids)
}

/// Usernames `username` has added as friends, in the order they were added.
pub(crate) fn friend_names(conn: &Connection, username: &str) -> Result<Vec<String>, QueryError> {
    query_column(
        conn,
        "SELECT friend_name FROM user_friends WHERE user_name = ?1 ORDER BY rowid",
        username,
        |row| row.get(0),
    )
}

/// Full read of a user row: friends, groups and personal cart contents.
pub(crate) fn hydrate_user(
    conn: &Connection,
    record: UserRecord,
) -> Result<UserProfile, QueryError> {
    let friend_ids = friend_names(conn, &record.username)?;
    let group_ids = user_group_ids(conn, &record.username)?;
    let cart_id = record.personal_cart_id;
    let mut contents = load_cart_contents(conn, &[cart_id])?;

    let mut user = record.into_profile();
    user.friend_ids = friend_ids.into_iter().collect();
    user.group_ids = group_ids.into_iter().collect();
    user.personal_cart = contents.remove(&cart_id).unwrap_or_default();
    Ok(user)
}
