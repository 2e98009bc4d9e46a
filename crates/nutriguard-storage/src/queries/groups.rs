// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CRUD operations for groups and the owner-union group listing.

use nutriguard_core::{Group, NutriguardError};
use uuid::Uuid;

use crate::database::{Database, QueryError, map_tr_err};
use crate::models::{GROUP_COLUMNS, GroupRecord, group_from_row};
use crate::queries::hydrate;

/// Insert a group row. No membership row is written for the owner.
pub async fn create_group(db: &Database, group: &Group) -> Result<Group, NutriguardError> {
    let record = GroupRecord::from(group);
    db.connection()
        .call(move |conn| -> Result<GroupRecord, QueryError> {
            let sql = format!(
                "INSERT INTO groups (id, name, owner, shared_cart) VALUES (?1, ?2, ?3, ?4) \
                 RETURNING {GROUP_COLUMNS}"
            );
            Ok(conn.query_row(
                &sql,
                [
                    record.id.to_string(),
                    record.name,
                    record.owner,
                    record.shared_cart_id.to_string(),
                ],
                group_from_row,
            )?)
        })
        .await
        .map(GroupRecord::into_group)
        .map_err(map_tr_err)
}

/// The group with its members and shared cart contents.
pub async fn get_group(db: &Database, group_id: Uuid) -> Result<Option<Group>, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<Option<Group>, QueryError> {
            let Some(record) = hydrate::select_group(conn, group_id)? else {
                return Ok(None);
            };
            Ok(hydrate::hydrate_groups(conn, vec![record])?.pop())
        })
        .await
        .map_err(map_tr_err)
}

/// Rename a group. Matches only when the stored owner equals `group.owner`.
pub async fn update_group(db: &Database, group: &Group) -> Result<bool, NutriguardError> {
    let record = GroupRecord::from(group);
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let updated = conn.execute(
                "UPDATE groups SET name = ?1 WHERE id = ?2 AND owner = ?3",
                [record.name, record.id.to_string(), record.owner],
            )?;
            Ok(updated > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete a group. Membership rows cascade; the shared cart is kept.
pub async fn delete_group(db: &Database, group_id: Uuid) -> Result<bool, NutriguardError> {
    db.connection()
        .call(move |conn| -> Result<bool, QueryError> {
            let deleted = conn.execute("DELETE FROM groups WHERE id = ?1", [group_id.to_string()])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Every group `username` has joined or owns, hydrated, sorted by name then id.
pub async fn get_user_groups(db: &Database, username: &str) -> Result<Vec<Group>, NutriguardError> {
    let username = username.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Group>, QueryError> {
            let keys: Vec<String> = hydrate::user_group_ids(conn, &username)?
                .iter()
                .map(Uuid::to_string)
                .collect();
            let records = hydrate::query_in(
                conn,
                &format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id IN ({{in}})"),
                &keys,
                group_from_row,
            )?;
            if records.len() != keys.len() {
                return Err(QueryError::Dangling {
                    relation: "group_members",
                    entity: "group",
                    key: username,
                });
            }
            let mut groups = hydrate::hydrate_groups(conn, records)?;
            groups.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
            Ok(groups)
        })
        .await
        .map_err(map_tr_err)
}
