// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the inventory tables and their junctions.
//!
//! Every public function takes a [`Database`](crate::Database), runs on the
//! connection's background thread and returns `Result<_, NutriguardError>`.
//! Logging and fallback values are the adapter's business.

pub mod carts;
pub mod food_items;
pub mod friends;
pub(crate) mod hydrate;
pub mod members;
pub mod groups;
pub mod users;
