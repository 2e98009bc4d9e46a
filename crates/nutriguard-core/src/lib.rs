// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the NutriGuard inventory data layer.
//!
//! This crate provides the domain model (users, groups, carts, food items),
//! the [`InventoryStore`] contract every persistence backend implements, the
//! storage codec shared by those backends, and the error types used across
//! the workspace.

pub mod codec;
pub mod error;
pub mod labels;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::NutriguardError;
pub use types::{Allergen, Cart, DietaryRestriction, FoodItem, Group, HealthStatus, UserProfile};

// Re-export all traits at crate root.
pub use traits::{BackendAdapter, IdentityProvider, InventoryStore};
