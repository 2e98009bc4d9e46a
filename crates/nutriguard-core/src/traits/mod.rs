// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions at the seams of the data layer.
//!
//! Backends implement [`InventoryStore`] on top of the [`BackendAdapter`]
//! lifecycle trait. [`IdentityProvider`] is the boundary to the external
//! identity service. All traits use `#[async_trait]` for dynamic dispatch.

pub mod adapter;
pub mod identity;
pub mod inventory;

pub use adapter::BackendAdapter;
pub use identity::IdentityProvider;
pub use inventory::InventoryStore;
