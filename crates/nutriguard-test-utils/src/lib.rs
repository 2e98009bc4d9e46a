// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for NutriGuard.
//!
//! Provides an in-memory inventory backend, a mock identity provider, store
//! fixtures and the behavioral suite every backend must pass.
//!
//! # Components
//!
//! - [`MemoryStore`] - In-memory [`InventoryStore`](nutriguard_core::InventoryStore)
//! - [`MockIdentityProvider`] - In-memory credential table
//! - [`contract`] - Shared contract checks and [`inventory_contract_tests!`]

pub mod contract;
pub mod fixtures;
pub mod memory;
pub mod mock_identity;

pub use memory::MemoryStore;
pub use mock_identity::MockIdentityProvider;
