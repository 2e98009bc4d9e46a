// SPDX-FileCopyrightText: 2026 NutriGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract suite against the SQLite backend.

use nutriguard_storage::SqliteStore;
use nutriguard_test_utils::inventory_contract_tests;

inventory_contract_tests!(
    SqliteStore::open_in_memory()
        .await
        .expect("in-memory store should open")
);
