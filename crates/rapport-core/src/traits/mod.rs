// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! Adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod generator;
pub mod random;
pub mod storage;

pub use adapter::PluginAdapter;
pub use generator::ResponseGenerator;
pub use random::RandomSource;
pub use storage::StorageAdapter;
