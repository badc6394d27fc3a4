// SPDX-FileCopyrightText: 2026 Rapport Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Rapport integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without a persistent database.
//!
//! # Components
//!
//! - [`MemoryStorage`] - In-memory `StorageAdapter` with SQLite-equivalent semantics
//! - [`ScriptedRandom`] - Random source returning pre-configured draws
//! - [`MockGenerator`] - Response generator with pre-configured replies
//! - [`TestHarness`] - Full engine stack for end-to-end tests

pub mod harness;
pub mod memory_storage;
pub mod mock_generator;
pub mod scripted_random;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_storage::MemoryStorage;
pub use mock_generator::MockGenerator;
pub use scripted_random::ScriptedRandom;
