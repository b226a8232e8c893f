// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Infrastructure layer: registry files, basis files, the model server
//! client and event sinks

pub mod basis_loader;
pub mod event_bus;
pub mod http_generation;
pub mod registry_store;
pub mod repository;

pub use basis_loader::{load_basis, save_basis, BasisLoadError};
pub use event_bus::{LoggingEventBus, NoopEventBus};
pub use http_generation::HttpGenerationClient;
pub use registry_store::{InMemoryRegistryStore, JsonRegistryStore};
pub use repository::{RegistryError, SkillRegistryStore};
