//! Configuration for the controller
//!
//! This crate moves the [`AutomationStore`](at_store::AutomationStore) in
//! and out of its JSON document, keeps that document in durable storage,
//! and loads the process settings the server runs with.
//!
//! # Modules
//!
//! - [`codec`] - Encode the store to a document and decode one over it
//! - [`fallback`] - Parse-with-fallback field readers used by the decoder
//! - [`storage`] - Durable byte store (file or memory)
//! - [`boot`] - Boot-time load, default population and save
//! - [`settings`] - Server settings from YAML and the environment

pub mod boot;
pub mod codec;
pub mod error;
pub mod fallback;
pub mod settings;
pub mod storage;

pub use boot::{load_or_initialize, save, BootSource};
pub use codec::{decode, encode, DecodeReport};
pub use error::{ConfigError, ConfigResult};
pub use settings::ServerSettings;
pub use storage::{ConfigStorage, FileStorage, MemoryStorage, StorageError, StorageResult};
