//! droptrack-core library.
//!
//! Item records and their schema migration, the drop probability engine,
//! collection sorting, backup envelopes, and the repository that persists
//! everything through a [`store::KeyValueStore`].
//!
//! # Conventions
//!
//! - **Errors**: core operations return [`error::DropError`]; configuration
//!   loading uses `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod envelope;
pub mod error;
pub mod lock;
pub mod migrate;
pub mod model;
pub mod probability;
pub mod repo;
pub mod sort;
pub mod store;

pub use error::{DropError, ErrorCode, ValidationError};
pub use model::item::{EventKind, ItemRecord};
pub use repo::{MarkOutcome, Repository};
