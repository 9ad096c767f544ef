//! WakeUp core library: domain types, document persistence and URL validation.
//!
//! Public API surface:
//! - [`types`]: newtypes and the persisted document model
//! - [`error`]: [`StoreError`], [`InvalidInterval`]
//! - [`store`]: load-or-default / atomic save of the JSON document
//! - [`validate`]: [`is_valid_url`]

pub mod error;
pub mod store;
pub mod types;
pub mod validate;

pub use error::{InvalidInterval, StoreError};
pub use store::DocumentStore;
pub use types::{Document, PingInterval, Resource, ResourceId, ResourceStatus, Settings};
pub use validate::is_valid_url;
