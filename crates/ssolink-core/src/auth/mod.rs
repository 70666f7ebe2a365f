//! Connection profile management
//!
//! - [`store`]: durable profile CRUD with audit events
//! - [`connection`]: runtime connections bound to credential providers
//! - [`reconcile`]: linked-profile discovery and unmanaged-profile sync
//! - [`manager`]: host-facing connection lifecycle

pub mod connection;
pub mod manager;
pub mod reconcile;
pub mod store;

pub use connection::{Connection, IamConnection, SsoConnection, StatefulConnection};
pub use manager::ConnectionManager;
pub use reconcile::{
    DiscoveryReport, Reconciler, SOURCE_DISCOVERY, SOURCE_SHARED_CREDENTIALS, SyncReport,
};
pub use store::{GET_PROFILE_CALL_SITE, ProfileStore};
