//! Tasker Core
//!
//! Layered architecture:
//! - domain: Core entities, validation and errors
//! - repository: Collaborator contracts (auth, records, assets, change feed)
//!   and their hosted and in-memory implementations
//! - service: Record Store Adapter over the repository
//! - reconcile / feed: the live todo list and the change-feed subscriber
//! - guard: Session Guard for the protected views
//! - realtime: Phoenix-channel change feed
//!
//! Everything here runs on a single cooperative event loop; nothing is `Send`.

pub mod config;
pub mod domain;
pub mod feed;
pub mod guard;
pub mod realtime;
pub mod reconcile;
pub mod repository;
pub mod routes;
pub mod service;
pub mod subscription;

pub use config::{AppConfig, BackendConfig};
pub use domain::{DomainError, DomainResult};
pub use feed::{ChangeFeedSubscriber, ReconcileTarget};
pub use guard::{GuardDecision, SessionGuard};
pub use reconcile::{Applied, Change, ListReconciler, ListView};
pub use routes::Route;
pub use service::{AssetUpload, TodoStore, UpdateOutcome};
pub use subscription::Subscription;
