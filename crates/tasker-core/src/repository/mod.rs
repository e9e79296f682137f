//! Repository Layer
//!
//! Collaborator contracts and their implementations: the hosted backend over
//! HTTP and an in-memory backend for tests and offline runs.

mod memory;
mod rest;
mod traits;


pub use memory::{CallCounts, MemoryBackend, MemoryClient, SentMail};
pub use rest::SupabaseClient;
pub use traits::{
    AssetStorage, AuthProvider, ChangeEvent, ChangeFeed, ChangeFilter, ChangeKind, ChangeSink, NoPersistence,
    RecordStore, SessionListener, SessionPersistence,
};
