//! Browser Bindings
//!
//! Thin wrappers over the Web APIs the app needs: history, local storage,
//! WebSocket and file reading.

pub mod files;
pub mod history;
pub mod persistence;
pub mod realtime;

pub use files::read_upload;
pub use persistence::LocalSessionStore;
pub use realtime::BrowserTransport;
