//! Live reload for the development server.
//!
//! ```text
//! watch binding (Reload) ──► ReloadServer::broadcast ──► browsers
//!                                                          │
//!                     livereload.js: reload page / refresh <link> sheets
//! ```

pub mod message;
pub mod server;

pub use server::ReloadServer;
