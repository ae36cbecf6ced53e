//! Process-wide state shared by the server, watcher and Ctrl+C handler.

mod state;

pub use state::{
    is_shutdown, register_server, setup_shutdown_handler, shutdown_receiver, wait_for_shutdown,
};
