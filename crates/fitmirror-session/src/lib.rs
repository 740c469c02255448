//! fitmirror-session — Try-on session lifecycle.
//!
//! [`Session`] is the synchronous state machine that holds the camera and
//! runs detection ticks. [`spawn_engine`] drives it on its own thread and
//! publishes snapshots for the render loop and the UI.

pub mod config;
pub mod engine;
pub mod session;

pub use config::Config;
pub use engine::{run_render_loop, spawn_engine, EngineHandle};
pub use session::{Detection, Session, SessionError, SessionState, Snapshot, Still};
