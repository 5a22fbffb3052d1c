//! Test doubles shared by the workspace crates: a scriptable wireless transport whose
//! boards can be told to fail or hang on any command, and readers for session files.

pub mod csv_loader;
pub mod fake_board;

pub use fake_board::{Fault, ScriptedBoard, ScriptedTransport};
