//! Interactive SQLite terminal with starred-query bookmarks.
//!
//! # Intention
//!
//! - Run arbitrary SQL against a working database and print the results as text.
//! - Keep a personal list of starred statements in a separate bookmark database.
//!
//! # Architectural Boundaries
//!
//! - `sqlite` and `store` hold all database code.
//! - `repl` and `command` own the interactive loop; they never touch SQLite directly.
//! - `state` persists the two scalar text files (last SQL, default path).

pub mod cli;
pub mod command;
pub mod error;
pub mod repl;
pub mod sqlite;
pub mod state;
pub mod store;

pub use error::{Error, Result};
