//! Core types for the web shell
//!
//! - `ShellError` / `ShellResult` - error taxonomy shared by every module

pub mod error;

pub use error::{ShellError, ShellResult};
