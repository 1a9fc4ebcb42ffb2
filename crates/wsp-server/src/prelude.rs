//! Prelude module for wsp-server.
//!
//! Re-exports the most commonly used types and traits from wsp-server,
//! making it easy to import everything you need with a single `use`
//! statement.
//!
//! # Example
//!
//! ```rust
//! use wsp_server::prelude::*;
//! ```

pub use crate::admission::{Operation, classify, is_admission_exempt};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::extract::*;
pub use crate::middleware::*;
pub use crate::state::AppState;
