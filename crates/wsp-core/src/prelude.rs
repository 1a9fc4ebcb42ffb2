//! Commonly used items from wsp-core.
//!
//! Re-exports the error taxonomy and shared primitives so consuming crates can
//! pull them in with a single `use wsp_core::prelude::*;`.

pub use crate::capability::{display_prefix, generate_key, hash_key, is_format_valid};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::signing::{hmac_sha256_hex, verify_hmac_sha256_hex};
pub use crate::{ServiceHealth, ServiceStatus, Timing};
