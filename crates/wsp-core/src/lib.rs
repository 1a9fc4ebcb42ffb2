#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod capability;
mod common;
pub mod error;
pub mod signing;

#[doc(hidden)]
pub mod prelude;

pub use common::{ServiceHealth, ServiceStatus, Timing};
pub use error::{BoxedError, Error, ErrorKind, Result};
