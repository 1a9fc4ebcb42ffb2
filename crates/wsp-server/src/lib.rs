#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod admission;
pub mod error;
pub mod events;
pub mod extract;
pub mod middleware;
pub mod prelude;
pub mod router;
pub mod scheduler;
pub mod state;
pub mod webhook;
pub mod ws;

pub use error::{Error, ErrorKind, Result};
pub use router::build;
pub use state::AppState;
