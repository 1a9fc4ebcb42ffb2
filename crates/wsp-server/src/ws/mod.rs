//! WebSocket distribution plane: the bearer-token service that gates
//! upgrades (component G) and the upgrade endpoint itself.

mod handler;
mod subscribe;
pub mod token;

pub use handler::upgrade;
pub use subscribe::{subscribe_folder, subscribe_workspace};
pub use token::{
    CLOSE_KEY_REVOKED, CLOSE_TOKEN_EXPIRED, CLOSE_TOKEN_INVALID, NonceStore, TokenPayload,
    allowed_events,
};
