mod authenticator;
mod bootstrap;
mod password;
mod token;

pub use authenticator::{AuthError, Authenticator, LoginRequest};
pub use bootstrap::ensure_default_user;
pub use token::{SessionToken, TokenService, SESSION_TTL};
