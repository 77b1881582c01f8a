pub mod credentials;
pub mod handlers;
pub mod session;

pub use credentials::{authenticate, register_user, CredentialError, UserIdentity};
pub use session::{Session, SessionError};
