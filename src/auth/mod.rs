//! Authentication and authorization module

pub mod middleware;
pub mod ownership;
pub mod password;
pub mod token;
pub mod transport;

pub use middleware::{require_principal, AuthorizationGate, Principal};
pub use ownership::OwnershipPolicy;
pub use password::PasswordHasher;
pub use token::TokenIssuer;
pub use transport::{CookieTransport, CredentialTransport, Credentials, HeaderTransport, TransportKind};
