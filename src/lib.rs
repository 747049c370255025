//! Client session and request layer for the foodcourt marketplace API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Customers, sellers, delivery agents, and admins all talk to the same REST
//! backend. This crate owns the only sanctioned path to it: a credential store
//! behind the [`store::SessionStore`] seam, one signed HTTP pipeline
//! ([`http::ApiClient`]) with request/response interceptors, and the
//! [`session::Session`] facade that UI code calls.
//!
//! Authorization lives on the server. Cached user records only drive
//! presentation decisions; expiry is discovered reactively through a 401.

pub mod config;
pub mod error;
pub mod http;
pub mod nav;
pub mod session;
pub mod store;
pub mod types;

pub use config::SessionConfig;
pub use error::SessionError;
pub use http::{ApiClient, ApiRequest, Signing};
pub use nav::{MemoryNavigator, Navigator};
pub use session::{LoginOutcome, Session, TokenStatus};
pub use store::{CredentialStore, Credentials, FileStore, MemoryStore, SessionStore};
pub use types::{CachedUser, Role, TokenKind};
