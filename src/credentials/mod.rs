//! Service-account key parsing and the configured credential source.

pub mod service_account;
pub mod source;

pub use service_account::{parse, CredentialError, ServiceAccountCredential};
pub use source::CredentialSource;
