pub mod oauth2;

pub use oauth2::{AuthClient, AuthError, FetchAccessToken, TokenResponse};
