pub mod http_client;
pub mod identity_client;

pub use http_client::{ApiResult, HttpClient};
pub use identity_client::{IdentityClient, IdentitySession};
