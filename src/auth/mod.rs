pub mod extractors;
pub mod password;
pub mod repo;
pub mod repo_types;

pub use extractors::AdminAuth;
pub use repo::{CredentialStore, PgCredentialStore};
