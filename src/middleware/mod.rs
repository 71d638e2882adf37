pub mod auth;
pub mod error_detail;
pub mod extract;

pub use auth::{authenticate, optional_authenticate, AuthUser, MaybeAuthUser};
pub use error_detail::expose_error_detail;
pub use extract::{AppJson, AppQuery};
