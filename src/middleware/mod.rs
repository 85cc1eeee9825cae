pub mod auth;
pub mod response;

pub use auth::{require_admin, require_publisher, require_reviewer, require_token, verify_user_role, CurrentUser};
pub use response::{ApiResponse, ApiResult, CookieResponse, TokenResponse};
