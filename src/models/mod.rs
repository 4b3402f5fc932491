pub mod user;

pub use user::{AuthUser, CurrentUser, SESSION_USER_KEY};
