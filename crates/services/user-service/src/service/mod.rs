//! Service layer - user use cases.

mod user_service;

#[cfg(any(test, feature = "test-utils"))]
pub use user_service::MockUserService;
pub use user_service::{NewUser, UserManager, UserService, UserSession, DEFAULT_ROLE};
