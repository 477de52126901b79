pub mod auth;
pub mod authorities;
pub mod comments;
pub mod error;
pub mod posts;
pub mod users;

pub use error::ServiceError;
