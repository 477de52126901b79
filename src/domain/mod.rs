pub mod authority;
pub mod engagement;
pub mod post;
pub mod token;
pub mod user;
