//! # Blog
//!
//! Records and JSON handlers of the blog application.

pub mod handlers;
pub mod models;

pub use models::{next_id, Blog, Comment, User, MASKED_PASSWORD};
