//! # awesome-blog
//!
//! Blog backend built on two pieces:
//!
//! - `orm`: a declarative data mapper. Record types declare their fields once,
//!   the schema caches the SQL templates, and `Database` runs async CRUD over a
//!   pooled SQLite connection.
//! - `web`: a request parameter binder. Handlers are registered with explicit
//!   descriptors and receive exactly the arguments they declare.
//!
//! `blog` holds the records and JSON handlers, `auth` the session cookies.

pub mod api;
pub mod auth;
pub mod blog;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod orm;
pub mod web;
