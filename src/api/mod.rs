//! # API Helpers
//!
//! Domain error payloads and pagination shared by the JSON handlers.

pub mod errors;
pub mod page;

pub use errors::{ApiError, ApiResult};
pub use page::{page_index, Page, DEFAULT_PAGE_SIZE};
