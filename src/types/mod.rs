//! Types shared by handlers and services.

mod pagination;
mod response;

pub use pagination::{page_offset, total_pages, SearchParams};
pub use response::{ActionOutcome, FormState};
