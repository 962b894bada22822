//! Pagination module
//!
//! Walks the service's `Links` response header from page to page.
//!
//! # Overview
//!
//! - [`parse_link_header`] turns a Link-style header into relation → URL pairs
//! - [`Page`] is one decoded response plus its continuation hints
//! - [`CursorPaginator`] produces a lazy [`RecordStream`] spanning every page;
//!   the next page is requested only once the previous page has been consumed

mod cursor;
mod links;
mod types;

pub use cursor::{CursorPaginator, RecordStream};
pub use links::{parse_link_header, LinkRelations};
pub use types::{follow_url, Page, LINKS_HEADER, NEXT_REL, RECORD_COUNT_HEADER};
