//! Names of the top-level document collections.

pub const AUTHORS: &str = "authors";
pub const BOOKS: &str = "books";
pub const PUBLIC_PROFILES: &str = "publicProfiles";
pub const BOOK_COMMENTS: &str = "bookComments";
