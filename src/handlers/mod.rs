//! Request handlers. Each catalog operation runs the access guard, then
//! exact-shape payload validation, then its collaborator calls in
//! sequence; failures abort immediately with a classified error.

pub mod author_handlers;
pub mod book_handlers;
pub mod comment_handlers;
pub mod health_handlers;
pub mod media_handlers;
pub mod profile_handlers;
