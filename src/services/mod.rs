//! Collaborator services: the document database, object storage, and the
//! identity provider. Each is a thin handle over the shared SQLite pool
//! (and, for media, the storage directory), constructed once at startup
//! and cloned into handlers.

pub mod document_store;
pub mod identity_service;
pub mod media_service;
