use crate::services::{
    document_store::DocumentStore, identity_service::IdentityService, media_service::MediaService,
};

/// Shared application state, constructed once at startup and cloned into
/// every handler.
#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentStore,
    pub media: MediaService,
    pub identity: IdentityService,
    /// Registered email of the administrator account; a caller creating a
    /// profile with this email is granted the admin claim.
    pub admin_email: String,
}
