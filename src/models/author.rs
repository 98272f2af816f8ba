use serde::{Deserialize, Serialize};

/// An author document. Name uniqueness is enforced by a pre-insert check
/// in the handler, not by the store.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Author {
    pub name: String,
}
