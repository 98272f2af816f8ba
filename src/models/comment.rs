use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DocRef;

/// A comment on a book. `username` is the id of the commenting user's
/// public-profile document.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub text: String,
    pub username: String,
    pub date_created: DateTime<Utc>,
    pub book: DocRef,
}
