use serde::{Deserialize, Serialize};

use super::DocRef;

/// A book document.
///
/// `author` references an author document; the reference is written as
/// given and not verified against the authors collection. `image_uri` is
/// the long-lived signed URL of the stored cover image.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub author: DocRef,
    pub image_uri: String,
    pub summary: String,
    pub title: String,
}
