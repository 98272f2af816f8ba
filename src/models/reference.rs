//! References between documents.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::fmt;

/// A reference to a document in another collection, stored as a
/// `<collection>/<id>` path string inside document bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    pub collection: String,
    pub id: String,
}

impl DocRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

impl Serialize for DocRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let (collection, id) = raw
            .split_once('/')
            .ok_or_else(|| de::Error::custom("document reference must be `collection/id`"))?;
        if collection.is_empty() || id.is_empty() {
            return Err(de::Error::custom(
                "document reference must be `collection/id`",
            ));
        }
        Ok(Self::new(collection, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_path_string() {
        let value = serde_json::to_value(DocRef::new("authors", "abc123")).unwrap();
        assert_eq!(value, serde_json::json!("authors/abc123"));
    }

    #[test]
    fn rejects_pathless_strings() {
        assert!(serde_json::from_value::<DocRef>(serde_json::json!("authors")).is_err());
        assert!(serde_json::from_value::<DocRef>(serde_json::json!("/abc")).is_err());
    }
}
