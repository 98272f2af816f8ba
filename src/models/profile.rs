use serde::{Deserialize, Serialize};

/// A user's public profile. The document is keyed by the chosen username;
/// `user_id` links it back to the identity record.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
}
