use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

pub const ROLE_USER: &str = "ROLE_USER";

/// Role assignment is many-to-many: each authority document carries the set
/// of member user ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Authority {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub role: String,
    #[serde(default)]
    pub users: Vec<ObjectId>,
}
