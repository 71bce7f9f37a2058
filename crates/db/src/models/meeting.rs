use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Globally unique room name, `<prefix>-<uuid>`. Immutable after creation.
    pub room_name: String,
    pub created_at: DateTime,
}

impl Meeting {
    pub const COLLECTION: &'static str = "meetings";
}
