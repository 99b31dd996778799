use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password: String, // Always hashed
    pub name: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub favorite_ids: Vec<ObjectId>,
    pub last_signin: Option<DateTime<Utc>>,
    // We always want these fields, but have them optional so we can set them in the code
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// What the session endpoint returns. Never includes the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub favorite_ids: Vec<ObjectId>,
    pub created_at: DateTime<Utc>,
}
