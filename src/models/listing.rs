use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Category labels a listing may carry. These match what the category
/// picker offers, so anything else in a create request is a client bug.
pub const CATEGORIES: [&str; 14] = [
    "Beach",
    "Windmills",
    "Modern",
    "Luxe",
    "Mansions",
    "Countryside",
    "Islands",
    "Lake",
    "Skiing",
    "Desert",
    "Cabin",
    "Artic",
    "Cave",
    "Farm",
];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Listing {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub title: String,
    pub description: String,
    pub image_src: String,
    pub category: String,
    pub room_count: i32,
    pub bathroom_count: i32,
    pub guest_count: i32,
    pub location_value: String,
    pub price: i64, // per night, smallest currency unit
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ListingInput {
    pub title: String,
    pub description: String,
    pub image_src: String,
    pub category: String,
    pub room_count: i32,
    pub bathroom_count: i32,
    pub guest_count: i32,
    pub location_value: String,
    pub price: i64,
}

impl ListingInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".to_string());
        }
        if self.description.trim().is_empty() {
            return Err("Description is required".to_string());
        }
        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(format!("Unknown category: {}", self.category));
        }
        if self.location_value.trim().is_empty() {
            return Err("Location is required".to_string());
        }
        if self.room_count < 1 || self.bathroom_count < 1 || self.guest_count < 1 {
            return Err("Room, bathroom and guest counts must be at least 1".to_string());
        }
        if self.price <= 0 {
            return Err("Price per night must be positive".to_string());
        }
        Ok(())
    }
}
