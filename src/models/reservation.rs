use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::listing::Listing;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Reservation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub listing_id: ObjectId,
    pub user_id: ObjectId, // the guest
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReservationInput {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Booked range of a listing, as exposed publicly for the date picker.
/// Deliberately omits who booked it.
#[derive(Debug, Serialize)]
pub struct BookedRange {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A reservation joined with its listing, for the trips and host views.
#[derive(Debug, Serialize)]
pub struct ReservationWithListing {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub listing: Listing,
}
