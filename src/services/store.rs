use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::{Client, Collection};
use std::sync::Arc;

use crate::models::{listing::Listing, reservation::Reservation};

#[derive(Debug, PartialEq)]
pub struct StoreError(pub String);

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Store error: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// The persistence operations the booking workflow needs. Kept narrow so
/// tests can drive the workflow against an in-memory implementation.
pub trait BookingStore {
    async fn get_listing(&self, listing_id: &ObjectId) -> Result<Option<Listing>, StoreError>;
    async fn reservations_for_listing(
        &self,
        listing_id: &ObjectId,
    ) -> Result<Vec<Reservation>, StoreError>;
    async fn insert_reservation(&self, reservation: &Reservation) -> Result<ObjectId, StoreError>;
    async fn get_reservation(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<Reservation>, StoreError>;
    async fn delete_reservation(&self, reservation_id: &ObjectId) -> Result<(), StoreError>;
}

pub struct MongoBookingStore {
    client: Arc<Client>,
}

impl MongoBookingStore {
    pub fn new(client: Arc<Client>) -> Self {
        MongoBookingStore { client }
    }

    fn listings(&self) -> Collection<Listing> {
        self.client.database("Wanderstay").collection("Listings")
    }

    fn reservations(&self) -> Collection<Reservation> {
        self.client.database("Wanderstay").collection("Reservations")
    }
}

impl BookingStore for MongoBookingStore {
    async fn get_listing(&self, listing_id: &ObjectId) -> Result<Option<Listing>, StoreError> {
        Ok(self.listings().find_one(doc! { "_id": *listing_id }).await?)
    }

    async fn reservations_for_listing(
        &self,
        listing_id: &ObjectId,
    ) -> Result<Vec<Reservation>, StoreError> {
        let cursor = self
            .reservations()
            .find(doc! { "listing_id": *listing_id })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<ObjectId, StoreError> {
        let result = self.reservations().insert_one(reservation).await?;
        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError("Inserted reservation has no ObjectId".to_string()))
    }

    async fn get_reservation(
        &self,
        reservation_id: &ObjectId,
    ) -> Result<Option<Reservation>, StoreError> {
        Ok(self
            .reservations()
            .find_one(doc! { "_id": *reservation_id })
            .await?)
    }

    async fn delete_reservation(&self, reservation_id: &ObjectId) -> Result<(), StoreError> {
        self.reservations()
            .delete_one(doc! { "_id": *reservation_id })
            .await?;
        Ok(())
    }
}
