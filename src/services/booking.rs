use bson::oid::ObjectId;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::reservation::Reservation;
use crate::services::availability::{is_available, DateRange};
use crate::services::pricing::PricingService;
use crate::services::store::{BookingStore, StoreError};

#[derive(Debug, PartialEq)]
pub enum BookingError {
    InvalidInput(String),
    ListingNotFound,
    ReservationNotFound,
    DateRangeUnavailable,
    Forbidden,
    Storage(String),
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            BookingError::ListingNotFound => write!(f, "Listing not found"),
            BookingError::ReservationNotFound => write!(f, "Reservation not found"),
            BookingError::DateRangeUnavailable => {
                write!(f, "Listing is not available for those dates")
            }
            BookingError::Forbidden => write!(f, "Forbidden"),
            BookingError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        BookingError::Storage(err.0)
    }
}

/// Reserving a listing: validate the range, load the listing and its
/// reservations, check availability, price the stay, persist.
///
/// The conflict check and the insert run under a per-listing mutex so two
/// concurrent requests cannot both observe the range as free. The lock
/// registry lives here because every reservation write in the crate goes
/// through this service.
pub struct BookingService<S> {
    store: S,
    listing_locks: DashMap<ObjectId, Arc<Mutex<()>>>,
}

impl<S: BookingStore> BookingService<S> {
    pub fn new(store: S) -> Self {
        BookingService {
            store,
            listing_locks: DashMap::new(),
        }
    }

    fn listing_lock(&self, listing_id: &ObjectId) -> Arc<Mutex<()>> {
        self.listing_locks
            .entry(*listing_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn book(
        &self,
        guest_id: ObjectId,
        listing_id: ObjectId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Reservation, BookingError> {
        if start_date >= end_date {
            return Err(BookingError::InvalidInput(
                "Start date must be before end date".to_string(),
            ));
        }

        let lock = self.listing_lock(&listing_id);
        let _guard = lock.lock().await;

        let listing = self
            .store
            .get_listing(&listing_id)
            .await?
            .ok_or(BookingError::ListingNotFound)?;

        let candidate = DateRange::new(start_date, end_date);
        let existing = self.store.reservations_for_listing(&listing_id).await?;
        let booked: Vec<DateRange> = existing
            .iter()
            .map(|r| DateRange::new(r.start_date, r.end_date))
            .collect();

        if !is_available(&booked, &candidate) {
            return Err(BookingError::DateRangeUnavailable);
        }

        let total_price = PricingService::total_price(listing.price, &candidate).ok_or_else(
            || BookingError::InvalidInput("Listing price does not yield a bookable total".to_string()),
        )?;

        let mut reservation = Reservation {
            id: None,
            listing_id,
            user_id: guest_id,
            start_date,
            end_date,
            total_price,
            created_at: Some(Utc::now()),
        };
        let id = self.store.insert_reservation(&reservation).await?;
        reservation.id = Some(id);
        Ok(reservation)
    }

    /// Cancellation is allowed to the guest who booked, or to the owner
    /// of the listing the reservation is against.
    pub async fn cancel(
        &self,
        actor_id: ObjectId,
        reservation_id: ObjectId,
    ) -> Result<Reservation, BookingError> {
        let reservation = self
            .store
            .get_reservation(&reservation_id)
            .await?
            .ok_or(BookingError::ReservationNotFound)?;

        if reservation.user_id != actor_id {
            let owns = match self.store.get_listing(&reservation.listing_id).await? {
                Some(listing) => listing.user_id == actor_id,
                None => false,
            };
            if !owns {
                return Err(BookingError::Forbidden);
            }
        }

        self.store.delete_reservation(&reservation_id).await?;
        Ok(reservation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::listing::Listing;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct InMemoryStore {
        listings: StdMutex<HashMap<ObjectId, Listing>>,
        reservations: StdMutex<Vec<Reservation>>,
    }

    impl InMemoryStore {
        fn new() -> Self {
            InMemoryStore {
                listings: StdMutex::new(HashMap::new()),
                reservations: StdMutex::new(Vec::new()),
            }
        }

        fn add_listing(&self, owner: ObjectId, price: i64) -> ObjectId {
            let id = ObjectId::new();
            let listing = Listing {
                id: Some(id),
                user_id: owner,
                title: "Test listing".to_string(),
                description: "A place".to_string(),
                image_src: String::new(),
                category: "Beach".to_string(),
                room_count: 1,
                bathroom_count: 1,
                guest_count: 2,
                location_value: "US".to_string(),
                price,
                created_at: Some(Utc::now()),
            };
            self.listings.lock().unwrap().insert(id, listing);
            id
        }

        fn reservation_count(&self) -> usize {
            self.reservations.lock().unwrap().len()
        }
    }

    impl BookingStore for InMemoryStore {
        async fn get_listing(&self, listing_id: &ObjectId) -> Result<Option<Listing>, StoreError> {
            Ok(self.listings.lock().unwrap().get(listing_id).cloned())
        }

        async fn reservations_for_listing(
            &self,
            listing_id: &ObjectId,
        ) -> Result<Vec<Reservation>, StoreError> {
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| &r.listing_id == listing_id)
                .cloned()
                .collect())
        }

        async fn insert_reservation(
            &self,
            reservation: &Reservation,
        ) -> Result<ObjectId, StoreError> {
            let id = ObjectId::new();
            let mut stored = reservation.clone();
            stored.id = Some(id);
            self.reservations.lock().unwrap().push(stored);
            Ok(id)
        }

        async fn get_reservation(
            &self,
            reservation_id: &ObjectId,
        ) -> Result<Option<Reservation>, StoreError> {
            Ok(self
                .reservations
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id.as_ref() == Some(reservation_id))
                .cloned())
        }

        async fn delete_reservation(&self, reservation_id: &ObjectId) -> Result<(), StoreError> {
            self.reservations
                .lock()
                .unwrap()
                .retain(|r| r.id.as_ref() != Some(reservation_id));
            Ok(())
        }
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, day).unwrap()
    }

    fn service_with_listing(price: i64) -> (BookingService<InMemoryStore>, ObjectId, ObjectId) {
        let owner = ObjectId::new();
        let store = InMemoryStore::new();
        let listing_id = store.add_listing(owner, price);
        (BookingService::new(store), listing_id, owner)
    }

    #[actix_rt::test]
    async fn non_overlapping_bookings_both_succeed() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest = ObjectId::new();

        service.book(guest, listing_id, d(3, 1), d(3, 3)).await.unwrap();
        service.book(guest, listing_id, d(3, 10), d(3, 12)).await.unwrap();
    }

    #[actix_rt::test]
    async fn overlapping_booking_is_rejected_without_writing() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest_a = ObjectId::new();
        let guest_b = ObjectId::new();

        service.book(guest_a, listing_id, d(3, 1), d(3, 5)).await.unwrap();
        let err = service
            .book(guest_b, listing_id, d(3, 4), d(3, 6))
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::DateRangeUnavailable);
        assert_eq!(service.store.reservation_count(), 1);
    }

    #[actix_rt::test]
    async fn back_to_back_checkout_checkin_succeeds() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest = ObjectId::new();

        service.book(guest, listing_id, d(3, 1), d(3, 5)).await.unwrap();
        service.book(guest, listing_id, d(3, 5), d(3, 8)).await.unwrap();
    }

    #[actix_rt::test]
    async fn booking_snapshots_total_price() {
        let (service, listing_id, _) = service_with_listing(50);
        let u = ObjectId::new();
        let v = ObjectId::new();

        let first = service.book(u, listing_id, d(3, 1), d(3, 5)).await.unwrap();
        assert_eq!(first.total_price, 200);

        let err = service.book(v, listing_id, d(3, 4), d(3, 6)).await.unwrap_err();
        assert_eq!(err, BookingError::DateRangeUnavailable);

        let second = service.book(v, listing_id, d(3, 5), d(3, 8)).await.unwrap();
        assert_eq!(second.total_price, 150);
    }

    #[actix_rt::test]
    async fn concurrent_overlapping_attempts_yield_one_reservation() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest_a = ObjectId::new();
        let guest_b = ObjectId::new();

        let (a, b) = futures::join!(
            service.book(guest_a, listing_id, d(3, 1), d(3, 5)),
            service.book(guest_b, listing_id, d(3, 3), d(3, 7)),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let failure = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
        assert_eq!(failure, BookingError::DateRangeUnavailable);
        assert_eq!(service.store.reservation_count(), 1);
    }

    #[actix_rt::test]
    async fn inverted_or_empty_range_is_invalid_input() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest = ObjectId::new();

        let err = service.book(guest, listing_id, d(3, 5), d(3, 5)).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput(_)));

        let err = service.book(guest, listing_id, d(3, 6), d(3, 5)).await.unwrap_err();
        assert!(matches!(err, BookingError::InvalidInput(_)));
        assert_eq!(service.store.reservation_count(), 0);
    }

    #[actix_rt::test]
    async fn booking_unknown_listing_fails() {
        let (service, _, _) = service_with_listing(100);
        let err = service
            .book(ObjectId::new(), ObjectId::new(), d(3, 1), d(3, 3))
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::ListingNotFound);
    }

    #[actix_rt::test]
    async fn guest_can_cancel_own_reservation() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest = ObjectId::new();

        let reservation = service.book(guest, listing_id, d(3, 1), d(3, 3)).await.unwrap();
        service.cancel(guest, reservation.id.unwrap()).await.unwrap();
        assert_eq!(service.store.reservation_count(), 0);
    }

    #[actix_rt::test]
    async fn listing_owner_can_cancel_guest_reservation() {
        let (service, listing_id, owner) = service_with_listing(100);
        let guest = ObjectId::new();

        let reservation = service.book(guest, listing_id, d(3, 1), d(3, 3)).await.unwrap();
        service.cancel(owner, reservation.id.unwrap()).await.unwrap();
        assert_eq!(service.store.reservation_count(), 0);
    }

    #[actix_rt::test]
    async fn third_party_cannot_cancel() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest = ObjectId::new();
        let stranger = ObjectId::new();

        let reservation = service.book(guest, listing_id, d(3, 1), d(3, 3)).await.unwrap();
        let err = service
            .cancel(stranger, reservation.id.unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::Forbidden);
        assert_eq!(service.store.reservation_count(), 1);
    }

    #[actix_rt::test]
    async fn cancelled_range_can_be_rebooked() {
        let (service, listing_id, _) = service_with_listing(100);
        let guest_a = ObjectId::new();
        let guest_b = ObjectId::new();

        let reservation = service.book(guest_a, listing_id, d(3, 1), d(3, 5)).await.unwrap();
        service.cancel(guest_a, reservation.id.unwrap()).await.unwrap();
        service.book(guest_b, listing_id, d(3, 2), d(3, 4)).await.unwrap();
    }

    #[actix_rt::test]
    async fn cancelling_unknown_reservation_fails() {
        let (service, _, _) = service_with_listing(100);
        let err = service
            .cancel(ObjectId::new(), ObjectId::new())
            .await
            .unwrap_err();
        assert_eq!(err, BookingError::ReservationNotFound);
    }
}
