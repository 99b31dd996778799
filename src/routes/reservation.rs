use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::Client;
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::reservation::{BookedRange, Reservation, ReservationInput};
use crate::services::booking::{BookingError, BookingService};
use crate::services::store::MongoBookingStore;

fn error_response(err: BookingError) -> HttpResponse {
    match err {
        BookingError::InvalidInput(msg) => HttpResponse::BadRequest().body(msg),
        BookingError::ListingNotFound => HttpResponse::NotFound().body("Listing not found"),
        BookingError::ReservationNotFound => {
            HttpResponse::NotFound().body("Reservation not found")
        }
        BookingError::DateRangeUnavailable => {
            HttpResponse::Conflict().body("Listing is not available for those dates")
        }
        BookingError::Forbidden => HttpResponse::Forbidden().body("Forbidden"),
        BookingError::Storage(msg) => {
            eprintln!("Storage failure in booking workflow: {}", msg);
            HttpResponse::InternalServerError().body("Failed to process reservation")
        }
    }
}

/*
    POST /api/account/{id}/reservations/listing/{listing_id}
*/
pub async fn create(
    service: web::Data<BookingService<MongoBookingStore>>,
    input: web::Json<ReservationInput>,
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
) -> impl Responder {
    let (user_id, listing_id) = path.into_inner();
    if user_id != user.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let guest_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };
    let listing_oid = match ObjectId::parse_str(&listing_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid listing ID"),
    };

    let input = input.into_inner();

    match service
        .book(guest_id, listing_oid, input.start_date, input.end_date)
        .await
    {
        Ok(reservation) => HttpResponse::Ok().json(reservation),
        Err(err) => error_response(err),
    }
}

/*
    DELETE /api/account/{id}/reservations/{reservation_id}

    Allowed to the guest who booked, or to the owner of the listing.
*/
pub async fn cancel(
    service: web::Data<BookingService<MongoBookingStore>>,
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
) -> impl Responder {
    let (user_id, reservation_id) = path.into_inner();
    if user_id != user.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let actor_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };
    let reservation_oid = match ObjectId::parse_str(&reservation_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid reservation ID"),
    };

    match service.cancel(actor_id, reservation_oid).await {
        Ok(reservation) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "cancelled": reservation,
        })),
        Err(err) => error_response(err),
    }
}

/*
    GET /api/listings/{id}/reservations (public - feeds the date picker)
*/
pub async fn get_for_listing(
    path: web::Path<String>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();

    let listing_oid = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid listing ID"),
    };

    let cursor = client
        .database("Wanderstay")
        .collection::<Reservation>("Reservations")
        .find(doc! { "listing_id": listing_oid })
        .sort(doc! { "start_date": 1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Reservation>>().await {
            Ok(reservations) => {
                let ranges: Vec<BookedRange> = reservations
                    .into_iter()
                    .map(|r| BookedRange {
                        start_date: r.start_date,
                        end_date: r.end_date,
                    })
                    .collect();
                HttpResponse::Ok().json(ranges)
            }
            Err(err) => {
                eprintln!("Failed to collect reservations: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch reservations")
            }
        },
        Err(err) => {
            eprintln!("Failed to fetch reservations: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch reservations")
        }
    }
}
