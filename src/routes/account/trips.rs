use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::Client;
use std::collections::HashMap;
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::{
    listing::Listing,
    reservation::{Reservation, ReservationWithListing},
};

/// Reservations the caller made as a guest, newest first, each joined
/// with its listing.
pub async fn get_trips(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    user: AuthenticatedUser,
) -> impl Responder {
    if path.into_inner().0 != user.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let user_oid = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let reservations = client
        .database("Wanderstay")
        .collection::<Reservation>("Reservations")
        .find(doc! { "user_id": user_oid })
        .sort(doc! { "created_at": -1 })
        .await;

    match reservations {
        Ok(cursor) => match cursor.try_collect::<Vec<Reservation>>().await {
            Ok(reservations) => match attach_listings(&client, reservations).await {
                Ok(trips) => HttpResponse::Ok().json(trips),
                Err(err) => {
                    eprintln!("Failed to join listings onto trips: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to fetch trips")
                }
            },
            Err(err) => {
                eprintln!("Failed to collect trips: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch trips")
            }
        },
        Err(err) => {
            eprintln!("Failed to fetch trips: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch trips")
        }
    }
}

/// Listings the caller owns, newest first.
pub async fn get_properties(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    user: AuthenticatedUser,
) -> impl Responder {
    if path.into_inner().0 != user.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let user_oid = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let cursor = client
        .database("Wanderstay")
        .collection::<Listing>("Listings")
        .find(doc! { "user_id": user_oid })
        .sort(doc! { "created_at": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Listing>>().await {
            Ok(properties) => HttpResponse::Ok().json(properties),
            Err(err) => {
                eprintln!("Failed to collect properties: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch properties")
            }
        },
        Err(err) => {
            eprintln!("Failed to fetch properties: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch properties")
        }
    }
}

/// The host view: every reservation guests hold on the caller's listings.
pub async fn get_property_reservations(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    user: AuthenticatedUser,
) -> impl Responder {
    if path.into_inner().0 != user.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let user_oid = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let db = client.database("Wanderstay");

    let listing_ids: Vec<ObjectId> = match db
        .collection::<Listing>("Listings")
        .find(doc! { "user_id": user_oid })
        .await
    {
        Ok(cursor) => match cursor.try_collect::<Vec<Listing>>().await {
            Ok(listings) => listings.into_iter().filter_map(|l| l.id).collect(),
            Err(err) => {
                eprintln!("Failed to collect listings: {:?}", err);
                return HttpResponse::InternalServerError().body("Failed to fetch reservations");
            }
        },
        Err(err) => {
            eprintln!("Failed to fetch listings: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch reservations");
        }
    };

    if listing_ids.is_empty() {
        return HttpResponse::Ok().json(Vec::<ReservationWithListing>::new());
    }

    let reservations = db
        .collection::<Reservation>("Reservations")
        .find(doc! { "listing_id": { "$in": listing_ids } })
        .sort(doc! { "created_at": -1 })
        .await;

    match reservations {
        Ok(cursor) => match cursor.try_collect::<Vec<Reservation>>().await {
            Ok(reservations) => match attach_listings(&client, reservations).await {
                Ok(joined) => HttpResponse::Ok().json(joined),
                Err(err) => {
                    eprintln!("Failed to join listings onto reservations: {:?}", err);
                    HttpResponse::InternalServerError().body("Failed to fetch reservations")
                }
            },
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

async fn attach_listings(
    client: &Client,
    reservations: Vec<Reservation>,
) -> Result<Vec<ReservationWithListing>, mongodb::error::Error> {
    if reservations.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<ObjectId> = reservations.iter().map(|r| r.listing_id).collect();
    let listings: Vec<Listing> = client
        .database("Wanderstay")
        .collection::<Listing>("Listings")
        .find(doc! { "_id": { "$in": ids } })
        .await?
        .try_collect()
        .await?;

    let by_id: HashMap<ObjectId, Listing> = listings
        .into_iter()
        .filter_map(|listing| listing.id.map(|id| (id, listing)))
        .collect();

    // Listing deletion cascades to reservations, so a missing listing here
    // means the join raced a delete; drop the row rather than 500.
    Ok(reservations
        .into_iter()
        .filter_map(|reservation| {
            by_id
                .get(&reservation.listing_id)
                .cloned()
                .map(|listing| ReservationWithListing {
                    reservation,
                    listing,
                })
        })
        .collect())
}
