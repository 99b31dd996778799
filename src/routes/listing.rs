use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId, Document};
use futures::TryStreamExt;
use mongodb::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::{
    listing::{Listing, ListingInput},
    reservation::Reservation,
};

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub location_value: Option<String>,
    pub user_id: Option<String>,
    pub guest_count: Option<i32>,
    pub room_count: Option<i32>,
    pub bathroom_count: Option<i32>,
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/*
    /api/listings (browse with optional filters - public endpoint)
*/
pub async fn get_all(
    query: web::Query<ListingQuery>,
    data: web::Data<Arc<Client>>,
) -> impl Responder {
    let client = data.into_inner();
    let query = query.into_inner();
    let db = client.database("Wanderstay");

    let mut filter = Document::new();

    if let Some(category) = &query.category {
        filter.insert("category", category.as_str());
    }
    if let Some(location_value) = &query.location_value {
        filter.insert("location_value", location_value.as_str());
    }
    if let Some(user_id) = &query.user_id {
        match ObjectId::parse_str(user_id) {
            Ok(oid) => {
                filter.insert("user_id", oid);
            }
            Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
        }
    }
    if let Some(guest_count) = query.guest_count {
        filter.insert("guest_count", doc! { "$gte": guest_count });
    }
    if let Some(room_count) = query.room_count {
        filter.insert("room_count", doc! { "$gte": room_count });
    }
    if let Some(bathroom_count) = query.bathroom_count {
        filter.insert("bathroom_count", doc! { "$gte": bathroom_count });
    }

    // Date filtering: hide every listing that has a reservation colliding
    // with the requested stay.
    match (query.start_date, query.end_date) {
        (Some(start), Some(end)) => {
            if start >= end {
                return HttpResponse::BadRequest().body("Start date must be before end date");
            }

            let conflicting = db
                .collection::<Reservation>("Reservations")
                .find(doc! {
                    "start_date": { "$lt": end.to_string() },
                    "end_date": { "$gt": start.to_string() },
                })
                .await;

            match conflicting {
                Ok(cursor) => match cursor.try_collect::<Vec<Reservation>>().await {
                    Ok(reservations) => {
                        let booked_ids: Vec<ObjectId> =
                            reservations.iter().map(|r| r.listing_id).collect();
                        if !booked_ids.is_empty() {
                            filter.insert("_id", doc! { "$nin": booked_ids });
                        }
                    }
                    Err(err) => {
                        eprintln!("Failed to collect conflicting reservations: {:?}", err);
                        return HttpResponse::InternalServerError()
                            .body("Failed to retrieve listings");
                    }
                },
                Err(err) => {
                    eprintln!("Failed to query reservations: {:?}", err);
                    return HttpResponse::InternalServerError().body("Failed to retrieve listings");
                }
            }
        }
        (None, None) => {}
        _ => {
            return HttpResponse::BadRequest()
                .body("Both start_date and end_date are required for date filtering")
        }
    }

    let cursor = db
        .collection::<Listing>("Listings")
        .find(filter)
        .sort(doc! { "created_at": -1 })
        .limit(100)
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Listing>>().await {
            Ok(listings) => HttpResponse::Ok().json(listings),
            Err(err) => {
                eprintln!("Failed to collect listings: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to retrieve listings")
            }
        },
        Err(err) => {
            eprintln!("Failed to retrieve listings: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve listings")
        }
    }
}

/*
    /api/listings/{id}
*/
pub async fn get_by_id(path: web::Path<String>, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<Listing> =
        client.database("Wanderstay").collection("Listings");

    let id: ObjectId = match ObjectId::parse_str(path.into_inner().as_str()) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid listing ID"),
    };

    match collection.find_one(doc! { "_id": id }).await {
        Ok(Some(listing)) => HttpResponse::Ok().json(listing),
        Ok(None) => HttpResponse::NotFound().body("Listing not found"),
        Err(err) => {
            eprintln!("Failed to retrieve listing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to retrieve listing")
        }
    }
}

/*
    POST /api/account/{id}/listings (create listing - the rent flow submit)
*/
pub async fn create(
    data: web::Data<Arc<Client>>,
    input: web::Json<ListingInput>,
    path: web::Path<(String,)>,
    user: AuthenticatedUser,
) -> impl Responder {
    if path.into_inner().0 != user.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();
    let input = input.into_inner();

    if let Err(msg) = input.validate() {
        return HttpResponse::BadRequest().body(msg);
    }

    let owner_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let mut listing = Listing {
        id: None,
        user_id: owner_id,
        title: input.title,
        description: input.description,
        image_src: input.image_src,
        category: input.category,
        room_count: input.room_count,
        bathroom_count: input.bathroom_count,
        guest_count: input.guest_count,
        location_value: input.location_value,
        price: input.price,
        created_at: Some(chrono::Utc::now()),
    };

    let collection: mongodb::Collection<Listing> =
        client.database("Wanderstay").collection("Listings");

    match collection.insert_one(&listing).await {
        Ok(result) => {
            listing.id = result.inserted_id.as_object_id();
            HttpResponse::Ok().json(listing)
        }
        Err(err) => {
            eprintln!("Failed to create listing: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to create listing")
        }
    }
}

/*
    DELETE /api/account/{id}/listings/{listing_id} (owner only)

    Reservations against the listing are removed with it; guests see the
    cancellation through their trips view.
*/
pub async fn delete(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String, String)>,
    user: AuthenticatedUser,
) -> impl Responder {
    let (user_id, listing_id) = path.into_inner();
    if user_id != user.user_id {
        return HttpResponse::Forbidden().body("Forbidden");
    }

    let client = data.into_inner();

    let listing_oid = match ObjectId::parse_str(&listing_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid listing ID"),
    };

    let db = client.database("Wanderstay");
    let listings: mongodb::Collection<Listing> = db.collection("Listings");

    let listing = match listings.find_one(doc! { "_id": listing_oid }).await {
        Ok(Some(listing)) => listing,
        Ok(None) => return HttpResponse::NotFound().body("Listing not found"),
        Err(err) => {
            eprintln!("Failed to fetch listing: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to remove listing");
        }
    };

    if listing.user_id.to_string() != user.user_id {
        return HttpResponse::Forbidden().body("Only the owner may remove a listing");
    }

    if let Err(err) = listings.delete_one(doc! { "_id": listing_oid }).await {
        eprintln!("Failed to remove listing: {:?}", err);
        return HttpResponse::InternalServerError().body("Failed to remove listing");
    }

    if let Err(err) = db
        .collection::<Reservation>("Reservations")
        .delete_many(doc! { "listing_id": listing_oid })
        .await
    {
        eprintln!("Failed to remove reservations for listing: {:?}", err);
        return HttpResponse::InternalServerError()
            .body("Listing removed but its reservations could not be cleaned up");
    }

    HttpResponse::Ok().body("Listing removed")
}
