use actix_web::{web, HttpResponse, Responder};
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::Client;
use std::sync::Arc;

use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::{listing::Listing, user::User};

/// Favorites live as a set of listing ids on the user document, so both
/// halves of the toggle are idempotent ($addToSet / $pull).
pub async fn add_favorite(
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
    let user_oid = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    // Verify the listing exists before bookmarking it
    let listings: mongodb::Collection<Listing> =
        client.database("Wanderstay").collection("Listings");
    match listings.find_one(doc! { "_id": listing_oid }).await {
        Ok(Some(_)) => {}
        Ok(None) => return HttpResponse::NotFound().body("Listing not found"),
        Err(err) => {
            eprintln!("Failed to check listing: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to add favorite");
        }
    }

    let users: mongodb::Collection<User> = client.database("Wanderstay").collection("Users");
    let update = doc! { "$addToSet": { "favorite_ids": listing_oid } };

    match users.update_one(doc! { "_id": user_oid }, update).await {
        Ok(result) => {
            if result.matched_count == 0 {
                return HttpResponse::NotFound().body("User not found");
            }
            HttpResponse::Ok().body("Listing added to favorites")
        }
        Err(err) => {
            eprintln!("Failed to add favorite: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to add favorite")
        }
    }
}

pub async fn remove_favorite(
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
    let user_oid = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    let users: mongodb::Collection<User> = client.database("Wanderstay").collection("Users");
    let update = doc! { "$pull": { "favorite_ids": listing_oid } };

    match users.update_one(doc! { "_id": user_oid }, update).await {
        Ok(result) => {
            if result.matched_count == 0 {
                return HttpResponse::NotFound().body("User not found");
            }
            HttpResponse::Ok().body("Removed favorite")
        }
        Err(err) => {
            eprintln!("Failed to remove favorite: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to remove favorite")
        }
    }
}

pub async fn get_favorites(
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

    let users: mongodb::Collection<User> = client.database("Wanderstay").collection("Users");
    let favorite_ids = match users.find_one(doc! { "_id": user_oid }).await {
        Ok(Some(user)) => user.favorite_ids,
        Ok(None) => return HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to fetch favorites");
        }
    };

    if favorite_ids.is_empty() {
        return HttpResponse::Ok().json(Vec::<Listing>::new());
    }

    let listings: mongodb::Collection<Listing> =
        client.database("Wanderstay").collection("Listings");
    let cursor = listings
        .find(doc! { "_id": { "$in": favorite_ids } })
        .sort(doc! { "created_at": -1 })
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<Listing>>().await {
            Ok(favorites) => HttpResponse::Ok().json(favorites),
            Err(err) => {
                eprintln!("Failed to collect favorites: {:?}", err);
                HttpResponse::InternalServerError().body("Failed to fetch favorites")
            }
        },
        Err(err) => {
            eprintln!("Failed to fetch favorites: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch favorites")
        }
    }
}
