use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::WriteError;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::middleware::auth::Claims;
use crate::middleware::auth_context::AuthenticatedUser;
use crate::models::user::{User, UserSession};

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupInput {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SigninInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    auth_token: String,
}

pub async fn signup(data: web::Data<Arc<Client>>, input: web::Json<SignupInput>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Wanderstay").collection("Users");

    let input = input.into_inner();

    if !is_valid_email(&input.email) {
        return HttpResponse::BadRequest().body("Invalid email address");
    }
    if input.password.len() < 8 {
        return HttpResponse::BadRequest().body("Password must be at least 8 characters");
    }
    if input.name.trim().is_empty() {
        return HttpResponse::BadRequest().body("Name is required");
    }

    let hashed = match bcrypt::hash(&input.password, bcrypt::DEFAULT_COST) {
        Ok(hashed) => hashed,
        Err(err) => {
            eprintln!("Failed to hash password: {:?}", err);
            return HttpResponse::InternalServerError().body("Failed to create user");
        }
    };

    let curr_time = Utc::now();
    let user = User {
        id: None,
        email: input.email,
        password: hashed,
        name: Some(input.name),
        image: None,
        favorite_ids: Vec::new(),
        last_signin: None,
        created_at: Some(curr_time),
        updated_at: Some(curr_time),
    };

    match collection.insert_one(&user).await {
        Ok(result) => match result.inserted_id.as_object_id() {
            Some(user_id) => match generate_token(&user.email, user_id) {
                Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
            },
            None => HttpResponse::InternalServerError().body("Failed to create user"),
        },
        Err(err) => match *err.kind {
            mongodb::error::ErrorKind::Write(error_info) => match error_info {
                mongodb::error::WriteFailure::WriteError(WriteError { code, .. }) => {
                    if code == 11000 {
                        HttpResponse::Conflict().body("User already exists")
                    } else {
                        eprintln!("Error code: {}", code);
                        HttpResponse::InternalServerError().body("Failed to create user")
                    }
                }
                _ => HttpResponse::InternalServerError().body("Failed to create user"),
            },
            _ => HttpResponse::InternalServerError().body("Failed to create user"),
        },
    }
}

pub async fn signin(data: web::Data<Arc<Client>>, input: web::Json<SigninInput>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Wanderstay").collection("Users");

    let input = input.into_inner();
    let filter = doc! { "email": &input.email };

    match collection.find_one(filter).await {
        Ok(Some(user)) => {
            if bcrypt::verify(&input.password, &user.password).unwrap_or(false) {
                let update = doc! {
                    "$set": { "last_signin": Utc::now().to_rfc3339() }
                };

                if let Err(err) = collection
                    .update_one(doc! { "email": &input.email }, update)
                    .await
                {
                    eprintln!("Failed to record signin time: {:?}", err);
                }

                let user_id = match user.id {
                    Some(id) => id,
                    None => {
                        eprintln!("User document for {} has no id", input.email);
                        return HttpResponse::InternalServerError().body("Failed to sign in");
                    }
                };

                match generate_token(&user.email, user_id) {
                    Ok(token) => HttpResponse::Ok().json(TokenResponse { auth_token: token }),
                    Err(_) => HttpResponse::InternalServerError().body("Token generation failed"),
                }
            } else {
                HttpResponse::Unauthorized().body("Invalid credentials")
            }
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Database error: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to process signin")
        }
    }
}

pub async fn user_session(user: AuthenticatedUser, data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection: mongodb::Collection<User> = client.database("Wanderstay").collection("Users");

    let user_id = match ObjectId::parse_str(&user.user_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid user ID"),
    };

    match collection.find_one(doc! { "_id": user_id }).await {
        Ok(Some(user)) => {
            let session = UserSession {
                id: user.id.unwrap_or_default(),
                email: user.email,
                name: user.name.unwrap_or_default(),
                image: user.image,
                favorite_ids: user.favorite_ids,
                created_at: user.created_at.unwrap_or_default(),
            };
            HttpResponse::Ok().json(session)
        }
        Ok(None) => HttpResponse::NotFound().body("User not found"),
        Err(err) => {
            eprintln!("Failed to fetch user: {:?}", err);
            HttpResponse::InternalServerError().body("Failed to fetch user")
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]*[a-zA-Z0-9])?)*$",
    );
    match re {
        Ok(re) => re.is_match(email),
        Err(_) => false,
    }
}

pub fn generate_token(email: &str, user_id: ObjectId) -> Result<String, jsonwebtoken::errors::Error> {
    let secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| "default_secret".to_string());
    let now = Utc::now();

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        user_id: user_id.to_string(),
    };

    let header = Header::new(Algorithm::HS256);
    encode(&header, &claims, &EncodingKey::from_secret(secret.as_ref()))
}
