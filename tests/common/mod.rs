use actix_web::{web, App};
use bson::oid::ObjectId;
use mongodb::options::ClientOptions;
use std::sync::Arc;
use std::time::Duration;

use wanderstay_api::middleware::auth::AuthMiddleware;
use wanderstay_api::routes;
use wanderstay_api::routes::account::auth::generate_token;
use wanderstay_api::services::booking::BookingService;
use wanderstay_api::services::store::MongoBookingStore;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
    booking: web::Data<BookingService<MongoBookingStore>>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

        // The driver connects lazily and these tests only exercise request
        // handling that fails before any query, so no live server is
        // required. Short timeouts keep accidental DB touches from hanging.
        let mut options = ClientOptions::parse(&mongo_uri)
            .await
            .expect("invalid test MongoDB URI");
        options.connect_timeout = Some(Duration::from_secs(1));
        options.server_selection_timeout = Some(Duration::from_secs(1));
        let client = Arc::new(
            mongodb::Client::with_options(options).expect("failed to build test client"),
        );

        let booking = web::Data::new(BookingService::new(MongoBookingStore::new(client.clone())));

        Self { client, booking }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(self.client.clone()))
            .app_data(self.booking.clone())
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/auth")
                            .route("/signup", web::post().to(routes::account::auth::signup))
                            .route("/signin", web::post().to(routes::account::auth::signin))
                            .service(
                                web::scope("").wrap(AuthMiddleware).route(
                                    "/session",
                                    web::get().to(routes::account::auth::user_session),
                                ),
                            ),
                    )
                    .service(
                        web::scope("/listings")
                            .route("", web::get().to(routes::listing::get_all))
                            .route(
                                "/{id}/reservations",
                                web::get().to(routes::reservation::get_for_listing),
                            )
                            .route("/{id}", web::get().to(routes::listing::get_by_id)),
                    )
                    .service(
                        web::scope("/account/{id}")
                            .wrap(AuthMiddleware)
                            .route("/trips", web::get().to(routes::account::trips::get_trips))
                            .route(
                                "/properties",
                                web::get().to(routes::account::trips::get_properties),
                            )
                            .route(
                                "/reservations/listing/{listing_id}",
                                web::post().to(routes::reservation::create),
                            )
                            .route(
                                "/reservations/{reservation_id}",
                                web::delete().to(routes::reservation::cancel),
                            )
                            .route(
                                "/reservations",
                                web::get().to(routes::account::trips::get_property_reservations),
                            )
                            .route("/listings", web::post().to(routes::listing::create))
                            .route(
                                "/listings/{listing_id}",
                                web::delete().to(routes::listing::delete),
                            )
                            .route(
                                "/favorites",
                                web::get().to(routes::account::favorites::get_favorites),
                            )
                            .service(
                                web::resource("/favorites/{listing_id}")
                                    .route(
                                        web::post().to(routes::account::favorites::add_favorite),
                                    )
                                    .route(
                                        web::delete()
                                            .to(routes::account::favorites::remove_favorite),
                                    ),
                            ),
                    ),
            )
    }
}

pub fn test_user_id() -> ObjectId {
    ObjectId::new()
}

/// Bearer header for a freshly minted token, using the same helper the
/// signup flow uses. Middleware and minting share the JWT_SECRET fallback,
/// so this works in the test environment without extra setup.
pub fn auth_header(user_id: ObjectId) -> String {
    let token =
        generate_token("test@example.com", user_id).expect("failed to mint test token");
    format!("Bearer {}", token)
}
