use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use wanderstay_api::db;
use wanderstay_api::middleware::auth::AuthMiddleware;
use wanderstay_api::routes;
use wanderstay_api::services::booking::BookingService;
use wanderstay_api::services::store::MongoBookingStore;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    db::mongo::ensure_indexes(&client).await;
    println!("MongoDB connection established");

    // One booking service per process: it owns the per-listing locks that
    // serialize concurrent reservation attempts.
    let booking_service = web::Data::new(BookingService::new(MongoBookingStore::new(
        client.clone(),
    )));

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(client.clone()))
            .app_data(booking_service.clone())
            .service(
                web::scope("/api")
                    // Public routes
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
                    // Protected routes
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
    })
    .bind((host, port))?
    .run()
    .await
}
