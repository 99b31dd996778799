use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions, ServerApi, ServerApiVersion},
    Client, IndexModel,
};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{reservation::Reservation, user::User};

pub async fn create_mongo_client(uri: &str) -> Arc<Client> {
    println!("Connecting to MongoDB: {}", uri);

    let mut client_options = ClientOptions::parse(uri)
        .await
        .expect("MongoDB URI may be incorrect! Failed to parse.");

    // Set a reasonable timeout for operations
    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client =
        Client::with_options(client_options).expect("Failed to create MongoDB client with options");

    match client
        .database("Wanderstay")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => println!("Successfully connected to MongoDB and verified with ping command"),
        Err(e) => {
            eprintln!("WARNING: Connected to MongoDB but ping test failed: {}", e);
            eprintln!("The API may still work, but some functionality might be impaired");
        }
    }

    Arc::new(client)
}

/// Indexes the handlers rely on: signup depends on the unique email index
/// to surface duplicate accounts as write error 11000, and the booking
/// workflow queries reservations by listing.
pub async fn ensure_indexes(client: &Client) {
    let db = client.database("Wanderstay");

    let email_index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();
    if let Err(e) = db.collection::<User>("Users").create_index(email_index).await {
        eprintln!("WARNING: Failed to create unique email index: {}", e);
    }

    let reservation_index = IndexModel::builder()
        .keys(doc! { "listing_id": 1, "start_date": 1 })
        .build();
    if let Err(e) = db
        .collection::<Reservation>("Reservations")
        .create_index(reservation_index)
        .await
    {
        eprintln!("WARNING: Failed to create reservation index: {}", e);
    }
}
