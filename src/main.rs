mod db;
mod errors;
mod middleware;
mod models;
mod permissions;
mod routes;
mod services;
mod utils;

use actix_web::{App, HttpServer, web};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    println!("🔌 Connecting to database...");
    let db = db::establish_connection()
        .await
        .expect("Failed to connect to database");
    println!("✅ Database connected!");

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    println!("🚀 Starting server on http://127.0.0.1:{port}");

    let db = web::Data::new(db);

    HttpServer::new(move || {
        App::new()
            .app_data(db.clone())
            .configure(routes::configure_routes)
    })
    .bind(("127.0.0.1", port))?
    .run()
    .await
}
