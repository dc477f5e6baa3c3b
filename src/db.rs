// connexion BD
//
// Le pool est créé une seule fois au démarrage puis injecté dans les
// handlers via web::Data (pas de singleton global).

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::env;

pub async fn establish_connection() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set in .env file");

    Database::connect(&database_url).await
}
