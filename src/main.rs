use actix_web::{web, App, HttpResponse, HttpServer};
use courseware::api::{
    create_course, create_professor, create_review, create_subscription, delete_review,
    delete_subscription, get_courses, get_notifications, get_professors, get_reviews_by_course,
    get_subscriptions, mark_notification_read, update_review, vote_review,
};
use courseware::db::Database;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let db_path = env::var("COURSEWARE_DB").unwrap_or_else(|_| "courseware.db".to_string());
    let addr = env::var("COURSEWARE_ADDR").unwrap_or_else(|_| "127.0.0.1:3004".to_string());

    // Initialize the database
    let db = Database::new(&db_path).unwrap();
    db.create_schema().await.unwrap(); // Ensure the schema is created
    info!("schema created successfully");
    info!("listening on http://{}", &addr);

    // Start the Actix Web server
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db.clone()))
            .service(
                web::scope("/api")
                    .route("/reviews", web::post().to(create_review))
                    .route("/reviews/{id}", web::put().to(update_review))
                    .route("/reviews/{id}", web::delete().to(delete_review))
                    .route("/reviews/{id}/vote", web::post().to(vote_review))
                    .route("/notifications", web::get().to(get_notifications))
                    .route(
                        "/notifications/{id}/read",
                        web::post().to(mark_notification_read),
                    )
                    .route("/subscriptions", web::get().to(get_subscriptions))
                    .route("/subscriptions", web::post().to(create_subscription))
                    .route("/subscriptions/{id}", web::delete().to(delete_subscription))
                    .route("/courses", web::get().to(get_courses))
                    .route("/courses", web::post().to(create_course))
                    .route("/courses/{code}/reviews", web::get().to(get_reviews_by_course))
                    .route("/professors", web::get().to(get_professors))
                    .route("/professors", web::post().to(create_professor)),
            )
            .service(web::resource("/").route(web::get().to(index)))
    })
    .bind(&addr)?
    .run()
    .await
}

// Define the index handler
async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Welcome to Courseware!")
}
