// biudzetas/src/web/routes.rs

use actix_web::web;

use crate::web::handlers::{account_handlers, auth_handlers, entry_handlers, reset_handlers};

// Called from `main.rs` (and the integration tests) to mount every page on the App.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .route("/health", web::get().to(account_handlers::health_check_handler))
    // Entries
    .service(
      web::resource("/")
        .route(web::get().to(entry_handlers::new_entry_form_handler))
        .route(web::post().to(entry_handlers::create_entry_handler)),
    )
    .route("/irasai", web::get().to(entry_handlers::list_entries_handler))
    .route("/delete/{id}", web::get().to(entry_handlers::delete_entry_handler))
    .service(
      web::resource("/irasas_update/{id}")
        .route(web::get().to(entry_handlers::edit_entry_form_handler))
        .route(web::post().to(entry_handlers::update_entry_handler)),
    )
    // Authentication
    .service(
      web::resource("/registruotis")
        .route(web::get().to(auth_handlers::register_form_handler))
        .route(web::post().to(auth_handlers::register_handler)),
    )
    .service(
      web::resource("/prisijungti")
        .route(web::get().to(auth_handlers::login_form_handler))
        .route(web::post().to(auth_handlers::login_handler)),
    )
    .route("/atsijungti", web::get().to(auth_handlers::logout_handler))
    .route("/paskyra", web::get().to(account_handlers::account_handler))
    // Password reset
    .service(
      web::resource("/reset_password")
        .route(web::get().to(reset_handlers::reset_request_form_handler))
        .route(web::post().to(reset_handlers::reset_request_handler)),
    )
    .service(
      web::resource("/reset_password/{token}")
        .route(web::get().to(reset_handlers::reset_token_form_handler))
        .route(web::post().to(reset_handlers::reset_password_handler)),
    );
}
