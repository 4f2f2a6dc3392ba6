use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::AuthService;
use crate::configuration::ApplicationSettings;
use crate::contacts::ContactStore;
use crate::email_client::EmailClient;
use crate::logger::LoggerMiddleware;
use crate::middleware::JwtMiddleware;
use crate::routes::{
    confirm_password_reset, create_contact, delete_contact, get_contact, get_current_user,
    health_check, list_contacts, login, refresh, request_password_reset, resend_verification,
    signup, update_contact, upcoming_birthdays, verify_email,
};

pub fn run(
    listener: TcpListener,
    auth_service: AuthService,
    contact_store: ContactStore,
    email_client: EmailClient,
    application: ApplicationSettings,
) -> Result<Server, std::io::Error> {
    let jwt_config = auth_service.jwt_settings().clone();
    let auth_service = web::Data::new(auth_service);
    let contact_store = web::Data::new(contact_store);
    let email_client = web::Data::new(email_client);
    let application = web::Data::new(application);

    let server = HttpServer::new(move || {
        App::new()
            // Global middleware
            .wrap(Logger::default())
            .wrap(LoggerMiddleware)

            // Shared state
            .app_data(auth_service.clone())
            .app_data(contact_store.clone())
            .app_data(email_client.clone())
            .app_data(application.clone())

            // Public routes (no authentication required)
            .route("/health_check", web::get().to(health_check))
            .route("/auth/signup", web::post().to(signup))
            .route("/auth/verify", web::get().to(verify_email))
            .route("/auth/resend_verification", web::post().to(resend_verification))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::post().to(refresh))
            .route("/auth/request_password_reset", web::post().to(request_password_reset))
            .route("/auth/confirm_password_reset", web::post().to(confirm_password_reset))

            // Protected routes (require a valid access token)
            .service(
                web::scope("/api")
                    .wrap(JwtMiddleware::new(jwt_config.clone()))
                    .route("/me", web::get().to(get_current_user))
                    .route("/contacts", web::get().to(list_contacts))
                    .route("/contacts", web::post().to(create_contact))
                    .route("/contacts/birthdays", web::get().to(upcoming_birthdays))
                    .route("/contacts/{id}", web::get().to(get_contact))
                    .route("/contacts/{id}", web::put().to(update_contact))
                    .route("/contacts/{id}", web::delete().to(delete_contact)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
