/// Contacts Routes
///
/// Owner-scoped CRUD behind the access-token middleware. The owning user
/// is always taken from the validated claims, never from the request
/// body.

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::auth::Claims;
use crate::contacts::{ContactData, ContactFilter, ContactStore};
use crate::error::AppError;

/// Days ahead the birthday listing looks, today included
const BIRTHDAY_LOOKAHEAD_DAYS: i64 = 7;

/// GET /api/contacts
///
/// List the user's contacts, optionally filtered by first name, last
/// name, or email (exact match on any provided field).
pub async fn list_contacts(
    claims: web::ReqData<Claims>,
    filter: web::Query<ContactFilter>,
    store: web::Data<ContactStore>,
) -> Result<HttpResponse, AppError> {
    let contacts = store.list(&claims.sub, &filter);
    Ok(HttpResponse::Ok().json(contacts))
}

/// POST /api/contacts
pub async fn create_contact(
    claims: web::ReqData<Claims>,
    form: web::Json<ContactData>,
    store: web::Data<ContactStore>,
) -> Result<HttpResponse, AppError> {
    let contact = store.create(&claims.sub, form.into_inner());

    tracing::info!(contact_id = %contact.id, "Contact created");
    Ok(HttpResponse::Created().json(contact))
}

/// GET /api/contacts/{id}
pub async fn get_contact(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    store: web::Data<ContactStore>,
) -> Result<HttpResponse, AppError> {
    let contact = store
        .get(&claims.sub, *path)
        .ok_or_else(|| AppError::NotFound("contact".to_string()))?;
    Ok(HttpResponse::Ok().json(contact))
}

/// PUT /api/contacts/{id}
pub async fn update_contact(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    form: web::Json<ContactData>,
    store: web::Data<ContactStore>,
) -> Result<HttpResponse, AppError> {
    let contact = store
        .update(&claims.sub, *path, form.into_inner())
        .ok_or_else(|| AppError::NotFound("contact".to_string()))?;
    Ok(HttpResponse::Ok().json(contact))
}

/// DELETE /api/contacts/{id}
pub async fn delete_contact(
    claims: web::ReqData<Claims>,
    path: web::Path<Uuid>,
    store: web::Data<ContactStore>,
) -> Result<HttpResponse, AppError> {
    if !store.delete(&claims.sub, *path) {
        return Err(AppError::NotFound("contact".to_string()));
    }
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/contacts/birthdays
///
/// Contacts with a birthday in the next 7 days, soonest first.
pub async fn upcoming_birthdays(
    claims: web::ReqData<Claims>,
    store: web::Data<ContactStore>,
) -> Result<HttpResponse, AppError> {
    let today = chrono::Utc::now().date_naive();
    let contacts = store.upcoming_birthdays(&claims.sub, today, BIRTHDAY_LOOKAHEAD_DAYS);
    Ok(HttpResponse::Ok().json(contacts))
}
