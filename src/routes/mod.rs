mod auth;
mod contacts;
mod health_check;

pub use auth::{
    confirm_password_reset, get_current_user, login, refresh, request_password_reset,
    resend_verification, signup, verify_email,
};
pub use contacts::{
    create_contact, delete_contact, get_contact, list_contacts, update_contact,
    upcoming_birthdays,
};
pub use health_check::health_check;
