use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use utoipa::ToSchema;

use crate::data::contact::db::{ContactDbExt, ContactForm};
use crate::data::contact::ContactMessage;
use crate::resp::problem::Problem;

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactSubmitResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContactListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<ContactMessage>,
}

/// Public contact form. Returns an acknowledgment only, never the stored
/// entity.
#[utoipa::path(
    context_path = "/api/contact",
    request_body = ContactForm,
    responses(
        (status = 201, description = "Message stored", body = ContactSubmitResponse),
        (status = 400, description = "Validation failure", body = Problem),
    )
)]
#[post("/submit", format = "application/json", data = "<form>")]
#[tracing::instrument]
pub async fn contact_submit(
    form: Json<ContactForm>,
    db: &State<Database>,
) -> Result<(Status, Json<ContactSubmitResponse>), Problem> {
    let message = form.validate()?;

    db.create_message(&message).await?;

    Ok((
        Status::Created,
        Json(ContactSubmitResponse {
            success: true,
            message: "Message sent successfully! We will contact you soon.".to_string(),
        }),
    ))
}

/// Unpaginated public listing, newest first.
#[utoipa::path(
    context_path = "/api/contact",
    responses((status = 200, description = "All messages", body = ContactListResponse))
)]
#[get("/")]
#[tracing::instrument]
pub async fn contact_list(db: &State<Database>) -> Result<Json<ContactListResponse>, Problem> {
    let messages = db.all_messages().await?;

    Ok(Json(ContactListResponse {
        success: true,
        count: messages.len(),
        data: messages,
    }))
}
