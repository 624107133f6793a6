use mongodb::Database;
use rocket::form::Form;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::student::db::problem as student_problem;
use crate::data::student::db::{generate_registration_no, RegistrationForm, StudentDbExt};
use crate::data::student::{Documents, RegistrationStatus, Student};
use crate::media::MediaStore;
use crate::resp::problem::{problems, Problem};
use crate::route::StatusUpdate;

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub data: Student,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Student>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentResponse {
    pub success: bool,
    pub data: Student,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentStatusResponse {
    pub success: bool,
    pub message: String,
    pub data: Student,
}

/// Create a registration from the public admission form. Uploads are
/// stored before the entity write; an upload failure aborts the whole
/// registration.
#[utoipa::path(
    context_path = "/api/students",
    responses(
        (status = 201, description = "Registration accepted", body = RegisterResponse),
        (status = 400, description = "Validation failure or duplicate email/Aadhar", body = Problem),
    )
)]
#[post("/register", data = "<form>")]
#[tracing::instrument(skip(form, db, media))]
pub async fn student_register(
    mut form: Form<RegistrationForm<'_>>,
    db: &State<Database>,
    media: &State<MediaStore>,
) -> Result<(Status, Json<RegisterResponse>), Problem> {
    let registration = form.validate()?;

    let mut documents = Documents::default();
    if let Some(photo) = form.photo.as_mut() {
        documents.photo = Some(media.store(photo, "photo").await?);
    }
    if let Some(signature) = form.signature.as_mut() {
        documents.signature = Some(media.store(signature, "signature").await?);
    }

    let student = registration.into_student(generate_registration_no(), documents);
    db.create_student(&student).await?;

    tracing::info!("registered student {}", student.registration_no);

    Ok((
        Status::Created,
        Json(RegisterResponse {
            success: true,
            message: "Registration successful! We will contact you soon.".to_string(),
            data: student,
        }),
    ))
}

/// Unpaginated public listing, newest first.
#[utoipa::path(
    context_path = "/api/students",
    responses((status = 200, description = "All registrations", body = StudentListResponse))
)]
#[get("/")]
#[tracing::instrument]
pub async fn student_list(db: &State<Database>) -> Result<Json<StudentListResponse>, Problem> {
    let students = db.all_students().await?;

    Ok(Json(StudentListResponse {
        success: true,
        count: students.len(),
        data: students,
    }))
}

#[utoipa::path(
    context_path = "/api/students",
    responses(
        (status = 200, description = "Registration details", body = StudentResponse),
        (status = 404, description = "Unknown id", body = Problem),
    )
)]
#[get("/<id>")]
#[tracing::instrument]
pub async fn student_get(id: &str, db: &State<Database>) -> Result<Json<StudentResponse>, Problem> {
    let id = parse_id(id)?;

    let student = db
        .get_student(id)
        .await?
        .ok_or_else(student_problem::not_found)?;

    Ok(Json(StudentResponse {
        success: true,
        data: student,
    }))
}

/// Ungated status relabel. Duplicates the admin-gated route without an
/// authorization check; kept as-is until the intent is confirmed.
#[utoipa::path(
    context_path = "/api/students",
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = StudentStatusResponse),
        (status = 400, description = "Value outside the status enumeration", body = Problem),
    )
)]
#[patch("/<id>/status", format = "application/json", data = "<update>")]
#[tracing::instrument]
pub async fn student_set_status(
    id: &str,
    update: Json<StatusUpdate>,
    db: &State<Database>,
) -> Result<Json<StudentStatusResponse>, Problem> {
    let id = parse_id(id)?;
    let status: RegistrationStatus = update
        .status
        .as_deref()
        .and_then(|it| it.parse().ok())
        .ok_or_else(problems::invalid_status)?;

    let student = db
        .set_student_status(id, status)
        .await?
        .ok_or_else(student_problem::not_found)?;

    Ok(Json(StudentStatusResponse {
        success: true,
        message: "Status updated successfully".to_string(),
        data: student,
    }))
}

pub(super) fn parse_id(id: &str) -> Result<Uuid, Problem> {
    Uuid::parse_str(id).map_err(|_| problems::invalid_id())
}
