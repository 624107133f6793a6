use bson::doc;
use chrono::{Duration, Utc};
use mongodb::Database;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use utoipa::ToSchema;

use crate::config::Config;
use crate::data::contact::db::problem as contact_problem;
use crate::data::contact::db::{filter as contact_filter, ContactDbExt};
use crate::data::contact::{ContactMessage, MessageStatus};
use crate::data::student::db::problem as student_problem;
use crate::data::student::db::{filter as student_filter, StudentDbExt};
use crate::data::student::{RegistrationStatus, Student};
use crate::identity::AdminDirectory;
use crate::middleware::paging::PageState;
use crate::resp::jwt::AdminToken;
use crate::resp::problem::{problems, Problem};
use crate::route::students::parse_id;
use crate::route::StatusUpdate;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminInfo {
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub admin: AdminInfo,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyResponse {
    pub success: bool,
    pub admin: AdminInfo,
}

/// Exchange seeded admin credentials for a 7-day bearer token.
#[utoipa::path(
    context_path = "/api/admin",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 400, description = "Missing credentials", body = Problem),
        (status = 401, description = "Credential mismatch", body = Problem),
    )
)]
#[post("/login", format = "application/json", data = "<login>")]
#[tracing::instrument(skip(login, config))]
pub async fn admin_login(
    login: Json<LoginRequest>,
    config: &State<Config>,
) -> Result<Json<LoginResponse>, Problem> {
    let (username, password) = match (login.username.as_deref(), login.password.as_deref()) {
        (Some(username), Some(password)) => (username, password),
        _ => {
            return Err(Problem::new(
                Status::BadRequest,
                "Please provide username and password",
            ))
        }
    };

    let identity = config
        .verify_admin(username, password)
        .ok_or_else(|| Problem::new(Status::Unauthorized, "Invalid credentials"))?;

    let token = AdminToken::new(identity).encode_jwt(&config.jwt_secret)?;
    tracing::info!("issued admin token for {}", identity.username);

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        admin: AdminInfo {
            username: identity.username.clone(),
            email: identity.email.clone(),
            role: "admin".to_string(),
        },
    }))
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    responses(
        (status = 200, description = "Token is valid", body = VerifyResponse),
        (status = 401, description = "Missing, invalid or expired token", body = Problem),
    )
)]
#[get("/verify")]
#[tracing::instrument(skip(auth))]
pub async fn admin_verify(
    auth: Result<AdminToken, Problem>,
) -> Result<Json<VerifyResponse>, Problem> {
    let claims = auth?;

    Ok(Json(VerifyResponse {
        success: true,
        admin: AdminInfo {
            username: claims.username,
            email: claims.email,
            role: claims.role,
        },
    }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentCounts {
    pub total: u64,
    pub pending: u64,
    pub approved: u64,
    pub rejected: u64,
    /// Registrations created within the trailing 7 days.
    pub recent: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageCounts {
    pub total: u64,
    pub new: u64,
    pub in_progress: u64,
    pub resolved: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub students: StudentCounts,
    pub messages: MessageCounts,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: DashboardStats,
}

/// Independent aggregate counts; no cross-entity joins.
#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    responses((status = 200, description = "Dashboard counts", body = StatsResponse))
)]
#[get("/dashboard/stats")]
#[tracing::instrument(skip(auth))]
pub async fn dashboard_stats(
    auth: Result<AdminToken, Problem>,
    db: &State<Database>,
) -> Result<Json<StatsResponse>, Problem> {
    auth?;

    let seven_days_ago = Utc::now() - Duration::days(7);
    let recent_filter = doc! { "createdAt": { "$gte": bson::to_bson(&seven_days_ago)? } };

    let students = StudentCounts {
        total: db.count_students(doc! {}).await?,
        pending: db
            .count_students(student_filter::by_status("Pending"))
            .await?,
        approved: db
            .count_students(student_filter::by_status("Approved"))
            .await?,
        rejected: db
            .count_students(student_filter::by_status("Rejected"))
            .await?,
        recent: db.count_students(recent_filter).await?,
    };

    let messages = MessageCounts {
        total: db.count_messages(doc! {}).await?,
        new: db.count_messages(contact_filter::by_status("New")).await?,
        in_progress: db
            .count_messages(contact_filter::by_status("In Progress"))
            .await?,
        resolved: db
            .count_messages(contact_filter::by_status("Resolved"))
            .await?,
    };

    Ok(Json(StatsResponse {
        success: true,
        stats: DashboardStats { students, messages },
    }))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminStudentListResponse {
    pub success: bool,
    pub students: Vec<Student>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total_students: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStudentResponse {
    pub success: bool,
    pub student: Student,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStudentStatusResponse {
    pub success: bool,
    pub message: String,
    pub student: Student,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    pub success: bool,
    pub message: String,
}

/// Paginated, filtered, searched registration list for the dashboard.
#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "page size"),
        ("status" = Option<String>, Query, description = "exact status, or 'all'"),
        ("course" = Option<String>, Query, description = "exact course code, or 'all'"),
        ("search" = Option<String>, Query, description = "case-insensitive substring"),
    ),
    responses((status = 200, description = "Page of registrations", body = AdminStudentListResponse))
)]
#[get("/students?<status>&<course>&<search>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_student_list(
    auth: Result<AdminToken, Problem>,
    status: Option<&str>,
    course: Option<&str>,
    search: Option<&str>,
    page: PageState,
    db: &State<Database>,
) -> Result<Json<AdminStudentListResponse>, Problem> {
    auth?;

    let query = student_filter::admin_query(status, course, search);
    let (students, count) = db.list_students(query, page).await?;

    Ok(Json(AdminStudentListResponse {
        success: true,
        students,
        total_pages: page.total_pages(count),
        current_page: page.page,
        total_students: count,
    }))
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    responses(
        (status = 200, description = "Registration details", body = AdminStudentResponse),
        (status = 404, description = "Unknown id", body = Problem),
    )
)]
#[get("/students/<id>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_student_get(
    auth: Result<AdminToken, Problem>,
    id: &str,
    db: &State<Database>,
) -> Result<Json<AdminStudentResponse>, Problem> {
    auth?;
    let id = parse_id(id)?;

    let student = db
        .get_student(id)
        .await?
        .ok_or_else(student_problem::not_found)?;

    Ok(Json(AdminStudentResponse {
        success: true,
        student,
    }))
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = AdminStudentStatusResponse),
        (status = 400, description = "Value outside the status enumeration", body = Problem),
    )
)]
#[patch("/students/<id>/status", format = "application/json", data = "<update>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_student_set_status(
    auth: Result<AdminToken, Problem>,
    id: &str,
    update: Json<StatusUpdate>,
    db: &State<Database>,
) -> Result<Json<AdminStudentStatusResponse>, Problem> {
    auth?;
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

    Ok(Json(AdminStudentStatusResponse {
        success: true,
        message: "Student status updated successfully".to_string(),
        student,
    }))
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    responses(
        (status = 200, description = "Registration removed", body = AckResponse),
        (status = 404, description = "Unknown id", body = Problem),
    )
)]
#[delete("/students/<id>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_student_delete(
    auth: Result<AdminToken, Problem>,
    id: &str,
    db: &State<Database>,
) -> Result<Json<AckResponse>, Problem> {
    auth?;
    let id = parse_id(id)?;

    db.delete_student(id)
        .await?
        .ok_or_else(student_problem::not_found)?;

    Ok(Json(AckResponse {
        success: true,
        message: "Student deleted successfully".to_string(),
    }))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminMessageListResponse {
    pub success: bool,
    pub messages: Vec<ContactMessage>,
    pub total_pages: u64,
    pub current_page: u64,
    pub total_messages: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminMessageResponse {
    pub success: bool,
    pub message: ContactMessage,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminMessageStatusResponse {
    pub success: bool,
    pub message: String,
    pub data: ContactMessage,
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    params(
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("limit" = Option<u64>, Query, description = "page size"),
        ("status" = Option<String>, Query, description = "exact status, or 'all'"),
        ("search" = Option<String>, Query, description = "case-insensitive substring"),
    ),
    responses((status = 200, description = "Page of messages", body = AdminMessageListResponse))
)]
#[get("/messages?<status>&<search>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_message_list(
    auth: Result<AdminToken, Problem>,
    status: Option<&str>,
    search: Option<&str>,
    page: PageState,
    db: &State<Database>,
) -> Result<Json<AdminMessageListResponse>, Problem> {
    auth?;

    let query = contact_filter::admin_query(status, search);
    let (messages, count) = db.list_messages(query, page).await?;

    Ok(Json(AdminMessageListResponse {
        success: true,
        messages,
        total_pages: page.total_pages(count),
        current_page: page.page,
        total_messages: count,
    }))
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    responses(
        (status = 200, description = "Message details", body = AdminMessageResponse),
        (status = 404, description = "Unknown id", body = Problem),
    )
)]
#[get("/messages/<id>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_message_get(
    auth: Result<AdminToken, Problem>,
    id: &str,
    db: &State<Database>,
) -> Result<Json<AdminMessageResponse>, Problem> {
    auth?;
    let id = parse_id(id)?;

    let message = db
        .get_message(id)
        .await?
        .ok_or_else(contact_problem::not_found)?;

    Ok(Json(AdminMessageResponse {
        success: true,
        message,
    }))
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    request_body = StatusUpdate,
    responses(
        (status = 200, description = "Status updated", body = AdminMessageStatusResponse),
        (status = 400, description = "Value outside the status enumeration", body = Problem),
    )
)]
#[patch("/messages/<id>/status", format = "application/json", data = "<update>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_message_set_status(
    auth: Result<AdminToken, Problem>,
    id: &str,
    update: Json<StatusUpdate>,
    db: &State<Database>,
) -> Result<Json<AdminMessageStatusResponse>, Problem> {
    auth?;
    let id = parse_id(id)?;
    let status: MessageStatus = update
        .status
        .as_deref()
        .and_then(|it| it.parse().ok())
        .ok_or_else(problems::invalid_status)?;

    let message = db
        .set_message_status(id, status)
        .await?
        .ok_or_else(contact_problem::not_found)?;

    Ok(Json(AdminMessageStatusResponse {
        success: true,
        message: "Message status updated successfully".to_string(),
        data: message,
    }))
}

#[utoipa::path(
    context_path = "/api/admin",
    security(("jwt" = [])),
    responses(
        (status = 200, description = "Message removed", body = AckResponse),
        (status = 404, description = "Unknown id", body = Problem),
    )
)]
#[delete("/messages/<id>")]
#[tracing::instrument(skip(auth))]
pub async fn admin_message_delete(
    auth: Result<AdminToken, Problem>,
    id: &str,
    db: &State<Database>,
) -> Result<Json<AckResponse>, Problem> {
    auth?;
    let id = parse_id(id)?;

    db.delete_message(id)
        .await?
        .ok_or_else(contact_problem::not_found)?;

    Ok(Json(AckResponse {
        success: true,
        message: "Message deleted successfully".to_string(),
    }))
}
