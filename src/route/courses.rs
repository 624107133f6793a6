use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use utoipa::ToSchema;

use crate::data::course::db::problem as course_problem;
use crate::data::course::db::CourseDbExt;
use crate::data::course::Course;
use crate::resp::problem::Problem;

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Course>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CourseResponse {
    pub success: bool,
    pub data: Course,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SeedResponse {
    pub success: bool,
    pub message: String,
    pub count: usize,
}

/// Active catalog entries only; deactivated courses stay hidden.
#[utoipa::path(
    context_path = "/api/courses",
    responses((status = 200, description = "Active catalog", body = CourseListResponse))
)]
#[get("/")]
#[tracing::instrument]
pub async fn course_list(db: &State<Database>) -> Result<Json<CourseListResponse>, Problem> {
    let courses = db.list_active_courses().await?;

    Ok(Json(CourseListResponse {
        success: true,
        count: courses.len(),
        data: courses,
    }))
}

#[utoipa::path(
    context_path = "/api/courses",
    responses(
        (status = 200, description = "Course details", body = CourseResponse),
        (status = 404, description = "No active course with that code", body = Problem),
    )
)]
#[get("/<code>")]
#[tracing::instrument]
pub async fn course_get(
    code: &str,
    db: &State<Database>,
) -> Result<Json<CourseResponse>, Problem> {
    let course = db
        .find_course_by_code(code)
        .await?
        .ok_or_else(course_problem::not_found)?;

    Ok(Json(CourseResponse {
        success: true,
        data: course,
    }))
}

/// Destructive bootstrap: wipes the catalog and inserts the fixed entries.
/// Not safe to call while the catalog is in active use.
#[utoipa::path(
    context_path = "/api/courses",
    responses((status = 200, description = "Catalog replaced", body = SeedResponse))
)]
#[post("/seed")]
#[tracing::instrument]
pub async fn course_seed(db: &State<Database>) -> Result<Json<SeedResponse>, Problem> {
    let count = db.reseed_courses().await?;
    tracing::info!("reseeded course catalog with {} entries", count);

    Ok(Json(SeedResponse {
        success: true,
        message: "Courses seeded successfully".to_string(),
        count,
    }))
}
