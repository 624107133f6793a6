use rocket::http::Status;
use rocket::{Build, Request, Rocket, Route};
use utoipa::ToSchema;

pub mod admin;
pub mod contact;
pub mod courses;
pub mod files;
pub mod meta;
pub mod students;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::data::contact as cd;
use crate::data::course as crs;
use crate::data::student as sd;
use crate::resp::jwt::doc::JWTAuth;
use crate::resp::problem::{FieldError, Problem};

/// Request body of the status relabel endpoints: `{"status": "..."}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusUpdate {
    pub status: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        meta::index,
        meta::health,
        admin::admin_login,
        admin::admin_verify,
        admin::dashboard_stats,
        admin::admin_student_list,
        admin::admin_student_get,
        admin::admin_student_set_status,
        admin::admin_student_delete,
        admin::admin_message_list,
        admin::admin_message_get,
        admin::admin_message_set_status,
        admin::admin_message_delete,
        students::student_register,
        students::student_list,
        students::student_get,
        students::student_set_status,
        contact::contact_submit,
        contact::contact_list,
        courses::course_list,
        courses::course_get,
        courses::course_seed,
    ),
    components(schemas(
        sd::Student,
        sd::AcademicRecord,
        sd::Documents,
        sd::Gender,
        sd::RegistrationStatus,
        cd::ContactMessage,
        cd::MessageStatus,
        cd::db::ContactForm,
        crs::Course,
        crs::CourseCode,
        crs::CourseCategory,
        StatusUpdate,
        admin::LoginRequest,
        admin::LoginResponse,
        admin::VerifyResponse,
        admin::AdminInfo,
        admin::StatsResponse,
        admin::DashboardStats,
        admin::StudentCounts,
        admin::MessageCounts,
        admin::AdminStudentListResponse,
        admin::AdminStudentResponse,
        admin::AdminStudentStatusResponse,
        admin::AdminMessageListResponse,
        admin::AdminMessageResponse,
        admin::AdminMessageStatusResponse,
        admin::AckResponse,
        students::RegisterResponse,
        students::StudentListResponse,
        students::StudentResponse,
        students::StudentStatusResponse,
        contact::ContactSubmitResponse,
        contact::ContactListResponse,
        courses::CourseListResponse,
        courses::CourseResponse,
        courses::SeedResponse,
        meta::HealthResponse,
        Problem,
        FieldError,
    )),
    modifiers(&JWTAuth)
)]
pub struct ApiDoc;

pub fn admin_api() -> Vec<Route> {
    routes![
        admin::admin_login,
        admin::admin_verify,
        admin::dashboard_stats,
        admin::admin_student_list,
        admin::admin_student_get,
        admin::admin_student_set_status,
        admin::admin_student_delete,
        admin::admin_message_list,
        admin::admin_message_get,
        admin::admin_message_set_status,
        admin::admin_message_delete,
    ]
}

#[catch(404)]
fn route_not_found(_req: &Request) -> Problem {
    Problem::new(Status::NotFound, "Route not found")
}

#[catch(401)]
fn unauthorized() -> Problem {
    crate::resp::jwt::missing_token_problem()
}

// Rocket reports malformed or incomplete bodies as 422; the API contract
// treats those as plain validation failures.
#[catch(422)]
fn unprocessable() -> Problem {
    Problem::new(Status::BadRequest, "Validation Error")
}

#[catch(400)]
fn bad_request() -> Problem {
    Problem::new(Status::BadRequest, "Bad request")
}

#[catch(default)]
fn fallback(status: Status, _req: &Request) -> Problem {
    Problem::new(status, "Something went wrong!")
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/api/admin", admin_api())
        .mount(
            "/api/students",
            routes![
                students::student_register,
                students::student_list,
                students::student_get,
                students::student_set_status,
            ],
        )
        .mount(
            "/api/contact",
            routes![contact::contact_submit, contact::contact_list],
        )
        .mount(
            "/api/courses",
            routes![courses::course_list, courses::course_get, courses::course_seed],
        )
        .mount("/", routes![meta::index, meta::health, files::upload_file])
        .mount(
            "/",
            SwaggerUi::new("/swagger/<_..>").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .register(
            "/",
            catchers![
                route_not_found,
                unauthorized,
                unprocessable,
                bad_request,
                fallback
            ],
        )
}
