use bson::{doc, Document};
use chrono::{Datelike, NaiveDate, Utc};
use mongodb::options::{
    FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument,
};
use mongodb::{Database, IndexModel};
use rocket::fs::TempFile;
use rocket::futures::StreamExt;
use uuid::Uuid;

use crate::data::course::CourseCode;
use crate::middleware::paging::PageState;
use crate::resp::problem::{problems, FieldError, Problem};
use crate::validate::{present, valid_email, valid_phone};

use super::{
    AcademicRecord, Documents, Gender, RegistrationStatus, Student, STUDENT_COLLECTION_NAME,
};

pub mod problem {
    use crate::resp::problem::{problems, Problem};
    use rocket::http::Status;

    #[inline]
    pub fn not_found() -> Problem {
        problems::not_found("Student")
    }

    #[inline]
    pub fn already_registered() -> Problem {
        Problem::new(Status::BadRequest, "Email or Aadhar already registered")
    }
}

pub mod filter {
    use bson::{doc, Document};
    use uuid::Uuid;

    // Entity ids are stored in their string form.
    pub fn by_id(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    pub fn by_status(status: &str) -> Document {
        doc! { "status": status }
    }

    fn case_insensitive(field: &str, pattern: &str) -> Document {
        let mut d = Document::new();
        d.insert(field, doc! { "$regex": pattern, "$options": "i" });
        d
    }

    /// Admin listing filter: exact status and course (the literal "all"
    /// disables either), and a case-insensitive substring search OR-ed
    /// across the searchable fields.
    pub fn admin_query(
        status: Option<&str>,
        course: Option<&str>,
        search: Option<&str>,
    ) -> Document {
        let mut query = doc! {};

        if let Some(status) = status.filter(|it| *it != "all") {
            query.insert("status", status);
        }
        if let Some(course) = course.filter(|it| *it != "all") {
            query.insert("course", course);
        }
        if let Some(search) = search.filter(|it| !it.is_empty()) {
            query.insert(
                "$or",
                vec![
                    case_insensitive("studentName", search),
                    case_insensitive("email", search),
                    case_insensitive("registrationNo", search),
                    case_insensitive("phone", search),
                ],
            );
        }

        query
    }
}

/// Registration numbers look like `CCM2025xxxxx`: a fixed prefix, the
/// current year, and the last five digits of the epoch-millis clock. Not
/// collision-free under concurrent registration within the same suffix
/// bucket; the sparse unique index is the final arbiter.
pub fn generate_registration_no() -> String {
    let now = Utc::now();
    let millis = now.timestamp_millis().to_string();
    let suffix = &millis[millis.len().saturating_sub(5)..];
    format!("CCM{}{}", now.year(), suffix)
}

/// Incoming multipart registration. Everything is optional at the parsing
/// layer so that missing or malformed fields surface as a collected
/// validation envelope instead of a form-level rejection.
#[derive(FromForm)]
pub struct RegistrationForm<'r> {
    #[field(name = "studentName")]
    pub student_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[field(name = "dateOfBirth")]
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    #[field(name = "fatherName")]
    pub father_name: Option<String>,
    #[field(name = "motherName")]
    pub mother_name: Option<String>,
    pub nationality: Option<String>,
    pub category: Option<String>,
    #[field(name = "subCategory")]
    pub sub_category: Option<String>,
    #[field(name = "adhaarNo")]
    pub adhaar_no: Option<String>,
    #[field(name = "fatherContact")]
    pub father_contact: Option<String>,

    pub address: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,

    pub course: Option<String>,

    pub secondary: Option<AcademicRecord>,
    #[field(name = "seniorSecondary")]
    pub senior_secondary: Option<AcademicRecord>,
    pub graduation: Option<AcademicRecord>,
    pub other: Option<AcademicRecord>,

    #[field(name = "declarationAccepted")]
    pub declaration_accepted: Option<bool>,

    pub photo: Option<TempFile<'r>>,
    pub signature: Option<TempFile<'r>>,
}

impl std::fmt::Debug for RegistrationForm<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RegistrationForm:{}",
            self.email.as_deref().unwrap_or("<no email>")
        )
    }
}

/// A registration that passed validation, ready to be combined with the
/// uploaded document references into a [`Student`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub student_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub father_name: String,
    pub mother_name: Option<String>,
    pub nationality: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub adhaar_no: String,
    pub father_contact: String,
    pub address: String,
    pub state: String,
    pub district: Option<String>,
    pub city: Option<String>,
    pub pincode: String,
    pub course: CourseCode,
    pub secondary: Option<AcademicRecord>,
    pub senior_secondary: Option<AcademicRecord>,
    pub graduation: Option<AcademicRecord>,
    pub other: Option<AcademicRecord>,
    pub declaration_accepted: bool,
}

impl RegistrationForm<'_> {
    pub fn validate(&self) -> Result<Registration, Problem> {
        let mut errors: Vec<FieldError> = vec![];
        let mut require = |field: &str, value: Option<&String>, message: &str| -> String {
            match present(value) {
                Some(it) => it.to_string(),
                None => {
                    errors.push(FieldError::new(field, message));
                    String::new()
                }
            }
        };

        let student_name = require("studentName", self.student_name.as_ref(), "Full name is required");
        let father_name = require("fatherName", self.father_name.as_ref(), "Father's name is required");
        let adhaar_no = require("adhaarNo", self.adhaar_no.as_ref(), "Aadhar number is required");
        let father_contact = require(
            "fatherContact",
            self.father_contact.as_ref(),
            "Father's contact number is required",
        );
        let address = require("address", self.address.as_ref(), "Address is required");
        let state = require("state", self.state.as_ref(), "State is required");
        let pincode = require("pincode", self.pincode.as_ref(), "Pincode is required");

        let email = match present(self.email.as_ref()).filter(|it| valid_email(it)) {
            Some(it) => it.to_lowercase(),
            None => {
                errors.push(FieldError::new("email", "Valid email is required"));
                String::new()
            }
        };

        let phone = match present(self.phone.as_ref()).filter(|it| valid_phone(it)) {
            Some(it) => it.to_string(),
            None => {
                errors.push(FieldError::new("phone", "Valid phone number is required"));
                String::new()
            }
        };

        let course = match present(self.course.as_ref()).and_then(|it| it.parse::<CourseCode>().ok()) {
            Some(it) => Some(it),
            None => {
                errors.push(FieldError::new("course", "Course is required"));
                None
            }
        };

        let date_of_birth = match present(self.date_of_birth.as_ref())
            .and_then(|it| NaiveDate::parse_from_str(it, "%Y-%m-%d").ok())
        {
            Some(it) => Some(it),
            None => {
                errors.push(FieldError::new("dateOfBirth", "Date of birth is required"));
                None
            }
        };

        let gender = match present(self.gender.as_ref()).and_then(|it| it.parse::<Gender>().ok()) {
            Some(it) => Some(it),
            None => {
                errors.push(FieldError::new("gender", "Gender is required"));
                None
            }
        };

        if !errors.is_empty() {
            return Err(problems::validation(errors));
        }

        Ok(Registration {
            student_name,
            email,
            phone,
            // All three unwraps are guarded by the empty-errors check above.
            date_of_birth: date_of_birth.unwrap(),
            gender: gender.unwrap(),
            father_name,
            mother_name: present(self.mother_name.as_ref()).map(str::to_string),
            nationality: present(self.nationality.as_ref())
                .unwrap_or("Indian")
                .to_string(),
            category: present(self.category.as_ref()).map(str::to_string),
            sub_category: present(self.sub_category.as_ref()).map(str::to_string),
            adhaar_no,
            father_contact,
            address,
            state,
            district: present(self.district.as_ref()).map(str::to_string),
            city: present(self.city.as_ref()).map(str::to_string),
            pincode,
            course: course.unwrap(),
            secondary: self.secondary.clone(),
            senior_secondary: self.senior_secondary.clone(),
            graduation: self.graduation.clone(),
            other: self.other.clone(),
            declaration_accepted: self.declaration_accepted.unwrap_or(false),
        })
    }
}

impl Registration {
    pub fn into_student(self, registration_no: String, documents: Documents) -> Student {
        let now = Utc::now();
        Student {
            id: Uuid::new_v4(),
            registration_no,
            student_name: self.student_name,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            father_name: self.father_name,
            mother_name: self.mother_name,
            nationality: self.nationality,
            category: self.category,
            sub_category: self.sub_category,
            adhaar_no: self.adhaar_no,
            father_contact: self.father_contact,
            address: self.address,
            state: self.state,
            district: self.district,
            city: self.city,
            pincode: self.pincode,
            course: self.course,
            secondary: self.secondary,
            senior_secondary: self.senior_secondary,
            graduation: self.graduation,
            other: self.other,
            documents,
            declaration_accepted: self.declaration_accepted,
            status: RegistrationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

pub trait StudentDbExt {
    async fn create_student(&self, student: &Student) -> Result<(), Problem>;

    async fn list_students(
        &self,
        query: Document,
        page: PageState,
    ) -> Result<(Vec<Student>, u64), Problem>;

    async fn all_students(&self) -> Result<Vec<Student>, Problem>;

    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, Problem>;

    /// Unconditional overwrite; there is no transition guard between the
    /// status values.
    async fn set_student_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Option<Student>, Problem>;

    async fn delete_student(&self, id: Uuid) -> Result<Option<Student>, Problem>;

    async fn count_students(&self, query: Document) -> Result<u64, Problem>;

    async fn ensure_student_indexes(&self) -> Result<(), Problem>;
}

impl StudentDbExt for Database {
    async fn create_student(&self, student: &Student) -> Result<(), Problem> {
        self.collection::<Student>(STUDENT_COLLECTION_NAME)
            .insert_one(student, None)
            .await
            .map_err(|e| {
                if crate::resp::problem::is_duplicate_key(&e) {
                    problem::already_registered()
                } else {
                    Problem::from(e)
                }
            })?;

        Ok(())
    }

    async fn list_students(
        &self,
        query: Document,
        page: PageState,
    ) -> Result<(Vec<Student>, u64), Problem> {
        let collection = self.collection::<Student>(STUDENT_COLLECTION_NAME);

        let count = collection.count_documents(query.clone(), None).await?;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(page.skip())
            .limit(page.limit as i64)
            .build();

        let mut cursor = collection.find(query, options).await?;
        let mut students = vec![];
        while let Some(result) = cursor.next().await {
            match result {
                Ok(student) => students.push(student),
                Err(e) => {
                    tracing::warn!("unable to deserialize Student document: {}", e)
                }
            }
        }

        Ok((students, count))
    }

    async fn all_students(&self) -> Result<Vec<Student>, Problem> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();

        let mut cursor = self
            .collection::<Student>(STUDENT_COLLECTION_NAME)
            .find(doc! {}, options)
            .await?;

        let mut students = vec![];
        while let Some(result) = cursor.next().await {
            match result {
                Ok(student) => students.push(student),
                Err(e) => {
                    tracing::warn!("unable to deserialize Student document: {}", e)
                }
            }
        }

        Ok(students)
    }

    async fn get_student(&self, id: Uuid) -> Result<Option<Student>, Problem> {
        self.collection::<Student>(STUDENT_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn set_student_status(
        &self,
        id: Uuid,
        status: RegistrationStatus,
    ) -> Result<Option<Student>, Problem> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<Student>(STUDENT_COLLECTION_NAME)
            .find_one_and_update(
                filter::by_id(id),
                doc! { "$set": {
                    "status": status.to_string(),
                    "updatedAt": bson::to_bson(&Utc::now())?,
                }},
                options,
            )
            .await
            .map_err(Problem::from)
    }

    async fn delete_student(&self, id: Uuid) -> Result<Option<Student>, Problem> {
        self.collection::<Student>(STUDENT_COLLECTION_NAME)
            .find_one_and_delete(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn count_students(&self, query: Document) -> Result<u64, Problem> {
        self.collection::<Student>(STUDENT_COLLECTION_NAME)
            .count_documents(query, None)
            .await
            .map_err(Problem::from)
    }

    async fn ensure_student_indexes(&self) -> Result<(), Problem> {
        let unique = |keys: Document| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build()
        };
        let unique_sparse = |keys: Document| {
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).sparse(true).build())
                .build()
        };

        self.collection::<Student>(STUDENT_COLLECTION_NAME)
            .create_indexes(
                [
                    unique(doc! { "email": 1 }),
                    unique(doc! { "adhaarNo": 1 }),
                    unique_sparse(doc! { "registrationNo": 1 }),
                ],
                None,
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_form() -> RegistrationForm<'static> {
        RegistrationForm {
            student_name: None,
            email: None,
            phone: None,
            date_of_birth: None,
            gender: None,
            father_name: None,
            mother_name: None,
            nationality: None,
            category: None,
            sub_category: None,
            adhaar_no: None,
            father_contact: None,
            address: None,
            state: None,
            district: None,
            city: None,
            pincode: None,
            course: None,
            secondary: None,
            senior_secondary: None,
            graduation: None,
            other: None,
            declaration_accepted: None,
            photo: None,
            signature: None,
        }
    }

    fn complete_form() -> RegistrationForm<'static> {
        RegistrationForm {
            student_name: Some("Asha Verma".to_string()),
            email: Some("Asha.Verma@Example.com".to_string()),
            phone: Some("+91 98765 43210".to_string()),
            date_of_birth: Some("2004-06-15".to_string()),
            gender: Some("Female".to_string()),
            father_name: Some("R. Verma".to_string()),
            adhaar_no: Some("123412341234".to_string()),
            father_contact: Some("9876501234".to_string()),
            address: Some("12 Station Road".to_string()),
            state: Some("Uttar Pradesh".to_string()),
            pincode: Some("226001".to_string()),
            course: Some("BCA".to_string()),
            declaration_accepted: Some(true),
            ..empty_form()
        }
    }

    #[test]
    fn registration_no_has_expected_shape() {
        let no = generate_registration_no();
        assert!(no.starts_with("CCM"));
        // CCM + 4-digit year + 5-digit suffix
        assert_eq!(no.len(), 12);
        assert!(no[3..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn complete_form_validates_and_lowercases_email() {
        let registration = complete_form().validate().expect("form is complete");

        assert_eq!(registration.email, "asha.verma@example.com");
        assert_eq!(registration.course, CourseCode::Bca);
        assert_eq!(registration.gender, Gender::Female);
        assert_eq!(registration.nationality, "Indian");
    }

    #[test]
    fn empty_form_reports_every_missing_field() {
        let problem = empty_form().validate().unwrap_err();

        assert_eq!(problem.message, "Validation Error");
        let fields: Vec<&str> = problem.errors.iter().map(|e| e.field.as_str()).collect();
        for field in [
            "studentName",
            "email",
            "phone",
            "course",
            "dateOfBirth",
            "gender",
        ] {
            assert!(fields.contains(&field), "missing error for {}", field);
        }
    }

    #[test]
    fn bad_email_and_unknown_course_are_rejected() {
        let mut form = complete_form();
        form.email = Some("not-an-email".to_string());
        form.course = Some("MBA".to_string());

        let problem = form.validate().unwrap_err();
        let fields: Vec<&str> = problem.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"email"));
        assert!(fields.contains(&"course"));
    }

    #[test]
    fn validated_form_becomes_pending_student() {
        let registration = complete_form().validate().expect("form is complete");
        let student = registration.into_student(
            generate_registration_no(),
            Documents {
                photo: Some("/uploads/123-photo.jpg".to_string()),
                signature: None,
            },
        );

        assert_eq!(student.status, RegistrationStatus::Pending);
        assert!(student.registration_no.starts_with("CCM"));
        assert_eq!(student.documents.photo.as_deref(), Some("/uploads/123-photo.jpg"));
        assert!(student.declaration_accepted);
    }

    #[test]
    fn admin_query_combines_filters_and_search() {
        let query = filter::admin_query(Some("Pending"), Some("BCA"), Some("asha"));

        assert_eq!(query.get_str("status").unwrap(), "Pending");
        assert_eq!(query.get_str("course").unwrap(), "BCA");
        let or = query.get_array("$or").unwrap();
        assert_eq!(or.len(), 4);
    }

    #[test]
    fn admin_query_treats_all_as_no_filter() {
        let query = filter::admin_query(Some("all"), Some("all"), None);
        assert!(query.is_empty());
    }
}
