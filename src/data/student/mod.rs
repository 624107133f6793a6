use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use super::course::CourseCode;

pub mod db;

pub static STUDENT_COLLECTION_NAME: &str = "students";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

/// Review state of a registration. A flat relabeling: any value may follow
/// any other, there is no transition guard.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
}

impl Default for RegistrationStatus {
    fn default() -> Self {
        RegistrationStatus::Pending
    }
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStatus::Pending => write!(f, "Pending"),
            RegistrationStatus::Approved => write!(f, "Approved"),
            RegistrationStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for RegistrationStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(RegistrationStatus::Pending),
            "Approved" => Ok(RegistrationStatus::Approved),
            "Rejected" => Ok(RegistrationStatus::Rejected),
            _ => Err(()),
        }
    }
}

/// One education stage of the application (secondary, senior secondary,
/// graduation or other). All fields are optional on the wire; percentage is
/// whatever the applicant's marksheet states.
#[derive(Debug, Clone, Default, FromForm, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcademicRecord {
    pub board: Option<String>,
    pub year: Option<String>,
    pub marksheet_no: Option<String>,
    pub roll_no: Option<String>,
    pub total_marks: Option<f64>,
    pub marks_obtained: Option<f64>,
    pub percentage: Option<f64>,
}

/// Reference URLs of uploaded registration documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Documents {
    pub photo: Option<String>,
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Assigned once at creation, never changed afterwards.
    pub registration_no: String,

    pub student_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub father_name: String,
    #[serde(default)]
    pub mother_name: Option<String>,
    #[serde(default = "default_nationality")]
    pub nationality: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sub_category: Option<String>,
    pub adhaar_no: String,
    pub father_contact: String,

    pub address: String,
    pub state: String,
    #[serde(default)]
    pub district: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub pincode: String,

    pub course: CourseCode,

    #[serde(default)]
    pub secondary: Option<AcademicRecord>,
    #[serde(default)]
    pub senior_secondary: Option<AcademicRecord>,
    #[serde(default)]
    pub graduation: Option<AcademicRecord>,
    #[serde(default)]
    pub other: Option<AcademicRecord>,

    #[serde(default)]
    pub documents: Documents,

    #[serde(default)]
    pub declaration_accepted: bool,

    #[serde(default)]
    pub status: RegistrationStatus,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_nationality() -> String {
    "Indian".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_exact_labels_only() {
        assert_eq!("Pending".parse(), Ok(RegistrationStatus::Pending));
        assert_eq!("Approved".parse(), Ok(RegistrationStatus::Approved));
        assert_eq!("Rejected".parse(), Ok(RegistrationStatus::Rejected));

        assert!("pending".parse::<RegistrationStatus>().is_err());
        assert!("Accepted".parse::<RegistrationStatus>().is_err());
        assert!("".parse::<RegistrationStatus>().is_err());
    }

    #[test]
    fn status_serializes_as_plain_label() {
        let json = serde_json::to_string(&RegistrationStatus::Approved).unwrap();
        assert_eq!(json, "\"Approved\"");
    }

    #[test]
    fn default_status_is_pending() {
        assert_eq!(RegistrationStatus::default(), RegistrationStatus::Pending);
    }
}
