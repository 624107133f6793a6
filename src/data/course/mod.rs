use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

pub static COURSE_COLLECTION_NAME: &str = "courses";

/// Catalog codes a student can register for. A closed enumeration: the
/// seeded catalog and the registration form agree on these exact values.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CourseCode {
    #[serde(rename = "BBA")]
    Bba,
    #[serde(rename = "BCA")]
    Bca,
    #[serde(rename = "BCom")]
    BCom,
    #[serde(rename = "BSc(AG)")]
    BScAg,
    #[serde(rename = "BEd")]
    BEd,
    #[serde(rename = "MEd")]
    MEd,
    #[serde(rename = "DElEd")]
    DElEd,
}

impl CourseCode {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseCode::Bba => "BBA",
            CourseCode::Bca => "BCA",
            CourseCode::BCom => "BCom",
            CourseCode::BScAg => "BSc(AG)",
            CourseCode::BEd => "BEd",
            CourseCode::MEd => "MEd",
            CourseCode::DElEd => "DElEd",
        }
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BBA" => Ok(CourseCode::Bba),
            "BCA" => Ok(CourseCode::Bca),
            "BCom" => Ok(CourseCode::BCom),
            "BSc(AG)" => Ok(CourseCode::BScAg),
            "BEd" => Ok(CourseCode::BEd),
            "MEd" => Ok(CourseCode::MEd),
            "DElEd" => Ok(CourseCode::DElEd),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum CourseCategory {
    Undergraduate,
    Postgraduate,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub code: CourseCode,
    pub duration: String,
    pub eligibility: String,
    pub description: String,
    pub fees: f64,
    pub seats: u32,
    pub category: CourseCategory,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "super::true_bool")]
    pub is_active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Course {
    fn catalog_entry(
        name: &str,
        code: CourseCode,
        duration: &str,
        eligibility: &str,
        description: &str,
        fees: f64,
        seats: u32,
        category: CourseCategory,
        image: &str,
    ) -> Course {
        let now = Utc::now();
        Course {
            id: Uuid::new_v4(),
            name: name.to_string(),
            code,
            duration: duration.to_string(),
            eligibility: eligibility.to_string(),
            description: description.to_string(),
            fees,
            seats,
            category,
            image: Some(image.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The fixed catalog the seed endpoint bootstraps. Reseeding clears the
/// collection first, so running it repeatedly always leaves exactly these
/// entries.
pub fn seed_catalog() -> Vec<Course> {
    vec![
        Course::catalog_entry(
            "Bachelor of Business Administration",
            CourseCode::Bba,
            "3 Years",
            "10+2 in any Stream",
            "Comprehensive program covering business management, finance, marketing, and entrepreneurship.",
            45000.0,
            60,
            CourseCategory::Undergraduate,
            "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40?w=800",
        ),
        Course::catalog_entry(
            "Bachelor of Computer Applications",
            CourseCode::Bca,
            "3 Years",
            "10+2 in any Stream",
            "Focus on computer programming, software development, and IT fundamentals.",
            42000.0,
            60,
            CourseCategory::Undergraduate,
            "https://images.unsplash.com/photo-1517694712202-14dd9538aa97?w=800",
        ),
        Course::catalog_entry(
            "Bachelor of Commerce",
            CourseCode::BCom,
            "3 Years",
            "10+2 in any Stream",
            "Covers accounting, taxation, business law, and commerce fundamentals.",
            38000.0,
            100,
            CourseCategory::Undergraduate,
            "https://images.unsplash.com/photo-1554224155-6726b3ff858f?w=800",
        ),
        Course::catalog_entry(
            "Bachelor of Science (Agriculture)",
            CourseCode::BScAg,
            "4 Years",
            "10+2 Passed 50% with Bio & Agriculture",
            "Agricultural science, crop management, and modern farming techniques.",
            50000.0,
            40,
            CourseCategory::Undergraduate,
            "https://images.unsplash.com/photo-1625246333195-78d9c38ad449?w=800",
        ),
        Course::catalog_entry(
            "Bachelor of Education",
            CourseCode::BEd,
            "2 Years",
            "Graduation in any Stream",
            "Teacher training program focused on pedagogy and educational psychology.",
            55000.0,
            100,
            CourseCategory::Postgraduate,
            "https://images.unsplash.com/photo-1427504494785-3a9ca7044f45?w=800",
        ),
        Course::catalog_entry(
            "Master of Education",
            CourseCode::MEd,
            "2 Years",
            "Graduation in any Stream",
            "Advanced education program for experienced teachers and educators.",
            60000.0,
            50,
            CourseCategory::Postgraduate,
            "https://images.unsplash.com/photo-1503676260728-1c00da094a0b?w=800",
        ),
        Course::catalog_entry(
            "Diploma in Elementary Education",
            CourseCode::DElEd,
            "2 Years",
            "Graduation in any Stream",
            "Primary teacher training program (formerly known as B.T.C.).",
            41000.0,
            100,
            CourseCategory::Undergraduate,
            "https://images.unsplash.com/photo-1516321318423-f06f85e504b3?w=800",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_has_seven_unique_codes() {
        let catalog = seed_catalog();
        assert_eq!(catalog.len(), 7);

        let codes: HashSet<CourseCode> = catalog.iter().map(|c| c.code).collect();
        assert_eq!(codes.len(), 7);
        assert!(catalog.iter().all(|c| c.is_active));
    }

    #[test]
    fn course_codes_round_trip_as_strings() {
        for course in seed_catalog() {
            let code: CourseCode = course.code.as_str().parse().expect("known code");
            assert_eq!(code, course.code);
        }
        assert!("MBA".parse::<CourseCode>().is_err());
    }

    #[test]
    fn course_code_serde_uses_catalog_spelling() {
        let json = serde_json::to_string(&CourseCode::BScAg).unwrap();
        assert_eq!(json, "\"BSc(AG)\"");
    }
}
