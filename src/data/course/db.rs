use bson::doc;
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use rocket::futures::StreamExt;

use crate::resp::problem::Problem;

use super::{seed_catalog, Course, COURSE_COLLECTION_NAME};

pub mod problem {
    use crate::resp::problem::{problems, Problem};

    #[inline]
    pub fn not_found() -> Problem {
        problems::not_found("Course")
    }
}

pub mod filter {
    use bson::{doc, Document};

    pub fn active() -> Document {
        doc! { "isActive": true }
    }

    pub fn active_by_code(code: &str) -> Document {
        doc! { "code": code, "isActive": true }
    }
}

pub trait CourseDbExt {
    /// Catalog entries visible to the public listing. Deactivated entries
    /// stay in storage but are filtered out here.
    async fn list_active_courses(&self) -> Result<Vec<Course>, Problem>;

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, Problem>;

    /// Destructive bootstrap: clears the collection, then inserts the fixed
    /// catalog. Returns the number of seeded entries.
    async fn reseed_courses(&self) -> Result<usize, Problem>;

    async fn ensure_course_indexes(&self) -> Result<(), Problem>;
}

impl CourseDbExt for Database {
    async fn list_active_courses(&self) -> Result<Vec<Course>, Problem> {
        let mut cursor = self
            .collection::<Course>(COURSE_COLLECTION_NAME)
            .find(filter::active(), None)
            .await?;

        let mut courses = vec![];
        while let Some(result) = cursor.next().await {
            match result {
                Ok(course) => courses.push(course),
                Err(e) => {
                    tracing::warn!("unable to deserialize Course document: {}", e)
                }
            }
        }

        Ok(courses)
    }

    async fn find_course_by_code(&self, code: &str) -> Result<Option<Course>, Problem> {
        self.collection::<Course>(COURSE_COLLECTION_NAME)
            .find_one(filter::active_by_code(code), None)
            .await
            .map_err(Problem::from)
    }

    async fn reseed_courses(&self) -> Result<usize, Problem> {
        let collection = self.collection::<Course>(COURSE_COLLECTION_NAME);

        collection.delete_many(doc! {}, None).await?;

        let catalog = seed_catalog();
        collection.insert_many(&catalog, None).await?;

        Ok(catalog.len())
    }

    async fn ensure_course_indexes(&self) -> Result<(), Problem> {
        let code_unique = IndexModel::builder()
            .keys(doc! { "code": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection::<Course>(COURSE_COLLECTION_NAME)
            .create_indexes([code_unique], None)
            .await?;

        Ok(())
    }
}
