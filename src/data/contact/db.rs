use bson::{doc, Document};
use chrono::Utc;
use mongodb::options::{FindOneAndUpdateOptions, FindOptions, ReturnDocument};
use mongodb::Database;
use rocket::futures::StreamExt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::middleware::paging::PageState;
use crate::resp::problem::{problems, FieldError, Problem};
use crate::validate::{present, valid_email, valid_phone};

use super::{ContactMessage, MessageStatus, CONTACT_COLLECTION_NAME};

pub mod problem {
    use crate::resp::problem::{problems, Problem};

    #[inline]
    pub fn not_found() -> Problem {
        problems::not_found("Message")
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

    pub fn admin_query(status: Option<&str>, search: Option<&str>) -> Document {
        let mut query = doc! {};

        if let Some(status) = status.filter(|it| *it != "all") {
            query.insert("status", status);
        }
        if let Some(search) = search.filter(|it| !it.is_empty()) {
            query.insert(
                "$or",
                vec![
                    case_insensitive("fullName", search),
                    case_insensitive("email", search),
                    case_insensitive("subject", search),
                    case_insensitive("phone", search),
                ],
            );
        }

        query
    }
}

/// Incoming contact submission, validated before it becomes a
/// [`ContactMessage`].
#[derive(Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl std::fmt::Debug for ContactForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ContactForm:{}",
            self.email.as_deref().unwrap_or("<no email>")
        )
    }
}

impl ContactForm {
    pub fn validate(&self) -> Result<ContactMessage, Problem> {
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

        let full_name = require("fullName", self.full_name.as_ref(), "Name is required");
        let subject = require("subject", self.subject.as_ref(), "Subject is required");
        let message = require("message", self.message.as_ref(), "Message is required");

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

        if !errors.is_empty() {
            return Err(problems::validation(errors));
        }

        let now = Utc::now();
        Ok(ContactMessage {
            id: Uuid::new_v4(),
            full_name,
            email,
            phone,
            subject,
            message,
            status: MessageStatus::New,
            created_at: now,
            updated_at: now,
        })
    }
}

pub trait ContactDbExt {
    async fn create_message(&self, message: &ContactMessage) -> Result<(), Problem>;

    async fn list_messages(
        &self,
        query: Document,
        page: PageState,
    ) -> Result<(Vec<ContactMessage>, u64), Problem>;

    async fn all_messages(&self) -> Result<Vec<ContactMessage>, Problem>;

    async fn get_message(&self, id: Uuid) -> Result<Option<ContactMessage>, Problem>;

    async fn set_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<Option<ContactMessage>, Problem>;

    async fn delete_message(&self, id: Uuid) -> Result<Option<ContactMessage>, Problem>;

    async fn count_messages(&self, query: Document) -> Result<u64, Problem>;
}

impl ContactDbExt for Database {
    async fn create_message(&self, message: &ContactMessage) -> Result<(), Problem> {
        self.collection::<ContactMessage>(CONTACT_COLLECTION_NAME)
            .insert_one(message, None)
            .await?;

        Ok(())
    }

    async fn list_messages(
        &self,
        query: Document,
        page: PageState,
    ) -> Result<(Vec<ContactMessage>, u64), Problem> {
        let collection = self.collection::<ContactMessage>(CONTACT_COLLECTION_NAME);

        let count = collection.count_documents(query.clone(), None).await?;

        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(page.skip())
            .limit(page.limit as i64)
            .build();

        let mut cursor = collection.find(query, options).await?;
        let mut messages = vec![];
        while let Some(result) = cursor.next().await {
            match result {
                Ok(message) => messages.push(message),
                Err(e) => {
                    tracing::warn!("unable to deserialize ContactMessage document: {}", e)
                }
            }
        }

        Ok((messages, count))
    }

    async fn all_messages(&self) -> Result<Vec<ContactMessage>, Problem> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();

        let mut cursor = self
            .collection::<ContactMessage>(CONTACT_COLLECTION_NAME)
            .find(doc! {}, options)
            .await?;

        let mut messages = vec![];
        while let Some(result) = cursor.next().await {
            match result {
                Ok(message) => messages.push(message),
                Err(e) => {
                    tracing::warn!("unable to deserialize ContactMessage document: {}", e)
                }
            }
        }

        Ok(messages)
    }

    async fn get_message(&self, id: Uuid) -> Result<Option<ContactMessage>, Problem> {
        self.collection::<ContactMessage>(CONTACT_COLLECTION_NAME)
            .find_one(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn set_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
    ) -> Result<Option<ContactMessage>, Problem> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection::<ContactMessage>(CONTACT_COLLECTION_NAME)
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

    async fn delete_message(&self, id: Uuid) -> Result<Option<ContactMessage>, Problem> {
        self.collection::<ContactMessage>(CONTACT_COLLECTION_NAME)
            .find_one_and_delete(filter::by_id(id), None)
            .await
            .map_err(Problem::from)
    }

    async fn count_messages(&self, query: Document) -> Result<u64, Problem> {
        self.collection::<ContactMessage>(CONTACT_COLLECTION_NAME)
            .count_documents(query, None)
            .await
            .map_err(Problem::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> ContactForm {
        ContactForm {
            full_name: Some("Rohit Singh".to_string()),
            email: Some("Rohit@Example.com".to_string()),
            phone: Some("9876543210".to_string()),
            subject: Some("Admission query".to_string()),
            message: Some("When do BCA admissions open?".to_string()),
        }
    }

    #[test]
    fn complete_submission_starts_as_new() {
        let message = complete_form().validate().expect("form is complete");

        assert_eq!(message.status, MessageStatus::New);
        assert_eq!(message.email, "rohit@example.com");
    }

    #[test]
    fn missing_fields_are_collected() {
        let problem = ContactForm {
            full_name: None,
            email: Some("bad-email".to_string()),
            phone: None,
            subject: None,
            message: None,
        }
        .validate()
        .unwrap_err();

        assert_eq!(problem.message, "Validation Error");
        let fields: Vec<&str> = problem.errors.iter().map(|e| e.field.as_str()).collect();
        for field in ["fullName", "email", "phone", "subject", "message"] {
            assert!(fields.contains(&field), "missing error for {}", field);
        }
    }

    #[test]
    fn message_search_covers_subject() {
        let query = filter::admin_query(None, Some("admission"));
        let or = query.get_array("$or").unwrap();
        assert_eq!(or.len(), 4);
        assert!(query.get_str("status").is_err());
    }
}
