use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod db;

pub static CONTACT_COLLECTION_NAME: &str = "contacts";

/// Triage state of a contact message. Flat relabeling, no transition guard.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
pub enum MessageStatus {
    New,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl Default for MessageStatus {
    fn default() -> Self {
        MessageStatus::New
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::New => write!(f, "New"),
            MessageStatus::InProgress => write!(f, "In Progress"),
            MessageStatus::Resolved => write!(f, "Resolved"),
        }
    }
}

impl FromStr for MessageStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(MessageStatus::New),
            "In Progress" => Ok(MessageStatus::InProgress),
            "Resolved" => Ok(MessageStatus::Resolved),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
    #[serde(default)]
    pub status: MessageStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_progress_uses_spaced_label() {
        let json = serde_json::to_string(&MessageStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");

        assert_eq!("In Progress".parse(), Ok(MessageStatus::InProgress));
        assert!("InProgress".parse::<MessageStatus>().is_err());
    }

    #[test]
    fn default_status_is_new() {
        assert_eq!(MessageStatus::default(), MessageStatus::New);
    }
}
