use crate::config::Config;

/// A seeded admin credential pair. Kept as a directory entry rather than a
/// single hardcoded pair so additional admins can be added through
/// configuration without touching the login protocol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminIdentity {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Default for AdminIdentity {
    fn default() -> Self {
        AdminIdentity {
            username: "admin".to_string(),
            email: "admin@citycollegeofmanagement.com".to_string(),
            password: "admin@852##".to_string(),
        }
    }
}

pub trait AdminDirectory {
    /// Exact credential match against the seeded identities.
    fn verify_admin(&self, username: &str, password: &str) -> Option<&AdminIdentity>;
}

impl AdminDirectory for Config {
    fn verify_admin(&self, username: &str, password: &str) -> Option<&AdminIdentity> {
        self.admins
            .iter()
            .find(|it| it.username == username && it.password == password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_identity_verifies() {
        let c = Config::default();
        assert!(c.verify_admin("admin", "admin@852##").is_some());
    }

    #[test]
    fn wrong_password_is_rejected() {
        let c = Config::default();
        assert!(c.verify_admin("admin", "admin").is_none());
        assert!(c.verify_admin("root", "admin@852##").is_none());
    }
}
