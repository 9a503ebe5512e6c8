use serde::{Deserialize, Serialize};

/// Identity claim carried inside a signed bearer token under the `profile` key.
///
/// Decoded once per request and never mutated. Unknown fields in the claim
/// are ignored so issuers can add attributes without breaking verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Login name. Forms the identity segment of every storage key.
    pub login: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Profile {
    /// Create a profile with only a login name.
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            name: None,
            email: None,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the contact email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns `true` if the login can be used as a single storage key segment.
    ///
    /// The login must be non-empty, must not contain `/`, and must not be a
    /// relative path component (`.` or `..`).
    pub fn has_valid_login(&self) -> bool {
        !self.login.is_empty()
            && !self.login.contains('/')
            && self.login != "."
            && self.login != ".."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_ignores_unknown_fields() {
        let json = serde_json::json!({
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://example.com/a.png"
        });
        let profile: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(profile.login, "octocat");
        assert_eq!(profile.name.as_deref(), Some("The Octocat"));
        assert!(profile.email.is_none());
    }

    #[test]
    fn deserialize_requires_login() {
        let json = serde_json::json!({ "name": "nobody" });
        assert!(serde_json::from_value::<Profile>(json).is_err());
    }

    #[test]
    fn serialize_skips_absent_fields() {
        let json = serde_json::to_value(Profile::new("alice")).unwrap();
        assert_eq!(json, serde_json::json!({ "login": "alice" }));
    }

    #[test]
    fn login_validity() {
        assert!(Profile::new("alice").has_valid_login());
        assert!(Profile::new("alice.smith").has_valid_login());
        assert!(!Profile::new("").has_valid_login());
        assert!(!Profile::new("alice/../bob").has_valid_login());
        assert!(!Profile::new("..").has_valid_login());
        assert!(!Profile::new(".").has_valid_login());
    }
}
