//! Authenticated identity and the session result returned by login,
//! registration and refresh.

use serde::{Deserialize, Serialize};

use super::EntityId;

/// The signed-in user as served by `auth/user` and the session endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Remote URL of the profile picture.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    /// `data:` URL materialized in the background after login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_base64: Option<String>,
    /// Remaining profile fields, kept verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Identity {
    pub fn has_id(&self) -> bool {
        self.id.as_ref().is_some_and(|id| !id.is_blank())
    }
}

/// `{user, access_token, refresh_token}` from the session endpoints.
///
/// Every field is optional so that partial responses deserialize and can be
/// rejected by [`AuthResult::is_well_formed`] instead of failing the call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthResult {
    #[serde(default)]
    pub user: Option<Identity>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthResult {
    /// A result is usable only with an identified user and a non-empty
    /// access token.
    pub fn is_well_formed(&self) -> bool {
        self.user.as_ref().is_some_and(Identity::has_id)
            && self.access_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Login form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

/// Registration form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn well_formed_requires_id_and_token() {
        let good: AuthResult = serde_json::from_value(json!({
            "user": {"id": 1, "name": "Ann"},
            "access_token": "t1",
            "refresh_token": "r1"
        }))
        .unwrap();
        assert!(good.is_well_formed());

        let no_id: AuthResult =
            serde_json::from_value(json!({"user": {"name": "Ann"}, "access_token": "t1"})).unwrap();
        assert!(!no_id.is_well_formed());

        let empty_token: AuthResult =
            serde_json::from_value(json!({"user": {"id": 1}, "access_token": ""})).unwrap();
        assert!(!empty_token.is_well_formed());
    }

    #[test]
    fn unknown_profile_fields_are_preserved() {
        let identity: Identity =
            serde_json::from_value(json!({"id": 3, "bio": "hello", "followers": 10})).unwrap();

        assert_eq!(identity.extra["bio"], "hello");
        let back = serde_json::to_value(&identity).unwrap();
        assert_eq!(back["followers"], 10);
    }
}
