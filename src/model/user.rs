//! Auth0 user representation
//!
//! Mirrors the user object returned by `GET /api/v2/users`. Every attribute
//! is optional because `fields=`/`include_fields=` lets the API omit any of
//! them, and Auth0 itself leaves many unset.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Decode a verification flag leniently
///
/// Enterprise and SAML connections report flags such as `email_verified` as
/// `"true"`/`"false"` strings. Anything that is neither a bool nor a
/// bool-like string decodes as unset instead of failing the record.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolLike {
        Bool(bool),
        Text(String),
        Other(IgnoredAny),
    }

    Ok(match Option::<BoolLike>::deserialize(deserializer)? {
        Some(BoolLike::Bool(b)) => Some(b),
        Some(BoolLike::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        Some(BoolLike::Other(_)) | None => None,
    })
}

/// A linked identity provider account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<String>,
    /// Provider-side id; Auth0 emits either a string or a number here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(
        rename = "isSocial",
        default,
        deserialize_with = "lenient_bool",
        skip_serializing_if = "Option::is_none"
    )]
    pub is_social: Option<bool>,
}

/// One Auth0 user record. Read-only for the export pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub app_metadata: Option<Map<String, Value>>,

    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub phone_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub email_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub blocked: Option<bool>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
    #[serde(default)]
    pub last_ip: Option<String>,
    #[serde(default)]
    pub logins_count: Option<i64>,
    #[serde(default)]
    pub identities: Option<Vec<Identity>>,
    #[serde(default)]
    pub user_metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub multifactor: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_user() {
        let user: User = serde_json::from_str(
            r#"{"user_id":"auth0|1","email":"a@example.com","logins_count":4,"unknown":true}"#,
        )
        .unwrap();
        assert_eq!(user.user_id.as_deref(), Some("auth0|1"));
        assert_eq!(user.logins_count, Some(4));
        assert!(user.name.is_none());
        assert!(user.app_metadata.is_none());
    }

    #[test]
    fn test_deserialize_identities() {
        let user: User = serde_json::from_str(
            r#"{"identities":[{"connection":"github","user_id":12345,"provider":"github","isSocial":true}]}"#,
        )
        .unwrap();
        let ids = user.identities.unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].is_social, Some(true));
        assert_eq!(ids[0].user_id, Some(Value::from(12345)));
    }

    #[test]
    fn test_string_flags_are_accepted() {
        let user: User = serde_json::from_str(
            r#"{"user_id":"samlp|2","email_verified":"true","phone_verified":"False","blocked":false}"#,
        )
        .unwrap();
        assert_eq!(user.email_verified, Some(true));
        assert_eq!(user.phone_verified, Some(false));
        assert_eq!(user.blocked, Some(false));
    }

    #[test]
    fn test_unrecognized_flags_are_unset() {
        let user: User = serde_json::from_str(
            r#"{"user_id":"samlp|3","email_verified":"yes","phone_verified":null,"blocked":1}"#,
        )
        .unwrap();
        assert_eq!(user.user_id.as_deref(), Some("samlp|3"));
        assert!(user.email_verified.is_none());
        assert!(user.phone_verified.is_none());
        assert!(user.blocked.is_none());
    }
}
