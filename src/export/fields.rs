//! Field specification and the user attribute table
//!
//! Every exportable column is an entry in [`ATTRIBUTES`]: an accepted field
//! name paired with a typed accessor. The first four entries are the
//! well-known fields, which are matched verbatim before any normalization.

use serde::Serialize;

use crate::error::ConfigError;
use crate::model::User;

/// Column layout used when none is configured.
pub const DEFAULT_FIELDS: &str = "user_id,email,name,app_metadata";

/// Ordered list of requested column names.
///
/// Duplicates are allowed and produce repeated columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    names: Vec<String>,
}

impl FieldSpec {
    /// Parse a comma-separated field list
    ///
    /// Entries are trimmed. Empty entries are kept so that column positions
    /// match the input; an entirely blank list is rejected.
    ///
    /// # Arguments
    /// * `list` - Comma-separated field names
    ///
    /// # Returns
    /// * `Result<Self, ConfigError>` - Parsed spec or error
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        if list.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "fields".to_string(),
                value: list.to_string(),
            });
        }

        let names = list.split(',').map(|s| s.trim().to_string()).collect();
        Ok(Self { names })
    }

    /// Field names in column order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Serialization to compact JSON, object-safe so accessors can hand out
/// borrowed structured values of any serializable type.
pub trait CompactJson {
    fn to_compact_json(&self) -> serde_json::Result<String>;
}

impl<T: Serialize + ?Sized> CompactJson for T {
    fn to_compact_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Value extracted from a user before it is rendered into a cell
pub enum FieldValue<'a> {
    /// Unset optional attribute
    Absent,
    /// Text emitted verbatim
    Text(&'a str),
    /// Non-text scalar, already in display form
    Scalar(String),
    /// Map, composite or list, rendered as compact JSON
    Structured(&'a dyn CompactJson),
}

impl FieldValue<'_> {
    /// Render the value into cell text
    pub fn render(&self) -> serde_json::Result<String> {
        match self {
            FieldValue::Absent => Ok(String::new()),
            FieldValue::Text(s) => Ok((*s).to_string()),
            FieldValue::Scalar(s) => Ok(s.clone()),
            FieldValue::Structured(v) => v.to_compact_json(),
        }
    }
}

/// Typed extraction function for one attribute
pub type Accessor = for<'a> fn(&'a User) -> FieldValue<'a>;

fn text(value: &Option<String>) -> FieldValue<'_> {
    match value {
        Some(s) => FieldValue::Text(s),
        None => FieldValue::Absent,
    }
}

fn scalar<T: ToString>(value: Option<T>) -> FieldValue<'static> {
    match value {
        Some(v) => FieldValue::Scalar(v.to_string()),
        None => FieldValue::Absent,
    }
}

fn structured<T: Serialize>(value: &Option<T>) -> FieldValue<'_> {
    match value {
        Some(v) => FieldValue::Structured(v),
        None => FieldValue::Absent,
    }
}

fn user_id(u: &User) -> FieldValue<'_> {
    text(&u.user_id)
}

fn email(u: &User) -> FieldValue<'_> {
    text(&u.email)
}

fn name(u: &User) -> FieldValue<'_> {
    text(&u.name)
}

fn app_metadata(u: &User) -> FieldValue<'_> {
    structured(&u.app_metadata)
}

fn username(u: &User) -> FieldValue<'_> {
    text(&u.username)
}

fn given_name(u: &User) -> FieldValue<'_> {
    text(&u.given_name)
}

fn family_name(u: &User) -> FieldValue<'_> {
    text(&u.family_name)
}

fn nickname(u: &User) -> FieldValue<'_> {
    text(&u.nickname)
}

fn picture(u: &User) -> FieldValue<'_> {
    text(&u.picture)
}

fn phone_number(u: &User) -> FieldValue<'_> {
    text(&u.phone_number)
}

fn phone_verified(u: &User) -> FieldValue<'_> {
    scalar(u.phone_verified)
}

fn email_verified(u: &User) -> FieldValue<'_> {
    scalar(u.email_verified)
}

fn blocked(u: &User) -> FieldValue<'_> {
    scalar(u.blocked)
}

fn created_at(u: &User) -> FieldValue<'_> {
    text(&u.created_at)
}

fn updated_at(u: &User) -> FieldValue<'_> {
    text(&u.updated_at)
}

fn last_login(u: &User) -> FieldValue<'_> {
    text(&u.last_login)
}

fn last_ip(u: &User) -> FieldValue<'_> {
    text(&u.last_ip)
}

fn logins_count(u: &User) -> FieldValue<'_> {
    scalar(u.logins_count)
}

fn identities(u: &User) -> FieldValue<'_> {
    structured(&u.identities)
}

fn user_metadata(u: &User) -> FieldValue<'_> {
    structured(&u.user_metadata)
}

fn multifactor(u: &User) -> FieldValue<'_> {
    structured(&u.multifactor)
}

/// Number of leading [`ATTRIBUTES`] entries that are well-known fields.
const WELL_KNOWN_COUNT: usize = 4;

/// Accepted field names (lowercase API names) and their accessors.
pub const ATTRIBUTES: &[(&str, Accessor)] = &[
    ("user_id", user_id),
    ("email", email),
    ("name", name),
    ("app_metadata", app_metadata),
    ("username", username),
    ("given_name", given_name),
    ("family_name", family_name),
    ("nickname", nickname),
    ("picture", picture),
    ("phone_number", phone_number),
    ("phone_verified", phone_verified),
    ("email_verified", email_verified),
    ("blocked", blocked),
    ("created_at", created_at),
    ("updated_at", updated_at),
    ("last_login", last_login),
    ("last_ip", last_ip),
    ("logins_count", logins_count),
    ("identities", identities),
    ("user_metadata", user_metadata),
    ("multifactor", multifactor),
];

/// The well-known fields, always requested from the API
pub fn well_known() -> &'static [(&'static str, Accessor)] {
    &ATTRIBUTES[..WELL_KNOWN_COUNT]
}

/// Resolve a requested field name to its canonical name and accessor
///
/// Well-known names match exactly. Anything else is trimmed and
/// ASCII-lowercased before looking it up in the full table.
///
/// # Returns
/// * `Option<(&'static str, Accessor)>` - Canonical name and accessor, or None if unknown
pub fn resolve(requested: &str) -> Option<(&'static str, Accessor)> {
    if let Some(&(canonical, accessor)) = well_known().iter().find(|(n, _)| *n == requested) {
        return Some((canonical, accessor));
    }

    let normalized = requested.trim().to_ascii_lowercase();
    ATTRIBUTES
        .iter()
        .find(|(n, _)| *n == normalized)
        .map(|&(canonical, accessor)| (canonical, accessor))
}
