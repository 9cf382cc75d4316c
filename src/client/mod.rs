//! Auth0 Management API client
//!
//! This module provides the [`RecordSource`] used in production:
//! - Domain normalization and base URL handling
//! - Token acquisition through the client-credentials grant
//! - Paged user listing via `GET /api/v2/users`
//!
//! Authentication happens once, in [`ManagementClient::connect`]. There is
//! no retry: a failed request is returned to the caller as-is.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{ExportError, FetchError, InitError};
use crate::export::RecordSource;
use crate::model::User;

/// Settings needed to talk to one Auth0 tenant
#[derive(Clone)]
pub struct ClientSettings {
    /// Tenant domain, e.g. `example.eu.auth0.com`
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Error body returned by the Authentication and Management APIs
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Authenticated Management API client
pub struct ManagementClient {
    http: HttpClient,
    base_url: String,
    access_token: String,
    /// Collection size reported by the last `include_totals` envelope
    total: Option<u64>,
}

impl ManagementClient {
    /// Build the HTTP client and obtain an access token
    ///
    /// # Arguments
    /// * `settings` - Tenant and credentials
    ///
    /// # Returns
    /// * `Result<Self, ExportError>` - Authenticated client or init error
    pub async fn connect(settings: &ClientSettings) -> Result<Self, ExportError> {
        let base_url = normalize_domain(&settings.domain)?;
        let http = HttpClient::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("auth0-export/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InitError::HttpClient(e.to_string()))?;

        let access_token = request_token(&http, &base_url, settings).await?;
        info!("Authenticated against {}", base_url);

        Ok(Self {
            http,
            base_url,
            access_token,
            total: None,
        })
    }

    fn users_url(&self) -> String {
        format!("{}/api/v2/users", self.base_url)
    }
}

#[async_trait]
impl RecordSource for ManagementClient {
    async fn fetch_page(
        &mut self,
        page: u32,
        per_page: u32,
        fields: &[String],
    ) -> Result<Vec<User>, FetchError> {
        let response = self
            .http
            .get(self.users_url())
            .bearer_auth(&self.access_token)
            .query(&users_query(page, per_page, fields))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let (users, total) = parse_user_list(&body)?;
        if total.is_some() {
            self.total = total;
        }
        Ok(users)
    }

    fn total_hint(&self) -> Option<u64> {
        self.total
    }
}

/// Turn a tenant domain into a base URL
///
/// Accepts a bare host (`tenant.auth0.com`) or a URL with an `http(s)://`
/// scheme; trailing slashes are dropped. Bare hosts get `https://`.
///
/// # Returns
/// * `Result<String, InitError>` - Base URL without trailing slash
pub fn normalize_domain(domain: &str) -> Result<String, InitError> {
    let trimmed = domain.trim();

    let (scheme, rest) = if let Some(rest) = trimmed.strip_prefix("https://") {
        ("https", rest)
    } else if let Some(rest) = trimmed.strip_prefix("http://") {
        ("http", rest)
    } else {
        ("https", trimmed)
    };
    let host = rest.trim_end_matches('/');

    if host.is_empty() || host.contains('/') || host.contains(char::is_whitespace) {
        return Err(InitError::InvalidDomain(domain.to_string()));
    }

    Ok(format!("{scheme}://{host}"))
}

async fn request_token(
    http: &HttpClient,
    base_url: &str,
    settings: &ClientSettings,
) -> Result<String, InitError> {
    let body = TokenRequest {
        grant_type: "client_credentials",
        client_id: &settings.client_id,
        client_secret: &settings.client_secret,
        audience: format!("{base_url}/api/v2/"),
    };

    debug!("Requesting management API token for client {}", settings.client_id);
    let response = http
        .post(format!("{base_url}/oauth/token"))
        .json(&body)
        .send()
        .await
        .map_err(|e| InitError::TokenRequest(e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| InitError::TokenRequest(e.to_string()))?;

    if !status.is_success() {
        return Err(InitError::TokenRejected {
            status: status.as_u16(),
            message: error_message(&text),
        });
    }

    let token: TokenResponse =
        serde_json::from_str(&text).map_err(|e| InitError::TokenRequest(e.to_string()))?;
    if let Some(expires_in) = token.expires_in {
        debug!("Token expires in {}s", expires_in);
    }

    Ok(token.access_token)
}

/// Query parameters for one page of users
fn users_query(page: u32, per_page: u32, fields: &[String]) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", page.to_string()),
        ("per_page", per_page.to_string()),
        ("include_totals", "true".to_string()),
    ];

    if !fields.is_empty() {
        query.push(("fields", fields.join(",")));
        query.push(("include_fields", "true".to_string()));
    }

    query
}

/// Decode a user list body in either of the shapes the API returns
///
/// Accepts the `include_totals` envelope or a bare array. Users are decoded
/// one by one so that a failure names the record and the field at fault.
///
/// # Returns
/// * `Result<(Vec<User>, Option<u64>), FetchError>` - Users and the reported total, if any
fn parse_user_list(body: &str) -> Result<(Vec<User>, Option<u64>), FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let (raw_users, total) = match value {
        Value::Array(users) => (users, None),
        Value::Object(mut envelope) => {
            let total = envelope.get("total").and_then(Value::as_u64);
            match envelope.remove("users") {
                Some(Value::Array(users)) => (users, total),
                Some(other) => {
                    return Err(FetchError::Decode(format!(
                        "field `users`: expected an array, found {}",
                        json_kind(&other)
                    )));
                }
                None => return Err(FetchError::Decode("missing field `users`".to_string())),
            }
        }
        other => {
            return Err(FetchError::Decode(format!(
                "expected a user list, found {}",
                json_kind(&other)
            )));
        }
    };

    if let Some(total) = total {
        debug!("Page holds {} of {} users", raw_users.len(), total);
    }

    let users = raw_users
        .into_iter()
        .enumerate()
        .map(|(index, raw)| decode_user(index, raw))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((users, total))
}

/// Decode one user, naming the offending field on failure
fn decode_user(index: usize, raw: Value) -> Result<User, FetchError> {
    match serde_json::from_value::<User>(raw.clone()) {
        Ok(user) => Ok(user),
        Err(e) => {
            let id = raw
                .get("user_id")
                .and_then(Value::as_str)
                .unwrap_or("<unknown>");
            // Every attribute is optional, so a single-key object decodes
            // unless that key's value is the problem
            let field = raw.as_object().and_then(|object| {
                object.iter().find_map(|(key, value)| {
                    let mut single = serde_json::Map::new();
                    single.insert(key.clone(), value.clone());
                    serde_json::from_value::<User>(Value::Object(single))
                        .err()
                        .map(|_| key.clone())
                })
            });

            let message = match field {
                Some(field) => format!("user #{index} ({id}), field `{field}`: {e}"),
                None => format!("user #{index} ({id}): {e}"),
            };
            Err(FetchError::Decode(message))
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Best-effort human message from an API error body
fn error_message(body: &str) -> String {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    parsed
        .message
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_domain() {
        assert_eq!(
            normalize_domain("tenant.auth0.com").unwrap(),
            "https://tenant.auth0.com"
        );
        assert_eq!(
            normalize_domain("https://tenant.auth0.com/").unwrap(),
            "https://tenant.auth0.com"
        );
        assert_eq!(
            normalize_domain("http://localhost:8080").unwrap(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_normalize_domain_rejects_garbage() {
        assert!(normalize_domain("").is_err());
        assert!(normalize_domain("https://").is_err());
        assert!(normalize_domain("tenant.auth0.com/api/v2").is_err());
        assert!(normalize_domain("bad host").is_err());
    }

    #[test]
    fn test_users_query() {
        let fields = vec!["user_id".to_string(), "email".to_string()];
        let query = users_query(3, 100, &fields);
        assert_eq!(
            query,
            vec![
                ("page", "3".to_string()),
                ("per_page", "100".to_string()),
                ("include_totals", "true".to_string()),
                ("fields", "user_id,email".to_string()),
                ("include_fields", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_users_query_without_fields() {
        let query = users_query(0, 50, &[]);
        assert!(query.iter().all(|(k, _)| *k != "fields" && *k != "include_fields"));
    }

    #[test]
    fn test_parse_paged_user_list() {
        let body = r#"{"start":0,"limit":2,"length":2,"total":5,
            "users":[{"user_id":"auth0|1","email":"a@x"},{"user_id":"auth0|2"}]}"#;
        let (users, total) = parse_user_list(body).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].email.as_deref(), Some("a@x"));
        assert_eq!(total, Some(5));
    }

    #[test]
    fn test_parse_bare_user_list() {
        let (users, total) = parse_user_list(r#"[{"user_id":"auth0|1"}]"#).unwrap();
        assert_eq!(users[0].user_id.as_deref(), Some("auth0|1"));
        assert_eq!(total, None);
    }

    #[test]
    fn test_parse_empty_page() {
        let (users, _) =
            parse_user_list(r#"{"start":200,"limit":100,"length":0,"total":200,"users":[]}"#)
                .unwrap();
        assert!(users.is_empty());
        assert!(parse_user_list("[]").unwrap().0.is_empty());
    }

    #[test]
    fn test_parse_mixed_flag_encodings() {
        let body = r#"{"users":[
            {"user_id":"auth0|1","email_verified":true},
            {"user_id":"samlp|2","email_verified":"true"}]}"#;
        let (users, _) = parse_user_list(body).unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.email_verified == Some(true)));
    }

    #[test]
    fn test_parse_invalid_body() {
        let err = parse_user_list("<html>oops</html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        let err = parse_user_list(r#"{"users":"nope"}"#).unwrap_err();
        assert!(err.to_string().contains("`users`"));
    }

    #[test]
    fn test_decode_error_names_record_and_field() {
        let body = r#"{"users":[
            {"user_id":"auth0|1"},
            {"user_id":"auth0|2","email":"b@x","logins_count":"many"}]}"#;
        match parse_user_list(body).unwrap_err() {
            FetchError::Decode(message) => {
                assert!(message.contains("user #1"), "{message}");
                assert!(message.contains("auth0|2"), "{message}");
                assert!(message.contains("`logins_count`"), "{message}");
            }
            other => panic!("expected decode error, got {other}"),
        }
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(r#"{"statusCode":429,"error":"Too Many Requests","message":"Global limit has been reached"}"#),
            "Global limit has been reached"
        );
        assert_eq!(
            error_message(r#"{"error":"access_denied","error_description":"Unauthorized"}"#),
            "Unauthorized"
        );
        assert_eq!(error_message("  gateway timeout \n"), "gateway timeout");
    }

    #[test]
    fn test_settings_debug_hides_secret() {
        let settings = ClientSettings {
            domain: "tenant.auth0.com".to_string(),
            client_id: "abc".to_string(),
            client_secret: "s3cr3t".to_string(),
            timeout: Duration::from_secs(30),
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("s3cr3t"));
        assert!(debug.contains("tenant.auth0.com"));
    }
}
