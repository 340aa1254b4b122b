use reqwest::{header, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::ClientError;

/// Thin JSON client for one service.
///
/// Attaches the bearer token when one is given, unwraps `data` from the
/// success envelope and turns failures into `ClientError::Http` carrying the
/// envelope's `message`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, http: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.send(Method::GET, path, token, None::<&()>).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.send(Method::POST, path, token, Some(body)).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.send(Method::PUT, path, token, Some(body)).await
    }

    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        self.send(Method::PATCH, path, token, Some(body)).await
    }

    /// Expects `204 No Content`; any success body is ignored.
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<(), ClientError> {
        self.send::<Value, ()>(Method::DELETE, path, token, None)
            .await
            .map(|_| ())
    }

    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
    ) -> Result<T, ClientError> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token.filter(|token| !token.is_empty()) {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let json = if status == StatusCode::NO_CONTENT {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        unwrap_envelope(status, json)
    }
}

fn unwrap_envelope<T: DeserializeOwned>(status: StatusCode, json: Value) -> Result<T, ClientError> {
    if !status.is_success() {
        return Err(ClientError::Http {
            status: status.as_u16(),
            message: failure_message(status, &json),
        });
    }

    let data = match json {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    Ok(serde_json::from_value(data)?)
}

fn failure_message(status: StatusCode, json: &Value) -> String {
    match json.get("message") {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Array(messages)) => messages
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_base_url_trailing_slashes_trimmed() {
        assert_eq!(ApiClient::new("http://localhost:3001///").base_url(), "http://localhost:3001");
    }

    #[test]
    fn test_unwraps_data() {
        let token: crate::auth::LoginResponse = unwrap_envelope(
            StatusCode::OK,
            json!({ "success": true, "data": { "access_token": "abc" }, "message": "ok" }),
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");

        let bare: Value = unwrap_envelope(StatusCode::OK, json!({ "status": "ok" })).unwrap();
        assert_eq!(bare, json!({ "status": "ok" }));

        unwrap_envelope::<()>(StatusCode::NO_CONTENT, Value::Null).unwrap();
    }

    #[test]
    fn test_failure_surfaces_message() {
        let err = unwrap_envelope::<Value>(
            StatusCode::UNAUTHORIZED,
            json!({ "success": false, "message": "Invalid credentials", "error": "Unauthorized" }),
        )
        .unwrap_err();
        match err {
            ClientError::Http { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error {:?}", other),
        }

        let err = unwrap_envelope::<Value>(StatusCode::BAD_GATEWAY, Value::Null).unwrap_err();
        assert_eq!(err.to_string(), "Bad Gateway");

        let err = unwrap_envelope::<Value>(
            StatusCode::BAD_REQUEST,
            json!({ "message": ["content too short", "content must be a string"] }),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "content too short, content must be a string");
    }
}
