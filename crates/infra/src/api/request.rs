//! Request and response values passed through the transport
//!
//! An [`ApiRequest`] is plain data so the transport can send it again
//! after a token refresh; multipart forms are rebuilt on every send.

use postline_domain::{ApiError, UploadFile};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::endpoints::Endpoint;

/// Failure raised before the request left the client (status 0)
pub(crate) fn local_error(message: impl Into<String>) -> ApiError {
    ApiError::Unknown { status: 0, message: message.into(), error_code: None }
}

/// One field of a multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: UploadFile },
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    pub(crate) fn to_form(parts: &[FormPart]) -> Result<Form, ApiError> {
        parts.iter().try_fold(Form::new(), |form, part| match part {
            FormPart::Text { name, value } => Ok(form.text(name.clone(), value.clone())),
            FormPart::File { name, file } => {
                let body = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.mime_type)
                    .map_err(|err| local_error(format!("invalid upload mime type: {err}")))?;
                Ok(form.part(name.clone(), body))
            }
        })
    }
}

/// A request to the remote API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Base-relative path or absolute URL
    pub target: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// Never attach the session's bearer token
    pub no_auth: bool,
    /// Binary download: no JSON `Accept`/`Content-Type` defaults
    pub raw: bool,
}

impl ApiRequest {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            no_auth: false,
            raw: false,
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn delete(target: impl Into<String>) -> Self {
        Self::new(Method::DELETE, target)
    }

    pub fn head(target: impl Into<String>) -> Self {
        Self::new(Method::HEAD, target)
    }

    pub fn to(method: Method, endpoint: &Endpoint) -> Self {
        Self::new(method, endpoint.path())
    }

    pub fn query(mut self, query: &[(String, String)]) -> Self {
        self.query.extend_from_slice(query);
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|err| local_error(format!("failed to encode request body: {err}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn no_auth(mut self) -> Self {
        self.no_auth = true;
        self
    }

    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    /// Set `Authorization: Bearer <token>`
    pub fn bearer(mut self, token: &str) -> Result<Self, ApiError> {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| local_error("access token is not a valid header value"))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Token currently in the `Authorization` header, if any
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
    }
}

/// A successful (2xx) response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON; a body that does not match `T` is reported
    /// with the response status.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_slice(&self.body).map_err(|err| ApiError::Unknown {
            status: self.status,
            message: format!("Failed to parse response: {err}"),
            error_code: None,
        })
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(reqwest::header::CONTENT_TYPE).and_then(|value| value.to_str().ok())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn bearer_round_trip() {
        let request = ApiRequest::get("posts").bearer("t1").unwrap();
        assert_eq!(request.bearer_token(), Some("t1"));
        assert_eq!(ApiRequest::get("posts").bearer_token(), None);
        assert!(ApiRequest::get("posts").bearer("bad\ntoken").is_err());
    }

    #[test]
    fn json_body_is_captured() {
        let request = ApiRequest::post("auth/login").json(&json!({"email": "a@b.c"})).unwrap();
        assert_eq!(request.body, RequestBody::Json(json!({"email": "a@b.c"})));
        assert!(!request.body.is_multipart());
    }

    #[test]
    fn form_parts_build() {
        let parts = vec![
            FormPart::Text { name: "caption".into(), value: "hi".into() },
            FormPart::File {
                name: "images[]".into(),
                file: UploadFile {
                    file_name: "a.png".into(),
                    mime_type: "image/png".into(),
                    bytes: vec![1, 2, 3],
                },
            },
        ];
        assert!(RequestBody::to_form(&parts).is_ok());

        let bad = vec![FormPart::File {
            name: "images[]".into(),
            file: UploadFile {
                file_name: "a".into(),
                mime_type: "not a mime".into(),
                bytes: vec![],
            },
        }];
        assert!(RequestBody::to_form(&bad).is_err());
    }

    #[test]
    fn undecodable_body_keeps_status() {
        let response =
            ApiResponse { status: 200, headers: HeaderMap::new(), body: b"nope".to_vec() };
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert_eq!(err.status(), 200);
    }
}
