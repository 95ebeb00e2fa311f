use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// HTTP methods the smoke scenarios use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
        }
    }
}

/// Basic-auth username/password pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Where and how a request is sent.
///
/// Only `http://` traffic goes through `proxy`. Without a proxy the
/// request is sent directly, ignoring proxy environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiTarget {
    pub base_url: String,
    pub credentials: Option<Credentials>,
    pub proxy: Option<String>,
}

impl ApiTarget {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: None,
            proxy: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }
}

/// A file attached to a multipart request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    pub path: PathBuf,
    /// Defaults to the last component of `path`
    pub file_name: Option<String>,
    /// Defaults to a guess from the file extension
    pub mime_type: Option<String>,
}

impl FilePart {
    pub fn new(field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            field: field.into(),
            path: path.into(),
            file_name: None,
            mime_type: None,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn resolved_file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| {
            self.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.field.clone())
        })
    }

    pub fn resolved_mime_type(&self) -> String {
        self.mime_type.clone().unwrap_or_else(|| {
            mime_guess::from_path(&self.path)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
    }
}

/// Request body in its pre-wire form
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json {
        payload: serde_json::Value,
        /// Sent as the content-type header, `application/json` when absent
        content_type: Option<String>,
    },
    Multipart {
        /// Text fields, sent before the files in this order
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

/// One smoke request
#[derive(Debug, Clone)]
pub struct TestRequest {
    pub method: Method,
    /// Appended to the target's base URL, or used as is when absolute
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: RequestBody,
}

impl TestRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Successful response data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_base64: Option<String>,
    pub is_binary: bool,
    pub size: usize,
    pub url: String,
    /// Total request time in milliseconds
    pub elapsed: u64,
}

/// Failure description
#[derive(Debug, Clone, Serialize)]
pub struct ErrorData {
    pub message: String,
    pub code: String,
    /// Set when the server answered with a non-success status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Response body, when a response exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Outcome of one smoke request
#[derive(Debug, Clone, Serialize)]
pub struct HarnessReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorData>,
}

impl HarnessReport {
    pub fn success(data: ResponseData) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String, code: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorData {
                message,
                code,
                status: None,
                body: None,
            }),
        }
    }

    pub fn status_error(message: String, status: u16, body: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorData {
                message,
                code: "HTTP_STATUS".to_string(),
                status: Some(status),
                body: Some(body),
            }),
        }
    }

    /// Text a person reads on stdout.
    ///
    /// A success renders as exactly the response body.
    pub fn render(&self) -> String {
        if let Some(data) = &self.data {
            return match &data.body_base64 {
                Some(b64) => b64.clone(),
                None => data.body.clone(),
            };
        }

        let mut out = String::from("API answered with an error:\n\n");
        if let Some(error) = &self.error {
            out.push_str(&error.message);
            if let Some(body) = &error.body {
                out.push('\n');
                out.push_str(body);
            }
        }
        out
    }
}
