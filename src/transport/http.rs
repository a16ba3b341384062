use derive_more::Display;
use futures_channel::oneshot::Canceled;
use snafu::Snafu;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    #[display("GET")]
    Get,
    #[display("POST")]
    Post,
    #[display("PUT")]
    Put,
    #[display("DELETE")]
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Path relative to the store's base url, starting with `/`
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase of the status line, if the transport knows one
    pub reason: Option<String>,
    pub content_length: Option<u64>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            reason: None,
            content_length: Some(body.len() as u64),
            body,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// A declared `Content-Length: 0` or an empty body both mean "no payload".
    pub fn has_no_payload(&self) -> bool {
        self.content_length == Some(0) || self.body.is_empty()
    }
}

/// Sends one request to the store and yields whatever response came back,
/// whatever its status. Only failures to get a response at all are errors.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TransportFailure {
    #[snafu(display("{} {} could not be completed", method, url))]
    RequestError {
        method: Method,
        url: String,
        source: ureq::Error,
    },
    #[snafu(display("Failed to dispatch {} {}: {}", method, url, error))]
    DispatchError {
        method: Method,
        url: String,
        error: String,
    },
    #[snafu(display("{} {} was canceled before completion", method, url))]
    CanceledError {
        method: Method,
        url: String,
        source: Canceled,
    },
    #[snafu(display("Directory store is unreachable: {}", reason))]
    Unreachable { reason: String },
}
