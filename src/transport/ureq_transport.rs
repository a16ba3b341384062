use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use compio::dispatcher::{Dispatcher, DispatcherBuilder};
use snafu::ResultExt;
use tracing::debug;
use ureq::http::header::CONTENT_LENGTH;
use ureq::{Agent, RequestBuilder};

use crate::transport::http::{CanceledSnafu, RequestSnafu};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, TransportFailure};

/// Blocking requests run on a small pool so the async runtime never stalls.
const DEFAULT_WORKER_THREADS: usize = 2;

/// [`HttpTransport`] backed by a `ureq` agent.
///
/// `ureq` is blocking, so every request is handed to a compio dispatcher worker
/// and its result awaited on the calling runtime.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    base_url: Arc<str>,
    dispatcher: Arc<Dispatcher>,
}

impl UreqTransport {
    pub fn new(base_url: &str, timeout: Duration) -> std::io::Result<Self> {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();

        let workers = NonZeroUsize::new(DEFAULT_WORKER_THREADS).unwrap_or(NonZeroUsize::MIN);
        debug!("Using {} worker threads for store requests", workers);
        let dispatcher = DispatcherBuilder::new().worker_threads(workers).build()?;

        Ok(Self {
            agent,
            base_url: Arc::from(base_url.trim_end_matches('/')),
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let method = request.method;
        let url = self.url_for(&request.path);
        let agent = self.agent.clone();
        let request_url = url.clone();

        let receiver = self
            .dispatcher
            .dispatch(move || async move { execute(&agent, &request_url, request) })
            .map_err(|e| TransportFailure::DispatchError {
                method,
                url: url.clone(),
                error: e.to_string(),
            })?;

        receiver
            .await
            .context(CanceledSnafu {
                method,
                url: url.clone(),
            })?
            .context(RequestSnafu { method, url })
    }
}

fn execute(agent: &Agent, url: &str, request: HttpRequest) -> Result<HttpResponse, ureq::Error> {
    let headers = request.headers;
    let response = match request.method {
        Method::Get => with_headers(agent.get(url), &headers).call()?,
        Method::Delete => with_headers(agent.delete(url), &headers).call()?,
        Method::Post => send_body(with_headers(agent.post(url), &headers), request.body)?,
        Method::Put => send_body(with_headers(agent.put(url), &headers), request.body)?,
    };

    let status = response.status();
    let content_length = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<u64>().ok());
    let body = if content_length == Some(0) {
        Vec::new()
    } else {
        // Whole subtrees arrive in one payload, so ureq's default cap does not apply.
        response.into_body().with_config().limit(u64::MAX).read_to_vec()?
    };

    Ok(HttpResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().map(str::to_string),
        content_length,
        body,
    })
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: RequestBuilder<ureq::typestate::WithBody>,
    body: Option<Vec<u8>>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(&body[..]),
        None => builder.send_empty(),
    }
}
