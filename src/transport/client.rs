use serde::Serialize;
use serde::de::DeserializeOwned;
use snafu::ResultExt;
use tracing::{debug, warn};

use crate::directory::{
    CreateDirectoryRequest, DirectoryNode, DirectorySid, RenameDirectoryRequest,
};
use crate::session::IdentityToken;
use crate::transport::error::TransportSnafu;
use crate::transport::{ApiError, HttpRequest, HttpResponse, HttpTransport, Method};

/// Header the store reads the caller's identity from.
pub const IDENTITY_HEADER: &str = "X-Entity-Uid";

const DIRECTORY_PATH: &str = "/directory";

/// Typed access to the directory endpoints for one identity.
///
/// The client holds no state besides its identity: every call is one round
/// trip, and nothing is cached. Build a new client when the identity changes.
#[derive(Debug, Clone)]
pub struct DirectoryClient<T> {
    transport: T,
    identity: IdentityToken,
}

impl<T: HttpTransport> DirectoryClient<T> {
    pub fn new(transport: T, identity: IdentityToken) -> Self {
        Self {
            transport,
            identity,
        }
    }

    pub async fn get_directory(&self, sid: DirectorySid) -> Result<DirectoryNode, ApiError> {
        let request = self.request(Method::Get, format!("{DIRECTORY_PATH}/{sid}"));
        self.fetch_node(request).await
    }

    pub async fn create_directory(
        &self,
        name: &str,
        parent: Option<DirectorySid>,
    ) -> Result<DirectoryNode, ApiError> {
        let request = self.json_request(
            Method::Post,
            DIRECTORY_PATH.to_string(),
            &CreateDirectoryRequest { name, parent },
        )?;
        self.fetch_node(request).await
    }

    pub async fn rename_directory(
        &self,
        sid: DirectorySid,
        name: &str,
    ) -> Result<DirectoryNode, ApiError> {
        let request = self.json_request(
            Method::Put,
            format!("{DIRECTORY_PATH}/{sid}"),
            &RenameDirectoryRequest { name },
        )?;
        self.fetch_node(request).await
    }

    /// Deleting answers with an empty body, which is never handed to the JSON
    /// decoder. A body that does arrive is ignored.
    pub async fn delete_directory(&self, sid: DirectorySid) -> Result<(), ApiError> {
        let request = self.request(Method::Delete, format!("{DIRECTORY_PATH}/{sid}"));
        let response = self.fetch(request).await?;
        if !response.has_no_payload() {
            debug!(
                "Ignoring {} byte payload of delete response for directory {}",
                response.body.len(),
                sid
            );
        }
        Ok(())
    }

    fn request(&self, method: Method, path: String) -> HttpRequest {
        HttpRequest::new(method, path)
            .header("Content-Type", "application/json")
            .header(IDENTITY_HEADER, self.identity.header_value())
    }

    fn json_request(
        &self,
        method: Method,
        path: String,
        body: &impl Serialize,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::InternalError {
            status: 0,
            message: format!("failed to encode request body: {e}"),
        })?;
        Ok(self.request(method, path).body(body))
    }

    async fn fetch_node(&self, request: HttpRequest) -> Result<DirectoryNode, ApiError> {
        let response = self.fetch(request).await?;
        decode_payload(&response)
    }

    /// Sends the request and keeps only 2xx responses.
    async fn fetch(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        debug!("{} {}", method, path);

        let response = self.transport.send(request).await.context(TransportSnafu)?;
        debug!("{} {} -> {}", method, path, response.status);

        if response.is_success() {
            return Ok(response);
        }

        let message = response
            .reason
            .clone()
            .unwrap_or_else(|| format!("HTTP {}", response.status));
        warn!("{} {} failed with {}: {}", method, path, response.status, message);
        Err(ApiError::from_status(response.status, message))
    }
}

fn decode_payload<R: DeserializeOwned>(response: &HttpResponse) -> Result<R, ApiError> {
    if response.has_no_payload() {
        return Err(ApiError::InternalError {
            status: response.status,
            message: "response carried no payload".to_string(),
        });
    }
    serde_json::from_slice(&response.body).map_err(|e| ApiError::InternalError {
        status: response.status,
        message: format!("malformed response payload: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use rstest::rstest;

    use super::*;
    use crate::transport::{ApiErrorKind, TransportFailure};

    /// Replays canned responses and records what was sent.
    #[derive(Default)]
    struct ScriptedTransport {
        responses: RefCell<VecDeque<Result<HttpResponse, TransportFailure>>>,
        sent: RefCell<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn replying(response: HttpResponse) -> Self {
            let transport = Self::default();
            transport.responses.borrow_mut().push_back(Ok(response));
            transport
        }

        fn failing(reason: &str) -> Self {
            let transport = Self::default();
            transport
                .responses
                .borrow_mut()
                .push_back(Err(TransportFailure::Unreachable {
                    reason: reason.to_string(),
                }));
            transport
        }
    }

    impl HttpTransport for &ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
            self.sent.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(500, Vec::new())))
        }
    }

    fn client(transport: &ScriptedTransport, identity: i64) -> DirectoryClient<&ScriptedTransport> {
        DirectoryClient::new(transport, IdentityToken(identity))
    }

    fn json(body: &str) -> HttpResponse {
        HttpResponse::new(200, body.as_bytes().to_vec()).with_reason("OK")
    }

    #[compio::test]
    async fn get_directory_decodes_node() {
        let transport = ScriptedTransport::replying(json(
            r#"{"sid":1,"name":"Root","children":[{"sid":2,"name":"A","parent":1,"children":[]}]}"#,
        ));

        let node = client(&transport, 9)
            .get_directory(DirectorySid::ROOT_LOOKUP)
            .await
            .expect("node should decode");

        assert_eq!(node.sid, DirectorySid(1));
        assert_eq!(node.children[0].name, "A");

        let sent = transport.sent.borrow();
        assert_eq!(sent[0].method, Method::Get);
        assert_eq!(sent[0].path, "/directory/0");
        assert!(sent[0].body.is_none());
    }

    #[compio::test]
    async fn identity_header_is_absolute_value() {
        let transport = ScriptedTransport::replying(json(r#"{"sid":1,"name":"Root","children":[]}"#));

        client(&transport, -17)
            .get_directory(DirectorySid(1))
            .await
            .expect("node should decode");

        let sent = transport.sent.borrow();
        assert_eq!(sent[0].header_value(IDENTITY_HEADER), Some("17"));
        assert_eq!(sent[0].header_value("content-type"), Some("application/json"));
    }

    #[compio::test]
    async fn create_directory_posts_name_and_parent() {
        let transport = ScriptedTransport::replying(
            HttpResponse::new(201, br#"{"sid":3,"name":"Docs","parent":1,"children":[]}"#.to_vec()),
        );

        let node = client(&transport, 1)
            .create_directory("Docs", Some(DirectorySid(1)))
            .await
            .expect("created node");

        assert_eq!(node.sid, DirectorySid(3));
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].path, "/directory");
        let body: serde_json::Value =
            serde_json::from_slice(sent[0].body.as_deref().expect("body")).expect("json body");
        assert_eq!(body, serde_json::json!({"name": "Docs", "parent": 1}));
    }

    #[compio::test]
    async fn rename_directory_puts_new_name() {
        let transport = ScriptedTransport::replying(json(r#"{"sid":2,"name":"B","parent":1,"children":[]}"#));

        let node = client(&transport, 1)
            .rename_directory(DirectorySid(2), "B")
            .await
            .expect("renamed node");

        assert_eq!(node.name, "B");
        let sent = transport.sent.borrow();
        assert_eq!(sent[0].method, Method::Put);
        assert_eq!(sent[0].path, "/directory/2");
        let body: serde_json::Value =
            serde_json::from_slice(sent[0].body.as_deref().expect("body")).expect("json body");
        assert_eq!(body, serde_json::json!({"name": "B"}));
    }

    #[rstest]
    #[case(200)]
    #[case(204)]
    #[compio::test]
    async fn delete_with_empty_body_is_success(#[case] status: u16) {
        let transport = ScriptedTransport::replying(HttpResponse::new(status, Vec::new()));

        let result = client(&transport, 1).delete_directory(DirectorySid(2)).await;

        assert!(result.is_ok());
        assert_eq!(transport.sent.borrow()[0].method, Method::Delete);
    }

    #[compio::test]
    async fn delete_with_declared_zero_length_skips_decoding() {
        let mut response = HttpResponse::new(200, b"not json".to_vec());
        response.content_length = Some(0);
        let transport = ScriptedTransport::replying(response);

        assert!(client(&transport, 1).delete_directory(DirectorySid(2)).await.is_ok());
    }

    #[rstest]
    #[case(403, ApiErrorKind::Forbidden)]
    #[case(404, ApiErrorKind::NotFound)]
    #[case(500, ApiErrorKind::InternalError)]
    #[compio::test]
    async fn error_statuses_map_to_kinds(#[case] status: u16, #[case] kind: ApiErrorKind) {
        let transport = ScriptedTransport::replying(
            HttpResponse::new(status, b"nope".to_vec()).with_reason("Reason"),
        );

        let error = client(&transport, 1)
            .get_directory(DirectorySid(5))
            .await
            .expect_err("non-2xx must fail");

        assert_eq!(error.kind(), kind);
        assert_eq!(error.status(), Some(status));
        assert!(error.to_string().contains("Reason"));
    }

    #[compio::test]
    async fn delete_error_status_is_not_swallowed() {
        let transport = ScriptedTransport::replying(HttpResponse::new(404, Vec::new()));

        let error = client(&transport, 1)
            .delete_directory(DirectorySid(5))
            .await
            .expect_err("404 must fail");

        assert_eq!(error.kind(), ApiErrorKind::NotFound);
        assert!(error.to_string().contains("HTTP 404"));
    }

    #[compio::test]
    async fn unreachable_store_is_transport_error() {
        let transport = ScriptedTransport::failing("connection refused");

        let error = client(&transport, 1)
            .get_directory(DirectorySid(1))
            .await
            .expect_err("transport failure");

        assert_eq!(error.kind(), ApiErrorKind::TransportError);
        assert_eq!(error.status(), None);
    }

    #[compio::test]
    async fn empty_node_payload_is_internal_error() {
        let transport = ScriptedTransport::replying(HttpResponse::new(200, Vec::new()));

        let error = client(&transport, 1)
            .get_directory(DirectorySid(1))
            .await
            .expect_err("a node was expected");

        assert_eq!(error.kind(), ApiErrorKind::InternalError);
        assert_eq!(error.status(), Some(200));
    }

    #[compio::test]
    async fn malformed_node_payload_is_internal_error() {
        let transport = ScriptedTransport::replying(json(r#"{"sid":"one"}"#));

        let error = client(&transport, 1)
            .get_directory(DirectorySid(1))
            .await
            .expect_err("payload does not decode");

        assert_eq!(error.kind(), ApiErrorKind::InternalError);
        assert!(error.to_string().contains("malformed"));
    }
}
