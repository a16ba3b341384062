//! In-memory directory store speaking the HTTP contract, for tests.
//!
//! Mirrors the real backend: one bucket of directories per identity, sids
//! handed out from a per-bucket counter starting at zero, cascading deletes,
//! and `parent_sid` in node payloads. Failures and delayed responses can be
//! scripted per method.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

use futures_channel::oneshot;
use serde_json::{Value, json};

use crate::directory::{DirectoryNode, DirectorySid};
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, IDENTITY_HEADER, Method, TransportFailure,
};

/// Builds a node from its JSON wire shape.
pub(crate) fn node(value: Value) -> DirectoryNode {
    serde_json::from_value(value).expect("test node json should decode")
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Rc<RefCell<StoreState>>,
}

#[derive(Default)]
struct StoreState {
    buckets: HashMap<String, Bucket>,
    failures: HashMap<Method, VecDeque<u16>>,
    holds: HashMap<Method, VecDeque<oneshot::Receiver<()>>>,
    requests: Vec<(Method, String)>,
    unreachable: bool,
}

#[derive(Default)]
struct Bucket {
    next_sid: i64,
    directories: BTreeMap<i64, StoredDirectory>,
}

struct StoredDirectory {
    name: String,
    parent: Option<i64>,
    children: Vec<i64>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Installs `root` and its subtree in the bucket of `identity`.
    pub(crate) fn seed(&self, identity: i64, root: &DirectoryNode) {
        let mut state = self.state.borrow_mut();
        let bucket = state
            .buckets
            .entry(identity.unsigned_abs().to_string())
            .or_default();
        bucket.insert_subtree(root);
    }

    /// The next request with `method` answers `status` without touching the
    /// store.
    pub(crate) fn fail_next(&self, method: Method, status: u16) {
        self.state
            .borrow_mut()
            .failures
            .entry(method)
            .or_default()
            .push_back(status);
    }

    /// The next request with `method` is applied immediately, but its response
    /// is only delivered once the returned sender fires or is dropped.
    pub(crate) fn hold_next(&self, method: Method) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.state
            .borrow_mut()
            .holds
            .entry(method)
            .or_default()
            .push_back(receiver);
        sender
    }

    pub(crate) fn set_unreachable(&self, unreachable: bool) {
        self.state.borrow_mut().unreachable = unreachable;
    }

    pub(crate) fn request_count(&self, method: Method) -> usize {
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|(m, _)| *m == method)
            .count()
    }

    pub(crate) fn total_requests(&self) -> usize {
        self.state.borrow().requests.len()
    }

    /// Current store-side view of `sid`, bypassing HTTP.
    pub(crate) fn stored(&self, identity: i64, sid: i64) -> Option<DirectoryNode> {
        let state = self.state.borrow();
        state
            .buckets
            .get(&identity.unsigned_abs().to_string())
            .and_then(|bucket| bucket.read(sid))
    }
}

impl HttpTransport for MemoryStore {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let (response, hold) = {
            let mut state = self.state.borrow_mut();
            state.requests.push((request.method, request.path.clone()));
            if state.unreachable {
                return Err(TransportFailure::Unreachable {
                    reason: "memory store switched off".to_string(),
                });
            }

            let hold = state
                .holds
                .get_mut(&request.method)
                .and_then(VecDeque::pop_front);
            let failure = state
                .failures
                .get_mut(&request.method)
                .and_then(VecDeque::pop_front);
            let response = match failure {
                Some(status) => status_response(status),
                None => state.handle(&request),
            };
            (response, hold)
        };

        if let Some(hold) = hold {
            let _ = hold.await;
        }
        Ok(response)
    }
}

impl StoreState {
    fn handle(&mut self, request: &HttpRequest) -> HttpResponse {
        let Some(identity) = request.header_value(IDENTITY_HEADER) else {
            return status_response(403);
        };
        let bucket = self.buckets.entry(identity.to_string()).or_default();

        let Some(rest) = request.path.strip_prefix("/directory") else {
            return status_response(404);
        };
        let sid = match rest.strip_prefix('/') {
            Some(raw) => match raw.parse::<i64>() {
                Ok(sid) => Some(sid),
                Err(_) => return status_response(404),
            },
            None if rest.is_empty() => None,
            None => return status_response(404),
        };

        match (request.method, sid) {
            (Method::Get, Some(sid)) => json_response(bucket.read(sid)),
            (Method::Post, None) => {
                let Some(body) = parse_body(request) else {
                    return status_response(400);
                };
                let Some(name) = body.get("name").and_then(Value::as_str) else {
                    return status_response(400);
                };
                let parent = body.get("parent").and_then(Value::as_i64);
                json_response(bucket.create(name, parent))
            }
            (Method::Put, Some(sid)) => {
                let Some(name) = parse_body(request)
                    .and_then(|body| body.get("name").and_then(Value::as_str).map(str::to_string))
                else {
                    return status_response(400);
                };
                json_response(bucket.rename(sid, &name))
            }
            (Method::Delete, Some(sid)) => {
                if bucket.delete(sid) {
                    HttpResponse::new(200, Vec::new()).with_reason("OK")
                } else {
                    status_response(404)
                }
            }
            _ => status_response(405),
        }
    }
}

impl Bucket {
    fn insert_subtree(&mut self, node: &DirectoryNode) {
        self.directories.insert(
            node.sid.0,
            StoredDirectory {
                name: node.name.clone(),
                parent: node.parent.map(|p| p.0),
                children: node.children.iter().map(|c| c.sid.0).collect(),
            },
        );
        self.next_sid = self.next_sid.max(node.sid.0 + 1);
        for child in &node.children {
            self.insert_subtree(child);
        }
    }

    fn read(&self, sid: i64) -> Option<DirectoryNode> {
        let stored = self.directories.get(&sid)?;
        Some(DirectoryNode {
            sid: DirectorySid(sid),
            name: stored.name.clone(),
            parent: stored.parent.map(DirectorySid),
            children: stored
                .children
                .iter()
                .filter_map(|child| self.read(*child))
                .collect(),
        })
    }

    fn create(&mut self, name: &str, parent: Option<i64>) -> Option<DirectoryNode> {
        if let Some(parent) = parent {
            self.directories.get(&parent)?;
        }
        let sid = self.next_sid;
        self.next_sid += 1;
        self.directories.insert(
            sid,
            StoredDirectory {
                name: name.to_string(),
                parent,
                children: Vec::new(),
            },
        );
        if let Some(parent) = parent.and_then(|p| self.directories.get_mut(&p)) {
            parent.children.push(sid);
        }
        self.read(sid)
    }

    fn rename(&mut self, sid: i64, name: &str) -> Option<DirectoryNode> {
        self.directories.get_mut(&sid)?.name = name.to_string();
        self.read(sid)
    }

    fn delete(&mut self, sid: i64) -> bool {
        let Some(parent) = self.directories.get(&sid).map(|d| d.parent) else {
            return false;
        };
        let mut pending = vec![sid];
        while let Some(next) = pending.pop() {
            if let Some(removed) = self.directories.remove(&next) {
                pending.extend(removed.children);
            }
        }
        if let Some(parent) = parent.and_then(|p| self.directories.get_mut(&p)) {
            parent.children.retain(|child| *child != sid);
        }
        true
    }
}

fn parse_body(request: &HttpRequest) -> Option<Value> {
    serde_json::from_slice(request.body.as_deref()?).ok()
}

/// Encodes a node the way the real store does.
fn store_json(node: &DirectoryNode) -> Value {
    json!({
        "sid": node.sid.0,
        "name": node.name,
        "parent_sid": node.parent.map(|p| p.0),
        "children": node.children.iter().map(store_json).collect::<Vec<_>>(),
    })
}

fn json_response(node: Option<DirectoryNode>) -> HttpResponse {
    match node {
        Some(node) => {
            let body = serde_json::to_vec(&store_json(&node)).expect("node json encodes");
            HttpResponse::new(200, body).with_reason("OK")
        }
        None => status_response(404),
    }
}

fn status_response(status: u16) -> HttpResponse {
    let reason = match status {
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    };
    HttpResponse::new(status, Vec::new()).with_reason(reason)
}
