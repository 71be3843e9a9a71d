//! In-memory stand-in for the container endpoints of the Blob service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azcontainer_azure_blob::Metadata;
use azcontainer_core::{Context, HttpSend, Result};
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http::{HeaderMap, Method, Request, Response, StatusCode};

const X_MS_BLOB_PUBLIC_ACCESS: &str = "x-ms-blob-public-access";
const X_MS_META_PREFIX: &str = "x-ms-meta-";

/// Serves create, set metadata, set acl, get properties and delete for
/// containers kept in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeBlobService {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    containers: HashMap<String, Container>,
    calls: Vec<&'static str>,
    failures: HashMap<&'static str, StatusCode>,
}

#[derive(Debug, Default)]
struct Container {
    public_access: Option<String>,
    metadata: Metadata,
}

impl FakeBlobService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context sending every request to this fake.
    pub fn context(&self) -> Context {
        let _ = env_logger::builder().is_test(true).try_init();
        Context::new().with_http_send(self.clone())
    }

    /// Operations received so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Answer the next `operation` with `status` instead of serving it.
    pub fn fail_next(&self, operation: &'static str, status: StatusCode) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(operation, status);
    }

    pub fn exists(&self, container: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .containers
            .contains_key(container)
    }
}

#[async_trait]
impl HttpSend for FakeBlobService {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let resp = self.state.lock().unwrap().serve(&req);
        Ok(resp)
    }
}

impl State {
    fn serve(&mut self, req: &Request<Bytes>) -> Response<Bytes> {
        let query: HashMap<String, String> =
            form_urlencoded::parse(req.uri().query().unwrap_or_default().as_bytes())
                .into_owned()
                .collect();
        if query.get("restype").map(String::as_str) != Some("container") {
            return error(StatusCode::BAD_REQUEST, "InvalidQueryParameterValue");
        }

        let operation = match (req.method(), query.get("comp").map(String::as_str)) {
            (&Method::PUT, None) => "create",
            (&Method::PUT, Some("metadata")) => "set_metadata",
            (&Method::PUT, Some("acl")) => "set_acl",
            (&Method::GET, None) => "get_properties",
            (&Method::DELETE, None) => "delete",
            _ => return error(StatusCode::BAD_REQUEST, "UnsupportedHttpVerb"),
        };
        self.calls.push(operation);

        if !is_signed(req.headers()) {
            return error(StatusCode::FORBIDDEN, "AuthenticationFailed");
        }
        if let Some(status) = self.failures.remove(operation) {
            return error(status, "InjectedFailure");
        }

        let name = req
            .uri()
            .path()
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        let access = req
            .headers()
            .get(X_MS_BLOB_PUBLIC_ACCESS)
            .map(|v| v.to_str().unwrap().to_string());

        match operation {
            "create" => {
                if self.containers.contains_key(&name) {
                    return error(StatusCode::CONFLICT, "ContainerAlreadyExists");
                }
                self.containers.insert(
                    name,
                    Container {
                        public_access: access,
                        metadata: metadata_from(req.headers()),
                    },
                );
                empty(StatusCode::CREATED)
            }
            "set_metadata" => match self.containers.get_mut(&name) {
                Some(container) => {
                    container.metadata = metadata_from(req.headers());
                    empty(StatusCode::OK)
                }
                None => not_found(),
            },
            "set_acl" => match self.containers.get_mut(&name) {
                Some(container) => {
                    container.public_access = access;
                    empty(StatusCode::OK)
                }
                None => not_found(),
            },
            "get_properties" => match self.containers.get(&name) {
                Some(container) => {
                    let mut resp = Response::builder()
                        .status(StatusCode::OK)
                        .header("x-ms-request-id", "fake-request");
                    if let Some(access) = &container.public_access {
                        resp = resp.header(X_MS_BLOB_PUBLIC_ACCESS, access.as_str());
                    }
                    for (k, v) in &container.metadata {
                        resp = resp.header(format!("{X_MS_META_PREFIX}{k}"), v.as_str());
                    }
                    resp.body(Bytes::new()).unwrap()
                }
                None => not_found(),
            },
            "delete" => match self.containers.remove(&name) {
                Some(_) => empty(StatusCode::ACCEPTED),
                None => not_found(),
            },
            _ => unreachable!("unknown operation {operation}"),
        }
    }
}

fn is_signed(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("SharedKey "))
        && headers.contains_key("x-ms-date")
        && headers.contains_key("x-ms-version")
}

fn metadata_from(headers: &HeaderMap) -> Metadata {
    headers
        .iter()
        .filter_map(|(k, v)| {
            let key = k.as_str().strip_prefix(X_MS_META_PREFIX)?;
            Some((key.to_string(), v.to_str().ok()?.to_string()))
        })
        .collect()
}

fn empty(status: StatusCode) -> Response<Bytes> {
    Response::builder()
        .status(status)
        .header("x-ms-request-id", "fake-request")
        .body(Bytes::new())
        .unwrap()
}

fn not_found() -> Response<Bytes> {
    error(StatusCode::NOT_FOUND, "ContainerNotFound")
}

fn error(status: StatusCode, code: &str) -> Response<Bytes> {
    let body = format!(
        "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <Error><Code>{code}</Code><Message>fake blob service: {code}</Message></Error>"
    );

    Response::builder()
        .status(status)
        .header("x-ms-request-id", "fake-request")
        .header("x-ms-error-code", code)
        .header("content-type", "application/xml")
        .body(Bytes::from(body))
        .unwrap()
}
