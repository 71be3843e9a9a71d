// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt;

use bytes::Bytes;
use http::StatusCode;
use serde::Deserialize;

use crate::constants::{X_MS_ERROR_CODE, X_MS_REQUEST_ID};

/// Coarse classification of a failed container operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The container does not exist.
    NotFound,
    /// The container already exists or is in a conflicting state, such as
    /// being deleted.
    Conflict,
    /// Throttling, timeouts and server side failures that may succeed later.
    Transient,
    /// Everything else, including client side failures.
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Conflict => write!(f, "conflict"),
            ErrorKind::Transient => write!(f, "transient"),
            ErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Map a service status code onto an [`ErrorKind`].
pub fn classify(status: StatusCode) -> ErrorKind {
    match status {
        StatusCode::NOT_FOUND => ErrorKind::NotFound,
        StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => ErrorKind::Conflict,
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => ErrorKind::Transient,
        _ => ErrorKind::Unknown,
    }
}

/// A non-success response returned by the Blob service.
#[derive(Debug, Clone, thiserror::Error)]
#[error("storage service responded {status}: {}: {message}", .code.as_deref().unwrap_or("-"))]
pub struct StorageError {
    status: StatusCode,
    code: Option<String>,
    message: String,
    request_id: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl StorageError {
    /// Create a storage error from its parts.
    pub fn new(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            request_id: None,
        }
    }

    /// Build the error from a failed response.
    ///
    /// The error code comes from the `x-ms-error-code` header, falling back
    /// to the XML body which is absent for `HEAD` requests.
    pub fn from_response(resp: http::Response<Bytes>) -> Self {
        let (parts, body) = resp.into_parts();
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };

        let text = String::from_utf8_lossy(&body);
        let body: ErrorBody = quick_xml::de::from_str(text.trim_start_matches('\u{feff}'))
            .unwrap_or_default();

        Self {
            status: parts.status,
            code: header(X_MS_ERROR_CODE).or(body.code),
            message: body.message.map(|v| v.trim().to_string()).unwrap_or_else(|| {
                parts
                    .status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string()
            }),
            request_id: header(X_MS_REQUEST_ID),
        }
    }

    /// HTTP status returned by the service.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Service error code such as `ContainerNotFound`.
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Human readable message from the service.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Request id assigned by the service, useful for support tickets.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Classification of this error.
    pub fn kind(&self) -> ErrorKind {
        classify(self.status)
    }
}

/// Error returned by container operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The service answered with a non-success status.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The request could not be configured, signed or sent.
    #[error(transparent)]
    Client(#[from] azcontainer_core::Error),
}

impl Error {
    /// Classification of this error, client side failures are [`ErrorKind::Unknown`].
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Storage(err) => err.kind(),
            Error::Client(_) => ErrorKind::Unknown,
        }
    }

    /// Check whether the service reported that the container does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Storage(err) if err.status() == StatusCode::NOT_FOUND)
    }
}

/// Result of container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Check whether `err` is a "not found" reply from the Blob service.
///
/// Only the error value itself is inspected: it must be an [`Error`] or a
/// [`StorageError`] carrying status 404. Errors wrapping one of those are
/// not considered, neither are sources.
pub fn is_not_found(err: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(err) = err.downcast_ref::<Error>() {
        return err.is_not_found();
    }

    err.downcast_ref::<StorageError>()
        .is_some_and(|err| err.status() == StatusCode::NOT_FOUND)
}
