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

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use azcontainer_core::Error;

/// User defined metadata attached to a container.
///
/// Keys are sent as `x-ms-meta-{key}` headers, so the service hands them
/// back lowercased.
pub type Metadata = HashMap<String, String>;

/// Anonymous read policy of a container.
///
/// - [Set Container ACL](https://learn.microsoft.com/en-us/rest/api/storageservices/set-container-acl)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PublicAccessType {
    /// Data is private to the account owner.
    #[default]
    None,
    /// Anonymous read access to blobs, but not to container listings.
    Blob,
    /// Anonymous read access to blobs and container listings.
    Container,
}

impl PublicAccessType {
    /// Value of the `x-ms-blob-public-access` header, `None` when the header
    /// must be omitted.
    pub fn as_header_value(&self) -> Option<&'static str> {
        match self {
            PublicAccessType::None => None,
            PublicAccessType::Blob => Some("blob"),
            PublicAccessType::Container => Some("container"),
        }
    }

    /// Parse the `x-ms-blob-public-access` response header, absent means private.
    ///
    /// A value outside `blob` and `container` means the service speaks a
    /// newer API than this crate and is reported as [`ErrorKind::Unexpected`].
    ///
    /// [`ErrorKind::Unexpected`]: azcontainer_core::ErrorKind::Unexpected
    pub fn from_header_value(value: Option<&str>) -> Result<Self, Error> {
        match value {
            None | Some("") => Ok(PublicAccessType::None),
            Some("blob") => Ok(PublicAccessType::Blob),
            Some("container") => Ok(PublicAccessType::Container),
            Some(v) => Err(Error::unexpected(format!(
                "service returned unknown x-ms-blob-public-access value: {v}"
            ))),
        }
    }
}

impl FromStr for PublicAccessType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "private" => Ok(PublicAccessType::None),
            "blob" => Ok(PublicAccessType::Blob),
            "container" => Ok(PublicAccessType::Container),
            _ => Err(Error::config_invalid(format!(
                "invalid public access type {s:?}: expected none, blob or container"
            ))),
        }
    }
}

impl fmt::Display for PublicAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_header_value().unwrap_or("none"))
    }
}

/// Properties of a container as returned by [`ContainerOperations::get`](crate::ContainerOperations::get).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerProperties {
    /// Current anonymous access policy.
    pub public_access: PublicAccessType,
    /// User metadata, `None` when the container carries none.
    pub metadata: Option<Metadata>,
}
