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

use std::fmt::Debug;

use async_trait::async_trait;
use azcontainer_core::{Context, Signer};
use bytes::Bytes;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, Response, Uri};
use log::debug;

use crate::config::{default_endpoint, Config};
use crate::constants::{
    AZURE_VERSION, USER_AGENT, X_MS_BLOB_PUBLIC_ACCESS, X_MS_META_PREFIX, X_MS_VERSION,
};
use crate::error::{Result, StorageError};
use crate::model::{ContainerProperties, Metadata, PublicAccessType};
use crate::{Credential, RequestSigner, StaticCredentialProvider};

/// Body of a Set Container ACL request that keeps no stored access policy.
const EMPTY_SIGNED_IDENTIFIERS: &str =
    r#"<?xml version="1.0" encoding="utf-8"?><SignedIdentifiers />"#;

/// Operations available on a single blob container.
///
/// Every call is one round trip to the service, except [`update`](Self::update)
/// which takes two. Nothing is retried. Drop the returned future to cancel
/// an in-flight call.
#[async_trait]
pub trait ContainerOperations: Debug + Send + Sync {
    /// Create the container with the given anonymous access level.
    ///
    /// `metadata` is accepted but not applied: the container is always
    /// created without metadata. Call [`update`](Self::update) to set it.
    async fn create(&self, access: PublicAccessType, metadata: &Metadata) -> Result<()>;

    /// Replace the container metadata, then its access policy.
    ///
    /// The two writes are not atomic. If setting metadata fails the access
    /// policy is left untouched and that error is returned. If setting the
    /// access policy fails the new metadata stays in place.
    async fn update(&self, access: PublicAccessType, metadata: &Metadata) -> Result<()>;

    /// Fetch the current access level and metadata.
    ///
    /// A container without metadata reports `metadata: None`.
    async fn get(&self) -> Result<ContainerProperties>;

    /// Delete the container.
    async fn delete(&self) -> Result<()>;
}

/// Handle bound to one container of one storage account.
///
/// Cloning is cheap and clones share the signer's credential cache.
#[derive(Clone, Debug)]
pub struct ContainerHandle {
    ctx: Context,
    signer: Signer<Credential>,
    endpoint: String,
    container_name: String,
}

impl ContainerHandle {
    /// Create a handle for `container_name` in the public Azure cloud.
    ///
    /// The endpoint is `https://{account_name}.blob.core.windows.net`. The
    /// account key and both names are validated here, no request is sent.
    pub fn new(
        ctx: Context,
        account_name: &str,
        account_key: &str,
        container_name: &str,
    ) -> Result<Self> {
        let endpoint = public_endpoint(account_name)?;
        Self::build(ctx, account_name, account_key, container_name, endpoint)
    }

    /// Create a handle from a [`Config`], usually loaded with [`Config::from_env`].
    ///
    /// `config.endpoint` overrides the default endpoint, which is how
    /// Azurite or sovereign clouds are reached.
    pub fn from_config(ctx: Context, config: &Config) -> Result<Self> {
        let account_name = config
            .account_name
            .as_deref()
            .ok_or_else(|| azcontainer_core::Error::config_invalid("account name is required"))?;
        let account_key = config
            .account_key
            .as_deref()
            .ok_or_else(|| azcontainer_core::Error::config_invalid("account key is required"))?;
        let container_name = config
            .container_name
            .as_deref()
            .ok_or_else(|| azcontainer_core::Error::config_invalid("container name is required"))?;
        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => public_endpoint(account_name)?,
        };

        Self::build(ctx, account_name, account_key, container_name, endpoint)
    }

    fn build(
        ctx: Context,
        account_name: &str,
        account_key: &str,
        container_name: &str,
        endpoint: String,
    ) -> Result<Self> {
        validate_container_name(container_name)?;

        let credential = Credential::with_shared_key(account_name, account_key)?;

        let endpoint = endpoint.trim_end_matches('/').to_string();
        let uri = endpoint.parse::<Uri>().map_err(|e| {
            azcontainer_core::Error::config_invalid(format!("invalid endpoint: {endpoint}"))
                .with_source(e)
        })?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(azcontainer_core::Error::config_invalid(format!(
                "endpoint must be an absolute url: {endpoint}"
            ))
            .into());
        }

        let signer = Signer::new(
            ctx.clone(),
            StaticCredentialProvider::new(credential),
            RequestSigner::new(),
        );

        Ok(Self {
            ctx,
            signer,
            endpoint,
            container_name: container_name.to_string(),
        })
    }

    /// Service endpoint, without trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Name of the container this handle addresses.
    pub fn container_name(&self) -> &str {
        &self.container_name
    }

    /// Full url of the container.
    pub fn url(&self) -> String {
        format!("{}/{}", self.endpoint, self.container_name)
    }

    fn request(&self, method: Method, comp: Option<&str>) -> http::request::Builder {
        let uri = match comp {
            Some(comp) => format!("{}?restype=container&comp={comp}", self.url()),
            None => format!("{}?restype=container", self.url()),
        };

        Request::builder()
            .method(method)
            .uri(uri)
            .header(X_MS_VERSION, AZURE_VERSION)
            .header(http::header::USER_AGENT, USER_AGENT)
    }

    fn create_request(
        &self,
        access: PublicAccessType,
    ) -> azcontainer_core::Result<Request<Bytes>> {
        let mut req = self.request(Method::PUT, None);
        if let Some(v) = access.as_header_value() {
            req = req.header(X_MS_BLOB_PUBLIC_ACCESS, v);
        }

        Ok(req.header(CONTENT_LENGTH, "0").body(Bytes::new())?)
    }

    fn set_metadata_request(
        &self,
        metadata: &Metadata,
    ) -> azcontainer_core::Result<Request<Bytes>> {
        let mut req = self.request(Method::PUT, Some("metadata"));
        for (key, value) in metadata {
            // Shared Key signs header values as visible ASCII only.
            if !value.bytes().all(|b| (0x20..0x7f).contains(&b)) {
                return Err(azcontainer_core::Error::request_invalid(format!(
                    "metadata value for {key:?} must be printable ASCII"
                )));
            }
            req = req.header(format!("{X_MS_META_PREFIX}{key}"), value.as_str());
        }

        Ok(req.header(CONTENT_LENGTH, "0").body(Bytes::new())?)
    }

    fn set_access_policy_request(
        &self,
        access: PublicAccessType,
    ) -> azcontainer_core::Result<Request<Bytes>> {
        let mut req = self.request(Method::PUT, Some("acl"));
        if let Some(v) = access.as_header_value() {
            req = req.header(X_MS_BLOB_PUBLIC_ACCESS, v);
        }

        let body = Bytes::from_static(EMPTY_SIGNED_IDENTIFIERS.as_bytes());
        Ok(req
            .header(CONTENT_TYPE, "application/xml")
            .header(CONTENT_LENGTH, body.len())
            .body(body)?)
    }

    fn get_properties_request(&self) -> azcontainer_core::Result<Request<Bytes>> {
        Ok(self.request(Method::GET, None).body(Bytes::new())?)
    }

    fn delete_request(&self) -> azcontainer_core::Result<Request<Bytes>> {
        Ok(self.request(Method::DELETE, None).body(Bytes::new())?)
    }

    /// Sign and send `req`, turning any non-2xx reply into a [`StorageError`].
    async fn send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        let (mut parts, body) = req.into_parts();
        self.signer.sign(&mut parts).await?;

        debug!("sending container request: {} {}", parts.method, parts.uri);
        let resp = self.ctx.http_send(Request::from_parts(parts, body)).await?;
        debug!("container request responded: {}", resp.status());

        if resp.status().is_success() {
            Ok(resp)
        } else {
            Err(StorageError::from_response(resp).into())
        }
    }
}

#[async_trait]
impl ContainerOperations for ContainerHandle {
    async fn create(&self, access: PublicAccessType, metadata: &Metadata) -> Result<()> {
        if !metadata.is_empty() {
            debug!(
                "container {} is created without its {} metadata entries",
                self.container_name,
                metadata.len()
            );
        }

        self.send(self.create_request(access)?).await?;
        Ok(())
    }

    async fn update(&self, access: PublicAccessType, metadata: &Metadata) -> Result<()> {
        self.send(self.set_metadata_request(metadata)?).await?;
        self.send(self.set_access_policy_request(access)?).await?;
        Ok(())
    }

    async fn get(&self) -> Result<ContainerProperties> {
        let resp = self.send(self.get_properties_request()?).await?;
        Ok(parse_properties(resp.headers())?)
    }

    async fn delete(&self) -> Result<()> {
        self.send(self.delete_request()?).await?;
        Ok(())
    }
}

/// Endpoint in the public Azure cloud, the account name becomes a DNS label.
fn public_endpoint(account_name: &str) -> azcontainer_core::Result<String> {
    let valid = (3..=24).contains(&account_name.len())
        && account_name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if !valid {
        return Err(azcontainer_core::Error::config_invalid(format!(
            "invalid storage account name {account_name:?}: expected 3 to 24 lowercase letters or digits"
        )));
    }

    Ok(default_endpoint(account_name))
}

/// Container names are 3 to 63 lowercase letters, digits and single hyphens,
/// starting and ending with a letter or digit.
///
/// - [Naming containers](https://learn.microsoft.com/en-us/rest/api/storageservices/naming-and-referencing-containers--blobs--and-metadata#container-names)
fn validate_container_name(name: &str) -> azcontainer_core::Result<()> {
    let valid = (3..=63).contains(&name.len())
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--");
    if !valid {
        return Err(azcontainer_core::Error::config_invalid(format!(
            "invalid container name {name:?}: expected 3 to 63 lowercase letters, digits or single hyphens"
        )));
    }

    Ok(())
}

/// Read access level and metadata from Get Container Properties headers.
fn parse_properties(headers: &HeaderMap) -> azcontainer_core::Result<ContainerProperties> {
    let public_access = PublicAccessType::from_header_value(
        headers
            .get(X_MS_BLOB_PUBLIC_ACCESS)
            .map(|v| v.to_str())
            .transpose()?,
    )?;

    let mut metadata = Metadata::new();
    for (name, value) in headers {
        if let Some(key) = name.as_str().strip_prefix(X_MS_META_PREFIX) {
            metadata.insert(key.to_string(), value.to_str()?.to_string());
        }
    }

    Ok(ContainerProperties {
        public_access,
        metadata: (!metadata.is_empty()).then_some(metadata),
    })
}
