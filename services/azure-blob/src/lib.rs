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

//! Azure Blob Storage container support for azcontainer.
//!
//! This crate turns a storage account name, its shared key and a container
//! name into a [`ContainerHandle`] that can create, update, inspect and
//! delete that container. Requests are signed with
//! [Shared Key authorization](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
//! and sent through the [`HttpSend`](azcontainer_core::HttpSend) carried by
//! the [`Context`](azcontainer_core::Context).
//!
//! ## Example
//!
//! ```no_run
//! use azcontainer_azure_blob::{
//!     is_not_found, ContainerHandle, ContainerOperations, Metadata, PublicAccessType,
//! };
//! use azcontainer_core::Context;
//!
//! # async fn example(ctx: Context) -> azcontainer_azure_blob::Result<()> {
//! let handle = ContainerHandle::new(ctx, "myaccount", "YWNjb3VudF9rZXkK", "logs")?;
//!
//! if let Err(err) = handle.create(PublicAccessType::None, &Metadata::new()).await {
//!     if err.kind() != azcontainer_azure_blob::ErrorKind::Conflict {
//!         return Err(err);
//!     }
//! }
//!
//! let metadata = Metadata::from([("env".to_string(), "prod".to_string())]);
//! handle.update(PublicAccessType::Blob, &metadata).await?;
//!
//! match handle.delete().await {
//!     Err(err) if is_not_found(&err) => {}
//!     other => other?,
//! }
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::USER_AGENT;

mod config;
pub use config::Config;

mod connection_string;

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::StaticCredentialProvider;

mod sign_request;
pub use sign_request::RequestSigner;

mod model;
pub use model::{ContainerProperties, Metadata, PublicAccessType};

mod error;
pub use error::{classify, is_not_found, Error, ErrorKind, Result, StorageError};

mod container;
pub use container::{ContainerHandle, ContainerOperations};
