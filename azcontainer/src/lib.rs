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

//! Manage Azure Blob Storage containers.
//!
//! `azcontainer` bundles [`azcontainer_core`] with the Azure Blob container
//! adapter and, behind the `default-context` feature, a ready to use
//! [`Context`] backed by reqwest and the process environment.
//!
//! ## Example
//!
//! ```no_run
//! use azcontainer::azure::{self, ContainerOperations, Metadata, PublicAccessType};
//!
//! # async fn example() -> azure::Result<()> {
//! let handle = azure::default_container_handle("myaccount", "YWNjb3VudF9rZXkK", "logs")?;
//!
//! handle.create(PublicAccessType::None, &Metadata::new()).await?;
//! let props = handle.get().await?;
//! println!("access: {}, metadata: {:?}", props.public_access, props.metadata);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub use azcontainer_core::*;

#[cfg(feature = "default-context")]
mod context;
#[cfg(feature = "default-context")]
pub use context::default_context;

pub mod azure;
