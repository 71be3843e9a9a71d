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

//! Azure Blob Storage containers.
//!
//! Everything from `azcontainer-azure-blob` plus a shortcut that wires a
//! [`ContainerHandle`] to the default context.

pub use azcontainer_azure_blob::*;

#[cfg(feature = "default-context")]
use crate::default_context;

/// Create a handle for `container_name` using [`default_context`].
///
/// ```no_run
/// # fn example() -> azcontainer::azure::Result<()> {
/// let handle = azcontainer::azure::default_container_handle(
///     "myaccount",
///     "YWNjb3VudF9rZXkK",
///     "logs",
/// )?;
/// assert_eq!(handle.container_name(), "logs");
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_container_handle(
    account_name: &str,
    account_key: &str,
    container_name: &str,
) -> Result<ContainerHandle> {
    ContainerHandle::new(default_context(), account_name, account_key, container_name)
}

/// Create a handle from `AZBLOB_*` / `AZURE_STORAGE_*` variables using
/// [`default_context`].
///
/// See [`Config`] for the variables that are read.
#[cfg(feature = "default-context")]
pub fn container_handle_from_env() -> Result<ContainerHandle> {
    let ctx = default_context();
    let config = Config::default().from_env(&ctx);
    ContainerHandle::from_config(ctx, &config)
}

#[cfg(all(test, feature = "default-context"))]
mod tests {
    use super::*;

    #[test]
    fn test_default_container_handle() {
        let handle = default_container_handle("myaccount", "YWNjb3VudF9rZXkK", "logs").unwrap();
        assert_eq!(handle.url(), "https://myaccount.blob.core.windows.net/logs");
    }

    #[test]
    fn test_default_container_handle_with_malformed_key() {
        let err = default_container_handle("myaccount", "not base64!", "logs").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unknown);
        assert!(!is_not_found(&err));
    }
}
