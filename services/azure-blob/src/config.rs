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

use std::fmt::{Debug, Formatter};

use azcontainer_core::utils::Redact;
use azcontainer_core::{Context, Result};
use log::warn;

use crate::connection_string;
use crate::constants::*;

/// Config carries everything needed to address one container.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ACCOUNT_NAME` or `AZURE_STORAGE_ACCOUNT_NAME`
    /// - `AccountName` in `AZURE_STORAGE_CONNECTION_STRING`
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ACCOUNT_KEY` or `AZURE_STORAGE_ACCOUNT_KEY`
    /// - `AccountKey` in `AZURE_STORAGE_CONNECTION_STRING`
    pub account_key: Option<String>,
    /// `container_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_CONTAINER`
    pub container_name: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: `AZBLOB_ENDPOINT`
    /// - the blob endpoint in `AZURE_STORAGE_CONNECTION_STRING`
    ///
    /// Defaults to `https://{account_name}.blob.core.windows.net`.
    pub endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .field("container_name", &self.container_name)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Config {
    /// Fill unset fields from the environment carried by `ctx`.
    ///
    /// A malformed connection string is logged and skipped, explicit
    /// variables still apply.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let envs = ctx.env_vars();

        if self.account_name.is_none() {
            self.account_name = envs
                .get(AZBLOB_ACCOUNT_NAME)
                .or_else(|| envs.get(AZURE_STORAGE_ACCOUNT_NAME))
                .cloned();
        }

        if self.account_key.is_none() {
            self.account_key = envs
                .get(AZBLOB_ACCOUNT_KEY)
                .or_else(|| envs.get(AZURE_STORAGE_ACCOUNT_KEY))
                .cloned();
        }

        if self.container_name.is_none() {
            self.container_name = envs.get(AZBLOB_CONTAINER).cloned();
        }

        if self.endpoint.is_none() {
            self.endpoint = envs.get(AZBLOB_ENDPOINT).cloned();
        }

        if let Some(conn_str) = envs.get(AZURE_STORAGE_CONNECTION_STRING) {
            match Config::try_from_connection_string(conn_str) {
                Ok(parsed) => self = self.merge(parsed),
                Err(err) => warn!("ignore invalid {AZURE_STORAGE_CONNECTION_STRING}: {err}"),
            }
        }

        self
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to specify all required parameters
    /// because the user is still allowed to set them later directly on the object.
    ///
    /// An example of a connection string looks like:
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Keep fields already set on `self`, take the rest from `other`.
    fn merge(self, other: Config) -> Self {
        Self {
            account_name: self.account_name.or(other.account_name),
            account_key: self.account_key.or(other.account_key),
            container_name: self.container_name.or(other.container_name),
            endpoint: self.endpoint.or(other.endpoint),
        }
    }
}

/// Default service endpoint for `account_name`.
pub fn default_endpoint(account_name: &str) -> String {
    format!("https://{account_name}.blob.core.windows.net")
}
