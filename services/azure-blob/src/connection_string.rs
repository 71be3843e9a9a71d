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

use azcontainer_core::{Error, Result};

use crate::Config;

// Azurite defaults.
const AZURITE_ACCOUNT_NAME: &str = "devstoreaccount1";
const AZURITE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const AZURITE_BLOB_URI: &str = "http://127.0.0.1:10000";

/// Parses the blob related fields of an [Azure connection string][1].
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let fields = split_fields(conn_str)?;

    if fields.get("UseDevelopmentStorage").map(String::as_str) == Some("true") {
        return Ok(development_config(&fields));
    }

    Ok(Config {
        account_name: fields.get("AccountName").cloned(),
        account_key: fields.get("AccountKey").cloned(),
        endpoint: blob_endpoint(&fields)?,
        ..Default::default()
    })
}

fn split_fields(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            let (key, value) = field.split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

fn development_config(fields: &HashMap<String, String>) -> Config {
    let account_name = fields
        .get("AccountName")
        .map(String::as_str)
        .unwrap_or(AZURITE_ACCOUNT_NAME);
    let account_key = fields
        .get("AccountKey")
        .map(String::as_str)
        .unwrap_or(AZURITE_ACCOUNT_KEY);
    let proxy_uri = fields
        .get("DevelopmentStorageProxyUri")
        .map(String::as_str)
        .unwrap_or(AZURITE_BLOB_URI);

    Config {
        account_name: Some(account_name.to_string()),
        account_key: Some(account_key.to_string()),
        endpoint: Some(format!("{proxy_uri}/{account_name}")),
        ..Default::default()
    }
}

/// `BlobEndpoint` wins, otherwise the endpoint is built from the account
/// name and `EndpointSuffix` when both are present.
fn blob_endpoint(fields: &HashMap<String, String>) -> Result<Option<String>> {
    if let Some(endpoint) = fields.get("BlobEndpoint") {
        return Ok(Some(endpoint.clone()));
    }

    let (Some(account_name), Some(suffix)) =
        (fields.get("AccountName"), fields.get("EndpointSuffix"))
    else {
        return Ok(None);
    };

    let protocol = fields
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    if protocol != "http" && protocol != "https" {
        return Err(Error::config_invalid(format!(
            "invalid DefaultEndpointsProtocol: {protocol}"
        )));
    }

    Ok(Some(format!("{protocol}://{account_name}.blob.{suffix}")))
}
