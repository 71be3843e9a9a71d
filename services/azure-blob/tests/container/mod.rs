use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use azcontainer_azure_blob::{
    is_not_found, Config, ContainerHandle, ContainerOperations, ContainerProperties, Error,
    ErrorKind, Metadata, PublicAccessType,
};
use azcontainer_core::{Context, HttpSend, StaticEnv};
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::fake::FakeBlobService;

const ACCOUNT: &str = "myaccount";
const KEY: &str = "YWNjb3VudF9rZXkK";

fn handle(fake: &FakeBlobService) -> ContainerHandle {
    ContainerHandle::new(fake.context(), ACCOUNT, KEY, "logs").unwrap()
}

fn env_prod() -> Metadata {
    Metadata::from([("env".to_string(), "prod".to_string())])
}

#[test_case("myaccount", "logs"; "plain")]
#[test_case("devstoreaccount1", "backups-2024"; "dashed container")]
fn test_handle_addresses_one_container(account: &str, container: &str) {
    let handle = ContainerHandle::new(Context::new(), account, KEY, container).unwrap();

    assert_eq!(
        handle.endpoint(),
        format!("https://{account}.blob.core.windows.net")
    );
    assert_eq!(handle.container_name(), container);
}

#[test_case(""; "empty")]
#[test_case("not base64!"; "invalid characters")]
#[test_case("%%%%"; "percent signs")]
fn test_malformed_key_is_rejected(key: &str) {
    let err = ContainerHandle::new(Context::new(), ACCOUNT, key, "logs").unwrap_err();

    match &err {
        Error::Client(err) => {
            assert_eq!(err.kind(), azcontainer_core::ErrorKind::CredentialInvalid)
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Unknown);
}

fn assert_config_invalid(err: Error) {
    match err {
        Error::Client(err) => {
            assert_eq!(err.kind(), azcontainer_core::ErrorKind::ConfigInvalid)
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_case("logs#other"; "fragment")]
#[test_case("team/logs"; "path separator")]
#[test_case("logs?comp=acl"; "query")]
#[test_case("Logs"; "uppercase")]
#[test_case("lo--gs"; "double hyphen")]
fn test_container_name_outside_naming_rules_is_rejected(container: &str) {
    let fake = FakeBlobService::new();

    let err = ContainerHandle::new(fake.context(), ACCOUNT, KEY, container).unwrap_err();

    assert_config_invalid(err);
    assert!(fake.calls().is_empty());
    assert!(!fake.exists("logs"));
    assert!(!fake.exists("other"));
}

#[test_case("evil.example.com/x"; "host injection")]
#[test_case("my.account"; "dotted")]
fn test_account_name_outside_naming_rules_is_rejected(account: &str) {
    let fake = FakeBlobService::new();

    let err = ContainerHandle::new(fake.context(), account, KEY, "logs").unwrap_err();

    assert_config_invalid(err);
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_update_with_non_ascii_metadata_sends_nothing() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);
    handle
        .create(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap();

    let metadata = Metadata::from([("owner".to_string(), "José".to_string())]);
    let err = handle
        .update(PublicAccessType::Blob, &metadata)
        .await
        .unwrap_err();

    match &err {
        Error::Client(err) => {
            assert_eq!(err.kind(), azcontainer_core::ErrorKind::RequestInvalid)
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!is_not_found(&err));
    assert_eq!(fake.calls(), vec!["create"]);
    assert_eq!(
        handle.get().await.unwrap(),
        ContainerProperties::default()
    );
}

#[tokio::test]
async fn test_get_after_create_reports_absent_metadata() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);

    handle
        .create(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap();

    assert!(fake.exists("logs"));
    assert_eq!(
        handle.get().await.unwrap(),
        ContainerProperties {
            public_access: PublicAccessType::None,
            metadata: None,
        }
    );
}

#[tokio::test]
async fn test_create_does_not_apply_metadata() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);

    handle
        .create(PublicAccessType::Container, &env_prod())
        .await
        .unwrap();

    let props = handle.get().await.unwrap();
    assert_eq!(props.public_access, PublicAccessType::Container);
    assert_eq!(props.metadata, None);
}

#[tokio::test]
async fn test_create_existing_container_conflicts() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);

    handle
        .create(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap();
    let err = handle
        .create(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(!is_not_found(&err));
    match err {
        Error::Storage(err) => {
            assert_eq!(err.status(), StatusCode::CONFLICT);
            assert_eq!(err.code(), Some("ContainerAlreadyExists"));
            assert_eq!(err.request_id(), Some("fake-request"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_update_stops_when_metadata_fails() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);
    handle
        .create(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap();

    fake.fail_next("set_metadata", StatusCode::SERVICE_UNAVAILABLE);
    let err = handle
        .update(PublicAccessType::Blob, &env_prod())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(fake.calls(), vec!["create", "set_metadata"]);
    assert_eq!(
        handle.get().await.unwrap(),
        ContainerProperties::default()
    );
}

#[tokio::test]
async fn test_update_is_not_atomic() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);
    handle
        .create(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap();

    fake.fail_next("set_acl", StatusCode::INTERNAL_SERVER_ERROR);
    let err = handle
        .update(PublicAccessType::Blob, &env_prod())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transient);
    assert_eq!(fake.calls(), vec!["create", "set_metadata", "set_acl"]);
    assert_eq!(
        handle.get().await.unwrap(),
        ContainerProperties {
            public_access: PublicAccessType::None,
            metadata: Some(env_prod()),
        }
    );
}

#[tokio::test]
async fn test_update_missing_container() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);

    let err = handle
        .update(PublicAccessType::Blob, &env_prod())
        .await
        .unwrap_err();

    assert!(is_not_found(&err));
    assert_eq!(fake.calls(), vec!["set_metadata"]);
}

#[tokio::test]
async fn test_container_lifecycle() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);

    handle
        .create(PublicAccessType::None, &env_prod())
        .await
        .unwrap();
    assert_eq!(
        handle.get().await.unwrap(),
        ContainerProperties {
            public_access: PublicAccessType::None,
            metadata: None,
        }
    );

    handle
        .update(PublicAccessType::Blob, &env_prod())
        .await
        .unwrap();
    assert_eq!(
        handle.get().await.unwrap(),
        ContainerProperties {
            public_access: PublicAccessType::Blob,
            metadata: Some(env_prod()),
        }
    );

    handle
        .update(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap();
    assert_eq!(
        handle.get().await.unwrap(),
        ContainerProperties::default()
    );

    handle.delete().await.unwrap();
    assert!(!fake.exists("logs"));
    assert_eq!(
        fake.calls(),
        vec![
            "create",
            "get_properties",
            "set_metadata",
            "set_acl",
            "get_properties",
            "set_metadata",
            "set_acl",
            "get_properties",
            "delete",
        ]
    );
}

#[tokio::test]
async fn test_get_and_delete_after_delete_are_not_found() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);
    handle
        .create(PublicAccessType::None, &Metadata::new())
        .await
        .unwrap();
    handle.delete().await.unwrap();

    let err = handle.get().await.unwrap_err();
    assert!(is_not_found(&err));
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = handle.delete().await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_is_not_found_is_structural() {
    let fake = FakeBlobService::new();
    let handle = handle(&fake);

    let err = handle.get().await.unwrap_err();
    let storage_err = match &err {
        Error::Storage(err) => err.clone(),
        other => panic!("unexpected error: {other:?}"),
    };
    assert!(is_not_found(&err));
    assert!(is_not_found(&storage_err));

    let wrapped = anyhow::Error::from(err).context("reconcile container");
    assert!(!is_not_found(wrapped.as_ref()));

    let generic = std::io::Error::new(std::io::ErrorKind::NotFound, "404 not found");
    assert!(!is_not_found(&generic));
}

#[tokio::test]
async fn test_transport_failure_is_client_error() {
    let handle = ContainerHandle::new(Context::new(), ACCOUNT, KEY, "logs").unwrap();

    let err = handle.get().await.unwrap_err();
    assert!(matches!(err, Error::Client(_)));
    assert_eq!(err.kind(), ErrorKind::Unknown);
    assert!(!is_not_found(&err));
}

#[derive(Debug)]
struct NeverRespond;

#[async_trait]
impl HttpSend for NeverRespond {
    async fn http_send(&self, _: Request<Bytes>) -> azcontainer_core::Result<Response<Bytes>> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_dropping_the_future_cancels_the_call() {
    let ctx = Context::new().with_http_send(NeverRespond);
    let handle = ContainerHandle::new(ctx, ACCOUNT, KEY, "logs").unwrap();

    let res = tokio::time::timeout(Duration::from_millis(50), handle.delete()).await;
    assert!(res.is_err());
}

#[tokio::test]
async fn test_handle_from_development_storage_env() {
    let fake = FakeBlobService::new();
    let ctx = fake.context().with_env(StaticEnv {
        envs: HashMap::from([
            (
                "AZURE_STORAGE_CONNECTION_STRING".to_string(),
                "UseDevelopmentStorage=true".to_string(),
            ),
            ("AZBLOB_CONTAINER".to_string(), "artifacts".to_string()),
        ]),
    });

    let config = Config::default().from_env(&ctx);
    let handle = ContainerHandle::from_config(ctx, &config).unwrap();
    assert_eq!(
        handle.url(),
        "http://127.0.0.1:10000/devstoreaccount1/artifacts"
    );

    handle
        .create(PublicAccessType::Blob, &Metadata::new())
        .await
        .unwrap();
    assert!(fake.exists("artifacts"));
    assert_eq!(
        handle.get().await.unwrap().public_access,
        PublicAccessType::Blob
    );
}
