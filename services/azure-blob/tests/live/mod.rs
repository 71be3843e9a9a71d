use std::env;

use anyhow::Result;
use azcontainer_azure_blob::{
    is_not_found, Config, ContainerHandle, ContainerOperations, Metadata, PublicAccessType,
};
use azcontainer_core::{Context, OsEnv};
use azcontainer_http_send_reqwest::ReqwestHttpSend;
use log::{debug, warn};
use pretty_assertions::assert_eq;

/// Build a handle for a fresh container, `None` unless live tests are on.
///
/// Reads the same variables as [`Config::from_env`], the container name is
/// generated so runs never collide.
fn init_handle() -> Option<ContainerHandle> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("AZCONTAINER_AZURE_BLOB_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);
    let config = Config {
        container_name: Some(format!(
            "azcontainer-test-{}",
            chrono::Utc::now().timestamp_millis()
        )),
        ..Default::default()
    }
    .from_env(&ctx);

    Some(ContainerHandle::from_config(ctx, &config).expect("config must be valid"))
}

#[tokio::test]
async fn test_live_container_lifecycle() -> Result<()> {
    let Some(handle) = init_handle() else {
        warn!("AZCONTAINER_AZURE_BLOB_TEST is not set, skipped");
        return Ok(());
    };
    debug!("running against {}", handle.url());

    let metadata = Metadata::from([("env".to_string(), "test".to_string())]);

    handle.create(PublicAccessType::None, &metadata).await?;
    let props = handle.get().await?;
    assert_eq!(props.public_access, PublicAccessType::None);
    assert_eq!(props.metadata, None);

    handle.update(PublicAccessType::None, &metadata).await?;
    let props = handle.get().await?;
    assert_eq!(props.metadata, Some(metadata));

    handle.delete().await?;

    // Deletion is asynchronous on the service side, a second delete either
    // reports not found or a conflict while the first one is in progress.
    match handle.delete().await {
        Err(err) if is_not_found(&err) => {}
        Err(err) => debug!("second delete failed: {err}"),
        Ok(()) => panic!("container must be gone"),
    }

    Ok(())
}
