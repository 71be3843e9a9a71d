use anyhow::Result;
use azcontainer::azure::{
    container_handle_from_env, is_not_found, ContainerOperations, Metadata, PublicAccessType,
};

/// Reads `AZBLOB_ACCOUNT_NAME`, `AZBLOB_ACCOUNT_KEY` and `AZBLOB_CONTAINER`
/// (or `AZURE_STORAGE_CONNECTION_STRING`), then walks the container through
/// create, update, get and delete.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let handle = container_handle_from_env()?;
    println!("using container {}", handle.url());

    handle
        .create(PublicAccessType::None, &Metadata::new())
        .await?;

    let metadata = Metadata::from([("env".to_string(), "dev".to_string())]);
    handle.update(PublicAccessType::None, &metadata).await?;

    let props = handle.get().await?;
    println!(
        "public access: {}, metadata: {:?}",
        props.public_access, props.metadata
    );

    match handle.delete().await {
        Err(err) if is_not_found(&err) => println!("container already gone"),
        other => other?,
    }

    Ok(())
}
