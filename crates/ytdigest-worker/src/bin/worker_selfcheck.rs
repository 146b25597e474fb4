use std::path::Path;

use ytdigest_worker::config::{missing_required_env, StoreConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
    let store = StoreConfig::in_dir(&data_dir);

    println!(
        "worker-selfcheck: starting with data_dir={}",
        store.data_dir.display()
    );
    ensure_writable_dir(&store.data_dir).await?;
    ensure_env_present()?;

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_writable_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;

    let probe = path.join(".selfcheck");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("data dir {} not writable: {}", path.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_env_present() -> anyhow::Result<()> {
    let missing = missing_required_env();
    if !missing.is_empty() {
        return Err(anyhow::anyhow!(
            "missing required env vars: {}",
            missing.join(", ")
        ));
    }
    Ok(())
}
