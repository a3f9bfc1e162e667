use std::path::{Path, PathBuf};

use keel_core::models::delivery_config::DeliveryConfig;

/// Read every `*.json` delivery config in `dir`, in file name order.
pub fn load_manifests(dir: &Path) -> eyre::Result<Vec<DeliveryConfig>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| eyre::eyre!("failed to read manifest dir {}: {e}", dir.display()))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let contents = std::fs::read_to_string(path)?;
            serde_json::from_str::<DeliveryConfig>(&contents)
                .map_err(|e| eyre::eyre!("invalid delivery config {}: {e}", path.display()))
        })
        .collect()
}
