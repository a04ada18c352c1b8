// SPDX-FileCopyrightText: 2026 Vigil Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use vigil_config::VigilConfig;
use vigil_core::VigilError;
use vigil_cost::UsageLedger;

/// Print the usage snapshot for `key` as pretty JSON.
pub async fn run_usage(config: &VigilConfig, key: &str) -> Result<(), VigilError> {
    if !config.keys.iter().any(|p| p.key == key) {
        eprintln!("vigil: warning: key is not in the configured policy set");
    }
    let ledger =
        UsageLedger::open(&config.storage.database_path, config.storage.wal_mode).await?;
    let snapshot = ledger.snapshot(key).await?;
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| VigilError::Internal(format!("failed to encode snapshot: {e}")))?;
    println!("{json}");
    Ok(())
}
