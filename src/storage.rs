use crate::models::StatisticsSnapshot;
use crate::snapshot::overview_snapshot;
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

pub async fn load_snapshot(path: &Path) -> Option<StatisticsSnapshot> {
    let payload = read_json(path).await?;
    decoded(path, StatisticsSnapshot::try_from(payload))
}

pub async fn load_overview(path: &Path) -> Option<StatisticsSnapshot> {
    let payload = read_json(path).await?;
    decoded(path, overview_snapshot(payload))
}

async fn read_json(path: &Path) -> Option<Value> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                error!("failed to parse {}: {err}", path.display());
                None
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            error!("failed to read {}: {err}", path.display());
            None
        }
    }
}

fn decoded<E: std::fmt::Display>(
    path: &Path,
    result: Result<StatisticsSnapshot, E>,
) -> Option<StatisticsSnapshot> {
    match result {
        Ok(snapshot) => {
            info!("loaded statistics from {}", path.display());
            Some(snapshot)
        }
        Err(err) => {
            error!("rejected statistics in {}: {err}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("helpdesk_stats_{}_{name}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn loads_seeded_payload() {
        let path = temp_path("seeded");
        fs::write(&path, r#"{"ticketStatuses": {"labels": ["Open"], "data": [2]}}"#)
            .await
            .unwrap();

        let snapshot = load_snapshot(&path).await.expect("snapshot");
        assert!(snapshot.series("ticketStatuses").is_some());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_or_invalid_files_yield_none() {
        assert!(load_snapshot(&temp_path("absent")).await.is_none());

        let path = temp_path("invalid");
        fs::write(&path, b"[1, 2, 3]").await.unwrap();
        assert!(load_snapshot(&path).await.is_none());
        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn loads_overview_page_data() {
        let path = temp_path("overview");
        fs::write(&path, r#"{"region_data": [{"region": "North", "count": 6}]}"#)
            .await
            .unwrap();

        let snapshot = load_overview(&path).await.expect("overview");
        assert_eq!(
            snapshot.series("region_data").unwrap().points().unwrap()[0].label,
            "North"
        );
        let _ = fs::remove_file(&path).await;
    }
}
