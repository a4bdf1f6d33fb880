use crate::config::DataConfig;
use crate::error::{AppError, Result};
use crate::models::Dataset;
use crate::store::{InMemoryStore, ReportStore};
use std::path::Path;
use std::sync::Arc;

/// Create a report store based on configuration
pub fn create_store(config: &DataConfig) -> Result<Arc<dyn ReportStore>> {
    match config.seed_path.as_ref() {
        Some(path) => {
            tracing::info!(path = ?path, "Initializing in-memory store from seed file");
            let dataset = load_dataset(path)?;
            tracing::info!(
                orders = dataset.orders.len(),
                visits = dataset.visits.len(),
                quotations = dataset.quotations.len(),
                "Seed data loaded"
            );
            Ok(Arc::new(InMemoryStore::from_dataset(dataset)))
        }
        None => Ok(create_in_memory_store()),
    }
}

/// Create an empty in-memory store (for testing and development)
pub fn create_in_memory_store() -> Arc<dyn ReportStore> {
    tracing::info!("Initializing empty in-memory store");
    Arc::new(InMemoryStore::new())
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::Configuration(format!("Cannot read seed file {}: {}", path.display(), e))
    })?;
    let dataset = serde_json::from_str(&raw)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DatePredicate, RowQuery};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_create_store_from_seed_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"quotations":[{{"id":7,"code":"COT-7","client":"Hospital Sur",
                "status":"approved","amount":250.0,"created_at":"2024-02-01T10:00:00Z"}}]}}"#
        )
        .unwrap();

        let config = DataConfig {
            seed_path: Some(file.path().to_path_buf()),
        };
        let store = create_store(&config).unwrap();

        let quotations = store
            .quotations(&RowQuery::newest_first(DatePredicate::unbounded()))
            .await
            .unwrap();
        assert_eq!(quotations.len(), 1);
        assert_eq!(quotations[0].id, 7);
        assert!(store.orders(&RowQuery::default()).await.unwrap().is_empty());
    }

    #[test]
    fn test_missing_seed_file_is_configuration_error() {
        let config = DataConfig {
            seed_path: Some("/nonexistent/seed.json".into()),
        };
        assert!(matches!(create_store(&config), Err(AppError::Configuration(_))));
    }
}
