use crate::search::SearchEngine;
use crate::state::CatalogStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

/// Catalog store probe result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreHealth {
    pub status: Status,
    pub error: Option<String>,
}

/// Search engine probe result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineHealth {
    pub status: Status,
    pub error: Option<String>,

    /// Nodes the client is configured to use
    pub nodes: Vec<String>,

    pub cluster_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServicesHealth {
    pub database: StoreHealth,
    pub search: EngineHealth,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub timestamp: DateTime<Utc>,
    pub services: ServicesHealth,
}

/// Probe both backends; one failing never hides the other's status
pub async fn check_health(store: &dyn CatalogStore, engine: &dyn SearchEngine) -> HealthReport {
    let database = match store.ping().await {
        Ok(()) => StoreHealth {
            status: Status::Up,
            error: None,
        },
        Err(e) => StoreHealth {
            status: Status::Down,
            error: Some(e.to_string()),
        },
    };

    let mut search = EngineHealth {
        status: Status::Down,
        error: None,
        nodes: engine.nodes(),
        cluster_status: None,
    };
    let probe = async {
        engine.ping().await?;
        engine.cluster_health().await
    };
    match probe.await {
        Ok(cluster_status) => {
            search.status = Status::Up;
            search.cluster_status = Some(cluster_status);
        }
        Err(e) => search.error = Some(e.to_string()),
    }

    HealthReport {
        healthy: database.status == Status::Up && search.status == Status::Up,
        timestamp: Utc::now(),
        services: ServicesHealth { database, search },
    }
}
