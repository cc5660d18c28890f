use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::System;
use tracing::{info, warn};

use crate::adapters::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "mealCount")]
    pub meal_count: Option<u64>,
    #[serde(rename = "shareSessions")]
    pub share_sessions: usize,
    #[serde(rename = "livePreviews")]
    pub live_previews: usize,
    pub config: HealthConfigInfo,
    pub metrics: SystemMetrics,
}

#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    #[serde(rename = "cpuUsagePercent")]
    pub cpu_usage_percent: f32,
    #[serde(rename = "memoryUsedBytes")]
    pub memory_used_bytes: u64,
    #[serde(rename = "memoryTotalBytes")]
    pub memory_total_bytes: u64,
    #[serde(rename = "memoryUsagePercent")]
    pub memory_usage_percent: f32,
}

#[derive(Debug, Serialize)]
pub struct HealthConfigInfo {
    #[serde(rename = "maxImageSize")]
    pub max_image_size: u64,
    #[serde(rename = "uploadBodyLimit")]
    pub upload_body_limit: usize,
    #[serde(rename = "shareSessionTtlSecs")]
    pub share_session_ttl_secs: u64,
}

pub struct HealthController;

impl HealthController {
    /// GET /health
    pub async fn health_check(State(app_state): State<AppState>) -> Json<HealthResponse> {
        info!("Health check requested");

        let (status, meal_count) = match app_state.meal_repository.count().await {
            Ok(count) => ("healthy", Some(count)),
            Err(e) => {
                warn!("Health check could not count meals: {:?}", e);
                ("degraded", None)
            }
        };

        let config = HealthConfigInfo {
            max_image_size: app_state.config.max_image_size,
            upload_body_limit: app_state.config.upload_body_limit,
            share_session_ttl_secs: app_state.config.share_session_ttl_secs,
        };

        let mut sys = System::new();
        sys.refresh_cpu_usage();
        sys.refresh_memory();

        let memory_used = sys.used_memory();
        let memory_total = sys.total_memory();
        let memory_usage_percent = if memory_total > 0 {
            (memory_used as f32 / memory_total as f32) * 100.0
        } else {
            0.0
        };

        let metrics = SystemMetrics {
            cpu_usage_percent: sys.global_cpu_usage(),
            memory_used_bytes: memory_used,
            memory_total_bytes: memory_total,
            memory_usage_percent,
        };

        Json(HealthResponse {
            status: status.to_string(),
            timestamp: Utc::now(),
            meal_count,
            share_sessions: app_state.share_sessions.len(),
            live_previews: app_state.previews.len(),
            config,
            metrics,
        })
    }
}
