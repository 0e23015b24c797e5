use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Instant;

use crate::cache::RedisPageCache;

/// Backends probed by the readiness check. `None` means the service runs
/// on the in-memory backend for that concern.
#[derive(Clone, Default)]
pub struct HealthState {
    pub db_pool: Option<PgPool>,
    pub redis: Option<RedisPageCache>,
}

impl HealthState {
    pub fn new(db_pool: Option<PgPool>, redis: Option<RedisPageCache>) -> Self {
        Self { db_pool, redis }
    }

    async fn check_postgres(&self) -> Option<Result<(), String>> {
        let pool = self.db_pool.as_ref()?;
        Some(
            sqlx::query("SELECT 1")
                .fetch_one(pool)
                .await
                .map(|_| ())
                .map_err(|e| e.to_string()),
        )
    }

    async fn check_redis(&self) -> Option<Result<(), String>> {
        let redis = self.redis.as_ref()?;
        Some(redis.ping().await.map_err(|e| e.to_string()))
    }
}

#[derive(Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

fn component(name: &str, result: Option<Result<(), String>>, started: Instant) -> ComponentCheck {
    let latency_ms = Some(started.elapsed().as_millis() as u64);
    match result {
        Some(Ok(())) => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: format!("{} reachable", name),
            latency_ms,
        },
        Some(Err(e)) => ComponentCheck {
            status: ComponentStatus::Unhealthy,
            message: format!("{} check failed: {}", name, e),
            latency_ms,
        },
        None => ComponentCheck {
            status: ComponentStatus::Healthy,
            message: "in-memory backend".to_string(),
            latency_ms: None,
        },
    }
}

pub async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match state.check_postgres().await {
        Some(Err(e)) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "blog-service"
        })),
        _ => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "blog-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    }
}

pub async fn readiness_summary(state: web::Data<HealthState>) -> HttpResponse {
    let mut checks = HashMap::new();

    let started = Instant::now();
    let postgres = component("PostgreSQL", state.check_postgres().await, started);
    checks.insert("postgresql".to_string(), postgres);

    let started = Instant::now();
    let redis = component("Redis", state.check_redis().await, started);
    checks.insert("redis".to_string(), redis);

    let ready = checks
        .values()
        .all(|check| check.status == ComponentStatus::Healthy);
    let response = ReadinessResponse {
        ready,
        status: if ready {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}
