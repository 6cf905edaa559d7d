use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use std::collections::HashMap;
use std::env;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

/*
    /health
*/
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    health
        .services
        .insert("plan_store".to_string(), check_plan_store(&state).await);

    let config = &state.config;
    let keys = [
        ("openai", "OPENAI_API_KEY", &config.openai_api_key),
        ("google_maps", "GOOGLE_MAPS_API_KEY", &config.google_maps_api_key),
        ("hotels", "HOTEL_API_KEY", &config.hotel_api_key),
        ("weather", "WEATHER_API_KEY", &config.weather_api_key),
    ];
    for (service, variable, key) in keys {
        health
            .services
            .insert(service.to_string(), check_api_key(variable, key.as_deref()));
    }

    // Any failing dependency degrades the overall status
    if health.services.values().any(|service| service.status != "ok") {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_plan_store(state: &AppState) -> ServiceStatus {
    match state.store.ping().await {
        Ok(()) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Plan store reachable".to_string()),
        },
        Err(e) => {
            log::error!("Plan store health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to reach plan store: {}", e)),
            }
        }
    }
}

fn check_api_key(variable: &str, key: Option<&str>) -> ServiceStatus {
    match key {
        Some(key) => ServiceStatus {
            status: "ok".to_string(),
            details: Some(format!("{} configured ({})", variable, mask_key(key))),
        },
        None => ServiceStatus {
            status: "error".to_string(),
            details: Some(format!("{} not configured", variable)),
        },
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    } else {
        "***".to_string()
    }
}
