use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::core::config::{AppConfig, ServerConfig};
use crate::core::shared::clock::FixedClock;
use crate::core::shared::state::AppState;
use crate::store::{ActivityEvent, MemoryStore, Person};

pub fn sample_event(id: i64, org_id: &str, account_id: &str, ts: DateTime<Utc>) -> ActivityEvent {
    ActivityEvent {
        id,
        touchpoint_id: format!("tp_{id}"),
        customer_org_id: org_id.to_string(),
        account_id: Some(account_id.to_string()),
        timestamp: ts,
        channel: Some("Email".to_string()),
        status: Some("Sent".to_string()),
        direction: Some("OUT".to_string()),
        activity: Some(format!("Touchpoint {id}")),
        people: json!([]),
        involved_team_ids: json!([]),
    }
}

pub fn sample_person(id: &str, org_id: &str, first_name: &str, last_name: &str) -> Person {
    Person {
        id: id.to_string(),
        customer_org_id: org_id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: Some(format!("{}@example.com", first_name.to_lowercase())),
        title: None,
        company: None,
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database_url: String::new(),
        pool_size: 1,
        cors_allowed_origins: Vec::new(),
        run_migrations: false,
    }
}

/// App state over an in-memory store with a frozen clock.
pub fn create_test_app_state(store: Arc<MemoryStore>, now: DateTime<Utc>) -> Arc<AppState> {
    Arc::new(AppState {
        config: test_config(),
        store,
        clock: Arc::new(FixedClock(now)),
    })
}
