//! Shared helpers for integration tests
#![allow(dead_code)]

use qamon::bootstrap::{initialize, InitContext};
use qamon::config::{MonitorConfig, NotifyConfig};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Checklist with one Automated exact test, one contains test and one manual test
pub fn sample_checklist() -> Value {
    json!([
        {
            "module": "Users",
            "owner": "platform-team",
            "tests": [
                {
                    "test_case": "Get user",
                    "api_endpoint": "/users/{user_id}",
                    "automation_type": "Automated",
                    "expected_response": {"id": 123},
                    "check_type": "contains",
                    "pass_fail": null,
                    "notes": "",
                    "priority": "high"
                },
                {
                    "test_case": "Service status",
                    "api_endpoint": "/status",
                    "automation_type": "Automated",
                    "expected_response": {"status": "ok"},
                    "check_type": "exact"
                },
                {
                    "test_case": "Visual review",
                    "api_endpoint": "/",
                    "automation_type": "Manual",
                    "expected_response": {},
                    "check_type": "exact"
                }
            ]
        }
    ])
}

/// Write the checklist and return a config rooted at `dir`
pub fn monitor_config(dir: &Path, base_url: &str, checklist: &Value) -> MonitorConfig {
    let checklist_file = dir.join("kilo_qa_checklist.json");
    std::fs::write(&checklist_file, serde_json::to_vec_pretty(checklist).unwrap()).unwrap();

    MonitorConfig {
        api_base_url: base_url.to_string(),
        refresh_interval: Duration::from_millis(50),
        request_timeout: Duration::from_secs(2),
        placeholders: HashMap::from([("user_id".to_string(), "123".to_string())]),
        checklist_file,
        results_file: dir.join("out").join("kilo_qa_checklist_results.json"),
        history_file: dir.join("out").join("kilo_qa_history.json"),
    }
}

/// Notification config with webhooks pointing at `webhook_base`
pub fn webhook_config(webhook_base: &str) -> NotifyConfig {
    NotifyConfig {
        slack_webhook_url: Some(format!("{webhook_base}/slack")),
        discord_webhook_url: Some(format!("{webhook_base}/discord")),
        teams_webhook_url: Some(format!("{webhook_base}/teams")),
        timeout: Duration::from_secs(2),
        ..NotifyConfig::default()
    }
}

/// Initialize everything against a temporary directory
pub fn init(dir: &Path, base_url: &str, notify: &NotifyConfig) -> InitContext {
    let config = monitor_config(dir, base_url, &sample_checklist());
    initialize(&config, notify).expect("initialize")
}
