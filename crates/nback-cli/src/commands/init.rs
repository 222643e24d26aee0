//! The `nback init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("nback.toml").exists() {
        println!("nback.toml already exists, skipping.");
    } else {
        std::fs::write("nback.toml", SAMPLE_CONFIG)?;
        println!("Created nback.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit nback.toml (set the webhook URL, or delete the [collector] section)");
    println!("  2. Run: nback run --name Ada --email ada@example.com");
    println!("  3. Inspect a result: nback report --summary nback-results/session-<id>.json");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# nback configuration

max_retries = 3
retry_delay_ms = 1000
output_dir = "./nback-results"

# Where finished-session summaries are POSTed. Remove this section to keep
# results local only.
[collector]
type = "webhook"
url = "${NBACK_WEBHOOK_URL}"
timeout_secs = 30

[session]
trial_count = 30
lag = 2
max_lag = 9
target_match_rate = 0.3

[session.timing]
stimulus_ms = 2500
response_window_ms = 2200
feedback_ms = 500
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use nback_collector::NbackConfig;

    #[test]
    fn sample_config_parses() {
        let config: NbackConfig = toml::from_str(SAMPLE_CONFIG).unwrap();
        assert_eq!(config.session.trial_count, 30);
        assert_eq!(config.session.timing.response_window_ms, 2_200);
        assert!(config.collector.is_some());
        assert!(config.session.validate().is_ok());
    }
}
