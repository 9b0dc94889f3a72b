use std::path::PathBuf;

use clap::Parser;
use interest_transform::config::DEFAULT_OWNER_PREFIX;
use interest_transform::{EncodeOptions, TransformConfig};

/// Migration job configuration, from flags or environment variables.
#[derive(Debug, Clone, Parser)]
#[command(name = "interest-migrate")]
#[command(about = "Transform legacy interest records into normalized actions and user settings")]
#[command(version)]
pub struct MigrateConfig {
    /// Newline-delimited source records ("-" for stdin)
    #[arg(long, env = "MIGRATE_INPUT", default_value = "-")]
    pub input: String,

    /// Where to write normalized records, one per line ("-" for stdout)
    #[arg(long, env = "MIGRATE_OUTPUT", default_value = "-")]
    pub output: String,

    /// Directory receiving quarantined records
    #[arg(long, env = "MIGRATE_QUARANTINE_DIR", default_value = "quarantine")]
    pub quarantine_dir: PathBuf,

    /// Prefix joined to each record's userId to form the owner id
    #[arg(long, env = "MIGRATE_OWNER_PREFIX", default_value = DEFAULT_OWNER_PREFIX)]
    pub owner_prefix: String,

    /// Also map sports team and finance security interests
    #[arg(long, env = "MIGRATE_LEGACY_RULES")]
    pub legacy_rules: bool,

    /// Write absent optional fields as null instead of omitting them
    #[arg(long, env = "MIGRATE_KEEP_NULLS")]
    pub keep_nulls: bool,

    /// Indent output records. Each record then spans several lines.
    #[arg(long, env = "MIGRATE_PRETTY")]
    pub pretty: bool,

    /// Emit logs as JSON
    #[arg(long, env = "MIGRATE_LOG_JSON")]
    pub log_json: bool,
}

impl MigrateConfig {
    pub fn transform_config(&self) -> TransformConfig {
        TransformConfig::default()
            .with_owner_prefix(self.owner_prefix.clone())
            .with_legacy_rules(self.legacy_rules)
    }

    pub fn encode_options(&self) -> EncodeOptions {
        EncodeOptions::default()
            .with_omit_nulls(!self.keep_nulls)
            .with_pretty(self.pretty)
    }

    /// Log the effective configuration.
    pub fn log_summary(&self) {
        tracing::info!(
            input = self.input.as_str(),
            output = self.output.as_str(),
            quarantine_dir = %self.quarantine_dir.display(),
            owner_prefix = self.owner_prefix.as_str(),
            legacy_rules = self.legacy_rules,
            keep_nulls = self.keep_nulls,
            pretty = self.pretty,
            "Config loaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MigrateConfig::parse_from(["interest-migrate"]);
        assert_eq!(config.input, "-");
        assert_eq!(config.output, "-");
        assert_eq!(config.quarantine_dir, PathBuf::from("quarantine"));
        assert_eq!(config.transform_config(), TransformConfig::default());
        assert_eq!(config.encode_options(), EncodeOptions::default());
    }

    #[test]
    fn flags_map_onto_engine_config() {
        let config = MigrateConfig::parse_from([
            "interest-migrate",
            "--input",
            "records.jsonl",
            "--owner-prefix",
            "U_b-",
            "--legacy-rules",
            "--keep-nulls",
            "--pretty",
        ]);
        assert_eq!(config.input, "records.jsonl");
        let transform = config.transform_config();
        assert_eq!(transform.owner_prefix, "U_b-");
        assert!(transform.legacy_rules_enabled);
        let encode = config.encode_options();
        assert!(!encode.omit_nulls);
        assert!(encode.pretty);
    }

    #[test]
    fn pretty_defaults_off() {
        let config = MigrateConfig::try_parse_from(["interest-migrate"]).unwrap();
        assert!(!config.pretty);
        assert!(!config.encode_options().pretty);
    }
}
