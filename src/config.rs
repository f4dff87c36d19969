use clap::{Parser, Subcommand};
use sqlx::postgres::PgConnectOptions;
use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================
//
// Every setting can come from a flag or an environment variable (a `.env`
// file is loaded first when present). Defaults target a local development
// stack.
//
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "company-service", about = "Company records service", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub settings: Settings,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Follow the company event topic and log every event
    TailEvents,
}

impl Cli {
    pub fn subcommand(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct Settings {
    #[arg(long, env = "DB_USER", default_value = "user1", global = true)]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", default_value = "test1", hide_env_values = true, hide_default_value = true, global = true)]
    pub db_password: String,

    #[arg(long, env = "DB_NAME", default_value = "companies", global = true)]
    pub db_name: String,

    #[arg(long, env = "DB_HOST", default_value = "127.0.0.1", global = true)]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value_t = 5432, global = true)]
    pub db_port: u16,

    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = 10, global = true)]
    pub db_max_connections: u32,

    #[arg(long, env = "API_PORT", default_value_t = 8080, global = true)]
    pub api_port: u16,

    #[arg(long, env = "METRICS_PORT", default_value_t = 9090, global = true)]
    pub metrics_port: u16,

    #[arg(long, env = "JWT_SECRET", default_value = "secretTest", hide_env_values = true, hide_default_value = true, global = true)]
    pub jwt_secret: String,

    #[arg(long, env = "KAFKA_URL", default_value = "localhost:9092", global = true)]
    pub kafka_url: String,

    #[arg(long, env = "KAFKA_TOPIC", default_value = "company_events", global = true)]
    pub kafka_topic: String,

    #[arg(long, env = "KAFKA_GROUP_ID", default_value = "company_events_group", global = true)]
    pub kafka_group_id: String,

    #[arg(long, env = "API_USER", default_value = "user2", global = true)]
    pub api_user: String,

    #[arg(long, env = "API_PASSWORD", default_value = "test2", hide_env_values = true, hide_default_value = true, global = true)]
    pub api_password: String,

    /// Set the `Secure` attribute on the session cookie
    #[arg(long, env = "COOKIE_SECURE", default_value_t = true, action = clap::ArgAction::Set, global = true)]
    pub cookie_secure: bool,

    /// Seconds in-flight HTTP requests get to finish on shutdown
    #[arg(long, env = "SHUTDOWN_GRACE_SECS", default_value_t = 30, global = true)]
    pub shutdown_grace_secs: u64,

    /// Upper bound in seconds for draining event acknowledgments on shutdown
    #[arg(long, env = "PUBLISH_DRAIN_SECS", default_value_t = 10, global = true)]
    pub publish_drain_secs: u64,
}

impl Settings {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name)
    }

    pub fn publish_drain(&self) -> Duration {
        Duration::from_secs(self.publish_drain_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults_and_serve_is_default() {
        let cli = Cli::try_parse_from([
            "company-service",
            "--api-port",
            "9000",
            "--cookie-secure",
            "false",
        ])
        .unwrap();

        assert_eq!(cli.subcommand(), Command::Serve);
        assert_eq!(cli.settings.api_port, 9000);
        assert!(!cli.settings.cookie_secure);
        assert_eq!(cli.settings.publish_drain(), Duration::from_secs(cli.settings.publish_drain_secs));
    }

    #[test]
    fn test_tail_events_subcommand() {
        let cli = Cli::try_parse_from(["company-service", "tail-events", "--kafka-topic", "audit"]).unwrap();

        assert_eq!(cli.subcommand(), Command::TailEvents);
        assert_eq!(cli.settings.kafka_topic, "audit");
    }

    #[test]
    fn test_help_does_not_print_secret_defaults() {
        use clap::CommandFactory;
        let help = Cli::command().render_long_help().to_string();

        assert!(help.contains("--db-password"));
        for secret in ["test1", "test2", "secretTest"] {
            assert!(!help.contains(secret), "help leaks {secret}");
        }
    }
}
