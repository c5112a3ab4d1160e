use std::time::Duration;

use clap::Args;
use sqlx::postgres::{PgPool, PgPoolOptions};

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
    /// Upper bound on pooled connections. Queries wait for a free connection once reached
    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,
    /// Seconds a query waits for a pooled connection before failing
    #[arg(long, env = "ACQUIRE_TIMEOUT", default_value_t = 5)]
    pub acquire_timeout: u64,
    /// Seconds an unused connection is kept open
    #[arg(long, env = "IDLE_TIMEOUT", default_value_t = 30)]
    pub idle_timeout: u64,
}

impl Config {
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout))
            .idle_timeout(Duration::from_secs(self.idle_timeout))
    }
    /// Connections are opened on first use, so the server starts even if the database is down.
    pub fn connect_lazy(&self) -> Result<PgPool, sqlx::Error> {
        self.pool_options().connect_lazy(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Options {
        #[command(flatten)]
        config: Config,
    }

    #[test]
    fn pool_defaults_apply() {
        let options =
            Options::try_parse_from(["video_catalog", "--database-url", "postgres://localhost/db"])
                .unwrap();

        assert_eq!(options.config.database_url, "postgres://localhost/db");
        assert_eq!(options.config.max_connections, 5);
        assert_eq!(options.config.acquire_timeout, 5);
        assert_eq!(options.config.idle_timeout, 30);
    }
}
