//! Command line interface.
//!
//! Every option can also be set from a `BUS_*` environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::domain::TimeError;
use crate::search::{SearchConfig, TripStore};
use crate::store::{CacheConfig, CachedStore, Dataset, SqliteStore, StoreConfig, StoreError};
use crate::web::{AppState, create_router};

const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Bus trip search server.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to the SQLite schedule database
    #[arg(long = "db", global = true, env = "BUS_DB_PATH", default_value = "bus.db")]
    pub db_path: PathBuf,

    /// Service time zone as minutes east of UTC (330 for IST)
    #[arg(
        long,
        global = true,
        env = "BUS_UTC_OFFSET_MINUTES",
        default_value_t = 0,
        allow_hyphen_values = true
    )]
    pub utc_offset_minutes: i32,

    /// Server options used when no subcommand is given
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Operation to run; defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Serve the HTTP API
    Serve(ServeArgs),

    /// Create the database schema, optionally loading demo data
    Init {
        /// Load the demo corridor
        #[arg(long)]
        demo: bool,

        /// Service date for demo trips (defaults to today)
        #[arg(long, requires = "demo")]
        date: Option<NaiveDate>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "BUS_BIND_ADDR", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Directory of static front-end assets, served under /static
    #[arg(long, env = "BUS_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Upper bound on a single store operation, in seconds
    #[arg(long, env = "BUS_QUERY_TIMEOUT_SECS", default_value_t = 5)]
    pub query_timeout_secs: u64,

    /// Cap on the number of trips a search returns
    #[arg(long, env = "BUS_MAX_RESULTS")]
    pub max_results: Option<usize>,
}

/// Errors that stop the process.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] TimeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl Cli {
    /// The operation to run, with `serve` as the default.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(self.serve.clone()))
    }

    /// Run the selected operation to completion.
    pub async fn run(self) -> Result<(), CliError> {
        match self.command() {
            Command::Serve(args) => self.serve(&args).await,
            Command::Init { demo, date } => self.init(demo, date).await,
        }
    }

    async fn init(&self, demo: bool, date: Option<NaiveDate>) -> Result<(), CliError> {
        let search = SearchConfig::new(self.utc_offset_minutes, None)?;
        let store = SqliteStore::new(StoreConfig::new(&self.db_path));

        store.init_schema().await?;
        info!(path = %self.db_path.display(), "schema ready");

        if demo {
            let date = date.unwrap_or_else(|| search.service_date(Utc::now()));
            let data = Dataset::demo(date, search.utc_offset);
            let trips = data.trips.len();
            store.import(data).await?;
            info!(%date, trips, "loaded demo data");
        }
        Ok(())
    }

    async fn serve(&self, args: &ServeArgs) -> Result<(), CliError> {
        let search = SearchConfig::new(self.utc_offset_minutes, args.max_results)?;
        let store_config =
            StoreConfig::new(&self.db_path).with_query_timeout(args.query_timeout_secs);
        let store = SqliteStore::new(store_config);

        // Fail fast on a missing or unreadable database
        store.ping().await?;

        let store = CachedStore::new(store, &CacheConfig::default());
        let state = AppState::new(store, search);
        let static_dir = args.static_dir.as_deref().and_then(|p| p.to_str());
        let app = create_router(state, static_dir);

        let listener = tokio::net::TcpListener::bind(args.bind).await?;
        info!(addr = %args.bind, db = %self.db_path.display(), "bus server listening");
        axum::serve(listener, app).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("bus-server").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn serve_is_the_default() {
        let cli = parse(&[]);
        assert_eq!(cli.command(), parse(&["serve"]).command());
        assert_eq!(cli.db_path, PathBuf::from("bus.db"));
    }

    #[test]
    fn serve_flags_without_subcommand() {
        let cli = parse(&["--bind", "0.0.0.0:9090", "--max-results", "4"]);
        let Command::Serve(args) = cli.command() else {
            panic!("expected serve");
        };
        assert_eq!(args.bind, "0.0.0.0:9090".parse().unwrap());
        assert_eq!(args.max_results, Some(4));
    }

    #[test]
    fn implicit_serve_reads_environment() {
        // No other test depends on these two variables being unset
        unsafe {
            std::env::set_var("BUS_STATIC_DIR", "/srv/bus-static");
            std::env::set_var("BUS_QUERY_TIMEOUT_SECS", "9");
        }

        let Command::Serve(args) = parse(&[]).command() else {
            panic!("expected serve");
        };
        assert_eq!(args.static_dir, Some(PathBuf::from("/srv/bus-static")));
        assert_eq!(args.query_timeout_secs, 9);
        assert_eq!(Command::Serve(args), parse(&["serve"]).command());
    }

    #[test]
    fn serve_flags_conflict_with_other_subcommands() {
        assert!(Cli::try_parse_from(["bus-server", "--bind", "0.0.0.0:1", "init"]).is_err());
    }

    #[test]
    fn serve_flags() {
        let cli = parse(&[
            "serve",
            "--bind",
            "0.0.0.0:8080",
            "--static-dir",
            "public",
            "--query-timeout-secs",
            "2",
            "--max-results",
            "20",
        ]);
        let Command::Serve(args) = cli.command() else {
            panic!("expected serve");
        };
        assert_eq!(args.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(args.static_dir, Some(PathBuf::from("public")));
        assert_eq!(args.query_timeout_secs, 2);
        assert_eq!(args.max_results, Some(20));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["init", "--demo", "--db", "/tmp/x.db", "--utc-offset-minutes", "-300"]);
        assert_eq!(cli.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(cli.utc_offset_minutes, -300);
        assert_eq!(
            cli.command(),
            Command::Init {
                demo: true,
                date: None
            }
        );
    }

    #[test]
    fn init_date_requires_demo() {
        let res = Cli::try_parse_from(["bus-server", "init", "--date", "2026-10-18"]);
        assert!(res.is_err());

        let cli = parse(&["init", "--demo", "--date", "2026-10-18"]);
        assert_eq!(
            cli.command(),
            Command::Init {
                demo: true,
                date: NaiveDate::from_ymd_opt(2026, 10, 18)
            }
        );
    }

    #[test]
    fn bad_bind_address_rejected() {
        assert!(Cli::try_parse_from(["bus-server", "serve", "--bind", "nowhere"]).is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn init_creates_and_loads_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("bus.db");
        let db_arg = db.to_str().unwrap();

        parse(&["init", "--demo", "--date", "2026-10-18", "--db", db_arg])
            .run()
            .await
            .unwrap();

        let store = SqliteStore::new(StoreConfig::new(&db));
        let stops = store.list_stops().await.unwrap();
        assert!(!stops.is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn serve_fails_fast_without_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("missing.db");

        let err = parse(&["serve", "--db", db.to_str().unwrap()])
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Store(_)));
    }

    #[test]
    fn bad_offset_is_a_config_error() {
        let err = SearchConfig::new(24 * 60, None).map_err(CliError::from).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }
}
