use clap::{Arg, ArgAction, Command, ValueHint};
use std::path::PathBuf;

/// CLI arguments for bazaarlink-server
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub port: Option<u16>,
    pub config_file: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub model_dir: Option<PathBuf>,
    pub retrain_on_start: Option<bool>,
    pub max_request_size: Option<usize>,
    pub log_level: Option<String>,
}

impl CliArgs {
    fn command() -> Command {
        Command::new("bazaarlink-server")
            .version(bazaarlink::VERSION)
            .author("BazaarLink Contributors")
            .about("HTTP API server for BazaarLink product recommendations")
            .long_about(
                r#"BazaarLink Server exposes the hybrid recommendation engine over HTTP:
personalized recommendations, event tracking, area insights and model
retraining.

The server can be configured through command line arguments or environment
variables. Command line arguments take precedence over environment variables.
Engine settings (cache, training, logging) come from the configuration file
and BAZAARLINK_* variables with `__` as the section separator.

Examples:
  bazaarlink-server --port 8080 --catalog catalog.json
  bazaarlink-server --config bazaarlink.toml --retrain-on-start
  BAZAARLINK_CACHE__TTL=10m bazaarlink-server --log-level debug"#,
            )
            .arg(
                Arg::new("port")
                    .short('p')
                    .long("port")
                    .value_name("PORT")
                    .help("Port to listen on")
                    .long_help(
                        "Port number for the HTTP server to listen on.
Environment variable: BAZAARLINK_PORT",
                    )
                    .value_hint(ValueHint::Other)
                    .value_parser(clap::value_parser!(u16)),
            )
            .arg(
                Arg::new("config")
                    .short('c')
                    .long("config")
                    .value_name("FILE")
                    .help("Engine configuration file path")
                    .long_help(
                        "Path to a TOML, YAML or JSON engine configuration file. When absent,
bazaarlink.toml and friends are looked up in the working directory and the
user configuration directory.
Environment variable: BAZAARLINK_CONFIG_FILE",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("catalog")
                    .long("catalog")
                    .value_name("FILE")
                    .help("Catalog snapshot to serve")
                    .long_help(
                        "JSON snapshot of users, shops, products, orders and events loaded
into the in-memory catalog. Without it the server starts with an empty catalog.
Environment variable: BAZAARLINK_CATALOG",
                    )
                    .value_hint(ValueHint::FilePath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("model_dir")
                    .long("model-dir")
                    .value_name("DIR")
                    .help("Directory holding published similarity models")
                    .long_help(
                        "Directory where similarity tables are published and loaded from.
Overrides training.model_dir from the configuration file.
Environment variable: BAZAARLINK_TRAINING__MODEL_DIR",
                    )
                    .value_hint(ValueHint::DirPath)
                    .value_parser(clap::value_parser!(PathBuf)),
            )
            .arg(
                Arg::new("retrain_on_start")
                    .long("retrain-on-start")
                    .help("Train a similarity model in the background at startup")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("max_request_size")
                    .long("max-request-size")
                    .value_name("BYTES")
                    .help("Maximum request body size in bytes")
                    .long_help(
                        "Maximum accepted request body size in bytes.
Environment variable: BAZAARLINK_MAX_REQUEST_SIZE",
                    )
                    .value_parser(clap::value_parser!(usize)),
            )
            .arg(
                Arg::new("log_level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level")
                    .long_help(
                        "Log level (error, warn, info, debug, trace). Overrides the
configured logging level; RUST_LOG still takes precedence over both.",
                    )
                    .value_hint(ValueHint::Other),
            )
            .arg(
                Arg::new("env_help")
                    .long("env-help")
                    .help("Show environment variable documentation")
                    .action(ArgAction::SetTrue),
            )
    }

    /// Parse command line arguments
    pub fn parse() -> Self {
        let matches = Self::command().get_matches();

        if matches.get_flag("env_help") {
            Self::print_env_help();
            std::process::exit(0);
        }

        Self::from_matches(&matches)
    }

    /// Parse an explicit argument list
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command().try_get_matches_from(args)?;
        Ok(Self::from_matches(&matches))
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self {
            port: matches.get_one::<u16>("port").copied(),
            config_file: matches.get_one::<PathBuf>("config").cloned(),
            catalog: matches.get_one::<PathBuf>("catalog").cloned(),
            model_dir: matches.get_one::<PathBuf>("model_dir").cloned(),
            retrain_on_start: if matches.get_flag("retrain_on_start") {
                Some(true)
            } else {
                None
            },
            max_request_size: matches.get_one::<usize>("max_request_size").copied(),
            log_level: matches.get_one::<String>("log_level").cloned(),
        }
    }

    /// Print comprehensive environment variable help
    fn print_env_help() {
        println!("BazaarLink Server Environment Variables");
        println!("=======================================");
        println!();
        println!("Server Configuration:");
        println!("  BAZAARLINK_PORT                     - Server port (default: 8000)");
        println!("  BAZAARLINK_CONFIG_FILE              - Path to engine config file");
        println!("  BAZAARLINK_CATALOG                  - Catalog snapshot file");
        println!("  BAZAARLINK_RETRAIN_ON_START         - Train at startup (default: false)");
        println!(
            "  BAZAARLINK_MAX_REQUEST_SIZE         - Max request body size in bytes (default: 1MB)"
        );
        println!();
        println!("Recommendations:");
        println!("  BAZAARLINK_RECOMMENDATIONS__DEFAULT_LIMIT    - Default list size (default: 10)");
        println!("  BAZAARLINK_RECOMMENDATIONS__MAX_LIMIT        - Largest list size (default: 100)");
        println!("  BAZAARLINK_RECOMMENDATIONS__PROVIDER_TIMEOUT - Per signal timeout (default: 2s)");
        println!();
        println!("Cache:");
        println!("  BAZAARLINK_CACHE__BACKEND           - memory or redis (default: memory)");
        println!("  BAZAARLINK_CACHE__TTL               - Entry lifetime (default: 30m)");
        println!("  BAZAARLINK_CACHE__CAPACITY          - Memory cache entries (default: 10000)");
        println!("  BAZAARLINK_CACHE__REDIS_URL         - Redis URL for the redis backend");
        println!();
        println!("Training:");
        println!("  BAZAARLINK_TRAINING__MODEL_DIR      - Model directory (default: ./models)");
        println!("  BAZAARLINK_TRAINING__NEIGHBORS      - Neighbors per user (default: 10)");
        println!("  BAZAARLINK_TRAINING__SCHEDULE_ENABLED - Periodic retraining (default: false)");
        println!("  BAZAARLINK_TRAINING__RETRAIN_INTERVAL - Retraining interval (default: 24h)");
        println!();
        println!("Logging:");
        println!("  BAZAARLINK_LOGGING__LEVEL           - trace, debug, info, warn, error");
        println!("  BAZAARLINK_LOGGING__FORMAT          - default, json, compact, pretty");
        println!("  RUST_LOG                            - Overrides the configured level");
        println!();
        println!("Note: Command line arguments take precedence over environment variables.");
        println!("Use --help for CLI argument documentation.");
    }
}
