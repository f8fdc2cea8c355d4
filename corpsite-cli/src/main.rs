use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use corpsite_core::config::Config;
use corpsite_core::entities::{EntityId, EntityKind};
use corpsite_core::i18n::Language;
use corpsite_core::logging::{init_logging_with_config, LogConfig, LogLevel};
use corpsite_core::AppContext;
use std::path::PathBuf;
use tracing::debug;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "corpsite")]
#[command(author, version, about = "Command-line client for the Corpsite CMS", long_about = None)]
struct Args {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable JSON formatted logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        /// Falls back to CORPSITE_PASSWORD
        #[arg(long, env = "CORPSITE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Register a new admin account
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "CORPSITE_PASSWORD", hide_env_values = true)]
        password: String,
        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in operator
    Whoami,
    /// Show or switch the content language
    Lang { language: Option<Language> },
    /// List records of one kind
    List {
        kind: EntityKind,
        /// Public list instead of the admin list
        #[arg(long)]
        public: bool,
        #[arg(short, long)]
        search: Option<String>,
        /// Categorical filter, e.g. --filter category=commercial
        #[arg(short, long, value_parser = parse_filter)]
        filter: Vec<(String, String)>,
    },
    /// Show one record
    Show { kind: EntityKind, id: EntityId },
    /// Create a record from JSON (inline or @path)
    Create {
        kind: EntityKind,
        #[arg(long)]
        data: String,
        /// Content language; defaults to the current language
        #[arg(long)]
        lang: Option<Language>,
    },
    /// Replace a record, or merge fields with --patch
    Update {
        kind: EntityKind,
        id: EntityId,
        #[arg(long)]
        data: String,
        #[arg(long)]
        patch: bool,
    },
    /// Delete a record (super admins only)
    Delete {
        kind: EntityKind,
        id: EntityId,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Page through the public list as the landing page carousel does
    Carousel {
        kind: EntityKind,
        /// Container width in pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,
        /// Button presses, e.g. "rrl" (r = right arrow, l = left arrow)
        #[arg(long, default_value = "")]
        steps: String,
    },
    /// Load the public site once and print request metrics
    Metrics,
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => {
            let path = PathBuf::from(shellexpand::tilde(path).as_ref());
            Config::from_file(&path).with_context(|| format!("loading {}", path.display()))?
        }
        None => Config::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }
    if args.json_logs {
        config.logging.json_format = true;
    }
    config.validate()?;
    Ok(config)
}

fn init_logging(config: &Config) -> Result<()> {
    let log_config = LogConfig::try_from(&config.logging).unwrap_or_else(|e| {
        eprintln!("{e}, using 'info'");
        LogConfig::new(LogLevel::Info).json_format(config.logging.json_format)
    });
    init_logging_with_config(log_config)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;
    corpsite_core::metrics::init_metrics();

    let ctx = AppContext::init(config)?;
    debug!(command = ?args.command, "corpsite CLI started");

    match args.command {
        Command::Login { email, password } => commands::login(&ctx, email, password).await,
        Command::Signup {
            username,
            email,
            password,
            confirm_password,
        } => {
            let confirm_password = confirm_password.unwrap_or_else(|| password.clone());
            commands::signup(&ctx, username, email, password, confirm_password).await
        }
        Command::Logout => commands::logout(&ctx),
        Command::Whoami => commands::whoami(&ctx),
        Command::Lang { language } => commands::lang(&ctx, language),
        Command::List {
            kind,
            public,
            search,
            filter,
        } => {
            let options = commands::ListOptions {
                public,
                search,
                filters: filter,
            };
            commands::list(&ctx, kind, &options).await
        }
        Command::Show { kind, id } => commands::show(&ctx, kind, &id).await,
        Command::Create { kind, data, lang } => {
            let data = commands::read_data(&data)?;
            commands::create(&ctx, kind, data, lang).await
        }
        Command::Update { kind, id, data, patch } => {
            let data = commands::read_data(&data)?;
            commands::update(&ctx, kind, &id, data, patch).await
        }
        Command::Delete { kind, id, yes } => commands::delete(&ctx, kind, id, yes).await,
        Command::Carousel { kind, width, steps } => commands::carousel(&ctx, kind, width, &steps).await,
        Command::Metrics => commands::metrics(&ctx).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("category=commercial").unwrap(),
            ("category".to_string(), "commercial".to_string())
        );
        assert!(parse_filter("category").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "corpsite",
            "--api-url",
            "http://localhost:5000/api",
            "list",
            "careers",
            "--filter",
            "department=Engineering",
            "-s",
            "engineer",
        ])
        .unwrap();
        match args.command {
            Command::List { kind, filter, search, public } => {
                assert_eq!(kind, EntityKind::Careers);
                assert_eq!(filter.len(), 1);
                assert_eq!(search.as_deref(), Some("engineer"));
                assert!(!public);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_load_config_applies_flags() {
        let args = Args::try_parse_from([
            "corpsite",
            "--api-url",
            "https://cms.example.com/api",
            "--log-level",
            "debug",
            "whoami",
        ])
        .unwrap();
        let config = load_config(&args).unwrap();
        assert_eq!(config.api.base_url, "https://cms.example.com/api");
        assert_eq!(config.logging.level, "debug");
    }
}
