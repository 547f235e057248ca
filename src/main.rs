mod cli;

use podvault::{config, podcasts::PodcastCatalog};

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "podvault=trace,podvault_common=debug,reqwest=debug".to_string()
        } else {
            "podvault=info,reqwest=warn".to_string()
        }
    });

    // Logs go to stderr so stdout stays parseable JSON
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            query,
            provider,
            limit,
        } => run_catalog(cli.config.as_deref(), |catalog| async move {
            catalog.search(&query, provider.as_deref(), limit).await
        }),
        Commands::Detail { id } => run_catalog(cli.config.as_deref(), |catalog| async move {
            catalog.get_detail(&id).await
        }),
        Commands::Credits { id } => run_catalog(cli.config.as_deref(), |catalog| async move {
            catalog.get_credits(&id).await
        }),
        Commands::Providers => {
            for name in podvault::podcasts::ProviderRegistry::available_names() {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("podvault {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Build a catalog on a fresh runtime, run one lookup and print its result
/// as pretty JSON. Lookup errors print their JSON body and exit non-zero.
fn run_catalog<F, Fut, T>(config_path: Option<&Path>, op: F) -> Result<()>
where
    F: FnOnce(PodcastCatalog) -> Fut,
    Fut: std::future::Future<Output = podvault_common::Result<T>>,
    T: Serialize,
{
    let config = config::load_config_or_default(config_path)?;
    let rt = tokio::runtime::Runtime::new()?;

    let outcome = rt.block_on(async {
        op(PodcastCatalog::from_config(&config)).await
    });

    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            tracing::debug!("Lookup failed: {}", e);
            eprintln!("{}", serde_json::to_string_pretty(&e.body())?);
            std::process::exit(exit_code(e.http_status()));
        }
    }
}

fn exit_code(status: u16) -> i32 {
    match status {
        400 => 2,
        404 => 3,
        _ => 1,
    }
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults");
            let mut config = config::Config::default();
            config::apply_env_overrides(&mut config);
            config::validate_config(&config)?;
            config
        }
    };

    let credentials = podvault::podcasts::providers::parse_credentials(&config.podchaser.credentials);

    println!("✓ Configuration is valid");
    println!(
        "  Cache: main {}s, fresh {}s, search {}s, max {} entries",
        config.cache.main_ttl_secs,
        config.cache.fresh_ttl_secs,
        config.cache.search_ttl_secs,
        config.cache.max_entries
    );
    println!(
        "  iTunes: {} calls per {}s",
        config.itunes.max_calls, config.itunes.period_secs
    );
    println!(
        "  Taddy credentials: {}",
        if config.taddy.api_key.is_empty() { "missing" } else { "set" }
    );
    println!("  Podchaser credential pairs: {}", credentials.len());
    println!(
        "  Refresh: capacity {}, {} retries",
        config.refresh.queue_capacity, config.refresh.max_retries
    );

    Ok(())
}
