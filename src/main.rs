use clap::{Parser, Subcommand};
use crud_engine::{Diagnostics, ListOptions, OpContext};
use std::path::PathBuf;
use std::process::ExitCode;
use tracker_provider::runtime::setup_tracing;
use tracker_provider::{ConfigOverrides, Provider, ProviderConfig, ResourceType};
use tracing::{info, warn};

/// Inspect issue-tracker configuration objects through the provider.
///
/// The API token is read from `TRACKER_API_TOKEN` or the config file only.
#[derive(Debug, Parser)]
#[command(name = "tracker-provider", version)]
struct Cli {
    /// Base URL of the tracker site.
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Account email; enables Basic authentication.
    #[arg(long, global = true)]
    email: Option<String>,

    /// TOML file with provider settings.
    #[arg(long, global = true, env = "TRACKER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every object of a kind as JSON keyed by id.
    List {
        kind: ResourceType,
        /// Stop after this many objects.
        #[arg(long)]
        max_items: Option<usize>,
        /// Warn when the result grows beyond this many objects.
        #[arg(long)]
        warn_threshold: Option<usize>,
    },
    /// Read one object by id and print the state it would be tracked with.
    Import { kind: ResourceType, id: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_tracing();
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        endpoint: cli.endpoint,
        email: cli.email,
        ..ConfigOverrides::default()
    };
    let provider = match ProviderConfig::load(cli.config.as_deref(), &overrides)
        .and_then(Provider::configure)
    {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let ctx = OpContext::new();
    let interrupt = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, canceling");
            interrupt.cancel();
        }
    });

    let (output, diags) = match cli.command {
        Command::List {
            kind,
            max_items,
            warn_threshold,
        } => {
            let mut opts = ListOptions::default().respect_context(true);
            if let Some(n) = max_items {
                opts = opts.max_items(n);
            }
            if let Some(n) = warn_threshold {
                opts = opts.warn_threshold(n);
            }
            info!(%kind, "listing");
            provider.list_json(&ctx, kind, opts).await
        }
        Command::Import { kind, id } => {
            info!(%kind, %id, "importing");
            provider.import_json(&ctx, kind, &id).await
        }
    };

    report(&diags);
    if let Some(json) = output {
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("Error: unable to print output: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if diags.has_error() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(diags: &Diagnostics) {
    for diag in diags {
        eprintln!("{diag}");
    }
}
