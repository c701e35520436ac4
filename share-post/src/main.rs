//! share-post - Share content to several social networks at once

mod logging;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use libsocialshare::{
    Config, ContentFields, Credentials, Result, Share, ShareDescriptor, ShareResult,
    SocialShareError,
};
use serde::Serialize;

use crate::logging::LogSettings;

#[derive(Parser, Debug)]
#[command(name = "share-post", version)]
#[command(about = "Share content to several social networks at once", long_about = None)]
struct Cli {
    /// Full message body
    #[arg(short, long)]
    message: Option<String>,

    /// Headline or subject (cut to 128 characters)
    #[arg(long)]
    headline: Option<String>,

    /// Excerpt or short version of the message
    #[arg(long)]
    excerpt: Option<String>,

    /// Short-form text, e.g. the tweet (cut to 160 characters)
    #[arg(long)]
    short_text: Option<String>,

    /// URL being shared
    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    url_title: Option<String>,

    #[arg(long)]
    url_description: Option<String>,

    /// URL of a picture to share
    #[arg(long)]
    image_url: Option<String>,

    #[arg(long)]
    image_url_title: Option<String>,

    #[arg(long)]
    image_url_description: Option<String>,

    /// Network to share with, optionally with its own consumer token and
    /// secret (repeatable; defaults to the configured networks)
    #[arg(short = 'n', long = "network", value_name = "NETWORK[:TOKEN:SECRET]")]
    networks: Vec<ShareDescriptor>,

    /// Send a direct message to these recipients instead of sharing
    /// (comma-separated; requires exactly one network)
    #[arg(long, value_delimiter = ',')]
    to: Vec<String>,

    /// Application OAuth token
    #[arg(long, env = "SOCIALSHARE_API_TOKEN", hide_env_values = true, default_value = "")]
    api_token: String,

    /// Application OAuth secret
    #[arg(long, env = "SOCIALSHARE_API_SECRET", hide_env_values = true, default_value = "")]
    api_secret: String,

    /// Default consumer token for networks that don't name one
    #[arg(long, env = "SOCIALSHARE_CONSUMER_TOKEN", hide_env_values = true)]
    consumer_token: Option<String>,

    /// Default consumer secret for networks that don't name one
    #[arg(long, env = "SOCIALSHARE_CONSUMER_SECRET", hide_env_values = true)]
    consumer_secret: Option<String>,

    /// Configuration file (defaults to $SOCIALSHARE_CONFIG or the XDG config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn content_fields(&self) -> ContentFields {
        ContentFields {
            message: self.message.clone(),
            headline: self.headline.clone(),
            excerpt: self.excerpt.clone(),
            short_text: self.short_text.clone(),
            url: self.url.clone(),
            url_title: self.url_title.clone(),
            url_description: self.url_description.clone(),
            image_url: self.image_url.clone(),
            image_url_title: self.image_url_title.clone(),
            image_url_description: self.image_url_description.clone(),
        }
    }

    fn credentials(&self) -> Credentials {
        Credentials::new(self.api_token.as_str(), self.api_secret.as_str()).with_consumer(
            self.consumer_token.clone().unwrap_or_default(),
            self.consumer_secret.clone().unwrap_or_default(),
        )
    }
}

/// One output line per share target
#[derive(Debug, Serialize)]
struct ResultLine<'a> {
    network: &'a str,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<&'a libsocialshare::ShareReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<'a> From<&'a ShareResult> for ResultLine<'a> {
    fn from(result: &'a ShareResult) -> Self {
        Self {
            network: &result.network,
            success: result.is_success(),
            receipt: result.receipt(),
            error: result.error().map(|e| e.to_string()),
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LogSettings::from_env(cli.verbose).init();

    let results = match run(&cli).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = print_results(&results, cli.format) {
        eprintln!("Error: failed to write output: {}", e);
        std::process::exit(1);
    }

    // Exit with the code of the first failure, if any
    if let Some(error) = results.iter().find_map(ShareResult::error) {
        std::process::exit(error.exit_code());
    }
}

async fn run(cli: &Cli) -> Result<Vec<ShareResult>> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load_or_default()?,
    };
    let registry = config.registry()?;

    let descriptors: Vec<ShareDescriptor> = if cli.networks.is_empty() {
        config
            .defaults
            .networks
            .iter()
            .map(ShareDescriptor::new)
            .collect()
    } else {
        cli.networks.clone()
    };

    if descriptors.is_empty() {
        return Err(SocialShareError::InvalidInput(
            "No networks given. Use --network or set defaults.networks in the config".to_string(),
        ));
    }

    let share = Share::new(cli.credentials(), cli.content_fields())
        .with_registry(registry)
        .with_config(config);

    if cli.to.is_empty() {
        tracing::info!("Sharing with {} network(s)", descriptors.len());
        return Ok(share.with_shares(descriptors).share_all().await);
    }

    let [descriptor] = descriptors.as_slice() else {
        return Err(SocialShareError::InvalidInput(format!(
            "--to sends through exactly one network, got {}",
            descriptors.len()
        )));
    };

    tracing::info!(
        "Sending message to {} recipient(s) via {}",
        cli.to.len(),
        descriptor.network
    );
    Ok(vec![share.send_message(descriptor, &cli.to).await])
}

fn print_results(results: &[ShareResult], format: OutputFormat) -> serde_json::Result<()> {
    for result in results {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(&ResultLine::from(result))?);
            }
            OutputFormat::Text => match &result.outcome {
                Ok(receipt) if receipt.remote_ids.is_empty() => {
                    println!("{}: ok", result.network);
                }
                Ok(receipt) => {
                    println!("{}: ok {}", result.network, receipt.remote_ids.join(","));
                }
                Err(e) => {
                    println!("{}: failed: {}", result.network, e);
                }
            },
        }
    }
    Ok(())
}
