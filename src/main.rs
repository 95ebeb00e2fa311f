use std::path::PathBuf;

use clap::{Parser, Subcommand};
use smoke_harness::{
    harness::{HarnessReport, HttpHarnessService},
    scenarios::{self, MappingPreset},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "smoke-harness", about = "Fire smoke requests at the resource and mapping routes")]
struct Cli {
    /// Username, overriding the scenario's default user
    #[arg(long, global = true)]
    user: Option<String>,

    /// Password for basic auth
    #[arg(long, global = true)]
    password: Option<String>,

    /// HTTP proxy for http:// traffic
    #[arg(long, global = true, conflicts_with = "no_proxy")]
    proxy: Option<String>,

    /// Connect directly even if a proxy is configured
    #[arg(long, global = true)]
    no_proxy: bool,

    /// Print each report as JSON instead of plain text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    scenario: Scenario,
}

#[derive(Debug, Subcommand)]
enum Scenario {
    /// Create an anything:Thing with a standoff text
    CreateThing,
    /// Create a standoff mapping from an XML definition
    CreateMapping {
        #[arg(long, value_enum, default_value_t = MappingPreset::Tei)]
        preset: MappingPreset,
        #[arg(long)]
        xml: PathBuf,
    },
    /// Create an incunabula page together with its image
    CreatePage {
        #[arg(long)]
        image: PathBuf,
    },
    /// Replace the file of an existing resource
    ChangeFileValue {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Upload an image to Sipi, then create a page referencing it
    CreatePageFromUpload {
        #[arg(long)]
        image: PathBuf,
    },
    /// Upload an image to Sipi, then point an existing resource at it
    ChangeFileValueFromUpload {
        #[arg(long)]
        resource: String,
        #[arg(long)]
        image: PathBuf,
    },
    /// Create the XSL transformation resource used by the BEOL mapping
    CreateXslTransformation {
        #[arg(long)]
        xsl: PathBuf,
    },
}

impl Cli {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(user) = &self.user {
            config.username = Some(user.clone());
        }
        if let Some(password) = &self.password {
            config.password = password.clone();
        }
        if self.no_proxy {
            config.proxy = None;
        } else if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        config
    }
}

fn print_report(report: &HarnessReport, as_json: bool) {
    if as_json {
        match serde_json::to_string_pretty(report) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!("Failed to encode report: {}", e),
        }
    } else {
        println!("{}", report.render());
    }
}

#[tokio::main]
async fn main() {
    // stdout carries the reports, logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smoke_harness=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.apply(Config::from_env());
    tracing::debug!(proxy = ?config.proxy, scenario = ?cli.scenario, "Running scenario");

    let service = HttpHarnessService::new();
    let reports = match &cli.scenario {
        Scenario::CreateThing => scenarios::create_thing(&service, &config).await,
        Scenario::CreateMapping { preset, xml } => {
            scenarios::create_mapping(&service, &config, *preset, xml).await
        }
        Scenario::CreatePage { image } => scenarios::create_page(&service, &config, image).await,
        Scenario::ChangeFileValue { resource, file } => {
            scenarios::change_file_value(&service, &config, resource, file).await
        }
        Scenario::CreatePageFromUpload { image } => {
            scenarios::create_page_from_upload(&service, &config, image).await
        }
        Scenario::ChangeFileValueFromUpload { resource, image } => {
            scenarios::change_file_value_from_upload(&service, &config, resource, image).await
        }
        Scenario::CreateXslTransformation { xsl } => {
            scenarios::create_xsl_transformation(&service, &config, xsl).await
        }
    };

    for report in &reports {
        print_report(report, cli.json);
    }

    let failed = reports.iter().filter(|r| !r.success).count();
    tracing::info!(requests = reports.len(), failed, "Scenario finished");
}
