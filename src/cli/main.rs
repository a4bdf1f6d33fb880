use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::{Client, RequestBuilder};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mr-cli")]
#[command(about = "Maintenance reports CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "MR_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DateRange {
    /// First day included (YYYY-MM-DD)
    #[arg(short = 'f', long)]
    from: Option<String>,

    /// Last day included (YYYY-MM-DD)
    #[arg(short = 't', long)]
    to: Option<String>,
}

impl DateRange {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(from) = &self.from {
            query.push(("date_from", from.clone()));
        }
        if let Some(to) = &self.to {
            query.push(("date_to", to.clone()));
        }
        query
    }
}

#[derive(Subcommand)]
enum Commands {
    /// General summary of orders, visits and quotations
    Summary {
        #[command(flatten)]
        range: DateRange,
    },

    /// All-time performance metrics and monthly trends
    Metrics,

    /// Activity per day, week or month
    Activity {
        #[command(flatten)]
        range: DateRange,

        #[arg(short, long, default_value = "day")]
        granularity: String,

        /// orders, visits, quotations or all
        #[arg(short, long, default_value = "all")]
        module: String,
    },

    /// Export one module's rows
    Export {
        /// orders, visits or quotations
        #[arg(short, long)]
        module: String,

        /// csv or json
        #[arg(short = 'F', long, default_value = "csv")]
        format: String,

        #[command(flatten)]
        range: DateRange,

        /// Case-insensitive match on code, client or description
        #[arg(short, long)]
        search: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Summary { range } => {
            let request = client
                .get(format!("{}/v1/reports/summary", cli.endpoint))
                .query(&range.query());
            print_json(request).await?;
        }

        Commands::Metrics => {
            let request = client.get(format!("{}/v1/reports/metrics", cli.endpoint));
            print_json(request).await?;
        }

        Commands::Activity {
            range,
            granularity,
            module,
        } => {
            let mut query = range.query();
            query.push(("granularity", granularity));
            query.push(("module", module));

            let request = client
                .get(format!("{}/v1/reports/activity", cli.endpoint))
                .query(&query);
            print_json(request).await?;
        }

        Commands::Export {
            module,
            format,
            range,
            search,
            output,
        } => {
            let mut query = range.query();
            query.push(("module", module));
            query.push(("format", format));
            if let Some(search) = search {
                query.push(("search", search));
            }

            let response = client
                .get(format!("{}/v1/reports/export", cli.endpoint))
                .query(&query)
                .send()
                .await
                .context("export request failed")?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                bail!("export failed with {}: {}", status, body);
            }

            let bytes = response.bytes().await?;
            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("cannot write {}", path.display()))?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => println!("{}", String::from_utf8_lossy(&bytes)),
            }
        }

        Commands::Health => {
            let request = client.get(format!("{}/health", cli.endpoint));
            print_json(request).await?;
        }
    }

    Ok(())
}

async fn print_json(request: RequestBuilder) -> Result<()> {
    let response = request.send().await.context("request failed")?;
    let status = response.status();
    let body: serde_json::Value = response
        .json()
        .await
        .context("response was not valid JSON")?;

    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        bail!("server returned {}", status);
    }
    Ok(())
}
