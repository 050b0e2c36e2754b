use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "ingress-cli")]
#[command(about = "Management CLI for the ingress router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API bearer token.
    #[arg(short, long, env = "INGRESS_ADMIN_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Health and published table generation
    Status,
    /// Dump the routing table in match order
    Table,
    /// Resolve a host and path to a backend
    Match {
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "/")]
        path: String,
    },
    /// Force a full rebuild from the rule store
    Reconcile,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let res = match cli.command {
        Commands::Status => client.get(format!("{}/healthz", cli.url)).send().await?,
        Commands::Table => {
            client
                .get(format!("{}/admin/table", cli.url))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Match { host, path } => {
            client
                .get(format!("{}/admin/match", cli.url))
                .query(&[("host", host), ("path", path)])
                .headers(headers)
                .send()
                .await?
        }
        Commands::Reconcile => {
            client
                .post(format!("{}/admin/reconcile", cli.url))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
