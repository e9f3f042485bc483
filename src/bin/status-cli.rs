use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "status-cli")]
#[command(about = "Management CLI for the Service Status Aggregator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3100")]
    url: String,

    /// Admin API key, required for `maintenance` and `check`.
    #[arg(short, long, env = "STATUS_ADMIN_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full status report
    Status,
    /// Compact overall status
    Summary,
    /// One service
    Service { name: String },
    /// Incident history
    Incidents {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
        #[arg(short, long)]
        resolved: Option<bool>,
    },
    /// Uptime by group
    Uptime,
    /// Put a service into or out of maintenance
    Maintenance {
        name: String,
        #[arg(long, action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Force an immediate poll cycle
    Check,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let base = cli.url.trim_end_matches('/');
    let request = match cli.command {
        Commands::Status => client.get(format!("{}/status", base)),
        Commands::Summary => client.get(format!("{}/status/summary", base)),
        Commands::Service { name } => client.get(format!("{}/status/service/{}", base, name)),
        Commands::Incidents { limit, resolved } => {
            let mut query = vec![("limit", limit.to_string())];
            if let Some(resolved) = resolved {
                query.push(("resolved", resolved.to_string()));
            }
            client.get(format!("{}/status/incidents", base)).query(&query)
        }
        Commands::Uptime => client.get(format!("{}/status/uptime", base)),
        Commands::Maintenance { name, active } => client
            .post(format!("{}/status/maintenance/{}", base, name))
            .json(&json!({ "active": active })),
        Commands::Check => client.post(format!("{}/status/health-check", base)),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    // 503 still carries the full report.
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    if !status.is_success() {
        eprintln!("Status API returned {}", status);
    }
    Ok(())
}
