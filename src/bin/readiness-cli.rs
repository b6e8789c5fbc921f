use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "readiness-cli")]
#[command(about = "Query the node readiness status API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Bearer token, when the API requires one.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version and readiness phase of each client kind
    Status,
    /// Probe primary and fallback clients of both kinds
    Clients,
    /// Check whether a client kind (execution, consensus) is ready
    Ready {
        /// Client kind; omit to check both
        kind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    let path = match &cli.command {
        Commands::Status => "api/status".to_string(),
        Commands::Clients => "api/client-status".to_string(),
        Commands::Ready { kind: Some(kind) } => format!("api/ready/{}", kind),
        Commands::Ready { kind: None } => "api/ready".to_string(),
    };

    let res = client
        .get(format!("{}/{}", cli.url.trim_end_matches('/'), path))
        .headers(headers)
        .send()
        .await?;
    let ok = print_response(res).await?;

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => println!("{}", serde_json::to_string_pretty(&json)?),
        Ok(json) => {
            let message = json.get("error").and_then(Value::as_str).unwrap_or(&text);
            eprintln!("Error ({}): {}", status, message);
        }
        Err(_) if status.is_success() => println!("{}", text),
        Err(_) => eprintln!("Error: API returned status {}: {}", status, text),
    }

    Ok(status.is_success())
}
