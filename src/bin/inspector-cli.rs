use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "inspector-cli")]
#[command(about = "Management CLI for the webhook inspector", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service metadata
    Status,
    /// List a session's captured requests, newest first
    List { session: String },
    /// Fire a capture event at a session endpoint
    Send {
        session: String,
        #[arg(short, long, default_value = "POST")]
        method: String,
        /// Request body (sent as-is)
        #[arg(short, long)]
        data: Option<String>,
    },
    /// Relay a request through the composer proxy
    Compose {
        target: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// JSON body
        #[arg(short, long)]
        data: Option<String>,
        /// Header as `name:value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{base}/")).send().await?;
            print_response(res).await?;
        }
        Commands::List { session } => {
            let res = client
                .get(format!("{base}/{session}"))
                .query(&[("fetch_payloads", "true")])
                .header(reqwest::header::ACCEPT, "application/json")
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Send { session, method, data } => {
            let method = reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let mut req = client.request(method, format!("{base}/{session}"));
            if let Some(data) = data {
                req = req
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(data);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Compose { target, method, data, headers } => {
            let body = match data {
                Some(d) => serde_json::from_str::<Value>(&d)?,
                None => Value::Null,
            };
            let mut header_map = Map::new();
            for h in headers {
                let Some((name, value)) = h.split_once(':') else {
                    return Err(format!("header must be name:value, got {h}").into());
                };
                header_map.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
            }
            let payload = json!({
                "url": target,
                "method": method,
                "headers": header_map,
                "body": body,
            });
            let res = client.post(format!("{base}/proxy")).json(&payload).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
