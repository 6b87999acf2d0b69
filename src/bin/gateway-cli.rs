use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command-line client for the Jira gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Gateway API key (Bearer credential).
    #[arg(short, long, env = "GATEWAY_API_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway liveness and readiness
    Health,
    /// List available tools
    Tools,
    /// Fetch boards by ID
    Boards {
        #[arg(required = true)]
        board_ids: Vec<String>,
    },
    /// List issues closed in the last N days
    Closed {
        #[arg(short, long, default_value_t = 7)]
        days: i64,
        #[arg(required = true)]
        board_ids: Vec<String>,
    },
    /// Render closed issues as Markdown
    Scaffold {
        #[arg(short, long, default_value_t = 7)]
        days: i64,
        /// blog, announcement or both
        #[arg(short, long, default_value = "both")]
        format: String,
        /// Also post a summary to the configured webhooks
        #[arg(long)]
        notify: bool,
        #[arg(required = true)]
        board_ids: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    match cli.command {
        Commands::Health => {
            for path in ["/health", "/ready"] {
                let res = client.get(format!("{}{}", cli.url, path)).send().await?;
                println!("{} {}", path, res.status());
                println!("{}", res.text().await?);
            }
        }
        Commands::Tools => {
            let result = rpc(&client, &cli.url, headers, "tools/list", json!({})).await?;
            for tool in result["tools"].as_array().into_iter().flatten() {
                println!(
                    "{:<24} {}",
                    tool["name"].as_str().unwrap_or_default(),
                    tool["description"].as_str().unwrap_or_default()
                );
            }
        }
        Commands::Boards { board_ids } => {
            let args = json!({ "boardIds": board_ids });
            call(&client, &cli.url, headers, "get_boards", args).await?;
        }
        Commands::Closed { days, board_ids } => {
            let args = json!({ "boardIds": board_ids, "days": days });
            call(&client, &cli.url, headers, "get_closed_items", args).await?;
        }
        Commands::Scaffold {
            days,
            format,
            notify,
            board_ids,
        } => {
            let args = json!({
                "boardIds": board_ids,
                "days": days,
                "format": format,
                "notify": notify,
            });
            call(&client, &cli.url, headers, "scaffold_announcement", args).await?;
        }
    }

    Ok(())
}

async fn rpc(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    method: &str,
    params: Value,
) -> Result<Value, Box<dyn std::error::Error>> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": Uuid::new_v4().to_string(),
        "method": method,
        "params": params,
    });
    let res = client
        .post(format!("{}/mcp", url))
        .headers(headers)
        .json(&body)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(format!("Gateway returned status {}: {}", status, text).into());
    }

    let mut response: Value = res.json().await?;
    if let Some(error) = response.get("error") {
        return Err(format!("RPC error: {}", error).into());
    }
    Ok(response["result"].take())
}

async fn call(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    tool: &str,
    arguments: Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let result = rpc(
        client,
        url,
        headers,
        "tools/call",
        json!({ "name": tool, "arguments": arguments }),
    )
    .await?;

    let is_error = result["isError"].as_bool().unwrap_or(false);
    for item in result["content"].as_array().into_iter().flatten() {
        let text = item["text"].as_str().unwrap_or_default();
        if is_error {
            eprintln!("Error: {}", text);
        } else {
            println!("{}", text);
        }
    }
    if is_error {
        std::process::exit(1);
    }
    Ok(())
}
