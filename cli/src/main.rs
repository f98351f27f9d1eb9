use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use serde_json::Value;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

type WsStream = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing token; pass --token or set PIXEL_TOKEN")]
    MissingToken,
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for websocket event")]
    Timeout,
    #[error("server rejected request: {0}")]
    Rejected(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pixel-cli", about = "pixelplace HTTP and websocket CLI")]
struct Cli {
    #[arg(long, env = "PIXEL_BASE_URL", default_value = "http://127.0.0.1:2000")]
    base_url: String,

    #[arg(long, env = "PIXEL_TOKEN", global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the server is up.
    Ping,
    /// Create a display-name account and print its token.
    Account {
        #[arg(long)]
        name: String,
    },
    /// Show who the token belongs to and its remaining cooldown.
    Me,
    /// Place one pixel.
    Put {
        x: u32,
        y: u32,
        color: u8,
    },
    /// Print the canvas snapshot, then stream updates.
    Watch {
        #[arg(long, help = "Exit after this many updates")]
        count: Option<usize>,
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let base_url = cli.base_url.trim_end_matches('/').to_owned();

    match cli.command {
        Command::Ping => run_ping(&base_url).await,
        Command::Account { name } => {
            let json = get_json(&base_url, "/create-account", &[("name", name.as_str())]).await?;
            print_json(&json)
        }
        Command::Me => {
            let token = cli.token.ok_or(CliError::MissingToken)?;
            let json = get_json(&base_url, "/me", &[("token", token.as_str())]).await?;
            print_json(&json)
        }
        Command::Put { x, y, color } => {
            let token = cli.token.ok_or(CliError::MissingToken)?;
            run_put(&base_url, &token, x, y, color).await
        }
        Command::Watch { count, timeout_secs } => run_watch(&base_url, count, Duration::from_secs(timeout_secs)).await,
    }
}

async fn run_ping(base_url: &str) -> Result<(), CliError> {
    let response = reqwest::get(format!("{base_url}/healthz")).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Rejected(format!("HTTP {}: health check failed", status.as_u16())));
    }
    println!("ok");
    Ok(())
}

async fn run_put(base_url: &str, token: &str, x: u32, y: u32, color: u8) -> Result<(), CliError> {
    let (x, y, color) = (x.to_string(), y.to_string(), color.to_string());
    let response = reqwest::Client::new()
        .get(format!("{base_url}/put-pixel"))
        .query(&[("token", token), ("x", x.as_str()), ("y", y.as_str()), ("color", color.as_str())])
        .send()
        .await?;
    let body = response.text().await?;
    if body == "success" {
        println!("success");
        return Ok(());
    }
    Err(CliError::Rejected(error_list(&serde_json::from_str(&body)?)))
}

async fn run_watch(base_url: &str, count: Option<usize>, timeout: Duration) -> Result<(), CliError> {
    let (mut stream, _) = connect_async(ws_url(base_url)?)
        .await
        .map_err(|error| CliError::WsConnect(Box::new(error)))?;

    let initial = recv_event(&mut stream, timeout).await?;
    let size = initial["data"]["size"].as_u64().unwrap_or_default();
    let cells = initial["data"]["cells"].as_array().map_or(0, Vec::len);
    eprintln!("connected: {size}x{size} canvas, {cells} painted cells");

    let mut seen = 0_usize;
    while count.is_none_or(|limit| seen < limit) {
        let event = recv_event(&mut stream, timeout).await?;
        if event["event"] != "update" {
            continue;
        }
        let data = &event["data"];
        println!(
            "({}, {}) color={} owner={}",
            data["x"],
            data["y"],
            data["color"],
            data["owner"].as_str().unwrap_or("-")
        );
        seen = seen.saturating_add(1);
    }
    Ok(())
}

async fn get_json(base_url: &str, path: &str, query: &[(&str, &str)]) -> Result<Value, CliError> {
    let response = reqwest::Client::new()
        .get(format!("{base_url}{path}"))
        .query(query)
        .send()
        .await?;
    let status = response.status();
    let json = response.json::<Value>().await?;
    if !status.is_success() {
        return Err(CliError::Rejected(error_list(&json)));
    }
    Ok(json)
}

fn error_list(json: &Value) -> String {
    json["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_else(|| json.to_string())
}

fn ws_url(base_url: &str) -> Result<String, CliError> {
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/ws"));
    }
    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

async fn recv_event(stream: &mut WsStream, timeout: Duration) -> Result<Value, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::WsClosed);
            };
            match message.map_err(|error| CliError::WsConnect(Box::new(error)))? {
                Message::Text(text) => return serde_json::from_str::<Value>(text.as_str()).map_err(CliError::from),
                Message::Close(_) => return Err(CliError::WsClosed),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CliError::Timeout)?
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_url_maps_schemes() {
        assert_eq!(ws_url("http://127.0.0.1:2000").unwrap(), "ws://127.0.0.1:2000/ws");
        assert_eq!(ws_url("https://pixels.example").unwrap(), "wss://pixels.example/ws");
        assert!(matches!(ws_url("ftp://nope"), Err(CliError::InvalidBaseUrl(_))));
    }

    #[test]
    fn error_list_joins_messages() {
        let json = serde_json::json!({"errors": ["Invalid or missing parameter 'x'.", "Cooldown 1.0s."]});
        assert_eq!(error_list(&json), "Invalid or missing parameter 'x'. Cooldown 1.0s.");
    }

    #[test]
    fn error_list_falls_back_to_raw_json() {
        let json = serde_json::json!({"unexpected": true});
        assert_eq!(error_list(&json), r#"{"unexpected":true}"#);
    }

    #[test]
    fn cli_parses_put() {
        let cli = Cli::try_parse_from(["pixel-cli", "--token", "abc", "put", "1", "2", "3"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("abc"));
        assert!(matches!(cli.command, Command::Put { x: 1, y: 2, color: 3 }));
    }
}
