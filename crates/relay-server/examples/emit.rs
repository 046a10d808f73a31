//! Emit one producer event to a running relay.
//!
//! Usage: `cargo run --example emit -- <recipient> [event] [data-json]`
//!
//! `event` defaults to `create_report_api`; `data-json` is merged with
//! `{"recipient": ...}`.

use std::env;
use std::error::Error;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let recipient = args.next().ok_or("usage: emit <recipient> [event] [data-json]")?;
    let event = args.next().unwrap_or_else(|| "create_report_api".to_string());
    let mut data: Value = match args.next() {
        Some(raw) => serde_json::from_str(&raw)?,
        None => json!({}),
    };
    let obj = data.as_object_mut().ok_or("data must be a JSON object")?;
    obj.insert("recipient".to_string(), Value::String(recipient));

    let url = env::var("RELAY_URL").unwrap_or_else(|_| "ws://127.0.0.1:5002/ws/socket.io".to_string());
    println!("Connecting to {}...", url);
    let (mut ws, _) = connect_async(url.as_str()).await?;

    // First frame is our own session handshake.
    if let Ok(Some(Ok(Message::Text(hello)))) = timeout(Duration::from_secs(2), ws.next()).await {
        println!("<< {}", hello.as_str());
    }

    let frame = json!([event, data]).to_string();
    println!(">> {}", frame);
    ws.send(Message::text(frame)).await?;
    ws.close(None).await?;

    Ok(())
}
