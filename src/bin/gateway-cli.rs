//! Command-line uploader for the gateway.
//!
//! Posts a file to a running gateway, waits for the service to come up if
//! necessary, and prints the extracted text blocks.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::multipart::{Form, Part};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Upload a document to the gateway and print the extracted text")]
struct Cli {
    /// Gateway base URL.
    #[arg(short, long, default_value = "http://localhost:4000")]
    url: String,

    /// Declared content type for the upload.
    #[arg(short, long, default_value = "application/pdf")]
    content_type: String,

    /// Connection attempts before giving up.
    #[arg(long, default_value_t = 10)]
    attempts: u32,

    /// File to upload.
    file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let bytes = tokio::fs::read(&cli.file).await?;
    let filename = cli
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let client = reqwest::Client::new();
    let url = format!("{}/ocr/extract", cli.url.trim_end_matches('/'));

    for attempt in 1..=cli.attempts {
        let part = Part::bytes(bytes.clone())
            .file_name(filename.clone())
            .mime_str(&cli.content_type)?;
        let form = Form::new().part("file", part);

        match client.post(&url).multipart(form).send().await {
            Ok(response) => {
                let status = response.status();
                let value: serde_json::Value = response.json().await?;
                println!("{status}");
                println!("{}", serde_json::to_string_pretty(&value)?);

                if let Some(blocks) = value.get("blocks").and_then(|b| b.as_array()) {
                    println!("\nDetected text:");
                    for block in blocks {
                        if let Some(text) = block.get("text").and_then(|t| t.as_str()) {
                            println!("- {text}");
                        }
                    }
                }
                return Ok(());
            }
            Err(e) if e.is_connect() && attempt < cli.attempts => {
                eprintln!("[{attempt}/{}] gateway not ready, retrying...", cli.attempts);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err("gateway unreachable".into())
}
