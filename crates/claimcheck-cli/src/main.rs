use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::{Value, json};
use tracing::info;
use tracing_subscriber::EnvFilter;

use claimcheck_core::app::{Channel, OffloadGateBuilder};
use claimcheck_core::codec::{BodyCodec, TaskBody};
use claimcheck_core::domain::{Envelope, Message, OffloadConfig};
use claimcheck_core::impls::{InMemoryBlobStore, InMemoryQueue};

/// 小さいタスクと大きいタスクを in-memory のキュー経由で送受信するデモ
#[derive(Debug, Parser)]
#[command(name = "claimcheck", version)]
struct Args {
    /// TOML file with offload settings (threshold_bytes, container, ...).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Blob container (bucket) for offloaded payloads.
    #[arg(long, env = "CLAIMCHECK_BUCKET")]
    bucket: Option<String>,

    /// Offload threshold in bytes.
    #[arg(long)]
    threshold: Option<usize>,

    /// Offload every message regardless of size.
    #[arg(long)]
    always_offload: bool,

    /// Size of the large demo payload.
    #[arg(long, default_value_t = 300_000)]
    size: usize,

    #[arg(long, default_value = "bulk-message-extend")]
    queue: String,
}

fn load_config(args: &Args) -> Result<OffloadConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => OffloadConfig::default(),
    };

    // flag が file より優先
    if let Some(bucket) = &args.bucket {
        config.container = bucket.clone();
    }
    if let Some(threshold) = args.threshold {
        config.threshold_bytes = threshold;
    }
    if args.always_offload {
        config.always_offload = true;
    }
    if config.container.trim().is_empty() {
        config.container = "claimcheck-demo".to_string();
    }
    Ok(config)
}

/// celery 風の envelope（body = base64([args, kwargs, embed])）
fn task_message(task: &str, args: Value) -> Result<Message> {
    let body = TaskBody::new(vec![args, json!({}), json!({ "callbacks": null, "errbacks": null })])?;
    let envelope = json!({
        "body": BodyCodec::encode(&body)?,
        "content-encoding": "utf-8",
        "content-type": "application/json",
        "headers": { "lang": "py", "task": task },
        "properties": {
            "body_encoding": "base64",
            "delivery_info": { "exchange": "", "routing_key": "bulk-message-extend" },
            "delivery_mode": 2,
            "priority": 0
        }
    });
    let map = envelope
        .as_object()
        .cloned()
        .context("envelope literal is an object")?;
    Ok(Message::new(Envelope::from_map(map)))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;
    info!(
        container = %config.container,
        threshold_bytes = config.threshold_bytes,
        always_offload = config.always_offload,
        "starting demo"
    );

    // (A) Blob ストア・キュー・gate を用意して Channel にまとめる
    let blob = Arc::new(InMemoryBlobStore::new());
    let queue = Arc::new(InMemoryQueue::new());
    let gate = OffloadGateBuilder::new(blob.clone())
        .config(config)
        .build()?;
    let channel = Channel::new(queue.clone(), Arc::new(gate));

    // (B) 小さいタスクと大きいタスクを投入
    let small = task_message("receive_message", json!(["hello", "world"]))?;
    let large = task_message("receive_message", json!(["x".repeat(args.size), "tail"]))?;
    for message in [small, large] {
        let outcome = channel.put(&args.queue, message).await?;
        match outcome.reference() {
            Some(reference) => info!(
                container = %reference.container,
                key = %reference.key,
                "sent offloaded message"
            ),
            None => info!("sent inline message"),
        }
    }
    info!(objects = blob.len().await, "blob store after send");

    // (C) 受信して payload を取り出し、ack する
    while let Some(received) = channel.get(&args.queue).await? {
        let envelope = received.envelope();
        let body = envelope.body().context("received envelope has no body")?;
        let payload = BodyCodec::decode(body)?.payload().clone();
        let first_arg_len = payload
            .get(0)
            .and_then(Value::as_str)
            .map_or(0, str::len);
        info!(
            resolved = received.is_resolved(),
            first_arg_len,
            "received message"
        );

        let tag = envelope
            .delivery_tag()
            .context("received envelope has no delivery tag")?
            .to_string();
        channel.ack(&args.queue, &tag).await?;
    }

    info!(
        objects = blob.len().await,
        in_flight = queue.in_flight_len(&args.queue).await,
        "done"
    );
    Ok(())
}
