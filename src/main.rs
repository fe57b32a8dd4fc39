//! logctx demo
//!
//! Installs the process-wide logger, then runs a handful of concurrent
//! "SMS sender" tasks. Each task attaches its own request fields to a
//! context, logs through the shared logger, and occasionally hands a failed
//! delivery to a background consumer that logs it with the sender's context.
//!
//! ```text
//!   worker 0..N ──(ctx: request_id, user_id, phone, message)──▶ logger ──▶ stdout
//!        │
//!        └── ContextError ──mpsc──▶ failure consumer ──log_error──▶ logger
//! ```

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logctx::{
    attach_message, attach_new_request_id, attach_phone, attach_sms_gate, attach_user_id,
    load_config, Attr, Context, ContextError, Logger, LoggerConfig, ResultExt,
};

#[derive(Parser, Debug)]
#[command(name = "logctx-demo", version, about = "Context-aware structured logging demo")]
struct Cli {
    /// TOML logger configuration.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the output format (json or text).
    #[arg(long)]
    format: Option<String>,

    /// Override the minimum level.
    #[arg(long)]
    level: Option<String>,

    /// Number of concurrent senders.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Records logged by each sender.
    #[arg(long, default_value_t = 3)]
    logs: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Crate diagnostics go to stderr so they never mix with records on stdout.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logctx=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => LoggerConfig::default(),
    };
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(level) = cli.level {
        config.level = level;
    }

    let logger = logctx::init(&config)?;
    let logger = logger.with([Attr::string("service", "logctx-demo")]);

    let (failures_tx, failures_rx) = mpsc::channel::<ContextError>(64);
    let consumer = tokio::spawn(consume_failures(logger.clone(), failures_rx));

    let mut workers = Vec::with_capacity(cli.workers);
    for id in 0..cli.workers {
        workers.push(tokio::spawn(run_sender(
            logger.clone(),
            id,
            cli.logs,
            failures_tx.clone(),
        )));
    }
    drop(failures_tx);

    for worker in workers {
        worker.await?;
    }
    consumer.await?;

    tracing::info!(workers = cli.workers, logs = cli.logs, "Demo complete");
    Ok(())
}

async fn run_sender(logger: Logger, id: usize, logs: usize, failures: mpsc::Sender<ContextError>) {
    let (ctx, _) = attach_new_request_id(&Context::background());
    let ctx = attach_user_id(&ctx, 1000 + id as i64);
    let ctx = attach_phone(&ctx, &format!("+7999{:07}", id));
    let ctx = attach_sms_gate(&ctx, if id % 2 == 0 { "primary" } else { "fallback" });
    let ctx = attach_message(&ctx, &format!("order #{} confirmed", id));

    logger.debug(&ctx, "sender started", [Attr::uint("worker", id as u64)]);

    for seq in 0..logs {
        logger.info(&ctx, "sms queued", [Attr::uint("seq", seq as u64)]);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    if let Err(err) = deliver(id).with_log_context(&ctx) {
        if failures.send(err).await.is_err() {
            logger.warn(&ctx, "failure consumer gone", []);
        }
    }
}

fn deliver(id: usize) -> io::Result<()> {
    if id % 3 == 2 {
        return Err(io::Error::new(io::ErrorKind::TimedOut, "gateway timeout"));
    }
    Ok(())
}

async fn consume_failures(logger: Logger, mut failures: mpsc::Receiver<ContextError>) {
    // The consumer has no request context of its own; each error brings one.
    let ctx = Context::background();
    while let Some(err) = failures.recv().await {
        logger.log_error(&ctx, "sms delivery failed", &err);
    }
}
