//! Consume command - process a stream of JSON entry requests
//!
//! Reads one JSON `EntryRequest` per line from stdin and writes one JSON
//! `EntryResponse` per line to stdout, in input order. Blank lines are
//! skipped; malformed lines get a `NOT_VALID_FORMAT` response and the
//! stream continues.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;

use entrystore_core::usecases::EntryRequestHandler;

use crate::context::AppContext;
use crate::output::OutputFormat;

/// Process JSON-lines entry requests from stdin
#[derive(Debug, Args)]
pub struct ConsumeCommand {}

impl ConsumeCommand {
    pub async fn execute(&self, ctx: &AppContext, _format: OutputFormat) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let handled = consume(&ctx.handler, stdin, std::io::stdout()).await?;
        info!(handled, "Request stream finished");
        Ok(())
    }
}

/// Handles every request line from `reader`, returning how many were handled
pub async fn consume<R, W>(handler: &EntryRequestHandler, reader: R, mut writer: W) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handler.handle_message(line).await;
        let encoded = serde_json::to_string(&response).context("Failed to encode response")?;
        writeln!(writer, "{}", encoded).context("Failed to write response")?;
        writer.flush().context("Failed to write response")?;
        handled += 1;
    }

    Ok(handled)
}
