//! List command - show stored entries, optionally one page at a time

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::context::AppContext;
use crate::output::{print_entries_response, OutputFormat};

/// List entries
///
/// Without page options every entry is shown, sorted by key and latest
/// audit time. With either option the listing is paged by key; a missing
/// option takes its value from the `paging` config section.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Zero-based page to show
    #[arg(long)]
    pub page_number: Option<u32>,

    /// Entries per page
    #[arg(long)]
    pub page_size: Option<u32>,
}

impl ListCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        info!(
            page_number = ?self.page_number,
            page_size = ?self.page_size,
            "Listing entries"
        );
        let response = ctx
            .handler
            .list_entries(self.page_number, self.page_size)
            .await;
        print_entries_response(format, &response);
        Ok(())
    }
}
