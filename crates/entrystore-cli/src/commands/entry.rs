//! Single-entry commands - add, get, update, delete
//!
//! Each command builds an [`EntryActionInput`] from its arguments and hands
//! it to the request handler, so the CLI goes through the same validation
//! as any other caller.

use anyhow::Result;
use clap::Args;
use tracing::info;

use entrystore_core::usecases::{EntryActionInput, EntryInput, EntryResponse};

use crate::context::AppContext;
use crate::output::{print_entry_response, OutputFormat};

/// Add a new entry
#[derive(Debug, Args)]
pub struct AddCommand {
    /// Unique key of the new entry
    pub key: String,

    /// Entry payload
    pub payload: String,

    /// Owner identity (a random UUID when omitted)
    #[arg(long)]
    pub identity: Option<String>,
}

impl AddCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let response = self.run(ctx).await;
        print_entry_response(format, &response, "Added");
        Ok(())
    }

    async fn run(&self, ctx: &AppContext) -> EntryResponse {
        let identity = self
            .identity
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        info!(key = %self.key, identity = %identity, "Adding entry");

        let input = EntryActionInput::builder()
            .with_entry(EntryInput::new(&self.key, identity, &self.payload))
            .build();
        ctx.handler.add(&input).await
    }
}

/// Show an entry and its audit trail
#[derive(Debug, Args)]
pub struct GetCommand {
    /// Key of the entry
    pub key: String,

    /// Identity sent with the lookup
    #[arg(long)]
    pub identity: Option<String>,
}

impl GetCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let response = self.run(ctx).await;
        print_entry_response(format, &response, "Found");
        Ok(())
    }

    async fn run(&self, ctx: &AppContext) -> EntryResponse {
        let entry = EntryInput {
            identity: self.identity.clone(),
            ..EntryInput::lookup(&self.key)
        };
        let input = EntryActionInput::builder().with_entry(entry).build();
        ctx.handler.get(&input).await
    }
}

/// Replace an entry's key and payload
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Current key of the entry
    pub old_key: String,

    /// Key the entry is stored under afterwards (may equal the old key)
    pub new_key: String,

    /// New payload
    pub payload: String,

    /// Identity that owns the entry
    #[arg(long)]
    pub identity: String,
}

impl UpdateCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let response = self.run(ctx).await;
        print_entry_response(format, &response, "Updated");
        Ok(())
    }

    async fn run(&self, ctx: &AppContext) -> EntryResponse {
        info!(old_key = %self.old_key, new_key = %self.new_key, "Updating entry");
        let input = EntryActionInput::builder()
            .with_key(&self.old_key)
            .with_entry(EntryInput::new(&self.new_key, &self.identity, &self.payload))
            .build();
        ctx.handler.update(&input).await
    }
}

/// Delete an entry
#[derive(Debug, Args)]
pub struct DeleteCommand {
    /// Key of the entry
    pub key: String,

    /// Identity that owns the entry
    #[arg(long)]
    pub identity: String,
}

impl DeleteCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let response = self.run(ctx).await;
        print_entry_response(format, &response, "Deleted");
        Ok(())
    }

    async fn run(&self, ctx: &AppContext) -> EntryResponse {
        info!(key = %self.key, "Deleting entry");
        let input = EntryActionInput::builder()
            .with_entry(EntryInput::new(&self.key, &self.identity, ""))
            .build();
        ctx.handler.delete(&input).await
    }
}
