//! CLI runner - executes commands

use crate::cache::FileCache;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, PagerConfig};
use crate::error::Result;
use crate::pagination::{Page, Paginator};
use crate::source::HttpCursorSource;
use serde_json::{json, Value};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = load_config(&self.cli.config)?;
        debug!("Loaded config from {}", self.cli.config.display());

        match &self.cli.command {
            Commands::Page { number } => self.page(&config, number).await,
            Commands::Inspect => self.inspect(&config).await,
            Commands::Clear => self.clear(&config).await,
        }
    }

    /// Build the paginator described by the config
    fn build_paginator(
        &self,
        config: &PagerConfig,
    ) -> Result<(Paginator<HttpCursorSource, FileCache>, FileCache)> {
        let source = HttpCursorSource::new(config.source.clone())?;
        // Writes are batched: the command saves once at the end
        let cache = FileCache::open(&config.cache.path)?.with_auto_save(false);
        let paginator = Paginator::new(source, cache.clone(), config.paginator)?
            .with_predicate(config.item_filter());
        Ok((paginator, cache))
    }

    /// Fetch and print one page
    async fn page(&self, config: &PagerConfig, number: &str) -> Result<()> {
        let message = self.fetch_page(config, number).await?;
        self.output_message(&message);
        Ok(())
    }

    /// Fetch one page and persist the cache once, even when the page is out of range
    async fn fetch_page(&self, config: &PagerConfig, number: &str) -> Result<Value> {
        let (paginator, cache) = self.build_paginator(config)?;
        let result = match paginator.page(number).await {
            Ok(page) => {
                info!("Fetched {} with {} items", page, page.len());
                Ok(page_message(&page).await)
            }
            Err(e) => Err(e),
        };

        if config.cache.auto_save {
            cache.save().await?;
        }
        result
    }

    /// Print cached state for the configured query
    async fn inspect(&self, config: &PagerConfig) -> Result<()> {
        let (paginator, _) = self.build_paginator(config)?;
        let snapshot = paginator.ledger().snapshot().await;
        let final_page = paginator.final_page().await;
        let known_pages = paginator.known_page_count().await;

        self.output_message(&json!({
            "type": "STATE",
            "state": snapshot,
            "known_page_count": known_pages,
            "final_page": final_page,
        }));
        Ok(())
    }

    /// Drop cached state for the configured query
    async fn clear(&self, config: &PagerConfig) -> Result<()> {
        let (paginator, cache) = self.build_paginator(config)?;
        let query = paginator.ledger().query().to_string();
        let removed = cache.clear_query(&query).await?;
        if removed {
            cache.save().await?;
        }

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": if removed {
                    format!("Cleared cached state for '{query}'")
                } else {
                    format!("No cached state for '{query}'")
                }
            }
        }));
        Ok(())
    }

    /// Print a message in the selected format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// JSON rendering of a page and its navigation
async fn page_message(page: &Page<'_, HttpCursorSource, FileCache>) -> Value {
    json!({
        "type": "PAGE",
        "page": {
            "number": page.number(),
            "items": page.items(),
            "start_index": page.start_index(),
            "end_index": page.end_index(),
            "has_previous": page.has_previous(),
            "has_next": page.has_next().await,
            "available_pages": page.available_pages().await,
            "final_page_visible": page.final_page_visible().await,
        }
    })
}
