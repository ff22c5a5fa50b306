use crate::config::EngineConfig;
use crate::engine::SearchEngine;
use crate::error::Result;
use crate::format::{format_count, format_search_results};
use crate::search::SearchMode;
use crate::server::SearchServer;
use crate::store::{DocumentStore, InMemoryStore};
use crate::tools::SharedEngine;
use crate::tracing::LogFormat;
use crate::types::{PageRequest, SearchQuery, SearchResult};
use anyhow::Context;
use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "guidance-search", version)]
#[command(about = "Ranked full-text and pattern search over versioned guidance documents", long_about = None)]
pub struct Cli {
    /// Corpus file: a JSON array of document versions
    #[arg(long, env = "GUIDANCE_SEARCH_CORPUS")]
    pub corpus: PathBuf,

    /// Engine configuration file (TOML)
    #[arg(long, env = "GUIDANCE_SEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Reuse lexical indexes across runs from this cache file
    #[arg(long, env = "GUIDANCE_SEARCH_INDEX_CACHE")]
    pub index_cache: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Serve the search tools over MCP on stdio
    Serve,
    /// Print the matching versions for one page of documents
    Search {
        query: String,
        #[arg(short, long, default_value = "simple")]
        mode: SearchMode,
        #[arg(short = 's', long)]
        case_sensitive: bool,
        /// Zero-indexed page of documents
        #[arg(short, long)]
        page: Option<i64>,
        #[arg(short = 'n', long)]
        page_size: Option<i64>,
        /// Print raw result rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print how many documents and versions match
    Count {
        query: String,
        #[arg(short, long, default_value = "normal")]
        mode: SearchMode,
        #[arg(short = 's', long)]
        case_sensitive: bool,
        #[arg(long)]
        json: bool,
    },
}

/// Load the corpus and run the selected command.
pub async fn run(cli: Cli) -> Result<()> {
    let config = EngineConfig::load(cli.config.as_deref())?;
    let engine = load_engine(cli.corpus, cli.index_cache, config).await?;

    match cli.command {
        Commands::Serve => {
            tracing::info!("Starting guidance-search MCP server");
            let service = SearchServer::new(engine)
                .serve(stdio())
                .await
                .inspect_err(|e| {
                    tracing::error!("Error serving MCP server: {:?}", e);
                })?;
            service.waiting().await?;
        }
        Commands::Search {
            query,
            mode,
            case_sensitive,
            page,
            page_size,
            json,
        } => {
            let query = SearchQuery::new(query, mode).case_sensitive(case_sensitive);
            let page = PageRequest { page, page_size };
            let output = tokio::task::spawn_blocking(move || -> Result<String> {
                let stream = engine.search(&query, page)?;
                let total_documents = stream.total_documents();
                let rows: Vec<SearchResult> = stream.collect();
                if json {
                    Ok(serde_json::to_string_pretty(&rows)?)
                } else {
                    Ok(format_search_results(&query, &rows, total_documents, page))
                }
            })
            .await
            .context("Search task panicked")??;
            println!("{}", output.trim_end());
        }
        Commands::Count {
            query,
            mode,
            case_sensitive,
            json,
        } => {
            let query = SearchQuery::new(query, mode).case_sensitive(case_sensitive);
            let output = tokio::task::spawn_blocking(move || -> Result<String> {
                let count = engine.search_count(&query)?;
                if json {
                    Ok(serde_json::to_string_pretty(&count)?)
                } else {
                    Ok(format_count(&query, &count))
                }
            })
            .await
            .context("Count task panicked")??;
            println!("{}", output.trim_end());
        }
    }

    Ok(())
}

async fn load_engine(
    corpus: PathBuf,
    index_cache: Option<PathBuf>,
    config: EngineConfig,
) -> Result<SharedEngine> {
    let analysis = config.analysis.clone();
    let store = tokio::task::spawn_blocking(move || {
        InMemoryStore::load(&corpus, &analysis, index_cache.as_deref())
            .with_context(|| format!("Failed to load corpus {}", corpus.display()))
    })
    .await
    .context("Corpus loading task panicked")??;

    let store: Arc<dyn DocumentStore> = Arc::new(store);
    Ok(Arc::new(SearchEngine::new(store, config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn test_search_defaults() {
        let cli = Cli::try_parse_from(["guidance-search", "--corpus", "c.json", "search", "masks"])
            .unwrap();
        let_assert!(Commands::Search { mode, case_sensitive, page, page_size, json, .. } = cli.command);
        check!(mode == SearchMode::Simple);
        check!(!case_sensitive);
        check!(page.is_none() && page_size.is_none());
        check!(!json);
    }

    #[test]
    fn test_count_defaults_to_normal() {
        let cli = Cli::try_parse_from(["guidance-search", "--corpus", "c.json", "count", "masks"])
            .unwrap();
        let_assert!(Commands::Count { mode, .. } = cli.command);
        check!(mode == SearchMode::Normal);
    }

    #[test]
    fn test_invalid_mode_is_a_usage_error() {
        let result = Cli::try_parse_from([
            "guidance-search",
            "--corpus",
            "c.json",
            "search",
            "masks",
            "--mode",
            "regx",
        ]);
        let_assert!(Err(e) = result);
        check!(e.to_string().contains("did you mean 'regex'"));
    }

    #[test]
    fn test_paging_flags() {
        let cli = Cli::try_parse_from([
            "guidance-search",
            "--corpus",
            "c.json",
            "search",
            "masks",
            "-m",
            "regex",
            "-s",
            "-p",
            "2",
            "-n",
            "10",
            "--json",
        ])
        .unwrap();
        let_assert!(
            Commands::Search { mode, case_sensitive, page, page_size, json, .. } = cli.command
        );
        check!(mode == SearchMode::Regex);
        check!(case_sensitive);
        check!(page == Some(2));
        check!(page_size == Some(10));
        check!(json);
    }
}
