//! Notevault MCP Server
//!
//! Exposes a markdown note vault to tool-calling agents via MCP.
//!
//! ## Tools
//!
//! - `list_notes` / `read_note` / `write_note` - gated vault access
//! - `fuzzy_replace` - approximate-match text replacement
//! - `edit_lines` - line-indexed insert/replace
//! - `patch_note` - structural patch (heading path, block anchor, frontmatter field)
//! - `reload_ignore` - explicit `.mcpignore` reload
//!
//! Sessions are multiplexed over HTTP: the `Mcp-Session-Id` response
//! header carries the identifier the client must echo on every
//! subsequent request.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use notevault_access::{AccessGate, IgnoreRules, IGNORE_FILE};
use notevault_mcp::http;
use notevault_mcp::prompts::VaultPrompts;
use notevault_mcp::registry::Registry;
use notevault_mcp::resources::VaultResources;
use notevault_mcp::session::SessionRouter;
use notevault_mcp::tools::{build_tools, ToolContext};
use notevault_note::{FsVault, VaultStore};

#[derive(Parser, Debug)]
#[command(name = "notevault-mcp", version, about = "MCP server for a markdown note vault")]
struct Args {
    /// Vault root directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8787")]
    bind: SocketAddr,

    /// Start in read-only mode (no mutations accepted)
    #[arg(long)]
    read_only: bool,
}

// Single-threaded-cooperative by design: operations interleave only at
// await points, never run in parallel threads.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Log to stderr; the HTTP body is for the protocol.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let root = args
        .root
        .canonicalize()
        .with_context(|| format!("invalid vault root: {}", args.root.display()))?;
    log::info!("serving vault at {}", root.display());

    let store: Arc<dyn VaultStore> = Arc::new(FsVault::new(&root));
    let gate = Arc::new(AccessGate::new(
        load_ignore_rules(store.as_ref()).await,
        args.read_only,
    ));
    if args.read_only {
        log::info!("read-only mode active");
    }

    let ctx = ToolContext {
        store: store.clone(),
        gate: gate.clone(),
        query: None,
    };
    let registry = Arc::new(Registry::new(
        build_tools(ctx),
        Arc::new(VaultResources::new(store.clone(), gate.clone())),
        Arc::new(VaultPrompts::new(store, gate)),
    ));

    let router = Arc::new(SessionRouter::new(registry));
    http::serve(args.bind, router).await
}

async fn load_ignore_rules(store: &dyn VaultStore) -> IgnoreRules {
    match store.read(IGNORE_FILE).await {
        Ok(text) => {
            let rules = IgnoreRules::parse(&text);
            log::info!("loaded {} ignore patterns from {IGNORE_FILE}", rules.len());
            rules
        }
        Err(_) => {
            log::info!("no {IGNORE_FILE} found, ignore engine disabled");
            IgnoreRules::disabled()
        }
    }
}
