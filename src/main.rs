//! Binary entry point for promptbin.
//!
//! This binary provides the CLI interface for the promptbin prompt manager.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow unnecessary_wraps for consistent command function signatures
#![allow(clippy::unnecessary_wraps)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use promptbin::config::PromptBinConfig;
use promptbin::mcp::McpServer;
use promptbin::models::PromptDraft;
use promptbin::observability::{self, LoggingConfig};
use promptbin::services::NameResolver;
use promptbin::storage::{FilesystemPromptStore, PromptStore};
use promptbin::{Prompt, web};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// Promptbin - A personal knowledge base for reusable AI prompts.
#[derive(Parser)]
#[command(name = "promptbin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Save a prompt.
    Save {
        /// Prompt content with {{variable}} placeholders.
        content: Option<String>,

        /// Title of the prompt.
        #[arg(short, long)]
        title: String,

        /// Category: coding, writing, or analysis.
        #[arg(long, default_value = "coding")]
        category: String,

        /// Description of the prompt.
        #[arg(short, long)]
        description: Option<String>,

        /// Tags for the prompt (comma-separated).
        #[arg(long)]
        tags: Option<String>,

        /// Update an existing prompt by id instead of creating.
        #[arg(long)]
        id: Option<String>,

        /// Path to file containing the content.
        #[arg(long)]
        from_file: Option<PathBuf>,

        /// Read content from stdin.
        #[arg(long)]
        from_stdin: bool,
    },

    /// List saved prompts.
    List {
        /// Filter by category.
        #[arg(long)]
        category: Option<String>,

        /// Output format: table or json.
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Get a prompt by id or name.
    Get {
        /// Prompt id or slugified title.
        name: String,

        /// Output format: content or json.
        #[arg(short, long, default_value = "content")]
        format: String,
    },

    /// Delete a prompt by id.
    Delete {
        /// Prompt id.
        id: String,
    },

    /// Search for prompts.
    Search {
        /// The search query.
        query: String,

        /// Filter by category.
        #[arg(long)]
        category: Option<String>,
    },

    /// Show collection statistics.
    Stats,

    /// Resolve a name to a canonical prompt id.
    Resolve {
        /// Prompt id or slugified title.
        name: String,
    },

    /// Start MCP server on stdio.
    Serve,

    /// Start the web API server.
    Web {
        /// Bind address (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides config).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(&config.log_level, cli.verbose);
    if let Err(e) = observability::init(&logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

/// Runs the selected command.
async fn run_command(cli: Cli, config: PromptBinConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = FilesystemPromptStore::new(&config.data_dir)?;

    match cli.command {
        Commands::Save {
            content,
            title,
            category,
            description,
            tags,
            id,
            from_file,
            from_stdin,
        } => cmd_save(
            &store, content, title, category, description, tags, id, from_file, from_stdin,
        ),

        Commands::List { category, format } => cmd_list(&store, category, &format),

        Commands::Get { name, format } => cmd_get(&store, &name, &format),

        Commands::Delete { id } => cmd_delete(&store, &id),

        Commands::Search { query, category } => cmd_search(&store, &query, category),

        Commands::Stats => cmd_stats(&store),

        Commands::Resolve { name } => cmd_resolve(&store, &name),

        Commands::Serve => cmd_serve(store),

        Commands::Web { host, port } => cmd_web(store, &config, host, port).await,

        Commands::Config { show } => cmd_config(&config, show),
    }
}

/// Loads configuration.
fn load_config(path: Option<&str>) -> Result<PromptBinConfig, Box<dyn std::error::Error>> {
    // If a path is provided, load from that file
    if let Some(config_path) = path {
        return PromptBinConfig::load_from_file(std::path::Path::new(config_path))
            .map_err(std::convert::Into::into);
    }

    // Environment override for config path
    if let Ok(config_path) = std::env::var("PROMPTBIN_CONFIG_PATH") {
        if !config_path.trim().is_empty() {
            return PromptBinConfig::load_from_file(std::path::Path::new(&config_path))
                .map_err(std::convert::Into::into);
        }
    }

    // Otherwise, load from default location
    Ok(PromptBinConfig::load_default())
}

/// Save command.
#[allow(clippy::too_many_arguments)]
fn cmd_save(
    store: &FilesystemPromptStore,
    content: Option<String>,
    title: String,
    category: String,
    description: Option<String>,
    tags: Option<String>,
    id: Option<String>,
    from_file: Option<PathBuf>,
    from_stdin: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = resolve_content(content, from_file, from_stdin)?;

    let draft = PromptDraft {
        title,
        content,
        category,
        description: description.unwrap_or_default(),
        tags: tags.unwrap_or_default(),
    };

    let prompt_id = store.save(&draft, id.as_deref())?;
    println!("Saved prompt: {prompt_id}");

    Ok(())
}

/// Resolves prompt content from the argument, a file, or stdin.
fn resolve_content(
    content: Option<String>,
    from_file: Option<PathBuf>,
    from_stdin: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    use std::io::Read;

    if let Some(path) = from_file {
        return Ok(std::fs::read_to_string(&path)?);
    }

    if from_stdin {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        return Ok(buffer);
    }

    content.ok_or_else(|| "No content provided. Pass it as an argument, or use --from-file / --from-stdin.".into())
}

/// List command.
fn cmd_list(
    store: &FilesystemPromptStore,
    category: Option<String>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = category
        .as_deref()
        .map(promptbin::Category::parse)
        .transpose()?;

    let prompts = store.list(category)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
        return Ok(());
    }

    if prompts.is_empty() {
        println!("No prompts found.");
        return Ok(());
    }

    println!("{} prompt(s):", prompts.len());
    println!();
    for prompt in &prompts {
        print_prompt_line(prompt);
    }

    Ok(())
}

/// Prints a one-line summary of a prompt.
fn print_prompt_line(prompt: &Prompt) {
    let tags = if prompt.tags.is_empty() {
        String::new()
    } else {
        format!("  [{}]", prompt.tags.join(", "))
    };
    println!(
        "  {}  {:8}  {}{}",
        prompt.id,
        prompt.category.as_str(),
        prompt.title,
        tags
    );
}

/// Get command.
fn cmd_get(
    store: &FilesystemPromptStore,
    name: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = NameResolver::new(store);

    let Some(id) = resolver.resolve(name)? else {
        return Err(not_found_error(&resolver, name));
    };

    let Some(prompt) = store.get(&id)? else {
        return Err(not_found_error(&resolver, name));
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&prompt)?);
    } else {
        println!("{}", prompt.content);
    }

    Ok(())
}

/// Builds a not-found error with name hints.
fn not_found_error(resolver: &NameResolver<'_>, name: &str) -> Box<dyn std::error::Error> {
    let hint = resolver
        .example_slugs(5)
        .ok()
        .filter(|names| !names.is_empty())
        .map(|names| format!(" Available names: {}", names.join(", ")))
        .unwrap_or_default();

    format!("Prompt '{name}' not found.{hint}").into()
}

/// Delete command.
fn cmd_delete(store: &FilesystemPromptStore, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if store.delete(id)? {
        println!("Deleted prompt: {id}");
        Ok(())
    } else {
        Err(format!("Prompt '{id}' not found.").into())
    }
}

/// Search command.
fn cmd_search(
    store: &FilesystemPromptStore,
    query: &str,
    category: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let category = category
        .as_deref()
        .map(promptbin::Category::parse)
        .transpose()?;

    let prompts = store.search(query, category)?;

    println!("Found {} prompt(s):", prompts.len());
    println!();
    for prompt in &prompts {
        print_prompt_line(prompt);
    }

    Ok(())
}

/// Stats command.
fn cmd_stats(store: &FilesystemPromptStore) -> Result<(), Box<dyn std::error::Error>> {
    let stats = store.stats()?;

    println!("Promptbin Statistics");
    println!("====================");
    println!();
    println!("Total prompts: {}", stats.total_prompts);
    println!("Distinct tags: {}", stats.total_tags);
    println!();
    println!("By category:");
    for (category, count) in &stats.by_category {
        println!("  {:8}  {count}", category.as_str());
    }

    if !stats.recent_activity.is_empty() {
        println!();
        println!("Recent activity:");
        for entry in &stats.recent_activity {
            println!("  {}  {}  {}", entry.updated_at, entry.id, entry.title);
        }
    }

    Ok(())
}

/// Resolve command.
fn cmd_resolve(store: &FilesystemPromptStore, name: &str) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = NameResolver::new(store);

    match resolver.resolve(name)? {
        Some(id) => {
            println!("{id}");
            Ok(())
        },
        None => Err(not_found_error(&resolver, name)),
    }
}

/// Serve command (MCP over stdio).
fn cmd_serve(store: FilesystemPromptStore) -> Result<(), Box<dyn std::error::Error>> {
    let server = McpServer::new(Arc::new(store));
    server.start()?;
    Ok(())
}

/// Web command.
async fn cmd_web(
    store: FilesystemPromptStore,
    config: &PromptBinConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);

    web::serve(&host, port, Arc::new(store)).await?;
    Ok(())
}

/// Config command.
fn cmd_config(config: &PromptBinConfig, show: bool) -> Result<(), Box<dyn std::error::Error>> {
    if show {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("Data Directory: {}", config.data_dir.display());
        println!("Web Host: {}", config.host);
        println!("Web Port: {}", config.port);
        println!("Log Level: {}", config.log_level);
    } else {
        println!("Use --show to display configuration");
    }

    Ok(())
}
