mod commands;
mod config;

use clap::{Parser, Subcommand};
use config::{CliConfig, CONTENT_DIR_ENV, DEFAULT_CONTENT_DIR, DEFAULT_STORE_DIR, STORE_DIR_ENV};
use std::path::PathBuf;

/// DocMesh CLI - inspect, edit and export document meshes
#[derive(Parser, Debug)]
#[command(name = "docmesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding stored meshes
    #[arg(long, global = true, env = STORE_DIR_ENV, default_value = DEFAULT_STORE_DIR)]
    store_dir: PathBuf,

    /// Directory holding contents.json and content payloads
    #[arg(long, global = true, env = CONTENT_DIR_ENV, default_value = DEFAULT_CONTENT_DIR)]
    content_dir: PathBuf,

    /// JSON file with export settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty mesh
    New {
        name: String,
    },

    /// List stored meshes
    List,

    /// Print the outline of a mesh
    Show {
        mesh_id: String,
    },

    /// Check a stored mesh for structural violations and dangling content
    Validate {
        mesh_id: String,
    },

    /// Add a node referencing a content item
    Add {
        mesh_id: String,
        content_id: String,

        /// Parent node (omit for a root-level node)
        #[arg(short, long)]
        parent: Option<String>,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Explicit node id (a UUID is generated otherwise)
        #[arg(long)]
        id: Option<String>,
    },

    /// Move a node to a new parent and position
    Move {
        mesh_id: String,
        node_id: String,

        /// New parent (omit to move to the root level)
        #[arg(short, long)]
        parent: Option<String>,

        /// Position among the new siblings (default: last)
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Remove a node
    Remove {
        mesh_id: String,
        node_id: String,

        /// Also remove every descendant; otherwise children take the node's place
        #[arg(long)]
        cascade: bool,
    },

    /// Change a node's title and/or description
    Edit {
        mesh_id: String,
        node_id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },

    /// Set (or with no node, clear) the preferred root
    SetRoot {
        mesh_id: String,
        node_id: Option<String>,
    },

    /// Rename a mesh
    Rename {
        mesh_id: String,
        name: String,
    },

    /// Delete a stored mesh
    Delete {
        mesh_id: String,
    },

    /// Export a mesh as a zip archive, or a single HTML document
    Export {
        mesh_id: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Write only the combined index document
        #[arg(long)]
        index_only: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config =
        CliConfig::new(cli.store_dir, cli.content_dir).with_settings_file(cli.settings.as_deref())?;
    let ctx = commands::Context::new(config);

    match cli.command {
        Command::New { name } => commands::new_mesh(&ctx, &name).await,
        Command::List => commands::list(&ctx).await,
        Command::Show { mesh_id } => commands::show(&ctx, &mesh_id).await,
        Command::Validate { mesh_id } => commands::validate(&ctx, &mesh_id).await,
        Command::Add {
            mesh_id,
            content_id,
            parent,
            title,
            description,
            id,
        } => {
            let params = commands::AddParams {
                content_id,
                parent,
                title,
                description,
                id,
            };
            commands::add(&ctx, &mesh_id, params).await
        }
        Command::Move {
            mesh_id,
            node_id,
            parent,
            index,
        } => commands::move_node(&ctx, &mesh_id, &node_id, parent.as_deref(), index).await,
        Command::Remove {
            mesh_id,
            node_id,
            cascade,
        } => commands::remove(&ctx, &mesh_id, &node_id, cascade).await,
        Command::Edit {
            mesh_id,
            node_id,
            title,
            description,
        } => commands::edit(&ctx, &mesh_id, &node_id, title, description).await,
        Command::SetRoot { mesh_id, node_id } => {
            commands::set_root(&ctx, &mesh_id, node_id.as_deref()).await
        }
        Command::Rename { mesh_id, name } => commands::rename(&ctx, &mesh_id, &name).await,
        Command::Delete { mesh_id } => commands::delete(&ctx, &mesh_id).await,
        Command::Export {
            mesh_id,
            output,
            index_only,
        } => commands::export(&ctx, &mesh_id, &output, index_only).await,
    }
}
