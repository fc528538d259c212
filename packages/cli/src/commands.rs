use crate::config::CliConfig;
use anyhow::Context as _;
use docmesh_core::db::{codec, FileMeshStore, MeshStore};
use docmesh_core::{
    find_dangling_content, ContentLookup, MeshError, MeshService, NewNode, NodeMetadataUpdate,
};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared state for every command
pub struct Context {
    pub config: CliConfig,
    pub service: MeshService,
}

impl Context {
    pub fn new(config: CliConfig) -> Self {
        let service = MeshService::new(Arc::new(FileMeshStore::new(&config.store_dir)));
        Self { config, service }
    }
}

pub struct AddParams {
    pub content_id: String,
    pub parent: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
}

pub async fn new_mesh(ctx: &Context, name: &str) -> anyhow::Result<()> {
    let mesh = ctx.service.create(name).await?;
    println!("{}", mesh.id());
    Ok(())
}

pub async fn list(ctx: &Context) -> anyhow::Result<()> {
    for mesh_id in ctx.service.list().await? {
        match ctx.service.load(&mesh_id).await {
            Ok(mesh) => println!("{}  {}  ({} nodes)", mesh_id, mesh.name(), mesh.len()),
            Err(err) => println!("{}  <unreadable: {}>", mesh_id, err),
        }
    }
    Ok(())
}

pub async fn show(ctx: &Context, mesh_id: &str) -> anyhow::Result<()> {
    let mesh = ctx.service.load(mesh_id).await?;
    let contents = ctx.config.load_contents()?;

    println!("{} ({})", mesh.name(), mesh.id());
    for node in mesh.flatten() {
        let depth = mesh.depth_of(&node.id)?;
        let marker = if mesh.preferred_root() == Some(node.id.as_str()) {
            '*'
        } else {
            '-'
        };
        let label = node
            .title()
            .map(str::to_string)
            .or_else(|| contents.get(&node.content_id).map(|c| c.display_name.clone()))
            .unwrap_or_else(|| node.content_id.clone());
        println!(
            "{}{} {}  [{} -> {}]",
            "  ".repeat(depth),
            marker,
            label,
            node.id,
            node.content_id
        );
    }
    Ok(())
}

/// List every structural violation of the stored text, then any dangling
/// content references
pub async fn validate(ctx: &Context, mesh_id: &str) -> anyhow::Result<()> {
    let encoded = ctx
        .service
        .store()
        .get(mesh_id)
        .await?
        .with_context(|| format!("Mesh not found: {}", mesh_id))?;

    let mesh = match codec::decode(&encoded) {
        Ok(mesh) => mesh,
        Err(docmesh_core::db::StoreError::Invalid(MeshError::MeshValidationFailed {
            violations,
            ..
        })) => {
            println!("{}: {} violation(s)", mesh_id, violations.len());
            for violation in &violations {
                println!("  {}", violation);
            }
            anyhow::bail!("Mesh '{}' is invalid", mesh_id);
        }
        Err(err) => return Err(err.into()),
    };

    let contents = ctx.config.load_contents()?;
    let dangling = find_dangling_content(&mesh, &contents);

    println!("{}: structure valid ({} nodes)", mesh_id, mesh.len());
    for (node_id, content_id) in &dangling {
        println!("  warning: node '{}' references missing content '{}'", node_id, content_id);
    }
    Ok(())
}

pub async fn add(ctx: &Context, mesh_id: &str, params: AddParams) -> anyhow::Result<()> {
    let mut new_node = NewNode::new(params.content_id);
    if let Some(parent) = params.parent {
        new_node = new_node.under(parent);
    }
    if let Some(title) = params.title {
        new_node = new_node.with_title(title);
    }
    if let Some(description) = params.description {
        new_node = new_node.with_description(description);
    }
    if let Some(id) = params.id {
        new_node = new_node.with_id(id);
    }

    let mut added = None;
    ctx.service
        .update(mesh_id, |mesh| {
            let (next, node_id) = mesh.add_node(new_node)?;
            added = Some(node_id);
            Ok(next)
        })
        .await?;

    if let Some(node_id) = added {
        println!("{}", node_id);
    }
    Ok(())
}

pub async fn move_node(
    ctx: &Context,
    mesh_id: &str,
    node_id: &str,
    parent: Option<&str>,
    index: Option<usize>,
) -> anyhow::Result<()> {
    ctx.service
        .update(mesh_id, |mesh| {
            mesh.move_node(node_id, parent, index.unwrap_or(usize::MAX))
        })
        .await?;
    Ok(())
}

pub async fn remove(ctx: &Context, mesh_id: &str, node_id: &str, cascade: bool) -> anyhow::Result<()> {
    let before = ctx.service.load(mesh_id).await?.len();
    let mesh = ctx
        .service
        .update(mesh_id, |mesh| mesh.delete_node(node_id, cascade))
        .await?;
    println!("Removed {} node(s)", before - mesh.len());
    Ok(())
}

pub async fn edit(
    ctx: &Context,
    mesh_id: &str,
    node_id: &str,
    title: Option<String>,
    description: Option<String>,
) -> anyhow::Result<()> {
    let update = NodeMetadataUpdate { title, description };
    if update.is_empty() {
        anyhow::bail!("Nothing to change: pass --title and/or --description");
    }
    ctx.service
        .update(mesh_id, |mesh| mesh.update_node_metadata(node_id, update))
        .await?;
    Ok(())
}

pub async fn set_root(ctx: &Context, mesh_id: &str, node_id: Option<&str>) -> anyhow::Result<()> {
    ctx.service
        .update(mesh_id, |mesh| mesh.set_preferred_root(node_id))
        .await?;
    Ok(())
}

pub async fn rename(ctx: &Context, mesh_id: &str, name: &str) -> anyhow::Result<()> {
    ctx.service
        .update(mesh_id, |mesh| Ok(mesh.rename(name)))
        .await?;
    Ok(())
}

pub async fn delete(ctx: &Context, mesh_id: &str) -> anyhow::Result<()> {
    if !ctx.service.delete(mesh_id).await? {
        anyhow::bail!("Mesh not found: {}", mesh_id);
    }
    Ok(())
}

/// Export to `output`; Ctrl-C cancels without leaving a partial file
pub async fn export(ctx: &Context, mesh_id: &str, output: &Path, index_only: bool) -> anyhow::Result<()> {
    let contents = ctx.config.load_contents()?;
    let settings = &ctx.config.export;

    let bytes = if index_only {
        ctx.service
            .export_index(mesh_id, &contents, settings)
            .await?
            .into_bytes()
    } else {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        let watcher = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });
        let result = ctx
            .service
            .export_archive_from(mesh_id, &contents, settings, &cancel)
            .await;
        watcher.abort();
        result?
    };

    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} ({} bytes)", output.display(), bytes.len());
    Ok(())
}
