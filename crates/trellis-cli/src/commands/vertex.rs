//! Vertex commands

use clap::{Args, Subcommand};

use crate::commands::initializer;
use crate::output::{format_output, print_vertices, OutputFormat, VertexView};
use crate::AppContext;
use trellis_core::{FrameType, VertexFrame, VERTEX_ROOT};
use trellis_storage::StorageBackend;

#[derive(Args)]
pub struct VertexArgs {
    #[command(subcommand)]
    pub command: VertexCommands,
}

#[derive(Subcommand)]
pub enum VertexCommands {
    /// Add a new vertex
    Add {
        /// Frame type to create
        #[arg(short = 't', long)]
        r#type: Option<String>,
        /// Vertex label
        #[arg(short, long)]
        label: Option<String>,
        /// Property as key=value (repeatable)
        #[arg(short, long = "prop")]
        prop: Vec<String>,
    },
    /// Get vertex details
    Get {
        /// Vertex id
        id: String,
    },
    /// List vertices
    List {
        /// Only vertices assignable to this frame type
        #[arg(short = 't', long)]
        r#type: Option<String>,
        /// Limit results
        #[arg(short = 'n', long, default_value = "100")]
        limit: usize,
    },
    /// Delete a vertex and every edge touching it
    Delete {
        /// Vertex id
        id: String,
    },
}

pub fn run(args: &VertexArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        VertexCommands::Add { r#type, label, prop } => {
            let init = initializer(r#type.as_deref(), VERTEX_ROOT, label.as_deref(), prop)?;
            let frame = ctx.graph.add_vertex(init.as_ref())?;
            tracing::info!("Created vertex {} ({})", frame.id(), frame.frame_type());

            match ctx.format {
                OutputFormat::Json => println!("{}", format_output(&VertexView::from(&frame), ctx.format)),
                OutputFormat::Table => println!("{}", frame.id()),
            }
        }
        VertexCommands::Get { id } => {
            let frame = ctx.vertex(id)?;
            println!("{}", format_output(&VertexView::from(&frame), ctx.format));
        }
        VertexCommands::List { r#type, limit } => {
            let target = r#type.as_deref().map(FrameType::new);
            let mut frames: Vec<VertexFrame> = Vec::new();

            for vertex in ctx.store.vertices()? {
                if frames.len() >= *limit {
                    break;
                }
                if let Some(target) = &target {
                    if !ctx.graph.resolver().matches(&vertex, target)? {
                        continue;
                    }
                }
                frames.push(ctx.graph.frame_vertex(vertex)?);
            }

            tracing::info!("Found {} vertices", frames.len());
            print_vertices(&frames, ctx.format);
        }
        VertexCommands::Delete { id } => {
            let frame = ctx.vertex(id)?;
            let id = *frame.id();
            frame.remove()?;
            tracing::info!("Deleted vertex: {}", id);
            if ctx.format == OutputFormat::Table {
                println!("Deleted vertex: {}", id);
            }
        }
    }

    Ok(())
}
