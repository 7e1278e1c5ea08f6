//! Adjacency commands: one per traversal or mutation verb

use clap::{Args, Subcommand};

use crate::commands::initializer;
use crate::output::{print_edges, print_stats, print_vertices};
use crate::AppContext;
use trellis_core::{Direction, TraversalEngine, VertexFrame, EDGE_ROOT, VERTEX_ROOT};

#[derive(Args)]
pub struct AdjacencyArgs {
    #[command(subcommand)]
    pub command: AdjacencyCommands,
}

#[derive(Subcommand)]
pub enum AdjacencyCommands {
    /// List adjacent vertices (or edges)
    Get {
        /// Source vertex id
        id: String,
        /// Edge label
        label: String,
        /// Direction: out, in, both
        #[arg(long, default_value = "out")]
        direction: String,
        /// Only vertices (or edges) assignable to this frame type
        #[arg(short = 't', long)]
        r#type: Option<String>,
        /// Only results whose other end is this vertex
        #[arg(long)]
        peer: Option<String>,
        /// Stop at the first match
        #[arg(long, conflicts_with = "edges")]
        first: bool,
        /// List the edges instead of the vertices
        #[arg(long)]
        edges: bool,
    },
    /// Link a vertex, creating it when no peer is given
    Add {
        /// Source vertex id
        id: String,
        /// Edge label
        label: String,
        /// Direction: out, in, both
        #[arg(long, default_value = "out")]
        direction: String,
        /// Existing peer vertex id
        #[arg(long)]
        peer: Option<String>,
        /// Frame type of the vertex to create
        #[arg(long = "vertex-type", conflicts_with = "peer")]
        vertex_type: Option<String>,
        /// Frame type of the created edge(s)
        #[arg(long = "edge-type")]
        edge_type: Option<String>,
        /// Edge property as key=value (repeatable)
        #[arg(short, long = "prop")]
        prop: Vec<String>,
    },
    /// Replace every matching edge with edges to the given peers
    Set {
        /// Source vertex id
        id: String,
        /// Edge label
        label: String,
        /// Direction: out, in, both
        #[arg(long, default_value = "out")]
        direction: String,
        /// Peer vertex ids (none clears the adjacency)
        peers: Vec<String>,
    },
    /// Remove matching edges
    Remove {
        /// Source vertex id
        id: String,
        /// Edge label
        label: String,
        /// Direction: out, in, both
        #[arg(long, default_value = "out")]
        direction: String,
        /// Only edges whose other end is this vertex
        #[arg(long)]
        peer: Option<String>,
    },
}

pub fn run(args: &AdjacencyArgs, ctx: &AppContext) -> anyhow::Result<()> {
    match &args.command {
        AdjacencyCommands::Get {
            id,
            label,
            direction,
            r#type,
            peer,
            first,
            edges,
        } => {
            let source = ctx.vertex(id)?;
            let direction: Direction = direction.parse()?;
            let peer = peer.as_deref().map(|p| ctx.vertex(p)).transpose()?;
            tracing::debug!("adj get {} -[{}]- {}", source.id(), label, direction);

            let mut request = source.adjacency(direction, label)?;
            if let Some(target) = r#type {
                request = request.of_type(target.as_str());
            }
            if let Some(peer) = &peer {
                request = request.with_peer(peer);
            }

            if *edges {
                let found = TraversalEngine::traverse_edges(&request)?.into_frames()?;
                tracing::info!("Found {} adjacent edges", found.len());
                print_edges(&found, ctx.format);
                return Ok(());
            }

            let found: Vec<VertexFrame> = if *first {
                TraversalEngine::traverse_singleton(&request)?
                    .into_iter()
                    .collect()
            } else {
                TraversalEngine::traverse(&request)?.into_frames()?
            };
            tracing::info!("Found {} adjacent vertices", found.len());
            print_vertices(&found, ctx.format);
        }
        AdjacencyCommands::Add {
            id,
            label,
            direction,
            peer,
            vertex_type,
            edge_type,
            prop,
        } => {
            let source = ctx.vertex(id)?;
            let direction: Direction = direction.parse()?;
            let edge_init = initializer(edge_type.as_deref(), EDGE_ROOT, None, prop)?;

            match peer {
                Some(peer) => {
                    let peer = ctx.vertex(peer)?;
                    let created = source.link(direction, label, &peer, edge_init.as_ref())?;
                    tracing::info!("Linked {} with {} edge(s)", peer.id(), created.len());
                    print_edges(&created, ctx.format);
                }
                None => {
                    let vertex_init = initializer(vertex_type.as_deref(), VERTEX_ROOT, None, &[])?;
                    let created =
                        source.add_adjacent(direction, label, vertex_init.as_ref(), edge_init.as_ref())?;
                    tracing::info!("Created adjacent vertex {}", created.id());
                    print_vertices(&[created], ctx.format);
                }
            }
        }
        AdjacencyCommands::Set {
            id,
            label,
            direction,
            peers,
        } => {
            let source = ctx.vertex(id)?;
            let direction: Direction = direction.parse()?;
            let peers = peers
                .iter()
                .map(|p| ctx.vertex(p))
                .collect::<anyhow::Result<Vec<_>>>()?;

            let stats = source.set_adjacent(direction, label, &peers)?;
            print_stats(&stats, ctx.format);
        }
        AdjacencyCommands::Remove {
            id,
            label,
            direction,
            peer,
        } => {
            let source = ctx.vertex(id)?;
            let direction: Direction = direction.parse()?;
            let peer = peer.as_deref().map(|p| ctx.vertex(p)).transpose()?;

            let stats = source.remove_adjacent(direction, label, peer.as_ref())?;
            print_stats(&stats, ctx.format);
        }
    }

    Ok(())
}
