//! Output formatting utilities

use std::str::FromStr;

use serde::Serialize;
use trellis_core::{EdgeFrame, MutationStats, Properties, VertexFrame};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("Unknown output format '{}' (expected table or json)", other),
        }
    }
}

/// Serializable view of a vertex frame
#[derive(Debug, Serialize)]
pub struct VertexView {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub frame_type: String,
    pub properties: Properties,
}

impl From<&VertexFrame> for VertexView {
    fn from(frame: &VertexFrame) -> Self {
        Self {
            id: frame.id().to_string(),
            label: frame.label().to_string(),
            frame_type: frame.frame_type().to_string(),
            properties: frame.vertex().properties.clone(),
        }
    }
}

/// Serializable view of an edge frame
#[derive(Debug, Serialize)]
pub struct EdgeView {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub frame_type: String,
    pub out_vertex: String,
    pub in_vertex: String,
    pub properties: Properties,
}

impl From<&EdgeFrame> for EdgeView {
    fn from(frame: &EdgeFrame) -> Self {
        Self {
            id: frame.id().to_string(),
            label: frame.label().to_string(),
            frame_type: frame.frame_type().to_string(),
            out_vertex: frame.edge().out_vertex.to_string(),
            in_vertex: frame.edge().in_vertex.to_string(),
            properties: frame.edge().properties.clone(),
        }
    }
}

/// Format output based on format type
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string())
        }
        OutputFormat::Table => {
            let value = serde_json::to_value(data).unwrap_or_default();
            render_table(&value)
        }
    }
}

pub fn print_vertices(frames: &[VertexFrame], format: OutputFormat) {
    let views: Vec<VertexView> = frames.iter().map(VertexView::from).collect();
    println!("{}", format_output(&views, format));
}

pub fn print_edges(frames: &[EdgeFrame], format: OutputFormat) {
    let views: Vec<EdgeView> = frames.iter().map(EdgeView::from).collect();
    println!("{}", format_output(&views, format));
}

pub fn print_stats(stats: &MutationStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", format_output(stats, format)),
        OutputFormat::Table => println!(
            "Removed {} edge(s), added {} edge(s)",
            stats.edges_removed, stats.edges_added
        ),
    }
}

/// Render a JSON object, or an array of objects, as aligned columns.
/// Nested values are written inline as JSON.
fn render_table(value: &serde_json::Value) -> String {
    let rows: Vec<&serde_json::Map<String, serde_json::Value>> = match value {
        serde_json::Value::Array(items) => items.iter().filter_map(|v| v.as_object()).collect(),
        serde_json::Value::Object(map) => vec![map],
        other => return cell(other),
    };
    let Some(first) = rows.first() else {
        return "(none)".to_string();
    };

    let headers: Vec<&String> = first.keys().collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| row.get(h.as_str()).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| cells.iter().map(|r| r[i].len()).chain([h.len()]).max().unwrap_or(0))
        .collect();

    let line = |values: Vec<String>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.iter().map(|h| h.to_uppercase()).collect())];
    out.extend(cells.into_iter().map(line));
    out.join("\n")
}

fn cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        serde_json::Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    }
}
