//! ReDB graph store
//!
//! Layout:
//! - `vertices`: vertex id → JSON vertex
//! - `edges`: edge id → JSON [`EdgeRecord`]
//! - `adjacency`: `{vertex}/{o|i}/{label}/{seq:020}` → edge id
//! - `meta`: schema version and the edge sequence counter
//!
//! The zero-padded sequence number keeps each vertex's edges for one label
//! in creation order under a single key prefix.

use crate::error::{StorageError, StorageResult};
use crate::traits::{Side, StorageBackend};
use ::redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use trellis_core::{
    Direction, Edge, ElementId, ElementIter, GraphStore, Properties, Result, Vertex,
    DEFAULT_VERTEX_LABEL,
};

// Table definitions
const VERTICES: TableDefinition<&str, &[u8]> = TableDefinition::new("vertices");
const EDGES: TableDefinition<&str, &[u8]> = TableDefinition::new("edges");
const ADJACENCY: TableDefinition<&str, &str> = TableDefinition::new("adjacency");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SCHEMA_VERSION_KEY: &str = "schema_version";
const EDGE_SEQ_KEY: &str = "edge_seq";
const SEQ_WIDTH: usize = 20;

/// Current on-disk schema version
pub const SCHEMA_VERSION: u64 = 1;

/// Stored form of an edge
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EdgeRecord {
    edge: Edge,
    seq: u64,
}

impl EdgeRecord {
    fn out_key(&self) -> String {
        adjacency_key(&self.edge.out_vertex, Side::Out, &self.edge.label, self.seq)
    }

    fn in_key(&self) -> String {
        adjacency_key(&self.edge.in_vertex, Side::In, &self.edge.label, self.seq)
    }
}

fn side_tag(side: Side) -> &'static str {
    match side {
        Side::Out => "o",
        Side::In => "i",
    }
}

fn adjacency_prefix(vertex: &ElementId, side: Side, label: &str) -> String {
    format!("{}/{}/{}/", vertex, side_tag(side), label)
}

fn adjacency_key(vertex: &ElementId, side: Side, label: &str, seq: u64) -> String {
    format!(
        "{}{:0width$}",
        adjacency_prefix(vertex, side, label),
        seq,
        width = SEQ_WIDTH
    )
}

/// ReDB graph store
pub struct RedbGraphStore {
    db: Mutex<Database>,
}

impl RedbGraphStore {
    /// Open or create a ReDB database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path.as_ref())?;

        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(VERTICES)?;
            let _ = write_txn.open_table(EDGES)?;
            let _ = write_txn.open_table(ADJACENCY)?;
            let mut meta = write_txn.open_table(META)?;

            let existing = meta.get(SCHEMA_VERSION_KEY)?.map(|v| v.value());
            match existing {
                None => {
                    meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION)?;
                    tracing::info!("Initialized graph store at schema v{}", SCHEMA_VERSION);
                }
                Some(SCHEMA_VERSION) => {
                    tracing::debug!("Graph store already at schema v{}", SCHEMA_VERSION);
                }
                Some(found) => {
                    return Err(StorageError::Migration(format!(
                        "{} has schema v{}, expected v{}",
                        path.as_ref().display(),
                        found,
                        SCHEMA_VERSION
                    )));
                }
            }
        }
        write_txn.commit()?;

        Ok(Self { db: Mutex::new(db) })
    }

    fn db(&self) -> StorageResult<MutexGuard<'_, Database>> {
        self.db.lock().map_err(StorageError::lock)
    }

    /// Edge ids under one adjacency prefix, in sequence order
    fn snapshot(&self, vertex: &ElementId, side: Side, label: &str) -> StorageResult<Vec<ElementId>> {
        let prefix = adjacency_prefix(vertex, side, label);

        let db = self.db()?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(ADJACENCY)?;

        let mut ids = Vec::new();
        for entry in table.range(prefix.as_str()..)? {
            let (key, value) = entry?;
            let Some(seq) = key.value().strip_prefix(prefix.as_str()) else {
                break;
            };
            // A longer label sharing this prefix, e.g. "a/b" under "a/"
            if seq.len() != SEQ_WIDTH {
                continue;
            }
            let id = ElementId::from_string(value.value())
                .map_err(|e| StorageError::Database(format!("Corrupt adjacency entry: {}", e)))?;
            ids.push(id);
        }

        Ok(ids)
    }

    fn load_edge_record(
        table: &impl ReadableTable<&'static str, &'static [u8]>,
        id: &str,
    ) -> StorageResult<Option<EdgeRecord>> {
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

impl GraphStore for RedbGraphStore {
    fn add_vertex(&self, label: Option<&str>, properties: Properties) -> Result<Vertex> {
        let vertex = Vertex::new(label.unwrap_or(DEFAULT_VERTEX_LABEL)).with_properties(properties);
        let key = vertex.id.to_string();
        let value = serde_json::to_vec(&vertex)?;

        let db = self.db()?;
        let write_txn = db.begin_write().map_err(StorageError::from)?;
        {
            let mut table = write_txn.open_table(VERTICES).map_err(StorageError::from)?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(StorageError::from)?;
        }
        write_txn.commit().map_err(StorageError::from)?;

        Ok(vertex)
    }

    fn add_edge(
        &self,
        out_vertex: &ElementId,
        in_vertex: &ElementId,
        label: &str,
        properties: Properties,
    ) -> Result<Edge> {
        let edge = Edge::new(*out_vertex, *in_vertex, label).with_properties(properties);
        self.insert_edge(edge).map_err(Into::into)
    }

    fn set_property(&self, id: &ElementId, key: &str, value: serde_json::Value) -> Result<()> {
        self.write_property(id, key, value).map_err(Into::into)
    }

    fn remove_edge(&self, id: &ElementId) -> Result<()> {
        self.delete_edge(id).map_err(Into::into)
    }

    fn remove_vertex(&self, id: &ElementId) -> Result<()> {
        self.delete_vertex(id).map_err(Into::into)
    }

    fn vertex(&self, id: &ElementId) -> Result<Option<Vertex>> {
        let key = id.to_string();

        let db = self.db()?;
        let read_txn = db.begin_read().map_err(StorageError::from)?;
        let table = read_txn.open_table(VERTICES).map_err(StorageError::from)?;

        let stored = table.get(key.as_str()).map_err(StorageError::from)?;
        match stored {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn edge(&self, id: &ElementId) -> Result<Option<Edge>> {
        let key = id.to_string();

        let db = self.db()?;
        let read_txn = db.begin_read().map_err(StorageError::from)?;
        let table = read_txn.open_table(EDGES).map_err(StorageError::from)?;

        let record = Self::load_edge_record(&table, &key)?;
        Ok(record.map(|r| r.edge))
    }

    fn adjacent_edges<'a>(
        &'a self,
        vertex: &ElementId,
        direction: Direction,
        label: &str,
    ) -> Result<ElementIter<'a, Edge>> {
        let mut ids = Vec::new();
        for &side in Side::of(direction) {
            ids.extend(self.snapshot(vertex, side, label)?);
        }
        Ok(Box::new(ids.into_iter().filter_map(move |id| self.edge(&id).transpose())))
    }
}

impl RedbGraphStore {
    fn insert_edge(&self, edge: Edge) -> StorageResult<Edge> {
        let db = self.db()?;
        let write_txn = db.begin_write()?;
        let record = {
            let vertices = write_txn.open_table(VERTICES)?;
            for endpoint in [&edge.out_vertex, &edge.in_vertex] {
                if vertices.get(endpoint.to_string().as_str())?.is_none() {
                    return Err(StorageError::VertexNotFound(endpoint.to_string()));
                }
            }

            let mut meta = write_txn.open_table(META)?;
            let seq = meta.get(EDGE_SEQ_KEY)?.map(|v| v.value()).unwrap_or(0) + 1;
            meta.insert(EDGE_SEQ_KEY, seq)?;

            let key = edge.id.to_string();
            let record = EdgeRecord { edge, seq };
            let value = serde_json::to_vec(&record)?;

            let mut edges = write_txn.open_table(EDGES)?;
            edges.insert(key.as_str(), value.as_slice())?;

            let mut adjacency = write_txn.open_table(ADJACENCY)?;
            adjacency.insert(record.out_key().as_str(), key.as_str())?;
            adjacency.insert(record.in_key().as_str(), key.as_str())?;

            record
        };
        write_txn.commit()?;

        Ok(record.edge)
    }

    fn write_property(&self, id: &ElementId, key: &str, value: serde_json::Value) -> StorageResult<()> {
        let element_key = id.to_string();

        let db = self.db()?;
        let write_txn = db.begin_write()?;
        {
            let mut vertices = write_txn.open_table(VERTICES)?;
            let stored: Option<Vertex> = match vertices.get(element_key.as_str())? {
                Some(v) => Some(serde_json::from_slice(v.value())?),
                None => None,
            };

            if let Some(mut vertex) = stored {
                vertex.properties.insert(key.to_string(), value);
                let bytes = serde_json::to_vec(&vertex)?;
                vertices.insert(element_key.as_str(), bytes.as_slice())?;
            } else {
                let mut edges = write_txn.open_table(EDGES)?;
                let Some(mut record) = Self::load_edge_record(&edges, &element_key)? else {
                    return Err(StorageError::VertexNotFound(element_key));
                };
                record.edge.properties.insert(key.to_string(), value);
                let bytes = serde_json::to_vec(&record)?;
                edges.insert(element_key.as_str(), bytes.as_slice())?;
            }
        }
        write_txn.commit()?;

        Ok(())
    }

    fn delete_edge(&self, id: &ElementId) -> StorageResult<()> {
        let key = id.to_string();

        let db = self.db()?;
        let write_txn = db.begin_write()?;
        {
            let mut edges = write_txn.open_table(EDGES)?;
            let Some(record) = Self::load_edge_record(&edges, &key)? else {
                return Err(StorageError::EdgeNotFound(key));
            };
            edges.remove(key.as_str())?;

            let mut adjacency = write_txn.open_table(ADJACENCY)?;
            adjacency.remove(record.out_key().as_str())?;
            adjacency.remove(record.in_key().as_str())?;
        }
        write_txn.commit()?;

        Ok(())
    }

    fn delete_vertex(&self, id: &ElementId) -> StorageResult<()> {
        let key = id.to_string();
        let prefix = format!("{}/", key);

        let db = self.db()?;
        let write_txn = db.begin_write()?;
        {
            let mut vertices = write_txn.open_table(VERTICES)?;
            if vertices.remove(key.as_str())?.is_none() {
                return Err(StorageError::VertexNotFound(key));
            }

            let mut adjacency = write_txn.open_table(ADJACENCY)?;
            let mut touching = Vec::new();
            for entry in adjacency.range(prefix.as_str()..)? {
                let (entry_key, edge_id) = entry?;
                if !entry_key.value().starts_with(prefix.as_str()) {
                    break;
                }
                touching.push(edge_id.value().to_string());
            }

            let mut edges = write_txn.open_table(EDGES)?;
            let mut removed = HashSet::new();
            for edge_id in touching {
                if !removed.insert(edge_id.clone()) {
                    continue;
                }
                if let Some(record) = Self::load_edge_record(&edges, &edge_id)? {
                    edges.remove(edge_id.as_str())?;
                    adjacency.remove(record.out_key().as_str())?;
                    adjacency.remove(record.in_key().as_str())?;
                }
            }
            tracing::debug!("Removed vertex {} and {} edge(s)", key, removed.len());
        }
        write_txn.commit()?;

        Ok(())
    }
}

impl StorageBackend for RedbGraphStore {
    fn health_check(&self) -> StorageResult<bool> {
        let db = self.db()?;
        let read_txn = db.begin_read()?;
        let _ = read_txn.open_table(META)?;
        Ok(true)
    }

    fn vertices(&self) -> StorageResult<Vec<Vertex>> {
        let db = self.db()?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(VERTICES)?;

        let mut vertices = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            vertices.push(serde_json::from_slice(value.value())?);
        }

        Ok(vertices)
    }

    fn edges(&self) -> StorageResult<Vec<Edge>> {
        let db = self.db()?;
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(EDGES)?;

        let mut edges = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let record: EdgeRecord = serde_json::from_slice(value.value())?;
            edges.push(record.edge);
        }

        Ok(edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::tempdir;
    use trellis_core::FramedGraph;

    #[test]
    fn test_redb_store() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("graph.redb");

        let store = RedbGraphStore::open(&db_path).unwrap();
        assert!(store.health_check().unwrap());

        let a = store.add_vertex(None, Properties::new()).unwrap();
        let b = store.add_vertex(Some("person"), Properties::new()).unwrap();
        let edge = store.add_edge(&a.id, &b.id, "knows", Properties::new()).unwrap();

        assert_eq!(store.vertex(&b.id).unwrap().unwrap().label, "person");
        assert_eq!(store.edge(&edge.id).unwrap().unwrap(), edge);

        let incoming: Vec<Edge> = store
            .adjacent_edges(&b.id, Direction::In, "knows")
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(incoming, vec![edge.clone()]);

        store.remove_edge(&edge.id).unwrap();
        assert!(store.edge(&edge.id).unwrap().is_none());
        assert_eq!(store.adjacent_edges(&a.id, Direction::Out, "knows").unwrap().count(), 0);
    }

    #[test]
    fn test_adjacency_order_survives_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("graph.redb");

        let (hub, expected) = {
            let store = RedbGraphStore::open(&db_path).unwrap();
            let hub = store.add_vertex(None, Properties::new()).unwrap();
            let mut expected = Vec::new();
            for _ in 0..12 {
                let spoke = store.add_vertex(None, Properties::new()).unwrap();
                expected.push(store.add_edge(&hub.id, &spoke.id, "spoke", Properties::new()).unwrap().id);
            }
            (hub, expected)
        };

        let store = RedbGraphStore::open(&db_path).unwrap();
        let ids: Vec<ElementId> = store
            .adjacent_edges(&hub.id, Direction::Out, "spoke")
            .unwrap()
            .map(|e| e.map(|e| e.id))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_label_prefix_does_not_leak() {
        let dir = tempdir().unwrap();
        let store = RedbGraphStore::open(dir.path().join("graph.redb")).unwrap();
        let a = store.add_vertex(None, Properties::new()).unwrap();
        let b = store.add_vertex(None, Properties::new()).unwrap();
        store.add_edge(&a.id, &b.id, "a/b", Properties::new()).unwrap();

        assert_eq!(store.adjacent_edges(&a.id, Direction::Out, "a").unwrap().count(), 0);
        assert_eq!(store.adjacent_edges(&a.id, Direction::Out, "a/b").unwrap().count(), 1);
    }

    #[test]
    fn test_both_reads_outgoing_then_incoming() {
        let dir = tempdir().unwrap();
        let store = RedbGraphStore::open(dir.path().join("graph.redb")).unwrap();
        let a = store.add_vertex(None, Properties::new()).unwrap();
        let b = store.add_vertex(None, Properties::new()).unwrap();
        let incoming = store.add_edge(&b.id, &a.id, "knows", Properties::new()).unwrap();
        let outgoing = store.add_edge(&a.id, &b.id, "knows", Properties::new()).unwrap();

        let ids: Vec<ElementId> = store
            .adjacent_edges(&a.id, Direction::Both, "knows")
            .unwrap()
            .map(|e| e.unwrap().id)
            .collect();
        assert_eq!(ids, vec![outgoing.id, incoming.id]);
        assert_eq!(store.adjacent_edges(&a.id, Direction::Out, "knows").unwrap().count(), 1);
        assert_eq!(store.adjacent_edges(&a.id, Direction::In, "knows").unwrap().count(), 1);
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let dir = tempdir().unwrap();
        let store = RedbGraphStore::open(dir.path().join("graph.redb")).unwrap();
        let a = store.add_vertex(None, Properties::new()).unwrap();
        let b = store.add_vertex(None, Properties::new()).unwrap();
        store.add_edge(&a.id, &b.id, "knows", Properties::new()).unwrap();
        store.add_edge(&b.id, &b.id, "self", Properties::new()).unwrap();

        store.remove_vertex(&b.id).unwrap();
        assert_eq!(store.counts().unwrap().edges, 0);
        assert_eq!(store.adjacent_edges(&a.id, Direction::Out, "knows").unwrap().count(), 0);
        assert!(matches!(
            store.remove_vertex(&b.id),
            Err(trellis_core::Error::VertexNotFound(_))
        ));
    }

    #[test]
    fn test_set_property_persists() {
        let dir = tempdir().unwrap();
        let store = RedbGraphStore::open(dir.path().join("graph.redb")).unwrap();
        let a = store.add_vertex(None, Properties::new()).unwrap();
        let edge = store.add_edge(&a.id, &a.id, "loop", Properties::new()).unwrap();

        store.set_property(&a.id, "name", serde_json::json!("Ada")).unwrap();
        store.set_property(&edge.id, "weight", serde_json::json!(2)).unwrap();

        let vertex = store.vertex(&a.id).unwrap().unwrap();
        assert_eq!(vertex.properties.get("name"), Some(&serde_json::json!("Ada")));
        let edge = store.edge(&edge.id).unwrap().unwrap();
        assert_eq!(edge.properties.get("weight"), Some(&serde_json::json!(2)));
    }

    #[test]
    fn test_unknown_schema_version_rejected() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("graph.redb");
        {
            let db = Database::create(&db_path).unwrap();
            let write_txn = db.begin_write().unwrap();
            {
                let mut meta = write_txn.open_table(META).unwrap();
                meta.insert(SCHEMA_VERSION_KEY, SCHEMA_VERSION + 1).unwrap();
            }
            write_txn.commit().unwrap();
        }

        let result = RedbGraphStore::open(&db_path);
        assert!(matches!(result, Err(StorageError::Migration(_))));
    }

    #[test]
    fn test_frames_over_redb_store() {
        let dir = tempdir().unwrap();
        let store = Arc::new(RedbGraphStore::open(dir.path().join("graph.redb")).unwrap());
        let graph = FramedGraph::untyped(store.clone());

        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();
        let created = a.link(Direction::Both, "knows", &b, None).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].out_vertex().unwrap(), b);

        let both = a.traverse(Direction::Both, "knows").unwrap().ids().unwrap();
        assert_eq!(both, vec![*b.id(), *b.id()]);

        let stats = a.remove_adjacent(Direction::Both, "knows", None).unwrap();
        assert_eq!(stats.edges_removed, 2);
        assert_eq!(store.counts().unwrap().edges, 0);
    }
}
