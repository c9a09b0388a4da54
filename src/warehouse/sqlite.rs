use super::{CollectionId, Warehouse};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// A file row as recorded by the warehouse
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub id: String,
    pub collection_id: String,
    pub name: String,
    pub sha256: String,
    pub size: u64,
    pub source_path: String,
    pub profile: Option<String>,
    pub uploaded_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarehouseStats {
    pub collection_count: u32,
    pub file_count: u32,
}

/// Local warehouse keeping the collection tree and upload records in SQLite
pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to create in-memory warehouse")?;
        let warehouse = Self { conn };
        warehouse.init_schema()?;
        Ok(warehouse)
    }

    /// Open (or create) a warehouse database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .context(format!("Failed to open warehouse at {}", path.display()))?;
        let warehouse = Self { conn };
        warehouse.init_schema()?;
        Ok(warehouse)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS collections (
                id TEXT PRIMARY KEY,
                parent_id TEXT,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY (parent_id) REFERENCES collections(id)
            );

            CREATE TABLE IF NOT EXISTS files (
                id TEXT PRIMARY KEY,
                collection_id TEXT NOT NULL,
                name TEXT NOT NULL,
                sha256 TEXT NOT NULL,
                size INTEGER NOT NULL,
                source_path TEXT NOT NULL,
                profile TEXT,
                uploaded_at TEXT NOT NULL,
                UNIQUE (collection_id, name),
                FOREIGN KEY (collection_id) REFERENCES collections(id)
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_collections_parent_name
                ON collections(IFNULL(parent_id, ''), name);
            CREATE INDEX IF NOT EXISTS idx_files_collection ON files(collection_id);
            "#,
            )
            .context("Failed to initialize warehouse schema")?;
        Ok(())
    }

    /// Files recorded in one collection, by name
    pub fn files_in(&self, collection: &str) -> Result<Vec<StoredFile>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, collection_id, name, sha256, size, source_path, profile, uploaded_at \
                 FROM files WHERE collection_id = ?1 ORDER BY name",
            )
            .context("Failed to prepare statement")?;

        let files = stmt
            .query_map(params![collection], |row| {
                Ok(StoredFile {
                    id: row.get(0)?,
                    collection_id: row.get(1)?,
                    name: row.get(2)?,
                    sha256: row.get(3)?,
                    size: row.get(4)?,
                    source_path: row.get(5)?,
                    profile: row.get(6)?,
                    uploaded_at: row.get(7)?,
                })
            })
            .context("Failed to query files")?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect files")?;

        Ok(files)
    }

    /// Resolve a `/`-separated collection path from the top level down
    pub fn collection_at(&self, path: &str) -> Result<Option<CollectionId>> {
        let mut current: Option<CollectionId> = None;
        for name in path.split('/').filter(|s| !s.is_empty()) {
            match self.find_collection(current.as_deref(), name)? {
                Some(id) => current = Some(id),
                None => return Ok(None),
            }
        }
        Ok(current)
    }

    pub fn get_stats(&self) -> Result<WarehouseStats> {
        let collection_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM collections", [], |row| row.get(0))
            .context("Failed to count collections")?;

        let file_count: u32 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .context("Failed to count files")?;

        Ok(WarehouseStats {
            collection_count,
            file_count,
        })
    }
}

impl Warehouse for SqliteWarehouse {
    fn find_collection(&self, parent: Option<&str>, name: &str) -> Result<Option<CollectionId>> {
        self.conn
            .query_row(
                "SELECT id FROM collections WHERE parent_id IS ?1 AND name = ?2",
                params![parent, name],
                |row| row.get(0),
            )
            .optional()
            .context(format!("Failed to look up collection: {}", name))
    }

    fn create_collection(&self, parent: Option<&str>, name: &str) -> Result<CollectionId> {
        let id = Uuid::new_v4().to_string();
        self.conn
            .execute(
                "INSERT INTO collections (id, parent_id, name, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, parent, name, Utc::now().to_rfc3339()],
            )
            .context(format!("Failed to create collection: {}", name))?;
        Ok(id)
    }

    fn has_file(&self, collection: &str, name: &str) -> Result<bool> {
        let count: u32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM files WHERE collection_id = ?1 AND name = ?2",
                params![collection, name],
                |row| row.get(0),
            )
            .context(format!("Failed to check for file: {}", name))?;
        Ok(count > 0)
    }

    fn upload_file(
        &self,
        collection: &str,
        name: &str,
        source: &Path,
        profile: Option<&str>,
    ) -> Result<()> {
        let (sha256, size) = digest_file(source)?;
        self.conn
            .execute(
                "INSERT INTO files (id, collection_id, name, sha256, size, source_path, profile, uploaded_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    Uuid::new_v4().to_string(),
                    collection,
                    name,
                    sha256,
                    size,
                    source.to_string_lossy().into_owned(),
                    profile,
                    Utc::now().to_rfc3339()
                ],
            )
            .context(format!("Failed to record upload: {}", name))?;
        Ok(())
    }
}

/// SHA-256 (hex) and byte length of a file's contents
fn digest_file(path: &Path) -> Result<(String, u64)> {
    let contents =
        fs::read(path).context(format!("Failed to read file: {}", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok((hex::encode(hasher.finalize()), contents.len() as u64))
}
