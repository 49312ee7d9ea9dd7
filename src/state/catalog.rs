use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use super::data::{Folder, OutputLayout, OutputMode, Project};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not determine user data directory")]
    NoDataDir,

    #[error("invalid project name")]
    InvalidName,

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("folder not found: {0}")]
    FolderNotFound(String),

    #[error("folder already added to project: {}", .0.display())]
    DuplicateFolder(PathBuf),
}

/// Strip characters that are not allowed in a directory name
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// The Catalog manages the SQLite database of projects and their
/// source folders. Triage decisions are never stored here.
pub struct Catalog {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Catalog {
    /// Open (or create) the catalog in the user's data directory:
    /// - Linux: ~/.local/share/toss/toss.db
    /// - macOS: ~/Library/Application Support/toss/toss.db
    /// - Windows: %APPDATA%\toss\toss.db
    pub fn new() -> Result<Self, CatalogError> {
        Self::open(&Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf, CatalogError> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or(CatalogError::NoDataDir)?;

        path.push("toss");
        path.push("toss.db");
        Ok(path)
    }

    pub fn open(db_path: &Path) -> Result<Self, CatalogError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        debug!("Catalog opened at {}", db_path.display());

        let catalog = Catalog {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let catalog = Catalog {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        catalog.init_schema()?;
        Ok(catalog)
    }

    fn init_schema(&self) -> Result<(), CatalogError> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS projects (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                path            TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                output_layout   TEXT NOT NULL DEFAULT 'per-folder'
            );

            CREATE TABLE IF NOT EXISTS folders (
                id              TEXT PRIMARY KEY,
                project_id      TEXT NOT NULL,
                source_path     TEXT NOT NULL,
                output_mode     TEXT NOT NULL DEFAULT 'move',
                added_at        TEXT NOT NULL,
                UNIQUE(project_id, source_path),
                FOREIGN KEY(project_id) REFERENCES projects(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_folders_project_id
            ON folders(project_id);",
        )?;
        Ok(())
    }

    /// Path of the database file (None for in-memory catalogs)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Create a project directory `<parent>/<sanitized name>` and register it
    pub fn create_project(
        &self,
        name: &str,
        parent: &Path,
        layout: OutputLayout,
    ) -> Result<Project, CatalogError> {
        let name = sanitize_name(name);
        if name.is_empty() {
            return Err(CatalogError::InvalidName);
        }

        let path = parent.join(&name);
        std::fs::create_dir_all(&path)?;

        let project = Project {
            id: Uuid::new_v4().to_string(),
            name,
            path,
            created_at: Utc::now().to_rfc3339(),
            output_layout: layout,
            folders: Vec::new(),
        };

        self.conn.execute(
            "INSERT INTO projects (id, name, path, created_at, output_layout)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                project.id,
                project.name,
                project.path.to_string_lossy().to_string(),
                project.created_at,
                project.output_layout.as_str(),
            ],
        )?;

        info!("Created project {} at {}", project.name, project.path.display());
        Ok(project)
    }

    /// All projects, newest first, with their folders
    pub fn list_projects(&self) -> Result<Vec<Project>, CatalogError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, path, created_at, output_layout
             FROM projects ORDER BY created_at DESC",
        )?;

        let rows = stmt.query_map([], Self::project_from_row)?;

        let mut projects = Vec::new();
        for project in rows {
            let mut project = project?;
            project.folders = self.folders_of(&project.id)?;
            projects.push(project);
        }
        Ok(projects)
    }

    pub fn get_project(&self, project_id: &str) -> Result<Project, CatalogError> {
        let project = self
            .conn
            .query_row(
                "SELECT id, name, path, created_at, output_layout
                 FROM projects WHERE id = ?1",
                [project_id],
                Self::project_from_row,
            )
            .optional()?;

        let mut project =
            project.ok_or_else(|| CatalogError::ProjectNotFound(project_id.to_string()))?;
        project.folders = self.folders_of(project_id)?;
        Ok(project)
    }

    /// Forget a project. Its output directory is left on disk.
    pub fn delete_project(&self, project_id: &str) -> Result<(), CatalogError> {
        let deleted = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1", [project_id])?;
        if deleted == 0 {
            return Err(CatalogError::ProjectNotFound(project_id.to_string()));
        }
        Ok(())
    }

    pub fn add_folder(
        &self,
        project_id: &str,
        source_path: &Path,
        output_mode: OutputMode,
    ) -> Result<Folder, CatalogError> {
        // ProjectNotFound rather than a foreign key error
        self.get_project(project_id)?;

        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            source_path: source_path.to_path_buf(),
            output_mode,
            added_at: Utc::now().to_rfc3339(),
        };

        let result = self.conn.execute(
            "INSERT INTO folders (id, project_id, source_path, output_mode, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                folder.id,
                project_id,
                folder.source_path.to_string_lossy().to_string(),
                folder.output_mode.as_str(),
                folder.added_at,
            ],
        );

        match result {
            Ok(_) => Ok(folder),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(CatalogError::DuplicateFolder(folder.source_path))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn remove_folder(&self, project_id: &str, folder_id: &str) -> Result<(), CatalogError> {
        let removed = self.conn.execute(
            "DELETE FROM folders WHERE id = ?1 AND project_id = ?2",
            [folder_id, project_id],
        )?;
        if removed == 0 {
            return Err(CatalogError::FolderNotFound(folder_id.to_string()));
        }
        Ok(())
    }

    pub fn set_folder_output_mode(
        &self,
        folder_id: &str,
        mode: OutputMode,
    ) -> Result<(), CatalogError> {
        let updated = self.conn.execute(
            "UPDATE folders SET output_mode = ?1 WHERE id = ?2",
            [mode.as_str(), folder_id],
        )?;
        if updated == 0 {
            return Err(CatalogError::FolderNotFound(folder_id.to_string()));
        }
        Ok(())
    }

    pub fn set_output_layout(
        &self,
        project_id: &str,
        layout: OutputLayout,
    ) -> Result<(), CatalogError> {
        let updated = self.conn.execute(
            "UPDATE projects SET output_layout = ?1 WHERE id = ?2",
            [layout.as_str(), project_id],
        )?;
        if updated == 0 {
            return Err(CatalogError::ProjectNotFound(project_id.to_string()));
        }
        Ok(())
    }

    fn folders_of(&self, project_id: &str) -> Result<Vec<Folder>, CatalogError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, source_path, output_mode, added_at
             FROM folders WHERE project_id = ?1 ORDER BY added_at, rowid",
        )?;

        let rows = stmt.query_map([project_id], |row| {
            let mode: String = row.get(2)?;
            Ok(Folder {
                id: row.get(0)?,
                source_path: PathBuf::from(row.get::<_, String>(1)?),
                output_mode: OutputMode::parse(&mode).unwrap_or_default(),
                added_at: row.get(3)?,
            })
        })?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn project_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Project> {
        let layout: String = row.get(4)?;
        Ok(Project {
            id: row.get(0)?,
            name: row.get(1)?,
            path: PathBuf::from(row.get::<_, String>(2)?),
            created_at: row.get(3)?,
            output_layout: OutputLayout::parse(&layout).unwrap_or_default(),
            folders: Vec::new(),
        })
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("db_path", &self.db_path)
            .finish()
    }
}
