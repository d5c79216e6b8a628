//! # Shader Loading
//!
//! Shader sources are fetched asynchronously by a [`ShaderLoader`]. A
//! primitive holds the pending fetch in its [`ProgramState`] until the scene
//! polls it to completion, compiles the sources and resolves the primitive's
//! bindings against the linked program.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};

use crate::error::ShaderError;
use crate::gfx::backend::ProgramId;

/// Vertex and fragment source text of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

/// An in-flight shader fetch.
pub type ShaderLoad = BoxFuture<'static, Result<ShaderSources, ShaderError>>;

/// Retrieves shader source text from somewhere.
pub trait ShaderLoader {
    /// Starts fetching both stages. Polling the returned load must never
    /// block the caller.
    fn fetch(&self, vertex: &str, fragment: &str) -> ShaderLoad;
}

/// Lifecycle of a primitive's shader program.
pub enum ProgramState {
    /// Sources are still being fetched.
    Pending(ShaderLoad),
    Ready(ProgramId),
    /// Fetch, compilation or binding resolution failed. Terminal.
    Failed,
}

impl ProgramState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ProgramState::Pending(_))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ProgramState::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProgramState::Failed)
    }

    pub fn program(&self) -> Option<ProgramId> {
        match self {
            ProgramState::Ready(program) => Some(*program),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ProgramState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgramState::Pending(_) => f.write_str("Pending"),
            ProgramState::Ready(program) => f.debug_tuple("Ready").field(program).finish(),
            ProgramState::Failed => f.write_str("Failed"),
        }
    }
}

/// Reads shader files relative to a root directory.
///
/// Files are read when the load is created, so polling it is immediate.
#[derive(Debug, Clone)]
pub struct FileShaderLoader {
    root: PathBuf,
}

impl FileShaderLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

fn read_source(path: PathBuf) -> Result<String, ShaderError> {
    std::fs::read_to_string(&path).map_err(|source| ShaderError::Fetch { path, source })
}

impl ShaderLoader for FileShaderLoader {
    fn fetch(&self, vertex: &str, fragment: &str) -> ShaderLoad {
        let vertex_path = self.root.join(vertex);
        let fragment_path = self.root.join(fragment);
        log::debug!("fetching shaders {:?} and {:?}", vertex_path, fragment_path);
        let sources = read_source(vertex_path).and_then(|vertex| {
            Ok(ShaderSources {
                vertex,
                fragment: read_source(fragment_path)?,
            })
        });
        future::ready(sources).boxed()
    }
}

/// Serves sources registered in memory under a key.
#[derive(Debug, Clone, Default)]
pub struct StaticShaderLoader {
    sources: Arc<HashMap<String, String>>,
}

impl StaticShaderLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pattern: register `source` under `key`.
    pub fn with_source(mut self, key: impl Into<String>, source: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.sources).insert(key.into(), source.into());
        self
    }

    fn lookup(&self, key: &str) -> Result<String, ShaderError> {
        self.sources
            .get(key)
            .cloned()
            .ok_or_else(|| ShaderError::Missing(key.to_string()))
    }
}

impl ShaderLoader for StaticShaderLoader {
    fn fetch(&self, vertex: &str, fragment: &str) -> ShaderLoad {
        let sources = self.lookup(vertex).and_then(|vertex| {
            Ok(ShaderSources {
                vertex,
                fragment: self.lookup(fragment)?,
            })
        });
        future::ready(sources).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_loader_serves_registered_sources() {
        let loader = StaticShaderLoader::new()
            .with_source("a.vert", "void main() {}")
            .with_source("a.frag", "void main() { }");
        let sources = pollster::block_on(loader.fetch("a.vert", "a.frag")).unwrap();
        assert_eq!(sources.vertex, "void main() {}");
        assert_eq!(sources.fragment, "void main() { }");
    }

    #[test]
    fn test_static_loader_reports_missing_stage() {
        let loader = StaticShaderLoader::new().with_source("a.vert", "void main() {}");
        let result = pollster::block_on(loader.fetch("a.vert", "missing.frag"));
        assert!(matches!(result, Err(ShaderError::Missing(key)) if key == "missing.frag"));
    }

    #[test]
    fn test_file_loader_reports_fetch_errors() {
        let loader = FileShaderLoader::new("/nonexistent/shader/root");
        let result = pollster::block_on(loader.fetch("lit.vert", "lit.frag"));
        assert!(matches!(result, Err(ShaderError::Fetch { .. })));
    }

    #[test]
    fn test_file_loader_reads_bundled_shaders() {
        let loader = FileShaderLoader::new(concat!(env!("CARGO_MANIFEST_DIR"), "/shaders"));
        let sources = pollster::block_on(loader.fetch("lit.vert", "lit.frag")).unwrap();
        assert!(sources.vertex.contains("uModelViewMatrix"));
        assert!(sources.fragment.contains("uSampler"));
    }

    #[test]
    fn test_file_loader_reads_on_fetch() {
        let root = std::env::temp_dir().join(format!("glint-shaders-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("a.vert"), "void main() {}").unwrap();
        std::fs::write(root.join("a.frag"), "void main() { }").unwrap();

        let load = FileShaderLoader::new(root.clone()).fetch("a.vert", "a.frag");
        std::fs::remove_dir_all(&root).unwrap();

        // the files are gone, yet the load resolves on its first poll
        let mut load = load;
        let waker = futures::task::noop_waker();
        let mut cx = std::task::Context::from_waker(&waker);
        match load.poll_unpin(&mut cx) {
            std::task::Poll::Ready(Ok(sources)) => {
                assert_eq!(sources.vertex, "void main() {}");
                assert_eq!(sources.fragment, "void main() { }");
            }
            other => panic!("expected ready sources, got {:?}", other.map(|r| r.is_ok())),
        }
    }
}
