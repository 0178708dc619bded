//! Binary checkpoints for edge lists, spanning trees, and root files.
//!
//! Files are raw concatenations of fixed-size little-endian records with no
//! header. Every file is opened through a capability handle on its parent
//! directory, so a store never touches paths outside the directories it was
//! configured with.

use std::{
    ffi::OsString,
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use cap_std::{
    ambient_authority,
    fs::{Dir, File},
};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    config::BenchmarkConfig,
    error::CheckpointError,
    types::{Edge, EdgeList, TreeBuffer, TreeRecord, VertexId},
};

type CheckpointResult<T> = core::result::Result<T, CheckpointError>;

const ROOT_RECORD_BYTES: usize = std::mem::size_of::<VertexId>();

/// Location of the checkpoint files for one benchmark run.
///
/// # Examples
/// ```
/// use kronbench_core::{BenchmarkBuilder, CheckpointStore};
///
/// let dump = tempfile::tempdir()?;
/// let config = BenchmarkBuilder::new()
///     .with_scale(4)
///     .with_dump_dir(dump.path())
///     .build()?;
/// let store = CheckpointStore::open(&config)?;
/// assert!(store.edgelist_path().ends_with("edgelist4"));
/// assert!(store.tree_path(3).ends_with("scale4-root3"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct CheckpointStore {
    dump_dir: PathBuf,
    edgelist_path: PathBuf,
    scale: u32,
}

impl CheckpointStore {
    /// Prepares the dump directory named by `config`, creating it if needed.
    ///
    /// # Errors
    /// Returns [`CheckpointError::Open`] when the directory cannot be created.
    pub fn open(config: &BenchmarkConfig) -> CheckpointResult<Self> {
        let dump_dir = config.dump_dir().to_path_buf();
        Dir::create_ambient_dir_all(&dump_dir, ambient_authority()).map_err(|source| {
            CheckpointError::Open {
                path: dump_dir.clone(),
                source,
            }
        })?;
        let scale = config.scale();
        let edgelist_path = config
            .edgelist_path()
            .map_or_else(|| dump_dir.join(format!("edgelist{scale}")), Path::to_path_buf);
        Ok(Self {
            dump_dir,
            edgelist_path,
            scale,
        })
    }

    /// Path of the edge list checkpoint.
    #[must_use]
    pub fn edgelist_path(&self) -> &Path {
        &self.edgelist_path
    }

    /// Path of the spanning tree checkpoint for `root`.
    #[must_use]
    pub fn tree_path(&self, root: VertexId) -> PathBuf {
        self.dump_dir
            .join(format!("scale{scale}-root{root}", scale = self.scale))
    }

    /// Returns whether the edge list checkpoint already exists.
    #[must_use]
    pub fn edgelist_exists(&self) -> bool {
        open_parent(&self.edgelist_path)
            .map(|(dir, name)| dir.exists(&name))
            .unwrap_or(false)
    }

    /// Writes `edges`, replacing any earlier file.
    ///
    /// # Errors
    /// Returns [`CheckpointError::Open`] or [`CheckpointError::Write`] when the
    /// file cannot be created or fully written.
    #[instrument(
        name = "checkpoint.store_edges",
        err,
        skip(self, edges),
        fields(path = %self.edgelist_path.display(), edges = edges.len()),
    )]
    pub fn store_edges(&self, edges: &EdgeList) -> CheckpointResult<()> {
        let path = &self.edgelist_path;
        let mut writer = create_buffered(path)?;
        let mut block = Vec::with_capacity(EDGE_BLOCK * Edge::RECORD_BYTES);
        for chunk in edges.as_slice().chunks(EDGE_BLOCK) {
            block.clear();
            for edge in chunk {
                block.extend_from_slice(&edge.v0.to_le_bytes());
                block.extend_from_slice(&edge.v1.to_le_bytes());
            }
            writer.write_all(&block).map_err(|source| write_error(path, source))?;
        }
        writer.flush().map_err(|source| write_error(path, source))?;
        debug!(bytes = edges.byte_len(), "edge list checkpoint written");
        Ok(())
    }

    /// Reads the edge list checkpoint, inferring the count from its size.
    ///
    /// # Errors
    /// Returns [`CheckpointError::Misaligned`] when the size is not a whole
    /// number of edge records, and [`CheckpointError::Open`],
    /// [`CheckpointError::Read`] or [`CheckpointError::ShortRead`] on I/O
    /// failure.
    #[instrument(
        name = "checkpoint.load_edges",
        err,
        skip(self),
        fields(path = %self.edgelist_path.display()),
    )]
    pub fn load_edges(&self) -> CheckpointResult<EdgeList> {
        let path = &self.edgelist_path;
        let (file, size) = open_sized(path)?;
        if size % Edge::RECORD_BYTES as u64 != 0 {
            return Err(CheckpointError::Misaligned {
                path: path.clone(),
                actual: size,
                record_bytes: Edge::RECORD_BYTES,
            });
        }
        let bytes = read_prefix(path, file, size)?;
        let edges: Vec<Edge> = bytes
            .par_chunks_exact(Edge::RECORD_BYTES)
            .map(|record| {
                let (v0, v1) = record.split_at(ROOT_RECORD_BYTES);
                Edge::new(decode_u64(v0), decode_u64(v1))
            })
            .collect();
        debug!(edges = edges.len(), "edge list checkpoint loaded");
        Ok(EdgeList::from_edges(edges))
    }

    /// Writes the tree for `root`, replacing any earlier file.
    ///
    /// # Errors
    /// Returns [`CheckpointError::Open`] or [`CheckpointError::Write`] when the
    /// file cannot be created or fully written.
    pub fn store_tree<W: TreeRecord>(
        &self,
        root: VertexId,
        tree: &TreeBuffer<W>,
    ) -> CheckpointResult<()> {
        let path = self.tree_path(root);
        let mut writer = create_buffered(&path)?;
        let mut block = Vec::with_capacity(TREE_BLOCK * W::BYTES);
        for chunk in tree.records().chunks(TREE_BLOCK) {
            block.clear();
            for &record in chunk {
                record.write_le(&mut block);
            }
            writer.write_all(&block).map_err(|source| write_error(&path, source))?;
        }
        writer.flush().map_err(|source| write_error(&path, source))
    }

    /// Reloads the tree for `root` into `tree`.
    ///
    /// The file must hold exactly one record per entry of `tree`.
    ///
    /// # Errors
    /// Returns [`CheckpointError::SizeMismatch`] for a file of the wrong size
    /// and [`CheckpointError::Open`] or [`CheckpointError::Read`] on I/O
    /// failure.
    pub fn load_tree<W: TreeRecord>(
        &self,
        root: VertexId,
        tree: &mut TreeBuffer<W>,
    ) -> CheckpointResult<()> {
        let path = self.tree_path(root);
        let expected = (tree.len() * W::BYTES) as u64;
        let (file, size) = open_sized(&path)?;
        if size != expected {
            return Err(CheckpointError::SizeMismatch {
                path,
                expected,
                actual: size,
            });
        }
        let bytes = read_prefix(&path, file, expected)?;
        tree.records_mut()
            .par_iter_mut()
            .zip(bytes.par_chunks_exact(W::BYTES))
            .for_each(|(record, raw)| *record = W::read_le(raw));
        Ok(())
    }
}

/// Reads the first `count` little-endian root ids from `path`.
///
/// Bytes beyond the requested roots are ignored.
///
/// # Errors
/// Returns [`CheckpointError::ShortRead`] when the file holds fewer than
/// `count` ids, and [`CheckpointError::Open`] or [`CheckpointError::Read`] on
/// I/O failure.
#[instrument(name = "checkpoint.load_roots", err, fields(path = %path.display()))]
pub fn load_roots(path: &Path, count: usize) -> CheckpointResult<Vec<VertexId>> {
    let expected = (count * ROOT_RECORD_BYTES) as u64;
    let (file, size) = open_sized(path)?;
    if size < expected {
        return Err(CheckpointError::ShortRead {
            path: path.to_path_buf(),
            expected,
            actual: size,
        });
    }
    let bytes = read_prefix(path, file, expected)?;
    Ok(bytes
        .chunks_exact(ROOT_RECORD_BYTES)
        .take(count)
        .map(decode_u64)
        .collect())
}

const EDGE_BLOCK: usize = 1 << 14;
const TREE_BLOCK: usize = 1 << 15;

/// Creates or truncates `path` behind a buffered writer.
fn create_buffered(path: &Path) -> CheckpointResult<BufWriter<File>> {
    let (dir, name) = open_parent(path)?;
    let file = dir.create(&name).map_err(|source| CheckpointError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

fn open_parent(path: &Path) -> CheckpointResult<(Dir, OsString)> {
    let open_error = |source| CheckpointError::Open {
        path: path.to_path_buf(),
        source,
    };
    let name = path.file_name().ok_or_else(|| {
        open_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "checkpoint path has no file name",
        ))
    })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(open_error)?;
    Ok((dir, name.to_os_string()))
}

/// Opens `path` for reading and reports its size in bytes.
fn open_sized(path: &Path) -> CheckpointResult<(File, u64)> {
    let (dir, name) = open_parent(path)?;
    let file = dir.open(&name).map_err(|source| CheckpointError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let size = file
        .metadata()
        .map_err(|source| read_error(path, source))?
        .len();
    Ok((file, size))
}

/// Reads exactly `len` bytes from the start of `file`.
fn read_prefix(path: &Path, file: File, len: u64) -> CheckpointResult<Vec<u8>> {
    let mut bytes = Vec::with_capacity(usize::try_from(len).unwrap_or(0));
    file.take(len)
        .read_to_end(&mut bytes)
        .map_err(|source| read_error(path, source))?;
    if (bytes.len() as u64) < len {
        return Err(CheckpointError::ShortRead {
            path: path.to_path_buf(),
            expected: len,
            actual: bytes.len() as u64,
        });
    }
    Ok(bytes)
}

fn read_error(path: &Path, source: std::io::Error) -> CheckpointError {
    CheckpointError::Read {
        path: path.to_path_buf(),
        source,
    }
}

fn write_error(path: &Path, source: std::io::Error) -> CheckpointError {
    CheckpointError::Write {
        path: path.to_path_buf(),
        source,
    }
}

fn decode_u64(raw: &[u8]) -> u64 {
    let mut word = [0_u8; ROOT_RECORD_BYTES];
    word.copy_from_slice(raw);
    u64::from_le_bytes(word)
}
