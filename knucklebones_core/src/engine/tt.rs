use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TTFlag {
    Exact,
    LowerBound, // Beta cutoff (fail-high)
    UpperBound, // No move raised alpha (fail-low)
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TTEntry {
    pub value: f64,
    pub flag: TTFlag,
    pub depth: u8,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("failed to access transposition table file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed transposition table snapshot: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SnapshotRef<'a, K> {
    entries: Vec<(&'a K, &'a TTEntry)>,
}

#[derive(Deserialize)]
struct Snapshot<K> {
    entries: Vec<(K, TTEntry)>,
}

/// Unbounded position cache. Entries live until the table is dropped or
/// cleared; there is no replacement policy beyond overwrite-on-store.
#[derive(Debug, Clone)]
pub struct TranspositionTable<K> {
    entries: HashMap<K, TTEntry>,
}

impl<K> Default for TranspositionTable<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> TranspositionTable<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn probe(&self, key: &K) -> Option<TTEntry> {
        self.entries.get(key).copied()
    }

    pub fn store(&mut self, key: K, entry: TTEntry) {
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &TTEntry)> {
        self.entries.iter()
    }
}

impl<K: Eq + Hash + Serialize + DeserializeOwned> TranspositionTable<K> {
    /// Reads a whole-table snapshot. A missing file is an empty table; a
    /// present but unreadable one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!(
                    "no transposition table at {}, starting empty",
                    path.display()
                );
                return Ok(Self::new());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: Snapshot<K> = serde_json::from_reader(BufReader::new(file))?;
        let entries: HashMap<K, TTEntry> = snapshot.entries.into_iter().collect();
        log::info!(
            "loaded {} transposition entries from {}",
            entries.len(),
            path.display()
        );
        Ok(Self { entries })
    }

    /// Writes a whole-table snapshot. The file is replaced atomically.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        let tmp = path.with_extension("json.tmp");

        let snapshot = SnapshotRef {
            entries: self.entries.iter().collect(),
        };
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, &snapshot)?;
        writer.flush()?;
        drop(writer);
        std::fs::rename(&tmp, path)?;

        log::info!(
            "saved {} transposition entries to {}",
            self.entries.len(),
            path.display()
        );
        Ok(())
    }
}
