//! File-backed Q-table repository.
//!
//! Implements the TableRepository port with the `;`-delimited text format
//! from [`crate::q_learning::serialization`].

use std::{
    fs::File,
    io::{BufReader, BufWriter, ErrorKind},
    path::{Path, PathBuf},
};

use crate::{
    Result,
    error::Error,
    ports::{LoadStatus, TableRepository},
    q_learning::{QTable, serialization},
};

/// Text file repository for Q-tables.
///
/// # Examples
///
/// ```no_run
/// use evader::adapters::TextFileRepository;
/// use evader::ports::TableRepository;
/// use evader::q_learning::QTable;
///
/// let repo = TextFileRepository::new("q_table.csv");
/// let mut table = QTable::new();
/// repo.load(&mut table)?;
/// repo.save(&table)?;
/// # Ok::<(), evader::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TextFileRepository {
    path: PathBuf,
}

impl TextFileRepository {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableRepository for TextFileRepository {
    fn save(&self, table: &QTable) -> Result<()> {
        let file = File::create(&self.path).map_err(|source| Error::Io {
            operation: format!("create file {:?}", self.path),
            source,
        })?;
        serialization::write_table(table, BufWriter::new(file))
    }

    fn load(&self, table: &mut QTable) -> Result<LoadStatus> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!("Q-table file {:?} not found", self.path);
                return Ok(LoadStatus::Missing);
            }
            Err(source) => {
                return Err(Error::Io {
                    operation: format!("open file {:?}", self.path),
                    source,
                });
            }
        };
        serialization::read_table(BufReader::new(file), table)
    }
}
