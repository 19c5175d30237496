//! Repository port for Q-table persistence.
//!
//! This module defines the trait boundary between the learning engine and
//! the storage used for the value table.

use crate::{Result, q_learning::QTable};

/// Outcome of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Data was read; counts what was actually written into the table
    Loaded { rows: usize, cells: usize },
    /// Nothing stored yet; the table keeps its current values
    Missing,
}

/// Port for persisting and loading Q-tables.
///
/// # Examples
///
/// ```no_run
/// use evader::ports::TableRepository;
/// use evader::q_learning::QTable;
///
/// fn checkpoint<R: TableRepository>(repo: &R, table: &QTable) -> evader::Result<()> {
///     repo.save(table)
/// }
/// ```
pub trait TableRepository: Send {
    /// Save the table, replacing anything stored before.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    fn save(&self, table: &QTable) -> Result<()>;

    /// Load stored values into `table`.
    ///
    /// Cells not covered by the stored data keep their current value.
    ///
    /// # Errors
    ///
    /// Returns an error if stored data exists but cannot be read or holds a
    /// malformed value. In the latter case the table is flagged invalid.
    fn load(&self, table: &mut QTable) -> Result<LoadStatus>;
}
