//! Text format of a persisted Q-table
//!
//! One line per action row in index order, each holding the 144 state values
//! in state-id order separated by `;`. There is no header line.

use std::io::{BufRead, Write};

use super::{q_table::QTable, state::StateId};
use crate::{Error, Result, ports::LoadStatus, types::Action};

/// Field separator of the table file
pub const DELIMITER: u8 = b';';

/// Write `table` in the persisted text format.
pub fn write_table<W: Write>(table: &QTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for action in Action::ALL {
        csv_writer.write_record(table.row(action).iter().map(|value| value.to_string()))?;
    }
    csv_writer.flush().map_err(|source| Error::Io {
        operation: "flush Q-table".to_string(),
        source,
    })?;
    Ok(())
}

pub fn to_text(table: &QTable) -> String {
    let mut buffer = Vec::new();
    // Vec writes are infallible
    if write_table(table, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Read persisted values into `table`.
///
/// At most [`Action::COUNT`] lines and [`StateId::COUNT`] fields per line are
/// read. Shorter input is tolerated and leaves the remaining cells
/// untouched. An empty line, a field that is not UTF-8 or a malformed or
/// non-finite value aborts the load, flags the table invalid and returns
/// [`Error::TableParse`].
pub fn read_table<R: BufRead>(reader: R, table: &mut QTable) -> Result<LoadStatus> {
    let mut rows = 0;
    let mut cells = 0;
    for (action, read) in Action::ALL.into_iter().zip(reader.split(b'\n')) {
        let line = rows + 1;
        let raw = match read {
            Ok(raw) => raw,
            Err(source) => {
                table.mark_invalid(line, 1);
                return Err(Error::Io {
                    operation: format!("read Q-table line {line}"),
                    source,
                });
            }
        };
        let bytes = raw.strip_suffix(b"\r").unwrap_or(raw.as_slice());

        let field_count = bytes.split(|byte| *byte == DELIMITER).count();
        if field_count > StateId::COUNT {
            log::warn!(
                "Q-table line {line} has {field_count} fields, ignoring all past {}",
                StateId::COUNT
            );
        }

        for (state, field) in StateId::all().zip(bytes.split(|byte| *byte == DELIMITER)) {
            let Some(value) = parse_value(field) else {
                let field_no = state.index() + 1;
                table.mark_invalid(line, field_no);
                return Err(Error::TableParse {
                    line,
                    field: field_no,
                    value: String::from_utf8_lossy(field).into_owned(),
                });
            };
            table.update(action, state, value);
            cells += 1;
        }
        rows += 1;
    }

    Ok(LoadStatus::Loaded { rows, cells })
}

fn parse_value(field: &[u8]) -> Option<f64> {
    std::str::from_utf8(field)
        .ok()?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn from_text(text: &str, table: &mut QTable) -> Result<LoadStatus> {
    read_table(text.as_bytes(), table)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::q_learning::TableStatus;

    fn random_table(seed: u64) -> QTable {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut table = QTable::new();
        for action in Action::ALL {
            for state in StateId::all() {
                table.update(action, state, rng.random_range(-10_000.0..10_000.0));
            }
        }
        table
    }

    #[test]
    fn test_layout() {
        let mut table = QTable::new();
        table.update(Action::East, StateId::new(1).unwrap(), 1.5);
        let text = to_text(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        for line in &lines {
            assert_eq!(line.split(';').count(), StateId::COUNT);
        }
        assert!(lines[1].starts_with("0;1.5;0"));
    }

    #[test]
    fn test_roundtrip_random_values() {
        let table = random_table(17);
        let mut loaded = QTable::new();
        let status = from_text(&to_text(&table), &mut loaded).unwrap();
        assert_eq!(
            status,
            LoadStatus::Loaded {
                rows: 4,
                cells: 4 * StateId::COUNT
            }
        );
        for action in Action::ALL {
            for state in StateId::all() {
                assert!((table.value(action, state) - loaded.value(action, state)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_short_input_keeps_remaining_cells() {
        let mut table = QTable::new();
        table.update(Action::West, StateId::new(0).unwrap(), 4.0);
        let status = from_text("1;2;3\n-1.5\n", &mut table).unwrap();
        assert_eq!(status, LoadStatus::Loaded { rows: 2, cells: 4 });
        assert_eq!(table.value(Action::North, StateId::new(2).unwrap()), 3.0);
        assert_eq!(table.value(Action::North, StateId::new(3).unwrap()), 0.0);
        assert_eq!(table.value(Action::East, StateId::new(0).unwrap()), -1.5);
        assert_eq!(table.value(Action::West, StateId::new(0).unwrap()), 4.0);
        assert!(table.is_valid());
    }

    #[test]
    fn test_malformed_field_flags_table() {
        let mut table = QTable::new();
        let err = from_text("1;2\n3;abc;5\n", &mut table).unwrap_err();
        match err {
            Error::TableParse { line, field, value } => {
                assert_eq!((line, field), (2, 2));
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(table.status(), TableStatus::Invalid { line: 2, field: 2 });
        // values before the bad field were applied
        assert_eq!(table.value(Action::East, StateId::new(0).unwrap()), 3.0);
    }

    #[test]
    fn test_non_finite_field_is_malformed() {
        let mut table = QTable::new();
        assert!(from_text("NaN", &mut table).is_err());
        assert!(!table.is_valid());
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut table = QTable::new();
        let status = from_text("1;2\r\n3\r\n", &mut table).unwrap();
        assert_eq!(status, LoadStatus::Loaded { rows: 2, cells: 3 });
        assert_eq!(table.value(Action::North, StateId::new(1).unwrap()), 2.0);
        assert_eq!(table.value(Action::East, StateId::new(0).unwrap()), 3.0);
    }

    #[test]
    fn test_invalid_utf8_flags_table() {
        let mut table = QTable::new();
        let err = read_table(&b"1;2\n\xff;3\n"[..], &mut table).unwrap_err();
        assert!(matches!(err, Error::TableParse { line: 2, field: 1, .. }));
        assert_eq!(table.status(), TableStatus::Invalid { line: 2, field: 1 });
        assert!(!table.is_valid());
        assert_eq!(table.value(Action::North, StateId::new(0).unwrap()), 1.0);
    }

    #[test]
    fn test_extra_rows_ignored() {
        let mut table = QTable::new();
        let status = from_text("1\n2\n3\n4\n5\n", &mut table).unwrap();
        assert_eq!(status, LoadStatus::Loaded { rows: 4, cells: 4 });
        assert_eq!(table.value(Action::West, StateId::new(0).unwrap()), 4.0);
    }
}
