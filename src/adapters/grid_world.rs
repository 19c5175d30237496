//! Rectangular grid world parsed from a text map.
//!
//! Map syntax: `#` is a wall, `.` is floor. `L` and `P` mark start cells
//! in hand-drawn maps and are read as floor. The first text line is the
//! northern (top) row, so a map reads the way it is drawn.

use std::{fs, path::Path};

use rand::{Rng, RngCore};

use crate::{Error, Result, ports::World, types::Cell};

/// Grid world backed by a walkability bitmap.
///
/// # Examples
///
/// ```
/// use evader::{adapters::GridWorld, ports::World, types::Cell};
///
/// let world = GridWorld::parse("#..\n...\n..#")?;
/// assert_eq!(world.bounds(), (3, 3));
/// assert!(!world.is_walkable(Cell::new(0, 2)));
/// assert!(!world.is_walkable(Cell::new(2, 0)));
/// # Ok::<(), evader::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    width: i32,
    height: i32,
    walkable: Vec<bool>,
    open_cells: Vec<Cell>,
}

impl GridWorld {
    /// An open arena without interior walls.
    pub fn open(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self::from_bitmap(width, height, vec![true; (width * height) as usize])
    }

    /// Parse a text map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMap`] for unknown characters, ragged rows or
    /// an empty map.
    pub fn parse(text: &str) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(Error::InvalidMap {
                line: 1,
                message: "map has no rows".to_string(),
            });
        };
        let width = first.chars().count();
        let height = rows.len();

        let mut walkable = vec![false; width * height];
        for (row_idx, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(Error::InvalidMap {
                    line: row_idx + 1,
                    message: format!(
                        "expected {width} columns, found {}",
                        row.chars().count()
                    ),
                });
            }
            let y = height - 1 - row_idx;
            for (x, ch) in row.chars().enumerate() {
                walkable[y * width + x] = match ch {
                    '.' | 'L' | 'P' => true,
                    '#' => false,
                    other => {
                        return Err(Error::InvalidMap {
                            line: row_idx + 1,
                            message: format!("unknown map character '{other}'"),
                        });
                    }
                };
            }
        }

        Ok(Self::from_bitmap(width as i32, height as i32, walkable))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            operation: format!("read map {}", path.display()),
            source,
        })?;
        Self::parse(&text)
    }

    /// Mark a cell as wall. Cells outside the grid are ignored.
    pub fn with_wall(mut self, cell: Cell) -> Self {
        if let Some(index) = self.index(cell) {
            self.walkable[index] = false;
            self.open_cells.retain(|open| *open != cell);
        }
        self
    }

    pub fn open_cells(&self) -> &[Cell] {
        &self.open_cells
    }

    /// Render the map back to text, top row first
    pub fn render(&self) -> String {
        let mut out = String::new();
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                out.push(if self.is_walkable(Cell::new(x, y)) { '.' } else { '#' });
            }
            out.push('\n');
        }
        out
    }

    fn from_bitmap(width: i32, height: i32, walkable: Vec<bool>) -> Self {
        let open_cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| Cell::new(x, y)))
            .filter(|cell| walkable[(cell.y * width + cell.x) as usize])
            .collect();
        Self {
            width,
            height,
            walkable,
            open_cells,
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.in_bounds(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }
}

impl World for GridWorld {
    fn bounds(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    fn is_walkable(&self, cell: Cell) -> bool {
        self.index(cell).is_some_and(|index| self.walkable[index])
    }

    fn random_walkable_cell(&self, rng: &mut dyn RngCore) -> Option<Cell> {
        if self.open_cells.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.open_cells.len());
        Some(self.open_cells[index])
    }
}
