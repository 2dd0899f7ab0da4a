//! A sparse, bi-infinite tape.
//!
//! Cells are stored in an ordered map keyed by signed position. A cell that holds the blank
//! symbol has no entry, so memory use tracks the number of non-blank cells rather than the
//! range of positions the head has visited.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, char>,
    blank: char,
}

impl Tape {
    /// Creates an empty tape where every cell reads as `blank`.
    pub fn new(blank: char) -> Self {
        Self {
            cells: BTreeMap::new(),
            blank,
        }
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the symbol at `pos`, or the blank symbol if the cell was never written.
    pub fn read(&self, pos: i64) -> char {
        self.cells.get(&pos).copied().unwrap_or(self.blank)
    }

    /// Writes `symbol` at `pos`. Writing the blank symbol removes the cell.
    pub fn write(&mut self, pos: i64, symbol: char) {
        if symbol == self.blank {
            self.cells.remove(&pos);
        } else {
            self.cells.insert(pos, symbol);
        }
    }

    /// Number of cells holding a non-blank symbol.
    pub fn occupied_size(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Clears the tape and writes `input` left to right starting at position 0.
    pub fn load(&mut self, input: &str) {
        self.clear();
        for (pos, symbol) in (0..).zip(input.chars()) {
            self.write(pos, symbol);
        }
    }

    /// The leftmost and rightmost non-blank positions, or `None` for an empty tape.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        let first = self.cells.keys().next()?;
        let last = self.cells.keys().next_back()?;
        Some((*first, *last))
    }

    /// Renders the cells from `from` to `to` inclusive.
    pub fn window(&self, from: i64, to: i64) -> String {
        (from..=to).map(|pos| self.read(pos)).collect()
    }

    /// Iterates over the non-blank cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = (i64, char)> + '_ {
        self.cells.iter().map(|(&pos, &symbol)| (pos, symbol))
    }
}

impl Default for Tape {
    fn default() -> Self {
        Self::new(crate::types::DEFAULT_BLANK_SYMBOL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwritten_cells_read_blank() {
        let tape = Tape::new('_');

        assert_eq!(tape.read(0), '_');
        assert_eq!(tape.read(-1_000_000), '_');
        assert_eq!(tape.read(i64::MAX), '_');
        assert_eq!(tape.occupied_size(), 0);
    }

    #[test]
    fn test_write_and_read_negative_positions() {
        let mut tape = Tape::new('_');
        tape.write(-3, 'a');
        tape.write(2, 'b');

        assert_eq!(tape.read(-3), 'a');
        assert_eq!(tape.read(2), 'b');
        assert_eq!(tape.bounds(), Some((-3, 2)));
        assert_eq!(tape.window(-3, 2), "a____b");
    }

    #[test]
    fn test_writing_blank_removes_cell() {
        let mut tape = Tape::new('_');
        tape.write(5, 'x');
        assert_eq!(tape.occupied_size(), 1);

        tape.write(5, '_');
        assert_eq!(tape.occupied_size(), 0);
        assert_eq!(tape.read(5), '_');
        assert_eq!(tape.bounds(), None);
    }

    #[test]
    fn test_occupied_size_counts_distinct_cells() {
        let mut tape = Tape::new('_');
        tape.write(0, 'a');
        tape.write(0, 'b');
        tape.write(10_000, 'c');
        tape.write(-10_000, 'd');

        assert_eq!(tape.occupied_size(), 3);
    }

    #[test]
    fn test_load_replaces_content() {
        let mut tape = Tape::new('_');
        tape.write(-1, 'z');
        tape.load("ab");

        assert_eq!(tape.cells().collect::<Vec<_>>(), vec![(0, 'a'), (1, 'b')]);
    }
}
