// Packed cell set for O(1) board membership tests
//
// Cells are keyed by `y * width + x` into a bitset sized to the board, so memory is bounded
// by the board area and membership never hashes.

use crate::types::{Board, Coord};

const WORD_BITS: usize = 64;

/// Fixed-size set of board cells
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSet {
    width: i32,
    height: i32,
    words: Vec<u64>,
}

impl CellSet {
    /// Creates an empty set covering a `width` x `height` board
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = width as usize * height as usize;
        CellSet {
            width,
            height,
            words: vec![0; cells.div_ceil(WORD_BITS)],
        }
    }

    /// Creates an empty set sized to the board
    pub fn for_board(board: &Board) -> Self {
        Self::new(board.width, board.height)
    }

    /// Packed key for an in-bounds coordinate
    pub fn index(&self, coord: Coord) -> Option<usize> {
        if coord.x < 0 || coord.x >= self.width || coord.y < 0 || coord.y >= self.height {
            return None;
        }
        Some(coord.y as usize * self.width as usize + coord.x as usize)
    }

    /// Adds a cell. Returns true if it was not present. Out-of-bounds cells are ignored.
    pub fn insert(&mut self, coord: Coord) -> bool {
        match self.index(coord) {
            Some(idx) => {
                let (word, mask) = (idx / WORD_BITS, 1u64 << (idx % WORD_BITS));
                let fresh = self.words[word] & mask == 0;
                self.words[word] |= mask;
                fresh
            }
            None => false,
        }
    }

    pub fn remove(&mut self, coord: Coord) {
        if let Some(idx) = self.index(coord) {
            self.words[idx / WORD_BITS] &= !(1u64 << (idx % WORD_BITS));
        }
    }

    /// Out-of-bounds cells are never members
    pub fn contains(&self, coord: Coord) -> bool {
        self.index(coord)
            .map(|idx| self.words[idx / WORD_BITS] & (1u64 << (idx % WORD_BITS)) != 0)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of cells the set can address
    pub fn capacity(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl Extend<Coord> for CellSet {
    fn extend<T: IntoIterator<Item = Coord>>(&mut self, iter: T) {
        for coord in iter {
            self.insert(coord);
        }
    }
}
