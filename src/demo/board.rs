use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const SIZE: usize = 9;
pub const CELLS: usize = SIZE * SIZE;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BoardError {
    #[error("Expected 81 cells, found {0}")]
    WrongLength(usize),

    #[error("Invalid character {0:?} in puzzle")]
    InvalidCell(char),

    #[error("Given {digit} at row {row}, column {col} conflicts with another given")]
    ConflictingGiven { row: usize, col: usize, digit: u8 },
}

/// A 9x9 sudoku grid; `0` marks an empty cell
#[derive(Clone, PartialEq, Eq)]
pub struct SudokuBoard {
    cells: [u8; CELLS],
}

impl SudokuBoard {
    pub fn empty() -> Self {
        Self { cells: [0; CELLS] }
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * SIZE + col]
    }

    pub fn first_empty(&self) -> Option<usize> {
        self.cells.iter().position(|&c| c == 0)
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    pub fn is_solved(&self) -> bool {
        self.first_empty().is_none()
            && (0..CELLS).all(|idx| self.fits(idx, self.cells[idx]))
    }

    /// Whether `digit` at `idx` clashes with nothing in its row, column or box
    fn fits(&self, idx: usize, digit: u8) -> bool {
        let (row, col) = (idx / SIZE, idx % SIZE);
        let (box_row, box_col) = (row / 3 * 3, col / 3 * 3);

        (0..SIZE).all(|i| {
            let in_row = row * SIZE + i;
            let in_col = i * SIZE + col;
            let in_box = (box_row + i / 3) * SIZE + box_col + i % 3;
            [in_row, in_col, in_box]
                .iter()
                .all(|&other| other == idx || self.cells[other] != digit)
        })
    }

    /// Place `digit` in an empty cell if no rule is broken
    pub fn try_place(&mut self, idx: usize, digit: u8) -> bool {
        if self.cells[idx] != 0 || !(1..=9).contains(&digit) || !self.fits(idx, digit) {
            return false;
        }
        self.cells[idx] = digit;
        true
    }

    pub fn clear(&mut self, idx: usize) {
        self.cells[idx] = 0;
    }
}

impl Default for SudokuBoard {
    fn default() -> Self {
        Self::empty()
    }
}

/// Parses 81 cells in row-major order. Digits are givens, `0` or `.` are empty,
/// whitespace is ignored.
impl FromStr for SudokuBoard {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = Vec::with_capacity(CELLS);
        for ch in s.chars().filter(|c| !c.is_whitespace()) {
            let digit = match ch {
                '.' => 0,
                '0'..='9' => ch as u8 - b'0',
                other => return Err(BoardError::InvalidCell(other)),
            };
            cells.push(digit);
        }

        let cells: [u8; CELLS] = cells
            .try_into()
            .map_err(|cells: Vec<u8>| BoardError::WrongLength(cells.len()))?;
        let board = Self { cells };

        for (idx, &digit) in board.cells.iter().enumerate() {
            if digit != 0 && !board.fits(idx, digit) {
                return Err(BoardError::ConflictingGiven {
                    row: idx / SIZE,
                    col: idx % SIZE,
                    digit,
                });
            }
        }

        Ok(board)
    }
}

impl fmt::Display for SudokuBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIZE {
            if row > 0 && row % 3 == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for col in 0..SIZE {
                if col > 0 && col % 3 == 0 {
                    write!(f, "| ")?;
                }
                match self.get(row, col) {
                    0 => write!(f, ". ")?,
                    d => write!(f, "{} ", d)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SudokuBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SudokuBoard({} filled)", self.filled_cells())
    }
}
