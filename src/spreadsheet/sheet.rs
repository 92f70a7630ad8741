use crate::spreadsheet::cell::Cell;

/// Represents a worksheet read from a workbook.
#[derive(Clone, Debug)]
pub struct Sheet {
    /// Source file name
    pub file_name: String,
    /// Sheet name as declared in the workbook
    pub name: String,
    /// Whether serial dates use the 1904 date system
    pub is_1904: bool,
    /// All non-empty cells in the sheet
    pub cells: Vec<Cell>,
    /// Used row range and first used column (determined from cell data)
    pub row_lower_bound: Option<usize>,
    pub row_upper_bound: Option<usize>,
    pub col_lower_bound: Option<usize>,
}

impl Sheet {
    pub fn new(file_name: &str, name: &str, is_1904: bool) -> Self {
        Self {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            is_1904,
            cells: Vec::new(),
            row_lower_bound: None,
            row_upper_bound: None,
            col_lower_bound: None,
        }
    }

    /// Adds a cell to the sheet, updating the data range.
    pub fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.push(cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        if self.row_lower_bound.map(|row_lower_bound| row < row_lower_bound).unwrap_or(true) {
            self.row_lower_bound = Some(row);
        }
        if self.row_upper_bound.map(|row_upper_bound| row_upper_bound < row).unwrap_or(true) {
            self.row_upper_bound = Some(row);
        }
        if self.col_lower_bound.map(|col_lower_bound| col < col_lower_bound).unwrap_or(true) {
            self.col_lower_bound = Some(col);
        }
    }

    /// Lays the cells out as rows, starting at the first used row and column.
    ///
    /// Each row runs from the first used column of the sheet to the last cell
    /// present in that row; gaps are filled with empty string cells. Rows with
    /// no cells at all come back empty. When a position is stored twice the
    /// first cell read wins.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let (Some(row_lower), Some(row_upper), Some(col_lower)) =
            (self.row_lower_bound, self.row_upper_bound, self.col_lower_bound)
        else {
            return Vec::new();
        };

        let mut cells: Vec<&Cell> = self.cells.iter().collect();
        cells.sort_by_key(|cell| (cell.row, cell.col));
        cells.dedup_by_key(|cell| (cell.row, cell.col));

        let mut table: Vec<Vec<Cell>> = vec![Vec::new(); row_upper - row_lower + 1];
        for cell in cells {
            let record = &mut table[cell.row - row_lower];
            while col_lower + record.len() < cell.col {
                record.push(Cell::empty(cell.row, col_lower + record.len()));
            }
            record.push(cell.clone());
        }
        table
    }
}
