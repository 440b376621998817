/// Rows of string cells reconstructed from one region of page text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Minimum consecutive table-like lines before a region counts as a
/// table. A lone line with wide gaps is usually a heading.
const MIN_TABLE_ROWS: usize = 2;

/// Reconstructs tables from extracted page text. The extraction
/// library hands back plain text with column gaps preserved as runs
/// of spaces (or tabs); a table is a run of consecutive lines that
/// each split into two or more cells.
pub fn parse_tables(text: &str) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut current = RawTable::default();

    for line in text.lines() {
        let cells = split_cells(line);
        if cells.len() >= 2 {
            current.rows.push(cells);
        } else {
            flush_table(&mut tables, &mut current);
        }
    }
    flush_table(&mut tables, &mut current);

    tables
}

fn flush_table(tables: &mut Vec<RawTable>, current: &mut RawTable) {
    if current.rows.len() >= MIN_TABLE_ROWS {
        tables.push(std::mem::take(current));
    } else {
        current.rows.clear();
    }
}

/// Splits a text line into cells on tabs, or on runs of two or more
/// spaces when no tabs are present. Single spaces stay inside a cell
/// so multi-word titles survive.
pub fn split_cells(line: &str) -> Vec<String> {
    if line.contains('\t') {
        return line
            .split('\t')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut space_run = 0usize;

    for c in line.chars() {
        if c == ' ' {
            space_run += 1;
            continue;
        }
        if space_run >= 2 && !cell.is_empty() {
            cells.push(std::mem::take(&mut cell));
        } else if space_run == 1 && !cell.is_empty() {
            cell.push(' ');
        }
        space_run = 0;
        cell.push(c);
    }
    if !cell.is_empty() {
        cells.push(cell);
    }

    cells.into_iter().map(|c| c.trim().to_string()).collect()
}
