use super::FeedingRow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrTextResult {
    pub text: String,
}

/// Rows recovered from a feeding-guidelines table. Empty means no table was
/// found, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrTableResult {
    pub rows: Vec<FeedingRow>,
}

impl OcrTableResult {
    /// Recovers rows from a plain text block, one row per line.
    ///
    /// Columns are separated by a tab, a `|`, or two or more spaces. Lines with
    /// fewer than two columns are dropped, as is a header line whose first cell
    /// mentions "weight" without any digits. Columns past the second are joined
    /// into `notes`.
    pub fn from_text(text: &str) -> Self {
        let rows = text
            .lines()
            .filter_map(|line| {
                let cells = split_columns(line);
                if cells.len() < 2 || is_header_cell(cells[0]) {
                    return None;
                }
                Some(FeedingRow::new(cells[0], cells[1], cells[2..].join(" ")))
            })
            .collect::<Vec<_>>();

        log::debug!("[OCR] Recovered {} feeding rows from text", rows.len());

        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn split_columns(line: &str) -> Vec<&str> {
    let pieces: Vec<&str> = if line.contains('\t') {
        line.split('\t').collect()
    } else if line.contains('|') {
        line.split('|').collect()
    } else {
        line.split("  ").collect()
    };

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect()
}

fn is_header_cell(cell: &str) -> bool {
    cell.to_ascii_lowercase().contains("weight") && !cell.chars().any(|c| c.is_ascii_digit())
}
