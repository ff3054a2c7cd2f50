// 📄 Sheet access + row dispatcher
// Cells are addressed positionally (1-based row, column letter). A sheet is
// read from row 2 until column A stops looking like a timestamp.

use crate::error::{ExtractError, ExtractResult};
use crate::ledger::Transaction;
use calamine::{Data, DataType, Range};
use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::cell::Cell;
use std::str::FromStr;
use std::sync::OnceLock;

// ============================================================================
// SHEET KIND
// ============================================================================

/// The sheets a Wacai export contains, keyed by their (Chinese) names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    Transfer,
    Income,
    Expense,
    ReceiptRepayment,
    BorrowLend,
}

impl SheetKind {
    pub const ALL: [SheetKind; 5] = [
        SheetKind::Transfer,
        SheetKind::Income,
        SheetKind::Expense,
        SheetKind::ReceiptRepayment,
        SheetKind::BorrowLend,
    ];

    /// Sheet name as written in the export
    pub fn sheet_name(&self) -> &'static str {
        match self {
            SheetKind::Transfer => "转账",
            SheetKind::Income => "收入",
            SheetKind::Expense => "支出",
            SheetKind::ReceiptRepayment => "收款还款",
            SheetKind::BorrowLend => "借入借出",
        }
    }

    /// Unrecognized sheets are ignored by the importer
    pub fn from_sheet_name(name: &str) -> Option<SheetKind> {
        SheetKind::ALL.into_iter().find(|k| k.sheet_name() == name)
    }
}

// ============================================================================
// SHEET TRAIT
// ============================================================================

/// Positional read access to one worksheet
pub trait Sheet {
    fn name(&self) -> &str;

    /// Raw text of a cell; empty string for blank or out-of-range cells.
    ///
    /// `row` is 1-based like the spreadsheet UI, `column` is `'A'..='Z'`.
    fn cell_text(&self, row: usize, column: char) -> String;
}

fn column_index(column: char) -> usize {
    (column.to_ascii_uppercase() as u8).saturating_sub(b'A') as usize
}

/// Python-style float rendering: integral values keep a `.0`
fn float_text(f: f64) -> String {
    let s = f.to_string();
    if f.is_finite() && !s.contains('.') && !s.contains('e') {
        format!("{}.0", s)
    } else {
        s
    }
}

/// Text of a calamine cell
pub fn data_text(data: &Data) -> String {
    match data {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        Data::DateTime(_) => match data.as_datetime() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => data.to_string(),
        },
        Data::DateTimeIso(s) => s.replacen('T', " ", 1),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Worksheet loaded through calamine
pub struct WorksheetRange {
    name: String,
    range: Range<Data>,
}

impl WorksheetRange {
    pub fn new(name: impl Into<String>, range: Range<Data>) -> Self {
        WorksheetRange {
            name: name.into(),
            range,
        }
    }
}

impl Sheet for WorksheetRange {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell_text(&self, row: usize, column: char) -> String {
        if row == 0 {
            return String::new();
        }
        let position = ((row - 1) as u32, column_index(column) as u32);
        self.range
            .get_value(position)
            .map(data_text)
            .unwrap_or_default()
    }
}

/// In-memory sheet; `rows[0]` is spreadsheet row 1 (the header).
///
/// Tracks the deepest row read so callers can verify where reading stopped.
pub struct GridSheet {
    name: String,
    rows: Vec<Vec<String>>,
    deepest_row: Cell<usize>,
}

impl GridSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<&str>>) -> Self {
        GridSheet {
            name: name.into(),
            rows: rows
                .into_iter()
                .map(|r| r.into_iter().map(str::to_string).collect())
                .collect(),
            deepest_row: Cell::new(0),
        }
    }

    pub fn deepest_row_read(&self) -> usize {
        self.deepest_row.get()
    }
}

impl Sheet for GridSheet {
    fn name(&self) -> &str {
        &self.name
    }

    fn cell_text(&self, row: usize, column: char) -> String {
        self.deepest_row.set(self.deepest_row.get().max(row));
        row.checked_sub(1)
            .and_then(|r| self.rows.get(r))
            .and_then(|cells| cells.get(column_index(column)))
            .cloned()
            .unwrap_or_default()
    }
}

// ============================================================================
// ROW
// ============================================================================

/// One data row with its timestamp already split
pub struct Row<'s> {
    sheet: &'s dyn Sheet,
    pub number: usize,
    pub date: NaiveDate,
    pub time: String,
}

impl<'s> Row<'s> {
    /// Cell text trimmed, with `¥` spelled `CNY`
    pub fn read(&self, column: char) -> String {
        self.sheet
            .cell_text(self.number, column)
            .trim()
            .replace('¥', "CNY")
    }

    /// Decimal value of a cell; malformed numbers abort extraction
    pub fn decimal(&self, column: char) -> ExtractResult<Decimal> {
        let text = self.read(column);
        parse_decimal(&text).ok_or_else(|| ExtractError::InvalidAmount {
            sheet: self.sheet_name().to_string(),
            row: self.number,
            column,
            value: text,
        })
    }

    pub fn sheet_name(&self) -> &str {
        self.sheet.name()
    }
}

/// Number as Wacai writes it: `,` and spaces are ignored and a blank cell is zero
pub fn parse_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

// ============================================================================
// DISPATCHER
// ============================================================================

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}")
            .expect("timestamp pattern is valid")
    })
}

/// Run `handler` over every data row of `sheet`.
///
/// Starts at row 2 and stops at the first row whose column A does not begin
/// with `YYYY-MM-DD HH:MM:SS`; nothing below that row is read.
pub fn read_rows<F>(sheet: &dyn Sheet, mut handler: F) -> ExtractResult<Vec<Transaction>>
where
    F: FnMut(&Row<'_>) -> ExtractResult<Option<Transaction>>,
{
    let mut entries = Vec::new();

    for number in 2.. {
        let stamp = sheet.cell_text(number, 'A');
        let stamp = stamp.trim();
        if !timestamp_pattern().is_match(stamp) {
            break;
        }

        let date = NaiveDate::parse_from_str(&stamp[0..10], "%Y-%m-%d").map_err(|_| {
            ExtractError::InvalidDate {
                sheet: sheet.name().to_string(),
                row: number,
                value: stamp.to_string(),
            }
        })?;
        let row = Row {
            sheet,
            number,
            date,
            time: stamp[11..19].to_string(),
        };

        if let Some(entry) = handler(&row)? {
            entries.push(entry);
        }
    }

    Ok(entries)
}

// ============================================================================
// TESTS
// ============================================================================
