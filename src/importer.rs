// 📥 Wacai Importer
// Claims `wacai_<book>账本_<from>_<to>.xlsx` files and turns every recognized
// sheet into Beancount transactions.

use crate::config::{ImporterConfig, SpecialAccounts};
use crate::error::{ExtractError, ExtractResult};
use crate::handlers::{get_handler, ExtractContext, DAILY};
use crate::ledger::Transaction;
use crate::resolver::{Diagnostics, Resolver};
use crate::sheet::{read_rows, Sheet, SheetKind, WorksheetRange};
use calamine::{open_workbook, Reader, Xlsx, XlsxError};
use regex::Regex;
use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

fn file_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^wacai_(\w+)账本_[0-9]+_[0-9]+\.xlsx$").expect("file name pattern is valid")
    })
}

/// Book name encoded in an export file name, e.g. `日常` for `wacai_日常账本_…`
pub fn book_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name_pattern()
        .captures(file_name)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Tag for a book; the daily book gets none
pub fn book_tag(resolver: &Resolver, book: &str) -> Option<String> {
    if book == DAILY {
        None
    } else {
        resolver.tag(book)
    }
}

pub struct WacaiImporter {
    accounts: SpecialAccounts,
    resolver: Resolver,
}

impl WacaiImporter {
    pub fn new(config: ImporterConfig) -> Self {
        WacaiImporter {
            accounts: config.special_accounts,
            resolver: Resolver::new(config.tables),
        }
    }

    pub fn name(&self) -> &'static str {
        "wacai"
    }

    /// Whether this importer owns the file (by name only)
    pub fn identify(&self, path: &Path) -> bool {
        book_name(path).is_some()
    }

    /// Read the workbook at `path` and map every recognized sheet
    pub fn extract(&mut self, path: &Path) -> ExtractResult<Vec<Transaction>> {
        let filename = path.display().to_string();
        let book = book_name(path).ok_or_else(|| ExtractError::UnrecognizedFile(filename.clone()))?;
        let tag = book_tag(&self.resolver, &book);

        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: XlsxError| ExtractError::Workbook {
            path: filename.clone(),
            message: e.to_string(),
        })?;

        let mut sheets = Vec::new();
        for name in workbook.sheet_names() {
            if SheetKind::from_sheet_name(&name).is_none() {
                debug!(sheet = %name, "ignoring sheet");
                continue;
            }
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| ExtractError::SheetRead {
                    sheet: name.clone(),
                    message: e.to_string(),
                })?;
            sheets.push(WorksheetRange::new(name, range));
        }

        let sheets: Vec<&dyn Sheet> = sheets.iter().map(|s| s as &dyn Sheet).collect();
        let entries = self.extract_sheets(&filename, tag.as_deref(), &sheets)?;
        info!(file = %filename, book = %book, entries = entries.len(), "extracted");
        Ok(entries)
    }

    /// Map already-loaded sheets, in order. Unrecognized sheet names are skipped.
    pub fn extract_sheets(
        &mut self,
        filename: &str,
        book_tag: Option<&str>,
        sheets: &[&dyn Sheet],
    ) -> ExtractResult<Vec<Transaction>> {
        let mut entries = Vec::new();

        for sheet in sheets {
            let Some(kind) = SheetKind::from_sheet_name(sheet.name()) else {
                continue;
            };
            let handler = get_handler(kind);
            let mut ctx = ExtractContext {
                resolver: &mut self.resolver,
                accounts: &self.accounts,
                filename,
                book_tag,
            };

            let sheet_entries = read_rows(*sheet, |row| handler.handle(&mut ctx, row))?;
            debug!(sheet = sheet.name(), entries = sheet_entries.len(), "sheet done");
            entries.extend(sheet_entries);
        }

        let diagnostics = self.resolver.diagnostics();
        if !diagnostics.is_empty() {
            warn!(unmapped = diagnostics.total(), "some labels have no mapping");
        }

        Ok(entries)
    }

    /// Unmapped labels seen so far by this importer
    pub fn diagnostics(&self) -> &Diagnostics {
        self.resolver.diagnostics()
    }

    /// End-of-run report for fixing the lookup tables
    pub fn write_diagnostics<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let diagnostics = self.diagnostics();
        if diagnostics.is_empty() {
            return Ok(());
        }
        write!(out, "{}", diagnostics)
    }
}

// ============================================================================
// TESTS
// ============================================================================
