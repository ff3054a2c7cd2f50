// 🔎 Account/category resolution
// Exact-match lookups that never fail: a miss becomes a namespaced placeholder
// and is remembered for the end-of-run report.

use crate::config::{LookupTable, LookupTables};
use crate::translit;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Placeholder identifiers synthesized for unmapped labels
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub unknown_accounts: BTreeSet<String>,
    pub unknown_income: BTreeSet<String>,
    pub unknown_expenses: BTreeSet<String>,
    pub unknown_currencies: BTreeSet<String>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn total(&self) -> usize {
        self.unknown_accounts.len()
            + self.unknown_income.len()
            + self.unknown_expenses.len()
            + self.unknown_currencies.len()
    }

    fn sections(&self) -> [(&'static str, &BTreeSet<String>); 4] {
        [
            ("Unknown accounts", &self.unknown_accounts),
            ("Unknown income", &self.unknown_income),
            ("Unknown expenses", &self.unknown_expenses),
            ("Unknown currencies", &self.unknown_currencies),
        ]
    }
}

/// Human-readable report, one section per non-empty set
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (title, labels) in self.sections() {
            if labels.is_empty() {
                continue;
            }
            writeln!(f, "{}:", title)?;
            for label in labels {
                writeln!(f, "  {}", label)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct Resolver {
    tables: LookupTables,
    diagnostics: Diagnostics,
}

fn lookup(
    table: &LookupTable,
    label: &str,
    fallback: impl FnOnce(&str) -> String,
    unknown: &mut BTreeSet<String>,
) -> String {
    match table.get(label) {
        Some(found) if !found.is_empty() => found.trim().to_string(),
        _ => {
            let placeholder = fallback(label.trim());
            if unknown.insert(placeholder.clone()) {
                debug!(label, placeholder = %placeholder, "unmapped label");
            }
            placeholder
        }
    }
}

impl Resolver {
    pub fn new(tables: LookupTables) -> Self {
        Resolver {
            tables,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Wacai account → asset/liability account
    pub fn account(&mut self, label: &str) -> String {
        lookup(
            &self.tables.accounts,
            label,
            |l| format!("Assets:Unknown:{}", l),
            &mut self.diagnostics.unknown_accounts,
        )
    }

    /// Wacai currency name → commodity
    pub fn currency(&mut self, label: &str) -> String {
        lookup(
            &self.tables.currencies,
            label,
            |l| format!("UNKNOWN.{}", l),
            &mut self.diagnostics.unknown_currencies,
        )
    }

    /// Income category → income account
    pub fn income(&mut self, label: &str) -> String {
        lookup(
            &self.tables.income,
            label,
            |l| format!("Income:Unknown:{}", l),
            &mut self.diagnostics.unknown_income,
        )
    }

    /// Expense subcategory → expense account
    pub fn expense(&mut self, label: &str) -> String {
        lookup(
            &self.tables.expenses,
            label,
            |l| format!("Expenses:Unknown:{}", l),
            &mut self.diagnostics.unknown_expenses,
        )
    }

    /// Tag for a book or project name: the configured override if any, else
    /// the pinyin slug. `None` when nothing tag-safe is left.
    pub fn tag(&self, label: &str) -> Option<String> {
        let tag = match self.tables.tags.get(label) {
            Some(custom) if !custom.trim().is_empty() => translit::tag_safe(custom.trim()),
            _ => translit::slug(label),
        };
        if tag.is_empty() {
            None
        } else {
            Some(tag)
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

// ============================================================================
// TESTS
// ============================================================================
