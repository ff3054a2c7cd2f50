// 📒 Ledger Model - Beancount transactions
// Transactions, postings and amounts produced by the importer, plus the
// Beancount text rendering consumed by the reporting toolchain.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{self, Write};

/// Key/value metadata attached to a transaction or posting
pub type Meta = BTreeMap<String, String>;

// ============================================================================
// AMOUNT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    pub number: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Amount {
            number,
            currency: currency.into(),
        }
    }

    pub fn negated(&self) -> Amount {
        Amount::new(-self.number, self.currency.clone())
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

// ============================================================================
// FLAG
// ============================================================================

/// Transaction status flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Flag {
    /// `*` - complete, nothing to check
    Cleared,
    /// `!` - needs manual review (e.g. cross-currency transfer)
    NeedsReview,
}

impl Flag {
    pub fn as_char(&self) -> char {
        match self {
            Flag::Cleared => '*',
            Flag::NeedsReview => '!',
        }
    }
}

// ============================================================================
// POSTING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub account: String,

    /// `None` means "balance the rest of the transaction"
    pub units: Option<Amount>,

    pub meta: Meta,
}

impl Posting {
    /// Posting with an explicit amount
    pub fn with_amount(account: impl Into<String>, units: Amount) -> Self {
        Posting {
            account: account.into(),
            units: Some(units),
            meta: Meta::new(),
        }
    }

    /// Auto-balancing posting (amount inferred)
    pub fn auto(account: impl Into<String>) -> Self {
        Posting {
            account: account.into(),
            units: None,
            meta: Meta::new(),
        }
    }

    /// Builder pattern: add a metadata entry
    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.meta.insert(key.to_string(), value.into());
        self
    }

    pub fn is_auto(&self) -> bool {
        self.units.is_none()
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// Where a transaction came from (file + spreadsheet row)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub filename: String,
    pub lineno: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub source: Source,
    pub meta: Meta,
    pub date: NaiveDate,
    pub flag: Flag,
    pub payee: Option<String>,
    pub narration: String,
    pub tags: BTreeSet<String>,
    pub links: BTreeSet<String>,
    pub postings: Vec<Posting>,
}

impl Transaction {
    pub fn new(source: Source, date: NaiveDate, flag: Flag, narration: impl Into<String>) -> Self {
        Transaction {
            source,
            meta: Meta::new(),
            date,
            flag,
            payee: None,
            narration: narration.into(),
            tags: BTreeSet::new(),
            links: BTreeSet::new(),
            postings: Vec::new(),
        }
    }

    /// Builder pattern: set the payee, dropping empty strings
    pub fn with_payee(mut self, payee: impl Into<String>) -> Self {
        let payee = payee.into();
        self.payee = if payee.is_empty() { None } else { Some(payee) };
        self
    }

    pub fn push(&mut self, posting: Posting) {
        self.postings.push(posting);
    }

    /// Sum of the explicit posting amounts, per currency
    pub fn residual(&self) -> BTreeMap<String, Decimal> {
        let mut sums: BTreeMap<String, Decimal> = BTreeMap::new();
        for units in self.postings.iter().filter_map(|p| p.units.as_ref()) {
            *sums.entry(units.currency.clone()).or_default() += units.number;
        }
        sums
    }

    /// Amounts the auto-balancing posting would receive.
    ///
    /// Returns `None` when there is no auto posting or more than one.
    pub fn inferred_amounts(&self) -> Option<Vec<Amount>> {
        if self.postings.iter().filter(|p| p.is_auto()).count() != 1 {
            return None;
        }
        Some(
            self.residual()
                .into_iter()
                .filter(|(_, number)| !number.is_zero())
                .map(|(currency, number)| Amount::new(-number, currency))
                .collect(),
        )
    }

    /// True when the postings net to zero once the auto posting is inferred
    pub fn is_balanced(&self) -> bool {
        match self.postings.iter().filter(|p| p.is_auto()).count() {
            0 => self.residual().values().all(|n| n.is_zero()),
            1 => true,
            _ => false,
        }
    }
}

// ============================================================================
// BEANCOUNT RENDERING
// ============================================================================

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date.format("%Y-%m-%d"), self.flag.as_char())?;
        if let Some(payee) = &self.payee {
            write!(f, " {}", quote(payee))?;
        }
        write!(f, " {}", quote(&self.narration))?;
        for tag in &self.tags {
            write!(f, " #{}", tag)?;
        }
        for link in &self.links {
            write!(f, " ^{}", link)?;
        }
        writeln!(f)?;

        for (key, value) in &self.meta {
            writeln!(f, "  {}: {}", key, quote(value))?;
        }

        for posting in &self.postings {
            match &posting.units {
                Some(units) => writeln!(f, "  {}  {}", posting.account, units)?,
                None => writeln!(f, "  {}", posting.account)?,
            }
            for (key, value) in &posting.meta {
                writeln!(f, "    {}: {}", key, quote(value))?;
            }
        }
        Ok(())
    }
}

/// Write entries as Beancount text, one blank line between entries
pub fn print_entries<W: Write>(out: &mut W, entries: &[Transaction]) -> io::Result<()> {
    for entry in entries {
        writeln!(out, "{}", entry)?;
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
