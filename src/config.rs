// ⚙️ Importer Configuration - Lookup tables as data
// Loaded from JSON; each lookup table is either inline or a two-column CSV file.

use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Label → identifier mapping (Wacai name → Beancount account or currency)
pub type LookupTable = HashMap<String, String>;

// ============================================================================
// FIXED ACCOUNTS
// ============================================================================

/// Accounts the handlers post to without a lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialAccounts {
    /// Borrowing and repayments
    #[serde(default = "default_debt")]
    pub debt: String,

    /// Lending and receipts
    #[serde(default = "default_credit")]
    pub credit: String,

    /// Pending and completed reimbursements
    #[serde(default = "default_reimburse")]
    pub reimburse: String,

    /// Interest paid on repayments
    #[serde(default = "default_interest")]
    pub interest: String,

    /// Unaccounted funds (missed records)
    #[serde(default = "default_ufo")]
    pub ufo: String,
}

fn default_debt() -> String {
    "Liabilities:Payable".to_string()
}

fn default_credit() -> String {
    "Assets:Receivables".to_string()
}

fn default_reimburse() -> String {
    "Assets:Reimburse".to_string()
}

fn default_interest() -> String {
    "Expenses:Interest".to_string()
}

fn default_ufo() -> String {
    "Equity:UFO".to_string()
}

impl Default for SpecialAccounts {
    fn default() -> Self {
        SpecialAccounts {
            debt: default_debt(),
            credit: default_credit(),
            reimburse: default_reimburse(),
            interest: default_interest(),
            ufo: default_ufo(),
        }
    }
}

// ============================================================================
// LOOKUP TABLES
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct LookupTables {
    pub accounts: LookupTable,
    pub income: LookupTable,
    pub expenses: LookupTable,
    pub currencies: LookupTable,
    /// Book/project name → tag, used instead of the pinyin slug
    pub tags: LookupTable,
}

pub fn default_currencies() -> LookupTable {
    let mut currencies = LookupTable::new();
    currencies.insert("人民币".to_string(), "CNY".to_string());
    currencies.insert("美元".to_string(), "USD".to_string());
    currencies
}

impl Default for LookupTables {
    fn default() -> Self {
        LookupTables {
            accounts: LookupTable::new(),
            income: LookupTable::new(),
            expenses: LookupTable::new(),
            currencies: default_currencies(),
            tags: LookupTable::new(),
        }
    }
}

/// How a table is written in the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableSource {
    Inline(LookupTable),
    /// Path to a `label,identifier` CSV file, relative to the config file
    File(PathBuf),
}

impl TableSource {
    fn load(&self, base_dir: &Path) -> Result<LookupTable> {
        match self {
            TableSource::Inline(table) => Ok(table.clone()),
            TableSource::File(path) => load_table_csv(&base_dir.join(path)),
        }
    }
}

/// Read a two-column CSV mapping. Blank labels and `#` comment lines are skipped.
pub fn load_table_csv(path: &Path) -> Result<LookupTable> {
    use csv::ReaderBuilder;

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .from_path(path)
        .with_context(|| format!("Failed to open lookup table: {}", path.display()))?;

    let mut table = LookupTable::new();
    for (line_num, result) in reader.records().enumerate() {
        let record = result.with_context(|| {
            format!("Failed to parse CSV line {} in {}", line_num + 1, path.display())
        })?;

        let label = record.get(0).unwrap_or("").trim();
        let target = record.get(1).unwrap_or("").trim();
        if label.is_empty() {
            continue;
        }
        if target.is_empty() {
            anyhow::bail!(
                "Missing mapping for {:?} on line {} of {}",
                label,
                line_num + 1,
                path.display()
            );
        }
        table.insert(label.to_string(), target.to_string());
    }

    Ok(table)
}

// ============================================================================
// CONFIG FILE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    accounts: Option<TableSource>,
    #[serde(default)]
    income: Option<TableSource>,
    #[serde(default)]
    expenses: Option<TableSource>,
    #[serde(default)]
    currencies: Option<TableSource>,
    #[serde(default)]
    tags: Option<TableSource>,
    #[serde(default)]
    special_accounts: SpecialAccounts,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImporterConfig {
    pub tables: LookupTables,
    pub special_accounts: SpecialAccounts,
}

impl ImporterConfig {
    /// Load config from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&content, base_dir)
    }

    /// Parse config JSON; CSV table paths resolve against `base_dir`
    pub fn from_json(content: &str, base_dir: &Path) -> Result<Self> {
        let file: ConfigFile =
            serde_json::from_str(content).context("Failed to parse config JSON")?;

        let load = |source: &Option<TableSource>, name: &str| -> Result<Option<LookupTable>> {
            source
                .as_ref()
                .map(|s| s.load(base_dir).with_context(|| format!("Failed to load {} table", name)))
                .transpose()
        };

        let mut tables = LookupTables::default();
        if let Some(table) = load(&file.accounts, "accounts")? {
            tables.accounts = table;
        }
        if let Some(table) = load(&file.income, "income")? {
            tables.income = table;
        }
        if let Some(table) = load(&file.expenses, "expenses")? {
            tables.expenses = table;
        }
        if let Some(table) = load(&file.currencies, "currencies")? {
            tables.currencies = table;
        }
        if let Some(table) = load(&file.tags, "tags")? {
            tables.tags = table;
        }

        Ok(ImporterConfig {
            tables,
            special_accounts: file.special_accounts,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ImporterConfig::from_json("{}", Path::new(".")).unwrap();
        assert_eq!(config, ImporterConfig::default());
        assert_eq!(config.special_accounts.ufo, "Equity:UFO");
        assert_eq!(config.tables.currencies.get("美元"), Some(&"USD".to_string()));
    }

    #[test]
    fn test_inline_tables_and_partial_special_accounts() {
        let json = r#"{
            "accounts": {"现金": "Assets:Cash"},
            "expenses": {"早餐": "Expenses:Food:Breakfast"},
            "special_accounts": {"ufo": "Equity:Unaccounted"}
        }"#;
        let config = ImporterConfig::from_json(json, Path::new(".")).unwrap();

        assert_eq!(config.tables.accounts.get("现金"), Some(&"Assets:Cash".to_string()));
        assert_eq!(config.tables.expenses.len(), 1);
        assert!(config.tables.income.is_empty());
        assert_eq!(config.special_accounts.ufo, "Equity:Unaccounted");
        assert_eq!(config.special_accounts.debt, "Liabilities:Payable");
    }

    #[test]
    fn test_csv_table_relative_to_config() {
        let dir = TempDir::new().unwrap();
        let mut csv_file = fs::File::create(dir.path().join("accounts.csv")).unwrap();
        writeln!(csv_file, "# wacai,beancount").unwrap();
        writeln!(csv_file, "现金, Assets:Cash").unwrap();
        writeln!(csv_file, "招商银行,Assets:Bank:CMB").unwrap();
        writeln!(csv_file, ",").unwrap();

        let config_path = dir.path().join("wacai.json");
        fs::write(&config_path, r#"{"accounts": "accounts.csv"}"#).unwrap();

        let config = ImporterConfig::from_file(&config_path).unwrap();
        assert_eq!(config.tables.accounts.len(), 2);
        assert_eq!(config.tables.accounts.get("现金"), Some(&"Assets:Cash".to_string()));
    }

    #[test]
    fn test_csv_row_without_target_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("income.csv");
        fs::write(&path, "工资,Income:Salary\n奖金\n").unwrap();

        assert!(load_table_csv(&path).is_err());
    }

    #[test]
    fn test_tag_overrides() {
        let json = r#"{"tags": {"长沙": "chang2-sha1"}}"#;
        let config = ImporterConfig::from_json(json, Path::new(".")).unwrap();
        assert_eq!(config.tables.tags.get("长沙"), Some(&"chang2-sha1".to_string()));
        assert!(ImporterConfig::default().tables.tags.is_empty());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(ImporterConfig::from_file("/nonexistent/wacai.json").is_err());
    }
}
