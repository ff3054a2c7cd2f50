// 🧩 Sheet Handlers
// One stateless row → transaction mapping per sheet kind.
//
// Handlers share nothing but the ExtractContext they are given: the resolver
// (whose diagnostic sets collect unmapped labels), the fixed accounts, and the
// per-file book tag.

pub mod borrow_lend;
pub mod expense;
pub mod income;
pub mod receipt;
pub mod transfer;

pub use borrow_lend::BorrowLendHandler;
pub use expense::ExpenseHandler;
pub use income::IncomeHandler;
pub use receipt::ReceiptRepaymentHandler;
pub use transfer::TransferHandler;

use crate::config::SpecialAccounts;
use crate::error::ExtractResult;
use crate::ledger::{Flag, Source, Transaction};
use crate::resolver::Resolver;
use crate::sheet::{Row, SheetKind};

// ============================================================================
// WACAI LABELS
// ============================================================================

/// Project / book meaning "no particular project"
pub const DAILY: &str = "日常";
/// Expense awaiting reimbursement
pub const PENDING_REIMBURSE: &str = "待报销";
/// Expense already reimbursed
pub const REIMBURSED: &str = "已报销";
/// Income category for reimbursement money
pub const REIMBURSEMENT_INCOME: &str = "报销款";
/// Category for money that was never recorded
pub const MISSED_RECORD: &str = "漏记款";
/// The member standing for the ledger owner
pub const SELF_MEMBER: &str = "自己";
pub const REPAYMENT: &str = "还款";
pub const LEND: &str = "借出";

pub const TAG_PENDING: &str = "Pending";
pub const LINK_REIMBURSE: &str = "Reimburse";

/// Loan sheets carry no currency column
pub const LOAN_CURRENCY: &str = "CNY";

// ============================================================================
// CONTEXT
// ============================================================================

/// Everything a handler may touch while mapping a row
pub struct ExtractContext<'a> {
    pub resolver: &'a mut Resolver,
    pub accounts: &'a SpecialAccounts,
    pub filename: &'a str,
    /// Pinyin tag of a non-daily book, added to every transaction
    pub book_tag: Option<&'a str>,
}

impl<'a> ExtractContext<'a> {
    /// Transaction skeleton for `row`: source, time metadata and the book tag
    pub fn transaction(&self, row: &Row<'_>, flag: Flag, narration: impl Into<String>) -> Transaction {
        let source = Source {
            filename: self.filename.to_string(),
            lineno: row.number,
        };
        let mut txn = Transaction::new(source, row.date, flag, narration);
        txn.meta.insert("time".to_string(), row.time.clone());
        if let Some(tag) = self.book_tag {
            txn.tags.insert(tag.to_string());
        }
        txn
    }
}

/// Project tag, if the project is anything but daily
pub fn project_tag(resolver: &Resolver, project: &str) -> Option<String> {
    if project == DAILY || project.is_empty() {
        None
    } else {
        resolver.tag(project)
    }
}

// ============================================================================
// HANDLER TRAIT
// ============================================================================

pub trait RowHandler {
    /// Map one row to a transaction; `None` skips the row
    fn handle(&self, ctx: &mut ExtractContext<'_>, row: &Row<'_>) -> ExtractResult<Option<Transaction>>;

    fn kind(&self) -> SheetKind;
}

/// Handler for a sheet kind
pub fn get_handler(kind: SheetKind) -> Box<dyn RowHandler> {
    match kind {
        SheetKind::Transfer => Box::new(TransferHandler),
        SheetKind::Income => Box::new(IncomeHandler),
        SheetKind::Expense => Box::new(ExpenseHandler),
        SheetKind::ReceiptRepayment => Box::new(ReceiptRepaymentHandler),
        SheetKind::BorrowLend => Box::new(BorrowLendHandler),
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================
