// 🤝 Borrow/lend sheet (借入借出)
// B type · C amount · D payee · E account · F narration

use super::{ExtractContext, RowHandler, LEND, LOAN_CURRENCY};
use crate::error::ExtractResult;
use crate::ledger::{Amount, Flag, Posting, Transaction};
use crate::sheet::{Row, SheetKind};

pub struct BorrowLendHandler;

impl RowHandler for BorrowLendHandler {
    fn handle(&self, ctx: &mut ExtractContext<'_>, row: &Row<'_>) -> ExtractResult<Option<Transaction>> {
        let record_type = row.read('B');
        let amount = row.decimal('C')?;
        let payee = row.read('D');
        let account = row.read('E');
        let narration = row.read('F');

        let mut txn = ctx.transaction(row, Flag::Cleared, narration).with_payee(payee);
        let account = ctx.resolver.account(&account);

        if record_type == LEND {
            txn.push(Posting::with_amount(account, Amount::new(-amount, LOAN_CURRENCY)));
            txn.push(Posting::auto(ctx.accounts.credit.clone()));
        } else {
            txn.push(Posting::with_amount(account, Amount::new(amount, LOAN_CURRENCY)));
            txn.push(Posting::auto(ctx.accounts.debt.clone()));
        }

        Ok(Some(txn))
    }

    fn kind(&self) -> SheetKind {
        SheetKind::BorrowLend
    }
}
