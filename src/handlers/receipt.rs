// 🏦 Receipt/repayment sheet (收款还款)
// B type · C payee · D account · E amount · F interest · G narration

use super::{ExtractContext, RowHandler, LOAN_CURRENCY, REPAYMENT};
use crate::error::ExtractResult;
use crate::ledger::{Amount, Flag, Posting, Transaction};
use crate::sheet::{Row, SheetKind};

pub struct ReceiptRepaymentHandler;

impl RowHandler for ReceiptRepaymentHandler {
    fn handle(&self, ctx: &mut ExtractContext<'_>, row: &Row<'_>) -> ExtractResult<Option<Transaction>> {
        let record_type = row.read('B');
        let payee = row.read('C');
        let account = row.read('D');
        let amount = row.decimal('E')?;
        let mut narration = row.read('G');

        if narration.is_empty() {
            narration = record_type.clone();
        }

        let mut txn = ctx.transaction(row, Flag::Cleared, narration).with_payee(payee);
        let account = ctx.resolver.account(&account);

        if record_type == REPAYMENT {
            // A blank interest cell reads as zero
            let interest = row.decimal('F')?;

            txn.push(Posting::with_amount(account, Amount::new(-amount, LOAN_CURRENCY)));
            if !interest.is_zero() {
                txn.push(Posting::with_amount(
                    ctx.accounts.interest.clone(),
                    Amount::new(interest, LOAN_CURRENCY),
                ));
            }
            txn.push(Posting::auto(ctx.accounts.debt.clone()));
        } else {
            txn.push(Posting::with_amount(account, Amount::new(amount, LOAN_CURRENCY)));
            txn.push(Posting::auto(ctx.accounts.credit.clone()));
        }

        Ok(Some(txn))
    }

    fn kind(&self) -> SheetKind {
        SheetKind::ReceiptRepayment
    }
}
