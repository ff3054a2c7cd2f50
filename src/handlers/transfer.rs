// 🔁 Transfer sheet (转账)
// B source account · C amount · D source currency · E destination account
// G destination currency · H narration

use super::{ExtractContext, RowHandler};
use crate::error::ExtractResult;
use crate::ledger::{Amount, Flag, Posting, Transaction};
use crate::sheet::{Row, SheetKind};

pub struct TransferHandler;

impl RowHandler for TransferHandler {
    fn handle(&self, ctx: &mut ExtractContext<'_>, row: &Row<'_>) -> ExtractResult<Option<Transaction>> {
        let account_out = row.read('B');
        let amount = row.decimal('C')?;
        let currency_out = row.read('D');
        let account_in = row.read('E');
        let currency_in = row.read('G');
        let mut narration = row.read('H');

        if narration.is_empty() {
            narration = format!("转账：{} -> {}", account_out, account_in);
        }

        // Cross-currency transfers need the exchange leg filled in by hand
        let flag = if currency_in == currency_out {
            Flag::Cleared
        } else {
            Flag::NeedsReview
        };

        let mut txn = ctx.transaction(row, flag, narration);
        let currency = ctx.resolver.currency(&currency_out);
        txn.push(Posting::with_amount(
            ctx.resolver.account(&account_in),
            Amount::new(amount, currency),
        ));
        txn.push(Posting::auto(ctx.resolver.account(&account_out)));

        Ok(Some(txn))
    }

    fn kind(&self) -> SheetKind {
        SheetKind::Transfer
    }
}
