// 💰 Income sheet (收入)
// B category · C amount · D currency · E account · F project · G payer · I narration

use super::{project_tag, ExtractContext, RowHandler, LINK_REIMBURSE, MISSED_RECORD, REIMBURSEMENT_INCOME};
use crate::error::ExtractResult;
use crate::ledger::{Amount, Flag, Posting, Transaction};
use crate::sheet::{Row, SheetKind};

pub struct IncomeHandler;

impl RowHandler for IncomeHandler {
    fn handle(&self, ctx: &mut ExtractContext<'_>, row: &Row<'_>) -> ExtractResult<Option<Transaction>> {
        let category = row.read('B');
        let amount = row.decimal('C')?;
        let currency = row.read('D');
        let account = row.read('E');
        let project = row.read('F');
        let payer = row.read('G');
        let narration = row.read('I');

        let mut txn = ctx.transaction(row, Flag::Cleared, narration).with_payee(payer);
        if let Some(tag) = project_tag(ctx.resolver, &project) {
            txn.tags.insert(tag);
        }

        let account_income = match category.as_str() {
            REIMBURSEMENT_INCOME => {
                txn.links.insert(LINK_REIMBURSE.to_string());
                ctx.accounts.reimburse.clone()
            }
            MISSED_RECORD => ctx.accounts.ufo.clone(),
            _ => ctx.resolver.income(&category),
        };

        let currency = ctx.resolver.currency(&currency);
        txn.push(Posting::with_amount(
            ctx.resolver.account(&account),
            Amount::new(amount, currency),
        ));
        txn.push(Posting::auto(account_income));

        Ok(Some(txn))
    }

    fn kind(&self) -> SheetKind {
        SheetKind::Income
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{dec, resolver, run, run_one};
    use crate::ledger::Amount;
    use crate::sheet::SheetKind;

    #[test]
    fn test_salary() {
        let txn = run_one(
            SheetKind::Income,
            vec!["2024-01-10 10:00:00", "工资", "8000.00", "人民币", "招商银行", "日常", "公司", "", "一月工资"],
        );

        assert_eq!(txn.payee.as_deref(), Some("公司"));
        assert_eq!(txn.narration, "一月工资");
        assert!(txn.tags.is_empty());
        assert!(txn.links.is_empty());
        assert_eq!(txn.postings[0].account, "Assets:Bank:CMB");
        assert_eq!(txn.postings[0].units, Some(Amount::new(dec("8000.00"), "CNY")));
        assert_eq!(txn.postings[1].account, "Income:Salary");
        assert!(txn.postings[1].is_auto());
    }

    #[test]
    fn test_reimbursement_income() {
        let txn = run_one(
            SheetKind::Income,
            vec!["2024-01-10 10:00:00", "报销款", "120", "人民币", "现金", "装修", "公司"],
        );

        assert_eq!(txn.postings[1].account, "Assets:Reimburse");
        assert!(txn.links.contains("Reimburse"));
        assert!(txn.tags.contains("zhuang1-xiu1"));
    }

    #[test]
    fn test_missed_record_goes_to_ufo() {
        let txn = run_one(
            SheetKind::Income,
            vec!["2024-01-10 10:00:00", "漏记款", "3.5", "人民币", "现金", "日常", ""],
        );

        assert_eq!(txn.postings[1].account, "Equity:UFO");
        assert_eq!(txn.payee, None);
    }

    #[test]
    fn test_unknown_income_category() {
        let mut r = resolver();
        let entries = run(
            SheetKind::Income,
            &mut r,
            Some("zhuang1-xiu1"),
            vec![vec!["2024-01-10 10:00:00", "红包", "66", "人民币", "现金", "日常", "妈妈"]],
        )
        .unwrap();

        assert_eq!(entries[0].postings[1].account, "Income:Unknown:红包");
        assert!(entries[0].tags.contains("zhuang1-xiu1"));
        assert!(r.diagnostics().unknown_income.contains("Income:Unknown:红包"));
    }
}
