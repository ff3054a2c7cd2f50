// 🧾 Expense sheet (支出)
// B category · C subcategory · D amount · E currency · F account · G project
// H payee · I reimbursement status · J members · K narration
//
// The members column is either the owner alone (`自己：12.00`) or a list of
// `name：amount` pairs separated by `，`, one expense posting per member.
// Amounts may carry `,` thousands separators, so `,` never splits members.

use super::{
    project_tag, ExtractContext, RowHandler, LINK_REIMBURSE, MISSED_RECORD, PENDING_REIMBURSE,
    REIMBURSED, SELF_MEMBER, TAG_PENDING,
};
use crate::error::{ExtractError, ExtractResult};
use crate::ledger::{Amount, Flag, Posting, Transaction};
use crate::sheet::{parse_decimal, Row, SheetKind};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

/// One entry of the members column
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub name: String,
    pub amount: Decimal,
}

fn single_payer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^自己[：:][0-9][0-9,]*\.[0-9]+$").expect("single payer pattern is valid")
    })
}

/// True when the owner paid alone (an empty column counts as the owner)
pub fn is_single_payer(members: &str) -> bool {
    members.is_empty() || single_payer_pattern().is_match(members)
}

/// Split `name：amount，name：amount`; an ASCII `:` is accepted as well
pub fn parse_members(row: &Row<'_>, members: &str) -> ExtractResult<Vec<Member>> {
    let malformed = || ExtractError::MalformedMember {
        sheet: row.sheet_name().to_string(),
        row: row.number,
        value: members.to_string(),
    };

    let mut parsed = Vec::new();
    for entry in members.split('，') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (name, amount) = entry
            .split_once(|c| c == '：' || c == ':')
            .ok_or_else(malformed)?;
        let amount = parse_decimal(amount.trim()).ok_or_else(malformed)?;
        parsed.push(Member {
            name: name.trim().to_string(),
            amount,
        });
    }

    if parsed.is_empty() {
        return Err(malformed());
    }
    Ok(parsed)
}

pub struct ExpenseHandler;

impl RowHandler for ExpenseHandler {
    fn handle(&self, ctx: &mut ExtractContext<'_>, row: &Row<'_>) -> ExtractResult<Option<Transaction>> {
        let subcategory = row.read('C');
        let currency = row.read('E');
        let account = row.read('F');
        let project = row.read('G');
        let payee = row.read('H');
        let status = row.read('I');
        let members = row.read('J');
        let narration = row.read('K');

        let reimbursable = status == PENDING_REIMBURSE || status == REIMBURSED;

        let mut txn = ctx.transaction(row, Flag::Cleared, narration).with_payee(payee);
        if let Some(tag) = project_tag(ctx.resolver, &project) {
            txn.tags.insert(tag);
        }
        if status == PENDING_REIMBURSE {
            txn.tags.insert(TAG_PENDING.to_string());
        }
        if reimbursable {
            txn.links.insert(LINK_REIMBURSE.to_string());
        }

        let account_expense = if subcategory == MISSED_RECORD {
            ctx.accounts.ufo.clone()
        } else {
            ctx.resolver.expense(&subcategory)
        };
        let currency = ctx.resolver.currency(&currency);

        if is_single_payer(&members) {
            let amount = row.decimal('D')?;
            txn.push(Posting::with_amount(
                ctx.resolver.account(&account),
                Amount::new(-amount, currency.clone()),
            ));
            if reimbursable {
                // Expense stays visible at zero; the money sits in the reimburse account
                txn.push(Posting::with_amount(
                    account_expense,
                    Amount::new(Decimal::ZERO, currency),
                ));
                txn.push(Posting::auto(ctx.accounts.reimburse.clone()));
            } else {
                txn.push(Posting::auto(account_expense));
            }
        } else {
            let members = parse_members(row, &members)?;
            txn.push(Posting::auto(ctx.resolver.account(&account)));
            for member in &members {
                let mut posting = Posting::with_amount(
                    account_expense.clone(),
                    Amount::new(member.amount, currency.clone()),
                );
                if member.name != SELF_MEMBER {
                    posting = posting.with_meta("member", member.name.clone());
                }
                txn.push(posting);
            }

            // Only the last member's share moves to the reimburse account
            if reimbursable {
                if let Some(last) = members.last() {
                    let share = Amount::new(last.amount, currency);
                    txn.push(Posting::with_amount(account_expense, share.negated()));
                    txn.push(Posting::with_amount(ctx.accounts.reimburse.clone(), share));
                }
            }
        }

        Ok(Some(txn))
    }

    fn kind(&self) -> SheetKind {
        SheetKind::Expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::fixtures::{dec, resolver, run, run_one};

    fn expense_row<'a>(subcategory: &'a str, status: &'a str, members: &'a str) -> Vec<&'a str> {
        vec![
            "2024-01-05 12:30:00",
            "餐饮",
            subcategory,
            "25.00",
            "人民币",
            "现金",
            "日常",
            "面馆",
            status,
            members,
            "午饭",
        ]
    }

    #[test]
    fn test_single_payer_no_reimbursement() {
        let txn = run_one(SheetKind::Expense, expense_row("早餐", "无", "自己：25.00"));

        assert_eq!(txn.payee.as_deref(), Some("面馆"));
        assert_eq!(txn.narration, "午饭");
        assert!(txn.tags.is_empty());
        assert!(txn.links.is_empty());
        assert_eq!(txn.postings.len(), 2);
        assert_eq!(txn.postings[0].account, "Assets:Cash");
        assert_eq!(txn.postings[0].units, Some(Amount::new(dec("-25.00"), "CNY")));
        assert_eq!(txn.postings[1].account, "Expenses:Food:Breakfast");
        assert!(txn.postings[1].is_auto());
    }

    #[test]
    fn test_single_payer_pending_reimbursement() {
        let txn = run_one(SheetKind::Expense, expense_row("打车", "待报销", "自己：25.00"));

        assert!(txn.tags.contains("Pending"));
        assert!(txn.links.contains("Reimburse"));
        assert_eq!(txn.postings.len(), 3);
        assert_eq!(txn.postings[1].account, "Expenses:Transport:Taxi");
        assert_eq!(txn.postings[1].units, Some(Amount::new(Decimal::ZERO, "CNY")));
        assert_eq!(txn.postings[2].account, "Assets:Reimburse");
        assert_eq!(txn.inferred_amounts(), Some(vec![Amount::new(dec("25.00"), "CNY")]));
    }

    #[test]
    fn test_single_payer_reimbursed_has_link_but_no_pending_tag() {
        let txn = run_one(SheetKind::Expense, expense_row("打车", "已报销", "自己：25.00"));
        assert!(!txn.tags.contains("Pending"));
        assert!(txn.links.contains("Reimburse"));
        assert_eq!(txn.postings.len(), 3);
    }

    #[test]
    fn test_empty_members_is_single_payer() {
        let txn = run_one(SheetKind::Expense, expense_row("早餐", "", ""));
        assert_eq!(txn.postings.len(), 2);
        assert_eq!(txn.postings[0].units, Some(Amount::new(dec("-25.00"), "CNY")));
    }

    #[test]
    fn test_two_members_no_reimbursement() {
        let txn = run_one(SheetKind::Expense, expense_row("早餐", "无", "自己：10.00，朋友：5.00"));

        assert_eq!(txn.postings.len(), 3);
        assert_eq!(txn.postings[0].account, "Assets:Cash");
        assert!(txn.postings[0].is_auto());

        assert_eq!(txn.postings[1].account, "Expenses:Food:Breakfast");
        assert_eq!(txn.postings[1].units, Some(Amount::new(dec("10.00"), "CNY")));
        assert!(txn.postings[1].meta.is_empty());

        assert_eq!(txn.postings[2].units, Some(Amount::new(dec("5.00"), "CNY")));
        assert_eq!(txn.postings[2].meta.get("member").map(String::as_str), Some("朋友"));

        assert_eq!(txn.inferred_amounts(), Some(vec![Amount::new(dec("-15.00"), "CNY")]));
    }

    #[test]
    fn test_ascii_colon_in_members() {
        let txn = run_one(SheetKind::Expense, expense_row("早餐", "", "自己:10，朋友:5"));
        assert_eq!(txn.postings.len(), 3);
        assert_eq!(txn.postings[2].units, Some(Amount::new(dec("5"), "CNY")));
    }

    #[test]
    fn test_member_amounts_with_thousands_separators() {
        let mut row = expense_row("早餐", "", "自己：800.00，朋友：1,200.00");
        row[3] = "2,000.00";
        let txn = run_one(SheetKind::Expense, row);

        assert_eq!(txn.postings.len(), 3);
        assert_eq!(txn.postings[1].units, Some(Amount::new(dec("800.00"), "CNY")));
        assert_eq!(txn.postings[2].units, Some(Amount::new(dec("1200.00"), "CNY")));
        assert_eq!(txn.inferred_amounts(), Some(vec![Amount::new(dec("-2000.00"), "CNY")]));
    }

    #[test]
    fn test_single_payer_with_thousands_separator() {
        let mut row = expense_row("早餐", "", "自己：1,200.00");
        row[3] = "1,200.00";
        let txn = run_one(SheetKind::Expense, row);

        assert_eq!(txn.postings.len(), 2);
        assert_eq!(txn.postings[0].units, Some(Amount::new(dec("-1200.00"), "CNY")));
        assert!(txn.postings[1].is_auto());
    }

    #[test]
    fn test_blank_amount_counts_as_zero() {
        let mut row = expense_row("早餐", "", "");
        row[3] = "";
        let txn = run_one(SheetKind::Expense, row);

        assert_eq!(txn.postings.len(), 2);
        let units = txn.postings[0].units.as_ref().unwrap();
        assert!(units.number.is_zero());
        assert_eq!(units.currency, "CNY");
    }

    #[test]
    fn test_members_with_reimbursement_moves_last_share() {
        let txn = run_one(
            SheetKind::Expense,
            expense_row("打车", "待报销", "自己：10.00，同事：30.00"),
        );

        assert_eq!(txn.postings.len(), 5);
        assert_eq!(txn.postings[3].account, "Expenses:Transport:Taxi");
        assert_eq!(txn.postings[3].units, Some(Amount::new(dec("-30.00"), "CNY")));
        assert_eq!(txn.postings[4].account, "Assets:Reimburse");
        assert_eq!(txn.postings[4].units, Some(Amount::new(dec("30.00"), "CNY")));
        assert_eq!(txn.inferred_amounts(), Some(vec![Amount::new(dec("-40.00"), "CNY")]));
    }

    #[test]
    fn test_single_other_member_goes_through_member_path() {
        let txn = run_one(SheetKind::Expense, expense_row("早餐", "", "朋友：25.00"));
        assert!(txn.postings[0].is_auto());
        assert_eq!(txn.postings[1].meta.get("member").map(String::as_str), Some("朋友"));
    }

    #[test]
    fn test_missed_record_goes_to_ufo() {
        let txn = run_one(SheetKind::Expense, expense_row("漏记款", "", "自己：25.00"));
        assert_eq!(txn.postings[1].account, "Equity:UFO");
    }

    #[test]
    fn test_project_tag_and_unknown_expense() {
        let mut r = resolver();
        let mut row = expense_row("宵夜", "", "自己：25.00");
        row[6] = "装修";
        let entries = run(SheetKind::Expense, &mut r, None, vec![row]).unwrap();

        assert!(entries[0].tags.contains("zhuang1-xiu1"));
        assert_eq!(entries[0].postings[1].account, "Expenses:Unknown:宵夜");
        assert_eq!(r.diagnostics().unknown_expenses.len(), 1);
    }

    #[test]
    fn test_malformed_member_aborts() {
        let mut r = resolver();
        let result = run(
            SheetKind::Expense,
            &mut r,
            None,
            vec![expense_row("早餐", "", "自己10.00，朋友")],
        );
        assert!(matches!(result, Err(ExtractError::MalformedMember { row: 2, .. })));
    }

    #[test]
    fn test_is_single_payer() {
        assert!(is_single_payer("自己：12.00"));
        assert!(is_single_payer(""));
        assert!(!is_single_payer("自己：12"));
        assert!(is_single_payer("自己：1,200.00"));
        assert!(!is_single_payer("自己：12.00，朋友：3.00"));
        assert!(!is_single_payer("自己：,12.00"));
        assert!(!is_single_payer("朋友：12.00"));
    }
}
