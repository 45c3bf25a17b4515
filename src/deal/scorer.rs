// All-or-nothing deal scoring against a party's utility table

use super::parser::Deal;
use crate::game::UtilityTable;

/// Score `deal` for the owner of `table`.
///
/// A deal only earns points when it is complete: it must have exactly
/// `num_issues` slots, every slot must be a two-character token whose letter is
/// in the table and whose option digit names an existing option. Anything else
/// scores zero. Partial deals never earn partial credit.
pub fn score(table: &UtilityTable, deal: &Deal, num_issues: usize) -> i64 {
    if deal.len() != num_issues {
        return 0;
    }

    let mut total: i64 = 0;
    for slot in deal.slots() {
        // an unscoreable slot or an overflowing table is worth nothing
        match option_score(table, slot).and_then(|points| total.checked_add(points)) {
            Some(sum) => total = sum,
            None => return 0,
        }
    }
    total
}

fn option_score(table: &UtilityTable, token: &str) -> Option<i64> {
    let mut chars = token.chars();
    let (issue, digit) = match (chars.next(), chars.next(), chars.next()) {
        (Some(issue), Some(digit), None) => (issue, digit),
        _ => return None,
    };

    let option = digit.to_digit(10)? as usize;
    // option 0 would index before the first entry
    let index = option.checked_sub(1)?;
    table.options(issue)?.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> UtilityTable {
        UtilityTable::from_rows(
            vec![
                vec![10, 20, 30],
                vec![5, 15, 25],
                vec![1, 2, 3],
                vec![4, 8, 12],
                vec![6, 9, 18],
            ],
            40,
        )
    }

    #[test]
    fn test_score_well_formed_deal() {
        let deal = Deal::from_slots(["A2", "B1", "C3", "D2", "E1"]);
        assert_eq!(score(&table(), &deal, 5), 20 + 5 + 3 + 8 + 6);
        assert_eq!(score(&table(), &deal, 5), 42);
    }

    #[test]
    fn test_one_empty_slot_scores_zero() {
        let deal = Deal::from_slots(["A2", "B3", "", "D1", "E2"]);
        assert_eq!(score(&table(), &deal, 5), 0);
    }

    #[test]
    fn test_wrong_slot_count_scores_zero() {
        let deal = Deal::from_slots(["A2", "B1", "C3", "D2"]);
        assert_eq!(score(&table(), &deal, 5), 0);
        let deal = Deal::from_slots(["A2", "B1", "C3", "D2", "E1", "E2"]);
        assert_eq!(score(&table(), &deal, 5), 0);
    }

    #[test]
    fn test_malformed_tokens_score_zero() {
        for bad in ["A", "A22", "AX", "A0", "A4", "F1", "a1", "Å1"] {
            let deal = Deal::from_slots([bad, "B1", "C1", "D1", "E1"]);
            assert_eq!(score(&table(), &deal, 5), 0, "token {bad:?}");
        }
    }

    #[test]
    fn test_overflowing_total_scores_zero() {
        let huge = UtilityTable::from_rows(vec![vec![i64::MAX], vec![1]], 0);
        let deal = Deal::from_slots(["A1", "B1"]);
        assert_eq!(score(&huge, &deal, 2), 0);

        let negative = UtilityTable::from_rows(vec![vec![i64::MIN], vec![-1]], 0);
        assert_eq!(score(&negative, &deal, 2), 0);
    }

    #[test]
    fn test_empty_deal_with_zero_issues() {
        let empty = UtilityTable::from_rows(vec![], 0);
        assert_eq!(score(&empty, &Deal::default(), 0), 0);
    }
}
