//! Lock ordering for balance writes.
//!
//! Updating a balance takes a row lock on the account until the surrounding
//! database transaction ends. Two transactions that lock the same pair of
//! accounts in opposite order can wait on each other forever (A holds X and
//! wants Y, B holds Y and wants X).
//!
//! The rule: **every operation that writes more than one account balance
//! locks the accounts in ascending id order.** Because the order depends only
//! on the ids, both directions of a pair (X→Y and Y→X) acquire the same lock
//! first and circular wait cannot form.
//!
//! Rows that are only inserted (transfers, entries) are new and uncontended,
//! so they are not subject to this rule.

/// Which side of a transfer a balance update belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    From,
    To,
}

/// Returns `ids` in lock acquisition order: ascending, without duplicates.
pub fn acquisition_order<I>(ids: I) -> Vec<i64>
where
    I: IntoIterator<Item = i64>,
{
    let mut ordered: Vec<i64> = ids.into_iter().collect();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}

/// Order in which the two balance updates of a transfer are issued.
///
/// Follows [`acquisition_order`]: the lower account id is updated first.
pub fn transfer_lock_order(from_account_id: i64, to_account_id: i64) -> [Side; 2] {
    match acquisition_order([from_account_id, to_account_id]).first() {
        Some(&first) if first == to_account_id && first != from_account_id => {
            [Side::To, Side::From]
        }
        _ => [Side::From, Side::To],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_id_goes_first() {
        assert_eq!(transfer_lock_order(1, 2), [Side::From, Side::To]);
        assert_eq!(transfer_lock_order(2, 1), [Side::To, Side::From]);
    }

    #[test]
    fn both_directions_lock_the_same_account_first() {
        let first_id = |from: i64, to: i64| match transfer_lock_order(from, to)[0] {
            Side::From => from,
            Side::To => to,
        };
        assert_eq!(first_id(7, 42), 7);
        assert_eq!(first_id(42, 7), 7);
    }

    #[test]
    fn same_account_keeps_from_first() {
        assert_eq!(transfer_lock_order(5, 5), [Side::From, Side::To]);
    }

    #[test]
    fn acquisition_order_sorts_and_dedups() {
        assert_eq!(acquisition_order([9, 3, 9, 1]), vec![1, 3, 9]);
        assert!(acquisition_order(Vec::new()).is_empty());
    }

    #[test]
    fn transfer_order_agrees_with_acquisition_order() {
        for (from, to) in [(1, 2), (2, 1), (10, 3), (3, 10)] {
            let by_side: Vec<i64> = transfer_lock_order(from, to)
                .iter()
                .map(|side| match side {
                    Side::From => from,
                    Side::To => to,
                })
                .collect();
            assert_eq!(by_side, acquisition_order([from, to]));
        }
    }
}
