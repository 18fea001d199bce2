//! Preference-rank bookkeeping.
//!
//! A faculty member's selections for a session form a ranked list: each
//! selected session course carries a 1-based `preference_order`, and the
//! orders of a valid list are always the dense permutation `1..=n`. The
//! operations here maintain that invariant through selection, removal, and
//! re-ranking, mirroring what the preference editor does interactively.

use thiserror::Error;
use uuid::Uuid;

/// One ranked selection in a preference list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedChoice {
    pub session_course_id: Uuid,
    pub preference_order: i32,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RankingError {
    #[error("cannot select more than {0} courses")]
    AtCapacity(usize),

    #[error("course is already selected")]
    AlreadySelected,

    #[error("course is not part of the selection")]
    UnknownSelection,

    #[error("preference order {requested} is outside 1..={len}")]
    OrderOutOfRange { requested: i32, len: usize },
}

/// Select a course, appending it at the lowest-priority rank (`max + 1`,
/// or 1 for an empty list). Fails once `max_courses` selections exist.
pub fn select(
    choices: &mut Vec<RankedChoice>,
    session_course_id: Uuid,
    max_courses: usize,
) -> Result<(), RankingError> {
    if choices.iter().any(|c| c.session_course_id == session_course_id) {
        return Err(RankingError::AlreadySelected);
    }
    if choices.len() >= max_courses {
        return Err(RankingError::AtCapacity(max_courses));
    }
    let next = choices
        .iter()
        .map(|c| c.preference_order)
        .max()
        .unwrap_or(0)
        + 1;
    choices.push(RankedChoice {
        session_course_id,
        preference_order: next,
    });
    Ok(())
}

/// Drop a selection and close the gap: every order greater than the removed
/// one shifts down by one, keeping the list a dense 1..=n ranking.
/// Returns false when the id was not selected.
pub fn deselect(choices: &mut Vec<RankedChoice>, session_course_id: Uuid) -> bool {
    let Some(idx) = choices
        .iter()
        .position(|c| c.session_course_id == session_course_id)
    else {
        return false;
    };
    let removed_order = choices[idx].preference_order;
    choices.remove(idx);
    for choice in choices.iter_mut() {
        if choice.preference_order > removed_order {
            choice.preference_order -= 1;
        }
    }
    true
}

/// Give a selection a new rank. When another selection already holds that
/// rank the two swap places, so the list stays a permutation.
pub fn set_order(
    choices: &mut [RankedChoice],
    session_course_id: Uuid,
    new_order: i32,
) -> Result<(), RankingError> {
    let len = choices.len();
    if new_order < 1 || new_order as usize > len {
        return Err(RankingError::OrderOutOfRange {
            requested: new_order,
            len,
        });
    }
    let idx = choices
        .iter()
        .position(|c| c.session_course_id == session_course_id)
        .ok_or(RankingError::UnknownSelection)?;

    let current_order = choices[idx].preference_order;
    if let Some(other) = choices
        .iter_mut()
        .find(|c| c.session_course_id != session_course_id && c.preference_order == new_order)
    {
        other.preference_order = current_order;
    }
    choices[idx].preference_order = new_order;
    Ok(())
}

/// True when `orders` is exactly the permutation 1..=n.
pub fn is_dense_ranking(orders: &[i32]) -> bool {
    let mut seen = vec![false; orders.len()];
    for &order in orders {
        if order < 1 || order as usize > orders.len() {
            return false;
        }
        let slot = &mut seen[(order - 1) as usize];
        if *slot {
            return false;
        }
        *slot = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    fn orders_of(choices: &[RankedChoice]) -> Vec<i32> {
        choices.iter().map(|c| c.preference_order).collect()
    }

    #[test]
    fn select_appends_in_rank_order() {
        let ids = ids(3);
        let mut choices = Vec::new();
        for id in &ids {
            select(&mut choices, *id, 5).unwrap();
        }
        assert_eq!(orders_of(&choices), vec![1, 2, 3]);
        assert!(is_dense_ranking(&orders_of(&choices)));
    }

    #[test]
    fn select_rejects_at_capacity() {
        let ids = ids(3);
        let mut choices = Vec::new();
        select(&mut choices, ids[0], 2).unwrap();
        select(&mut choices, ids[1], 2).unwrap();
        assert_eq!(
            select(&mut choices, ids[2], 2),
            Err(RankingError::AtCapacity(2))
        );
    }

    #[test]
    fn select_rejects_duplicates() {
        let ids = ids(1);
        let mut choices = Vec::new();
        select(&mut choices, ids[0], 5).unwrap();
        assert_eq!(
            select(&mut choices, ids[0], 5),
            Err(RankingError::AlreadySelected)
        );
    }

    #[test]
    fn deselect_closes_the_gap() {
        let ids = ids(4);
        let mut choices = Vec::new();
        for id in &ids {
            select(&mut choices, *id, 5).unwrap();
        }
        assert!(deselect(&mut choices, ids[1]));
        // 1,3,4 collapse back to 1,2,3 with relative order preserved
        assert_eq!(orders_of(&choices), vec![1, 2, 3]);
        assert_eq!(choices[1].session_course_id, ids[2]);
        assert!(is_dense_ranking(&orders_of(&choices)));
    }

    #[test]
    fn deselect_unknown_id_is_a_noop() {
        let ids = ids(2);
        let mut choices = Vec::new();
        select(&mut choices, ids[0], 5).unwrap();
        assert!(!deselect(&mut choices, ids[1]));
        assert_eq!(choices.len(), 1);
    }

    #[test]
    fn set_order_swaps_with_the_occupant() {
        let ids = ids(3);
        let mut choices = Vec::new();
        for id in &ids {
            select(&mut choices, *id, 5).unwrap();
        }
        // Move the third pick to rank 1: the old rank-1 pick takes rank 3.
        set_order(&mut choices, ids[2], 1).unwrap();
        assert_eq!(choices[2].preference_order, 1);
        assert_eq!(choices[0].preference_order, 3);
        assert_eq!(choices[1].preference_order, 2);
        assert!(is_dense_ranking(&orders_of(&choices)));
    }

    #[test]
    fn set_order_to_own_rank_is_stable() {
        let ids = ids(2);
        let mut choices = Vec::new();
        for id in &ids {
            select(&mut choices, *id, 5).unwrap();
        }
        set_order(&mut choices, ids[0], 1).unwrap();
        assert_eq!(orders_of(&choices), vec![1, 2]);
    }

    #[test]
    fn set_order_bounds_checked() {
        let ids = ids(2);
        let mut choices = Vec::new();
        for id in &ids {
            select(&mut choices, *id, 5).unwrap();
        }
        assert_eq!(
            set_order(&mut choices, ids[0], 0),
            Err(RankingError::OrderOutOfRange {
                requested: 0,
                len: 2
            })
        );
        assert_eq!(
            set_order(&mut choices, ids[0], 3),
            Err(RankingError::OrderOutOfRange {
                requested: 3,
                len: 2
            })
        );
        assert_eq!(
            set_order(&mut choices, Uuid::new_v4(), 1),
            Err(RankingError::UnknownSelection)
        );
    }

    #[test]
    fn dense_ranking_checks() {
        assert!(is_dense_ranking(&[]));
        assert!(is_dense_ranking(&[1]));
        assert!(is_dense_ranking(&[2, 1, 3]));
        assert!(!is_dense_ranking(&[1, 1]));
        assert!(!is_dense_ranking(&[1, 3]));
        assert!(!is_dense_ranking(&[0, 1]));
        assert!(!is_dense_ranking(&[-1, 1]));
    }

    #[test]
    fn ranks_stay_dense_through_mixed_editing() {
        let ids = ids(6);
        let mut choices = Vec::new();
        for id in ids.iter().take(5) {
            select(&mut choices, *id, 6).unwrap();
        }
        deselect(&mut choices, ids[2]);
        set_order(&mut choices, ids[4], 1).unwrap();
        select(&mut choices, ids[5], 6).unwrap();
        deselect(&mut choices, ids[0]);
        assert!(is_dense_ranking(&orders_of(&choices)));
        assert_eq!(choices.len(), 4);
    }
}
