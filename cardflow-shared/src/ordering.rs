/// Position allocation for ordered sibling-sets
///
/// This module computes the position-field updates needed to keep a
/// sibling-set (lists under a board, or tasks under a list) densely
/// ordered: after every committed operation the positions of n siblings
/// are exactly {0, 1, ..., n-1}, with no duplicates and no gaps.
///
/// All functions here are pure. They take a snapshot of the current
/// sibling order and return the minimal set of rows whose position must
/// change; the store applies those writes inside its transaction.
///
/// Moves are planned as a full re-linearization: remove the moving
/// entity, splice it back at the target index, and re-number the whole
/// sequence 0..n-1. This writes a few more rows than a sparse shift but
/// cannot produce duplicate or overlapping positions even if the prior
/// state was corrupt.
///
/// # Example
///
/// ```
/// use cardflow_shared::ordering::{plan_move, Sibling};
/// use uuid::Uuid;
///
/// let a = Uuid::new_v4();
/// let b = Uuid::new_v4();
/// let c = Uuid::new_v4();
/// let siblings = vec![
///     Sibling { id: a, position: 0 },
///     Sibling { id: b, position: 1 },
///     Sibling { id: c, position: 2 },
/// ];
///
/// // Move `a` to the end: b and c shift down, a lands at 2.
/// let writes = plan_move(&siblings, a, 2);
/// assert_eq!(writes.len(), 3);
/// ```

use uuid::Uuid;

/// A sibling entity's id and current position, as read from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sibling {
    /// Entity id
    pub id: Uuid,

    /// Current position within the sibling-set
    pub position: i32,
}

/// A single position update the store must apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionWrite {
    /// Entity to update
    pub id: Uuid,

    /// New position value
    pub position: i32,
}

/// Returns the position for an entity appended to the end of a
/// sibling-set. An empty set yields position 0.
pub fn append_position(sibling_count: usize) -> i32 {
    sibling_count as i32
}

/// Plans a move of `moving_id` to `target_index` within one sibling-set.
///
/// `siblings` must be the full sibling-set ordered by position ascending.
/// `target_index` beyond the last valid index clamps to it. Returns only
/// the rows whose position actually changes; moving an entity to its
/// current index yields an empty plan.
///
/// If `moving_id` is not present in `siblings` the plan is empty; the
/// store treats that as `EntityNotFound` before ever calling here.
pub fn plan_move(siblings: &[Sibling], moving_id: Uuid, target_index: usize) -> Vec<PositionWrite> {
    if !siblings.iter().any(|s| s.id == moving_id) {
        return Vec::new();
    }

    let mut order: Vec<Uuid> = siblings
        .iter()
        .map(|s| s.id)
        .filter(|id| *id != moving_id)
        .collect();

    let target = target_index.min(order.len());
    order.insert(target, moving_id);

    relinearize(siblings, &order)
}

/// Plans a move of `moving_id` out of `source` and into `dest` at
/// `target_index`. Both sibling-sets are independently re-linearized to
/// 0..n-1. Returns `(source_writes, dest_writes)`; the moving entity's
/// new position appears in the destination plan.
pub fn plan_cross_move(
    source: &[Sibling],
    dest: &[Sibling],
    moving_id: Uuid,
    target_index: usize,
) -> (Vec<PositionWrite>, Vec<PositionWrite>) {
    let remaining: Vec<Uuid> = source
        .iter()
        .map(|s| s.id)
        .filter(|id| *id != moving_id)
        .collect();
    let source_writes = relinearize(source, &remaining);

    let mut dest_order: Vec<Uuid> = dest.iter().map(|s| s.id).collect();
    let target = target_index.min(dest_order.len());
    dest_order.insert(target, moving_id);

    // The moving entity has no prior position in the destination, so its
    // write is always emitted.
    let mut dest_writes = Vec::new();
    for (index, id) in dest_order.iter().enumerate() {
        let prior = dest.iter().find(|s| s.id == *id).map(|s| s.position);
        if prior != Some(index as i32) {
            dest_writes.push(PositionWrite {
                id: *id,
                position: index as i32,
            });
        }
    }

    (source_writes, dest_writes)
}

/// Plans the compaction of a sibling-set after `removed_id` is deleted:
/// every survivor past the removed slot shifts down by one.
///
/// `siblings` is the set as it was before the delete, ordered by
/// position; the plan covers only the surviving rows.
pub fn plan_removal(siblings: &[Sibling], removed_id: Uuid) -> Vec<PositionWrite> {
    let remaining: Vec<Uuid> = siblings
        .iter()
        .map(|s| s.id)
        .filter(|id| *id != removed_id)
        .collect();

    relinearize(siblings, &remaining)
}

/// Checks the dense-ordering invariant: sorted positions must equal
/// 0..n-1 exactly. The store runs this before committing any write and
/// aborts with an invariant failure if it does not hold.
pub fn is_dense(positions: &[i32]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, position)| *position == index as i32)
}

/// Diffs a new sequence order against prior positions, emitting writes
/// only for rows that actually change.
fn relinearize(prior: &[Sibling], order: &[Uuid]) -> Vec<PositionWrite> {
    let mut writes = Vec::new();
    for (index, id) in order.iter().enumerate() {
        let previous = prior.iter().find(|s| s.id == *id).map(|s| s.position);
        if previous != Some(index as i32) {
            writes.push(PositionWrite {
                id: *id,
                position: index as i32,
            });
        }
    }
    writes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sibling_set(n: usize) -> Vec<Sibling> {
        (0..n)
            .map(|i| Sibling {
                id: Uuid::new_v4(),
                position: i as i32,
            })
            .collect()
    }

    fn apply(siblings: &[Sibling], writes: &[PositionWrite]) -> Vec<Sibling> {
        let mut result: Vec<Sibling> = siblings.to_vec();
        for write in writes {
            if let Some(s) = result.iter_mut().find(|s| s.id == write.id) {
                s.position = write.position;
            }
        }
        result.sort_by_key(|s| s.position);
        result
    }

    #[test]
    fn test_append_position() {
        assert_eq!(append_position(0), 0);
        assert_eq!(append_position(3), 3);
    }

    #[test]
    fn test_move_to_front() {
        let siblings = sibling_set(4);
        let moving = siblings[3].id;

        let writes = plan_move(&siblings, moving, 0);
        let after = apply(&siblings, &writes);

        assert_eq!(after[0].id, moving);
        assert!(is_dense(&after.iter().map(|s| s.position).collect::<Vec<_>>()));
        // Every row moved, so every row is written.
        assert_eq!(writes.len(), 4);
    }

    #[test]
    fn test_move_to_current_index_is_noop() {
        let siblings = sibling_set(5);
        let writes = plan_move(&siblings, siblings[2].id, 2);
        assert!(writes.is_empty());
    }

    #[test]
    fn test_move_target_clamps_to_end() {
        let siblings = sibling_set(3);
        let moving = siblings[0].id;

        let writes = plan_move(&siblings, moving, 99);
        let after = apply(&siblings, &writes);

        assert_eq!(after[2].id, moving);
        assert!(is_dense(&after.iter().map(|s| s.position).collect::<Vec<_>>()));
    }

    #[test]
    fn test_move_unknown_id_yields_empty_plan() {
        let siblings = sibling_set(3);
        assert!(plan_move(&siblings, Uuid::new_v4(), 0).is_empty());
    }

    #[test]
    fn test_round_trip_move_restores_order() {
        let siblings = sibling_set(6);
        let original: Vec<Uuid> = siblings.iter().map(|s| s.id).collect();
        let moving = siblings[1].id;

        let there = apply(&siblings, &plan_move(&siblings, moving, 4));
        let back = apply(&there, &plan_move(&there, moving, 1));

        let restored: Vec<Uuid> = back.iter().map(|s| s.id).collect();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_move_touches_only_affected_range() {
        // Moving index 1 to index 3 must not touch indices 0, 4, 5.
        let siblings = sibling_set(6);
        let writes = plan_move(&siblings, siblings[1].id, 3);

        let touched: Vec<Uuid> = writes.iter().map(|w| w.id).collect();
        assert!(!touched.contains(&siblings[0].id));
        assert!(!touched.contains(&siblings[4].id));
        assert!(!touched.contains(&siblings[5].id));
        assert_eq!(writes.len(), 3);
    }

    #[test]
    fn test_cross_move_relinearizes_both_sets() {
        let source = sibling_set(3);
        let dest = sibling_set(2);
        let moving = source[0].id;

        let (source_writes, dest_writes) = plan_cross_move(&source, &dest, moving, 0);

        let source_after: Vec<Sibling> = apply(&source, &source_writes)
            .into_iter()
            .filter(|s| s.id != moving)
            .collect();
        assert_eq!(source_after.len(), 2);
        assert!(is_dense(
            &source_after.iter().map(|s| s.position).collect::<Vec<_>>()
        ));

        // Moving entity lands at the front of the destination.
        assert!(dest_writes.contains(&PositionWrite {
            id: moving,
            position: 0
        }));
        // Both prior destination rows shift down.
        assert_eq!(dest_writes.len(), 3);
    }

    #[test]
    fn test_cross_move_into_empty_set() {
        let source = sibling_set(2);
        let moving = source[1].id;

        let (source_writes, dest_writes) = plan_cross_move(&source, &[], moving, 5);

        // Removing the tail of the source shifts nothing.
        assert!(source_writes.is_empty());
        assert_eq!(
            dest_writes,
            vec![PositionWrite {
                id: moving,
                position: 0
            }]
        );
    }

    #[test]
    fn test_removal_compaction() {
        let siblings = sibling_set(4);
        let removed = siblings[1].id;

        let writes = plan_removal(&siblings, removed);

        // Rows above the removed slot shift down by one.
        assert_eq!(
            writes,
            vec![
                PositionWrite {
                    id: siblings[2].id,
                    position: 1
                },
                PositionWrite {
                    id: siblings[3].id,
                    position: 2
                },
            ]
        );
    }

    #[test]
    fn test_removal_of_tail_shifts_nothing() {
        let siblings = sibling_set(3);
        assert!(plan_removal(&siblings, siblings[2].id).is_empty());
    }

    #[test]
    fn test_relinearization_repairs_gapped_input() {
        // A corrupt sibling-set with gaps still comes out dense.
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let corrupt = vec![
            Sibling { id: a, position: 0 },
            Sibling { id: b, position: 3 },
            Sibling { id: c, position: 7 },
        ];

        let writes = plan_move(&corrupt, b, 1);
        let after = apply(&corrupt, &writes);
        assert!(is_dense(&after.iter().map(|s| s.position).collect::<Vec<_>>()));
    }

    #[test]
    fn test_density_after_operation_sequence() {
        // Build up from empty with appends, then interleave moves and
        // removals; density must hold after every step.
        let mut siblings: Vec<Sibling> = Vec::new();
        for _ in 0..8 {
            let position = append_position(siblings.len());
            siblings.push(Sibling {
                id: Uuid::new_v4(),
                position,
            });
            assert!(is_dense(&siblings.iter().map(|s| s.position).collect::<Vec<_>>()));
        }

        for (from, to) in [(0usize, 7usize), (3, 1), (6, 6), (2, 5)] {
            let moving = siblings[from].id;
            let writes = plan_move(&siblings, moving, to);
            siblings = apply(&siblings, &writes);
            assert!(is_dense(&siblings.iter().map(|s| s.position).collect::<Vec<_>>()));
        }

        while siblings.len() > 1 {
            let removed = siblings[siblings.len() / 2].id;
            let writes = plan_removal(&siblings, removed);
            siblings.retain(|s| s.id != removed);
            siblings = apply(&siblings, &writes);
            assert!(is_dense(&siblings.iter().map(|s| s.position).collect::<Vec<_>>()));
        }
    }

    #[test]
    fn test_is_dense() {
        assert!(is_dense(&[]));
        assert!(is_dense(&[0]));
        assert!(is_dense(&[2, 0, 1]));
        assert!(!is_dense(&[0, 2, 3]));
        assert!(!is_dense(&[0, 1, 1]));
        assert!(!is_dense(&[1, 2, 3]));
    }
}
