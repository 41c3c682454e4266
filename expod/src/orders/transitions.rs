//! Item state machine
//!
//! The only writer of item workflow state. Every rule is a guarded
//! transition; [`try_apply`] returns `false` on a guard miss and leaves the
//! item untouched, so callers decide whether a miss is an error (single
//! item) or a skip (station-scoped batch).
//!
//! `cooking` is deliberately two-phased: the first application moves a
//! pending item into the cooking queue, the second marks the moment a
//! station actually started working it (`cooking_started_at`). A third
//! application is a guard miss. `return_to_new` clears only that marker,
//! putting the item back in the queue without losing its place, which makes
//! the automaton a graph with a cycle rather than a forward chain.

use shared::order::{ItemStatus, OrderItem, TransitionAction};

/// Apply one workflow action to one item.
///
/// Returns `true` when a guard matched and the item was mutated. `reason`
/// is only read by the cancellation actions; `now` only by the progress
/// markers.
pub fn try_apply(
    item: &mut OrderItem,
    action: TransitionAction,
    reason: Option<&str>,
    now: i64,
) -> bool {
    match action {
        TransitionAction::Cooking => {
            if item.status == ItemStatus::Pending {
                item.status = ItemStatus::Cooking;
                true
            } else if item.status == ItemStatus::Cooking && item.cooking_started_at.is_none() {
                item.cooking_started_at = Some(now);
                true
            } else {
                false
            }
        }

        TransitionAction::Ready => {
            if item.status == ItemStatus::Cooking {
                item.status = ItemStatus::Ready;
                item.cooking_finished_at = Some(now);
                true
            } else {
                false
            }
        }

        TransitionAction::ReturnToNew => {
            if item.status == ItemStatus::Cooking && item.cooking_started_at.is_some() {
                item.cooking_started_at = None;
                true
            } else {
                false
            }
        }

        TransitionAction::ReturnToCooking => {
            if item.status == ItemStatus::Ready {
                item.status = ItemStatus::Cooking;
                item.cooking_finished_at = None;
                true
            } else {
                false
            }
        }

        TransitionAction::Served => {
            if item.status != ItemStatus::Cancelled {
                item.status = ItemStatus::Served;
                // A dangling cancellation request dies with the serve
                item.status_before_cancel = None;
                item.cancellation_reason = None;
                true
            } else {
                false
            }
        }

        TransitionAction::Cancel => {
            if !item.status.is_terminal() {
                item.status = ItemStatus::Cancelled;
                item.cancellation_reason = reason.map(str::to_string);
                item.is_write_off = true;
                item.status_before_cancel = None;
                true
            } else {
                false
            }
        }

        TransitionAction::RequestCancel => {
            if !item.status.is_terminal() && item.status != ItemStatus::PendingCancel {
                item.status_before_cancel = Some(item.status);
                item.status = ItemStatus::PendingCancel;
                item.cancellation_reason = reason.map(str::to_string);
                true
            } else {
                false
            }
        }

        TransitionAction::ApproveCancel => {
            if item.status == ItemStatus::PendingCancel {
                item.status = ItemStatus::Cancelled;
                item.is_write_off = true;
                item.status_before_cancel = None;
                // Requested reason is retained as the cancellation reason
                true
            } else {
                false
            }
        }

        TransitionAction::RejectCancel => {
            if item.status == ItemStatus::PendingCancel {
                // Restore the stashed status so a rejected request does not
                // erase kitchen progress. Cooking is the fallback for
                // records written before the stash existed.
                item.status = item
                    .status_before_cancel
                    .take()
                    .unwrap_or(ItemStatus::Cooking);
                item.cancellation_reason = None;
                true
            } else {
                false
            }
        }
    }
}
