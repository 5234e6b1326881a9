//! Merging rating and comment edits into a review graph.
//!
//! Edits are keyed by key result id and looked up only among the review's
//! own objectives. Ids owned by another review are silently ignored.

use chrono::{DateTime, Utc};
use okr_core::error::CoreError;
use okr_core::rating::validate_rating;
use okr_core::types::DbId;
use okr_db::models::review::{KeyResult, ReviewGraph};
use serde::Deserialize;

/// One submitted edit for a single key result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyResultEdit {
    pub key_result_id: DbId,
    pub rating: Option<i16>,
    pub comments: Option<String>,
    /// Only read from manager edits.
    pub discussion_notes: Option<String>,
}

/// Which rating slot an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingSlot {
    Employee,
    Manager,
}

/// Validate every submitted rating before anything is applied.
pub fn validate_edits(edits: &[KeyResultEdit]) -> Result<(), CoreError> {
    edits
        .iter()
        .filter_map(|e| e.rating)
        .try_for_each(validate_rating)
}

/// Apply edits to one rating slot. Returns the number of key results touched.
///
/// Ratings are validated up front so a bad value leaves the graph untouched.
pub fn apply_edits(
    graph: &mut ReviewGraph,
    slot: RatingSlot,
    edits: &[KeyResultEdit],
    now: DateTime<Utc>,
) -> Result<usize, CoreError> {
    validate_edits(edits)?;

    let mut touched = 0;
    for edit in edits {
        let Some(kr) = graph.key_result_mut(edit.key_result_id) else {
            tracing::debug!(
                review_id = graph.review.id,
                key_result_id = edit.key_result_id,
                "Ignoring edit for key result outside review"
            );
            continue;
        };
        match slot {
            RatingSlot::Employee => apply_employee(kr, edit, now),
            RatingSlot::Manager => apply_manager(kr, edit, now),
        }
        touched += 1;
    }
    Ok(touched)
}

fn apply_employee(kr: &mut KeyResult, edit: &KeyResultEdit, now: DateTime<Utc>) {
    if let Some(rating) = edit.rating {
        kr.employee_rating = Some(rating);
        kr.employee_rated_at = Some(now);
    }
    if let Some(comments) = &edit.comments {
        kr.employee_comments.clone_from(comments);
    }
}

fn apply_manager(kr: &mut KeyResult, edit: &KeyResultEdit, now: DateTime<Utc>) {
    if let Some(rating) = edit.rating {
        kr.manager_rating = Some(rating);
        kr.manager_rated_at = Some(now);
    }
    if let Some(comments) = &edit.comments {
        kr.manager_comments.clone_from(comments);
    }
    if let Some(notes) = &edit.discussion_notes {
        kr.discussion_notes.clone_from(notes);
    }
}

/// Manager ratings of every key result, in graph order.
pub fn manager_ratings(graph: &ReviewGraph) -> impl Iterator<Item = Option<i16>> + '_ {
    graph.key_results().map(|kr| kr.manager_rating)
}

/// Copy each manager rating and comment into the final slot.
pub fn freeze_final_ratings(graph: &mut ReviewGraph, now: DateTime<Utc>) {
    for kr in graph.key_results_mut() {
        kr.final_rating = kr.manager_rating;
        kr.final_rated_at = Some(now);
        if kr.final_comments.is_empty() {
            kr.final_comments.clone_from(&kr.manager_comments);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::graph;
    use super::*;
    use assert_matches::assert_matches;

    fn edit(id: DbId, rating: i16) -> KeyResultEdit {
        KeyResultEdit {
            key_result_id: id,
            rating: Some(rating),
            ..Default::default()
        }
    }

    #[test]
    fn employee_edits_set_rating_and_stamp() {
        let mut g = graph();
        let now = Utc::now();
        let touched = apply_edits(&mut g, RatingSlot::Employee, &[edit(11, 4), edit(12, 5)], now)
            .unwrap();

        assert_eq!(touched, 2);
        let krs: Vec<_> = g.key_results().collect();
        assert_eq!(krs[0].employee_rating, Some(4));
        assert_eq!(krs[1].employee_rating, Some(5));
        assert_eq!(krs[0].employee_rated_at, Some(now));
        assert_eq!(krs[0].manager_rating, None);
    }

    #[test]
    fn edits_for_foreign_key_results_are_no_ops() {
        let mut g = graph();
        let before = g.clone();
        let touched =
            apply_edits(&mut g, RatingSlot::Manager, &[edit(999, 3)], Utc::now()).unwrap();

        assert_eq!(touched, 0);
        let after: Vec<_> = g.key_results().cloned().collect();
        let expected: Vec<_> = before.key_results().cloned().collect();
        assert_eq!(after, expected);
    }

    #[test]
    fn out_of_range_rating_leaves_graph_untouched() {
        let mut g = graph();
        let result = apply_edits(
            &mut g,
            RatingSlot::Manager,
            &[edit(11, 3), edit(12, 9)],
            Utc::now(),
        );

        assert_matches!(result, Err(CoreError::Validation(_)));
        assert!(g.key_results().all(|kr| kr.manager_rating.is_none()));
    }

    #[test]
    fn comments_without_rating_do_not_stamp() {
        let mut g = graph();
        let comment = KeyResultEdit {
            key_result_id: 11,
            comments: Some("On track".into()),
            discussion_notes: Some("Revisit in Q3".into()),
            ..Default::default()
        };
        apply_edits(&mut g, RatingSlot::Manager, &[comment], Utc::now()).unwrap();

        let kr = g.key_results().next().unwrap();
        assert_eq!(kr.manager_comments, "On track");
        assert_eq!(kr.discussion_notes, "Revisit in Q3");
        assert!(kr.manager_rated_at.is_none());
    }

    #[test]
    fn freezing_copies_manager_slot() {
        let mut g = graph();
        let now = Utc::now();
        apply_edits(&mut g, RatingSlot::Manager, &[edit(11, 2), edit(12, 4)], now).unwrap();
        freeze_final_ratings(&mut g, now);

        let finals: Vec<_> = g.key_results().map(|kr| kr.final_rating).collect();
        assert_eq!(finals, vec![Some(2), Some(4)]);
    }
}
