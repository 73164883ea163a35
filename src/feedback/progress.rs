//! Previous-attempt selection over an append-only score history

use super::ScoreSet;

/// Select the previous attempt's scores from an append-only history that
/// already contains the just-recorded current attempt
///
/// "Previous" is the second-to-last entry, not the last: the pipeline
/// persists the current attempt before reading history back, so the last
/// entry is the attempt being displayed. Returns `None` when fewer than
/// two entries exist. This indexing is load-bearing: off by one and every
/// delta compares an attempt against itself.
#[must_use]
pub fn select_previous(history: &[ScoreSet]) -> Option<&ScoreSet> {
    if history.len() < 2 {
        return None;
    }
    history.get(history.len() - 2)
}
