//! Precision@N against held-out test interactions.
//!
//! For each user with at least one test interaction, precision is the number
//! of recommended items found in the user's test set divided by the list
//! length `N`. The reported value is the mean over those users. Users with
//! test data but no recommendations count as zero hits.

use crate::error::Result;
use crate::scoring::RecommendationList;
use data_loader::{ItemIndex, UserIndex};
use serde::Serialize;
use sprs::CsMat;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use tracing::{info, instrument};

/// Outcome of a precision evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrecisionReport {
    /// Mean precision@N over evaluated users
    pub precision: f64,
    /// Users with at least one test interaction
    pub users_evaluated: usize,
    /// Recommended items that appear in the test set, over all users
    pub hits: usize,
}

/// Evaluate precision@N, returning the supporting counts.
pub fn evaluate(recommendations: &RecommendationList, test: &CsMat<f64>) -> PrecisionReport {
    let test_items = test_items_by_user(test);
    let top_n = recommendations.top_n();

    if top_n == 0 || test_items.is_empty() {
        return PrecisionReport {
            precision: 0.0,
            users_evaluated: test_items.len(),
            hits: 0,
        };
    }

    let mut hits = 0;
    let mut precision_sum = 0.0;
    for (user, relevant) in &test_items {
        let user_hits = recommendations
            .get(*user)
            .map(|recs| recs.item_ids().filter(|item| relevant.contains(item)).count())
            .unwrap_or(0);
        hits += user_hits;
        precision_sum += user_hits as f64 / top_n as f64;
    }

    PrecisionReport {
        precision: precision_sum / test_items.len() as f64,
        users_evaluated: test_items.len(),
        hits,
    }
}

/// Mean precision@N of `recommendations` against the test matrix.
pub fn precision(recommendations: &RecommendationList, test: &CsMat<f64>) -> f64 {
    evaluate(recommendations, test).precision
}

/// Load a test triple file and compute precision@N against it.
#[instrument(skip(recommendations), fields(path = %test_path.display()))]
pub fn precision_from_file(recommendations: &RecommendationList, test_path: &Path) -> Result<f64> {
    let test = data_loader::load(test_path, None, None)?;
    let report = evaluate(recommendations, &test);
    info!(
        "Precision@{}: {:.4} over {} users ({} hits)",
        recommendations.top_n(),
        report.precision,
        report.users_evaluated,
        report.hits
    );
    Ok(report.precision)
}

fn test_items_by_user(test: &CsMat<f64>) -> BTreeMap<UserIndex, HashSet<ItemIndex>> {
    let mut by_user: BTreeMap<UserIndex, HashSet<ItemIndex>> = BTreeMap::new();
    for (&value, (user, item)) in test.iter() {
        if value != 0.0 {
            by_user.entry(user).or_default().insert(item);
        }
    }
    by_user
}
