//! Top-N recommendation from a learned weight matrix.
//!
//! ## Algorithm
//! For every user row `a_u` of the interaction matrix:
//! 1. Score every item `j` as `a_u · W.item(j)` (row `u` of `A · W`)
//! 2. Drop items the user already interacted with and items scoring ≤ 0
//! 3. Keep the `top_n` highest scores (ties broken by lower item index)
//!
//! Users are scored in parallel; the output keeps user order.

use crate::error::{RecommendError, Result};
use data_loader::{ItemIndex, UserIndex};
use rayon::prelude::*;
use serde::Serialize;
use slim::WeightMatrix;
use sprs::CsMat;
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// An item with its predicted score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoredItem {
    pub item: ItemIndex,
    pub score: f64,
}

/// Ranked recommendations for one user, best first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecommendations {
    pub user: UserIndex,
    pub items: Vec<ScoredItem>,
}

impl UserRecommendations {
    pub fn item_ids(&self) -> impl Iterator<Item = ItemIndex> + '_ {
        self.items.iter().map(|scored| scored.item)
    }
}

/// Ranked lists for every user, ordered by user index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationList {
    top_n: usize,
    users: Vec<UserRecommendations>,
}

impl RecommendationList {
    /// Wrap per-user lists produced with a list length of `top_n`.
    pub fn new(top_n: usize, mut users: Vec<UserRecommendations>) -> Self {
        users.sort_by_key(|recs| recs.user);
        Self { top_n, users }
    }

    /// Requested list length
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn users(&self) -> &[UserRecommendations] {
        &self.users
    }

    /// Recommendations for a single user, if that user was scored
    pub fn get(&self, user: UserIndex) -> Option<&UserRecommendations> {
        self.users
            .binary_search_by_key(&user, |recs| recs.user)
            .ok()
            .map(|idx| &self.users[idx])
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Produce the top `top_n` unseen items for every user row of `a`.
#[instrument(skip(a, weights), fields(users = a.rows(), items = a.cols()))]
pub fn recommend(a: &CsMat<f64>, weights: &WeightMatrix, top_n: usize) -> Result<RecommendationList> {
    let n_items = a.cols();
    if weights.n_items() != n_items {
        return Err(RecommendError::ShapeMismatch {
            weight_items: weights.n_items(),
            matrix_items: n_items,
        });
    }

    let influence = influence_lists(weights);
    let rows = user_rows(a);

    let users: Vec<UserRecommendations> = rows
        .par_iter()
        .enumerate()
        .map(|(user, row)| UserRecommendations {
            user,
            items: rank_user(row, &influence, n_items, top_n),
        })
        .collect();

    debug!(
        "Scored {} users, {} with at least one recommendation",
        users.len(),
        users.iter().filter(|recs| !recs.items.is_empty()).count()
    );
    Ok(RecommendationList::new(top_n, users))
}

/// Positive weights grouped by source item: `influence[i]` lists `(j, W[j][i])`.
fn influence_lists(weights: &WeightMatrix) -> Vec<Vec<(ItemIndex, f64)>> {
    let mut influence = vec![Vec::new(); weights.n_items()];
    for (target, item_weights) in weights.iter().enumerate() {
        for (source, &w) in item_weights.iter().enumerate() {
            if w > 0.0 {
                influence[source].push((target, w));
            }
        }
    }
    influence
}

/// Non-zero entries of `a` grouped by row, whatever its storage order.
fn user_rows(a: &CsMat<f64>) -> Vec<Vec<(ItemIndex, f64)>> {
    let mut rows = vec![Vec::new(); a.rows()];
    for (&value, (user, item)) in a.iter() {
        if value != 0.0 {
            rows[user].push((item, value));
        }
    }
    rows
}

fn rank_user(
    row: &[(ItemIndex, f64)],
    influence: &[Vec<(ItemIndex, f64)>],
    n_items: usize,
    top_n: usize,
) -> Vec<ScoredItem> {
    if top_n == 0 {
        return Vec::new();
    }

    let mut scores = vec![0.0; n_items];
    let mut seen = vec![false; n_items];
    for &(source, value) in row {
        seen[source] = true;
        for &(target, w) in &influence[source] {
            scores[target] += value * w;
        }
    }

    let mut scored: Vec<ScoredItem> = scores
        .into_iter()
        .enumerate()
        .filter(|&(item, score)| score > 0.0 && !seen[item])
        .map(|(item, score)| ScoredItem { item, score })
        .collect();

    scored.sort_unstable_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.item.cmp(&b.item))
    });
    scored.truncate(top_n);
    scored
}
