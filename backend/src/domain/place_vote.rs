//! Ranked place voting and Borda-count resolution.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::{RecommendationId, UserId};

/// Validation failures for a submitted ranking.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RankingValidationError {
    #[error("a ranking needs at least one place")]
    Empty,
    #[error("place {0} is ranked more than once")]
    DuplicatePlace(RecommendationId),
    #[error("rank {rank} is outside 1..={max} or used twice")]
    InvalidRank { rank: u32, max: usize },
}

/// One user's ordering of recommended places; rank 1 is the favourite.
///
/// Ranks are unique and cover `1..=n` for `n` ranked places.
///
/// # Examples
///
/// ```rust
/// use backend::domain::{PlaceRanking, RecommendationId};
///
/// let ranking = PlaceRanking::new(vec![
///     (RecommendationId::new(4), 2),
///     (RecommendationId::new(9), 1),
/// ])?;
/// assert_eq!(ranking.entries().len(), 2);
/// assert!(PlaceRanking::new(vec![(RecommendationId::new(4), 3)]).is_err());
/// Ok::<(), backend::domain::RankingValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceRanking {
    entries: Vec<(RecommendationId, u32)>,
}

impl PlaceRanking {
    pub fn new(entries: Vec<(RecommendationId, u32)>) -> Result<Self, RankingValidationError> {
        if entries.is_empty() {
            return Err(RankingValidationError::Empty);
        }

        let max = entries.len();
        let mut places = BTreeSet::new();
        let mut ranks = BTreeSet::new();
        for &(place, rank) in &entries {
            if !places.insert(place) {
                return Err(RankingValidationError::DuplicatePlace(place));
            }
            let in_range = usize::try_from(rank).is_ok_and(|r| (1..=max).contains(&r));
            if !in_range || !ranks.insert(rank) {
                return Err(RankingValidationError::InvalidRank { rank, max });
            }
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(RecommendationId, u32)] {
        &self.entries
    }

    pub fn places(&self) -> impl Iterator<Item = RecommendationId> + '_ {
        self.entries.iter().map(|&(place, _)| place)
    }
}

/// Stored ranking entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedVote {
    pub user_id: UserId,
    pub recommendation_id: RecommendationId,
    pub rank: u32,
}

/// Winning place by Borda count.
///
/// With `n` candidates, rank `r` scores `n - r + 1`. Ties go to the lowest
/// recommendation id. Votes for unknown candidates are ignored.
pub fn resolve_place(candidates: &[RecommendationId], votes: &[RankedVote]) -> Option<RecommendationId> {
    let n = u64::try_from(candidates.len()).ok()?;
    let mut scores: BTreeMap<RecommendationId, u64> =
        candidates.iter().map(|&id| (id, 0)).collect();

    for vote in votes {
        if let Some(score) = scores.get_mut(&vote.recommendation_id) {
            *score += (n + 1).saturating_sub(u64::from(vote.rank));
        }
    }

    // Ascending id order: keep the earlier entry on equal scores.
    scores
        .into_iter()
        .fold(None, |best: Option<(RecommendationId, u64)>, (id, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((id, score)),
        })
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn ranked(user: &UserId, place: i64, rank: u32) -> RankedVote {
        RankedVote {
            user_id: user.clone(),
            recommendation_id: RecommendationId::new(place),
            rank,
        }
    }

    fn ids(raw: &[i64]) -> Vec<RecommendationId> {
        raw.iter().copied().map(RecommendationId::new).collect()
    }

    #[rstest]
    #[case(vec![], RankingValidationError::Empty)]
    #[case(
        vec![(RecommendationId::new(1), 1), (RecommendationId::new(1), 2)],
        RankingValidationError::DuplicatePlace(RecommendationId::new(1))
    )]
    #[case(
        vec![(RecommendationId::new(1), 1), (RecommendationId::new(2), 1)],
        RankingValidationError::InvalidRank { rank: 1, max: 2 }
    )]
    #[case(
        vec![(RecommendationId::new(1), 0)],
        RankingValidationError::InvalidRank { rank: 0, max: 1 }
    )]
    fn ranking_validation(
        #[case] entries: Vec<(RecommendationId, u32)>,
        #[case] expected: RankingValidationError,
    ) {
        assert_eq!(PlaceRanking::new(entries), Err(expected));
    }

    #[rstest]
    fn borda_prefers_broad_support() {
        let (a, b, c) = (UserId::random(), UserId::random(), UserId::random());
        // Place 1 is a polarising favourite; place 2 is everyone's second choice.
        let votes = vec![
            ranked(&a, 1, 1),
            ranked(&a, 2, 2),
            ranked(&a, 3, 3),
            ranked(&b, 3, 1),
            ranked(&b, 2, 2),
            ranked(&b, 1, 3),
            ranked(&c, 2, 1),
            ranked(&c, 1, 2),
            ranked(&c, 3, 3),
        ];
        assert_eq!(
            resolve_place(&ids(&[1, 2, 3]), &votes),
            Some(RecommendationId::new(2))
        );
    }

    #[rstest]
    fn borda_ties_go_to_the_lowest_id() {
        let (a, b) = (UserId::random(), UserId::random());
        let votes = vec![ranked(&a, 8, 1), ranked(&a, 5, 2), ranked(&b, 5, 1), ranked(&b, 8, 2)];
        assert_eq!(
            resolve_place(&ids(&[8, 5]), &votes),
            Some(RecommendationId::new(5))
        );
    }

    #[rstest]
    fn unknown_places_are_ignored() {
        let a = UserId::random();
        let votes = vec![ranked(&a, 99, 1), ranked(&a, 4, 2)];
        assert_eq!(
            resolve_place(&ids(&[4, 6]), &votes),
            Some(RecommendationId::new(4))
        );
    }

    #[rstest]
    fn no_candidates_means_no_place() {
        assert_eq!(resolve_place(&[], &[]), None);
    }
}
