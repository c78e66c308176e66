//! Per-round scores and ranking.

use indexmap::IndexMap;

use crate::state::room::User;

/// Latest reported score of one member for the current round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserScore {
    /// Reporting member.
    pub user_id: String,
    /// Name at submission time, kept so departures do not blank the ranking.
    pub user_name: String,
    /// Latest reported taps.
    pub tap_count: u32,
}

/// One row of a published round result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking {
    /// 1-based position.
    pub rank: u32,
    /// Ranked user.
    pub user_id: String,
    /// Name of the ranked user.
    pub user_name: String,
    /// Reported taps.
    pub tap_count: u32,
}

/// Per-round scores keyed by user id, in first-submission order.
#[derive(Debug, Default, Clone)]
pub struct ScoreLedger {
    scores: IndexMap<String, UserScore>,
}

impl ScoreLedger {
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.scores.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Forget every score; called when a round starts.
    pub fn clear(&mut self) {
        self.scores.clear();
    }

    /// Record the latest count for `user`. A resubmission replaces the count but keeps the
    /// user's original position.
    pub fn upsert(&mut self, user: &User, tap_count: u32) {
        self.scores.insert(
            user.id.clone(),
            UserScore {
                user_id: user.id.clone(),
                user_name: user.name.clone(),
                tap_count,
            },
        );
    }

    /// Whether every one of `members` has reported.
    pub fn covers(&self, members: &[User]) -> bool {
        !members.is_empty() && members.iter().all(|m| self.scores.contains_key(&m.id))
    }

    /// Score members that never reported as zero, appended in member order.
    pub fn fill_absent(&mut self, members: &[User]) {
        for member in members {
            if !self.scores.contains_key(&member.id) {
                self.upsert(member, 0);
            }
        }
    }

    /// Rank entries by descending count. Ties keep first-submission order and still get
    /// distinct consecutive ranks.
    pub fn rankings(&self) -> Vec<Ranking> {
        let mut entries: Vec<&UserScore> = self.scores.values().collect();
        // `sort_by` is stable.
        entries.sort_by(|a, b| b.tap_count.cmp(&a.tap_count));

        entries
            .into_iter()
            .zip(1u32..)
            .map(|(score, rank)| Ranking {
                rank,
                user_id: score.user_id.clone(),
                user_name: score.user_name.clone(),
                tap_count: score.tap_count,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use rand::seq::SliceRandom;

    use super::*;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            name: id.to_uppercase(),
        }
    }

    #[test]
    fn equal_scores_rank_by_submission_order() {
        let mut ledger = ScoreLedger::default();
        ledger.upsert(&user("a"), 7);
        ledger.upsert(&user("b"), 7);

        let ranked = ledger.rankings();
        assert_eq!(ranked.len(), 2);
        assert_eq!((ranked[0].rank, ranked[0].user_id.as_str()), (1, "a"));
        assert_eq!((ranked[1].rank, ranked[1].user_id.as_str()), (2, "b"));
        assert!(ranked.iter().all(|r| r.tap_count == 7));
    }

    #[test]
    fn higher_counts_rank_first() {
        let mut ledger = ScoreLedger::default();
        ledger.upsert(&user("a"), 3);
        ledger.upsert(&user("b"), 12);
        ledger.upsert(&user("c"), 5);

        let order: Vec<_> = ledger
            .rankings()
            .into_iter()
            .map(|r| (r.rank, r.user_id))
            .collect();
        assert_eq!(
            order,
            vec![(1, "b".into()), (2, "c".into()), (3, "a".into())]
        );
    }

    #[test]
    fn resubmission_keeps_position() {
        let mut ledger = ScoreLedger::default();
        ledger.upsert(&user("a"), 1);
        ledger.upsert(&user("b"), 4);
        ledger.upsert(&user("a"), 4);

        let ranked = ledger.rankings();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ranked[0].user_id, "a");
        assert_eq!(ranked[0].tap_count, 4);
    }

    #[test]
    fn name_is_snapshotted_at_submission() {
        let mut ledger = ScoreLedger::default();
        ledger.upsert(&user("a"), 2);
        let ranked = ledger.rankings();
        assert_eq!(ranked[0].user_name, "A");
    }

    #[test]
    fn absent_members_are_scored_zero() {
        let members = vec![user("a"), user("b"), user("c")];
        let mut ledger = ScoreLedger::default();
        ledger.upsert(&user("b"), 9);
        assert!(!ledger.covers(&members));

        ledger.fill_absent(&members);
        assert!(ledger.covers(&members));

        let ranked = ledger.rankings();
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].user_id, "b");
        assert_eq!(ranked[1].user_id, "a");
        assert_eq!(ranked[2].user_id, "c");
        assert_eq!(ranked[2].tap_count, 0);
    }

    #[test]
    fn ranking_is_deterministic_for_shuffled_ties() {
        let mut rng = rand::rng();
        let mut ids: Vec<String> = (0..8).map(|i| format!("u{i}")).collect();

        for _ in 0..100 {
            ids.shuffle(&mut rng);
            let mut ledger = ScoreLedger::default();
            for id in &ids {
                ledger.upsert(&user(id), 5);
            }

            let ranked = ledger.rankings();
            for (position, (entry, id)) in ranked.iter().zip(&ids).enumerate() {
                assert_eq!(&entry.user_id, id);
                assert_eq!(entry.rank as usize, position + 1);
            }
        }
    }

    #[test]
    fn clear_empties_ledger() {
        let mut ledger = ScoreLedger::default();
        ledger.upsert(&user("a"), 1);
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.rankings().is_empty());
    }
}
