use std::sync::Arc;

use learn_core::leaderboard::{LeaderboardEntry, rank_users};
use learn_core::model::UserId;
use storage::repository::UserRepository;

use crate::error::LeaderboardError;

/// Upper bound on profiles scanned when looking up one learner's rank.
const RANK_SCAN_LIMIT: u32 = 10_000;

/// Ranks learners by total XP.
#[derive(Clone)]
pub struct LeaderboardService {
    users: Arc<dyn UserRepository>,
}

impl LeaderboardService {
    #[must_use]
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// The highest-ranked learners, at most `limit` rows.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Storage` if profiles cannot be listed.
    pub async fn top(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let users = self.users.list_users(limit).await?;
        Ok(rank_users(&users))
    }

    /// One learner's row, or `None` if they are not ranked.
    ///
    /// # Errors
    ///
    /// Returns `LeaderboardError::Storage` if profiles cannot be listed.
    pub async fn rank_of(&self, uid: &UserId) -> Result<Option<LeaderboardEntry>, LeaderboardError> {
        let users = self.users.list_users(RANK_SCAN_LIMIT).await?;
        Ok(rank_users(&users).into_iter().find(|entry| &entry.uid == uid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use learn_core::model::{Identity, User};
    use learn_core::progression::award_xp;
    use learn_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    async fn seeded() -> LeaderboardService {
        let repo = InMemoryRepository::new();
        for (uid, name, xp) in [
            ("a", "Alex Chen", 15_420),
            ("b", "Sarah Johnson", 12_850),
            ("c", "Mike Rodriguez", 12_850),
            ("d", "Emma Wilson", 9_870),
        ] {
            let identity = Identity::new(
                UserId::new(uid).unwrap(),
                format!("{uid}@example.com"),
                name,
                None,
            )
            .unwrap();
            let user = award_xp(&User::new(identity, fixed_now()), xp).user;
            repo.upsert_user(&user).await.unwrap();
        }
        LeaderboardService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn top_uses_competition_ranking() {
        let svc = seeded().await;
        let rows = svc.top(10).await.unwrap();
        let ranks: Vec<_> = rows.iter().map(|r| (r.rank, r.display_name.as_str())).collect();
        assert_eq!(
            ranks,
            [
                (1, "Alex Chen"),
                (2, "Mike Rodriguez"),
                (2, "Sarah Johnson"),
                (4, "Emma Wilson"),
            ]
        );
        assert_eq!(rows[0].level, 16);
    }

    #[tokio::test]
    async fn rank_of_finds_one_learner() {
        let svc = seeded().await;
        let row = svc.rank_of(&UserId::new("d").unwrap()).await.unwrap().unwrap();
        assert_eq!(row.rank, 4);
        assert!(svc
            .rank_of(&UserId::new("zz").unwrap())
            .await
            .unwrap()
            .is_none());
    }
}
