use crate::model::{User, UserId};

/// One row of the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub uid: UserId,
    pub display_name: String,
    pub level: u32,
    pub total_xp: u64,
}

/// Order users by total XP (highest first) and assign ranks.
///
/// Ties share a rank and the next rank skips ahead (1, 2, 2, 4). Within a
/// tie, rows are ordered by display name so output is stable.
#[must_use]
pub fn rank_users<'a>(users: impl IntoIterator<Item = &'a User>) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&User> = users.into_iter().collect();
    sorted.sort_by(|a, b| {
        b.total_xp()
            .cmp(&a.total_xp())
            .then_with(|| a.identity().display_name().cmp(b.identity().display_name()))
            .then_with(|| a.uid().cmp(b.uid()))
    });

    let mut entries = Vec::with_capacity(sorted.len());
    let mut rank = 0_u32;
    let mut previous_xp = None;
    for (position, user) in (1_u32..).zip(sorted) {
        if previous_xp != Some(user.total_xp()) {
            rank = position;
            previous_xp = Some(user.total_xp());
        }
        entries.push(LeaderboardEntry {
            rank,
            uid: user.uid().clone(),
            display_name: user.identity().display_name().to_string(),
            level: user.level(),
            total_xp: user.total_xp(),
        });
    }
    entries
}
