use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::{BadgeId, CourseId, UserId};
use crate::progression;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error("invalid photo URL: {0}")]
    InvalidPhotoUrl(String),
}

//
// ─── IDENTITY ──────────────────────────────────────────────────────────────────
//

/// Who the identity provider says the learner is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    uid: UserId,
    email: String,
    display_name: String,
    photo_url: Option<Url>,
}

impl Identity {
    /// Validate identity fields handed over by the provider.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the email has no `@`, the display name is
    /// blank, or the photo URL does not parse.
    pub fn new(
        uid: UserId,
        email: impl Into<String>,
        display_name: impl Into<String>,
        photo_url: Option<&str>,
    ) -> Result<Self, IdentityError> {
        let email = email.into().trim().to_string();
        if !email.contains('@') {
            return Err(IdentityError::InvalidEmail(email));
        }
        let display_name = display_name.into().trim().to_string();
        if display_name.is_empty() {
            return Err(IdentityError::EmptyDisplayName);
        }
        let photo_url = photo_url
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| Url::parse(raw).map_err(|_| IdentityError::InvalidPhotoUrl(raw.into())))
            .transpose()?;

        Ok(Self {
            uid,
            email,
            display_name,
            photo_url,
        })
    }

    #[must_use]
    pub fn uid(&self) -> &UserId {
        &self.uid
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// First word of the display name, used in greetings.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(&self.display_name)
    }

    #[must_use]
    pub fn photo_url(&self) -> Option<&Url> {
        self.photo_url.as_ref()
    }
}

//
// ─── BADGE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A learner's profile document.
///
/// `total_xp` is the only stored progression value; `level()` and `xp()`
/// are always derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    identity: Identity,
    total_xp: u64,
    completed_courses: BTreeSet<CourseId>,
    badges: Vec<Badge>,
    joined_at: DateTime<Utc>,
}

impl User {
    /// A fresh profile created on first sign-in.
    #[must_use]
    pub fn new(identity: Identity, joined_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            total_xp: 0,
            completed_courses: BTreeSet::new(),
            badges: Vec::new(),
            joined_at,
        }
    }

    /// Rehydrate a user from persisted storage.
    #[must_use]
    pub fn from_persisted(
        identity: Identity,
        total_xp: u64,
        completed_courses: BTreeSet<CourseId>,
        badges: Vec<Badge>,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            identity,
            total_xp,
            completed_courses,
            badges,
            joined_at,
        }
    }

    #[must_use]
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn uid(&self) -> &UserId {
        self.identity.uid()
    }

    #[must_use]
    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        progression::level_for(self.total_xp)
    }

    /// XP earned within the current level (0..1000).
    #[must_use]
    pub fn xp(&self) -> u32 {
        progression::xp_into_level(self.total_xp)
    }

    #[must_use]
    pub fn completed_courses(&self) -> &BTreeSet<CourseId> {
        &self.completed_courses
    }

    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    #[must_use]
    pub fn has_badge(&self, id: &BadgeId) -> bool {
        self.badges.iter().any(|b| &b.id == id)
    }

    #[must_use]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Whole days since the profile was created (0 for future timestamps).
    #[must_use]
    pub fn days_active(&self, now: DateTime<Utc>) -> u64 {
        u64::try_from(now.signed_duration_since(self.joined_at).num_days()).unwrap_or(0)
    }

    /// Returns `true` if the course was not already marked completed.
    pub fn mark_course_completed(&mut self, course: CourseId) -> bool {
        self.completed_courses.insert(course)
    }

    /// Returns `true` if the badge was newly unlocked.
    pub fn unlock_badge(&mut self, badge: Badge) -> bool {
        if self.has_badge(&badge.id) {
            return false;
        }
        self.badges.push(badge);
        true
    }

    pub(crate) fn set_total_xp(&mut self, total_xp: u64) {
        self.total_xp = total_xp;
    }
}
