//! User profile store.
//!
//! Owns `UserProfile` records for the process lifetime. Identifiers are
//! immutable; attribute maps and the tier are mutable. Records are removed
//! only by explicit deletion.

use chrono::Utc;
use dashmap::DashMap;
use std::collections::HashMap;
use suite_common::{SuiteType, UserProfile};
use tracing::debug;

/// Sharded profile store.
#[derive(Default)]
pub struct ProfileStore {
    profiles: DashMap<String, UserProfile>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a profile, or update the mutable attributes of an existing
    /// one. The identifier and original creation time are preserved.
    pub fn create(
        &self,
        user_id: &str,
        suite: SuiteType,
        demographics: HashMap<String, String>,
        preferences: HashMap<String, String>,
    ) -> UserProfile {
        let mut entry = self
            .profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile {
                user_id: user_id.to_string(),
                suite,
                demographics: HashMap::new(),
                preferences: HashMap::new(),
                created_at: Utc::now(),
            });
        entry.suite = suite;
        entry.demographics = demographics;
        entry.preferences = preferences;
        let profile = entry.clone();
        drop(entry);
        debug!(user_id, suite = ?profile.suite, "profile created");
        profile
    }

    pub fn get(&self, user_id: &str) -> Option<UserProfile> {
        self.profiles.get(user_id).map(|p| p.clone())
    }

    /// Set one preference key. Returns false if the profile is unknown.
    pub fn set_preference(&self, user_id: &str, key: &str, value: &str) -> bool {
        match self.profiles.get_mut(user_id) {
            Some(mut profile) => {
                profile.preferences.insert(key.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    /// Move a profile to a different tier. Returns false if unknown.
    pub fn set_suite(&self, user_id: &str, suite: SuiteType) -> bool {
        match self.profiles.get_mut(user_id) {
            Some(mut profile) => {
                profile.suite = suite;
                true
            }
            None => false,
        }
    }

    /// Explicitly delete a profile.
    pub fn remove(&self, user_id: &str) -> bool {
        self.profiles.remove(user_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
