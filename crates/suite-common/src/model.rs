//! Domain model: suite tiers, user profiles, verified identities, requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Suite tier classification of an identity.
///
/// The tier gates which features a caller can reach and how large a
/// recommendation response may grow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SuiteType {
    Enterprise,
    Tech,
    Lifestyle,
    Professional,
    Education,
    Personal,
    Business,
    Student,
}

impl SuiteType {
    /// Features available to this tier.
    pub fn features(&self) -> Vec<&'static str> {
        match self {
            Self::Enterprise => vec![
                "advanced_analytics",
                "team_collaboration",
                "resource_management",
                "secure_communication",
            ],
            Self::Tech => vec![
                "project_tracking",
                "code_review",
                "deployment_insights",
                "incident_response",
            ],
            Self::Lifestyle => vec![
                "health_optimization",
                "routine_optimization",
                "personal_growth",
            ],
            Self::Professional => vec![
                "career_advancement",
                "skill_development",
                "networking",
            ],
            Self::Education => vec![
                "curriculum_planning",
                "progress_tracking",
                "resource_library",
            ],
            Self::Personal => vec![
                "task_management",
                "health_tracking",
                "finance",
                "goals",
            ],
            Self::Business => vec![
                "crm",
                "inventory",
                "analytics",
                "employee_tracking",
            ],
            Self::Student => vec![
                "course_management",
                "study_groups",
                "ai_assistant",
                "mental_health",
            ],
        }
    }

    /// Upper bound on recommendation results for this tier.
    pub fn max_recommendations(&self) -> usize {
        match self {
            Self::Enterprise | Self::Business => 20,
            Self::Professional | Self::Tech => 15,
            _ => 10,
        }
    }
}

/// User profile containing demographic and preference data.
///
/// The identifier is immutable for the profile's lifetime; the attribute
/// maps are mutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub user_id: String,
    pub suite: SuiteType,
    pub demographics: HashMap<String, String>,
    pub preferences: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
}

/// A verified identity, as returned by credential verification.
///
/// This is a value snapshot taken at verification time; the profile store
/// remains the authority on profile lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub user_id: String,
    pub suite: SuiteType,
    pub attributes: HashMap<String, String>,
    pub verified_at: DateTime<Utc>,
}

/// A typed request, constructed by the caller and consumed once by the
/// dispatcher. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Declared type; must match a registered handler
    #[serde(rename = "type")]
    pub request_type: String,
    /// Handler parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl Request {
    pub fn new(request_type: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            request_type: request_type.into(),
            parameters,
        }
    }
}
