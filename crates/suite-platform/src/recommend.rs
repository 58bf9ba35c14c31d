//! Recommendation request handler.
//!
//! The concrete example handler behind the dispatcher: serves per-suite
//! catalog entries filtered by the caller's `context`, capped by the tier's
//! result limit. Results are cached per user/context through the sealed
//! cache.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use suite_common::{Identity, SuiteType};
use tracing::debug;

use crate::cache::CacheBackend;
use crate::profile::ProfileStore;
use crate::registry::RequestHandler;

/// Request type this handler is registered under.
pub const RECOMMENDATION_TYPE: &str = "recommendation";

struct CatalogEntry {
    context: &'static str,
    area: &'static str,
    title: &'static str,
    description: &'static str,
}

const fn entry(
    context: &'static str,
    area: &'static str,
    title: &'static str,
    description: &'static str,
) -> CatalogEntry {
    CatalogEntry {
        context,
        area,
        title,
        description,
    }
}

const ENTERPRISE: &[CatalogEntry] = &[
    entry("work", "advanced_analytics", "Enterprise Analytics Review", "Surface usage trends across your teams"),
    entry("work", "team_collaboration", "Team Collaboration Setup", "Coordinate shared workspaces for your teams"),
    entry("work", "resource_management", "Resource Allocation Check", "Rebalance resource allocation across projects"),
    entry("work", "secure_communication", "Secure Channel Rollout", "Move sensitive discussions to encrypted channels"),
];

const BUSINESS: &[CatalogEntry] = &[
    entry("work", "business_optimization", "Business Performance Enhancement", "Optimize business operations"),
    entry("work", "market_opportunities", "Market Growth Opportunities", "Expand market presence"),
    entry("work", "resource_optimization", "Resource Management", "Optimize resource allocation"),
];

const PROFESSIONAL: &[CatalogEntry] = &[
    entry("work", "career_advancement", "Career Growth Opportunities", "Steps to advance your career"),
    entry("work", "skill_development", "Professional Skill Enhancement", "Key skills to develop"),
    entry("work", "networking", "Networking Opportunities", "Expand your professional network"),
];

const TECH: &[CatalogEntry] = &[
    entry("work", "project_tracking", "Project Health Check", "Review sprint velocity and open blockers"),
    entry("work", "code_review", "Review Queue Triage", "Clear the oldest pending reviews first"),
    entry("work", "deployment_insights", "Deployment Cadence Review", "Tighten the release pipeline"),
];

const STUDENT: &[CatalogEntry] = &[
    entry("study", "academic_improvement", "Academic Performance Enhancement", "Improve academic results"),
    entry("study", "study_optimization", "Study Habit Enhancement", "Optimize study techniques"),
    entry("study", "course_planning", "Course Selection Guidance", "Plan your academic path"),
];

const EDUCATION: &[CatalogEntry] = &[
    entry("work", "curriculum_planning", "Curriculum Planning", "Structure the next term's material"),
    entry("study", "progress_tracking", "Cohort Progress Review", "Identify learners falling behind"),
    entry("study", "resource_library", "Resource Library Curation", "Refresh recommended materials"),
];

const PERSONAL: &[CatalogEntry] = &[
    entry("work", "time_management", "Time Management Enhancement", "Optimize your time usage"),
    entry("growth", "goal_tracking", "Personal Goal Progress", "Track and achieve your goals"),
    entry("health", "life_balance", "Life Balance Optimization", "Enhance work-life balance"),
];

const LIFESTYLE: &[CatalogEntry] = &[
    entry("health", "health_optimization", "Health and Wellness Suggestions", "Personalized health recommendations"),
    entry("health", "routine_optimization", "Daily Routine Enhancement", "Optimize your daily schedule"),
    entry("growth", "personal_growth", "Personal Development Opportunities", "Suggestions for personal growth"),
];

fn catalog(suite: SuiteType) -> &'static [CatalogEntry] {
    match suite {
        SuiteType::Enterprise => ENTERPRISE,
        SuiteType::Business => BUSINESS,
        SuiteType::Professional => PROFESSIONAL,
        SuiteType::Tech => TECH,
        SuiteType::Student => STUDENT,
        SuiteType::Education => EDUCATION,
        SuiteType::Personal => PERSONAL,
        SuiteType::Lifestyle => LIFESTYLE,
    }
}

/// Serves `"recommendation"` requests from the per-suite catalog.
pub struct RecommendationHandler {
    profiles: Arc<ProfileStore>,
    cache: Arc<dyn CacheBackend>,
}

impl RecommendationHandler {
    pub fn new(profiles: Arc<ProfileStore>, cache: Arc<dyn CacheBackend>) -> Self {
        Self { profiles, cache }
    }
}

#[async_trait]
impl RequestHandler for RecommendationHandler {
    async fn handle(
        &self,
        identity: &Identity,
        parameters: &Map<String, Value>,
    ) -> Result<Value, anyhow::Error> {
        let context = parameters
            .get("context")
            .and_then(Value::as_str)
            .unwrap_or("general");
        let requested = parameters
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(5) as usize;

        let profile = self
            .profiles
            .get(&identity.user_id)
            .ok_or_else(|| anyhow::anyhow!("no profile for user {}", identity.user_id))?;
        let limit = requested.min(profile.suite.max_recommendations());

        let cache_key = format!("rec:{}:{}:{}", profile.user_id, context, limit);
        if let Some(hit) = self.cache.get(&cache_key).await {
            if let Ok(cached) = serde_json::from_str::<Value>(&hit) {
                debug!(user = %profile.user_id, context, "recommendation cache hit");
                return Ok(cached);
            }
        }

        let recommendations: Vec<Value> = catalog(profile.suite)
            .iter()
            .filter(|e| context == "general" || e.context == context)
            .take(limit)
            .map(|e| {
                json!({
                    "area": e.area,
                    "title": e.title,
                    "description": e.description,
                    "context": e.context,
                })
            })
            .collect();

        let result = Value::Array(recommendations);
        self.cache.set(&cache_key, result.to_string()).await;
        Ok(result)
    }
}
