use std::sync::Arc;

use chrono::Duration;
use log::debug;

use crate::app_response::{require_non_empty, AppResponse};
use crate::environment::Clock;
use crate::local_db_model::{EngagementMetrics, UserActivity, UserStatistics, UserStatisticsPatch};
use crate::repository::{Collection, Document};
use crate::seed_data;
use crate::services::{ServiceContext, USER_ACTIVITY_KEY};

#[derive(Clone)]
pub struct UserStatisticsService {
    statistics: Document<UserStatistics>,
    activity: Collection<UserActivity>,
    clock: Arc<dyn Clock>,
}

impl UserStatisticsService {
    pub fn new(ctx: &ServiceContext) -> Self {
        Self {
            statistics: ctx.statistics(),
            activity: ctx.collection(USER_ACTIVITY_KEY, seed_data::default_user_activity),
            clock: Arc::clone(&ctx.clock),
        }
    }

    pub fn get_user_statistics(&self) -> Result<UserStatistics, AppResponse> {
        self.statistics.load()
    }

    /// Overwrites the counters present in `patch`, leaving the rest alone.
    pub fn update_user_statistics(&self, patch: &UserStatisticsPatch) -> Result<UserStatistics, AppResponse> {
        let now = self.clock.now();
        self.statistics.modify(|stats| patch.apply(stats, now))
    }

    pub fn get_user_activity(&self, user_id: &str) -> Result<Option<UserActivity>, AppResponse> {
        self.activity.find(user_id)
    }

    /// Records one session for `user_id`: bumps the session count, adds
    /// `session_time` seconds and merges `features` into the favourites.
    /// Counters that would overflow are rejected and nothing is written.
    pub fn track_user_activity(
        &self,
        user_id: &str,
        session_time: u64,
        features: &[String],
    ) -> Result<UserActivity, AppResponse> {
        require_non_empty("userId", user_id)?;
        let now = self.clock.now();
        let mut activities = self.activity.load()?;

        let activity = match activities.iter_mut().find(|a| a.user_id == user_id) {
            Some(existing) => {
                existing.session_count = existing
                    .session_count
                    .checked_add(1)
                    .ok_or_else(|| AppResponse::validation(format!("sessionCount overflow for {user_id}")))?;
                existing.total_time_spent = existing
                    .total_time_spent
                    .checked_add(session_time)
                    .ok_or_else(|| AppResponse::validation(format!("totalTimeSpent overflow for {user_id}")))?;
                existing.favorite_features.extend(features.iter().cloned());
                existing.last_active = now;
                existing.clone()
            }
            None => {
                let created = UserActivity {
                    user_id: user_id.to_string(),
                    last_active: now,
                    session_count: 1,
                    total_time_spent: session_time,
                    favorite_features: features.iter().cloned().collect(),
                };
                activities.push(created.clone());
                created
            }
        };

        self.activity.save(&activities)?;
        debug!("Tracked session {} for {}", activity.session_count, user_id);
        Ok(activity)
    }

    /// Active-user counts over the last 1, 7 and 30 days plus the mean session
    /// count (two decimals).
    pub fn calculate_engagement_metrics(&self) -> Result<EngagementMetrics, AppResponse> {
        let now = self.clock.now();
        let activities = self.activity.load()?;
        let active_within = |days: i64| {
            activities
                .iter()
                .filter(|a| now - a.last_active <= Duration::days(days))
                .count()
        };

        let average_session_count = if activities.is_empty() {
            0.0
        } else {
            let sessions: u64 = activities.iter().map(|a| a.session_count).sum();
            round_to_hundredths(sessions as f64 / activities.len() as f64)
        };

        Ok(EngagementMetrics {
            daily_active_users: active_within(1),
            weekly_active_users: active_within(7),
            monthly_active_users: active_within(30),
            average_session_count,
            total_tracked_users: activities.len(),
        })
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
