use std::collections::HashMap;

use chrono::{Duration, Utc};
use smartcheques_core::{Timestamp, UserId};
use tokio::sync::RwLock;

struct Window {
    started_at: Timestamp,
    count: u32,
}

/// Per-user hourly/daily send counters. A breached window blocks further
/// sends until it rolls over; it never queues or retries the suppressed send.
pub struct Throttle {
    max_per_hour: u32,
    max_per_day: u32,
    hourly: RwLock<HashMap<UserId, Window>>,
    daily: RwLock<HashMap<UserId, Window>>,
}

impl Throttle {
    pub fn new(max_per_hour: u32, max_per_day: u32) -> Self {
        Self { max_per_hour, max_per_day, hourly: RwLock::new(HashMap::new()), daily: RwLock::new(HashMap::new()) }
    }

    /// Returns true if the send is allowed, and records it against both
    /// windows. Returns false (and records nothing) if either is exhausted.
    pub async fn allow(&self, user_id: UserId) -> bool {
        let now = Utc::now();
        let mut hourly = self.hourly.write().await;
        let mut daily = self.daily.write().await;

        let hour_window = hourly.entry(user_id).or_insert(Window { started_at: now, count: 0 });
        if now - hour_window.started_at >= Duration::hours(1) {
            hour_window.started_at = now;
            hour_window.count = 0;
        }
        let day_window = daily.entry(user_id).or_insert(Window { started_at: now, count: 0 });
        if now - day_window.started_at >= Duration::days(1) {
            day_window.started_at = now;
            day_window.count = 0;
        }

        if hour_window.count >= self.max_per_hour || day_window.count >= self.max_per_day {
            return false;
        }
        hour_window.count += 1;
        day_window.count += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_once_hourly_cap_reached() {
        let throttle = Throttle::new(2, 100);
        let user = UserId::new();
        assert!(throttle.allow(user).await);
        assert!(throttle.allow(user).await);
        assert!(!throttle.allow(user).await);
    }

    #[tokio::test]
    async fn distinct_users_have_independent_budgets() {
        let throttle = Throttle::new(1, 100);
        let a = UserId::new();
        let b = UserId::new();
        assert!(throttle.allow(a).await);
        assert!(throttle.allow(b).await);
    }
}
