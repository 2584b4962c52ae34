// SPDX-FileCopyrightText: 2026 Replywise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Monthly reply quota gate.
//!
//! The guard reads the user's plan and the derived usage counter, then
//! compares. It does not reserve: two concurrent generations for the same
//! user may both pass a check taken at `limit - 1`. That overrun is
//! bounded by the number of in-flight generations.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use replywise_config::model::QuotaConfig;
use replywise_core::time::month_start;
use replywise_core::types::{QuotaCheck, QuotaLimit};
use replywise_core::{ReplywiseError, UsageLedger};
use tracing::{debug, warn};

/// Fraction of the allowance at which a warning is logged.
const WARN_RATIO: f64 = 0.8;

pub struct QuotaGuard {
    ledger: Arc<dyn UsageLedger>,
    default_limit: QuotaLimit,
}

impl QuotaGuard {
    /// `default_limit` applies to users with no stored plan.
    pub fn new(ledger: Arc<dyn UsageLedger>, default_limit: QuotaLimit) -> Self {
        Self {
            ledger,
            default_limit,
        }
    }

    pub fn from_config(
        ledger: Arc<dyn UsageLedger>,
        config: &QuotaConfig,
    ) -> Result<Self, ReplywiseError> {
        Ok(Self::new(
            ledger,
            QuotaLimit::from_sentinel(config.default_monthly_limit)?,
        ))
    }

    /// The limit in force for `user_id`.
    pub async fn limit_for(&self, user_id: &str) -> Result<QuotaLimit, ReplywiseError> {
        match self.ledger.monthly_limit(user_id).await? {
            Some(stored) => QuotaLimit::from_sentinel(stored),
            None => Ok(self.default_limit),
        }
    }

    /// Checks the user's allowance for the current calendar month (UTC).
    pub async fn check(&self, user_id: &str) -> Result<QuotaCheck, ReplywiseError> {
        self.check_at(user_id, Utc::now()).await
    }

    /// Same as [`QuotaGuard::check`] with an explicit clock.
    ///
    /// Unlimited plans return without counting usage.
    pub async fn check_at(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<QuotaCheck, ReplywiseError> {
        let limit = self.limit_for(user_id).await?;
        let max = match limit {
            QuotaLimit::Unlimited => {
                return Ok(QuotaCheck {
                    allowed: true,
                    current_count: 0,
                    limit,
                });
            }
            QuotaLimit::Monthly(max) => max,
        };

        let since = month_start(now);
        let current_count = self.ledger.count_quota_usage(user_id, &since).await?;
        let allowed = current_count < u64::from(max);

        if !allowed {
            warn!(user_id, current_count, limit = max, "monthly reply quota exhausted");
        } else if current_count as f64 >= f64::from(max) * WARN_RATIO {
            warn!(
                user_id,
                current_count,
                limit = max,
                "approaching monthly reply quota (80%+)"
            );
        } else {
            debug!(user_id, current_count, limit = max, "quota check passed");
        }

        Ok(QuotaCheck {
            allowed,
            current_count,
            limit,
        })
    }

    /// Like [`QuotaGuard::check`], but a blocked check is returned as
    /// [`ReplywiseError::QuotaExceeded`].
    pub async fn ensure(&self, user_id: &str) -> Result<QuotaCheck, ReplywiseError> {
        let check = self.check(user_id).await?;
        match (check.allowed, check.limit) {
            (false, QuotaLimit::Monthly(limit)) => Err(ReplywiseError::QuotaExceeded {
                current: check.current_count,
                limit,
            }),
            _ => Ok(check),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Ledger stub that records how often usage is counted.
    struct StubLedger {
        limit: Option<i64>,
        usage: u64,
        count_calls: AtomicUsize,
        last_since: Mutex<Option<String>>,
    }

    impl StubLedger {
        fn new(limit: Option<i64>, usage: u64) -> Arc<Self> {
            Arc::new(Self {
                limit,
                usage,
                count_calls: AtomicUsize::new(0),
                last_since: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl UsageLedger for StubLedger {
        async fn monthly_limit(&self, _user_id: &str) -> Result<Option<i64>, ReplywiseError> {
            Ok(self.limit)
        }

        async fn count_quota_usage(
            &self,
            _user_id: &str,
            since: &str,
        ) -> Result<u64, ReplywiseError> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_since.lock().unwrap() = Some(since.to_string());
            Ok(self.usage)
        }
    }

    fn guard(ledger: Arc<StubLedger>) -> QuotaGuard {
        QuotaGuard::new(ledger, QuotaLimit::Monthly(50))
    }

    #[tokio::test]
    async fn below_limit_is_allowed() {
        let check = guard(StubLedger::new(Some(5), 4)).check("u1").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.current_count, 4);
        assert_eq!(check.limit, QuotaLimit::Monthly(5));
    }

    #[tokio::test]
    async fn exactly_at_limit_blocks() {
        let check = guard(StubLedger::new(Some(5), 5)).check("u1").await.unwrap();
        assert!(!check.allowed);
    }

    #[tokio::test]
    async fn zero_limit_blocks_everything() {
        let check = guard(StubLedger::new(Some(0), 0)).check("u1").await.unwrap();
        assert!(!check.allowed);
    }

    #[tokio::test]
    async fn unlimited_never_counts() {
        let ledger = StubLedger::new(Some(-1), 10_000);
        let check = guard(ledger.clone()).check("u1").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.limit, QuotaLimit::Unlimited);
        assert_eq!(ledger.count_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_plan_uses_default() {
        let check = guard(StubLedger::new(None, 49)).check("u1").await.unwrap();
        assert!(check.allowed);
        assert_eq!(check.limit, QuotaLimit::Monthly(50));
    }

    #[tokio::test]
    async fn invalid_stored_limit_is_config_error() {
        let err = guard(StubLedger::new(Some(-7), 0)).check("u1").await.unwrap_err();
        assert!(matches!(err, ReplywiseError::Config(_)));
    }

    #[tokio::test]
    async fn window_starts_at_first_of_month() {
        let ledger = StubLedger::new(Some(5), 1);
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 15, 30, 0).unwrap();
        guard(ledger.clone()).check_at("u1", now).await.unwrap();
        assert_eq!(
            ledger.last_since.lock().unwrap().as_deref(),
            Some("2026-03-01T00:00:00.000Z")
        );
    }

    #[tokio::test]
    async fn ensure_maps_block_to_error() {
        let err = guard(StubLedger::new(Some(3), 3)).ensure("u1").await.unwrap_err();
        match err {
            ReplywiseError::QuotaExceeded { current, limit } => {
                assert_eq!(current, 3);
                assert_eq!(limit, 3);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn warns_near_the_limit() {
        guard(StubLedger::new(Some(10), 8)).check("u1").await.unwrap();
        assert!(logs_contain("approaching monthly reply quota"));
    }
}
