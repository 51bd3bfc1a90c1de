//! # Feature: Moderation
//!
//! Business rules behind the punitive commands: precondition guards,
//! duration parsing, the audit trail and warn escalation. The serenity
//! glue (option parsing, embeds, the platform calls themselves) lives in
//! the command handler; everything that can be decided without a live
//! guild is decided here.

pub mod duration;
pub mod guards;

pub use duration::{parse_duration, MAX_TIMEOUT_MS};
pub use guards::{check_hierarchy, check_target_identity, purge_eligible, BULK_DELETE_MAX_AGE_SECS};

use crate::database::Database;
use anyhow::Result;

/// Timeout applied when a user reaches the warning threshold: 24 hours.
pub const AUTO_MUTE_MS: i64 = 24 * 60 * 60 * 1000;

/// Result of recording one warning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarnRecord {
    pub warning_id: i64,
    pub active_count: i64,
    /// True when the active count has reached the threshold and the
    /// caller should apply the automatic timeout.
    pub escalate: bool,
}

/// Store-facing half of the moderation workflow. Owns the write ordering:
/// audit rows are only appended after the platform action they record has
/// succeeded, which is why the handlers call these methods last.
#[derive(Clone)]
pub struct ModerationWorkflow {
    database: Database,
    max_warnings: i64,
}

impl ModerationWorkflow {
    pub fn new(database: Database, max_warnings: i64) -> Self {
        ModerationWorkflow {
            database,
            max_warnings,
        }
    }

    pub fn max_warnings(&self) -> i64 {
        self.max_warnings
    }

    /// Append one audit row for a completed action.
    pub async fn record_action(
        &self,
        guild_id: &str,
        user_id: &str,
        moderator_id: &str,
        action: &str,
        reason: &str,
        duration_ms: Option<i64>,
    ) -> Result<()> {
        self.database
            .add_mod_log(guild_id, user_id, moderator_id, action, reason, duration_ms)
            .await
    }

    /// Insert a warning, recompute the active count and decide escalation.
    pub async fn record_warning(
        &self,
        guild_id: &str,
        user_id: &str,
        moderator_id: &str,
        reason: &str,
    ) -> Result<WarnRecord> {
        let warning_id = self
            .database
            .add_warning(guild_id, user_id, moderator_id, reason)
            .await?;
        self.database
            .add_mod_log(guild_id, user_id, moderator_id, "warn", reason, None)
            .await?;

        let active_count = self.database.count_active_warnings(guild_id, user_id).await?;
        Ok(WarnRecord {
            warning_id,
            active_count,
            escalate: active_count >= self.max_warnings,
        })
    }

    /// Audit a successful automatic timeout. The bot itself is the
    /// moderator of record.
    pub async fn record_auto_mute(
        &self,
        guild_id: &str,
        user_id: &str,
        bot_id: &str,
    ) -> Result<()> {
        self.database
            .add_mod_log(
                guild_id,
                user_id,
                bot_id,
                "auto-mute",
                &self.escalation_reason(),
                Some(AUTO_MUTE_MS),
            )
            .await
    }

    /// Reason line used for the automatic timeout and its audit row.
    pub fn escalation_reason(&self) -> String {
        format!(
            "Automatic punishment for reaching {} warnings",
            self.max_warnings
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> ModerationWorkflow {
        ModerationWorkflow::new(Database::open_in_memory().unwrap(), 3)
    }

    #[tokio::test]
    async fn test_no_escalation_below_threshold() {
        let workflow = workflow();

        let first = workflow.record_warning("g1", "u1", "m1", "spam").await.unwrap();
        assert_eq!(first.active_count, 1);
        assert!(!first.escalate);

        let second = workflow.record_warning("g1", "u1", "m1", "spam").await.unwrap();
        assert_eq!(second.active_count, 2);
        assert!(!second.escalate);
    }

    #[tokio::test]
    async fn test_escalation_at_threshold() {
        let workflow = workflow();
        workflow.record_warning("g1", "u1", "m1", "one").await.unwrap();
        workflow.record_warning("g1", "u1", "m1", "two").await.unwrap();
        let third = workflow.record_warning("g1", "u1", "m1", "three").await.unwrap();

        assert_eq!(third.active_count, 3);
        assert!(third.escalate);
    }

    #[tokio::test]
    async fn test_audit_trail_after_escalation() {
        let workflow = workflow();
        let db = workflow.database.clone();

        for reason in ["one", "two", "three"] {
            let record = workflow.record_warning("g1", "u1", "m1", reason).await.unwrap();
            if record.escalate {
                workflow.record_auto_mute("g1", "u1", "bot").await.unwrap();
            }
        }

        // Three warn rows plus exactly one auto-mute row.
        assert_eq!(db.count_mod_logs("g1", "u1", "warn").await.unwrap(), 3);
        assert_eq!(db.count_mod_logs("g1", "u1", "auto-mute").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_warnings_scoped_per_guild_and_user() {
        let workflow = workflow();
        workflow.record_warning("g1", "u1", "m1", "a").await.unwrap();
        workflow.record_warning("g1", "u2", "m1", "b").await.unwrap();
        let other_guild = workflow.record_warning("g2", "u1", "m1", "c").await.unwrap();

        assert_eq!(other_guild.active_count, 1);
    }

    #[test]
    fn test_escalation_reason_names_threshold() {
        let workflow = workflow();
        assert_eq!(
            workflow.escalation_reason(),
            "Automatic punishment for reaching 3 warnings"
        );
    }
}
