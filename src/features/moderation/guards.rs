//! Pure precondition guards for punitive actions.
//!
//! Kept free of serenity types so the hierarchy and purge rules are
//! testable with plain values; the handler layer extracts positions and
//! timestamps from the live guild before calling in.

use crate::core::Rejection;

/// Self-target and bot-target are always refused for punitive actions.
pub fn check_target_identity(
    action: &'static str,
    actor_id: u64,
    bot_id: u64,
    target_id: u64,
) -> Result<(), Rejection> {
    if target_id == actor_id {
        return Err(Rejection::SelfTarget(action));
    }
    if target_id == bot_id {
        return Err(Rejection::BotTarget(action));
    }
    Ok(())
}

/// Actor must strictly outrank the target (equal rank is rejected), and
/// the bot must strictly outrank the target for the platform to deliver
/// the action at all.
pub fn check_hierarchy(
    action: &'static str,
    actor_top_role: i64,
    bot_top_role: i64,
    target_top_role: i64,
) -> Result<(), Rejection> {
    if actor_top_role <= target_top_role {
        return Err(Rejection::HierarchyActor(action));
    }
    if bot_top_role <= target_top_role {
        return Err(Rejection::HierarchyBot(action));
    }
    Ok(())
}

/// Bulk delete cannot touch messages older than 14 days.
pub const BULK_DELETE_MAX_AGE_SECS: i64 = 14 * 24 * 60 * 60;

/// Filter message (id, created_at) pairs down to the bulk-deletable set:
/// newest first, at most `amount`, nothing older than the 14-day cutoff.
pub fn purge_eligible(
    mut messages: Vec<(u64, i64)>,
    amount: usize,
    now_secs: i64,
) -> Vec<u64> {
    let cutoff = now_secs - BULK_DELETE_MAX_AGE_SECS;
    messages.sort_by(|a, b| b.1.cmp(&a.1));
    messages
        .into_iter()
        .take(amount)
        .filter(|&(_, created_at)| created_at > cutoff)
        .map(|(id, _)| id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_and_bot_target_rejected() {
        assert_eq!(
            check_target_identity("ban", 1, 2, 1),
            Err(Rejection::SelfTarget("ban"))
        );
        assert_eq!(
            check_target_identity("ban", 1, 2, 2),
            Err(Rejection::BotTarget("ban"))
        );
        assert!(check_target_identity("ban", 1, 2, 3).is_ok());
    }

    #[test]
    fn test_equal_rank_rejected() {
        // Equal actor/target rank is a rejection regardless of the action.
        for action in ["ban", "kick", "mute", "warn"] {
            assert_eq!(
                check_hierarchy(action, 5, 10, 5),
                Err(Rejection::HierarchyActor(action))
            );
        }
    }

    #[test]
    fn test_lower_rank_rejected() {
        assert_eq!(
            check_hierarchy("kick", 3, 10, 5),
            Err(Rejection::HierarchyActor("kick"))
        );
    }

    #[test]
    fn test_bot_rank_must_exceed_target() {
        assert_eq!(
            check_hierarchy("mute", 10, 5, 5),
            Err(Rejection::HierarchyBot("mute"))
        );
        assert!(check_hierarchy("mute", 10, 6, 5).is_ok());
    }

    #[test]
    fn test_purge_respects_amount_and_cutoff() {
        let now = 10_000_000;
        let old = now - BULK_DELETE_MAX_AGE_SECS - 100;
        let mut messages = Vec::new();
        // 40 recent, 10 ancient mixed in as the most recent would be wrong,
        // so make the ancient ones the oldest.
        for id in 0..40u64 {
            messages.push((id, now - id as i64));
        }
        for id in 40..50u64 {
            messages.push((id, old));
        }

        let eligible = purge_eligible(messages, 50, now);
        assert_eq!(eligible.len(), 40);
        assert!(eligible.iter().all(|id| *id < 40));
    }

    #[test]
    fn test_purge_empty_when_all_too_old() {
        let now = 10_000_000;
        let old = now - BULK_DELETE_MAX_AGE_SECS - 1;
        let messages = vec![(1, old), (2, old)];
        assert!(purge_eligible(messages, 10, now).is_empty());
    }

    #[test]
    fn test_purge_takes_newest_first() {
        let now = 1_000_000;
        let messages = vec![(1, now - 30), (2, now - 10), (3, now - 20)];
        let eligible = purge_eligible(messages, 2, now);
        assert_eq!(eligible, vec![2, 3]);
    }
}
