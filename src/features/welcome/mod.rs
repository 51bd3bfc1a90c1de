//! # Feature: Welcome / Auto-Role
//!
//! Member-join handling: the welcome message (template substitution plus
//! optional card image) and batched auto-role assignment. The two steps
//! are independent; neither failure is surfaced to the new member.

pub mod image;

pub use image::{card_filename, fetch_welcome_card};

use crate::database::Database;
use anyhow::Result;
use log::{info, warn};

/// Default template used when an operator enables welcomes without a
/// custom message.
pub const DEFAULT_WELCOME_MESSAGE: &str =
    "Welcome to the server, {user}! Please read the rules and enjoy your stay.";

/// Substitute the `{user}` placeholder with a member mention.
pub fn render_welcome(template: &str, user_id: u64) -> String {
    template.replace("{user}", &format!("<@{user_id}>"))
}

/// Live state of a configured auto-role, extracted from the guild cache.
#[derive(Clone, Copy, Debug)]
pub struct RoleInfo {
    pub managed: bool,
    pub position: i64,
}

/// Why a configured role was not granted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Role no longer exists; the config row was deleted.
    Deleted,
    /// Integration-owned role that cannot be manually assigned.
    Managed,
    /// Role is not strictly below the bot's top role.
    AboveBot,
}

/// Grant plan for one member join.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AutoRolePlan {
    pub grant: Vec<u64>,
    pub skipped: Vec<(String, SkipReason)>,
}

#[derive(Clone)]
pub struct WelcomeWorkflow {
    database: Database,
}

impl WelcomeWorkflow {
    pub fn new(database: Database) -> Self {
        WelcomeWorkflow { database }
    }

    /// Partition the configured auto-roles into grantable and skipped,
    /// lazily deleting rows whose role is gone from the platform.
    ///
    /// `resolve` looks a role id up in the live guild; `None` means the
    /// role no longer exists.
    pub async fn plan_auto_roles(
        &self,
        guild_id: &str,
        bot_top_role: i64,
        resolve: impl Fn(&str) -> Option<RoleInfo>,
    ) -> Result<AutoRolePlan> {
        let mut plan = AutoRolePlan::default();

        for role_id in self.database.get_auto_roles(guild_id).await? {
            match resolve(&role_id) {
                None => {
                    warn!("Auto-role {role_id} not found in guild {guild_id}, dropping config row");
                    self.database.remove_auto_role(guild_id, &role_id).await?;
                    plan.skipped.push((role_id, SkipReason::Deleted));
                }
                Some(info) if info.managed => {
                    warn!("Auto-role {role_id} in guild {guild_id} is managed, skipping");
                    plan.skipped.push((role_id, SkipReason::Managed));
                }
                Some(info) if info.position >= bot_top_role => {
                    warn!("Auto-role {role_id} in guild {guild_id} outranks the bot, skipping");
                    plan.skipped.push((role_id, SkipReason::AboveBot));
                }
                Some(_) => {
                    if let Ok(id) = role_id.parse::<u64>() {
                        plan.grant.push(id);
                    }
                }
            }
        }

        if !plan.grant.is_empty() {
            info!(
                "Auto-role plan for guild {guild_id}: granting {} role(s), skipping {}",
                plan.grant.len(),
                plan.skipped.len()
            );
        }
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_welcome_substitutes_mention() {
        let out = render_welcome("Hello {user}, welcome!", 42);
        assert_eq!(out, "Hello <@42>, welcome!");
    }

    #[test]
    fn test_render_welcome_without_placeholder() {
        assert_eq!(render_welcome("Hi there", 42), "Hi there");
    }

    #[tokio::test]
    async fn test_plan_grants_only_assignable_roles() {
        let db = Database::open_in_memory().unwrap();
        db.add_auto_role("g1", "1").await.unwrap(); // fine
        db.add_auto_role("g1", "2").await.unwrap(); // managed
        db.add_auto_role("g1", "3").await.unwrap(); // above bot
        db.add_auto_role("g1", "4").await.unwrap(); // deleted

        let workflow = WelcomeWorkflow::new(db.clone());
        let plan = workflow
            .plan_auto_roles("g1", 10, |role_id| match role_id {
                "1" => Some(RoleInfo { managed: false, position: 5 }),
                "2" => Some(RoleInfo { managed: true, position: 5 }),
                "3" => Some(RoleInfo { managed: false, position: 10 }),
                _ => None,
            })
            .await
            .unwrap();

        assert_eq!(plan.grant, vec![1]);
        assert_eq!(plan.skipped.len(), 3);
        assert!(plan
            .skipped
            .contains(&("2".to_string(), SkipReason::Managed)));
        assert!(plan
            .skipped
            .contains(&("3".to_string(), SkipReason::AboveBot)));
        assert!(plan
            .skipped
            .contains(&("4".to_string(), SkipReason::Deleted)));

        // Stale row was lazily deleted.
        assert_eq!(db.get_auto_roles("g1").await.unwrap(), vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_plan_empty_when_nothing_configured() {
        let workflow = WelcomeWorkflow::new(Database::open_in_memory().unwrap());
        let plan = workflow
            .plan_auto_roles("g1", 10, |_| None)
            .await
            .unwrap();
        assert!(plan.grant.is_empty());
        assert!(plan.skipped.is_empty());
    }
}
