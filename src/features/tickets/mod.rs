//! # Feature: Tickets
//!
//! Ticket lifecycle rules: one open ticket per requester, owner-or-staff
//! close, stale-surface reconciliation and transcript rendering. Surface
//! creation (channels, overwrites) stays in the command handler; the
//! decisions live here against the store.

pub mod transcript;

pub use transcript::{render_transcript, TranscriptEntry, TranscriptHeader};

use crate::core::Rejection;
use crate::database::{Database, Ticket, TicketInsert};
use anyhow::Result;
use log::info;

/// Seconds the closing notice stays readable before the surface is deleted.
pub const CLOSE_DELETE_DELAY_SECS: u64 = 10;

/// What the create guard decided about an existing open ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateGuard {
    /// No open ticket; proceed with surface creation.
    Clear,
    /// Open ticket whose surface still resolves; reject with a pointer.
    Blocked(Rejection),
    /// Open ticket pointed at a deleted surface; the row was reconciled
    /// (closed by the system) and creation may proceed.
    Reconciled,
}

#[derive(Clone)]
pub struct TicketWorkflow {
    database: Database,
}

impl TicketWorkflow {
    pub fn new(database: Database) -> Self {
        TicketWorkflow { database }
    }

    /// Create-side guard. `surface_resolves` reports whether the existing
    /// open ticket's channel still exists on the platform; stale rows are
    /// repaired here so every dereference site shares one reconciliation
    /// path.
    pub async fn guard_create(
        &self,
        guild_id: &str,
        user_id: &str,
        surface_resolves: impl FnOnce(&str) -> bool,
    ) -> Result<CreateGuard> {
        let Some(existing) = self
            .database
            .get_open_ticket_for_user(guild_id, user_id)
            .await?
        else {
            return Ok(CreateGuard::Clear);
        };

        if surface_resolves(&existing.channel_id) {
            let channel_id = existing.channel_id.parse::<u64>().unwrap_or_default();
            return Ok(CreateGuard::Blocked(Rejection::TicketAlreadyOpen(channel_id)));
        }

        info!(
            "Reconciling stale ticket {} (guild {guild_id}, channel {} gone)",
            existing.id, existing.channel_id
        );
        self.database
            .close_ticket(&existing.channel_id, "system", Some("ticket channel deleted"))
            .await?;
        Ok(CreateGuard::Reconciled)
    }

    /// Persist the open ticket row once the surface exists. A store-level
    /// uniqueness rejection (two creates racing) is mapped back to the
    /// "already exists" rejection instead of an error.
    pub async fn open(
        &self,
        guild_id: &str,
        channel_id: &str,
        user_id: &str,
        reason: Option<&str>,
    ) -> Result<Result<i64, Rejection>> {
        match self
            .database
            .create_ticket(guild_id, channel_id, user_id, reason)
            .await?
        {
            TicketInsert::Created(id) => Ok(Ok(id)),
            TicketInsert::AlreadyOpen => {
                let existing = self
                    .database
                    .get_open_ticket_for_user(guild_id, user_id)
                    .await?;
                let channel = existing
                    .map(|t| t.channel_id.parse::<u64>().unwrap_or_default())
                    .unwrap_or_default();
                Ok(Err(Rejection::TicketAlreadyOpen(channel)))
            }
        }
    }

    /// Close-side guard plus the store mutation. Returns the ticket row as
    /// it was before closing so the handler can address the requester.
    pub async fn close(
        &self,
        channel_id: &str,
        actor_id: &str,
        actor_is_staff: bool,
        reason: &str,
    ) -> Result<Result<Ticket, Rejection>> {
        let Some(ticket) = self.database.get_open_ticket_by_channel(channel_id).await? else {
            // Distinguish "never a ticket" from "already closed".
            return match self.database.get_ticket_by_channel(channel_id).await? {
                Some(_) => Ok(Err(Rejection::TicketAlreadyClosed)),
                None => Ok(Err(Rejection::NotATicketChannel)),
            };
        };

        if ticket.user_id != actor_id && !actor_is_staff {
            return Ok(Err(Rejection::NotTicketOwnerOrStaff));
        }

        if !self.database.close_ticket(channel_id, actor_id, Some(reason)).await? {
            // Lost a race with another closer.
            return Ok(Err(Rejection::TicketAlreadyClosed));
        }
        Ok(Ok(ticket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> TicketWorkflow {
        TicketWorkflow::new(Database::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_guard_clear_when_no_ticket() {
        let workflow = workflow();
        let guard = workflow.guard_create("g1", "u1", |_| true).await.unwrap();
        assert_eq!(guard, CreateGuard::Clear);
    }

    #[tokio::test]
    async fn test_guard_blocks_when_surface_resolves() {
        let workflow = workflow();
        workflow.open("g1", "100", "u1", Some("help")).await.unwrap().unwrap();

        let guard = workflow.guard_create("g1", "u1", |_| true).await.unwrap();
        assert_eq!(
            guard,
            CreateGuard::Blocked(Rejection::TicketAlreadyOpen(100))
        );
    }

    #[tokio::test]
    async fn test_guard_reconciles_stale_row() {
        let workflow = workflow();
        workflow.open("g1", "100", "u1", None).await.unwrap().unwrap();

        let guard = workflow.guard_create("g1", "u1", |_| false).await.unwrap();
        assert_eq!(guard, CreateGuard::Reconciled);

        // The stale row is now closed and a fresh create goes through.
        let reopened = workflow.open("g1", "200", "u1", None).await.unwrap();
        assert!(reopened.is_ok());
    }

    #[tokio::test]
    async fn test_racing_open_maps_to_already_exists() {
        let workflow = workflow();
        workflow.open("g1", "100", "u1", None).await.unwrap().unwrap();

        // Simulates the loser of a create race hitting the unique index.
        let second = workflow.open("g1", "200", "u1", None).await.unwrap();
        assert_eq!(second, Err(Rejection::TicketAlreadyOpen(100)));
    }

    #[tokio::test]
    async fn test_close_owner_or_staff_only() {
        let workflow = workflow();
        workflow.open("g1", "100", "u1", None).await.unwrap().unwrap();

        let stranger = workflow.close("100", "u2", false, "nope").await.unwrap();
        assert_eq!(stranger, Err(Rejection::NotTicketOwnerOrStaff));

        let staff = workflow.close("100", "u2", true, "done").await.unwrap();
        assert!(staff.is_ok());
    }

    #[tokio::test]
    async fn test_close_twice_rejected() {
        let workflow = workflow();
        workflow.open("g1", "100", "u1", None).await.unwrap().unwrap();
        workflow.close("100", "u1", false, "done").await.unwrap().unwrap();

        let again = workflow.close("100", "u1", false, "done").await.unwrap();
        assert_eq!(again, Err(Rejection::TicketAlreadyClosed));
    }

    #[tokio::test]
    async fn test_close_outside_ticket_channel() {
        let workflow = workflow();
        let result = workflow.close("999", "u1", true, "x").await.unwrap();
        assert_eq!(result, Err(Rejection::NotATicketChannel));
    }
}
