//! Typed rejection catalogue.
//!
//! Expected precondition failures are values, returned up to the handler
//! and rendered as ephemeral error embeds. Thrown (`anyhow`) errors are
//! reserved for genuinely unexpected failures (network, store) and are
//! caught at the dispatch boundary instead.

/// A user-visible reason a command was refused before doing anything.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// Command invoked outside a guild.
    GuildOnly,
    /// Actor lacks a required platform permission (human-readable name).
    MissingPermission(&'static str),
    /// The bot's own account lacks a required platform permission.
    BotMissingPermission(&'static str),
    /// Actor targeted themselves with a punitive action.
    SelfTarget(&'static str),
    /// Actor targeted the bot with a punitive action.
    BotTarget(&'static str),
    /// Target user is not a member of the guild.
    TargetNotInGuild,
    /// Actor's top role does not outrank the target's.
    HierarchyActor(&'static str),
    /// Bot's top role does not outrank the target's.
    HierarchyBot(&'static str),
    /// Mute requested for a member already timed out.
    AlreadyMuted,
    /// Unmute requested for a member with no active timeout.
    NotMuted,
    /// Duration string failed to parse or exceeds the platform maximum.
    InvalidDuration,
    /// Requester already has an open ticket (channel id of the surface).
    TicketAlreadyOpen(u64),
    /// `/close` used outside a ticket channel.
    NotATicketChannel,
    /// Closing a ticket that is already closed.
    TicketAlreadyClosed,
    /// Actor is neither the ticket owner nor staff.
    NotTicketOwnerOrStaff,
    /// Purge found no messages eligible for bulk deletion.
    NothingToDelete,
    /// A required option was not supplied.
    MissingOption(&'static str),
    /// Bot lacks permissions in the target channel.
    ChannelPermission(&'static str),
    /// Referenced settings are absent or stale.
    NotConfigured(&'static str),
}

impl Rejection {
    /// Embed title for the rejection.
    pub fn title(&self) -> &'static str {
        match self {
            Rejection::GuildOnly => "Server Only",
            Rejection::MissingPermission(_) => "Missing Permissions",
            Rejection::BotMissingPermission(_) => "Bot Missing Permissions",
            Rejection::SelfTarget(_) | Rejection::BotTarget(_) => "Invalid Target",
            Rejection::TargetNotInGuild
            | Rejection::HierarchyActor(_)
            | Rejection::HierarchyBot(_)
            | Rejection::AlreadyMuted
            | Rejection::NotMuted => "Error",
            Rejection::InvalidDuration => "Invalid Duration",
            Rejection::TicketAlreadyOpen(_) => "Ticket Already Exists",
            Rejection::NotATicketChannel
            | Rejection::TicketAlreadyClosed
            | Rejection::NotTicketOwnerOrStaff => "Error",
            Rejection::NothingToDelete => "No Messages to Delete",
            Rejection::MissingOption(_) => "Missing Option",
            Rejection::ChannelPermission(_) => "Channel Permissions",
            Rejection::NotConfigured(_) => "Not Configured",
        }
    }

    /// Embed body for the rejection.
    pub fn message(&self) -> String {
        match self {
            Rejection::GuildOnly => "This command can only be used in a server.".to_string(),
            Rejection::MissingPermission(perm) => {
                format!("You need the \"{perm}\" permission to use this command.")
            }
            Rejection::BotMissingPermission(perm) => {
                format!("I need the \"{perm}\" permission to execute this command.")
            }
            Rejection::SelfTarget(action) => format!("You cannot {action} yourself."),
            Rejection::BotTarget(action) => format!("I cannot {action} myself."),
            Rejection::TargetNotInGuild => "This user is not in the server.".to_string(),
            Rejection::HierarchyActor(action) => {
                format!("You cannot {action} a user with equal or higher role than yours.")
            }
            Rejection::HierarchyBot(action) => {
                format!("I cannot {action} this user. They may have higher permissions than me.")
            }
            Rejection::AlreadyMuted => "This user is already muted.".to_string(),
            Rejection::NotMuted => "This user is not muted.".to_string(),
            Rejection::InvalidDuration => {
                "Invalid duration. Use format like 1h, 30m, 1d (max 28 days)".to_string()
            }
            Rejection::TicketAlreadyOpen(channel_id) => {
                format!("You already have an open ticket: <#{channel_id}>")
            }
            Rejection::NotATicketChannel => {
                "This command can only be used in ticket channels.".to_string()
            }
            Rejection::TicketAlreadyClosed => "This ticket is already closed.".to_string(),
            Rejection::NotTicketOwnerOrStaff => {
                "You can only close your own tickets or you need Manage Channels permission."
                    .to_string()
            }
            Rejection::NothingToDelete => {
                "No messages found that can be deleted (messages older than 14 days cannot be bulk deleted)."
                    .to_string()
            }
            Rejection::MissingOption(option) => format!("You must specify {option}."),
            Rejection::ChannelPermission(perms) => {
                format!("I need {perms} permissions in that channel.")
            }
            Rejection::NotConfigured(what) => what.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchy_messages_name_the_action() {
        let rej = Rejection::HierarchyActor("ban");
        assert!(rej.message().contains("ban"));
        assert!(rej.message().contains("equal or higher"));
    }

    #[test]
    fn test_ticket_already_open_points_to_channel() {
        let rej = Rejection::TicketAlreadyOpen(42);
        assert!(rej.message().contains("<#42>"));
        assert_eq!(rej.title(), "Ticket Already Exists");
    }

    #[test]
    fn test_invalid_duration_mentions_limit() {
        assert!(Rejection::InvalidDuration.message().contains("28 days"));
    }
}
