//! Command handler registry and the static command metadata table.

use serenity::model::permissions::Permissions;
use std::collections::HashMap;
use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Help/permission grouping for a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandCategory {
    Moderation,
    Admin,
    Support,
    Utility,
}

impl CommandCategory {
    pub fn label(self) -> &'static str {
        match self {
            CommandCategory::Moderation => "Moderation",
            CommandCategory::Admin => "Admin",
            CommandCategory::Support => "Support",
            CommandCategory::Utility => "Utility",
        }
    }

    pub fn all() -> &'static [CommandCategory] {
        &[
            CommandCategory::Moderation,
            CommandCategory::Admin,
            CommandCategory::Support,
            CommandCategory::Utility,
        ]
    }
}

/// Static command metadata: category, one-line summary, and the actor
/// permission the dispatcher enforces (`None` means open to everyone).
/// Built at compile time rather than inferred from the module layout.
pub struct CommandMeta {
    pub name: &'static str,
    pub category: CommandCategory,
    pub summary: &'static str,
    pub required_permission: Option<(Permissions, &'static str)>,
}

pub const COMMAND_TABLE: &[CommandMeta] = &[
    CommandMeta {
        name: "ban",
        category: CommandCategory::Moderation,
        summary: "Ban a user from the server",
        required_permission: Some((Permissions::BAN_MEMBERS, "Ban Members")),
    },
    CommandMeta {
        name: "kick",
        category: CommandCategory::Moderation,
        summary: "Kick a user from the server",
        required_permission: Some((Permissions::KICK_MEMBERS, "Kick Members")),
    },
    CommandMeta {
        name: "mute",
        category: CommandCategory::Moderation,
        summary: "Timeout a user",
        required_permission: Some((Permissions::MODERATE_MEMBERS, "Moderate Members")),
    },
    CommandMeta {
        name: "unmute",
        category: CommandCategory::Moderation,
        summary: "Remove a user's timeout",
        required_permission: Some((Permissions::MODERATE_MEMBERS, "Moderate Members")),
    },
    CommandMeta {
        name: "warn",
        category: CommandCategory::Moderation,
        summary: "Warn a user",
        required_permission: Some((Permissions::MODERATE_MEMBERS, "Moderate Members")),
    },
    CommandMeta {
        name: "purge",
        category: CommandCategory::Moderation,
        summary: "Bulk delete recent messages",
        required_permission: Some((Permissions::MANAGE_MESSAGES, "Manage Messages")),
    },
    CommandMeta {
        name: "slowmode",
        category: CommandCategory::Moderation,
        summary: "Set the channel slowmode interval",
        required_permission: Some((Permissions::MANAGE_CHANNELS, "Manage Channels")),
    },
    CommandMeta {
        name: "autorole",
        category: CommandCategory::Admin,
        summary: "Manage roles granted to new members",
        required_permission: Some((Permissions::MANAGE_ROLES, "Manage Roles")),
    },
    CommandMeta {
        name: "welcome",
        category: CommandCategory::Admin,
        summary: "Configure the welcome message",
        required_permission: Some((Permissions::MANAGE_GUILD, "Manage Server")),
    },
    CommandMeta {
        name: "logs",
        category: CommandCategory::Admin,
        summary: "Configure logging channels",
        required_permission: Some((Permissions::MANAGE_GUILD, "Manage Server")),
    },
    CommandMeta {
        name: "setup",
        category: CommandCategory::Admin,
        summary: "Set up the ticket system",
        required_permission: Some((Permissions::MANAGE_GUILD, "Manage Server")),
    },
    CommandMeta {
        name: "embed",
        category: CommandCategory::Admin,
        summary: "Build and post a custom embed",
        required_permission: Some((Permissions::MANAGE_MESSAGES, "Manage Messages")),
    },
    CommandMeta {
        name: "ticket",
        category: CommandCategory::Support,
        summary: "Open a support ticket",
        required_permission: None,
    },
    CommandMeta {
        name: "close",
        category: CommandCategory::Support,
        summary: "Close the current ticket",
        required_permission: None,
    },
    CommandMeta {
        name: "help",
        category: CommandCategory::Utility,
        summary: "Show the command list",
        required_permission: None,
    },
    CommandMeta {
        name: "faq",
        category: CommandCategory::Utility,
        summary: "Frequently asked questions",
        required_permission: None,
    },
    CommandMeta {
        name: "ping",
        category: CommandCategory::Utility,
        summary: "Check bot responsiveness",
        required_permission: None,
    },
    CommandMeta {
        name: "avatar",
        category: CommandCategory::Utility,
        summary: "Show a user's avatar",
        required_permission: None,
    },
    CommandMeta {
        name: "serverinfo",
        category: CommandCategory::Utility,
        summary: "Show information about this server",
        required_permission: None,
    },
    CommandMeta {
        name: "userinfo",
        category: CommandCategory::Utility,
        summary: "Show information about a user",
        required_permission: None,
    },
];

/// Metadata row for a command name.
pub fn command_meta(name: &str) -> Option<&'static CommandMeta> {
    COMMAND_TABLE.iter().find(|meta| meta.name == name)
}

/// Commands belonging to a category, in table order.
pub fn commands_in_category(category: CommandCategory) -> Vec<&'static CommandMeta> {
    COMMAND_TABLE
        .iter()
        .filter(|meta| meta.category == category)
        .collect()
}

/// Registry mapping command names to handlers
///
/// Multiple command names can map to the same handler if they share logic.
#[derive(Clone)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn SlashCommandHandler>>,
}

impl CommandRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register a handler for its declared command names
    pub fn register(&mut self, handler: Arc<dyn SlashCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    /// Get handler for a command name
    pub fn get(&self, name: &str) -> Option<Arc<dyn SlashCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    /// Check if a command is registered
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Number of registered command names
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Get all registered command names
    pub fn command_names(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::CommandContext;
    use anyhow::Result;
    use async_trait::async_trait;
    use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
    use serenity::prelude::Context;

    struct MockHandler {
        names: &'static [&'static str],
    }

    #[async_trait]
    impl SlashCommandHandler for MockHandler {
        fn command_names(&self) -> &'static [&'static str] {
            self.names
        }

        async fn handle(
            &self,
            _ctx: Arc<CommandContext>,
            _serenity_ctx: &Context,
            _command: &ApplicationCommandInteraction,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_registry_new_is_empty() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_registry_register_single() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler { names: &["ping"] }));

        assert!(!registry.is_empty());
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("ping"));
        assert!(!registry.contains("pong"));
    }

    #[test]
    fn test_registry_register_multiple_names() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler {
            names: &["ban", "kick", "mute"],
        }));

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("ban"));
        assert!(registry.contains("kick"));
        assert!(registry.contains("mute"));
    }

    #[test]
    fn test_registry_get_returns_handler() {
        let mut registry = CommandRegistry::new();
        registry.register(Arc::new(MockHandler { names: &["ticket"] }));

        assert!(registry.get("ticket").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_command_table_covers_every_category() {
        for category in CommandCategory::all() {
            assert!(
                !commands_in_category(*category).is_empty(),
                "no commands in category {}",
                category.label()
            );
        }
    }

    #[test]
    fn test_command_meta_lookup() {
        let meta = command_meta("ban").unwrap();
        assert_eq!(meta.category, CommandCategory::Moderation);
        assert!(meta.required_permission.is_some());

        let open = command_meta("ping").unwrap();
        assert!(open.required_permission.is_none());

        assert!(command_meta("definitely_not_a_command").is_none());
    }

    #[test]
    fn test_command_table_names_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for meta in COMMAND_TABLE {
            assert!(seen.insert(meta.name), "duplicate entry: {}", meta.name);
        }
    }
}
