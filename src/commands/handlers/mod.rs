//! Per-command handler implementations

pub mod admin;
pub mod moderation;
pub mod support;
pub mod utility;

use std::sync::Arc;

use super::handler::SlashCommandHandler;

/// Create all registered command handlers
///
/// Returns a vector of handlers ready to be registered with CommandRegistry.
pub fn create_all_handlers() -> Vec<Arc<dyn SlashCommandHandler>> {
    vec![
        Arc::new(moderation::ModerationHandler),
        Arc::new(admin::AdminHandler),
        Arc::new(support::SupportHandler),
        Arc::new(utility::UtilityHandler),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::registry::{CommandRegistry, COMMAND_TABLE};

    #[test]
    fn test_every_table_entry_has_a_handler() {
        let mut registry = CommandRegistry::new();
        for handler in create_all_handlers() {
            registry.register(handler);
        }

        for meta in COMMAND_TABLE {
            assert!(
                registry.contains(meta.name),
                "no handler registered for /{}",
                meta.name
            );
        }
        assert_eq!(registry.len(), COMMAND_TABLE.len());
    }
}
