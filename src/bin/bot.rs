use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::guild::Member;
use serenity::model::id::{GuildId, RoleId};
use serenity::model::user::User;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use sentinel::commands::context::mirror_to_channel;
use sentinel::commands::handlers::admin::post_welcome;
use sentinel::commands::handlers::moderation::user_tag;
use sentinel::commands::handlers::{create_all_handlers, support, utility};
use sentinel::commands::{
    register_global_commands, register_guild_commands, CommandContext, CommandDispatcher,
    CommandRegistry,
};
use sentinel::core::{info_embed, Config};
use sentinel::database::Database;
use sentinel::features::welcome::RoleInfo;
use sentinel::features::{ModerationWorkflow, RateLimiter, TicketWorkflow, WelcomeWorkflow};
use sentinel::health::{self, HealthState};

struct Handler {
    dispatcher: Arc<CommandDispatcher>,
    context: Arc<CommandContext>,
    guild_id: Option<GuildId>,
    health: Arc<HealthState>,
}

impl Handler {
    /// Welcome message, auto-role grants and the member-log mirror for one
    /// join event. Each step is independent; failures are logged and never
    /// surfaced to the new member.
    async fn run_member_join(&self, ctx: &Context, member: &mut Member) {
        let guild_key = member.guild_id.to_string();

        if let Err(e) = post_welcome(&self.context, ctx, &guild_key, &member.user).await {
            warn!("Welcome message failed for guild {guild_key}: {e}");
        }

        if let Err(e) = self.grant_auto_roles(ctx, member).await {
            warn!("Auto-role grant failed for guild {guild_key}: {e}");
        }

        self.mirror_member_join(ctx, &guild_key, &member.user).await;
    }

    async fn grant_auto_roles(&self, ctx: &Context, member: &mut Member) -> Result<()> {
        let Some(guild) = ctx.cache.guild(member.guild_id) else {
            return Ok(());
        };
        let bot_id = ctx.cache.current_user_id();
        let bot_member = member.guild_id.member(&ctx.http, bot_id).await?;
        let bot_top_role = bot_member
            .roles
            .iter()
            .filter_map(|id| guild.roles.get(id))
            .map(|role| role.position)
            .max()
            .unwrap_or(0);

        let plan = self
            .context
            .welcome
            .plan_auto_roles(&member.guild_id.to_string(), bot_top_role, |role_id| {
                role_id
                    .parse::<u64>()
                    .ok()
                    .and_then(|id| guild.roles.get(&RoleId(id)))
                    .map(|role| RoleInfo {
                        managed: role.managed,
                        position: role.position,
                    })
            })
            .await?;

        if !plan.grant.is_empty() {
            let role_ids: Vec<RoleId> = plan.grant.iter().map(|id| RoleId(*id)).collect();
            member.add_roles(&ctx.http, &role_ids).await?;
            info!(
                "Granted {} auto-role(s) to user {} in guild {}",
                role_ids.len(),
                member.user.id,
                member.guild_id
            );
        }
        Ok(())
    }

    async fn mirror_member_join(&self, ctx: &Context, guild_id: &str, user: &User) {
        let channel = match self.context.database.get_guild_settings(guild_id).await {
            Ok(Some(settings)) => settings.member_log_channel,
            Ok(None) => None,
            Err(e) => {
                warn!("Could not load settings for guild {guild_id}: {e}");
                None
            }
        };
        if let Some(channel) = channel {
            mirror_to_channel(
                ctx,
                &channel,
                info_embed(
                    "Member Joined",
                    &format!(
                        "**User:** {} ({})\n**Account created:** <t:{}:F>",
                        user_tag(user),
                        user.id,
                        user.id.created_at().unix_timestamp(),
                    ),
                ),
            )
            .await;
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("{} is connected and ready!", ready.user.name);
        info!("Connected to {} guilds", ready.guilds.len());
        info!("Bot ID: {}", ready.user.id);

        self.health.set_gateway_connected(true);

        // Guild registration for development (instant), global for production
        if let Some(guild_id) = self.guild_id {
            info!("Development mode: registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("Failed to register guild slash commands: {e}");
            }
        } else {
            info!("Production mode: registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("Failed to register global slash commands: {e}");
            }
        }
    }

    async fn resume(&self, _ctx: Context, _resumed: serenity::model::event::ResumedEvent) {
        info!("Gateway session resumed");
        self.health.set_gateway_connected(true);
    }

    /// Legacy prefixed commands get a redirect to the slash equivalent.
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let prefix = &self.context.config.command_prefix;
        let Some(rest) = msg.content.strip_prefix(prefix.as_str()) else {
            return;
        };
        let Some(name) = rest.split_whitespace().next() else {
            return;
        };
        if self.dispatcher.knows_command(name) {
            let reply = msg
                .reply(
                    &ctx.http,
                    format!("Text commands have been replaced. Use /{name} instead."),
                )
                .await;
            if let Err(e) = reply {
                warn!("Could not send prefix hint in channel {}: {e}", msg.channel_id);
            }
        }
    }

    async fn guild_member_addition(&self, ctx: Context, mut member: Member) {
        info!(
            "Member {} joined guild {}",
            member.user.id, member.guild_id
        );
        self.run_member_join(&ctx, &mut member).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if let Err(e) = self.dispatcher.dispatch(&ctx, &command).await {
                    error!("Dispatch failed for /{}: {e:#}", command.data.name);
                }
            }
            Interaction::MessageComponent(component) => {
                let result = match component.data.custom_id.as_str() {
                    "create_ticket" => {
                        support::handle_ticket_button(&self.context, &ctx, &component).await
                    }
                    "help_category" => utility::handle_help_select(&ctx, &component).await,
                    "faq_topic" => utility::handle_faq_select(&ctx, &component).await,
                    other => {
                        warn!("Unknown component interaction: {other}");
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    error!(
                        "Error handling component '{}': {e:#}",
                        component.data.custom_id
                    );
                }
            }
            _ => {}
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Sentinel Discord bot...");

    let database = Database::new(&config.database_path).await?;

    let context = Arc::new(CommandContext::new(
        database.clone(),
        ModerationWorkflow::new(database.clone(), config.max_warnings),
        TicketWorkflow::new(database.clone()),
        WelcomeWorkflow::new(database.clone()),
        config.clone(),
    ));

    let mut registry = CommandRegistry::new();
    for handler in create_all_handlers() {
        registry.register(handler);
    }
    info!("Registered {} command handlers", registry.len());

    let rate_limiter = RateLimiter::new(
        config.rate_limit_commands,
        Duration::from_secs(config.rate_limit_window_secs),
    );
    let dispatcher = Arc::new(CommandDispatcher::new(
        registry,
        rate_limiter,
        Arc::clone(&context),
    ));

    let health_state = HealthState::new();
    let health_port = config.health_port;
    let serve_state = Arc::clone(&health_state);
    tokio::spawn(async move {
        if let Err(e) = health::serve(serve_state, health_port).await {
            error!("Health endpoint failed: {e}");
        }
    });

    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler {
        dispatcher,
        context,
        guild_id,
        health: health_state,
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .application_id(config.application_id)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    client
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Client error: {}", e))?;

    Ok(())
}
