//! Sqlite-backed persistence for guild settings, tickets, warnings,
//! moderation logs and auto-roles.
//!
//! All workflow components go through the narrow accessors here; nothing
//! else touches the connection. Ids are stored as text snowflakes and
//! times as unix seconds.
//!
//! The open-ticket uniqueness rule is enforced at the store level with a
//! partial unique index, so two racing create calls resolve to exactly one
//! open row and the loser sees [`TicketInsert::AlreadyOpen`].

use anyhow::{anyhow, Result};
use chrono::Utc;
use sqlite::{Connection, State};
use std::sync::{Arc, Mutex};

/// Per-guild configuration row. Every field except the key is optional;
/// the row is created on first write and never deleted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuildSettings {
    pub guild_id: String,
    pub welcome_channel: Option<String>,
    pub welcome_message: Option<String>,
    pub welcome_image_enabled: bool,
    pub background_url: Option<String>,
    pub mod_log_channel: Option<String>,
    pub member_log_channel: Option<String>,
    pub message_log_channel: Option<String>,
    pub ticket_channel: Option<String>,
    pub ticket_category: Option<String>,
    pub ticket_message: Option<String>,
    pub ticket_support_role: Option<String>,
    pub ticket_log_channel: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub id: i64,
    pub guild_id: String,
    pub channel_id: String,
    pub user_id: String,
    pub status: String,
    pub reason: Option<String>,
    pub created_at: i64,
    pub closed_at: Option<i64>,
    pub closed_by: Option<String>,
}

/// Outcome of a ticket insert attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TicketInsert {
    Created(i64),
    /// The store rejected the insert: an open ticket for this
    /// (guild, user) pair already exists.
    AlreadyOpen,
}

/// Settings columns that may be written through [`Database::update_settings`].
/// Whitelist keeps the dynamic UPDATE assembly safe.
const SETTINGS_COLUMNS: &[&str] = &[
    "welcome_channel",
    "welcome_message",
    "welcome_image_enabled",
    "background_url",
    "mod_log_channel",
    "member_log_channel",
    "message_log_channel",
    "ticket_channel",
    "ticket_category",
    "ticket_message",
    "ticket_support_role",
    "ticket_log_channel",
];

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    pub async fn new(path: &str) -> Result<Self> {
        let conn = sqlite::open(path).map_err(|e| anyhow!("failed to open {path}: {e}"))?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.create_schema()?;
        Ok(db)
    }

    /// In-memory database for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = sqlite::open(":memory:")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.create_schema()?;
        Ok(db)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database mutex poisoned"))
    }

    fn create_schema(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS guild_settings (
                guild_id TEXT PRIMARY KEY,
                welcome_channel TEXT,
                welcome_message TEXT,
                welcome_image_enabled INTEGER NOT NULL DEFAULT 0,
                background_url TEXT,
                mod_log_channel TEXT,
                member_log_channel TEXT,
                message_log_channel TEXT,
                ticket_channel TEXT,
                ticket_category TEXT,
                ticket_message TEXT,
                ticket_support_role TEXT,
                ticket_log_channel TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                status TEXT NOT NULL CHECK (status IN ('open', 'closed')),
                reason TEXT,
                created_at INTEGER NOT NULL,
                closed_at INTEGER,
                closed_by TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_tickets_channel ON tickets (channel_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tickets_one_open
                ON tickets (guild_id, user_id) WHERE status = 'open';
            CREATE TABLE IF NOT EXISTS warnings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                moderator_id TEXT NOT NULL,
                reason TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                active INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS idx_warnings_user ON warnings (guild_id, user_id);
            CREATE TABLE IF NOT EXISTS mod_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guild_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                moderator_id TEXT NOT NULL,
                action TEXT NOT NULL,
                reason TEXT NOT NULL,
                duration INTEGER,
                created_at INTEGER NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_mod_logs_user ON mod_logs (guild_id, user_id);
            CREATE TABLE IF NOT EXISTS autoroles (
                guild_id TEXT NOT NULL,
                role_id TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                UNIQUE (guild_id, role_id)
            );",
        )?;
        Ok(())
    }

    // --- Guild settings ---

    pub async fn get_guild_settings(&self, guild_id: &str) -> Result<Option<GuildSettings>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT guild_id, welcome_channel, welcome_message, welcome_image_enabled,
                    background_url, mod_log_channel, member_log_channel, message_log_channel,
                    ticket_channel, ticket_category, ticket_message, ticket_support_role,
                    ticket_log_channel
             FROM guild_settings WHERE guild_id = ?",
        )?;
        stmt.bind((1, guild_id))?;

        if let State::Row = stmt.next()? {
            Ok(Some(GuildSettings {
                guild_id: stmt.read("guild_id")?,
                welcome_channel: stmt.read("welcome_channel")?,
                welcome_message: stmt.read("welcome_message")?,
                welcome_image_enabled: stmt.read::<i64, _>("welcome_image_enabled")? != 0,
                background_url: stmt.read("background_url")?,
                mod_log_channel: stmt.read("mod_log_channel")?,
                member_log_channel: stmt.read("member_log_channel")?,
                message_log_channel: stmt.read("message_log_channel")?,
                ticket_channel: stmt.read("ticket_channel")?,
                ticket_category: stmt.read("ticket_category")?,
                ticket_message: stmt.read("ticket_message")?,
                ticket_support_role: stmt.read("ticket_support_role")?,
                ticket_log_channel: stmt.read("ticket_log_channel")?,
            }))
        } else {
            Ok(None)
        }
    }

    /// Upsert a set of settings columns for a guild. Columns not named in
    /// `assignments` are left untouched; `None` clears a column.
    pub async fn update_settings(
        &self,
        guild_id: &str,
        assignments: &[(&str, Option<String>)],
    ) -> Result<()> {
        for (column, _) in assignments {
            if !SETTINGS_COLUMNS.contains(column) {
                return Err(anyhow!("unknown settings column: {column}"));
            }
        }

        let now = Utc::now().timestamp();
        let conn = self.lock()?;

        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO guild_settings (guild_id, created_at, updated_at)
             VALUES (?, ?, ?)",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, now))?;
        stmt.bind((3, now))?;
        stmt.next()?;

        let set_clause: Vec<String> = assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect();
        let sql = format!(
            "UPDATE guild_settings SET {}, updated_at = ? WHERE guild_id = ?",
            set_clause.join(", ")
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut index = 1;
        for (_, value) in assignments {
            stmt.bind((index, value.as_deref()))?;
            index += 1;
        }
        stmt.bind((index, now))?;
        stmt.bind((index + 1, guild_id))?;
        stmt.next()?;
        Ok(())
    }

    /// Toggle the welcome-image flag (stored as 0/1).
    pub async fn set_welcome_image_enabled(&self, guild_id: &str, enabled: bool) -> Result<()> {
        self.update_settings(
            guild_id,
            &[(
                "welcome_image_enabled",
                Some(if enabled { "1" } else { "0" }.to_string()),
            )],
        )
        .await
    }

    // --- Tickets ---

    /// Insert an open ticket row. The partial unique index turns a racing
    /// duplicate into `AlreadyOpen` instead of a second open row.
    pub async fn create_ticket(
        &self,
        guild_id: &str,
        channel_id: &str,
        user_id: &str,
        reason: Option<&str>,
    ) -> Result<TicketInsert> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "INSERT INTO tickets (guild_id, channel_id, user_id, status, reason, created_at)
             VALUES (?, ?, ?, 'open', ?, ?)",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, channel_id))?;
        stmt.bind((3, user_id))?;
        stmt.bind((4, reason))?;
        stmt.bind((5, Utc::now().timestamp()))?;

        match stmt.next() {
            Ok(_) => {}
            Err(e) => {
                let unique_violation = e
                    .message
                    .as_deref()
                    .map(|m| m.contains("UNIQUE"))
                    .unwrap_or(false);
                if unique_violation {
                    return Ok(TicketInsert::AlreadyOpen);
                }
                return Err(e.into());
            }
        }
        drop(stmt);

        let mut stmt = conn.prepare("SELECT last_insert_rowid()")?;
        stmt.next()?;
        Ok(TicketInsert::Created(stmt.read::<i64, _>(0)?))
    }

    /// The open ticket hosted in a channel, if any.
    pub async fn get_open_ticket_by_channel(&self, channel_id: &str) -> Result<Option<Ticket>> {
        self.query_ticket(
            "SELECT * FROM tickets WHERE channel_id = ? AND status = 'open'",
            channel_id,
        )
    }

    /// Any ticket record for a channel, open or closed.
    pub async fn get_ticket_by_channel(&self, channel_id: &str) -> Result<Option<Ticket>> {
        self.query_ticket(
            "SELECT * FROM tickets WHERE channel_id = ? ORDER BY created_at DESC LIMIT 1",
            channel_id,
        )
    }

    /// The requester's open ticket in a guild, if any.
    pub async fn get_open_ticket_for_user(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Option<Ticket>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM tickets WHERE guild_id = ? AND user_id = ? AND status = 'open'",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, user_id))?;
        if let State::Row = stmt.next()? {
            Ok(Some(Self::row_to_ticket(&stmt)?))
        } else {
            Ok(None)
        }
    }

    /// Flip an open ticket to closed. Returns `false` when the row was not
    /// open (already closed, or unknown channel); callers reject rather
    /// than silently re-close.
    pub async fn close_ticket(
        &self,
        channel_id: &str,
        closed_by: &str,
        reason: Option<&str>,
    ) -> Result<bool> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "UPDATE tickets SET status = 'closed', closed_at = ?, closed_by = ?, reason = ?
             WHERE channel_id = ? AND status = 'open'",
        )?;
        stmt.bind((1, Utc::now().timestamp()))?;
        stmt.bind((2, closed_by))?;
        stmt.bind((3, reason))?;
        stmt.bind((4, channel_id))?;
        stmt.next()?;
        drop(stmt);

        let mut stmt = conn.prepare("SELECT changes()")?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)? > 0)
    }

    fn query_ticket(&self, sql: &str, channel_id: &str) -> Result<Option<Ticket>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        stmt.bind((1, channel_id))?;
        if let State::Row = stmt.next()? {
            Ok(Some(Self::row_to_ticket(&stmt)?))
        } else {
            Ok(None)
        }
    }

    fn row_to_ticket(stmt: &sqlite::Statement<'_>) -> Result<Ticket> {
        Ok(Ticket {
            id: stmt.read("id")?,
            guild_id: stmt.read("guild_id")?,
            channel_id: stmt.read("channel_id")?,
            user_id: stmt.read("user_id")?,
            status: stmt.read("status")?,
            reason: stmt.read("reason")?,
            created_at: stmt.read("created_at")?,
            closed_at: stmt.read("closed_at")?,
            closed_by: stmt.read("closed_by")?,
        })
    }

    // --- Warnings ---

    pub async fn add_warning(
        &self,
        guild_id: &str,
        user_id: &str,
        moderator_id: &str,
        reason: &str,
    ) -> Result<i64> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "INSERT INTO warnings (guild_id, user_id, moderator_id, reason, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, user_id))?;
        stmt.bind((3, moderator_id))?;
        stmt.bind((4, reason))?;
        stmt.bind((5, Utc::now().timestamp()))?;
        stmt.next()?;
        drop(stmt);

        let mut stmt = conn.prepare("SELECT last_insert_rowid()")?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)?)
    }

    pub async fn count_active_warnings(&self, guild_id: &str, user_id: &str) -> Result<i64> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM warnings
             WHERE guild_id = ? AND user_id = ? AND active = 1",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, user_id))?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)?)
    }

    /// Deactivate a warning without deleting it. No command drives this yet;
    /// it backs the future "remove warning" path.
    pub async fn deactivate_warning(&self, warning_id: i64) -> Result<bool> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("UPDATE warnings SET active = 0 WHERE id = ?")?;
        stmt.bind((1, warning_id))?;
        stmt.next()?;
        drop(stmt);

        let mut stmt = conn.prepare("SELECT changes()")?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)? > 0)
    }

    // --- Moderation log ---

    /// Append one audit row. `user_id` takes the sentinels `all` / `channel`
    /// for bulk and channel-scoped actions; `duration` is milliseconds.
    pub async fn add_mod_log(
        &self,
        guild_id: &str,
        user_id: &str,
        moderator_id: &str,
        action: &str,
        reason: &str,
        duration: Option<i64>,
    ) -> Result<()> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "INSERT INTO mod_logs (guild_id, user_id, moderator_id, action, reason, duration, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, user_id))?;
        stmt.bind((3, moderator_id))?;
        stmt.bind((4, action))?;
        stmt.bind((5, reason))?;
        stmt.bind((6, duration))?;
        stmt.bind((7, Utc::now().timestamp()))?;
        stmt.next()?;
        Ok(())
    }

    pub async fn count_mod_logs(
        &self,
        guild_id: &str,
        user_id: &str,
        action: &str,
    ) -> Result<i64> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT COUNT(*) FROM mod_logs WHERE guild_id = ? AND user_id = ? AND action = ?",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, user_id))?;
        stmt.bind((3, action))?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)?)
    }

    // --- Auto-roles ---

    /// Insert-or-ignore an auto-role row. Returns `false` when the pair
    /// already existed.
    pub async fn add_auto_role(&self, guild_id: &str, role_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO autoroles (guild_id, role_id, created_at) VALUES (?, ?, ?)",
        )?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, role_id))?;
        stmt.bind((3, Utc::now().timestamp()))?;
        stmt.next()?;
        drop(stmt);

        let mut stmt = conn.prepare("SELECT changes()")?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)? > 0)
    }

    pub async fn remove_auto_role(&self, guild_id: &str, role_id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("DELETE FROM autoroles WHERE guild_id = ? AND role_id = ?")?;
        stmt.bind((1, guild_id))?;
        stmt.bind((2, role_id))?;
        stmt.next()?;
        drop(stmt);

        let mut stmt = conn.prepare("SELECT changes()")?;
        stmt.next()?;
        Ok(stmt.read::<i64, _>(0)? > 0)
    }

    pub async fn get_auto_roles(&self, guild_id: &str) -> Result<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT role_id FROM autoroles WHERE guild_id = ? ORDER BY created_at")?;
        stmt.bind((1, guild_id))?;

        let mut roles = Vec::new();
        while let State::Row = stmt.next()? {
            roles.push(stmt.read::<String, _>("role_id")?);
        }
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let db = db();
        db.update_settings(
            "g1",
            &[
                ("welcome_channel", Some("123".to_string())),
                ("welcome_message", Some("Welcome, {user}!".to_string())),
            ],
        )
        .await
        .unwrap();

        let settings = db.get_guild_settings("g1").await.unwrap().unwrap();
        assert_eq!(settings.welcome_channel.as_deref(), Some("123"));
        assert_eq!(settings.welcome_message.as_deref(), Some("Welcome, {user}!"));
        assert!(settings.mod_log_channel.is_none());
    }

    #[tokio::test]
    async fn test_settings_partial_update_preserves_other_columns() {
        let db = db();
        db.update_settings("g1", &[("mod_log_channel", Some("555".to_string()))])
            .await
            .unwrap();
        db.update_settings("g1", &[("welcome_channel", Some("666".to_string()))])
            .await
            .unwrap();

        let settings = db.get_guild_settings("g1").await.unwrap().unwrap();
        assert_eq!(settings.mod_log_channel.as_deref(), Some("555"));
        assert_eq!(settings.welcome_channel.as_deref(), Some("666"));
    }

    #[tokio::test]
    async fn test_settings_clear_column() {
        let db = db();
        db.update_settings("g1", &[("mod_log_channel", Some("555".to_string()))])
            .await
            .unwrap();
        db.update_settings("g1", &[("mod_log_channel", None)])
            .await
            .unwrap();

        let settings = db.get_guild_settings("g1").await.unwrap().unwrap();
        assert!(settings.mod_log_channel.is_none());
    }

    #[tokio::test]
    async fn test_unknown_settings_column_rejected() {
        let db = db();
        let result = db
            .update_settings("g1", &[("guild_id; DROP TABLE tickets", None)])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_welcome_image_toggle() {
        let db = db();
        db.set_welcome_image_enabled("g1", true).await.unwrap();
        let settings = db.get_guild_settings("g1").await.unwrap().unwrap();
        assert!(settings.welcome_image_enabled);

        db.set_welcome_image_enabled("g1", false).await.unwrap();
        let settings = db.get_guild_settings("g1").await.unwrap().unwrap();
        assert!(!settings.welcome_image_enabled);
    }

    #[tokio::test]
    async fn test_second_open_ticket_rejected_by_store() {
        let db = db();
        let first = db.create_ticket("g1", "c1", "u1", Some("help")).await.unwrap();
        assert!(matches!(first, TicketInsert::Created(_)));

        // Same user racing a second create: the unique index wins.
        let second = db.create_ticket("g1", "c2", "u1", None).await.unwrap();
        assert_eq!(second, TicketInsert::AlreadyOpen);

        // Different user is unaffected.
        let other = db.create_ticket("g1", "c3", "u2", None).await.unwrap();
        assert!(matches!(other, TicketInsert::Created(_)));
    }

    #[tokio::test]
    async fn test_ticket_reopen_after_close() {
        let db = db();
        db.create_ticket("g1", "c1", "u1", None).await.unwrap();
        assert!(db.close_ticket("c1", "mod", Some("done")).await.unwrap());

        // Closed ticket frees the slot for a new one.
        let next = db.create_ticket("g1", "c9", "u1", None).await.unwrap();
        assert!(matches!(next, TicketInsert::Created(_)));
    }

    #[tokio::test]
    async fn test_close_already_closed_is_rejected() {
        let db = db();
        db.create_ticket("g1", "c1", "u1", None).await.unwrap();
        assert!(db.close_ticket("c1", "mod", None).await.unwrap());
        assert!(!db.close_ticket("c1", "mod", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_ticket_lookup_by_channel_and_user() {
        let db = db();
        db.create_ticket("g1", "c1", "u1", Some("broken role")).await.unwrap();

        let by_channel = db.get_open_ticket_by_channel("c1").await.unwrap().unwrap();
        assert_eq!(by_channel.user_id, "u1");
        assert_eq!(by_channel.status, "open");
        assert_eq!(by_channel.reason.as_deref(), Some("broken role"));

        let by_user = db.get_open_ticket_for_user("g1", "u1").await.unwrap().unwrap();
        assert_eq!(by_user.channel_id, "c1");

        assert!(db.get_open_ticket_by_channel("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_ticket_still_readable_for_history() {
        let db = db();
        db.create_ticket("g1", "c1", "u1", None).await.unwrap();
        db.close_ticket("c1", "mod", Some("resolved")).await.unwrap();

        assert!(db.get_open_ticket_by_channel("c1").await.unwrap().is_none());
        let record = db.get_ticket_by_channel("c1").await.unwrap().unwrap();
        assert_eq!(record.status, "closed");
        assert_eq!(record.closed_by.as_deref(), Some("mod"));
        assert!(record.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_warning_count_and_deactivation() {
        let db = db();
        let w1 = db.add_warning("g1", "u1", "m1", "spam").await.unwrap();
        db.add_warning("g1", "u1", "m1", "spam again").await.unwrap();
        db.add_warning("g1", "u2", "m1", "other user").await.unwrap();

        assert_eq!(db.count_active_warnings("g1", "u1").await.unwrap(), 2);

        assert!(db.deactivate_warning(w1).await.unwrap());
        assert_eq!(db.count_active_warnings("g1", "u1").await.unwrap(), 1);
        assert!(!db.deactivate_warning(9999).await.unwrap());
    }

    #[tokio::test]
    async fn test_mod_log_append_and_count() {
        let db = db();
        db.add_mod_log("g1", "u1", "m1", "warn", "spam", None).await.unwrap();
        db.add_mod_log("g1", "u1", "m1", "warn", "spam", None).await.unwrap();
        db.add_mod_log("g1", "u1", "bot", "auto-mute", "threshold", Some(86_400_000))
            .await
            .unwrap();
        db.add_mod_log("g1", "all", "m1", "purge", "cleanup", None).await.unwrap();

        assert_eq!(db.count_mod_logs("g1", "u1", "warn").await.unwrap(), 2);
        assert_eq!(db.count_mod_logs("g1", "u1", "auto-mute").await.unwrap(), 1);
        assert_eq!(db.count_mod_logs("g1", "all", "purge").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_auto_role_unique_per_guild() {
        let db = db();
        assert!(db.add_auto_role("g1", "r1").await.unwrap());
        assert!(!db.add_auto_role("g1", "r1").await.unwrap());
        assert!(db.add_auto_role("g2", "r1").await.unwrap());

        assert_eq!(db.get_auto_roles("g1").await.unwrap(), vec!["r1"]);

        assert!(db.remove_auto_role("g1", "r1").await.unwrap());
        assert!(!db.remove_auto_role("g1", "r1").await.unwrap());
        assert!(db.get_auto_roles("g1").await.unwrap().is_empty());
    }
}
