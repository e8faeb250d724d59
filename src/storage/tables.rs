use redb::TableDefinition;

/// Software records: uuid -> SoftwareRecord (msgpack)
pub const SOFTWARE: TableDefinition<&str, &[u8]> = TableDefinition::new("software");

/// Profile records: uuid -> ProfileRecord (msgpack)
pub const PROFILES: TableDefinition<&str, &[u8]> = TableDefinition::new("profiles");

/// Account credentials: lowercased email -> AccountRecord (msgpack)
pub const ACCOUNTS: TableDefinition<&str, &[u8]> = TableDefinition::new("accounts");

/// Email index: profile uuid -> lowercased account email (for account cleanup)
pub const PROFILE_EMAILS: TableDefinition<&str, &str> = TableDefinition::new("profile_emails");

/// Sessions: token digest -> SessionRecord (msgpack)
pub const SESSIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("sessions");

/// Theme preferences: profile uuid -> theme name
pub const THEME_PREFS: TableDefinition<&str, &str> = TableDefinition::new("theme_prefs");
