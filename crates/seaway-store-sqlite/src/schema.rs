//! SQL schema for the Seaway SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS affiliate_profiles (
    profile_id         TEXT PRIMARY KEY,
    kind               TEXT NOT NULL,   -- 'headquarters' | 'branch_manager' | 'sales_agent'
    status             TEXT NOT NULL,   -- lifecycle state; removal is 'terminated', never DELETE
    name               TEXT NOT NULL,
    affiliate_code     TEXT NOT NULL UNIQUE,
    branch_label       TEXT,
    phone              TEXT,            -- normalized digits, when known
    manager_profile_id TEXT REFERENCES affiliate_profiles(profile_id),
    created_at         TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

-- Relations are append-only: reassignment transitions the current row to
-- 'ended' and inserts a fresh one. No UPDATE ever touches manager_id.
CREATE TABLE IF NOT EXISTS manager_agent_relations (
    relation_id TEXT PRIMARY KEY,
    agent_id    TEXT NOT NULL REFERENCES affiliate_profiles(profile_id),
    manager_id  TEXT NOT NULL REFERENCES affiliate_profiles(profile_id),
    status      TEXT NOT NULL,          -- 'active' | 'ended'
    started_at  TEXT NOT NULL,
    ended_at    TEXT
);

-- No agent reports to two managers at once.
CREATE UNIQUE INDEX IF NOT EXISTS relations_one_active_idx
    ON manager_agent_relations(agent_id) WHERE status = 'active';

CREATE TABLE IF NOT EXISTS customer_leads (
    lead_id        TEXT PRIMARY KEY,
    customer_phone TEXT NOT NULL,       -- normalized digits; matching key
    manager_id     TEXT REFERENCES affiliate_profiles(profile_id),
    agent_id       TEXT REFERENCES affiliate_profiles(profile_id),
    stage          TEXT NOT NULL,       -- pipeline stage, opaque to the core
    source         TEXT NOT NULL,       -- 'import' | 'self-registration' | 'admin-manual'
    created_at     TEXT NOT NULL
);

-- Events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS attribution_events (
    event_id    TEXT PRIMARY KEY,
    lead_id     TEXT NOT NULL REFERENCES customer_leads(lead_id),
    occurred_at TEXT NOT NULL,
    created_by  TEXT NOT NULL,
    note        TEXT,
    change_json TEXT NOT NULL           -- serialized AttributionChange
);

CREATE INDEX IF NOT EXISTS profiles_phone_idx  ON affiliate_profiles(phone);
CREATE INDEX IF NOT EXISTS relations_agent_idx ON manager_agent_relations(agent_id);
CREATE INDEX IF NOT EXISTS leads_phone_idx     ON customer_leads(customer_phone);
CREATE INDEX IF NOT EXISTS leads_agent_idx     ON customer_leads(agent_id);
CREATE INDEX IF NOT EXISTS events_lead_idx     ON attribution_events(lead_id, occurred_at);

PRAGMA user_version = 1;
";
