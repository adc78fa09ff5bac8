//! Postgres schema, applied idempotently at startup.
//!
//! One statement per entry: prepared statements cannot carry several commands.

pub(crate) const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id            UUID PRIMARY KEY,
        name          TEXT NOT NULL,
        email         TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        balance       NUMERIC(20, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0),
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        seq         BIGSERIAL NOT NULL,
        id          UUID PRIMARY KEY,
        user_id     UUID NOT NULL REFERENCES users (id),
        kind        TEXT NOT NULL CHECK (kind IN ('deposit', 'withdraw')),
        amount      NUMERIC(20, 2) NOT NULL CHECK (amount > 0),
        occurred_at TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS transactions_user_newest_first
        ON transactions (user_id, occurred_at DESC, seq DESC)
    "#,
];
