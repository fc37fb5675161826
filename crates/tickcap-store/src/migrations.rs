//! Schema setup, applied on every open. All statements are idempotent.

use duckdb::Connection;

pub fn apply_migrations(connection: &Connection) -> Result<(), duckdb::Error> {
    connection.execute_batch(
        "CREATE SEQUENCE IF NOT EXISTS instruments_id_seq;
         CREATE TABLE IF NOT EXISTS instruments (
             id BIGINT PRIMARY KEY DEFAULT nextval('instruments_id_seq'),
             symbol TEXT NOT NULL UNIQUE,
             name TEXT NOT NULL UNIQUE,
             created_at TEXT NOT NULL
         );

         CREATE SEQUENCE IF NOT EXISTS observations_id_seq;
         CREATE TABLE IF NOT EXISTS observations (
             id BIGINT PRIMARY KEY DEFAULT nextval('observations_id_seq'),
             symbol TEXT NOT NULL,
             last DOUBLE NOT NULL,
             bid DOUBLE NOT NULL,
             ask DOUBLE NOT NULL,
             captured_at TEXT NOT NULL
         );

         CREATE INDEX IF NOT EXISTS idx_observations_symbol_captured_at
             ON observations (symbol, captured_at);",
    )
}
