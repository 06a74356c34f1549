use rusqlite::Connection;

use crate::error::Result;

/// Initialise the feeder schema in `conn`.
///
/// Creates the `feed_times` and `feedings` tables (idempotent) and an index
/// on `feed_times.time` so the minute-resolution polling scan stays cheap.
pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS feed_times (
            id    TEXT    NOT NULL PRIMARY KEY,
            time  TEXT    NOT NULL,   -- HH:MM, 24-hour
            kind  TEXT    NOT NULL,   -- 'one_shot' | 'recurring'
            size  INTEGER NOT NULL
        ) STRICT;

        -- Polling scans ascending by time-of-day every few seconds.
        CREATE INDEX IF NOT EXISTS idx_feed_times_time ON feed_times (time);

        CREATE TABLE IF NOT EXISTS feedings (
            id    TEXT    NOT NULL PRIMARY KEY,
            time  TEXT    NOT NULL,   -- HH:MM
            date  TEXT    NOT NULL,   -- YYYY-MM-DD
            size  INTEGER NOT NULL,
            kind  TEXT    NOT NULL    -- 'manual' | 'scheduled'
        ) STRICT;

        CREATE INDEX IF NOT EXISTS idx_feedings_date_time ON feedings (date, time);
        ",
    )?;
    Ok(())
}
