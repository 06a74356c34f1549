use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::init_db;
use crate::error::{Result, StoreError};
use crate::types::{FeedEvent, FeedKind, ScheduleEntry, ScheduleKind};

/// Thread-safe store for schedule entries and feeding history.
///
/// Wraps a single SQLite connection in a `Mutex`. The polling task and the
/// web handlers share one handle; a single feeder produces far too little
/// traffic to justify a pool.
pub struct FeedStore {
    db: Mutex<Connection>,
}

impl FeedStore {
    /// Wrap a connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        init_db(&conn)?;
        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    // -----------------------------------------------------------------------
    // Schedule entries
    // -----------------------------------------------------------------------

    /// Add a scheduled feed time. Returns the stored entry.
    pub fn add_feed_time(&self, time: &str, kind: ScheduleKind, size: u32) -> Result<ScheduleEntry> {
        validate_time(time)?;
        if size == 0 {
            return Err(StoreError::InvalidEntry("size must be positive".into()));
        }
        let id = Uuid::new_v4().to_string();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO feed_times (id, time, kind, size) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![id, time, kind.to_string(), size],
        )?;
        info!(%time, %kind, size, "feed time added");
        Ok(ScheduleEntry {
            id,
            time: time.to_string(),
            kind,
            size,
        })
    }

    /// Remove one schedule entry by id.
    pub fn delete_feed_time(&self, id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute("DELETE FROM feed_times WHERE id = ?1", [id])?;
        if n == 0 {
            return Err(StoreError::NotFound(format!("feed time {id}")));
        }
        debug!(%id, "feed time deleted");
        Ok(())
    }

    /// Remove the first schedule entry matching a time-of-day string.
    pub fn delete_feed_time_at(&self, time: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        let n = db.execute(
            "DELETE FROM feed_times WHERE id IN
               (SELECT id FROM feed_times WHERE time = ?1 LIMIT 1)",
            [time],
        )?;
        if n == 0 {
            return Err(StoreError::NotFound(format!("feed time at {time}")));
        }
        debug!(%time, "feed time deleted");
        Ok(())
    }

    /// All schedule entries, ascending by time-of-day.
    pub fn list_feed_times(&self) -> Result<Vec<ScheduleEntry>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare("SELECT id, time, kind, size FROM feed_times ORDER BY time, id")?;
        let entries = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                ))
            })?
            .filter_map(|r| {
                let (id, time, kind_str, size) = r.ok()?;
                let kind: ScheduleKind = kind_str.parse().ok()?;
                Some(ScheduleEntry {
                    id,
                    time,
                    kind,
                    size,
                })
            })
            .collect();
        Ok(entries)
    }

    // -----------------------------------------------------------------------
    // Feeding history
    // -----------------------------------------------------------------------

    /// Record a completed (or just-triggered) feeding.
    pub fn record_feeding(
        &self,
        time: &str,
        date: &str,
        size: u32,
        kind: FeedKind,
    ) -> Result<FeedEvent> {
        let id = Uuid::new_v4().to_string();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO feedings (id, time, date, size, kind) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id, time, date, size, kind.to_string()],
        )?;
        info!(%time, %date, size, %kind, "feeding recorded");
        Ok(FeedEvent {
            id,
            time: time.to_string(),
            date: date.to_string(),
            size,
            kind,
        })
    }

    /// All recorded feedings, most recent first.
    pub fn list_feedings(&self) -> Result<Vec<FeedEvent>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, time, date, size, kind FROM feedings ORDER BY date DESC, time DESC",
        )?;
        let events = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })?
            .filter_map(|r| {
                let (id, time, date, size, kind_str) = r.ok()?;
                let kind: FeedKind = kind_str.parse().ok()?;
                Some(FeedEvent {
                    id,
                    time,
                    date,
                    size,
                    kind,
                })
            })
            .collect();
        Ok(events)
    }

    /// The most recent feeding, if any.
    pub fn last_feeding(&self) -> Result<Option<FeedEvent>> {
        Ok(self.list_feedings()?.into_iter().next())
    }
}

/// Accept only `HH:MM` 24-hour strings: the schedule matcher and the
/// display ordering both rely on their lexicographic order.
fn validate_time(time: &str) -> Result<()> {
    let bytes = time.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[2] == b':'
        && time[..2].parse::<u8>().is_ok_and(|h| h < 24)
        && time[3..].parse::<u8>().is_ok_and(|m| m < 60);
    if !well_formed {
        return Err(StoreError::InvalidEntry(format!(
            "time must be HH:MM, got {time:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> FeedStore {
        FeedStore::new(Connection::open_in_memory().unwrap()).unwrap()
    }

    #[test]
    fn feed_times_list_in_ascending_time_order() {
        let store = memory_store();
        store.add_feed_time("14:00", ScheduleKind::Recurring, 1).unwrap();
        store.add_feed_time("08:00", ScheduleKind::OneShot, 2).unwrap();
        store.add_feed_time("11:30", ScheduleKind::Recurring, 1).unwrap();

        let times: Vec<String> = store
            .list_feed_times()
            .unwrap()
            .into_iter()
            .map(|e| e.time)
            .collect();
        assert_eq!(times, vec!["08:00", "11:30", "14:00"]);
    }

    #[test]
    fn delete_by_id_removes_only_that_entry() {
        let store = memory_store();
        let keep = store.add_feed_time("08:00", ScheduleKind::Recurring, 1).unwrap();
        let gone = store.add_feed_time("08:00", ScheduleKind::OneShot, 2).unwrap();

        store.delete_feed_time(&gone.id).unwrap();
        let left = store.list_feed_times().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, keep.id);
        assert_eq!(left[0].kind, ScheduleKind::Recurring);
    }

    #[test]
    fn delete_unknown_id_reports_not_found() {
        let store = memory_store();
        assert!(matches!(
            store.delete_feed_time("nope"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_feed_time_at("09:15"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn malformed_times_are_rejected() {
        let store = memory_store();
        for bad in ["8:00", "24:00", "12:60", "noon", "12-30"] {
            assert!(
                store.add_feed_time(bad, ScheduleKind::Recurring, 1).is_err(),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn feedings_list_most_recent_first() {
        let store = memory_store();
        store
            .record_feeding("07:00", "2024-03-02", 1, FeedKind::Scheduled)
            .unwrap();
        store
            .record_feeding("09:30", "2024-03-02", 2, FeedKind::Manual)
            .unwrap();
        store
            .record_feeding("21:00", "2024-03-01", 1, FeedKind::Scheduled)
            .unwrap();

        let events = store.list_feedings().unwrap();
        let stamps: Vec<(String, String)> = events
            .iter()
            .map(|e| (e.date.clone(), e.time.clone()))
            .collect();
        assert_eq!(
            stamps,
            vec![
                ("2024-03-02".into(), "09:30".into()),
                ("2024-03-02".into(), "07:00".into()),
                ("2024-03-01".into(), "21:00".into()),
            ]
        );

        let last = store.last_feeding().unwrap().unwrap();
        assert_eq!(last.time, "09:30");
        assert_eq!(last.kind, FeedKind::Manual);
    }

    #[test]
    fn last_feeding_on_empty_history_is_none() {
        let store = memory_store();
        assert!(store.last_feeding().unwrap().is_none());
    }
}
