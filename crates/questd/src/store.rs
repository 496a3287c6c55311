//! SQLite persistence for tasks, profiles, unlocks, and the point ledger.
//!
//! The at-most-once invariants live here as storage constraints: penalty
//! application and daily claims are conditional updates, badge/avatar
//! unlocks are unique rows inserted with ON CONFLICT DO NOTHING, and every
//! point mutation goes through `apply_delta` inside a transaction.

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use quest_common::challenges::UserChallenge;
use quest_common::combo::ComboUpdate;
use quest_common::ledger::{self, PointDelta};
use quest_common::models::{Category, Profile, Task, TaskFilter};
use quest_common::rpc::UpdateTaskParams;
use quest_common::scoring::Priority;
use quest_common::streak::StreakUpdate;
use quest_common::QuestError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id              TEXT PRIMARY KEY,
    owner           TEXT NOT NULL,
    title           TEXT NOT NULL,
    description     TEXT,
    deadline        TEXT NOT NULL,
    priority        TEXT NOT NULL,
    category        TEXT,
    points          INTEGER NOT NULL,
    completed       INTEGER NOT NULL DEFAULT 0,
    completed_at    TEXT,
    penalty_applied INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_tasks_owner ON tasks(owner);
CREATE INDEX IF NOT EXISTS idx_tasks_overdue ON tasks(completed, penalty_applied, deadline);

CREATE TABLE IF NOT EXISTS profiles (
    id                  TEXT PRIMARY KEY,
    total_points        INTEGER NOT NULL DEFAULT 0,
    tasks_completed     INTEGER NOT NULL DEFAULT 0,
    current_streak      INTEGER NOT NULL DEFAULT 0,
    longest_streak      INTEGER NOT NULL DEFAULT 0,
    current_combo       INTEGER NOT NULL DEFAULT 0,
    highest_combo       INTEGER NOT NULL DEFAULT 0,
    selected_avatar_id  TEXT,
    last_completed_date TEXT,
    last_claimed_date   TEXT
);

CREATE TABLE IF NOT EXISTS user_badges (
    user_id   TEXT NOT NULL,
    badge_id  TEXT NOT NULL,
    earned_at TEXT NOT NULL,
    UNIQUE(user_id, badge_id)
);

CREATE TABLE IF NOT EXISTS user_avatars (
    user_id     TEXT NOT NULL,
    avatar_id   TEXT NOT NULL,
    unlocked_at TEXT NOT NULL,
    UNIQUE(user_id, avatar_id)
);

CREATE TABLE IF NOT EXISTS user_challenges (
    user_id      TEXT NOT NULL,
    challenge_id TEXT NOT NULL,
    progress     INTEGER NOT NULL DEFAULT 0,
    completed    INTEGER NOT NULL DEFAULT 0,
    UNIQUE(user_id, challenge_id)
);

CREATE TABLE IF NOT EXISTS point_events (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id    TEXT NOT NULL,
    kind       TEXT NOT NULL,
    amount     INTEGER NOT NULL,
    reference  TEXT,
    created_at TEXT NOT NULL
);
";

const TASK_COLUMNS: &str = "id, owner, title, description, deadline, priority, category, \
                            points, completed, completed_at, penalty_applied, created_at";

const PROFILE_COLUMNS: &str = "id, total_points, tasks_completed, current_streak, \
                               longest_streak, current_combo, highest_combo, \
                               selected_avatar_id, last_completed_date, last_claimed_date";

fn db_err(e: rusqlite::Error) -> QuestError {
    QuestError::Store(e.to_string())
}

fn parse_uuid(s: &str) -> Result<Uuid, QuestError> {
    Uuid::parse_str(s).map_err(|e| QuestError::Store(format!("bad uuid in store: {}", e)))
}

pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, QuestError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db_err)?;
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // Recover from poisoning; SQLite state is consistent on its own.
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ---- tasks ----

    pub fn create_task(&self, task: &Task) -> Result<(), QuestError> {
        self.conn()
            .execute(
                "INSERT INTO tasks (id, owner, title, description, deadline, priority, category, \
                 points, completed, completed_at, penalty_applied, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    task.id.to_string(),
                    task.owner.to_string(),
                    task.title,
                    task.description,
                    task.deadline,
                    task.priority.to_string(),
                    task.category.map(|c| c.to_string()),
                    task.points,
                    task.completed,
                    task.completed_at,
                    task.penalty_applied,
                    task.created_at,
                ],
            )
            .map_err(db_err)?;
        Ok(())
    }

    pub fn get_task(&self, owner: Uuid, id: Uuid) -> Result<Task, QuestError> {
        self.conn()
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1 AND owner = ?2", TASK_COLUMNS),
                params![id.to_string(), owner.to_string()],
                task_from_row,
            )
            .optional()
            .map_err(db_err)?
            .ok_or_else(|| QuestError::TaskNotFound(id.to_string()))
    }

    pub fn list_tasks(
        &self,
        owner: Uuid,
        filter: TaskFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Task>, QuestError> {
        let conn = self.conn();
        let owner = owner.to_string();

        if filter == TaskFilter::Overdue {
            let sql = format!(
                "SELECT {} FROM tasks \
                 WHERE owner = ?1 AND completed = 0 AND deadline < ?2 ORDER BY deadline ASC",
                TASK_COLUMNS
            );
            let mut stmt = conn.prepare(&sql).map_err(db_err)?;
            let rows = stmt.query_map(params![owner, now], task_from_row).map_err(db_err)?;
            return rows.collect::<Result<Vec<_>, _>>().map_err(db_err);
        }

        let clause = match filter {
            TaskFilter::All => "",
            TaskFilter::Pending => " AND completed = 0",
            TaskFilter::Completed => " AND completed = 1",
            TaskFilter::Overdue => unreachable!(),
        };
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner = ?1{} ORDER BY deadline ASC",
            TASK_COLUMNS, clause
        );
        let mut stmt = conn.prepare(&sql).map_err(db_err)?;
        let rows = stmt.query_map(params![owner], task_from_row).map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    pub fn update_task(&self, owner: Uuid, update: &UpdateTaskParams) -> Result<Task, QuestError> {
        // Read-modify-write is fine here: task metadata is not a counter.
        let task = self.get_task(owner, update.id)?;
        self.conn()
            .execute(
                "UPDATE tasks SET title = ?1, description = ?2, deadline = ?3, category = ?4 \
                 WHERE id = ?5 AND owner = ?6",
                params![
                    update.title.clone().unwrap_or(task.title),
                    update.description.clone().or(task.description),
                    update.deadline.unwrap_or(task.deadline),
                    update.category.or(task.category).map(|c| c.to_string()),
                    update.id.to_string(),
                    owner.to_string(),
                ],
            )
            .map_err(db_err)?;
        self.get_task(owner, update.id)
    }

    pub fn delete_task(&self, owner: Uuid, id: Uuid) -> Result<(), QuestError> {
        let changed = self
            .conn()
            .execute(
                "DELETE FROM tasks WHERE id = ?1 AND owner = ?2",
                params![id.to_string(), owner.to_string()],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Err(QuestError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn count_pending(&self, owner: Uuid) -> Result<usize, QuestError> {
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM tasks WHERE owner = ?1 AND completed = 0",
                params![owner.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .map(|n| n as usize)
            .map_err(db_err)
    }

    // ---- profiles ----

    pub fn get_or_create_profile(&self, user: Uuid) -> Result<Profile, QuestError> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO profiles (id) VALUES (?1) ON CONFLICT(id) DO NOTHING",
            params![user.to_string()],
        )
        .map_err(db_err)?;
        conn.query_row(
            &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS),
            params![user.to_string()],
            profile_from_row,
        )
        .map_err(db_err)
    }

    /// The completion trigger's atomic unit: mark the task completed, credit
    /// the base points through the ledger, bump tasks_completed, and advance
    /// the streak, all in one transaction.
    ///
    /// Fails with `AlreadyCompleted` (and writes nothing) if the task's
    /// completed flag was already set.
    pub fn apply_completion(
        &self,
        task_id: Uuid,
        now: DateTime<Utc>,
        streak: &StreakUpdate,
        base: &PointDelta,
    ) -> Result<Profile, QuestError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(db_err)?;

        let changed = tx
            .execute(
                "UPDATE tasks SET completed = 1, completed_at = ?1 WHERE id = ?2 AND completed = 0",
                params![now, task_id.to_string()],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Err(QuestError::AlreadyCompleted(task_id.to_string()));
        }

        record_event(&tx, base)?;
        tx.execute(
            "UPDATE profiles SET \
                 total_points = MAX(total_points + ?1, 0), \
                 tasks_completed = tasks_completed + 1, \
                 current_streak = ?2, \
                 longest_streak = ?3, \
                 last_completed_date = ?4 \
             WHERE id = ?5",
            params![
                base.amount,
                streak.current_streak,
                streak.longest_streak,
                now.date_naive(),
                base.user_id.to_string(),
            ],
        )
        .map_err(db_err)?;

        let profile = tx
            .query_row(
                &format!("SELECT {} FROM profiles WHERE id = ?1", PROFILE_COLUMNS),
                params![base.user_id.to_string()],
                profile_from_row,
            )
            .map_err(db_err)?;

        tx.commit().map_err(db_err)?;
        Ok(profile)
    }

    /// Apply one point delta through the ledger: append the event and move
    /// the profile total, clamped at zero, in one transaction. Returns the
    /// new total.
    pub fn apply_delta(&self, delta: &PointDelta) -> Result<i64, QuestError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(db_err)?;

        record_event(&tx, delta)?;
        tx.execute(
            "UPDATE profiles SET total_points = MAX(total_points + ?1, 0) WHERE id = ?2",
            params![delta.amount, delta.user_id.to_string()],
        )
        .map_err(db_err)?;
        let total = tx
            .query_row(
                "SELECT total_points FROM profiles WHERE id = ?1",
                params![delta.user_id.to_string()],
                |row| row.get(0),
            )
            .map_err(db_err)?;

        tx.commit().map_err(db_err)?;
        Ok(total)
    }

    pub fn update_combo(&self, user: Uuid, update: &ComboUpdate) -> Result<(), QuestError> {
        self.conn()
            .execute(
                "UPDATE profiles SET current_combo = ?1, highest_combo = ?2 WHERE id = ?3",
                params![update.current_combo, update.highest_combo, user.to_string()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    /// Claim today's reward: conditional update on last_claimed_date plus the
    /// reward delta, in one transaction. Returns false (writing nothing) if
    /// today was already claimed.
    pub fn claim_daily(&self, delta: &PointDelta, today: chrono::NaiveDate) -> Result<bool, QuestError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(db_err)?;

        let changed = tx
            .execute(
                "UPDATE profiles SET last_claimed_date = ?1 \
                 WHERE id = ?2 AND (last_claimed_date IS NULL OR last_claimed_date <> ?1)",
                params![today, delta.user_id.to_string()],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Ok(false);
        }

        record_event(&tx, delta)?;
        tx.execute(
            "UPDATE profiles SET total_points = MAX(total_points + ?1, 0) WHERE id = ?2",
            params![delta.amount, delta.user_id.to_string()],
        )
        .map_err(db_err)?;

        tx.commit().map_err(db_err)?;
        Ok(true)
    }

    pub fn set_selected_avatar(&self, user: Uuid, avatar_id: &str) -> Result<(), QuestError> {
        self.conn()
            .execute(
                "UPDATE profiles SET selected_avatar_id = ?1 WHERE id = ?2",
                params![avatar_id, user.to_string()],
            )
            .map_err(db_err)?;
        Ok(())
    }

    // ---- unlocks ----

    /// Returns true only for the insert that actually created the row, so a
    /// concurrent duplicate never double-reports.
    pub fn insert_badge_unlock(
        &self,
        user: Uuid,
        badge_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, QuestError> {
        let changed = self
            .conn()
            .execute(
                "INSERT INTO user_badges (user_id, badge_id, earned_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(user_id, badge_id) DO NOTHING",
                params![user.to_string(), badge_id, now],
            )
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    pub fn insert_avatar_unlock(
        &self,
        user: Uuid,
        avatar_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, QuestError> {
        let changed = self
            .conn()
            .execute(
                "INSERT INTO user_avatars (user_id, avatar_id, unlocked_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(user_id, avatar_id) DO NOTHING",
                params![user.to_string(), avatar_id, now],
            )
            .map_err(db_err)?;
        Ok(changed > 0)
    }

    pub fn unlocked_badges(&self, user: Uuid) -> Result<HashSet<String>, QuestError> {
        self.unlocked_ids("SELECT badge_id FROM user_badges WHERE user_id = ?1", user)
    }

    pub fn unlocked_avatars(&self, user: Uuid) -> Result<HashSet<String>, QuestError> {
        self.unlocked_ids("SELECT avatar_id FROM user_avatars WHERE user_id = ?1", user)
    }

    fn unlocked_ids(&self, sql: &str, user: Uuid) -> Result<HashSet<String>, QuestError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql).map_err(db_err)?;
        let rows = stmt
            .query_map(params![user.to_string()], |row| row.get::<_, String>(0))
            .map_err(db_err)?;
        rows.collect::<Result<HashSet<_>, _>>().map_err(db_err)
    }

    // ---- challenges ----

    pub fn user_challenge(&self, user: Uuid, challenge_id: &str) -> Result<UserChallenge, QuestError> {
        let row = self
            .conn()
            .query_row(
                "SELECT progress, completed FROM user_challenges \
                 WHERE user_id = ?1 AND challenge_id = ?2",
                params![user.to_string(), challenge_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, bool>(1)?)),
            )
            .optional()
            .map_err(db_err)?;

        let (progress, completed) = row.unwrap_or((0, false));
        Ok(UserChallenge {
            user_id: user,
            challenge_id: challenge_id.to_string(),
            progress,
            completed,
        })
    }

    pub fn upsert_user_challenge(&self, row: &UserChallenge) -> Result<(), QuestError> {
        self.conn()
            .execute(
                "INSERT INTO user_challenges (user_id, challenge_id, progress, completed) \
                 VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(user_id, challenge_id) DO UPDATE SET \
                     progress = excluded.progress, \
                     completed = MAX(completed, excluded.completed)",
                params![row.user_id.to_string(), row.challenge_id, row.progress, row.completed],
            )
            .map_err(db_err)?;
        Ok(())
    }

    // ---- sweep ----

    pub fn list_overdue_unpenalized(&self, now: DateTime<Utc>) -> Result<Vec<Task>, QuestError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM tasks \
                 WHERE completed = 0 AND penalty_applied = 0 AND deadline < ?1",
                TASK_COLUMNS
            ))
            .map_err(db_err)?;
        let rows = stmt.query_map(params![now], task_from_row).map_err(db_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(db_err)
    }

    /// Charge one overdue task. Compare-and-set on penalty_applied and the
    /// penalty delta commit together, so interleaved sweep passes cannot
    /// double-charge and a failed write leaves the task chargeable.
    pub fn apply_penalty(&self, task_id: Uuid, delta: &PointDelta) -> Result<bool, QuestError> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(db_err)?;

        let changed = tx
            .execute(
                "UPDATE tasks SET penalty_applied = 1 \
                 WHERE id = ?1 AND penalty_applied = 0 AND completed = 0",
                params![task_id.to_string()],
            )
            .map_err(db_err)?;
        if changed == 0 {
            return Ok(false);
        }

        record_event(&tx, delta)?;
        tx.execute(
            "UPDATE profiles SET total_points = MAX(total_points + ?1, 0) WHERE id = ?2",
            params![delta.amount, delta.user_id.to_string()],
        )
        .map_err(db_err)?;

        tx.commit().map_err(db_err)?;
        Ok(true)
    }
}

fn record_event(conn: &Connection, delta: &PointDelta) -> Result<(), QuestError> {
    conn.execute(
        "INSERT INTO point_events (user_id, kind, amount, reference, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            delta.user_id.to_string(),
            delta.kind.to_string(),
            delta.amount,
            delta.reference,
            delta.timestamp,
        ],
    )
    .map_err(db_err)?;
    Ok(())
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let id: String = row.get(0)?;
    let owner: String = row.get(1)?;
    let priority: String = row.get(5)?;
    let category: Option<String> = row.get(6)?;

    Ok(Task {
        id: uuid_field(0, &id)?,
        owner: uuid_field(1, &owner)?,
        title: row.get(2)?,
        description: row.get(3)?,
        deadline: row.get(4)?,
        priority: Priority::parse_lossy(&priority),
        category: category.as_deref().and_then(Category::parse),
        points: row.get(7)?,
        completed: row.get(8)?,
        completed_at: row.get(9)?,
        penalty_applied: row.get(10)?,
        created_at: row.get(11)?,
    })
}

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    let id: String = row.get(0)?;
    Ok(Profile {
        id: uuid_field(0, &id)?,
        total_points: row.get(1)?,
        tasks_completed: row.get(2)?,
        current_streak: row.get(3)?,
        longest_streak: row.get(4)?,
        current_combo: row.get(5)?,
        highest_combo: row.get(6)?,
        selected_avatar_id: row.get(7)?,
        last_completed_date: row.get(8)?,
        last_claimed_date: row.get(9)?,
    })
}

fn uuid_field(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_common::ledger::PointDeltaKind;

    fn open_store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.db")).unwrap();
        (dir, store)
    }

    fn sample_task(owner: Uuid, deadline: DateTime<Utc>) -> Task {
        Task {
            id: Uuid::new_v4(),
            owner,
            title: "write report".to_string(),
            description: None,
            deadline,
            priority: Priority::High,
            category: Some(Category::Work),
            points: 30,
            completed: false,
            completed_at: None,
            penalty_applied: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_task_roundtrip() {
        let (_dir, store) = open_store();
        let owner = Uuid::new_v4();
        let task = sample_task(owner, Utc::now());
        store.create_task(&task).unwrap();

        let loaded = store.get_task(owner, task.id).unwrap();
        assert_eq!(loaded.title, task.title);
        assert_eq!(loaded.priority, Priority::High);
        assert_eq!(loaded.category, Some(Category::Work));
        assert_eq!(loaded.points, 30);
        assert!(!loaded.completed);
    }

    #[test]
    fn test_task_is_owner_scoped() {
        let (_dir, store) = open_store();
        let task = sample_task(Uuid::new_v4(), Utc::now());
        store.create_task(&task).unwrap();
        assert!(store.get_task(Uuid::new_v4(), task.id).is_err());
    }

    #[test]
    fn test_penalty_cas_is_single_shot() {
        let (_dir, store) = open_store();
        let owner = Uuid::new_v4();
        store.get_or_create_profile(owner).unwrap();
        let task = sample_task(owner, Utc::now() - chrono::Duration::hours(1));
        store.create_task(&task).unwrap();

        let delta = PointDelta::new(owner, PointDeltaKind::OverduePenalty, -6);
        assert!(store.apply_penalty(task.id, &delta).unwrap());
        assert!(!store.apply_penalty(task.id, &delta).unwrap());

        // Clamped at zero: profile started empty.
        let profile = store.get_or_create_profile(owner).unwrap();
        assert_eq!(profile.total_points, 0);
    }

    #[test]
    fn test_badge_unlock_unique() {
        let (_dir, store) = open_store();
        let user = Uuid::new_v4();
        let now = Utc::now();
        assert!(store.insert_badge_unlock(user, "first_task", now).unwrap());
        assert!(!store.insert_badge_unlock(user, "first_task", now).unwrap());
        assert_eq!(store.unlocked_badges(user).unwrap().len(), 1);
    }

    #[test]
    fn test_claim_daily_cas() {
        let (_dir, store) = open_store();
        let user = Uuid::new_v4();
        store.get_or_create_profile(user).unwrap();
        let today = Utc::now().date_naive();

        let delta = PointDelta::new(user, PointDeltaKind::DailyReward, 20);
        assert!(store.claim_daily(&delta, today).unwrap());
        assert!(!store.claim_daily(&delta, today).unwrap());

        let profile = store.get_or_create_profile(user).unwrap();
        assert_eq!(profile.total_points, 20);
        assert_eq!(profile.last_claimed_date, Some(today));
    }
}
