//! Schema and tuning statements
//!
//! Every scenario starts from a fresh file, applies one of the journal
//! profiles below and then creates the three tables. The PRAGMA values are
//! handed to the engine as-is.

use crate::db::Db;
use crate::error::DbResult;

/// Row-by-row insert statements
pub const INSERT_USER_SQL: &str = "INSERT INTO users(id,created,email,active) VALUES(?,?,?,?)";
pub const INSERT_ARTICLE_SQL: &str =
    "INSERT INTO articles(id,created,userId,text) VALUES(?,?,?,?)";
pub const INSERT_COMMENT_SQL: &str =
    "INSERT INTO comments(id,created,articleId,text) VALUES(?,?,?,?)";

/// Bulk insert template; `%s` is replaced by the repeated value tuples
pub const INSERT_USERS_BULK_SQL: &str = "INSERT INTO users(id,created,email,active) VALUES %s";

/// All users in id order
pub const SELECT_USERS_SQL: &str = "SELECT id,created,email,active FROM users ORDER BY id";

/// All articles in id order
pub const SELECT_ARTICLES_SQL: &str = "SELECT id,created,userId,text FROM articles ORDER BY id";

/// Users, articles and comments in one LEFT JOIN, ordered by creation time
pub const SELECT_USERS_ARTICLES_COMMENTS_SQL: &str = "SELECT \
     users.id, users.created, users.email, users.active, \
     articles.id, articles.created, articles.userId, articles.text, \
     comments.id, comments.created, comments.articleId, comments.text \
     FROM users \
     LEFT JOIN articles ON articles.userId = users.id \
     LEFT JOIN comments ON comments.articleId = articles.id \
     ORDER BY users.created, articles.created, comments.created";

/// Users whose id lies in `[first, last]`, in id order
pub fn select_users_between(first: i64, last: i64) -> String {
    format!(
        "SELECT id,created,email,active FROM users WHERE id BETWEEN {} AND {} ORDER BY id",
        first, last
    )
}

/// Rollback journal, full sync
pub const JOURNAL_DELETE_PRAGMAS: &[&str] = &[
    "PRAGMA journal_mode=DELETE",
    "PRAGMA synchronous=FULL",
    "PRAGMA foreign_keys=1",
    "PRAGMA busy_timeout=5000",
];

/// Write-ahead log, normal sync, long busy timeout for concurrent writers
pub const JOURNAL_WAL_PRAGMAS: &[&str] = &[
    "PRAGMA journal_mode=WAL",
    "PRAGMA synchronous=normal",
    "PRAGMA foreign_keys=1",
    "PRAGMA busy_timeout=20000",
];

/// Applied by every concurrent reader connection
pub const READER_PRAGMAS: &[&str] = &["PRAGMA foreign_keys=1", "PRAGMA busy_timeout=5000"];

const CREATE_SCHEMA: &[&str] = &[
    "CREATE TABLE users (\
     id INTEGER PRIMARY KEY NOT NULL, \
     created INTEGER NOT NULL, \
     email TEXT NOT NULL, \
     active INTEGER NOT NULL)",
    "CREATE INDEX users_created ON users(created)",
    "CREATE TABLE articles (\
     id INTEGER PRIMARY KEY NOT NULL, \
     created INTEGER NOT NULL, \
     userId INTEGER NOT NULL REFERENCES users(id), \
     text TEXT NOT NULL)",
    "CREATE INDEX articles_created ON articles(created)",
    "CREATE INDEX articles_userId ON articles(userId)",
    "CREATE TABLE comments (\
     id INTEGER PRIMARY KEY NOT NULL, \
     created INTEGER NOT NULL, \
     articleId INTEGER NOT NULL REFERENCES articles(id), \
     text TEXT NOT NULL)",
    "CREATE INDEX comments_created ON comments(created)",
    "CREATE INDEX comments_articleId ON comments(articleId)",
];

/// Journal profile applied before the schema is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Journal {
    Delete,
    Wal,
}

impl Journal {
    pub fn pragmas(self) -> &'static [&'static str] {
        match self {
            Journal::Delete => JOURNAL_DELETE_PRAGMAS,
            Journal::Wal => JOURNAL_WAL_PRAGMAS,
        }
    }
}

/// Apply the journal profile and create tables and indexes
pub fn init(db: &mut dyn Db, journal: Journal) -> DbResult<()> {
    db.exec(journal.pragmas())?;
    db.exec(CREATE_SCHEMA)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::SqliteDb;

    #[test]
    fn test_init_creates_tables_and_indexes() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        init(&mut db, Journal::Delete).unwrap();

        let tables: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('users','articles','comments')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 3);

        let indexes: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name NOT LIKE 'sqlite_%'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 5);
    }

    #[test]
    fn test_select_between() {
        assert_eq!(
            select_users_between(11, 20),
            "SELECT id,created,email,active FROM users WHERE id BETWEEN 11 AND 20 ORDER BY id"
        );
    }

    #[test]
    fn test_init_twice_fails_on_existing_table() {
        let mut db = SqliteDb::open_in_memory().unwrap();
        init(&mut db, Journal::Delete).unwrap();
        let err = init(&mut db, Journal::Delete).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Exec);
    }
}
