//! Row model and deterministic row generators
//!
//! Identifiers are always assigned here, never by the database. Timestamps
//! are stored as milliseconds since the Unix epoch.

use chrono::{DateTime, Duration, TimeZone, Utc};

/// A user row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub created: DateTime<Utc>,
    pub email: String,
    pub active: bool,
}

impl User {
    pub fn new(id: i64, created: DateTime<Utc>, email: impl Into<String>, active: bool) -> Self {
        Self {
            id,
            created,
            email: email.into(),
            active,
        }
    }
}

/// An article row, child of a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: i64,
    pub created: DateTime<Utc>,
    pub user_id: i64,
    pub text: String,
}

impl Article {
    pub fn new(id: i64, created: DateTime<Utc>, user_id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            created,
            user_id,
            text: text.into(),
        }
    }
}

/// A comment row, child of an article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub created: DateTime<Utc>,
    pub article_id: i64,
    pub text: String,
}

impl Comment {
    pub fn new(id: i64, created: DateTime<Utc>, article_id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            created,
            article_id,
            text: text.into(),
        }
    }
}

/// Convert a timestamp to its stored form
pub fn bind_time(t: &DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

/// Convert a stored value back to a timestamp
///
/// Returns `None` when the value is outside chrono's representable range.
pub fn unbind_time(v: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(v)
}

/// First `created` instant of every generated fixture: 2023-10-01 10:00:00 UTC
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 10, 1, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Users spaced one minute apart with zero-padded emails (`user00000001@example.com`)
pub fn padded_users(n: usize) -> Vec<User> {
    let base = base_time();
    (0..n)
        .map(|i| {
            let id = i as i64 + 1;
            User::new(
                id,
                base + Duration::minutes(i as i64),
                padded_email(id),
                true,
            )
        })
        .collect()
}

/// Users spaced one second apart with plain emails (`user1@example.com`)
pub fn plain_users(n: usize) -> Vec<User> {
    let base = base_time();
    (0..n)
        .map(|i| {
            let id = i as i64 + 1;
            User::new(
                id,
                base + Duration::seconds(i as i64),
                format!("user{}@example.com", id),
                true,
            )
        })
        .collect()
}

/// Users spaced one second apart whose email is `row_size` bytes of `a`
pub fn large_users(n: usize, row_size: usize) -> Vec<User> {
    let base = base_time();
    let payload = "a".repeat(row_size);
    (0..n)
        .map(|i| User::new(i as i64 + 1, base + Duration::seconds(i as i64), payload.clone(), true))
        .collect()
}

pub fn padded_email(id: i64) -> String {
    format!("user{:08}@example.com", id)
}

/// The three related collections of the join scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    pub users: Vec<User>,
    pub articles: Vec<Article>,
    pub comments: Vec<Comment>,
}

/// Build `users` users, each with `articles_per_user` articles, each with
/// `comments_per_article` comments
///
/// Article timestamps are offset from their user by seconds, comment
/// timestamps from their article by milliseconds, so ordering by `created`
/// across all three tables yields the generation order.
pub fn user_graph(users: usize, articles_per_user: usize, comments_per_article: usize) -> Graph {
    let base = base_time();
    let mut graph = Graph {
        users: Vec::with_capacity(users),
        articles: Vec::with_capacity(users * articles_per_user),
        comments: Vec::with_capacity(users * articles_per_user * comments_per_article),
    };

    let mut article_id = 0i64;
    let mut comment_id = 0i64;
    for u in 0..users {
        let user_id = u as i64 + 1;
        let user_created = base + Duration::minutes(u as i64);
        graph
            .users
            .push(User::new(user_id, user_created, padded_email(user_id), u % 2 == 0));

        for a in 0..articles_per_user {
            article_id += 1;
            let article_created = user_created + Duration::seconds(a as i64);
            graph
                .articles
                .push(Article::new(article_id, article_created, user_id, "article text"));

            for c in 0..comments_per_article {
                comment_id += 1;
                graph.comments.push(Comment::new(
                    comment_id,
                    article_created + Duration::milliseconds(c as i64),
                    article_id,
                    "comment text",
                ));
            }
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_time_round_trip() {
        let samples = [
            base_time(),
            base_time() + Duration::milliseconds(123_456_789),
            DateTime::<Utc>::UNIX_EPOCH,
            Utc.with_ymd_and_hms(1901, 12, 13, 20, 45, 52).unwrap(),
            Utc.with_ymd_and_hms(9999, 12, 31, 23, 59, 59).unwrap() + Duration::milliseconds(999),
        ];
        for t in samples {
            assert_eq!(unbind_time(bind_time(&t)), Some(t));
        }
    }

    #[test]
    fn test_unbind_zero_is_epoch() {
        assert_eq!(unbind_time(0), Some(DateTime::<Utc>::UNIX_EPOCH));
        assert_eq!(unbind_time(i64::MAX), None);
    }

    #[test]
    fn test_padded_users() {
        let users = padded_users(3);
        assert_eq!(users.len(), 3);
        assert_eq!(users[0].id, 1);
        assert_eq!(users[2].email, "user00000003@example.com");
        assert_eq!(users[1].created - users[0].created, Duration::minutes(1));
        assert_eq!(users[0].created.year(), 2023);
    }

    #[test]
    fn test_large_users_payload() {
        let users = large_users(2, 50);
        assert_eq!(users[1].email.len(), 50);
        assert!(users[1].email.starts_with('a'));
    }

    #[test]
    fn test_user_graph_shape() {
        let graph = user_graph(3, 4, 5);
        assert_eq!(graph.users.len(), 3);
        assert_eq!(graph.articles.len(), 12);
        assert_eq!(graph.comments.len(), 60);

        assert!(graph.users[0].active);
        assert!(!graph.users[1].active);
        assert_eq!(graph.articles[4].user_id, 2);
        assert_eq!(graph.comments[59].article_id, 12);
        assert_eq!(graph.comments.last().map(|c| c.id), Some(60));
    }
}
