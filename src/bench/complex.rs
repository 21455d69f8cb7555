//! Three-table join scenario
//!
//! Inserts users, their articles and the articles' comments, reads them all
//! back through one `users LEFT JOIN articles LEFT JOIN comments` query and
//! checks the deduplicated result against the generated graph.

use crate::bench::validate::{expect_parent_keys, expect_rows};
use crate::bench::{close_and_measure, elapsed_ms, fresh_db, BenchContext, ScenarioReport};
use crate::db::schema::{
    INSERT_ARTICLE_SQL, INSERT_COMMENT_SQL, INSERT_USER_SQL, SELECT_USERS_ARTICLES_COMMENTS_SQL,
};
use crate::db::Journal;
use crate::error::{Result, ValidationResult};
use crate::model::{user_graph, Graph};
use std::time::Instant;

pub fn complex(
    ctx: &BenchContext<'_>,
    name: String,
    users: usize,
    articles_per_user: usize,
    comments_per_article: usize,
) -> Result<ScenarioReport> {
    let mut db = fresh_db(ctx, Journal::Delete)?;
    let graph = user_graph(users, articles_per_user, comments_per_article);

    let started = Instant::now();
    db.insert_users(INSERT_USER_SQL, &graph.users)?;
    db.insert_articles(INSERT_ARTICLE_SQL, &graph.articles)?;
    db.insert_comments(INSERT_COMMENT_SQL, &graph.comments)?;
    let insert = elapsed_ms(started);

    let started = Instant::now();
    let found = db.find_users_articles_comments(SELECT_USERS_ARTICLES_COMMENTS_SQL)?;
    let query = elapsed_ms(started);
    check_graph(&graph, without_placeholders(found), users, articles_per_user)?;

    let report = ScenarioReport::new(name, db.driver_name())
        .with("insert", insert)
        .with("query", query);
    close_and_measure(ctx, db, report)
}

/// Drop the id-0 records an outer join yields for users without articles
/// (or articles without comments)
fn without_placeholders(mut graph: Graph) -> Graph {
    graph.articles.retain(|a| a.id != 0);
    graph.comments.retain(|c| c.id != 0);
    graph
}

/// Exact comparison plus foreign-key range and ordering checks
pub fn check_graph(
    expected: &Graph,
    found: Graph,
    users: usize,
    articles_per_user: usize,
) -> ValidationResult<()> {
    expect_rows(&expected.users, &found.users)?;
    expect_rows(&expected.articles, &found.articles)?;
    expect_rows(&expected.comments, &found.comments)?;

    expect_parent_keys(
        "articles",
        "user_id",
        found.articles.iter().map(|a| (a.id, a.user_id)),
        1,
        users as i64,
    )?;
    expect_parent_keys(
        "comments",
        "article_id",
        found.comments.iter().map(|c| (c.id, c.article_id)),
        1,
        (users * articles_per_user) as i64,
    )
}
