//! Rebuilding parent/child collections from a flattened join
//!
//! A `users LEFT JOIN articles LEFT JOIN comments` result carries one record
//! per user × article × comment combination, so a user reappears once for
//! every comment under every one of its articles. The flattener keeps the
//! first occurrence of each id and drops the repeats, which keeps output
//! order equal to first-appearance order in the input.

use crate::model::{Article, Comment, Graph, User};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Incremental deduplicator for joined records
#[derive(Debug, Default)]
pub struct JoinFlattener {
    graph: Graph,
    users: HashMap<i64, usize>,
    articles: HashMap<i64, usize>,
    comments: HashMap<i64, usize>,
}

impl JoinFlattener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one joined record
    ///
    /// Zero-valued records from the missing side of an outer join are kept
    /// like any other id (once, as id 0).
    pub fn push(&mut self, user: User, article: Article, comment: Comment) {
        if let Entry::Vacant(slot) = self.users.entry(user.id) {
            slot.insert(self.graph.users.len());
            self.graph.users.push(user);
        }
        if let Entry::Vacant(slot) = self.articles.entry(article.id) {
            slot.insert(self.graph.articles.len());
            self.graph.articles.push(article);
        }
        if let Entry::Vacant(slot) = self.comments.entry(comment.id) {
            slot.insert(self.graph.comments.len());
            self.graph.comments.push(comment);
        }
    }

    pub fn finish(self) -> Graph {
        self.graph
    }
}

/// Deduplicate a complete stream of joined records
pub fn flatten<I>(records: I) -> Graph
where
    I: IntoIterator<Item = (User, Article, Comment)>,
{
    let mut flattener = JoinFlattener::new();
    for (user, article, comment) in records {
        flattener.push(user, article, comment);
    }
    flattener.finish()
}
