//! Read-back validation
//!
//! Every scenario compares what it read against what it generated. Checks
//! stop at the first mismatch and report which table, row and field.

use crate::error::{ValidationError, ValidationResult};
use crate::model::{Article, Comment, User};

/// A row that can be compared field by field
pub trait Checked {
    const TABLE: &'static str;

    fn id(&self) -> i64;

    /// First differing field as `(name, expected, actual)`
    fn diff(&self, actual: &Self) -> Option<(&'static str, String, String)>;
}

impl Checked for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }

    fn diff(&self, actual: &Self) -> Option<(&'static str, String, String)> {
        if self.created != actual.created {
            return Some(("created", self.created.to_rfc3339(), actual.created.to_rfc3339()));
        }
        if self.email != actual.email {
            return Some(("email", self.email.clone(), actual.email.clone()));
        }
        if self.active != actual.active {
            return Some(("active", self.active.to_string(), actual.active.to_string()));
        }
        None
    }
}

impl Checked for Article {
    const TABLE: &'static str = "articles";

    fn id(&self) -> i64 {
        self.id
    }

    fn diff(&self, actual: &Self) -> Option<(&'static str, String, String)> {
        if self.created != actual.created {
            return Some(("created", self.created.to_rfc3339(), actual.created.to_rfc3339()));
        }
        if self.user_id != actual.user_id {
            return Some(("user_id", self.user_id.to_string(), actual.user_id.to_string()));
        }
        if self.text != actual.text {
            return Some(("text", self.text.clone(), actual.text.clone()));
        }
        None
    }
}

impl Checked for Comment {
    const TABLE: &'static str = "comments";

    fn id(&self) -> i64 {
        self.id
    }

    fn diff(&self, actual: &Self) -> Option<(&'static str, String, String)> {
        if self.created != actual.created {
            return Some(("created", self.created.to_rfc3339(), actual.created.to_rfc3339()));
        }
        if self.article_id != actual.article_id {
            return Some(("article_id", self.article_id.to_string(), actual.article_id.to_string()));
        }
        if self.text != actual.text {
            return Some(("text", self.text.clone(), actual.text.clone()));
        }
        None
    }
}

pub fn expect_count(what: &'static str, expected: usize, actual: usize) -> ValidationResult<()> {
    if expected != actual {
        return Err(ValidationError::CountMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Row count, then ids position by position, then payload fields
pub fn expect_rows<T: Checked>(expected: &[T], actual: &[T]) -> ValidationResult<()> {
    expect_count(T::TABLE, expected.len(), actual.len())?;

    for (index, (want, got)) in expected.iter().zip(actual).enumerate() {
        if want.id() != got.id() {
            return Err(ValidationError::IdMismatch {
                what: T::TABLE,
                index,
                expected: want.id(),
                actual: got.id(),
            });
        }
        if let Some((field, expected, actual)) = want.diff(got) {
            return Err(ValidationError::FieldMismatch {
                what: T::TABLE,
                id: want.id(),
                field,
                expected,
                actual,
            });
        }
    }
    Ok(())
}

/// Foreign keys must stay within `[min, max]` and never decrease
///
/// `keys` yields `(row id, parent id)` in result order.
pub fn expect_parent_keys<I>(
    what: &'static str,
    field: &'static str,
    keys: I,
    min: i64,
    max: i64,
) -> ValidationResult<()>
where
    I: IntoIterator<Item = (i64, i64)>,
{
    let mut previous = min;
    for (id, value) in keys {
        if value < min || value > max {
            return Err(ValidationError::OutOfRange {
                what,
                id,
                field,
                value,
                min,
                max,
            });
        }
        if value < previous {
            return Err(ValidationError::OutOfOrder {
                what,
                id,
                field,
                value,
                previous,
            });
        }
        previous = value;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{padded_users, user_graph};

    #[test]
    fn test_identical_rows_pass() {
        let users = padded_users(20);
        expect_rows(&users, &users.clone()).unwrap();

        let graph = user_graph(2, 3, 4);
        expect_rows(&graph.articles, &graph.articles).unwrap();
        expect_rows(&graph.comments, &graph.comments).unwrap();
        expect_rows::<User>(&[], &[]).unwrap();
    }

    #[test]
    fn test_count_mismatch() {
        let users = padded_users(5);
        let err = expect_rows(&users, &users[..4]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::CountMismatch {
                what: "users",
                expected: 5,
                actual: 4
            }
        );
    }

    #[test]
    fn test_id_mismatch() {
        let users = padded_users(5);
        let mut read = users.clone();
        read.swap(1, 2);
        let err = expect_rows(&users, &read).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::IdMismatch {
                index: 1,
                expected: 2,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_field_mismatch() {
        let users = padded_users(3);
        let mut read = users.clone();
        read[2].active = false;
        let err = expect_rows(&users, &read).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::FieldMismatch {
                id: 3,
                field: "active",
                ..
            }
        ));

        let graph = user_graph(1, 2, 1);
        let mut comments = graph.comments.clone();
        comments[1].text = "changed".into();
        let err = expect_rows(&graph.comments, &comments).unwrap_err();
        assert!(err.to_string().contains("'text'"));
    }

    #[test]
    fn test_parent_keys() {
        expect_parent_keys("articles", "user_id", [(1, 1), (2, 1), (3, 2)], 1, 2).unwrap();

        let err = expect_parent_keys("articles", "user_id", [(1, 1), (2, 3)], 1, 2).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { id: 2, value: 3, .. }));

        let err = expect_parent_keys("articles", "user_id", [(1, 2), (2, 1)], 1, 2).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfOrder {
                value: 1,
                previous: 2,
                ..
            }
        ));
    }
}
