//! Mapping between model rows and SQLite values
//!
//! `BindRow` turns a row into its positional parameters, `Decode` reads a
//! row back starting at a column offset. Decoding tolerates NULL in every
//! column so that the missing side of a LEFT JOIN becomes a zero-valued
//! record (id 0, epoch timestamp, empty text, false).

use crate::error::{DbError, DbResult};
use crate::model::{bind_time, unbind_time, Article, Comment, User};
use chrono::{DateTime, Utc};
use rusqlite::types::ToSqlOutput;
use rusqlite::Row;

/// Fixed column count of a row type
pub trait Columns {
    /// Parameters one row binds, and columns one row occupies in a result
    const COLUMNS: usize;
}

impl Columns for User {
    const COLUMNS: usize = 4;
}

impl Columns for Article {
    const COLUMNS: usize = 4;
}

impl Columns for Comment {
    const COLUMNS: usize = 4;
}

/// A row that can be bound to an insert statement
pub trait BindRow: Columns {
    /// Append this row's parameters in column order
    fn bind<'a>(&'a self, out: &mut Vec<ToSqlOutput<'a>>);
}

/// A row that can be read from a result set
pub trait Decode: Columns + Sized {
    /// Read the row from columns `at..at + COLUMNS`
    fn decode(row: &Row<'_>, at: usize) -> DbResult<Self>;
}

impl BindRow for User {
    fn bind<'a>(&'a self, out: &mut Vec<ToSqlOutput<'a>>) {
        out.push(ToSqlOutput::from(self.id));
        out.push(ToSqlOutput::from(bind_time(&self.created)));
        out.push(ToSqlOutput::from(self.email.as_str()));
        out.push(ToSqlOutput::from(self.active));
    }
}

impl BindRow for Article {
    fn bind<'a>(&'a self, out: &mut Vec<ToSqlOutput<'a>>) {
        out.push(ToSqlOutput::from(self.id));
        out.push(ToSqlOutput::from(bind_time(&self.created)));
        out.push(ToSqlOutput::from(self.user_id));
        out.push(ToSqlOutput::from(self.text.as_str()));
    }
}

impl BindRow for Comment {
    fn bind<'a>(&'a self, out: &mut Vec<ToSqlOutput<'a>>) {
        out.push(ToSqlOutput::from(self.id));
        out.push(ToSqlOutput::from(bind_time(&self.created)));
        out.push(ToSqlOutput::from(self.article_id));
        out.push(ToSqlOutput::from(self.text.as_str()));
    }
}

impl Decode for User {
    fn decode(row: &Row<'_>, at: usize) -> DbResult<Self> {
        Ok(User {
            id: int(row, at)?,
            created: time(row, at + 1, "users.created")?,
            email: text(row, at + 2)?,
            active: boolean(row, at + 3)?,
        })
    }
}

impl Decode for Article {
    fn decode(row: &Row<'_>, at: usize) -> DbResult<Self> {
        Ok(Article {
            id: int(row, at)?,
            created: time(row, at + 1, "articles.created")?,
            user_id: int(row, at + 2)?,
            text: text(row, at + 3)?,
        })
    }
}

impl Decode for Comment {
    fn decode(row: &Row<'_>, at: usize) -> DbResult<Self> {
        Ok(Comment {
            id: int(row, at)?,
            created: time(row, at + 1, "comments.created")?,
            article_id: int(row, at + 2)?,
            text: text(row, at + 3)?,
        })
    }
}

fn int(row: &Row<'_>, idx: usize) -> DbResult<i64> {
    let v: Option<i64> = row.get(idx).map_err(DbError::Scan)?;
    Ok(v.unwrap_or_default())
}

fn text(row: &Row<'_>, idx: usize) -> DbResult<String> {
    let v: Option<String> = row.get(idx).map_err(DbError::Scan)?;
    Ok(v.unwrap_or_default())
}

fn boolean(row: &Row<'_>, idx: usize) -> DbResult<bool> {
    let v: Option<bool> = row.get(idx).map_err(DbError::Scan)?;
    Ok(v.unwrap_or_default())
}

fn time(row: &Row<'_>, idx: usize, column: &'static str) -> DbResult<DateTime<Utc>> {
    let value = int(row, idx)?;
    unbind_time(value).ok_or(DbError::TimestampOutOfRange { column, value })
}
