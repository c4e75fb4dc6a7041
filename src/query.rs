//! Filtered, sorted and paged `SELECT`s for the list endpoints.
//!
//! Table and column names are `&'static str` supplied by the services; every value that
//! comes from a request is attached with `push_bind`, never spliced into the SQL text.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::TaskStatus;
use crate::pagination::PageParams;

/// Creation-time ordering of list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    /// `oldest` selects ascending order; any other value, or none, means newest first.
    pub fn from_param(sort: Option<&str>) -> Self {
        match sort.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("oldest") => SortOrder::Oldest,
            _ => SortOrder::Newest,
        }
    }

    fn direction(self) -> &'static str {
        match self {
            SortOrder::Newest => "DESC",
            SortOrder::Oldest => "ASC",
        }
    }
}

/// Escapes `ILIKE` wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    table: &'static str,
    columns: &'static str,
    owner: Option<Uuid>,
    search: Option<(String, &'static [&'static str])>,
    status: Option<TaskStatus>,
    sort: SortOrder,
}

impl ListQuery {
    pub fn new(table: &'static str, columns: &'static str) -> Self {
        Self {
            table,
            columns,
            owner: None,
            search: None,
            status: None,
            sort: SortOrder::Newest,
        }
    }

    /// Restricts rows to those whose `user_id` is `owner`.
    pub fn owned_by(mut self, owner: Uuid) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Case-insensitive substring match on any of `columns`. Blank terms are ignored.
    pub fn search(mut self, term: Option<&str>, columns: &'static [&'static str]) -> Self {
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty() && !columns.is_empty())
            .map(|t| (like_pattern(t), columns));
        self
    }

    pub fn status(mut self, status: Option<TaskStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    fn push_filters(&self, qb: &mut QueryBuilder<'static, Postgres>) {
        let mut keyword = " WHERE ";

        if let Some(owner) = self.owner {
            qb.push(keyword).push("user_id = ").push_bind(owner);
            keyword = " AND ";
        }

        if let Some((pattern, columns)) = &self.search {
            qb.push(keyword).push("(");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" ILIKE ").push_bind(pattern.clone());
            }
            qb.push(")");
            keyword = " AND ";
        }

        if let Some(status) = self.status {
            qb.push(keyword).push("status = ").push_bind(status);
        }
    }

    /// One page of rows, ordered by creation time.
    pub fn select_page(&self, page: &PageParams) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", self.columns, self.table));
        self.push_filters(&mut qb);

        let direction = self.sort.direction();
        qb.push(format!(" ORDER BY created_at {direction}, id {direction}"));
        qb.push(" LIMIT ").push_bind(page.limit);
        qb.push(" OFFSET ").push_bind(page.offset);
        qb
    }

    /// Number of rows matching the same filters, ignoring paging.
    pub fn count(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.table));
        self.push_filters(&mut qb);
        qb
    }
}
