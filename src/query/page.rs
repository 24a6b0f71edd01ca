use serde::{Deserialize, Serialize};
use std::fmt;

use super::executor::QueryError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }

    /// Parses `field` or `field,asc` / `field,desc`.
    ///
    /// Only the syntax is checked here; whether the field is sortable is up to
    /// the executor.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        let (field, direction) = match raw.split_once(',') {
            None => (raw.trim(), Direction::Asc),
            Some((field, direction)) => {
                let direction = match direction.trim().to_ascii_lowercase().as_str() {
                    "asc" => Direction::Asc,
                    "desc" => Direction::Desc,
                    _ => return Err(QueryError::InvalidSort(raw.to_string())),
                };
                (field.trim(), direction)
            }
        };
        if field.is_empty() {
            return Err(QueryError::InvalidSort(raw.to_string()));
        }
        Ok(match direction {
            Direction::Asc => Self::asc(field),
            Direction::Desc => Self::desc(field),
        })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Asc => write!(f, "{},asc", self.field),
            Direction::Desc => write!(f, "{},desc", self.field),
        }
    }
}

/// Zero-based page number, page size and ordering for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Sort) -> Self {
        Self { page, size, sort }
    }

    pub fn offset(&self) -> usize {
        self.page as usize * self.size as usize
    }
}

/// One slice of a result set plus the metadata needed to fetch the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub has_next: bool,
}

impl<T> Page<T> {
    /// Cuts the requested page out of a complete, already ordered result set.
    pub fn slice(rows: Vec<T>, request: &PageRequest) -> Self {
        let total = rows.len();
        let size = request.size.max(1) as usize;
        let total_pages = total.div_ceil(size);
        let content = rows
            .into_iter()
            .skip(request.offset())
            .take(size)
            .collect();

        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements: total as u64,
            total_pages: total_pages as u32,
            has_next: (request.page as usize) + 1 < total_pages,
        }
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            has_next: self.has_next,
        }
    }
}
