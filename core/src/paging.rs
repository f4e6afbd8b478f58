//! Pagination and sorting for event listings.

use serde::Serialize;
use std::str::FromStr;

/// Default page size.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Upper bound on the page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Sortable event property.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortProperty {
    /// By identifier (insertion order).
    #[default]
    Id,
    /// By name.
    Name,
    /// By event start.
    BeginEventDateTime,
}

impl SortProperty {
    /// Wire name of the property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::BeginEventDateTime => "beginEventDateTime",
        }
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Sort order for a listing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sort {
    /// Property to sort by.
    pub property: SortProperty,
    /// Direction.
    pub direction: Direction,
}

/// Error parsing a sort expression.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
#[error("Invalid sort expression: {0}")]
pub struct InvalidSort(pub String);

impl FromStr for Sort {
    type Err = InvalidSort;

    /// Parses `property[,asc|desc]`, e.g. `name,desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(str::trim);
        let property = match parts.next().unwrap_or_default() {
            "id" => SortProperty::Id,
            "name" => SortProperty::Name,
            "beginEventDateTime" => SortProperty::BeginEventDateTime,
            _ => return Err(InvalidSort(s.to_string())),
        };
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => Direction::Asc,
            Some("desc") => Direction::Desc,
            Some(_) => return Err(InvalidSort(s.to_string())),
        };
        if parts.next().is_some() {
            return Err(InvalidSort(s.to_string()));
        }
        Ok(Self {
            property,
            direction,
        })
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let direction = match self.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        write!(f, "{},{direction}", self.property.as_str())
    }
}

/// Which page of a listing to fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page number.
    pub page: usize,
    /// Page size, clamped to `1..=MAX_PAGE_SIZE`.
    pub size: usize,
    /// Sort order.
    pub sort: Sort,
}

impl PageRequest {
    /// Creates a request, clamping `size` into range.
    #[must_use]
    pub fn new(page: usize, size: usize, sort: Sort) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
        }
    }

    /// Index of the first element on this page.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Whether the offset of this page fits a signed 64-bit row offset.
    #[must_use]
    pub fn is_addressable(&self) -> bool {
        self.page
            .checked_mul(self.size)
            .is_some_and(|offset| i64::try_from(offset).is_ok())
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE, Sort::default())
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Elements on this page.
    pub content: Vec<T>,
    /// Zero-based page number.
    pub number: usize,
    /// Requested page size.
    pub size: usize,
    /// Total elements across all pages.
    pub total_elements: usize,
}

impl<T> Page<T> {
    /// Creates a page for `request`.
    #[must_use]
    pub const fn new(content: Vec<T>, request: &PageRequest, total_elements: usize) -> Self {
        Self {
            content,
            number: request.page,
            size: request.size,
            total_elements,
        }
    }

    /// Total number of pages.
    #[must_use]
    pub const fn total_pages(&self) -> usize {
        self.total_elements.div_ceil(self.size)
    }

    /// Whether a previous page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 0
    }

    /// Whether a following page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages()
    }

    /// Transform the page content.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}
