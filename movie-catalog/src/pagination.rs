//! Page/page-size policy for listing movies
//!
//! External callers send `page` and `per_page` as optional strings. They are
//! normalized into a [`PageRequest`], from which the store-level skip/limit
//! pair is derived:
//!
//! ```rust
//! use movie_catalog::pagination::PageRequest;
//!
//! let page = PageRequest::normalize(Some("3"), Some("20")).unwrap();
//! assert_eq!(page.skip(), 40);
//! assert_eq!(page.limit(), 20);
//! ```

use crate::models::Movie;

/// Page used when the caller sends none.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the caller sends none.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Largest `page` or `per_page` accepted; both travel as int32 on the wire.
pub const MAX_PAGE_VALUE: u32 = i32::MAX as u32;

/// Rejected pagination input.
///
/// The `Display` output is the client-facing reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// `page` was present but not a positive integer.
    #[error("invalid page")]
    InvalidPage,

    /// `per_page` was present but not a positive integer, or above the cap.
    #[error("invalid per_page")]
    InvalidPerPage,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validates already-typed pagination values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if either value is not in `1..=MAX_PAGE_VALUE`.
    pub fn new(page: i64, per_page: i64) -> Result<Self, ValidationError> {
        let page = u32::try_from(page)
            .ok()
            .filter(in_range)
            .ok_or(ValidationError::InvalidPage)?;
        let per_page = u32::try_from(per_page)
            .ok()
            .filter(in_range)
            .ok_or(ValidationError::InvalidPerPage)?;
        Ok(Self { page, per_page })
    }

    /// Normalizes raw query parameters, applying defaults for absent ones.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a present parameter is not a positive integer.
    pub fn normalize(page: Option<&str>, per_page: Option<&str>) -> Result<Self, ValidationError> {
        let page = match page {
            Some(raw) => parse_positive(raw).ok_or(ValidationError::InvalidPage)?,
            None => DEFAULT_PAGE,
        };
        let per_page = match per_page {
            Some(raw) => parse_positive(raw).ok_or(ValidationError::InvalidPerPage)?,
            None => DEFAULT_PER_PAGE,
        };
        Ok(Self { page, per_page })
    }

    /// Rejects page sizes above `max`, when a cap is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPerPage`] if `per_page` exceeds `max`.
    pub fn with_max_per_page(self, max: Option<u32>) -> Result<Self, ValidationError> {
        match max {
            Some(max) if self.per_page > max => Err(ValidationError::InvalidPerPage),
            _ => Ok(self),
        }
    }

    /// The 1-indexed page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The page size.
    #[must_use]
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of records to skip in the store.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        (self.page as u64 - 1) * self.per_page as u64
    }

    /// Maximum number of records to return from the store.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.per_page as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

fn in_range(n: &u32) -> bool {
    (1..=MAX_PAGE_VALUE).contains(n)
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(in_range)
}

/// One page of movies plus the approximate collection size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    /// Movies in store iteration order.
    pub movies: Vec<Movie>,
    /// Estimated number of records in the whole collection.
    pub total: u64,
}
