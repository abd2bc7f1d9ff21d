//! Domain movie types

use crate::ids::MovieId;

/// A stored movie. All four fields are always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub director: String,
    pub year: i32,
}

/// A movie submitted for creation; it has no identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub year: i32,
}

impl NewMovie {
    /// Attaches the identifier the store assigned.
    #[must_use]
    pub fn with_id(self, id: MovieId) -> Movie {
        Movie {
            id,
            title: self.title,
            director: self.director,
            year: self.year,
        }
    }
}

/// A required movie field that was missing or out of range.
///
/// The `Display` output is the client-facing reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("title is required")]
    MissingTitle,

    #[error("director is required")]
    MissingDirector,

    #[error("year is required")]
    MissingYear,

    #[error("invalid year")]
    InvalidYear,
}

impl NewMovie {
    /// Checks field presence in order: title, director, year.
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] found. An empty string or a zero year
    /// counts as missing; a negative year is invalid.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.title.is_empty() {
            return Err(FieldError::MissingTitle);
        }
        if self.director.is_empty() {
            return Err(FieldError::MissingDirector);
        }
        match self.year {
            0 => Err(FieldError::MissingYear),
            y if y < 0 => Err(FieldError::InvalidYear),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(title: &str, director: &str, year: i32) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            director: director.to_string(),
            year,
        }
    }

    #[test]
    fn test_valid_movie() {
        assert_eq!(movie("Inception", "Nolan", 2010).validate(), Ok(()));
    }

    #[test]
    fn test_each_field_is_required() {
        assert_eq!(movie("", "X", 2000).validate(), Err(FieldError::MissingTitle));
        assert_eq!(movie("T", "", 2000).validate(), Err(FieldError::MissingDirector));
        assert_eq!(movie("T", "X", 0).validate(), Err(FieldError::MissingYear));
        assert_eq!(movie("T", "X", -1).validate(), Err(FieldError::InvalidYear));
    }

    #[test]
    fn test_title_reported_first() {
        assert_eq!(movie("", "", 0).validate(), Err(FieldError::MissingTitle));
        assert_eq!(movie("T", "", 0).validate(), Err(FieldError::MissingDirector));
    }

    #[test]
    fn test_with_id() {
        let id = MovieId::new();
        let stored = movie("T", "X", 1999).with_id(id);
        assert_eq!(stored.id, id);
        assert_eq!(stored.year, 1999);
    }

    #[test]
    fn test_field_messages() {
        assert_eq!(FieldError::MissingTitle.to_string(), "title is required");
        assert_eq!(FieldError::MissingDirector.to_string(), "director is required");
        assert_eq!(FieldError::MissingYear.to_string(), "year is required");
        assert_eq!(FieldError::InvalidYear.to_string(), "invalid year");
    }
}
