//! Player reviews
//!
//! Validated here, stored elsewhere: the core only emits a
//! `ReviewSubmitted` event carrying the accepted review.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
pub const MAX_COMMENT_CHARS: usize = 50;
pub const MAX_REVIEWER_CHARS: usize = 3;
const FORBIDDEN_CHARS: [char; 4] = [':', ';', '{', '}'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Star rating, 1 to 5
    pub rating: u8,
    pub initials: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    RatingOutOfRange(u8),
    CommentTooLong(usize),
    ForbiddenCharacter(char),
    InitialsTooLong(usize),
}

impl fmt::Display for ReviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewError::RatingOutOfRange(r) => {
                write!(f, "rating {r} is outside {MIN_RATING}-{MAX_RATING}")
            }
            ReviewError::CommentTooLong(n) => {
                write!(f, "comment is {n} characters, limit is {MAX_COMMENT_CHARS}")
            }
            ReviewError::ForbiddenCharacter(c) => {
                write!(f, "comment cannot contain '{c}'")
            }
            ReviewError::InitialsTooLong(n) => {
                write!(f, "initials are {n} characters, limit is {MAX_REVIEWER_CHARS}")
            }
        }
    }
}

impl std::error::Error for ReviewError {}

impl Review {
    pub fn new(
        rating: u8,
        initials: impl Into<String>,
        comment: impl Into<String>,
    ) -> Result<Self, ReviewError> {
        let review = Self {
            rating,
            initials: initials.into().trim().to_string(),
            comment: comment.into(),
        };
        review.validate()?;
        Ok(review)
    }

    pub fn validate(&self) -> Result<(), ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(ReviewError::RatingOutOfRange(self.rating));
        }
        if let Some(c) = self.comment.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Err(ReviewError::ForbiddenCharacter(c));
        }
        let comment_len = self.comment.chars().count();
        if comment_len > MAX_COMMENT_CHARS {
            return Err(ReviewError::CommentTooLong(comment_len));
        }
        let initials_len = self.initials.chars().count();
        if initials_len > MAX_REVIEWER_CHARS {
            return Err(ReviewError::InitialsTooLong(initials_len));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_review() {
        let review = Review::new(5, " abc ", "fun little game").expect("valid");
        assert_eq!(review.initials, "abc");
        assert_eq!(review.rating, 5);
    }

    #[test]
    fn test_rating_bounds() {
        assert_eq!(Review::new(0, "", ""), Err(ReviewError::RatingOutOfRange(0)));
        assert_eq!(Review::new(6, "", ""), Err(ReviewError::RatingOutOfRange(6)));
        assert!(Review::new(1, "", "").is_ok());
    }

    #[test]
    fn test_comment_rules() {
        assert_eq!(
            Review::new(3, "ABC", "a: b"),
            Err(ReviewError::ForbiddenCharacter(':'))
        );
        assert_eq!(
            Review::new(3, "ABC", "{}"),
            Err(ReviewError::ForbiddenCharacter('{'))
        );
        assert!(Review::new(3, "ABC", "x".repeat(50)).is_ok());
        assert_eq!(
            Review::new(3, "ABC", "x".repeat(51)),
            Err(ReviewError::CommentTooLong(51))
        );
    }

    #[test]
    fn test_initials_limit() {
        assert_eq!(
            Review::new(4, "ABCD", ""),
            Err(ReviewError::InitialsTooLong(4))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ReviewError::ForbiddenCharacter(';').to_string(),
            "comment cannot contain ';'"
        );
        assert_eq!(
            ReviewError::RatingOutOfRange(9).to_string(),
            "rating 9 is outside 1-5"
        );
    }
}
