use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const COMMENT_MIN_LENGTH: usize = 3;
pub const COMMENT_MAX_LENGTH: usize = 10_000;

/// 送信前バリデーションの失敗理由。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ValidationFailureKind {
    /// 汎用的なバリデーションエラー。
    Generic,
    /// 本文が空、または空白のみ。
    ContentEmpty,
    /// 本文が最小文字数に満たない。
    ContentTooShort,
    /// 本文が最大文字数を超過。
    ContentTooLong,
    /// 投稿・コメント ID が不正（0 以下やプレースホルダー ID）。
    InvalidIdentifier,
}

impl ValidationFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationFailureKind::Generic => "generic",
            ValidationFailureKind::ContentEmpty => "content_empty",
            ValidationFailureKind::ContentTooShort => "content_too_short",
            ValidationFailureKind::ContentTooLong => "content_too_long",
            ValidationFailureKind::InvalidIdentifier => "invalid_identifier",
        }
    }
}

impl fmt::Display for ValidationFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationFailureKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" => Ok(ValidationFailureKind::Generic),
            "content_empty" => Ok(ValidationFailureKind::ContentEmpty),
            "content_too_short" => Ok(ValidationFailureKind::ContentTooShort),
            "content_too_long" => Ok(ValidationFailureKind::ContentTooLong),
            "invalid_identifier" => Ok(ValidationFailureKind::InvalidIdentifier),
            _ => Err(()),
        }
    }
}

/// コメント本文を検証し、前後の空白を除いた本文を返す
pub fn validate_comment_content(content: &str) -> Result<String, AppError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(
            ValidationFailureKind::ContentEmpty,
            "Comment cannot be empty",
        ));
    }

    let length = trimmed.chars().count();
    if length < COMMENT_MIN_LENGTH {
        return Err(AppError::validation(
            ValidationFailureKind::ContentTooShort,
            format!("Comment must be at least {COMMENT_MIN_LENGTH} characters"),
        ));
    }
    if length > COMMENT_MAX_LENGTH {
        return Err(AppError::validation(
            ValidationFailureKind::ContentTooLong,
            format!("Comment must be at most {COMMENT_MAX_LENGTH} characters"),
        ));
    }

    Ok(trimmed.to_string())
}

pub fn validate_identifier(id: i64, label: &str) -> Result<(), AppError> {
    if id <= 0 {
        return Err(AppError::validation(
            ValidationFailureKind::InvalidIdentifier,
            format!("Invalid {label} id: {id}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_comment_content_trims() {
        assert_eq!(validate_comment_content("  hello  ").unwrap(), "hello");
    }

    #[test]
    fn test_validate_comment_content_rejects_short_and_blank() {
        let blank = validate_comment_content("   ").unwrap_err();
        assert!(matches!(
            blank,
            AppError::ValidationError {
                kind: ValidationFailureKind::ContentEmpty,
                ..
            }
        ));

        let short = validate_comment_content("hi").unwrap_err();
        assert!(matches!(
            short,
            AppError::ValidationError {
                kind: ValidationFailureKind::ContentTooShort,
                ..
            }
        ));
    }

    #[test]
    fn test_validate_identifier_rejects_placeholder() {
        assert!(validate_identifier(-1, "comment").is_err());
        assert!(validate_identifier(0, "post").is_err());
        assert!(validate_identifier(7, "post").is_ok());
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        let kind: ValidationFailureKind = "content_too_long".parse().unwrap();
        assert_eq!(kind, ValidationFailureKind::ContentTooLong);
        assert!("unknown".parse::<ValidationFailureKind>().is_err());
    }
}
