//! User Name Value Object
//!
//! ユーザー名はログインと画面表示に使う公開ハンドル。
//!
//! ## 不変条件
//! - NFKC 正規化・前後空白除去の後で 3〜50 文字
//! - 使用可能文字: ASCII 英数字と `_ . - @ +`（メールアドレス形式のユーザー名を許容）
//! - 英数字を最低 1 文字含む
//! - 大文字小文字は区別する（保存値そのままで一意）

use serde::Serialize;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

pub const USER_NAME_MIN_LENGTH: usize = 3;
pub const USER_NAME_MAX_LENGTH: usize = 50;

const ALLOWED_SPECIAL_CHARS: &[char] = &['_', '.', '-', '@', '+'];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserNameError {
    #[error("Username must be between 3 and 50 characters")]
    Length,

    #[error("Username may only contain letters, digits and _ . - @ +")]
    InvalidCharacter,

    #[error("Username must contain at least one letter or digit")]
    NoAlphanumeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    pub fn new(raw: &str) -> Result<Self, UserNameError> {
        let normalized: String = raw.nfkc().collect::<String>().trim().to_string();

        let len = normalized.chars().count();
        if !(USER_NAME_MIN_LENGTH..=USER_NAME_MAX_LENGTH).contains(&len) {
            return Err(UserNameError::Length);
        }

        if !normalized
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || ALLOWED_SPECIAL_CHARS.contains(&c))
        {
            return Err(UserNameError::InvalidCharacter);
        }

        if !normalized.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(UserNameError::NoAlphanumeric);
        }

        Ok(Self(normalized))
    }

    /// Stored values were validated on the way in
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_names() {
        for name in ["alice", "admin", "j.doe-2", "admin@admin.com", "ab_"] {
            assert!(UserName::new(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_trims_and_normalizes() {
        assert_eq!(UserName::new("  alice ").unwrap().as_str(), "alice");
        // full-width letters fold to ASCII under NFKC
        assert_eq!(UserName::new("ａｌｉｃｅ").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_case_is_preserved() {
        assert_eq!(UserName::new("Alice").unwrap().as_str(), "Alice");
    }

    #[test]
    fn test_invalid_user_names() {
        assert_eq!(UserName::new("ab"), Err(UserNameError::Length));
        assert_eq!(UserName::new(&"a".repeat(51)), Err(UserNameError::Length));
        assert_eq!(UserName::new("al ice"), Err(UserNameError::InvalidCharacter));
        assert_eq!(UserName::new("../etc"), Err(UserNameError::InvalidCharacter));
        assert_eq!(UserName::new("..."), Err(UserNameError::NoAlphanumeric));
    }
}
