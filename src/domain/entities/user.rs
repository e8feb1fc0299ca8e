use crate::domain::value_objects::UserId;
use serde::{Deserialize, Serialize};

/// 投稿・コメントに埋め込まれる作者情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// ログイン中ユーザー。プレースホルダーコメントの作者に使う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
}

impl SessionUser {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn as_author(&self) -> Author {
        Author::new(self.id.as_str(), self.name.clone())
    }
}
