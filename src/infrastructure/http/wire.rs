use crate::domain::entities::{Page, Pagination};
use serde::Deserialize;

/// サーバーの共通レスポンス
///
/// 成功: `{success: true, message, data}`
/// 失敗: `{success: false, error, isFormError}`
/// 一覧系はさらに `pagination` を持つ。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub is_form_error: bool,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> Envelope<T> {
    pub fn error_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

impl<T> Envelope<Vec<T>> {
    /// `pagination` が無ければ 1 ページだけのリストとして扱う
    pub fn into_page(self, requested: u32) -> Page<T> {
        let pagination = self.pagination.unwrap_or(Pagination {
            page: requested,
            total_pages: requested,
        });
        Page {
            data: self.data.unwrap_or_default(),
            pagination,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::UpvoteResult;

    #[test]
    fn test_parses_success_envelope() {
        let json = r#"{"success":true,"message":"Post upvoted","data":{"count":4,"isUpvoted":true}}"#;
        let envelope: Envelope<UpvoteResult> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(UpvoteResult::new(4, true)));
    }

    #[test]
    fn test_parses_form_error_envelope() {
        let json = r#"{"success":false,"error":"Comment is too short","isFormError":true}"#;
        let envelope: Envelope<UpvoteResult> = serde_json::from_str(json).unwrap();
        assert!(!envelope.success);
        assert!(envelope.is_form_error);
        assert_eq!(envelope.error_message(), "Comment is too short");
    }

    #[test]
    fn test_paginated_envelope_into_page() {
        let json = r#"{"success":true,"message":"ok","data":[1,2],"pagination":{"page":2,"totalPages":5}}"#;
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(json).unwrap();
        let page = envelope.into_page(2);
        assert_eq!(page.data, vec![1, 2]);
        assert_eq!(page.pagination, Pagination { page: 2, total_pages: 5 });
    }
}
