#![allow(dead_code)]

pub mod fake_api;
pub mod fixtures;

pub use fake_api::ScriptedBoardApi;
pub use fixtures::*;

/// 条件が満たされるまで待つ。他のタスクに実行を譲りながら確認する。
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("condition was not met in time");
}
