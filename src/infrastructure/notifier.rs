use crate::application::ports::notifier::{Notice, NoticeLevel, Notifier};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, info};

/// 通知をログに出すだけの実装
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Error => error!(title = %notice.title, "{}", notice.description),
            NoticeLevel::Info => info!(title = %notice.title, "{}", notice.description),
        }
    }
}

/// UI 側がチャネルで受け取る実装
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, notice: Notice) {
        if self.sender.send(notice).is_err() {
            tracing::debug!("notice receiver dropped");
        }
    }
}
