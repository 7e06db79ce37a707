//! Mock notification emitter for testing.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::notify::{ItemChangedMessage, NotificationEmitter};

/// Records published messages for assertions.
#[derive(Default)]
pub struct MockEmitter {
    published: Arc<RwLock<Vec<ItemChangedMessage>>>,
}

impl MockEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn published(&self) -> Vec<ItemChangedMessage> {
        self.published.read().await.clone()
    }
}

#[async_trait]
impl NotificationEmitter for MockEmitter {
    async fn publish(&self, message: &ItemChangedMessage) {
        self.published.write().await.push(message.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_published_messages() {
        let emitter = MockEmitter::new();
        emitter
            .publish(&ItemChangedMessage::updated("b", "ws/item.json"))
            .await;
        let published = emitter.published().await;
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].bucket_name, "b");
    }
}
