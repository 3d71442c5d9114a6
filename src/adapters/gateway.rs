use crate::domain::model::{OrderSubmission, SubmissionReceipt};
use crate::domain::ports::OrderGateway;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// 模擬的下單服務：等待固定時間後一律成功
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(Duration::from_millis(1200))
    }
}

#[async_trait]
impl OrderGateway for SimulatedGateway {
    async fn submit(&self, order: &OrderSubmission) -> Result<SubmissionReceipt> {
        tracing::debug!(
            "Simulating network submission ({:?}): {}",
            self.delay,
            serde_json::to_string(order)?
        );

        tokio::time::sleep(self.delay).await;

        let submitted_at = chrono::Utc::now();
        Ok(SubmissionReceipt {
            order_id: format!("ORD-{}", submitted_at.format("%Y%m%d%H%M%S%3f")),
            submitted_at,
            item_count: order.items.len(),
        })
    }
}
