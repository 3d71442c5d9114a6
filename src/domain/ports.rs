use crate::domain::model::{OrderSubmission, Product, SubmissionReceipt};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 唯讀商品目錄
pub trait Catalog: Send + Sync {
    fn products(&self) -> &[Product];

    fn find(&self, id: &str) -> Option<&Product> {
        self.products().iter().find(|product| product.id == id)
    }
}

impl Catalog for Vec<Product> {
    fn products(&self) -> &[Product] {
        self
    }
}

#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn submit(&self, order: &OrderSubmission) -> Result<SubmissionReceipt>;
}
