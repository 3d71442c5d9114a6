use crate::config::toml_config::CheckoutConfig;
use crate::core::derive::{card_preview, CardPreview, PreviewPlaceholders};
use crate::core::rules::{parse_quantity, RuleEngine};
use crate::domain::model::{
    CardDetails, FormState, LineItem, OrderSubmission, PaymentMethod, Product, SubmissionReceipt,
    ValidationResult,
};
use crate::domain::ports::{Catalog, OrderGateway};
use crate::utils::error::{CheckoutError, Result};
use serde_json::Value;

/// 單一欄位的變更
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    PaymentMethod(PaymentMethod),
    CardNumber(String),
    CardExpiry(String),
    CardCvv(String),
    Address(String),
    ToggleProduct(String),
    Quantity { product_id: String, value: Value },
}

/// 已選商品的數量輸入列
#[derive(Debug, Clone, PartialEq)]
pub struct QuantityInput<'a> {
    pub product_id: &'a str,
    pub name: Option<&'a str>,
    pub value: Option<&'a Value>,
}

/// 表單狀態的唯一持有者。每次變更後重新計算預覽與驗證結果。
pub struct CheckoutSession<C: Catalog> {
    state: FormState,
    catalog: C,
    engine: RuleEngine,
    placeholders: PreviewPlaceholders,
    preview: CardPreview,
    errors: ValidationResult,
}

impl CheckoutSession<Vec<Product>> {
    pub fn from_config(config: &CheckoutConfig) -> Self {
        Self::new(
            config.catalog.products.clone(),
            RuleEngine::with_messages(&config.messages),
            config.preview.clone(),
        )
    }
}

impl<C: Catalog> CheckoutSession<C> {
    pub fn new(catalog: C, engine: RuleEngine, placeholders: PreviewPlaceholders) -> Self {
        let state = FormState::default();
        let preview = card_preview(&state, &placeholders);
        let errors = engine.validate(&state);

        Self {
            state,
            catalog,
            engine,
            placeholders,
            preview,
            errors,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn preview(&self) -> &CardPreview {
        &self.preview
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    /// 以外部載入的狀態取代目前的表單
    pub fn load(&mut self, state: FormState) {
        self.state = state;
        self.refresh();
    }

    pub fn apply(&mut self, edit: FieldEdit) {
        tracing::trace!("Applying edit: {:?}", edit);

        match edit {
            FieldEdit::PaymentMethod(method) => self.state.payment_method = method,
            FieldEdit::CardNumber(value) => self.state.card_number = value,
            FieldEdit::CardExpiry(value) => self.state.card_expiry = value,
            FieldEdit::CardCvv(value) => self.state.card_cvv = value,
            FieldEdit::Address(value) => self.state.address = value,
            FieldEdit::ToggleProduct(id) => {
                let selected = &mut self.state.selected_products;
                match selected.iter().position(|existing| *existing == id) {
                    Some(index) => {
                        selected.remove(index);
                    }
                    None => selected.push(id),
                }
            }
            FieldEdit::Quantity { product_id, value } => {
                self.state.quantities.insert(product_id, value);
            }
        }

        self.refresh();
    }

    /// 每個已選商品一列；目錄中找不到的 id 仍然列出，只是沒有名稱
    pub fn quantity_inputs(&self) -> Vec<QuantityInput<'_>> {
        self.state
            .selected_products
            .iter()
            .map(|id| QuantityInput {
                product_id: id,
                name: self.catalog.find(id).map(|product| product.name.as_str()),
                value: self.state.quantities.get(id),
            })
            .collect()
    }

    pub async fn submit<G>(&mut self, gateway: &G) -> Result<SubmissionReceipt>
    where
        G: OrderGateway + ?Sized,
    {
        self.errors = self.engine.validate(&self.state);
        if !self.errors.is_valid() {
            tracing::warn!(
                "🚫 Submission blocked, invalid fields: {}",
                self.errors.field_names().collect::<Vec<_>>().join(", ")
            );
            return Err(CheckoutError::SubmissionBlocked {
                errors: self.errors.clone(),
            });
        }

        let order = self.build_order();
        tracing::info!(
            "📦 Submitting order: {} item(s), payment by {}",
            order.items.len(),
            order.payment_method
        );

        let receipt = gateway.submit(&order).await?;
        tracing::info!("✅ Order {} accepted", receipt.order_id);

        // 送出成功後丟棄表單
        self.state = FormState::default();
        self.refresh();

        Ok(receipt)
    }

    fn build_order(&self) -> OrderSubmission {
        let card = (self.state.payment_method == PaymentMethod::Card).then(|| CardDetails {
            number: self.state.card_number.clone(),
            expiry: self.state.card_expiry.clone(),
            cvv: self.state.card_cvv.clone(),
        });

        let items = self
            .state
            .selected_products
            .iter()
            .filter_map(|id| {
                let quantity = self.state.quantities.get(id).and_then(parse_quantity)?;
                Some(LineItem {
                    product_id: id.clone(),
                    quantity,
                })
            })
            .collect();

        OrderSubmission {
            payment_method: self.state.payment_method,
            card,
            address: self.state.address.clone(),
            items,
        }
    }

    fn refresh(&mut self) {
        self.preview = card_preview(&self.state, &self.placeholders);
        self.errors = self.engine.validate(&self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> CheckoutSession<Vec<Product>> {
        CheckoutSession::from_config(&CheckoutConfig::default())
    }

    #[test]
    fn test_toggle_product_adds_and_removes() {
        let mut session = session();
        session.apply(FieldEdit::ToggleProduct("p1".to_string()));
        session.apply(FieldEdit::ToggleProduct("p2".to_string()));
        assert_eq!(session.state().selected_products, vec!["p1", "p2"]);

        session.apply(FieldEdit::ToggleProduct("p1".to_string()));
        assert_eq!(session.state().selected_products, vec!["p2"]);
    }

    #[test]
    fn test_preview_follows_card_number_edits() {
        let mut session = session();
        session.apply(FieldEdit::CardNumber("51051051".to_string()));
        assert_eq!(session.preview().number, "5105 1051");
        assert_eq!(session.preview().network.display_name(), "MasterCard");
    }

    #[test]
    fn test_quantity_inputs_join_catalog_names() {
        let mut session = session();
        session.apply(FieldEdit::ToggleProduct("p2".to_string()));
        session.apply(FieldEdit::ToggleProduct("ghost".to_string()));
        session.apply(FieldEdit::Quantity {
            product_id: "p2".to_string(),
            value: json!("1"),
        });

        let inputs = session.quantity_inputs();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].name, Some("Laptop"));
        assert_eq!(inputs[0].value, Some(&json!("1")));
        assert_eq!(inputs[1].name, None);
    }
}
