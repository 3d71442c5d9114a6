use crate::utils::error::{CheckoutError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// 付款方式；任何無法辨識的值都視為 `Unset`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaymentMethod {
    Cash,
    Online,
    Card,
    #[default]
    Unset,
}

impl PaymentMethod {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "cash" => PaymentMethod::Cash,
            "online" => PaymentMethod::Online,
            "card" => PaymentMethod::Card,
            _ => PaymentMethod::Unset,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Online => "online",
            PaymentMethod::Card => "card",
            PaymentMethod::Unset => "",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// 驗證結果中使用的欄位鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Field {
    #[serde(rename = "paymentMethod")]
    PaymentMethod,
    #[serde(rename = "cardNumber")]
    CardNumber,
    #[serde(rename = "cardExpiry")]
    CardExpiry,
    #[serde(rename = "cardCVV")]
    CardCvv,
    #[serde(rename = "address")]
    Address,
    #[serde(rename = "quantities")]
    Quantities,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::PaymentMethod => "paymentMethod",
            Field::CardNumber => "cardNumber",
            Field::CardExpiry => "cardExpiry",
            Field::CardCvv => "cardCVV",
            Field::Address => "address",
            Field::Quantities => "quantities",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
}

/// 呼叫端持有的表單狀態
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub payment_method: PaymentMethod,
    pub card_number: String,
    pub card_expiry: String,
    #[serde(rename = "cardCVV")]
    pub card_cvv: String,
    pub address: String,
    pub selected_products: Vec<String>,
    pub quantities: BTreeMap<String, Value>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// 從原始 JSON 建立表單狀態。欄位缺漏或型別不符都交給驗證規則處理，
    /// 只有 quantities 不是物件（或整份表單不是物件）才會回傳錯誤。
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut object) = value else {
            return Err(CheckoutError::ContractViolation {
                field: "form".to_string(),
                message: "form state must be a JSON object".to_string(),
            });
        };

        let payment_method = PaymentMethod::parse(&take_text(&mut object, "paymentMethod"));

        Ok(Self {
            payment_method,
            card_number: take_text(&mut object, "cardNumber"),
            card_expiry: take_text(&mut object, "cardExpiry"),
            card_cvv: take_text(&mut object, "cardCVV"),
            address: take_text(&mut object, "address"),
            selected_products: take_selection(&mut object, "selectedProducts"),
            quantities: take_quantities(&mut object, "quantities")?,
        })
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::PaymentMethod => self.payment_method.as_str(),
            Field::CardNumber => &self.card_number,
            Field::CardExpiry => &self.card_expiry,
            Field::CardCvv => &self.card_cvv,
            Field::Address => &self.address,
            Field::Quantities => "",
        }
    }
}

/// 欄位值轉為文字；陣列或物件保留其 JSON 文字，交給規則判定格式錯誤
fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn take_text(object: &mut Map<String, Value>, key: &str) -> String {
    object.remove(key).as_ref().map(value_text).unwrap_or_default()
}

fn take_selection(object: &mut Map<String, Value>, key: &str) -> Vec<String> {
    match object.remove(key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(value_text).collect(),
        // 只勾選一個項目時，表單可能送出單一值
        Some(single) => vec![value_text(&single)],
    }
}

fn take_quantities(object: &mut Map<String, Value>, key: &str) -> Result<BTreeMap<String, Value>> {
    match object.remove(key) {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => Ok(entries.into_iter().collect()),
        Some(other) => Err(CheckoutError::ContractViolation {
            field: key.to_string(),
            message: format!("expected a mapping of product id to quantity, got {}", other),
        }),
    }
}

/// 欄位 → 錯誤訊息；空結果代表表單可以送出
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, message)| (*field, message.as_str()))
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.errors.keys().map(Field::as_str)
    }

    pub(crate) fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetails {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

/// 通過驗證後送往外部的訂單內容
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSubmission {
    pub payment_method: PaymentMethod,
    pub card: Option<CardDetails>,
    pub address: String,
    pub items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub order_id: String,
    pub submitted_at: DateTime<Utc>,
    pub item_count: usize,
}
