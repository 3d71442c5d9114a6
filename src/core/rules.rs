//! 條件式驗證規則表
//!
//! 每一種付款方式對應一組有序的欄位規則；驗證時依 `paymentMethod`
//! 明確選出分支，再逐欄位執行。同一欄位在不同分支可以有不同規則
//! （例如卡號只在 `card` 分支存在）。

use crate::domain::model::{Field, FormState, PaymentMethod, ValidationResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// 不允許出現在卡號中的序列
pub const BLOCKED_CARD_SEQUENCE: &str = "99909";

static CARD_NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("card number pattern is valid"));
static CARD_EXPIRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/[0-9]{2}$").expect("card expiry pattern is valid")
});
static CARD_CVV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3}$").expect("cvv pattern is valid"));

static DEFAULT_ENGINE: LazyLock<RuleEngine> = LazyLock::new(RuleEngine::new);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MissingValue,
    FormatMismatch,
    PolicyViolation,
    AggregateDependencyFailure,
}

/// 規則訊息；設定檔可以只覆寫其中一部分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleMessages {
    pub payment_method_required: String,
    pub card_number_required: String,
    pub card_number_format: String,
    pub card_number_blocked: String,
    pub card_expiry_required: String,
    pub card_expiry_format: String,
    pub card_cvv_required: String,
    pub card_cvv_format: String,
    pub address_required: String,
    pub quantities_invalid: String,
}

impl Default for RuleMessages {
    fn default() -> Self {
        Self {
            payment_method_required: "Choose a payment method".to_string(),
            card_number_required: "Enter the card number".to_string(),
            card_number_format: "Card number must be exactly 16 digits".to_string(),
            card_number_blocked: format!(
                "This card number is not allowed ({})!",
                BLOCKED_CARD_SEQUENCE
            ),
            card_expiry_required: "Enter the expiry date (MM/YY)".to_string(),
            card_expiry_format: "Use the MM/YY format, e.g. 09/25".to_string(),
            card_cvv_required: "Enter the CVV code".to_string(),
            card_cvv_format: "CVV must be 3 digits".to_string(),
            address_required: "Enter the delivery address".to_string(),
            quantities_invalid: "Quantity must be at least 1".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Test {
    Required,
    Matches(Regex),
    Excludes(&'static str),
}

#[derive(Debug, Clone)]
pub struct Check {
    test: Test,
    message: String,
}

impl Check {
    fn required(message: &str) -> Self {
        Self {
            test: Test::Required,
            message: message.to_string(),
        }
    }

    fn matches(pattern: &Regex, message: &str) -> Self {
        Self {
            test: Test::Matches(pattern.clone()),
            message: message.to_string(),
        }
    }

    fn excludes(sequence: &'static str, message: &str) -> Self {
        Self {
            test: Test::Excludes(sequence),
            message: message.to_string(),
        }
    }

    fn kind(&self) -> ErrorKind {
        match self.test {
            Test::Required => ErrorKind::MissingValue,
            Test::Matches(_) => ErrorKind::FormatMismatch,
            Test::Excludes(_) => ErrorKind::PolicyViolation,
        }
    }

    fn passes(&self, value: &str) -> bool {
        match &self.test {
            Test::Required => !value.is_empty(),
            Test::Matches(pattern) => pattern.is_match(value),
            Test::Excludes(sequence) => !value.contains(sequence),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Failure<'a> {
    pub field: Field,
    pub kind: ErrorKind,
    pub message: &'a str,
}

/// 單一規則：針對一個欄位的有序檢查，或跨欄位的彙總檢查
#[derive(Debug, Clone)]
pub enum Rule {
    Field { field: Field, checks: Vec<Check> },
    SelectedQuantities { message: String },
}

impl Rule {
    pub fn field(&self) -> Field {
        match self {
            Rule::Field { field, .. } => *field,
            Rule::SelectedQuantities { .. } => Field::Quantities,
        }
    }

    /// 回傳第一個失敗的檢查；通過時回傳 `None`
    pub fn evaluate(&self, state: &FormState) -> Option<Failure<'_>> {
        match self {
            Rule::Field { field, checks } => {
                let value = state.text(*field);
                checks
                    .iter()
                    .find(|check| !check.passes(value))
                    .map(|check| Failure {
                        field: *field,
                        kind: check.kind(),
                        message: &check.message,
                    })
            }
            Rule::SelectedQuantities { message } => {
                if quantities_satisfied(state) {
                    None
                } else {
                    Some(Failure {
                        field: Field::Quantities,
                        kind: ErrorKind::AggregateDependencyFailure,
                        message: message.as_str(),
                    })
                }
            }
        }
    }
}

/// 依付款方式分支的規則表
#[derive(Debug, Clone)]
pub struct RuleTable {
    branches: BTreeMap<PaymentMethod, Vec<Rule>>,
}

impl RuleTable {
    pub fn new(messages: &RuleMessages) -> Self {
        let common = vec![
            Rule::Field {
                field: Field::PaymentMethod,
                checks: vec![Check::required(&messages.payment_method_required)],
            },
            Rule::Field {
                field: Field::Address,
                checks: vec![Check::required(&messages.address_required)],
            },
            Rule::SelectedQuantities {
                message: messages.quantities_invalid.clone(),
            },
        ];

        let card_only = vec![
            Rule::Field {
                field: Field::CardNumber,
                checks: vec![
                    Check::required(&messages.card_number_required),
                    Check::matches(&CARD_NUMBER_PATTERN, &messages.card_number_format),
                    Check::excludes(BLOCKED_CARD_SEQUENCE, &messages.card_number_blocked),
                ],
            },
            Rule::Field {
                field: Field::CardExpiry,
                checks: vec![
                    Check::required(&messages.card_expiry_required),
                    Check::matches(&CARD_EXPIRY_PATTERN, &messages.card_expiry_format),
                ],
            },
            Rule::Field {
                field: Field::CardCvv,
                checks: vec![
                    Check::required(&messages.card_cvv_required),
                    Check::matches(&CARD_CVV_PATTERN, &messages.card_cvv_format),
                ],
            },
        ];

        let mut branches = BTreeMap::new();
        branches.insert(PaymentMethod::Cash, common.clone());
        branches.insert(PaymentMethod::Online, common.clone());
        branches.insert(PaymentMethod::Unset, common.clone());
        branches.insert(PaymentMethod::Card, [common, card_only].concat());

        Self { branches }
    }

    pub fn branch(&self, method: PaymentMethod) -> &[Rule] {
        self.branches
            .get(&method)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct RuleEngine {
    table: RuleTable,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_messages(&RuleMessages::default())
    }

    pub fn with_messages(messages: &RuleMessages) -> Self {
        Self {
            table: RuleTable::new(messages),
        }
    }

    pub fn rules_for(&self, method: PaymentMethod) -> &[Rule] {
        self.table.branch(method)
    }

    /// 對完整表單狀態執行一次驗證；不保留任何狀態
    pub fn validate(&self, state: &FormState) -> ValidationResult {
        let mut result = ValidationResult::default();

        for rule in self.rules_for(state.payment_method) {
            if let Some(failure) = rule.evaluate(state) {
                tracing::debug!(
                    field = %failure.field,
                    kind = ?failure.kind,
                    "Rule failed: {}",
                    failure.message
                );
                result.insert(failure.field, failure.message);
            }
        }

        tracing::trace!(
            payment_method = %state.payment_method,
            errors = result.len(),
            "Validation pass finished"
        );
        result
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 使用預設訊息驗證表單
pub fn validate(state: &FormState) -> ValidationResult {
    DEFAULT_ENGINE.validate(state)
}

fn quantities_satisfied(state: &FormState) -> bool {
    state.selected_products.iter().all(|id| {
        state
            .quantities
            .get(id)
            .and_then(parse_quantity)
            .is_some_and(|quantity| quantity > 0)
    })
}

/// 解析數量：字串取開頭的整數部分，數字則向零截斷。
/// 超出 `i64` 範圍的值飽和到 `i64::MAX` / `i64::MIN`，正負號仍然保留。
pub fn parse_quantity(value: &Value) -> Option<i64> {
    match value {
        Value::String(raw) => parse_leading_integer(raw),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_u64().map(|_| i64::MAX))
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|f| f.is_finite())
                    // `as` 轉換會飽和
                    .map(|f| f.trunc() as i64)
            }),
        _ => None,
    }
}

fn parse_leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let negative = trimmed.starts_with('-');
    let sign_len = usize::from(trimmed.starts_with(['+', '-']));
    let digits: &str = {
        let rest = &trimmed[sign_len..];
        let len = rest.bytes().take_while(u8::is_ascii_digit).count();
        &rest[..len]
    };

    if digits.is_empty() {
        return None;
    }

    match trimmed[..sign_len + digits.len()].parse() {
        Ok(value) => Some(value),
        Err(_) if negative => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn card_state() -> FormState {
        FormState {
            payment_method: PaymentMethod::Card,
            card_number: "4242424242424242".to_string(),
            card_expiry: "09/25".to_string(),
            card_cvv: "123".to_string(),
            address: "Almaty, Abay st. 10".to_string(),
            ..FormState::default()
        }
    }

    #[test]
    fn test_card_branch_has_card_rules() {
        let engine = RuleEngine::new();
        let card_fields: Vec<Field> = engine
            .rules_for(PaymentMethod::Card)
            .iter()
            .map(Rule::field)
            .collect();
        assert!(card_fields.contains(&Field::CardNumber));
        assert!(card_fields.contains(&Field::CardCvv));

        for method in [PaymentMethod::Cash, PaymentMethod::Online, PaymentMethod::Unset] {
            assert!(engine
                .rules_for(method)
                .iter()
                .all(|rule| !matches!(
                    rule.field(),
                    Field::CardNumber | Field::CardExpiry | Field::CardCvv
                )));
        }
    }

    #[test]
    fn test_valid_card_state() {
        assert!(validate(&card_state()).is_valid());
    }

    #[test]
    fn test_card_number_check_order() {
        let engine = RuleEngine::new();
        let mut state = card_state();

        state.card_number = String::new();
        let failure = engine.rules_for(PaymentMethod::Card)[3].evaluate(&state).unwrap();
        assert_eq!(failure.kind, ErrorKind::MissingValue);

        state.card_number = "42424242424299909".to_string();
        let failure = engine.rules_for(PaymentMethod::Card)[3].evaluate(&state).unwrap();
        assert_eq!(failure.kind, ErrorKind::FormatMismatch);

        state.card_number = "4242424299909242".to_string();
        let failure = engine.rules_for(PaymentMethod::Card)[3].evaluate(&state).unwrap();
        assert_eq!(failure.kind, ErrorKind::PolicyViolation);
    }

    #[test]
    fn test_expiry_rejects_non_ascii_digits() {
        let mut state = card_state();
        state.card_expiry = "09/٢٥".to_string();
        assert!(validate(&state).contains(Field::CardExpiry));
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity(&json!("3")), Some(3));
        assert_eq!(parse_quantity(&json!(" 2 pcs")), Some(2));
        assert_eq!(parse_quantity(&json!("2.9")), Some(2));
        assert_eq!(parse_quantity(&json!("-4")), Some(-4));
        assert_eq!(parse_quantity(&json!(2.5)), Some(2));
        assert_eq!(parse_quantity(&json!(7)), Some(7));
        assert_eq!(parse_quantity(&json!("")), None);
        assert_eq!(parse_quantity(&json!("abc")), None);
        assert_eq!(parse_quantity(&json!("-0")), Some(0));
        assert_eq!(parse_quantity(&json!("000")), Some(0));
        assert_eq!(parse_quantity(&json!(true)), None);
        assert_eq!(parse_quantity(&json!(null)), None);
    }

    #[test]
    fn test_parse_quantity_saturates_large_values() {
        assert_eq!(parse_quantity(&json!("99999999999999999999")), Some(i64::MAX));
        assert_eq!(parse_quantity(&json!("-99999999999999999999")), Some(i64::MIN));
        assert_eq!(parse_quantity(&json!(18446744073709551615u64)), Some(i64::MAX));
        assert_eq!(parse_quantity(&json!(1e20)), Some(i64::MAX));
        assert_eq!(parse_quantity(&json!(-1e20)), Some(i64::MIN));
    }

    #[test]
    fn test_large_quantities_pass_aggregate_rule() {
        for quantity in [json!("99999999999999999999"), json!(1e20), json!(18446744073709551615u64)] {
            let state = FormState {
                selected_products: vec!["p1".to_string()],
                quantities: [("p1".to_string(), quantity.clone())].into_iter().collect(),
                ..card_state()
            };
            assert!(!validate(&state).contains(Field::Quantities), "{quantity}");
        }
    }

    #[test]
    fn test_custom_messages() {
        let messages = RuleMessages {
            address_required: "Адрес обязателен".to_string(),
            ..RuleMessages::default()
        };
        let engine = RuleEngine::with_messages(&messages);
        let result = engine.validate(&FormState::default());
        assert_eq!(result.get(Field::Address), Some("Адрес обязателен"));
    }
}
