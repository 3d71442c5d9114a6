//! 顯示用的衍生值：卡別判斷與卡號分組預覽。
//! 這裡的函式不參與驗證。

use crate::domain::model::FormState;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_NUMBER_PLACEHOLDER: &str = "#### #### #### ####";
pub const DEFAULT_EXPIRY_PLACEHOLDER: &str = "MM/YY";
pub const DEFAULT_CVV_PLACEHOLDER: &str = "CVV";

const GROUP_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkLabel {
    Empty,
    Visa,
    Mastercard,
    Unknown,
}

impl NetworkLabel {
    pub fn display_name(&self) -> &'static str {
        match self {
            NetworkLabel::Empty => "",
            NetworkLabel::Visa => "Visa",
            NetworkLabel::Mastercard => "MasterCard",
            NetworkLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for NetworkLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 只看開頭數字判斷卡別，不檢查長度或 Luhn
pub fn classify_card_network(raw: &str) -> NetworkLabel {
    if raw.is_empty() {
        return NetworkLabel::Empty;
    }

    let first_digit = raw.chars().find(|c| !c.is_whitespace());
    match first_digit {
        Some('4') => NetworkLabel::Visa,
        Some('5') => NetworkLabel::Mastercard,
        _ => NetworkLabel::Unknown,
    }
}

/// 每四個字元一組，以單一空白連接；不足四個的尾段照原樣保留
pub fn format_grouped_digits(raw: &str, placeholder: &str) -> String {
    if raw.is_empty() {
        return placeholder.to_string();
    }

    let chars: Vec<char> = raw.chars().collect();
    let groups: Vec<String> = chars
        .chunks(GROUP_SIZE)
        .map(|group| group.iter().collect())
        .collect();

    groups.join(" ").trim_end().to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewPlaceholders {
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

impl Default for PreviewPlaceholders {
    fn default() -> Self {
        Self {
            number: DEFAULT_NUMBER_PLACEHOLDER.to_string(),
            expiry: DEFAULT_EXPIRY_PLACEHOLDER.to_string(),
            cvv: DEFAULT_CVV_PLACEHOLDER.to_string(),
        }
    }
}

/// 卡片預覽
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardPreview {
    pub network: NetworkLabel,
    pub number: String,
    pub expiry: String,
    pub cvv: String,
}

pub fn card_preview(state: &FormState, placeholders: &PreviewPlaceholders) -> CardPreview {
    CardPreview {
        network: classify_card_network(&state.card_number),
        number: format_grouped_digits(&state.card_number, &placeholders.number),
        expiry: or_placeholder(&state.card_expiry, &placeholders.expiry),
        cvv: or_placeholder(&state.card_cvv, &placeholders.cvv),
    }
}

fn or_placeholder(raw: &str, placeholder: &str) -> String {
    if raw.is_empty() {
        placeholder.to_string()
    } else {
        raw.to_string()
    }
}
