use crate::core::derive::PreviewPlaceholders;
use crate::core::rules::RuleMessages;
use crate::domain::model::Product;
use crate::domain::ports::Catalog;
use crate::utils::error::{CheckoutError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

pub const MAX_SUBMIT_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub preview: PreviewPlaceholders,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub messages: RuleMessages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub products: Vec<Product>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        let product = |id: &str, name: &str| Product {
            id: id.to_string(),
            name: name.to_string(),
        };
        Self {
            products: vec![
                product("p1", "Television"),
                product("p2", "Laptop"),
                product("p3", "Smartphone"),
            ],
        }
    }
}

impl Catalog for CatalogConfig {
    fn products(&self) -> &[Product] {
        &self.products
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    pub delay_ms: u64,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self { delay_ms: 1200 }
    }
}

impl SubmissionConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl CheckoutConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CheckoutError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CheckoutError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUBMIT_DELAY_MS})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        if self.catalog.products.is_empty() {
            return Err(CheckoutError::MissingConfigError {
                field: "catalog.products".to_string(),
            });
        }

        for (index, product) in self.catalog.products.iter().enumerate() {
            validation::validate_non_empty_string(
                &format!("catalog.products[{}].id", index),
                &product.id,
            )?;
            validation::validate_non_empty_string(
                &format!("catalog.products[{}].name", index),
                &product.name,
            )?;
        }

        let ids: Vec<&str> = self.catalog.products.iter().map(|p| p.id.as_str()).collect();
        validation::validate_unique("catalog.products.id", &ids)?;

        validation::validate_non_empty_string("preview.number", &self.preview.number)?;
        validation::validate_non_empty_string("preview.expiry", &self.preview.expiry)?;
        validation::validate_non_empty_string("preview.cvv", &self.preview.cvv)?;

        validation::validate_range(
            "submission.delay_ms",
            self.submission.delay_ms,
            0,
            MAX_SUBMIT_DELAY_MS,
        )?;

        Ok(())
    }
}

impl Validate for CheckoutConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
