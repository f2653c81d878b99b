pub mod app_config;
pub mod config;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ProxyConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use products::{
    NormalizedProduct, ProductDetail, ProductImage, RatingSummary, Review, SellerInfo, Shipping,
    StockInfo, Variation, VariationOption,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
