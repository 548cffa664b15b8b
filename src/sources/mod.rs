//! External nutrition sources
//!
//! Blocking clients for Open Food Facts and USDA FoodData Central. Parsing
//! is kept in free functions so it can be exercised on fixture JSON.

pub mod off;
pub mod usda;

use reqwest::blocking::Client;
use serde_json::Value;
use thiserror::Error;

pub use off::{parse_product, parse_product_list, OpenFoodFactsClient};
pub use usda::{parse_food_list, usda_nutrient_map, UsdaClient};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("{service} response has an unexpected shape: {detail}")]
    UnexpectedShape {
        service: &'static str,
        detail: String,
    },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Shared blocking HTTP client with a descriptive user agent
fn http_client() -> FetchResult<Client> {
    Ok(Client::builder()
        .user_agent(concat!("trivo/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// GET a JSON document, turning non-success statuses into errors
fn get_json(
    http: &Client,
    service: &'static str,
    url: &str,
    query: &[(&str, String)],
) -> FetchResult<Value> {
    tracing::debug!("GET {} ({})", url, service);
    let response = http.get(url).query(query).send()?;
    let status = response.status();
    if !status.is_success() {
        tracing::error!("{} request failed: HTTP {}", service, status.as_u16());
        return Err(FetchError::Status {
            service,
            status: status.as_u16(),
        });
    }
    Ok(response.json::<Value>()?)
}

/// Read a finite number that may arrive as a JSON number or a numeric
/// string; "nan" and "inf" spellings are rejected
fn number(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// Like [`number`], defaulting to zero and noting the gap
fn number_or_zero(value: Option<&Value>, field: &str) -> f64 {
    number(value).unwrap_or_else(|| {
        tracing::debug!("Field '{}' missing or non-numeric, using 0", field);
        0.0
    })
}
