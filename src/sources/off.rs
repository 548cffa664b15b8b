//! Open Food Facts client
//!
//! Product lookup by barcode and a small product listing used to seed the
//! normalization data set.

use chrono::Utc;
use reqwest::blocking::Client;
use serde_json::Value;

use super::{get_json, http_client, number_or_zero, FetchError, FetchResult};
use crate::config::SourceConfig;
use crate::models::{DataSource, NutrientProfile, NutritionRecord, ProductNutrients};

const SERVICE: &str = "Open Food Facts";

/// Fields requested from the product listing
const LIST_FIELDS: &str = "product_name,calories,fat,carbohydrates,proteins";

/// `(output key, nutriments key)` pairs for a barcode lookup
const PRODUCT_NUTRIMENTS: [(&str, &str); 5] = [
    ("energia", "energy-kcal"),
    ("proteinas", "proteins"),
    ("grasas", "fat"),
    ("carbohidratos", "carbohydrates"),
    ("fibra", "fiber"),
];

pub struct OpenFoodFactsClient {
    base_url: String,
    http: Client,
}

impl OpenFoodFactsClient {
    pub fn new(config: &SourceConfig) -> FetchResult<Self> {
        Ok(Self {
            base_url: config.off_base_url.trim_end_matches('/').to_string(),
            http: http_client()?,
        })
    }

    /// Look up one product by barcode
    pub fn product(&self, barcode: &str) -> FetchResult<ProductNutrients> {
        if barcode.trim().is_empty() || !barcode.trim().chars().all(|c| c.is_ascii_digit()) {
            return Err(FetchError::InvalidRequest(format!(
                "barcode must be digits only, got '{}'",
                barcode
            )));
        }
        let url = format!("{}/api/v0/product/{}.json", self.base_url, barcode.trim());
        let body = get_json(&self.http, SERVICE, &url, &[])?;
        let product = parse_product(barcode.trim(), &body);
        tracing::info!(
            "Fetched product {} ({} nutrients)",
            product.barcode,
            product.nutrients.len()
        );
        Ok(product)
    }

    /// List up to `page_size` products with their per-100g macros
    pub fn list_products(&self, page_size: u32) -> FetchResult<Vec<NutritionRecord>> {
        if page_size == 0 {
            return Err(FetchError::InvalidRequest(
                "page_size must be at least 1".to_string(),
            ));
        }
        let url = format!("{}/data/product", self.base_url);
        let body = get_json(
            &self.http,
            SERVICE,
            &url,
            &[
                ("fields", LIST_FIELDS.to_string()),
                ("page_size", page_size.to_string()),
            ],
        )?;
        let now = Utc::now();
        let records: Vec<NutritionRecord> = parse_product_list(&body)
            .into_iter()
            .map(|record| NutritionRecord {
                fetched_at: Some(now),
                ..record
            })
            .collect();
        tracing::info!("Fetched {} Open Food Facts products", records.len());
        Ok(records)
    }
}

/// Normalize a barcode lookup response.
///
/// A missing `product` object, ingredient text or nutriment all default to
/// empty/zero; the lookup never fails on shape.
pub fn parse_product(barcode: &str, body: &Value) -> ProductNutrients {
    let product = body.get("product");
    let ingredients_text = product
        .and_then(|p| p.get("ingredients_text"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let nutriments = product.and_then(|p| p.get("nutriments"));

    let nutrients = NutrientProfile::from_pairs(PRODUCT_NUTRIMENTS.iter().map(|(key, field)| {
        (
            *key,
            number_or_zero(nutriments.and_then(|n| n.get(*field)), field),
        )
    }));

    ProductNutrients {
        barcode: barcode.to_string(),
        ingredients_text,
        nutrients,
    }
}

/// Map a product listing to records; absent fields become 0
pub fn parse_product_list(body: &Value) -> Vec<NutritionRecord> {
    let products = match body.get("products").and_then(Value::as_array) {
        Some(products) => products,
        None => {
            tracing::warn!("{} listing has no 'products' array", SERVICE);
            return Vec::new();
        }
    };

    products
        .iter()
        .map(|product| {
            let calories = product
                .get("calories_100g")
                .or_else(|| product.get("energy-kcal_100g"));
            NutritionRecord {
                product_name: product
                    .get("product_name")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                calories: number_or_zero(calories, "calories_100g"),
                fat: number_or_zero(product.get("fat_100g"), "fat_100g"),
                carbohydrates: number_or_zero(
                    product.get("carbohydrates_100g"),
                    "carbohydrates_100g",
                ),
                protein: number_or_zero(product.get("proteins_100g"), "proteins_100g"),
                source: DataSource::OpenFoodFacts,
                fetched_at: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_parse_product_maps_nutriments() {
        let body = json!({
            "status": 1,
            "product": {
                "ingredients_text": "harina de trigo, agua, sal",
                "nutriments": {
                    "energy-kcal": 265,
                    "proteins": 9.0,
                    "fat": "3.2",
                    "carbohydrates": 49.0
                }
            }
        });
        let product = parse_product("8410000000000", &body);
        assert_eq!(product.ingredients_text, "harina de trigo, agua, sal");
        assert_eq!(product.nutrients.get("energia"), 265.0);
        assert_eq!(product.nutrients.get("grasas"), 3.2);
        // fiber absent upstream: silently zero
        assert_eq!(product.nutrients.value("fibra"), Some(0.0));
        assert_eq!(product.training_features(), [265.0, 9.0, 3.2, 49.0, 0.0]);
    }

    #[test]
    fn test_parse_product_without_product_object() {
        let product = parse_product("0", &json!({"status": 0, "status_verbose": "product not found"}));
        assert!(product.ingredients_text.is_empty());
        assert_eq!(product.nutrients.len(), 5);
        assert!(product.nutrients.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn test_parse_product_list() {
        let body = json!({
            "products": [
                {"product_name": "Galletas", "energy-kcal_100g": 480, "fat_100g": 20, "carbohydrates_100g": 65, "proteins_100g": 7},
                {"calories_100g": 50}
            ]
        });
        let records = parse_product_list(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_name.as_deref(), Some("Galletas"));
        assert_eq!(records[0].features(), [480.0, 20.0, 65.0, 7.0]);
        assert_eq!(records[1].product_name, None);
        assert_eq!(records[1].features(), [50.0, 0.0, 0.0, 0.0]);
        assert!(records.iter().all(|r| r.source == DataSource::OpenFoodFacts));
    }

    #[test]
    fn test_parse_product_list_without_products() {
        assert!(parse_product_list(&json!({"count": 0})).is_empty());
    }

    #[test]
    fn test_product_rejects_non_numeric_barcode() {
        let client = OpenFoodFactsClient::new(&SourceConfig::default()).unwrap();
        assert!(matches!(client.product("abc"), Err(FetchError::InvalidRequest(_))));
    }

    #[test]
    fn test_parse_product_list_zeroes_non_finite_fields() {
        let body = json!({"products": [{"product_name": "Roto", "fat_100g": "nan", "proteins_100g": "inf"}]});
        let records = parse_product_list(&body);
        assert_eq!(records[0].features(), [0.0; 4]);
        let text = serde_json::to_string(&records).unwrap();
        let reloaded: Vec<NutritionRecord> = serde_json::from_str(&text).unwrap();
        assert_eq!(reloaded[0].fat, 0.0);
    }

    #[tokio::test]
    async fn test_product_lookup_hits_barcode_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v0/product/1234567890123.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "product": {"nutriments": {"energy-kcal": 100, "fiber": 2}}
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = SourceConfig {
            off_base_url: mock_server.uri(),
            ..SourceConfig::default()
        };
        let product = tokio::task::spawn_blocking(move || {
            OpenFoodFactsClient::new(&config)?.product("1234567890123")
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(product.nutrients.get("energia"), 100.0);
        assert_eq!(product.nutrients.get("fibra"), 2.0);
    }

    #[tokio::test]
    async fn test_list_products_sends_fields_and_page_size() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data/product"))
            .and(query_param("fields", LIST_FIELDS))
            .and(query_param("page_size", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [
                    {"product_name": "Pan", "calories_100g": 265, "proteins_100g": 9},
                    {"product_name": "Leche", "calories_100g": 42, "fat_100g": 1}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let config = SourceConfig {
            off_base_url: mock_server.uri(),
            ..SourceConfig::default()
        };
        let records = tokio::task::spawn_blocking(move || {
            OpenFoodFactsClient::new(&config)?.list_products(2)
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].features(), [42.0, 1.0, 0.0, 0.0]);
        assert!(records.iter().all(|r| r.fetched_at.is_some()));
    }
}
