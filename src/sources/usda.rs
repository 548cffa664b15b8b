//! USDA FoodData Central client
//!
//! Food search (raw JSON plus a nutrient-name map of the first hit) and the
//! abridged food list used for the normalization data set.
//!
//! API reference: <https://fdc.nal.usda.gov/api-guide.html>

use chrono::Utc;
use reqwest::blocking::Client;
use serde_json::Value;

use super::{get_json, http_client, number, FetchError, FetchResult};
use crate::config::SourceConfig;
use crate::models::{DataSource, NutrientProfile, NutritionRecord};

const SERVICE: &str = "USDA API";

/// Largest page the API accepts
const MAX_PAGE_SIZE: u32 = 200;

const ENERGY: &str = "Energy";
const FAT: &str = "Total lipid (fat)";
const CARBOHYDRATES: &str = "Carbohydrate, by difference";
const PROTEIN: &str = "Protein";

pub struct UsdaClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl UsdaClient {
    pub fn new(config: &SourceConfig) -> FetchResult<Self> {
        Ok(Self {
            base_url: config.usda_base_url.trim_end_matches('/').to_string(),
            api_key: config.usda_api_key.clone(),
            http: http_client()?,
        })
    }

    /// Search foods by free text; returns the raw response document
    pub fn search_foods(&self, query: &str, page_size: u32) -> FetchResult<Value> {
        if query.trim().is_empty() {
            return Err(FetchError::InvalidRequest(
                "Search query cannot be empty".to_string(),
            ));
        }
        validate_page_size(page_size)?;

        let url = format!("{}/foods/search", self.base_url);
        let body = get_json(
            &self.http,
            SERVICE,
            &url,
            &[
                ("query", query.to_string()),
                ("api_key", self.api_key.clone()),
                ("pageSize", page_size.to_string()),
            ],
        )?;
        let found = body.get("foods").and_then(Value::as_array).map_or(0, Vec::len);
        tracing::info!("USDA search '{}' returned {} foods", query, found);
        Ok(body)
    }

    /// List foods with their macros
    pub fn list_foods(&self, limit: u32) -> FetchResult<Vec<NutritionRecord>> {
        validate_page_size(limit)?;

        let url = format!("{}/foods/list", self.base_url);
        let body = get_json(
            &self.http,
            SERVICE,
            &url,
            &[
                ("api_key", self.api_key.clone()),
                ("fields", "description,foodNutrients".to_string()),
                ("limit", limit.to_string()),
            ],
        )?;
        let now = Utc::now();
        let records: Vec<NutritionRecord> = parse_food_list(&body)?
            .into_iter()
            .map(|record| NutritionRecord {
                fetched_at: Some(now),
                ..record
            })
            .collect();
        tracing::info!("Fetched {} USDA foods", records.len());
        Ok(records)
    }
}

fn validate_page_size(page_size: u32) -> FetchResult<()> {
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(FetchError::InvalidRequest(format!(
            "Page size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

/// Name of a nutrient entry (search results say `nutrientName`, the
/// abridged list says `name`)
fn nutrient_name(entry: &Value) -> Option<&str> {
    entry
        .get("nutrientName")
        .or_else(|| entry.get("name"))
        .and_then(Value::as_str)
}

/// Amount of a nutrient entry (`value` in search results, `amount` in lists)
fn nutrient_amount(entry: &Value) -> Option<f64> {
    number(entry.get("value")).or_else(|| number(entry.get("amount")))
}

/// `nutrientName -> value` of the first food in a search response.
///
/// No foods gives an empty profile. Entries without a name or a numeric
/// value are skipped.
pub fn usda_nutrient_map(data: &Value) -> NutrientProfile {
    let first = match data
        .get("foods")
        .and_then(Value::as_array)
        .and_then(|foods| foods.first())
    {
        Some(food) => food,
        None => return NutrientProfile::new(),
    };

    first
        .get("foodNutrients")
        .and_then(Value::as_array)
        .map(|nutrients| {
            NutrientProfile::from_pairs(
                nutrients
                    .iter()
                    .filter_map(|n| Some((nutrient_name(n)?, nutrient_amount(n)?))),
            )
        })
        .unwrap_or_default()
}

/// Energy in kcal; USDA may list energy in both kJ and kcal
fn energy_kcal(nutrients: &[Value]) -> Option<f64> {
    let energy: Vec<&Value> = nutrients
        .iter()
        .filter(|n| nutrient_name(n) == Some(ENERGY))
        .collect();
    energy
        .iter()
        .find(|n| {
            n.get("unitName")
                .and_then(Value::as_str)
                .map_or(false, |u| u.eq_ignore_ascii_case("kcal"))
        })
        .or_else(|| energy.first())
        .and_then(|n| nutrient_amount(n))
}

fn named_amount(nutrients: &[Value], name: &str) -> Option<f64> {
    nutrients
        .iter()
        .find(|n| nutrient_name(n) == Some(name))
        .and_then(nutrient_amount)
}

/// Map a `/foods/list` response to records.
///
/// The response must be an array of objects with a `description`; missing
/// nutrients default to 0.
pub fn parse_food_list(data: &Value) -> FetchResult<Vec<NutritionRecord>> {
    let foods = data.as_array().ok_or_else(|| FetchError::UnexpectedShape {
        service: SERVICE,
        detail: "expected a JSON array of foods".to_string(),
    })?;

    foods
        .iter()
        .enumerate()
        .map(|(index, food)| {
            let description = food
                .get("description")
                .and_then(Value::as_str)
                .ok_or_else(|| FetchError::UnexpectedShape {
                    service: SERVICE,
                    detail: format!("food {} has no description", index),
                })?;
            let nutrients = food
                .get("foodNutrients")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();
            if nutrients.is_empty() {
                tracing::warn!("USDA food '{}' has no nutrients, using zeros", description);
            }

            Ok(NutritionRecord {
                product_name: Some(description.to_string()),
                calories: energy_kcal(nutrients).unwrap_or(0.0),
                fat: named_amount(nutrients, FAT).unwrap_or(0.0),
                carbohydrates: named_amount(nutrients, CARBOHYDRATES).unwrap_or(0.0),
                protein: named_amount(nutrients, PROTEIN).unwrap_or(0.0),
                source: DataSource::Usda,
                fetched_at: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(base_url: String) -> UsdaClient {
        let config = SourceConfig {
            usda_base_url: base_url,
            usda_api_key: "test-key".to_string(),
            ..SourceConfig::default()
        };
        UsdaClient::new(&config).unwrap()
    }

    #[test]
    fn test_nutrient_map_of_first_food() {
        let data = json!({
            "foods": [
                {
                    "description": "Chickpeas, mature seeds, raw",
                    "foodNutrients": [
                        {"nutrientName": "Protein", "value": 20.5, "unitName": "G"},
                        {"nutrientName": "Energy", "value": 378, "unitName": "KCAL"},
                        {"nutrientName": "Fiber, total dietary", "value": 12.2},
                        {"nutrientName": "Broken"}
                    ]
                },
                {"description": "ignored", "foodNutrients": [{"nutrientName": "Protein", "value": 1}]}
            ]
        });
        let map = usda_nutrient_map(&data);
        assert_eq!(map.len(), 3);
        assert_eq!(map.get("Protein"), 20.5);
        assert_eq!(map.get("Energy"), 378.0);
    }

    #[test]
    fn test_nutrient_map_without_foods_is_empty() {
        assert!(usda_nutrient_map(&json!({"foods": []})).is_empty());
        assert!(usda_nutrient_map(&json!({"totalHits": 0})).is_empty());
    }

    #[test]
    fn test_parse_food_list_by_nutrient_name() {
        let data = json!([
            {
                "description": "Hummus, commercial",
                "foodNutrients": [
                    {"name": "Energy", "amount": 1000, "unitName": "kJ"},
                    {"name": "Energy", "amount": 239, "unitName": "KCAL"},
                    {"name": "Protein", "amount": 7.35},
                    {"name": "Total lipid (fat)", "amount": 17.1},
                    {"name": "Carbohydrate, by difference", "amount": 14.3}
                ]
            },
            {"description": "Water, tap"}
        ]);
        let records = parse_food_list(&data).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].product_name.as_deref(), Some("Hummus, commercial"));
        assert_eq!(records[0].features(), [239.0, 17.1, 14.3, 7.35]);
        assert_eq!(records[1].features(), [0.0; 4]);
        assert_eq!(records[1].source, DataSource::Usda);
    }

    #[test]
    fn test_parse_food_list_rejects_unexpected_shape() {
        assert!(matches!(
            parse_food_list(&json!({"foods": []})),
            Err(FetchError::UnexpectedShape { .. })
        ));
        assert!(matches!(
            parse_food_list(&json!([{"foodNutrients": []}])),
            Err(FetchError::UnexpectedShape { .. })
        ));
    }

    #[test]
    fn test_search_validates_arguments() {
        let client = client_for("http://127.0.0.1:9".to_string());
        assert!(matches!(client.search_foods("  ", 10), Err(FetchError::InvalidRequest(_))));
        assert!(matches!(client.search_foods("garbanzo", 0), Err(FetchError::InvalidRequest(_))));
        assert!(matches!(client.search_foods("garbanzo", 201), Err(FetchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_search_reports_non_success_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/search"))
            .and(query_param("query", "garbanzo"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("pageSize", "10"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"error": "API_KEY_INVALID"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri();
        let result = tokio::task::spawn_blocking(move || client_for(base_url).search_foods("garbanzo", 10))
            .await
            .unwrap();
        assert!(matches!(
            result,
            Err(FetchError::Status { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_search_returns_raw_document() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/search"))
            .and(query_param("query", "garbanzo"))
            .and(query_param("pageSize", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": [{"foodNutrients": [{"nutrientName": "Protein", "value": 19.3}]}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri();
        let body = tokio::task::spawn_blocking(move || client_for(base_url).search_foods("garbanzo", 5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(usda_nutrient_map(&body).get("Protein"), 19.3);
    }

    #[tokio::test]
    async fn test_list_foods_requests_abridged_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/foods/list"))
            .and(query_param("api_key", "test-key"))
            .and(query_param("fields", "description,foodNutrients"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"description": "Rice, white", "foodNutrients": [{"name": "Protein", "amount": 6.5}]}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base_url = mock_server.uri();
        let records = tokio::task::spawn_blocking(move || client_for(base_url).list_foods(3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].protein, 6.5);
        assert!(records[0].fetched_at.is_some());
    }
}
