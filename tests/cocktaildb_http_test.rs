use anyhow::Result;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use drinkify::app::catalog_use_case::CatalogUseCase;
use drinkify::app::ports::DrinkSourcePort;
use drinkify::config::ApiConfig;
use drinkify::error::{DrinkifyError, PartitionFetchError};
use drinkify::infra::http_client::CocktailDbHttp;
use drinkify::{AggregationOutcome, CancellationToken, CatalogAggregator, PartitionKey, Progress, QueryFilter};
use serde_json::json;
use std::collections::HashMap;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

const API_PREFIX: &str = "/api/json/v1/1";

/// Serve `app` on a loopback port and return the API base URL.
fn spawn_fake_api(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::Server::from_tcp(listener)
            .unwrap()
            .serve(app.into_make_service())
            .await
            .unwrap();
    });
    format!("http://{}{}", addr, API_PREFIX)
}

fn http_source(base_url: &str) -> CocktailDbHttp {
    CocktailDbHttp::new(&ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        ..ApiConfig::default()
    })
    .unwrap()
}

fn drink_json(id: &str, name: &str, category: &str, alcoholic: &str) -> serde_json::Value {
    json!({
        "idDrink": id,
        "strDrink": name,
        "strCategory": category,
        "strAlcoholic": alcoholic,
        "strGlass": "Highball glass",
        "strInstructions": "Build over ice.",
        "strIngredient1": "Gin",
        "strMeasure1": "2 oz",
        "strIngredient2": null,
        "strMeasure2": null
    })
}

/// 'a', 'g', 'm' carry drinks ('g' repeats an id from 'a', 'm' has one record
/// without an id), 'x' answers 500,
/// 'y' answers garbage, '0' answers an empty body, the rest `{"drinks":null}`.
async fn search(Query(params): Query<HashMap<String, String>>) -> Response {
    let key = params.get("f").cloned().unwrap_or_default();
    match key.as_str() {
        "a" => Json(json!({ "drinks": [
            drink_json("17222", "A1", "Cocktail", "Alcoholic"),
            drink_json("13501", "ABC", "Shot", "Alcoholic"),
        ]}))
        .into_response(),
        "g" => Json(json!({ "drinks": [
            drink_json("11403", "Gin Fizz", "Ordinary Drink", "Alcoholic"),
            drink_json("17222", "A1", "Cocktail", "Alcoholic"),
        ]}))
        .into_response(),
        "m" => Json(json!({ "drinks": [
            drink_json("12690", "Mango Orange Smoothie", "Other / Unknown", "Non alcoholic"),
            json!({ "strDrink": "Missing Id" }),
            drink_json("11000", "Mojito", "Cocktail", "Alcoholic"),
        ]}))
        .into_response(),
        "x" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "y" => "<html>rate limited</html>".into_response(),
        "0" => "".into_response(),
        _ => Json(json!({ "drinks": null })).into_response(),
    }
}

async fn random_ok() -> Json<serde_json::Value> {
    Json(json!({ "drinks": [drink_json("11007", "Margarita", "Ordinary Drink", "Alcoholic")] }))
}

async fn random_empty() -> Json<serde_json::Value> {
    Json(json!({ "drinks": null }))
}

async fn always_unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

fn catalog_api() -> Router {
    Router::new()
        .route(&format!("{}/search.php", API_PREFIX), get(search))
        .route(&format!("{}/random.php", API_PREFIX), get(random_ok))
}

#[tokio::test]
async fn test_full_catalog_over_http() -> Result<()> {
    let base_url = spawn_fake_api(catalog_api());
    let source: Arc<dyn DrinkSourcePort> = Arc::new(http_source(&base_url));
    let catalog = CatalogUseCase::new(source, CatalogAggregator::new());
    let mut progress = Vec::new();

    let outcome = catalog
        .load_all(|p| progress.push(p), &CancellationToken::new())
        .await?;

    let aggregation = match outcome {
        AggregationOutcome::Complete(aggregation) => aggregation,
        AggregationOutcome::Cancelled { .. } => panic!("unexpected cancellation"),
    };
    let names: Vec<_> = aggregation.items.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["A1", "ABC", "Gin Fizz", "Mango Orange Smoothie", "Mojito"]);
    assert_eq!(aggregation.summary.partitions_total, 36);
    assert_eq!(aggregation.summary.partitions_failed, 2);
    assert_eq!(aggregation.summary.items_fetched, 6);

    assert_eq!(progress.len(), 36);
    assert_eq!(progress.last(), Some(&Progress { completed: 36, total: 36 }));
    assert!(progress.windows(2).all(|w| w[1].completed == w[0].completed + 1));

    let non_alcoholic = QueryFilter::apply(&aggregation.items, "NON ALC");
    assert_eq!(non_alcoholic.len(), 1);
    assert_eq!(non_alcoholic[0].name, "Mango Orange Smoothie");
    Ok(())
}

#[tokio::test]
async fn test_partition_errors_are_classified() {
    let base_url = spawn_fake_api(catalog_api());
    let http = http_source(&base_url);

    assert!(matches!(
        http.fetch_partition(PartitionKey('x')).await,
        Err(PartitionFetchError::Status { status: 500, .. })
    ));
    assert!(matches!(
        http.fetch_partition(PartitionKey('y')).await,
        Err(PartitionFetchError::Malformed { .. })
    ));
    assert!(http.fetch_partition(PartitionKey('0')).await.unwrap().is_empty());
    assert!(http.fetch_partition(PartitionKey('q')).await.unwrap().is_empty());

    let names: Vec<_> = http
        .fetch_partition(PartitionKey('m'))
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Mango Orange Smoothie", "Mojito"]);
}

#[tokio::test]
async fn test_unreachable_source_yields_empty_catalog() -> Result<()> {
    let app = Router::new().route(&format!("{}/search.php", API_PREFIX), get(always_unavailable));
    let base_url = spawn_fake_api(app);
    let source: Arc<dyn DrinkSourcePort> = Arc::new(http_source(&base_url));
    let catalog = CatalogUseCase::new(source, CatalogAggregator::with_max_concurrency(8));
    let mut last = None;

    let outcome = catalog
        .load_all(|p| last = Some(p), &CancellationToken::new())
        .await?;

    match outcome {
        AggregationOutcome::Complete(aggregation) => {
            assert!(aggregation.items.is_empty());
            assert_eq!(aggregation.summary.partitions_failed, 36);
        }
        AggregationOutcome::Cancelled { .. } => panic!("unexpected cancellation"),
    }
    assert_eq!(last, Some(Progress { completed: 36, total: 36 }));
    Ok(())
}

#[tokio::test]
async fn test_cancel_while_partition_hangs() -> Result<()> {
    async fn slow_search(Query(params): Query<HashMap<String, String>>) -> Response {
        if params.get("f").map(String::as_str) == Some("z") {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Json(json!({ "drinks": null })).into_response()
    }

    let app = Router::new().route(&format!("{}/search.php", API_PREFIX), get(slow_search));
    let base_url = spawn_fake_api(app);
    let source: Arc<dyn DrinkSourcePort> = Arc::new(http_source(&base_url));
    let catalog = CatalogUseCase::new(source, CatalogAggregator::new());
    let cancel = CancellationToken::new();
    let mut seen = 0;

    let outcome = tokio::time::timeout(
        Duration::from_secs(4),
        catalog.load_all(
            |p| {
                seen = p.completed;
                if p.completed == 35 {
                    cancel.cancel();
                }
            },
            &cancel,
        ),
    )
    .await
    .expect("cancellation should not wait for the hung partition")?;

    match outcome {
        AggregationOutcome::Cancelled { settled } => assert_eq!(settled, 35),
        AggregationOutcome::Complete(_) => panic!("expected cancellation"),
    }
    assert_eq!(seen, 35);
    Ok(())
}

#[tokio::test]
async fn test_random_drink() {
    let base_url = spawn_fake_api(catalog_api());
    let drink = http_source(&base_url).random().await.unwrap();
    assert_eq!(drink.id, "11007");
    assert_eq!(drink.name, "Margarita");
    assert_eq!(drink.ingredients(), vec!["2 oz Gin"]);
}

#[tokio::test]
async fn test_random_without_drink_is_error() {
    let app = Router::new().route(&format!("{}/random.php", API_PREFIX), get(random_empty));
    let base_url = spawn_fake_api(app);
    assert!(matches!(
        http_source(&base_url).random().await,
        Err(DrinkifyError::NoDrink)
    ));
}

#[tokio::test]
async fn test_random_http_error() {
    let app = Router::new().route(&format!("{}/random.php", API_PREFIX), get(always_unavailable));
    let base_url = spawn_fake_api(app);
    assert!(matches!(
        http_source(&base_url).random().await,
        Err(DrinkifyError::Api { .. })
    ));
}
