use reqwest::Url;
use serde_json::Value;
use validator::Validate;

use crate::config::{Config, SearchDefaults, UpstreamConfig};
use crate::errors::SearchError;
use crate::models::{SearchParams, SearchQuery};
use crate::services::UpstreamClient;

/// Runs one nearby search and returns the upstream payload on success.
///
/// Validation happens before the key check, and nothing is sent upstream
/// unless both pass.
pub async fn search_nearby(
    query: &SearchQuery,
    config: &Config,
    upstream: &dyn UpstreamClient,
) -> Result<Value, SearchError> {
    let params = resolve_params(query, &config.search)?;

    let key = config
        .upstream
        .api_key
        .as_deref()
        .ok_or(SearchError::MissingConfiguration("AMAP_KEY"))?;

    let url = build_upstream_url(&params, &config.upstream, key)?;
    tracing::debug!(
        keywords = %params.keywords,
        lng = %params.lng,
        lat = %params.lat,
        radius = params.radius,
        "searching nearby places"
    );

    let payload = upstream.get_json(url).await?;

    if upstream_succeeded(&payload) {
        return Ok(payload);
    }

    let info = payload
        .get("info")
        .and_then(Value::as_str)
        .filter(|info| !info.is_empty())
        .unwrap_or("Upstream request failed")
        .to_string();

    Err(SearchError::UpstreamRejected { info, raw: payload })
}

/// Applies aliases and defaults, then validates the result.
pub fn resolve_params(
    query: &SearchQuery,
    defaults: &SearchDefaults,
) -> Result<SearchParams, SearchError> {
    let lng = first_present(&query.lng, &query.longitude);
    let lat = first_present(&query.lat, &query.latitude);
    let (lng, lat) = match (lng, lat) {
        (Some(lng), Some(lat)) => (lng, lat),
        _ => return Err(SearchError::MissingParameter),
    };

    let radius = match first_present(&query.radius, &None) {
        Some(radius) => radius.parse::<u32>().map_err(|_| {
            SearchError::InvalidParameter(format!(
                "radius must be a non-negative integer, got {:?}",
                radius
            ))
        })?,
        None => defaults.radius,
    };

    let params = SearchParams {
        keywords: first_present(&query.keywords, &query.query).unwrap_or_default(),
        lng,
        lat,
        radius,
        category: first_present(&query.category, &None).or_else(|| defaults.category.clone()),
    };

    params
        .validate()
        .map_err(|e| SearchError::InvalidParameter(e.to_string()))?;

    Ok(params)
}

pub fn build_upstream_url(
    params: &SearchParams,
    upstream: &UpstreamConfig,
    key: &str,
) -> Result<Url, SearchError> {
    let location = format!("{},{}", params.lng, params.lat);
    let radius = params.radius.to_string();

    let mut pairs: Vec<(&str, &str)> = vec![
        ("location", location.as_str()),
        ("keywords", params.keywords.as_str()),
        ("radius", radius.as_str()),
    ];
    if let Some(category) = &params.category {
        pairs.push(("types", category.as_str()));
    }
    pairs.push(("key", key));
    pairs.push(("output", "JSON"));

    Url::parse_with_params(&upstream.endpoint, &pairs)
        .map_err(|e| SearchError::InvalidEndpoint(e.to_string()))
}

/// The place API reports `"status": "1"` on success; some proxies turn it into a number.
pub fn upstream_succeeded(payload: &Value) -> bool {
    match payload.get("status") {
        Some(Value::String(status)) => status == "1",
        Some(Value::Number(status)) => status.as_u64() == Some(1),
        _ => false,
    }
}

fn first_present(primary: &Option<String>, alias: &Option<String>) -> Option<String> {
    [primary, alias]
        .into_iter()
        .flatten()
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::UpstreamError;
    use crate::services::MockUpstreamClient;
    use rstest::rstest;
    use serde_json::json;
    use std::collections::HashMap;

    fn config_with_key(key: Option<&str>) -> Config {
        let mut config = Config::default();
        config.upstream.api_key = key.map(str::to_string);
        config
    }

    fn query(pairs: &[(&str, &str)]) -> SearchQuery {
        let mut q = SearchQuery::default();
        for (name, value) in pairs {
            let value = Some(value.to_string());
            match *name {
                "keywords" => q.keywords = value,
                "query" => q.query = value,
                "lng" => q.lng = value,
                "longitude" => q.longitude = value,
                "lat" => q.lat = value,
                "latitude" => q.latitude = value,
                "radius" => q.radius = value,
                "category" => q.category = value,
                other => panic!("unknown parameter {other}"),
            }
        }
        q
    }

    fn query_pairs(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[rstest]
    #[case(&[("lat", "39.9")])]
    #[case(&[("lng", "116.4")])]
    #[case(&[("lng", "116.4"), ("lat", "  ")])]
    #[case(&[("keywords", "cafe")])]
    fn missing_coordinates_are_rejected(#[case] pairs: &[(&str, &str)]) {
        let err = resolve_params(&query(pairs), &Config::default().search).unwrap_err();
        assert!(matches!(err, SearchError::MissingParameter));
    }

    #[test]
    fn aliases_resolve_and_defaults_fill_in() {
        let params = resolve_params(
            &query(&[("query", "cafe"), ("longitude", "116.4"), ("latitude", "39.9")]),
            &Config::default().search,
        )
        .unwrap();

        assert_eq!(params.keywords, "cafe");
        assert_eq!(params.lng, "116.4");
        assert_eq!(params.lat, "39.9");
        assert_eq!(params.radius, 2000);
        assert_eq!(params.category, None);
    }

    #[test]
    fn primary_names_win_over_aliases() {
        let params = resolve_params(
            &query(&[
                ("keywords", "tea"),
                ("query", "cafe"),
                ("lng", "1.5"),
                ("longitude", "2.5"),
                ("lat", "3.5"),
                ("latitude", "4.5"),
            ]),
            &Config::default().search,
        )
        .unwrap();

        assert_eq!(params.keywords, "tea");
        assert_eq!(params.lng, "1.5");
        assert_eq!(params.lat, "3.5");
    }

    #[test]
    fn configured_defaults_are_used() {
        let defaults = SearchDefaults {
            radius: 800,
            category: Some("050000".into()),
        };
        let params =
            resolve_params(&query(&[("lng", "116.4"), ("lat", "39.9")]), &defaults).unwrap();

        assert_eq!(params.keywords, "");
        assert_eq!(params.radius, 800);
        assert_eq!(params.category.as_deref(), Some("050000"));
    }

    #[rstest]
    #[case("radius", "far")]
    #[case("radius", "-5")]
    #[case("radius", "50001")]
    #[case("lng", "east")]
    #[case("lat", "91")]
    fn invalid_values_are_rejected(#[case] name: &str, #[case] value: &str) {
        let mut pairs = vec![("lng", "116.4"), ("lat", "39.9")];
        pairs.retain(|(n, _)| *n != name);
        pairs.push((name, value));

        let err = resolve_params(&query(&pairs), &Config::default().search).unwrap_err();
        assert!(matches!(err, SearchError::InvalidParameter(_)), "{err:?}");
    }

    #[test]
    fn upstream_url_carries_every_parameter() {
        let params = SearchParams {
            keywords: "咖啡 & tea".into(),
            lng: "116.4".into(),
            lat: "39.9".into(),
            radius: 1500,
            category: Some("050000".into()),
        };
        let url = build_upstream_url(&params, &Config::default().upstream, "k3y").unwrap();

        assert_eq!(url.host_str(), Some("restapi.amap.com"));
        assert_eq!(url.path(), "/v3/place/around");
        let pairs = query_pairs(&url);
        assert_eq!(pairs["location"], "116.4,39.9");
        assert_eq!(pairs["keywords"], "咖啡 & tea");
        assert_eq!(pairs["radius"], "1500");
        assert_eq!(pairs["types"], "050000");
        assert_eq!(pairs["key"], "k3y");
        assert_eq!(pairs["output"], "JSON");
        assert!(!url.as_str().contains(' '));
    }

    #[test]
    fn types_is_omitted_without_a_category() {
        let params = SearchParams {
            keywords: String::new(),
            lng: "116.4".into(),
            lat: "39.9".into(),
            radius: 2000,
            category: None,
        };
        let url = build_upstream_url(&params, &Config::default().upstream, "k3y").unwrap();
        assert!(!query_pairs(&url).contains_key("types"));
    }

    #[rstest]
    #[case(json!({"status": "1"}), true)]
    #[case(json!({"status": 1}), true)]
    #[case(json!({"status": "0"}), false)]
    #[case(json!({"status": 0}), false)]
    #[case(json!({"info": "OK"}), false)]
    fn upstream_status_indicator(#[case] payload: Value, #[case] expected: bool) {
        assert_eq!(upstream_succeeded(&payload), expected);
    }

    #[actix_rt::test]
    async fn success_returns_the_payload() {
        let payload = json!({"status": "1", "info": "OK", "count": "1", "pois": [{"name": "Cafe"}]});
        let returned = payload.clone();

        let mut upstream = MockUpstreamClient::new();
        upstream
            .expect_get_json()
            .withf(|url| url.query_pairs().any(|(k, v)| k == "location" && v == "116.4,39.9"))
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let result = search_nearby(
            &query(&[("keywords", "cafe"), ("lng", "116.4"), ("lat", "39.9")]),
            &config_with_key(Some("secret")),
            &upstream,
        )
        .await
        .unwrap();

        assert_eq!(result, payload);
    }

    #[actix_rt::test]
    async fn missing_key_never_calls_upstream() {
        let mut upstream = MockUpstreamClient::new();
        upstream.expect_get_json().never();

        let err = search_nearby(
            &query(&[("lng", "116.4"), ("lat", "39.9")]),
            &config_with_key(None),
            &upstream,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SearchError::MissingConfiguration("AMAP_KEY")));
        assert_eq!(err.to_string(), "Missing AMAP_KEY");
    }

    #[actix_rt::test]
    async fn rejected_search_preserves_upstream_diagnostics() {
        let payload = json!({"status": "0", "info": "INVALID_USER_KEY", "infocode": "10001"});
        let returned = payload.clone();

        let mut upstream = MockUpstreamClient::new();
        upstream
            .expect_get_json()
            .times(1)
            .returning(move |_| Ok(returned.clone()));

        let err = search_nearby(
            &query(&[("lng", "116.4"), ("lat", "39.9")]),
            &config_with_key(Some("bad")),
            &upstream,
        )
        .await
        .unwrap_err();

        match err {
            SearchError::UpstreamRejected { info, raw } => {
                assert_eq!(info, "INVALID_USER_KEY");
                assert_eq!(raw, payload);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[actix_rt::test]
    async fn rejection_without_info_gets_a_generic_message() {
        let mut upstream = MockUpstreamClient::new();
        upstream
            .expect_get_json()
            .returning(|_| Ok(json!({"status": "0"})));

        let err = search_nearby(
            &query(&[("lng", "116.4"), ("lat", "39.9")]),
            &config_with_key(Some("secret")),
            &upstream,
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Upstream request failed");
    }

    #[actix_rt::test]
    async fn transport_failure_is_reported() {
        let mut upstream = MockUpstreamClient::new();
        upstream
            .expect_get_json()
            .times(1)
            .returning(|_| Err(UpstreamError::Network("connection reset by peer".into())));

        let err = search_nearby(
            &query(&[("lng", "116.4"), ("lat", "39.9")]),
            &config_with_key(Some("secret")),
            &upstream,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, SearchError::UpstreamTransport(_)));
        assert!(err.to_string().contains("connection reset by peer"));
    }
}
