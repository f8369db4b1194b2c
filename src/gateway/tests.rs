#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Extension, Json, Router};

    use crate::gateway::client::ShardClient;
    use crate::gateway::handlers::{prepare_query_terms, response_status};
    use crate::gateway::ranking::{MAX_RESULTS, aggregate_and_rank, is_duplicate, relevance_score};
    use crate::gateway::scatter::query_all_shards;
    use crate::gateway::types::{FindAddressResponse, ScoredRecord, ShardEndpoint, ShardResult};
    use crate::node::handlers as node_handlers;
    use crate::node::protocol::{
        ENDPOINT_SEARCH, ENDPOINT_STATISTICS, SearchResponse, WireAddressRecord,
    };
    use crate::node::shard::ShardNode;

    fn wire_record(number: &str, street: &str, unit: &str, city: &str, postcode: &str) -> WireAddressRecord {
        WireAddressRecord {
            hash: "00000000000000aa".to_string(),
            longitude: -122.6,
            latitude: 47.1,
            number: number.to_string(),
            street: street.to_string(),
            unit: unit.to_string(),
            city: city.to_string(),
            postcode: postcode.to_string(),
        }
    }

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    // ============================================================
    // TERM PREPARATION TESTS
    // ============================================================

    #[test]
    fn test_prepare_terms_splits_on_whitespace() {
        assert_eq!(
            prepare_query_terms("611 3RD  Steilacoom"),
            terms(&["611", "3RD", "Steilacoom"])
        );
    }

    #[test]
    fn test_prepare_terms_comma_keeps_one_structured_term() {
        assert_eq!(
            prepare_query_terms("611 3RD ST, Steilacoom"),
            terms(&["611 3RD ST, Steilacoom"])
        );
    }

    #[test]
    fn test_prepare_terms_blank_input_yields_nothing() {
        assert!(prepare_query_terms("").is_empty());
        assert!(prepare_query_terms("   \t ").is_empty());
    }

    // ============================================================
    // STATUS CLASSIFICATION TESTS
    // ============================================================

    #[test]
    fn test_response_status_branches_on_success_count() {
        assert_eq!(response_status(2, 0), StatusCode::OK);
        assert_eq!(response_status(1, 1), StatusCode::MULTI_STATUS);
        assert_eq!(response_status(0, 2), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response_status(0, 0), StatusCode::SERVICE_UNAVAILABLE);
        // All shards succeeding with zero records is still a success.
        assert_eq!(response_status(2, 0), StatusCode::OK);
    }

    // ============================================================
    // DUPLICATE DETECTION TESTS
    // ============================================================

    #[test]
    fn test_duplicate_ignores_unit() {
        let a = wire_record("123", "MAIN STREET", "", "SEATTLE", "98101");
        let b = wire_record("123", "MAIN STREET", "APT 4", "SEATTLE", "98101");
        assert!(is_duplicate(&a, &b));
    }

    #[test]
    fn test_duplicate_requires_all_four_fields() {
        let a = wire_record("123", "MAIN STREET", "", "SEATTLE", "98101");
        for other in [
            wire_record("124", "MAIN STREET", "", "SEATTLE", "98101"),
            wire_record("123", "MAIN AVE", "", "SEATTLE", "98101"),
            wire_record("123", "MAIN STREET", "", "TACOMA", "98101"),
            wire_record("123", "MAIN STREET", "", "SEATTLE", "98102"),
        ] {
            assert!(!is_duplicate(&a, &other));
        }
    }

    // ============================================================
    // SCORING TESTS
    // ============================================================

    #[test]
    fn test_score_prefix_matches_and_completeness() {
        let record = wire_record("123", "MAIN STREET", "", "SEATTLE", "98101");
        let score = relevance_score(&record, &terms(&["MAIN", "SEATTLE"]));

        // 100 (both terms match) + 15 (street prefix) + 8 (city prefix)
        // + 8 (four non-empty fields).
        assert!((score - 131.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_substring_match_scores_lower_than_prefix() {
        let prefix = wire_record("1", "MAIN ST", "", "", "");
        let inner = wire_record("1", "E MAIN ST", "", "", "");
        let q = terms(&["MAIN"]);

        // 100 + 15 + 4 vs 100 + 10 + 4.
        assert!((relevance_score(&prefix, &q) - 119.0).abs() < 1e-9);
        assert!((relevance_score(&inner, &q) - 114.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_postcode_and_number_bonuses() {
        let record = wire_record("611", "3RD ST", "", "Steilacoom", "98388");
        let score = relevance_score(&record, &terms(&["611", "98388"]));

        // 100 + 5 (number) + 3 (postcode) + 8 (completeness).
        assert!((score - 116.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_unmatched_terms_only_earn_completeness() {
        let record = wire_record("611", "3RD ST", "", "Steilacoom", "98388");
        let score = relevance_score(&record, &terms(&["ZEBRA"]));
        assert!((score - 8.0).abs() < 1e-9);
    }

    // ============================================================
    // AGGREGATION AND RANKING TESTS
    // ============================================================

    #[test]
    fn test_rank_merges_shards_and_sorts_descending() {
        let q = terms(&["MAIN", "SEATTLE"]);
        let results = vec![
            ShardResult::ok(
                0,
                vec![
                    wire_record("123", "MAIN STREET", "", "SEATTLE", "98101"),
                    wire_record("77", "PINE STREET", "", "SEATTLE", "98101"),
                ],
            ),
            ShardResult::ok(1, vec![wire_record("9", "E MAIN WAY", "", "TACOMA", "98402")]),
        ];

        let ranked = aggregate_and_rank(&results, &q, MAX_RESULTS);
        assert_eq!(ranked.len(), 3);
        for pair in ranked.windows(2) {
            assert!(pair[0].relevance_score >= pair[1].relevance_score);
        }
        assert_eq!(ranked[0].record.street, "MAIN STREET");
    }

    #[test]
    fn test_rank_deduplicates_across_shards_keeping_higher_score() {
        let q = terms(&["MAIN"]);
        // Same address; the shard-1 copy carries a unit, which earns the
        // completeness bonus and a higher score.
        let results = vec![
            ShardResult::ok(0, vec![wire_record("123", "MAIN ST", "", "SEATTLE", "98101")]),
            ShardResult::ok(
                1,
                vec![wire_record("123", "MAIN ST", "APT 2", "SEATTLE", "98101")],
            ),
        ];

        let ranked = aggregate_and_rank(&results, &q, MAX_RESULTS);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].shard_id, 1);
        assert_eq!(ranked[0].record.unit, "APT 2");
    }

    #[test]
    fn test_rank_tie_keeps_the_incumbent() {
        let q = terms(&["MAIN"]);
        let copy = wire_record("123", "MAIN ST", "", "SEATTLE", "98101");
        let results = vec![
            ShardResult::ok(0, vec![copy.clone()]),
            ShardResult::ok(1, vec![copy]),
        ];

        let ranked = aggregate_and_rank(&results, &q, MAX_RESULTS);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].shard_id, 0);
    }

    #[test]
    fn test_rank_skips_failed_shards() {
        let q = terms(&["MAIN"]);
        let mut failed = ShardResult::failed(1, "rpc timeout after 5000ms".to_string());
        // Even if a failed result somehow carried records, they are ignored.
        failed
            .records
            .push(wire_record("9", "MAIN ST", "", "TACOMA", "98402"));

        let results = vec![
            ShardResult::ok(0, vec![wire_record("123", "MAIN ST", "", "SEATTLE", "98101")]),
            failed,
        ];

        let ranked = aggregate_and_rank(&results, &q, MAX_RESULTS);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].shard_id, 0);
    }

    #[test]
    fn test_rank_truncates_to_max_results() {
        let q = terms(&["STREET"]);
        let records: Vec<WireAddressRecord> = (0..8)
            .map(|i| wire_record(&format!("{i}"), "STREET", "", "SEATTLE", "98101"))
            .collect();
        let results = vec![ShardResult::ok(0, records)];

        let ranked = aggregate_and_rank(&results, &q, MAX_RESULTS);
        assert_eq!(ranked.len(), MAX_RESULTS);
    }

    // ============================================================
    // RESPONSE SERIALIZATION TESTS
    // ============================================================

    #[test]
    fn test_response_error_field_only_present_on_total_failure() {
        let response = FindAddressResponse {
            query: "main".to_string(),
            query_terms: terms(&["main"]),
            results: vec![],
            result_count: 0,
            successful_nodes: 2,
            failed_nodes: 0,
            error: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("error").is_none());

        let response = FindAddressResponse {
            error: Some("All data nodes failed to respond".to_string()),
            successful_nodes: 0,
            failed_nodes: 2,
            ..response
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json["error"],
            serde_json::json!("All data nodes failed to respond")
        );
    }

    #[test]
    fn test_scored_record_flattens_into_result_object() {
        let scored = ScoredRecord {
            record: wire_record("123", "MAIN ST", "", "SEATTLE", "98101"),
            shard_id: 1,
            relevance_score: 42.0,
        };
        let json = serde_json::to_value(&scored).unwrap();

        assert_eq!(json["hash"], serde_json::json!("00000000000000aa"));
        assert_eq!(json["street"], serde_json::json!("MAIN ST"));
        assert_eq!(json["shard_id"], serde_json::json!(1));
        assert_eq!(json["relevance_score"], serde_json::json!(42.0));
    }

    // ============================================================
    // CLIENT CLASSIFICATION TESTS (in-process shard stubs)
    // ============================================================

    async fn spawn_stub(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr, shard_id: u32, timeout_ms: u64) -> ShardClient {
        ShardClient::new(
            &ShardEndpoint {
                shard_id,
                address: addr.to_string(),
            },
            reqwest::Client::new(),
            Duration::from_millis(timeout_ms),
        )
    }

    #[tokio::test]
    async fn test_client_classifies_success() {
        let canned = SearchResponse {
            results: vec![wire_record("123", "MAIN ST", "", "SEATTLE", "98101")],
            result_count: 1,
        };
        let app = Router::new().route(
            ENDPOINT_SEARCH,
            post(move || {
                let canned = canned.clone();
                async move { Json(canned) }
            }),
        );
        let addr = spawn_stub(app).await;

        let result = client_for(addr, 0, 1000).search(&terms(&["MAIN"])).await;
        assert!(result.success);
        assert!(result.error.is_none());
        assert_eq!(result.records.len(), 1);
    }

    #[tokio::test]
    async fn test_client_classifies_server_error() {
        let app = Router::new().route(
            ENDPOINT_SEARCH,
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let addr = spawn_stub(app).await;

        let result = client_for(addr, 0, 1000).search(&terms(&["MAIN"])).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("rpc error"));
        assert!(result.records.is_empty());
    }

    #[tokio::test]
    async fn test_client_classifies_unreachable_shard_as_error() {
        // Bind then drop the listener so the port refuses connections.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = client_for(addr, 0, 1000).search(&terms(&["MAIN"])).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("rpc error"));
    }

    #[tokio::test]
    async fn test_client_classifies_timeout() {
        let app = Router::new().route(
            ENDPOINT_SEARCH,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(SearchResponse {
                    results: vec![],
                    result_count: 0,
                })
            }),
        );
        let addr = spawn_stub(app).await;

        let result = client_for(addr, 0, 100).search(&terms(&["MAIN"])).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("timeout"));
    }

    #[tokio::test]
    async fn test_scatter_is_bounded_by_the_deadline_not_the_sum() {
        let slow = Router::new().route(
            ENDPOINT_SEARCH,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(SearchResponse {
                    results: vec![],
                    result_count: 0,
                })
            }),
        );
        let fast = Router::new().route(
            ENDPOINT_SEARCH,
            post(|| async {
                Json(SearchResponse {
                    results: vec![wire_record("123", "MAIN ST", "", "SEATTLE", "98101")],
                    result_count: 1,
                })
            }),
        );
        let slow_addr = spawn_stub(slow).await;
        let fast_addr = spawn_stub(fast).await;

        let clients = vec![
            client_for(slow_addr, 0, 300),
            client_for(fast_addr, 1, 300),
        ];

        let started = Instant::now();
        let results = query_all_shards(&clients, &terms(&["MAIN"])).await;
        let elapsed = started.elapsed();

        // Deadline 300ms; allow generous local overhead but nowhere near
        // the slow shard's 30s.
        assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");

        assert_eq!(results.len(), 2);
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap_or("").contains("timeout"));
        assert!(results[1].success);
        assert_eq!(results[1].records.len(), 1);
    }

    // ============================================================
    // END-TO-END RPC TEST (real shard node behind the client)
    // ============================================================

    #[tokio::test]
    async fn test_client_against_a_real_shard_node() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "LON,LAT,NUMBER,STREET,UNIT,CITY,DISTRICT,REGION,POSTCODE,ID,HASH").unwrap();
        writeln!(
            file,
            "-122.608996,47.166377,611,3RD ST,,Steilacoom,,,98388,,46a6ea62641c0d1c"
        )
        .unwrap();
        file.flush().unwrap();

        let mut node = ShardNode::new(0, file.path());
        node.initialize().unwrap();
        let node = Arc::new(node);

        let app = Router::new()
            .route(ENDPOINT_SEARCH, post(node_handlers::handle_search))
            .route(ENDPOINT_STATISTICS, get(node_handlers::handle_statistics))
            .layer(Extension(node));
        let addr = spawn_stub(app).await;

        let result = client_for(addr, 0, 1000).search(&terms(&["3RD"])).await;
        assert!(result.success);
        assert_eq!(result.records.len(), 1);

        // The wire carries display forms and the hex-encoded id.
        let record = &result.records[0];
        assert_eq!(record.hash, "46a6ea62641c0d1c");
        assert_eq!(record.street, "3RD ST");
        assert_eq!(record.city, "Steilacoom");
        assert_eq!(record.postcode, "98388");
    }
}
