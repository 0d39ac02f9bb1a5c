//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置到处理器的装配测试
//! - 模拟 e2e 测试（mock 客户端，无网络）
//! - HTTP e2e 测试（wiremock 模拟远程服务）

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{AgeKey, ContractError, TaskKind, TaskRecord, MAX_BATCH_NAMES};
    use dispatcher::{BatchPreloader, DispatchCache};
    use ingestion::ProcessorConfig;
    use serde_json::json;

    #[test]
    fn test_settings_feed_processor_and_preloader() {
        let settings = ConfigLoader::load_from_str(
            "[input]\ndir = \"data\"\nmax_concurrent_files = 4\n[preload]\nbatch_size = 3\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        let config = ProcessorConfig::from_settings(&settings.input);
        assert_eq!(config.max_concurrent_files, 4);
        assert_eq!(config.processed_suffix, "_processed");
        assert_eq!(BatchPreloader::new(settings.preload.batch_size).batch_size(), 3);
    }

    #[test]
    fn test_task_keys_plan_with_configured_batch_size() {
        let settings =
            ConfigLoader::load_from_str("[preload]\nbatch_size = 2\n", ConfigFormat::Toml).unwrap();
        let tasks: Vec<TaskRecord> = [
            json!({"type": "age", "name": "Ana", "country": "es"}),
            json!({"type": "AGE", "name": "Luis", "country": "ES"}),
            json!({"type": "age", "name": "Eva", "country": "Es"}),
            json!({"type": "joke", "name": "Ana", "country": "es"}),
            json!({"type": "age", "name": "Ana", "country": "ES"}),
        ]
        .into_iter()
        .map(|value| TaskRecord::from_value(value).unwrap())
        .collect();

        assert_eq!(tasks[3].kind(), TaskKind::Joke);
        let keys: Vec<AgeKey> = tasks.iter().filter_map(TaskRecord::age_key).collect();
        assert_eq!(keys.len(), 4);

        let cache = DispatchCache::new();
        cache.put("Eva", "es", json!({"name": "Eva", "age": 40}));

        let chunks = BatchPreloader::new(settings.preload.batch_size).plan(keys, &cache);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].country, "ES");
        assert_eq!(chunks[0].names, vec!["Ana".to_string(), "Luis".to_string()]);
        assert!(chunks.iter().all(|c| c.names.len() <= MAX_BATCH_NAMES));
    }

    #[test]
    fn test_oversized_batch_setting_is_a_validation_error() {
        let err = ConfigLoader::load_from_str("[preload]\nbatch_size = 11\n", ConfigFormat::Toml)
            .unwrap_err();
        match err {
            ContractError::ConfigValidation { field, .. } => {
                assert_eq!(field, "preload.batch_size");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;

    use api_clients::{MockEchoClient, MockJokeClient, MockLookupClient};
    use dispatcher::TaskDispatcher;
    use ingestion::{JsonProcessor, ProcessorConfig};
    use serde_json::{json, Value};

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    /// End-to-end test: nested input tree -> preload -> dispatch -> outputs
    ///
    /// 验证完整的数据流：
    /// 1. 递归发现多层目录中的任务文件
    /// 2. 同一国家的 age 任务合并为批量请求
    /// 3. 成功的文件写出结果并删除输入，失败与非法的文件保留
    /// 4. 第二次运行不会重新处理输出文件
    #[tokio::test]
    async fn test_e2e_nested_tree() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        // 12 age tasks for the same country -> 2 batch calls (10 + 2)
        for i in 0..12 {
            let name = format!("Name{}", char::from(b'a' + i as u8));
            let country = if i % 2 == 0 { "us" } else { "US" };
            write(
                root,
                &format!("2024-06-01/age_{i:02}.json"),
                &json!({"type": "age", "name": name, "country": country}).to_string(),
            );
        }
        write(root, "2024-06-02/joke.json", r#"{"type": "Joke"}"#);
        write(root, "2024-06-02/raw.json", r#"{"type": "greeting", "message": "Hello"}"#);
        write(root, "2024-06-02/deep/bad_name.json", r#"{"type": "age", "name": "R2-D2", "country": "us"}"#);
        write(root, "2024-06-02/deep/broken.json", "{\"type\": ");
        write(root, "2024-06-02/old_processed.json", r#"{"type": "greeting"}"#);

        let dispatcher = Arc::new(TaskDispatcher::new(
            MockLookupClient::new(),
            MockJokeClient::new(),
            MockEchoClient::new(),
        ));
        let processor = JsonProcessor::new(ProcessorConfig {
            input_dir: root.to_path_buf(),
            ..Default::default()
        });

        let report = processor.process_all(Arc::clone(&dispatcher)).await.unwrap();

        assert_eq!(report.discovered, 16);
        assert_eq!(report.succeeded, 14);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.preload.chunks, 2);
        assert_eq!(report.preload.cached, 12);

        let lookup = dispatcher.lookup_client();
        let batch_sizes: Vec<usize> = lookup.batch_calls().iter().map(|(_, n)| n.len()).collect();
        assert_eq!(batch_sizes.iter().sum::<usize>(), 12);
        assert!(batch_sizes.contains(&10) && batch_sizes.contains(&2));
        assert!(lookup.single_calls().is_empty());

        let age = read(&root.join("2024-06-01/age_00_processed.json"));
        assert_eq!(age["name"], "Namea");
        assert_eq!(age["country_id"], "US");
        assert!(!root.join("2024-06-01/age_00.json").exists());

        assert!(read(&root.join("2024-06-02/joke_processed.json")).get("setup").is_some());
        assert_eq!(
            read(&root.join("2024-06-02/raw_processed.json")),
            json!({"type": "greeting", "message": "Hello"})
        );
        assert!(root.join("2024-06-02/deep/bad_name.json").exists());
        assert!(root.join("2024-06-02/deep/broken.json").exists());
        assert!(root.join("2024-06-02/old_processed.json").exists());
        assert!(!root.join("2024-06-02/old_processed_processed.json").exists());

        // 第二次运行：只剩非法文件
        let again = processor.process_all(Arc::clone(&dispatcher)).await.unwrap();
        assert_eq!(again.discovered, 2);
        assert_eq!(again.succeeded, 0);
        assert_eq!(dispatcher.echo_client().call_count(), 14);
    }

    #[tokio::test]
    async fn test_e2e_failed_batch_falls_back_to_single_lookups() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        write(root, "a.json", r#"{"type": "age", "name": "Luc", "country": "fr"}"#);
        write(root, "b.json", r#"{"type": "age", "name": "Ana", "country": "es"}"#);

        let dispatcher = Arc::new(TaskDispatcher::new(
            MockLookupClient::new().failing_country("FR"),
            MockJokeClient::new(),
            MockEchoClient::new(),
        ));
        let report = JsonProcessor::new(ProcessorConfig {
            input_dir: root.to_path_buf(),
            ..Default::default()
        })
        .process_all(Arc::clone(&dispatcher))
        .await
        .unwrap();

        assert_eq!(report.preload.failed_chunks, 1);
        assert_eq!(report.succeeded, 2);

        let singles = dispatcher.lookup_client().single_calls();
        assert_eq!(singles.len(), 1);
        assert_eq!(singles[0].name, "Luc");
        assert_eq!(dispatcher.metrics().cache_misses, 1);
        assert_eq!(dispatcher.metrics().cache_hits, 1);
    }
}

#[cfg(test)]
mod http_e2e_tests {
    use std::fs;
    use std::sync::Arc;
    use std::time::Duration;

    use api_clients::{AgifyClient, JokeApiClient, PostmanEchoClient};
    use dispatcher::TaskDispatcher;
    use ingestion::{JsonProcessor, ProcessorConfig};
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    /// Echo responder: wraps the request body in a postman-style envelope
    struct EchoResponder;

    impl Respond for EchoResponder {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
            ResponseTemplate::new(200).set_body_json(json!({
                "args": {},
                "json": body,
                "url": "http://mock/post"
            }))
        }
    }

    #[tokio::test]
    async fn test_e2e_over_http() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/agify"))
            .and(query_param("name[]", "Ana"))
            .and(query_param("country_id", "ES"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"count": 10, "name": "Ana", "age": 44, "country_id": "ES"}
            ])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/joke"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/post"))
            .respond_with(EchoResponder)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::write(root.join("age.json"), r#"{"type": "age", "name": "Ana", "country": "es"}"#).unwrap();
        fs::write(root.join("joke.json"), r#"{"type": "joke"}"#).unwrap();

        let timeout = Duration::from_secs(2);
        let dispatcher = Arc::new(TaskDispatcher::new(
            AgifyClient::new(format!("{}/agify", server.uri()), timeout).unwrap(),
            JokeApiClient::new(format!("{}/joke", server.uri()), timeout).unwrap(),
            PostmanEchoClient::new(format!("{}/post", server.uri()), timeout).unwrap(),
        ));

        let report = JsonProcessor::new(ProcessorConfig {
            input_dir: root.to_path_buf(),
            ..Default::default()
        })
        .process_all(dispatcher)
        .await
        .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);

        let output: Value =
            serde_json::from_str(&fs::read_to_string(root.join("age_processed.json")).unwrap())
                .unwrap();
        assert_eq!(output["age"], 44);
        assert!(!root.join("age.json").exists());

        // joke service failed: input kept, no output
        assert!(root.join("joke.json").exists());
        assert!(!root.join("joke_processed.json").exists());
    }
}
