#[cfg(test)]
mod tests {
    use crate::config::{BackendConfig, BackendProvider, Config, EnvKeys, SearchConfig};
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.app_home, PathBuf::from("."));
        assert!(config.output_dir.is_none());
        assert_eq!(config.fast.provider, BackendProvider::Http);
        assert_eq!(config.deep.provider, BackendProvider::Simulated);
        assert!(!config.verbose);
    }

    #[test]
    fn test_backend_provider_from_str() {
        assert_eq!(
            "http".parse::<BackendProvider>().unwrap(),
            BackendProvider::Http
        );
        assert_eq!(
            "Simulated".parse::<BackendProvider>().unwrap(),
            BackendProvider::Simulated
        );
        assert_eq!(
            "mock".parse::<BackendProvider>().unwrap(),
            BackendProvider::Simulated
        );
        assert!("grpc".parse::<BackendProvider>().is_err());
    }

    #[test]
    fn test_backend_provider_display() {
        assert_eq!(BackendProvider::Http.to_string(), "http");
        assert_eq!(BackendProvider::Simulated.to_string(), "simulated");
    }

    #[test]
    fn test_backend_config_defaults() {
        let fast = BackendConfig::default();
        assert!(fast.api_key.is_empty());
        assert!(fast.api_url.ends_with("/completions"));
        assert_eq!(fast.model, "llama3-8b-tool-use");
        assert_eq!(fast.timeout_seconds, 120);

        let deep = BackendConfig::deep();
        assert_eq!(deep.model, "deepseek-r1-671b");
        assert_eq!(deep.temperature, 0.0);
    }

    #[test]
    fn test_search_config_default() {
        let search = SearchConfig::default();
        assert_eq!(search.api_url, "https://api.firecrawl.dev/search");
        assert_eq!(search.default_limit, 5);
    }

    #[test]
    fn test_derived_paths() {
        let config = Config {
            app_home: PathBuf::from("/srv/tweetcrafter"),
            ..Default::default()
        };

        assert_eq!(config.data_dir(), PathBuf::from("/srv/tweetcrafter/data"));
        assert_eq!(config.output_dir(), PathBuf::from("/srv/tweetcrafter/output"));
        assert_eq!(config.logs_dir(), PathBuf::from("/srv/tweetcrafter/logs"));
        assert_eq!(
            config.agent_logs_dir(),
            PathBuf::from("/srv/tweetcrafter/logs/agents")
        );
    }

    #[test]
    fn test_output_dir_override() {
        let config = Config {
            app_home: PathBuf::from("/srv/tweetcrafter"),
            output_dir: Some(PathBuf::from("/tmp/out")),
            ..Default::default()
        };

        assert_eq!(config.output_dir(), PathBuf::from("/tmp/out"));
        // logs stay under app_home
        assert_eq!(config.logs_dir(), PathBuf::from("/srv/tweetcrafter/logs"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(lookup_from(&[
            (EnvKeys::APP_HOME, "/opt/app"),
            (EnvKeys::FAST_API_KEY, "fast-key"),
            (EnvKeys::DEEP_API_KEY, "deep-key"),
            (EnvKeys::SEARCH_API_KEY, "search-key"),
        ]));

        assert_eq!(config.app_home, PathBuf::from("/opt/app"));
        assert_eq!(config.fast.api_key, "fast-key");
        assert_eq!(config.deep.api_key, "deep-key");
        assert_eq!(config.search.api_key, "search-key");
    }

    #[test]
    fn test_apply_overrides_ignores_blank_values() {
        let mut config = Config::default();
        config.fast.api_key = "from-file".to_string();
        config.apply_overrides(lookup_from(&[(EnvKeys::FAST_API_KEY, "   ")]));

        assert_eq!(config.fast.api_key, "from-file");
    }

    #[test]
    fn test_missing_api_keys_default() {
        let config = Config::default();

        // deep backend is simulated by default and needs no key
        assert_eq!(
            config.missing_api_keys(),
            vec![EnvKeys::FAST_API_KEY, EnvKeys::SEARCH_API_KEY]
        );
    }

    #[test]
    fn test_missing_api_keys_http_deep() {
        let mut config = Config::default();
        config.deep.provider = BackendProvider::Http;
        config.fast.api_key = "k".to_string();

        assert_eq!(
            config.missing_api_keys(),
            vec![EnvKeys::DEEP_API_KEY, EnvKeys::SEARCH_API_KEY]
        );
    }

    #[test]
    fn test_missing_api_keys_none() {
        let mut config = Config::default();
        config.fast.api_key = "a".to_string();
        config.search.api_key = "b".to_string();

        assert!(config.missing_api_keys().is_empty());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tweetcrafter.toml");
        let content = r#"
app_home = "/data/crafter"
verbose = true

[fast]
provider = "simulated"
api_key = ""
api_url = "http://localhost:9000/v1/completions"
model = "tiny"
max_tokens = 256
temperature = 0.2
timeout_seconds = 10

[search]
api_key = "abc"
api_url = "http://localhost:9001/search"
default_limit = 3
timeout_seconds = 5
"#;
        fs::write(&path, content).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.app_home, PathBuf::from("/data/crafter"));
        assert!(config.verbose);
        assert_eq!(config.fast.provider, BackendProvider::Simulated);
        assert_eq!(config.fast.model, "tiny");
        assert_eq!(config.fast.max_tokens, 256);
        assert_eq!(config.search.default_limit, 3);
        // missing section falls back to its default
        assert_eq!(config.deep.model, "deepseek-r1-671b");
        assert_eq!(config.deep.provider, BackendProvider::Simulated);
    }

    #[test]
    fn test_from_file_partial_deep_section_keeps_deep_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tweetcrafter.toml");
        fs::write(&path, "[deep]\napi_key = \"sn-key\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.deep.api_key, "sn-key");
        assert_eq!(config.deep.provider, BackendProvider::Simulated);
        assert_eq!(config.deep.model, "deepseek-r1-671b");
        assert_eq!(config.deep.timeout_seconds, 300);
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(&PathBuf::from("/nonexistent/tweetcrafter.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "app_home = [1, 2").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        fs::write(&path, "verbose = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.verbose);
    }
}
