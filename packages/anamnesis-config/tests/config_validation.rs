use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use anamnesis_config::{Config, Error};

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("anamnesis_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.")
}

fn load_payload(payload: String) -> Result<Config, Error> {
	let path = write_temp_config(payload);
	let result = anamnesis_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

#[test]
fn template_config_is_valid() {
	let cfg = load_payload(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Expected template config to load.");

	assert_eq!(cfg.retrieval.conversation_top_k, 5);
	assert!(!cfg.ranking.blend_enabled);
}

#[test]
fn retrieval_and_ranking_sections_are_optional() {
	let mut payload = SAMPLE_CONFIG_TEMPLATE_TOML.to_string();

	payload = payload.replace("[retrieval]\nconversation_top_k = 5\n", "");
	payload = payload.replace(
		"[ranking]\nblend_enabled    = false\nrecency_weight   = 0.3\nrelevance_weight = 0.7\n",
		"",
	);

	let cfg = load_payload(payload).expect("Expected defaults to apply.");

	assert_eq!(cfg.retrieval.conversation_top_k, 5);
	assert!((cfg.ranking.recency_weight - 0.3).abs() < f32::EPSILON);
	assert!((cfg.ranking.relevance_weight - 0.7).abs() < f32::EPSILON);
}

#[test]
fn http_bind_must_be_non_empty() {
	let payload = SAMPLE_CONFIG_TEMPLATE_TOML
		.replace("http_bind = \"127.0.0.1:8080\"", "http_bind = \"   \"");
	let err = load_payload(payload).expect_err("Expected http_bind validation error.");

	assert!(
		err.to_string().contains("service.http_bind must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn pool_max_conns_must_be_positive() {
	let payload =
		SAMPLE_CONFIG_TEMPLATE_TOML.replace("pool_max_conns = 4", "pool_max_conns = 0");
	let err = load_payload(payload).expect_err("Expected pool size validation error.");

	assert!(
		err.to_string().contains("storage.postgres.pool_max_conns must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_api_key_must_be_non_empty() {
	let payload = SAMPLE_CONFIG_TEMPLATE_TOML
		.replace("api_key         = \"REPLACE_ME\"", "api_key         = \"\"");
	let err = load_payload(payload).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("providers.embedding.api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_dimensions_must_be_positive() {
	let payload =
		SAMPLE_CONFIG_TEMPLATE_TOML.replace("dimensions      = 8", "dimensions      = 0");
	let err = load_payload(payload).expect_err("Expected dimensions validation error.");

	assert!(
		err.to_string().contains("providers.embedding.dimensions must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn conversation_top_k_must_be_positive() {
	let payload = SAMPLE_CONFIG_TEMPLATE_TOML
		.replace("conversation_top_k = 5", "conversation_top_k = 0");
	let err = load_payload(payload).expect_err("Expected top_k validation error.");

	assert!(
		err.to_string().contains("retrieval.conversation_top_k must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn ranking_weights_must_be_non_negative() {
	let mut cfg = base_config();

	cfg.ranking.recency_weight = -0.1;

	let err =
		anamnesis_config::validate(&cfg).expect_err("Expected recency weight validation error.");

	assert!(
		err.to_string().contains("ranking.recency_weight must be zero or greater."),
		"Unexpected error: {err}"
	);
}

#[test]
fn ranking_weights_must_be_finite() {
	let mut cfg = base_config();

	cfg.ranking.relevance_weight = f32::NAN;

	let err =
		anamnesis_config::validate(&cfg).expect_err("Expected relevance weight validation error.");

	assert!(
		err.to_string().contains("ranking.relevance_weight must be a finite number."),
		"Unexpected error: {err}"
	);
}

#[test]
fn ranking_weights_may_both_be_zero() {
	let mut cfg = base_config();

	cfg.ranking.recency_weight = 0.0;
	cfg.ranking.relevance_weight = 0.0;

	assert!(anamnesis_config::validate(&cfg).is_ok());
}

#[test]
fn missing_embedding_section_fails_to_parse() {
	let start = SAMPLE_CONFIG_TEMPLATE_TOML
		.find("[providers.embedding]")
		.expect("Template config must include [providers.embedding].");
	let end = SAMPLE_CONFIG_TEMPLATE_TOML
		.find("[retrieval]")
		.expect("Template config must include [retrieval].");
	let mut payload = SAMPLE_CONFIG_TEMPLATE_TOML.to_string();

	payload.replace_range(start..end, "");

	let err = load_payload(payload).expect_err("Expected missing providers parse error.");

	assert!(matches!(err, Error::ParseConfig { .. }), "Unexpected error: {err}");
}

#[test]
fn anamnesis_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../anamnesis.example.toml");

	anamnesis_config::load(&path).expect("Expected anamnesis.example.toml to be a valid config.");
}
