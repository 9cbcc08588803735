pub mod retrieve;

use std::{future::Future, pin::Pin, sync::Arc};

pub use retrieve::{
	RankedConversation, RankedEntity, RetrievalResult, RetrieveRequest,
};

use anamnesis_config::{Config, EmbeddingProviderConfig};
use anamnesis_providers::embedding;
use anamnesis_storage::db::Db;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The encoder seam. The default implementation calls the configured HTTP
/// embedding API; tests substitute deterministic providers. Implementations
/// must return one vector per input text, in input order.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

#[derive(Debug)]
pub enum Error {
	/// The encoder failed to run; fatal for the whole request, never a
	/// partial result.
	ModelUnavailable { message: String },
	InvalidRequest { message: String },
	Storage { message: String },
}
impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::ModelUnavailable { message } => {
				write!(f, "Embedding model unavailable: {message}")
			},
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
		}
	}
}
impl std::error::Error for Error {}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
impl From<anamnesis_storage::Error> for Error {
	fn from(err: anamnesis_storage::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
impl From<color_eyre::Report> for Error {
	fn from(err: color_eyre::Report) -> Self {
		Self::ModelUnavailable { message: err.to_string() }
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

/// The history retrieval service. Constructed once at startup with its
/// provider handle and connection pool, then shared read-only across
/// requests; it holds no per-request state.
pub struct HistoryService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}

impl HistoryService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Encode a batch and enforce the encoder contract: one vector per
	/// input, every vector at the configured dimensionality. Violations are
	/// reported as the model being unavailable.
	pub(crate) async fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let cfg = &self.cfg.providers.embedding;
		let vectors = self.providers.embedding.embed(cfg, texts).await?;

		if vectors.len() != texts.len() {
			return Err(Error::ModelUnavailable {
				message: format!(
					"Embedding provider returned {} vectors for {} inputs.",
					vectors.len(),
					texts.len()
				),
			});
		}

		let expected = cfg.dimensions as usize;

		if vectors.iter().any(|vector| vector.len() != expected) {
			return Err(Error::ModelUnavailable {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vectors)
	}
}
