use std::sync::Arc;

use anamnesis_service::HistoryService;
use anamnesis_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<HistoryService>,
}
impl AppState {
	pub async fn new(config: anamnesis_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let service = HistoryService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}
}
