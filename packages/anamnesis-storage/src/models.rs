use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct ConversationRow {
	pub conversation_id: Uuid,
	pub patient_id: Uuid,
	pub summary: Option<String>,
	pub transcription: Option<String>,
	pub chief_complaint: Option<String>,
	pub recorded_at: Option<OffsetDateTime>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct EntityRow {
	pub entity_id: Uuid,
	pub patient_id: Uuid,
	pub conversation_id: Option<Uuid>,
	pub entity_type: String,
	pub entity_value: String,
	pub context: Option<String>,
	pub recorded_at: Option<OffsetDateTime>,
}
