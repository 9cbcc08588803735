use sqlx::PgPool;
use uuid::Uuid;

use crate::{
	Result,
	models::{ConversationRow, EntityRow},
};

/// All conversation snapshots for a patient, newest first. The order is
/// deterministic (ties break on the id) because it doubles as the stable
/// tie-break order during ranking.
pub async fn conversations_for_patient(
	pool: &PgPool,
	patient_id: Uuid,
) -> Result<Vec<ConversationRow>> {
	let rows = sqlx::query_as::<_, ConversationRow>(
		"\
SELECT conversation_id, patient_id, summary, transcription, chief_complaint, recorded_at
FROM conversations
WHERE patient_id = $1
ORDER BY recorded_at DESC NULLS LAST, conversation_id",
	)
	.bind(patient_id)
	.fetch_all(pool)
	.await?;

	Ok(rows)
}

/// All extracted entity snapshots for a patient, newest first, same
/// determinism contract as [`conversations_for_patient`].
pub async fn entities_for_patient(pool: &PgPool, patient_id: Uuid) -> Result<Vec<EntityRow>> {
	let rows = sqlx::query_as::<_, EntityRow>(
		"\
SELECT entity_id, patient_id, conversation_id, entity_type, entity_value, context, recorded_at
FROM extracted_entities
WHERE patient_id = $1
ORDER BY recorded_at DESC NULLS LAST, entity_id",
	)
	.bind(patient_id)
	.fetch_all(pool)
	.await?;

	Ok(rows)
}
