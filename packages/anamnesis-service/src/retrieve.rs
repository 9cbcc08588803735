use time::OffsetDateTime;
use uuid::Uuid;

use anamnesis_domain::{
	ConversationRecord, EntityCategory, EntityRecord, Ranked, digest, ranking, recency,
};
use anamnesis_storage::{
	models::{ConversationRow, EntityRow},
	queries,
};

use crate::{Error, HistoryService, Result};

/// Query framing for conversation matching. Entity matching deliberately
/// uses a different framing (plain space-joined symptoms); the asymmetry is
/// inherited behavior and must not be unified silently.
const CONVERSATION_QUERY_PREFIX: &str = "Patient has: ";
/// Per-category entity result cap. Fixed, unlike the caller-configurable
/// conversation top-k.
const ENTITY_TOP_K_PER_CATEGORY: usize = 5;
/// Only the head of a transcription participates in matching.
const MAX_TRANSCRIPTION_SNIPPET_CHARS: usize = 500;
/// Stand-in candidate text for records with no text at all; the encoder
/// must never receive an empty string.
const EMPTY_CONTENT_PLACEHOLDER: &str = "No content";

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetrieveRequest {
	pub patient_id: Uuid,
	pub symptoms: Vec<String>,
	/// Overrides `retrieval.conversation_top_k` from config when set.
	pub top_k: Option<u32>,
	/// Overrides `ranking.blend_enabled` from config when set.
	pub blend: Option<bool>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RankedConversation {
	#[serde(flatten)]
	pub conversation: ConversationRecord,
	pub similarity_score: f32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RankedEntity {
	#[serde(flatten)]
	pub entity: EntityRecord,
	pub similarity_score: f32,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RetrievalResult {
	pub query_symptoms: Vec<String>,
	pub relevant_conversations: Vec<RankedConversation>,
	pub relevant_diagnoses: Vec<RankedEntity>,
	pub relevant_medications: Vec<RankedEntity>,
	pub relevant_procedures: Vec<RankedEntity>,
	pub digest: String,
}

impl HistoryService {
	/// Storage-backed retrieval: load the patient's snapshots and rank them
	/// against the symptoms.
	pub async fn retrieve(&self, req: RetrieveRequest) -> Result<RetrievalResult> {
		if req.symptoms.iter().all(|symptom| symptom.trim().is_empty()) {
			return Err(Error::InvalidRequest {
				message: "symptoms must contain at least one non-empty entry.".to_string(),
			});
		}

		let top_k = req.top_k.unwrap_or(self.cfg.retrieval.conversation_top_k) as usize;
		let blend = req.blend.unwrap_or(self.cfg.ranking.blend_enabled);
		let conversations = queries::conversations_for_patient(&self.db.pool, req.patient_id)
			.await?
			.into_iter()
			.map(conversation_record)
			.collect::<Vec<_>>();
		let entities = queries::entities_for_patient(&self.db.pool, req.patient_id)
			.await?
			.into_iter()
			.map(entity_record)
			.collect::<Vec<_>>();

		tracing::info!(
			patient_id = %req.patient_id,
			conversations = conversations.len(),
			entities = entities.len(),
			"Loaded patient history snapshots."
		);

		self.retrieve_history(
			&req.symptoms,
			conversations,
			entities,
			top_k,
			blend,
			OffsetDateTime::now_utc(),
		)
		.await
	}

	/// The aggregation pipeline over caller-supplied snapshots: frame the
	/// queries, rank conversations and per-category entities by cosine
	/// similarity, optionally blend in recency, and compose the digest.
	/// Branches with no candidates never reach the encoder, so an empty
	/// history succeeds even when the model is down. Any encoder failure
	/// aborts the whole call; partial per-category results would be
	/// misleading.
	pub async fn retrieve_history(
		&self,
		symptoms: &[String],
		conversations: Vec<ConversationRecord>,
		entities: Vec<EntityRecord>,
		top_k_conversations: usize,
		blend: bool,
		now: OffsetDateTime,
	) -> Result<RetrievalResult> {
		let mut ranked_conversations =
			self.rank_conversations(symptoms, conversations, top_k_conversations).await?;
		let mut ranked_entities = self.rank_entities(symptoms, entities).await?;

		if blend {
			let recency_weight = self.cfg.ranking.recency_weight;
			let relevance_weight = self.cfg.ranking.relevance_weight;

			ranked_conversations =
				recency::blend(ranked_conversations, recency_weight, relevance_weight, now);
			ranked_entities = ranked_entities
				.map(|ranked| recency::blend(ranked, recency_weight, relevance_weight, now));
		}

		let [diagnoses, medications, procedures] = ranked_entities;
		let diagnosis_values = entity_values(&diagnoses);
		let medication_values = entity_values(&medications);
		let digest = digest::compose(
			symptoms,
			ranked_conversations.len(),
			&diagnosis_values,
			&medication_values,
		);

		tracing::info!(
			conversations = ranked_conversations.len(),
			diagnoses = diagnoses.len(),
			medications = medications.len(),
			procedures = procedures.len(),
			"Composed retrieval result."
		);

		Ok(RetrievalResult {
			query_symptoms: symptoms.to_vec(),
			relevant_conversations: ranked_conversations
				.into_iter()
				.map(|ranked| RankedConversation {
					conversation: ranked.record,
					similarity_score: ranked.score,
				})
				.collect(),
			relevant_diagnoses: ranked_entity_views(diagnoses),
			relevant_medications: ranked_entity_views(medications),
			relevant_procedures: ranked_entity_views(procedures),
			digest,
		})
	}

	async fn rank_conversations(
		&self,
		symptoms: &[String],
		conversations: Vec<ConversationRecord>,
		k: usize,
	) -> Result<Vec<Ranked<ConversationRecord>>> {
		if conversations.is_empty() {
			tracing::debug!("No conversation candidates; skipping conversation ranking.");

			return Ok(Vec::new());
		}

		let query = format!("{CONVERSATION_QUERY_PREFIX}{}", symptoms.join(", "));
		let mut texts = Vec::with_capacity(conversations.len() + 1);

		texts.push(query);
		texts.extend(conversations.iter().map(conversation_text));

		let mut vectors = self.encode(&texts).await?;
		let query_vector = vectors.remove(0);
		let candidates = conversations.into_iter().zip(vectors).collect::<Vec<_>>();

		Ok(ranking::rank(&query_vector, candidates, k))
	}

	async fn rank_entities(
		&self,
		symptoms: &[String],
		entities: Vec<EntityRecord>,
	) -> Result<[Vec<Ranked<EntityRecord>>; 3]> {
		let mut partitions: [Vec<EntityRecord>; 3] = Default::default();

		for entity in entities {
			let category = EntityCategory::ALL
				.iter()
				.position(|category| category.matches(&entity.entity_type));

			if let Some(slot) = category {
				partitions[slot].push(entity);
			}
		}

		if partitions.iter().all(|partition| partition.is_empty()) {
			tracing::debug!("No categorized entity candidates; skipping entity ranking.");

			return Ok(Default::default());
		}

		let query = symptoms.join(" ");
		let candidate_count = partitions.iter().map(Vec::len).sum::<usize>();
		let mut texts = Vec::with_capacity(candidate_count + 1);

		texts.push(query);

		for partition in &partitions {
			texts.extend(partition.iter().map(entity_text));
		}

		let mut vectors = self.encode(&texts).await?;
		let query_vector = vectors.remove(0);
		let mut vectors = vectors.into_iter();
		let mut ranked: [Vec<Ranked<EntityRecord>>; 3] = Default::default();

		for (slot, partition) in partitions.into_iter().enumerate() {
			let candidates = partition.into_iter().zip(&mut vectors).collect::<Vec<_>>();

			ranked[slot] = ranking::rank(&query_vector, candidates, ENTITY_TOP_K_PER_CATEGORY);
		}

		Ok(ranked)
	}
}

/// Candidate text for a conversation: summary, then the head of the
/// transcription, then the chief complaint, in that order; fields that are
/// absent or empty contribute nothing.
fn conversation_text(record: &ConversationRecord) -> String {
	let mut text = String::new();

	if let Some(summary) = record.summary.as_deref().filter(|value| !value.is_empty()) {
		text.push_str(summary);
		text.push(' ');
	}
	if let Some(transcription) =
		record.transcription.as_deref().filter(|value| !value.is_empty())
	{
		text.extend(transcription.chars().take(MAX_TRANSCRIPTION_SNIPPET_CHARS));
	}
	if let Some(chief_complaint) =
		record.chief_complaint.as_deref().filter(|value| !value.is_empty())
	{
		text.push_str(" Chief complaint: ");
		text.push_str(chief_complaint);
	}

	if text.is_empty() { EMPTY_CONTENT_PLACEHOLDER.to_string() } else { text }
}

fn entity_text(record: &EntityRecord) -> String {
	format!(
		"{}: {} {}",
		record.entity_type,
		record.entity_value,
		record.context.as_deref().unwrap_or("")
	)
}

fn entity_values(ranked: &[Ranked<EntityRecord>]) -> Vec<String> {
	ranked.iter().map(|entry| entry.record.entity_value.clone()).collect()
}

fn ranked_entity_views(ranked: Vec<Ranked<EntityRecord>>) -> Vec<RankedEntity> {
	ranked
		.into_iter()
		.map(|entry| RankedEntity { entity: entry.record, similarity_score: entry.score })
		.collect()
}

fn conversation_record(row: ConversationRow) -> ConversationRecord {
	ConversationRecord {
		conversation_id: row.conversation_id,
		summary: row.summary,
		transcription: row.transcription,
		chief_complaint: row.chief_complaint,
		recorded_at: row.recorded_at,
	}
}

fn entity_record(row: EntityRow) -> EntityRecord {
	EntityRecord {
		entity_id: row.entity_id,
		entity_type: row.entity_type,
		entity_value: row.entity_value,
		context: row.context,
		recorded_at: row.recorded_at,
	}
}
