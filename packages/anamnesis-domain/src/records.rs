use time::OffsetDateTime;
use uuid::Uuid;

/// Snapshot of a past doctor-patient conversation, as supplied by the
/// persistence collaborator. Every text field is optional; the aggregator
/// decides what to do with records that carry no text at all.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ConversationRecord {
	pub conversation_id: Uuid,
	pub summary: Option<String>,
	pub transcription: Option<String>,
	pub chief_complaint: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub recorded_at: Option<OffsetDateTime>,
}

/// A clinical entity extracted from a past conversation. `entity_type` is
/// free-form; category membership is resolved through [`EntityCategory`].
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct EntityRecord {
	pub entity_id: Uuid,
	pub entity_type: String,
	pub entity_value: String,
	pub context: Option<String>,
	#[serde(with = "crate::time_serde::option")]
	pub recorded_at: Option<OffsetDateTime>,
}

/// The three fixed entity categories the retrieval result reports. Each
/// category owns an allow-list of entity type labels; membership is a
/// case-insensitive exact match, never a substring match.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
	Diagnoses,
	Medications,
	Procedures,
}
impl EntityCategory {
	pub const ALL: [Self; 3] = [Self::Diagnoses, Self::Medications, Self::Procedures];

	pub fn entity_types(self) -> &'static [&'static str] {
		match self {
			Self::Diagnoses => &["disease", "diagnosis", "disorder"],
			Self::Medications => &["medication", "drug"],
			Self::Procedures => &["procedure", "treatment"],
		}
	}

	pub fn matches(self, entity_type: &str) -> bool {
		self.entity_types().iter().any(|candidate| candidate.eq_ignore_ascii_case(entity_type))
	}
}

/// Seam for the recency blender: any record that can report when it was
/// recorded. A `None` timestamp is treated as maximally recent by the
/// blender rather than penalized.
pub trait Timestamped {
	fn recorded_at(&self) -> Option<OffsetDateTime>;
}

impl Timestamped for ConversationRecord {
	fn recorded_at(&self) -> Option<OffsetDateTime> {
		self.recorded_at
	}
}

impl Timestamped for EntityRecord {
	fn recorded_at(&self) -> Option<OffsetDateTime> {
		self.recorded_at
	}
}
