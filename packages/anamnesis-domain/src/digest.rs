/// At most this many diagnoses/medications are named in the digest.
const MAX_LISTED: usize = 3;

/// Compose the natural-language digest of a retrieval result. Sentences are
/// emitted in fixed order, each only when its source list is non-empty, and
/// joined with ". " plus a trailing period.
pub fn compose(
	symptoms: &[String],
	conversation_count: usize,
	diagnoses: &[String],
	medications: &[String],
) -> String {
	let mut parts = Vec::new();

	if !symptoms.is_empty() {
		parts.push(format!("Query symptoms: {}", symptoms.join(", ")));
	}
	if conversation_count > 0 {
		parts.push(format!("Found {conversation_count} relevant past visits"));
	}
	if !diagnoses.is_empty() {
		parts.push(format!("Previous diagnoses: {}", join_listed(diagnoses)));
	}
	if !medications.is_empty() {
		parts.push(format!("Previous medications: {}", join_listed(medications)));
	}

	parts.join(". ") + "."
}

fn join_listed(values: &[String]) -> String {
	values.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ")
}
