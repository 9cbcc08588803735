use std::cmp::Ordering;

/// A record paired with its similarity (or blended) score.
#[derive(Clone, Debug)]
pub struct Ranked<T> {
	pub record: T,
	pub score: f32,
}

/// Cosine similarity between two vectors, in [-1, 1]. Defined as `0.0` when
/// either vector has zero norm; a zero vector carries no direction to
/// compare against, so this is an edge-case policy rather than an error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
	let mut dot = 0.0_f32;
	let mut norm_a = 0.0_f32;
	let mut norm_b = 0.0_f32;

	for (x, y) in a.iter().zip(b.iter()) {
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	let denom = norm_a.sqrt() * norm_b.sqrt();

	if denom == 0.0 {
		return 0.0;
	}

	dot / denom
}

/// Score every candidate against the query vector and return the top `k` in
/// descending score order. Ties preserve candidate input order (the sort is
/// stable). Candidates whose similarity is not finite are excluded rather
/// than allowed to poison the ordering. Total: `k = 0` or an empty
/// candidate set returns an empty list, and `k` past the candidate count
/// returns everything.
pub fn rank<T>(query: &[f32], candidates: Vec<(T, Vec<f32>)>, k: usize) -> Vec<Ranked<T>> {
	let mut scored = candidates
		.into_iter()
		.map(|(record, vector)| Ranked { score: cosine_similarity(query, &vector), record })
		.filter(|ranked| ranked.score.is_finite())
		.collect::<Vec<_>>();

	scored.sort_by(|left, right| cmp_f32_desc(left.score, right.score));
	scored.truncate(k);

	scored
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
