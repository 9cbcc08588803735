use time::OffsetDateTime;

use crate::{
	ranking::{Ranked, cmp_f32_desc},
	records::Timestamped,
};

/// Records older than this score zero recency.
pub const RECENCY_HORIZON_DAYS: f32 = 1_825.0;

/// Normalized, linearly decaying recency signal. A record dated `now`
/// scores 1.0 and the score reaches 0.0 at the five-year horizon; anything
/// older clamps to 0.0. A record with no timestamp defaults to `now`,
/// favoring undated records over penalizing them.
pub fn recency_score(recorded_at: Option<OffsetDateTime>, now: OffsetDateTime) -> f32 {
	let recorded_at = recorded_at.unwrap_or(now);
	let days_old = (now - recorded_at).whole_days() as f32;

	(1.0 - days_old / RECENCY_HORIZON_DAYS).max(0.0)
}

/// Re-score an already ranked list by combining each entry's similarity
/// score with its recency score. Weights are normalized to sum to one
/// before use; if both are zero they are treated as an equal 0.5/0.5
/// split. The result is re-sorted descending by combined score, stable on
/// ties. Orthogonal to [`crate::ranking::rank`]: callers that want raw
/// similarity order simply skip this stage.
pub fn blend<T>(
	results: Vec<Ranked<T>>,
	recency_weight: f32,
	relevance_weight: f32,
	now: OffsetDateTime,
) -> Vec<Ranked<T>>
where
	T: Timestamped,
{
	let total = recency_weight + relevance_weight;
	let (recency_weight, relevance_weight) = if total == 0.0 {
		(0.5, 0.5)
	} else {
		(recency_weight / total, relevance_weight / total)
	};
	let mut blended = results
		.into_iter()
		.map(|ranked| {
			let recency = recency_score(ranked.record.recorded_at(), now);

			Ranked {
				score: relevance_weight * ranked.score + recency_weight * recency,
				record: ranked.record,
			}
		})
		.collect::<Vec<_>>();

	blended.sort_by(|left, right| cmp_f32_desc(left.score, right.score));

	blended
}

#[cfg(test)]
mod tests {
	use time::{Duration, macros::datetime};

	use super::*;

	struct Dated(Option<OffsetDateTime>);
	impl Timestamped for Dated {
		fn recorded_at(&self) -> Option<OffsetDateTime> {
			self.0
		}
	}

	fn now() -> OffsetDateTime {
		datetime!(2026-01-15 12:00 UTC)
	}

	fn ranked(score: f32, recorded_at: Option<OffsetDateTime>) -> Ranked<Dated> {
		Ranked { record: Dated(recorded_at), score }
	}

	#[test]
	fn fresh_record_scores_full_recency() {
		assert!((recency_score(Some(now()), now()) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn missing_timestamp_defaults_to_now() {
		assert!((recency_score(None, now()) - 1.0).abs() < 1e-6);
	}

	#[test]
	fn recency_clamps_to_zero_past_the_horizon() {
		let ancient = now() - Duration::days(4_000);

		assert_eq!(recency_score(Some(ancient), now()), 0.0);
	}

	#[test]
	fn recency_decays_linearly() {
		let half_horizon = now() - Duration::days(1_825 / 2);
		let score = recency_score(Some(half_horizon), now());

		assert!((score - 0.5).abs() < 1e-3);
	}

	#[test]
	fn zero_recency_weight_preserves_similarity_order() {
		let old = now() - Duration::days(1_000);
		let results = vec![
			ranked(0.9, Some(old)),
			ranked(0.7, Some(now())),
			ranked(0.5, Some(now())),
		];
		let blended = blend(results, 0.0, 1.0, now());
		let scores = blended.iter().map(|r| r.score).collect::<Vec<_>>();

		assert_eq!(scores, vec![0.9, 0.7, 0.5]);
	}

	#[test]
	fn equal_weights_and_equal_similarity_order_by_recency() {
		let results = vec![
			ranked(0.8, Some(now() - Duration::days(900))),
			ranked(0.8, Some(now() - Duration::days(10))),
			ranked(0.8, Some(now() - Duration::days(300))),
		];
		let blended = blend(results, 0.5, 0.5, now());
		let ages = blended
			.iter()
			.map(|r| (now() - r.record.0.expect("dated")).whole_days())
			.collect::<Vec<_>>();

		assert_eq!(ages, vec![10, 300, 900]);
	}

	#[test]
	fn weights_are_normalized_before_use() {
		let results = vec![ranked(1.0, Some(now()))];
		// 3 + 7 normalizes to 0.3/0.7; both components are 1.0 here, so the
		// combined score must still be 1.0.
		let blended = blend(results, 3.0, 7.0, now());

		assert!((blended[0].score - 1.0).abs() < 1e-6);
	}

	#[test]
	fn zero_zero_weights_fall_back_to_equal_split() {
		let old = now() - Duration::days(1_825);
		let blended = blend(vec![ranked(1.0, Some(old))], 0.0, 0.0, now());

		// 0.5 * similarity(1.0) + 0.5 * recency(0.0).
		assert!((blended[0].score - 0.5).abs() < 1e-6);
	}

	#[test]
	fn blend_ties_preserve_input_order() {
		let results = vec![
			ranked(0.4, Some(now())),
			ranked(0.4, Some(now())),
		];
		let blended = blend(results, 0.3, 0.7, now());

		assert_eq!(blended.len(), 2);
		assert!((blended[0].score - blended[1].score).abs() < 1e-6);
	}
}
