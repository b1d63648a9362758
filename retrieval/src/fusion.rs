use crate::config::{FusionStrategy, RetrieverConfig};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Inputs to one fusion pass.
///
/// `vector_ids`/`vector_distances` are parallel and already best-first by
/// ascending distance; `keyword_scores` covers the whole corpus.
pub struct FusionInputs<'a> {
    pub vector_ids: &'a [String],
    pub vector_distances: &'a [f64],
    pub keyword_scores: &'a HashMap<String, f64>,
    /// Corpus size at call time; doubles as the worst-case rank assigned to
    /// ids one ranking never saw
    pub corpus_size: usize,
    pub top_k: usize,
}

/// One fused candidate, carrying the synthesized presentation distance
#[derive(Debug, Clone, PartialEq)]
pub struct FusedCandidate {
    pub id: String,
    pub combined_score: f64,
    pub distance: f64,
}

/// Fusion engine combining the vector and lexical rankings
pub struct FusionEngine {
    strategy: FusionStrategy,
    vector_weight: f64,
    rrf_k: f64,
    keyword_norm_divisor: f64,
    keyword_only_threshold: f64,
}

impl FusionEngine {
    /// Create a fusion engine from retriever configuration
    pub fn new(config: &RetrieverConfig) -> Self {
        Self {
            strategy: config.fusion_strategy,
            vector_weight: config.vector_weight,
            rrf_k: f64::from(config.rrf_k),
            keyword_norm_divisor: config.keyword_norm_divisor,
            keyword_only_threshold: config.keyword_only_threshold,
        }
    }

    /// Merge the two rankings into the top-K candidate list, best-first.
    pub fn fuse(&self, inputs: &FusionInputs) -> Vec<FusedCandidate> {
        let combined = match self.strategy {
            FusionStrategy::Weighted => self.weighted_scores(inputs),
            FusionStrategy::ReciprocalRank => self.rrf_scores(inputs),
        };
        debug!(
            "{:?} fusion scored {} candidates",
            self.strategy,
            combined.len()
        );

        let distances = presentation_distances(&combined);

        let mut candidates: Vec<FusedCandidate> = combined
            .into_iter()
            .map(|(id, combined_score)| FusedCandidate {
                distance: distances.get(&id).copied().unwrap_or(0.5),
                id,
                combined_score,
            })
            .collect();
        candidates.sort_by(|a, b| {
            b.combined_score
                .total_cmp(&a.combined_score)
                .then_with(|| a.id.cmp(&b.id))
        });
        candidates.truncate(inputs.top_k);
        candidates
    }

    /// Weighted linear blend of normalized scores.
    fn weighted_scores(&self, inputs: &FusionInputs) -> HashMap<String, f64> {
        let similarities: Vec<f64> = inputs.vector_distances.iter().map(|d| 1.0 - d).collect();
        let normalized = min_max_normalize(&similarities);
        let similarity_by_id: HashMap<&str, f64> = inputs
            .vector_ids
            .iter()
            .map(String::as_str)
            .zip(normalized)
            .collect();

        let mut combined = HashMap::new();

        for id in inputs.vector_ids {
            let similarity = similarity_by_id.get(id.as_str()).copied().unwrap_or(0.0);
            let keyword = inputs.keyword_scores.get(id).copied().unwrap_or(0.0);
            let norm_keyword = self.normalize_keyword(keyword);
            combined.insert(
                id.clone(),
                self.vector_weight * similarity + (1.0 - self.vector_weight) * norm_keyword,
            );
        }

        // Recover lexically strong chunks the vector search missed.
        for (id, &score) in inputs.keyword_scores {
            if !combined.contains_key(id) && score > self.keyword_only_threshold {
                let norm_keyword = self.normalize_keyword(score);
                combined.insert(id.clone(), (1.0 - self.vector_weight) * norm_keyword);
            }
        }

        combined
    }

    fn normalize_keyword(&self, score: f64) -> f64 {
        if score > 0.0 {
            (score / self.keyword_norm_divisor).min(1.0)
        } else {
            0.0
        }
    }

    /// Reciprocal Rank Fusion: `1/(rank + k)` summed across both rankings.
    fn rrf_scores(&self, inputs: &FusionInputs) -> HashMap<String, f64> {
        let vector_ranks: HashMap<&str, usize> = inputs
            .vector_ids
            .iter()
            .enumerate()
            .map(|(rank, id)| (id.as_str(), rank))
            .collect();

        let mut keyword_ranked: Vec<(&String, f64)> = inputs
            .keyword_scores
            .iter()
            .map(|(id, &score)| (id, score))
            .collect();
        keyword_ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        keyword_ranked.truncate(inputs.top_k * 2);
        let keyword_ranks: HashMap<&str, usize> = keyword_ranked
            .into_iter()
            .enumerate()
            .map(|(rank, (id, _))| (id.as_str(), rank))
            .collect();

        let all_ids: HashSet<&str> = vector_ranks
            .keys()
            .chain(keyword_ranks.keys())
            .copied()
            .collect();

        // Ids one ranking never saw get the worst-case rank: the corpus
        // size, i.e. worse than last place. This is a deliberate policy,
        // not an incidental default.
        let worst_rank = inputs.corpus_size;

        all_ids
            .into_iter()
            .map(|id| {
                let vector_rank = vector_ranks.get(id).copied().unwrap_or(worst_rank) as f64;
                let keyword_rank = keyword_ranks.get(id).copied().unwrap_or(worst_rank) as f64;
                let score =
                    1.0 / (vector_rank + self.rrf_k) + 1.0 / (keyword_rank + self.rrf_k);
                (id.to_string(), score)
            })
            .collect()
    }
}

fn min_max_normalize(values: &[f64]) -> Vec<f64> {
    let Some(max) = values.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };
    let min = values.iter().copied().fold(max, f64::min);
    let range = max - min;
    if range > 0.0 {
        values.iter().map(|v| (v - min) / range).collect()
    } else {
        // All equal: already comparable, leave untouched.
        values.to_vec()
    }
}

/// Synthesize display distances from combined scores: min-max normalize and
/// invert so lower distance always means better match, regardless of the
/// backend's native distance metric.
fn presentation_distances(scores: &HashMap<String, f64>) -> HashMap<String, f64> {
    let Some(max) = scores.values().copied().reduce(f64::max) else {
        return HashMap::new();
    };
    let min = scores.values().copied().fold(max, f64::min);
    let range = max - min;

    scores
        .iter()
        .map(|(id, &score)| {
            let distance = if range > 0.0 {
                1.0 - (score - min) / range
            } else {
                0.5
            };
            (id.clone(), distance)
        })
        .collect()
}
