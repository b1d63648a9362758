use crate::config::Bm25Params;
use crate::tokenize::{StopwordFilter, tokenize};
use std::collections::{HashMap, HashSet};

/// Score every document's relevance to a query with Okapi BM25.
///
/// `documents` and `doc_ids` are parallel; `contexts`, when present, is
/// parallel too and each document's tokens are extended with its own
/// context's tokens (document tokens first), so topically relevant context
/// raises a chunk's effective term exposure without replacing its content.
///
/// Every document gets an entry in the returned map; chunks sharing no
/// vocabulary with the query score 0. An empty corpus yields an empty map.
pub fn keyword_scores(
    params: Bm25Params,
    stopwords: &StopwordFilter,
    query: &str,
    documents: &[String],
    doc_ids: &[String],
    contexts: Option<&[String]>,
) -> HashMap<String, f64> {
    let query_terms = stopwords.filter_query(tokenize(query));

    let mut doc_tokens: Vec<Vec<String>> = documents.iter().map(|doc| tokenize(doc)).collect();
    if let Some(contexts) = contexts {
        for (tokens, context) in doc_tokens.iter_mut().zip(contexts) {
            tokens.extend(tokenize(context));
        }
    }

    let token_sets: Vec<HashSet<&str>> = doc_tokens
        .iter()
        .map(|tokens| tokens.iter().map(String::as_str).collect())
        .collect();

    // Corpus-wide document frequency per unique query term.
    let unique_terms: HashSet<&str> = query_terms.iter().map(String::as_str).collect();
    let doc_freq: HashMap<&str, usize> = unique_terms
        .into_iter()
        .map(|term| {
            let df = token_sets.iter().filter(|set| set.contains(term)).count();
            (term, df)
        })
        .collect();

    let total_len: usize = doc_tokens.iter().map(Vec::len).sum();
    let avg_doc_len = if doc_tokens.is_empty() {
        0.0
    } else {
        total_len as f64 / doc_tokens.len() as f64
    };

    let corpus_size = documents.len() as f64;
    let mut scores = HashMap::with_capacity(doc_ids.len());

    for (i, tokens) in doc_tokens.iter().enumerate() {
        let doc_len = tokens.len() as f64;

        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        for token in tokens {
            *term_freq.entry(token.as_str()).or_insert(0) += 1;
        }

        let mut score = 0.0;
        for term in &query_terms {
            let tf = term_freq.get(term.as_str()).copied().unwrap_or(0);
            let df = doc_freq.get(term.as_str()).copied().unwrap_or(0);
            // A term absent from this document, unseen corpus-wide, or an
            // all-empty corpus contributes nothing.
            if tf == 0 || df == 0 || avg_doc_len == 0.0 {
                continue;
            }

            let idf = (((corpus_size - df as f64 + 0.5) / (df as f64 + 0.5)).ln()).max(0.0);
            let tf = tf as f64;
            let numerator = tf * (params.k1 + 1.0);
            let denominator =
                tf + params.k1 * (1.0 - params.b + params.b * doc_len / avg_doc_len);
            score += idf * numerator / denominator;
        }

        scores.insert(doc_ids[i].clone(), score);
    }

    scores
}
