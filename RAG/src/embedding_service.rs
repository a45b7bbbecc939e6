use crate::models::*;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

const MAX_VOCABULARY: usize = 1000;
const MIN_DIMENSIONS: usize = 100;

/// TF-IDF embedder fitted to the chunks of a single document.
///
/// The vocabulary is the `MAX_VOCABULARY` most frequent terms; every chunk and
/// the question are projected onto it and L2-normalised.
pub struct EmbeddingService {
    vocabulary: HashMap<String, usize>,
    idf_scores: HashMap<String, f32>,
}

impl EmbeddingService {
    pub fn fit(chunks: &[DocumentChunk]) -> Self {
        log::info!("Building TF-IDF vocabulary over {} chunks", chunks.len());

        let mut word_counts: HashMap<String, usize> = HashMap::new();
        let mut doc_frequencies: HashMap<String, usize> = HashMap::new();
        let total_chunks = chunks.len();

        for chunk in chunks {
            let words = tokenize(&chunk.content);

            for word in words.iter().collect::<HashSet<_>>() {
                *doc_frequencies.entry(word.clone()).or_insert(0) += 1;
            }

            for word in words {
                *word_counts.entry(word).or_insert(0) += 1;
            }
        }

        // Smoothed so a term present in every chunk still carries weight
        let idf_scores: HashMap<String, f32> = doc_frequencies
            .iter()
            .map(|(word, df)| {
                let idf = ((1 + total_chunks) as f32 / (1 + *df) as f32).ln() + 1.0;
                (word.clone(), idf)
            })
            .collect();

        let mut word_freq_pairs: Vec<_> = word_counts.into_iter().collect();
        word_freq_pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let vocabulary: HashMap<String, usize> = word_freq_pairs
            .into_iter()
            .take(MAX_VOCABULARY)
            .enumerate()
            .map(|(idx, (word, _))| (word, idx))
            .collect();

        Self {
            vocabulary,
            idf_scores,
        }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn embed_chunks(&self, chunks: &mut [DocumentChunk]) {
        chunks.par_iter_mut().for_each(|chunk| {
            chunk.embedding = Some(self.create_tfidf_embedding(&chunk.content));
        });
    }

    pub fn embed_query(&self, query: &str) -> Vec<f32> {
        self.create_tfidf_embedding(query)
    }

    fn create_tfidf_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.vocabulary.len().max(MIN_DIMENSIONS)];
        let words = tokenize(text);
        let total_words = words.len() as f32;

        for (word, count) in count_words(&words) {
            if let Some(&idx) = self.vocabulary.get(&word) {
                let tf = count as f32 / total_words;
                let idf = self.idf_scores.get(&word).copied().unwrap_or(1.0);
                embedding[idx] = tf * idf;
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in embedding.iter_mut() {
                *value /= norm;
            }
        }

        embedding
    }

    /// Ranks embedded chunks against the query, best first.
    pub fn rank(&self, query: &str, chunks: &[DocumentChunk], max_results: usize) -> Vec<ScoredChunk> {
        let query_embedding = self.embed_query(query);

        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .filter_map(|chunk| {
                chunk.embedding.as_ref().map(|embedding| ScoredChunk {
                    chunk: chunk.clone(),
                    score: calculate_similarity(&query_embedding, embedding),
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(max_results);

        log::info!("Found {} relevant chunks", scored.len());
        scored
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| word.chars().count() > 2)
        .collect()
}

fn count_words(words: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in words {
        *counts.entry(word.clone()).or_insert(0) += 1;
    }
    counts
}

pub fn calculate_similarity(embedding1: &[f32], embedding2: &[f32]) -> f32 {
    let min_len = embedding1.len().min(embedding2.len());

    let dot_product: f32 = embedding1[..min_len]
        .iter()
        .zip(embedding2[..min_len].iter())
        .map(|(a, b)| a * b)
        .sum();

    let norm1: f32 = embedding1[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm2: f32 = embedding2[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm1 == 0.0 || norm2 == 0.0 {
        0.0
    } else {
        dot_product / (norm1 * norm2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> DocumentChunk {
        DocumentChunk {
            id: content.to_string(),
            content: content.to_string(),
            start_position: 0,
            end_position: content.len(),
            embedding: None,
        }
    }

    #[test]
    fn test_tokenize_drops_short_words_and_punctuation() {
        assert_eq!(tokenize("The CAT, is on a mat!"), vec!["the", "cat", "mat"]);
    }

    #[test]
    fn test_similarity_identical_and_orthogonal() {
        assert!((calculate_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(calculate_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(calculate_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_embeddings_are_normalised() {
        let mut chunks = vec![chunk("maternity benefits waiting period"), chunk("knee surgery coverage")];
        let service = EmbeddingService::fit(&chunks);
        service.embed_chunks(&mut chunks);

        for c in &chunks {
            let embedding = c.embedding.as_ref().unwrap();
            assert!(embedding.len() >= MIN_DIMENSIONS);
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_single_chunk_document_still_scores() {
        let mut chunks = vec![chunk("grace period for premium payment is thirty days")];
        let service = EmbeddingService::fit(&chunks);
        service.embed_chunks(&mut chunks);

        let ranked = service.rank("what is the grace period", &chunks, 5);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].score > 0.0);
    }

    #[test]
    fn test_rank_prefers_matching_chunk() {
        let mut chunks = vec![
            chunk("the hospital room rent is capped at one percent"),
            chunk("cataract surgery has a two year waiting period"),
            chunk("organ donor expenses are covered for harvesting"),
        ];
        let service = EmbeddingService::fit(&chunks);
        service.embed_chunks(&mut chunks);

        let ranked = service.rank("waiting period for cataract surgery", &chunks, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.id, "cataract surgery has a two year waiting period");
        assert!(ranked[0].score >= ranked[1].score);
    }

    #[test]
    fn test_vocabulary_is_capped() {
        let text: String = (0..1500).map(|i| format!("term{i} ")).collect();
        let chunks = vec![chunk(&text)];
        let service = EmbeddingService::fit(&chunks);

        assert_eq!(service.vocabulary_size(), MAX_VOCABULARY);
    }
}
