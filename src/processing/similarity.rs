//! TF-IDF vector space and pairwise cosine similarity over one batch of texts.
//!
//! The vocabulary is batch-local: weights are derived only from the submitted texts, never
//! from a fixed dictionary. Rows are L2-normalized so cosine similarity reduces to a sparse
//! dot product. Complexity is O(n² · v) for n texts over a vocabulary of size v, which is
//! fine for interactive batches of tens of documents.

use std::collections::HashMap;

/// Compute the symmetric pairwise similarity matrix for a batch of texts.
///
/// The diagonal is `1.0` by convention, including for empty texts. Any pair involving a
/// zero-norm vector (a text with no tokens) scores `0.0` off the diagonal.
pub fn similarity_matrix(texts: &[String]) -> Vec<Vec<f64>> {
    let vectors = tfidf_vectors(texts);
    let n = texts.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        matrix[i][i] = 1.0;
        for j in (i + 1)..n {
            let score = dot(&vectors[i], &vectors[j]);
            matrix[i][j] = score;
            matrix[j][i] = score;
        }
    }

    matrix
}

/// Tokenize into lowercased alphanumeric runs of length >= 2.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Build one L2-normalized TF-IDF vector per text.
///
/// Uses the smoothed inverse document frequency `ln((1 + n) / (1 + df)) + 1` with raw term
/// counts, so a term present in every text still contributes rather than vanishing.
fn tfidf_vectors(texts: &[String]) -> Vec<HashMap<String, f64>> {
    let token_lists: Vec<Vec<String>> = texts.iter().map(|text| tokenize(text)).collect();

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for tokens in &token_lists {
        let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for token in seen {
            *document_frequency.entry(token).or_insert(0) += 1;
        }
    }

    let total = texts.len() as f64;
    token_lists
        .iter()
        .map(|tokens| {
            let mut weights: HashMap<String, f64> = HashMap::new();
            for token in tokens {
                *weights.entry(token.clone()).or_insert(0.0) += 1.0;
            }
            for (token, weight) in weights.iter_mut() {
                let df = document_frequency[token.as_str()] as f64;
                *weight *= ((1.0 + total) / (1.0 + df)).ln() + 1.0;
            }
            normalize(&mut weights);
            weights
        })
        .collect()
}

/// Scale a sparse vector to unit length; zero-norm vectors are left untouched so every pair
/// containing one dots to `0.0`.
fn normalize(weights: &mut HashMap<String, f64>) {
    let norm = weights.values().map(|value| value * value).sum::<f64>().sqrt();
    if norm > 0.0 {
        for value in weights.values_mut() {
            *value /= norm;
        }
    }
}

fn dot(left: &HashMap<String, f64>, right: &HashMap<String, f64>) -> f64 {
    // Iterate the smaller map.
    let (small, large) = if left.len() <= right.len() {
        (left, right)
    } else {
        (right, left)
    };
    small
        .iter()
        .filter_map(|(token, value)| large.get(token).map(|other| value * other))
        .sum()
}
