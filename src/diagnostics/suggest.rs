//! "Did you mean" suggestions for misspelled names.

/// Minimum Jaro-Winkler similarity for a candidate to be suggested.
const SIMILARITY_THRESHOLD: f64 = 0.8;

const MAX_SUGGESTIONS: usize = 3;

/// Candidates similar to `input`, best match first.
pub fn similar_names<'a, I>(input: &str, candidates: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut scored: Vec<(&str, f64)> = candidates
        .into_iter()
        .filter(|c| *c != input)
        .map(|c| (c, strsim::jaro_winkler(input, c)))
        .filter(|(_, score)| *score >= SIMILARITY_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(name, _)| name)
        .collect()
}

/// Best single suggestion, formatted for display.
pub fn did_you_mean<'a, I>(input: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    similar_names(input, candidates)
        .first()
        .map(|name| format!("did you mean '{name}'?"))
}
