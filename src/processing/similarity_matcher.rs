//! Three-tier skill matching: exact, fuzzy, then semantic
//!
//! Both skill lists are normalized (trimmed, lowercased) into ordered maps
//! keyed by the normalized name, so every pass walks skills in lexicographic
//! order and ties always go to the first candidate in that order. Output uses
//! the first spelling seen for each skill.

use crate::processing::embeddings::EmbeddingEngine;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_FUZZY_THRESHOLD: f64 = 85.0;
pub const DEFAULT_SEMANTIC_THRESHOLD: f32 = 0.7;

/// A required skill satisfied by a differently spelled candidate skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillPair {
    pub required: String,
    pub candidate: String,
    /// 0-100 for fuzzy pairs, cosine similarity for semantic pairs
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched_exact: Vec<String>,
    pub matched_fuzzy: Vec<String>,
    pub matched_semantic: Vec<String>,
    pub missing: Vec<String>,
    pub extra: Vec<String>,
    pub fuzzy_pairs: Vec<SkillPair>,
    pub semantic_pairs: Vec<SkillPair>,
}

impl MatchResult {
    pub fn total_required(&self) -> usize {
        self.total_matched() + self.missing.len()
    }

    pub fn total_matched(&self) -> usize {
        self.matched_exact.len() + self.matched_fuzzy.len() + self.matched_semantic.len()
    }

    /// Percentage of required skills matched by any pass; 0 when nothing is required
    pub fn match_rate(&self) -> f64 {
        let total = self.total_required();
        if total == 0 {
            return 0.0;
        }
        let rate = self.total_matched() as f64 / total as f64 * 100.0;
        (rate * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarSkill {
    pub skill: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct SimilarityMatcher {
    fuzzy_threshold: f64,
    semantic_threshold: f32,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_FUZZY_THRESHOLD, DEFAULT_SEMANTIC_THRESHOLD)
    }
}

type SkillSet = BTreeMap<String, String>;

fn normalize(skills: &[String]) -> SkillSet {
    let mut set = SkillSet::new();
    for skill in skills {
        let display = skill.trim();
        if display.is_empty() {
            continue;
        }
        set.entry(display.to_lowercase())
            .or_insert_with(|| display.to_string());
    }
    set
}

impl SimilarityMatcher {
    pub fn new(fuzzy_threshold: f64, semantic_threshold: f32) -> Self {
        Self {
            fuzzy_threshold,
            semantic_threshold,
        }
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    pub fn semantic_threshold(&self) -> f32 {
        self.semantic_threshold
    }

    /// Exact and fuzzy passes only
    pub fn match_skills(
        &self,
        candidate_skills: &[String],
        required_skills: &[String],
        fuzzy_threshold: f64,
    ) -> MatchResult {
        self.run(candidate_skills, required_skills, fuzzy_threshold, None)
    }

    /// All three passes; skills the engine cannot embed stay unmatched
    pub fn match_skills_with_embeddings(
        &self,
        candidate_skills: &[String],
        required_skills: &[String],
        engine: &mut EmbeddingEngine,
    ) -> MatchResult {
        self.run(
            candidate_skills,
            required_skills,
            self.fuzzy_threshold,
            Some(engine),
        )
    }

    fn run(
        &self,
        candidate_skills: &[String],
        required_skills: &[String],
        fuzzy_threshold: f64,
        engine: Option<&mut EmbeddingEngine>,
    ) -> MatchResult {
        let mut candidates = normalize(candidate_skills);
        let required = normalize(required_skills);
        let mut result = MatchResult::default();

        // Exact pass
        let mut remaining_required = Vec::new();
        for (key, display) in required {
            if candidates.remove(&key).is_some() {
                result.matched_exact.push(display);
            } else {
                remaining_required.push((key, display));
            }
        }

        // Fuzzy pass, greedy and one-to-one
        let mut unmatched_required = Vec::new();
        for (key, display) in remaining_required {
            let mut best: Option<(&String, f64)> = None;
            for candidate_key in candidates.keys() {
                let score = Self::calculate_skill_similarity(&key, candidate_key);
                if score >= fuzzy_threshold && best.map_or(true, |(_, b)| score > b) {
                    best = Some((candidate_key, score));
                }
            }

            match best.map(|(k, score)| (k.clone(), score)) {
                Some((candidate_key, score)) => {
                    let candidate = candidates.remove(&candidate_key).unwrap_or(candidate_key);
                    result.fuzzy_pairs.push(SkillPair {
                        required: display.clone(),
                        candidate,
                        score,
                    });
                    result.matched_fuzzy.push(display);
                }
                None => unmatched_required.push(display),
            }
        }

        let unmatched_candidates: Vec<String> = candidates.into_values().collect();

        // Semantic pass
        match engine {
            Some(engine) if !unmatched_required.is_empty() && !unmatched_candidates.is_empty() => {
                let semantic = engine.semantic_skill_match(
                    &unmatched_candidates,
                    &unmatched_required,
                    self.semantic_threshold,
                );
                result.matched_semantic = semantic.pairs.iter().map(|p| p.required.clone()).collect();
                result.semantic_pairs = semantic.pairs;
                result.missing = semantic.unmatched_required;
                result.extra = semantic.unmatched_candidate;
            }
            _ => {
                result.missing = unmatched_required;
                result.extra = unmatched_candidates;
            }
        }

        debug!(
            "Skill match: {} exact, {} fuzzy, {} semantic, {} missing, {} extra",
            result.matched_exact.len(),
            result.matched_fuzzy.len(),
            result.matched_semantic.len(),
            result.missing.len(),
            result.extra.len()
        );

        result
    }

    /// Indel ratio on normalized names, 0-100: `2 * LCS / (len_a + len_b)`
    pub fn calculate_skill_similarity(a: &str, b: &str) -> f64 {
        let a = a.trim().to_lowercase();
        let b = b.trim().to_lowercase();
        rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
    }

    /// Skills from `skills` at or above `threshold`, best first, ties by name
    pub fn find_similar_skills(
        &self,
        target: &str,
        skills: &[String],
        threshold: f64,
        top_n: usize,
    ) -> Vec<SimilarSkill> {
        let mut matches: Vec<SimilarSkill> = skills
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| SimilarSkill {
                skill: s.clone(),
                score: Self::calculate_skill_similarity(target, s),
            })
            .filter(|m| m.score >= threshold)
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.skill.cmp(&b.skill))
        });
        matches.truncate(top_n);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, ResumeMatcherError};
    use crate::processing::embeddings::TextEmbedder;

    /// Scheduling skills share one vector; everything else gets its own axis
    struct TieEmbedder;

    impl TextEmbedder for TieEmbedder {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            match text.to_lowercase().as_str() {
                "orchestration" | "scheduling" | "nomad" | "kubernetes" => Ok(vec![1.0, 0.0]),
                "cooking" => Ok(vec![0.0, 1.0]),
                _ => Err(ResumeMatcherError::Embedding(format!("no vector for {}", text))),
            }
        }

        fn model_name(&self) -> &str {
            "tie"
        }
    }

    /// Every text is fully similar to every other
    struct ConstantEmbedder;

    impl TextEmbedder for ConstantEmbedder {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 1.0])
        }

        fn model_name(&self) -> &str {
            "constant"
        }
    }

    const VOCABULARY: &[&str] = &[
        "Python", "PostgreSQL", "Postgre SQL", "React", "React.js", "ReactJS", "Node.js",
        "Docker", "Kubernetes", "AWS", "Go", "Rust", "TypeScript", "JavaScript", "Java",
        "SQL Server", "MS SQL Server", "GraphQL",
    ];

    /// Small LCG so generated cases are the same on every run
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.0 >> 33
        }

        fn skill_list(&mut self, max_len: u64) -> Vec<String> {
            let len = self.next() % (max_len + 1);
            (0..len)
                .map(|_| {
                    let skill = VOCABULARY[(self.next() % VOCABULARY.len() as u64) as usize];
                    match self.next() % 5 {
                        0 => skill.to_uppercase(),
                        1 => format!("  {} ", skill.to_lowercase()),
                        2 => {
                            // near miss: drop the last character
                            let mut near = skill.to_string();
                            near.pop();
                            near
                        }
                        _ => skill.to_string(),
                    }
                })
                .collect()
        }
    }

    fn skills(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn assert_partition(result: &MatchResult, required: &[String]) {
        let mut covered: Vec<String> = result
            .matched_exact
            .iter()
            .chain(&result.matched_fuzzy)
            .chain(&result.matched_semantic)
            .chain(&result.missing)
            .map(|s| s.to_lowercase())
            .collect();
        covered.sort();
        let mut expected: Vec<String> = normalize(required).into_keys().collect();
        expected.sort();
        assert_eq!(covered, expected);
    }

    /// Every candidate is consumed by exactly one match or left in `extra`
    fn assert_candidates_accounted(result: &MatchResult, candidates: &[String]) {
        let mut accounted: Vec<String> = result
            .matched_exact
            .iter()
            .chain(result.fuzzy_pairs.iter().map(|p| &p.candidate))
            .chain(result.semantic_pairs.iter().map(|p| &p.candidate))
            .chain(&result.extra)
            .map(|s| s.to_lowercase())
            .collect();
        accounted.sort();
        let expected: Vec<String> = normalize(candidates).into_keys().collect();
        assert_eq!(accounted, expected);
    }

    #[test]
    fn test_exact_matching_is_case_insensitive() {
        let matcher = SimilarityMatcher::default();
        let required = skills(&["Python", "SQL", "AWS"]);
        let result = matcher.match_skills(&skills(&["python ", "sql", "Docker"]), &required, 85.0);

        assert_eq!(result.matched_exact, ["Python", "SQL"]);
        assert_eq!(result.missing, ["AWS"]);
        assert_eq!(result.extra, ["Docker"]);
        assert_eq!(result.total_required(), 3);
        assert_eq!(result.match_rate(), 66.7);
        assert_partition(&result, &required);
    }

    #[test]
    fn test_fuzzy_match() {
        let matcher = SimilarityMatcher::default();
        let required = skills(&["PostgreSQL"]);
        let result = matcher.match_skills(&skills(&["Postgre SQL"]), &required, 85.0);

        assert_eq!(result.matched_fuzzy, ["PostgreSQL"]);
        assert!(result.missing.is_empty());
        assert!(result.extra.is_empty());
        assert_eq!(result.fuzzy_pairs[0].candidate, "Postgre SQL");
        assert!(result.fuzzy_pairs[0].score >= 85.0);
    }

    #[test]
    fn test_fuzzy_is_one_to_one_and_tie_breaks_in_order() {
        let matcher = SimilarityMatcher::default();
        // every pair is one edit apart; lexicographic order decides
        let required = skills(&["ReactJS", "ReactJQ"]);
        let result = matcher.match_skills(&skills(&["reactjy", "reactjx"]), &required, 80.0);

        assert_eq!(result.fuzzy_pairs.len(), 2);
        assert_eq!(result.fuzzy_pairs[0].required, "ReactJQ");
        assert_eq!(result.fuzzy_pairs[0].candidate, "reactjx");
        assert_eq!(result.fuzzy_pairs[1].required, "ReactJS");
        assert_eq!(result.fuzzy_pairs[1].candidate, "reactjy");
        assert!(result.extra.is_empty());
        assert_partition(&result, &required);
    }

    #[test]
    fn test_similarity_counts_insertions_once() {
        // 2 * 10 / 23; plain Levenshtein would give 76.9
        let score = SimilarityMatcher::calculate_skill_similarity("MS SQL Server", "SQL Server");
        assert!((score - 86.96).abs() < 0.01, "got {}", score);
        assert_eq!(SimilarityMatcher::calculate_skill_similarity("Rust", " rust "), 100.0);
        assert_eq!(SimilarityMatcher::calculate_skill_similarity("abc", "xyz"), 0.0);

        let matcher = SimilarityMatcher::default();
        let required = skills(&["SQL Server"]);
        let result = matcher.match_skills(&skills(&["MS SQL Server"]), &required, 85.0);
        assert_eq!(result.matched_fuzzy, ["SQL Server"]);
        assert_eq!(result.fuzzy_pairs[0].candidate, "MS SQL Server");
        assert!(result.extra.is_empty());
    }

    #[test]
    fn test_threshold_rejects_distant_names() {
        let matcher = SimilarityMatcher::default();
        let result = matcher.match_skills(&skills(&["Java"]), &skills(&["JavaScript"]), 85.0);
        assert!(result.matched_fuzzy.is_empty());
        assert_eq!(result.missing, ["JavaScript"]);
        assert_eq!(result.extra, ["Java"]);
    }

    #[test]
    fn test_empty_requirements() {
        let matcher = SimilarityMatcher::default();
        let result = matcher.match_skills(&skills(&["Rust"]), &[], 85.0);
        assert_eq!(result.total_required(), 0);
        assert_eq!(result.match_rate(), 0.0);
        assert_eq!(result.extra, ["Rust"]);
    }

    #[test]
    fn test_duplicate_inputs_collapse() {
        let matcher = SimilarityMatcher::default();
        let required = skills(&["Docker", "docker", " DOCKER"]);
        let result = matcher.match_skills(&skills(&["docker"]), &required, 85.0);
        assert_eq!(result.matched_exact, ["Docker"]);
        assert_eq!(result.total_required(), 1);
    }

    #[test]
    fn test_find_similar_skills() {
        let matcher = SimilarityMatcher::default();
        let similar = matcher.find_similar_skills(
            "kubernetes",
            &skills(&["Kubernetes", "Kubernete", "Terraform", ""]),
            80.0,
            5,
        );
        assert_eq!(similar.len(), 2);
        assert_eq!(similar[0].skill, "Kubernetes");
        assert_eq!(similar[0].score, 100.0);
        assert_eq!(similar[1].skill, "Kubernete");
    }

    #[test]
    fn test_semantic_ties_go_to_first_candidate_by_name() {
        let matcher = SimilarityMatcher::default();
        let mut engine = EmbeddingEngine::new(Box::new(TieEmbedder));
        // input order puts Nomad first; name order puts Kubernetes first
        let candidates = skills(&["Nomad", "Kubernetes", "Cooking"]);
        let required = skills(&["Scheduling", "Orchestration"]);

        let result = matcher.match_skills_with_embeddings(&candidates, &required, &mut engine);

        assert_eq!(result.matched_semantic, ["Orchestration", "Scheduling"]);
        assert_eq!(result.semantic_pairs[0].candidate, "Kubernetes");
        assert_eq!(result.semantic_pairs[1].candidate, "Nomad");
        assert_eq!(result.extra, ["Cooking"]);
        assert!(result.missing.is_empty());
        assert_partition(&result, &required);
        assert_candidates_accounted(&result, &candidates);

        // same outcome regardless of input order
        let reversed: Vec<String> = candidates.iter().rev().cloned().collect();
        let again = matcher.match_skills_with_embeddings(&reversed, &required, &mut engine);
        assert_eq!(again, result);
    }

    #[test]
    fn test_partition_holds_for_generated_skill_lists() {
        let matcher = SimilarityMatcher::default();
        let mut rng = Lcg(42);

        for _ in 0..300 {
            let required = rng.skill_list(8);
            let candidates = rng.skill_list(10);

            for threshold in [70.0, 85.0, 100.0] {
                let result = matcher.match_skills(&candidates, &required, threshold);
                assert_partition(&result, &required);
                assert_candidates_accounted(&result, &candidates);
                assert!(result.fuzzy_pairs.iter().all(|p| p.score >= threshold));
            }

            let mut engine = EmbeddingEngine::new(Box::new(ConstantEmbedder));
            let result = matcher.match_skills_with_embeddings(&candidates, &required, &mut engine);
            assert_partition(&result, &required);
            assert_candidates_accounted(&result, &candidates);
            assert!(result.missing.is_empty() || result.extra.is_empty());
        }
    }
}
