// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

use super::geometry::dot;

/// Layer the skill directions are harvested from and injected into.
pub const DEFAULT_SKILL_LAYER: u32 = 6;

/// Strength recorded for freshly learned skills.
pub const DEFAULT_SKILL_STRENGTH: f32 = 5.0;

/// Canonical registry key for a skill name. Names are case-insensitive.
pub fn canonical_skill_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Metadata persisted next to a skill's coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillMetadata {
    pub layer: u32,
    pub default_strength: f32,
}

impl Default for SkillMetadata {
    fn default() -> Self {
        Self {
            layer: DEFAULT_SKILL_LAYER,
            default_strength: DEFAULT_SKILL_STRENGTH,
        }
    }
}

/// A learned skill: a unit direction expressed in basis coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRecord {
    pub name: String,
    pub coefficients: Vec<f32>,
    pub layer: u32,
    pub default_strength: f32,
}

impl SkillRecord {
    pub fn new(name: &str, coefficients: Vec<f32>, metadata: SkillMetadata) -> Self {
        Self {
            name: canonical_skill_name(name),
            coefficients,
            layer: metadata.layer,
            default_strength: metadata.default_strength,
        }
    }

    pub fn metadata(&self) -> SkillMetadata {
        SkillMetadata {
            layer: self.layer,
            default_strength: self.default_strength,
        }
    }
}

/// All skill coefficient vectors stacked in registration order.
///
/// Row `i` always belongs to `names[i]`; both are only ever produced together
/// by [`SkillMatrix::build`].
#[derive(Debug, Clone, Default)]
pub struct SkillMatrix {
    names: Vec<String>,
    rank: usize,
    data: Vec<f32>,
}

impl SkillMatrix {
    /// Stacks every record whose coefficient vector has length `rank`.
    ///
    /// Returns the matrix together with the names of records that were left
    /// out because of a dimension mismatch.
    pub fn build<'a>(
        records: impl IntoIterator<Item = &'a SkillRecord>,
        rank: usize,
    ) -> (Self, Vec<String>) {
        let mut names = Vec::new();
        let mut data = Vec::new();
        let mut skipped = Vec::new();

        for record in records {
            if record.coefficients.len() != rank {
                skipped.push(record.name.clone());
                continue;
            }
            names.push(record.name.clone());
            data.extend_from_slice(&record.coefficients);
        }

        (Self { names, rank, data }, skipped)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// `M · q`: the score of every skill against `query` in one pass.
    ///
    /// Returns an empty vector when `query` is not `rank`-dimensional.
    pub fn scores(&self, query: &[f32]) -> Vec<f32> {
        if query.len() != self.rank || self.rank == 0 {
            return Vec::new();
        }
        self.data.chunks_exact(self.rank).map(|row| dot(row, query)).collect()
    }

    /// Highest-scoring row. Ties resolve to the earliest registered skill.
    pub fn best(&self, query: &[f32]) -> Option<(&str, f32)> {
        let scores = self.scores(query);
        let mut best: Option<(usize, f32)> = None;
        for (i, score) in scores.into_iter().enumerate() {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((i, score)),
            }
        }
        best.map(|(i, score)| (self.names[i].as_str(), score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, coefficients: Vec<f32>) -> SkillRecord {
        SkillRecord::new(name, coefficients, SkillMetadata::default())
    }

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_skill_name(" sql "), "SQL");
        assert_eq!(record("Corporate", vec![]).name, "CORPORATE");
    }

    #[test]
    fn test_default_metadata() {
        let meta = SkillMetadata::default();
        assert_eq!(meta.layer, 6);
        assert_eq!(meta.default_strength, 5.0);
    }

    #[test]
    fn test_build_keeps_names_and_rows_aligned() {
        let records = vec![
            record("a", vec![1.0, 0.0]),
            record("bad", vec![1.0, 0.0, 0.0]),
            record("b", vec![0.0, 1.0]),
        ];
        let (matrix, skipped) = SkillMatrix::build(&records, 2);

        assert_eq!(matrix.len(), 2);
        assert_eq!(matrix.names(), &["A".to_string(), "B".to_string()]);
        assert_eq!(skipped, vec!["BAD".to_string()]);
        assert_eq!(matrix.scores(&[0.25, 0.75]), vec![0.25, 0.75]);
    }

    #[test]
    fn test_best_prefers_first_on_tie() {
        let records = vec![record("first", vec![0.5, 0.5]), record("second", vec![0.5, 0.5])];
        let (matrix, _) = SkillMatrix::build(&records, 2);
        let (name, score) = matrix.best(&[1.0, 1.0]).unwrap();
        assert_eq!(name, "FIRST");
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_empty_matrix_has_no_best() {
        let (matrix, _) = SkillMatrix::build(&[], 4);
        assert!(matrix.is_empty());
        assert!(matrix.best(&[0.0; 4]).is_none());
    }
}
