// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Dense vector helpers shared by the basis, the skill matrix and the learner.
//!
//! Everything here operates on plain `f32` slices; the matrices in this crate
//! are stored row-major in a single `Vec<f32>`.

/// Smallest norm treated as non-zero when normalising.
pub const NORM_EPSILON: f32 = 1e-12;

/// Dot product of two equally sized vectors.
///
/// Mismatched lengths contribute only the overlapping prefix; callers check
/// dimensions before relying on the result.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Returns `v / max(||v||, NORM_EPSILON)`.
///
/// A zero vector stays a zero vector.
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm = l2_norm(v).max(NORM_EPSILON);
    v.iter().map(|x| x / norm).collect()
}

/// Element-wise mean of a set of equally sized vectors.
///
/// Returns `None` when the set is empty or the rows disagree on length.
pub fn mean_vector(rows: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = rows.first()?;
    let dim = first.len();
    if rows.iter().any(|r| r.len() != dim) {
        return None;
    }

    let mut acc = vec![0.0f32; dim];
    for row in rows {
        for (a, x) in acc.iter_mut().zip(row.iter()) {
            *a += x;
        }
    }
    let n = rows.len() as f32;
    acc.iter_mut().for_each(|a| *a /= n);
    Some(acc)
}

/// Mean-pools token-level hidden states over the positions the attention
/// mask keeps.
///
/// `hidden_states` is `(seq, dim)`; `attention_mask[t]` is 1 for a real token
/// and 0 for padding. Padded positions never contribute to the sum or to the
/// divisor. A fully masked sequence pools to the zero vector.
pub fn masked_mean_pool(hidden_states: &[Vec<f32>], attention_mask: &[u8]) -> Vec<f32> {
    let dim = hidden_states.first().map(|h| h.len()).unwrap_or(0);
    let mut sum = vec![0.0f32; dim];
    let mut kept = 0.0f32;

    for (state, &mask) in hidden_states.iter().zip(attention_mask.iter()) {
        if mask == 0 {
            continue;
        }
        for (s, x) in sum.iter_mut().zip(state.iter()) {
            *s += x;
        }
        kept += 1.0;
    }

    let divisor = kept.max(1e-9);
    sum.iter_mut().for_each(|s| *s /= divisor);
    sum
}
