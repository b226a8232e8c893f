// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Skill memory against real files: registry persistence, reload and
//! reconstruction.

use std::sync::Arc;

use gca_cortex::application::{Reconstruction, SkillMemory, SkillMemoryError};
use gca_cortex::domain::{Basis, SkillMetadata};
use gca_cortex::infrastructure::{save_basis, JsonRegistryStore};

fn basis() -> Basis {
    Basis::from_rows(vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.0, 0.6, 0.8, 0.0],
        vec![0.0, 0.0, 0.0, 1.0],
    ])
    .unwrap()
}

#[test]
fn test_registry_roundtrip_is_bit_exact() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("skill_registry.json");
    let coeffs = vec![0.6f32, -0.25, 1.0 / 3.0];
    let meta = SkillMetadata {
        layer: 9,
        default_strength: 3.5,
    };

    {
        let memory = SkillMemory::new(Some(basis()), Arc::new(JsonRegistryStore::new(&registry))).unwrap();
        memory.add_or_update("SQL", coeffs.clone(), meta).unwrap();
    }

    let reloaded = SkillMemory::new(Some(basis()), Arc::new(JsonRegistryStore::new(&registry))).unwrap();
    let record = reloaded.record("sql").unwrap();

    let expected: Vec<u32> = coeffs.iter().map(|c| c.to_bits()).collect();
    let actual: Vec<u32> = record.coefficients.iter().map(|c| c.to_bits()).collect();
    assert_eq!(actual, expected);
    assert_eq!(record.metadata(), meta);
}

#[test]
fn test_reconstruct_matches_matrix_product() {
    let dir = tempfile::tempdir().unwrap();
    let memory = SkillMemory::new(
        Some(basis()),
        Arc::new(JsonRegistryStore::new(dir.path().join("registry.json"))),
    )
    .unwrap();
    let coeffs = vec![0.5f32, 0.5, -0.5];
    memory.add_or_update("mixed", coeffs.clone(), SkillMetadata::default()).unwrap();

    let b = basis();
    let mut expected = vec![0.0f32; b.dim()];
    for (c, row) in coeffs.iter().zip(b.rows()) {
        for (e, x) in expected.iter_mut().zip(row) {
            *e += c * x;
        }
    }

    assert_eq!(memory.reconstruct("MIXED"), Reconstruction::Vector(expected));
}

#[test]
fn test_open_from_basis_files() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("registry.json");

    for name in ["basis.json", "basis.bin"] {
        let path = dir.path().join(name);
        save_basis(&basis(), &path).unwrap();

        let memory = SkillMemory::open(&path, Arc::new(JsonRegistryStore::new(&registry))).unwrap();
        assert!(!memory.is_degraded());
        assert_eq!(memory.basis().unwrap().rank(), 3);
    }
}

#[test]
fn test_corrupt_registry_refuses_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("registry.json");
    std::fs::write(&registry, "[1, 2, 3]").unwrap();

    let result = SkillMemory::new(Some(basis()), Arc::new(JsonRegistryStore::new(&registry)));
    assert!(matches!(result, Err(SkillMemoryError::Registry(_))));
    assert_eq!(std::fs::read_to_string(&registry).unwrap(), "[1, 2, 3]");
}

#[test]
fn test_updates_rewrite_whole_file_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let registry = dir.path().join("nested").join("registry.json");
    let memory = SkillMemory::new(Some(basis()), Arc::new(JsonRegistryStore::new(&registry))).unwrap();

    memory.add_or_update("sql", vec![1.0, 0.0, 0.0], SkillMetadata::default()).unwrap();
    memory.add_or_update("corporate", vec![0.0, 1.0, 0.0], SkillMetadata::default()).unwrap();
    memory.add_or_update("sql", vec![0.0, 0.0, 1.0], SkillMetadata::default()).unwrap();

    let raw: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&registry).unwrap()).unwrap();
    let object = raw.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["SQL"]["vector_coeffs"], serde_json::json!([0.0, 0.0, 1.0]));
    assert_eq!(object["CORPORATE"]["layer"], serde_json::json!(6));
    assert_eq!(object["CORPORATE"]["default_strength"], serde_json::json!(5.0));
}
