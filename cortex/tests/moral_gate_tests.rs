// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Properties of the action risk gate.

use gca_cortex::application::MoralKernel;
use gca_cortex::domain::{Action, EntropyClass};

fn action(harm: f64, utility: f64, uncertainty: f64, scale: f64, agents: u32, class: EntropyClass) -> Action {
    Action::new("probe", "", harm, utility, uncertainty, scale, agents, class).unwrap()
}

const STEPS: [f64; 6] = [0.0, 0.1, 0.25, 0.5, 0.75, 1.0];

#[test]
fn test_empty_batch_is_approved() {
    for threshold in [0.01, 0.5, 10.0] {
        let verdict = MoralKernel::new(threshold).evaluate(&[]);
        assert!(verdict.approved);
        assert_eq!(verdict.total_score, 0.0);
        assert!(verdict.reason.contains("below threshold"));
    }
}

#[test]
fn test_monotonic_in_harm_uncertainty_and_agents() {
    let kernel = MoralKernel::default();

    for pair in STEPS.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        assert!(
            kernel.score(&action(hi, 0.5, 0.3, 0.8, 3, EntropyClass::Bounded))
                >= kernel.score(&action(lo, 0.5, 0.3, 0.8, 3, EntropyClass::Bounded))
        );
        assert!(
            kernel.score(&action(0.3, 0.5, hi, 0.8, 3, EntropyClass::Bounded))
                >= kernel.score(&action(0.3, 0.5, lo, 0.8, 3, EntropyClass::Bounded))
        );
        assert!(
            kernel.score(&action(0.3, hi, 0.3, 0.8, 3, EntropyClass::Bounded))
                <= kernel.score(&action(0.3, lo, 0.3, 0.8, 3, EntropyClass::Bounded))
        );
    }

    for agents in 0..50u32 {
        assert!(
            kernel.score(&action(0.3, 0.5, 0.3, 0.8, agents + 1, EntropyClass::Reversible))
                >= kernel.score(&action(0.3, 0.5, 0.3, 0.8, agents, EntropyClass::Reversible))
        );
    }
}

#[test]
fn test_irreversible_at_least_doubles() {
    let kernel = MoralKernel::default();
    for &harm in &STEPS {
        for agents in [0u32, 1, 4, 100] {
            let reversible = action(harm, 0.4, 0.2, 0.9, agents, EntropyClass::Reversible);
            let irreversible = reversible.clone().with_entropy_class(EntropyClass::Irreversible);
            assert!(kernel.score(&irreversible) >= 2.0 * kernel.score(&reversible));
        }
    }
}

#[test]
fn test_one_risky_action_blocks_the_batch() {
    let kernel = MoralKernel::default();
    let safe = action(0.0, 1.0, 0.0, 1.0, 10, EntropyClass::Reversible);
    let risky = action(0.9, 0.1, 0.9, 1.0, 10, EntropyClass::Irreversible);

    assert_eq!(kernel.score(&safe), 0.0);
    assert!(kernel.evaluate(&[safe.clone()]).approved);

    let verdict = kernel.evaluate(&[safe, risky]);
    assert!(!verdict.approved);
    assert!(verdict.reason.contains("exceeds threshold"));
}

#[test]
fn test_sum_of_small_actions_can_block() {
    let kernel = MoralKernel::default();
    let small = action(0.3, 0.9, 0.2, 1.0, 1, EntropyClass::Reversible);

    assert!(kernel.evaluate(&[small.clone()]).approved);
    assert!(!kernel.evaluate(&[small.clone(), small]).approved);
}

#[test]
fn test_malformed_actions_are_rejected() {
    assert!(Action::new("x", "", 1.01, 0.5, 0.5, 0.5, 1, EntropyClass::Bounded).is_err());
    assert!(Action::new("x", "", 0.5, 0.5, 0.5, -0.01, 1, EntropyClass::Bounded).is_err());

    let parsed = serde_json::from_str::<Action>(
        r#"{"kind":"x","harm":0.2,"utility":0.5,"uncertainty":0.5,"scale":0.5,"agents_affected":-3,"entropy_class":"REVERSIBLE"}"#,
    );
    assert!(parsed.is_err());
}
