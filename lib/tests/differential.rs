use std::thread;

use num_bigint::BigUint;

use cygnuslib::conformance::{CrossCheck, DifferentialSweep, cross_check};
use cygnuslib::difficulty::{DifficultyRule, calc_difficulty, calc_difficulty_u256};
use cygnuslib::types::{ChainConfig, EMPTY_UNCLE_HASH, Hash, Header};

#[test]
fn reference_and_fixed_agree_on_seeded_sweep() {
    let report = DifferentialSweep::new(2).run(5_000);
    assert!(
        report.diverged.is_empty(),
        "first divergence: {:?}",
        report.diverged.first()
    );
    assert_eq!(report.agreed + report.out_of_range, 15_000);
    assert!(report.agreed > report.out_of_range);
}

#[test]
fn uncles_shift_dynamic_result_by_one_quotient() {
    let mut sweep = DifferentialSweep::new(11);
    for _ in 0..500 {
        let case = sweep.next_case();
        let rule = DifficultyRule::Dynamic {
            bomb_delay: case.bomb_delay,
        };
        let mut parent = case.parent;
        parent.time = 1_700_000_000;
        // a nine second block keeps both factors away from the clamp and the floor
        let time = parent.time + 9;
        let without = parent.clone().with_uncle_hash(EMPTY_UNCLE_HASH);
        let with = parent.clone().with_uncle_hash(Hash::zero());

        let quotient = &parent.difficulty / 2048u32;
        assert_eq!(
            rule.reference(time, &with),
            rule.reference(time, &without) + quotient
        );
    }
}

#[test]
fn concurrent_calls_agree() {
    let parent = Header::new(4_999_999, 1_600_000_000, BigUint::from(3_000_000_000_000u64));
    let expected = calc_difficulty(&ChainConfig::MAINNET, 1_600_000_017, &parent);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    (0..1_000)
                        .map(|_| {
                            (
                                calc_difficulty(&ChainConfig::MAINNET, 1_600_000_017, &parent),
                                calc_difficulty_u256(&ChainConfig::MAINNET, 1_600_000_017, &parent)
                                    .unwrap()
                                    .to_biguint(),
                            )
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        for handle in handles {
            for (reference, fixed) in handle.join().unwrap() {
                assert_eq!(reference, expected);
                assert_eq!(fixed, expected);
            }
        }
    });
}

#[test]
fn every_mainnet_era_agrees_at_its_activation() {
    let config = ChainConfig::MAINNET;
    for height in [
        1,
        1_150_000,
        4_370_000,
        7_280_000,
        9_200_000,
        12_965_000,
        13_773_000,
        15_050_000,
    ] {
        let parent = Header::new(height - 1, 1_700_000_000, BigUint::from(10u64.pow(16)));
        let rule = config.difficulty_rule(height);
        for delta in [1, 9, 13, 100, 3_000] {
            assert!(matches!(
                cross_check(rule, parent.time + delta, &parent),
                CrossCheck::Agree(_)
            ));
        }
    }
}
