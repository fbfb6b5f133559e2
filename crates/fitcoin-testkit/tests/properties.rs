//! Property tests over generated operation sequences

use fitcoin_core::{AccrualConfig, EconomyConfig};
use fitcoin_economy::accrual::plan_conversion;
use fitcoin_testkit::strategies::{arb_accrual_config, arb_actions};
use fitcoin_testkit::{assert_conserved, assert_watermarks, EconomyFixture, ScenarioRunner};
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_runs_conserve_fitcoin(
        actions in arb_actions(40),
        accrual in arb_accrual_config(),
    ) {
        runtime().block_on(async {
            let config = EconomyConfig { accrual, ..EconomyConfig::default() };
            let fixture = EconomyFixture::with_config(config);
            let mut runner = ScenarioRunner::setup(&fixture).await;
            for action in &actions {
                runner.apply(action).await.unwrap();
            }
            let report = runner.report();
            assert_eq!(report.applied + report.rejected, actions.len());

            assert_conserved(&fixture).await;
            assert_watermarks(&fixture).await;

            // every stored contract was opened with a positive quantity
            for contract in fixture.economy().list_all_contracts().await.unwrap().iter() {
                let contract = contract.unwrap();
                assert!(contract.quantity > 0);
            }
        });
    }

    #[test]
    fn settled_contracts_never_change_again(actions in arb_actions(30)) {
        runtime().block_on(async {
            let fixture = EconomyFixture::new();
            let mut runner = ScenarioRunner::setup(&fixture).await;
            let mut settled = std::collections::BTreeMap::new();
            for action in &actions {
                runner.apply(action).await.unwrap();
                for contract in fixture.economy().list_all_contracts().await.unwrap().iter() {
                    let contract = contract.unwrap();
                    if contract.state.is_terminal() {
                        let first = settled.entry(contract.id.clone()).or_insert(contract.clone());
                        assert_eq!(*first, contract);
                    }
                }
            }
        });
    }

    #[test]
    fn conversion_never_exceeds_reported_activity(
        config in arb_accrual_config(),
        converted_units in 0u64..50,
        extra in 0u64..100_000,
    ) {
        let converted = converted_units * config.threshold;
        let reported = converted + extra;
        if let Some(conversion) = plan_conversion(&config, converted, reported) {
            prop_assert!(conversion.converted <= reported);
            prop_assert!(conversion.converted > converted);
            prop_assert_eq!(conversion.converted % config.threshold, 0);
            prop_assert_eq!(
                conversion.earned,
                (conversion.converted - converted) / config.threshold
            );
        } else {
            prop_assert!(extra < config.threshold || extra % config.threshold != 0);
        }
    }
}

#[test]
fn bank_remainder_converts_every_whole_threshold() {
    let config = AccrualConfig::default();
    for extra in [100, 199, 250, 1_000_001] {
        let conversion = plan_conversion(&config, 0, extra).unwrap();
        assert_eq!(conversion.earned, extra / 100);
        assert_eq!(conversion.converted, extra - extra % 100);
    }
}

#[tokio::test]
async fn rule_violations_are_counted_not_raised() {
    use fitcoin_testkit::strategies::EconomyAction;
    let fixture = EconomyFixture::new();
    let mut runner = ScenarioRunner::setup(&fixture).await;
    runner
        .apply(&EconomyAction::Purchase {
            seller: "s1",
            user: "u1",
            product: "p1",
            quantity: 0,
        })
        .await
        .unwrap();
    assert_eq!(runner.report().rejected, 1);
    assert_eq!(runner.report().applied, 0);
}
