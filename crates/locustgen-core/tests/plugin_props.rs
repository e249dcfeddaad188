//! Property tests for contracts and plugin grouping

use proptest::prelude::*;

use locustgen_core::plugins::{apply, group_by_contract, Contract, Plugin};
use locustgen_core::{Scenario, Task};
use locustgen_syntax::Program;

/// Plugin declaring `contract`, with an identity handler for each contract
fn plugin(index: usize, contract: Contract) -> Plugin {
    let mut plugin = Plugin::new(format!("p{index}"), contract);
    if contract.contains(Contract::ON_TASK) {
        plugin = plugin.task(|t: Task| t);
    }
    if contract.contains(Contract::ON_SCENARIO) {
        plugin = plugin.scenario(|s: Scenario| s);
    }
    if contract.contains(Contract::ON_PROGRAM) {
        plugin = plugin.program(|p: Program| p);
    }
    if contract.contains(Contract::ON_TASK_SEQUENCE) {
        plugin = plugin.task_sequence(|ts: Vec<Task>| ts);
    }
    plugin
}

proptest! {
    #[test]
    fn prop_from_bits_accepts_only_known_contracts(bits in any::<u8>()) {
        let result = Contract::from_bits(bits);
        prop_assert_eq!(result.is_ok(), bits < 16);
        if let Ok(contract) = result {
            let rebuilt = contract.iter().fold(Contract::NONE, |acc, c| acc | c);
            prop_assert_eq!(rebuilt, contract);
        }
    }

    #[test]
    fn prop_grouping_keeps_order_and_membership(bits in prop::collection::vec(0u8..16, 0..12)) {
        let plugins: Vec<Plugin> = bits
            .iter()
            .enumerate()
            .map(|(i, b)| plugin(i, Contract::from_bits(*b).unwrap()))
            .collect();
        let groups = group_by_contract(&plugins);

        for contract in Contract::BASE {
            let expected: Vec<&str> = plugins
                .iter()
                .filter(|p| p.contract().contains(contract))
                .map(Plugin::name)
                .collect();
            let actual: Vec<&str> = groups.get(contract).iter().map(Plugin::name).collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn prop_apply_composes_in_order(steps in prop::collection::vec(1i64..10, 0..8)) {
        let transforms: Vec<Box<dyn Fn(i64) -> i64>> = steps
            .iter()
            .map(|&k| Box::new(move |x: i64| x * 10 + k) as Box<dyn Fn(i64) -> i64>)
            .collect();
        let expected = steps.iter().fold(0i64, |x, k| x * 10 + k);
        prop_assert_eq!(apply(&transforms, 0), expected);
    }
}
