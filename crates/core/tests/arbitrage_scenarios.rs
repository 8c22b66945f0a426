use arb_solver_core::{
    ArbitrageEngine, EngineConfig, GraphBuilder, PriceSnapshot, SourceStrategy,
};
use common::error::Error;

fn snapshot(quotes: &[(&'static str, &'static str, f64)]) -> PriceSnapshot<&'static str> {
    quotes.iter().copied().collect()
}

fn engine(strategy: SourceStrategy) -> ArbitrageEngine {
    ArbitrageEngine::new(EngineConfig {
        strategy,
        ..EngineConfig::default()
    })
}

const STRATEGIES: [SourceStrategy; 2] = [SourceStrategy::SingleSource, SourceStrategy::SuperSource];

#[test]
fn weth_dai_usdt_triangle_above_parity_is_found() {
    let close_rate = 0.000334068;
    let rates = snapshot(&[
        ("WETH", "DAI", 3000.0),
        ("DAI", "USDT", 0.998),
        ("USDT", "WETH", close_rate),
    ]);
    let expected_profit = 3000.0 * 0.998 * close_rate - 1.0;

    for strategy in STRATEGIES {
        let opportunity = engine(strategy)
            .find_opportunity(&rates, &"WETH")
            .expect("detection must not fail")
            .expect("a profitable triangle must be found");

        assert_eq!(opportunity.route, vec!["WETH", "DAI", "USDT", "WETH"]);
        assert_eq!(opportunity.hop_count(), 3);
        assert!(opportunity.profit_ratio() > 0.0);
        assert!(
            (opportunity.profit_ratio() - expected_profit).abs() < 1e-9,
            "profit ratio {} differs from {}",
            opportunity.profit_ratio(),
            expected_profit
        );
        assert!((opportunity.profit_ratio() - 0.0002).abs() < 1e-5);
    }
}

#[test]
fn weth_dai_usdt_triangle_at_0_000334_is_just_below_parity() {
    // 3000 * 0.998 * 0.000334 = 0.999996
    let rates = snapshot(&[
        ("WETH", "DAI", 3000.0),
        ("DAI", "USDT", 0.998),
        ("USDT", "WETH", 0.000334),
    ]);

    for strategy in STRATEGIES {
        let result = engine(strategy).find_opportunity(&rates, &"WETH");
        assert_eq!(result, Ok(None));
    }
}

#[test]
fn weth_dai_usdt_triangle_with_losing_close_returns_none() {
    let rates = snapshot(&[
        ("WETH", "DAI", 3000.0),
        ("DAI", "USDT", 0.998),
        ("USDT", "WETH", 0.00030),
    ]);

    for strategy in STRATEGIES {
        let result = engine(strategy).find_opportunity(&rates, &"WETH");
        assert_eq!(result, Ok(None));
    }
}

#[test]
fn fully_quoted_market_yields_the_weth_usdt_round_trip() {
    // The only loop above parity is WETH -> USDT -> WETH: 2995 * 0.000334 = 1.00033.
    let rates = PriceSnapshot::from_nested(vec![
        ("WETH", vec![("DAI", 3000.0), ("USDT", 2995.0)]),
        ("DAI", vec![("USDT", 0.998), ("WETH", 0.00033)]),
        ("USDT", vec![("DAI", 1.002), ("WETH", 0.000334)]),
    ]);

    let opportunity = engine(SourceStrategy::SuperSource)
        .find_opportunity(&rates, &"WETH")
        .unwrap()
        .unwrap();

    assert_eq!(opportunity.route, vec!["WETH", "USDT", "WETH"]);
    assert!((opportunity.profit_ratio() - (2995.0 * 0.000334 - 1.0)).abs() < 1e-9);
}

#[test]
fn source_absent_from_snapshot_is_invalid_source() {
    let rates = snapshot(&[
        ("WETH", "DAI", 3000.0),
        ("DAI", "USDT", 0.998),
        ("USDT", "WETH", 0.00030),
    ]);

    for strategy in STRATEGIES {
        let result = engine(strategy).find_opportunity(&rates, &"WBTC");
        assert_eq!(result, Err(Error::InvalidSource("WBTC".to_string())));
    }
}

#[test]
fn source_quoted_only_at_zero_is_invalid_source() {
    let mut rates = snapshot(&[("WETH", "DAI", 3000.0), ("DAI", "WETH", 0.00034)]);
    rates.insert("WBTC", "WETH", 0.0);

    let result = engine(SourceStrategy::SuperSource).find_opportunity(&rates, &"WBTC");

    assert_eq!(result, Err(Error::InvalidSource("WBTC".to_string())));
}

#[test]
fn empty_snapshot_is_invalid_source() {
    let rates = PriceSnapshot::<&str>::new();

    let result = engine(SourceStrategy::SuperSource).find_opportunity(&rates, &"WETH");

    assert!(matches!(result, Err(Error::InvalidSource(_))));
}

#[test]
fn super_source_finds_loop_the_source_cannot_reach() {
    let rates = snapshot(&[
        // Reachable from WETH, losing.
        ("WETH", "DAI", 3000.0),
        ("DAI", "WETH", 0.0003),
        // Not reachable from WETH, profitable: 1.01 * 1.0 = 1.01.
        ("USDC", "USDT", 1.01),
        ("USDT", "USDC", 1.0),
    ]);

    let single = engine(SourceStrategy::SingleSource)
        .find_opportunity(&rates, &"WETH")
        .unwrap();
    assert!(single.is_none());

    let opportunity = engine(SourceStrategy::SuperSource)
        .find_opportunity(&rates, &"WETH")
        .unwrap()
        .expect("the USDC/USDT loop must be found");

    assert_eq!(opportunity.route.first(), opportunity.route.last());
    assert!(opportunity.route.contains(&"USDC"));
    assert!(opportunity.route.contains(&"USDT"));
    assert!(!opportunity.route.contains(&"WETH"));
    assert!((opportunity.profit_ratio() - 0.01).abs() < 1e-9);
}

#[test]
fn four_asset_loop_is_returned_from_the_source() {
    let rates = snapshot(&[
        ("A", "B", 1.0),
        ("B", "C", 1.0),
        ("C", "D", 1.0),
        ("D", "A", 1.05),
        // Losing exits that must not end up in the route.
        ("B", "A", 0.9),
        ("C", "A", 0.9),
    ]);

    let opportunity = engine(SourceStrategy::SuperSource)
        .find_opportunity(&rates, &"C")
        .unwrap()
        .unwrap();

    assert_eq!(opportunity.route, vec!["C", "D", "A", "B", "C"]);
    assert_eq!(opportunity.rates.len(), 4);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let rates = snapshot(&[
        ("A", "B", 0.5),
        ("B", "A", 2.1),
        ("B", "C", 1.0),
        ("C", "D", 0.8),
        ("D", "C", 1.3),
    ]);
    let solver = engine(SourceStrategy::SuperSource);

    let first = solver.find_opportunity(&rates, &"A").unwrap().unwrap();
    let second = solver.find_opportunity(&rates, &"A").unwrap().unwrap();

    assert_eq!(first.route, second.route);
    assert_eq!(first.log_rate_sum.to_bits(), second.log_rate_sum.to_bits());
    let bits = |rates: &[f64]| rates.iter().map(|r| r.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first.rates), bits(&second.rates));
}

#[test]
fn every_hop_of_a_returned_cycle_is_a_graph_edge() {
    let rates = PriceSnapshot::from_nested(vec![
        ("A", vec![("B", 1.2), ("C", 0.9)]),
        ("B", vec![("C", 1.1), ("A", 0.7)]),
        ("C", vec![("A", 0.8), ("B", 0.95)]),
    ]);
    let graph = GraphBuilder::build(&rates);

    let opportunity = engine(SourceStrategy::SuperSource)
        .find_in_graph(&graph, &"A")
        .unwrap()
        .unwrap();

    assert_eq!(opportunity.route.first(), opportunity.route.last());
    for hop in opportunity.route.windows(2) {
        assert!(graph.has_edge(&hop[0], &hop[1]), "{} -> {} missing", hop[0], hop[1]);
    }
    assert!(opportunity.log_rate_sum < 0.0);
}

#[test]
fn non_positive_rates_never_become_edges() {
    let rates = snapshot(&[
        ("A", "B", 2.0),
        ("B", "A", 0.0),
        ("B", "C", -1.0),
        ("C", "A", 0.6),
    ]);
    let graph = GraphBuilder::build(&rates);

    assert!(!graph.has_edge(&"B", &"A"));
    assert!(!graph.has_edge(&"B", &"C"));
    assert_eq!(graph.num_edges(), 2);

    // Without the dropped edges no loop is left.
    let result = engine(SourceStrategy::SuperSource).find_opportunity(&rates, &"A");
    assert_eq!(result, Ok(None));
}
