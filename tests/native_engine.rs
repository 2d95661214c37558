//! Tests against the native SWIFT library; run with `cargo test -- --ignored`
//! once the library is reachable through `SWIFT_LIBRARY_PATH`.
use swift2::catchment::CatchmentDefinition;
use swift2::parameteriser::ParameterSpec;
use swift2::subcatchments::{SplitElement, REMAINDER_KEY};
use swift2::system;
use swift2::{HypercubeParameteriser, Parameteriser, Simulation, SwiftError};
// Five links draining to n6: n3 -> n4, n1 -> n4, n4 -> n2, n5 -> n2, n2 -> n6.
fn test_catchment() -> Simulation {
    let ids = |prefix: &str, n: usize| (1..=n).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>();
    let node_ids = ids("n", 6);
    let link_ids = ids("lnk", 5);
    let definition = CatchmentDefinition {
        node_names: node_ids.iter().map(|n| format!("{n}_name")).collect(),
        link_names: link_ids.iter().map(|l| format!("{l}_name")).collect(),
        node_ids,
        link_ids,
        link_from_node: ["n2", "n5", "n4", "n3", "n1"].map(String::from).to_vec(),
        link_to_node: ["n6", "n2", "n2", "n4", "n4"].map(String::from).to_vec(),
        runoff_model: "GR4J".to_string(),
        areas_km2: Some(vec![1.2, 2.3, 4.4, 2.2, 1.5]),
    };
    Simulation::from_definition(&definition).unwrap()
}
#[test]
#[ignore = "requires the native SWIFT library"]
fn json_round_trip_keeps_the_structure() {
    let sim = test_catchment();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catchment.json");
    sim.to_json_file(&path).unwrap();
    let loaded = Simulation::from_json_file(&path).unwrap();
    assert_eq!(loaded.num_nodes().unwrap(), 6);
    assert_eq!(loaded.num_links().unwrap(), 5);
    assert_eq!(loaded.describe().unwrap(), sim.describe().unwrap());
}
#[test]
#[ignore = "requires the native SWIFT library"]
fn hypercube_preserves_values_and_bounds() {
    let specs = vec![
        ParameterSpec::new("x1", 350.0, 1.0, 3000.0),
        ParameterSpec::new("x4", 1.0, 1.0, 1.0),
    ];
    let p = HypercubeParameteriser::with_specs("generic subareas", &specs).unwrap();
    assert_eq!(p.as_specs().unwrap(), specs);
    assert!(p.is_within_bounds().unwrap());
    assert_eq!(p.num_free_parameters().unwrap(), 1);
    p.set_max_values(&["x4"], &[240.0]).unwrap();
    p.set_values(&["x1", "x4"], &[500.0, 2.5]).unwrap();
    let copy = p.try_clone().unwrap();
    assert_eq!(copy.as_specs().unwrap()[1], ParameterSpec::new("x4", 2.5, 1.0, 240.0));
    assert_eq!(copy.value("x1").unwrap(), 500.0);
    assert_eq!(copy.num_free_parameters().unwrap(), 2);
}
#[test]
#[ignore = "requires the native SWIFT library"]
fn unknown_runoff_model_is_rejected_by_name() {
    assert!(system::runoff_model_ids().unwrap().iter().any(|m| m == "GR4J"));
    let err = system::runoff_model_var_ids("NOT_A_MODEL").unwrap_err();
    assert!(matches!(err, SwiftError::UnknownIdentifier { .. }));
    assert!(err.to_string().contains("NOT_A_MODEL"));
}
#[test]
#[ignore = "requires the native SWIFT library"]
fn default_thread_count_is_passed_through() {
    let before = system::default_max_threads().unwrap();
    system::set_default_max_threads(3).unwrap();
    assert_eq!(system::default_max_threads().unwrap(), 3);
    system::set_default_max_threads(before).unwrap();
}
#[test]
#[ignore = "requires the native SWIFT library"]
fn native_errors_surface_as_results() {
    let sim = test_catchment();
    let err = sim.state_value("subarea.nope.x1").unwrap_err();
    assert!(matches!(err, SwiftError::Native(_)));
    // The slot is cleared: the next valid call succeeds.
    assert_eq!(sim.num_subareas().unwrap(), 5);
}
#[test]
#[ignore = "requires the native SWIFT library"]
fn fixture_split_on_the_engine() {
    let sim = test_catchment();
    let cuts = [SplitElement::upstream("node.n4"), SplitElement::upstream("node.n2")];
    let split = sim.split_to_subcatchments(&cuts).unwrap();
    assert_eq!(split.keys().collect::<Vec<_>>(), vec!["node.n4", "node.n2", REMAINDER_KEY]);
    let mut upper = split.get("node.n4").unwrap().node_ids().unwrap();
    upper.sort();
    assert_eq!(upper, vec!["n1", "n3", "n4"]);
    assert_eq!(split.remainder().unwrap().node_ids().unwrap(), vec!["n6"]);
}
