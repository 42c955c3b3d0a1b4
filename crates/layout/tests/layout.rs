use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing_test::traced_test;
use visgraph_layout::*;

fn cycle(n: usize) -> Topology {
    Topology::new(n, (0..n).map(|i| (i, (i + 1) % n)).collect())
}

fn planar_engine(topology: &Topology, seed: u64) -> PlanarEngine {
    LayoutEngine::new(LayoutConfig::planar(300.0, 300.0).with_seed(seed), topology).unwrap()
}

fn in_bounds<const D: usize>(engine: &LayoutEngine<D>) -> bool {
    let lo = engine.config().viewport.lower::<D>();
    let hi = engine.config().viewport.upper::<D>();
    engine
        .positions()
        .iter()
        .all(|p| (0..D).all(|i| p[i] >= lo[i] && p[i] <= hi[i]))
}

#[test]
fn test_four_cycle_single_step() {
    let mut engine = planar_engine(&cycle(4), 42);
    // four edges over four vertices
    let expected_k = (90000.0f64 / 4.0 / 40.0).sqrt();
    assert!((engine.layout_constant() - expected_k).abs() < 1e-12);
    assert_eq!(engine.area(), 90000.0);

    // Where attraction alone would carry each vertex this step.
    let mut attracted = engine.graph().clone();
    attracted.reset_displacements();
    ForceModel::default().attractive_forces(&mut attracted, expected_k);
    let predicted: Vec<Vector2> = attracted
        .vertices
        .iter()
        .map(|v| v.position + vector::bounded_step(&v.disp, engine.temperature()).unwrap())
        .collect();

    engine.step();

    let positions = engine.positions();
    for p in &positions {
        assert!(p.iter().all(|c| c.is_finite()));
    }
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let distance = (positions[i] - positions[j]).norm();
            assert!(distance > 1.0, "{i} and {j} collapsed");
            assert!(
                distance < (predicted[i] - predicted[j]).norm(),
                "{i} and {j} spread beyond the attraction-only prediction"
            );
        }
    }
    assert!(in_bounds(&engine));
    assert_eq!(engine.step_count(), 2);
}

#[test]
fn test_attraction_sums_to_zero() {
    let engine = planar_engine(
        &Topology::new(5, vec![(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 2)]),
        1,
    );
    let mut graph = engine.graph().clone();
    let model = ForceModel::default();
    graph.reset_displacements();
    model.attractive_forces(&mut graph, engine.layout_constant());
    let total: Vector2 = graph.vertices.iter().map(|v| v.disp).sum();
    assert!(total.norm() < 1e-6, "{total:?}");
}

#[test]
fn test_fixed_vertex_survives_stabilization() {
    let mut engine = planar_engine(&cycle(4), 3);
    let start = engine.positions();
    engine.fix(0).unwrap();
    let steps = engine.run(StopCondition::Steps(50));
    assert_eq!(steps, 50);

    let end = engine.positions();
    assert_eq!(end[0], start[0]);
    for i in 1..4 {
        assert_ne!(end[i], start[i], "vertex {i} never moved");
    }
    assert_eq!(engine.snapshot().fixed_vertices().count(), 1);
}

#[test]
fn test_reload_discards_state() {
    let mut engine = planar_engine(&cycle(4), 8);
    let initial = engine.positions();
    engine.fix(2).unwrap();
    engine.run(StopCondition::Steps(25));
    assert!(engine.step_count() > 1);

    engine.load_graph(&Topology::new(4, vec![(0, 2), (1, 3)])).unwrap();
    assert_eq!(engine.step_count(), 1);
    assert_eq!(engine.state(), RunState::Idle);
    assert!(!engine.is_fixed(2).unwrap());
    assert_eq!(engine.positions(), initial);
    assert_eq!(engine.graph().edge_count(), 2);
}

#[test]
fn test_failed_reload_keeps_graph() {
    let mut engine = planar_engine(&cycle(4), 8);
    engine.run(StopCondition::Steps(5));
    let before = engine.positions();

    let err = engine.load_graph(&Topology::new(3, vec![(0, 3)])).unwrap_err();
    assert!(matches!(err, LayoutError::VertexOutOfRange { vertex: 3, .. }));
    assert_eq!(engine.positions(), before);
    assert_eq!(engine.step_count(), 6);

    assert!(matches!(
        PlanarEngine::new(LayoutConfig::default(), &Topology::new(0, vec![])),
        Err(LayoutError::EmptyGraph)
    ));
}

#[test]
fn test_zero_convergence_threshold_is_rejected() {
    let mut config = LayoutConfig::planar(300.0, 300.0);
    config.forces.convergence_temperature = 0.0;
    assert!(matches!(
        PlanarEngine::new(config, &cycle(4)),
        Err(LayoutError::InvalidForceParams(_))
    ));

    let config: LayoutConfig =
        serde_json::from_str(r#"{ "forces": { "convergence_temperature": -1.0 } }"#).unwrap();
    assert!(SpatialEngine::new(config, &cycle(4)).is_err());
}

#[test]
fn test_temperature_strictly_decreases() {
    let mut engine = planar_engine(&cycle(6), 4);
    let mut last = engine.temperature();
    for _ in 0..100 {
        engine.step();
        let t = engine.temperature();
        assert!(t < last);
        last = t;
    }
}

#[test]
fn test_final_move_terminates() {
    let mut engine = planar_engine(&cycle(5), 12);
    let steps = engine.final_move();
    // 300 / step > 1 holds for steps 1..=299
    assert_eq!(steps, 299);
    assert!(engine.temperature() <= 1.0);
    assert!(in_bounds(&engine));

    let mut lonely = planar_engine(&Topology::new(1, vec![]), 12);
    assert_eq!(lonely.final_move(), 299);
}

#[test]
fn test_tick_state_machine() {
    let mut engine = planar_engine(&cycle(3), 6);
    assert!(!engine.tick());
    assert_eq!(engine.step_count(), 1);

    engine.stabilize();
    assert!(engine.tick());
    assert_eq!(engine.state(), RunState::Stepping);

    engine.stop();
    assert!(!engine.tick());
    assert_eq!(engine.state(), RunState::Idle);

    let steps = engine.run(StopCondition::UntilConverged);
    assert_eq!(engine.state(), RunState::Converged);
    assert!(steps > 0);

    engine.stabilize();
    assert!(!engine.tick());
    assert_eq!(engine.state(), RunState::Converged);
}

#[test]
fn test_ticks_without_auto_stop_keep_going() {
    let mut config = LayoutConfig::planar(50.0, 50.0).with_seed(1);
    config.auto_stop = false;
    let mut engine = LayoutEngine::<2>::new(config, &cycle(3)).unwrap();
    engine.stabilize();
    for _ in 0..100 {
        assert!(engine.tick());
    }
    assert!(engine.temperature() < 1.0);
    assert_eq!(engine.state(), RunState::Stepping);
}

#[test]
fn test_run_while_external_stop_signal() {
    let mut engine = planar_engine(&cycle(4), 21);
    let stop = Arc::new(AtomicBool::new(false));
    let signal = Arc::clone(&stop);
    let steps = engine.run_while(|e| {
        if e.step_count() == 40 {
            signal.store(true, Ordering::Relaxed);
        }
        !stop.load(Ordering::Relaxed)
    });
    assert_eq!(steps, 39);
    assert_eq!(engine.state(), RunState::Stepping);
}

#[test]
#[traced_test]
fn test_convergence_is_logged() {
    let mut engine = planar_engine(&cycle(3), 2);
    engine.run_while(|_| true);
    assert_eq!(engine.state(), RunState::Converged);
    assert!(logs_contain("layout converged"));
}

#[test]
fn test_hidden_edges_still_attract() {
    let mut shown = planar_engine(&cycle(4), 77);
    let mut hidden = planar_engine(&cycle(4), 77);
    hidden.set_all_edges_hidden(true);
    assert_eq!(hidden.snapshot().visible_edges().count(), 0);

    shown.run(StopCondition::Steps(10));
    hidden.run(StopCondition::Steps(10));
    assert_eq!(shown.positions(), hidden.positions());

    hidden.load_graph(&cycle(5)).unwrap();
    assert!(hidden.snapshot().edges.iter().all(|e| e.hidden));

    hidden.set_edge_hidden(0, false).unwrap();
    assert_eq!(hidden.snapshot().visible_edges().count(), 1);
    assert!(hidden.set_edge_hidden(9, false).is_err());
}

#[test]
fn test_snapshot_shape() {
    let topology = cycle(3).with_labels(vec!["a".into(), "b".into(), "c".into()]);
    let mut engine = planar_engine(&topology, 0);
    engine.fix(1).unwrap();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.vertices.len(), 3);
    assert_eq!(snapshot.edges[2].from, 2);
    assert_eq!(snapshot.edges[2].to, 0);
    assert_eq!(snapshot.vertices[1].label.as_deref(), Some("b"));
    assert!(snapshot.vertices[1].fixed);
    assert_eq!(snapshot.vertices[0].position.len(), 2);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["state"], "idle");
    assert_eq!(json["vertices"][2]["label"], "c");
}

#[test]
fn test_spatial_layout_converges_in_bounds() {
    let topology = Topology::new(6, vec![(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (0, 3)]);
    let mut engine = SpatialEngine::new(LayoutConfig::spatial(500.0).with_seed(17), &topology).unwrap();
    let steps = engine.final_move();
    // extent is the cube height, 400
    assert_eq!(steps, 399);
    assert!(in_bounds(&engine));

    let positions = engine.positions();
    let depths: Vec<f64> = positions.iter().map(|p| p.z).collect();
    assert!(depths.iter().any(|&z| (z - depths[0]).abs() > 1e-6), "layout stayed flat");

    let centroid = positions.iter().sum::<Vector3>() / positions.len() as f64;
    let center = engine.config().viewport.center::<3>();
    assert!((centroid - center).norm() < 100.0);
}

#[test]
fn test_drag_rotation() {
    let mut engine = SpatialEngine::new(LayoutConfig::spatial(500.0).with_seed(4), &cycle(5)).unwrap();
    assert!(!engine.rotate_by_drag(Vector2::new(10.0, 0.0)));

    engine.run(StopCondition::Steps(20));
    let before = engine.positions();
    let pivot = engine.config().viewport.center::<3>();

    engine.begin_rotation();
    assert_eq!(engine.state(), RunState::Idle);
    assert!(!engine.tick());

    assert!(engine.rotate_by_drag(Vector2::new(30.0, 45.0)));
    let first = engine.positions();
    assert!(engine.rotate_by_drag(Vector2::new(60.0, 10.0)));
    assert!(engine.rotate_by_drag(Vector2::new(30.0, 45.0)));
    assert_eq!(engine.positions(), first);

    for (a, b) in before.iter().zip(&first) {
        assert!(((a - pivot).norm() - (b - pivot).norm()).abs() < 1e-9);
    }

    assert!(engine.rotate_by_drag(Vector2::zeros()));
    for (a, b) in before.iter().zip(engine.positions().iter()) {
        assert!((a - b).norm() < 1e-9);
    }

    engine.end_rotation();
    assert_eq!(engine.state(), RunState::Stepping);
    assert!(engine.tick());
}

#[test]
fn test_rotated_then_pinned_vertex_is_clamped() {
    let mut engine =
        SpatialEngine::new(LayoutConfig::spatial(500.0).with_seed(6), &cycle(4)).unwrap();
    let hi = engine.config().viewport.upper::<3>();
    engine.drag_to(0, hi).unwrap();

    // A 45 degree tilt swings the cube corner out through the far face.
    engine.begin_rotation();
    assert!(engine.rotate_by_drag(Vector2::new(0.0, -45.0)));
    engine.end_rotation();
    assert!(!in_bounds(&engine));

    engine.fix(0).unwrap();
    engine.step();
    assert!(in_bounds(&engine), "{:?}", engine.position(0).unwrap());
    assert!(engine.position(0).unwrap()[2] <= hi[2]);
}

#[test]
fn test_spring_relaxation_keeps_anchor() {
    let mut engine = planar_engine(&Topology::new(3, vec![(0, 1), (1, 2)]), 0);
    let anchor = *engine.position(0).unwrap();
    let springs = SpringModel {
        stiffness: 0.3,
        ..Default::default()
    };
    for _ in 0..30 {
        engine.relax_springs(&springs);
    }
    assert_eq!(*engine.position(0).unwrap(), anchor);
    for (a, b) in [(0, 1), (1, 2)] {
        let edge = engine.position(b).unwrap() - engine.position(a).unwrap();
        assert!((edge.norm() - 50.0).abs() < 5.0, "{}", edge.norm());
    }
}

#[test]
fn test_kdl_topology_drives_engine() {
    let topology = parse_kdl(
        r#"
        vertices 4
        edge 0 1
        edge 1 2
        edge 2 3
        label 3 "tail"
        "#,
    )
    .unwrap();
    let mut engine = planar_engine(&topology, 10);
    engine.final_move();
    assert!(in_bounds(&engine));
    assert_eq!(engine.snapshot().vertices[3].label.as_deref(), Some("tail"));
}
