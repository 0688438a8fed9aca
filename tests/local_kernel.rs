// Data-flow tests for the per-site kernel with every collaborator replaced
// by a recording double.

use lattice_kernel_rs::{
    doubles::{StubCollision, StubEquilibrium, StubLattice, StubStreaming},
    Arg, CallRecorder, KernelError, LocalKernel, NodeClass, Simulation, VelocitySet,
};
use nalgebra::{DMatrix, DVector};

const SITES: usize = 12;
const TARGET: usize = 3;
/// Neighbor of TARGET along direction 2 under the stub lattice's rule
const SOLID_SITE: usize = 5;

fn populations() -> DMatrix<f64> {
    DMatrix::from_fn(SITES, 9, |s, i| (s * 10 + i) as f64)
}

fn classes() -> Vec<NodeClass> {
    let mut classes = vec![NodeClass::Fluid; SITES];
    classes[SOLID_SITE] = NodeClass::Solid;
    classes
}

fn f_eq() -> DVector<f64> {
    DVector::from_element(9, 0.5)
}

fn delta() -> DVector<f64> {
    DVector::from_fn(9, |i, _| 0.25 * i as f64 - 1.0)
}

fn scenario(recorder: &CallRecorder, map_solid: bool) -> (LocalKernel, Simulation) {
    let mut kernel = LocalKernel::new(
        StubEquilibrium::new(recorder, f_eq()),
        StubCollision::new(recorder, delta()),
    )
    .with_streaming(NodeClass::Fluid, StubStreaming::new(recorder, "stream_fluid"));
    if map_solid {
        kernel = kernel.with_streaming(NodeClass::Solid, StubStreaming::new(recorder, "stream_solid"));
    }

    let lattice = StubLattice::new(recorder, VelocitySet::d2q9(), SITES);
    let simulation = Simulation::new(populations(), classes(), Box::new(lattice)).unwrap();
    (kernel, simulation)
}

fn row(matrix: &DMatrix<f64>, site: usize) -> Vec<f64> {
    matrix.row(site).iter().copied().collect()
}

#[test]
fn test_collaborators_called_once_each_in_order() {
    let recorder = CallRecorder::new();
    let (kernel, mut sim) = scenario(&recorder, true);
    recorder.reset();

    kernel.step_site(&mut sim, TARGET).unwrap();

    let mut expected = vec!["equilibrium", "collision", "direction_count"];
    for direction in 0..9 {
        expected.push("neighbor");
        let neighbor = (TARGET + direction) % SITES;
        expected.push(if neighbor == SOLID_SITE { "stream_solid" } else { "stream_fluid" });
    }
    assert_eq!(recorder.names(), expected);

    assert_eq!(recorder.count("equilibrium"), 1);
    assert_eq!(recorder.count("collision"), 1);
    assert_eq!(recorder.count("direction_count"), 1);
    assert_eq!(recorder.count("neighbor"), 9);
    assert_eq!(recorder.count("stream_solid"), 1);
    assert_eq!(recorder.count("stream_fluid"), 8);
}

#[test]
fn test_collaborators_receive_expected_arguments() {
    let recorder = CallRecorder::new();
    let (kernel, mut sim) = scenario(&recorder, true);
    recorder.reset();
    let original = row(&populations(), TARGET);

    kernel.step_site(&mut sim, TARGET).unwrap();
    let calls = recorder.calls();

    // Both see the populations as they were before the in-place update
    assert_eq!(calls[0].args, vec![Arg::Values(original.clone())]);
    assert_eq!(
        calls[1].args,
        vec![Arg::Values(original), Arg::from(&f_eq())]
    );
    assert!(calls[2].args.is_empty());

    for direction in 0..9 {
        let neighbor_call = &calls[3 + 2 * direction];
        let stream_call = &calls[4 + 2 * direction];
        let neighbor = (TARGET + direction) % SITES;

        assert_eq!(neighbor_call.args, vec![Arg::Site(TARGET), Arg::Direction(direction)]);
        assert_eq!(
            stream_call.args,
            vec![Arg::Site(TARGET), Arg::Site(neighbor), Arg::Direction(direction)]
        );
    }
}

#[test]
fn test_only_target_site_changes_by_collision_output() {
    let recorder = CallRecorder::new();
    let (kernel, mut sim) = scenario(&recorder, true);
    let before = populations();

    kernel.step_site(&mut sim, TARGET).unwrap();

    for site in 0..SITES {
        if site == TARGET {
            continue;
        }
        assert_eq!(row(sim.populations(), site), row(&before, site), "site {} changed", site);
    }

    let expected: Vec<f64> = row(&before, TARGET)
        .iter()
        .zip(delta().iter())
        .map(|(f, d)| f + d)
        .collect();
    assert_eq!(row(sim.populations(), TARGET), expected);

    // The doubles never stream, so the post-streaming buffer is untouched
    assert_eq!(sim.next(), &before);
}

#[test]
fn test_unmapped_neighbor_class_fails_loudly() {
    let recorder = CallRecorder::new();
    let (kernel, mut sim) = scenario(&recorder, false);
    recorder.reset();

    let err = kernel.step_site(&mut sim, TARGET).unwrap_err();
    assert_eq!(
        err,
        KernelError::UnmappedClassification {
            site: TARGET,
            neighbor: SOLID_SITE,
            direction: 2,
            class: NodeClass::Solid,
        }
    );

    // Streaming stopped at the unmapped neighbor rather than skipping it
    let names = recorder.names();
    assert_eq!(names.last(), Some(&"neighbor"));
    assert_eq!(recorder.count("stream_fluid"), 2);
    assert_eq!(recorder.count("neighbor"), 3);
}

#[test]
fn test_reset_isolates_consecutive_scenarios() {
    let recorder = CallRecorder::new();
    let (kernel, mut sim) = scenario(&recorder, true);

    kernel.step_site(&mut sim, TARGET).unwrap();
    let first = recorder.len();
    assert_eq!(first, 3 + 2 * 9);

    recorder.reset();
    kernel.step_site(&mut sim, 0).unwrap();
    assert_eq!(recorder.len(), first);
    assert_eq!(recorder.calls()[3].args, vec![Arg::Site(0), Arg::Direction(0)]);
}
