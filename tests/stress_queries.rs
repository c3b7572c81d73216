use std::sync::Arc;

use approx::assert_relative_eq;
use fea_post::geometry::Intersection;
use fea_post::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn stress_id() -> ResultId {
    ResultId::from_names("Subcase 1", "Static", "Stress")
}

/// Unit right triangle carrying the linear field `xx = 10 x + 20 y`
fn triangle_source() -> MemorySource {
    let mut source = MemorySource::new();
    source
        .add_node(1, Vec3::new(0.0, 0.0, 0.0))
        .add_node(2, Vec3::new(1.0, 0.0, 0.0))
        .add_node(3, Vec3::new(0.0, 1.0, 0.0))
        .add_element(ElementRecord::new(7, "CTRIA3", 1, vec![1, 2, 3]));

    let table = ResultTable::new(vec![
        ResultRow::corner(7, 1, [0.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        ResultRow::corner(7, 2, [10.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        ResultRow::corner(7, 3, [20.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        ResultRow::element(7, [10.0, 1.0, 0.0, 0.5, 0.0, 0.0]),
    ]);
    source.add_result(ResultEntry::new(stress_id(), table));
    source
}

fn build(source: &MemorySource) -> Model {
    Model::create_by_source(source, default_kernel(), ModelOptions::default()).unwrap()
}

#[test]
fn no_results_gives_no_stress() {
    init_logger();
    let mut source = triangle_source();
    source.results.clear();
    let model = build(&source);

    assert!(model.results().is_empty());
    assert!(model.stress_in_node(&stress_id(), 1).is_none());
    assert!(model.stress_in_element(&stress_id(), 7).is_none());
    assert!(model
        .stress_in_point(&stress_id(), &Vec3::new(0.2, 0.2, 0.0))
        .unwrap()
        .is_none());
}

#[test]
fn node_and_element_rows() {
    init_logger();
    let model = build(&triangle_source());

    let at_node = model.stress_in_node(&stress_id(), 2).unwrap();
    assert_eq!(at_node.xx(), 10.0);
    assert_eq!(at_node.matrix()[(1, 1)], 1.0);

    let centre = model.stress_in_element(&stress_id(), 7).unwrap();
    assert_eq!(centre.xy(), 0.5);
    assert_eq!(centre.matrix()[(0, 1)], centre.matrix()[(1, 0)]);

    assert!(model.stress_in_node(&stress_id(), 42).is_none());
    assert!(model.stress_in_element(&stress_id(), 42).is_none());
}

#[test]
fn nodal_stresses_follow_corner_order() {
    init_logger();
    let model = build(&triangle_source());
    let nodal = model.nodal_stresses_of_element(&stress_id(), 7).unwrap();
    let xx: Vec<f64> = nodal.iter().map(|t| t.xx()).collect();
    assert_eq!(xx, vec![0.0, 10.0, 20.0]);
}

#[test]
fn linear_field_interpolates_exactly() {
    init_logger();
    let model = build(&triangle_source());

    for &(x, y) in &[(0.5, 0.25), (0.1, 0.1), (0.0, 1.0), (1.0 / 3.0, 1.0 / 3.0)] {
        let stress = model
            .stress_in_point(&stress_id(), &Vec3::new(x, y, 0.0))
            .unwrap()
            .unwrap();
        assert_eq!(stress.element_id, 7);
        assert_relative_eq!(stress.tensor.xx(), 10.0 * x + 20.0 * y, epsilon = 1e-7);
        assert_relative_eq!(stress.tensor.yy(), 1.0, epsilon = 1e-7);
    }
}

#[test]
fn interpolation_is_frame_independent() {
    init_logger();
    let source = triangle_source();
    let local = build(&source);
    let global =
        Model::create_by_source(&source, default_kernel(), ModelOptions::global_frame()).unwrap();

    let p = Vec3::new(0.3, 0.45, 0.0);
    let a = local.stress_in_point(&stress_id(), &p).unwrap().unwrap();
    let b = global.stress_in_point(&stress_id(), &p).unwrap().unwrap();
    assert_relative_eq!(a.tensor.xx(), b.tensor.xx(), epsilon = 1e-9);
}

#[test]
fn von_mises_of_recovered_stress() {
    init_logger();
    let model = build(&triangle_source());
    let t = model.stress_in_node(&stress_id(), 3).unwrap();
    // Plane stress: sqrt(sx^2 - sx*sy + sy^2)
    let expected = (20.0_f64.powi(2) - 20.0 + 1.0).sqrt();
    assert_relative_eq!(t.von_mises(), expected, epsilon = 1e-9);
}

/// One element with the given corners and corner `xx` values
fn element_with_field(type_name: &str, corners: &[(f64, f64)], xx: &[f64]) -> MemorySource {
    let mut source = MemorySource::new();
    for (k, &(x, y)) in corners.iter().enumerate() {
        source.add_node(k + 1, Vec3::new(x, y, 0.0));
    }
    source.add_element(ElementRecord::new(1, type_name, 1, (1..=corners.len()).collect()));

    let rows = xx
        .iter()
        .enumerate()
        .map(|(k, &v)| ResultRow::corner(1, k + 1, [v, 0.0, 0.0, 0.0, 0.0, 0.0]))
        .collect();
    source.add_result(ResultEntry::new(stress_id(), ResultTable::new(rows)));
    source
}

#[test]
fn point_just_outside_hypotenuse_interpolates() {
    init_logger();
    // xx = 10 x + 20 y
    let source = element_with_field("CTRIA3", &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)], &[0.0, 10.0, 30.0]);
    let p = Vec3::new(0.5 - 3e-7, 0.5 + 3e-7, 0.0);

    for options in [ModelOptions::default(), ModelOptions::global_frame()] {
        let model = Model::create_by_source(&source, default_kernel(), options).unwrap();
        assert_eq!(model.element_id_from_point(&p).unwrap(), Some(1));

        let stress = model.stress_in_point(&stress_id(), &p).unwrap().unwrap();
        assert!(TRIA3.is_in_domain(&stress.natural));
        assert_relative_eq!(stress.natural.sum(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(stress.tensor.xx(), 15.0, epsilon = 1e-4);
    }
}

#[test]
fn point_just_outside_slanted_quad_edge_interpolates() {
    init_logger();
    let source = element_with_field(
        "CQUAD4",
        &[(0.0, 0.0), (4.0, 0.0), (3.0, 4.0), (0.0, 4.0)],
        &[0.0, 10.0, 30.0, 20.0],
    );
    let model = build(&source);

    // Midpoint of the edge from node 2 to node 3, pushed along its outward normal
    let normal = Vec3::new(4.0, 1.0, 0.0).normalize();
    let p = Vec3::new(3.5, 2.0, 0.0) + normal * 5e-7;

    assert!(model.element(1).unwrap().is_point_belong(&p).unwrap());
    let stress = model.stress_in_point(&stress_id(), &p).unwrap().unwrap();
    assert_eq!(stress.natural.x, 1.0);
    assert_relative_eq!(stress.natural.y, 0.0, epsilon = 1e-6);
    // Average of nodes 2 and 3
    assert_relative_eq!(stress.tensor.xx(), 20.0, epsilon = 1e-4);
    assert!(!stress.tensor.contains_nan());
}

/// Accepts every point as inside, leaving the round trip as the only check
#[derive(Debug, Default)]
struct AcceptAllKernel(NativeKernel);

impl GeometryKernel for AcceptAllKernel {
    fn aabb(&self, points: &[Vec3]) -> KernelResult<BoundingBox> {
        self.0.aabb(points)
    }

    fn oriented_box(&self, points: &[Vec3]) -> KernelResult<BoundingBox> {
        self.0.oriented_box(points)
    }

    fn classify_point(&self, _point: &Vec3, _grid: &[Vec3]) -> KernelResult<LocationType> {
        Ok(LocationType::Cell)
    }

    fn intersect_segments(&self, a1: &Vec3, a2: &Vec3, b1: &Vec3, b2: &Vec3) -> KernelResult<Intersection> {
        self.0.intersect_segments(a1, a2, b1, b2)
    }

    fn intersect_lines(&self, a1: &Vec3, a2: &Vec3, b1: &Vec3, b2: &Vec3) -> KernelResult<Intersection> {
        self.0.intersect_lines(a1, a2, b1, b2)
    }

    fn transform_point(
        &self,
        point: &Vec3,
        source: &CoordinateSystem,
        target: &CoordinateSystem,
    ) -> KernelResult<Vec3> {
        self.0.transform_point(point, source, target)
    }
}

#[test]
fn failed_round_trip_is_reported() {
    init_logger();
    let source = element_with_field(
        "CQUAD4",
        &[(0.0, 0.0), (4.0, 0.0), (3.0, 4.0), (0.0, 4.0)],
        &[0.0, 10.0, 30.0, 20.0],
    );
    let kernel: SharedKernel = Arc::new(AcceptAllKernel::default());
    let model = Model::create_by_source(&source, kernel, ModelOptions::default()).unwrap();

    // Inside the bounding box, well past the slanted edge
    let p = Vec3::new(3.9, 3.9, 0.0);
    let element = model.element(1).unwrap();
    assert!(element.is_point_belong(&p).unwrap());

    for local in [true, false] {
        match element.natural_coords_of_point(&p, local) {
            Err(KernelError::InvalidNaturalCoordinates { element, error }) => {
                assert_eq!(element, 1);
                assert!(error > model.options().natural_tolerance, "error {error}");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    assert!(matches!(
        model.stress_in_point(&stress_id(), &p),
        Err(KernelError::InvalidNaturalCoordinates { element: 1, .. })
    ));
}
