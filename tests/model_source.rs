use fea_post::prelude::*;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

const STRIP: &str = r#"{
    "nodes": [
        { "id": 1, "coords": [0.0, 0.0, 0.0] },
        { "id": 2, "coords": [1.0, 0.0, 0.0] },
        { "id": 3, "coords": [2.0, 0.0, 0.0] },
        { "id": 4, "coords": [0.0, 1.0, 0.0] },
        { "id": 5, "coords": [1.0, 1.0, 0.0] },
        { "id": 6, "coords": [2.0, 1.0, 0.0] }
    ],
    "elements": [
        { "id": 101, "type_name": "CQUAD4", "property_id": 10, "node_ids": [1, 2, 5, 4] },
        { "id": 102, "type_name": "CTRIA3", "property_id": 10, "node_ids": [2, 3, 6] },
        { "id": 103, "type_name": "CTRIA3", "property_id": 10, "node_ids": [2, 6, 5] }
    ],
    "materials": [
        { "id": 1, "card": "MAT1", "data": { "E": 2.1e11, "NU": 0.3, "RHO": 7850.0 } }
    ],
    "properties": [
        { "id": 10, "card": "PSHELL", "data": { "MID1": 1, "T": 0.005 } }
    ],
    "results": [
        {
            "id": "Subcase 1->Static->Stress",
            "table": [
                { "element_id": 101, "components": [1.0, 2.0, 0.0, 0.5, 0.0, 0.0] },
                { "element_id": 101, "node_id": 1, "components": [1.0, 0.0, 0.0, 0.0, 0.0, 0.0] }
            ]
        }
    ]
}"#;

#[test]
fn builds_model_from_json_source() {
    init_logger();
    let source = MemorySource::from_json(STRIP).unwrap();
    assert!(source.is_valid());
    assert_eq!(source.all_element_ids(), vec![101, 102, 103]);

    let model = Model::create_by_source(&source, default_kernel(), ModelOptions::default()).unwrap();
    assert_eq!(model.nodes().len(), 6);
    assert_eq!(model.elements().len(), 3);
    assert_eq!(model.results().len(), 1);

    // Node 2 is shared by all three elements
    assert_eq!(model.node(2).unwrap().parent_element_ids(), &[101, 102, 103]);
    assert_eq!(model.element(102).unwrap().kind(), ElementKind::Tria3);

    let material = model.element_material(101).unwrap();
    assert_eq!(material.kind(), MaterialKind::Isotropic);
    assert_eq!(model.element_property(103).unwrap().thickness(), Some(0.005));

    let id = ResultId::parse("Subcase 1->Static->Stress");
    assert_eq!(id.result_name(), Some("Stress"));
    assert_eq!(model.stress_in_element(&id, 101).unwrap().yy(), 2.0);
    assert_eq!(model.stress_in_node(&id, 1).unwrap().xx(), 1.0);
}

#[test]
fn locates_points_in_mixed_mesh() {
    init_logger();
    let source = MemorySource::from_json(STRIP).unwrap();
    let model = Model::create_by_source(&source, default_kernel(), ModelOptions::default()).unwrap();

    assert_eq!(model.element_id_from_point(&Vec3::new(0.5, 0.5, 0.0)).unwrap(), Some(101));
    assert_eq!(model.element_id_from_point(&Vec3::new(1.8, 0.3, 0.0)).unwrap(), Some(102));
    assert_eq!(model.element_id_from_point(&Vec3::new(1.2, 0.8, 0.0)).unwrap(), Some(103));
    assert_eq!(model.element_id_from_point(&Vec3::new(2.5, 0.5, 0.0)).unwrap(), None);
}

#[test]
fn json_round_trip_preserves_source() {
    let source = MemorySource::from_json(STRIP).unwrap();
    let again = MemorySource::from_json(&source.to_json().unwrap()).unwrap();
    assert_eq!(source, again);
}

#[test]
fn invalid_source_is_rejected() {
    init_logger();
    let err = Model::create_by_source(&MemorySource::new(), default_kernel(), ModelOptions::default())
        .unwrap_err();
    assert!(matches!(err, KernelError::SourceUnavailable(_)));
    assert!(err.is_collaborator_failure());
}

#[test]
fn unknown_element_type_fails_construction() {
    init_logger();
    let mut source = MemorySource::from_json(STRIP).unwrap();
    source.add_element(ElementRecord::new(104, "CHEXA", 10, vec![1, 2, 3, 4, 5, 6]));

    let err = Model::create_by_source(&source, default_kernel(), ModelOptions::default()).unwrap_err();
    assert!(matches!(err, KernelError::UnknownElementType(name) if name == "CHEXA"));
}

#[test]
fn dangling_connectivity_fails_linking() {
    init_logger();
    let mut source = MemorySource::from_json(STRIP).unwrap();
    source.add_element(ElementRecord::new(104, "CTRIA3", 10, vec![3, 6, 99]));

    let err = Model::create_by_source(&source, default_kernel(), ModelOptions::default()).unwrap_err();
    match err {
        KernelError::LinkFailed { failed, total, first } => {
            assert_eq!(failed, 1);
            assert_eq!(total, 10);
            assert!(matches!(*first, KernelError::NodeNotFound(99)));
        }
        other => panic!("unexpected error {other:?}"),
    }
}
