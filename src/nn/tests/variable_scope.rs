use crate::assert_err;
use crate::nn::{Graph, GraphError, Init};
use crate::tensor::Tensor;

#[test]
fn test_scoped_names() {
    let graph = Graph::new();
    assert_eq!(graph.current_scope(), "");

    let w = graph
        .variable_scope("block1", |g| {
            assert_eq!(g.current_scope(), "block1");
            g.variable_scope("conv1", |g| {
                assert_eq!(g.current_scope(), "block1/conv1");
                g.get_variable("weights", &[3, 3, 1, 4], &Init::Zeros)
            })
        })
        .unwrap();

    assert_eq!(w.name().unwrap(), "block1/conv1/weights");
    assert_eq!(graph.current_scope(), "");
}

#[test]
fn test_get_variable_reuses_matching_declaration() {
    let graph = Graph::new_with_seed(7);
    let a = graph
        .variable_scope("fc", |g| g.get_variable("weights", &[4, 2], &Init::Xavier))
        .unwrap();
    let b = graph
        .variable_scope("fc", |g| g.get_variable("weights", &[4, 2], &Init::Xavier))
        .unwrap();
    assert_eq!(a.node_id(), b.node_id());
    assert_eq!(graph.trainable_variables(), vec![("fc/weights".to_string(), vec![4, 2])]);
}

#[test]
fn test_get_variable_conflicts() {
    let graph = Graph::new();
    graph.get_variable("w", &[2, 2], &Init::Ones).unwrap();

    assert_err!(
        graph.get_variable("w", &[2, 3], &Init::Ones),
        GraphError::ParameterConflict(msg) if msg.contains("[2, 2]") && msg.contains("[2, 3]")
    );
    assert_err!(
        graph.get_variable("w", &[2, 2], &Init::Zeros),
        GraphError::ParameterConflict(msg) if msg.contains("Ones") && msg.contains("Zeros")
    );
}

#[test]
fn test_get_variable_rejects_empty_dims() {
    let graph = Graph::new();
    assert_err!(
        graph.get_variable("w", &[0, 2], &Init::Ones),
        GraphError::InvalidOperation(_)
    );
    assert_err!(
        graph.get_variable("b", &[], &Init::Ones),
        GraphError::InvalidOperation(_)
    );
}

#[test]
fn test_initial_values() {
    let graph = Graph::new();
    let c = graph.get_variable("c", &[3], &Init::Constant(0.5)).unwrap();
    assert_eq!(c.value().unwrap().unwrap().to_vec(), vec![0.5; 3]);
    let o = graph.parameter(&[2], Init::Ones, "o").unwrap();
    assert_eq!(o.value().unwrap().unwrap().to_vec(), vec![1.0; 2]);
}

#[test]
fn test_seeded_graphs_are_reproducible() {
    let init = Init::Normal {
        mean: 0.0,
        std: 1.0,
    };
    let values = |seed: u64| {
        let graph = Graph::new_with_seed(seed);
        let w = graph.get_variable("w", &[8], &init).unwrap();
        w.value().unwrap().unwrap()
    };
    assert_eq!(values(42), values(42));
    assert_ne!(values(42), values(43));
}

#[test]
fn test_invalid_scope_names() {
    let graph = Graph::new();
    for name in ["", "a//b", "/a", "a/"] {
        assert_err!(
            graph.variable_scope(name, |_| Ok(())),
            GraphError::InvalidOperation(_)
        );
    }
    assert_eq!(graph.current_scope(), "");
}

#[test]
fn test_scope_restored_after_error() {
    let graph = Graph::new();
    let result: Result<(), GraphError> = graph.variable_scope("broken", |g| {
        g.get_variable("w", &[0], &Init::Zeros)?;
        Ok(())
    });
    assert_err!(result, GraphError::InvalidOperation(_));
    assert_eq!(graph.current_scope(), "");
}

#[test]
fn test_parameter_value_shape_is_fixed() {
    let graph = Graph::new();
    let w = graph.get_variable("w", &[2], &Init::Zeros).unwrap();
    w.set_value(&Tensor::new(&[1.0, 2.0], &[2])).unwrap();
    assert_eq!(w.value().unwrap().unwrap().to_vec(), vec![1.0, 2.0]);
    assert_err!(
        w.set_value(&Tensor::zeros(&[3])),
        GraphError::ShapeMismatch { .. }
    );
}

#[test]
fn test_unique_scope_name() {
    let graph = Graph::new();
    assert_eq!(graph.inner().unique_scope_name("BatchNorm"), "BatchNorm");
    graph
        .variable_scope("BatchNorm", |g| g.get_variable("beta", &[1], &Init::Zeros))
        .unwrap();
    assert_eq!(graph.inner().unique_scope_name("BatchNorm"), "BatchNorm_1");
    // 只是前缀相同的名字不算占用
    assert_eq!(graph.inner().unique_scope_name("Batch"), "Batch");
}

#[test]
fn test_get_variable_rejects_non_finite_init() {
    let graph = Graph::new_with_seed(1);
    for init in [
        Init::Uniform { low: f32::NEG_INFINITY, high: 0.0 },
        Init::Uniform { low: 0.0, high: f32::NAN },
        Init::Normal { mean: f32::NAN, std: 1.0 },
        Init::Normal { mean: 0.0, std: f32::INFINITY },
        Init::Constant(f32::INFINITY),
    ] {
        assert_err!(
            graph.get_variable("w", &[2], &init),
            GraphError::InvalidOperation(msg) if msg.contains("必须是有限值")
        );
    }
    assert!(graph.trainable_variables().is_empty());

    // 有限参数照常创建
    let w = graph
        .get_variable("w", &[2], &Init::Uniform { low: -1.0, high: 1.0 })
        .unwrap();
    assert!(w.value().unwrap().unwrap().to_vec().iter().all(|v| (-1.0..1.0).contains(v)));
}

#[test]
fn test_init_validate() {
    assert!(Init::Kaiming.validate().is_ok());
    assert!(Init::Normal { mean: 0.0, std: 0.01 }.validate().is_ok());
    assert_err!(
        Init::Constant(f32::NAN).validate(),
        GraphError::InvalidOperation(_)
    );
}
