use tributary_core::{
    ExecuteError, Graph, Node, Port, Value,
    error::PortError,
    node::{Execute, Ports},
    port::PortKey,
};

/// Declares its ports out of identifier order.
#[derive(Debug, Default)]
struct Mix {
    calls: usize,
}

#[derive(Debug)]
struct Twice;

impl Execute for Mix {
    fn name(&self) -> &str {
        "Mix"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::output("sum", 0),
            Port::input("z", 0),
            Port::input("a", 0),
        ]
    }

    fn execute(&mut self, ports: &mut Ports) -> Result<(), ExecuteError> {
        self.calls += 1;
        let z: i64 = ports.read("z")?;
        let a: i64 = ports.read("a")?;
        ports.write("sum", z + a)?;
        Ok(())
    }
}

impl Execute for Twice {
    fn name(&self) -> &str {
        "Twice"
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::input("x", 0), Port::input("x", 1)]
    }

    fn execute(&mut self, _ports: &mut Ports) -> Result<(), ExecuteError> {
        Ok(())
    }
}

#[test]
fn test_declared_ports() {
    let node = Node::new(Mix::default()).unwrap();
    assert_eq!(node.name(), "Mix");
    assert_eq!(node.id(), None);
    assert_eq!(node.ports().len(), 3);
    assert_eq!(node.inputs_len(), 2);
    assert_eq!(node.outputs_len(), 1);
    assert_eq!(node.indegree(), 2);
    assert!(!node.is_visited());
    assert!(!node.is_source_by_shape());
    assert!(!node.is_sink_by_shape());

    let inputs: Vec<_> = node.input_ports().map(Port::id).collect();
    assert_eq!(inputs, vec!["z", "a"]);
    let outputs: Vec<_> = node.output_ports().map(Port::id).collect();
    assert_eq!(outputs, vec!["sum"]);
}

#[test]
fn test_port_lookup() {
    let node = Node::new(Mix::default()).unwrap();
    assert_eq!(node.port(1).unwrap().id(), "z");
    assert_eq!(node.port_by_id("a").unwrap().id(), "a");
    assert!(node.port(3).is_none());
    assert!(node.port_by_id("b").is_none());
    assert_eq!(node.try_port("sum").unwrap().id(), "sum");
    let err = node.try_port(7usize).unwrap_err();
    assert_eq!(err.key, PortKey::Index(7));
    assert_eq!(node.ports().position("a"), Some(2));
}

#[test]
fn test_duplicate_port_rejected() {
    let err = Node::new(Twice).unwrap_err();
    assert_eq!(err, PortError::Duplicate("x".to_string()));

    let mut node = Node::new(Mix::default()).unwrap();
    let err = node.add_port(Port::output("a", 0)).unwrap_err();
    assert_eq!(err, PortError::Duplicate("a".to_string()));
    // A failed add leaves the node untouched.
    assert_eq!(node.ports().len(), 3);
    assert_eq!(node.indegree(), 2);
}

#[test]
fn test_add_port_updates_indegree() {
    let mut node = Node::new(Mix::default()).unwrap();
    assert_eq!(node.add_port(Port::input("extra", 0)).unwrap(), 3);
    assert_eq!(node.indegree(), 3);
    assert_eq!(node.add_port(Port::output("more", 0)).unwrap(), 4);
    assert_eq!(node.indegree(), 3);
    node.reset_state();
    assert_eq!(node.indegree(), node.inputs_len());
}

#[test]
fn test_execute_and_clean() {
    let mut node = Node::new(Mix::default()).unwrap();
    node.port_by_id_mut("z").unwrap().set_value(2);
    node.try_port_mut("a").unwrap().set_value(5);
    node.execute().unwrap();
    assert_eq!(node.port_by_id("sum").unwrap().value(), &Value::Int(7));
    assert!(node.ports().iter().all(Port::is_dirty));

    node.clean();
    assert!(node.ports().iter().all(|p| !p.is_dirty()));
    // Values survive a clean.
    assert_eq!(node.port_by_id("sum").unwrap().value(), &Value::Int(7));
    assert_eq!(node.kind_as::<Mix>().unwrap().calls, 1);
}

#[test]
fn test_execute_error() {
    let mut node = Node::new(Mix::default()).unwrap();
    node.port_by_id_mut("a").unwrap().set_value(true);
    let err = node.execute().unwrap_err();
    assert!(matches!(err, ExecuteError::TypeMismatch(_)));
    assert_eq!(err.to_string(), "type mismatch: expected int, found bool");
}

#[test]
fn test_kind_downcast() {
    let mut node = Node::new(Mix::default()).unwrap();
    assert!(node.kind_as::<Twice>().is_none());
    node.kind_as_mut::<Mix>().unwrap().calls = 10;
    node.execute().unwrap();
    assert_eq!(node.kind_as::<Mix>().unwrap().calls, 11);
    assert_eq!(node.kind().name(), "Mix");
}

#[test]
fn test_with_name() {
    let mut node = Node::new(Mix::default()).unwrap().with_name("mixer");
    assert_eq!(node.name(), "mixer");
    node.set_name("other");
    assert_eq!(node.name(), "other");
    assert_eq!(node.kind().name(), "Mix");
}

#[test]
fn test_id_and_owner_assigned_by_graph() {
    let mut g = Graph::new();
    let id = g.add_node(Node::new(Mix::default()).unwrap());
    let node = g.node(id).unwrap();
    assert_eq!(node.id(), Some(id));
    assert!(node.ports().iter().all(|p| p.owner() == Some(id)));

    let node = g.remove_node(id).unwrap();
    assert_eq!(node.id(), None);
    assert!(node.ports().iter().all(|p| p.owner().is_none()));

    // Ports added later pick up the node's current owner.
    let id = g.add_node(node);
    let node = g.node_mut(id).unwrap();
    let ix = node.add_port(Port::input("late", 0)).unwrap();
    assert_eq!(node.port(ix).unwrap().owner(), Some(id));
}

#[test]
fn test_source_and_sink_shape() {
    #[derive(Debug)]
    struct Empty;
    impl Execute for Empty {
        fn name(&self) -> &str {
            "Empty"
        }
        fn execute(&mut self, _ports: &mut Ports) -> Result<(), ExecuteError> {
            Err("nothing to do".into())
        }
    }

    let mut node = Node::new(Empty).unwrap();
    assert!(node.is_source_by_shape());
    assert!(node.is_sink_by_shape());
    assert!(!node.has_linked_inputs());
    assert_eq!(
        node.execute().unwrap_err(),
        ExecuteError::Custom("nothing to do".to_string())
    );
}
