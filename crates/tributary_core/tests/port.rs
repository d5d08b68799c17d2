use tributary_core::{
    Kind, Port, PortKey, PortRef, TypeMismatch, Value,
    node,
    port::{Addr, Direction},
};

#[test]
fn test_new_port() {
    let port = Port::input("num1", 3);
    assert_eq!(port.id(), "num1");
    assert_eq!(port.direction(), Direction::Input);
    assert!(port.is_input());
    assert!(!port.is_output());
    assert_eq!(port.value(), &Value::Int(3));
    assert_eq!(port.default_value(), &Value::Int(3));
    assert!(!port.is_dirty());
    assert!(port.is_unlinked());
    assert!(port.owner().is_none());
}

#[test]
fn test_set_value_marks_dirty() {
    let mut port = Port::output("output", Value::Nil);
    port.set_value("hello");
    assert!(port.is_dirty());
    assert_eq!(port.value(), &Value::Text("hello".to_string()));
    // Reading leaves the flag alone.
    assert_eq!(port.read::<String>().unwrap(), "hello");
    assert!(port.is_dirty());
    port.set_dirty(false);
    assert!(!port.is_dirty());
}

#[test]
fn test_read_does_not_coerce() {
    let port = Port::input("x", 1);
    assert_eq!(port.read::<i64>(), Ok(1));
    assert_eq!(
        port.read::<f64>(),
        Err(TypeMismatch::new(Kind::Float, Kind::Int))
    );

    let port = Port::input("y", 1.5);
    assert_eq!(port.read::<f64>(), Ok(1.5));
    assert!(port.read::<i64>().is_err());
}

#[test]
fn test_reset_restores_default() {
    let mut port = Port::input("x", 1);
    port.set_value(9);
    port.reset();
    assert_eq!(port.value(), &Value::Int(1));
    // Only the value is restored.
    assert!(port.is_dirty());

    port.set_default_value(false);
    port.reset();
    assert_eq!(port.value(), &Value::Bool(false));
}

#[test]
fn test_port_refs() {
    let id = node::Id::new(3);
    let by_id: PortRef = (id, "num2").into();
    assert_eq!(by_id.node, id);
    assert_eq!(by_id.port, PortKey::Id("num2".to_string()));

    let by_ix: PortRef = Addr::new(id, 1).into();
    assert_eq!(by_ix, PortRef::new(id, 1usize));
    assert_eq!(by_ix.port.to_string(), "index 1");
    assert_eq!(PortKey::from("out").to_string(), "id `out`");
}
