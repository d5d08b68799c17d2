//! The ordered port sequence owned by a node.

use crate::{
    error::{ExecuteError, PortError, PortNotFound},
    port::{Direction, Port, PortKey},
    value::{FromValue, Value},
};
use std::{
    collections::BTreeMap,
    ops::{Index, IndexMut},
};

/// An ordered sequence of uniquely identified ports.
///
/// Positional order is insertion order. Lookup by identifier goes through a
/// map kept alongside the sequence, so ports may be added in any order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ports {
    list: Vec<Port>,
    ids: BTreeMap<String, usize>,
}

impl Ports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Append a port, returning its position.
    pub(crate) fn push(&mut self, port: Port) -> Result<usize, PortError> {
        if self.ids.contains_key(port.id()) {
            return Err(PortError::Duplicate(port.id().to_string()));
        }
        let ix = self.list.len();
        self.ids.insert(port.id().to_string(), ix);
        self.list.push(port);
        Ok(ix)
    }

    pub fn get(&self, ix: usize) -> Option<&Port> {
        self.list.get(ix)
    }

    pub fn get_mut(&mut self, ix: usize) -> Option<&mut Port> {
        self.list.get_mut(ix)
    }

    /// The position of the port with the given identifier.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.get(id).copied()
    }

    pub fn by_id(&self, id: &str) -> Option<&Port> {
        self.position(id).map(|ix| &self.list[ix])
    }

    pub fn by_id_mut(&mut self, id: &str) -> Option<&mut Port> {
        self.position(id).map(move |ix| &mut self.list[ix])
    }

    /// Resolve a [`PortKey`] to a position.
    pub fn resolve(&self, key: &PortKey) -> Result<usize, PortNotFound> {
        let ix = match key {
            PortKey::Index(ix) if *ix < self.list.len() => Some(*ix),
            PortKey::Index(_) => None,
            PortKey::Id(id) => self.position(id),
        };
        ix.ok_or_else(|| PortNotFound { key: key.clone() })
    }

    pub fn try_get(&self, key: impl Into<PortKey>) -> Result<&Port, PortNotFound> {
        let ix = self.resolve(&key.into())?;
        Ok(&self.list[ix])
    }

    pub fn try_get_mut(&mut self, key: impl Into<PortKey>) -> Result<&mut Port, PortNotFound> {
        let ix = self.resolve(&key.into())?;
        Ok(&mut self.list[ix])
    }

    /// Read the value of the port with the given identifier as `T`.
    pub fn read<T: FromValue>(&self, id: &str) -> Result<T, ExecuteError> {
        let port = self.try_get(id)?;
        Ok(port.read()?)
    }

    /// Read the value of the port as `T`, falling back to `fallback` if the
    /// port is missing or holds some other kind of value.
    pub fn read_or<T: FromValue>(&self, id: &str, fallback: T) -> T {
        self.by_id(id)
            .and_then(|p| p.read().ok())
            .unwrap_or(fallback)
    }

    /// Write a value to the port with the given identifier, marking it dirty.
    pub fn write(&mut self, id: &str, value: impl Into<Value>) -> Result<(), PortNotFound> {
        self.try_get_mut(id)?.set_value(value);
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Port> {
        self.list.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Port> {
        self.list.iter_mut()
    }

    /// Ports of the given direction along with their positions.
    pub fn directed(&self, direction: Direction) -> impl Iterator<Item = (usize, &Port)> {
        self.list
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.direction() == direction)
    }

    pub fn count(&self, direction: Direction) -> usize {
        self.directed(direction).count()
    }
}

/// Panics if `ix` is out of range. See [`Ports::get`] and [`Ports::try_get`].
impl Index<usize> for Ports {
    type Output = Port;
    fn index(&self, ix: usize) -> &Self::Output {
        &self.list[ix]
    }
}

/// Panics if `ix` is out of range.
impl IndexMut<usize> for Ports {
    fn index_mut(&mut self, ix: usize) -> &mut Self::Output {
        &mut self.list[ix]
    }
}

impl<'a> IntoIterator for &'a Ports {
    type Item = &'a Port;
    type IntoIter = std::slice::Iter<'a, Port>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut Ports {
    type Item = &'a mut Port;
    type IntoIter = std::slice::IterMut<'a, Port>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Kind, TypeMismatch};

    fn ports() -> Ports {
        let mut ports = Ports::new();
        // Deliberately not sorted by identifier.
        ports.push(Port::output("sum", 0)).unwrap();
        ports.push(Port::input("b", 0)).unwrap();
        ports.push(Port::input("a", 0)).unwrap();
        ports
    }

    #[test]
    fn test_lookup_unsorted() {
        let ports = ports();
        assert_eq!(ports.position("a"), Some(2));
        assert_eq!(ports.position("b"), Some(1));
        assert_eq!(ports.position("sum"), Some(0));
        assert_eq!(ports.position("c"), None);
        assert_eq!(ports.by_id("b").unwrap().id(), "b");
    }

    #[test]
    fn test_duplicate() {
        let mut ports = ports();
        let err = ports.push(Port::output("a", 1)).unwrap_err();
        assert_eq!(err, PortError::Duplicate("a".to_string()));
        assert_eq!(ports.len(), 3);
    }

    #[test]
    fn test_index() {
        let mut ports = ports();
        assert_eq!(ports[1].id(), "b");
        ports[2].set_value(4);
        assert_eq!(ports.read::<i64>("a").unwrap(), 4);
        assert!(ports.get(3).is_none());
    }

    #[test]
    #[should_panic]
    fn test_index_out_of_range() {
        let ports = ports();
        let _ = &ports[3];
    }

    #[test]
    fn test_resolve() {
        let ports = ports();
        assert_eq!(ports.resolve(&PortKey::Index(1)), Ok(1));
        assert_eq!(ports.resolve(&"sum".into()), Ok(0));
        let err = ports.resolve(&PortKey::Index(3)).unwrap_err();
        assert_eq!(err.key, PortKey::Index(3));
    }

    #[test]
    fn test_read_write() {
        let mut ports = ports();
        ports.write("a", 5).unwrap();
        assert_eq!(ports.read::<i64>("a").unwrap(), 5);
        assert!(ports.by_id("a").unwrap().is_dirty());

        ports.write("b", "five").unwrap();
        let err = ports.read::<i64>("b").unwrap_err();
        assert_eq!(
            err,
            ExecuteError::TypeMismatch(TypeMismatch::new(Kind::Int, Kind::Text))
        );
        assert_eq!(ports.read_or("b", -1i64), -1);
        assert_eq!(ports.read_or("missing", 9i64), 9);

        let err = ports.write("missing", 1).unwrap_err();
        assert_eq!(err.key, PortKey::Id("missing".to_string()));
    }

    #[test]
    fn test_directed() {
        let ports = ports();
        let inputs: Vec<_> = ports.directed(Direction::Input).map(|(ix, _)| ix).collect();
        assert_eq!(inputs, vec![1, 2]);
        assert_eq!(ports.count(Direction::Output), 1);
    }
}
