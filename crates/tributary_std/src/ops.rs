use serde::{Deserialize, Serialize};
use tributary_core::{
    ExecuteError, Port,
    node::{Execute, Ports},
};

/// Simple `Add` operation node.
///
/// Adds the integers on `num1` and `num2`, writing the sum to `output`.
/// Overflow wraps.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Add;

impl Add {
    pub const NUM1: &str = "num1";
    pub const NUM2: &str = "num2";
    pub const OUTPUT: &str = "output";
}

impl Execute for Add {
    fn name(&self) -> &str {
        "Add"
    }

    fn ports(&self) -> Vec<Port> {
        vec![
            Port::input(Self::NUM1, 0),
            Port::input(Self::NUM2, 0),
            Port::output(Self::OUTPUT, 0),
        ]
    }

    fn execute(&mut self, ports: &mut Ports) -> Result<(), ExecuteError> {
        let l: i64 = ports.read(Self::NUM1)?;
        let r: i64 = ports.read(Self::NUM2)?;
        ports.write(Self::OUTPUT, l.wrapping_add(r))?;
        Ok(())
    }
}
