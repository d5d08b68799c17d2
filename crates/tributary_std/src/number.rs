use serde::{Deserialize, Serialize};
use tributary_core::{
    ExecuteError, Port, Value,
    node::{Execute, Ports},
};

/// An integer constant. Writes its value to its single `output` port.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct Int {
    pub value: i64,
}

impl Int {
    pub const OUTPUT: &str = "output";

    pub fn new(value: i64) -> Self {
        Int { value }
    }
}

impl Execute for Int {
    fn name(&self) -> &str {
        "Integer"
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::output(Self::OUTPUT, Value::Int(self.value))]
    }

    fn execute(&mut self, ports: &mut Ports) -> Result<(), ExecuteError> {
        ports.write(Self::OUTPUT, self.value)?;
        Ok(())
    }
}
