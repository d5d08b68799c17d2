use serde::{Deserialize, Serialize};
use tributary_core::{
    ExecuteError, Port, Value,
    node::{Execute, Ports},
};

/// A sink that logs whatever value it receives at the given log level.
///
/// The most recently observed value is kept so that it may be inspected
/// once the graph has run.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Output {
    pub level: log::Level,
    #[serde(skip)]
    last: Option<Value>,
}

impl Output {
    pub const INPUT: &str = "output";

    pub fn new(level: log::Level) -> Self {
        Output { level, last: None }
    }

    /// The value received during the most recent execution.
    pub fn last(&self) -> Option<&Value> {
        self.last.as_ref()
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(log::Level::Info)
    }
}

impl Execute for Output {
    fn name(&self) -> &str {
        "Output"
    }

    fn ports(&self) -> Vec<Port> {
        vec![Port::input(Self::INPUT, 0)]
    }

    fn execute(&mut self, ports: &mut Ports) -> Result<(), ExecuteError> {
        let value = ports.try_get(Self::INPUT)?.value().clone();
        log::log!(self.level, "[Output Node] output: {value}");
        self.last = Some(value);
        Ok(())
    }
}
