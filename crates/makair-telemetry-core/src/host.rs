//! Stack-based host integration.
//!
//! A host engine exchanges values through a stack. The telemetry decoder is
//! exposed as a single stack function, `MAKAIR.TELEMETRY->`, registered in a
//! static table that hosts query by name at load time.

use serde_json::Value;
use thiserror::Error;

use crate::telemetry::{Message, TelemetryError, decode};

/// Registered name of the telemetry decode function.
pub const TELEMETRY_DECODE: &str = "MAKAIR.TELEMETRY->";

/// Value exchanged with the host stack.
#[derive(Debug, Clone, PartialEq)]
pub enum StackValue {
    Bytes(Vec<u8>),
    Text(String),
    Record(Box<Message>),
    /// Explicit "no result" marker.
    Null,
}

impl StackValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            StackValue::Bytes(_) => "bytes",
            StackValue::Text(_) => "string",
            StackValue::Record(_) => "record",
            StackValue::Null => "null",
        }
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            StackValue::Bytes(bytes) => serde_json::to_value(bytes),
            StackValue::Text(text) => Ok(Value::String(text.clone())),
            StackValue::Record(message) => serde_json::to_value(message.as_ref()),
            StackValue::Null => Ok(Value::Null),
        }
    }
}

#[derive(Debug, Default)]
pub struct Stack {
    values: Vec<StackValue>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: StackValue) {
        self.values.push(value);
    }

    pub fn pop(&mut self, function: &'static str) -> Result<StackValue, HostError> {
        self.values.pop().ok_or(HostError::EmptyStack { function })
    }

    pub fn peek(&self) -> Option<&StackValue> {
        self.values.last()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("{function} expects a value on the stack")]
    EmptyStack { function: &'static str },
    #[error("{function} operates on a byte array, found {found}")]
    TypeMismatch {
        function: &'static str,
        found: &'static str,
    },
    #[error("{function} failed to decode packet: {source}")]
    Decode {
        function: &'static str,
        #[source]
        source: TelemetryError,
    },
}

/// A named function operating on the host stack.
pub trait StackFunction: Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, stack: &mut Stack) -> Result<(), HostError>;
}

/// Pops a byte array, pushes the decoded record or `Null` when the packet is
/// not telemetry.
pub struct TelemetryDecode;

impl StackFunction for TelemetryDecode {
    fn name(&self) -> &'static str {
        TELEMETRY_DECODE
    }

    fn apply(&self, stack: &mut Stack) -> Result<(), HostError> {
        let function = self.name();
        let bytes = match stack.pop(function)? {
            StackValue::Bytes(bytes) => bytes,
            other => {
                return Err(HostError::TypeMismatch {
                    function,
                    found: other.type_name(),
                });
            }
        };

        let decoded =
            decode(&bytes).map_err(|source| HostError::Decode { function, source })?;
        stack.push(match decoded {
            Some(message) => StackValue::Record(Box::new(message)),
            None => StackValue::Null,
        });
        Ok(())
    }
}

static FUNCTIONS: &[&dyn StackFunction] = &[&TelemetryDecode];

/// All registered functions, in registration order.
pub fn functions() -> impl Iterator<Item = &'static dyn StackFunction> {
    FUNCTIONS.iter().copied()
}

pub fn lookup(name: &str) -> Option<&'static dyn StackFunction> {
    functions().find(|function| function.name() == name)
}
