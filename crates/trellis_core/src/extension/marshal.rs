//! Construction-parameter marshaling.
//!
//! Turns `(property name, value)` pairs into an ordered parameter list checked
//! against an interface's declared properties. Used when a loader
//! default-constructs an instance for an interface.

use crate::extension::interface::{InterfaceId, InterfaceInfo};
use crate::value::{Value, ValueType};
use log::warn;
use thiserror::Error;

/// One checked construction parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: &'static str,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("{0} is not an interface type")]
    NotAnInterface(InterfaceId),
    #[error("type {interface} has no property named `{property}`")]
    UnknownProperty {
        interface: InterfaceId,
        property: String,
    },
    #[error("property {interface}.{property} expects {expected}, got {actual}")]
    TypeMismatch {
        interface: InterfaceId,
        property: &'static str,
        expected: ValueType,
        actual: ValueType,
    },
}

/// Checks each pair against `interface` and returns the parameters in input
/// order. Nothing is returned on the first failure.
pub fn collect_parameters<'a, I>(
    interface: &InterfaceInfo,
    pairs: I,
) -> Result<Vec<Parameter>, MarshalError>
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    if !interface.is_interface() {
        return Err(report(MarshalError::NotAnInterface(interface.id())));
    }

    let mut params = Vec::new();
    for (name, value) in pairs {
        let spec = interface.find_property(name).ok_or_else(|| {
            report(MarshalError::UnknownProperty {
                interface: interface.id(),
                property: name.to_string(),
            })
        })?;
        let value = value.coerce_to(spec.value_type).map_err(|actual| {
            report(MarshalError::TypeMismatch {
                interface: interface.id(),
                property: spec.name,
                expected: spec.value_type,
                actual: actual.value_type(),
            })
        })?;
        params.push(Parameter {
            name: spec.name,
            value,
        });
    }
    Ok(params)
}

fn report(err: MarshalError) -> MarshalError {
    warn!("event=marshal_parameters module=extension status=error reason={err}");
    err
}
