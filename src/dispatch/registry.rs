use std::sync::OnceLock;

use indexmap::IndexMap;

use crate::dispatch::descriptors::{Expansion, OperationDescriptor, ResultShape, OPERATIONS};
use crate::error::{GeoFrameError, Result};
use crate::kernel::{self, KernelFunction};

/// An operation descriptor resolved against the kernel function table.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    descriptor: &'static OperationDescriptor,
    function: KernelFunction,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn descriptor(&self) -> &'static OperationDescriptor {
        self.descriptor
    }

    pub fn function(&self) -> KernelFunction {
        self.function
    }

    pub fn is_expandable(&self) -> bool {
        self.descriptor.expansion != Expansion::None
    }
}

/// Operations by name, every one of them checked against the kernel up front.
#[derive(Debug)]
pub struct Registry {
    operations: IndexMap<&'static str, Operation>,
}

static REGISTRY: OnceLock<std::result::Result<Registry, String>> = OnceLock::new();

impl Registry {
    /// Resolve every descriptor.
    ///
    /// Fails with [`GeoFrameError::MissingAttribute`] if a kernel path is unknown or its arity does
    /// not fit the result shape.
    pub fn try_new(descriptors: &'static [OperationDescriptor]) -> Result<Self> {
        let mut operations = IndexMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let function = kernel::lookup(descriptor.kernel).ok_or_else(|| {
                GeoFrameError::MissingAttribute(format!(
                    "could not find kernel function '{}' for operation '{}'",
                    descriptor.kernel, descriptor.name
                ))
            })?;
            let expected_arity = match descriptor.shape {
                ResultShape::Binary => 2,
                _ => 1,
            };
            if function.arity() != expected_arity {
                return Err(GeoFrameError::MissingAttribute(format!(
                    "kernel function '{}' takes {} geometry operand(s), operation '{}' needs {}",
                    descriptor.kernel,
                    function.arity(),
                    descriptor.name,
                    expected_arity
                )));
            }
            let operation = Operation {
                descriptor,
                function,
            };
            if operations.insert(descriptor.name, operation).is_some() {
                return Err(GeoFrameError::InvalidValue(
                    format!("operation '{}' is defined twice", descriptor.name).into(),
                ));
            }
        }
        tracing::debug!(operations = operations.len(), "operation registry built");
        Ok(Self { operations })
    }

    /// The process-wide registry over the built-in operations, built on first use.
    pub fn global() -> Result<&'static Registry> {
        REGISTRY
            .get_or_init(|| Registry::try_new(OPERATIONS).map_err(|err| err.to_string()))
            .as_ref()
            .map_err(|reason| GeoFrameError::MissingAttribute(reason.clone()))
    }

    pub fn get(&self, name: &str) -> Result<&Operation> {
        self.operations
            .get(name)
            .ok_or_else(|| GeoFrameError::MissingAttribute(format!("unknown operation '{name}'")))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// All operations, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.operations.values()
    }

    /// Operations that apply to every geometry column of a table.
    pub fn expandable(&self) -> impl Iterator<Item = &Operation> {
        self.iter().filter(|op| op.is_expandable())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn builtin_registry_resolves() {
        let registry = Registry::global().unwrap();
        assert_eq!(registry.len(), OPERATIONS.len());
        assert_eq!(registry.get("area").unwrap().function().arity(), 1);
        assert_eq!(registry.get("intersects").unwrap().function().arity(), 2);
        assert!(registry.expandable().any(|op| op.name() == "centroid"));
        assert!(!registry.expandable().any(|op| op.name() == "intersects"));

        let err = registry.get("buffer").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn unknown_kernel_fails_fast() {
        static BAD: &[OperationDescriptor] = &[OperationDescriptor {
            name: "frechet_distance",
            kernel: "measurement.frechet_distance",
            shape: ResultShape::Binary,
            geometry_output: false,
            expansion: Expansion::None,
        }];
        let err = Registry::try_new(BAD).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }

    #[test]
    fn arity_mismatch_fails_fast() {
        static BAD: &[OperationDescriptor] = &[OperationDescriptor {
            name: "area",
            kernel: "measurement.area",
            shape: ResultShape::Binary,
            geometry_output: false,
            expansion: Expansion::None,
        }];
        let err = Registry::try_new(BAD).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lookup);
    }
}
