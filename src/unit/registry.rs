use super::Unit;
use crate::args::Args;
use crate::error::{Error, Result};
use crate::units;
use std::collections::BTreeMap;
use tracing::debug;

/// Builds a unit from its arguments, consuming every parameter it declares.
pub type Factory = fn(&mut Args) -> Result<Box<dyn Unit>>;

/// Maps unit names to their factories.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    factories: BTreeMap<&'static str, Factory>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding all units shipped with this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        units::register(&mut registry);
        registry
    }

    /// Registers `factory` under `name`, replacing any previous registration.
    pub fn register(&mut self, name: &'static str, factory: Factory) -> &mut Self {
        self.factories.insert(name, factory);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.keys().copied()
    }

    ///
    /// Constructs the unit registered under `name`.
    ///
    /// ## Errors
    ///
    /// * `Error::UnknownUnit` if nothing is registered under `name`.
    /// * `Error::UnknownArgument` if the factory did not consume every argument.
    /// * Any construction error of the unit itself.
    ///
    pub fn build(&self, name: &str, mut args: Args) -> Result<Box<dyn Unit>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::UnknownUnit(name.to_owned()))?;

        debug!(unit = name, args = args.len(), "constructing unit");
        let unit = factory(&mut args)?;
        args.finish(name)?;
        Ok(unit)
    }
}
