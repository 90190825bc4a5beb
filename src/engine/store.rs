//! Affordance plugin contract and registry.
use std::{
    any::Any,
    collections::{hash_map::Entry, HashMap},
};

use bevy::prelude::*;

use crate::theme::Theme;

/// Opaque configuration payload crossing the erased plugin contract. Each
/// concrete plugin downcasts to its own config list and treats a mismatch as
/// a host bug: warn and ignore.
pub type ConfigPayload = Box<dyn Any + Send + Sync>;

/// Lifecycle contract implemented by every affordance plugin.
///
/// `initialize` arms the plugin: it stores its configuration and theme and
/// starts reacting to host events. `remove_all` is the inverse: every spawned
/// element is removed and the plugin goes quiet until initialized again.
pub trait Affordance: Send + Sync + 'static {
    /// Unique registry key.
    fn name(&self) -> &str;

    fn initialize(&mut self, world: &mut World, configs: ConfigPayload, theme: Theme);

    fn remove_all(&mut self, world: &mut World);
}

/// Name-keyed registry of affordance plugins.
#[derive(Resource, Default)]
pub struct PluginStore {
    plugins: HashMap<String, Box<dyn Affordance>>,
}

impl PluginStore {
    /// Register a plugin under its name. A duplicate name is a warn-and-ignore
    /// no-op: the first registrant wins.
    pub fn add(&mut self, plugin: Box<dyn Affordance>) {
        match self.plugins.entry(plugin.name().to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(plugin);
            }
            Entry::Occupied(slot) => {
                warn!(
                    "affordance plugin {:?} is already registered; keeping the first",
                    slot.key()
                );
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Affordance> {
        self.plugins.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Drive `initialize` for a registered plugin. The store steps out of the
    /// world while the plugin mutates it. An unknown name warns and no-ops;
    /// absence is not a failure.
    pub fn initialize(world: &mut World, name: &str, configs: ConfigPayload, theme: Theme) {
        world.resource_scope(|world, mut store: Mut<PluginStore>| {
            let Some(plugin) = store.plugins.get_mut(name) else {
                warn!("no affordance plugin registered under {name:?}");
                return;
            };
            plugin.initialize(world, configs, theme);
        });
    }

    /// Drive `remove_all` for a registered plugin.
    pub fn remove_all(world: &mut World, name: &str) {
        world.resource_scope(|world, mut store: Mut<PluginStore>| {
            let Some(plugin) = store.plugins.get_mut(name) else {
                warn!("no affordance plugin registered under {name:?}");
                return;
            };
            plugin.remove_all(world);
        });
    }
}
