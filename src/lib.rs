//! # affordance_engine
//!
//! Selector-driven UI affordance plugins for Bevy apps. The engine owns a
//! name-keyed plugin registry, a per-kind component template cache, and
//! cursor/viewport tracking; affordance plugins (currently tooltips) arm
//! themselves against host configuration and react to hover, entity
//! insertion, and viewport changes.
//!
//! ```no_run
//! use affordance_engine::{
//!     AffordancesPlugin, PluginStore, Theme, TooltipConfig, TooltipsPlugin, TOOLTIPS_NAME,
//! };
//! use bevy::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(DefaultPlugins)
//!     .add_plugins((AffordancesPlugin, TooltipsPlugin));
//!
//! PluginStore::initialize(
//!     app.world_mut(),
//!     TOOLTIPS_NAME,
//!     Box::new(vec![TooltipConfig::new(".save-button", "Saves your work")]),
//!     Theme::default(),
//! );
//! app.run();
//! ```
use bevy::prelude::*;

pub mod engine;
pub mod systems;
pub mod theme;
pub mod tooltips;

pub use engine::{
    component::{attach, render_attached, TemplateInstance, VisualComponent},
    store::{Affordance, ConfigPayload, PluginStore},
    templates::{Template, TemplateNode, TemplateStore},
};
pub use systems::{
    cursor::CursorTracker,
    selector::{Classes, Selector},
};
pub use theme::Theme;
pub use tooltips::{
    element::{Placement, TooltipConfig, TooltipElement},
    AffordanceOverlay, TooltipsPlugin, TooltipsRuntime, TOOLTIPS_NAME,
};

/// Engine core: registry, template cache, and cursor tracking. Add this
/// before any affordance plugin.
pub struct AffordancesPlugin;

impl Plugin for AffordancesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PluginStore>()
            .init_resource::<TemplateStore>()
            .init_resource::<CursorTracker>()
            .add_systems(PreUpdate, systems::cursor::track_cursor);
    }
}
