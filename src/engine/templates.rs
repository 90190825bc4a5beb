//! Component template cache.
//!
//! A template describes the entity structure a visual component clones at
//! attach time. Building the structure is done once per component kind; every
//! later instantiation clones the cached tree.
use std::{collections::HashMap, sync::Arc};

use bevy::prelude::*;

/// Declarative node in a component template. Styling (colors, sizes, fonts)
/// is not baked in; it comes from the theme at attach time.
#[derive(Clone, Debug)]
pub enum TemplateNode {
    /// A colored quad. The root of every template is a surface.
    Surface {
        classes: &'static [&'static str],
        children: Vec<TemplateNode>,
    },
    /// A text slot, populated by the owning component's `render`.
    Content { classes: &'static [&'static str] },
}

#[derive(Clone, Debug)]
pub struct Template {
    pub root: TemplateNode,
}

/// Kind-keyed template cache. Templates are built exactly once per kind for
/// the process lifetime and shared from then on; there is no eviction.
#[derive(Resource, Default)]
pub struct TemplateStore {
    templates: HashMap<&'static str, Arc<Template>>,
}

impl TemplateStore {
    /// Fetch the template for `kind`, invoking `build` only on the first
    /// request for that kind.
    pub fn get(&mut self, kind: &'static str, build: impl FnOnce() -> Template) -> Arc<Template> {
        self.templates
            .entry(kind)
            .or_insert_with(|| Arc::new(build()))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
