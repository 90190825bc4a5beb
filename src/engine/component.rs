//! Base visual component lifecycle.
//!
//! A visual component supplies its template (built once, cached by kind) and
//! a `render` that populates instance content. Attaching clones the cached
//! template into freshly spawned entities under a mount point; render runs
//! automatically once the instance is mounted.
use bevy::{prelude::*, sprite::Anchor, text::TextBounds};

use crate::{
    engine::templates::{Template, TemplateNode, TemplateStore},
    systems::selector::Classes,
    theme::Theme,
};

/// Marker on every entity spawned from a template. Framework-owned chrome is
/// never a hover target or a selector match for host configuration.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct TemplateInstance;

/// Contract for concrete visual components.
pub trait VisualComponent: Component {
    /// Template cache key. One template per kind, process-wide.
    const KIND: &'static str;

    /// Class marking the instance's content slot inside the template.
    const CONTENT_CLASS: &'static str;

    /// Build the component's template. Invoked at most once per kind; later
    /// instantiations clone the cached structure.
    fn build_template() -> Template;

    /// Populate instance-specific content after mount.
    fn render(&self, content: &mut Text2d);
}

/// Clone the cached template for `C` under `mount` and hand the root entity
/// the component value. Attach is once-per-instance by contract; attaching
/// the same logical instance twice duplicates chrome.
///
/// The root spawns hidden. Render runs via [`render_attached`] once the
/// instance reaches the world.
pub fn attach<C: VisualComponent>(
    commands: &mut Commands,
    templates: &mut TemplateStore,
    mount: Entity,
    component: C,
    theme: &Theme,
) -> Entity {
    let template = templates.get(C::KIND, C::build_template);
    let root = spawn_template_node(commands, mount, &template.root, theme);
    commands.entity(root).insert(component);
    root
}

fn spawn_template_node(
    commands: &mut Commands,
    parent: Entity,
    node: &TemplateNode,
    theme: &Theme,
) -> Entity {
    match node {
        TemplateNode::Surface { classes, children } => {
            let surface = commands
                .spawn((
                    TemplateInstance,
                    Classes::from_static(classes),
                    Sprite::from_color(theme.surface, theme.surface_size),
                    Visibility::Hidden,
                    ChildOf(parent),
                ))
                .id();
            for child in children {
                spawn_template_node(commands, surface, child, theme);
            }
            surface
        }
        TemplateNode::Content { classes } => commands
            .spawn((
                TemplateInstance,
                Classes::from_static(classes),
                Text2d::new(String::new()),
                TextFont {
                    font_size: theme.font_size,
                    ..default()
                },
                TextColor(theme.text),
                TextBounds {
                    width: Some((theme.surface_size.x - theme.text_padding.x * 2.0).max(1.0)),
                    height: Some((theme.surface_size.y - theme.text_padding.y * 2.0).max(1.0)),
                },
                TextLayout {
                    justify: Justify::Left,
                    ..default()
                },
                Anchor::CENTER_LEFT,
                Transform::from_xyz(
                    -theme.surface_size.x * 0.5 + theme.text_padding.x,
                    0.0,
                    0.01,
                ),
                ChildOf(parent),
            ))
            .id(),
    }
}

/// Run `render` for every instance of `C` mounted since the last frame. The
/// content slot is the first child carrying `C::CONTENT_CLASS`; an instance
/// without one is left alone.
pub fn render_attached<C: VisualComponent>(
    roots: Query<(Entity, &C), Added<C>>,
    mut slots: Query<(&ChildOf, &Classes, &mut Text2d), With<TemplateInstance>>,
) {
    for (root, component) in roots.iter() {
        for (child_of, classes, mut text) in slots.iter_mut() {
            if child_of.parent() != root || !classes.has(C::CONTENT_CLASS) {
                continue;
            }
            component.render(&mut text);
            break;
        }
    }
}
