//! Tooltips affordance plugin.
//!
//! Watches three host streams while armed: hovered-entity transitions
//! (pointer enter/leave), entity insertion (newly matching targets are
//! pre-shown, no pointer required), and viewport/target movement (visible
//! tooltips re-anchor every frame; hidden ones cost nothing).
use std::collections::HashMap;

use bevy::{camera::primitives::Aabb, prelude::*};

use crate::{
    engine::{
        component::{attach, render_attached, TemplateInstance},
        store::{Affordance, ConfigPayload, PluginStore},
        templates::TemplateStore,
    },
    systems::{
        cursor::{screen_rect, screen_to_world, world_rect, CursorTracker},
        selector::{Classes, Selector},
    },
    theme::Theme,
};

pub mod element;

use element::{hide_tooltip, resolve_position, show_tooltip, TooltipConfig, TooltipElement};

/// Registry key of the tooltips affordance.
pub const TOOLTIPS_NAME: &str = "tooltips";

const OVERLAY_Z: f32 = 900.0;

/// Mount point for tooltip elements. Spawned at initialize time, despawned
/// (with every tooltip under it) by `remove_all`.
#[derive(Component, Clone, Copy, Debug, Default)]
#[require(Transform, Visibility)]
pub struct AffordanceOverlay;

struct TooltipEntry {
    /// `None` when the configured selector fell outside the supported
    /// dialect; the entry stays in place to preserve configuration order but
    /// never matches.
    selector: Option<Selector>,
    config: TooltipConfig,
}

#[derive(Clone, Copy)]
struct HoveredMatch {
    target: Entity,
    /// Index of the first configuration entry the target matched, if any.
    entry: Option<usize>,
}

/// Armed state of the tooltips affordance. Inserting this resource is what
/// "attaches the listeners": every tooltip system is gated on its presence.
#[derive(Resource)]
pub struct TooltipsRuntime {
    entries: Vec<TooltipEntry>,
    theme: Theme,
    /// One live element per distinct selector, created lazily on first match.
    by_selector: HashMap<String, Entity>,
    overlay: Entity,
    hovered: Option<HoveredMatch>,
    /// Set by the insertion watcher on its first pass. Entities already in
    /// the world when observation starts are page state, not insertions.
    observing: bool,
}

impl TooltipsRuntime {
    /// Element armed for `selector`, if one has been created.
    pub fn element_for(&self, selector: &str) -> Option<Entity> {
        self.by_selector.get(selector).copied()
    }

    pub fn element_count(&self) -> usize {
        self.by_selector.len()
    }
}

#[derive(Clone, Default)]
pub struct TooltipsPlugin;

impl Plugin for TooltipsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PluginStore>()
            .init_resource::<TemplateStore>()
            .init_resource::<CursorTracker>()
            .add_systems(
                Update,
                (
                    watch_insertions,
                    update_hover_transitions,
                    render_attached::<TooltipElement>,
                )
                    .chain()
                    .run_if(resource_exists::<TooltipsRuntime>),
            )
            .add_systems(
                PostUpdate,
                sync_visible_tooltips.run_if(resource_exists::<TooltipsRuntime>),
            );

        app.world_mut()
            .resource_mut::<PluginStore>()
            .add(Box::new(self.clone()));
    }
}

impl Affordance for TooltipsPlugin {
    fn name(&self) -> &str {
        TOOLTIPS_NAME
    }

    fn initialize(&mut self, world: &mut World, configs: ConfigPayload, theme: Theme) {
        let Ok(configs) = configs.downcast::<Vec<TooltipConfig>>() else {
            warn!("tooltips affordance received a foreign config payload; ignoring");
            return;
        };
        if world.contains_resource::<TooltipsRuntime>() {
            warn!("tooltips affordance initialized twice; keeping the first runtime");
            return;
        }

        let entries: Vec<TooltipEntry> = (*configs)
            .into_iter()
            .map(|config| {
                let selector = Selector::parse(&config.selector);
                if selector.is_none() {
                    warn!(
                        "tooltip selector {:?} is outside the supported dialect; entry disabled",
                        config.selector
                    );
                }
                TooltipEntry { selector, config }
            })
            .collect();

        let overlay = world
            .spawn((
                Name::new("affordance-overlay"),
                AffordanceOverlay,
                Transform::from_xyz(0.0, 0.0, OVERLAY_Z),
            ))
            .id();

        world.insert_resource(TooltipsRuntime {
            entries,
            theme,
            by_selector: HashMap::new(),
            overlay,
            hovered: None,
            observing: false,
        });
    }

    fn remove_all(&mut self, world: &mut World) {
        let Some(runtime) = world.remove_resource::<TooltipsRuntime>() else {
            warn!("tooltips affordance torn down without being initialized");
            return;
        };
        if let Ok(overlay) = world.get_entity_mut(runtime.overlay) {
            overlay.despawn();
        }
    }
}

fn first_matching_entry(
    entries: &[TooltipEntry],
    name: Option<&Name>,
    classes: Option<&Classes>,
) -> Option<usize> {
    entries.iter().position(|entry| {
        entry
            .selector
            .as_ref()
            .is_some_and(|selector| selector.matches(name, classes))
    })
}

fn is_preferred_candidate(entity: Entity, z: f32, current: Entity, current_z: f32) -> bool {
    z > current_z || (z == current_z && entity.to_bits() > current.to_bits())
}

/// Get-or-create the element for an entry's selector and show it against the
/// target rectangle. An element spawned earlier this frame is not yet
/// reachable through the query; the skip is silent, the spawn path already
/// made it visible.
fn arm_tooltip(
    commands: &mut Commands,
    templates: &mut TemplateStore,
    runtime: &mut TooltipsRuntime,
    entry_index: usize,
    target: Rect,
    viewport: Rect,
    elements: &mut Query<(&TooltipElement, &mut Transform, &mut Visibility)>,
) {
    let Some(entry) = runtime.entries.get(entry_index) else {
        return;
    };

    if let Some(&existing) = runtime.by_selector.get(&entry.config.selector) {
        if let Ok((element, mut transform, mut visibility)) = elements.get_mut(existing) {
            show_tooltip(element, target, viewport, &mut transform, &mut visibility);
        }
        return;
    }

    let element = TooltipElement {
        config: entry.config.clone(),
        size: runtime.theme.surface_size,
    };
    let top_left = resolve_position(
        target,
        element.size,
        element.config.placement,
        viewport.size(),
    );
    let center = screen_to_world(top_left + element.size * 0.5, viewport);
    let selector = element.config.selector.clone();
    let root = attach(commands, templates, runtime.overlay, element, &runtime.theme);
    commands.entity(root).insert((
        Transform::from_xyz(center.x, center.y, 0.0),
        Visibility::Visible,
    ));
    runtime.by_selector.insert(selector, root);
}

/// Pointer enter/leave, derived from per-frame hovered-entity transitions.
/// The topmost candidate under the cursor wins (z, then entity rank). On a
/// transition the old target's matched tooltip hides and the new target's
/// first matching configuration (configuration order) arms and shows.
fn update_hover_transitions(
    mut commands: Commands,
    cursor: Res<CursorTracker>,
    mut templates: ResMut<TemplateStore>,
    mut runtime: ResMut<TooltipsRuntime>,
    candidates: Query<
        (
            Entity,
            &GlobalTransform,
            &Aabb,
            Option<&InheritedVisibility>,
            Option<&Name>,
            Option<&Classes>,
        ),
        (Or<(With<Classes>, With<Name>)>, Without<TemplateInstance>),
    >,
    mut elements: Query<(&TooltipElement, &mut Transform, &mut Visibility)>,
) {
    let mut hovered_top: Option<(Entity, f32)> = None;
    if let Some(position) = cursor.position {
        for (entity, global, aabb, inherited_visibility, _, _) in candidates.iter() {
            if inherited_visibility.is_some_and(|visibility| !visibility.get()) {
                continue;
            }
            if !world_rect(global, aabb).contains(position) {
                continue;
            }
            let z = global.translation().z;
            let replace = match hovered_top {
                None => true,
                Some((current, current_z)) => is_preferred_candidate(entity, z, current, current_z),
            };
            if replace {
                hovered_top = Some((entity, z));
            }
        }
    }

    let hovered = hovered_top.map(|(entity, _)| entity);
    if runtime.hovered.map(|h| h.target) == hovered {
        return;
    }

    let runtime = &mut *runtime;

    // Leave: hide the element armed for the selector the old target matched.
    if let Some(old) = runtime.hovered.take() {
        if let Some(entry) = old.entry.and_then(|index| runtime.entries.get(index)) {
            if let Some(&tooltip) = runtime.by_selector.get(&entry.config.selector) {
                if let Ok((_, _, mut visibility)) = elements.get_mut(tooltip) {
                    hide_tooltip(&mut visibility);
                }
            }
        }
    }

    // Enter: first matching configuration wins.
    let Some(target) = hovered else {
        return;
    };
    let Ok((_, global, aabb, _, name, classes)) = candidates.get(target) else {
        return;
    };
    let entry = first_matching_entry(&runtime.entries, name, classes);
    runtime.hovered = Some(HoveredMatch { target, entry });

    let (Some(index), Some(viewport)) = (entry, cursor.viewport) else {
        return;
    };
    let target_rect = screen_rect(world_rect(global, aabb), viewport);
    arm_tooltip(
        &mut commands,
        &mut templates,
        runtime,
        index,
        target_rect,
        viewport,
        &mut elements,
    );
}

/// Entity insertion: every entity that gained a selectable facet this frame
/// is tested against every configuration, and each match arms *and shows* its
/// tooltip with no pointer involvement. The asymmetry with the hover path
/// (first match only, shown on enter) is deliberate and pinned by test.
fn watch_insertions(
    mut commands: Commands,
    cursor: Res<CursorTracker>,
    mut templates: ResMut<TemplateStore>,
    mut runtime: ResMut<TooltipsRuntime>,
    inserted: Query<
        (
            Option<&Name>,
            Option<&Classes>,
            Option<&GlobalTransform>,
            Option<&Aabb>,
        ),
        (Or<(Added<Classes>, Added<Name>)>, Without<TemplateInstance>),
    >,
    mut elements: Query<(&TooltipElement, &mut Transform, &mut Visibility)>,
) {
    let viewport = cursor.viewport.unwrap_or_default();
    let runtime = &mut *runtime;

    // The first pass sees everything that predates observation as "added";
    // swallow it so only genuine insertions arm tooltips.
    if !runtime.observing {
        runtime.observing = true;
        return;
    }

    for (name, classes, global, aabb) in inserted.iter() {
        for index in 0..runtime.entries.len() {
            let matched = runtime.entries[index]
                .selector
                .as_ref()
                .is_some_and(|selector| selector.matches(name, classes));
            if !matched {
                continue;
            }

            let target_rect = match (global, aabb) {
                (Some(global), Some(aabb)) => screen_rect(world_rect(global, aabb), viewport),
                // Not laid out yet: a zero-size rect at the entity's position
                // (or the origin). The per-frame sync corrects it as soon as
                // real bounds exist.
                (Some(global), None) => screen_rect(
                    Rect::from_center_size(global.translation().truncate(), Vec2::ZERO),
                    viewport,
                ),
                _ => Rect::default(),
            };
            arm_tooltip(
                &mut commands,
                &mut templates,
                runtime,
                index,
                target_rect,
                viewport,
                &mut elements,
            );
        }
    }
}

/// Re-anchor every visible tooltip against its selector's first live match.
/// Hidden tooltips are skipped; a vanished target is a silent skip.
fn sync_visible_tooltips(
    cursor: Res<CursorTracker>,
    runtime: Res<TooltipsRuntime>,
    candidates: Query<
        (
            Entity,
            &GlobalTransform,
            &Aabb,
            Option<&InheritedVisibility>,
            Option<&Name>,
            Option<&Classes>,
        ),
        (Or<(With<Classes>, With<Name>)>, Without<TemplateInstance>),
    >,
    mut elements: Query<(&TooltipElement, &mut Transform, &mut Visibility)>,
) {
    let Some(viewport) = cursor.viewport else {
        return;
    };

    for &tooltip in runtime.by_selector.values() {
        let Ok((element, mut transform, mut visibility)) = elements.get_mut(tooltip) else {
            continue;
        };
        if *visibility != Visibility::Visible {
            continue;
        }
        let Some(selector) = runtime
            .entries
            .iter()
            .find(|entry| entry.config.selector == element.config.selector)
            .and_then(|entry| entry.selector.as_ref())
        else {
            continue;
        };

        let target = candidates.iter().find(|(_, _, _, inherited, name, classes)| {
            !inherited.is_some_and(|visibility| !visibility.get())
                && selector.matches(*name, *classes)
        });
        let Some((_, global, aabb, _, _, _)) = target else {
            continue;
        };
        show_tooltip(
            element,
            screen_rect(world_rect(global, aabb), viewport),
            viewport,
            &mut transform,
            &mut visibility,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3A;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(TooltipsPlugin);
        app
    }

    fn initialize(app: &mut App, configs: Vec<TooltipConfig>) {
        PluginStore::initialize(
            app.world_mut(),
            TOOLTIPS_NAME,
            Box::new(configs),
            Theme::default(),
        );
    }

    fn set_pointer(app: &mut App, world_position: Option<Vec2>) {
        let mut tracker = app.world_mut().resource_mut::<CursorTracker>();
        tracker.position = world_position;
        tracker.viewport = Some(Rect::from_center_size(Vec2::ZERO, VIEWPORT));
    }

    fn spawn_target(app: &mut App, classes: &[&str], center: Vec2, half: Vec2) -> Entity {
        app.world_mut()
            .spawn((
                Classes::new(classes.iter().copied()),
                Transform::from_translation(center.extend(0.0)),
                GlobalTransform::from_translation(center.extend(0.0)),
                Aabb {
                    center: Vec3A::ZERO,
                    half_extents: half.extend(0.0).into(),
                },
            ))
            .id()
    }

    fn armed_element(app: &App, selector: &str) -> Entity {
        app.world()
            .resource::<TooltipsRuntime>()
            .element_for(selector)
            .expect("armed tooltip element")
    }

    #[test]
    fn hover_shows_and_leave_hides_the_same_element() {
        let mut app = test_app();
        initialize(&mut app, vec![TooltipConfig::new(".hint", "Helpful")]);
        set_pointer(&mut app, Some(Vec2::ZERO));
        spawn_target(&mut app, &["hint"], Vec2::ZERO, Vec2::new(25.0, 10.0));

        app.update();
        let tooltip = armed_element(&app, ".hint");
        assert_eq!(
            app.world().get::<Visibility>(tooltip),
            Some(&Visibility::Visible)
        );

        set_pointer(&mut app, Some(Vec2::new(300.0, 200.0)));
        app.update();
        assert_eq!(
            app.world().get::<Visibility>(tooltip),
            Some(&Visibility::Hidden)
        );
        // Same instance, not a replacement.
        assert_eq!(armed_element(&app, ".hint"), tooltip);
        assert_eq!(
            app.world().resource::<TooltipsRuntime>().element_count(),
            1
        );
    }

    #[test]
    fn first_matching_configuration_wins_on_hover() {
        let mut app = test_app();
        initialize(
            &mut app,
            vec![
                TooltipConfig::new(".hint", "first"),
                TooltipConfig::new(".hint.primary", "second"),
            ],
        );
        set_pointer(&mut app, Some(Vec2::ZERO));
        spawn_target(
            &mut app,
            &["hint", "primary"],
            Vec2::ZERO,
            Vec2::new(25.0, 10.0),
        );

        app.update();
        let runtime = app.world().resource::<TooltipsRuntime>();
        assert!(runtime.element_for(".hint").is_some());
        assert!(runtime.element_for(".hint.primary").is_none());
    }

    #[test]
    fn inserted_matching_entity_is_pre_shown() {
        let mut app = test_app();
        initialize(&mut app, vec![TooltipConfig::new(".hint", "Helpful")]);
        set_pointer(&mut app, None);
        // Observation starts with the page in its initial state...
        app.update();
        assert_eq!(
            app.world().resource::<TooltipsRuntime>().element_count(),
            0
        );

        // ...then a matching entity appears dynamically.
        spawn_target(&mut app, &["hint"], Vec2::new(100.0, 50.0), Vec2::new(25.0, 10.0));
        app.update();
        let tooltip = armed_element(&app, ".hint");
        assert_eq!(
            app.world().get::<Visibility>(tooltip),
            Some(&Visibility::Visible)
        );
    }

    #[test]
    fn entities_present_before_observation_are_not_pre_shown() {
        let mut app = test_app();
        set_pointer(&mut app, None);
        spawn_target(&mut app, &["hint"], Vec2::ZERO, Vec2::new(25.0, 10.0));
        initialize(&mut app, vec![TooltipConfig::new(".hint", "Helpful")]);

        app.update();
        app.update();
        assert_eq!(
            app.world().resource::<TooltipsRuntime>().element_count(),
            0
        );
    }

    #[test]
    fn visible_tooltip_tracks_a_moving_target() {
        let mut app = test_app();
        initialize(&mut app, vec![TooltipConfig::new(".hint", "Helpful")]);
        set_pointer(&mut app, None);
        app.update();
        let target = spawn_target(
            &mut app,
            &["hint"],
            Vec2::new(100.0, 50.0),
            Vec2::new(25.0, 10.0),
        );
        app.update();
        let tooltip = armed_element(&app, ".hint");

        // Default placement is bottom: target screen rect (475,240)-(525,260),
        // tooltip 240x48 centered -> top-left (380, 265), center (500, 289).
        assert_eq!(
            app.world()
                .get::<Transform>(tooltip)
                .map(|t| t.translation.truncate()),
            Some(Vec2::new(100.0, 11.0))
        );

        let shifted = Vec2::new(150.0, 80.0);
        *app.world_mut().get_mut::<GlobalTransform>(target).unwrap() =
            GlobalTransform::from_translation(shifted.extend(0.0));
        app.update();
        assert_eq!(
            app.world()
                .get::<Transform>(tooltip)
                .map(|t| t.translation.truncate()),
            Some(Vec2::new(150.0, 41.0))
        );
    }

    #[test]
    fn hidden_tooltips_are_not_resynced() {
        let mut app = test_app();
        initialize(&mut app, vec![TooltipConfig::new(".hint", "Helpful")]);
        set_pointer(&mut app, Some(Vec2::ZERO));
        let target = spawn_target(&mut app, &["hint"], Vec2::ZERO, Vec2::new(25.0, 10.0));
        app.update();
        let tooltip = armed_element(&app, ".hint");

        set_pointer(&mut app, Some(Vec2::new(300.0, 200.0)));
        app.update();
        let parked = app
            .world()
            .get::<Transform>(tooltip)
            .map(|t| t.translation.truncate())
            .unwrap();

        *app.world_mut().get_mut::<GlobalTransform>(target).unwrap() =
            GlobalTransform::from_translation(Vec3::new(150.0, 80.0, 0.0));
        app.update();
        assert_eq!(
            app.world()
                .get::<Transform>(tooltip)
                .map(|t| t.translation.truncate()),
            Some(parked)
        );
    }

    #[test]
    fn remove_all_tears_everything_down() {
        let mut app = test_app();
        initialize(&mut app, vec![TooltipConfig::new(".hint", "Helpful")]);
        set_pointer(&mut app, Some(Vec2::ZERO));
        spawn_target(&mut app, &["hint"], Vec2::ZERO, Vec2::new(25.0, 10.0));
        app.update();

        let tooltip = armed_element(&app, ".hint");
        let overlay = app.world().resource::<TooltipsRuntime>().overlay;

        PluginStore::remove_all(app.world_mut(), TOOLTIPS_NAME);
        assert!(!app.world().contains_resource::<TooltipsRuntime>());
        assert!(app.world().get_entity(overlay).is_err());
        assert!(app.world().get_entity(tooltip).is_err());

        // Gated systems stay quiet afterwards.
        app.update();
    }

    #[test]
    fn reinitialization_keeps_the_first_runtime() {
        let mut app = test_app();
        initialize(&mut app, vec![TooltipConfig::new(".hint", "first")]);
        initialize(&mut app, vec![TooltipConfig::new(".other", "second")]);

        let runtime = app.world().resource::<TooltipsRuntime>();
        assert_eq!(runtime.entries.len(), 1);
        assert_eq!(runtime.entries[0].config.selector, ".hint");
    }

    #[test]
    fn unparsable_selector_disables_only_its_entry() {
        let mut app = test_app();
        initialize(
            &mut app,
            vec![
                TooltipConfig::new("div span", "never"),
                TooltipConfig::new(".hint", "Helpful"),
            ],
        );
        set_pointer(&mut app, Some(Vec2::ZERO));
        spawn_target(&mut app, &["hint"], Vec2::ZERO, Vec2::new(25.0, 10.0));

        app.update();
        let runtime = app.world().resource::<TooltipsRuntime>();
        assert!(runtime.element_for("div span").is_none());
        assert!(runtime.element_for(".hint").is_some());
    }

    #[test]
    fn rendered_content_carries_the_configured_text() {
        let mut app = test_app();
        initialize(&mut app, vec![TooltipConfig::new(".hint", "Saves your work")]);
        set_pointer(&mut app, None);
        app.update();
        spawn_target(&mut app, &["hint"], Vec2::ZERO, Vec2::new(25.0, 10.0));

        // One update to mount, one for the render-on-added pass.
        app.update();
        app.update();

        let tooltip = armed_element(&app, ".hint");
        let children = app
            .world()
            .get::<Children>(tooltip)
            .expect("tooltip children");
        let text = children.iter().find_map(|child| {
            app.world()
                .get::<Classes>(child)
                .filter(|classes| classes.has("tooltip-content"))
                .and_then(|_| app.world().get::<Text2d>(child))
        });
        assert_eq!(text.map(|t| t.0.as_str()), Some("Saves your work"));
    }
}
