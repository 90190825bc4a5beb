//! Tooltip element: placement math and visibility toggling.
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    engine::{
        component::VisualComponent,
        templates::{Template, TemplateNode},
    },
    systems::cursor::screen_to_world,
};

/// Gap between a target's edge and the tooltip surface, logical pixels.
pub const PLACEMENT_GAP: f32 = 5.0;

/// Side of the target the tooltip is placed on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// One tooltip rule: which entities it anchors to and what it says.
/// Immutable once handed to `initialize`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TooltipConfig {
    pub selector: String,
    pub text: String,
    #[serde(default)]
    pub placement: Placement,
}

impl TooltipConfig {
    pub fn new(selector: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            text: text.into(),
            placement: Placement::default(),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// A live tooltip surface. One element exists per distinct selector, created
/// lazily on first match and kept until the owning plugin is torn down.
#[derive(Component, Clone, Debug)]
pub struct TooltipElement {
    pub config: TooltipConfig,
    /// Surface size, fixed at creation from the theme.
    pub size: Vec2,
}

impl VisualComponent for TooltipElement {
    const KIND: &'static str = "tooltip";
    const CONTENT_CLASS: &'static str = "tooltip-content";

    fn build_template() -> Template {
        Template {
            root: TemplateNode::Surface {
                classes: &["tooltip"],
                children: vec![TemplateNode::Content {
                    classes: &["tooltip-content"],
                }],
            },
        }
    }

    fn render(&self, content: &mut Text2d) {
        content.0 = self.config.text.clone();
    }
}

/// Desired top-left corner of a tooltip in screen space.
///
/// The placement offset is pure arithmetic over the two rectangles; the
/// result is then clamped into `[0, viewport - size]` per axis. Clamping is
/// min-dominant: a tooltip larger than the viewport pins to the origin
/// instead of inverting the range. It never flips placement, so a target
/// hugging a viewport edge can still clip its tooltip.
pub fn resolve_position(target: Rect, size: Vec2, placement: Placement, viewport: Vec2) -> Vec2 {
    let centered_x = target.min.x + target.width() / 2.0 - size.x / 2.0;
    let centered_y = target.min.y + target.height() / 2.0 - size.y / 2.0;

    let (left, top) = match placement {
        Placement::Top => (centered_x, target.min.y - size.y - PLACEMENT_GAP),
        Placement::Left => (target.min.x - size.x - PLACEMENT_GAP, centered_y),
        Placement::Right => (target.max.x + PLACEMENT_GAP, centered_y),
        Placement::Bottom => (centered_x, target.max.y + PLACEMENT_GAP),
    };

    Vec2::new(
        left.min(viewport.x - size.x).max(0.0),
        top.min(viewport.y - size.y).max(0.0),
    )
}

/// Position the element against `target` (screen space) and make it visible.
/// Same rectangles, same result: the computation has no hidden state.
pub fn show_tooltip(
    element: &TooltipElement,
    target: Rect,
    viewport: Rect,
    transform: &mut Transform,
    visibility: &mut Visibility,
) {
    let top_left = resolve_position(target, element.size, element.config.placement, viewport.size());
    let center_world = screen_to_world(top_left + element.size * 0.5, viewport);
    transform.translation.x = center_world.x;
    transform.translation.y = center_world.y;
    *visibility = Visibility::Visible;
}

/// Hide the element. Idempotent.
pub fn hide_tooltip(visibility: &mut Visibility) {
    *visibility = Visibility::Hidden;
}
