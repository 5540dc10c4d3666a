//! Authored animation descriptors
//!
//! Declarative animation settings, usually loaded from TOML, that are turned
//! into scheduler animations against host objects looked up by name.
//!
//! ```toml
//! [[animation]]
//! name = "slide"
//! node = "panel"
//! kind = "move"
//! start = [0.0, 0.5, 0.0]
//! end = [0.5, 0.5, 0.0]
//! easing = "ease_out"
//! effect = "spring"
//! play_on_start = true
//! ```

use crate::animation::LoopMode;
use crate::easing::Easing;
use crate::effect::{EffectCurve, EffectKind, DEFAULT_BOUNCE, DEFAULT_MAX};
use crate::error::{AnimationError, Result};
use crate::scheduler::{AnimationId, AnimationScheduler};
use indexmap::IndexMap;
use lilt_core::{Color, Quat, SharedGraphic, SharedTransform, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What an authored animation drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationType {
    #[default]
    Move,
    Scale,
    Rotation,
    /// Graphic color, alpha included
    Image,
    Group,
}

impl AnimationType {
    pub fn name(self) -> &'static str {
        match self {
            AnimationType::Move => "move",
            AnimationType::Scale => "scale",
            AnimationType::Rotation => "rotation",
            AnimationType::Image => "image",
            AnimationType::Group => "group",
        }
    }
}

/// Easing choices available to authors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingKind {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    /// Square root, fast start
    Sqrt,
    /// Cube root, faster start
    Cbrt,
    /// Fourth root, fastest start
    FourthRoot,
    Sine,
    /// Inverse sine: fast at both ends
    Tangent,
    CircularIn,
    CircularOut,
}

impl EasingKind {
    pub fn easing(self) -> Easing {
        match self {
            EasingKind::Linear => Easing::Linear,
            EasingKind::EaseIn => Easing::EaseIn,
            EasingKind::EaseOut => Easing::EaseOut,
            EasingKind::EaseInOut => Easing::EaseInOut,
            EasingKind::QuadIn => Easing::EaseInQuad,
            EasingKind::QuadOut => Easing::EaseOutQuad,
            EasingKind::QuadInOut => Easing::EaseInOutQuad,
            EasingKind::CubicIn => Easing::EaseInCubic,
            EasingKind::CubicOut => Easing::EaseOutCubic,
            EasingKind::CubicInOut => Easing::EaseInOutCubic,
            EasingKind::QuartIn => Easing::EaseInQuart,
            EasingKind::QuartOut => Easing::EaseOutQuart,
            EasingKind::QuartInOut => Easing::EaseInOutQuart,
            EasingKind::Sqrt => Easing::Power(0.5),
            EasingKind::Cbrt => Easing::Power(0.33),
            EasingKind::FourthRoot => Easing::Power(0.25),
            EasingKind::Sine => Easing::SineInOut,
            EasingKind::Tangent => Easing::InverseSine,
            EasingKind::CircularIn => Easing::CircularIn,
            EasingKind::CircularOut => Easing::CircularOut,
        }
    }
}

/// Effect choices available to authors
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectChoice {
    #[default]
    None,
    Spring,
    Wave,
    Explosion,
}

impl EffectChoice {
    pub fn curve(self, max: f32, bounce: u32) -> EffectCurve {
        let kind = match self {
            EffectChoice::None => return EffectCurve::None,
            EffectChoice::Spring => EffectKind::Spring,
            EffectChoice::Wave => EffectKind::Wave,
            EffectChoice::Explosion => EffectKind::Explosion,
        };
        kind.curve(max, bounce)
    }
}

/// One authored animation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationDescriptor {
    /// Key other descriptors use to list this one as a group member
    pub name: String,
    /// Host object the animation drives. Groups may leave this empty.
    pub node: Option<String>,
    pub kind: AnimationType,
    /// Start value: position (xy), scale (xyz) or Euler angles in degrees
    pub start: [f32; 3],
    pub end: [f32; 3],
    pub start_color: [f32; 4],
    pub end_color: [f32; 4],
    /// Move endpoints are screen pixels instead of viewport fractions
    pub use_screen_values: bool,
    /// Pick a random effect orientation about Z
    pub random_direction: bool,
    /// Deactivate the host object once the animation finishes
    pub disable_after: bool,
    pub play_on_start: bool,
    /// Replay whenever the host re-enables the node, see
    /// [`AnimationSheet::enable_node`]
    pub play_on_enable: bool,
    pub duration: f32,
    pub delay: f32,
    pub easing: EasingKind,
    pub effect: EffectChoice,
    /// Effect amplitude
    pub max: f32,
    /// Effect half-oscillations
    pub bounce: u32,
    /// Effect orientation as Euler angles in degrees
    pub effect_rotation: [f32; 3],
    pub loop_mode: LoopMode,
    /// Group members, by name
    pub members: Vec<String>,
}

impl Default for AnimationDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            node: None,
            kind: AnimationType::Move,
            start: [0.0; 3],
            end: [0.0; 3],
            start_color: Color::WHITE.to_array(),
            end_color: Color::WHITE.to_array(),
            use_screen_values: false,
            random_direction: false,
            disable_after: false,
            play_on_start: false,
            play_on_enable: false,
            duration: 1.0,
            delay: 0.0,
            easing: EasingKind::Linear,
            effect: EffectChoice::None,
            max: DEFAULT_MAX,
            bounce: DEFAULT_BOUNCE,
            effect_rotation: [0.0; 3],
            loop_mode: LoopMode::None,
            members: Vec::new(),
        }
    }
}

/// Looks up host objects by node name
pub trait TargetResolver {
    fn transform(&self, node: &str) -> Option<SharedTransform>;
    fn graphic(&self, node: &str) -> Option<SharedGraphic>;
}

impl AnimationDescriptor {
    /// Rotation descriptors with any X or Y tilt interpolate orientations;
    /// pure Z rotations spin by angle and may exceed a full turn.
    pub fn uses_orientation(&self) -> bool {
        self.start[0] != 0.0 || self.start[1] != 0.0 || self.end[0] != 0.0 || self.end[1] != 0.0
    }

    /// Build the animation without playing it.
    ///
    /// `built` maps names of already built descriptors to their ids, for
    /// group members.
    pub fn build<R: Rng>(
        &self,
        scheduler: &mut AnimationScheduler,
        resolver: &impl TargetResolver,
        built: &IndexMap<String, AnimationId>,
        rng: &mut R,
    ) -> Result<AnimationId> {
        let easing = self.easing.easing();
        let effect = self.effect.curve(self.max, self.bounce);
        let orientation = if self.random_direction {
            Quat::from_rotation_z(rng.random_range(0.0..360.0))
        } else {
            let [x, y, z] = self.effect_rotation;
            Quat::from_euler_degrees(x, y, z)
        };
        let start = Vec3::from(self.start);
        let end = Vec3::from(self.end);

        let (id, transform, graphic) = match self.kind {
            AnimationType::Move => {
                let target = self.transform(resolver)?;
                let (origin, destination) = if self.use_screen_values {
                    let metrics = scheduler.metrics()?;
                    (
                        metrics.normalize(start.truncate()),
                        metrics.normalize(end.truncate()),
                    )
                } else {
                    (start.truncate(), end.truncate())
                };
                let id = scheduler
                    .move_between(target.clone(), origin, destination, self.duration)?
                    .id();
                (id, Some(target), None)
            }
            AnimationType::Scale => {
                let target = self.transform(resolver)?;
                let id = scheduler
                    .scale_between(target.clone(), start, end, self.duration)
                    .id();
                (id, Some(target), None)
            }
            AnimationType::Rotation => {
                let target = self.transform(resolver)?;
                let rotation = if self.uses_orientation() {
                    let from = Quat::from_euler_degrees(start.x, start.y, start.z);
                    let to = Quat::from_euler_degrees(end.x, end.y, end.z);
                    scheduler.rotate_between(target.clone(), from, to, self.duration)
                } else {
                    scheduler.rotate_angle_between(target.clone(), start.z, end.z, self.duration)
                };
                let id = rotation.id();
                (id, Some(target), None)
            }
            AnimationType::Image => {
                let graphic = self
                    .node
                    .as_deref()
                    .and_then(|node| resolver.graphic(node))
                    .ok_or(AnimationError::MissingGraphic)?;
                let id = scheduler
                    .change_color(
                        graphic.clone(),
                        Color::from(self.start_color),
                        Color::from(self.end_color),
                        self.duration,
                    )
                    .id();
                (id, None, Some(graphic))
            }
            AnimationType::Group => {
                let members = self
                    .members
                    .iter()
                    .map(|name| {
                        built
                            .get(name)
                            .copied()
                            .ok_or_else(|| AnimationError::UnknownMember(name.clone()))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let id = scheduler.group(&members)?.id();
                let transform = self.node.as_deref().and_then(|node| resolver.transform(node));
                (id, transform, None)
            }
        };

        let mut config = scheduler.configure(id)?;
        if self.kind != AnimationType::Group {
            config = config.delay(self.delay).easing(easing);
            if !effect.is_none() && self.kind != AnimationType::Image {
                config = config.effect(effect, orientation);
            }
        }
        config = config.looping(self.loop_mode);

        if self.disable_after {
            if let Some(graphic) = graphic {
                config = config.on_finish(move |_, _| graphic.borrow_mut().set_active(false));
            } else if let Some(transform) = transform {
                config = config.on_finish(move |_, _| transform.borrow_mut().set_active(false));
            } else {
                tracing::warn!(name = %self.name, "disable_after needs a node to disable");
            }
        }

        tracing::debug!(name = %self.name, kind = self.kind.name(), "Built authored animation");
        Ok(config.id())
    }

    fn transform(&self, resolver: &impl TargetResolver) -> Result<SharedTransform> {
        self.node
            .as_deref()
            .and_then(|node| resolver.transform(node))
            .ok_or(AnimationError::MissingTransform {
                kind: self.kind.name(),
            })
    }
}

/// A list of authored animations, as found under `[[animation]]` tables
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSheet {
    #[serde(default, rename = "animation")]
    pub animations: Vec<AnimationDescriptor>,
}

impl AnimationSheet {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Build every descriptor, then play the ones marked `play_on_start`.
    ///
    /// Groups are built after everything else, in declaration order, so
    /// they can list any non-group animation and any group declared above
    /// them. Names must be unique. When any descriptor fails to build, the
    /// animations already built from this sheet are removed again.
    pub fn instantiate<R: Rng>(
        &self,
        scheduler: &mut AnimationScheduler,
        resolver: &impl TargetResolver,
        rng: &mut R,
    ) -> Result<IndexMap<String, AnimationId>> {
        for (index, descriptor) in self.animations.iter().enumerate() {
            if self.animations[..index]
                .iter()
                .any(|d| d.name == descriptor.name)
            {
                return Err(AnimationError::DuplicateName(descriptor.name.clone()));
            }
        }

        let mut built = IndexMap::new();
        let (groups, leaves): (Vec<_>, Vec<_>) = self
            .animations
            .iter()
            .partition(|d| d.kind == AnimationType::Group);

        for descriptor in leaves.into_iter().chain(groups) {
            match descriptor.build(scheduler, resolver, &built, rng) {
                Ok(id) => {
                    built.insert(descriptor.name.clone(), id);
                }
                Err(err) => {
                    tracing::warn!(name = %descriptor.name, %err, "Discarding partially built sheet");
                    // Groups were built last; removing them first frees their members
                    for (_, id) in built.into_iter().rev() {
                        scheduler.remove(id);
                    }
                    return Err(err);
                }
            }
        }

        for descriptor in self.animations.iter().filter(|d| d.play_on_start) {
            if let Some(&id) = built.get(&descriptor.name) {
                scheduler.play(id);
            }
        }
        Ok(built)
    }

    /// Play every `play_on_enable` animation bound to `node`. Hosts call
    /// this when they make the node visible again.
    ///
    /// Returns how many animations were played.
    pub fn enable_node(
        &self,
        scheduler: &mut AnimationScheduler,
        built: &IndexMap<String, AnimationId>,
        node: &str,
    ) -> usize {
        let mut played = 0;
        for descriptor in &self.animations {
            if !descriptor.play_on_enable || descriptor.node.as_deref() != Some(node) {
                continue;
            }
            if let Some(&id) = built.get(&descriptor.name) {
                if scheduler.play(id) {
                    played += 1;
                }
            }
        }
        tracing::debug!(node, played, "Node enabled");
        played
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lilt_core::{GraphicNode, RectNode, ScreenMetrics};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[derive(Default)]
    struct Nodes {
        rects: HashMap<String, Rc<RefCell<RectNode>>>,
        graphics: HashMap<String, Rc<RefCell<GraphicNode>>>,
    }

    impl TargetResolver for Nodes {
        fn transform(&self, node: &str) -> Option<SharedTransform> {
            self.rects.get(node).map(|n| n.clone() as SharedTransform)
        }

        fn graphic(&self, node: &str) -> Option<SharedGraphic> {
            self.graphics.get(node).map(|n| n.clone() as SharedGraphic)
        }
    }

    fn scheduler() -> AnimationScheduler {
        AnimationScheduler::with_metrics(ScreenMetrics::new(1000.0, 1000.0).unwrap()).unwrap()
    }

    #[test]
    fn test_parse_defaults() {
        let sheet = AnimationSheet::from_toml(
            r#"
            [[animation]]
            name = "a"
            node = "box"
            kind = "scale"
            end = [2.0, 2.0, 1.0]
            loop_mode = "ping_pong"
            easing = "tangent"
            "#,
        )
        .unwrap();
        let a = &sheet.animations[0];
        assert_eq!(a.duration, 1.0);
        assert_eq!(a.max, DEFAULT_MAX);
        assert_eq!(a.bounce, DEFAULT_BOUNCE);
        assert_eq!(a.start_color, [1.0; 4]);
        assert_eq!(a.loop_mode, LoopMode::PingPong);
        assert_eq!(a.easing.easing(), Easing::InverseSine);
    }

    #[test]
    fn test_unknown_kind_is_a_parse_error() {
        let err = AnimationSheet::from_toml("[[animation]]\nkind = \"teleport\"\n").unwrap_err();
        assert!(matches!(err, AnimationError::Parse(_)));
    }

    #[test]
    fn test_rotation_mode_follows_tilt() {
        let mut d = AnimationDescriptor {
            kind: AnimationType::Rotation,
            end: [0.0, 0.0, 720.0],
            ..Default::default()
        };
        assert!(!d.uses_orientation());
        d.start[1] = 10.0;
        assert!(d.uses_orientation());
    }

    #[test]
    fn test_image_without_graphic_is_rejected() {
        let mut scheduler = scheduler();
        let nodes = Nodes::default();
        let d = AnimationDescriptor {
            kind: AnimationType::Image,
            node: Some("missing".into()),
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(7);
        let err = d
            .build(&mut scheduler, &nodes, &IndexMap::new(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, AnimationError::MissingGraphic));
        assert_eq!(scheduler.animation_count(), 0);
    }

    #[test]
    fn test_screen_values_and_disable_after() {
        let mut scheduler = scheduler();
        let mut nodes = Nodes::default();
        let rect = RectNode::new().shared();
        nodes.rects.insert("box".into(), rect.clone());

        let d = AnimationDescriptor {
            name: "slide".into(),
            node: Some("box".into()),
            start: [0.0, 0.0, 0.0],
            end: [250.0, 500.0, 0.0],
            use_screen_values: true,
            disable_after: true,
            play_on_start: true,
            ..Default::default()
        };
        let sheet = AnimationSheet {
            animations: vec![d],
        };
        let mut rng = StdRng::seed_from_u64(7);
        let built = sheet.instantiate(&mut scheduler, &nodes, &mut rng).unwrap();
        assert!(scheduler.is_active(built["slide"]));

        scheduler.tick(1.0);
        let rect = rect.borrow();
        assert!((rect.anchored_position.x - 250.0).abs() < 1e-3);
        assert!((rect.anchored_position.y - 500.0).abs() < 1e-3);
        assert!(!rect.active);
    }

    #[test]
    fn test_group_members_resolve_regardless_of_order() {
        let mut scheduler = scheduler();
        let mut nodes = Nodes::default();
        nodes.rects.insert("box".into(), RectNode::new().shared());
        nodes
            .graphics
            .insert("tint".into(), GraphicNode::default().shared());

        let sheet = AnimationSheet::from_toml(
            r#"
            [[animation]]
            name = "all"
            kind = "group"
            members = ["grow", "fade"]
            play_on_start = true

            [[animation]]
            name = "grow"
            node = "box"
            kind = "scale"
            start = [1.0, 1.0, 1.0]
            end = [2.0, 2.0, 1.0]
            duration = 2.0

            [[animation]]
            name = "fade"
            node = "tint"
            kind = "image"
            start_color = [1.0, 1.0, 1.0, 0.0]
            delay = 0.5
            "#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let built = sheet.instantiate(&mut scheduler, &nodes, &mut rng).unwrap();
        assert_eq!(built.len(), 3);
        assert_eq!(scheduler.get(built["all"]).unwrap().duration(), 2.0);
        assert!(scheduler.is_active(built["all"]));
        assert!(!scheduler.is_active(built["grow"]));
    }

    #[test]
    fn test_enable_node_replays_play_on_enable() {
        let mut scheduler = scheduler();
        let mut nodes = Nodes::default();
        let rect = RectNode::new().shared();
        nodes.rects.insert("box".into(), rect.clone());

        let sheet = AnimationSheet::from_toml(
            r#"
            [[animation]]
            name = "pop"
            node = "box"
            kind = "scale"
            start = [1.0, 1.0, 1.0]
            end = [2.0, 2.0, 1.0]
            disable_after = true
            play_on_enable = true

            [[animation]]
            name = "spin"
            node = "box"
            kind = "rotation"
            end = [0.0, 0.0, 90.0]
            "#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let built = sheet.instantiate(&mut scheduler, &nodes, &mut rng).unwrap();
        assert!(sheet.animations[0].play_on_enable);
        assert!(!sheet.animations[1].play_on_enable);
        assert_eq!(scheduler.active_count(), 0);

        assert_eq!(sheet.enable_node(&mut scheduler, &built, "elsewhere"), 0);
        assert_eq!(sheet.enable_node(&mut scheduler, &built, "box"), 1);
        assert!(scheduler.is_active(built["pop"]));
        assert!(!scheduler.is_active(built["spin"]));

        scheduler.tick(1.0);
        assert!(!rect.borrow().active);

        // The host shows the node again
        rect.borrow_mut().active = true;
        sheet.enable_node(&mut scheduler, &built, "box");
        scheduler.tick(0.5);
        assert_eq!(rect.borrow().scale.x, 1.5);
        assert!(rect.borrow().active);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let mut scheduler = scheduler();
        let mut nodes = Nodes::default();
        nodes.rects.insert("box".into(), RectNode::new().shared());
        let sheet = AnimationSheet::from_toml(
            r#"
            [[animation]]
            name = "grow"
            node = "box"
            kind = "scale"

            [[animation]]
            name = "grow"
            node = "box"
            kind = "rotation"
            "#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let err = sheet
            .instantiate(&mut scheduler, &nodes, &mut rng)
            .unwrap_err();
        assert!(matches!(err, AnimationError::DuplicateName(name) if name == "grow"));
        assert_eq!(scheduler.animation_count(), 0);
    }

    #[test]
    fn test_failed_sheet_leaves_no_animations_behind() {
        let mut scheduler = scheduler();
        let mut nodes = Nodes::default();
        nodes.rects.insert("box".into(), RectNode::new().shared());
        let sheet = AnimationSheet::from_toml(
            r#"
            [[animation]]
            name = "grow"
            node = "box"
            kind = "scale"
            play_on_start = true

            [[animation]]
            name = "both"
            kind = "group"
            members = ["grow"]

            [[animation]]
            name = "broken"
            kind = "group"
            members = ["grow", "ghost"]
            "#,
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        assert!(sheet.instantiate(&mut scheduler, &nodes, &mut rng).is_err());
        assert_eq!(scheduler.animation_count(), 0);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_unknown_member_is_reported_by_name() {
        let mut scheduler = scheduler();
        let sheet = AnimationSheet::from_toml(
            "[[animation]]\nname = \"g\"\nkind = \"group\"\nmembers = [\"ghost\"]\n",
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let err = sheet
            .instantiate(&mut scheduler, &Nodes::default(), &mut rng)
            .unwrap_err();
        assert!(matches!(err, AnimationError::UnknownMember(name) if name == "ghost"));
    }
}
