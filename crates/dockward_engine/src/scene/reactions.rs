//! Collision reactions keyed by identity-tag pairs
//!
//! Every collision record whose two tags match a rule runs that rule's
//! reaction. Rules are order independent: a rule declared for `(1, 6)` also
//! matches a record tagged `(6, 1)`, and inside the reaction `first` is always
//! the entity carrying the first declared tag. All rules for a pair fire, in
//! the order they were added; pairs without rules are ignored.

use super::animation::Animator;
use super::event::{SceneEvent, SoundCue};
use crate::ecs::components::{RigidBodyComponent, TransformComponent};
use crate::ecs::{Entity, World};
use crate::foundation::math::Vec3;
use crate::physics::{BodyKind, IdentityTag, PhysicsWorld};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Boxed reaction closure
pub type Reaction = Box<dyn FnMut(&mut ReactionContext<'_>)>;

/// Unordered pair of identity tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagPair {
    low: IdentityTag,
    high: IdentityTag,
}

impl TagPair {
    /// Create the pair; argument order does not matter
    pub fn new(a: IdentityTag, b: IdentityTag) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Smaller tag
    pub fn low(&self) -> IdentityTag {
        self.low
    }

    /// Larger tag
    pub fn high(&self) -> IdentityTag {
        self.high
    }
}

/// Everything a reaction may touch
pub struct ReactionContext<'a> {
    /// Entity carrying the rule's first tag
    pub first: Entity,
    /// Entity carrying the rule's second tag
    pub second: Entity,
    /// Scene entities
    pub world: &'a mut World,
    /// Scene physics
    pub physics: &'a mut PhysicsWorld,
    /// Scene animations
    pub animator: &'a mut Animator,
    names: &'a HashMap<String, Entity>,
    sounds: &'a HashMap<String, SoundCue>,
    events: &'a mut Vec<SceneEvent>,
}

impl<'a> ReactionContext<'a> {
    pub(crate) fn new(
        world: &'a mut World,
        physics: &'a mut PhysicsWorld,
        animator: &'a mut Animator,
        names: &'a HashMap<String, Entity>,
        sounds: &'a HashMap<String, SoundCue>,
        events: &'a mut Vec<SceneEvent>,
    ) -> Self {
        Self {
            first: Entity::default(),
            second: Entity::default(),
            world,
            physics,
            animator,
            names,
            sounds,
            events,
        }
    }

    /// Live entity registered under `name`
    pub fn entity(&self, name: &str) -> Option<Entity> {
        self.names
            .get(name)
            .copied()
            .filter(|&entity| self.world.is_alive(entity))
    }

    /// Resolve a reaction target to a live entity
    pub fn resolve(&self, target: &Target) -> Option<Entity> {
        let entity = match target {
            Target::First => Some(self.first),
            Target::Second => Some(self.second),
            Target::Named(name) => self.entity(name),
        };
        let resolved = entity.filter(|&entity| self.world.is_alive(entity));
        if resolved.is_none() {
            log::debug!("Reaction target {} is gone", target);
        }
        resolved
    }

    /// Identity tag of a live entity with a body
    pub fn tag(&self, entity: Entity) -> Option<IdentityTag> {
        self.world
            .get::<RigidBodyComponent>(entity)
            .ok()
            .map(|body| body.tag)
    }

    /// Start a named animation
    pub fn start_animation(&mut self, name: &str) -> bool {
        self.animator.start(name)
    }

    /// Enable or disable gravity on an entity's body
    pub fn set_gravity(&mut self, entity: Entity, enabled: bool) -> bool {
        match self.world.get_mut::<RigidBodyComponent>(entity) {
            Ok(body) => match body.set_gravity_enabled(self.physics, enabled) {
                Ok(()) => true,
                Err(err) => {
                    log::warn!("Failed to change gravity of {}: {}", entity, err);
                    false
                }
            },
            Err(err) => {
                log::debug!("Cannot change gravity: {}", err);
                false
            }
        }
    }

    /// Move an entity, through its body when it has one
    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> bool {
        place_entity(self.world, self.physics, entity, position)
    }

    /// Destroy an entity and its body
    pub fn despawn(&mut self, entity: Entity) -> bool {
        match self.world.destroy_entity(entity, self.physics) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Cannot despawn: {}", err);
                false
            }
        }
    }

    /// Queue a sound from the level's catalog
    pub fn play_sound(&mut self, name: &str) -> bool {
        match self.sounds.get(name) {
            Some(cue) => {
                self.events.push(SceneEvent::PlaySound(cue.clone()));
                true
            }
            None => {
                log::warn!("Level has no sound named {}", name);
                false
            }
        }
    }

    /// Raise a scene event
    pub fn emit(&mut self, event: SceneEvent) {
        self.events.push(event);
    }
}

/// Move an entity's body (if any) and its transform to `position`
///
/// Static bodies never move; a move aimed at one is refused.
pub(crate) fn place_entity(world: &mut World, physics: &mut PhysicsWorld, entity: Entity, position: Vec3) -> bool {
    if !world.is_alive(entity) {
        log::debug!("Skipping move of stale entity {}", entity);
        return false;
    }
    if let Ok(body) = world.get_mut::<RigidBodyComponent>(entity) {
        if body.kind == BodyKind::Static {
            log::warn!("Refusing to move static body of {}", entity);
            return false;
        }
        if let Err(err) = body.set_position(physics, position) {
            log::warn!("Failed to move body of {}: {}", entity, err);
            return false;
        }
    }
    if let Ok(transform) = world.get_mut::<TransformComponent>(entity) {
        transform.position = position;
    }
    true
}

/// Entity a declarative reaction acts on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// Entity with the rule's first tag
    First,
    /// Entity with the rule's second tag
    Second,
    /// Entity spawned under this level name
    Named(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::First => f.write_str("first"),
            Target::Second => f.write_str("second"),
            Target::Named(name) => write!(f, "'{}'", name),
        }
    }
}

/// Reaction written as level data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReactionSpec {
    /// Start the named animation
    StartAnimation(String),
    /// Toggle gravity on a body
    SetGravity {
        /// Body owner
        target: Target,
        /// New gravity state
        enabled: bool,
    },
    /// Teleport an entity
    MoveTo {
        /// Entity to move
        target: Target,
        /// New position
        position: Vec3,
    },
    /// Destroy an entity
    Despawn(Target),
    /// Play a sound from the level's catalog
    PlaySound(String),
    /// Raise `SceneEvent::LevelComplete`
    EndLevel,
    /// Raise `SceneEvent::Custom`
    Emit(String),
}

impl ReactionSpec {
    /// Compile into a reaction closure
    pub fn into_reaction(self) -> Reaction {
        match self {
            ReactionSpec::StartAnimation(name) => Box::new(move |ctx: &mut ReactionContext<'_>| {
                ctx.start_animation(&name);
            }),
            ReactionSpec::SetGravity { target, enabled } => Box::new(move |ctx: &mut ReactionContext<'_>| {
                if let Some(entity) = ctx.resolve(&target) {
                    ctx.set_gravity(entity, enabled);
                }
            }),
            ReactionSpec::MoveTo { target, position } => Box::new(move |ctx: &mut ReactionContext<'_>| {
                if let Some(entity) = ctx.resolve(&target) {
                    ctx.set_position(entity, position);
                }
            }),
            ReactionSpec::Despawn(target) => Box::new(move |ctx: &mut ReactionContext<'_>| {
                if let Some(entity) = ctx.resolve(&target) {
                    ctx.despawn(entity);
                }
            }),
            ReactionSpec::PlaySound(name) => Box::new(move |ctx: &mut ReactionContext<'_>| {
                ctx.play_sound(&name);
            }),
            ReactionSpec::EndLevel => Box::new(|ctx: &mut ReactionContext<'_>| {
                ctx.emit(SceneEvent::LevelComplete);
            }),
            ReactionSpec::Emit(message) => Box::new(move |ctx: &mut ReactionContext<'_>| {
                ctx.emit(SceneEvent::Custom(message.clone()));
            }),
        }
    }
}

struct Rule {
    first: IdentityTag,
    reaction: Reaction,
}

/// Tag-pair → reactions lookup
#[derive(Default)]
pub struct ReactionTable {
    rules: BTreeMap<TagPair, Vec<Rule>>,
    len: usize,
}

impl fmt::Debug for ReactionTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionTable")
            .field("pairs", &self.rules.keys().collect::<Vec<_>>())
            .field("len", &self.len)
            .finish()
    }
}

impl ReactionTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reaction for collisions between `first` and `second`
    pub fn on<F>(&mut self, first: impl Into<IdentityTag>, second: impl Into<IdentityTag>, reaction: F) -> &mut Self
    where
        F: FnMut(&mut ReactionContext<'_>) + 'static,
    {
        self.insert(first.into(), second.into(), Box::new(reaction))
    }

    /// Add a declarative reaction
    pub fn on_spec(
        &mut self,
        first: impl Into<IdentityTag>,
        second: impl Into<IdentityTag>,
        spec: ReactionSpec,
    ) -> &mut Self {
        self.insert(first.into(), second.into(), spec.into_reaction())
    }

    fn insert(&mut self, first: IdentityTag, second: IdentityTag, reaction: Reaction) -> &mut Self {
        self.rules
            .entry(TagPair::new(first, second))
            .or_default()
            .push(Rule { first, reaction });
        self.len += 1;
        self
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the table has no rules
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any rule matches the two tags
    pub fn matches(&self, a: IdentityTag, b: IdentityTag) -> bool {
        self.rules.contains_key(&TagPair::new(a, b))
    }

    /// Run every rule matching the record `(a, b)`; returns how many fired
    pub(crate) fn dispatch(
        &mut self,
        (a, tag_a): (Entity, IdentityTag),
        (b, tag_b): (Entity, IdentityTag),
        ctx: &mut ReactionContext<'_>,
    ) -> usize {
        let Some(rules) = self.rules.get_mut(&TagPair::new(tag_a, tag_b)) else {
            return 0;
        };

        for rule in rules.iter_mut() {
            let (first, second) = if rule.first == tag_a { (a, b) } else { (b, a) };
            ctx.first = first;
            ctx.second = second;
            (rule.reaction)(ctx);
        }
        rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyShape;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Fixture {
        world: World,
        physics: PhysicsWorld,
        animator: Animator,
        names: HashMap<String, Entity>,
        sounds: HashMap<String, SoundCue>,
        events: Vec<SceneEvent>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                world: World::new(),
                physics: PhysicsWorld::new(Vec3::zeros(), 1.0 / 60.0),
                animator: Animator::new(),
                names: HashMap::new(),
                sounds: HashMap::new(),
                events: Vec::new(),
            }
        }

        fn spawn(&mut self, name: &str, tag: u32) -> Entity {
            self.spawn_body(name, RigidBodyComponent::dynamic(BodyShape::default(), 1.0).with_tag(tag))
        }

        fn spawn_body(&mut self, name: &str, body: RigidBodyComponent) -> Entity {
            let entity = self.world.create_entity();
            self.world.attach(entity, body, &mut self.physics).unwrap();
            self.world
                .attach(entity, TransformComponent::default(), &mut self.physics)
                .unwrap();
            self.names.insert(name.to_string(), entity);
            entity
        }

        fn dispatch(&mut self, table: &mut ReactionTable, a: (Entity, u32), b: (Entity, u32)) -> usize {
            let mut ctx = ReactionContext::new(
                &mut self.world,
                &mut self.physics,
                &mut self.animator,
                &self.names,
                &self.sounds,
                &mut self.events,
            );
            table.dispatch((a.0, IdentityTag(a.1)), (b.0, IdentityTag(b.1)), &mut ctx)
        }
    }

    #[test]
    fn test_rules_match_either_order_with_declared_orientation() {
        let mut fixture = Fixture::new();
        let player = fixture.spawn("player", 1);
        let pad = fixture.spawn("pad", 5);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut table = ReactionTable::new();
        table.on(1, 5, move |ctx| log.borrow_mut().push((ctx.first, ctx.second)));

        assert_eq!(fixture.dispatch(&mut table, (pad, 5), (player, 1)), 1);
        assert_eq!(fixture.dispatch(&mut table, (player, 1), (pad, 5)), 1);
        assert_eq!(*seen.borrow(), vec![(player, pad), (player, pad)]);
    }

    #[test]
    fn test_all_matching_rules_fire_in_order() {
        let mut fixture = Fixture::new();
        let player = fixture.spawn("player", 1);
        let goal = fixture.spawn("goal", 9);

        let mut table = ReactionTable::new();
        table
            .on_spec(9, 1, ReactionSpec::Emit("first".into()))
            .on_spec(1, 9, ReactionSpec::EndLevel)
            .on_spec(1, 3, ReactionSpec::Emit("unrelated".into()));

        assert_eq!(fixture.dispatch(&mut table, (player, 1), (goal, 9)), 2);
        assert_eq!(
            fixture.events,
            vec![SceneEvent::Custom("first".into()), SceneEvent::LevelComplete]
        );
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_unmatched_pair_is_ignored() {
        let mut fixture = Fixture::new();
        let a = fixture.spawn("a", 4);
        let b = fixture.spawn("b", 7);
        let mut table = ReactionTable::new();
        table.on_spec(1, 2, ReactionSpec::EndLevel);

        assert!(!table.matches(IdentityTag(4), IdentityTag(7)));
        assert_eq!(fixture.dispatch(&mut table, (a, 4), (b, 7)), 0);
        assert!(fixture.events.is_empty());
    }

    #[test]
    fn test_despawn_then_later_rules_skip_stale_target() {
        let mut fixture = Fixture::new();
        let player = fixture.spawn("player", 1);
        let coin = fixture.spawn("coin", 8);
        let bodies = fixture.physics.body_count();

        let mut table = ReactionTable::new();
        table
            .on_spec(1, 8, ReactionSpec::Despawn(Target::Second))
            .on_spec(
                1,
                8,
                ReactionSpec::MoveTo {
                    target: Target::Second,
                    position: Vec3::new(0.0, 10.0, 0.0),
                },
            );

        assert_eq!(fixture.dispatch(&mut table, (coin, 8), (player, 1)), 2);
        assert!(!fixture.world.is_alive(coin));
        assert_eq!(fixture.physics.body_count(), bodies - 1);
    }

    #[test]
    fn test_move_and_gravity_reach_the_body() {
        let mut fixture = Fixture::new();
        let player = fixture.spawn("player", 1);
        let crate_box = fixture.spawn("crate", 4);

        let mut table = ReactionTable::new();
        table
            .on_spec(
                1,
                4,
                ReactionSpec::MoveTo {
                    target: Target::Named("crate".into()),
                    position: Vec3::new(3.0, 0.0, 0.0),
                },
            )
            .on_spec(
                1,
                4,
                ReactionSpec::SetGravity {
                    target: Target::Second,
                    enabled: false,
                },
            );

        fixture.dispatch(&mut table, (player, 1), (crate_box, 4));
        assert_eq!(fixture.physics.translation(crate_box), Some(Vec3::new(3.0, 0.0, 0.0)));
        assert_eq!(
            fixture.world.get::<TransformComponent>(crate_box).unwrap().position,
            Vec3::new(3.0, 0.0, 0.0)
        );
        assert!(!fixture.world.get::<RigidBodyComponent>(crate_box).unwrap().has_gravity());
    }

    #[test]
    fn test_static_body_is_never_moved() {
        let mut fixture = Fixture::new();
        let player = fixture.spawn("player", 1);
        let wall = fixture.spawn_body(
            "wall",
            RigidBodyComponent::fixed(BodyShape::default()).with_tag(2),
        );

        let mut table = ReactionTable::new();
        table.on_spec(
            1,
            2,
            ReactionSpec::MoveTo {
                target: Target::Second,
                position: Vec3::new(0.0, 5.0, 0.0),
            },
        );

        assert_eq!(fixture.dispatch(&mut table, (player, 1), (wall, 2)), 1);
        assert_eq!(fixture.physics.translation(wall), Some(Vec3::zeros()));
        assert_eq!(
            fixture.world.get::<TransformComponent>(wall).unwrap().position,
            Vec3::zeros()
        );
    }
}
