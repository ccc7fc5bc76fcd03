use hecs::{Entity, RefMut, World};

pub mod components;
pub mod systems;

use components::{LinePrimitive, PointPrimitive};

/// Render tree of one chart. Owns every attached primitive, pooled ones
/// belong to their layer.
#[derive(Default)]
pub struct Scene {
    world: World,
}

impl Scene {
    pub fn new() -> Self {
        Self { world: World::new() }
    }

    pub fn attach_point(&mut self, primitive: PointPrimitive) -> Entity {
        self.world.spawn((primitive,))
    }

    /// Moves the primitive out of the scene and drops its entity.
    pub fn detach_point(&mut self, entity: Entity) -> Option<PointPrimitive> {
        let primitive = self.world.remove_one::<PointPrimitive>(entity).ok()?;
        let _ = self.world.despawn(entity);
        Some(primitive)
    }

    pub fn point_mut(&mut self, entity: Entity) -> Option<RefMut<'_, PointPrimitive>> {
        self.world.get::<&mut PointPrimitive>(entity).ok()
    }

    pub fn attach_line(&mut self, primitive: LinePrimitive) -> Entity {
        self.world.spawn((primitive,))
    }

    pub fn detach_line(&mut self, entity: Entity) -> Option<LinePrimitive> {
        let primitive = self.world.remove_one::<LinePrimitive>(entity).ok()?;
        let _ = self.world.despawn(entity);
        Some(primitive)
    }

    pub fn line_mut(&mut self, entity: Entity) -> Option<RefMut<'_, LinePrimitive>> {
        self.world.get::<&mut LinePrimitive>(entity).ok()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    pub fn point_count(&self) -> usize {
        self.world.query::<&PointPrimitive>().iter().count()
    }

    pub fn line_count(&self) -> usize {
        self.world.query::<&LinePrimitive>().iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.world.is_empty()
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.world.len())
            .finish()
    }
}
