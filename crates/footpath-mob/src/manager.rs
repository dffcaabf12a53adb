//! Mob population management
//!
//! Owns every mob on one map and drives them with a shared configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use footpath_geometry::FootholdGraph;

use crate::config::MovementConfig;
use crate::movement::MobMovement;
use crate::types::{MapBounds, MobId, MobSpawn};

/// Manages the mobs of one map
///
/// Mobs only read the shared graph and never see each other, so the update
/// order does not affect results. Iteration is ordered by [`MobId`].
#[derive(Debug, Default)]
pub struct MobManager {
    config: Arc<MovementConfig>,
    mobs: BTreeMap<MobId, MobMovement>,
    map_bounds: MapBounds,
}

impl MobManager {
    /// Create a manager using the default tuning
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MovementConfig) -> Self {
        Self {
            config: Arc::new(config),
            ..Self::default()
        }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    /// Create a mob and place it onto `graph`
    pub fn spawn(&mut self, spawn: &MobSpawn, graph: &FootholdGraph) -> MobId {
        let mut mob = MobMovement::new(spawn, Arc::clone(&self.config));
        mob.set_map_bounds(self.map_bounds);
        let foothold = mob.place(graph);

        let id = MobId::new();
        log::info!(
            "Spawned {} ({:?}) at ({:.1}, {:.1}) on {}. Population: {}",
            id,
            mob.move_type(),
            mob.x(),
            mob.y(),
            foothold.map_or_else(|| "nothing".to_string(), |fh| fh.to_string()),
            self.mobs.len() + 1
        );
        self.mobs.insert(id, mob);
        id
    }

    /// Remove a mob; returns whether it existed
    pub fn despawn(&mut self, id: MobId) -> bool {
        let removed = self.mobs.remove(&id).is_some();
        if removed {
            log::info!("Despawned {}. Population: {}", id, self.mobs.len());
        }
        removed
    }

    pub fn get(&self, id: MobId) -> Option<&MobMovement> {
        self.mobs.get(&id)
    }

    pub fn get_mut(&mut self, id: MobId) -> Option<&mut MobMovement> {
        self.mobs.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.mobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MobId, &MobMovement)> {
        self.mobs.iter().map(|(id, mob)| (*id, mob))
    }

    pub fn ids(&self) -> impl Iterator<Item = MobId> + '_ {
        self.mobs.keys().copied()
    }

    /// Advance every mob by `dt_ms`
    pub fn update_all(&mut self, graph: &FootholdGraph, dt_ms: f32) {
        for mob in self.mobs.values_mut() {
            mob.update(graph, dt_ms);
        }
    }

    /// Apply `bounds` to every current and future mob
    pub fn set_map_bounds_all(&mut self, bounds: MapBounds) {
        self.map_bounds = bounds;
        for mob in self.mobs.values_mut() {
            mob.set_map_bounds(bounds);
        }
    }
}

#[cfg(test)]
mod tests {
    use footpath_geometry::FootholdId;
    use glam::IVec2;

    use super::*;
    use crate::types::{MobCapabilities, MoveDirection};

    fn floor() -> FootholdGraph {
        FootholdGraph::from_segments([(IVec2::new(0, 500), IVec2::new(2000, 500))]).unwrap()
    }

    #[test]
    fn test_spawn_places_mob() {
        let graph = floor();
        let mut manager = MobManager::new();
        let id = manager.spawn(&MobSpawn::new(1000, 490, MobCapabilities::walker()), &graph);

        assert_eq!(manager.len(), 1);
        let mob = manager.get(id).unwrap();
        assert_eq!(mob.current_foothold(), Some(FootholdId(0)));
        assert_eq!(mob.y(), 500.0);
    }

    #[test]
    fn test_despawn() {
        let graph = floor();
        let mut manager = MobManager::new();
        let id = manager.spawn(&MobSpawn::new(1000, 500, MobCapabilities::walker()), &graph);

        assert!(manager.despawn(id));
        assert!(!manager.despawn(id), "Second despawn should report nothing removed");
        assert!(manager.is_empty());
        assert!(manager.get(id).is_none());
    }

    #[test]
    fn test_update_all_moves_every_mob() {
        let graph = floor();
        let mut manager = MobManager::new();
        let spawn = MobSpawn::new(1000, 500, MobCapabilities::walker())
            .with_roam(300, 300)
            .with_facing(MoveDirection::Right);
        let a = manager.spawn(&spawn, &graph);
        let b = manager.spawn(&spawn.clone().with_facing(MoveDirection::Left), &graph);

        manager.update_all(&graph, 16.67);
        assert!(manager.get(a).unwrap().x() > 1000.0);
        assert!(manager.get(b).unwrap().x() < 1000.0);
    }

    #[test]
    fn test_map_bounds_apply_to_new_and_existing_mobs() {
        let graph = floor();
        let mut manager = MobManager::new();
        let spawn = MobSpawn::new(1000, 500, MobCapabilities::walker());
        let first = manager.spawn(&spawn, &graph);

        let bounds = MapBounds::new(0, 0, 1500, 900);
        manager.set_map_bounds_all(bounds);
        let second = manager.spawn(&spawn, &graph);

        assert_eq!(manager.get(first).unwrap().map_bounds(), bounds);
        assert_eq!(manager.get(second).unwrap().map_bounds(), bounds);
    }

    #[test]
    fn test_mobs_share_config() {
        let graph = floor();
        let mut config = MovementConfig::default();
        config.physics.move_speed = 3.0;
        let mut manager = MobManager::with_config(config);
        let id = manager.spawn(&MobSpawn::new(1000, 500, MobCapabilities::walker()), &graph);

        assert_eq!(manager.get(id).unwrap().config().physics.move_speed, 3.0);
        assert_eq!(manager.iter().count(), 1);
    }
}
