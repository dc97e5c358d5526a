//! The scene aggregate
//!
//! `entities` owns every entity. `actors` (entities with a rigidbody) and
//! `ais` (entities with an AI state machine) hold weak back-references keyed
//! by the same names, so every key in them is also a key in `entities`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use super::SceneError;
use crate::ecs::Entity;
use crate::render::{Camera, Light};

/// Contact between two entities, recorded by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// First entity involved
    pub first: String,
    /// Second entity involved
    pub second: String,
}

/// Named collection of entities, cameras and lights
#[derive(Debug, Default)]
pub struct Scene {
    name: String,
    entities: HashMap<String, Arc<Entity>>,
    actors: HashMap<String, Weak<Entity>>,
    ais: HashMap<String, Weak<Entity>>,
    cameras: HashMap<String, Arc<Camera>>,
    active_camera: Option<Weak<Camera>>,
    lights: HashMap<String, Light>,
    light_probe_count: usize,
    collisions: Vec<Collision>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Result<Self, SceneError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SceneError::Argument("scene name must not be empty".to_string()));
        }
        Ok(Self {
            name,
            ..Default::default()
        })
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add an entity, replacing any entity with the same name
    ///
    /// Actor and AI back-references are updated to match the new entity.
    pub fn append_entity(&mut self, entity: Entity) -> Arc<Entity> {
        let name = entity.name().to_string();
        let entity = Arc::new(entity);

        if self.entities.insert(name.clone(), Arc::clone(&entity)).is_some() {
            log::warn!("Scene \"{}\": entity \"{}\" replaced a previous entity", self.name, name);
        }

        if entity.is_actor() {
            self.actors.insert(name.clone(), Arc::downgrade(&entity));
        } else {
            self.actors.remove(&name);
        }
        if entity.has_ai() {
            self.ais.insert(name, Arc::downgrade(&entity));
        } else {
            self.ais.remove(&name);
        }

        entity
    }

    /// Add a camera, replacing any camera with the same name
    pub fn append_camera(&mut self, camera: Camera) {
        let name = camera.name.clone();
        if self.cameras.insert(name.clone(), Arc::new(camera)).is_some() {
            log::warn!("Scene \"{}\": camera \"{}\" replaced a previous camera", self.name, name);
        }
    }

    /// Add a light, replacing any light with the same name
    pub fn append_light(&mut self, light: Light) {
        let name = light.name.clone();
        if self.lights.insert(name.clone(), light).is_some() {
            log::warn!("Scene \"{}\": light \"{}\" replaced a previous light", self.name, name);
        }
    }

    /// Record a collision between two entities of this scene
    pub fn append_collision(&mut self, collision: Collision) -> Result<(), SceneError> {
        for name in [&collision.first, &collision.second] {
            if !self.entities.contains_key(name) {
                return Err(SceneError::EntityNotFound(name.clone()));
            }
        }
        self.collisions.push(collision);
        Ok(())
    }

    /// Record how many light probes the description declared
    pub fn set_light_probe_count(&mut self, count: usize) {
        self.light_probe_count = count;
    }

    /// Look up an entity by name
    pub fn find_entity(&self, name: &str) -> Option<&Arc<Entity>> {
        self.entities.get(name)
    }

    /// Look up a camera by name
    pub fn find_camera(&self, name: &str) -> Option<&Arc<Camera>> {
        self.cameras.get(name)
    }

    /// Look up a light by name
    pub fn find_light(&self, name: &str) -> Option<&Light> {
        self.lights.get(name)
    }

    /// Make the named camera the active one
    pub fn set_active_camera(&mut self, name: &str) -> Result<(), SceneError> {
        let camera = self
            .cameras
            .get(name)
            .ok_or_else(|| SceneError::CameraNotFound(name.to_string()))?;
        self.active_camera = Some(Arc::downgrade(camera));
        log::debug!("Scene \"{}\": active camera is now \"{}\"", self.name, name);
        Ok(())
    }

    /// The active camera
    ///
    /// `None` if no camera was activated, or the active one has since been
    /// replaced by a camera of the same name.
    pub fn active_camera(&self) -> Option<Arc<Camera>> {
        self.active_camera.as_ref().and_then(Weak::upgrade)
    }

    /// All entities, in no particular order
    pub fn entities(&self) -> impl Iterator<Item = &Arc<Entity>> {
        self.entities.values()
    }

    /// Entities carrying a rigidbody
    pub fn actors(&self) -> impl Iterator<Item = Arc<Entity>> + '_ {
        self.actors.values().filter_map(Weak::upgrade)
    }

    /// Entities carrying an AI state machine
    pub fn ais(&self) -> impl Iterator<Item = Arc<Entity>> + '_ {
        self.ais.values().filter_map(Weak::upgrade)
    }

    /// All cameras
    pub fn cameras(&self) -> impl Iterator<Item = &Arc<Camera>> {
        self.cameras.values()
    }

    /// All lights
    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.lights.values()
    }

    /// Recorded collisions, oldest first
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Number of entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of actors
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Number of AI-bearing entities
    pub fn ai_count(&self) -> usize {
        self.ais.len()
    }

    /// Number of cameras
    pub fn camera_count(&self) -> usize {
        self.cameras.len()
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Number of light probes declared by the description
    pub fn light_probe_count(&self) -> usize {
        self.light_probe_count
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entities: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        let mut cameras: Vec<&str> = self.cameras.keys().map(String::as_str).collect();
        entities.sort_unstable();
        cameras.sort_unstable();

        writeln!(f, " - Scene info -")?;
        writeln!(f, "name     : \"{}\"", self.name)?;
        writeln!(f, "entities :")?;
        for name in entities {
            writeln!(f, "\t\"{name}\"")?;
        }
        writeln!(f, "cameras  :")?;
        for name in cameras {
            writeln!(f, "\t\"{name}\"")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AIStateMachine;
    use crate::ecs::RigidbodyComponent;
    use crate::foundation::math::Vec3;

    fn camera(name: &str) -> Camera {
        Camera::perspective(name, Vec3::new(0.0, 0.0, 5.0), 60.0, 1.0, 0.1, 100.0)
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(Scene::new(""), Err(SceneError::Argument(_))));
    }

    #[test]
    fn test_back_references() {
        let mut scene = Scene::new("level").unwrap();
        scene.append_entity(Entity::new("rock"));
        scene.append_entity(Entity::new("ball").with_rigidbody(RigidbodyComponent::default()));
        let ai = AIStateMachine::new("Guard", ["idle"], "idle").unwrap();
        scene.append_entity(Entity::new("guard").with_ai(ai));

        assert_eq!(scene.entity_count(), 3);
        assert_eq!(scene.actor_count(), 1);
        assert_eq!(scene.ai_count(), 1);
        assert_eq!(scene.ais().next().map(|e| e.name().to_string()).as_deref(), Some("guard"));

        // Replacing "ball" with a plain entity drops its actor entry
        scene.append_entity(Entity::new("ball"));
        assert_eq!(scene.entity_count(), 3);
        assert_eq!(scene.actor_count(), 0);
    }

    #[test]
    fn test_active_camera() {
        let mut scene = Scene::new("level").unwrap();
        scene.append_camera(camera("main"));
        scene.append_camera(camera("debug"));

        assert!(scene.active_camera().is_none());
        assert!(matches!(
            scene.set_active_camera("missing"),
            Err(SceneError::CameraNotFound(ref name)) if name == "missing"
        ));

        scene.set_active_camera("debug").unwrap();
        assert_eq!(scene.active_camera().map(|c| c.name.clone()).as_deref(), Some("debug"));
        assert!(scene.find_camera("main").is_some());
    }

    #[test]
    fn test_duplicate_camera_overwrites() {
        let mut scene = Scene::new("level").unwrap();
        scene.append_camera(camera("main"));
        scene.set_active_camera("main").unwrap();
        scene.append_camera(camera("main"));

        assert_eq!(scene.camera_count(), 1);
        assert!(scene.active_camera().is_none());
    }

    #[test]
    fn test_collisions_require_known_entities() {
        let mut scene = Scene::new("level").unwrap();
        scene.append_entity(Entity::new("a"));
        scene.append_entity(Entity::new("b"));

        let hit = Collision {
            first: "a".to_string(),
            second: "b".to_string(),
        };
        scene.append_collision(hit.clone()).unwrap();
        assert_eq!(scene.collisions(), &[hit]);

        let ghost = Collision {
            first: "a".to_string(),
            second: "ghost".to_string(),
        };
        assert!(matches!(scene.append_collision(ghost), Err(SceneError::EntityNotFound(_))));
    }

    #[test]
    fn test_display() {
        let mut scene = Scene::new("level").unwrap();
        scene.append_entity(Entity::new("b"));
        scene.append_entity(Entity::new("a"));
        scene.append_camera(camera("main"));

        let info = scene.to_string();
        assert!(info.contains("name     : \"level\""));
        let a = info.find("\"a\"").unwrap();
        let b = info.find("\"b\"").unwrap();
        assert!(a < b);
        assert!(info.contains("\"main\""));
    }
}
