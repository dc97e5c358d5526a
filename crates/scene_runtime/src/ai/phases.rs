//! Per-frame AI phases fed by two independent work queues
//!
//! Each queue is refilled with every AI-bearing entity once it has run
//! dry, independently of the other. Each call to a phase pops at most one
//! entity and runs its callback, so a scheduler invoking the phase once per
//! frame spreads the backlog across frames instead of draining it at once.

use std::sync::Arc;

use super::{AiCallback, AiError};
use crate::ecs::Entity;
use crate::foundation::{QueueError, WorkQueue};

/// Pre-update and update request queues
#[derive(Debug, Default)]
pub struct AiQueues {
    pre_update: WorkQueue<Arc<Entity>>,
    update: WorkQueue<Arc<Entity>>,
}

impl AiQueues {
    /// Create two empty, unbounded queues
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents of both queues with `entities`
    ///
    /// # Returns
    /// Number of entities submitted
    pub fn submit<I>(&self, entities: I) -> Result<usize, QueueError>
    where
        I: IntoIterator<Item = Arc<Entity>>,
    {
        let batch: Vec<Arc<Entity>> = entities.into_iter().collect();
        self.submit_pre_update(batch.iter().cloned())?;
        self.submit_update(batch)
    }

    /// Replace the pre-update queue contents with `entities`
    pub fn submit_pre_update<I>(&self, entities: I) -> Result<usize, QueueError>
    where
        I: IntoIterator<Item = Arc<Entity>>,
    {
        refill(&self.pre_update, entities, "pre-update")
    }

    /// Replace the update queue contents with `entities`
    pub fn submit_update<I>(&self, entities: I) -> Result<usize, QueueError>
    where
        I: IntoIterator<Item = Arc<Entity>>,
    {
        refill(&self.update, entities, "update")
    }

    /// Pending (pre-update, update) request counts
    pub fn pending(&self) -> (usize, usize) {
        (self.pre_update.len(), self.update.len())
    }

    /// Discard every pending request
    pub fn clear(&self) {
        self.pre_update.drain();
        self.update.drain();
    }

    /// Pop one entity and run its pre-update callback
    ///
    /// An empty queue, or an entity with no pre-update callback, is success.
    ///
    /// # Returns
    /// `true` if an entity was taken from the queue
    pub fn pre_update_phase(&self) -> Result<bool, AiError> {
        let Some(entity) = self.pre_update.try_pop() else {
            return Ok(false);
        };
        let callback = entity.map_ai(|ai| ai.pre_update_callback()).flatten();
        dispatch(&entity, callback, "pre-update")?;
        Ok(true)
    }

    /// Pop one entity and run the callback bound to its current state
    ///
    /// An empty queue, or an unbound state, is success.
    ///
    /// # Returns
    /// `true` if an entity was taken from the queue
    pub fn update_phase(&self) -> Result<bool, AiError> {
        let Some(entity) = self.update.try_pop() else {
            return Ok(false);
        };
        let callback = entity.map_ai(|ai| ai.current_callback()).flatten();
        dispatch(&entity, callback, "update")?;
        Ok(true)
    }
}

fn refill<I>(queue: &WorkQueue<Arc<Entity>>, entities: I, phase: &'static str) -> Result<usize, QueueError>
where
    I: IntoIterator<Item = Arc<Entity>>,
{
    let batch: Vec<Arc<Entity>> = entities.into_iter().collect();
    let count = batch.len();
    let stale = queue.refill(batch)?;
    if stale > 0 {
        log::trace!("Discarded {} stale AI {} request(s)", stale, phase);
    }
    Ok(count)
}

// Runs with the entity's AI lock released so the callback may switch states.
fn dispatch(entity: &Entity, callback: Option<AiCallback>, phase: &'static str) -> Result<(), AiError> {
    let Some(callback) = callback else {
        return Ok(());
    };
    log::trace!("Running AI {} for \"{}\"", phase, entity.name());
    callback(entity).map_err(|source| AiError::Callback {
        entity: entity.name().to_string(),
        phase,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{callback, AIStateMachine};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn guard_entity(name: &str, hits: &Arc<AtomicUsize>) -> Arc<Entity> {
        let mut ai = AIStateMachine::new("Guard", ["idle", "alert"], "idle").unwrap();
        let idle_hits = Arc::clone(hits);
        ai.add_state_callback(
            "idle",
            callback(move |entity| {
                idle_hits.fetch_add(1, Ordering::SeqCst);
                entity.set_ai_state("alert");
                Ok(())
            }),
        );
        let pre_hits = Arc::clone(hits);
        ai.set_pre_update_callback(callback(move |_| {
            pre_hits.fetch_add(100, Ordering::SeqCst);
            Ok(())
        }));
        Arc::new(Entity::new(name).with_ai(ai))
    }

    #[test]
    fn test_empty_queues_are_success() {
        let queues = AiQueues::new();
        assert!(!queues.pre_update_phase().unwrap());
        assert!(!queues.update_phase().unwrap());
    }

    #[test]
    fn test_update_runs_one_entity_per_call() {
        let hits = Arc::new(AtomicUsize::new(0));
        let queues = AiQueues::new();
        let entities = vec![guard_entity("a", &hits), guard_entity("b", &hits)];
        assert_eq!(queues.submit(entities.iter().cloned()).unwrap(), 2);

        assert!(queues.update_phase().unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(queues.pending(), (2, 1));

        assert!(queues.update_phase().unwrap());
        assert!(!queues.update_phase().unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        // The idle callback switched both entities to "alert"
        for entity in &entities {
            assert_eq!(entity.current_ai_state().as_deref(), Some("alert"));
        }
    }

    #[test]
    fn test_pre_update_phase() {
        let hits = Arc::new(AtomicUsize::new(0));
        let queues = AiQueues::new();
        queues.submit(vec![guard_entity("a", &hits)]).unwrap();

        assert!(queues.pre_update_phase().unwrap());
        assert_eq!(hits.load(Ordering::SeqCst), 100);
        assert_eq!(queues.pending(), (0, 1));
    }

    #[test]
    fn test_submit_discards_leftovers() {
        let hits = Arc::new(AtomicUsize::new(0));
        let queues = AiQueues::new();
        queues
            .submit(vec![guard_entity("a", &hits), guard_entity("b", &hits)])
            .unwrap();
        queues.submit(vec![guard_entity("c", &hits)]).unwrap();
        assert_eq!(queues.pending(), (1, 1));

        queues.clear();
        assert_eq!(queues.pending(), (0, 0));
    }

    #[test]
    fn test_queues_refill_independently() {
        let hits = Arc::new(AtomicUsize::new(0));
        let queues = AiQueues::new();
        let entities = vec![guard_entity("a", &hits), guard_entity("b", &hits)];
        queues.submit(entities.iter().cloned()).unwrap();

        assert!(queues.update_phase().unwrap());
        assert!(queues.update_phase().unwrap());
        assert_eq!(queues.pending(), (2, 0));

        // Reloading the update queue leaves pending pre-updates alone
        assert_eq!(queues.submit_update(entities.iter().cloned()).unwrap(), 2);
        assert_eq!(queues.pending(), (2, 2));

        assert!(queues.pre_update_phase().unwrap());
        assert_eq!(queues.submit_pre_update(entities.iter().cloned()).unwrap(), 2);
        assert_eq!(queues.pending(), (2, 2));
    }

    #[test]
    fn test_callback_failure_is_reported() {
        let mut ai = AIStateMachine::new("Broken", ["idle"], "idle").unwrap();
        ai.add_state_callback("idle", callback(|_| Err("no path to target".into())));
        let queues = AiQueues::new();
        queues.submit(vec![Arc::new(Entity::new("broken").with_ai(ai))]).unwrap();

        let err = queues.update_phase().unwrap_err();
        assert!(matches!(err, AiError::Callback { ref entity, phase: "update", .. } if entity == "broken"));
    }

    #[test]
    fn test_unbound_state_is_noop() {
        let ai = AIStateMachine::new("Idle", ["idle"], "idle").unwrap();
        let queues = AiQueues::new();
        queues.submit(vec![Arc::new(Entity::new("statue").with_ai(ai))]).unwrap();
        assert!(queues.update_phase().unwrap());
        assert!(queues.pre_update_phase().unwrap());
    }
}
