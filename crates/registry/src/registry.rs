//! Two process-global maps — `instances` and `engines` — each guarded by
//! a reader/writer lock, plus the routing/rebinding rules between them.
//! Same `RwLock<HashMap<...>>` field shape and "lock, read/mutate,
//! drop guard" access pattern as the rest of the workspace, avoiding
//! holding a lock across an `.await`.

use crate::instance::{Instance, InstanceData};
use crate::process_defaults::ProcessDefaults;
use crate::scheduler::{Scheduler, SchedulerOutcome};
use dsep_core::{DseError, EngineName, InstanceName, Scope};
use dsep_engine::{Engine, ScriptEngine};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Builds a fresh boxed engine for a newly created `Engine` worker thread.
/// Shared across every engine the registry spawns, so it must be cheap to
/// call repeatedly and safe to call from any thread.
pub type EngineFactory = Arc<dyn Fn() -> Box<dyn ScriptEngine> + Send + Sync>;

/// Bulk selector for `DeleteScript`/`Reset` host actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFilter {
    All,
    AllShared,
    AllPrivate,
    Named(InstanceName),
}

fn matches_filter(data: &InstanceData, name: &InstanceName, filter: &DeleteFilter) -> bool {
    match filter {
        DeleteFilter::All => true,
        DeleteFilter::AllShared => data.scope == Scope::Shared,
        DeleteFilter::AllPrivate => data.scope == Scope::Private,
        DeleteFilter::Named(n) => n == name,
    }
}

struct EngineSlot {
    engine: Arc<Engine>,
}

pub struct Registry {
    instances: RwLock<HashMap<InstanceName, Arc<Instance>>>,
    engines: RwLock<HashMap<EngineName, EngineSlot>>,
    factory: EngineFactory,
    scheduler: Scheduler,
}

fn log_engine_error(name: EngineName) -> impl FnMut(DseError) + Send + 'static {
    move |err| tracing::error!(engine = %name, error = %err, "engine error")
}

impl Registry {
    /// Creates the Shared engine eagerly, per the routing rules.
    pub fn new(factory: EngineFactory, defaults: ProcessDefaults) -> Self {
        let registry = Registry {
            instances: RwLock::new(HashMap::new()),
            engines: RwLock::new(HashMap::new()),
            factory,
            scheduler: Scheduler::new(defaults),
        };
        registry.spawn_engine(EngineName::shared());
        registry
    }

    fn spawn_engine(&self, name: EngineName) -> Arc<Engine> {
        let make_engine = self.factory.clone();
        let error_name = name.clone();
        let engine = Arc::new(Engine::spawn(
            name.as_str(),
            move || make_engine(),
            log_engine_error(error_name),
        ));
        self.engines.write().insert(name, EngineSlot { engine: engine.clone() });
        engine
    }

    fn engine_for(&self, data: &InstanceData) -> Arc<Engine> {
        let name = if data.scope == Scope::Shared {
            EngineName::shared()
        } else {
            EngineName::from(data.engine_name.as_str())
        };
        if let Some(slot) = self.engines.read().get(&name) {
            return slot.engine.clone();
        }
        self.spawn_engine(name)
    }

    pub fn instance_names(&self) -> Vec<InstanceName> {
        self.instances.read().keys().cloned().collect()
    }

    pub fn engine_names(&self) -> Vec<EngineName> {
        self.engines.read().keys().cloned().collect()
    }

    pub fn get(&self, name: &InstanceName) -> Option<Arc<Instance>> {
        self.instances.read().get(name).cloned()
    }

    /// Look up an existing instance or create+bind a new one.
    pub async fn get_or_create(&self, name: InstanceName, data: InstanceData) -> Result<Arc<Instance>, DseError> {
        if let Some(existing) = self.get(&name) {
            return Ok(existing);
        }
        let engine = self.engine_for(&data);
        let instance = Arc::new(Instance::new(name.clone(), data));
        engine.bind_instance(name.as_str()).await?;
        self.instances.write().insert(name, instance.clone());
        Ok(instance)
    }

    /// Rebinds an instance to a (possibly new) scope/engine, per the
    /// four-step procedure: drain, serialize
    /// `stored_data`, clear timers on the old engine, rebind on the new
    /// one. "Drain" here is "hold the instance's write lock across the
    /// whole rebind" since evaluation also takes that lock.
    pub async fn rebind(&self, name: &InstanceName, new_scope: Scope, new_engine_name: &str) -> Result<(), DseError> {
        let instance = self.get(name).ok_or_else(|| DseError::PersistenceError(format!("no such instance {name}")))?;
        let old_engine = {
            let guard = instance.read()?;
            self.engine_for(&guard.data)
        };

        let mut guard = instance.write()?;
        let stored_data = guard.data.stored_data.clone();
        old_engine.clear_instance_data(name.as_str()).await?;

        guard.data.scope = new_scope;
        guard.data.engine_name = new_engine_name.to_string();
        guard.data.stored_data = stored_data;
        drop(guard);

        let new_engine = self.engine_for(&instance.read()?.data);
        new_engine.bind_instance(name.as_str()).await?;
        Ok(())
    }

    /// Remove instances matching `filter`. Private engines left with no
    /// bound instance are shut down; instances on a removed engine are never silently
    /// stranded because they were removed in the same pass.
    pub fn delete(&self, filter: DeleteFilter) -> Vec<InstanceName> {
        let mut instances = self.instances.write();
        let removed: Vec<InstanceName> = instances
            .iter()
            .filter(|(name, inst)| {
                inst.read().map(|g| matches_filter(&g.data, name, &filter)).unwrap_or(false)
            })
            .map(|(name, _)| name.clone())
            .collect();
        for name in &removed {
            instances.remove(name);
        }
        drop(instances);
        self.prune_idle_private_engines();
        removed
    }

    fn prune_idle_private_engines(&self) {
        let still_used: std::collections::HashSet<EngineName> = self
            .instances
            .read()
            .values()
            .filter_map(|inst| inst.read().ok().map(|g| EngineName::from(g.data.engine_name.as_str())))
            .collect();
        let mut engines = self.engines.write();
        let idle: Vec<EngineName> = engines
            .keys()
            .filter(|name| !name.is_shared() && !still_used.contains(*name))
            .cloned()
            .collect();
        for name in idle {
            if let Some(slot) = engines.remove(&name) {
                if let Ok(engine) = Arc::try_unwrap(slot.engine) {
                    engine.shutdown();
                }
            }
        }
    }

    /// Reset engines matching `filter`'s scope, re-marking their bound
    /// instances `Uninitialized` so they re-evaluate from scratch.
    pub async fn reset(&self, filter: DeleteFilter) -> Result<(), DseError> {
        let names: Vec<InstanceName> = {
            let instances = self.instances.read();
            instances
                .iter()
                .filter(|(name, inst)| inst.read().map(|g| matches_filter(&g.data, name, &filter)).unwrap_or(false))
                .map(|(name, _)| name.clone())
                .collect()
        };
        for name in &names {
            if let Some(inst) = self.get(name) {
                let engine = self.engine_for(&inst.read()?.data);
                engine.clear_instance_data(name.as_str()).await?;
                let mut guard = inst.write()?;
                guard.flags = dsep_core::StateFlags::UNINITIALIZED;
            }
        }
        Ok(())
    }

    /// Feed a button-down to the instance's scheduler. If the instance is
    /// `REPEAT_ON_HOLD`, spawns the owning repeat-tick loop.
    pub async fn press(&self, name: &InstanceName) -> Result<SchedulerOutcome, DseError> {
        let instance = self.get(name).ok_or_else(|| DseError::PersistenceError(format!("no such instance {name}")))?;
        let engine = self.engine_for(&instance.read()?.data);
        let outcome = self.scheduler.press(&instance, &engine).await?;
        if let Some(start) = outcome.start_repeat {
            self.spawn_repeat_loop(instance, engine, start.repeater_id, start.delay_ms);
        }
        Ok(outcome)
    }

    /// Feeds a button-up to the scheduler. A `finished` outcome on a
    /// `Temporary`-persistence instance removes it from the registry in
    /// the same call, so a lookup right after always misses.
    pub async fn release(&self, name: &InstanceName) -> Result<SchedulerOutcome, DseError> {
        let instance = self.get(name).ok_or_else(|| DseError::PersistenceError(format!("no such instance {name}")))?;
        let engine = self.engine_for(&instance.read()?.data);
        let outcome = self.scheduler.release(&instance, &engine).await?;
        if outcome.finished && instance.read()?.data.persistence == dsep_core::Persistence::Temporary {
            self.delete(DeleteFilter::Named(name.clone()));
        }
        Ok(outcome)
    }

    pub async fn update(&self, name: &InstanceName, new_source: String) -> Result<SchedulerOutcome, DseError> {
        let instance = self.get(name).ok_or_else(|| DseError::PersistenceError(format!("no such instance {name}")))?;
        let engine = self.engine_for(&instance.read()?.data);
        self.scheduler.update(&instance, &engine, new_source).await
    }

    /// Owns the `tokio::time::sleep` loop behind repeat-on-hold: wait the
    /// delay, tick, and keep going only while `TickOutcome::continue_repeating`
    /// says the repeater id is still current. Outcomes fall on the floor
    /// here (no `HostOutput` sink wired up at this layer) — the Host
    /// Bridge should poll `Instance::read` for state instead of relying on
    /// this task for delivery.
    fn spawn_repeat_loop(&self, instance: Arc<Instance>, engine: Arc<Engine>, repeater_id: u64, first_delay_ms: i64) {
        let scheduler = self.scheduler.clone();
        tokio::spawn(async move {
            let mut delay_ms = first_delay_ms;
            loop {
                tokio::time::sleep(Duration::from_millis(delay_ms.max(0) as u64)).await;
                match scheduler.tick(&instance, &engine, repeater_id).await {
                    Ok((_, tick)) if tick.continue_repeating => delay_ms = tick.next_delay_ms,
                    _ => break,
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
