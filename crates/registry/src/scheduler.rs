//! Evaluation scheduler: the per-instance Press / Release /
//! Update / default-changed state machine. States are modeled directly as
//! the subset of [`StateFlags`] that matters here (`Pressed`, `Evaluating`
//! is transient around the `await`, `Repeating`, `HoldReleased`) rather
//! than a parallel enum, since the flags already live on the instance and
//! are what the host-facing `lastError`/state reporting reads.

use crate::instance::Instance;
use crate::process_defaults::{effective_interval_ms, ProcessDefaults};
use dsep_core::{Activation, DseError, InputType, ScriptError, StateFlags};
use dsep_engine::{Engine, ScriptValue};

/// Result of feeding one scheduler event, for the registry/bridge to turn
/// into host output (a `stateUpdate`, or nothing).
#[derive(Debug, Default, Clone)]
pub struct SchedulerOutcome {
    pub evaluated: Option<ScriptValue>,
    pub error: Option<ScriptError>,
    /// Set when a repeat-on-hold loop should be (re)started; the caller
    /// spawns the actual delay and calls [`Scheduler::tick`] when it fires.
    pub start_repeat: Option<RepeatStart>,
    pub finished: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RepeatStart {
    pub repeater_id: u64,
    pub delay_ms: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    /// `false` means the repeater id no longer matches (or the instance is
    /// no longer pressed) — the caller must stop rescheduling.
    pub continue_repeating: bool,
    pub next_delay_ms: i64,
}

#[derive(Clone)]
pub struct Scheduler {
    defaults: ProcessDefaults,
}

impl Scheduler {
    pub fn new(defaults: ProcessDefaults) -> Self {
        Self { defaults }
    }

    async fn evaluate_source(
        &self,
        instance: &Instance,
        engine: &Engine,
    ) -> Result<Result<ScriptValue, dsep_engine::EngineError>, DseError> {
        let (input_type, source, file, alias) = {
            let guard = instance.read()?;
            (guard.data.input_type, guard.data.source.clone(), guard.data.file.clone(), guard.data.module_alias.clone())
        };
        Ok(match input_type {
            InputType::Expression => engine.evaluate_expression(source, instance.name.as_str()).await,
            InputType::ScriptFile => {
                engine.evaluate_script_file(file, source, instance.name.as_str()).await
            }
            InputType::Module => {
                engine.evaluate_module(file, alias, source, instance.name.as_str()).await
            }
        })
    }

    fn record_result(
        &self,
        result: Result<ScriptValue, dsep_engine::EngineError>,
    ) -> (Option<ScriptValue>, Option<ScriptError>) {
        match result {
            Ok(value) if !value.is_null_ish() => (Some(value), None),
            Ok(_) => (None, None),
            Err(dsep_engine::EngineError::Script { source, .. }) => (None, Some(source.0.as_ref().clone())),
            Err(other) => (None, Some(ScriptError::new(other.to_string()))),
        }
    }

    /// `Idle --Press--> Pressed/Evaluating`.
    pub async fn press(
        &self,
        instance: &Instance,
        engine: &Engine,
    ) -> Result<SchedulerOutcome, DseError> {
        if instance.is_critical()? {
            return Ok(SchedulerOutcome::default());
        }

        let (activation, repeat_rate, repeat_delay) = {
            let mut guard = instance.write()?;
            guard.flags = guard.flags.set(StateFlags::PRESSED).set(StateFlags::EVALUATING_NOW);
            (guard.data.activation, guard.data.repeat_rate, guard.data.repeat_delay)
        };

        let mut outcome = SchedulerOutcome::default();

        if activation.contains(Activation::ON_PRESS) {
            let result = self.evaluate_source(instance, engine).await?;
            let (value, error) = self.record_result(result);
            outcome.evaluated = value;
            outcome.error = error;
        }
        if activation.contains(Activation::REPEAT_ON_HOLD) {
            let repeater_id = instance.next_repeater_id()?;
            let delay_ms = effective_interval_ms(repeat_delay, self.defaults.repeat_delay_ms());
            let mut guard = instance.write()?;
            guard.flags = guard.flags.set(StateFlags::REPEATING);
            outcome.start_repeat = Some(RepeatStart { repeater_id, delay_ms });
        }

        let mut guard = instance.write()?;
        guard.flags = guard.flags.clear(StateFlags::EVALUATING_NOW);
        if outcome.error.is_some() {
            guard.flags = guard.flags.set(StateFlags::SCRIPT_ERROR).clear(StateFlags::PRESSED);
        }

        Ok(outcome)
    }

    /// A repeat-timer tick. `repeater_id` is the id captured when the
    /// repeat loop was (re)started; a mismatch (or the instance no longer
    /// being pressed) means a stale tick from a cancelled repeater
    /// ("repeater identity").
    pub async fn tick(
        &self,
        instance: &Instance,
        engine: &Engine,
        repeater_id: u64,
    ) -> Result<(SchedulerOutcome, TickOutcome), DseError> {
        let (still_valid, repeat_rate, under_cap) = {
            let guard = instance.read()?;
            let under_cap = guard.data.max_repeat_count < 0 || guard.repeat_count < guard.data.max_repeat_count;
            (
                guard.repeater_id == repeater_id
                    && guard.flags.contains(StateFlags::PRESSED)
                    && guard.flags.contains(StateFlags::REPEATING),
                guard.data.repeat_rate,
                under_cap,
            )
        };

        if !still_valid || !under_cap {
            return Ok((SchedulerOutcome::default(), TickOutcome { continue_repeating: false, next_delay_ms: 0 }));
        }

        {
            let mut guard = instance.write()?;
            guard.flags = guard.flags.set(StateFlags::EVALUATING_NOW);
            guard.repeat_count += 1;
        }
        let result = self.evaluate_source(instance, engine).await?;
        let (value, error) = self.record_result(result);
        {
            let mut guard = instance.write()?;
            guard.flags = guard.flags.clear(StateFlags::EVALUATING_NOW);
            if error.is_some() {
                guard.flags = guard.flags.set(StateFlags::SCRIPT_ERROR);
            }
        }

        let still_valid_after = {
            let guard = instance.read()?;
            guard.repeater_id == repeater_id && guard.flags.contains(StateFlags::REPEATING)
        };

        let next_delay_ms = effective_interval_ms(repeat_rate, self.defaults.repeat_rate_ms());
        let outcome = SchedulerOutcome { evaluated: value, error, start_repeat: None, finished: false };
        Ok((outcome, TickOutcome { continue_repeating: still_valid_after, next_delay_ms }))
    }

    /// `Pressed --Release--> Idle/Evaluating`.
    pub async fn release(
        &self,
        instance: &Instance,
        engine: &Engine,
    ) -> Result<SchedulerOutcome, DseError> {
        let activation = {
            let mut guard = instance.write()?;
            guard.flags = guard.flags.clear(StateFlags::PRESSED).clear(StateFlags::REPEATING);
            guard.repeater_id += 1; // invalidate any in-flight repeat tick immediately
            guard.data.activation
        };

        let mut outcome = SchedulerOutcome::default();
        if activation.contains(Activation::ON_RELEASE) {
            {
                let mut guard = instance.write()?;
                guard.flags = guard.flags.set(StateFlags::HOLD_RELEASED).set(StateFlags::EVALUATING_NOW);
            }
            let result = self.evaluate_source(instance, engine).await?;
            let (value, error) = self.record_result(result);
            outcome.evaluated = value;
            outcome.error = error;
            let mut guard = instance.write()?;
            guard.flags = guard.flags.clear(StateFlags::EVALUATING_NOW).clear(StateFlags::HOLD_RELEASED);
        } else {
            outcome.finished = true;
        }
        Ok(outcome)
    }

    /// `any --Update(expr)--> Evaluating`: replace the
    /// source and evaluate once.
    pub async fn update(
        &self,
        instance: &Instance,
        engine: &Engine,
        new_source: String,
    ) -> Result<SchedulerOutcome, DseError> {
        if instance.is_critical()? {
            return Ok(SchedulerOutcome::default());
        }
        let input_type = instance.read()?.data.input_type;
        let file = instance.read()?.data.file.clone();
        instance.apply_source(input_type, new_source, file)?;

        {
            let mut guard = instance.write()?;
            guard.flags = guard.flags.set(StateFlags::EVALUATING_NOW);
        }
        let result = self.evaluate_source(instance, engine).await?;
        let (value, error) = self.record_result(result);
        let mut guard = instance.write()?;
        guard.flags = guard.flags.clear(StateFlags::EVALUATING_NOW);
        if error.is_some() {
            guard.flags = guard.flags.set(StateFlags::SCRIPT_ERROR);
        }

        Ok(SchedulerOutcome { evaluated: value, error, start_repeat: None, finished: false })
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
