use scriptable_api::{Behavior, Component, Result, ScriptError, Value};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{debug, warn};

/// What `run_all` does when a slot fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RunPolicy {
    /// Keep running the remaining slots and record every failure
    #[default]
    Continue,
    /// Stop at the first failure; later slots are not run
    Halt,
}

/// Result of running one slot as part of `run_all`
#[derive(Debug)]
pub enum SlotOutcome {
    Ran,
    Empty,
    Failed(ScriptError),
    /// Skipped because an earlier slot failed under [`RunPolicy::Halt`]
    NotRun,
}

/// Per-slot results of a `run_all` batch, in slot order
#[derive(Debug)]
pub struct RunReport {
    outcomes: Vec<SlotOutcome>,
}

impl RunReport {
    pub fn outcomes(&self) -> &[SlotOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, index: usize) -> Option<&SlotOutcome> {
        self.outcomes.get(index)
    }

    pub fn is_success(&self) -> bool {
        !self
            .outcomes
            .iter()
            .any(|o| matches!(o, SlotOutcome::Failed(_) | SlotOutcome::NotRun))
    }

    pub fn ran_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SlotOutcome::Ran))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &ScriptError)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, outcome)| match outcome {
                SlotOutcome::Failed(err) => Some((index, err)),
                _ => None,
            })
    }

    pub fn into_outcomes(self) -> Vec<SlotOutcome> {
        self.outcomes
    }
}

/// Owns a fixed number of component slots and proxies calls to them by index
pub struct Container {
    slots: Box<[Option<Box<dyn Component>>]>,
    run_policy: RunPolicy,
}

impl Container {
    /// Create a container with `slot_count` empty slots
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: (0..slot_count).map(|_| None).collect(),
            run_policy: RunPolicy::default(),
        }
    }

    /// Create a container filled with `components`, starting each in order.
    ///
    /// A missing per-slot entry in `start_parameters` (or omitting it
    /// entirely) starts that slot with no parameters.
    pub fn with_components(
        components: Vec<Box<dyn Component>>,
        start_parameters: Option<&[Vec<Value>]>,
    ) -> Result<Self> {
        let start_parameters = start_parameters.unwrap_or_default();
        if start_parameters.len() > components.len() {
            return Err(ScriptError::argument_mismatch(
                "start",
                format!(
                    "{} parameter lists for {} components",
                    start_parameters.len(),
                    components.len()
                ),
            ));
        }

        let mut slots = Vec::with_capacity(components.len());
        for (index, mut component) in components.into_iter().enumerate() {
            let parameters = start_parameters.get(index).map_or(&[][..], Vec::as_slice);
            debug!(target: "scripting", "Starting slot {} ({})", index, component.id());
            component
                .start(parameters)
                .map_err(|source| ScriptError::SlotFailure {
                    index,
                    source: Box::new(source),
                })?;
            slots.push(Some(component));
        }

        Ok(Self {
            slots: slots.into_boxed_slice(),
            run_policy: RunPolicy::default(),
        })
    }

    pub fn with_run_policy(mut self, run_policy: RunPolicy) -> Self {
        self.run_policy = run_policy;
        self
    }

    pub fn run_policy(&self) -> RunPolicy {
        self.run_policy
    }

    pub fn set_run_policy(&mut self, run_policy: RunPolicy) {
        self.run_policy = run_policy;
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_occupied(&self, index: usize) -> Result<bool> {
        Ok(self.slot(index)?.is_some())
    }

    /// Iterate over all slots in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, Option<&dyn Component>)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| (index, slot.as_deref()))
    }

    fn slot(&self, index: usize) -> Result<&Option<Box<dyn Component>>> {
        let len = self.slots.len();
        self.slots
            .get(index)
            .ok_or(ScriptError::IndexOutOfRange { index, len })
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut Option<Box<dyn Component>>> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .ok_or(ScriptError::IndexOutOfRange { index, len })
    }

    /// Borrow the component in a slot
    pub fn get_slot(&self, index: usize) -> Result<&dyn Component> {
        self.slot(index)?
            .as_deref()
            .ok_or(ScriptError::SlotEmpty { index })
    }

    pub fn get_slot_mut(&mut self, index: usize) -> Result<&mut (dyn Component + 'static)> {
        self.slot_mut(index)?
            .as_deref_mut()
            .ok_or(ScriptError::SlotEmpty { index })
    }

    /// Borrow a slot's occupant as its concrete behavior, if it is one
    pub fn downcast_slot<S: Behavior>(&self, index: usize) -> Result<Option<&S>> {
        Ok(self.get_slot(index)?.as_any().downcast_ref::<S>())
    }

    pub fn downcast_slot_mut<S: Behavior>(&mut self, index: usize) -> Result<Option<&mut S>> {
        Ok(self.get_slot_mut(index)?.as_any_mut().downcast_mut::<S>())
    }

    /// Start `component` and place it in slot `index`, handing back the
    /// previous occupant.
    ///
    /// If `start` fails the slot is left as it was.
    pub fn set_slot(
        &mut self,
        index: usize,
        mut component: Box<dyn Component>,
        start_parameters: &[Value],
    ) -> Result<Option<Box<dyn Component>>> {
        // Validate before anything reaches the component
        self.slot(index)?;

        debug!(target: "scripting", "Starting {} for slot {}", component.id(), index);
        component.start(start_parameters)?;

        let previous = self.slot_mut(index)?.replace(component);
        if let Some(previous) = &previous {
            debug!(target: "scripting", "Replaced {} in slot {}", previous.id(), index);
        }
        Ok(previous)
    }

    /// Empty a slot, handing back its occupant
    pub fn take_slot(&mut self, index: usize) -> Result<Option<Box<dyn Component>>> {
        Ok(self.slot_mut(index)?.take())
    }

    pub fn get_slot_member(&self, index: usize, member: &str) -> Result<Value> {
        self.get_slot(index)?.get_member(member)
    }

    pub fn set_slot_member(&mut self, index: usize, member: &str, value: Value) -> Result<()> {
        self.get_slot_mut(index)?.set_member(member, value)
    }

    pub fn invoke_slot_method(
        &mut self,
        index: usize,
        method: &str,
        parameters: &[Value],
    ) -> Result<Value> {
        self.get_slot_mut(index)?.invoke_method(method, parameters)
    }

    pub fn run_slot(&mut self, index: usize, parameters: &[Value]) -> Result<()> {
        self.get_slot_mut(index)?.run(parameters)
    }

    /// Run every occupied slot in ascending index order.
    ///
    /// `parameters_per_slot[i]` goes to slot `i`; slots past the end of the
    /// list run with no parameters. Supplying more lists than there are slots
    /// is rejected before anything runs.
    pub fn run_all(&mut self, parameters_per_slot: &[Vec<Value>]) -> Result<RunReport> {
        if parameters_per_slot.len() > self.slots.len() {
            return Err(ScriptError::argument_mismatch(
                "run",
                format!(
                    "{} parameter lists for {} slots",
                    parameters_per_slot.len(),
                    self.slots.len()
                ),
            ));
        }

        let mut outcomes = Vec::with_capacity(self.slots.len());
        let mut halted = false;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(component) = slot else {
                outcomes.push(SlotOutcome::Empty);
                continue;
            };

            if halted {
                outcomes.push(SlotOutcome::NotRun);
                continue;
            }

            let parameters = parameters_per_slot
                .get(index)
                .map_or(&[][..], Vec::as_slice);

            match component.run(parameters) {
                Ok(()) => outcomes.push(SlotOutcome::Ran),
                Err(e) => {
                    warn!(target: "scripting", "Slot {} ({}) failed to run: {}", index, component.id(), e);
                    outcomes.push(SlotOutcome::Failed(e));
                    if self.run_policy == RunPolicy::Halt {
                        halted = true;
                    }
                }
            }
        }

        Ok(RunReport { outcomes })
    }
}
