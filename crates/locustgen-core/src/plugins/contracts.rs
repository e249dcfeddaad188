//! Plugin contracts
//!
//! A plugin is a named set of transformations, each one tied to a
//! [`Contract`] that says which part of the generation it rewrites:
//!
//! | contract | input and output |
//! |---|---|
//! | [`Contract::ON_TASK`] | one [`Task`] |
//! | [`Contract::ON_SCENARIO`] | one [`Scenario`], after its sub-scenarios |
//! | [`Contract::ON_PROGRAM`] | the whole generated [`Program`] |
//! | [`Contract::ON_TASK_SEQUENCE`] | all tasks of a recording (deprecated) |
//!
//! Handlers are typed trait objects, so a handler with the wrong shape does
//! not compile. What remains to check at run time is that a plugin actually
//! provides a handler for every contract it declares; see [`check`].

use std::fmt::{self, Debug, Formatter};
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::sync::Arc;

use locustgen_syntax::Program;

use crate::error::ContractError;
use crate::plugins::decision::Decision;
use crate::scenario::Scenario;
use crate::task::Task;

/// Set of contracts, combinable with `|`
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Contract(u8);

impl Contract {
    /// No contract at all
    pub const NONE: Contract = Contract(0);
    /// Rewrites tasks one by one
    pub const ON_TASK: Contract = Contract(1);
    /// Rewrites scenarios, bottom-up
    pub const ON_SCENARIO: Contract = Contract(1 << 1);
    /// Rewrites the generated program
    pub const ON_PROGRAM: Contract = Contract(1 << 2);
    /// Rewrites the task list of each recording.
    ///
    /// Deprecated: [`Contract::ON_TASK`] and [`Contract::ON_PROGRAM`] cover
    /// its use cases with less boilerplate.
    pub const ON_TASK_SEQUENCE: Contract = Contract(1 << 3);

    /// Every single contract, in the order plugins are grouped
    pub const BASE: [Contract; 4] = [
        Contract::ON_TASK,
        Contract::ON_TASK_SEQUENCE,
        Contract::ON_SCENARIO,
        Contract::ON_PROGRAM,
    ];

    const ALL_BITS: u8 = 0b1111;

    /// Contract from raw bits
    ///
    /// # Errors
    /// [`ContractError::InvalidContract`] if a bit matches no contract
    pub fn from_bits(bits: u8) -> Result<Self, ContractError> {
        if bits & !Self::ALL_BITS != 0 {
            return Err(ContractError::InvalidContract { bits });
        }
        Ok(Self(bits))
    }

    #[inline]
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether every contract of `other` is in `self`
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Contract) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Single contracts making up `self`, in [`Contract::BASE`] order
    pub fn iter(self) -> impl Iterator<Item = Contract> {
        Self::BASE.into_iter().filter(move |c| self.contains(*c))
    }

    /// Name of a single contract
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("ON_TASK"),
            2 => Some("ON_SCENARIO"),
            4 => Some("ON_PROGRAM"),
            8 => Some("ON_TASK_SEQUENCE"),
            _ => None,
        }
    }

    pub(crate) fn suggestions() -> String {
        Self::BASE
            .iter()
            .filter_map(|c| c.name())
            .map(|n| format!("Contract::{n}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Debug for Contract {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("Contract(NONE)");
        }
        let names: Vec<&str> = self.iter().filter_map(Contract::name).collect();
        write!(f, "Contract({})", names.join(" | "))
    }
}

impl BitOr for Contract {
    type Output = Contract;

    fn bitor(self, rhs: Contract) -> Contract {
        Contract(self.0 | rhs.0)
    }
}

impl BitOrAssign for Contract {
    fn bitor_assign(&mut self, rhs: Contract) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Contract {
    type Output = Contract;

    fn bitand(self, rhs: Contract) -> Contract {
        Contract(self.0 & rhs.0)
    }
}

/// Handler for [`Contract::ON_TASK`]
pub trait OnTask: Send + Sync {
    fn on_task(&self, task: Task) -> Task;
}

/// Handler for [`Contract::ON_SCENARIO`]
pub trait OnScenario: Send + Sync {
    fn on_scenario(&self, scenario: Scenario) -> Scenario;
}

/// Handler for [`Contract::ON_PROGRAM`]
pub trait OnProgram: Send + Sync {
    fn on_program(&self, program: Program) -> Program;
}

/// Handler for [`Contract::ON_TASK_SEQUENCE`]
pub trait OnTaskSequence: Send + Sync {
    fn on_task_sequence(&self, tasks: Vec<Task>) -> Vec<Task>;
}

impl<F> OnTask for F
where
    F: Fn(Task) -> Task + Send + Sync,
{
    fn on_task(&self, task: Task) -> Task {
        self(task)
    }
}

impl<F> OnScenario for F
where
    F: Fn(Scenario) -> Scenario + Send + Sync,
{
    fn on_scenario(&self, scenario: Scenario) -> Scenario {
        self(scenario)
    }
}

impl<F> OnProgram for F
where
    F: Fn(Program) -> Program + Send + Sync,
{
    fn on_program(&self, program: Program) -> Program {
        self(program)
    }
}

impl<F> OnTaskSequence for F
where
    F: Fn(Vec<Task>) -> Vec<Task> + Send + Sync,
{
    fn on_task_sequence(&self, tasks: Vec<Task>) -> Vec<Task> {
        self(tasks)
    }
}

/// A named set of handlers, tagged with the contracts it declares
///
/// Cheap to clone: handlers are shared.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    contract: Contract,
    on_task: Option<Arc<dyn OnTask>>,
    on_scenario: Option<Arc<dyn OnScenario>>,
    on_program: Option<Arc<dyn OnProgram>>,
    on_task_sequence: Option<Arc<dyn OnTaskSequence>>,
}

impl Plugin {
    /// Plugin declaring `contract`, without handlers yet
    #[must_use]
    pub fn new(name: impl Into<String>, contract: Contract) -> Self {
        Self {
            name: name.into(),
            contract,
            on_task: None,
            on_scenario: None,
            on_program: None,
            on_task_sequence: None,
        }
    }

    /// Plugin declaring the contracts encoded in `bits`
    ///
    /// # Errors
    /// [`ContractError::InvalidContract`] for unknown bits
    pub fn tagged(name: impl Into<String>, bits: u8) -> Result<Self, ContractError> {
        Ok(Self::new(name, Contract::from_bits(bits)?))
    }

    /// Plugin with a single task handler
    #[must_use]
    pub fn on_task(name: impl Into<String>, handler: impl OnTask + 'static) -> Self {
        Self::new(name, Contract::ON_TASK).task(handler)
    }

    /// Plugin with a single scenario handler
    #[must_use]
    pub fn on_scenario(name: impl Into<String>, handler: impl OnScenario + 'static) -> Self {
        Self::new(name, Contract::ON_SCENARIO).scenario(handler)
    }

    /// Plugin with a single program handler
    #[must_use]
    pub fn on_program(name: impl Into<String>, handler: impl OnProgram + 'static) -> Self {
        Self::new(name, Contract::ON_PROGRAM).program(handler)
    }

    /// Plugin with a single task sequence handler
    #[must_use]
    pub fn on_task_sequence(
        name: impl Into<String>,
        handler: impl OnTaskSequence + 'static,
    ) -> Self {
        Self::new(name, Contract::ON_TASK_SEQUENCE).task_sequence(handler)
    }

    /// Set the task handler. The declared contract is left unchanged.
    #[must_use]
    pub fn task(mut self, handler: impl OnTask + 'static) -> Self {
        self.on_task = Some(Arc::new(handler));
        self
    }

    /// Set the scenario handler. The declared contract is left unchanged.
    #[must_use]
    pub fn scenario(mut self, handler: impl OnScenario + 'static) -> Self {
        self.on_scenario = Some(Arc::new(handler));
        self
    }

    /// Set the program handler. The declared contract is left unchanged.
    #[must_use]
    pub fn program(mut self, handler: impl OnProgram + 'static) -> Self {
        self.on_program = Some(Arc::new(handler));
        self
    }

    /// Set the task sequence handler. The declared contract is left unchanged.
    #[must_use]
    pub fn task_sequence(mut self, handler: impl OnTaskSequence + 'static) -> Self {
        self.on_task_sequence = Some(Arc::new(handler));
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared contracts
    #[inline]
    #[must_use]
    pub fn contract(&self) -> Contract {
        self.contract
    }

    /// Whether a handler is present for the single contract `contract`
    #[must_use]
    pub fn handles(&self, contract: Contract) -> bool {
        match contract {
            Contract::ON_TASK => self.on_task.is_some(),
            Contract::ON_SCENARIO => self.on_scenario.is_some(),
            Contract::ON_PROGRAM => self.on_program.is_some(),
            Contract::ON_TASK_SEQUENCE => self.on_task_sequence.is_some(),
            _ => false,
        }
    }
}

impl Debug for Plugin {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

/// Whether `plugin` can be used, and why not
#[must_use]
pub fn check(plugin: &Plugin) -> Decision {
    if plugin.contract.is_empty() {
        return Decision::no("not tagged with any contract");
    }
    Decision::all(plugin.contract.iter().map(|c| {
        Decision::whether(
            plugin.handles(c),
            format!("declares {c:?} but has no handler for it"),
        )
    }))
}

/// Validate `plugin`
///
/// # Errors
/// [`ContractError::InvalidPlugin`] explaining the first problem found
pub fn validate(plugin: &Plugin) -> Result<(), ContractError> {
    let decision = check(plugin);
    if decision.is_valid() {
        Ok(())
    } else {
        Err(ContractError::InvalidPlugin {
            name: plugin.name.clone(),
            reason: decision.reason().to_string(),
        })
    }
}

/// Something that rewrites a `T`
pub trait Transform<T> {
    fn transform(&self, value: T) -> T;
}

impl<T, F> Transform<T> for F
where
    F: Fn(T) -> T,
{
    fn transform(&self, value: T) -> T {
        self(value)
    }
}

// A plugin without the matching handler leaves the value untouched: grouping
// only puts a plugin in the lists of contracts it declares, and validation
// makes sure declared contracts have handlers.

impl Transform<Task> for Plugin {
    fn transform(&self, task: Task) -> Task {
        match &self.on_task {
            Some(handler) => handler.on_task(task),
            None => task,
        }
    }
}

impl Transform<Scenario> for Plugin {
    fn transform(&self, scenario: Scenario) -> Scenario {
        match &self.on_scenario {
            Some(handler) => handler.on_scenario(scenario),
            None => scenario,
        }
    }
}

impl Transform<Program> for Plugin {
    fn transform(&self, program: Program) -> Program {
        match &self.on_program {
            Some(handler) => handler.on_program(program),
            None => program,
        }
    }
}

impl Transform<Vec<Task>> for Plugin {
    fn transform(&self, tasks: Vec<Task>) -> Vec<Task> {
        match &self.on_task_sequence {
            Some(handler) => handler.on_task_sequence(tasks),
            None => tasks,
        }
    }
}

/// Thread `init` through every transformation, in order
///
/// No transformation at all is the identity.
pub fn apply<T, P>(transforms: &[P], init: T) -> T
where
    P: Transform<T>,
{
    transforms.iter().fold(init, |value, t| t.transform(value))
}

/// Plugins split by contract, each list in the original order
#[derive(Debug, Clone, Default)]
pub struct ContractGroups {
    pub on_task: Vec<Plugin>,
    pub on_task_sequence: Vec<Plugin>,
    pub on_scenario: Vec<Plugin>,
    pub on_program: Vec<Plugin>,
}

impl ContractGroups {
    /// Plugins declaring the single contract `contract`
    #[must_use]
    pub fn get(&self, contract: Contract) -> &[Plugin] {
        match contract {
            Contract::ON_TASK => &self.on_task,
            Contract::ON_TASK_SEQUENCE => &self.on_task_sequence,
            Contract::ON_SCENARIO => &self.on_scenario,
            Contract::ON_PROGRAM => &self.on_program,
            _ => &[],
        }
    }

    fn get_mut(&mut self, contract: Contract) -> Option<&mut Vec<Plugin>> {
        match contract {
            Contract::ON_TASK => Some(&mut self.on_task),
            Contract::ON_TASK_SEQUENCE => Some(&mut self.on_task_sequence),
            Contract::ON_SCENARIO => Some(&mut self.on_scenario),
            Contract::ON_PROGRAM => Some(&mut self.on_program),
            _ => None,
        }
    }
}

/// Group plugins by contract
///
/// A plugin declaring several contracts lands in each corresponding list.
#[must_use]
pub fn group_by_contract<'a>(plugins: impl IntoIterator<Item = &'a Plugin>) -> ContractGroups {
    let mut groups = ContractGroups::default();
    for plugin in plugins {
        for contract in plugin.contract.iter() {
            if let Some(group) = groups.get_mut(contract) {
                group.push(plugin.clone());
            }
        }
    }
    groups
}
