#![forbid(unsafe_code)]

//! Test suite catalog.
//!
//! A [`Catalog`] is an ordered collection of named [`TestSuite`]s, each of
//! which owns a name-keyed set of [`TestCase`]s. Registration order is
//! execution order for bulk runs and menu listing: embedders that depend on
//! one suite running before all others (for example a state-cleansing
//! baseline suite) must register that suite first. Within a suite, cases
//! iterate in lexical name order so listings and dumps are deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

/// Opaque runnable body of a test case.
pub type CaseAction = Box<dyn FnMut()>;

/// Lifecycle hook invoked around case execution (the device-executor seam).
pub type SuiteHook = Box<dyn FnMut()>;

/// A single named, independently runnable unit of work within a suite.
pub struct TestCase {
    name: String,
    action: CaseAction,
}

impl TestCase {
    /// Create a case from a name and a zero-argument action.
    pub fn new(name: impl Into<String>, action: impl FnMut() + 'static) -> Self {
        Self {
            name: name.into(),
            action: Box::new(action),
        }
    }

    /// The case name, unique within its suite.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase").field("name", &self.name).finish()
    }
}

/// A named group of test cases sharing setup/teardown.
///
/// The optional initialize/teardown hooks bracket case execution: the menu
/// layer initializes a suite when entering one of its cases and tears it
/// down when leaving, and bulk runs bracket the whole suite.
pub struct TestSuite {
    name: String,
    cases: BTreeMap<String, TestCase>,
    on_initialize: Option<SuiteHook>,
    on_teardown: Option<SuiteHook>,
    progress_log: bool,
    case_delay: Duration,
}

impl TestSuite {
    /// Create an empty suite.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: BTreeMap::new(),
            on_initialize: None,
            on_teardown: None,
            progress_log: false,
            case_delay: Duration::ZERO,
        }
    }

    /// Set the hook invoked before cases of this suite run.
    #[must_use]
    pub fn with_initialize(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_initialize = Some(Box::new(hook));
        self
    }

    /// Set the hook invoked when execution leaves this suite.
    #[must_use]
    pub fn with_teardown(mut self, hook: impl FnMut() + 'static) -> Self {
        self.on_teardown = Some(Box::new(hook));
        self
    }

    /// The suite name, unique within the catalog.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a case. A case with the same name is replaced.
    pub fn add_case(&mut self, case: TestCase) {
        self.cases.insert(case.name.clone(), case);
    }

    /// Convenience form of [`TestSuite::add_case`].
    pub fn add(&mut self, name: impl Into<String>, action: impl FnMut() + 'static) {
        self.add_case(TestCase::new(name, action));
    }

    /// Case names in lexical order.
    #[must_use]
    pub fn case_names(&self) -> Vec<&str> {
        self.cases.keys().map(String::as_str).collect()
    }

    /// Number of registered cases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// True if the suite has no cases left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// True if at least one case remains enabled.
    #[must_use]
    pub fn has_enabled_cases(&self) -> bool {
        !self.cases.is_empty()
    }

    /// Remove every named case. Names not present are ignored.
    pub fn disable_cases(&mut self, names: &BTreeSet<String>) {
        for name in names {
            self.cases.remove(name);
        }
    }

    /// Enable per-case progress events at `info!` level instead of `debug!`.
    pub fn set_progress_log(&mut self, enabled: bool) {
        self.progress_log = enabled;
    }

    /// Artificial pause applied before each case run.
    pub fn set_case_delay(&mut self, delay: Duration) {
        self.case_delay = delay;
    }

    /// Invoke the suite's initialize hook, if any.
    pub fn initialize(&mut self) {
        debug!(suite = %self.name, "suite initialize");
        if let Some(hook) = self.on_initialize.as_mut() {
            hook();
        }
    }

    /// Invoke the suite's teardown hook, if any.
    pub fn teardown(&mut self) {
        debug!(suite = %self.name, "suite teardown");
        if let Some(hook) = self.on_teardown.as_mut() {
            hook();
        }
    }

    /// Run one case synchronously. Returns `false` if the name is unknown.
    pub fn run(&mut self, case_name: &str) -> bool {
        if !self.case_delay.is_zero() {
            std::thread::sleep(self.case_delay);
        }

        let Some(case) = self.cases.get_mut(case_name) else {
            warn!(suite = %self.name, case = %case_name, "unknown case requested");
            return false;
        };

        let started = Instant::now();
        if self.progress_log {
            info!(suite = %self.name, case = %case_name, "case start");
        } else {
            debug!(suite = %self.name, case = %case_name, "case start");
        }

        (case.action)();

        let elapsed_ms = started.elapsed().as_millis() as u64;
        if self.progress_log {
            info!(suite = %self.name, case = %case_name, elapsed_ms, "case finished");
        } else {
            debug!(suite = %self.name, case = %case_name, elapsed_ms, "case finished");
        }
        true
    }

    /// Run every case in lexical order.
    pub fn run_all(&mut self) {
        let names: Vec<String> = self.cases.keys().cloned().collect();
        for name in names {
            self.run(&name);
        }
    }
}

impl fmt::Debug for TestSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestSuite")
            .field("name", &self.name)
            .field("cases", &self.cases.len())
            .finish()
    }
}

/// Ordered, name-addressable collection of test suites.
#[derive(Default)]
pub struct Catalog {
    suites: Vec<TestSuite>,
}

impl Catalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a suite, appending it to the execution order.
    ///
    /// Re-registering an existing name replaces that suite in place without
    /// duplicating its ordering entry.
    pub fn register(&mut self, suite: TestSuite) {
        if let Some(existing) = self.suites.iter_mut().find(|s| s.name == suite.name) {
            *existing = suite;
        } else {
            self.suites.push(suite);
        }
    }

    /// Keep only suites whose name is in `allowed`, preserving relative
    /// order of the survivors.
    pub fn remove_suites_not_in(&mut self, allowed: &BTreeSet<String>) {
        self.suites.retain(|s| allowed.contains(&s.name));
    }

    /// Suites in registration order.
    pub fn suites(&self) -> impl Iterator<Item = &TestSuite> {
        self.suites.iter()
    }

    /// Mutable access to suites in registration order.
    pub fn suites_mut(&mut self) -> impl Iterator<Item = &mut TestSuite> {
        self.suites.iter_mut()
    }

    /// Look up a suite by name.
    #[must_use]
    pub fn suite(&self, name: &str) -> Option<&TestSuite> {
        self.suites.iter().find(|s| s.name == name)
    }

    /// Look up a suite by name for mutation.
    pub fn suite_mut(&mut self, name: &str) -> Option<&mut TestSuite> {
        self.suites.iter_mut().find(|s| s.name == name)
    }

    /// Number of suites.
    #[must_use]
    pub fn len(&self) -> usize {
        self.suites.len()
    }

    /// True if no suites are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }

    /// Propagate the progress-log setting to every suite.
    pub fn set_progress_log(&mut self, enabled: bool) {
        for suite in &mut self.suites {
            suite.set_progress_log(enabled);
        }
    }

    /// Propagate the per-case delay to every suite.
    pub fn set_case_delay(&mut self, delay: Duration) {
        for suite in &mut self.suites {
            suite.set_case_delay(delay);
        }
    }

    /// Run every suite in registration order, bracketing each with its
    /// initialize/teardown hooks.
    pub fn run_all(&mut self) {
        for suite in &mut self.suites {
            suite.initialize();
            suite.run_all();
            suite.teardown();
        }
    }

    /// Run one whole suite, bracketed by its hooks. Returns `false` if the
    /// name is unknown.
    pub fn run_suite(&mut self, name: &str) -> bool {
        let Some(suite) = self.suite_mut(name) else {
            warn!(suite = %name, "unknown suite requested");
            return false;
        };
        suite.initialize();
        suite.run_all();
        suite.teardown();
        true
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog").field("suites", &self.suites).finish()
    }
}
