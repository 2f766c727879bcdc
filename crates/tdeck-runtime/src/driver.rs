#![forbid(unsafe_code)]

//! The poll/act/render loop.

use std::time::{Duration, Instant};

use tdeck_config::RuntimeConfig;
use tdeck_core::{ButtonEdge, Catalog, InputEvent, InputSource, PadButton};
use tdeck_menu::{render, MenuNode, MenuSignal, RenderContext, Surface};
use tracing::{debug, error, info};

/// Upper bound on tracked input-source identities.
pub const MAX_INPUT_SOURCES: usize = 4;

/// Loop behavior knobs, usually derived from a [`RuntimeConfig`].
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Never arm the autorun countdown.
    pub disable_autorun: bool,
    /// Fire the bulk run on the first loop iteration instead of counting
    /// down.
    pub autorun_immediately: bool,
    /// Report [`ExitReason::ShutdownRequested`] after a completed bulk run.
    pub shutdown_on_completion: bool,
    /// Countdown armed on loop entry when autorun is enabled.
    pub autorun_timeout: Duration,
    /// Sleep at the end of each loop iteration.
    pub tick: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            disable_autorun: false,
            autorun_immediately: false,
            shutdown_on_completion: false,
            autorun_timeout: Duration::from_millis(3000),
            tick: Duration::from_millis(10),
        }
    }
}

impl DriverOptions {
    /// Derive loop options from a parsed configuration.
    #[must_use]
    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self {
            disable_autorun: config.disable_autorun,
            autorun_immediately: config.enable_autorun_immediately,
            shutdown_on_completion: config.enable_shutdown_on_completion,
            ..Self::default()
        }
    }
}

/// Why the driver loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The operator backed out of the root menu.
    Exit,
    /// A bulk run finished.
    RunAllCompleted,
    /// A bulk run finished and the configuration asked for shutdown.
    ShutdownRequested,
}

/// Owns the catalog and menu and translates input events into menu
/// operations.
pub struct Driver<I: InputSource, S: Surface> {
    catalog: Catalog,
    root: MenuNode,
    input: I,
    surface: S,
    options: DriverOptions,
    sources: [bool; MAX_INPUT_SOURCES],
    contract_violations: u32,
    running: bool,
    bulk_run_completed: bool,
}

impl<I: InputSource, S: Surface> Driver<I, S> {
    /// Build a driver over an already-filtered catalog.
    pub fn new(catalog: Catalog, input: I, surface: S, options: DriverOptions) -> Self {
        let root = MenuNode::root(&catalog, !options.disable_autorun);
        Self {
            catalog,
            root,
            input,
            surface,
            options,
            sources: [false; MAX_INPUT_SOURCES],
            contract_violations: 0,
            running: true,
            bulk_run_completed: false,
        }
    }

    /// The menu root, mainly for inspection.
    #[must_use]
    pub fn root(&self) -> &MenuNode {
        &self.root
    }

    /// The owned catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The owned surface.
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Number of collaborator contract violations observed so far.
    #[must_use]
    pub fn contract_violations(&self) -> u32 {
        self.contract_violations
    }

    /// Whether the given source index is currently attached.
    #[must_use]
    pub fn source_attached(&self, index: usize) -> bool {
        index < MAX_INPUT_SOURCES && self.sources[index]
    }

    /// Run the loop until an exit condition is raised from inside the menu
    /// or by the autorun countdown.
    pub fn run(&mut self) -> ExitReason {
        let mut autorun_deadline = (!self.options.disable_autorun)
            .then(|| Instant::now() + self.options.autorun_timeout);

        while self.running {
            while let Some(event) = self.input.poll_event() {
                if autorun_deadline.take().is_some() {
                    debug!("autorun cancelled by input");
                }
                self.handle_event(event);
            }
            if !self.running {
                break;
            }

            if let Some(deadline) = autorun_deadline {
                if self.options.autorun_immediately || Instant::now() >= deadline {
                    info!("autorun triggered");
                    autorun_deadline = None;
                    self.run_all_and_stop();
                    break;
                }
            }

            let ctx = RenderContext {
                autorun_remaining_ms: autorun_deadline
                    .map(|d| d.saturating_duration_since(Instant::now()).as_millis() as u64),
            };
            render(&self.root, &mut self.surface, &ctx);

            std::thread::sleep(self.options.tick);
        }

        self.exit_reason()
    }

    /// Run every enabled suite without reacting to any input.
    pub fn run_all_non_interactive(&mut self) -> ExitReason {
        self.run_all_and_stop();
        self.exit_reason()
    }

    /// Process one input event. Events are handled strictly in arrival
    /// order; only release edges reach the menu.
    pub fn handle_event(&mut self, event: InputEvent) {
        match event {
            InputEvent::SourceAttached { index } => {
                if index >= MAX_INPUT_SOURCES {
                    self.report_violation(index, "attach");
                    return;
                }
                self.sources[index] = true;
                debug!(index, "input source attached");
            }
            InputEvent::SourceDetached { index } => {
                if index >= MAX_INPUT_SOURCES {
                    self.report_violation(index, "detach");
                    return;
                }
                self.sources[index] = false;
                debug!(index, "input source detached");
            }
            InputEvent::Button {
                index,
                button,
                edge,
            } => {
                if index >= MAX_INPUT_SOURCES {
                    self.report_violation(index, "button");
                    return;
                }
                if edge == ButtonEdge::Press {
                    return;
                }
                self.dispatch(button);
            }
        }
    }

    fn dispatch(&mut self, button: PadButton) {
        let signal = match button {
            PadButton::Up => {
                self.root.cursor_up(&mut self.catalog);
                None
            }
            PadButton::Down => {
                self.root.cursor_down(&mut self.catalog);
                None
            }
            PadButton::Left => {
                self.root.cursor_left();
                None
            }
            PadButton::Right => {
                self.root.cursor_right();
                None
            }
            PadButton::Confirm => self.root.activate(&mut self.catalog),
            PadButton::Back => self.root.deactivate(&mut self.catalog),
            PadButton::RunSuite => {
                self.root.run_current_suite(&mut self.catalog);
                None
            }
            PadButton::RunAll => {
                self.run_all_and_stop();
                None
            }
        };

        match signal {
            Some(MenuSignal::Exit) => {
                info!("exit requested");
                self.running = false;
            }
            Some(MenuSignal::RunAllAndExit) => self.run_all_and_stop(),
            None => {}
        }
    }

    fn run_all_and_stop(&mut self) {
        info!("running all enabled suites");
        self.catalog.run_all();
        self.bulk_run_completed = true;
        self.running = false;
    }

    fn report_violation(&mut self, index: usize, context: &'static str) {
        self.contract_violations += 1;
        error!(
            index,
            max = MAX_INPUT_SOURCES,
            context,
            "input source index out of range"
        );
    }

    fn exit_reason(&self) -> ExitReason {
        if self.bulk_run_completed {
            if self.options.shutdown_on_completion {
                ExitReason::ShutdownRequested
            } else {
                ExitReason::RunAllCompleted
            }
        } else {
            ExitReason::Exit
        }
    }
}
