#![forbid(unsafe_code)]

//! Menu node state machine.
//!
//! Every node carries the same navigation state (`children`, `cursor`,
//! `active_child`); behavior differences between the four node kinds are
//! pattern matches, not virtual dispatch. Operations that reach the end of
//! the active path act there; everything above only delegates.

use tdeck_core::Catalog;
use tracing::{debug, warn};

/// Effect surfaced to the driver by an activation or deactivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSignal {
    /// Stop the driver loop.
    Exit,
    /// Run every enabled suite, then stop the driver loop.
    RunAllAndExit,
}

/// What a node is, and the per-kind state it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The menu root. Deactivating it with no active child signals exit.
    Root,
    /// A suite listing; children are the suite's cases.
    Suite {
        /// Catalog key of the suite.
        suite: String,
    },
    /// A single runnable case. Enterable despite having no children;
    /// entering runs it once.
    Case {
        /// Catalog key of the owning suite.
        suite: String,
        /// Case name within the suite.
        case: String,
        /// Whether the case has run since it was last entered.
        has_run: bool,
    },
    /// A command entry. Never enterable; activating it fires its signal.
    Action {
        /// Signal handed to the driver on activation.
        signal: MenuSignal,
    },
}

#[derive(Debug, Clone, Copy)]
enum CursorStep {
    Up,
    Down,
}

/// One node of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuNode {
    name: String,
    kind: NodeKind,
    children: Vec<MenuNode>,
    cursor: usize,
    active_child: Option<usize>,
}

impl MenuNode {
    /// Build the canonical root for a filtered catalog.
    ///
    /// The "Run all and exit" entry is listed first when autorun is enabled
    /// (so the countdown lands on it) and last, prefixed `!`, when autorun
    /// is disabled.
    #[must_use]
    pub fn root(catalog: &Catalog, autorun_enabled: bool) -> Self {
        let mut children = Vec::with_capacity(catalog.len() + 1);
        if autorun_enabled {
            children.push(Self::action("Run all and exit", MenuSignal::RunAllAndExit));
        }
        for suite in catalog.suites() {
            children.push(Self::suite_group(suite.name(), suite.case_names()));
        }
        if !autorun_enabled {
            children.push(Self::action("! Run all and exit", MenuSignal::RunAllAndExit));
        }
        Self::root_with_children(children)
    }

    /// Build a root around an explicit child list.
    #[must_use]
    pub fn root_with_children(children: Vec<MenuNode>) -> Self {
        Self {
            name: "<<root>>".to_string(),
            kind: NodeKind::Root,
            children,
            cursor: 0,
            active_child: None,
        }
    }

    /// Build a suite listing node.
    #[must_use]
    pub fn suite_group(suite: &str, case_names: Vec<&str>) -> Self {
        let children = case_names
            .into_iter()
            .map(|case| Self::case(suite, case))
            .collect();
        Self {
            name: suite.to_string(),
            kind: NodeKind::Suite {
                suite: suite.to_string(),
            },
            children,
            cursor: 0,
            active_child: None,
        }
    }

    /// Build a case leaf.
    #[must_use]
    pub fn case(suite: &str, case: &str) -> Self {
        Self {
            name: case.to_string(),
            kind: NodeKind::Case {
                suite: suite.to_string(),
                case: case.to_string(),
                has_run: false,
            },
            children: Vec::new(),
            cursor: 0,
            active_child: None,
        }
    }

    /// Build a command entry.
    #[must_use]
    pub fn action(name: impl Into<String>, signal: MenuSignal) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Action { signal },
            children: Vec::new(),
            cursor: 0,
            active_child: None,
        }
    }

    /// Display label.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node kind and per-kind state.
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Child nodes in listing order.
    #[must_use]
    pub fn children(&self) -> &[MenuNode] {
        &self.children
    }

    /// Cursor index into `children`.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Index of the child holding navigation focus, if any.
    #[must_use]
    pub fn active_child(&self) -> Option<usize> {
        self.active_child
    }

    /// Whether activating this node moves the active path into it.
    #[must_use]
    pub fn is_enterable(&self) -> bool {
        !self.children.is_empty() || matches!(self.kind, NodeKind::Case { .. })
    }

    /// Walk the active path to the node that should currently be rendered.
    #[must_use]
    pub fn display_target(&self) -> &MenuNode {
        let mut node = self;
        while let Some(index) = node.active_child {
            node = &node.children[index];
        }
        node
    }

    /// Activate the selection at the end of the active path.
    ///
    /// Entering an enterable child extends the active path into it; a
    /// [`NodeKind::Case`] runs once on entry and re-runs when activated
    /// again at the tip. Activating an [`NodeKind::Action`] fires its
    /// signal without moving the path.
    pub fn activate(&mut self, catalog: &mut Catalog) -> Option<MenuSignal> {
        if let Some(index) = self.active_child {
            return self.children[index].activate(catalog);
        }

        if let NodeKind::Case { .. } = self.kind {
            self.enter(catalog);
            return None;
        }

        if self.children.is_empty() {
            return None;
        }

        let index = self.cursor;
        if self.children[index].is_enterable() {
            self.active_child = Some(index);
            self.children[index].enter(catalog);
            None
        } else if let NodeKind::Action { signal } = self.children[index].kind {
            debug!(entry = %self.children[index].name, "action fired");
            Some(signal)
        } else {
            None
        }
    }

    /// Pop the deepest link of the active path.
    ///
    /// With no active child there is nothing to pop; everywhere but the
    /// root that is a no-op, while the root signals [`MenuSignal::Exit`]
    /// so the topmost back action terminates the driver loop.
    pub fn deactivate(&mut self, catalog: &mut Catalog) -> Option<MenuSignal> {
        if self.pop_active(catalog) {
            None
        } else if matches!(self.kind, NodeKind::Root) {
            Some(MenuSignal::Exit)
        } else {
            None
        }
    }

    /// Move the cursor up one entry at the end of the active path, with
    /// wraparound. On a running case, this pops it and activates the
    /// previous sibling instead.
    pub fn cursor_up(&mut self, catalog: &mut Catalog) {
        self.cursor_move(catalog, CursorStep::Up);
    }

    /// Mirror of [`MenuNode::cursor_up`].
    pub fn cursor_down(&mut self, catalog: &mut Catalog) {
        self.cursor_move(catalog, CursorStep::Down);
    }

    /// Reserved. Delegates to the end of the active path, then does
    /// nothing.
    pub fn cursor_left(&mut self) {
        if let Some(index) = self.active_child {
            self.children[index].cursor_left();
        }
    }

    /// Reserved. Delegates to the end of the active path, then does
    /// nothing.
    pub fn cursor_right(&mut self) {
        if let Some(index) = self.active_child {
            self.children[index].cursor_right();
        }
    }

    /// Run every case of the suite on the active path, or of the suite
    /// under the cursor when nothing is active. No-op when neither applies.
    pub fn run_current_suite(&mut self, catalog: &mut Catalog) {
        match self.kind {
            NodeKind::Suite { .. } => self.run_whole_suite(catalog),
            NodeKind::Case { .. } | NodeKind::Action { .. } => {}
            NodeKind::Root => {
                if let Some(index) = self.active_child {
                    self.children[index].run_current_suite(catalog);
                } else if !self.children.is_empty() {
                    let index = self.cursor;
                    self.children[index].run_current_suite(catalog);
                }
            }
        }
    }

    /// Check the structural invariants of the whole tree.
    ///
    /// Cursors stay within bounds, leaves have no children, and active
    /// links form a single simple path from the root.
    pub fn validate(&self) -> Result<(), String> {
        self.validate_inner(true)
    }

    fn validate_inner(&self, on_active_path: bool) -> Result<(), String> {
        if !self.children.is_empty() && self.cursor >= self.children.len() {
            return Err(format!(
                "node '{}': cursor {} out of bounds ({} children)",
                self.name,
                self.cursor,
                self.children.len()
            ));
        }

        if matches!(self.kind, NodeKind::Case { .. } | NodeKind::Action { .. })
            && !self.children.is_empty()
        {
            return Err(format!("leaf node '{}' has children", self.name));
        }

        if let Some(index) = self.active_child {
            if !on_active_path {
                return Err(format!(
                    "node '{}' holds an active child off the active path",
                    self.name
                ));
            }
            if index >= self.children.len() {
                return Err(format!(
                    "node '{}': active child {index} out of bounds",
                    self.name
                ));
            }
            if !self.children[index].is_enterable() {
                return Err(format!(
                    "node '{}': active child '{}' is not enterable",
                    self.name, self.children[index].name
                ));
            }
        }

        for (index, child) in self.children.iter().enumerate() {
            child.validate_inner(on_active_path && self.active_child == Some(index))?;
        }
        Ok(())
    }

    /// Invoked when this node becomes the end of the active path.
    fn enter(&mut self, catalog: &mut Catalog) {
        if let NodeKind::Case {
            suite,
            case,
            has_run,
        } = &mut self.kind
        {
            let Some(target) = catalog.suite_mut(suite) else {
                warn!(suite = %suite, case = %case, "case entered for a suite missing from the catalog");
                return;
            };
            if *has_run {
                target.teardown();
            }
            target.initialize();
            target.run(case);
            *has_run = true;
        }
    }

    /// Invoked when this node stops being the end of the active path.
    fn leave(&mut self, catalog: &mut Catalog) {
        if let NodeKind::Case {
            suite, has_run, ..
        } = &mut self.kind
        {
            if let Some(target) = catalog.suite_mut(suite) {
                target.teardown();
            }
            *has_run = false;
        }
    }

    /// Boolean form of deactivate: `false` means nothing was popped.
    fn pop_active(&mut self, catalog: &mut Catalog) -> bool {
        let Some(index) = self.active_child else {
            return false;
        };
        if !self.children[index].pop_active(catalog) {
            self.children[index].leave(catalog);
            self.active_child = None;
        }
        true
    }

    fn cursor_move(&mut self, catalog: &mut Catalog, step: CursorStep) {
        if let Some(index) = self.active_child {
            if self.children[index].is_case_tip() {
                // Sibling navigation from a running case: pop it, move,
                // and enter the newly selected entry.
                self.children[index].leave(catalog);
                self.active_child = None;
                self.step_cursor(step);
                let _ = self.activate(catalog);
            } else {
                self.children[index].cursor_move(catalog, step);
            }
            return;
        }
        self.step_cursor(step);
    }

    fn step_cursor(&mut self, step: CursorStep) {
        if self.children.is_empty() {
            return;
        }
        self.cursor = match step {
            CursorStep::Up => {
                if self.cursor > 0 {
                    self.cursor - 1
                } else {
                    self.children.len() - 1
                }
            }
            CursorStep::Down => {
                if self.cursor + 1 < self.children.len() {
                    self.cursor + 1
                } else {
                    0
                }
            }
        };
    }

    fn is_case_tip(&self) -> bool {
        matches!(self.kind, NodeKind::Case { .. }) && self.active_child.is_none()
    }

    fn run_whole_suite(&mut self, catalog: &mut Catalog) {
        if let Some(index) = self.active_child.take() {
            self.children[index].leave(catalog);
        }
        let NodeKind::Suite { suite } = &self.kind else {
            return;
        };
        catalog.run_suite(suite);
    }
}
