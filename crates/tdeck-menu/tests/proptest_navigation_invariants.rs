//! Property-based invariant tests for the menu navigation state machine.
//!
//! These tests verify structural invariants that must hold after any
//! sequence of navigation operations:
//!
//! 1. Active-child links always form a single simple path from the root.
//! 2. Cursors stay within bounds at every depth.
//! 3. `deactivate` never panics, however deep or shallow the active path.
//! 4. The display target is always reachable and consistent with the path.

use proptest::prelude::*;
use tdeck_core::{Catalog, TestSuite};
use tdeck_menu::{MenuNode, MenuSignal};

// ── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum Op {
    Up,
    Down,
    Left,
    Right,
    Activate,
    Deactivate,
    RunCurrentSuite,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Up),
        Just(Op::Down),
        Just(Op::Left),
        Just(Op::Right),
        Just(Op::Activate),
        Just(Op::Deactivate),
        Just(Op::RunCurrentSuite),
    ]
}

fn scripted_catalog(suites: usize, cases: usize) -> Catalog {
    let mut catalog = Catalog::new();
    for s in 0..suites {
        let mut suite = TestSuite::new(format!("Suite_{s}"));
        for c in 0..cases {
            suite.add(format!("Test_{c}"), || {});
        }
        catalog.register(suite);
    }
    catalog
}

fn apply(root: &mut MenuNode, catalog: &mut Catalog, op: Op) -> Option<MenuSignal> {
    match op {
        Op::Up => {
            root.cursor_up(catalog);
            None
        }
        Op::Down => {
            root.cursor_down(catalog);
            None
        }
        Op::Left => {
            root.cursor_left();
            None
        }
        Op::Right => {
            root.cursor_right();
            None
        }
        Op::Activate => root.activate(catalog),
        Op::Deactivate => root.deactivate(catalog),
        Op::RunCurrentSuite => {
            root.run_current_suite(catalog);
            None
        }
    }
}

// ── Invariants ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn random_walks_preserve_structural_invariants(
        ops in proptest::collection::vec(op_strategy(), 0..64),
        suites in 1usize..5,
        cases in 1usize..5,
        autorun in any::<bool>(),
    ) {
        let mut catalog = scripted_catalog(suites, cases);
        let mut root = MenuNode::root(&catalog, autorun);

        for op in ops {
            let _ = apply(&mut root, &mut catalog, op);
            prop_assert!(root.validate().is_ok(), "invariant broken: {:?}", root.validate());
        }
    }

    #[test]
    fn display_target_depth_matches_active_path(
        ops in proptest::collection::vec(op_strategy(), 0..64),
    ) {
        let mut catalog = scripted_catalog(3, 3);
        let mut root = MenuNode::root(&catalog, false);

        for op in ops {
            let _ = apply(&mut root, &mut catalog, op);

            let mut depth = 0;
            let mut node = &root;
            while let Some(index) = node.active_child() {
                node = &node.children()[index];
                depth += 1;
            }
            prop_assert!(depth <= 2, "active path deeper than root->suite->case");
            prop_assert_eq!(node.name(), root.display_target().name());
        }
    }

    #[test]
    fn deactivate_at_any_depth_never_panics_and_exits_only_at_root(
        depth in 0usize..4,
    ) {
        let mut catalog = scripted_catalog(2, 2);
        let mut root = MenuNode::root(&catalog, false);

        for _ in 0..depth {
            root.activate(&mut catalog);
        }

        // Pop however deep the path actually got, then one more.
        let mut active_depth = 0;
        let mut node = &root;
        while let Some(index) = node.active_child() {
            node = &node.children()[index];
            active_depth += 1;
        }
        for _ in 0..active_depth {
            prop_assert_eq!(root.deactivate(&mut catalog), None);
        }
        prop_assert_eq!(root.deactivate(&mut catalog), Some(MenuSignal::Exit));
    }
}
