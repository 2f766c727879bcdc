#![forbid(unsafe_code)]

//! Text rendering of the display target.
//!
//! The display target's children are windowed to [`ITEMS_PER_PAGE`] rows.
//! Once the cursor passes half a page the window follows it, clamped so the
//! last page stays full; clipped rows above or below are marked with `...`.
//! The cursor row is bracketed `> name <`.

use crate::node::{MenuNode, MenuSignal, NodeKind};
use crate::surface::Surface;

/// Rows shown per page.
pub const ITEMS_PER_PAGE: usize = 12;

const ITEMS_PER_HALF_PAGE: usize = ITEMS_PER_PAGE / 2;

/// Per-frame rendering inputs owned by the driver.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderContext {
    /// Milliseconds until a pending autorun fires, if one is armed.
    pub autorun_remaining_ms: Option<u64>,
}

/// Render the current display target of `root` onto `surface`.
pub fn render(root: &MenuNode, surface: &mut dyn Surface, ctx: &RenderContext) {
    let target = root.display_target();

    // A case that is the display target has already run and owns the
    // screen contents; repainting would wipe its output.
    if matches!(target.kind(), NodeKind::Case { .. }) {
        return;
    }

    surface.clear();
    render_listing(target, surface, ctx);
    surface.present();
}

fn render_listing(target: &MenuNode, surface: &mut dyn Surface, ctx: &RenderContext) {
    let children = target.children();
    let cursor = target.cursor();
    let count = children.len();

    let mut first = 0;
    if cursor > ITEMS_PER_HALF_PAGE {
        first = cursor - ITEMS_PER_HALF_PAGE;
        if first + ITEMS_PER_PAGE > count {
            first = count.saturating_sub(ITEMS_PER_PAGE);
        }
    }

    if first > 0 {
        surface.line("...");
    }

    let end = (first + ITEMS_PER_PAGE).min(count);
    for (index, child) in children.iter().enumerate().take(end).skip(first) {
        let label = entry_label(target, child, index, ctx);
        if index == cursor {
            surface.line(&format!("> {label} <"));
        } else {
            surface.line(&format!("  {label}"));
        }
    }

    if end < count {
        surface.line("...");
    }
}

/// The autorun entry shows the remaining countdown while one is armed.
fn entry_label(target: &MenuNode, child: &MenuNode, index: usize, ctx: &RenderContext) -> String {
    if index == 0
        && matches!(target.kind(), NodeKind::Root)
        && matches!(
            child.kind(),
            NodeKind::Action {
                signal: MenuSignal::RunAllAndExit
            }
        )
    {
        if let Some(ms) = ctx.autorun_remaining_ms {
            return format!("{} (automatic in {ms} ms)", child.name());
        }
    }
    child.name().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::MemorySurface;

    fn wide_root(entries: usize) -> MenuNode {
        let children = (0..entries)
            .map(|i| MenuNode::suite_group(&format!("Suite_{i:02}"), vec!["Test_1"]))
            .collect();
        MenuNode::root_with_children(children)
    }

    #[test]
    fn small_listing_renders_all_rows_with_cursor_marker() {
        let root = wide_root(3);
        let mut surface = MemorySurface::new();
        render(&root, &mut surface, &RenderContext::default());

        let frame = surface.last_frame().unwrap();
        assert_eq!(
            frame,
            &["> Suite_00 <", "  Suite_01", "  Suite_02"]
        );
    }

    #[test]
    fn long_listing_is_windowed_with_ellipsis_markers() {
        let mut root = wide_root(30);
        let mut catalog = tdeck_core::Catalog::new();
        for _ in 0..20 {
            root.cursor_down(&mut catalog);
        }

        let mut surface = MemorySurface::new();
        render(&root, &mut surface, &RenderContext::default());

        let frame = surface.last_frame().unwrap();
        assert_eq!(frame.first().unwrap(), "...");
        assert_eq!(frame.last().unwrap(), "...");
        assert_eq!(frame.len(), ITEMS_PER_PAGE + 2);
        assert!(frame.contains(&"> Suite_20 <".to_string()));
    }

    #[test]
    fn window_clamps_at_the_end_of_the_listing() {
        let mut root = wide_root(30);
        let mut catalog = tdeck_core::Catalog::new();
        for _ in 0..29 {
            root.cursor_down(&mut catalog);
        }

        let mut surface = MemorySurface::new();
        render(&root, &mut surface, &RenderContext::default());

        let frame = surface.last_frame().unwrap();
        assert_eq!(frame.first().unwrap(), "...");
        assert_eq!(frame.last().unwrap(), "> Suite_29 <");
        assert_eq!(frame.len(), ITEMS_PER_PAGE + 1);
    }

    #[test]
    fn autorun_entry_shows_countdown() {
        let root = MenuNode::root_with_children(vec![
            MenuNode::action("Run all and exit", MenuSignal::RunAllAndExit),
            MenuNode::suite_group("Suite_1", vec!["Test_1"]),
        ]);
        let mut surface = MemorySurface::new();
        render(
            &root,
            &mut surface,
            &RenderContext {
                autorun_remaining_ms: Some(1500),
            },
        );

        let frame = surface.last_frame().unwrap();
        assert_eq!(frame[0], "> Run all and exit (automatic in 1500 ms) <");
    }

    #[test]
    fn case_display_target_leaves_the_surface_untouched() {
        let probe_suite = {
            let mut suite = tdeck_core::TestSuite::new("Suite_1");
            suite.add("Test_1", || {});
            suite
        };
        let mut catalog = tdeck_core::Catalog::new();
        catalog.register(probe_suite);

        let mut root = MenuNode::root(&catalog, false);
        root.activate(&mut catalog);
        root.activate(&mut catalog);

        let mut surface = MemorySurface::new();
        render(&root, &mut surface, &RenderContext::default());
        assert!(surface.frames().is_empty());
    }
}
