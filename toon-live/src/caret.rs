//! Two-way caret/outline synchronization
//!
//! The editor caret and the outline selection mirror each other. Either
//! side can initiate: a caret move selects the deepest containing outline
//! item, and activating an outline item moves the caret. An explicit state
//! machine suppresses feedback: while a sync is being applied the model is
//! `Navigating`, and events arriving in that state are ignored instead of
//! re-entering the sync.
//!
//! This type is thread-affine, like the views it drives; it is not `Send`.
//! Seam callbacks may re-enter the sync (a `move_caret` that echoes a caret
//! event back), so no internal borrow is held across a seam call.

use crate::outline::{self, OutlineItem, OutlinePath};
use std::cell::RefCell;
use std::rc::Rc;
use toon::ParseResult;

/// Where a sync currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// Ready to react to caret or outline events
    Idle,
    /// Applying a sync; incoming events are echoes and are dropped
    Navigating,
}

/// The editor side of the sync: caret control and focus
pub trait EditorSurface {
    fn move_caret(&self, offset: usize);
    fn recenter(&self, offset: usize);
    fn focus_editor(&self);
}

/// The outline view side: selection display
pub trait OutlineView {
    fn select(&self, path: &OutlinePath);
    fn scroll_into_view(&self, path: &OutlinePath);
    fn clear_selection(&self);
}

struct SyncInner {
    items: Vec<OutlineItem>,
    selection: Option<OutlinePath>,
    caret: Option<usize>,
    state: SyncState,
}

/// Keeps one editor and one outline view in step
pub struct CaretSync {
    editor: Rc<dyn EditorSurface>,
    view: Rc<dyn OutlineView>,
    inner: RefCell<SyncInner>,
}

impl CaretSync {
    pub fn new(editor: Rc<dyn EditorSurface>, view: Rc<dyn OutlineView>) -> Self {
        Self {
            editor,
            view,
            inner: RefCell::new(SyncInner {
                items: Vec::new(),
                selection: None,
                caret: None,
                state: SyncState::Idle,
            }),
        }
    }

    pub fn state(&self) -> SyncState {
        self.inner.borrow().state
    }

    pub fn selection(&self) -> Option<OutlinePath> {
        self.inner.borrow().selection.clone()
    }

    /// The editor caret moved. Selects the deepest outline item containing
    /// the new position; a miss leaves the selection unchanged.
    pub fn caret_moved(&self, offset: usize) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.state == SyncState::Navigating {
                return;
            }
            inner.caret = Some(offset);
        }
        self.sync_selection_to(offset);
    }

    /// Select the outline item at a buffer offset. Equivalent to a caret
    /// move; hosts call this when they track the caret themselves.
    pub fn select_item_at_offset(&self, offset: usize) {
        self.caret_moved(offset);
    }

    /// The outline selection changed without activation (keyboard focus
    /// move, programmatic select). Bookkeeping only; single selection does
    /// not navigate.
    pub fn selection_changed(&self, path: Option<OutlinePath>) {
        let mut inner = self.inner.borrow_mut();
        if inner.state == SyncState::Navigating {
            return;
        }
        inner.selection = path;
    }

    /// An outline item was activated (double-click, enter). Moves the
    /// caret to the item's start and hands focus back to the editor.
    pub fn activate(&self, path: &OutlinePath) {
        let start = {
            let mut inner = self.inner.borrow_mut();
            if inner.state == SyncState::Navigating {
                return;
            }
            let Some(item) = outline::resolve(&inner.items, path) else {
                return;
            };
            let start = item.start;
            inner.state = SyncState::Navigating;
            inner.selection = Some(path.clone());
            inner.caret = Some(start);
            start
        };
        self.editor.move_caret(start);
        self.editor.recenter(start);
        self.editor.focus_editor();
        self.inner.borrow_mut().state = SyncState::Idle;
    }

    /// A fresh parse completed: rebuild the outline and re-run the caret
    /// sync so the selection lands on the new tree.
    pub fn document_parsed(&self, result: &ParseResult) {
        let caret = {
            let mut inner = self.inner.borrow_mut();
            inner.items = outline::build(result);
            inner.selection = None;
            inner.caret
        };
        self.view.clear_selection();
        if let Some(offset) = caret {
            self.sync_selection_to(offset);
        }
    }

    pub fn items(&self) -> Vec<OutlineItem> {
        self.inner.borrow().items.clone()
    }

    fn sync_selection_to(&self, offset: usize) {
        let path = {
            let mut inner = self.inner.borrow_mut();
            let Some(path) = outline::find_deepest_containing(&inner.items, offset) else {
                return;
            };
            if inner.selection.as_ref() == Some(&path) {
                return;
            }
            inner.state = SyncState::Navigating;
            inner.selection = Some(path.clone());
            path
        };
        self.view.select(&path);
        self.view.scroll_into_view(&path);
        self.inner.borrow_mut().state = SyncState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use toon::parse;

    /// Editor mock; optionally echoes caret moves back into the sync the
    /// way a real editor fires caret events on programmatic moves
    #[derive(Default)]
    struct MockEditor {
        moves: RefCell<Vec<usize>>,
        recenters: RefCell<Vec<usize>>,
        focused: RefCell<usize>,
        echo_to: RefCell<Weak<CaretSync>>,
    }

    impl EditorSurface for MockEditor {
        fn move_caret(&self, offset: usize) {
            self.moves.borrow_mut().push(offset);
            if let Some(sync) = self.echo_to.borrow().upgrade() {
                sync.caret_moved(offset);
            }
        }
        fn recenter(&self, offset: usize) {
            self.recenters.borrow_mut().push(offset);
        }
        fn focus_editor(&self) {
            *self.focused.borrow_mut() += 1;
        }
    }

    /// Outline view mock; optionally echoes selections back
    #[derive(Default)]
    struct MockView {
        selections: RefCell<Vec<OutlinePath>>,
        scrolled: RefCell<Vec<OutlinePath>>,
        cleared: RefCell<usize>,
        echo_to: RefCell<Weak<CaretSync>>,
    }

    impl OutlineView for MockView {
        fn select(&self, path: &OutlinePath) {
            self.selections.borrow_mut().push(path.clone());
            if let Some(sync) = self.echo_to.borrow().upgrade() {
                sync.selection_changed(Some(path.clone()));
            }
        }
        fn scroll_into_view(&self, path: &OutlinePath) {
            self.scrolled.borrow_mut().push(path.clone());
        }
        fn clear_selection(&self) {
            *self.cleared.borrow_mut() += 1;
        }
    }

    fn wired() -> (Rc<CaretSync>, Rc<MockEditor>, Rc<MockView>) {
        let editor = Rc::new(MockEditor::default());
        let view = Rc::new(MockView::default());
        let sync = Rc::new(CaretSync::new(
            Rc::clone(&editor) as Rc<dyn EditorSurface>,
            Rc::clone(&view) as Rc<dyn OutlineView>,
        ));
        *editor.echo_to.borrow_mut() = Rc::downgrade(&sync);
        *view.echo_to.borrow_mut() = Rc::downgrade(&sync);
        (sync, editor, view)
    }

    const SOURCE: &str = "a:\n  b: 33\nc: 4\n";

    fn parsed_sync() -> (Rc<CaretSync>, Rc<MockEditor>, Rc<MockView>) {
        let (sync, editor, view) = wired();
        sync.document_parsed(&parse(SOURCE).unwrap());
        (sync, editor, view)
    }

    #[test]
    fn caret_move_selects_deepest_item() {
        let (sync, _editor, view) = parsed_sync();
        sync.caret_moved(8); // inside "b"
        assert_eq!(sync.selection(), Some(OutlinePath(vec![0, 0])));
        assert_eq!(view.selections.borrow().as_slice(), &[OutlinePath(vec![0, 0])]);
        assert_eq!(view.scrolled.borrow().len(), 1);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn select_item_at_offset_is_a_caret_move() {
        let (sync, _editor, _view) = parsed_sync();
        sync.select_item_at_offset(8);
        assert_eq!(sync.selection(), Some(OutlinePath(vec![0, 0])));
    }

    #[test]
    fn caret_miss_keeps_previous_selection() {
        let (sync, _editor, view) = parsed_sync();
        sync.caret_moved(8);
        // far past the document
        sync.caret_moved(900);
        assert_eq!(sync.selection(), Some(OutlinePath(vec![0, 0])));
        assert_eq!(view.selections.borrow().len(), 1);
    }

    #[test]
    fn repeated_caret_in_same_item_syncs_once() {
        let (sync, _editor, view) = parsed_sync();
        sync.caret_moved(8);
        sync.caret_moved(9);
        assert_eq!(view.selections.borrow().len(), 1);
    }

    #[test]
    fn view_echo_does_not_loop() {
        // select() echoes selection_changed back while Navigating; the echo
        // must be dropped, not recursed
        let (sync, _editor, view) = parsed_sync();
        sync.caret_moved(8);
        assert_eq!(view.selections.borrow().len(), 1);
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn activation_moves_caret_once() {
        let (sync, editor, _view) = parsed_sync();
        sync.activate(&OutlinePath(vec![1])); // "c" starts at 11
        assert_eq!(editor.moves.borrow().as_slice(), &[11]);
        assert_eq!(editor.recenters.borrow().as_slice(), &[11]);
        assert_eq!(*editor.focused.borrow(), 1);
        assert_eq!(sync.selection(), Some(OutlinePath(vec![1])));
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn editor_echo_during_activation_is_dropped() {
        // move_caret echoes caret_moved while Navigating; exactly one
        // caret move must happen
        let (sync, editor, view) = parsed_sync();
        sync.activate(&OutlinePath(vec![0]));
        assert_eq!(editor.moves.borrow().len(), 1);
        // the echoed caret event was ignored, so no view selection either
        assert_eq!(view.selections.borrow().len(), 0);
    }

    #[test]
    fn activation_of_stale_path_is_ignored() {
        let (sync, editor, _view) = parsed_sync();
        sync.activate(&OutlinePath(vec![7, 7]));
        assert!(editor.moves.borrow().is_empty());
        assert_eq!(sync.state(), SyncState::Idle);
    }

    #[test]
    fn selection_change_alone_does_not_navigate() {
        let (sync, editor, _view) = parsed_sync();
        sync.selection_changed(Some(OutlinePath(vec![1])));
        assert!(editor.moves.borrow().is_empty());
        assert_eq!(sync.selection(), Some(OutlinePath(vec![1])));
    }

    #[test]
    fn reparse_rebuilds_and_resyncs_to_caret() {
        let (sync, _editor, view) = parsed_sync();
        sync.caret_moved(12); // inside "c"
        assert_eq!(sync.selection(), Some(OutlinePath(vec![1])));
        // same structure re-parsed: selection cleared again, then re-derived
        sync.document_parsed(&parse(SOURCE).unwrap());
        assert_eq!(*view.cleared.borrow(), 2);
        assert_eq!(sync.selection(), Some(OutlinePath(vec![1])));
    }

    #[test]
    fn reparse_with_unknown_caret_just_clears() {
        let (sync, _editor, view) = wired();
        sync.document_parsed(&parse(SOURCE).unwrap());
        assert_eq!(*view.cleared.borrow(), 1);
        assert_eq!(sync.selection(), None);
    }
}
