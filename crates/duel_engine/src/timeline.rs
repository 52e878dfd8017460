//! The event timeline: an ordered, mutable queue of presentation pages.
//!
//! Every externally visible effect of a round fires through here. A
//! [`Page`] carries narration plus two ordered hook lists; the sequencer
//! interprets hooks as pages open and close, so a mutation tied to a page
//! runs exactly once, when that page becomes current: never earlier,
//! never twice.
//!
//! Hooks are a closed command set rather than stored closures: the
//! sequencer owns all battle state, and commands interpreted by the owner
//! preserve the ordered add/remove semantics of the page's handler lists
//! without sharing mutable state into the queue.

use crate::core_data::{BattleOutcome, Side, SoundKey};
use crate::moves::MoveId;

/// A side effect bound to a page opening or closing.
#[derive(Debug, Clone, PartialEq)]
pub enum PageHook {
    /// Resolve the side's selected move.
    PerformMove(Side),
    /// The side's action was skipped (paralysis); advances the order counter.
    SkipTurn(Side),
    /// End-of-round burn tick for one side.
    ApplyBurn(Side),
    /// Fire the move animation collaborator.
    Animation { side: Side, move_id: MoveId },
    /// Fire the sound collaborator.
    Sound(SoundKey),
    /// Refresh the health/energy displays.
    RefreshDisplays,
    /// Action phase is over: build the status-effect pages.
    EndRound,
    /// Status phase drained: pick the next round or an outcome branch.
    ResolveRound,
    /// Award experience to the player; may splice level-up pages.
    GrantExperience(u32),
    /// Apply one level of stat growth; may splice a move-learn offer.
    LevelUp(Side),
    /// Offer the shell a new move to learn.
    OfferMoveLearn(MoveId),
    /// Terminal: flush the timeline and reset transient state.
    ExitBattle(BattleOutcome),
    /// Hand control back to the overworld shell.
    ExitToOverworld,
}

/// One presentation entry: text, an optional speech-lookup key, and the
/// ordered open/close hook lists. Value-like but mutable: hooks may be
/// attached or removed after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub text: String,
    pub speech_key: Option<String>,
    on_open: Vec<PageHook>,
    on_close: Vec<PageHook>,
}

impl Page {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A blank page, used as a terminal marker.
    pub fn blank() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Builder-style attachment
    // ------------------------------------------------------------------------

    pub fn with_speech(mut self, key: impl Into<String>) -> Self {
        self.speech_key = Some(key.into());
        self
    }

    pub fn with_open(mut self, hook: PageHook) -> Self {
        self.on_open.push(hook);
        self
    }

    pub fn with_close(mut self, hook: PageHook) -> Self {
        self.on_close.push(hook);
        self
    }

    // ------------------------------------------------------------------------
    // Post-construction attachment and removal
    // ------------------------------------------------------------------------

    pub fn add_open_hook(&mut self, hook: PageHook) {
        self.on_open.push(hook);
    }

    pub fn add_close_hook(&mut self, hook: PageHook) {
        self.on_close.push(hook);
    }

    /// Remove the first open hook equal to `hook`. Returns whether one was
    /// removed; the caller is responsible for tracking hook identity.
    pub fn remove_open_hook(&mut self, hook: &PageHook) -> bool {
        match self.on_open.iter().position(|h| h == hook) {
            Some(i) => {
                self.on_open.remove(i);
                true
            }
            None => false,
        }
    }

    /// Remove the first close hook equal to `hook`.
    pub fn remove_close_hook(&mut self, hook: &PageHook) -> bool {
        match self.on_close.iter().position(|h| h == hook) {
            Some(i) => {
                self.on_close.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn open_hooks(&self) -> &[PageHook] {
        &self.on_open
    }

    pub fn close_hooks(&self) -> &[PageHook] {
        &self.on_close
    }
}

/// Ordered queue of pages with a cursor at the currently open page.
#[derive(Debug, Default)]
pub struct Timeline {
    pages: Vec<Page>,
    cursor: Option<usize>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole script. The cursor resets; nothing is open.
    pub fn replace_all(&mut self, pages: Vec<Page>) {
        self.pages = pages;
        self.cursor = None;
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.cursor = None;
    }

    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Insert at `index`. Inserting at or before the open page would
    /// reorder history, which is a sequencing bug.
    pub fn insert(&mut self, index: usize, page: Page) {
        if let Some(cursor) = self.cursor {
            debug_assert!(index > cursor, "insert before the open page");
        }
        self.pages.insert(index, page);
    }

    /// Splice pages immediately after the open page, preserving their
    /// order. Returns the index of the last spliced page (or the cursor
    /// position when `pages` is empty).
    pub fn insert_after_current(&mut self, pages: Vec<Page>) -> usize {
        let base = self.cursor.map_or(0, |c| c + 1);
        let count = pages.len();
        for (i, page) in pages.into_iter().enumerate() {
            self.pages.insert(base + i, page);
        }
        if count == 0 {
            self.cursor.unwrap_or(0)
        } else {
            base + count - 1
        }
    }

    /// Drop every page after `index`.
    pub fn truncate_after(&mut self, index: usize) {
        self.pages.truncate(index + 1);
    }

    /// Drop every page after the open one.
    pub fn truncate_after_current(&mut self) {
        if let Some(cursor) = self.cursor {
            self.pages.truncate(cursor + 1);
        }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Page> {
        self.cursor.and_then(|c| self.pages.get(c))
    }

    pub fn page(&self, index: usize) -> &Page {
        &self.pages[index]
    }

    pub fn page_mut(&mut self, index: usize) -> &mut Page {
        &mut self.pages[index]
    }

    /// Move the cursor to the next page. Returns its index, or None when
    /// the script is drained.
    pub fn step_forward(&mut self) -> Option<usize> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.pages.len() {
            self.cursor = Some(next);
            Some(next)
        } else {
            None
        }
    }

    /// Clone out a page's open hooks for interpretation.
    pub fn open_hooks(&self, index: usize) -> Vec<PageHook> {
        self.pages[index].open_hooks().to_vec()
    }

    /// Clone out a page's close hooks for interpretation.
    pub fn close_hooks(&self, index: usize) -> Vec<PageHook> {
        self.pages[index].close_hooks().to_vec()
    }
}
