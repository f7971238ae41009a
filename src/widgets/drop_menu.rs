//! Drop-down selection menu drawn onto its own surfaces.
//!
//! A closed box shows the current selection; pressing it opens an expanded
//! list painted in a foreground layer below the box. Pointer movement over
//! the list tracks a hover highlight, and a press-then-release over the list
//! commits the hovered item and notifies subscribed observers in
//! subscription order.

use eframe::egui::{self, Align2, Color32, FontFamily, FontId, Pos2, Rect, Response, Sense, Ui, Vec2};

use crate::app::theme;

/// Horizontal inset of item text from the left edge.
const TEXT_INSET: f32 = 10.0;

/// Padding added to the widest item when sizing the expanded region.
const WIDTH_PADDING: f32 = 20.0;

/// Height of one item row in the expanded region.
pub fn item_height(item_font_size: f32) -> f32 {
    item_font_size * 2.0
}

/// Maps a pointer y offset inside the expanded region to an item index,
/// clamped into the valid range. `None` when there are no items.
pub fn hover_index_at(y: f32, item_height: f32, item_count: usize) -> Option<usize> {
    if item_count == 0 || item_height <= 0.0 {
        return None;
    }
    let raw = (y / item_height).floor();
    let clamped = raw.clamp(0.0, (item_count - 1) as f32);
    Some(clamped as usize)
}

/// Size of the expanded region for the given measured item widths.
pub fn expanded_size(item_widths: &[f32], item_height: f32) -> Vec2 {
    let max_width = item_widths.iter().fold(0.0_f32, |acc, &w| acc.max(w));
    Vec2::new(
        max_width + WIDTH_PADDING,
        item_height * item_widths.len() as f32,
    )
}

/// Which surface a pointer event landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuRegion {
    /// The always-visible closed selection box.
    ClosedBox,
    /// The expanded list, only meaningful while open.
    Expanded,
    /// Neither surface.
    Outside,
}

/// Interaction state of the menu, independent of any drawing surface.
///
/// The widget translates raw pointer input into [`MenuState::press`],
/// [`MenuState::moved`], and [`MenuState::release`] calls; the state machine
/// owns every transition, so the whole interaction sequence is testable
/// without a windowing backend.
#[derive(Debug, Default)]
pub struct MenuState {
    items: Vec<String>,
    selected: usize,
    hover: Option<usize>,
    open: bool,
    /// Set by a press seen while open; a release only closes once armed.
    /// This keeps the release of the opening press from closing the menu.
    armed: bool,
}

impl MenuState {
    /// Creates a state with the given items and the first item selected.
    pub fn new(items: Vec<String>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// The ordered item list.
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The selected index, or `None` when the list is empty.
    pub fn selection(&self) -> Option<usize> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    /// The hovered index while open.
    pub fn hover(&self) -> Option<usize> {
        self.hover
    }

    /// Whether the expanded region is showing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Replaces the item list, clamping the selection into the new bounds
    /// and dropping any stale hover.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.items = items;
        self.clamp_indices();
    }

    /// Appends one item.
    pub fn add_item(&mut self, item: String) {
        self.items.push(item);
        self.clamp_indices();
    }

    /// Sets the selection, clamped into range. Returns the index actually
    /// selected, or `None` when the list is empty.
    pub fn set_selected(&mut self, index: usize) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }
        self.selected = index.min(self.items.len() - 1);
        Some(self.selected)
    }

    fn clamp_indices(&mut self) {
        if self.items.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(self.items.len() - 1);
        }
        self.hover = None;
    }

    /// A pointer press. Opens the menu when closed and pressed on the box;
    /// while open, a press away from the box arms the next release.
    /// Returns true when the open/closed state changed.
    pub fn press(&mut self, region: MenuRegion) -> bool {
        if !self.open {
            if region == MenuRegion::ClosedBox {
                self.open = true;
                self.armed = false;
                self.hover = None;
                return true;
            }
            return false;
        }
        if region != MenuRegion::ClosedBox {
            self.armed = true;
        }
        false
    }

    /// Pointer movement over the expanded region, `y` relative to its top.
    /// Returns true when the hover changed.
    pub fn moved(&mut self, y: f32, item_height: f32) -> bool {
        if !self.open {
            return false;
        }
        let hover = hover_index_at(y, item_height, self.items.len());
        if hover != self.hover {
            self.hover = hover;
            true
        } else {
            false
        }
    }

    /// A pointer release. While open and armed, closes the menu; a release
    /// over the expanded region with a live hover commits it. Returns the
    /// committed index, if any.
    pub fn release(&mut self, region: MenuRegion) -> Option<usize> {
        if !self.open || !self.armed {
            return None;
        }
        let committed = match (region, self.hover) {
            (MenuRegion::Expanded, Some(hover)) => {
                self.selected = hover;
                Some(hover)
            }
            _ => None,
        };
        self.open = false;
        self.armed = false;
        self.hover = None;
        committed
    }
}

/// A single subscribed observer.
struct Observer {
    key: String,
    callback: Box<dyn FnMut(usize)>,
}

/// Observers of the menu selection, notified in subscription order.
///
/// Each observer is identified by a caller-supplied key; subscribing an
/// already-present key is ignored, so subscription is idempotent, and
/// unsubscribing an absent key is a no-op.
#[derive(Default)]
pub struct ObserverRegistry {
    observers: Vec<Observer>,
}

impl ObserverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback under `key`. Returns false (and warns) when the
    /// key is already subscribed; the original callback is kept.
    pub fn subscribe(&mut self, key: impl Into<String>, callback: impl FnMut(usize) + 'static) -> bool {
        let key = key.into();
        if self.observers.iter().any(|o| o.key == key) {
            log::warn!("observer {key:?} is already subscribed; ignoring");
            return false;
        }
        self.observers.push(Observer {
            key,
            callback: Box::new(callback),
        });
        true
    }

    /// Removes the observer registered under `key`. Returns false when no
    /// such observer exists.
    pub fn unsubscribe(&mut self, key: &str) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.key != key);
        self.observers.len() != before
    }

    /// Invokes every callback with `value`, in subscription order.
    pub fn notify(&mut self, value: usize) {
        for observer in &mut self.observers {
            (observer.callback)(value);
        }
    }

    /// Number of subscribed observers.
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    /// True when nothing is subscribed.
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

/// Configuration for the drop-down menu widget.
#[derive(Clone, Debug)]
pub struct DropMenuConfig {
    /// Width of the closed selection box.
    pub width: f32,
    /// Height of the closed selection box.
    pub height: f32,
    /// Background of both the closed box and the expanded list.
    pub background_color: Color32,
    /// Text color of the closed box and unhovered items.
    pub font_color: Color32,
    /// Font size of the closed box label.
    pub font_size: f32,
    /// Font family of the closed box label.
    pub font_family: FontFamily,
    /// Font size of items in the expanded list; also fixes the row height.
    pub item_font_size: f32,
    /// Font family of items in the expanded list.
    pub item_font_family: FontFamily,
    /// Background cover behind the hovered item.
    pub hover_background_color: Color32,
    /// Text color of the hovered item.
    pub hover_font_color: Color32,
}

impl Default for DropMenuConfig {
    fn default() -> Self {
        Self {
            width: 160.0,
            height: 28.0,
            background_color: theme::menu::BACKGROUND,
            font_color: theme::menu::FONT,
            font_size: 12.0,
            font_family: FontFamily::Proportional,
            item_font_size: 12.0,
            item_font_family: FontFamily::Proportional,
            hover_background_color: theme::menu::HOVER_BACKGROUND,
            hover_font_color: theme::menu::HOVER_FONT,
        }
    }
}

impl DropMenuConfig {
    /// Creates a narrow menu for toolbars.
    pub fn compact() -> Self {
        Self {
            width: 120.0,
            height: 22.0,
            font_size: 11.0,
            item_font_size: 11.0,
            ..Default::default()
        }
    }

    /// Set the closed box dimensions.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the background and text colors.
    pub fn with_colors(mut self, background: Color32, font: Color32) -> Self {
        self.background_color = background;
        self.font_color = font;
        self
    }

    /// Set the hover highlight colors.
    pub fn with_hover_colors(mut self, background: Color32, font: Color32) -> Self {
        self.hover_background_color = background;
        self.hover_font_color = font;
        self
    }

    /// Set the closed-box and item font sizes.
    pub fn with_font_sizes(mut self, font_size: f32, item_font_size: f32) -> Self {
        self.font_size = font_size;
        self.item_font_size = item_font_size;
        self
    }
}

/// A drop-down selection menu.
///
/// Owns its interaction state and observers; show it once per frame with
/// [`DropMenu::show`]. The selection can also be driven programmatically
/// through [`DropMenu::set_value`], which notifies observers exactly like a
/// pointer commit.
pub struct DropMenu {
    config: DropMenuConfig,
    state: MenuState,
    observers: ObserverRegistry,
    needs_repaint: bool,
}

impl DropMenu {
    /// Creates an empty menu with the given configuration.
    pub fn new(config: DropMenuConfig) -> Self {
        Self {
            config,
            state: MenuState::default(),
            observers: ObserverRegistry::new(),
            needs_repaint: true,
        }
    }

    /// Builder-style item list.
    pub fn with_items(mut self, items: Vec<String>) -> Self {
        self.state.set_items(items);
        self
    }

    /// The ordered item list.
    pub fn items(&self) -> &[String] {
        self.state.items()
    }

    /// Replaces the item list; the selection is clamped into the new bounds.
    pub fn set_items(&mut self, items: Vec<String>) {
        self.state.set_items(items);
        self.needs_repaint = true;
    }

    /// Appends one item.
    pub fn add_item(&mut self, item: impl Into<String>) {
        self.state.add_item(item.into());
        self.needs_repaint = true;
    }

    /// The selected index. Reads 0 while the list is empty; use
    /// [`DropMenu::selection`] to distinguish that case.
    pub fn value(&self) -> usize {
        self.state.selection().unwrap_or(0)
    }

    /// The selected index, or `None` when the list is empty.
    pub fn selection(&self) -> Option<usize> {
        self.state.selection()
    }

    /// The label of the selected item.
    pub fn selected_label(&self) -> Option<&str> {
        self.state
            .selection()
            .map(|i| self.state.items()[i].as_str())
    }

    /// Force-sets the selection, clamping out-of-range indices, and notifies
    /// observers with the index actually selected. Ignored while the list is
    /// empty.
    pub fn set_value(&mut self, index: usize) {
        if index >= self.state.items().len() && !self.state.items().is_empty() {
            log::warn!(
                "menu index {index} out of bounds for {} items; clamping",
                self.state.items().len()
            );
        }
        let Some(selected) = self.state.set_selected(index) else {
            log::warn!("ignoring set_value({index}) on an empty menu");
            return;
        };
        self.observers.notify(selected);
        self.needs_repaint = true;
    }

    /// Registers an observer of selection commits. Returns false when the
    /// key is already subscribed.
    pub fn subscribe(&mut self, key: impl Into<String>, callback: impl FnMut(usize) + 'static) -> bool {
        self.observers.subscribe(key, callback)
    }

    /// Removes the observer registered under `key`; a no-op when absent.
    pub fn unsubscribe(&mut self, key: &str) -> bool {
        self.observers.unsubscribe(key)
    }

    /// Notifies every observer with the current selection.
    pub fn notify_observers(&mut self) {
        if let Some(selected) = self.state.selection() {
            self.observers.notify(selected);
        }
    }

    /// Whether the expanded region is currently showing.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Takes the pending repaint request, if any. Bursts of mutations since
    /// the last call collapse into one request.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_repaint)
    }

    /// Feeds a release into the state machine and fires observers on commit.
    fn apply_release(&mut self, region: MenuRegion) {
        let was_open = self.state.is_open();
        if let Some(committed) = self.state.release(region) {
            self.observers.notify(committed);
        }
        if was_open != self.state.is_open() {
            self.needs_repaint = true;
        }
    }

    /// Draws the closed box and, while open, the expanded list.
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let size = Vec2::new(self.config.width, self.config.height);
        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        let row_height = item_height(self.config.item_font_size);
        let item_font = FontId::new(self.config.item_font_size, self.config.item_font_family.clone());

        // Measure every item to size the expanded region; only needed while
        // the pointer can interact with it.
        let expanded_rect = if self.state.is_open() {
            let widths: Vec<f32> = ui.fonts(|fonts| {
                self.state
                    .items()
                    .iter()
                    .map(|item| {
                        fonts
                            .layout_no_wrap(item.clone(), item_font.clone(), self.config.font_color)
                            .size()
                            .x
                    })
                    .collect()
            });
            Some(Rect::from_min_size(
                rect.left_bottom(),
                expanded_size(&widths, row_height),
            ))
        } else {
            None
        };

        // Translate raw pointer input into state machine events.
        let (pointer, pressed, released) = ui.input(|i| {
            (
                i.pointer.interact_pos().or_else(|| i.pointer.latest_pos()),
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
            )
        });

        let region = match pointer {
            Some(pos) if expanded_rect.is_some_and(|r| r.contains(pos)) => MenuRegion::Expanded,
            Some(pos) if rect.contains(pos) => MenuRegion::ClosedBox,
            _ => MenuRegion::Outside,
        };

        if pressed && self.state.press(region) {
            self.needs_repaint = true;
        }

        if let (Some(pos), Some(dd_rect)) = (pointer, expanded_rect) {
            if dd_rect.contains(pos) && self.state.moved(pos.y - dd_rect.top(), row_height) {
                self.needs_repaint = true;
            }
        }

        if released {
            self.apply_release(region);
        }

        // Closed box: background and the selected label.
        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            painter.rect_filled(rect, 0.0, self.config.background_color);
            if let Some(label) = self.selected_label() {
                painter.text(
                    Pos2::new(rect.left() + TEXT_INSET, rect.center().y),
                    Align2::LEFT_CENTER,
                    label,
                    FontId::new(self.config.font_size, self.config.font_family.clone()),
                    self.config.font_color,
                );
            }
        }

        // Expanded list in a foreground layer below the box.
        if self.state.is_open() {
            if let Some(dd_rect) = expanded_rect {
                let config = &self.config;
                let state = &self.state;
                egui::Area::new(response.id.with("expanded"))
                    .order(egui::Order::Foreground)
                    .fixed_pos(dd_rect.min)
                    .show(ui.ctx(), |area_ui| {
                        let (list_rect, _) =
                            area_ui.allocate_exact_size(dd_rect.size(), Sense::click_and_drag());
                        let painter = area_ui.painter();
                        painter.rect_filled(list_rect, 0.0, config.background_color);

                        for (i, item) in state.items().iter().enumerate() {
                            let row_top = list_rect.top() + i as f32 * row_height;
                            let mut color = config.font_color;
                            if state.hover() == Some(i) {
                                painter.rect_filled(
                                    Rect::from_min_size(
                                        Pos2::new(list_rect.left(), row_top),
                                        Vec2::new(list_rect.width(), row_height),
                                    ),
                                    0.0,
                                    config.hover_background_color,
                                );
                                color = config.hover_font_color;
                            }
                            painter.text(
                                Pos2::new(list_rect.left() + TEXT_INSET, row_top + row_height / 2.0),
                                Align2::LEFT_CENTER,
                                item,
                                item_font.clone(),
                                color,
                            );
                        }
                    });
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn abc_menu() -> DropMenu {
        DropMenu::new(DropMenuConfig::default()).with_items(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ])
    }

    /// Drives the full open -> hover -> commit sequence through the widget.
    fn commit_index(menu: &mut DropMenu, index: usize) {
        let row = item_height(menu.config.item_font_size);
        menu.state.press(MenuRegion::ClosedBox);
        menu.state.press(MenuRegion::Expanded);
        menu.state.moved(index as f32 * row + row / 2.0, row);
        menu.apply_release(MenuRegion::Expanded);
    }

    #[test]
    fn test_item_height_is_twice_font_size() {
        assert_eq!(item_height(12.0), 24.0);
    }

    #[test]
    fn test_hover_index_clamps_into_range() {
        assert_eq!(hover_index_at(-5.0, 24.0, 3), Some(0));
        assert_eq!(hover_index_at(30.0, 24.0, 3), Some(1));
        assert_eq!(hover_index_at(500.0, 24.0, 3), Some(2));
        assert_eq!(hover_index_at(10.0, 24.0, 0), None);
    }

    #[test]
    fn test_expanded_size_from_widths() {
        let size = expanded_size(&[30.0, 50.0, 40.0], 24.0);
        assert_eq!(size, Vec2::new(70.0, 72.0));
    }

    #[test]
    fn test_selection_commit_round_trip() {
        let mut menu = abc_menu();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        menu.subscribe("listener", move |i| sink.borrow_mut().push(i));

        commit_index(&mut menu, 2);

        assert_eq!(menu.value(), 2);
        assert!(!menu.is_open());
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_release_outside_does_not_commit() {
        let mut menu = abc_menu();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        menu.subscribe("listener", move |i| sink.borrow_mut().push(i));

        let row = item_height(menu.config.item_font_size);
        menu.state.press(MenuRegion::ClosedBox);
        menu.state.press(MenuRegion::Expanded);
        menu.state.moved(row * 1.5, row);
        menu.apply_release(MenuRegion::Outside);

        assert_eq!(menu.value(), 0);
        assert!(!menu.is_open());
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_observers_fire_in_subscription_order() {
        let mut menu = abc_menu();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        menu.subscribe("first", move |i| sink.borrow_mut().push(("first", i)));
        let sink = Rc::clone(&seen);
        menu.subscribe("second", move |i| sink.borrow_mut().push(("second", i)));

        commit_index(&mut menu, 1);

        assert_eq!(*seen.borrow(), vec![("first", 1), ("second", 1)]);
    }

    #[test]
    fn test_unsubscribe_absent_key_is_noop() {
        let mut menu = abc_menu();
        assert!(!menu.unsubscribe("never-subscribed"));

        menu.subscribe("listener", |_| {});
        assert!(menu.unsubscribe("listener"));
        assert!(!menu.unsubscribe("listener"));
    }

    #[test]
    fn test_duplicate_subscription_is_ignored() {
        let mut menu = abc_menu();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        assert!(menu.subscribe("listener", move |i| sink.borrow_mut().push(i)));
        let sink = Rc::clone(&seen);
        assert!(!menu.subscribe("listener", move |i| sink.borrow_mut().push(i)));

        commit_index(&mut menu, 1);
        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_opening_press_release_keeps_menu_open() {
        let mut menu = abc_menu();
        menu.state.press(MenuRegion::ClosedBox);
        menu.apply_release(MenuRegion::ClosedBox);
        assert!(menu.is_open());
    }

    #[test]
    fn test_press_on_closed_box_while_open_does_not_arm() {
        let mut menu = abc_menu();
        menu.state.press(MenuRegion::ClosedBox);
        menu.state.press(MenuRegion::ClosedBox);
        menu.apply_release(MenuRegion::ClosedBox);
        assert!(menu.is_open());
    }

    #[test]
    fn test_release_without_hover_closes_without_commit() {
        let mut menu = abc_menu();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        menu.subscribe("listener", move |i| sink.borrow_mut().push(i));

        menu.state.press(MenuRegion::ClosedBox);
        menu.state.press(MenuRegion::Expanded);
        menu.apply_release(MenuRegion::Expanded);

        assert!(!menu.is_open());
        assert!(seen.borrow().is_empty());
        assert_eq!(menu.value(), 0);
    }

    #[test]
    fn test_moved_while_closed_is_ignored() {
        let mut menu = abc_menu();
        assert!(!menu.state.moved(10.0, 24.0));
        assert_eq!(menu.state.hover(), None);
    }

    #[test]
    fn test_set_items_clamps_selection() {
        let mut menu = abc_menu();
        menu.set_value(2);

        menu.set_items(vec!["only".to_string()]);
        assert_eq!(menu.selection(), Some(0));

        menu.set_items(Vec::new());
        assert_eq!(menu.selection(), None);
        assert_eq!(menu.selected_label(), None);
    }

    #[test]
    fn test_set_value_out_of_range_clamps_and_notifies() {
        let mut menu = abc_menu();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        menu.subscribe("listener", move |i| sink.borrow_mut().push(i));

        menu.set_value(7);

        assert_eq!(menu.value(), 2);
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_set_value_on_empty_menu_is_ignored() {
        let mut menu = DropMenu::new(DropMenuConfig::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        menu.subscribe("listener", move |i| sink.borrow_mut().push(i));

        menu.set_value(0);

        assert_eq!(menu.selection(), None);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_add_item_keeps_selection() {
        let mut menu = abc_menu();
        menu.set_value(1);
        menu.add_item("d");
        assert_eq!(menu.value(), 1);
        assert_eq!(menu.items().len(), 4);
    }

    #[test]
    fn test_mutation_burst_coalesces_to_one_repaint() {
        let mut menu = abc_menu();
        menu.take_repaint();

        menu.add_item("d");
        menu.add_item("e");
        menu.set_value(1);

        assert!(menu.take_repaint());
        assert!(!menu.take_repaint());
    }

    #[test]
    fn test_default_config_matches_theme() {
        let config = DropMenuConfig::default();
        assert_eq!(config.background_color, theme::menu::BACKGROUND);
        assert_eq!(config.hover_font_color, theme::menu::HOVER_FONT);
        assert_eq!(config.font_size, 12.0);
    }

    #[test]
    fn test_compact_config() {
        let config = DropMenuConfig::compact();
        assert_eq!(config.width, 120.0);
        assert_eq!(config.item_font_size, 11.0);
    }
}
