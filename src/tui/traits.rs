//! Core traits shared by the TUI screens

use crate::tui::app::Screen;

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a different screen
    NavigateTo(Screen),
    /// Go back to the main menu
    NavigateBack,
    Quit,
    /// No action taken
    None,
}

/// Trait for screens with navigable lists
pub trait Navigable {
    fn navigate_up(&mut self);

    fn navigate_down(&mut self);

    fn get_selected_index(&self) -> Option<usize>;

    fn set_selected_index(&mut self, index: Option<usize>);

    fn get_item_count(&self) -> usize;

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }

    /// Keep the selection inside the list after it shrank or grew
    fn clamp_selection(&mut self) {
        let count = self.get_item_count();
        match self.get_selected_index() {
            _ if count == 0 => self.set_selected_index(None),
            Some(i) if i >= count => self.set_selected_index(Some(count - 1)),
            None => self.set_selected_index(Some(0)),
            _ => {}
        }
    }
}
