//! Presentation layer: formatter, status region, answer renderer, and the
//! surfaces that display them.

pub mod answer;
pub mod format;
pub mod status;
pub mod terminal;

use crate::controller::state::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Questions,
    Answer,
}

/// Where the controller's state changes become visible.
pub trait Surface {
    /// Called after `transition` has been applied to the page state.
    fn present(&mut self, transition: &Transition);
    /// Blocking notice for question-submission problems.
    fn notice(&mut self, message: &str);
    fn focus(&mut self, region: Region);
}
