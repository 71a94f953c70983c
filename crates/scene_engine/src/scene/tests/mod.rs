//! Scene scenarios exercising transforms, lifecycle and events together

mod hierarchy;
mod lifecycle;

use std::cell::RefCell;
use std::rc::Rc;

use crate::scene::{Capabilities, Component, ComponentContext};

/// Shared log of hook calls
pub(super) type Journal = Rc<RefCell<Vec<String>>>;

pub(super) fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Records every hook it receives
pub(super) struct Probe {
    pub name: &'static str,
    pub capabilities: Capabilities,
    pub journal: Journal,
}

impl Probe {
    pub fn new(name: &'static str, capabilities: Capabilities, journal: &Journal) -> Self {
        Self {
            name,
            capabilities,
            journal: Rc::clone(journal),
        }
    }

    fn record(&self, hook: &str) {
        self.journal.borrow_mut().push(format!("{}:{}", self.name, hook));
    }
}

impl Component for Probe {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn activated(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("activated");
    }

    fn deactivated(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("deactivated");
    }

    fn destroyed(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("destroyed");
    }

    fn update(&mut self, _ctx: &mut ComponentContext<'_>) {
        self.record("update");
    }
}

/// Render-capable component with no behaviour
#[derive(Default)]
pub(super) struct Sprite;

impl Component for Sprite {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER
    }
}

pub(super) fn entries(journal: &Journal) -> Vec<String> {
    journal.borrow().clone()
}
