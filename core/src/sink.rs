use crate::change::{
    ConfigChange, LinkDeclare, NameChange, NameChangeMode, OrderChange, PatchEvent, PoolChange,
    RowChange,
};
use crate::error::PatchError;

/// Consumer of a change stream.
///
/// Every method defaults to accepting the event and doing nothing, so sinks
/// only implement what they render or apply. A returned error concerns only
/// that event unless [`PatchError::is_terminal`] says otherwise.
pub trait Patcher {
    fn change_config(&mut self, _change: &ConfigChange) -> Result<(), PatchError> {
        Ok(())
    }

    fn change_column(&mut self, _change: &OrderChange) -> Result<(), PatchError> {
        Ok(())
    }

    fn change_row(&mut self, _change: &RowChange) -> Result<(), PatchError> {
        Ok(())
    }

    /// Called twice per session: first with `is_final == false`, then, after
    /// all column edits, with `is_final == true`.
    fn declare_names(&mut self, _names: &[String], _is_final: bool) -> Result<(), PatchError> {
        Ok(())
    }

    fn change_name(&mut self, change: &NameChange) -> Result<(), PatchError> {
        match change.mode {
            NameChangeMode::Declare => self.declare_names(&change.names, change.is_final),
            NameChangeMode::Select => Ok(()),
        }
    }

    fn change_pool(&mut self, _change: &PoolChange) -> Result<(), PatchError> {
        Ok(())
    }

    fn declare_link(&mut self, _decl: &LinkDeclare) -> Result<(), PatchError> {
        Ok(())
    }

    fn set_sheet(&mut self, _name: &str) -> Result<(), PatchError> {
        Ok(())
    }

    fn merge_start(&mut self) -> Result<(), PatchError> {
        Ok(())
    }

    fn merge_done(&mut self) -> Result<(), PatchError> {
        Ok(())
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        Ok(())
    }
}

impl<P: Patcher + ?Sized> Patcher for &mut P {
    fn change_config(&mut self, change: &ConfigChange) -> Result<(), PatchError> {
        (**self).change_config(change)
    }

    fn change_column(&mut self, change: &OrderChange) -> Result<(), PatchError> {
        (**self).change_column(change)
    }

    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        (**self).change_row(change)
    }

    fn declare_names(&mut self, names: &[String], is_final: bool) -> Result<(), PatchError> {
        (**self).declare_names(names, is_final)
    }

    fn change_name(&mut self, change: &NameChange) -> Result<(), PatchError> {
        (**self).change_name(change)
    }

    fn change_pool(&mut self, change: &PoolChange) -> Result<(), PatchError> {
        (**self).change_pool(change)
    }

    fn declare_link(&mut self, decl: &LinkDeclare) -> Result<(), PatchError> {
        (**self).declare_link(decl)
    }

    fn set_sheet(&mut self, name: &str) -> Result<(), PatchError> {
        (**self).set_sheet(name)
    }

    fn merge_start(&mut self) -> Result<(), PatchError> {
        (**self).merge_start()
    }

    fn merge_done(&mut self) -> Result<(), PatchError> {
        (**self).merge_done()
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        (**self).merge_all_done()
    }
}

/// Fans every event out to a list of patchers, in registration order.
///
/// All listeners see every event even when an earlier one fails; the first
/// error is returned once they have all run.
#[derive(Default)]
pub struct PatchChain<'a> {
    listeners: Vec<Box<dyn Patcher + 'a>>,
}

impl<'a> PatchChain<'a> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn push(&mut self, patcher: impl Patcher + 'a) -> &mut Self {
        self.listeners.push(Box::new(patcher));
        self
    }

    pub fn with(mut self, patcher: impl Patcher + 'a) -> Self {
        self.push(patcher);
        self
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn each(
        &mut self,
        mut f: impl FnMut(&mut (dyn Patcher + 'a)) -> Result<(), PatchError>,
    ) -> Result<(), PatchError> {
        let mut first_err = None;
        for listener in &mut self.listeners {
            if let Err(err) = f(listener.as_mut()) {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl Patcher for PatchChain<'_> {
    fn change_config(&mut self, change: &ConfigChange) -> Result<(), PatchError> {
        self.each(|p| p.change_config(change))
    }

    fn change_column(&mut self, change: &OrderChange) -> Result<(), PatchError> {
        self.each(|p| p.change_column(change))
    }

    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        self.each(|p| p.change_row(change))
    }

    fn declare_names(&mut self, names: &[String], is_final: bool) -> Result<(), PatchError> {
        self.each(|p| p.declare_names(names, is_final))
    }

    fn change_name(&mut self, change: &NameChange) -> Result<(), PatchError> {
        self.each(|p| p.change_name(change))
    }

    fn change_pool(&mut self, change: &PoolChange) -> Result<(), PatchError> {
        self.each(|p| p.change_pool(change))
    }

    fn declare_link(&mut self, decl: &LinkDeclare) -> Result<(), PatchError> {
        self.each(|p| p.declare_link(decl))
    }

    fn set_sheet(&mut self, name: &str) -> Result<(), PatchError> {
        self.each(|p| p.set_sheet(name))
    }

    fn merge_start(&mut self) -> Result<(), PatchError> {
        self.each(|p| p.merge_start())
    }

    fn merge_done(&mut self) -> Result<(), PatchError> {
        self.each(|p| p.merge_done())
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        self.each(|p| p.merge_all_done())
    }
}

/// A patcher that records every event it sees.
#[derive(Debug, Default)]
pub struct VecPatcher {
    events: Vec<PatchEvent>,
}

impl VecPatcher {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[PatchEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<PatchEvent> {
        self.events
    }
}

impl Patcher for VecPatcher {
    fn change_config(&mut self, change: &ConfigChange) -> Result<(), PatchError> {
        self.events.push(PatchEvent::Config(*change));
        Ok(())
    }

    fn change_column(&mut self, change: &OrderChange) -> Result<(), PatchError> {
        self.events.push(PatchEvent::Column(change.clone()));
        Ok(())
    }

    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        self.events.push(PatchEvent::Row(change.clone()));
        Ok(())
    }

    fn change_name(&mut self, change: &NameChange) -> Result<(), PatchError> {
        self.events.push(PatchEvent::Name(change.clone()));
        Ok(())
    }

    fn change_pool(&mut self, change: &PoolChange) -> Result<(), PatchError> {
        self.events.push(PatchEvent::Pool(change.clone()));
        Ok(())
    }

    fn declare_link(&mut self, decl: &LinkDeclare) -> Result<(), PatchError> {
        self.events.push(PatchEvent::Link(decl.clone()));
        Ok(())
    }

    fn set_sheet(&mut self, name: &str) -> Result<(), PatchError> {
        self.events.push(PatchEvent::SetSheet {
            name: name.to_string(),
        });
        Ok(())
    }

    fn merge_start(&mut self) -> Result<(), PatchError> {
        self.events.push(PatchEvent::MergeStart);
        Ok(())
    }

    fn merge_done(&mut self) -> Result<(), PatchError> {
        self.events.push(PatchEvent::MergeDone);
        Ok(())
    }

    fn merge_all_done(&mut self) -> Result<(), PatchError> {
        self.events.push(PatchEvent::MergeAllDone);
        Ok(())
    }
}

/// A patcher that forwards row events to a callback.
pub struct CallbackPatcher<F: FnMut(&RowChange)> {
    f: F,
}

impl<F: FnMut(&RowChange)> CallbackPatcher<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: FnMut(&RowChange)> Patcher for CallbackPatcher<F> {
    fn change_row(&mut self, change: &RowChange) -> Result<(), PatchError> {
        (self.f)(change);
        Ok(())
    }
}
