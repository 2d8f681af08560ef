//! Process-wide state: the process table, scheduling queues, the name registry
//! and the process id counter.
//!
//! Single writer. `VM` puts the whole context behind one lock.
use std::collections::{HashMap, VecDeque};

use crate::{AtomIndex, ContextError, HeapCreateInfo, Process, ProcessId};

#[derive(Debug, Default)]
pub struct GlobalContext {
    ready_processes: VecDeque<ProcessId>,
    waiting_processes: VecDeque<ProcessId>,
    listeners: VecDeque<ProcessId>,
    // slot storage plus an id index, freed slots are reused
    slots: Vec<Option<Process>>,
    free: Vec<usize>,
    index: HashMap<ProcessId, usize>,
    registered_processes: HashMap<AtomIndex, ProcessId>,
    last_process_id: u32,
}

impl GlobalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tear down the context and every process still in the table
    pub fn destroy(self) {
        let live = self.process_count();
        if live > 0 {
            log::warn!(target: "process", "destroying context with {live} live processes");
        }
    }

    /// Ids start at 1 and are never reused
    pub fn next_process_id(&mut self) -> Result<ProcessId, ContextError> {
        let next = self
            .last_process_id
            .checked_add(1)
            .ok_or(ContextError::ProcessIdsExhausted)?;
        let id = ProcessId::new(next).ok_or(ContextError::ProcessIdsExhausted)?;
        self.last_process_id = next;
        Ok(id)
    }

    pub fn spawn(&mut self, heap: &HeapCreateInfo) -> Result<ProcessId, ContextError> {
        let id = self.next_process_id()?;
        self.insert_process(Process::new(id, heap))?;
        Ok(id)
    }

    pub fn insert_process(&mut self, process: Process) -> Result<(), ContextError> {
        let id = process.id();
        if self.index.contains_key(&id) {
            return Err(ContextError::DuplicateProcess(id));
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(process);
                slot
            }
            None => {
                self.slots.push(Some(process));
                self.slots.len() - 1
            }
        };
        self.index.insert(id, slot);
        // the counter must never hand this id out again
        self.last_process_id = self.last_process_id.max(id.get());
        log::debug!(target: "process", "inserted {id} at slot {slot}");
        Ok(())
    }

    /// Takes the process out of the table, its name bindings and queue entries go with it
    pub fn remove_process(&mut self, id: ProcessId) -> Option<Process> {
        let slot = self.index.remove(&id)?;
        let process = self.slots[slot].take();
        self.free.push(slot);

        self.registered_processes.retain(|_, registered| *registered != id);
        for queue in [
            &mut self.ready_processes,
            &mut self.waiting_processes,
            &mut self.listeners,
        ] {
            queue.retain(|queued| *queued != id);
        }
        log::debug!(target: "process", "removed {id}");
        process
    }

    pub fn find_process(&self, id: ProcessId) -> Option<&Process> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_ref()
    }

    pub fn find_process_mut(&mut self, id: ProcessId) -> Option<&mut Process> {
        let slot = *self.index.get(&id)?;
        self.slots[slot].as_mut()
    }

    pub fn process_count(&self) -> usize {
        self.index.len()
    }

    pub fn register_name(&mut self, name: AtomIndex, id: ProcessId) -> Result<(), ContextError> {
        if !self.index.contains_key(&id) {
            return Err(ContextError::NoSuchProcess(id));
        }
        if self.registered_processes.contains_key(&name) {
            return Err(ContextError::NameTaken(name));
        }
        self.registered_processes.insert(name, id);
        log::debug!(target: "process", "registered {id} as {name:?}");
        Ok(())
    }

    /// `None` when the name is unbound
    pub fn resolve_name(&self, name: AtomIndex) -> Option<ProcessId> {
        self.registered_processes.get(&name).copied()
    }

    pub fn unregister_name(&mut self, name: AtomIndex) -> Option<ProcessId> {
        self.registered_processes.remove(&name)
    }

    pub fn ready_processes_mut(&mut self) -> &mut VecDeque<ProcessId> {
        &mut self.ready_processes
    }

    pub fn waiting_processes_mut(&mut self) -> &mut VecDeque<ProcessId> {
        &mut self.waiting_processes
    }

    pub fn listeners_mut(&mut self) -> &mut VecDeque<ProcessId> {
        &mut self.listeners
    }
}
