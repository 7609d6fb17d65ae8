//! Deferred gameplay work
//!
//! Tasks carry the identity they were issued under (a disk handle or a round
//! generation). The game validates that identity when a task fires, so a
//! timer outliving its round or its disk does nothing.

use super::world::BodyHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Take a scored disk out of the simulation
    RemoveDisk { disk: BodyHandle },
    /// Close the round that exhausted its allotment
    EndRound { generation: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    due_ms: u64,
    seq: u64,
    task: Task,
}

/// Millisecond clock with a queue of pending tasks
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_seq: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Queue a task to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Scheduled {
            due_ms: self.now_ms.saturating_add(delay_ms),
            seq,
            task,
        });
    }

    /// Advance the clock and return every task that came due, oldest first
    pub fn advance(&mut self, dt_ms: u64) -> Vec<Task> {
        self.now_ms = self.now_ms.saturating_add(dt_ms);
        let now = self.now_ms;

        let mut due: Vec<Scheduled> = Vec::new();
        self.pending.retain(|s| {
            if s.due_ms <= now {
                due.push(*s);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|s| (s.due_ms, s.seq));
        due.into_iter().map(|s| s.task).collect()
    }

    /// Whether any pending task matches
    pub fn has_pending(&self, task: &Task) -> bool {
        self.pending.iter().any(|s| s.task == *task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_fire_when_due() {
        let mut timers = Scheduler::new();
        timers.schedule(500, Task::RemoveDisk { disk: BodyHandle(1) });
        assert!(timers.advance(499).is_empty());
        assert_eq!(timers.advance(1), vec![Task::RemoveDisk { disk: BodyHandle(1) }]);
        assert!(timers.is_empty());
        assert_eq!(timers.now_ms(), 500);
    }

    #[test]
    fn test_fire_order_is_due_then_schedule_order() {
        let mut timers = Scheduler::new();
        timers.schedule(300, Task::EndRound { generation: 1 });
        timers.schedule(100, Task::RemoveDisk { disk: BodyHandle(2) });
        timers.schedule(100, Task::RemoveDisk { disk: BodyHandle(3) });
        assert_eq!(timers.len(), 3);

        assert_eq!(
            timers.advance(1000),
            vec![
                Task::RemoveDisk { disk: BodyHandle(2) },
                Task::RemoveDisk { disk: BodyHandle(3) },
                Task::EndRound { generation: 1 },
            ]
        );
    }

    #[test]
    fn test_delay_is_relative_to_schedule_time() {
        let mut timers = Scheduler::new();
        timers.advance(1000);
        timers.schedule(500, Task::EndRound { generation: 7 });
        assert!(timers.has_pending(&Task::EndRound { generation: 7 }));
        assert!(timers.advance(400).is_empty());
        assert_eq!(timers.advance(100).len(), 1);
        assert!(!timers.has_pending(&Task::EndRound { generation: 7 }));
    }
}
