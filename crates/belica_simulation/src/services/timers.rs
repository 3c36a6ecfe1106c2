//! Timer service + animation sequence tickets
//!
//! Каждый scheduled timer получает generation. Handle, выданный при
//! expiry, валиден только пока для этого key не было нового schedule/cancel.
//! Так re-fire внутри одного tick не съедает свежий timer.

use std::fmt::Debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle<K> {
    pub key: K,
    pub generation: u32,
}

#[derive(Debug, Clone)]
struct TimerSlot<K> {
    key: K,
    generation: u32,
    duration: f32,
    elapsed: f32,
}

/// One-shot timers keyed by `K` (максимум один активный timer на key)
#[derive(Debug, Clone)]
pub struct Timers<K> {
    active: Vec<TimerSlot<K>>,
    issued: Vec<(K, u32)>,
    generation: u32,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            issued: Vec::new(),
            generation: 0,
        }
    }
}

impl<K: Copy + Eq + Debug> Timers<K> {
    /// Schedule (или перезапустить) timer
    pub fn schedule(&mut self, key: K, duration: f32) -> TimerHandle<K> {
        let generation = self.bump(key);
        let slot = TimerSlot {
            key,
            generation,
            duration: duration.max(0.0),
            elapsed: 0.0,
        };

        match self.active.iter_mut().find(|s| s.key == key) {
            Some(existing) => *existing = slot,
            None => self.active.push(slot),
        }

        TimerHandle { key, generation }
    }

    /// Отменить timer. Уже выданные handles для key становятся stale.
    pub fn cancel(&mut self, key: K) -> bool {
        self.bump(key);
        let before = self.active.len();
        self.active.retain(|s| s.key != key);
        before != self.active.len()
    }

    pub fn is_active(&self, key: K) -> bool {
        self.active.iter().any(|s| s.key == key)
    }

    pub fn elapsed(&self, key: K) -> Option<f32> {
        self.active.iter().find(|s| s.key == key).map(|s| s.elapsed)
    }

    pub fn remaining(&self, key: K) -> Option<f32> {
        self.active
            .iter()
            .find(|s| s.key == key)
            .map(|s| (s.duration - s.elapsed).max(0.0))
    }

    /// Handle всё ещё последний для своего key
    pub fn is_current(&self, handle: TimerHandle<K>) -> bool {
        self.issued
            .iter()
            .find(|(k, _)| *k == handle.key)
            .is_some_and(|(_, g)| *g == handle.generation)
    }

    /// Advance all timers. Возвращает expired handles в порядке schedule.
    pub fn tick(&mut self, delta_time: f32) -> Vec<TimerHandle<K>> {
        let mut expired = Vec::new();

        for slot in &mut self.active {
            slot.elapsed += delta_time;
            if slot.elapsed >= slot.duration {
                expired.push(TimerHandle {
                    key: slot.key,
                    generation: slot.generation,
                });
            }
        }

        self.active
            .retain(|s| !expired.iter().any(|h| h.key == s.key && h.generation == s.generation));

        expired
    }

    fn bump(&mut self, key: K) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        match self.issued.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = generation,
            None => self.issued.push((key, generation)),
        }
        generation
    }
}

/// Ticket animation sequence (reload / equip montage)
///
/// Host получает ticket в effect event и возвращает его в notify.
/// Notify со старым ticket игнорируется.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SequenceTicket(pub u32);

#[derive(Debug, Clone, Default)]
pub struct SequenceTracker {
    current: Option<SequenceTicket>,
    counter: u32,
}

impl SequenceTracker {
    pub fn begin(&mut self) -> SequenceTicket {
        self.counter = self.counter.wrapping_add(1);
        let ticket = SequenceTicket(self.counter);
        self.current = Some(ticket);
        ticket
    }

    /// true если ticket совпал с текущим (sequence закрыта)
    pub fn complete(&mut self, ticket: SequenceTicket) -> bool {
        if self.current == Some(ticket) {
            self.current = None;
            true
        } else {
            false
        }
    }

    pub fn current(&self) -> Option<SequenceTicket> {
        self.current
    }
}
