use std::collections::VecDeque;

use crate::rules::CallRuleRc;

/// Stable handle of a rule added to a fake
///
/// Handles stay valid while other rules are added or removed. A removed rule's slot is reused
/// under a new generation, so its old handle never addresses the rule that replaces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId {
    index: usize,
    generation: u32,
}

struct RuleSlot {
    rule: CallRuleRc,
    remaining: Option<u32>,
}

#[derive(Default)]
struct Slot {
    generation: u32,
    entry: Option<RuleSlot>,
}

/// The ordered rule list of a fake
///
/// Rules live in generational slots addressed by [`RuleId`]; freed slots are recycled through
/// `free`, so the slot table never grows past the peak number of live rules. `order` lists
/// handles by priority, most recently added first. Removal leaves a stale handle in `order`
/// that is skipped during iteration and compacted once stale handles outnumber live rules.
#[derive(Default)]
pub(crate) struct RuleArena {
    slots: Vec<Slot>,
    free: Vec<usize>,
    order: VecDeque<RuleId>,
    live: usize,
}

impl RuleArena {
    fn insert(&mut self, rule: CallRuleRc) -> RuleId {
        let remaining = rule.remaining_uses();
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            }
        };

        let slot = &mut self.slots[index];
        slot.entry = Some(RuleSlot { rule, remaining });
        self.live += 1;
        RuleId {
            index,
            generation: slot.generation,
        }
    }

    fn get(&self, id: RuleId) -> Option<&RuleSlot> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn get_mut(&mut self, id: RuleId) -> Option<&mut RuleSlot> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    /// Add a rule with the highest priority
    pub fn push_front(&mut self, rule: CallRuleRc) -> RuleId {
        let id = self.insert(rule);
        self.order.push_front(id);
        id
    }

    /// Add a rule with the lowest priority
    pub fn push_back(&mut self, rule: CallRuleRc) -> RuleId {
        let id = self.insert(rule);
        self.order.push_back(id);
        id
    }

    /// Remove a rule, returns false if it was already removed
    pub fn remove(&mut self, id: RuleId) -> bool {
        let Some(slot) = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation && slot.entry.is_some())
        else {
            return false;
        };

        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;

        if self.order.len() > self.live * 2 + 8 {
            let slots = &self.slots;
            self.order.retain(|kept| {
                slots[kept.index].generation == kept.generation
                    && slots[kept.index].entry.is_some()
            });
        }
        true
    }

    /// All rules with remaining uses, in priority order
    pub fn active(&self) -> Vec<(RuleId, CallRuleRc)> {
        self.order
            .iter()
            .filter_map(|id| match self.get(*id) {
                Some(slot) if slot.remaining != Some(0) => Some((*id, slot.rule.clone())),
                _ => None,
            })
            .collect()
    }

    /// Use the rule once, returns false if it is removed or exhausted
    pub fn consume(&mut self, id: RuleId) -> bool {
        match self.get_mut(id) {
            Some(slot) => match slot.remaining {
                None => true,
                Some(0) => false,
                Some(remaining) => {
                    slot.remaining = Some(remaining - 1);
                    true
                }
            },
            None => false,
        }
    }

    /// True if the rule has not been removed
    pub fn contains(&self, id: RuleId) -> bool {
        self.get(id).is_some()
    }

    /// Remaining uses of the rule, `None` for unlimited or removed rules
    pub fn remaining_uses(&self, id: RuleId) -> Option<u32> {
        self.get(id).and_then(|slot| slot.remaining)
    }

    /// Number of rules, exhausted rules included
    pub fn len(&self) -> usize {
        self.live
    }

    /// Remove all rules
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            self.free.push(index);
        }
        self.order.clear();
        self.live = 0;
    }
}
