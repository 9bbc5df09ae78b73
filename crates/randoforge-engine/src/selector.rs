//! Per-group item proposal: a stack machine with accept/reject/recall.

use randoforge_core::{RandoCoreError, Result};

use crate::error::OutOfLocationsError;
use crate::group::{PlacementState, RandomizationGroup};

/// Priority-ordered item proposer for one group.
///
/// Items move between an `unused` stack (lowest priority on top), a
/// `proposed` stack, a `rejected` stack and the `accepted`/`discarded`
/// lists. The cap bounds how many items may be live (proposed or accepted)
/// beyond what emitted spheres' locations can absorb; it never goes
/// negative. Placement-state transitions `None -> Temporary -> Permanent`
/// are this type's responsibility.
#[derive(Debug)]
pub struct GroupItemSelector {
    group_index: usize,
    unused: Vec<usize>,
    proposed: Vec<usize>,
    rejected: Vec<usize>,
    accepted: Vec<usize>,
    discarded: Vec<usize>,
    cap: i32,
    finished: bool,
}

impl GroupItemSelector {
    /// Builds a selector over the group's items, loading the stack so the
    /// lowest-priority item is proposed first.
    pub fn new(group_index: usize, group: &RandomizationGroup) -> Self {
        let mut unused: Vec<usize> = (0..group.items.len()).collect();
        // Coupled items whose dual location a previous pass consumed
        // permanently belong to a sphere of the dual group; they drop out
        // before proposal.
        let mut discarded = Vec::new();
        if group.coupled {
            unused.retain(|&index| {
                if group.locations[index].reachable == PlacementState::Permanent {
                    discarded.push(index);
                    false
                } else {
                    true
                }
            });
        }
        // Descending priority: the top of the stack is the lowest.
        unused.sort_by(|&a, &b| {
            group.items[b]
                .priority
                .total_cmp(&group.items[a].priority)
                .then(b.cmp(&a))
        });
        GroupItemSelector {
            group_index,
            unused,
            proposed: Vec::new(),
            rejected: Vec::new(),
            accepted: Vec::new(),
            discarded,
            cap: 0,
            finished: false,
        }
    }

    pub fn group_index(&self) -> usize {
        self.group_index
    }

    pub fn cap(&self) -> i32 {
        self.cap
    }

    /// Adjusts the cap; a negative adjustment may not take it below zero.
    pub fn increment_cap(&mut self, amount: i32) -> std::result::Result<(), OutOfLocationsError> {
        let next = self.cap + amount;
        if next < 0 {
            return Err(OutOfLocationsError(format!(
                "selector cap for group {} went negative",
                self.group_index
            )));
        }
        self.cap = next;
        Ok(())
    }

    /// Whether the group has nothing left to propose or collect.
    pub fn is_finished(&self) -> bool {
        self.finished
            || (self.unused.is_empty()
                && self.proposed.is_empty()
                && self.rejected.is_empty()
                && self.accepted.is_empty())
    }

    /// Priority of the next proposable item. `None` when the stack is
    /// exhausted or the cap is spent.
    pub fn try_get_next_proposal_priority(&mut self, group: &mut RandomizationGroup) -> Option<f32> {
        if self.finished || self.cap <= 0 {
            return None;
        }
        self.unused
            .last()
            .map(|&index| group.items[index].priority)
    }

    /// Pops the next item into the proposed stack, marking it `Temporary`.
    /// Returns the item index, or `None` when nothing can be proposed.
    pub fn try_propose_next(&mut self, group: &mut RandomizationGroup) -> Option<usize> {
        if self.finished || self.cap <= 0 {
            return None;
        }
        let index = self.unused.pop()?;
        if group.items[index].placed == PlacementState::None {
            group.items[index].placed = PlacementState::Temporary;
        }
        self.proposed.push(index);
        self.cap -= 1;
        Some(index)
    }

    /// Peeks the most recent proposal.
    pub fn try_recall_last(&self) -> Option<usize> {
        self.proposed.last().copied()
    }

    /// Promotes the most recent proposal to accepted.
    pub fn accept_last(&mut self) -> Result<usize> {
        let index = self.proposed.pop().ok_or_else(|| {
            RandoCoreError::InvalidOperation("accept_last with an empty proposal stack".into())
        })?;
        self.accepted.push(index);
        Ok(index)
    }

    /// Demotes the most recent proposal to rejected, releasing its cap.
    pub fn reject_last(&mut self) -> Result<usize> {
        let index = self.proposed.pop().ok_or_else(|| {
            RandoCoreError::InvalidOperation("reject_last with an empty proposal stack".into())
        })?;
        self.rejected.push(index);
        self.cap += 1;
        Ok(index)
    }

    /// Resets a whole sphere: current proposals and previously accepted
    /// items all demote to rejected and their placement marks clear.
    pub fn reject_current_and_unaccept_all(&mut self, group: &mut RandomizationGroup) {
        let recalled = self.proposed.drain(..).chain(self.accepted.drain(..));
        for index in recalled {
            group.items[index].placed = PlacementState::None;
            self.rejected.push(index);
            self.cap += 1;
        }
    }

    /// Accepts everything currently proposed, oldest first.
    pub fn accept_all_proposed(&mut self) {
        self.accepted.extend(self.proposed.drain(..));
    }

    /// Drains the accepted list for sphere emission.
    pub fn take_accepted(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.accepted)
    }

    /// Closes a sphere: rejected items recycle back to proposable, keeping
    /// the priority order of the stack.
    pub fn finish_accepting(&mut self, group: &RandomizationGroup) {
        if self.rejected.is_empty() {
            return;
        }
        self.unused.append(&mut self.rejected);
        self.unused.sort_by(|&a, &b| {
            group.items[b]
                .priority
                .total_cmp(&group.items[a].priority)
                .then(b.cmp(&a))
        });
    }

    /// End-of-group sweep: consumes the cap for every remaining unproposed
    /// item and returns everything still live for the terminal sphere.
    /// Accepted items must have been collected first; leaving them behind is
    /// a domain error.
    pub fn finish(&mut self, group: &mut RandomizationGroup) -> crate::error::Result<Vec<usize>> {
        if !self.accepted.is_empty() {
            return Err(RandoCoreError::InvalidOperation(format!(
                "finish with {} uncollected accepted items",
                self.accepted.len()
            ))
            .into());
        }
        // Proposed items already hold cap; the rest consume it now.
        let uncapped = (self.rejected.len() + self.unused.len()) as i32;
        self.increment_cap(-uncapped)?;
        let mut remaining: Vec<usize> = self.proposed.drain(..).collect();
        remaining.append(&mut self.rejected);
        while let Some(index) = self.unused.pop() {
            remaining.push(index);
        }
        for &index in &remaining {
            if group.items[index].placed == PlacementState::None {
                group.items[index].placed = PlacementState::Temporary;
            }
        }
        self.finished = true;
        Ok(remaining)
    }

    /// Drains the coupled-discard list.
    pub fn collect_discarded(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.discarded)
    }

}
