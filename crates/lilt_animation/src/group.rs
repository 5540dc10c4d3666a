//! Group animations
//!
//! A group owns no geometry. It forwards its own elapsed time to a list of
//! member animations stored in the same scheduler arena, so a single play,
//! reverse or stop drives all of them together. Members keep their own
//! delay, duration and easing; the group only tracks which of them have
//! already finished during the current run.

use crate::effect::{EffectKind, DEFAULT_BOUNCE, DEFAULT_MAX};
use crate::scheduler::AnimationId;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct GroupMember {
    pub(crate) id: AnimationId,
    pub(crate) finished: bool,
}

/// Member list plus the timer value seen on the previous step
#[derive(Clone, Debug, Default)]
pub struct GroupTween {
    members: Vec<GroupMember>,
    last_timer: f32,
}

impl GroupTween {
    pub fn new(members: impl IntoIterator<Item = AnimationId>) -> Self {
        Self {
            members: members
                .into_iter()
                .map(|id| GroupMember {
                    id,
                    finished: false,
                })
                .collect(),
            last_timer: 0.0,
        }
    }

    pub fn members(&self) -> impl Iterator<Item = AnimationId> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn finished_count(&self) -> usize {
        self.members.iter().filter(|m| m.finished).count()
    }

    /// Seconds elapsed since the last step, given the group's new progress.
    ///
    /// Negative progress (the group's own delay) counts as zero.
    pub(crate) fn take_delta(&mut self, progress: f32, duration: f32) -> f32 {
        let progress = progress.max(0.0);
        let delta = (progress - self.last_timer) * duration;
        self.last_timer = progress;
        delta
    }

    /// Members still running this pass, with their slot index
    pub(crate) fn pending(&self) -> SmallVec<[(usize, AnimationId); 8]> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, m)| !m.finished)
            .map(|(i, m)| (i, m.id))
            .collect()
    }

    pub(crate) fn mark_finished(&mut self, index: usize) {
        if let Some(member) = self.members.get_mut(index) {
            member.finished = true;
        }
    }

    /// Follow a duration change of the owning group
    pub(crate) fn rescale(&mut self, factor: f32) {
        self.last_timer *= factor;
    }

    /// Clear finished flags and the step tracker for a fresh run
    pub(crate) fn reset(&mut self) {
        for member in &mut self.members {
            member.finished = false;
        }
        self.last_timer = 0.0;
    }
}

/// Randomized effect settings applied to every member of a group.
///
/// Each member draws its own amplitude from `[min_max, max_max]`, bounce
/// count from `[min_bounce, max_bounce)` and orientation angle about Z from
/// `[min_angle, max_angle)`, so a crowd of identical tweens does not move in
/// lockstep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupEffect {
    pub kind: EffectKind,
    pub min_max: f32,
    pub max_max: f32,
    pub min_bounce: u32,
    pub max_bounce: u32,
    pub min_angle: f32,
    pub max_angle: f32,
}

impl GroupEffect {
    pub fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            min_max: 0.0,
            max_max: DEFAULT_MAX,
            min_bounce: 1,
            max_bounce: DEFAULT_BOUNCE,
            min_angle: 0.0,
            max_angle: 0.0,
        }
    }

    pub fn amplitude(mut self, min: f32, max: f32) -> Self {
        self.min_max = min;
        self.max_max = max;
        self
    }

    pub fn bounce(mut self, min: u32, max: u32) -> Self {
        self.min_bounce = min;
        self.max_bounce = max;
        self
    }

    pub fn angle(mut self, min: f32, max: f32) -> Self {
        self.min_angle = min;
        self.max_angle = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<AnimationId> {
        let mut arena: SlotMap<AnimationId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn test_delta_tracks_previous_step() {
        let mut group = GroupTween::new(ids(2));
        assert_eq!(group.take_delta(0.25, 2.0), 0.5);
        assert_eq!(group.take_delta(0.75, 2.0), 1.0);
        assert_eq!(group.take_delta(-0.5, 2.0), -1.5);
    }

    #[test]
    fn test_finished_members_drop_out_until_reset() {
        let mut group = GroupTween::new(ids(3));
        group.mark_finished(1);
        let pending: Vec<usize> = group.pending().iter().map(|(i, _)| *i).collect();
        assert_eq!(pending, vec![0, 2]);
        assert_eq!(group.finished_count(), 1);

        group.take_delta(0.5, 1.0);
        group.reset();
        assert_eq!(group.pending().len(), 3);
        assert_eq!(group.take_delta(0.25, 1.0), 0.25);
    }
}
