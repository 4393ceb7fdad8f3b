//! Sequence and parallel composites
//!
//! A composite is an operation whose payload drives child operations. The
//! children are adopted at construction (paused, auto-release off) so only
//! the parent advances them, and they are released together with the parent.

use smallvec::SmallVec;

use cadence_core::{
    ActionResult, ActionState, Operation, Result, Scheduler, TweenAction, TweenError,
    TweenStatus,
};

/// Child operations of a composite
pub type Children = SmallVec<[Operation; 4]>;

// ============================================================================
// Shared child handling
// ============================================================================

/// Restart children left completed by a previous run of the parent
pub(crate) fn restart_completed(ctx: &Scheduler, children: &mut [Operation]) -> ActionResult {
    for child in children.iter_mut() {
        *child = child.restart_if_completed(ctx)?;
    }
    Ok(())
}

/// Settle unfinished children the way the parent ended
pub(crate) fn settle_children(ctx: &Scheduler, state: &ActionState, children: &[Operation]) {
    for child in children {
        if child.is_completed(ctx) {
            continue;
        }
        match state.status {
            TweenStatus::Cancelled => child.cancel(ctx),
            TweenStatus::Succeeded => child.ran_to_end(ctx),
            status => tracing::warn!(?status, "unexpected composite status"),
        }
    }
}

pub(crate) fn release_children(ctx: &Scheduler, children: &[Operation]) {
    for child in children {
        child.release(ctx);
    }
}

// ============================================================================
// Sequence
// ============================================================================

/// Run operations one after another
///
/// The duration is the sum of the children's durations, saturating at
/// `f32::MAX` when a child is unbounded.
///
/// ```ignore
/// let intro = sequence(&scheduler, [fade_in, delay(&scheduler, 0.5)?, slide])?;
/// ```
pub fn sequence(ctx: &Scheduler, ops: impl IntoIterator<Item = Operation>) -> Result<Operation> {
    let children: Children = ops.into_iter().collect();
    let durations: SmallVec<[f32; 4]> = children.iter().map(|op| op.duration(ctx)).collect();
    let duration = durations.iter().sum::<f32>().min(f32::MAX);
    if duration < 0.0 {
        return Err(TweenError::invalid_argument(
            "sequence duration out of bounds",
        ));
    }
    for child in &children {
        child.adopt(ctx);
    }
    ctx.prepare(
        SequenceAction {
            children,
            durations,
        },
        duration,
    )
}

/// Payload of [`sequence`]
pub struct SequenceAction {
    children: Children,
    durations: SmallVec<[f32; 4]>,
}

impl SequenceAction {
    pub fn children(&self) -> &[Operation] {
        &self.children
    }
}

impl TweenAction for SequenceAction {
    fn start(&mut self, ctx: &Scheduler) -> ActionResult {
        restart_completed(ctx, &mut self.children)
    }

    fn update(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        let elapsed = state.elapsed;
        if elapsed < 0.0 {
            return Ok(());
        }
        let mut end = 0.0;
        for (child, duration) in self.children.iter().zip(&self.durations) {
            let start = end;
            end += duration;
            if elapsed < end {
                child.set_time(ctx, elapsed - start)?;
                break;
            }
            if !child.is_completed(ctx) {
                child.ran_to_end(ctx);
            }
        }
        Ok(())
    }

    fn complete(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        settle_children(ctx, state, &self.children);
        Ok(())
    }

    fn pre_release(&mut self, ctx: &Scheduler) -> ActionResult {
        release_children(ctx, &self.children);
        Ok(())
    }
}

// ============================================================================
// Parallel
// ============================================================================

/// Run operations side by side
///
/// The duration is the longest child's duration.
pub fn parallel(ctx: &Scheduler, ops: impl IntoIterator<Item = Operation>) -> Result<Operation> {
    let children: Children = ops.into_iter().collect();
    let duration = children
        .iter()
        .map(|op| op.duration(ctx))
        .fold(0.0, f32::max);
    for child in &children {
        child.adopt(ctx);
    }
    ctx.prepare(ParallelAction { children }, duration)
}

/// Payload of [`parallel`]
pub struct ParallelAction {
    children: Children,
}

impl ParallelAction {
    pub fn children(&self) -> &[Operation] {
        &self.children
    }
}

impl TweenAction for ParallelAction {
    fn start(&mut self, ctx: &Scheduler) -> ActionResult {
        restart_completed(ctx, &mut self.children)
    }

    fn update(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        let elapsed = state.elapsed;
        if elapsed < 0.0 {
            return Ok(());
        }
        for child in &self.children {
            if !child.is_completed(ctx) {
                child.set_time(ctx, elapsed)?;
            }
        }
        Ok(())
    }

    fn complete(&mut self, ctx: &Scheduler, state: &ActionState) -> ActionResult {
        settle_children(ctx, state, &self.children);
        Ok(())
    }

    fn pre_release(&mut self, ctx: &Scheduler) -> ActionResult {
        release_children(ctx, &self.children);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utility::delay;

    fn children_of<A: TweenAction>(
        scheduler: &Scheduler,
        op: Operation,
        f: fn(&A) -> &[Operation],
    ) -> Vec<Operation> {
        scheduler.inspect(op, |a: &A| f(a).to_vec()).unwrap()
    }

    #[test]
    fn test_sequence_duration_is_sum() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let b = delay(&scheduler, 2.0).unwrap();
        let seq = sequence(&scheduler, [a, b]).unwrap();
        assert_eq!(seq.duration(&scheduler), 3.0);
        assert!(a.paused(&scheduler));
        assert!(!a.auto_release(&scheduler));
    }

    #[test]
    fn test_sequence_of_unbounded_children_saturates() {
        let scheduler = Scheduler::new();
        let a = crate::repeat::repeat_forever(&scheduler, delay(&scheduler, 1.0).unwrap()).unwrap();
        let b = crate::repeat::repeat_forever(&scheduler, delay(&scheduler, 1.0).unwrap()).unwrap();
        let seq = sequence(&scheduler, [a, b]).unwrap();
        assert_eq!(seq.duration(&scheduler), f32::MAX);
    }

    #[test]
    fn test_sequence_midway() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let b = delay(&scheduler, 2.0).unwrap();
        let seq = sequence(&scheduler, [a, b]).unwrap();

        scheduler.tick(1.5, 1.0);
        assert!(a.is_completed(&scheduler));
        assert_eq!(a.time(&scheduler), 1.0);
        assert_eq!(b.time(&scheduler), 0.5);
        assert!(b.is_running(&scheduler));
        assert!(seq.is_running(&scheduler));
    }

    #[test]
    fn test_sequence_completion_releases_children() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let b = delay(&scheduler, 1.0).unwrap();
        let seq = sequence(&scheduler, [a, b]).unwrap();

        scheduler.tick(5.0, 1.0);
        assert!(seq.is_expired(&scheduler));
        assert!(a.is_expired(&scheduler));
        assert!(b.is_expired(&scheduler));
        assert_eq!(scheduler.stats().active, 0);
    }

    #[test]
    fn test_parallel_duration_is_max() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let b = delay(&scheduler, 3.0).unwrap();
        let par = parallel(&scheduler, [a, b]).unwrap();
        assert_eq!(par.duration(&scheduler), 3.0);

        scheduler.tick(1.0, 1.0);
        assert!(a.is_completed(&scheduler));
        assert_eq!(b.time(&scheduler), 1.0);
    }

    #[test]
    fn test_cancel_propagates_to_children() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let b = delay(&scheduler, 1.0).unwrap();
        let a_done = a.completion(&scheduler);
        let b_done = b.completion(&scheduler);
        let par = parallel(&scheduler, [a, b]).unwrap();

        scheduler.tick(0.5, 1.0);
        par.cancel(&scheduler);
        assert_eq!(a_done.outcome(), Some(cadence_core::TweenOutcome::Cancelled));
        assert_eq!(b_done.outcome(), Some(cadence_core::TweenOutcome::Cancelled));
    }

    #[test]
    fn test_ran_to_end_finishes_children() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let b = delay(&scheduler, 2.0).unwrap();
        let b_done = b.completion(&scheduler);
        let seq = sequence(&scheduler, [a, b]).unwrap();

        seq.ran_to_end(&scheduler);
        assert_eq!(b_done.outcome(), Some(cadence_core::TweenOutcome::Succeeded));
    }

    #[test]
    fn test_restarted_parent_restarts_children() {
        let scheduler = Scheduler::new();
        let a = delay(&scheduler, 1.0).unwrap();
        let seq = sequence(&scheduler, [a]).unwrap();
        seq.set_auto_release(&scheduler, false);

        scheduler.tick(1.0, 1.0);
        assert!(seq.is_completed(&scheduler));

        let seq = seq.restart(&scheduler).unwrap();
        scheduler.tick(0.25, 1.0);
        let children = children_of(&scheduler, seq, SequenceAction::children);
        assert!(a.is_expired(&scheduler));
        assert_eq!(children[0].time(&scheduler), 0.25);
        assert!(children[0].is_running(&scheduler));
    }
}
