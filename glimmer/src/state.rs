use glam::UVec2;
use glimmer_gpu::JITTER_PERIOD;

/// Logical id of a persistent radiance history buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HistorySlot {
    Primary,
    SecondPass,
}

impl HistorySlot {
    pub fn all() -> [Self; 2] {
        [Self::Primary, Self::SecondPass]
    }
}

/// Outcome of [`PipelineState::prepare()`] for this frame's history buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryEvent {
    /// History buffers match the working resolution and carry over.
    Kept,

    /// First frame, resolution change or an explicit reset; history buffers
    /// must be recreated and this frame treated as history-less.
    Reallocated,
}

/// Cross-frame state of the pipeline, kept explicit so that resize and reset
/// are observable transitions instead of lazy-allocation side effects.
#[derive(Clone, Debug, Default)]
pub struct PipelineState {
    frame: u32,
    working: Option<(UVec2, f32)>,
    points_ready: bool,
}

impl PipelineState {
    /// Reconciles the allocated history buffers with this frame's working
    /// resolution; must be called once per rendered frame, before planning.
    pub fn prepare(&mut self, working_size: UVec2, scale: f32) -> HistoryEvent {
        assert!(working_size.x > 0);
        assert!(working_size.y > 0);

        if self.working == Some((working_size, scale)) {
            HistoryEvent::Kept
        } else {
            log::debug!(
                "Reallocating history; working-size={working_size:?}, \
                 scale={scale}",
            );

            self.working = Some((working_size, scale));

            HistoryEvent::Reallocated
        }
    }

    /// Rotates history-buffer parity and bumps the frame index; call after
    /// the frame's work has been recorded.
    pub fn advance(&mut self) {
        self.frame += 1;
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Selects which half of each double-buffered pair is written this frame.
    pub fn is_alternate(&self) -> bool {
        self.frame % 2 == 1
    }

    pub fn jitter_phase(&self) -> u32 {
        self.frame % JITTER_PERIOD
    }

    /// Forces the next `prepare()` to report [`HistoryEvent::Reallocated`],
    /// discarding accumulated history.
    pub fn reset_history(&mut self) {
        self.working = None;
    }

    pub fn points_ready(&self) -> bool {
        self.points_ready
    }

    pub fn mark_points_ready(&mut self) {
        self.points_ready = true;
    }
}

/// Working resolution at the given scale; never collapses to zero.
pub fn working_size(screen_size: UVec2, scale: f32) -> UVec2 {
    UVec2::new(
        ((screen_size.x as f32 * scale) as u32).max(1),
        ((screen_size.y as f32 * scale) as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_reallocates_then_keeps() {
        let mut state = PipelineState::default();
        let size = UVec2::new(128, 64);

        assert_eq!(state.prepare(size, 1.0), HistoryEvent::Reallocated);
        assert_eq!(state.prepare(size, 1.0), HistoryEvent::Kept);
    }

    #[test]
    fn scale_change_reallocates() {
        let mut state = PipelineState::default();
        let screen = UVec2::new(128, 64);

        state.prepare(working_size(screen, 1.0), 1.0);

        assert_eq!(
            state.prepare(working_size(screen, 0.5), 0.5),
            HistoryEvent::Reallocated,
        );
    }

    #[test]
    fn reset_discards_history() {
        let mut state = PipelineState::default();
        let size = UVec2::new(128, 64);

        state.prepare(size, 1.0);
        state.reset_history();

        assert_eq!(state.prepare(size, 1.0), HistoryEvent::Reallocated);
    }

    #[test]
    fn jitter_phase_cycles_with_period_four() {
        let mut state = PipelineState::default();
        let mut phases = Vec::new();

        for _ in 0..8 {
            phases.push(state.jitter_phase());
            state.advance();
        }

        assert_eq!(phases, [0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn parity_alternates_every_frame() {
        let mut state = PipelineState::default();

        assert!(!state.is_alternate());
        state.advance();
        assert!(state.is_alternate());
        state.advance();
        assert!(!state.is_alternate());
    }

    #[test]
    fn point_distribution_initializes_once() {
        let mut state = PipelineState::default();

        assert!(!state.points_ready());
        state.mark_points_ready();
        assert!(state.points_ready());
    }

    #[test]
    fn working_size_never_collapses() {
        assert_eq!(working_size(UVec2::ONE, 0.5), UVec2::ONE);
        assert_eq!(working_size(UVec2::new(640, 480), 0.5), UVec2::new(320, 240));
    }
}
