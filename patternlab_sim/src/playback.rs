//! Paced replay of a recorded sort trace.
//!
//! The sorting engine returns its whole trace at once; pacing is applied
//! here, one frame per delay, through [`LabContext::sleep`]. Against a
//! `SimContext` this advances the virtual clock instead of waiting.

use crate::exporter::TraceFrame;
use patternlab_core::SortStep;
use patternlab_env::LabContext;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;

/// Default delay between frames.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// How a playback ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Frames handed to the sink
    pub delivered: usize,

    /// Time spent pacing
    pub elapsed: Duration,

    /// False if the sink stopped playback early
    pub completed: bool,
}

/// Delivers frames to a sink at a fixed pace.
pub struct Playback<C: LabContext> {
    ctx: Arc<C>,
    delay: Duration,
}

impl<C: LabContext> Playback<C> {
    /// Creates a new playback with [`DEFAULT_FRAME_DELAY`].
    pub fn new(ctx: Arc<C>) -> Self {
        Self {
            ctx,
            delay: DEFAULT_FRAME_DELAY,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Plays `steps` in order. The first frame is delivered immediately,
    /// each later one after `delay`. The sink can stop playback by
    /// returning [`ControlFlow::Break`].
    pub async fn play<F>(&self, steps: &[SortStep], mut sink: F) -> PlaybackSummary
    where
        F: FnMut(TraceFrame) -> ControlFlow<()>,
    {
        let start = self.ctx.now();
        let mut delivered = 0;

        for (index, step) in steps.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                self.ctx.sleep(self.delay).await;
            }

            let frame = TraceFrame {
                index,
                time_ms: (self.ctx.now() - start).as_millis() as u64,
                step: step.clone(),
            };
            delivered += 1;

            if sink(frame).is_break() {
                tracing::debug!("Playback stopped at frame {}/{}", index + 1, steps.len());
                return PlaybackSummary {
                    delivered,
                    elapsed: self.ctx.now() - start,
                    completed: false,
                };
            }
        }

        PlaybackSummary {
            delivered,
            elapsed: self.ctx.now() - start,
            completed: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SimContext;
    use patternlab_core::{SortAlgorithm, SortContext};

    fn trace() -> Vec<SortStep> {
        SortContext::with_algorithm(SortAlgorithm::Bubble)
            .execute(&[3, 1, 2])
            .steps
    }

    #[tokio::test]
    async fn test_frames_are_paced_on_the_virtual_clock() {
        let ctx = SimContext::shared(1);
        let steps = trace();
        let mut times = Vec::new();

        let summary = Playback::new(ctx.clone())
            .play(&steps, |frame| {
                times.push(frame.time_ms);
                ControlFlow::Continue(())
            })
            .await;

        let expected: Vec<u64> = (0..steps.len() as u64).map(|i| i * 100).collect();
        assert_eq!(times, expected);
        assert!(summary.completed);
        assert_eq!(summary.delivered, steps.len());
        assert_eq!(
            ctx.now(),
            DEFAULT_FRAME_DELAY * (steps.len() as u32 - 1)
        );
    }

    #[tokio::test]
    async fn test_sink_can_pause_playback() {
        let ctx = SimContext::shared(1);
        let steps = trace();
        let mut seen = Vec::new();

        let summary = Playback::new(ctx)
            .with_delay(Duration::from_millis(50))
            .play(&steps, |frame| {
                seen.push(frame.index);
                if frame.index == 1 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .await;

        assert_eq!(seen, vec![0, 1]);
        assert!(!summary.completed);
        assert_eq!(summary.elapsed, Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_zero_delay_does_not_advance_time() {
        let ctx = SimContext::shared(1);
        let summary = Playback::new(ctx.clone())
            .with_delay(Duration::ZERO)
            .play(&trace(), |_| ControlFlow::Continue(()))
            .await;

        assert!(summary.completed);
        assert_eq!(ctx.now(), Duration::ZERO);
    }
}
