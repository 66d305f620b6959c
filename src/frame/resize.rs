use crate::error::Result;

use log::debug;

/// Window-size state, driven exclusively by notifications from the window
/// system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeState {
    Normal,
    Minimized,
    Maximized,
    InteractiveResize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    Restored,
    Minimized,
    Maximized,
}

/// Size-change notification delivered by the window collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeEvent {
    Resized {
        width: u32,
        height: u32,
        kind: SizeKind,
    },
    /// The user grabbed a resize border.
    ResizeBegin,
    /// The user released the resize border.
    ResizeEnd,
}

/// The surface the coordinator rebuilds. `Renderer` implements this over
/// the real swap chain and depth buffer; tests use a recording fake.
///
/// The rebuild sequence the coordinator drives is fixed: drain, open the
/// command list, resize the swap chain, rebuild the depth buffer (records
/// its barrier into the open list), submit, drain again, then recompute
/// viewport and scissor.
pub trait RebuildHost {
    /// Blocks until all previously submitted GPU work has completed.
    fn drain(&mut self) -> Result<()>;
    /// Begins recording on the command list for the depth-buffer barrier.
    fn open_command_list(&mut self) -> Result<()>;
    /// Releases every back-buffer reference, resizes the chain and
    /// regenerates the render-target views. Resets the buffer index to 0.
    fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()>;
    /// Recreates the depth/stencil resource at the given size. Requires an
    /// open command list.
    fn rebuild_depth_stencil(&mut self, width: u32, height: u32) -> Result<()>;
    /// Closes the command list and submits it to the queue.
    fn submit_rebuild_commands(&mut self) -> Result<()>;
    /// Recomputes viewport and scissor rectangle to the new client size.
    fn set_client_rect(&mut self, width: u32, height: u32);
}

/// Decides when a size change actually rebuilds the swap chain and depth
/// buffer. Interactive drags are coalesced into a single rebuild on
/// release; minimize defers the rebuild until restore.
#[derive(Debug)]
pub struct ResizeCoordinator {
    state: ResizeState,
    width: u32,
    height: u32,
}

impl ResizeCoordinator {
    pub fn new(width: u32, height: u32) -> Self {
        ResizeCoordinator {
            state: ResizeState::Normal,
            width,
            height,
        }
    }

    pub fn state(&self) -> ResizeState {
        self.state
    }

    /// Last known client size. While minimized this is the size the window
    /// had before it was minimized, which is what the restore rebuild uses.
    pub fn client_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Rendering is paused while the window is minimized; the buffers stay
    /// valid, so nothing is rebuilt until restore.
    pub fn is_paused(&self) -> bool {
        self.state == ResizeState::Minimized
    }

    pub fn handle_event<H: RebuildHost>(&mut self, event: SizeEvent, host: &mut H) -> Result<()> {
        match event {
            SizeEvent::Resized {
                width,
                height,
                kind,
            } => self.on_resized(width, height, kind, host),
            SizeEvent::ResizeBegin => {
                self.state = ResizeState::InteractiveResize;
                Ok(())
            }
            SizeEvent::ResizeEnd => {
                self.state = ResizeState::Normal;
                self.rebuild(host)
            }
        }
    }

    fn on_resized<H: RebuildHost>(
        &mut self,
        width: u32,
        height: u32,
        kind: SizeKind,
        host: &mut H,
    ) -> Result<()> {
        if kind != SizeKind::Minimized {
            self.width = width;
            self.height = height;
        }

        match kind {
            SizeKind::Minimized => {
                self.state = ResizeState::Minimized;
                Ok(())
            }
            SizeKind::Maximized => {
                self.state = ResizeState::Maximized;
                self.rebuild(host)
            }
            SizeKind::Restored => match self.state {
                ResizeState::Minimized | ResizeState::Maximized => {
                    self.state = ResizeState::Normal;
                    self.rebuild(host)
                }
                // Intermediate notifications during a drag are suppressed;
                // one rebuild fires on ResizeEnd with the final size.
                ResizeState::InteractiveResize => Ok(()),
                ResizeState::Normal => self.rebuild(host),
            },
        }
    }

    fn rebuild<H: RebuildHost>(&mut self, host: &mut H) -> Result<()> {
        debug!(
            "Rebuilding swap chain and depth buffer at {}x{}.",
            self.width, self.height
        );
        host.drain()?;
        host.open_command_list()?;
        host.resize_swap_chain(self.width, self.height)?;
        host.rebuild_depth_stencil(self.width, self.height)?;
        host.submit_rebuild_commands()?;
        host.drain()?;
        host.set_client_rect(self.width, self.height);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        Drain,
        Open,
        ResizeChain(u32, u32),
        RebuildDepth(u32, u32),
        Submit,
        ClientRect(u32, u32),
    }

    /// Records the rebuild sequence and mimics the fence counters: a drain
    /// signals the next value and waits until the GPU reports it complete.
    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<Call>,
        signaled: u64,
        completed: u64,
    }

    impl RecordingHost {
        fn rebuild_count(&self) -> usize {
            self.calls
                .iter()
                .filter(|c| matches!(c, Call::ResizeChain(..)))
                .count()
        }
    }

    impl RebuildHost for RecordingHost {
        fn drain(&mut self) -> Result<()> {
            self.signaled += 1;
            self.completed = self.signaled;
            self.calls.push(Call::Drain);
            Ok(())
        }

        fn open_command_list(&mut self) -> Result<()> {
            self.calls.push(Call::Open);
            Ok(())
        }

        fn resize_swap_chain(&mut self, width: u32, height: u32) -> Result<()> {
            self.calls.push(Call::ResizeChain(width, height));
            Ok(())
        }

        fn rebuild_depth_stencil(&mut self, width: u32, height: u32) -> Result<()> {
            self.calls.push(Call::RebuildDepth(width, height));
            Ok(())
        }

        fn submit_rebuild_commands(&mut self) -> Result<()> {
            self.calls.push(Call::Submit);
            Ok(())
        }

        fn set_client_rect(&mut self, width: u32, height: u32) {
            self.calls.push(Call::ClientRect(width, height));
        }
    }

    fn resized(width: u32, height: u32, kind: SizeKind) -> SizeEvent {
        SizeEvent::Resized {
            width,
            height,
            kind,
        }
    }

    #[test]
    fn rebuild_sequence_is_exact() {
        let mut coordinator = ResizeCoordinator::new(1400, 800);
        let mut host = RecordingHost::default();

        coordinator
            .handle_event(resized(1024, 768, SizeKind::Restored), &mut host)
            .unwrap();

        assert_eq!(
            host.calls,
            vec![
                Call::Drain,
                Call::Open,
                Call::ResizeChain(1024, 768),
                Call::RebuildDepth(1024, 768),
                Call::Submit,
                Call::Drain,
                Call::ClientRect(1024, 768),
            ]
        );
    }

    #[test]
    fn drain_signals_strictly_increase_and_complete() {
        let mut coordinator = ResizeCoordinator::new(1400, 800);
        let mut host = RecordingHost::default();

        for _ in 0..4 {
            coordinator
                .handle_event(resized(1400, 800, SizeKind::Restored), &mut host)
                .unwrap();
            assert_eq!(host.completed, host.signaled);
        }
        // Two drains bracket every rebuild.
        assert_eq!(host.signaled, 8);
    }

    #[test]
    fn minimize_does_not_rebuild() {
        let mut coordinator = ResizeCoordinator::new(1400, 800);
        let mut host = RecordingHost::default();

        coordinator
            .handle_event(resized(0, 0, SizeKind::Minimized), &mut host)
            .unwrap();

        assert_eq!(coordinator.state(), ResizeState::Minimized);
        assert!(coordinator.is_paused());
        assert!(host.calls.is_empty());
    }

    #[test]
    fn minimize_then_restore_rebuilds_once_at_prior_size() {
        let mut coordinator = ResizeCoordinator::new(1400, 800);
        let mut host = RecordingHost::default();

        coordinator
            .handle_event(resized(0, 0, SizeKind::Minimized), &mut host)
            .unwrap();
        coordinator
            .handle_event(resized(1400, 800, SizeKind::Restored), &mut host)
            .unwrap();

        assert_eq!(coordinator.state(), ResizeState::Normal);
        assert_eq!(host.rebuild_count(), 1);
        assert_eq!(coordinator.client_size(), (1400, 800));
        // One drain pair for the single rebuild; the minimize path itself
        // never touches the fence.
        assert_eq!(host.signaled, 2);
    }

    #[test]
    fn restore_from_maximized_rebuilds_immediately() {
        let mut coordinator = ResizeCoordinator::new(1400, 800);
        let mut host = RecordingHost::default();

        coordinator
            .handle_event(resized(1920, 1080, SizeKind::Maximized), &mut host)
            .unwrap();
        assert_eq!(coordinator.state(), ResizeState::Maximized);
        assert_eq!(host.rebuild_count(), 1);

        coordinator
            .handle_event(resized(1400, 800, SizeKind::Restored), &mut host)
            .unwrap();
        assert_eq!(coordinator.state(), ResizeState::Normal);
        assert_eq!(host.rebuild_count(), 2);
    }

    #[test]
    fn interactive_drag_coalesces_into_one_rebuild() {
        let mut coordinator = ResizeCoordinator::new(1400, 800);
        let mut host = RecordingHost::default();

        coordinator
            .handle_event(SizeEvent::ResizeBegin, &mut host)
            .unwrap();
        assert_eq!(coordinator.state(), ResizeState::InteractiveResize);

        for width in (1400..1920).step_by(40) {
            coordinator
                .handle_event(resized(width, 900, SizeKind::Restored), &mut host)
                .unwrap();
        }
        assert_eq!(host.rebuild_count(), 0);

        coordinator
            .handle_event(resized(1920, 1080, SizeKind::Restored), &mut host)
            .unwrap();
        coordinator
            .handle_event(SizeEvent::ResizeEnd, &mut host)
            .unwrap();

        assert_eq!(coordinator.state(), ResizeState::Normal);
        assert_eq!(host.rebuild_count(), 1);
        assert!(host.calls.contains(&Call::ResizeChain(1920, 1080)));
        assert!(host.calls.contains(&Call::ClientRect(1920, 1080)));
    }

    #[test]
    fn programmatic_resize_while_normal_rebuilds_immediately() {
        let mut coordinator = ResizeCoordinator::new(1400, 800);
        let mut host = RecordingHost::default();

        coordinator
            .handle_event(resized(800, 600, SizeKind::Restored), &mut host)
            .unwrap();

        assert_eq!(host.rebuild_count(), 1);
        assert!(host.calls.contains(&Call::ResizeChain(800, 600)));
    }
}
