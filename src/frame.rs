pub mod resize;

pub use self::resize::{RebuildHost, ResizeCoordinator, ResizeState, SizeEvent, SizeKind};

/// Circular index over the swap-chain back buffers. Exactly one buffer is
/// the active render target at any time; the index advances by one (mod
/// `count`) per completed present and snaps back to 0 on resize.
#[derive(Debug)]
pub struct BackBufferRing {
    index: u32,
    count: u32,
}

impl BackBufferRing {
    pub fn new(count: u32) -> Self {
        assert!(count > 0, "swap chain needs at least one back buffer");
        BackBufferRing { index: 0, count }
    }

    pub fn current(&self) -> u32 {
        self.index
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn advance(&mut self) -> u32 {
        self.index = (self.index + 1) % self.count;
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_cycles_through_both_buffers() {
        let mut ring = BackBufferRing::new(2);
        assert_eq!(ring.current(), 0);
        let observed: Vec<u32> = (0..6).map(|_| ring.advance()).collect();
        assert_eq!(observed, vec![1, 0, 1, 0, 1, 0]);
    }

    #[test]
    fn index_stays_in_bounds_for_any_present_count() {
        let mut ring = BackBufferRing::new(2);
        for _ in 0..1000 {
            assert!(ring.current() < ring.count());
            ring.advance();
        }
    }

    #[test]
    fn reset_snaps_back_to_first_buffer() {
        let mut ring = BackBufferRing::new(2);
        ring.advance();
        assert_eq!(ring.current(), 1);
        ring.reset();
        assert_eq!(ring.current(), 0);
    }
}
