/// 8-bit countdown register, decremented at 60 Hz by whoever drives the VM.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub count: u8,
}

impl Timer {
    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    /// Counts down by one, stopping at zero.
    pub fn tick(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_down_to_zero_and_stays() {
        let mut timer = Timer::default();
        timer.set(1);
        assert!(timer.is_active());
        timer.tick();
        assert_eq!(timer.count, 0);
        timer.tick();
        assert_eq!(timer.count, 0);
        assert!(!timer.is_active());
    }
}
