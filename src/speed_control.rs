#[derive(Debug, Clone)]
pub struct SpeedRampInit {
    /// Speed multiplier on the first tick of a move.
    pub start_fraction: f64,
    pub ramp_ticks: usize,
}

impl SpeedRampInit {
    pub fn build(&self) -> SpeedRamp {
        let Self {
            start_fraction,
            ramp_ticks,
        } = *self;

        SpeedRamp {
            start_fraction: start_fraction.clamp(0.0, 1.0),
            activator: DelayedActivator::new(ramp_ticks),
        }
    }
}

#[derive(Debug)]
pub struct SpeedRamp {
    start_fraction: f64,
    activator: DelayedActivator,
}

impl SpeedRamp {
    pub fn step(&mut self) -> f64 {
        let Self {
            start_fraction,
            ref mut activator,
        } = *self;

        let multiplier = start_fraction + (1.0 - start_fraction) * activator.progress();
        activator.inc();
        multiplier
    }

    pub fn reset(&mut self) {
        self.activator.reset();
    }
}

#[derive(Debug)]
struct DelayedActivator {
    max: usize,
    cur: usize,
}

impl DelayedActivator {
    pub fn new(max: usize) -> Self {
        Self { max, cur: 0 }
    }

    pub fn inc(&mut self) -> bool {
        let Self { max, cur } = *self;
        let next = if max == cur { max } else { cur + 1 };
        self.cur = next;
        next == max
    }

    pub fn reset(&mut self) {
        self.cur = 0;
    }

    pub fn progress(&self) -> f64 {
        if self.max == 0 {
            1.0
        } else {
            self.cur as f64 / self.max as f64
        }
    }
}
