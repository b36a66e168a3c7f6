use std::f32::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

use crate::{Context, EventPort, Processor};

/// How a position in `[-1, 1]` maps to left and right gains.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanLaw {
    /// Constant power panning of a mono signal.
    Pan,
    /// Attenuation of the opposite side of a stereo signal.
    Balance,
}

/// Converts position events into left and right gain events.
pub struct Pan {
    law: PanLaw,
    inputs: [EventPort; 1],
    outputs: [EventPort; 2],
}

/// Polynomial approximation of sinusoidal constant power panning.
pub fn pan_gains(position: f32) -> (f32, f32) {
    const A1: f32 = PI / (4.0 * SQRT_2);
    const A2: f32 = PI * PI / (32.0 * SQRT_2);
    const A3: f32 = PI * PI * PI / (384.0 * SQRT_2);
    const A4: f32 = PI * PI * PI * PI / (6144.0 * SQRT_2);

    let x2 = position * position;
    let x3 = x2 * position;
    let x4 = x3 * position;
    let even = FRAC_1_SQRT_2 - A2 * x2 + A4 * x4;
    let odd = A1 * position - A3 * x3;
    (even - odd, even + odd)
}

/// Cubic stereo balance. The centered position leaves both sides untouched.
pub fn balance_gains(position: f32) -> (f32, f32) {
    if position < 0.0 {
        (1.0, (1.0 + position).powi(3))
    } else if position > 0.0 {
        ((1.0 - position).powi(3), 1.0)
    } else {
        (1.0, 1.0)
    }
}

impl Pan {
    pub fn new(law: PanLaw) -> Self {
        let name = match law {
            PanLaw::Pan => "pan",
            PanLaw::Balance => "balance",
        };
        Self {
            law,
            inputs: [EventPort::new::<f32>(name)],
            outputs: [
                EventPort::new::<f32>("gain L"),
                EventPort::new::<f32>("gain R"),
            ],
        }
    }

    pub fn law(&self) -> PanLaw {
        self.law
    }
}

impl Processor for Pan {
    fn type_name(&self) -> &str {
        match self.law {
            PanLaw::Pan => "pan",
            PanLaw::Balance => "balance",
        }
    }

    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn event_inputs(&self) -> &[EventPort] {
        &self.inputs
    }

    fn event_outputs(&self) -> &[EventPort] {
        &self.outputs
    }

    fn process(&mut self, mut context: Context<'_>) {
        let positions = context.event_inputs.get::<f32>(0);
        if positions.is_empty() {
            return;
        }
        let gains = match self.law {
            PanLaw::Pan => pan_gains,
            PanLaw::Balance => balance_gains,
        };
        let (left, right) = context.event_outputs.pair_mut::<f32, f32>(0, 1);
        for event in positions {
            let (l, r) = gains(*event.value());
            left.insert(event.offset(), l);
            right.insert(event.offset(), r);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Harness;
    use approx::assert_relative_eq;
    use buffer::Event;

    #[test]
    fn pan_is_close_to_exact_law() {
        for step in -10..=10 {
            let position = step as f32 / 10.0;
            let angle = position * PI / 4.0;
            let exact_left = FRAC_1_SQRT_2 * (angle.cos() - angle.sin());
            let exact_right = FRAC_1_SQRT_2 * (angle.cos() + angle.sin());
            let (left, right) = pan_gains(position);
            assert_relative_eq!(left, exact_left, epsilon = 5e-3);
            assert_relative_eq!(right, exact_right, epsilon = 5e-3);
        }
    }

    #[test]
    fn pan_preserves_power() {
        let (left, right) = pan_gains(0.0);
        assert_relative_eq!(left, right);
        assert_relative_eq!(left * left + right * right, 1.0, epsilon = 1e-5);
        let (left, right) = pan_gains(1.0);
        assert_relative_eq!(left, 0.0, epsilon = 5e-3);
        assert_relative_eq!(right, 1.0, epsilon = 5e-3);
    }

    #[test]
    fn balance() {
        assert_eq!(balance_gains(0.0), (1.0, 1.0));
        assert_eq!(balance_gains(-1.0), (1.0, 0.0));
        assert_eq!(balance_gains(0.5), (0.125, 1.0));
    }

    #[test]
    fn emits_gain_events_per_position() {
        let mut pan = Pan::new(PanLaw::Balance);
        let mut harness = Harness::new(&pan, 16);
        harness.event_input::<f32>(0).insert(3, 0.5);
        harness.event_input::<f32>(0).insert(9, -0.5);
        harness.run(&mut pan);
        assert_eq!(
            harness.events::<f32>(0),
            vec![Event::new(3, 0.125), Event::new(9, 1.0)]
        );
        assert_eq!(
            harness.events::<f32>(1),
            vec![Event::new(3, 1.0), Event::new(9, 0.125)]
        );

        harness.run(&mut pan);
        assert!(harness.events::<f32>(0).is_empty());
    }
}
