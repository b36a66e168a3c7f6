use std::borrow::Cow;

use crate::{builtin::event_converter::lockstep, Context, EventPort, Processor};

/// Turns the mute state of a channel and the index of the soloed channel into a gain event.
///
/// Without a solo the gain is 0 when muted and 1 otherwise. While a channel is soloed every
/// other channel is silenced and the soloed one plays, muted or not.
pub struct MuteSolo {
    name: Cow<'static, str>,
    solo_index: usize,
    inputs: [EventPort; 2],
    outputs: [EventPort; 1],
    last: (bool, Option<usize>),
}

impl MuteSolo {
    pub fn new(name: impl Into<Cow<'static, str>>, solo_index: usize) -> Self {
        Self {
            name: name.into(),
            solo_index,
            inputs: [
                EventPort::new::<bool>("mute"),
                EventPort::new::<Option<usize>>("solo_index"),
            ],
            outputs: [EventPort::new::<f32>("mute_amp")],
            last: (false, None),
        }
    }
}

impl Processor for MuteSolo {
    fn type_name(&self) -> &str {
        "mute_solo"
    }

    fn name(&self) -> &str {
        &self.name
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
        let mute = context.event_inputs.get::<bool>(0);
        let solo = context.event_inputs.get::<Option<usize>>(1);
        let out = context.event_outputs.get_mut::<f32>(0);
        let own = self.solo_index;
        lockstep(mute, solo, &mut self.last, |offset, mute, solo| {
            let audible = match solo {
                Some(index) => index == own,
                None => !mute,
            };
            out.insert(offset, if audible { 1.0 } else { 0.0 });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::MuteSolo;
    use crate::harness::Harness;
    use buffer::Event;

    fn gains(mute: bool, solo: Option<usize>) -> Vec<Event<f32>> {
        let mut processor = MuteSolo::new("bus", 1);
        let mut harness = Harness::new(&processor, 16);
        harness.event_input::<bool>(0).insert(0, mute);
        harness.event_input::<Option<usize>>(1).insert(0, solo);
        harness.run(&mut processor);
        harness.events::<f32>(0)
    }

    #[test]
    fn no_events() {
        let mut processor = MuteSolo::new("bus", 0);
        let mut harness = Harness::new(&processor, 16);
        harness.run(&mut processor);
        assert!(harness.events::<f32>(0).is_empty());
    }

    #[test]
    fn gain_per_state() {
        assert_eq!(gains(false, None), vec![Event::new(0, 1.0)]);
        assert_eq!(gains(true, None), vec![Event::new(0, 0.0)]);
        assert_eq!(gains(false, Some(0)), vec![Event::new(0, 0.0)]);
        assert_eq!(gains(true, Some(0)), vec![Event::new(0, 0.0)]);
        assert_eq!(gains(false, Some(1)), vec![Event::new(0, 1.0)]);
        assert_eq!(gains(true, Some(1)), vec![Event::new(0, 1.0)]);
    }

    #[test]
    fn follows_events_within_a_block() {
        let mut processor = MuteSolo::new("bus", 0);
        let mut harness = Harness::new(&processor, 16);
        harness.event_input::<bool>(0).insert(0, false);
        harness.event_input::<Option<usize>>(1).insert(1, Some(3));
        harness.event_input::<Option<usize>>(1).insert(5, None);
        harness.run(&mut processor);
        assert_eq!(
            harness.events::<f32>(0),
            vec![Event::new(0, 1.0), Event::new(1, 0.0), Event::new(5, 1.0)]
        );

        harness.event_input::<bool>(0).insert(2, true);
        harness.run(&mut processor);
        assert_eq!(harness.events::<f32>(0), vec![Event::new(2, 0.0)]);
    }
}
