//! Event channel implementation using crossbeam-channel.
//!
//! Lets the pipeline report progress to whatever front end is listening.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::PathBuf;

use super::{Event, ExtractEvent, PipelineEvent, PipelinePhase};

/// Sends events from the sorting pipeline.
///
/// Cheap to clone; extraction workers share one through a reference.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event; dropped silently once nobody is listening.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }

    /// Announce the start of a pipeline phase
    pub fn phase(&self, phase: PipelinePhase) {
        self.send(Event::Pipeline(PipelineEvent::PhaseChanged { phase }));
    }

    /// Report an input left out of the sequence
    pub fn skipped(&self, path: PathBuf, message: String) {
        self.send(Event::Extract(ExtractEvent::Skipped { path, message }));
    }
}

/// Receives events until every sender is gone.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Iterate over events; ends when the last sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructor for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender whose events go nowhere, for runs without a front end.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn skipped_is_delivered_across_threads() {
        let (sender, receiver) = EventChannel::new();

        thread::spawn(move || {
            sender.skipped(PathBuf::from("/photos/broken.png"), "bad header".to_string());
        })
        .join()
        .unwrap();

        let events: Vec<Event> = receiver.iter().collect();
        match events.as_slice() {
            [Event::Extract(ExtractEvent::Skipped { path, message })] => {
                assert_eq!(path, &PathBuf::from("/photos/broken.png"));
                assert_eq!(message, "bad header");
            }
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[test]
    fn phase_wraps_phase_changed() {
        let (sender, receiver) = EventChannel::new();
        sender.phase(PipelinePhase::Measuring);
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        assert!(matches!(
            events.as_slice(),
            [Event::Pipeline(PipelineEvent::PhaseChanged {
                phase: PipelinePhase::Measuring
            })]
        ));
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.phase(PipelinePhase::Extracting);
        sender.send(Event::Pipeline(PipelineEvent::Started));
    }
}
