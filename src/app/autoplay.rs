use std::time::{Duration, Instant};

use gtk4::glib;

use super::state::UiEvent;
use crate::carousel::{CarouselSession, PlaybackState};

/// Decides which ticks still count. Every timer start opens a new
/// generation; a tick is accepted only while open and only for the
/// current generation.
#[derive(Debug, Default)]
pub struct TickGate {
    generation: u64,
    open: bool,
}

impl TickGate {
    fn open(&mut self) -> u64 {
        self.generation += 1;
        self.open = true;
        self.generation
    }

    fn close(&mut self) {
        self.open = false;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn accepts(&self, generation: u64) -> bool {
        self.open && generation == self.generation
    }
}

/// Whether the viewer should be ticking for this session.
pub fn wants_ticks(carousel: &CarouselSession) -> bool {
    carousel.state() == PlaybackState::Playing
}

/// Repeating tick that drives carousel progress.
///
/// Owned by the viewer session and restarted explicitly whenever the active
/// story or the pause state changes. A tick still sitting in the channel from
/// a previous run is recognised by its generation and dropped.
pub struct AutoplayTimer {
    source: Option<glib::SourceId>,
    gate: TickGate,
}

impl AutoplayTimer {
    pub fn new() -> Self {
        Self {
            source: None,
            gate: TickGate::default(),
        }
    }

    pub fn accepts(&self, generation: u64) -> bool {
        self.gate.accepts(generation)
    }

    /// (Re)start ticking. Each tick reports the wall time since the previous
    /// one, measured from this call for the first tick.
    pub fn start(&mut self, interval: Duration, sender: async_channel::Sender<UiEvent>) {
        self.stop();
        let generation = self.gate.open();

        let mut last = Instant::now();
        let source = glib::timeout_add_local(interval, move || {
            let now = Instant::now();
            let elapsed = now.duration_since(last);
            last = now;
            let _ = sender.try_send(UiEvent::AutoplayTick {
                generation,
                elapsed,
            });
            glib::ControlFlow::Continue
        });
        self.source = Some(source);
        log::debug!("autoplay timer #{generation} started ({interval:?})");
    }

    pub fn stop(&mut self) {
        self.gate.close();
        if let Some(source) = self.source.take() {
            source.remove();
            log::debug!("autoplay timer #{} stopped", self.gate.generation());
        }
    }

    /// Run while the session plays, stay stopped otherwise.
    pub fn follow(
        &mut self,
        carousel: &CarouselSession,
        interval: Duration,
        sender: async_channel::Sender<UiEvent>,
    ) {
        if wants_ticks(carousel) {
            self.start(interval, sender);
        } else {
            self.stop();
        }
    }
}

impl Drop for AutoplayTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
