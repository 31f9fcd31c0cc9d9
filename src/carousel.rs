//! Autoplay and navigation for the full-screen story viewer.
//!
//! The session knows nothing about widgets or timers. Every transition returns
//! a [`Step`] and the driver reacts to it: re-render on `Switched`, stop the
//! autoplay timer on `Paused`/`Closed`, start a fresh one on `Resumed` or when
//! a switch happens while playing.

use std::cmp::Ordering;
use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::story::Story;

/// Progress value of a fully elapsed story.
pub const FULL: f64 = 100.0;

/// Minimum horizontal fling speed (px/s) that counts as a swipe.
pub const SWIPE_MIN_VELOCITY: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    /// Terminal. The viewer should be torn down.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moves left, revealing the next story.
    Left,
    /// Finger moves right, revealing the previous story.
    Right,
}

impl SwipeDirection {
    /// Classify a fling. Mostly-vertical or slow flings are not swipes.
    pub fn from_velocity(velocity_x: f64, velocity_y: f64) -> Option<Self> {
        if velocity_x.abs() < SWIPE_MIN_VELOCITY || velocity_x.abs() <= velocity_y.abs() {
            return None;
        }
        if velocity_x < 0.0 {
            Some(SwipeDirection::Left)
        } else {
            Some(SwipeDirection::Right)
        }
    }
}

/// User intent coming from buttons, keys and gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselInput {
    Next,
    Previous,
    TogglePause,
    /// Pointer or touch went down on the media.
    Press,
    /// Pointer or touch went up (or the press was cancelled).
    Release,
    Swipe(SwipeDirection),
    Close,
}

/// What a transition changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Unchanged,
    /// Only the active progress value moved.
    Progressed,
    /// The active index changed and progress is back at zero.
    Switched,
    Paused,
    Resumed,
    Closed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CarouselError {
    #[error("there are no stories to show")]
    Empty,
    #[error("start index {index} is out of range for {len} stories")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug)]
pub struct CarouselSession {
    stories: Rc<[Story]>,
    index: usize,
    /// Playback time spent on the active story. Frozen while paused.
    elapsed: Duration,
    state: PlaybackState,
    /// Set while playback is paused because of a press rather than the toggle.
    held: bool,
}

impl CarouselSession {
    /// Open the viewer on `start`, playing.
    pub fn open(stories: Rc<[Story]>, start: usize) -> Result<Self, CarouselError> {
        if stories.is_empty() {
            return Err(CarouselError::Empty);
        }
        if start >= stories.len() {
            return Err(CarouselError::OutOfRange {
                index: start,
                len: stories.len(),
            });
        }
        Ok(Self {
            stories,
            index: start,
            elapsed: Duration::ZERO,
            state: PlaybackState::Playing,
            held: false,
        })
    }

    pub fn stories(&self) -> &[Story] {
        &self.stories
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &Story {
        &self.stories[self.index]
    }

    /// Progress ratio of the active story, 0 to [`FULL`].
    pub fn progress(&self) -> f64 {
        let duration = self.current().duration;
        if duration.is_zero() {
            return 0.0;
        }
        (self.elapsed.as_secs_f64() / duration.as_secs_f64() * FULL).min(FULL)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    pub fn is_closed(&self) -> bool {
        self.state == PlaybackState::Closed
    }

    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.stories.len()
    }

    /// Time left on the active story at the current progress.
    pub fn remaining(&self) -> Duration {
        self.current().duration.saturating_sub(self.elapsed)
    }

    /// Fill of the progress bar at `index`: full before the active story,
    /// live progress on it, empty after it.
    pub fn bar_fill(&self, index: usize) -> f64 {
        match index.cmp(&self.index) {
            Ordering::Less => FULL,
            Ordering::Equal => self.progress(),
            Ordering::Greater => 0.0,
        }
    }

    pub fn bar_fills(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.stories.len()).map(|index| self.bar_fill(index))
    }

    /// Account for `elapsed` wall time of playback. Advances once the
    /// active story's duration is used up.
    pub fn tick(&mut self, elapsed: Duration) -> Step {
        if self.state != PlaybackState::Playing {
            return Step::Unchanged;
        }
        let duration = self.current().duration;
        self.elapsed = (self.elapsed + elapsed).min(duration);
        if self.elapsed >= duration {
            self.next()
        } else {
            Step::Progressed
        }
    }

    /// Advance, closing the viewer when already on the last story.
    pub fn next(&mut self) -> Step {
        if self.is_closed() {
            return Step::Unchanged;
        }
        if self.has_next() {
            self.switch_to(self.index + 1)
        } else {
            self.close()
        }
    }

    pub fn previous(&mut self) -> Step {
        if self.is_closed() || !self.has_previous() {
            return Step::Unchanged;
        }
        self.switch_to(self.index - 1)
    }

    pub fn pause(&mut self) -> Step {
        if self.state != PlaybackState::Playing {
            return Step::Unchanged;
        }
        self.state = PlaybackState::Paused;
        Step::Paused
    }

    /// Continue from the frozen progress value.
    pub fn resume(&mut self) -> Step {
        if self.state != PlaybackState::Paused {
            return Step::Unchanged;
        }
        self.state = PlaybackState::Playing;
        self.held = false;
        Step::Resumed
    }

    pub fn toggle_pause(&mut self) -> Step {
        match self.state {
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
            PlaybackState::Closed => Step::Unchanged,
        }
    }

    /// Hold to pause. Only a press that actually paused playback is undone
    /// by the matching release.
    pub fn press(&mut self) -> Step {
        let step = self.pause();
        if step == Step::Paused {
            self.held = true;
        }
        step
    }

    pub fn release(&mut self) -> Step {
        if !self.held {
            return Step::Unchanged;
        }
        self.resume()
    }

    /// Swipes never close the viewer; a swipe towards a missing story is ignored.
    pub fn swipe(&mut self, direction: SwipeDirection) -> Step {
        match direction {
            SwipeDirection::Left if self.has_next() => self.next(),
            SwipeDirection::Right => self.previous(),
            SwipeDirection::Left => Step::Unchanged,
        }
    }

    pub fn close(&mut self) -> Step {
        if self.is_closed() {
            return Step::Unchanged;
        }
        self.state = PlaybackState::Closed;
        self.held = false;
        Step::Closed
    }

    pub fn handle(&mut self, input: CarouselInput) -> Step {
        match input {
            CarouselInput::Next => self.next(),
            CarouselInput::Previous => self.previous(),
            CarouselInput::TogglePause => self.toggle_pause(),
            CarouselInput::Press => self.press(),
            CarouselInput::Release => self.release(),
            CarouselInput::Swipe(direction) => self.swipe(direction),
            CarouselInput::Close => self.close(),
        }
    }

    fn switch_to(&mut self, index: usize) -> Step {
        debug_assert!(index < self.stories.len());
        self.index = index;
        self.elapsed = Duration::ZERO;
        Step::Switched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::{Author, MediaKind};
    use chrono::Local;

    const TICK: Duration = Duration::from_millis(100);

    fn stories(count: usize) -> Rc<[Story]> {
        (0..count)
            .map(|i| Story {
                id: i.to_string(),
                url: format!("file:///stories/{i}.jpg"),
                kind: MediaKind::Image,
                duration: Duration::from_millis(5000),
                author: Author {
                    name: format!("user{i}"),
                    avatar: String::new(),
                },
                timestamp: Local::now(),
            })
            .collect::<Vec<_>>()
            .into()
    }

    fn session(count: usize, start: usize) -> CarouselSession {
        CarouselSession::open(stories(count), start).unwrap()
    }

    #[test]
    fn open_rejects_empty_and_out_of_range() {
        assert_eq!(
            CarouselSession::open(stories(0), 0).unwrap_err(),
            CarouselError::Empty
        );
        assert_eq!(
            CarouselSession::open(stories(2), 2).unwrap_err(),
            CarouselError::OutOfRange { index: 2, len: 2 }
        );
    }

    #[test]
    fn four_nexts_from_start_close_the_viewer() {
        let mut s = session(4, 0);
        assert_eq!(s.next(), Step::Switched);
        assert_eq!(s.next(), Step::Switched);
        assert_eq!(s.next(), Step::Switched);
        assert_eq!(s.index(), 3);
        assert!(!s.is_closed());
        assert_eq!(s.next(), Step::Closed);
        assert_eq!(s.state(), PlaybackState::Closed);
        assert_eq!(s.index(), 3);
    }

    #[test]
    fn previous_on_first_story_is_a_no_op() {
        let mut s = session(3, 0);
        s.tick(TICK * 10);
        let before = s.progress();
        assert_eq!(s.previous(), Step::Unchanged);
        assert_eq!(s.index(), 0);
        assert_eq!(s.progress(), before);
    }

    #[test]
    fn index_changes_reset_progress() {
        let mut s = session(3, 1);
        s.tick(TICK * 20);
        assert!(s.progress() > 0.0);
        assert_eq!(s.previous(), Step::Switched);
        assert_eq!(s.progress(), 0.0);
        s.tick(TICK * 5);
        assert_eq!(s.next(), Step::Switched);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn autoplay_advances_after_duration_and_closes_at_end() {
        let mut s = session(2, 0);
        for _ in 0..49 {
            assert_eq!(s.tick(TICK), Step::Progressed);
            assert!(s.progress() <= FULL);
        }
        assert_eq!(s.tick(TICK), Step::Switched);
        assert_eq!(s.index(), 1);
        assert_eq!(s.progress(), 0.0);
        assert_eq!(s.tick(Duration::from_secs(60)), Step::Closed);
    }

    #[test]
    fn progress_is_capped_at_full() {
        let mut s = session(1, 0);
        s.tick(Duration::from_millis(4900));
        assert!(s.progress() < FULL);
        assert_eq!(s.tick(Duration::from_secs(30)), Step::Closed);
        assert!(s.progress() <= FULL);
    }

    #[test]
    fn pause_freezes_and_resume_continues_from_ratio() {
        let mut s = session(2, 0);
        s.tick(Duration::from_millis(2000));
        assert_eq!(s.pause(), Step::Paused);
        let frozen = s.progress();
        assert!((frozen - 40.0).abs() < 1e-9);
        assert_eq!(s.remaining(), Duration::from_millis(3000));

        assert_eq!(s.tick(Duration::from_secs(10)), Step::Unchanged);
        assert_eq!(s.progress(), frozen);

        assert_eq!(s.resume(), Step::Resumed);
        assert_eq!(s.progress(), frozen);
        assert_eq!(s.tick(Duration::from_millis(2900)), Step::Progressed);
        assert_eq!(s.index(), 0);
        assert_eq!(s.tick(TICK), Step::Switched);
    }

    #[test]
    fn progress_is_monotonic_across_pauses() {
        let mut s = session(1, 0);
        let mut last = s.progress();
        for round in 0..30 {
            if round % 7 == 3 {
                s.toggle_pause();
            }
            s.tick(TICK);
            assert!(s.progress() >= last);
            last = s.progress();
        }
        // 30 ticks minus the ones spent paused can never exceed 3s worth.
        assert!(s.progress() <= 3000.0 / 5000.0 * FULL + 1e-9);
    }

    #[test]
    fn toggle_flips_between_playing_and_paused() {
        let mut s = session(1, 0);
        assert_eq!(s.handle(CarouselInput::TogglePause), Step::Paused);
        assert!(s.is_paused());
        assert_eq!(s.handle(CarouselInput::TogglePause), Step::Resumed);
        assert_eq!(s.state(), PlaybackState::Playing);
    }

    #[test]
    fn press_pauses_and_release_resumes() {
        let mut s = session(2, 0);
        assert_eq!(s.handle(CarouselInput::Press), Step::Paused);
        assert_eq!(s.tick(TICK), Step::Unchanged);
        assert_eq!(s.handle(CarouselInput::Release), Step::Resumed);
        assert_eq!(s.tick(TICK), Step::Progressed);
    }

    #[test]
    fn release_does_not_undo_a_toggled_pause() {
        let mut s = session(2, 0);
        s.toggle_pause();
        assert_eq!(s.press(), Step::Unchanged);
        assert_eq!(s.release(), Step::Unchanged);
        assert!(s.is_paused());
    }

    #[test]
    fn navigation_keeps_pause_state() {
        let mut s = session(3, 0);
        s.pause();
        assert_eq!(s.next(), Step::Switched);
        assert!(s.is_paused());
        assert_eq!(s.tick(TICK), Step::Unchanged);
        assert_eq!(s.progress(), 0.0);
    }

    #[test]
    fn close_is_terminal_from_any_state() {
        let mut s = session(3, 1);
        s.pause();
        assert_eq!(s.handle(CarouselInput::Close), Step::Closed);
        for input in [
            CarouselInput::Next,
            CarouselInput::Previous,
            CarouselInput::TogglePause,
            CarouselInput::Press,
            CarouselInput::Release,
            CarouselInput::Swipe(SwipeDirection::Right),
            CarouselInput::Close,
        ] {
            assert_eq!(s.handle(input), Step::Unchanged);
        }
        assert_eq!(s.tick(TICK), Step::Unchanged);
        assert_eq!(s.index(), 1);
    }

    #[test]
    fn swipes_navigate_without_closing() {
        let mut s = session(2, 0);
        assert_eq!(s.swipe(SwipeDirection::Left), Step::Switched);
        assert_eq!(s.swipe(SwipeDirection::Left), Step::Unchanged);
        assert!(!s.is_closed());
        assert_eq!(s.swipe(SwipeDirection::Right), Step::Switched);
        assert_eq!(s.swipe(SwipeDirection::Right), Step::Unchanged);
        assert_eq!(s.index(), 0);
    }

    #[test]
    fn swipe_classification() {
        assert_eq!(
            SwipeDirection::from_velocity(-900.0, 10.0),
            Some(SwipeDirection::Left)
        );
        assert_eq!(
            SwipeDirection::from_velocity(900.0, -10.0),
            Some(SwipeDirection::Right)
        );
        assert_eq!(SwipeDirection::from_velocity(100.0, 0.0), None);
        assert_eq!(SwipeDirection::from_velocity(700.0, 1200.0), None);
    }

    #[test]
    fn bar_fills_are_derived_from_index() {
        let mut s = session(4, 2);
        s.tick(Duration::from_millis(2500));
        let fills: Vec<_> = s.bar_fills().collect();
        assert_eq!(fills[0], FULL);
        assert_eq!(fills[1], FULL);
        assert!((fills[2] - 50.0).abs() < 1e-9);
        assert_eq!(fills[3], 0.0);
    }

    #[test]
    fn index_stays_in_bounds_under_any_input_sequence() {
        let inputs = [
            CarouselInput::Next,
            CarouselInput::Previous,
            CarouselInput::Previous,
            CarouselInput::Swipe(SwipeDirection::Left),
            CarouselInput::Swipe(SwipeDirection::Right),
            CarouselInput::TogglePause,
            CarouselInput::Press,
            CarouselInput::Release,
        ];
        for start in 0..5 {
            let mut s = session(5, start);
            for (i, input) in inputs.iter().cycle().take(200).enumerate() {
                s.handle(*input);
                if i % 3 == 0 {
                    s.tick(TICK * 7);
                }
                assert!(s.index() < s.stories().len());
                assert!((0.0..=FULL).contains(&s.progress()));
                if s.is_closed() {
                    break;
                }
            }
        }
    }
}
