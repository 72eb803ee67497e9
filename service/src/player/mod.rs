//! Player Shell over an embeddable video player.
//!
//! The [`Shell`] owns at most one underlying player [`Instance`] at a time,
//! mirrors its playback state into its own [`State`] and exposes the custom
//! on-screen controls.

pub mod ad;
mod shell;

use std::{
    fmt,
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use smart_default::SmartDefault;

pub use self::{
    ad::{AdSdk, Loader},
    shell::{Shell, CONTROLS_HIDE_DELAY},
};

/// Media to be played by a [`Shell`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Source {
    /// URL of the video.
    pub url: String,

    /// [`Subtitle`] track, if any.
    pub subtitle: Option<Subtitle>,

    /// URL of the VAST ad tag, if any.
    pub ad_tag: Option<String>,
}

impl Source {
    /// Creates a new [`Source`] of the provided video `url` without subtitles
    /// and ads.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subtitle: None,
            ad_tag: None,
        }
    }
}

/// Subtitle track of a [`Source`].
#[derive(Clone, Debug, Eq, PartialEq, SmartDefault)]
pub struct Subtitle {
    /// URL of the track.
    pub url: String,

    /// Human-readable label of the track.
    #[default("Vietnamese".to_owned())]
    pub label: String,

    /// Language code of the track.
    #[default("vi".to_owned())]
    pub language: String,
}

impl Subtitle {
    /// Creates a new [`Subtitle`] track of the provided `url` with the default
    /// label and language.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Factory of player [`Instance`]s.
pub trait Backend {
    /// Player [`Instance`] created by this [`Backend`].
    type Instance: Instance;

    /// Error of creating a player [`Instance`].
    type Error: fmt::Display;

    /// Creates a new player [`Instance`] for the provided [`Source`].
    ///
    /// # Errors
    ///
    /// If the player fails to initialize.
    fn create(
        &self,
        source: &Source,
    ) -> impl Future<Output = Result<Self::Instance, Self::Error>>;
}

/// Underlying player instance.
///
/// Methods mirror the imperative API of an embeddable player, so take
/// `&self`.
pub trait Instance {
    /// Ad SDK this [`Instance`] can be attached to.
    type Ads;

    /// Reads the current playback [`Snapshot`].
    fn snapshot(&self) -> Snapshot;

    /// Starts playback.
    fn play(&self);

    /// Pauses playback.
    fn pause(&self);

    /// Moves the playhead to the provided time in seconds.
    fn seek(&self, to: f64);

    /// Sets volume in the `[0, 1]` range.
    fn set_volume(&self, volume: f64);

    /// Mutes or unmutes the sound.
    fn set_muted(&self, muted: bool);

    /// Enters or exits fullscreen.
    fn set_fullscreen(&self, fullscreen: bool);

    /// Adds the provided [`Subtitle`] track as the default one.
    fn add_subtitle(&self, subtitle: &Subtitle);

    /// Attaches the loaded ad SDK playing the provided VAST `tag`.
    fn attach_ads(&self, ads: &Self::Ads, tag: &str);

    /// Tears this [`Instance`] down.
    fn dispose(&self);

    /// Indicates whether this [`Instance`] has been torn down.
    fn is_disposed(&self) -> bool;
}

/// Playback state read from an [`Instance`].
#[derive(Clone, Copy, Debug, PartialEq, SmartDefault)]
pub struct Snapshot {
    /// Playhead position in seconds.
    pub current_time: f64,

    /// Length of the media in seconds, if known.
    pub duration: Option<f64>,

    /// Volume in the `[0, 1]` range.
    #[default(1.0)]
    pub volume: f64,

    /// Indicator whether the sound is muted.
    pub muted: bool,

    /// Indicator whether playback is paused.
    #[default(true)]
    pub paused: bool,

    /// Indicator whether the player is in fullscreen.
    pub fullscreen: bool,
}

/// Event emitted by an [`Instance`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    /// Media metadata has been loaded.
    LoadedMetadata,

    /// Media length has changed.
    DurationChange,

    /// Playhead has moved.
    TimeUpdate,

    /// Playback has started.
    Play,

    /// Playback has been paused.
    Pause,

    /// Playback has reached the end.
    Ended,

    /// Volume or mute has changed.
    VolumeChange,

    /// Fullscreen has been entered or exited.
    FullscreenChange,
}

/// UI state of a [`Shell`].
#[derive(Clone, Copy, Debug, PartialEq, SmartDefault)]
pub struct State {
    /// Indicator whether a player [`Instance`] is mounted.
    pub ready: bool,

    /// Indicator whether playback is running.
    pub playing: bool,

    /// Playhead position in seconds.
    pub current_time: f64,

    /// Length of the media in seconds, if known.
    pub duration: Option<f64>,

    /// Volume in the `[0, 1]` range.
    #[default(1.0)]
    pub volume: f64,

    /// Indicator whether the sound is muted.
    pub muted: bool,

    /// Indicator whether the player is in fullscreen.
    pub fullscreen: bool,

    /// Indicator whether the on-screen controls are shown.
    #[default(true)]
    pub controls_visible: bool,
}

impl State {
    /// Reflects the provided [`Snapshot`] into this [`State`].
    fn sync(&mut self, snapshot: Snapshot) {
        let Snapshot {
            current_time,
            duration,
            volume,
            muted,
            paused,
            fullscreen,
        } = snapshot;
        self.current_time = current_time;
        self.duration = duration;
        self.volume = volume;
        self.muted = muted;
        self.playing = !paused;
        self.fullscreen = fullscreen;
    }

    /// Returns playback progress in percents.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        progress_percent(self.current_time, self.duration)
    }
}

/// Authoritative disposed flag of a single mount.
///
/// Every step following an `.await` checks it before touching the mounted
/// [`Instance`].
#[derive(Clone, Debug, Default)]
pub struct Lifetime(Arc<AtomicBool>);

impl Lifetime {
    /// Marks this [`Lifetime`] as ended.
    pub fn dispose(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Indicates whether this [`Lifetime`] has ended.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Indicates whether both [`Lifetime`]s belong to the same mount.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Formats the provided seconds as `MM:SS`.
///
/// Non-finite and negative inputs are formatted as `00:00`.
#[must_use]
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_owned();
    }
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "finite and non-negative"
    )]
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Returns the progress of `current` seconds over the `duration` in percents,
/// capped at `100`.
///
/// Unknown or zero `duration` gives `0`.
#[must_use]
pub fn progress_percent(current: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(d) if d.is_finite() && d > 0.0 => (current / d * 100.0).min(100.0),
        _ => 0.0,
    }
}
