//! [`Shell`] definition.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use derive_more::Debug;
use tokio::time::Instant;

use super::{
    ad::{AdSdk, Loader},
    Backend, Event, Instance, Lifetime, Source, State,
};

/// Delay after which the on-screen controls hide while playing.
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Custom controls and state mirror over a [`Backend`] player.
#[derive(Debug)]
pub struct Shell<B: Backend, L: Loader>
where
    B::Instance: Instance<Ads = L::Sdk>,
{
    /// [`Backend`] creating player [`Instance`]s.
    backend: B,

    /// [`AdSdk`] shared across the page.
    ads: Arc<AdSdk<L>>,

    /// Mutable part of this [`Shell`].
    #[debug(skip)]
    inner: Mutex<Inner<B::Instance>>,
}

/// Mutable part of a [`Shell`].
struct Inner<I> {
    /// Currently mounted [`Source`], if any.
    mounted: Option<Mounted<I>>,

    /// UI [`State`].
    state: State,

    /// Moment the on-screen controls hide at, if scheduled.
    hide_at: Option<Instant>,
}

/// [`Source`] mounted into a [`Shell`].
struct Mounted<I> {
    /// Mounted [`Source`].
    source: Source,

    /// [`Lifetime`] of this mount.
    lifetime: Lifetime,

    /// Player [`Instance`], once created.
    instance: Option<I>,
}

impl<I: Instance> Inner<I> {
    /// Returns the live player [`Instance`], if any.
    fn instance(&self) -> Option<&I> {
        self.mounted
            .as_ref()
            .filter(|m| !m.lifetime.is_disposed())
            .and_then(|m| m.instance.as_ref())
            .filter(|i| !i.is_disposed())
    }

    /// Tears down the current mount, if any.
    fn teardown(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            mounted.lifetime.dispose();
            if let Some(instance) = mounted.instance {
                if !instance.is_disposed() {
                    instance.dispose();
                }
            }
        }
        self.state = State::default();
        self.hide_at = None;
    }

    /// Re-reads the [`State`] from the live player [`Instance`].
    fn sync(&mut self) {
        if let Some(snapshot) = self.instance().map(Instance::snapshot) {
            self.state.sync(snapshot);
        }
    }

    /// Schedules hiding of the on-screen controls, if playing.
    fn schedule_hide(&mut self) {
        self.hide_at = self
            .state
            .playing
            .then(|| Instant::now() + CONTROLS_HIDE_DELAY);
    }

    /// Shows the on-screen controls until playback resumes.
    fn pin_controls(&mut self) {
        self.hide_at = None;
        self.state.controls_visible = true;
    }
}

impl<B: Backend, L: Loader> Shell<B, L>
where
    B::Instance: Instance<Ads = L::Sdk>,
{
    /// Creates a new empty [`Shell`].
    #[must_use]
    pub fn new(backend: B, ads: Arc<AdSdk<L>>) -> Self {
        Self {
            backend,
            ads,
            inner: Mutex::new(Inner {
                mounted: None,
                state: State::default(),
                hide_at: None,
            }),
        }
    }

    /// Locks the [`Inner`] part of this [`Shell`].
    fn lock(&self) -> MutexGuard<'_, Inner<B::Instance>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current UI [`State`] of this [`Shell`].
    #[must_use]
    pub fn state(&self) -> State {
        let inner = self.lock();
        let hidden = inner.hide_at.is_some_and(|at| Instant::now() >= at);
        State {
            controls_visible: !inner.state.playing
                || (inner.state.controls_visible && !hidden),
            ..inner.state
        }
    }

    /// Mounts a player [`Instance`] for the provided [`Source`], replacing the
    /// previous one.
    ///
    /// Mounting the already mounted [`Source`] is no-op. Ads are attached only
    /// when the [`Source`] has an ad tag and the [`AdSdk`] loads fine.
    ///
    /// # Errors
    ///
    /// If the [`Backend`] fails to create a player [`Instance`]. The failed
    /// [`Source`] is unmounted then, so mounting it again retries.
    pub async fn mount(&self, source: Source) -> Result<(), B::Error> {
        let lifetime = {
            let mut inner = self.lock();
            let same = inner.mounted.as_ref().is_some_and(|m| {
                m.source == source && !m.lifetime.is_disposed()
            });
            if same {
                return Ok(());
            }
            inner.teardown();
            let lifetime = Lifetime::default();
            inner.mounted = Some(Mounted {
                source: source.clone(),
                lifetime: lifetime.clone(),
                instance: None,
            });
            lifetime
        };

        let instance = match self.backend.create(&source).await {
            Ok(instance) => instance,
            Err(e) => {
                let mut inner = self.lock();
                let current = inner
                    .mounted
                    .as_ref()
                    .is_some_and(|m| m.lifetime.is_same(&lifetime));
                if current {
                    inner.teardown();
                }
                return Err(e);
            }
        };
        if lifetime.is_disposed() {
            instance.dispose();
            return Ok(());
        }
        if let Some(subtitle) = &source.subtitle {
            instance.add_subtitle(subtitle);
        }
        {
            let mut inner = self.lock();
            if let Some(mounted) = inner.mounted.as_mut() {
                mounted.instance = Some(instance);
            }
            inner.sync();
            inner.state.ready = true;
            inner.pin_controls();
        }

        let Some(tag) = &source.ad_tag else {
            return Ok(());
        };
        let Some(sdk) = self.ads.get().await else {
            return Ok(());
        };
        if lifetime.is_disposed() {
            return Ok(());
        }
        if let Some(instance) = self.lock().instance() {
            instance.attach_ads(sdk, tag);
        }
        Ok(())
    }

    /// Tears down the mounted player [`Instance`], if any.
    pub fn unmount(&self) {
        self.lock().teardown();
    }

    /// Reflects the provided [`Event`] of the player [`Instance`].
    pub fn handle(&self, event: Event) {
        let mut inner = self.lock();
        inner.sync();
        match event {
            Event::Play => inner.schedule_hide(),
            Event::Pause | Event::Ended => inner.pin_controls(),
            Event::LoadedMetadata
            | Event::DurationChange
            | Event::TimeUpdate
            | Event::VolumeChange
            | Event::FullscreenChange => {}
        }
    }

    /// Shows the on-screen controls on pointer activity, hiding them again
    /// after [`CONTROLS_HIDE_DELAY`] while playing.
    pub fn reveal_controls(&self) {
        let mut inner = self.lock();
        inner.state.controls_visible = true;
        inner.schedule_hide();
    }

    /// Starts playback if paused, or pauses it otherwise.
    pub fn toggle_play(&self) {
        if let Some(instance) = self.lock().instance() {
            if instance.snapshot().paused {
                instance.play();
            } else {
                instance.pause();
            }
        }
    }

    /// Moves the playhead by the provided `seconds`, clamped to the media
    /// bounds.
    ///
    /// With unknown duration the playhead is bounded only from below.
    pub fn seek_by(&self, seconds: f64) {
        if let Some(instance) = self.lock().instance() {
            let snapshot = instance.snapshot();
            let upper = snapshot
                .duration
                .filter(|d| d.is_finite() && *d > 0.0)
                .unwrap_or(f64::INFINITY);
            instance.seek((snapshot.current_time + seconds).clamp(0.0, upper));
        }
    }

    /// Moves the playhead to the provided time in seconds.
    pub fn scrub(&self, to: f64) {
        if let Some(instance) = self.lock().instance() {
            instance.seek(to);
        }
    }

    /// Sets volume, unmuting the sound when it's above zero.
    pub fn set_volume(&self, volume: f64) {
        if let Some(instance) = self.lock().instance() {
            instance.set_volume(volume);
            if volume > 0.0 && instance.snapshot().muted {
                instance.set_muted(false);
            }
        }
    }

    /// Mutes the sound if unmuted, or unmutes it otherwise.
    pub fn toggle_mute(&self) {
        if let Some(instance) = self.lock().instance() {
            instance.set_muted(!instance.snapshot().muted);
        }
    }

    /// Enters fullscreen, or exits it if already there.
    pub fn toggle_fullscreen(&self) {
        if let Some(instance) = self.lock().instance() {
            instance.set_fullscreen(!instance.snapshot().fullscreen);
        }
    }
}

impl<B: Backend, L: Loader> Drop for Shell<B, L>
where
    B::Instance: Instance<Ads = L::Sdk>,
{
    fn drop(&mut self) {
        self.lock().teardown();
    }
}

#[cfg(test)]
mod spec {
    use std::{
        cell::{Cell, RefCell},
        rc::Rc,
        sync::Arc,
        time::Duration,
    };

    use tokio::sync::Notify;

    use crate::player::{
        ad::{AdSdk, Loader},
        Backend, Event, Instance, Snapshot, Source, Subtitle,
    };

    use super::Shell;

    /// Recorded calls of a [`Player`].
    #[derive(Debug, Default)]
    struct Log {
        snapshot: Snapshot,
        disposed: bool,
        subtitles: Vec<Subtitle>,
        ads: Vec<String>,
    }

    /// Mock player instance.
    #[derive(Clone, Debug, Default)]
    struct Player(Rc<RefCell<Log>>);

    impl Instance for Player {
        type Ads = &'static str;

        fn snapshot(&self) -> Snapshot {
            self.0.borrow().snapshot
        }

        fn play(&self) {
            self.0.borrow_mut().snapshot.paused = false;
        }

        fn pause(&self) {
            self.0.borrow_mut().snapshot.paused = true;
        }

        fn seek(&self, to: f64) {
            self.0.borrow_mut().snapshot.current_time = to;
        }

        fn set_volume(&self, volume: f64) {
            self.0.borrow_mut().snapshot.volume = volume;
        }

        fn set_muted(&self, muted: bool) {
            self.0.borrow_mut().snapshot.muted = muted;
        }

        fn set_fullscreen(&self, fullscreen: bool) {
            self.0.borrow_mut().snapshot.fullscreen = fullscreen;
        }

        fn add_subtitle(&self, subtitle: &Subtitle) {
            self.0.borrow_mut().subtitles.push(subtitle.clone());
        }

        fn attach_ads(&self, ads: &&'static str, tag: &str) {
            self.0.borrow_mut().ads.push(format!("{ads}:{tag}"));
        }

        fn dispose(&self) {
            self.0.borrow_mut().disposed = true;
        }

        fn is_disposed(&self) -> bool {
            self.0.borrow().disposed
        }
    }

    /// Mock backend handing out [`Player`]s, optionally waiting for a signal
    /// before each creation.
    #[derive(Default)]
    struct Factory {
        created: RefCell<Vec<Player>>,
        gate: Option<Rc<Notify>>,
        failures: Cell<usize>,
    }

    impl Backend for Factory {
        type Instance = Player;
        type Error = &'static str;

        async fn create(&self, source: &Source) -> Result<Player, &'static str> {
            if source.url.is_empty() {
                return Err("no source");
            }
            if self.failures.get() > 0 {
                self.failures.set(self.failures.get() - 1);
                return Err("unavailable");
            }
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let player = Player::default();
            player.0.borrow_mut().snapshot.duration = Some(100.0);
            self.created.borrow_mut().push(player.clone());
            Ok(player)
        }
    }

    /// Mock ad SDK loader.
    #[derive(Default)]
    struct Ima {
        loads: Rc<Cell<usize>>,
        gate: Option<Rc<Notify>>,
    }

    impl Loader for Ima {
        type Sdk = &'static str;
        type Error = &'static str;

        async fn load(&self) -> Result<&'static str, &'static str> {
            self.loads.set(self.loads.get() + 1);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            Ok("ima")
        }
    }

    fn shell(backend: Factory, ima: Ima) -> Shell<Factory, Ima> {
        Shell::new(backend, Arc::new(AdSdk::new(ima)))
    }

    fn video() -> Source {
        Source::new("https://cdn.example/ep1.mp4")
    }

    #[tokio::test]
    async fn mounts_once_per_source() {
        let shell = shell(Factory::default(), Ima::default());

        shell.mount(video()).await.unwrap();
        shell.mount(video()).await.unwrap();
        assert_eq!(shell.backend.created.borrow().len(), 1);
        assert!(shell.state().ready);

        shell
            .mount(Source::new("https://cdn.example/ep2.mp4"))
            .await
            .unwrap();
        let created = shell.backend.created.borrow();
        assert_eq!(created.len(), 2);
        assert!(created[0].is_disposed());
        assert!(!created[1].is_disposed());
    }

    #[tokio::test]
    async fn unmount_disposes_and_resets() {
        let shell = shell(Factory::default(), Ima::default());
        shell.mount(video()).await.unwrap();
        shell.toggle_play();
        shell.handle(Event::Play);
        assert!(shell.state().playing);

        shell.unmount();

        assert!(shell.backend.created.borrow()[0].is_disposed());
        let state = shell.state();
        assert!(!state.ready);
        assert!(!state.playing);
    }

    #[tokio::test]
    async fn reports_backend_failure() {
        let shell = shell(Factory::default(), Ima::default());

        assert_eq!(shell.mount(Source::new("")).await, Err("no source"));
        assert!(!shell.state().ready);
    }

    #[tokio::test]
    async fn retries_source_after_backend_failure() {
        let shell = shell(
            Factory {
                failures: Cell::new(1),
                ..Factory::default()
            },
            Ima::default(),
        );

        assert_eq!(shell.mount(video()).await, Err("unavailable"));
        assert!(!shell.state().ready);

        shell.mount(video()).await.unwrap();
        assert_eq!(shell.backend.created.borrow().len(), 1);
        assert!(shell.state().ready);

        shell.mount(video()).await.unwrap();
        assert_eq!(shell.backend.created.borrow().len(), 1);
    }

    #[tokio::test]
    async fn adds_subtitle_track() {
        let shell = shell(Factory::default(), Ima::default());

        shell
            .mount(Source {
                subtitle: Some(Subtitle::new("https://cdn.example/vi.vtt")),
                ..video()
            })
            .await
            .unwrap();

        let created = shell.backend.created.borrow();
        let log = created[0].0.borrow();
        assert_eq!(log.subtitles.len(), 1);
        assert_eq!(log.subtitles[0].language, "vi");
    }

    #[tokio::test]
    async fn teardown_during_creation_disposes_late_instance() {
        let gate = Rc::new(Notify::new());
        let shell = shell(
            Factory {
                gate: Some(Rc::clone(&gate)),
                ..Factory::default()
            },
            Ima::default(),
        );

        let (mounted, ()) = tokio::join!(shell.mount(video()), async {
            tokio::task::yield_now().await;
            shell.unmount();
            gate.notify_one();
        });
        mounted.unwrap();

        assert!(shell.backend.created.borrow()[0].is_disposed());
        assert!(!shell.state().ready);
    }

    #[tokio::test]
    async fn teardown_during_ad_load_skips_attaching() {
        let gate = Rc::new(Notify::new());
        let shell = shell(
            Factory::default(),
            Ima {
                gate: Some(Rc::clone(&gate)),
                ..Ima::default()
            },
        );

        let (mounted, ()) = tokio::join!(
            shell.mount(Source {
                ad_tag: Some("https://ads.example/vast".into()),
                ..video()
            }),
            async {
                tokio::task::yield_now().await;
                shell.unmount();
                gate.notify_one();
            },
        );
        mounted.unwrap();

        let created = shell.backend.created.borrow();
        let log = created[0].0.borrow();
        assert!(log.disposed);
        assert!(log.ads.is_empty());
    }

    #[tokio::test]
    async fn loads_ads_once_across_mounts() {
        let loads = Rc::new(Cell::new(0));
        let shell = shell(
            Factory::default(),
            Ima {
                loads: Rc::clone(&loads),
                ..Ima::default()
            },
        );
        let with_ads = |url: &str| Source {
            ad_tag: Some("https://ads.example/vast".into()),
            ..Source::new(url)
        };

        shell.mount(with_ads("https://cdn.example/1.mp4")).await.unwrap();
        shell.mount(with_ads("https://cdn.example/2.mp4")).await.unwrap();

        assert_eq!(shell.ads.get().await, Some(&"ima"));
        assert_eq!(loads.get(), 1);
        let created = shell.backend.created.borrow();
        assert_eq!(created[1].0.borrow().ads, ["ima:https://ads.example/vast"]);
    }

    #[tokio::test]
    async fn seeks_within_bounds() {
        let shell = shell(Factory::default(), Ima::default());
        shell.mount(video()).await.unwrap();
        let player = shell.backend.created.borrow()[0].clone();

        shell.seek_by(-10.0);
        assert!(player.snapshot().current_time.abs() < f64::EPSILON);

        shell.scrub(95.0);
        shell.seek_by(10.0);
        assert!((player.snapshot().current_time - 100.0).abs() < f64::EPSILON);

        player.0.borrow_mut().snapshot.duration = None;
        shell.seek_by(10.0);
        assert!((player.snapshot().current_time - 110.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn volume_above_zero_unmutes() {
        let shell = shell(Factory::default(), Ima::default());
        shell.mount(video()).await.unwrap();

        shell.toggle_mute();
        shell.handle(Event::VolumeChange);
        assert!(shell.state().muted);

        shell.set_volume(0.0);
        shell.handle(Event::VolumeChange);
        assert!(shell.state().muted);

        shell.set_volume(0.4);
        shell.handle(Event::VolumeChange);
        let state = shell.state();
        assert!(!state.muted);
        assert!((state.volume - 0.4).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn toggles_fullscreen_and_play() {
        let shell = shell(Factory::default(), Ima::default());
        shell.mount(video()).await.unwrap();

        shell.toggle_fullscreen();
        shell.handle(Event::FullscreenChange);
        assert!(shell.state().fullscreen);

        shell.toggle_play();
        shell.handle(Event::Play);
        assert!(shell.state().playing);

        shell.toggle_play();
        shell.handle(Event::Pause);
        assert!(!shell.state().playing);
    }

    #[tokio::test(start_paused = true)]
    async fn hides_controls_while_playing() {
        let shell = shell(Factory::default(), Ima::default());
        shell.mount(video()).await.unwrap();

        shell.toggle_play();
        shell.handle(Event::Play);
        assert!(shell.state().controls_visible);

        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(!shell.state().controls_visible);

        shell.reveal_controls();
        assert!(shell.state().controls_visible);
        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(shell.state().controls_visible);
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!shell.state().controls_visible);

        shell.toggle_play();
        shell.handle(Event::Pause);
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(shell.state().controls_visible);
    }

    #[tokio::test]
    async fn controls_are_noop_when_unmounted() {
        let shell = shell(Factory::default(), Ima::default());

        shell.toggle_play();
        shell.seek_by(10.0);
        shell.set_volume(0.5);
        shell.handle(Event::TimeUpdate);

        assert!(!shell.state().ready);
        assert!(shell.backend.created.borrow().is_empty());
    }
}
