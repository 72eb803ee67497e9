//! Lazily loaded ad SDK.

use std::{fmt, future::Future};

use derive_more::Debug;
use tokio::sync::OnceCell;
use tracing as log;

/// Loader of an ad SDK.
pub trait Loader {
    /// Loaded SDK.
    type Sdk;

    /// Error of loading the SDK.
    type Error: fmt::Display;

    /// Loads the SDK.
    ///
    /// # Errors
    ///
    /// If the SDK cannot be fetched or evaluated.
    fn load(&self) -> impl Future<Output = Result<Self::Sdk, Self::Error>>;
}

/// Ad SDK loaded at most once per its own lifetime.
///
/// A single [`AdSdk`] is meant to be shared by all the [`Shell`]s of a page.
///
/// [`Shell`]: super::Shell
#[derive(Debug)]
pub struct AdSdk<L: Loader> {
    /// [`Loader`] of the SDK.
    loader: L,

    /// Outcome of the single load attempt.
    #[debug(skip)]
    sdk: OnceCell<Option<L::Sdk>>,
}

impl<L: Loader> AdSdk<L> {
    /// Creates a new not yet loaded [`AdSdk`].
    #[must_use]
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            sdk: OnceCell::new(),
        }
    }

    /// Returns the loaded SDK, loading it on the first call.
    ///
    /// Concurrent callers wait for the same load. A failed load is logged and
    /// never retried, so [`None`] is returned ever after.
    pub async fn get(&self) -> Option<&L::Sdk> {
        self.sdk
            .get_or_init(|| async {
                self.loader
                    .load()
                    .await
                    .map_err(|e| log::error!("Failed to load ad SDK: {e}"))
                    .ok()
            })
            .await
            .as_ref()
    }
}

#[cfg(test)]
mod spec {
    use std::{
        cell::Cell,
        sync::atomic::{AtomicUsize, Ordering},
    };

    use super::{AdSdk, Loader};

    #[derive(Default)]
    struct Counting {
        loads: AtomicUsize,
        fail: Cell<bool>,
    }

    impl Loader for Counting {
        type Sdk = &'static str;
        type Error = &'static str;

        async fn load(&self) -> Result<Self::Sdk, Self::Error> {
            _ = self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            if self.fail.get() {
                Err("network down")
            } else {
                Ok("ima")
            }
        }
    }

    #[tokio::test]
    async fn loads_once_for_concurrent_callers() {
        let ads = AdSdk::new(Counting::default());

        let (a, b) = tokio::join!(ads.get(), ads.get());
        assert_eq!(a, Some(&"ima"));
        assert_eq!(b, Some(&"ima"));
        assert_eq!(ads.get().await, Some(&"ima"));

        assert_eq!(ads.loader.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn swallows_failure_without_retrying() {
        let loader = Counting::default();
        loader.fail.set(true);
        let ads = AdSdk::new(loader);

        assert_eq!(ads.get().await, None);
        assert_eq!(ads.get().await, None);

        assert_eq!(ads.loader.loads.load(Ordering::SeqCst), 1);
    }
}
