//! # Periodic driver
//!
//! Runs [`SatelliteTracker::update_cycle`] once per configured interval until shutdown.
//!
//! Cycles never overlap: the tracker is borrowed mutably for the whole run and a cycle that
//! overruns its interval delays the next tick instead of queueing a burst of catch-up cycles
//! ([`MissedTickBehavior::Delay`]). Shutdown is signalled through a [`watch`] channel carrying
//! `true`, or by dropping its sender; a cycle in progress always completes first.

use hifitime::Epoch;
use log::{info, warn};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::providers::{ElementSetProvider, InitialStateSource, SpaceWeatherProvider};
use crate::sattrack_errors::SatTrackError;
use crate::storage::TrackingStore;
use crate::tracking::tracker::SatelliteTracker;

/// Drive update cycles stamped with the current UTC time.
///
/// Return
/// ----------
/// * The number of cycles run before shutdown.
pub async fn run_periodic<S, I>(
    tracker: &mut SatelliteTracker<S, I>,
    element_sets: &impl ElementSetProvider,
    space_weather: &impl SpaceWeatherProvider,
    shutdown: watch::Receiver<bool>,
) -> usize
where
    S: TrackingStore,
    I: InitialStateSource,
{
    run_periodic_with_clock(tracker, element_sets, space_weather, shutdown, || {
        Epoch::now().map_err(SatTrackError::from)
    })
    .await
}

/// Same as [`run_periodic`], with the cycle instant taken from `clock`.
///
/// A tick whose clock reading fails is skipped with a warning.
pub async fn run_periodic_with_clock<S, I, C, E>(
    tracker: &mut SatelliteTracker<S, I>,
    element_sets: &impl ElementSetProvider,
    space_weather: &impl SpaceWeatherProvider,
    mut shutdown: watch::Receiver<bool>,
    mut clock: C,
) -> usize
where
    S: TrackingStore,
    I: InitialStateSource,
    C: FnMut() -> Result<Epoch, E>,
    E: std::fmt::Display,
{
    if *shutdown.borrow() {
        return 0;
    }

    let mut ticker = interval(tracker.params().update_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycles = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match clock() {
                    Ok(at) => {
                        tracker.update_cycle(at, element_sets, space_weather).await;
                        cycles += 1;
                    }
                    Err(e) => warn!("skipping update cycle, clock unavailable: {e}"),
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    info!("periodic tracking stopped after {cycles} cycles");
    cycles
}

#[cfg(test)]
mod scheduler_test {
    use super::*;
    use crate::providers::{StaticElementSets, StaticSpaceWeather};
    use crate::storage::MemStorage;
    use crate::tracking::TrackerParams;
    use std::time::Duration;

    fn tracker() -> SatelliteTracker<MemStorage> {
        let params = TrackerParams::builder()
            .update_interval(Duration::from_millis(10))
            .tracked_objects(vec!["25544".into()])
            .build()
            .unwrap();
        SatelliteTracker::new(params, MemStorage::new())
    }

    fn fixed_clock() -> Result<Epoch, std::convert::Infallible> {
        Ok(Epoch::from_gregorian_utc_hms(2024, 1, 15, 11, 0, 0))
    }

    #[tokio::test]
    async fn test_runs_until_shutdown() {
        let mut tracker = tracker();
        let (tx, rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(45)).await;
            let _ = tx.send(true);
        });

        let cycles = run_periodic_with_clock(
            &mut tracker,
            &StaticElementSets::new(),
            &StaticSpaceWeather::unavailable(),
            rx,
            fixed_clock,
        )
        .await;

        // The first tick fires immediately
        assert!(cycles >= 1);
    }

    #[tokio::test]
    async fn test_already_stopped() {
        let mut tracker = tracker();
        let (_tx, rx) = watch::channel(true);

        let cycles = run_periodic_with_clock(
            &mut tracker,
            &StaticElementSets::new(),
            &StaticSpaceWeather::unavailable(),
            rx,
            fixed_clock,
        )
        .await;
        assert_eq!(cycles, 0);
    }

    #[tokio::test]
    async fn test_dropped_sender_stops() {
        let mut tracker = tracker();
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let cycles = run_periodic_with_clock(
            &mut tracker,
            &StaticElementSets::new(),
            &StaticSpaceWeather::unavailable(),
            rx,
            fixed_clock,
        )
        .await;
        assert!(cycles <= 1);
    }
}
