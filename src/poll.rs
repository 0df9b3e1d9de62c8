//! Periodic sampling of a driver value with change detection.
//!
//! The cancellation predicate is evaluated between samples only; a transaction that has started
//! always runs to completion.

/// Remembers the last value and reports when a new one differs.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector<T> {
    last: Option<T>,
}

impl<T: PartialEq + Clone> ChangeDetector<T> {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Store `value` and return the previous value if it changed.
    ///
    /// The first value ever seen is reported as a change from `None`.
    pub fn update(&mut self, value: T) -> Option<Option<T>> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        Some(self.last.replace(value))
    }

    pub fn last(&self) -> Option<&T> {
        self.last.as_ref()
    }
}

/// Samples a value at a fixed interval until cancelled.
pub struct Poller<D> {
    delay: D,
    interval_ms: u32,
}

impl<D> Poller<D> {
    pub fn new(delay: D, interval_ms: u32) -> Self {
        Self { delay, interval_ms }
    }

    pub fn release(self) -> D {
        self.delay
    }
}

impl<D: embedded_hal::delay::DelayNs> Poller<D> {
    /// Call `sample` every interval and `on_change(previous, current)` whenever the result
    /// differs from the previous one.
    ///
    /// Returns the last sampled value once `cancelled` returns `true`.  The first sampling
    /// error ends polling and is returned.
    pub fn run<T, E, S, C, F>(
        &mut self,
        mut sample: S,
        mut cancelled: C,
        mut on_change: F,
    ) -> Result<Option<T>, E>
    where
        T: PartialEq + Clone,
        S: FnMut() -> Result<T, E>,
        C: FnMut() -> bool,
        F: FnMut(Option<T>, &T),
    {
        let mut detector = ChangeDetector::new();
        while !cancelled() {
            let value = sample()?;
            if let Some(previous) = detector.update(value.clone()) {
                on_change(previous, &value);
            }
            self.delay.delay_ms(self.interval_ms);
        }
        Ok(detector.last.take())
    }

    /// Sample until the value differs from the first sample and return the new value.
    ///
    /// Returns `Ok(None)` when cancelled first.
    pub fn wait_for_change<T, E, S, C>(
        &mut self,
        mut sample: S,
        mut cancelled: C,
    ) -> Result<Option<T>, E>
    where
        T: PartialEq + Clone,
        S: FnMut() -> Result<T, E>,
        C: FnMut() -> bool,
    {
        let mut detector = ChangeDetector::new();
        let mut first = true;
        while !cancelled() {
            let value = sample()?;
            if detector.update(value.clone()).is_some() && !first {
                return Ok(Some(value));
            }
            first = false;
            self.delay.delay_ms(self.interval_ms);
        }
        Ok(None)
    }
}

#[cfg(feature = "async")]
impl<D: embedded_hal_async::delay::DelayNs> Poller<D> {
    /// Same as [`Poller::run`], but waits between samples asynchronously.
    ///
    /// Sampling itself stays blocking.
    pub async fn run_async<T, E, S, C, F>(
        &mut self,
        mut sample: S,
        mut cancelled: C,
        mut on_change: F,
    ) -> Result<Option<T>, E>
    where
        T: PartialEq + Clone,
        S: FnMut() -> Result<T, E>,
        C: FnMut() -> bool,
        F: FnMut(Option<T>, &T),
    {
        let mut detector = ChangeDetector::new();
        while !cancelled() {
            let value = sample()?;
            if let Some(previous) = detector.update(value.clone()) {
                on_change(previous, &value);
            }
            self.delay.delay_ms(self.interval_ms).await;
        }
        Ok(detector.last.take())
    }
}
