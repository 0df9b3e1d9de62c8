//! Locks guarding the state of a [`SharedBus`][crate::SharedBus].

/// Lock around a bus and its address claims.
///
/// Every transaction of a handle opened from a [`SharedBus`][crate::SharedBus] runs with the
/// lock held, and so does every change to the table of claimed addresses.  Pick the lock that
/// matches where the handles live:
///
/// | Lock | Feature | Handles may live in |
/// | --- | --- | --- |
/// | [`core::cell::RefCell`] | _none_ | one thread or one interrupt priority |
/// | [`std::sync::Mutex`][mutex-std] | `std` | several threads |
/// | [`critical_section::Mutex`][mutex-cs] over a `RefCell` | `critical-section` | main code and interrupt handlers |
///
/// [mutex-std]: https://doc.rust-lang.org/std/sync/struct.Mutex.html
/// [mutex-cs]: https://docs.rs/critical-section/latest/critical_section/struct.Mutex.html
///
/// Any other lock can be used through a newtype:
///
/// ```
/// use grove_devices::{BusMutex, SharedBus};
///
/// struct MyLock<T>(std::sync::Mutex<T>);
///
/// impl<T> BusMutex for MyLock<T> {
///     type Bus = T;
///
///     fn create(bus: T) -> Self {
///         Self(std::sync::Mutex::new(bus))
///     }
///
///     fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
///         f(&mut self.0.lock().unwrap())
///     }
/// }
///
/// # let mut i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// let bus: SharedBus<MyLock<_>> = SharedBus::with_mutex(0, i2c.clone());
/// assert!(!bus.is_claimed(0x48));
/// # i2c.done();
/// ```
pub trait BusMutex {
    /// What the lock protects, a [`BusState`][crate::BusState] for shared buses.
    type Bus;

    fn create(bus: Self::Bus) -> Self;

    /// Run `f` with exclusive access to the guarded bus.
    fn lock<R, F: FnOnce(&mut Self::Bus) -> R>(&self, f: F) -> R;
}

impl<T> BusMutex for core::cell::RefCell<T> {
    type Bus = T;

    fn create(bus: T) -> Self {
        core::cell::RefCell::new(bus)
    }

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        f(&mut self.borrow_mut())
    }
}

#[cfg(any(test, feature = "std"))]
impl<T> BusMutex for std::sync::Mutex<T> {
    type Bus = T;

    fn create(bus: T) -> Self {
        std::sync::Mutex::new(bus)
    }

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        // a handle panicking mid-transaction leaves the bus itself usable
        let mut guard = self.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut guard)
    }
}

#[cfg(feature = "critical-section")]
impl<T> BusMutex for critical_section::Mutex<core::cell::RefCell<T>> {
    type Bus = T;

    fn create(bus: T) -> Self {
        critical_section::Mutex::new(core::cell::RefCell::new(bus))
    }

    fn lock<R, F: FnOnce(&mut T) -> R>(&self, f: F) -> R {
        critical_section::with(|cs| f(&mut self.borrow_ref_mut(cs)))
    }
}
