//! Sharing one physical bus between several device handles.
//!
//! Every transaction locks the bus mutex for its whole duration, so transactions from different
//! handles never interleave.  Multi-transaction sequences (like a read-modify-write) are *not*
//! atomic against other handles.
use crate::device::Claims;
use crate::{BusMutex, Device, Error};
use embedded_hal::i2c as hal_i2c;

/// First and last address probed by [`SharedBus::scan`], the rest is reserved.
const SCAN_FIRST: u8 = 0x08;
const SCAN_LAST: u8 = 0x77;

/// Bus state protected by the mutex.
pub struct BusState<I2C> {
    i2c: I2C,
    claimed: u128,
}

impl<I2C> BusState<I2C> {
    fn new(i2c: I2C) -> Self {
        Self { i2c, claimed: 0 }
    }
}

/// Book-keeping of which addresses on a bus are held by an open handle.
pub trait ClaimTable {
    /// Mark `address` as held, `false` if it already is.
    fn claim(&mut self, address: u8) -> bool;
    fn release(&mut self, address: u8);
}

impl<I2C> ClaimTable for BusState<I2C> {
    fn claim(&mut self, address: u8) -> bool {
        let bit = 1u128 << address;
        if self.claimed & bit != 0 {
            return false;
        }
        self.claimed |= bit;
        true
    }

    fn release(&mut self, address: u8) {
        self.claimed &= !(1u128 << address);
    }
}

/// One physical bus, identified by `id`, shared by multiple device handles.
pub struct SharedBus<M> {
    id: u8,
    mutex: M,
}

impl<I2C> SharedBus<core::cell::RefCell<BusState<I2C>>>
where
    I2C: crate::I2cBus,
{
    pub fn new(id: u8, i2c: I2C) -> Self {
        Self::with_mutex(id, i2c)
    }
}

impl<I2C, M> SharedBus<M>
where
    I2C: crate::I2cBus,
    M: BusMutex<Bus = BusState<I2C>>,
{
    pub fn with_mutex(id: u8, i2c: I2C) -> Self {
        Self {
            id,
            mutex: BusMutex::create(BusState::new(i2c)),
        }
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    /// Claim `address` and return a handle bound to it.
    ///
    /// Fails with [`Error::BusUnavailable`] while another handle holds the same address.  The
    /// claim is released when the handle is closed or dropped.
    pub fn open(&self, address: u8) -> Result<Device<BusRef<'_, M>>, Error<I2C::Error>> {
        if address > crate::device::MAX_ADDRESS {
            return Err(Error::InvalidArgument);
        }
        if !self.mutex.lock(|state| state.claim(address)) {
            #[cfg(feature = "defmt")]
            defmt::debug!("bus {}: address {=u8:#x} already claimed", self.id, address);
            return Err(Error::BusUnavailable);
        }
        let dev = Device::open(BusRef { bus: self, address }, address)?;
        Ok(dev.with_claims(Claims {
            reserve: BusRef::reserve,
            release: BusRef::unreserve,
            rebind: BusRef::rebind,
        }))
    }

    pub fn is_claimed(&self, address: u8) -> bool {
        address <= crate::device::MAX_ADDRESS
            && self.mutex.lock(|state| state.claimed & (1u128 << address) != 0)
    }

    /// Probe all non-reserved addresses with a single-byte read and collect the ones that
    /// acknowledged.
    pub fn scan(&self) -> heapless::Vec<u8, 112> {
        let mut found = heapless::Vec::new();
        for address in SCAN_FIRST..=SCAN_LAST {
            let mut buf = [0x00];
            let present = self
                .mutex
                .lock(|state| hal_i2c::I2c::read(&mut state.i2c, address, &mut buf).is_ok());
            if present {
                // capacity covers the whole scan range
                let _ = found.push(address);
            }
        }
        found
    }
}

/// View of a [`SharedBus`] held by one device handle.
///
/// Implements [`embedded_hal::i2c::I2c`] by locking the bus for each transaction.
pub struct BusRef<'a, M>
where
    M: BusMutex,
    M::Bus: ClaimTable,
{
    bus: &'a SharedBus<M>,
    address: u8,
}

impl<M> BusRef<'_, M>
where
    M: BusMutex,
    M::Bus: ClaimTable,
{
    fn reserve(&mut self, address: u8) -> bool {
        self.bus.mutex.lock(|state| state.claim(address))
    }

    fn unreserve(&mut self, address: u8) {
        self.bus.mutex.lock(|state| state.release(address));
    }

    fn rebind(&mut self, address: u8) {
        let old = self.address;
        self.bus.mutex.lock(|state| state.release(old));
        self.address = address;
    }
}

impl<I2C, M> hal_i2c::ErrorType for BusRef<'_, M>
where
    I2C: crate::I2cBus,
    M: BusMutex<Bus = BusState<I2C>>,
{
    type Error = I2C::Error;
}

impl<I2C, M> hal_i2c::I2c for BusRef<'_, M>
where
    I2C: crate::I2cBus,
    M: BusMutex<Bus = BusState<I2C>>,
{
    fn read(&mut self, address: u8, read: &mut [u8]) -> Result<(), Self::Error> {
        self.bus.mutex.lock(|state| state.i2c.read(address, read))
    }

    fn write(&mut self, address: u8, write: &[u8]) -> Result<(), Self::Error> {
        self.bus.mutex.lock(|state| state.i2c.write(address, write))
    }

    fn write_read(
        &mut self,
        address: u8,
        write: &[u8],
        read: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.bus
            .mutex
            .lock(|state| state.i2c.write_read(address, write, read))
    }

    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [hal_i2c::Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.bus
            .mutex
            .lock(|state| state.i2c.transaction(address, operations))
    }
}

impl<M> Drop for BusRef<'_, M>
where
    M: BusMutex,
    M::Bus: ClaimTable,
{
    fn drop(&mut self) {
        let address = self.address;
        self.bus.mutex.lock(|state| state.release(address));
    }
}
