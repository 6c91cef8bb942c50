//! GPIO port backed by the memory-mapped BCM283x GPIO register block.
use crate::{GpioError, GpioPort, GpioResult, PinMode};
use bitvec::vec::BitVec;
use log::{debug, warn};
use memmap2::{MmapOptions, MmapRaw};
use std::fmt::{Debug, Formatter};
use std::fs::OpenOptions;
use std::sync::atomic::AtomicU8;

pub struct RawGpioPort {
    mmap: MmapRaw,
    // Pins this port switched to output, handed back as inputs on drop
    outputs: BitVec<AtomicU8>,
}

impl RawGpioPort {
    /// GPIO base address of the Raspberry Pi 2/3 (BCM2836/BCM2837).
    pub const GPIO_BASE_RPI2: u64 = 0x3F200000;
    // const GPIO_BASE_RPI1: u64 = 0x20200000;
    // const GPIO_BASE_RPI4: u64 = 0xFE200000;

    const PIN_COUNT: usize = 54;
    const BLOCK_SIZE: usize = 4096;

    // Register offsets, in 32-bit words
    const GPFSEL0: usize = 0x00 / 4;
    const GPSET0: usize = 0x1c / 4;
    const GPCLR0: usize = 0x28 / 4;
    const GPLEV0: usize = 0x34 / 4;

    /// Maps the GPIO registers from `path`. `base` is the physical address of the register block
    /// and is only used for `/dev/mem`; `/dev/gpiomem` always maps the GPIO block at offset 0.
    pub fn open(path: &str, base: u64) -> GpioResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)?;

        let offset = if path.ends_with("gpiomem") { 0 } else { base };

        let mmap = MmapOptions::new()
            .offset(offset)
            .len(Self::BLOCK_SIZE)
            .map_raw(&file)?;

        debug!("Mapped GPIO registers from {} at {:#x}", path, offset);

        Ok(RawGpioPort {
            mmap,
            outputs: BitVec::repeat(false, Self::PIN_COUNT),
        })
    }

    fn check_pin(pin: usize) -> GpioResult<()> {
        if pin >= Self::PIN_COUNT {
            return Err(GpioError::InvalidArgument);
        }
        Ok(())
    }

    fn register(&self, word: usize) -> *mut u32 {
        let base = self.mmap.as_mut_ptr() as *mut u32;
        // SAFETY: every caller passes a word offset inside the mapped 4 KiB block
        unsafe { base.add(word) }
    }

    fn raw_set_pin_function(&self, pin: usize, function: u32) -> GpioResult<()> {
        Self::check_pin(pin)?;

        // GPFSELn register
        let register_ptr = self.register(Self::GPFSEL0 + pin / 10);
        let shift = (pin % 10) * 3;

        let mut register_value = unsafe { register_ptr.read_volatile() };
        register_value &= !(0b111 << shift); // Clear the bits for this pin
        register_value |= function << shift;
        unsafe { register_ptr.write_volatile(register_value) };

        Ok(())
    }
}

impl Debug for RawGpioPort {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RawGpioPort({:?})", self.mmap.as_ptr().addr())
    }
}

impl GpioPort for RawGpioPort {
    fn set_mode(&self, pin: usize, mode: PinMode) -> GpioResult<()> {
        let function = match mode {
            PinMode::Input => 0b000,
            PinMode::Output => 0b001,
        };
        self.raw_set_pin_function(pin, function)?;
        self.outputs.set_aliased(pin, mode == PinMode::Output);
        Ok(())
    }

    fn write(&self, pin: usize, level: bool) -> GpioResult<()> {
        Self::check_pin(pin)?;

        // GPSETn/GPCLRn register, writing a 1 sets or clears the pin and 0s are ignored
        let base = if level { Self::GPSET0 } else { Self::GPCLR0 };
        let register_ptr = self.register(base + pin / 32);
        unsafe { register_ptr.write_volatile(1 << (pin % 32)) };

        Ok(())
    }

    fn read(&self, pin: usize) -> GpioResult<bool> {
        Self::check_pin(pin)?;

        // GPLEVn register
        let register_ptr = self.register(Self::GPLEV0 + pin / 32);
        let register_value = unsafe { register_ptr.read_volatile() };
        Ok((register_value >> (pin % 32)) & 1 != 0)
    }
}

impl Drop for RawGpioPort {
    fn drop(&mut self) {
        let outputs: Vec<usize> = self.outputs.iter_ones().collect();
        for pin in outputs {
            if let Err(e) = self.write(pin, false).and_then(|_| self.set_mode(pin, PinMode::Input)) {
                warn!("Failed to release GPIO {}: {}", pin, e);
            }
        }
    }
}
