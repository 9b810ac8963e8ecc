//! # Typed Memory
//!
//! Flat, zero-initialized byte region holding component values, plus the side
//! tables that handles point into.
//!
//! ## Layout
//!
//! ```text
//! bytes:   [ value | value | list data | ... ]   bump allocated, little-endian
//! strings: handle - 1 -> text                    handle 0 is null
//! lists:   handle - 1 -> { data, len, capacity, stride, alignment }
//! ```
//!
//! List elements live in `bytes` like any other value; growing a list past
//! its capacity moves the elements to a fresh allocation.

use crate::error::{CursorError, Result};
use meta_spec::{align_up, Program, HANDLE_SIZE, MAX_VALUE_SIZE};

/// Byte offset into a [`Memory`] region
pub type Address = usize;

/// String or list handle; 0 is null
pub type Handle = u64;

/// Smallest capacity a growing list allocates
const MIN_LIST_CAPACITY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListRecord {
    data: Address,
    len: usize,
    capacity: usize,
    stride: usize,
    alignment: usize,
}

/// Typed value storage
#[derive(Debug, Clone, Default)]
pub struct Memory {
    bytes: Vec<u8>,
    strings: Vec<String>,
    lists: Vec<ListRecord>,
}

macro_rules! scalar_access {
    ($($read:ident, $write:ident, $ty:ty);* $(;)?) => {
        $(
            pub fn $read(&self, address: Address) -> Result<$ty> {
                let bytes = self.read_bytes(address, std::mem::size_of::<$ty>())?;
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(raw))
            }

            pub fn $write(&mut self, address: Address, value: $ty) -> Result<()> {
                self.write_bytes(address, &value.to_le_bytes())
            }
        )*
    };
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes allocated so far
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    // ========== Allocation ==========

    /// Allocate `size` zeroed bytes aligned to `alignment`
    pub fn alloc(&mut self, size: usize, alignment: usize) -> Address {
        let address = align_up(self.bytes.len(), alignment.max(1));
        self.bytes.resize(address + size, 0);
        address
    }

    /// Allocate `size` zeroed bytes, failing when the region cannot grow
    fn try_alloc(&mut self, size: usize, alignment: usize) -> Option<Address> {
        let address = align_up(self.bytes.len(), alignment.max(1));
        let end = address.checked_add(size)?;
        self.bytes.try_reserve(end - self.bytes.len()).ok()?;
        self.bytes.resize(end, 0);
        Some(address)
    }

    /// Allocate zeroed storage for one value of the program's type
    pub fn alloc_for(&mut self, program: &Program) -> Address {
        self.alloc(program.size(), program.alignment())
    }

    // ========== Raw access ==========

    pub fn read_bytes(&self, address: Address, size: usize) -> Result<&[u8]> {
        address
            .checked_add(size)
            .and_then(|end| self.bytes.get(address..end))
            .ok_or(CursorError::OutOfBounds { address, size })
    }

    pub fn write_bytes(&mut self, address: Address, data: &[u8]) -> Result<()> {
        let size = data.len();
        let target = address
            .checked_add(size)
            .and_then(|end| self.bytes.get_mut(address..end))
            .ok_or(CursorError::OutOfBounds { address, size })?;
        target.copy_from_slice(data);
        Ok(())
    }

    /// Read a little-endian unsigned integer of 1, 2, 4 or 8 bytes
    pub fn read_uint(&self, address: Address, size: usize) -> Result<u64> {
        let bytes = self.read_bytes(address, size.min(8))?;
        Ok(bytes
            .iter()
            .rev()
            .fold(0u64, |acc, &byte| (acc << 8) | u64::from(byte)))
    }

    /// Read a little-endian signed integer, sign-extending to 64 bits
    pub fn read_int(&self, address: Address, size: usize) -> Result<i64> {
        let raw = self.read_uint(address, size)?;
        let shift = 64 - 8 * size.clamp(1, 8) as u32;
        Ok(((raw << shift) as i64) >> shift)
    }

    /// Write the low `size` bytes of `value` in little-endian order
    pub fn write_uint(&mut self, address: Address, size: usize, value: u64) -> Result<()> {
        let bytes = value.to_le_bytes();
        self.write_bytes(address, &bytes[..size.min(8)])
    }

    scalar_access! {
        read_u8, write_u8, u8;
        read_u16, write_u16, u16;
        read_u32, write_u32, u32;
        read_u64, write_u64, u64;
        read_i8, write_i8, i8;
        read_i16, write_i16, i16;
        read_i32, write_i32, i32;
        read_i64, write_i64, i64;
        read_f32, write_f32, f32;
        read_f64, write_f64, f64;
    }

    pub fn read_handle(&self, address: Address) -> Result<Handle> {
        self.read_uint(address, HANDLE_SIZE)
    }

    pub fn write_handle(&mut self, address: Address, handle: Handle) -> Result<()> {
        self.write_uint(address, HANDLE_SIZE, handle)
    }

    // ========== Strings ==========

    /// Store a new string and return its handle
    pub fn string_new(&mut self, text: &str) -> Handle {
        self.strings.push(text.to_string());
        self.strings.len() as Handle
    }

    /// Resolve a string handle; the null handle resolves to `None`
    pub fn string(&self, handle: Handle) -> Result<Option<&str>> {
        if handle == 0 {
            return Ok(None);
        }
        self.strings
            .get(handle as usize - 1)
            .map(|s| Some(s.as_str()))
            .ok_or(CursorError::InvalidHandle(handle))
    }

    /// Read the string stored in the handle slot at `address`
    pub fn read_string(&self, address: Address) -> Result<Option<&str>> {
        let handle = self.read_handle(address)?;
        self.string(handle)
    }

    /// Store a string into the handle slot at `address`
    ///
    /// A slot that already owns a string has it replaced in place; `None`
    /// clears the slot to the null handle.
    pub fn write_string(&mut self, address: Address, text: Option<&str>) -> Result<()> {
        let handle = self.read_handle(address)?;
        let Some(text) = text else {
            return self.write_handle(address, 0);
        };

        if handle != 0 {
            let slot = self
                .strings
                .get_mut(handle as usize - 1)
                .ok_or(CursorError::InvalidHandle(handle))?;
            text.clone_into(slot);
            return Ok(());
        }

        // Bounds are checked before the table grows
        self.read_bytes(address, HANDLE_SIZE)?;
        let handle = self.string_new(text);
        self.write_handle(address, handle)
    }

    // ========== Lists ==========

    /// Create an empty list of `stride`-byte elements
    pub fn list_new(&mut self, stride: usize, alignment: usize) -> Handle {
        self.lists.push(ListRecord {
            data: align_up(self.bytes.len(), alignment.max(1)),
            len: 0,
            capacity: 0,
            stride,
            alignment: alignment.max(1),
        });
        self.lists.len() as Handle
    }

    fn list(&self, handle: Handle) -> Result<&ListRecord> {
        handle
            .checked_sub(1)
            .and_then(|index| self.lists.get(index as usize))
            .ok_or(CursorError::InvalidHandle(handle))
    }

    /// Number of elements in a list; the null handle is an empty list
    pub fn length(&self, handle: Handle) -> Result<usize> {
        if handle == 0 {
            return Ok(0);
        }
        Ok(self.list(handle)?.len)
    }

    /// Size of one element of a list
    pub fn stride(&self, handle: Handle) -> Result<usize> {
        Ok(self.list(handle)?.stride)
    }

    /// Address of the first element
    pub fn data_pointer(&self, handle: Handle) -> Result<Address> {
        Ok(self.list(handle)?.data)
    }

    /// Address of element `index`
    pub fn element_at(&self, handle: Handle, index: usize) -> Result<Address> {
        let record = self.list(handle)?;
        if index >= record.len {
            return Err(CursorError::OutOfRange {
                position: index,
                len: record.len,
            });
        }
        Ok(record.data + index * record.stride)
    }

    /// Resize a list to `new_count` elements
    ///
    /// New elements are zeroed. Removed elements are zeroed too, so spare
    /// capacity is always clean. A size that cannot be allocated fails with
    /// `CapacityOverflow` and leaves the list unchanged.
    pub fn grow(&mut self, handle: Handle, new_count: usize) -> Result<()> {
        let record = *self.list(handle)?;
        let index = handle as usize - 1;
        let mut updated = record;

        if new_count > record.capacity {
            let overflow = CursorError::CapacityOverflow {
                count: new_count,
                stride: record.stride,
            };
            let capacity = new_count
                .max(record.capacity.saturating_mul(2))
                .max(MIN_LIST_CAPACITY);
            let data = capacity
                .checked_mul(record.stride)
                .filter(|&bytes| bytes <= MAX_VALUE_SIZE)
                .and_then(|bytes| self.try_alloc(bytes, record.alignment))
                .ok_or(overflow)?;
            let used = record.len * record.stride;
            if used > 0 {
                self.bytes.copy_within(record.data..record.data + used, data);
            }
            updated.data = data;
            updated.capacity = capacity;
        } else if new_count < record.len {
            let start = record.data + new_count * record.stride;
            let end = record.data + record.len * record.stride;
            self.bytes[start..end].fill(0);
        }

        updated.len = new_count;
        self.lists[index] = updated;
        Ok(())
    }

    /// Allocate a list holding a copy of `count` elements written by `fill`
    pub fn list_from<F>(&mut self, stride: usize, alignment: usize, count: usize, mut fill: F) -> Result<Handle>
    where
        F: FnMut(&mut Self, Address, usize) -> Result<()>,
    {
        let handle = self.list_new(stride, alignment);
        self.grow(handle, count)?;
        for index in 0..count {
            let address = self.element_at(handle, index)?;
            fill(self, address, index)?;
        }
        Ok(handle)
    }
}
