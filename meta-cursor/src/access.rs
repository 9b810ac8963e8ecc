//! # Typed Accessors
//!
//! Reads and writes of the selected leaf value, with the fixed widening
//! table below. Every check happens before the single write, so a failed
//! setter leaves memory untouched.
//!
//! | Access              | Accepted targets                                        |
//! |---------------------|---------------------------------------------------------|
//! | `set_bool`          | bool, integers                                          |
//! | `set_char`          | char, integers, string                                  |
//! | `set_int/set_uint`  | integers, char, bool, floats, enum, bitmask             |
//! | `set_float`         | floats, integers (truncated)                            |
//! | `set_string`        | string, char, enum, bitmask, bool, integers, floats     |
//! | `set_entity`        | entity                                                  |
//! | `get_bool`          | bool, integers                                          |
//! | `get_char`          | char                                                    |
//! | `get_int/get_uint`  | integers, char, bool, enum, bitmask, floats (truncated) |
//! | `get_float`         | floats, integers                                        |
//! | `get_string`        | string, enum                                            |
//! | `get_entity`        | entity                                                  |

use crate::cursor::Cursor;
use crate::error::{CursorError, Result};
use crate::memory::{Address, Memory};
use meta_spec::{unescape_char, Constants, EntityId, OpKind, PrimitiveKind};
use std::borrow::{Borrow, BorrowMut};
use std::fmt;

/// Leaf value selected by a cursor
#[derive(Debug, Clone, Copy)]
enum Leaf<'p> {
    Primitive(PrimitiveKind),
    Enum(&'p Constants),
    Bitmask(&'p Constants),
}

impl fmt::Display for Leaf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Primitive(kind) => write!(f, "{}", kind),
            Leaf::Enum(_) => f.write_str("enum"),
            Leaf::Bitmask(_) => f.write_str("bitmask"),
        }
    }
}

/// Numeric value read from memory
#[derive(Debug, Clone, Copy)]
enum Number {
    Int(i128),
    Float(f64),
}

fn mismatch(access: &'static str, target: impl fmt::Display) -> CursorError {
    CursorError::TypeMismatch {
        access,
        target: target.to_string(),
    }
}

fn overflow(value: impl fmt::Display, target: impl fmt::Display) -> CursorError {
    CursorError::Overflow {
        value: value.to_string(),
        target: target.to_string(),
    }
}

fn invalid_literal(literal: &str, target: impl fmt::Display) -> CursorError {
    CursorError::InvalidLiteral {
        literal: literal.to_string(),
        target: target.to_string(),
    }
}

fn read_integer(memory: &Memory, kind: PrimitiveKind, address: Address) -> Result<i128> {
    if kind.is_signed() {
        Ok(i128::from(memory.read_int(address, kind.size())?))
    } else {
        Ok(i128::from(memory.read_uint(address, kind.size())?))
    }
}

/// Range-checked store into an integer-encoded kind (integers, char, bool)
fn write_integer(memory: &mut Memory, kind: PrimitiveKind, address: Address, value: i128) -> Result<()> {
    let (min, max) = kind
        .int_range()
        .ok_or_else(|| mismatch("store an integer in", kind))?;
    if value < min || value > max {
        return Err(overflow(value, kind));
    }
    memory.write_uint(address, kind.size(), value as u64)
}

/// Store a float, rejecting finite values that do not fit in an `f32`
fn write_float(memory: &mut Memory, kind: PrimitiveKind, address: Address, value: f64) -> Result<()> {
    if kind != PrimitiveKind::F32 {
        return memory.write_f64(address, value);
    }
    let narrowed = value as f32;
    if value.is_finite() && !narrowed.is_finite() {
        return Err(overflow(value, kind));
    }
    memory.write_f32(address, narrowed)
}

/// Truncate toward zero and check the result lies in `min..=max`
fn truncate(value: f64, min: i128, max: i128, target: impl fmt::Display) -> Result<i128> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < min as f64 || truncated >= max as f64 + 1.0 {
        return Err(overflow(value, target));
    }
    Ok(truncated as i128)
}

/// Parse `A | B`, `0`, or hex remainders such as `A | 0x10`
fn parse_bitmask(constants: &Constants, text: &str) -> Result<u32> {
    let text = text.trim();
    if text.is_empty() {
        return Err(invalid_literal(text, "bitmask"));
    }
    if text == "0" {
        return Ok(0);
    }

    let mut bits = 0u32;
    for name in text.split('|').map(str::trim) {
        if let Some(hex) = name.strip_prefix("0x") {
            bits |= u32::from_str_radix(hex, 16).map_err(|_| invalid_literal(name, "bitmask"))?;
        } else {
            let value = constants
                .value_of(name)
                .ok_or_else(|| CursorError::UnknownConstant(name.to_string()))?;
            bits |= value as u32;
        }
    }
    Ok(bits)
}

impl<'p, M: Borrow<Memory>> Cursor<'p, M> {
    fn leaf(&self, access: &'static str) -> Result<(Leaf<'p>, Address)> {
        let selection = self.selection()?;
        let leaf = match &selection.op.kind {
            OpKind::Primitive(kind) => Leaf::Primitive(*kind),
            OpKind::Enum(constants) => Leaf::Enum(constants),
            OpKind::Bitmask(constants) => Leaf::Bitmask(constants),
            _ => return Err(mismatch(access, selection.op.code())),
        };
        if selection.repetition > 1 {
            return Err(mismatch(
                access,
                format!("{}[{}]", leaf, selection.repetition),
            ));
        }
        Ok((leaf, selection.ptr))
    }

    fn number(&self, access: &'static str) -> Result<Number> {
        let (leaf, address) = self.leaf(access)?;
        let memory = self.memory();
        match leaf {
            Leaf::Primitive(PrimitiveKind::F32) => Ok(Number::Float(f64::from(memory.read_f32(address)?))),
            Leaf::Primitive(PrimitiveKind::F64) => Ok(Number::Float(memory.read_f64(address)?)),
            Leaf::Primitive(kind) if kind.int_range().is_some() => {
                Ok(Number::Int(read_integer(memory, kind, address)?))
            }
            Leaf::Enum(_) => Ok(Number::Int(i128::from(memory.read_i32(address)?))),
            Leaf::Bitmask(_) => Ok(Number::Int(i128::from(memory.read_u32(address)?))),
            other => Err(mismatch(access, other)),
        }
    }

    // ========== Getters ==========

    pub fn get_bool(&self) -> Result<bool> {
        let (leaf, address) = self.leaf("get_bool")?;
        match leaf {
            Leaf::Primitive(kind) if kind == PrimitiveKind::Bool || kind.is_integer() => {
                Ok(read_integer(self.memory(), kind, address)? != 0)
            }
            other => Err(mismatch("get_bool", other)),
        }
    }

    pub fn get_char(&self) -> Result<char> {
        let (leaf, address) = self.leaf("get_char")?;
        match leaf {
            Leaf::Primitive(PrimitiveKind::Char) => Ok(char::from(self.memory().read_u8(address)?)),
            other => Err(mismatch("get_char", other)),
        }
    }

    pub fn get_int(&self) -> Result<i64> {
        match self.number("get_int")? {
            Number::Int(value) => i64::try_from(value).map_err(|_| overflow(value, "i64")),
            Number::Float(value) => {
                Ok(truncate(value, i128::from(i64::MIN), i128::from(i64::MAX), "i64")? as i64)
            }
        }
    }

    pub fn get_uint(&self) -> Result<u64> {
        match self.number("get_uint")? {
            Number::Int(value) => u64::try_from(value).map_err(|_| overflow(value, "u64")),
            Number::Float(value) => Ok(truncate(value, 0, i128::from(u64::MAX), "u64")? as u64),
        }
    }

    pub fn get_float(&self) -> Result<f64> {
        let (leaf, address) = self.leaf("get_float")?;
        let memory = self.memory();
        match leaf {
            Leaf::Primitive(PrimitiveKind::F32) => Ok(f64::from(memory.read_f32(address)?)),
            Leaf::Primitive(PrimitiveKind::F64) => memory.read_f64(address),
            Leaf::Primitive(kind) if kind.is_integer() => {
                Ok(read_integer(memory, kind, address)? as f64)
            }
            other => Err(mismatch("get_float", other)),
        }
    }

    /// String contents (`None` for a null string) or enum constant name
    /// (`None` for an unnamed value)
    pub fn get_string(&self) -> Result<Option<&str>> {
        let (leaf, address) = self.leaf("get_string")?;
        match leaf {
            Leaf::Primitive(PrimitiveKind::String) => self.memory().read_string(address),
            Leaf::Enum(constants) => Ok(constants.name_of(self.memory().read_i32(address)?)),
            other => Err(mismatch("get_string", other)),
        }
    }

    pub fn get_entity(&self) -> Result<EntityId> {
        let (leaf, address) = self.leaf("get_entity")?;
        match leaf {
            Leaf::Primitive(PrimitiveKind::Entity) => self.memory().read_u64(address),
            other => Err(mismatch("get_entity", other)),
        }
    }
}

impl<'p, M: BorrowMut<Memory>> Cursor<'p, M> {
    // ========== Setters ==========

    pub fn set_bool(&mut self, value: bool) -> Result<()> {
        let (leaf, address) = self.leaf("set_bool")?;
        match leaf {
            Leaf::Primitive(kind) if kind == PrimitiveKind::Bool || kind.is_integer() => {
                write_integer(self.memory_mut(), kind, address, i128::from(value))
            }
            other => Err(mismatch("set_bool", other)),
        }
    }

    pub fn set_char(&mut self, value: char) -> Result<()> {
        let (leaf, address) = self.leaf("set_char")?;
        match leaf {
            Leaf::Primitive(kind) if kind == PrimitiveKind::Char || kind.is_integer() => {
                write_integer(self.memory_mut(), kind, address, i128::from(u32::from(value)))
            }
            Leaf::Primitive(PrimitiveKind::String) => {
                let mut buffer = [0u8; 4];
                let text: &str = value.encode_utf8(&mut buffer);
                self.memory_mut().write_string(address, Some(text))
            }
            other => Err(mismatch("set_char", other)),
        }
    }

    pub fn set_int(&mut self, value: i64) -> Result<()> {
        self.set_integer("set_int", i128::from(value))
    }

    pub fn set_uint(&mut self, value: u64) -> Result<()> {
        self.set_integer("set_uint", i128::from(value))
    }

    fn set_integer(&mut self, access: &'static str, value: i128) -> Result<()> {
        let (leaf, address) = self.leaf(access)?;
        let memory = self.memory_mut();
        match leaf {
            Leaf::Primitive(kind) if kind.is_float() => write_float(memory, kind, address, value as f64),
            Leaf::Primitive(kind) if kind.int_range().is_some() => {
                write_integer(memory, kind, address, value)
            }
            Leaf::Enum(_) => write_integer(memory, PrimitiveKind::I32, address, value),
            Leaf::Bitmask(_) => write_integer(memory, PrimitiveKind::U32, address, value),
            other => Err(mismatch(access, other)),
        }
    }

    pub fn set_float(&mut self, value: f64) -> Result<()> {
        let (leaf, address) = self.leaf("set_float")?;
        let memory = self.memory_mut();
        match leaf {
            Leaf::Primitive(kind) if kind.is_float() => write_float(memory, kind, address, value),
            Leaf::Primitive(kind) if kind.is_integer() => {
                let (min, max) = kind
                    .int_range()
                    .ok_or_else(|| mismatch("set_float", kind))?;
                let truncated = truncate(value, min, max, kind)?;
                write_integer(memory, kind, address, truncated)
            }
            other => Err(mismatch("set_float", other)),
        }
    }

    /// Store text, parsing it for non-string targets
    pub fn set_string(&mut self, text: &str) -> Result<()> {
        let (leaf, address) = self.leaf("set_string")?;
        let memory = self.memory_mut();
        match leaf {
            Leaf::Primitive(PrimitiveKind::String) => memory.write_string(address, Some(text)),
            Leaf::Primitive(PrimitiveKind::Char) => {
                if text.is_empty() {
                    return Err(invalid_literal(text, PrimitiveKind::Char));
                }
                let mut chars = text.chars();
                let value = unescape_char(&mut chars)?;
                if !chars.as_str().is_empty() {
                    return Err(invalid_literal(text, PrimitiveKind::Char));
                }
                write_integer(memory, PrimitiveKind::Char, address, i128::from(u32::from(value)))
            }
            Leaf::Primitive(PrimitiveKind::Bool) => {
                let value = match text.trim() {
                    "true" => 1,
                    "false" => 0,
                    _ => return Err(invalid_literal(text, PrimitiveKind::Bool)),
                };
                write_integer(memory, PrimitiveKind::Bool, address, value)
            }
            Leaf::Primitive(kind) if kind.is_integer() => {
                let value: i128 = text
                    .trim()
                    .parse()
                    .map_err(|_| invalid_literal(text, kind))?;
                write_integer(memory, kind, address, value)
            }
            Leaf::Primitive(kind) if kind.is_float() => {
                let value: f64 = text
                    .trim()
                    .parse()
                    .map_err(|_| invalid_literal(text, kind))?;
                write_float(memory, kind, address, value)
            }
            Leaf::Enum(constants) => {
                let name = text.trim();
                let value = constants
                    .value_of(name)
                    .ok_or_else(|| CursorError::UnknownConstant(name.to_string()))?;
                memory.write_i32(address, value)
            }
            Leaf::Bitmask(constants) => {
                let bits = parse_bitmask(constants, text)?;
                memory.write_u32(address, bits)
            }
            other => Err(mismatch("set_string", other)),
        }
    }

    pub fn set_entity(&mut self, entity: EntityId) -> Result<()> {
        let (leaf, address) = self.leaf("set_entity")?;
        match leaf {
            Leaf::Primitive(PrimitiveKind::Entity) => self.memory_mut().write_u64(address, entity),
            other => Err(mismatch("set_entity", other)),
        }
    }
}
