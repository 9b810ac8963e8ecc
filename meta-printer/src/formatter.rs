//! # Value Formatting
//!
//! Renders a value by walking it with a read-only cursor.
//!
//! | Value    | Output                          |
//! |----------|---------------------------------|
//! | struct   | `{x: 1, y: 2}`                  |
//! | array    | `[1, 2, 3]`                     |
//! | list     | `[1, 2, 3]`                     |
//! | map      | `{1: "one", 2: "two"}`          |
//! | bool     | `true`                          |
//! | float    | `0.25`, `1e300`, `NaN`, `inf`   |
//! | char     | `'a'`                           |
//! | string   | `"hi"`, or `null`               |
//! | enum     | `Red`, or the value if unnamed  |
//! | bitmask  | `A \| B`, `0`, `A \| 0x10`      |
//! | entity   | display name, or the id         |

use crate::error::Result;
use meta_cursor::{Address, Cursor, CursorError, Memory, ScopeKind};
use meta_spec::{escape_char, escape_string, Constants, EntityId, OpKind, PrimitiveKind, Program};
use std::fmt::{self, Write};

/// Resolves entity ids to display names
pub trait DisplayNames {
    fn display_name(&self, entity: EntityId) -> Option<String>;
}

/// Resolves nothing; entities print as their id
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNames;

impl DisplayNames for NoNames {
    fn display_name(&self, _entity: EntityId) -> Option<String> {
        None
    }
}

impl<F> DisplayNames for F
where
    F: Fn(EntityId) -> Option<String>,
{
    fn display_name(&self, entity: EntityId) -> Option<String> {
        self(entity)
    }
}

/// Render the value at `base`
pub fn render(program: &Program, memory: &Memory, base: Address) -> Result<String> {
    render_with(program, memory, base, &NoNames)
}

/// Render the value at `base`, naming entities through `names`
pub fn render_with<N>(program: &Program, memory: &Memory, base: Address, names: &N) -> Result<String>
where
    N: DisplayNames + ?Sized,
{
    let mut cursor = Cursor::open(program, memory, base)?;
    let mut printer = Printer {
        names,
        out: String::new(),
    };

    if cursor.scope_kind() == ScopeKind::Value {
        cursor.advance();
        printer.value(&mut cursor)?;
    } else {
        printer.scope(&mut cursor)?;
    }
    Ok(printer.out)
}

/// Format bitmask bits as `A | B`, with unnamed bits in hex
pub fn format_bitmask(constants: &Constants, bits: u32) -> String {
    if bits == 0 {
        return "0".to_string();
    }

    let mut parts = Vec::new();
    let mut remaining = bits;
    for (value, name) in constants.iter() {
        let value = value as u32;
        if value != 0 && bits & value == value {
            parts.push(name.to_string());
            remaining &= !value;
        }
    }
    if remaining != 0 {
        parts.push(format!("{:#x}", remaining));
    }
    parts.join(" | ")
}

/// Shortest round-trippable text for a float
///
/// Plain decimal unless scientific notation is strictly shorter, so `1e300`
/// and `1.5e-7` stay compact while `0.25` and `100` print as written.
/// Non-finite values print as `NaN`, `inf` and `-inf`.
pub fn format_float<T: fmt::Display + fmt::LowerExp>(value: T) -> String {
    let plain = value.to_string();
    let scientific = format!("{:e}", value);
    if scientific.len() < plain.len() {
        scientific
    } else {
        plain
    }
}

struct Printer<'n, N: ?Sized> {
    names: &'n N,
    out: String,
}

impl<N: DisplayNames + ?Sized> Printer<'_, N> {
    /// Print every element of the cursor's current scope
    fn scope(&mut self, cursor: &mut Cursor<'_, &Memory>) -> Result<()> {
        let kind = cursor.scope_kind();
        let (open, close) = match kind {
            ScopeKind::Struct | ScopeKind::Map => ('{', '}'),
            _ => ('[', ']'),
        };

        self.out.push(open);
        let mut more = cursor.advance();
        let mut first = true;
        while more {
            if !first {
                self.out.push_str(", ");
            }
            first = false;

            more = match kind {
                ScopeKind::Struct => {
                    write!(self.out, "{}: ", cursor.field_name().unwrap_or_default())?;
                    self.value(cursor)?
                }
                ScopeKind::Map => {
                    self.value(cursor)?;
                    self.out.push_str(": ");
                    self.value(cursor)?
                }
                _ => self.value(cursor)?,
            };
        }
        self.out.push(close);
        Ok(())
    }

    /// Print the selected value and step past it; false once the scope is done
    fn value(&mut self, cursor: &mut Cursor<'_, &Memory>) -> Result<bool> {
        if cursor.is_enterable() {
            cursor.enter()?;
            self.scope(cursor)?;
            cursor.exit()?;
            return Ok(!cursor.is_done());
        }

        let op = cursor.current_op().ok_or(CursorError::NothingSelected)?;
        match &op.kind {
            OpKind::Primitive(kind) => self.primitive(cursor, *kind)?,
            OpKind::Enum(_) => match cursor.get_string()? {
                Some(name) => self.out.push_str(name),
                None => write!(self.out, "{}", cursor.get_int()?)?,
            },
            OpKind::Bitmask(constants) => {
                let bits = cursor.get_uint()? as u32;
                self.out.push_str(&format_bitmask(constants, bits));
            }
            _ => return Err(CursorError::NotEnterable(op.code()).into()),
        }
        Ok(cursor.advance())
    }

    fn primitive(&mut self, cursor: &Cursor<'_, &Memory>, kind: PrimitiveKind) -> Result<()> {
        match kind {
            PrimitiveKind::Bool => write!(self.out, "{}", cursor.get_bool()?)?,
            PrimitiveKind::Char => {
                write!(self.out, "'{}'", escape_char(cursor.get_char()?, '\''))?
            }
            PrimitiveKind::F32 => self.out.push_str(&format_float(cursor.get_float()? as f32)),
            PrimitiveKind::F64 => self.out.push_str(&format_float(cursor.get_float()?)),
            PrimitiveKind::String => match cursor.get_string()? {
                Some(text) => write!(self.out, "\"{}\"", escape_string(text, '"'))?,
                None => self.out.push_str("null"),
            },
            PrimitiveKind::Entity => {
                let entity = cursor.get_entity()?;
                match self.names.display_name(entity) {
                    Some(name) => self.out.push_str(&name),
                    None => write!(self.out, "{}", entity)?,
                }
            }
            kind if kind.is_signed() => write!(self.out, "{}", cursor.get_int()?)?,
            _ => write!(self.out, "{}", cursor.get_uint()?)?,
        }
        Ok(())
    }
}
