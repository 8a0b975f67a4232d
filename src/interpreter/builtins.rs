//! Built-in function implementations
//!
//! This module provides the implementation of C library functions that are
//! directly handled by the interpreter rather than being defined in user code.
//! A user function with the same name takes precedence.
//!
//! # Supported Built-ins
//!
//! - `printf(format, ...)`, `puts(s)`, `putchar(c)`: output to the capture buffer
//! - `malloc(size)`, `calloc(count, size)`, `free(ptr)`: heap management
//! - `strlen`, `strcpy`, `strcmp`: C strings
//! - `abs(n)`
//! - `assert(cond)`: fails the run; a string literal inside the condition
//!   (`assert(age >= 0 && "age must be positive")`) becomes the message
//! - `exit(status)`: ends the program successfully, keeping its output
//!
//! # Implementation Notes
//!
//! - `printf` supports `%d %i %u %x %X %c %s %p %%` with `-` and `0` flags and
//!   a field width; the format may be any `char *`, not only a literal
//! - `malloc` returns uninitialized memory; reading it before writing is an error

use crate::interpreter::constants::MAX_PRINTF_WIDTH;
use crate::interpreter::engine::{Interpreter, Typed};
use crate::interpreter::errors::{AtLocation, RuntimeError};
use crate::memory::arena::Region;
use crate::memory::value::{Address, Value};
use crate::parser::ast::{AstNode, SourceLocation, Type};

const BUILTINS: &[&str] = &[
    "printf", "puts", "putchar", "malloc", "calloc", "free", "strlen", "strcpy", "strcmp", "abs",
    "assert", "exit",
];

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(&name)
}

/// Declared return type of a built-in
pub(crate) fn builtin_return_type(name: &str) -> Option<Type> {
    match name {
        "malloc" | "calloc" => Some(Type::void().with_pointer()),
        "strcpy" => Some(Type::char().with_pointer()),
        "free" | "assert" | "exit" => Some(Type::void()),
        _ if is_builtin(name) => Some(Type::int()),
        _ => None,
    }
}

/// Parsed `%[flags][width]conv` directive
#[derive(Debug, Default, Clone, Copy)]
struct FormatSpec {
    left_align: bool,
    zero_pad: bool,
    width: usize,
}

impl FormatSpec {
    /// Pad to the field width; C counts the width in bytes
    fn pad(&self, text: Vec<u8>, numeric: bool) -> Vec<u8> {
        if text.len() >= self.width {
            return text;
        }
        let fill = self.width - text.len();
        let mut padded = Vec::with_capacity(self.width);
        if self.left_align {
            padded.extend_from_slice(&text);
            padded.resize(self.width, b' ');
        } else if self.zero_pad && numeric {
            let digits = match text.strip_prefix(b"-") {
                Some(digits) => {
                    padded.push(b'-');
                    digits
                }
                None => &text[..],
            };
            padded.resize(padded.len() + fill, b'0');
            padded.extend_from_slice(digits);
        } else {
            padded.resize(fill, b' ');
            padded.extend_from_slice(&text);
        }
        padded
    }
}

impl Interpreter<'_> {
    pub(crate) fn call_builtin(&mut self, name: &str, args: &[AstNode], location: SourceLocation) -> Result<Typed, RuntimeError> {
        // assert inspects its argument's source, not just its value
        if name == "assert" {
            let [condition] = args else {
                return Err(arity_error(name, 1, args.len(), location));
            };
            return self.builtin_assert(condition, location);
        }

        let values = self.eval_args(args)?;
        match name {
            "printf" => self.builtin_printf(values, location),

            "puts" => {
                let [text] = expect_args(name, values, location)?;
                let mut bytes = self.read_c_string(&text, location)?;
                bytes.push(b'\n');
                self.out.write_bytes(&bytes);
                Ok(Typed::int(0))
            }

            "putchar" => {
                let [c] = expect_args(name, values, location)?;
                let c = self.integer(c, location)?;
                self.out.put_byte(c as u8);
                Ok(Typed::int(c))
            }

            "malloc" => {
                let [size] = expect_args(name, values, location)?;
                let size = self.allocation_size(size, location)?;
                let id = self.memory.allocate(size, Region::Heap, "").at(location)?;
                Ok(Typed::new(
                    Value::Pointer(Address::new(id, 0)),
                    Type::void().with_pointer(),
                ))
            }

            "calloc" => {
                let [count, size] = expect_args(name, values, location)?;
                let count = self.allocation_size(count, location)?;
                let size = self.allocation_size(size, location)?;
                let total = count.checked_mul(size).ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: format!("calloc({}, {})", count, size),
                    location,
                })?;
                let id = self.memory.allocate(total, Region::Heap, "").at(location)?;
                let address = Address::new(id, 0);
                self.memory
                    .write_range(address, vec![Value::Char(0); total])
                    .at(location)?;
                Ok(Typed::new(Value::Pointer(address), Type::void().with_pointer()))
            }

            "free" => {
                let [pointer] = expect_args(name, values, location)?;
                match pointer.value {
                    // free(NULL) is a no-op
                    Value::Null => {}
                    Value::Pointer(address) => self.memory.free(address).at(location)?,
                    _ => return Err(RuntimeError::type_error("pointer", pointer.ty.to_string(), location)),
                }
                Ok(Typed::void())
            }

            "strlen" => {
                let [text] = expect_args(name, values, location)?;
                let len = self.read_c_string(&text, location)?.len();
                Ok(Typed::int(len as i32))
            }

            "strcpy" => {
                let [dest, src] = expect_args(name, values, location)?;
                let bytes = self.read_c_string(&src, location)?;
                let address = self.string_address(&dest, location)?;
                let cells = bytes
                    .iter()
                    .map(|&b| Value::Char(b as i8))
                    .chain(std::iter::once(Value::Char(0)))
                    .collect();
                self.memory.write_range(address, cells).at(location)?;
                Ok(dest)
            }

            "strcmp" => {
                let [a, b] = expect_args(name, values, location)?;
                let a = self.read_c_string(&a, location)?;
                let b = self.read_c_string(&b, location)?;
                Ok(Typed::int(a.cmp(&b) as i32))
            }

            "abs" => {
                let [n] = expect_args(name, values, location)?;
                let n = self.integer(n, location)?;
                n.checked_abs()
                    .map(Typed::int)
                    .ok_or_else(|| RuntimeError::IntegerOverflow {
                        operation: format!("abs({})", n),
                        location,
                    })
            }

            "exit" => {
                let [code] = expect_args(name, values, location)?;
                let code = self.integer(code, location)?;
                Err(RuntimeError::Exit { code })
            }

            _ => Err(RuntimeError::UndefinedFunction {
                name: name.to_string(),
                location,
            }),
        }
    }

    fn builtin_assert(&mut self, condition: &AstNode, location: SourceLocation) -> Result<Typed, RuntimeError> {
        if self.condition(condition)? {
            return Ok(Typed::void());
        }
        let message = assertion_message(condition).unwrap_or("condition is false").to_string();
        Err(RuntimeError::AssertionFailed { message, location })
    }

    fn builtin_printf(&mut self, values: Vec<Typed>, location: SourceLocation) -> Result<Typed, RuntimeError> {
        let mut values = values.into_iter();
        let format = values.next().ok_or_else(|| arity_error("printf", 1, 0, location))?;
        let format = self.read_c_string(&format, location)?;

        let invalid = |message: String| RuntimeError::InvalidPrintfFormat { message, location };

        let mut rendered: Vec<u8> = Vec::with_capacity(format.len());
        let mut bytes = format.iter().copied().peekable();

        while let Some(byte) = bytes.next() {
            if byte != b'%' {
                rendered.push(byte);
                continue;
            }

            let mut spec = FormatSpec::default();
            while let Some(&flag) = bytes.peek() {
                match flag {
                    b'-' => spec.left_align = true,
                    b'0' => spec.zero_pad = true,
                    _ => break,
                }
                bytes.next();
            }
            while let Some(&digit) = bytes.peek() {
                if !digit.is_ascii_digit() {
                    break;
                }
                spec.width = spec
                    .width
                    .checked_mul(10)
                    .and_then(|width| width.checked_add((digit - b'0') as usize))
                    .filter(|&width| width <= MAX_PRINTF_WIDTH)
                    .ok_or_else(|| invalid(format!("field width is larger than {}", MAX_PRINTF_WIDTH)))?;
                bytes.next();
            }
            // Length modifiers change nothing for 32-bit ints
            while matches!(bytes.peek(), Some(b'l') | Some(b'h')) {
                bytes.next();
            }

            let conversion = bytes
                .next()
                .ok_or_else(|| invalid("format ends after '%'".to_string()))?;
            if conversion == b'%' {
                rendered.push(b'%');
                continue;
            }

            let conv = conversion as char;
            let arg = values
                .next()
                .ok_or_else(|| invalid(format!("missing argument for '%{}'", conv)))?;
            let as_int = |arg: &Typed| {
                arg.value
                    .as_int()
                    .ok_or_else(|| invalid(format!("'%{}' expects an integer, got {}", conv, arg.ty)))
            };

            let text = match conversion {
                b'd' | b'i' => spec.pad(as_int(&arg)?.to_string().into_bytes(), true),
                b'u' => spec.pad((as_int(&arg)? as u32).to_string().into_bytes(), true),
                b'x' => spec.pad(format!("{:x}", as_int(&arg)? as u32).into_bytes(), true),
                b'X' => spec.pad(format!("{:X}", as_int(&arg)? as u32).into_bytes(), true),
                b'c' => spec.pad(vec![as_int(&arg)? as u8], false),
                b's' => {
                    let text = match arg.value {
                        Value::Null => b"(null)".to_vec(),
                        _ => self.read_c_string(&arg, location)?,
                    };
                    spec.pad(text, false)
                }
                b'p' => {
                    let text = match arg.value {
                        Value::Null => "(nil)".to_string(),
                        Value::Pointer(address) => format!("0x{:x}", self.memory.numeric_address(address)),
                        _ => return Err(invalid(format!("'%p' expects a data pointer, got {}", arg.ty))),
                    };
                    spec.pad(text.into_bytes(), false)
                }
                _ => return Err(invalid(format!("unsupported conversion '%{}'", conv))),
            };
            rendered.extend_from_slice(&text);
        }

        self.out.write_bytes(&rendered);
        Ok(Typed::int(rendered.len() as i32))
    }

    /// Bytes of the NUL-terminated string `pointer` points at
    pub(crate) fn read_c_string(&self, pointer: &Typed, location: SourceLocation) -> Result<Vec<u8>, RuntimeError> {
        let start = self.string_address(pointer, location)?;
        let mut bytes = Vec::new();
        loop {
            let address = start.offset_by(bytes.len() as i64);
            match self.memory.read(address, 1).at(location)?.as_int() {
                Some(0) => return Ok(bytes),
                Some(byte) => bytes.push(byte as u8),
                None => {
                    return Err(RuntimeError::UninitializedRead {
                        what: self.describe(address),
                        location,
                    });
                }
            }
        }
    }

    fn string_address(&self, pointer: &Typed, location: SourceLocation) -> Result<Address, RuntimeError> {
        match pointer.value {
            Value::Pointer(address) => Ok(address),
            Value::Null => Err(RuntimeError::NullDereference { location }),
            _ => Err(RuntimeError::type_error("char *", pointer.ty.to_string(), location)),
        }
    }

    fn allocation_size(&self, size: Typed, location: SourceLocation) -> Result<usize, RuntimeError> {
        let size = self.integer(size, location)?;
        usize::try_from(size).map_err(|_| {
            RuntimeError::unsupported(format!("allocation of negative size {}", size), location)
        })
    }
}

/// Split evaluated arguments into a fixed-size array, checking the count
fn expect_args<const N: usize>(name: &str, values: Vec<Typed>, location: SourceLocation) -> Result<[Typed; N], RuntimeError> {
    values
        .try_into()
        .map_err(|values: Vec<Typed>| arity_error(name, N, values.len(), location))
}

fn arity_error(name: &str, expected: usize, got: usize, location: SourceLocation) -> RuntimeError {
    RuntimeError::ArgumentCountMismatch {
        function: name.to_string(),
        expected,
        got,
        location,
    }
}

/// First string literal inside an assert condition
fn assertion_message(node: &AstNode) -> Option<&str> {
    match node {
        AstNode::StringLiteral(text, _) => Some(text),
        AstNode::BinaryOp { left, right, .. } => assertion_message(left).or_else(|| assertion_message(right)),
        AstNode::UnaryOp { operand, .. } => assertion_message(operand),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding() {
        let spec = FormatSpec {
            width: 5,
            ..FormatSpec::default()
        };
        assert_eq!(spec.pad(b"42".to_vec(), true), b"   42");

        let left = FormatSpec {
            left_align: true,
            width: 4,
            ..FormatSpec::default()
        };
        assert_eq!(left.pad(b"ab".to_vec(), false), b"ab  ");

        let zero = FormatSpec {
            zero_pad: true,
            width: 5,
            ..FormatSpec::default()
        };
        assert_eq!(zero.pad(b"-42".to_vec(), true), b"-0042");
        assert_eq!(zero.pad(b"hi".to_vec(), false), b"   hi");
    }

    #[test]
    fn test_builtin_table() {
        assert!(is_builtin("printf"));
        assert!(!is_builtin("scanf"));
        assert_eq!(builtin_return_type("malloc"), Some(Type::void().with_pointer()));
        assert_eq!(builtin_return_type("strlen"), Some(Type::int()));
        assert_eq!(builtin_return_type("gets"), None);
    }
}
