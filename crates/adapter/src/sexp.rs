//! S-expression encoding and decoding.
//!
//! Encoding is a `serde` serializer, so wire messages are plain structs with
//! `#[derive(Serialize)]`. The mapping is:
//!
//! | Rust | Emitted |
//! |------|---------|
//! | named struct `tag { a, b }` | `(tag :a A :b B)` |
//! | tuple struct `tag(a, b)` | `(tag A B)` |
//! | newtype struct `tag(a)` | `(tag A)` |
//! | tuple, sequence | `(A B ...)` |
//! | `None`, `()` | `nil` |
//! | `bool` | `t` / `nil` |
//! | integers | decimal |
//! | `str`, `char` | `"..."` |
//!
//! Maps are not supported; the wire format has no use for them.
//!
//! Decoding ([`parse`]) reads the same subset back into a [`Value`] tree. It
//! is what a front-end uses to consume bridge output.

use std::fmt::Display;
use std::io::{self, Write};

use serde::ser::{self, Impossible, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum SexpError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Message(String),

    #[error("{0} cannot be written as an s-expression")]
    Unsupported(&'static str),

    #[error("parse error at byte {at}: {reason}")]
    Parse { at: usize, reason: &'static str },

    #[error("malformed {0} message")]
    Malformed(&'static str),
}

impl ser::Error for SexpError {
    fn custom<T: Display>(msg: T) -> Self {
        SexpError::Message(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SexpError>;

/// How string contents are written between the double quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringStyle {
    /// Backslash-escape `"` and `\`; write control characters as `\n`,
    /// `\t`, `\r` or three-digit octal. Output is readable by a Lisp reader
    /// and never spans lines.
    #[default]
    Escaped,
    /// Write contents verbatim. A quote inside a name or description makes
    /// the message ambiguous.
    Raw,
}

/// Serialize `value` into `writer`.
pub fn to_writer<W, T>(writer: W, value: &T, style: StringStyle) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let mut ser = Serializer::with_style(writer, style);
    value.serialize(&mut ser)
}

/// Serialize `value` into a new string.
pub fn to_string<T: ?Sized + Serialize>(value: &T, style: StringStyle) -> Result<String> {
    let mut buf = Vec::with_capacity(128);
    to_writer(&mut buf, value, style)?;
    String::from_utf8(buf).map_err(|e| SexpError::Message(e.to_string()))
}

/// Write `s` as a double-quoted string literal.
pub fn write_quoted<W: io::Write>(w: &mut W, s: &str, style: StringStyle) -> io::Result<()> {
    w.write_all(b"\"")?;
    match style {
        StringStyle::Raw => w.write_all(s.as_bytes())?,
        StringStyle::Escaped => {
            // Every byte that needs escaping is ASCII, so slicing at these
            // offsets never splits a UTF-8 sequence.
            let bytes = s.as_bytes();
            let mut start = 0;
            for (i, &b) in bytes.iter().enumerate() {
                let escape: &[u8] = match b {
                    b'"' => b"\\\"",
                    b'\\' => b"\\\\",
                    b'\n' => b"\\n",
                    b'\t' => b"\\t",
                    b'\r' => b"\\r",
                    0x00..=0x1f | 0x7f => b"",
                    _ => continue,
                };
                w.write_all(&bytes[start..i])?;
                if escape.is_empty() {
                    write!(w, "\\{:03o}", b)?;
                } else {
                    w.write_all(escape)?;
                }
                start = i + 1;
            }
            w.write_all(&bytes[start..])?;
        }
    }
    w.write_all(b"\"")
}

pub struct Serializer<W> {
    writer: W,
    style: StringStyle,
}

impl<W: io::Write> Serializer<W> {
    pub fn new(writer: W) -> Self {
        Self::with_style(writer, StringStyle::default())
    }

    pub fn with_style(writer: W, style: StringStyle) -> Self {
        Self { writer, style }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn raw(&mut self, s: &str) -> Result<()> {
        self.writer.write_all(s.as_bytes())?;
        Ok(())
    }

    fn display(&mut self, v: impl Display) -> Result<()> {
        write!(self.writer, "{}", v)?;
        Ok(())
    }

    fn open(&mut self, tag: Option<&str>) -> Result<Compound<'_, W>> {
        self.raw("(")?;
        let first = match tag {
            Some(tag) => {
                self.raw(tag)?;
                false
            }
            None => true,
        };
        Ok(Compound { ser: self, first })
    }
}

/// Open list being written; tracks whether a separator is needed.
pub struct Compound<'a, W> {
    ser: &'a mut Serializer<W>,
    first: bool,
}

impl<W: io::Write> Compound<'_, W> {
    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        if !self.first {
            self.ser.raw(" ")?;
        }
        self.first = false;
        value.serialize(&mut *self.ser)
    }

    fn keyword<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        if !self.first {
            self.ser.raw(" ")?;
        }
        self.first = false;
        self.ser.raw(":")?;
        self.ser.raw(key)?;
        self.ser.raw(" ")?;
        value.serialize(&mut *self.ser)
    }

    fn close(self) -> Result<()> {
        self.ser.raw(")")
    }
}

impl<'a, W: io::Write> ser::Serializer for &'a mut Serializer<W> {
    type Ok = ();
    type Error = SexpError;

    type SerializeSeq = Compound<'a, W>;
    type SerializeTuple = Compound<'a, W>;
    type SerializeTupleStruct = Compound<'a, W>;
    type SerializeTupleVariant = Compound<'a, W>;
    type SerializeMap = Impossible<(), SexpError>;
    type SerializeStruct = Compound<'a, W>;
    type SerializeStructVariant = Compound<'a, W>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.raw(if v { "t" } else { "nil" })
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.display(v)
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.display(v)
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.display(v)
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.display(v)
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.display(v)
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.display(v)
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.display(v)
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.display(v)
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        if !v.is_finite() {
            return Err(SexpError::Unsupported("non-finite float"));
        }
        // Debug keeps the fractional part ("1.0"), so the reader sees a float.
        write!(self.writer, "{:?}", v)?;
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        write_quoted(&mut self.writer, v, self.style)?;
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        let mut list = self.open(None)?;
        for b in v {
            list.element(b)?;
        }
        list.close()
    }

    fn serialize_none(self) -> Result<()> {
        self.raw("nil")
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.raw("nil")
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<()> {
        self.raw(name)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.raw(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<()> {
        let mut list = self.open(Some(name))?;
        list.element(value)?;
        list.close()
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()> {
        let mut list = self.open(Some(variant))?;
        list.element(value)?;
        list.close()
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        self.open(None)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        self.open(None)
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        self.open(Some(name))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        self.open(Some(variant))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(SexpError::Unsupported("map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.open(Some(name))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        self.open(Some(variant))
    }
}

impl<W: io::Write> ser::SerializeSeq for Compound<'_, W> {
    type Ok = ();
    type Error = SexpError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl<W: io::Write> ser::SerializeTuple for Compound<'_, W> {
    type Ok = ();
    type Error = SexpError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl<W: io::Write> ser::SerializeTupleStruct for Compound<'_, W> {
    type Ok = ();
    type Error = SexpError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl<W: io::Write> ser::SerializeTupleVariant for Compound<'_, W> {
    type Ok = ();
    type Error = SexpError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl<W: io::Write> ser::SerializeStruct for Compound<'_, W> {
    type Ok = ();
    type Error = SexpError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.keyword(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl<W: io::Write> ser::SerializeStructVariant for Compound<'_, W> {
    type Ok = ();
    type Error = SexpError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.keyword(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

// ============== Decoding ==============

/// A parsed s-expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i64),
    Str(String),
    /// Bare symbol, including keywords (`:hp`) and `nil`/`t`.
    Symbol(String),
    List(Vec<Value>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// List contents; `nil` reads as the empty list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Symbol(s) if s == "nil" => Some(&[][..]),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        match self {
            Value::Symbol(s) => s == "nil",
            Value::List(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Deepest list nesting [`parse`] accepts.
pub const MAX_DEPTH: usize = 64;

/// Parse exactly one s-expression from `input`.
///
/// Lists nested deeper than [`MAX_DEPTH`] are rejected.
pub fn parse(input: &str) -> Result<Value> {
    let mut p = Parser {
        input,
        pos: 0,
        depth: 0,
    };
    let value = p.value()?;
    p.skip_ws();
    if p.pos < input.len() {
        return Err(p.error("trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: &'static str) -> SexpError {
        SexpError::Parse {
            at: self.pos,
            reason,
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Value> {
        self.skip_ws();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('(') => {
                if self.depth == MAX_DEPTH {
                    return Err(self.error("nesting too deep"));
                }
                self.bump();
                self.depth += 1;
                let list = self.list();
                self.depth -= 1;
                list
            }
            Some(')') => Err(self.error("unexpected ')'")),
            Some('"') => {
                self.bump();
                self.string()
            }
            Some(_) => Ok(self.atom()),
        }
    }

    fn list(&mut self) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error("unclosed list")),
                Some(')') => {
                    self.bump();
                    return Ok(Value::List(items));
                }
                Some(_) => items.push(self.value()?),
            }
        }
    }

    fn string(&mut self) -> Result<Value> {
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unclosed string")),
                Some('"') => return Ok(Value::Str(out)),
                Some('\\') => match self.bump() {
                    None => return Err(self.error("unclosed string")),
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some(d @ '0'..='7') => {
                        let mut code = d as u32 - '0' as u32;
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d @ '0'..='7') => {
                                    self.bump();
                                    code = code * 8 + (d as u32 - '0' as u32);
                                }
                                _ => break,
                            }
                        }
                        out.push(char::from_u32(code).ok_or_else(|| self.error("bad escape"))?);
                    }
                    Some(c) => out.push(c),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn atom(&mut self) -> Value {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != '(' && c != ')' && c != '"')
        {
            self.bump();
        }
        let text = &self.input[start..self.pos];
        match text.parse::<i64>() {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Symbol(text.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    #[serde(rename = "sample")]
    struct Sample {
        count: i32,
        pair: (u8, u8),
        flag: bool,
        missing: Option<i32>,
        label: &'static str,
    }

    #[derive(Serialize)]
    #[serde(rename = "row")]
    struct Row(u16, Vec<char>);

    #[test]
    fn named_struct_becomes_keyword_list() {
        let p = Sample {
            count: -3,
            pair: (1, 2),
            flag: true,
            missing: None,
            label: "x",
        };
        assert_eq!(
            to_string(&p, StringStyle::Escaped).unwrap(),
            r#"(sample :count -3 :pair (1 2) :flag t :missing nil :label "x")"#
        );
    }

    #[test]
    fn tuple_struct_becomes_positional_list() {
        let r = Row(2, vec!['a', '#']);
        assert_eq!(
            to_string(&r, StringStyle::Escaped).unwrap(),
            r##"(row 2 ("a" "#"))"##
        );
        let empty = Row(0, Vec::new());
        assert_eq!(to_string(&empty, StringStyle::Escaped).unwrap(), "(row 0 ())");
    }

    #[test]
    fn escaped_strings_stay_on_one_line() {
        let s = to_string("say \"hi\"\\\n\x01", StringStyle::Escaped).unwrap();
        assert_eq!(s, r#""say \"hi\"\\\n\001""#);
        assert!(!s.contains('\n'));
    }

    #[test]
    fn raw_strings_are_verbatim() {
        let s = to_string("a \"b\"", StringStyle::Raw).unwrap();
        assert_eq!(s, "\"a \"b\"\"");
    }

    #[test]
    fn maps_are_rejected() {
        let mut m = std::collections::BTreeMap::new();
        m.insert("k", 1);
        assert!(matches!(
            to_string(&m, StringStyle::Escaped),
            Err(SexpError::Unsupported("map"))
        ));
    }

    #[test]
    fn floats_keep_a_fraction() {
        assert_eq!(to_string(&1.0f64, StringStyle::Escaped).unwrap(), "1.0");
        assert!(to_string(&f64::NAN, StringStyle::Escaped).is_err());
    }

    #[test]
    fn parse_reads_nested_lists() {
        let v = parse(r#"(map 2 1 (("." 1) ("@" 1)))"#).unwrap();
        let items = v.as_list().unwrap();
        assert_eq!(items[0].as_symbol(), Some("map"));
        assert_eq!(items[1].as_int(), Some(2));
        let cells = items[3].as_list().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[1].as_list().unwrap()[0].as_str(), Some("@"));
    }

    #[test]
    fn parse_undoes_escaping() {
        let original = "a \"quoted\" \\ name\twith\ncontrols\x07";
        let encoded = to_string(original, StringStyle::Escaped).unwrap();
        assert_eq!(parse(&encoded).unwrap(), Value::Str(original.to_string()));
    }

    #[test]
    fn parse_treats_nil_as_empty_list() {
        let v = parse("nil").unwrap();
        assert!(v.is_nil());
        assert_eq!(v.as_list(), Some(&[][..]));
    }

    #[test]
    fn parse_reports_errors_with_position() {
        assert!(matches!(parse("(a b"), Err(SexpError::Parse { reason: "unclosed list", .. })));
        assert!(matches!(parse(")"), Err(SexpError::Parse { at: 0, .. })));
        assert!(matches!(parse("a b"), Err(SexpError::Parse { reason: "trailing input", .. })));
        assert!(matches!(parse("\"abc"), Err(SexpError::Parse { reason: "unclosed string", .. })));
    }

    #[test]
    fn parse_limits_nesting() {
        let nested = |n: usize| "(".repeat(n) + &")".repeat(n);

        assert!(parse(&nested(MAX_DEPTH)).is_ok());
        assert!(matches!(
            parse(&nested(MAX_DEPTH + 1)),
            Err(SexpError::Parse { at, reason: "nesting too deep" }) if at == MAX_DEPTH
        ));
        assert!(matches!(
            parse(&nested(200_000)),
            Err(SexpError::Parse { reason: "nesting too deep", .. })
        ));
    }
}
