// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

//! Reader and writer for the Lua tables DCS stores inside mission archives.
//!
//! Only the data subset DCS emits is supported: a single `name = { ... }`
//! assignment whose values are nil, booleans, numbers, strings and nested
//! tables. Key order is kept so a decoded mission re-encodes in place.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit0, digit1, multispace1, not_line_ending, one_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use std::fmt::Write as _;
use thiserror::Error;

const INDENT: &str = "    ";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LuaError {
    #[error("Lua parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LuaKey {
    Str(String),
    Int(i64),
}

impl From<&str> for LuaKey {
    fn from(s: &str) -> Self {
        LuaKey::Str(s.to_string())
    }
}

impl From<String> for LuaKey {
    fn from(s: String) -> Self {
        LuaKey::Str(s)
    }
}

impl From<i64> for LuaKey {
    fn from(i: i64) -> Self {
        LuaKey::Int(i)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LuaValue {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Table(LuaTable),
}

impl LuaValue {
    pub fn as_table(&self) -> Option<&LuaTable> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut LuaTable> {
        match self {
            LuaValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LuaValue::Int(i) => Some(*i as f64),
            LuaValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LuaValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LuaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for LuaValue {
    fn from(b: bool) -> Self {
        LuaValue::Bool(b)
    }
}

impl From<i64> for LuaValue {
    fn from(i: i64) -> Self {
        LuaValue::Int(i)
    }
}

impl From<f64> for LuaValue {
    fn from(f: f64) -> Self {
        LuaValue::Float(f)
    }
}

impl From<&str> for LuaValue {
    fn from(s: &str) -> Self {
        LuaValue::Str(s.to_string())
    }
}

impl From<String> for LuaValue {
    fn from(s: String) -> Self {
        LuaValue::Str(s)
    }
}

impl From<LuaTable> for LuaValue {
    fn from(t: LuaTable) -> Self {
        LuaValue::Table(t)
    }
}

/// Ordered Lua table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LuaTable {
    entries: Vec<(LuaKey, LuaValue)>,
}

impl LuaTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(LuaKey, LuaValue)> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&LuaValue> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, LuaKey::Str(s) if s == key))
            .map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut LuaValue> {
        self.entries
            .iter_mut()
            .find(|(k, _)| matches!(k, LuaKey::Str(s) if s == key))
            .map(|(_, v)| v)
    }

    pub fn get_index(&self, index: i64) -> Option<&LuaValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == LuaKey::Int(index))
            .map(|(_, v)| v)
    }

    /// Walks nested tables by string keys.
    pub fn get_path(&self, path: &[&str]) -> Option<&LuaValue> {
        let (last, parents) = path.split_last()?;
        let mut table = self;
        for key in parents {
            table = table.get(key)?.as_table()?;
        }
        table.get(last)
    }

    /// Returns the sub-table under `key`, creating it when missing or not a table.
    pub fn table_mut(&mut self, key: &str) -> &mut LuaTable {
        if !matches!(self.get(key), Some(LuaValue::Table(_))) {
            self.set(key, LuaTable::new());
        }
        match self.get_mut(key) {
            Some(LuaValue::Table(t)) => t,
            _ => unreachable!("table was inserted above"),
        }
    }

    /// Replaces the value in place when the key exists, appends otherwise.
    pub fn set(&mut self, key: impl Into<LuaKey>, value: impl Into<LuaValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<LuaValue> {
        let pos = self
            .entries
            .iter()
            .position(|(k, _)| matches!(k, LuaKey::Str(s) if s == key))?;
        Some(self.entries.remove(pos).1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LuaDocument {
    pub name: String,
    pub value: LuaValue,
}

impl LuaDocument {
    pub fn table(&self) -> Option<&LuaTable> {
        self.value.as_table()
    }

    pub fn table_mut(&mut self) -> Option<&mut LuaTable> {
        self.value.as_table_mut()
    }
}

pub fn decode(text: &str) -> Result<LuaDocument, LuaError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    match document(text) {
        Ok((rest, doc)) if rest.is_empty() => Ok(doc),
        Ok((rest, _)) => Err(parse_error(text, rest, "unexpected trailing content")),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(parse_error(text, e.input, &format!("{:?}", e.code)))
        }
        Err(nom::Err::Incomplete(_)) => Err(parse_error(text, "", "incomplete input")),
    }
}

pub fn encode(doc: &LuaDocument) -> String {
    let mut out = String::new();
    match &doc.value {
        LuaValue::Table(t) => {
            let _ = writeln!(out, "{} =", doc.name);
            write_table(&mut out, t, 0);
            let _ = writeln!(out, " -- end of {}", doc.name);
        }
        other => {
            let _ = write!(out, "{} = ", doc.name);
            write_scalar(&mut out, other);
            out.push('\n');
        }
    }
    out
}

fn parse_error(full: &str, rest: &str, message: &str) -> LuaError {
    let consumed = full.len().saturating_sub(rest.len());
    let line = full[..consumed].matches('\n').count() + 1;
    LuaError::Parse {
        line,
        message: message.to_string(),
    }
}

fn write_table(out: &mut String, table: &LuaTable, depth: usize) {
    let pad = INDENT.repeat(depth);
    let inner = INDENT.repeat(depth + 1);
    let _ = writeln!(out, "{}{{", pad);
    for (key, val) in table.iter() {
        let key = encode_key(key);
        match val {
            LuaValue::Table(t) => {
                let _ = writeln!(out, "{}{} =", inner, key);
                write_table(out, t, depth + 1);
                let _ = writeln!(out, ", -- end of {}", key);
            }
            other => {
                let _ = write!(out, "{}{} = ", inner, key);
                write_scalar(out, other);
                out.push_str(",\n");
            }
        }
    }
    let _ = write!(out, "{}}}", pad);
}

fn encode_key(key: &LuaKey) -> String {
    match key {
        LuaKey::Str(s) => format!("[\"{}\"]", escape(s)),
        LuaKey::Int(i) => format!("[{}]", i),
    }
}

fn write_scalar(out: &mut String, val: &LuaValue) {
    match val {
        LuaValue::Nil => out.push_str("nil"),
        LuaValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        LuaValue::Int(i) => {
            let _ = write!(out, "{}", i);
        }
        LuaValue::Float(f) if f.fract() == 0.0 && f.is_finite() => {
            let _ = write!(out, "{:.1}", f);
        }
        LuaValue::Float(f) => {
            let _ = write!(out, "{}", f);
        }
        LuaValue::Str(s) => {
            let _ = write!(out, "\"{}\"", escape(s));
        }
        LuaValue::Table(t) => write_table(out, t, 0),
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

fn comment(input: &str) -> IResult<&str, &str> {
    preceded(tag("--"), not_line_ending)(input)
}

fn ws(input: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, comment))))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

fn document(input: &str) -> IResult<&str, LuaDocument> {
    map(
        tuple((ws, identifier, ws, char('='), ws, lua_value, ws)),
        |(_, name, _, _, _, value, _)| LuaDocument {
            name: name.to_string(),
            value,
        },
    )(input)
}

fn lua_value(input: &str) -> IResult<&str, LuaValue> {
    alt((
        map(table, LuaValue::Table),
        map(string, LuaValue::Str),
        number,
        value(LuaValue::Bool(true), tag("true")),
        value(LuaValue::Bool(false), tag("false")),
        value(LuaValue::Nil, tag("nil")),
    ))(input)
}

fn number(input: &str) -> IResult<&str, LuaValue> {
    let (rest, text) = recognize(tuple((
        opt(char('-')),
        digit1,
        opt(pair(char('.'), digit0)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;
    let parsed = if text.contains(|c: char| matches!(c, '.' | 'e' | 'E')) {
        text.parse::<f64>().map(LuaValue::Float).ok()
    } else {
        text.parse::<i64>()
            .map(LuaValue::Int)
            .or_else(|_| text.parse::<f64>().map(LuaValue::Float))
            .ok()
    };
    match parsed {
        Some(v) => Ok((rest, v)),
        None => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Float,
        ))),
    }
}

fn string(input: &str) -> IResult<&str, String> {
    let body = input
        .strip_prefix('"')
        .ok_or_else(|| nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char)))?;

    let mut out = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((&body[i + 1..], out)),
            '\\' => match chars.next() {
                Some((_, 'n')) | Some((_, '\n')) => out.push('\n'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, 't')) => out.push('\t'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            c => out.push(c),
        }
    }
    Err(nom::Err::Failure(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Escaped,
    )))
}

fn key(input: &str) -> IResult<&str, LuaKey> {
    alt((
        delimited(
            pair(char('['), ws),
            alt((
                map(string, LuaKey::Str),
                map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| {
                    s.parse::<i64>().map(LuaKey::Int)
                }),
            )),
            pair(ws, char(']')),
        ),
        map(identifier, |s| LuaKey::Str(s.to_string())),
    ))(input)
}

enum Field {
    Keyed(LuaKey, LuaValue),
    Positional(LuaValue),
}

fn field(input: &str) -> IResult<&str, Field> {
    alt((
        map(
            tuple((key, ws, char('='), ws, lua_value)),
            |(k, _, _, _, v)| Field::Keyed(k, v),
        ),
        map(lua_value, Field::Positional),
    ))(input)
}

fn table(input: &str) -> IResult<&str, LuaTable> {
    let (mut input, _) = pair(char('{'), ws)(input)?;
    let mut table = LuaTable::new();
    let mut next_index = 1i64;

    loop {
        if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('}')(input) {
            return Ok((rest, table));
        }
        // past the opening brace a bad field is fatal, keep its position
        let (rest, f) = field(input).map_err(|e| match e {
            nom::Err::Error(e) => nom::Err::Failure(e),
            other => other,
        })?;
        match f {
            Field::Keyed(k, v) => table.entries.push((k, v)),
            Field::Positional(v) => {
                table.entries.push((LuaKey::Int(next_index), v));
                next_index += 1;
            }
        }
        let (rest, _) = ws(rest)?;
        let (rest, _) = opt(one_of(",;"))(rest)?;
        let (rest, _) = ws(rest)?;
        input = rest;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"mission =
{
    ["weather"] =
    {
        ["atmosphere_type"] = 0,
        ["wind"] =
        {
            ["atGround"] =
            {
                ["speed"] = 0,
                ["dir"] = 0,
            }, -- end of ["atGround"]
        }, -- end of ["wind"]
        ["enable_fog"] = false,
        ["name"] = "Winter, \"clean\" sky",
        ["qnh"] = 760,
        ["dust_density"] = 0.5,
    }, -- end of ["weather"]
    ["descriptionText"] = "line one\
line two",
    ["coalitions"] =
    {
        [1] = "blue",
        [2] = -3,
    }, -- end of ["coalitions"]
} -- end of mission
"#;

    #[test]
    fn test_decode_dcs_table() {
        let doc = decode(SAMPLE).unwrap();
        assert_eq!(doc.name, "mission");

        let root = doc.table().unwrap();
        assert_eq!(
            root.get_path(&["weather", "qnh"]).and_then(LuaValue::as_i64),
            Some(760)
        );
        assert_eq!(
            root.get_path(&["weather", "enable_fog"]),
            Some(&LuaValue::Bool(false))
        );
        assert_eq!(
            root.get_path(&["weather", "name"]).and_then(LuaValue::as_str),
            Some("Winter, \"clean\" sky")
        );
        assert_eq!(
            root.get_path(&["weather", "dust_density"]).and_then(LuaValue::as_f64),
            Some(0.5)
        );
        assert_eq!(
            root.get("descriptionText").and_then(LuaValue::as_str),
            Some("line one\nline two")
        );
        let coalitions = root.get("coalitions").and_then(LuaValue::as_table).unwrap();
        assert_eq!(coalitions.get_index(2), Some(&LuaValue::Int(-3)));
    }

    #[test]
    fn test_encode_is_stable() {
        let doc = decode(SAMPLE).unwrap();
        let encoded = encode(&doc);
        assert_eq!(encoded, SAMPLE);
        assert_eq!(decode(&encoded).unwrap(), doc);
    }

    #[test]
    fn test_set_keeps_order_and_appends() {
        let mut doc = decode(SAMPLE).unwrap();
        let weather = doc.table_mut().unwrap().table_mut("weather");
        weather.set("qnh", 745i64);
        weather.set("new_key", true);

        let keys: Vec<_> = weather.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys[4], LuaKey::from("qnh"));
        assert_eq!(keys.last(), Some(&LuaKey::from("new_key")));
        assert_eq!(weather.get("qnh"), Some(&LuaValue::Int(745)));

        assert!(weather.remove("new_key").is_some());
        assert!(weather.get("new_key").is_none());
    }

    #[test]
    fn test_positional_values_and_bare_keys() {
        let doc = decode("t = { 1, 2.5, \"x\"; name = nil }").unwrap();
        let t = doc.table().unwrap();
        assert_eq!(t.get_index(1), Some(&LuaValue::Int(1)));
        assert_eq!(t.get_index(2), Some(&LuaValue::Float(2.5)));
        assert_eq!(t.get_index(3), Some(&LuaValue::Str("x".into())));
        assert_eq!(t.get("name"), Some(&LuaValue::Nil));
    }

    #[test]
    fn test_decode_error_reports_line() {
        let err = decode("mission = \n{\n    [\"a\"] = ,\n}").unwrap_err();
        match err {
            LuaError::Parse { line, .. } => assert_eq!(line, 3),
        }
    }
}
