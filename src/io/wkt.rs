//! Well-Known Text reader and writer
//!
//! Supported grammar (keywords are case-insensitive, whitespace is free):
//! ```text
//! text       := [ "SRID=" int ";" ] point | linestring
//! point      := "POINT" [ "Z" ] "(" coord ")"
//! linestring := "LINESTRING" [ "Z" ] ( "EMPTY" | "(" coord { "," coord } ")" )
//! coord      := number number [ number ]
//! ```

use crate::error::{GeometryError, Result};
use crate::geometry::{Coord, CoordinateSequence, Geometry, GeometryTypeId};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Word(&'a str),
    Number(&'a str),
    LParen,
    RParen,
    Comma,
    Semicolon,
    Equals,
    Eof,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Number(n) => format!("number {}", n),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semicolon => "';'".to_string(),
            Token::Equals => "'='".to_string(),
            Token::Eof => "end of input".to_string(),
        }
    }
}

/// Splits WKT into tokens, remembering where each one starts
struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Next token and its byte offset
    fn next_token(&mut self) -> Result<(Token<'a>, usize)> {
        let input: &'a str = self.input;
        let rest = &input[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        let start = self.pos;

        let Some(c) = trimmed.chars().next() else {
            return Ok((Token::Eof, start));
        };

        let single = match c {
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            ';' => Some(Token::Semicolon),
            '=' => Some(Token::Equals),
            _ => None,
        };
        if let Some(token) = single {
            self.pos += 1;
            return Ok((token, start));
        }

        if c.is_ascii_alphabetic() {
            let len = trimmed
                .find(|ch: char| !ch.is_ascii_alphabetic())
                .unwrap_or(trimmed.len());
            self.pos += len;
            return Ok((Token::Word(&trimmed[..len]), start));
        }

        if c.is_ascii_digit() || matches!(c, '+' | '-' | '.') {
            // exponents, signs and "inf"/"nan" spellings are validated by the f64 parser
            let len = trimmed
                .find(|ch: char| !(ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.')))
                .unwrap_or(trimmed.len());
            self.pos += len;
            return Ok((Token::Number(&trimmed[..len]), start));
        }

        Err(GeometryError::Parse {
            offset: start,
            message: format!("unexpected character {:?}", c),
        })
    }
}

/// Recursive-descent parser over the token stream, one token of lookahead
struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    offset: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let (current, offset) = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            offset,
        })
    }

    fn advance(&mut self) -> Result<Token<'a>> {
        let (next, offset) = self.lexer.next_token()?;
        self.offset = offset;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn error<T>(&self, message: String) -> Result<T> {
        Err(GeometryError::Parse {
            offset: self.offset,
            message,
        })
    }

    fn expect(&mut self, expected: Token<'static>) -> Result<()> {
        if self.current != expected {
            return self.error(format!(
                "expected {}, found {}",
                expected.describe(),
                self.current.describe()
            ));
        }
        self.advance()?;
        Ok(())
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.current, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    fn parse_geometry(&mut self) -> Result<Geometry> {
        let srid = self.parse_srid_prefix()?;

        let geometry_type = match self.current {
            Token::Word(w) if w.eq_ignore_ascii_case("POINT") => GeometryTypeId::Point,
            Token::Word(w) if w.eq_ignore_ascii_case("LINESTRING") => GeometryTypeId::LineString,
            other => return self.error(format!("unsupported geometry keyword {}", other.describe())),
        };
        self.advance()?;

        let dimension = if self.is_keyword("Z") {
            self.advance()?;
            Some(3)
        } else {
            None
        };

        let coords = if self.is_keyword("EMPTY") {
            if geometry_type == GeometryTypeId::Point {
                return self.error("POINT EMPTY is not supported".to_string());
            }
            self.advance()?;
            CoordinateSequence::new(0, dimension.unwrap_or(2))?
        } else {
            self.parse_coord_list(dimension)?
        };

        if geometry_type == GeometryTypeId::Point && coords.size() != 1 {
            return self.error(format!("POINT takes 1 coordinate, found {}", coords.size()));
        }
        if geometry_type == GeometryTypeId::LineString && coords.size() == 1 {
            return self.error("LINESTRING needs at least 2 coordinates".to_string());
        }

        if self.current != Token::Eof {
            return self.error(format!("unexpected {} after geometry", self.current.describe()));
        }

        let mut geom = Geometry::new(geometry_type, coords)?;
        geom.set_srid(srid);
        Ok(geom)
    }

    fn parse_srid_prefix(&mut self) -> Result<Option<i32>> {
        if !self.is_keyword("SRID") {
            return Ok(None);
        }
        self.advance()?;
        self.expect(Token::Equals)?;
        let srid = match self.current {
            Token::Number(text) => match text.parse::<i32>() {
                Ok(v) => v,
                Err(_) => return self.error(format!("invalid SRID {:?}", text)),
            },
            other => return self.error(format!("expected SRID value, found {}", other.describe())),
        };
        self.advance()?;
        self.expect(Token::Semicolon)?;
        Ok(Some(srid))
    }

    /// `"(" coord { "," coord } ")"`; every coordinate must share one dimension
    fn parse_coord_list(&mut self, dimension: Option<usize>) -> Result<CoordinateSequence> {
        self.expect(Token::LParen)?;
        let mut coords = Vec::new();
        let mut dimension = dimension;
        loop {
            let start = self.offset;
            let coord = self.parse_coord()?;
            let found = if coord.z.is_some() { 3 } else { 2 };
            match dimension {
                Some(d) if d != found => {
                    return Err(GeometryError::Parse {
                        offset: start,
                        message: format!("expected {} ordinates, found {}", d, found),
                    })
                }
                _ => dimension = Some(found),
            }
            coords.push(coord);

            if self.current == Token::Comma {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(Token::RParen)?;
        CoordinateSequence::from_coords(&coords)
    }

    fn parse_coord(&mut self) -> Result<Coord> {
        let x = self.parse_number()?;
        let y = self.parse_number()?;
        let z = match self.current {
            Token::Number(_) | Token::Word(_) => Some(self.parse_number()?),
            _ => None,
        };
        Ok(Coord { x, y, z })
    }

    fn parse_number(&mut self) -> Result<f64> {
        let text = match self.current {
            Token::Number(text) | Token::Word(text) => text,
            other => return self.error(format!("expected number, found {}", other.describe())),
        };
        match text.parse::<f64>() {
            Ok(v) => {
                self.advance()?;
                Ok(v)
            }
            Err(_) => self.error(format!("invalid number {:?}", text)),
        }
    }
}

/// Parses WKT (with an optional EWKT `SRID=n;` prefix) into geometries
#[derive(Debug, Clone, Copy, Default)]
pub struct WktReader;

impl WktReader {
    pub fn new() -> Self {
        WktReader
    }

    pub fn read(&self, text: &str) -> Result<Geometry> {
        Parser::new(text)?.parse_geometry()
    }
}

/// Renders geometries as WKT
///
/// The SRID is left out unless `with_srid(true)` asks for an EWKT prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct WktWriter {
    include_srid: bool,
}

impl WktWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_srid(mut self, include_srid: bool) -> Self {
        self.include_srid = include_srid;
        self
    }

    pub fn write(&self, geom: &Geometry) -> String {
        let mut out = String::new();
        if let (true, Some(srid)) = (self.include_srid, geom.srid()) {
            out.push_str(&format!("SRID={};", srid));
        }

        out.push_str(geom.geometry_type().wkt_keyword());
        if geom.has_z() {
            out.push_str(" Z");
        }
        if geom.is_empty() {
            out.push_str(" EMPTY");
            return out;
        }

        out.push('(');
        for (i, c) in geom.coord_seq().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_ordinate(&mut out, c.x);
            out.push(' ');
            write_ordinate(&mut out, c.y);
            if let Some(z) = c.z {
                out.push(' ');
                write_ordinate(&mut out, z);
            }
        }
        out.push(')');
        out
    }
}

/// Shortest text that parses back to the same `f64`
fn write_ordinate(out: &mut String, value: f64) {
    let magnitude = value.abs();
    // plain notation for everyday magnitudes, exponent form for the rest
    if value == 0.0 || !value.is_finite() || (1e-6..1e16).contains(&magnitude) {
        out.push_str(&value.to_string());
    } else {
        out.push_str(&format!("{:e}", value));
    }
}
