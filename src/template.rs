//! Output filename templates.
//!
//! [`OutputTemplate`] understands the brace syntax of Python's
//! `str.format`, restricted to the three names an episode can be rendered
//! with:
//!
//! | Placeholder     | Value                                         |
//! |-----------------|-----------------------------------------------|
//! | `{episode_num}` | episode number (integer)                      |
//! | `{title}`       | title resolved for the episode (may be empty) |
//! | `{ext}`         | extension of the source file                  |
//!
//! Each placeholder may carry a format spec of the form
//! `[[fill]align][sign][#][0][width][,|_][.precision][type]`, so
//! `{episode_num:02d}` renders episode 7 as `07` and `{title:_>10}`
//! right-aligns the title in a ten character field padded with underscores.
//! `{{` and `}}` produce literal braces.
//!
//! `{episode_num}` accepts the types `d`, `x`, `X`, `o` and `b`; text
//! placeholders accept `s`. Other presentation types (`n`, `c`, `e`, `f`,
//! `g`, `%`), nested fields and `!s`/`!r` conversions are rejected.
//!
//! Templates are validated when parsed, so a bad `--format` is reported
//! before any media file is touched.
//!
//! # Example
//!
//! ```
//! use epsplit::{OutputTemplate, TemplateValues};
//!
//! let template = OutputTemplate::parse("S01E{episode_num:02d} {title}.{ext}")?;
//! let name = template.render(&TemplateValues {
//!     episode_num: 3,
//!     title: "Pilot",
//!     ext: "mkv",
//! });
//! assert_eq!(name, "S01E03 Pilot.mkv");
//! # Ok::<(), epsplit::EpsplitError>(())
//! ```

use std::str::FromStr;

use crate::error::EpsplitError;

/// Values substituted into an [`OutputTemplate`].
#[derive(Debug, Clone, Copy)]
pub struct TemplateValues<'a> {
    /// Episode number.
    pub episode_num: i64,
    /// Episode title, empty when no title was requested.
    pub title: &'a str,
    /// Source file extension, without the dot.
    pub ext: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    EpisodeNum,
    Title,
    Ext,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "episode_num" => Some(Field::EpisodeNum),
            "title" => Some(Field::Title),
            "ext" => Some(Field::Ext),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Minus,
    Plus,
    Space,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FormatSpec {
    fill: char,
    align: Align,
    sign: Sign,
    alternate: bool,
    width: usize,
    grouping: Option<char>,
    precision: Option<usize>,
    kind: Option<char>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder { field: Field, spec: FormatSpec },
}

/// A parsed output filename template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl Default for OutputTemplate {
    /// The default template, `{episode_num:02d}{title}.{ext}`.
    fn default() -> Self {
        let plain = |field: Field| Segment::Placeholder {
            field,
            spec: FormatSpec::plain(field),
        };
        Self {
            source: crate::config::DEFAULT_FORMAT.to_string(),
            segments: vec![
                Segment::Placeholder {
                    field: Field::EpisodeNum,
                    spec: FormatSpec {
                        fill: '0',
                        align: Align::AfterSign,
                        sign: Sign::Minus,
                        alternate: false,
                        width: 2,
                        grouping: None,
                        precision: None,
                        kind: Some('d'),
                    },
                },
                plain(Field::Title),
                Segment::Literal(".".to_string()),
                plain(Field::Ext),
            ],
        }
    }
}

impl FromStr for OutputTemplate {
    type Err = EpsplitError;

    fn from_str(template: &str) -> Result<Self, Self::Err> {
        Self::parse(template)
    }
}

impl OutputTemplate {
    /// Parse and validate a template.
    ///
    /// # Errors
    ///
    /// Returns [`EpsplitError::InvalidTemplate`] for unbalanced braces,
    /// unknown or positional placeholders, conversions (`{title!r}`), and
    /// format specs that do not apply to the placeholder's type.
    pub fn parse(template: &str) -> Result<Self, EpsplitError> {
        let invalid = |reason: String| EpsplitError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(invalid("single '}' encountered".to_string())),
                '{' => {
                    let mut inner = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        match c {
                            '}' => {
                                closed = true;
                                break;
                            }
                            '{' => {
                                return Err(invalid(
                                    "nested replacement fields are not supported".to_string(),
                                ));
                            }
                            _ => inner.push(c),
                        }
                    }
                    if !closed {
                        return Err(invalid("single '{' encountered".to_string()));
                    }

                    let (name, spec) = match inner.split_once(':') {
                        Some((name, spec)) => (name, spec),
                        None => (inner.as_str(), ""),
                    };
                    if name.contains('!') {
                        return Err(invalid(format!("conversions are not supported: {{{inner}}}")));
                    }
                    if name.is_empty() || name.chars().all(|c| c.is_ascii_digit()) {
                        return Err(invalid(
                            "positional fields are not supported; use {episode_num}, {title} or {ext}"
                                .to_string(),
                        ));
                    }
                    let field = Field::from_name(name)
                        .ok_or_else(|| invalid(format!("unknown placeholder {{{name}}}")))?;
                    let spec = FormatSpec::parse(spec, field).map_err(invalid)?;

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder { field, spec });
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template text as given.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitute `values` into the template.
    pub fn render(&self, values: &TemplateValues<'_>) -> String {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => output.push_str(text),
                Segment::Placeholder { field, spec } => {
                    let rendered = match field {
                        Field::EpisodeNum => spec.render_integer(values.episode_num),
                        Field::Title => spec.render_text(values.title),
                        Field::Ext => spec.render_text(values.ext),
                    };
                    output.push_str(&rendered);
                }
            }
        }
        output
    }
}

impl FormatSpec {
    fn plain(field: Field) -> Self {
        Self {
            fill: ' ',
            align: if field == Field::EpisodeNum {
                Align::Right
            } else {
                Align::Left
            },
            sign: Sign::Minus,
            alternate: false,
            width: 0,
            grouping: None,
            precision: None,
            kind: None,
        }
    }

    fn parse(spec: &str, field: Field) -> Result<Self, String> {
        let chars: Vec<char> = spec.chars().collect();
        let align_of = |c: char| match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        };

        let mut index = 0;
        let mut fill = None;
        let mut align = None;
        if chars.len() >= 2 && align_of(chars[1]).is_some() {
            fill = Some(chars[0]);
            align = align_of(chars[1]);
            index = 2;
        } else if let Some(first) = chars.first().and_then(|&c| align_of(c)) {
            align = Some(first);
            index = 1;
        }

        let mut sign = Sign::Minus;
        match chars.get(index) {
            Some('+') => {
                sign = Sign::Plus;
                index += 1;
            }
            Some('-') => index += 1,
            Some(' ') => {
                sign = Sign::Space;
                index += 1;
            }
            _ => {}
        }

        let alternate = chars.get(index) == Some(&'#');
        if alternate {
            index += 1;
        }

        let mut zero_pad = false;
        if chars.get(index) == Some(&'0') {
            zero_pad = true;
            index += 1;
        }

        let width = take_number(&chars, &mut index).unwrap_or(0);

        let grouping = match chars.get(index) {
            Some(&separator) if separator == ',' || separator == '_' => {
                index += 1;
                Some(separator)
            }
            _ => None,
        };

        let mut precision = None;
        if chars.get(index) == Some(&'.') {
            index += 1;
            precision = Some(
                take_number(&chars, &mut index)
                    .ok_or_else(|| "format spec is missing precision".to_string())?,
            );
        }

        let kind = chars.get(index).copied();
        if kind.is_some() {
            index += 1;
        }
        if index != chars.len() {
            return Err(format!("invalid format spec {spec:?}"));
        }

        let numeric = field == Field::EpisodeNum;
        if numeric {
            if !matches!(kind, None | Some('d' | 'x' | 'X' | 'o' | 'b')) {
                return Err(format!("unknown format code {kind:?} for {{episode_num}}"));
            }
            if precision.is_some() {
                return Err("precision not allowed for {episode_num}".to_string());
            }
            if grouping == Some(',') && !matches!(kind, None | Some('d')) {
                return Err(format!("cannot specify ',' with {kind:?}"));
            }
        } else {
            if !matches!(kind, None | Some('s')) {
                return Err(format!("unknown format code {kind:?} for a text placeholder"));
            }
            if sign != Sign::Minus {
                return Err("sign not allowed for a text placeholder".to_string());
            }
            if alternate {
                return Err("alternate form (#) not allowed for a text placeholder".to_string());
            }
            if let Some(separator) = grouping {
                return Err(format!("cannot specify {separator:?} for a text placeholder"));
            }
            if align == Some(Align::AfterSign) {
                return Err("'=' alignment not allowed for a text placeholder".to_string());
            }
        }

        let (fill, align) = match (fill, align) {
            (Some(fill), Some(align)) => (fill, align),
            (None, Some(align)) => (if zero_pad { '0' } else { ' ' }, align),
            (_, None) if zero_pad && numeric => ('0', Align::AfterSign),
            (_, None) if zero_pad => ('0', Align::Left),
            (_, None) => (' ', FormatSpec::plain(field).align),
        };

        Ok(Self {
            fill,
            align,
            sign,
            alternate,
            width,
            grouping,
            precision,
            kind,
        })
    }

    fn render_integer(&self, value: i64) -> String {
        let magnitude = value.unsigned_abs();
        let (mut digits, base_prefix, group_size) = match self.kind {
            Some('x') => (format!("{magnitude:x}"), "0x", 4),
            Some('X') => (format!("{magnitude:X}"), "0X", 4),
            Some('o') => (format!("{magnitude:o}"), "0o", 4),
            Some('b') => (format!("{magnitude:b}"), "0b", 4),
            _ => (magnitude.to_string(), "", 3),
        };

        let mut prefix = String::from(match (value < 0, self.sign) {
            (true, _) => "-",
            (false, Sign::Plus) => "+",
            (false, Sign::Space) => " ",
            (false, Sign::Minus) => "",
        });
        if self.alternate {
            prefix.push_str(base_prefix);
        }

        let Some(separator) = self.grouping else {
            return self.pad(&prefix, &digits);
        };

        // Zero padding after the sign is grouped along with the digits.
        let mut body = group_digits(&digits, separator, group_size);
        if self.fill == '0' && self.align == Align::AfterSign {
            let used = prefix.chars().count();
            while used + body.chars().count() < self.width {
                digits.insert(0, '0');
                body = group_digits(&digits, separator, group_size);
            }
        }
        self.pad(&prefix, &body)
    }

    fn render_text(&self, value: &str) -> String {
        match self.precision {
            Some(limit) => self.pad("", &value.chars().take(limit).collect::<String>()),
            None => self.pad("", value),
        }
    }

    fn pad(&self, prefix: &str, body: &str) -> String {
        let used = prefix.chars().count() + body.chars().count();
        let padding = self.width.saturating_sub(used);
        let fill = |count: usize| self.fill.to_string().repeat(count);
        match self.align {
            Align::Left => format!("{prefix}{body}{}", fill(padding)),
            Align::Right => format!("{}{prefix}{body}", fill(padding)),
            Align::Center => {
                let left = padding / 2;
                format!("{}{prefix}{body}{}", fill(left), fill(padding - left))
            }
            Align::AfterSign => format!("{prefix}{}{body}", fill(padding)),
        }
    }
}

/// Insert `separator` between every `size` digits, counting from the right.
fn group_digits(digits: &str, separator: char, size: usize) -> String {
    let count = digits.chars().count();
    let mut grouped = String::with_capacity(count + count / size);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (count - position) % size == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }
    grouped
}

fn take_number(chars: &[char], index: &mut usize) -> Option<usize> {
    let start = *index;
    while chars.get(*index).is_some_and(|c| c.is_ascii_digit()) {
        *index += 1;
    }
    if *index == start {
        return None;
    }
    chars[start..*index].iter().collect::<String>().parse().ok()
}
