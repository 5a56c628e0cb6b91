//! Skeleton Store
//!
//! A skeleton is verbatim text interleaved with named expansion markers.
//! Markers are declared by directive lines and placed either where they are
//! declared (`%% expand`) or wherever `%%{name}` appears in verbatim text:
//!
//! ```text
//! %% define tpl_params single sep=", "
//! class T${k - 1}
//! %% end
//! template< %%{tpl_params} >
//! %% expand ctors single
//!     variant( T${k - 1} const & t ) : type_index( ${k - 1} ) {}
//! %% end
//! ```
//!
//! `%%{N}` and `%%{M}` are reserved references to the type count and the
//! visitor arity; they render once, as decimal text, wherever they appear.
//!
//! The skeleton is read once, up front, and never mutated.

pub mod fragment;

use crate::error::GeneratorError;
use fragment::{lex, Template, Token};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Prefix of a directive line (after leading whitespace).
pub const DIRECTIVE_PREFIX: &str = "%%";

/// Opening of an inline marker reference in verbatim text.
pub const REFERENCE_OPEN: &str = "%%{";

/// One piece of the skeleton, in skeleton order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Marker(String),
    Parameter(ParameterRef),
}

/// A generation parameter referenced from verbatim text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterRef {
    /// `%%{N}`
    TypeCount,
    /// `%%{M}`
    VisitorArity,
}

impl ParameterRef {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "N" => Some(ParameterRef::TypeCount),
            "M" => Some(ParameterRef::VisitorArity),
            _ => None,
        }
    }
}

/// How a marker came to be declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// `%% expand`: placed at its declaration, fragment keeps line endings.
    Block,
    /// `%% define`: placed only by `%%{name}` references.
    Inline,
}

/// A named expansion point and the template for one instantiation.
#[derive(Debug, Clone)]
pub struct ExpansionMarker {
    pub name: String,
    /// Axis kind as written in the skeleton; interpreted by the expander.
    pub axis: String,
    pub separator: String,
    pub template: Template,
    pub placement: Placement,
    /// 1-based line of the declaring directive.
    pub line: usize,
}

/// Parsed skeleton: ordered segments plus the marker lookup table.
#[derive(Debug, Clone)]
pub struct Skeleton {
    source: Option<PathBuf>,
    segments: Vec<Segment>,
    markers: BTreeMap<String, ExpansionMarker>,
    declaration_order: Vec<String>,
}

struct OpenBlock {
    name: String,
    axis: String,
    separator: String,
    placement: Placement,
    line: usize,
    body: String,
}

impl Skeleton {
    /// Read and parse a skeleton file, in full.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeneratorError> {
        let path = path.as_ref();
        let text =
            std::fs::read_to_string(path).map_err(|e| GeneratorError::io(path, e))?;
        let mut skeleton = Self::parse(&text)?;
        skeleton.source = Some(path.to_path_buf());
        debug!(
            skeleton = %path.display(),
            markers = skeleton.markers.len(),
            "Skeleton loaded"
        );
        Ok(skeleton)
    }

    /// Parse skeleton text.
    pub fn parse(text: &str) -> Result<Self, GeneratorError> {
        let mut segments: Vec<Segment> = Vec::new();
        let mut markers: BTreeMap<String, ExpansionMarker> = BTreeMap::new();
        let mut declaration_order = Vec::new();
        let mut open: Option<OpenBlock> = None;

        for (idx, line) in text.split_inclusive('\n').enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim_start();
            let is_directive =
                trimmed.starts_with(DIRECTIVE_PREFIX) && !trimmed.starts_with(REFERENCE_OPEN);

            if !is_directive {
                match open.as_mut() {
                    Some(block) => {
                        if line.contains(REFERENCE_OPEN) {
                            return Err(GeneratorError::marker(
                                &block.name,
                                format!("line {}: marker references are not allowed inside a fragment", line_no),
                            ));
                        }
                        block.body.push_str(line);
                    }
                    None => push_verbatim(&mut segments, line, line_no)?,
                }
                continue;
            }

            let directive = trimmed[DIRECTIVE_PREFIX.len()..].trim();
            let tokens = lex(directive).map_err(|reason| {
                GeneratorError::marker("<directive>", format!("line {}: {}", line_no, reason))
            })?;

            match tokens.first() {
                Some(Token::Ident(kw)) if kw == "end" && tokens.len() == 1 => {
                    let block = open.take().ok_or_else(|| {
                        GeneratorError::marker(
                            "<directive>",
                            format!("line {}: '%% end' without an open marker block", line_no),
                        )
                    })?;
                    let marker = close_block(block)?;
                    if marker.placement == Placement::Block {
                        segments.push(Segment::Marker(marker.name.clone()));
                    }
                    declaration_order.push(marker.name.clone());
                    markers.insert(marker.name.clone(), marker);
                }
                Some(Token::Ident(kw)) if kw == "expand" || kw == "define" => {
                    if let Some(block) = &open {
                        return Err(GeneratorError::marker(
                            &block.name,
                            format!("line {}: marker blocks cannot be nested", line_no),
                        ));
                    }
                    let placement = if kw == "expand" {
                        Placement::Block
                    } else {
                        Placement::Inline
                    };
                    let (name, axis, separator) = parse_declaration(&tokens[1..], line_no)?;
                    if ParameterRef::from_name(&name).is_some() {
                        return Err(GeneratorError::marker(
                            &name,
                            format!("line {}: '{}' is reserved for a generation parameter", line_no, name),
                        ));
                    }
                    if markers.contains_key(&name) {
                        return Err(GeneratorError::marker(
                            &name,
                            format!("line {}: marker declared more than once", line_no),
                        ));
                    }
                    open = Some(OpenBlock {
                        name,
                        axis,
                        separator,
                        placement,
                        line: line_no,
                        body: String::new(),
                    });
                }
                _ => {
                    return Err(GeneratorError::marker(
                        "<directive>",
                        format!("line {}: unrecognized directive '{}'", line_no, directive),
                    ));
                }
            }
        }

        if let Some(block) = open {
            return Err(GeneratorError::marker(
                &block.name,
                format!("block opened on line {} is never closed with '%% end'", block.line),
            ));
        }

        let mut referenced = std::collections::BTreeSet::new();
        for segment in &segments {
            if let Segment::Marker(name) = segment {
                if !markers.contains_key(name) {
                    return Err(GeneratorError::marker(
                        name,
                        "referenced in the skeleton but never declared",
                    ));
                }
                referenced.insert(name.as_str());
            }
        }
        for name in &declaration_order {
            if !referenced.contains(name.as_str()) {
                warn!(marker = %name, "Marker is declared but never placed");
            }
        }

        Ok(Skeleton {
            source: None,
            segments,
            markers,
            declaration_order,
        })
    }

    /// Path the skeleton was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn marker(&self, name: &str) -> Option<&ExpansionMarker> {
        self.markers.get(name)
    }

    /// Markers in declaration order.
    pub fn markers(&self) -> impl Iterator<Item = &ExpansionMarker> {
        self.declaration_order
            .iter()
            .filter_map(move |name| self.markers.get(name))
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

/// Split a verbatim line into text and `%%{name}` references.
fn push_verbatim(segments: &mut Vec<Segment>, line: &str, line_no: usize) -> Result<(), GeneratorError> {
    if line.contains("${") {
        return Err(GeneratorError::marker(
            "<verbatim>",
            format!("line {}: '${{' is fragment syntax and may only appear inside a marker block", line_no),
        ));
    }

    let mut rest = line;
    while let Some(start) = rest.find(REFERENCE_OPEN) {
        push_text(segments, &rest[..start]);
        let after = &rest[start + REFERENCE_OPEN.len()..];
        let close = after.find('}').ok_or_else(|| {
            GeneratorError::marker("<verbatim>", format!("line {}: unterminated '%%{{' reference", line_no))
        })?;
        let name = after[..close].trim();
        if !is_marker_name(name) {
            return Err(GeneratorError::marker(
                name,
                format!("line {}: invalid marker name in reference", line_no),
            ));
        }
        let segment = match ParameterRef::from_name(name) {
            Some(param) => Segment::Parameter(param),
            None => Segment::Marker(name.to_string()),
        };
        segments.push(segment);
        rest = &after[close + 1..];
    }
    push_text(segments, rest);
    Ok(())
}

fn push_text(segments: &mut Vec<Segment>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text(last)) = segments.last_mut() {
        last.push_str(text);
    } else {
        segments.push(Segment::Text(text.to_string()));
    }
}

fn is_marker_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `<name> <axis> [sep="<text>"]`
fn parse_declaration(tokens: &[Token], line_no: usize) -> Result<(String, String, String), GeneratorError> {
    match tokens {
        [Token::Ident(name), Token::Ident(axis), rest @ ..] => {
            let separator = match rest {
                [] => String::new(),
                [Token::Ident(kw), Token::Punct('='), Token::Str(sep)] if kw == "sep" => sep.clone(),
                _ => {
                    return Err(GeneratorError::marker(
                        name,
                        format!("line {}: unexpected options {:?}", line_no, rest),
                    ))
                }
            };
            Ok((name.clone(), axis.clone(), separator))
        }
        _ => Err(GeneratorError::marker(
            "<directive>",
            format!("line {}: expected '<name> <axis> [sep=\"...\"]'", line_no),
        )),
    }
}

fn close_block(block: OpenBlock) -> Result<ExpansionMarker, GeneratorError> {
    let mut body = block.body;
    if block.placement == Placement::Inline {
        if body.ends_with('\n') {
            body.pop();
            if body.ends_with('\r') {
                body.pop();
            }
        }
    }
    let template = Template::parse(&body).map_err(|reason| {
        GeneratorError::marker(&block.name, format!("fragment starting line {}: {}", block.line, reason))
    })?;
    Ok(ExpansionMarker {
        name: block.name,
        axis: block.axis,
        separator: block.separator,
        template,
        placement: block.placement,
        line: block.line,
    })
}
