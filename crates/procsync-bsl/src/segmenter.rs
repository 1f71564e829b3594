//! Split a BSL module into procedures, functions, and named regions.
//!
//! Recognition is driven by the patterns in [`crate::keywords`]: a header
//! is any number of `&Annotation` lines, an optional async modifier, the
//! procedure or function keyword, a name, a parameter list and an optional
//! export marker. The body runs to the nearest end keyword; BSL forbids
//! nested procedures so no balancing is attempted.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SegmenterConfig;
use crate::keywords::{self, alternation, label_alternation};

const IDENT: &str = r"[\p{L}_][\p{L}\p{N}_]*";

static PROCEDURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?im)(?P<annotations>(?:^[ \t]*&{IDENT}[^\n]*\n)*)[ \t]*(?:(?P<async>{async_kw})[ \t]+)?\b(?P<kind>{kind})\s+(?P<name>{IDENT})\s*\((?P<params>[^)]*)\)(?:[ \t]*(?P<export>{export})\b)?(?s:(?P<body>.*?))\b(?:{end})\b",
        async_kw = alternation(&[keywords::ASYNC]),
        kind = alternation(&[keywords::PROCEDURE, keywords::FUNCTION]),
        export = alternation(&[keywords::EXPORT]),
        end = alternation(&[keywords::END_PROCEDURE, keywords::END_FUNCTION]),
    );
    Regex::new(&pattern).expect("procedure pattern is valid")
});

static REGION_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?im)^[ \t]*#(?:{open})[ \t]+(?P<name>[^\r\n]+)(?s:(?P<content>.*?))^[ \t]*#(?:{close})\b",
        open = alternation(&[keywords::REGION]),
        close = alternation(&[keywords::END_REGION]),
    );
    Regex::new(&pattern).expect("region pattern is valid")
});

static DOCUMENTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| special_region(keywords::DOCUMENTATION_LABELS));

static OBJECT_MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| special_region(keywords::OBJECT_MODULE_LABELS));

/// A region with one of `labels`, matched through the end of its closing line.
fn special_region(labels: &[&str]) -> Regex {
    let pattern = format!(
        r"(?im)^[ \t]*#(?:{open})[ \t]+(?:{labels})[ \t]*\r?$(?s:(?P<content>.*?))^[ \t]*#(?:{close})\b[^\n]*",
        open = alternation(&[keywords::REGION]),
        labels = label_alternation(labels),
        close = alternation(&[keywords::END_REGION]),
    );
    Regex::new(&pattern).expect("special region pattern is valid")
}

/// Whether a unit was declared as a procedure or a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureKind {
    Procedure,
    Function,
}

impl ProcedureKind {
    /// Classify a header keyword in either language.
    pub fn from_keyword(word: &str) -> Option<Self> {
        if keywords::PROCEDURE.matches(word) {
            Some(Self::Procedure)
        } else if keywords::FUNCTION.matches(word) {
            Some(Self::Function)
        } else {
            None
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Procedure => write!(f, "procedure"),
            Self::Function => write!(f, "function"),
        }
    }
}

/// A parsed procedure or function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BslProcedure {
    /// Case-preserved identifier, unique within a module.
    pub name: String,
    pub kind: ProcedureKind,
    /// Annotations, modifiers, keyword, name, parameters and export marker.
    pub signature: String,
    /// Raw text between the header and the end keyword.
    pub body: String,
    /// The exact matched span.
    pub full_text: String,
    /// 1-based line where the header (including annotations) starts.
    pub line_number: usize,
    /// Annotation names without the `&` sigil, in source order.
    pub annotations: Vec<String>,
    pub params: Vec<String>,
    pub is_export: bool,
    pub is_async: bool,
}

impl BslProcedure {
    /// The body with line comments dropped and whitespace collapsed.
    pub fn normalized_body(&self) -> String {
        normalize_body(&self.body)
    }
}

/// A named region between an opener and the first closer after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BslRegion {
    pub name: String,
    pub content: String,
    pub line_number: usize,
}

/// The keyed units of one module plus what was left between them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSegments {
    pub procedures: BTreeMap<String, BslProcedure>,
    pub regions: BTreeMap<String, BslRegion>,
    /// Text outside every procedure, with blank-line runs collapsed.
    pub residual: String,
    /// Content of the `Документация` region, when extracted.
    pub documentation: Option<String>,
    /// Content of the object-module region, when extracted.
    pub object_module: Option<String>,
    /// Duplicate-name notices, in source order.
    pub warnings: Vec<String>,
}

impl ModuleSegments {
    pub fn procedure(&self, name: &str) -> Option<&BslProcedure> {
        self.procedures.get(name)
    }

    pub fn region(&self, name: &str) -> Option<&BslRegion> {
        self.regions.get(name)
    }

    /// Returns `true` if no procedure or region was found.
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty() && self.regions.is_empty()
    }
}

/// Splits module text according to a [`SegmenterConfig`].
#[derive(Clone, Debug, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment `text`. Never fails; unrecognized text ends up in `residual`.
    pub fn segment(&self, text: &str) -> ModuleSegments {
        let mut segments = ModuleSegments::default();
        let mut working = text.to_string();

        if self.config.extract_special_regions {
            segments.documentation = take_region(&mut working, &DOCUMENTATION_RE);
            segments.object_module = take_region(&mut working, &OBJECT_MODULE_RE);
        }

        let mut spans: Vec<Range<usize>> = Vec::new();
        for caps in PROCEDURE_RE.captures_iter(&working) {
            let Some(procedure) = procedure_from(&caps, &working) else {
                continue;
            };
            if let Some(whole) = caps.get(0) {
                spans.push(whole.range());
            }
            if let Some(previous) = segments.procedures.get(&procedure.name) {
                let notice = format!(
                    "duplicate procedure '{}' at lines {} and {}; keeping the later one",
                    procedure.name, previous.line_number, procedure.line_number
                );
                if self.config.warn_on_duplicates {
                    warn!(name = %procedure.name, line = procedure.line_number, "duplicate procedure");
                } else {
                    debug!(name = %procedure.name, line = procedure.line_number, "duplicate procedure");
                }
                segments.warnings.push(notice);
            }
            segments.procedures.insert(procedure.name.clone(), procedure);
        }

        for caps in REGION_RE.captures_iter(&working) {
            let (Some(whole), Some(name), Some(content)) =
                (caps.get(0), caps.name("name"), caps.name("content"))
            else {
                continue;
            };
            let region = BslRegion {
                name: name.as_str().trim().to_string(),
                content: content.as_str().trim().to_string(),
                line_number: line_of(&working, whole.start()),
            };
            if segments.regions.contains_key(&region.name) {
                debug!(name = %region.name, "duplicate region, keeping the later one");
            }
            segments.regions.insert(region.name.clone(), region);
        }

        segments.residual = residual(&working, &spans);
        debug!(
            procedures = segments.procedures.len(),
            regions = segments.regions.len(),
            "segmented module"
        );
        segments
    }
}

/// Segment `text` with the default configuration.
pub fn segment(text: &str) -> ModuleSegments {
    Segmenter::default().segment(text)
}

/// Drop `//` line comments and collapse every whitespace run to one space.
pub fn normalize_body(body: &str) -> String {
    body.lines()
        .map(|line| line.find("//").map_or(line, |at| &line[..at]))
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// Cut the first match of `re` out of `text`, leaving its newlines behind.
fn take_region(text: &mut String, re: &Regex) -> Option<String> {
    let (range, content) = {
        let caps = re.captures(text)?;
        let whole = caps.get(0)?;
        let content = caps.name("content").map_or("", |m| m.as_str());
        (whole.range(), content.trim().to_string())
    };
    let newlines = text[range.clone()].matches('\n').count();
    text.replace_range(range, &"\n".repeat(newlines));
    Some(content)
}

fn procedure_from(caps: &Captures<'_>, text: &str) -> Option<BslProcedure> {
    let whole = caps.get(0)?;
    let name = caps.name("name")?.as_str().to_string();
    let kind_word = caps.name("kind")?.as_str();
    let kind = ProcedureKind::from_keyword(kind_word)?;
    let raw_params = caps.name("params").map_or("", |m| m.as_str()).trim();

    let annotations: Vec<String> = caps
        .name("annotations")
        .map_or("", |m| m.as_str())
        .lines()
        .filter_map(|line| line.trim().strip_prefix('&'))
        .map(|rest| {
            rest.chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect()
        })
        .collect();

    let mut signature = String::new();
    for annotation in &annotations {
        signature.push('&');
        signature.push_str(annotation);
        signature.push('\n');
    }
    if let Some(modifier) = caps.name("async") {
        signature.push_str(modifier.as_str());
        signature.push(' ');
    }
    signature.push_str(&format!("{kind_word} {name}({raw_params})"));
    if let Some(export) = caps.name("export") {
        signature.push(' ');
        signature.push_str(export.as_str());
    }

    Some(BslProcedure {
        kind,
        signature,
        body: caps.name("body").map_or("", |m| m.as_str()).to_string(),
        full_text: whole.as_str().to_string(),
        line_number: line_of(text, whole.start()),
        annotations,
        params: raw_params
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect(),
        is_export: caps.name("export").is_some(),
        is_async: caps.name("async").is_some(),
        name,
    })
}

/// Text outside `spans`, with trailing spaces cut and blank-line runs folded.
fn residual(text: &str, spans: &[Range<usize>]) -> String {
    let mut pieces = Vec::with_capacity(spans.len() + 1);
    let mut cursor = 0;
    for span in spans {
        pieces.push(&text[cursor..span.start]);
        cursor = span.end;
    }
    pieces.push(&text[cursor..]);

    let joined = pieces.join("\n");
    let mut lines: Vec<&str> = Vec::new();
    for line in joined.lines().map(str::trim_end) {
        let blank = line.is_empty();
        if blank && lines.last().map_or(true, |last| last.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|last| last.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}
