//! Markup scanner for XML source text.
//!
//! The scanner splits a document into a flat stream of [`Markup`] items
//! (tags, text runs, comments, ...) with byte spans. It does not check
//! nesting; that is the job of the tree builder in [`reader`](crate::reader).
//!
//! Scanning recovers from errors and collects every diagnostic in a single
//! pass.

use winnow::{
    Parser as _,
    ascii::{multispace0, multispace1},
    combinator::{alt, cut_err, delimited, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
};

/// Rich diagnostic information for markup errors.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MarkupDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<MarkupDiagnostic>>;

/// An attribute as written in a start tag, value still entity-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawAttribute<'a> {
    pub name: &'a str,
    pub value: &'a str,
    /// Span of the value between the quotes
    pub value_span: Span,
}

/// One scanned piece of markup.
///
/// Text and attribute values borrow the source and are not decoded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Markup<'a> {
    ProcessingInstruction(&'a str),
    Doctype(&'a str),
    Comment(&'a str),
    CData(&'a str),
    StartTag {
        name: &'a str,
        attributes: Vec<RawAttribute<'a>>,
        self_closing: bool,
    },
    EndTag(&'a str),
    Text(&'a str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PositionedMarkup<'a> {
    pub markup: Markup<'a>,
    pub span: Span,
}

fn unterminated(message: &'static str, help: &'static str, start: usize) -> MarkupDiagnostic {
    MarkupDiagnostic {
        code: ErrorCode::E003,
        message,
        help: Some(help),
        start,
    }
}

/// Parse a comment: `<!-- ... -->`
fn comment<'a>(input: &mut Input<'a>) -> IResult<'a, Markup<'a>> {
    let start = input.current_token_start();
    preceded(
        "<!--",
        cut_err(terminated(take_until(0.., "-->"), "-->")).context(unterminated(
            "unterminated comment",
            "close the comment with `-->`",
            start,
        )),
    )
    .map(Markup::Comment)
    .parse_next(input)
}

/// Parse a CDATA section: `<![CDATA[ ... ]]>`
fn cdata<'a>(input: &mut Input<'a>) -> IResult<'a, Markup<'a>> {
    let start = input.current_token_start();
    preceded(
        "<![CDATA[",
        cut_err(terminated(take_until(0.., "]]>"), "]]>")).context(unterminated(
            "unterminated CDATA section",
            "close the section with `]]>`",
            start,
        )),
    )
    .map(Markup::CData)
    .parse_next(input)
}

/// Parse a document type declaration, kept verbatim: `<!DOCTYPE ... >`
fn doctype<'a>(input: &mut Input<'a>) -> IResult<'a, Markup<'a>> {
    let start = input.current_token_start();
    preceded(
        "<!DOCTYPE",
        cut_err(terminated(take_until(0.., ">"), ">")).context(unterminated(
            "unterminated DOCTYPE declaration",
            "close the declaration with `>`",
            start,
        )),
    )
    .map(Markup::Doctype)
    .parse_next(input)
}

/// Parse a processing instruction or the XML declaration: `<? ... ?>`
fn processing_instruction<'a>(input: &mut Input<'a>) -> IResult<'a, Markup<'a>> {
    let start = input.current_token_start();
    preceded(
        "<?",
        cut_err(terminated(take_until(0.., "?>"), "?>")).context(unterminated(
            "unterminated processing instruction",
            "close the instruction with `?>`",
            start,
        )),
    )
    .map(Markup::ProcessingInstruction)
    .parse_next(input)
}

/// Parse an element or attribute name
fn name<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    (
        one_of(|c: char| c.is_alphabetic() || c == '_' || c == ':'),
        take_while(0.., |c: char| {
            c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')
        }),
    )
        .take()
        .parse_next(input)
}

/// Parse a quoted attribute value, returning the raw value and its span
fn attribute_value<'a>(input: &mut Input<'a>) -> IResult<'a, (&'a str, std::ops::Range<usize>)> {
    alt((
        delimited(
            '"',
            take_while(0.., |c: char| c != '"' && c != '<').with_span(),
            '"',
        ),
        delimited(
            '\'',
            take_while(0.., |c: char| c != '\'' && c != '<').with_span(),
            '\'',
        ),
    ))
    .parse_next(input)
}

/// Parse one attribute including its leading whitespace
fn attribute<'a>(input: &mut Input<'a>) -> IResult<'a, RawAttribute<'a>> {
    (
        preceded(multispace1, name),
        (multispace0, '=', multispace0),
        attribute_value,
    )
        .map(|(name, _, (value, range))| RawAttribute {
            name,
            value,
            value_span: Span::new(range),
        })
        .parse_next(input)
}

/// Parse a start tag: `<name attr="value">` or `<name/>`
fn start_tag<'a>(input: &mut Input<'a>) -> IResult<'a, Markup<'a>> {
    let start = input.current_token_start();
    let name = preceded('<', name).parse_next(input)?;

    // Past the name this can only be a start tag.
    let (attributes, self_closing): (Vec<RawAttribute<'a>>, bool) = cut_err((
        repeat(0.., attribute),
        preceded(multispace0, alt(("/>".value(true), ">".value(false)))),
    ))
    .context(MarkupDiagnostic {
        code: ErrorCode::E002,
        message: "malformed start tag",
        help: Some("quote attribute values and close the tag with `>` or `/>`"),
        start,
    })
    .parse_next(input)?;

    Ok(Markup::StartTag {
        name,
        attributes,
        self_closing,
    })
}

/// Parse an end tag: `</name>`
fn end_tag<'a>(input: &mut Input<'a>) -> IResult<'a, Markup<'a>> {
    let start = input.current_token_start();
    preceded(
        "</",
        cut_err(terminated(name, (multispace0, '>'))).context(MarkupDiagnostic {
            code: ErrorCode::E002,
            message: "malformed end tag",
            help: Some("end tags look like `</name>`"),
            start,
        }),
    )
    .map(Markup::EndTag)
    .parse_next(input)
}

/// Parse character data up to the next `<`
fn text<'a>(input: &mut Input<'a>) -> IResult<'a, Markup<'a>> {
    take_while(1.., |c: char| c != '<')
        .map(Markup::Text)
        .parse_next(input)
}

/// Parse a single markup item with position tracking
fn positioned_markup<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedMarkup<'a>> {
    let start_pos = input.current_token_start();

    let markup = alt((
        comment,                // Must come before doctype and cdata (`<!`)
        cdata,
        doctype,
        processing_instruction,
        end_tag,                // Must come before start_tag
        start_tag,
        text,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedMarkup { markup, span })
}

/// Scanner that accumulates markup and diagnostics.
struct Scanner<'a> {
    items: Vec<PositionedMarkup<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Scanner<'a> {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Scan the input, collecting markup and errors.
    fn scan(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_markup(&mut input) {
                Ok(item) => {
                    self.items.push(item);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    let unterminated = diagnostic.code() == Some(ErrorCode::E003);
                    self.diagnostics.emit(diagnostic);

                    // Nothing after an unterminated construct can be scanned reliably.
                    if unterminated {
                        break;
                    }
                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedMarkup<'a>>, ParseError> {
        self.diagnostics.finish().map(|_| self.items)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Falls back to E001 (unexpected character) if no diagnostic context is
    /// attached.
    fn convert_err_mode(
        err: ErrMode<ContextError<MarkupDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(MarkupDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected `<`")
            .with_code(ErrorCode::E001)
            .with_label(span, ErrorCode::E001.description())
            .with_help("write a literal `<` in text as `&lt;`")
    }
}

/// Scan XML source into markup items, collecting every error.
///
/// # Returns
///
/// - `Ok(items)` - The whole input was scanned
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub(crate) fn scan(source: &str) -> Result<Vec<PositionedMarkup<'_>>, ParseError> {
    let mut scanner = Scanner::new();
    scanner.scan(LocatingSlice::new(source));
    scanner.finish()
}
