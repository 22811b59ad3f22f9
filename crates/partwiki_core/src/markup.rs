use std::borrow::Cow;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use quick_xml::Reader;
use quick_xml::escape::{minimal_escape, partial_escape, resolve_html5_entity};
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

/// Elements with no content model. Their start tag is followed by a synthetic
/// end tag unless the next token is already the matching end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "br", "col", "embed", "frame", "hr", "img", "input", "isindex",
    "link", "meta", "param", "source", "track", "wbr",
];

const PARAGRAPH_CLOSERS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "details",
    "div",
    "dl",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "main",
    "menu",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Elements whose end tag may be omitted, with the start tags that close them.
const OPTIONAL_END_TAGS: &[(&str, &[&str])] = &[
    ("li", &["li"]),
    ("dt", &["dt", "dd"]),
    ("dd", &["dt", "dd"]),
    ("p", PARAGRAPH_CLOSERS),
    ("option", &["option", "optgroup"]),
    ("optgroup", &["optgroup"]),
    ("rt", &["rt", "rp"]),
    ("rp", &["rt", "rp"]),
    ("td", &["td", "th", "tr", "tbody", "thead", "tfoot"]),
    ("th", &["td", "th", "tr", "tbody", "thead", "tfoot"]),
    ("tr", &["tr", "tbody", "thead", "tfoot"]),
    ("thead", &["tbody", "tfoot"]),
    ("tbody", &["tbody", "tfoot"]),
    ("colgroup", &["colgroup", "thead", "tbody", "tfoot", "tr"]),
];

const XML_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
];

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("malformed markup at byte {position}: {message}")]
    Syntax { position: u64, message: String },
    #[error("invalid UTF-8 in markup at byte {position}")]
    InvalidUtf8 { position: u64 },
    #[error("unknown entity reference `&{0};`")]
    UnknownEntity(String),
    #[error("unescaped `&` in markup at byte {position}")]
    BareAmpersand { position: u64 },
    #[error("element <{expected}> closed by </{found}>")]
    MismatchedClose { expected: String, found: String },
    #[error("unexpected end element </{0}>")]
    UnexpectedClose(String),
    #[error("unexpected end of input: <{0}> is never closed")]
    Unclosed(String),
    #[error("failed to emit normalized markup: {0}")]
    Io(#[from] io::Error),
}

/// Parser capabilities. `html()` turns every tolerance on, `strict()` reads
/// the input as plain XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupOptions {
    pub lenient_attributes: bool,
    pub tolerate_unknown_entities: bool,
    pub html_entities: bool,
    pub auto_close_void: bool,
    pub auto_close_optional: bool,
    pub tolerate_mismatched_close: bool,
}

impl MarkupOptions {
    pub fn html() -> Self {
        Self {
            lenient_attributes: true,
            tolerate_unknown_entities: true,
            html_entities: true,
            auto_close_void: true,
            auto_close_optional: true,
            tolerate_mismatched_close: true,
        }
    }

    pub fn strict() -> Self {
        Self {
            lenient_attributes: false,
            tolerate_unknown_entities: false,
            html_entities: false,
            auto_close_void: false,
            auto_close_optional: false,
            tolerate_mismatched_close: false,
        }
    }
}

impl Default for MarkupOptions {
    fn default() -> Self {
        Self::html()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    /// Character data with references already resolved.
    Text(String),
    Comment(String),
    /// `<?...?>`, including the XML declaration.
    ProcessingInstruction(String),
    Doctype(String),
}

/// Balanced token stream over a byte source.
pub struct Tokenizer<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    options: MarkupOptions,
    open: Vec<String>,
    pending: VecDeque<Token>,
    backlog: VecDeque<Token>,
    // Void element just auto-closed; its explicit end tag is dropped if it comes next.
    closed_void: Option<String>,
    finished: bool,
}

impl<R: BufRead> Tokenizer<R> {
    pub fn new(input: R, options: MarkupOptions) -> Self {
        let mut reader = Reader::from_reader(input);
        let config = reader.config_mut();
        config.check_end_names = false;
        Self {
            reader,
            buf: Vec::new(),
            options,
            open: Vec::new(),
            pending: VecDeque::new(),
            backlog: VecDeque::new(),
            closed_void: None,
            finished: false,
        }
    }

    /// Next balanced token, or `None` once the whole input has been consumed.
    pub fn next_token(&mut self) -> Result<Option<Token>, MarkupError> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(Some(token));
            }
            if self.finished {
                return Ok(None);
            }
            let raw = match self.backlog.pop_front() {
                Some(token) => Ok(Some(token)),
                None => self.read_raw(),
            };
            let raw = match raw {
                Ok(raw) => raw,
                Err(err) => {
                    self.finished = true;
                    return Err(err);
                }
            };
            if let Err(err) = self.balance(raw) {
                self.finished = true;
                self.pending.clear();
                return Err(err);
            }
        }
    }

    fn read_raw(&mut self) -> Result<Option<Token>, MarkupError> {
        let mut buf = std::mem::take(&mut self.buf);
        buf.clear();
        let token = self.decode_event(&mut buf);
        self.buf = buf;
        token
    }

    fn decode_event(&mut self, buf: &mut Vec<u8>) -> Result<Option<Token>, MarkupError> {
        let event = self
            .reader
            .read_event_into(buf)
            .map_err(|err| MarkupError::Syntax {
                position: self.reader.buffer_position() as u64,
                message: err.to_string(),
            })?;
        let position = self.reader.buffer_position() as u64;
        let token = match event {
            Event::Start(start) => self.start_token(&start, position)?,
            Event::Empty(start) => {
                let token = self.start_token(&start, position)?;
                if let Token::Start { name, .. } = &token {
                    self.backlog.push_back(Token::End { name: name.clone() });
                }
                token
            }
            Event::End(end) => Token::End {
                name: utf8(end.name().as_ref(), position)?.to_string(),
            },
            Event::Text(text) => {
                let raw = utf8(&text, position)?;
                Token::Text(self.resolve_references(raw, position)?.into_owned())
            }
            Event::CData(data) => Token::Text(utf8(&data, position)?.to_string()),
            Event::Comment(comment) => Token::Comment(utf8(&comment, position)?.to_string()),
            Event::Decl(decl) => Token::ProcessingInstruction(utf8(&decl, position)?.to_string()),
            Event::PI(pi) => Token::ProcessingInstruction(utf8(&pi, position)?.to_string()),
            Event::DocType(doctype) => {
                Token::Doctype(utf8(&doctype, position)?.trim().to_string())
            }
            Event::Eof => return Ok(None),
        };
        Ok(Some(token))
    }

    fn start_token(&self, start: &BytesStart<'_>, position: u64) -> Result<Token, MarkupError> {
        let name = utf8(start.name().as_ref(), position)?.to_string();
        if name.is_empty() {
            return Err(MarkupError::Syntax {
                position,
                message: "`<` is not followed by an element name".to_string(),
            });
        }
        let mut attributes = Vec::new();
        let mut iter = if self.options.lenient_attributes {
            start.html_attributes()
        } else {
            start.attributes()
        };
        iter.with_checks(!self.options.lenient_attributes);
        let assigned = assigned_attributes(start.attributes_raw());
        for (index, attribute) in iter.enumerate() {
            let attribute = attribute.map_err(|err| MarkupError::Syntax {
                position,
                message: err.to_string(),
            })?;
            let key = utf8(attribute.key.as_ref(), position)?.to_string();
            // A bare `disabled` takes its own name as value.
            if !assigned.get(index).copied().unwrap_or(true) {
                attributes.push((key.clone(), key));
                continue;
            }
            let raw_value = utf8(&attribute.value, position)?;
            let value = self.resolve_references(raw_value, position)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Token::Start { name, attributes })
    }

    /// Feeds one raw token through the open-element stack, queueing the
    /// balanced output.
    fn balance(&mut self, raw: Option<Token>) -> Result<(), MarkupError> {
        let closed_void = self.closed_void.take();
        match raw {
            None => {
                while let Some(top) = self.open.last() {
                    if !(self.options.auto_close_optional && has_optional_end(top)) {
                        return Err(MarkupError::Unclosed(top.clone()));
                    }
                    self.pop_open();
                }
                self.finished = true;
            }
            Some(Token::Start { name, attributes }) => {
                if self.options.auto_close_optional
                    && let Some(index) = self.implicitly_closed(&name)
                {
                    while self.open.len() > index {
                        self.pop_open();
                    }
                }
                let void = self.options.auto_close_void && is_void(&name);
                self.pending.push_back(Token::Start {
                    name: name.clone(),
                    attributes,
                });
                if void {
                    self.pending.push_back(Token::End { name: name.clone() });
                    self.closed_void = Some(name);
                } else {
                    self.open.push(name);
                }
            }
            Some(Token::End { name }) => {
                if closed_void.is_some_and(|void| void.eq_ignore_ascii_case(&name)) {
                    return Ok(());
                }
                let matching = self
                    .open
                    .iter()
                    .rposition(|open| open.eq_ignore_ascii_case(&name));
                if let Some(index) = matching {
                    let closable = self.options.tolerate_mismatched_close
                        || self.open[index + 1..].iter().all(|open| {
                            self.options.auto_close_optional && has_optional_end(open)
                        });
                    if closable {
                        while self.open.len() > index {
                            self.pop_open();
                        }
                        return Ok(());
                    }
                }
                return Err(match self.open.last() {
                    Some(top) if !self.options.tolerate_mismatched_close => {
                        MarkupError::MismatchedClose {
                            expected: top.clone(),
                            found: name,
                        }
                    }
                    _ => MarkupError::UnexpectedClose(name),
                });
            }
            Some(other) => self.pending.push_back(other),
        }
        Ok(())
    }

    /// Deepest open element that `incoming` ends implicitly. The search only
    /// crosses elements with optional end tags; anything else is a boundary.
    fn implicitly_closed(&self, incoming: &str) -> Option<usize> {
        let mut closed = None;
        for (index, open) in self.open.iter().enumerate().rev() {
            if !has_optional_end(open) {
                break;
            }
            if closed_by_start(open, incoming) {
                closed = Some(index);
            }
        }
        closed
    }

    fn pop_open(&mut self) {
        if let Some(name) = self.open.pop() {
            self.pending.push_back(Token::End { name });
        }
    }

    fn resolve_references<'a>(
        &self,
        raw: &'a str,
        position: u64,
    ) -> Result<Cow<'a, str>, MarkupError> {
        if !raw.contains('&') {
            return Ok(Cow::Borrowed(raw));
        }
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let reference = after
                .find(';')
                .map(|end| &after[..end])
                .filter(|name| is_reference_name(name));
            match reference {
                Some(name) => {
                    match self.lookup_reference(name) {
                        Some(resolved) => out.push_str(&resolved),
                        None if self.options.tolerate_unknown_entities => {
                            out.push('&');
                            out.push_str(name);
                            out.push(';');
                        }
                        None => return Err(MarkupError::UnknownEntity(name.to_string())),
                    }
                    rest = &after[name.len() + 1..];
                }
                None if self.options.tolerate_unknown_entities => {
                    out.push('&');
                    rest = after;
                }
                None => return Err(MarkupError::BareAmpersand { position }),
            }
        }
        out.push_str(rest);
        Ok(Cow::Owned(out))
    }

    fn lookup_reference(&self, name: &str) -> Option<Cow<'static, str>> {
        if let Some(number) = name.strip_prefix('#') {
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse::<u32>().ok()?,
            };
            return char::from_u32(code)
                .filter(|c| *c != '\0')
                .map(|c| Cow::Owned(c.to_string()));
        }
        if self.options.html_entities {
            return resolve_html5_entity(name).map(Cow::Borrowed);
        }
        XML_ENTITIES
            .iter()
            .find(|(entity, _)| *entity == name)
            .map(|(_, value)| Cow::Borrowed(*value))
    }
}

impl<R: BufRead> Iterator for Tokenizer<R> {
    type Item = Result<Token, MarkupError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Normalizes `input` into `output`. On error the bytes already written to
/// `output` are not a usable document and must be discarded.
pub fn normalize<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    options: MarkupOptions,
) -> Result<(), MarkupError> {
    let mut tokenizer = Tokenizer::new(input, options);
    while let Some(token) = tokenizer.next_token()? {
        write_token(&mut output, &token)?;
    }
    output.flush()?;
    Ok(())
}

pub fn normalize_bytes(input: &[u8], options: MarkupOptions) -> Result<Vec<u8>, MarkupError> {
    let mut output = Vec::with_capacity(input.len());
    normalize(input, &mut output, options)?;
    Ok(output)
}

pub fn write_token<W: Write>(out: &mut W, token: &Token) -> io::Result<()> {
    match token {
        Token::Start { name, attributes } => {
            write!(out, "<{name}")?;
            for (key, value) in attributes {
                let value = minimal_escape(value.as_str()).replace('"', "&quot;");
                write!(out, " {key}=\"{value}\"")?;
            }
            out.write_all(b">")
        }
        Token::End { name } => write!(out, "</{name}>"),
        Token::Text(text) => out.write_all(partial_escape(text.as_str()).as_bytes()),
        Token::Comment(comment) => write!(out, "<!--{comment}-->"),
        Token::ProcessingInstruction(body) => write!(out, "<?{body}?>"),
        Token::Doctype(body) => write!(out, "<!DOCTYPE {body}>"),
    }
}

fn utf8(bytes: &[u8], position: u64) -> Result<&str, MarkupError> {
    std::str::from_utf8(bytes).map_err(|_| MarkupError::InvalidUtf8 { position })
}

/// For each attribute in a raw start tag, whether it was written with `=`.
fn assigned_attributes(raw: &[u8]) -> Vec<bool> {
    let skip_space = |mut at: usize| {
        while raw.get(at).is_some_and(u8::is_ascii_whitespace) {
            at += 1;
        }
        at
    };
    let mut assigned = Vec::new();
    let mut at = skip_space(0);
    while at < raw.len() {
        while raw
            .get(at)
            .is_some_and(|b| !b.is_ascii_whitespace() && *b != b'=')
        {
            at += 1;
        }
        at = skip_space(at);
        if raw.get(at) != Some(&b'=') {
            assigned.push(false);
            continue;
        }
        at = skip_space(at + 1);
        match raw.get(at) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                at += 1;
                while raw.get(at).is_some_and(|b| *b != quote) {
                    at += 1;
                }
                at += 1;
            }
            _ => {
                while raw.get(at).is_some_and(|b| !b.is_ascii_whitespace()) {
                    at += 1;
                }
            }
        }
        assigned.push(true);
        at = skip_space(at);
    }
    assigned
}

fn is_reference_name(name: &str) -> bool {
    let body = name.strip_prefix('#').unwrap_or(name);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_alphanumeric())
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(name))
}

fn optional_end_closers(name: &str) -> Option<&'static [&'static str]> {
    OPTIONAL_END_TAGS
        .iter()
        .find(|(element, _)| element.eq_ignore_ascii_case(name))
        .map(|(_, closers)| *closers)
}

fn has_optional_end(name: &str) -> bool {
    optional_end_closers(name).is_some()
}

fn closed_by_start(open: &str, incoming: &str) -> bool {
    optional_end_closers(open)
        .is_some_and(|closers| closers.iter().any(|c| c.eq_ignore_ascii_case(incoming)))
}

#[cfg(test)]
mod tests {
    use super::{MarkupError, MarkupOptions, Token, Tokenizer, normalize_bytes};

    fn html(input: &str) -> Result<String, MarkupError> {
        normalize_bytes(input.as_bytes(), MarkupOptions::html())
            .map(|bytes| String::from_utf8(bytes).expect("normalized output is utf-8"))
    }

    #[test]
    fn well_formed_markup_passes_through() {
        let input = "<h1>Title</h1><p>Hello <b>world</b> and <a href=\"/wiki/Other\">a link</a>.</p>";
        assert_eq!(html(input).expect("normalize"), input);
    }

    #[test]
    fn void_elements_are_emitted_as_open_close_pairs() {
        assert_eq!(html("<p>a<br>b</p>").expect("bare br"), "<p>a<br></br>b</p>");
        assert_eq!(html("<p>a<br/>b</p>").expect("self-closed br"), "<p>a<br></br>b</p>");
        assert_eq!(html("<p>a<br></br>b</p>").expect("paired br"), "<p>a<br></br>b</p>");
        assert_eq!(
            html("<img src=\"x.png\" alt=\"\"><hr>").expect("img and hr"),
            "<img src=\"x.png\" alt=\"\"></img><hr></hr>"
        );
    }

    #[test]
    fn void_matching_ignores_ascii_case() {
        assert_eq!(html("<BR>text").expect("upper br"), "<BR></BR>text");
    }

    #[test]
    fn list_items_close_implicitly() {
        assert_eq!(
            html("<ul><li>one<li>two</ul>").expect("list"),
            "<ul><li>one</li><li>two</li></ul>"
        );
    }

    #[test]
    fn paragraphs_close_at_block_starts_and_end_of_input() {
        assert_eq!(
            html("<p>one<p>two<div>three</div>").expect("paragraphs"),
            "<p>one</p><p>two</p><div>three</div>"
        );
        assert_eq!(html("<p>dangling").expect("eof"), "<p>dangling</p>");
    }

    #[test]
    fn table_cells_and_rows_close_implicitly() {
        assert_eq!(
            html("<table><tr><td>a<td>b<tr><td>c</table>").expect("table"),
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>"
        );
    }

    #[test]
    fn named_and_numeric_references_resolve() {
        assert_eq!(
            html("<p>&copy; &nbsp;x &#169; &#xA9;</p>").expect("references"),
            "<p>\u{a9} \u{a0}x \u{a9} \u{a9}</p>"
        );
        assert_eq!(
            html("<p>a &amp; b &lt; c</p>").expect("escapes"),
            "<p>a &amp; b &lt; c</p>"
        );
    }

    #[test]
    fn unknown_entities_are_kept_as_text() {
        assert_eq!(html("<p>&bogus;</p>").expect("unknown"), "<p>&amp;bogus;</p>");
        assert_eq!(html("<p>fish & chips</p>").expect("bare amp"), "<p>fish &amp; chips</p>");
    }

    #[test]
    fn unquoted_attributes_are_quoted() {
        assert_eq!(
            html("<a href=target>x</a>").expect("unquoted"),
            "<a href=\"target\">x</a>"
        );
        assert_eq!(
            html("<a title=\"a &amp; b\">x</a>").expect("escaped value"),
            "<a title=\"a &amp; b\">x</a>"
        );
    }

    #[test]
    fn comments_and_doctype_pass_through() {
        let input = "<!DOCTYPE html><!-- note --><p>x</p>";
        assert_eq!(html(input).expect("doctype"), input);
    }

    #[test]
    fn normalization_is_idempotent() {
        let messy = "<ul><li>one<li>two &copy;</ul><p>a<br>b<hr><table><tr><td>1<td>2</table>";
        let once = html(messy).expect("first pass");
        let twice = html(&once).expect("second pass");
        assert_eq!(once, twice);
    }

    #[test]
    fn unterminated_tag_is_rejected() {
        let err = html("<p>text<b").expect_err("must fail");
        assert!(matches!(err, MarkupError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn unclosed_element_is_rejected() {
        let err = html("<div>text").expect_err("must fail");
        assert!(matches!(err, MarkupError::Unclosed(ref name) if name == "div"));
    }

    #[test]
    fn mismatched_close_ends_inner_elements() {
        assert_eq!(
            html("<p><b>bold</p>").expect("unclosed bold"),
            "<p><b>bold</b></p>"
        );
        assert_eq!(
            html("<div><span>text</div>").expect("unclosed span"),
            "<div><span>text</span></div>"
        );
        let err = html("<div>text</span>").expect_err("no open span");
        assert!(matches!(err, MarkupError::UnexpectedClose(ref name) if name == "span"));
    }

    #[test]
    fn strict_mode_rejects_mismatched_close() {
        let err = normalize_bytes(b"<div><span>text</div>", MarkupOptions::strict())
            .expect_err("must fail");
        assert!(matches!(
            err,
            MarkupError::MismatchedClose { ref expected, ref found } if expected == "span" && found == "div"
        ));
    }

    #[test]
    fn list_item_closes_across_open_paragraph() {
        assert_eq!(
            html("<ul><li><p>x<li>y</ul>").expect("list"),
            "<ul><li><p>x</p></li><li>y</li></ul>"
        );
        assert_eq!(
            html("<ul><li>a<ul><li>b</ul><li>c</ul>").expect("nested list"),
            "<ul><li>a<ul><li>b</li></ul></li><li>c</li></ul>"
        );
    }

    #[test]
    fn attribute_values_keep_quotes_and_angles() {
        let input = "<p><a title=\"it's > here\" href=\"/a?x=1&amp;y=2\">x</a></p>";
        assert_eq!(html(input).expect("attributes"), input);
        assert_eq!(
            html("<a title='say \"hi\"'>x</a>").expect("single quoted"),
            "<a title=\"say &quot;hi&quot;\">x</a>"
        );
    }

    #[test]
    fn bare_attributes_take_their_name() {
        assert_eq!(
            html("<input type=checkbox checked disabled>").expect("bare"),
            "<input type=\"checkbox\" checked=\"checked\" disabled=\"disabled\"></input>"
        );
        assert_eq!(
            html("<option value=\"\" selected>x</option>").expect("empty value"),
            "<option value=\"\" selected=\"selected\">x</option>"
        );
    }

    #[test]
    fn self_closed_elements_are_paired() {
        assert_eq!(html("<div/><br/>").expect("self closed"), "<div></div><br></br>");
    }

    #[test]
    fn lone_angle_bracket_is_a_syntax_error() {
        let err = html("<p>a < b</p>").expect_err("must fail");
        assert!(matches!(err, MarkupError::Syntax { .. }), "got {err:?}");
    }

    #[test]
    fn stray_close_is_rejected() {
        let err = html("text</div>").expect_err("must fail");
        assert!(matches!(err, MarkupError::UnexpectedClose(ref name) if name == "div"));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let err = normalize_bytes(b"<p>\xff\xfe</p>", MarkupOptions::html()).expect_err("must fail");
        assert!(matches!(err, MarkupError::InvalidUtf8 { .. }));
    }

    #[test]
    fn strict_mode_requires_explicit_closes() {
        let err = normalize_bytes(b"<p>a<br>b</p>", MarkupOptions::strict()).expect_err("must fail");
        assert!(matches!(err, MarkupError::MismatchedClose { .. }));

        let err = normalize_bytes(b"<p>&bogus;</p>", MarkupOptions::strict()).expect_err("must fail");
        assert!(matches!(err, MarkupError::UnknownEntity(ref name) if name == "bogus"));

        let ok = normalize_bytes(b"<p>a<br/>b &amp; c</p>", MarkupOptions::strict())
            .expect("strict well-formed");
        assert_eq!(ok, b"<p>a<br></br>b &amp; c</p>");
    }

    #[test]
    fn tokenizer_yields_balanced_tokens() {
        let tokens: Vec<Token> = Tokenizer::new("<li>a".as_bytes(), MarkupOptions::html())
            .collect::<Result<_, _>>()
            .expect("tokens");
        assert_eq!(
            tokens,
            vec![
                Token::Start {
                    name: "li".to_string(),
                    attributes: Vec::new(),
                },
                Token::Text("a".to_string()),
                Token::End {
                    name: "li".to_string(),
                },
            ]
        );
    }

    #[test]
    fn tokenizer_stops_after_error() {
        let mut tokenizer = Tokenizer::new("</p><p>".as_bytes(), MarkupOptions::html());
        assert!(tokenizer.next_token().is_err());
        assert!(tokenizer.next_token().expect("fused").is_none());
    }
}
