//! Content document rewriting using html5ever.
//!
//! Parses an XHTML/HTML content document, walks the tree depth-first, and
//! replaces each eligible text node with alternating plain-text fragments and
//! emphasis-wrapper elements around the emphasized syllables. Everything else
//! (tags, attributes, comments, doctypes, text under excluded tags) passes
//! through untouched, so the document keeps its structure exactly.

use std::cell::RefCell;
use std::collections::HashSet;
use std::default::Default;
use std::rc::Rc;

use html5ever::parse_document;
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ns, LocalName, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

use crate::emphasis::{emphasize, Parity};
use crate::hyphen::Syllables;
use crate::segment::{segment, Piece};

/// Rewrite configuration. Owned by the caller; the rewriter never mutates it.
#[derive(Debug, Clone)]
pub struct Options {
    /// Hyphenation language tag. `None` means use the language declared in
    /// the package metadata.
    pub language: Option<String>,
    /// Which syllable positions to emphasize.
    pub parity: Parity,
    /// The inline element wrapped around emphasized syllables, no attributes.
    pub emphasis_tag: String,
    /// Elements whose subtrees are never rewritten. The emphasis tag itself
    /// is always treated as excluded, so re-running the rewriter on its own
    /// output never double-wraps.
    pub excluded_tags: HashSet<String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            language: None,
            parity: Parity::default(),
            emphasis_tag: "b".to_string(),
            excluded_tags: default_excluded_tags(),
        }
    }
}

/// The default set of non-rewritable elements: preformatted, code, script,
/// and form-input content.
pub fn default_excluded_tags() -> HashSet<String> {
    ["script", "style", "pre", "code", "textarea"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Parse HTML content into a DOM tree.
pub fn parse_html(html: &str) -> RcDom {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            drop_doctype: false,
            ..Default::default()
        },
        ..Default::default()
    };

    parse_document(RcDom::default(), opts)
        .from_utf8()
        .one(html.as_bytes())
}

/// Serialize a DOM tree back to an HTML string.
pub fn serialize_html(dom: &RcDom) -> String {
    let mut bytes = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();

    serialize(&mut bytes, &document, SerializeOpts::default()).expect("serialization failed");

    String::from_utf8(bytes).unwrap_or_default()
}

/// Rewrite one content document, returning the new markup.
///
/// An XML declaration at the start of the input survives unchanged (the HTML
/// parser would otherwise mangle it into a comment).
///
/// The output uses HTML serialization rules: void elements like `<br>` are
/// written without a self-closing slash, so XML-strict consumers may reject
/// documents that contain them.
pub fn rewrite_html(html: &str, syllables: &dyn Syllables, opts: &Options) -> String {
    let (declaration, content) = split_xml_declaration(html);
    let dom = parse_html(content);
    rewrite_tree(&dom.document, syllables, opts);
    let serialized = serialize_html(&dom);
    match declaration {
        Some(decl) => format!("{decl}\n{serialized}"),
        None => serialized,
    }
}

/// Rewrite all eligible text nodes under `root` in place.
///
/// Exposed for callers that already hold a parsed tree. Nodes inserted by
/// the rewriter are never revisited, and subtrees rooted at an excluded
/// element are skipped entirely, at any depth.
pub fn rewrite_tree(root: &Handle, syllables: &dyn Syllables, opts: &Options) {
    match &root.data {
        NodeData::Document => rewrite_children(root, syllables, opts),
        NodeData::Element { name, .. } => {
            if !is_excluded(name.local.as_ref(), opts) {
                rewrite_children(root, syllables, opts);
            }
        }
        _ => {}
    }
}

fn rewrite_children(parent: &Handle, syllables: &dyn Syllables, opts: &Options) {
    // Snapshot the child list first: recursion below mutates grandchildren,
    // and the splice afterwards replaces this node's own list wholesale.
    let children: Vec<Handle> = parent.children.borrow().clone();
    for child in &children {
        rewrite_tree(child, syllables, opts);
    }

    let mut new_children: Vec<Handle> = Vec::with_capacity(children.len());
    let mut changed = false;
    for child in children {
        let fragments = match &child.data {
            NodeData::Text { contents } => expand_text(&contents.borrow(), syllables, opts),
            _ => None,
        };
        match fragments {
            Some(nodes) => {
                changed = true;
                for node in nodes {
                    node.parent.set(Some(Rc::downgrade(parent)));
                    new_children.push(node);
                }
            }
            None => new_children.push(child),
        }
    }
    if changed {
        *parent.children.borrow_mut() = new_children;
    }
}

/// Build the replacement fragments for one text node, or `None` when the
/// node should be kept as-is (no letters, or nothing ended up emphasized).
fn expand_text(text: &str, syllables: &dyn Syllables, opts: &Options) -> Option<Vec<Handle>> {
    if !text.chars().any(|c| c.is_alphabetic()) {
        return None;
    }

    let mut nodes: Vec<Handle> = Vec::new();
    let mut plain = String::new();
    for piece in segment(text) {
        match piece {
            Piece::Separator(s) => plain.push_str(s),
            Piece::Word(word) => {
                for span in emphasize(word, syllables, opts.parity) {
                    if span.emphasized {
                        flush_plain(&mut plain, &mut nodes);
                        nodes.push(emphasis_node(&opts.emphasis_tag, span.text));
                    } else {
                        plain.push_str(span.text);
                    }
                }
            }
        }
    }

    if nodes.is_empty() {
        // No syllable was emphasized; the original node is already correct.
        return None;
    }
    flush_plain(&mut plain, &mut nodes);
    Some(nodes)
}

fn flush_plain(plain: &mut String, nodes: &mut Vec<Handle>) {
    if !plain.is_empty() {
        nodes.push(text_node(plain));
        plain.clear();
    }
}

fn text_node(text: &str) -> Handle {
    Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from(text)),
    })
}

fn emphasis_node(tag: &str, text: &str) -> Handle {
    let element = Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(Vec::new()),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    });
    let child = text_node(text);
    child.parent.set(Some(Rc::downgrade(&element)));
    element.children.borrow_mut().push(child);
    element
}

fn is_excluded(tag: &str, opts: &Options) -> bool {
    tag.eq_ignore_ascii_case(&opts.emphasis_tag)
        || opts
            .excluded_tags
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(tag))
}

/// Split a leading `<?xml ...?>` declaration off the input, if present.
fn split_xml_declaration(html: &str) -> (Option<&str>, &str) {
    let trimmed = html.trim_start();
    if trimmed.starts_with("<?xml") {
        if let Some(end) = trimmed.find("?>") {
            let declaration = &trimmed[..end + 2];
            let rest = trimmed[end + 2..].trim_start_matches(['\r', '\n']);
            return (Some(declaration), rest);
        }
    }
    (None, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Table(HashMap<&'static str, Vec<usize>>);

    impl Table {
        fn new(entries: &[(&'static str, &[usize])]) -> Table {
            Table(
                entries
                    .iter()
                    .map(|(word, breaks)| (*word, breaks.to_vec()))
                    .collect(),
            )
        }
    }

    impl Syllables for Table {
        fn breaks(&self, word: &str) -> Vec<usize> {
            self.0.get(word).cloned().unwrap_or_default()
        }
    }

    fn collect_text(handle: &Handle, out: &mut String) {
        match &handle.data {
            NodeData::Text { contents } => out.push_str(&contents.borrow()),
            _ => {
                for child in handle.children.borrow().iter() {
                    collect_text(child, out);
                }
            }
        }
    }

    fn text_content(html: &str) -> String {
        let dom = parse_html(html);
        let mut out = String::new();
        collect_text(&dom.document, &mut out);
        out
    }

    #[test]
    fn test_hello_world_end_to_end() {
        let table = Table::new(&[("hello", &[3])]);
        let output = rewrite_html(
            "<html><body><p>hello world</p></body></html>",
            &table,
            &Options::default(),
        );
        assert!(
            output.contains("<p>hel<b>lo</b> world</p>"),
            "unexpected output: {output}"
        );
    }

    #[test]
    fn test_letterless_text_is_untouched() {
        let table = Table::new(&[]);
        let html = "<html><body><p> 12 + 34 = 46 </p></body></html>";
        let output = rewrite_html(html, &table, &Options::default());
        let unrewritten = serialize_html(&parse_html(html));
        assert_eq!(output, unrewritten);
    }

    #[test]
    fn test_reconstruction_preserves_character_data() {
        let table = Table::new(&[("reading", &[4]), ("rhythm", &[4])]);
        let html = "<html><body><h1>On reading</h1>\
                    <p>A rhythm, a reading -- twice: reading!</p></body></html>";
        let output = rewrite_html(html, &table, &Options::default());
        assert_eq!(text_content(&output), text_content(html));
    }

    #[test]
    fn test_excluded_tags_at_any_depth() {
        let table = Table::new(&[("hello", &[3])]);
        let output = rewrite_html(
            "<html><body><pre><span><i>hello</i></span></pre><p>hello</p></body></html>",
            &table,
            &Options::default(),
        );
        assert!(output.contains("<pre><span><i>hello</i></span></pre>"));
        assert!(output.contains("<p>hel<b>lo</b></p>"));
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let table = Table::new(&[("hello", &[3]), ("syllable", &[3, 5])]);
        let opts = Options::default();
        let first = rewrite_html(
            "<html><body><p>hello syllable</p></body></html>",
            &table,
            &opts,
        );
        let second = rewrite_html(&first, &table, &opts);
        assert_eq!(first, second);
    }

    #[test]
    fn test_attributes_and_structure_preserved() {
        let table = Table::new(&[("hello", &[3])]);
        let output = rewrite_html(
            r#"<html><body><p class="intro" id="p1">hello</p></body></html>"#,
            &table,
            &Options::default(),
        );
        assert!(output.contains(r#"<p class="intro" id="p1">hel<b>lo</b></p>"#));
    }

    #[test]
    fn test_custom_emphasis_tag() {
        let table = Table::new(&[("hello", &[3])]);
        let opts = Options {
            emphasis_tag: "em".to_string(),
            ..Options::default()
        };
        let output = rewrite_html("<html><body><p>hello</p></body></html>", &table, &opts);
        assert!(output.contains("hel<em>lo</em>"));
    }

    #[test]
    fn test_xml_declaration_survives() {
        let table = Table::new(&[("hello", &[3])]);
        let html = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
                    <html><body><p>hello</p></body></html>";
        let output = rewrite_html(html, &table, &Options::default());
        assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(!output.contains("<!--?xml"));
        assert!(output.contains("hel<b>lo</b>"));
    }

    #[test]
    fn test_separators_pass_through_verbatim() {
        let table = Table::new(&[("hello", &[3])]);
        let output = rewrite_html(
            "<html><body><p>  hello,\thello...  </p></body></html>",
            &table,
            &Options::default(),
        );
        assert!(output.contains("  hel<b>lo</b>,\thel<b>lo</b>...  "));
    }

    #[test]
    fn test_comments_untouched() {
        let table = Table::new(&[("hello", &[3])]);
        let output = rewrite_html(
            "<html><body><!-- hello --><p>hello</p></body></html>",
            &table,
            &Options::default(),
        );
        assert!(output.contains("<!-- hello -->"));
        assert!(output.contains("hel<b>lo</b>"));
    }
}
