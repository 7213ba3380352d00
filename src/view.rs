//! A small declarative view tree.
//!
//! Widgets build [`Node`]s instead of concatenating markup. Text and attribute
//! values are escaped when the tree is rendered, so nothing built through this
//! module can inject markup.

use std::fmt::Write;

use askama_escape::{escape, Html};

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Fragment(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

pub fn el(tag: &'static str) -> Element {
    Element {
        tag,
        attrs: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(value: impl Into<String>) -> Node {
    Node::Text(value.into())
}

pub fn fragment(nodes: impl IntoIterator<Item = Node>) -> Node {
    Node::Fragment(nodes.into_iter().collect())
}

impl Element {
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn class(self, value: impl Into<String>) -> Self {
        self.attr("class", value)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(nodes);
        self
    }

    pub fn text(self, value: impl Into<String>) -> Self {
        self.child(text(value))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Node::Text(value) => {
                let _ = write!(out, "{}", escape(value, Html));
            }
            Node::Fragment(nodes) => nodes.iter().for_each(|node| node.render_into(out)),
            Node::Element(element) => {
                out.push('<');
                out.push_str(element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape(value, Html));
                }
                out.push('>');
                if VOID_TAGS.contains(&element.tag) {
                    return;
                }
                element.children.iter().for_each(|child| child.render_into(out));
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }

    /// Concatenated text content, unescaped.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(value) => value.clone(),
            Node::Fragment(nodes) => nodes.iter().map(Node::text_content).collect(),
            Node::Element(element) => element.children.iter().map(Node::text_content).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Node::Fragment(nodes) => nodes.iter().all(Node::is_empty),
            Node::Text(value) => value.is_empty(),
            Node::Element(_) => false,
        }
    }
}

/// Escapes a value for use in HTML text or a quoted attribute.
pub fn escape_html(raw: &str) -> String {
    escape(raw, Html).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_and_attributes_are_escaped() {
        let node: Node = el("img")
            .attr("src", "x\" onerror=\"alert(1)")
            .into();
        assert_eq!(node.render(), "<img src=\"x&quot; onerror=&quot;alert(1)\">");

        let node: Node = el("span").text("<script>alert('x')</script>").into();
        assert_eq!(
            node.render(),
            "<span>&lt;script&gt;alert(&#x27;x&#x27;)&lt;/script&gt;</span>"
        );
    }

    #[test]
    fn escape_html_covers_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#x27;Jerry&#x27;&lt;/a&gt;"
        );
        assert_eq!(escape_html("2026-10-17"), "2026-10-17");
    }

    #[test]
    fn nested_tree_renders_in_order() {
        let node: Node = el("tr")
            .child(el("td").class("time-slot").text("08:00"))
            .children([text("a"), text("b")])
            .into();
        assert_eq!(node.render(), "<tr><td class=\"time-slot\">08:00</td>ab</tr>");
        assert_eq!(node.text_content(), "08:00ab");
    }

    #[test]
    fn empty_fragment_is_empty() {
        assert!(fragment(Vec::new()).is_empty());
        assert!(!fragment([Node::from(el("p"))]).is_empty());
    }
}
