//! A small owned element tree.
//!
//! `scraper` parses the preview markup, but its tree is read-only. Export
//! needs to clone a subtree and rewrite styles on it, so parsed elements are
//! copied into this owned representation.

use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::{Error, Result};

/// Inline `style` declarations, sorted by property name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Style {
    props: BTreeMap<String, String>,
}

impl Style {
    /// Parse `"a: b; c: d"`. Malformed declarations are skipped.
    pub fn parse(s: &str) -> Self {
        let props = s
            .split(';')
            .filter_map(|decl| {
                let (k, v) = decl.split_once(':')?;
                let k = k.trim().to_ascii_lowercase();
                let v = v.trim();
                (!k.is_empty() && !v.is_empty()).then(|| (k, v.to_string()))
            })
            .collect();
        Self { props }
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.props.get(prop).map(String::as_str)
    }

    pub fn set(&mut self, prop: &str, value: impl Into<String>) {
        self.props.insert(prop.to_string(), value.into());
    }

    /// Drop every `border*` declaration and pin `border: none`.
    pub fn strip_borders(&mut self) {
        self.props.retain(|k, _| !k.starts_with("border"));
        self.set("border", "none");
    }

    /// A length in CSS pixels, e.g. `"12px"` or bare `"12"`.
    pub fn px(&self, prop: &str) -> Option<u32> {
        parse_px(self.get(prop)?)
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (k, v) in &self.props {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", k, v)?;
            first = false;
        }
        Ok(())
    }
}

pub(crate) fn parse_px(v: &str) -> Option<u32> {
    let v = v.trim();
    let num = v.strip_suffix("px").unwrap_or(v).trim();
    num.parse::<f32>().ok().filter(|n| *n >= 0.0).map(|n| n.round() as u32)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with its attributes, parsed inline style and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub style: Style,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            style: Style::default(),
            children: Vec::new(),
        }
    }

    /// Copy a `scraper` element and its subtree.
    pub fn from_scraper(el: ElementRef<'_>) -> Self {
        let mut out = Element::new(el.value().name());
        for (k, v) in el.value().attrs() {
            if k == "style" {
                out.style = Style::parse(v);
            } else {
                out.attrs.insert(k.to_string(), v.to_string());
            }
        }
        for child in el.children() {
            match child.value() {
                scraper::Node::Text(t) => {
                    let text: &str = t;
                    if !text.trim().is_empty() {
                        out.children.push(Node::Text(text.to_string()));
                    }
                }
                scraper::Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        out.children.push(Node::Element(Element::from_scraper(child_el)));
                    }
                }
                _ => {}
            }
        }
        out
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Depth-first search including `self`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.child_elements().find_map(|c| c.find_by_id(id))
    }

    /// Visit every descendant element (not `self`) mutably.
    pub fn for_each_descendant_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        for child in &mut self.children {
            if let Node::Element(e) = child {
                f(e);
                e.for_each_descendant_mut(f);
            }
        }
    }

    /// Every element with the given tag, `self` included, in document order.
    pub fn elements_by_tag<'a>(&'a self, tag: &str, out: &mut Vec<&'a Element>) {
        if self.tag == tag {
            out.push(self);
        }
        for c in self.child_elements() {
            c.elements_by_tag(tag, out);
        }
    }

    /// Concatenated text of the subtree, whitespace-collapsed.
    pub fn text_content(&self) -> String {
        let mut raw = String::new();
        self.collect_text(&mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn collect_text(&self, out: &mut String) {
        for c in &self.children {
            match c {
                Node::Text(t) => {
                    out.push(' ');
                    out.push_str(t);
                }
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    /// Serialize back to markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (k, v) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", k, escape_html(v));
        }
        if !self.style.is_empty() {
            let _ = write!(out, " style=\"{}\"", escape_html(&self.style.to_string()));
        }
        out.push('>');
        if is_void(&self.tag) {
            return;
        }
        for c in &self.children {
            match c {
                Node::Text(t) => out.push_str(&escape_html(t)),
                Node::Element(e) => e.write_html(out),
            }
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "meta" | "link" | "input")
}

/// Escape text for use in element content or a double-quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Parse a full document and return its `<body>` as an owned element.
pub fn parse_body(html: &str) -> Result<Element> {
    let document = Html::parse_document(html);
    let body_sel = Selector::parse("body")
        .map_err(|e| Error::RenderError(format!("bad selector: {:?}", e)))?;
    document
        .select(&body_sel)
        .next()
        .map(Element::from_scraper)
        .ok_or_else(|| Error::RenderError("document has no <body>".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<html><body>
        <div id="outer" style="border: 2px solid #000; padding: 4px">
            <p style="border-top: 1px solid #ccc">Olá &amp; bem-vindo</p>
            <img src="logo.png" alt="Logo" style="width: 40px">
        </div>
    </body></html>"#;

    #[test]
    fn style_parse_and_display() {
        let s = Style::parse("Width: 700px;; height:auto; bogus");
        assert_eq!(s.get("width"), Some("700px"));
        assert_eq!(s.px("width"), Some(700));
        assert_eq!(s.get("height"), Some("auto"));
        assert_eq!(s.px("height"), None);
        assert_eq!(s.to_string(), "height: auto; width: 700px");
    }

    #[test]
    fn parses_body_into_owned_tree() {
        let body = parse_body(DOC).unwrap();
        let outer = body.find_by_id("outer").unwrap();
        assert_eq!(outer.style.px("padding"), Some(4));
        assert_eq!(outer.text_content(), "Olá & bem-vindo");
        let mut imgs = Vec::new();
        outer.elements_by_tag("img", &mut imgs);
        assert_eq!(imgs.len(), 1);
        assert_eq!(imgs[0].attr("src"), Some("logo.png"));
    }

    #[test]
    fn strip_borders_touches_descendants_only() {
        let body = parse_body(DOC).unwrap();
        let mut outer = body.find_by_id("outer").unwrap().clone();
        outer.for_each_descendant_mut(&mut |e| e.style.strip_borders());
        assert_eq!(outer.style.get("border"), Some("2px solid #000"));
        let p = outer.child_elements().next().unwrap();
        assert_eq!(p.style.get("border-top"), None);
        assert_eq!(p.style.get("border"), Some("none"));
    }

    #[test]
    fn serializes_and_reparses() {
        let body = parse_body(DOC).unwrap();
        let outer = body.find_by_id("outer").unwrap();
        let html = format!("<html><body>{}</body></html>", outer.to_html());
        let again = parse_body(&html).unwrap();
        assert_eq!(again.find_by_id("outer").unwrap(), outer);
    }
}
