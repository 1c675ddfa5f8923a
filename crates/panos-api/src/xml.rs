// Owned XML element tree
//
// PAN-OS answers every XML API call with a small `<response>` document.
// `roxmltree` borrows from the input text, so responses are converted once
// into an owned tree that can outlive the HTTP body and be walked by the
// endpoint modules.

use crate::error::Error;

/// An owned XML element: tag name, attributes, trimmed direct text and children.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Parse a document and return its root element.
    pub fn parse(input: &str) -> Result<Self, Error> {
        let doc = roxmltree::Document::parse(input).map_err(|e| Error::Deserialization {
            message: format!("invalid XML: {e}"),
            body: input.to_owned(),
        })?;
        Ok(Self::from_node(doc.root_element()))
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let mut text = String::new();
        let mut children = Vec::new();
        for child in node.children() {
            if child.is_element() {
                children.push(Self::from_node(child));
            } else if let Some(t) = child.text().filter(|_| child.is_text()) {
                text.push_str(t);
            }
        }
        Self {
            name: node.tag_name().name().to_owned(),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_owned(), a.value().to_owned()))
                .collect(),
            text: text.trim().to_owned(),
            children,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Trimmed direct text content; empty when the element has none.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Direct text content, or `None` if empty.
    pub fn text_opt(&self) -> Option<&str> {
        (!self.text.is_empty()).then_some(self.text.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First direct child with the given tag name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// `<entry>` children, the PAN-OS list convention.
    pub fn entries(&self) -> impl Iterator<Item = &Element> {
        self.children_named("entry")
    }

    /// Walk a path of direct-child tag names.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }

    /// Text at the end of a child path, if present and non-empty.
    pub fn find_text(&self, path: &[&str]) -> Option<&str> {
        self.find(path).and_then(Element::text_opt)
    }

    /// Depth-first search for the first descendant with the given tag name.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find_map(|c| if c.name == name { Some(c) } else { c.descendant(name) })
    }

    /// All non-empty text in this subtree, in document order.
    pub fn collect_text(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_text_into(&mut out);
        out
    }

    fn collect_text_into(&self, out: &mut Vec<String>) {
        if !self.text.is_empty() {
            out.push(self.text.clone());
        }
        for child in &self.children {
            child.collect_text_into(out);
        }
    }

    /// Member values of a `<member>` list under `name`.
    pub fn members(&self, name: &str) -> Vec<String> {
        self.child(name)
            .map(|list| {
                list.children_named("member")
                    .filter_map(Element::text_opt)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Serialize this subtree back to compact XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (k, v) in &self.attributes {
            out.push_str(&format!(" {k}=\"{}\"", escape(v)));
        }
        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&escape(&self.text));
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// Escape a value for inclusion in XML text or a double-quoted attribute.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Build `<entry name="..."/>`, the element PAN-OS uses for named list members.
pub fn entry(name: &str) -> String {
    format!("<entry name=\"{}\"/>", escape(name))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
        <response status="success">
          <result>
            <system>
              <hostname>pano-01</hostname>
              <model>Panorama</model>
            </system>
            <devices>
              <entry name="007200004214"><connected>yes</connected></entry>
              <entry name="007200004215"><connected>no</connected></entry>
            </devices>
            <msg><line><![CDATA[first]]></line><line>second</line></msg>
          </result>
        </response>"#;

    #[test]
    fn walks_paths_and_attributes() {
        let root = Element::parse(SAMPLE).unwrap();
        assert_eq!(root.name(), "response");
        assert_eq!(root.attr("status"), Some("success"));
        assert_eq!(
            root.find_text(&["result", "system", "model"]),
            Some("Panorama")
        );
        assert_eq!(root.find_text(&["result", "system", "serial"]), None);

        let names: Vec<_> = root
            .find(&["result", "devices"])
            .unwrap()
            .entries()
            .filter_map(|e| e.attr("name"))
            .collect();
        assert_eq!(names, vec!["007200004214", "007200004215"]);
    }

    #[test]
    fn cdata_is_text() {
        let root = Element::parse(SAMPLE).unwrap();
        let msg = root.descendant("msg").unwrap();
        assert_eq!(msg.collect_text(), vec!["first", "second"]);
    }

    #[test]
    fn malformed_input_keeps_body() {
        let err = Element::parse("<response><unclosed></response>").unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert!(body.contains("unclosed")),
            other => panic!("expected Deserialization, got {other:?}"),
        }
    }

    #[test]
    fn entry_element_is_escaped() {
        assert_eq!(entry("Lab & Test"), r#"<entry name="Lab &amp; Test"/>"#);
        assert_eq!(escape("<a'b\">"), "&lt;a&apos;b&quot;&gt;");
    }

    #[test]
    fn to_xml_round_trips_structure() {
        let root = Element::parse(r#"<job><id>4</id><details/></job>"#).unwrap();
        assert_eq!(root.to_xml(), "<job><id>4</id><details/></job>");
    }

    #[test]
    fn to_xml_escapes_attributes() {
        let root =
            Element::parse(r#"<entry name="Bob&apos;s &amp; co"><line>a &lt; b</line></entry>"#)
                .unwrap();
        assert_eq!(
            root.to_xml(),
            "<entry name=\"Bob&apos;s &amp; co\"><line>a &lt; b</line></entry>"
        );
    }
}
