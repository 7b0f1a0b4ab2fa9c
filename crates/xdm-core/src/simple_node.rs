//! Small immutable in-memory tree implementing [`XdmNode`], used by tests and
//! benches as a node source.
//!
//! ```
//! use xdm_core::simple_node::{elem, text, attr};
//! use xdm_core::XdmNode;
//!
//! // <root id="r"><child>Hello</child><child>World</child></root>
//! let root = elem("root")
//!     .attr(attr("id", "r"))
//!     .child(elem("child").child(text("Hello")))
//!     .child(elem("child").child(text("World")))
//!     .build();
//!
//! assert_eq!(root.name().unwrap().local, "root");
//! assert_eq!(root.string_value(), "HelloWorld");
//! ```
use std::fmt;
use std::sync::Arc;

use crate::model::{NodeKind, QName, XdmNode};
use crate::xdm::XdmAtomicValue;

#[derive(Debug)]
struct Inner {
    kind: NodeKind,
    name: Option<QName>,
    value: Option<String>,
    typed: Option<Vec<XdmAtomicValue>>,
    attributes: Vec<SimpleNode>,
    children: Vec<SimpleNode>,
}

/// Arc-backed node; identity is pointer identity.
#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

fn local_name(name: &str) -> Option<QName> {
    Some(QName {
        prefix: None,
        local: name.to_string(),
        ns_uri: None,
    })
}

impl SimpleNode {
    fn leaf(kind: NodeKind, name: Option<QName>, value: &str) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            value: Some(value.to_string()),
            typed: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }))
    }

    pub fn document() -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Document, None)
    }
    pub fn element(name: &str) -> SimpleNodeBuilder {
        SimpleNodeBuilder::new(NodeKind::Element, local_name(name))
    }
    pub fn attribute(name: &str, value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Attribute, local_name(name), value)
    }
    pub fn text(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Text, None, value)
    }
    pub fn comment(value: &str) -> SimpleNode {
        Self::leaf(NodeKind::Comment, None, value)
    }

    pub fn children(&self) -> &[SimpleNode] {
        &self.0.children
    }
    pub fn attributes(&self) -> &[SimpleNode] {
        &self.0.attributes
    }
}

pub struct SimpleNodeBuilder {
    kind: NodeKind,
    name: Option<QName>,
    typed: Option<Vec<XdmAtomicValue>>,
    attributes: Vec<SimpleNode>,
    children: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(kind: NodeKind, name: Option<QName>) -> Self {
        Self {
            kind,
            name,
            typed: None,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.children.push(match child.into() {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        });
        self
    }

    #[must_use]
    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.attributes.push(attr);
        self
    }

    /// Annotate the node with a typed value (as a schema-validated node would have).
    #[must_use]
    pub fn typed(mut self, values: Vec<XdmAtomicValue>) -> Self {
        self.typed = Some(values);
        self
    }

    pub fn build(self) -> SimpleNode {
        SimpleNode(Arc::new(Inner {
            kind: self.kind,
            name: self.name,
            value: None,
            typed: self.typed,
            attributes: self.attributes,
            children: self.children,
        }))
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}
impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}
impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

// Convenience helpers for concise test code
pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNode::element(name)
}
pub fn text(v: &str) -> SimpleNode {
    SimpleNode::text(v)
}
pub fn attr(name: &str, v: &str) -> SimpleNode {
    SimpleNode::attribute(name, v)
}
pub fn comment(v: &str) -> SimpleNode {
    SimpleNode::comment(v)
}
pub fn doc() -> SimpleNodeBuilder {
    SimpleNode::document()
}

impl XdmNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind.clone()
    }
    fn name(&self) -> Option<QName> {
        self.0.name.clone()
    }
    fn string_value(&self) -> String {
        match self.0.kind {
            NodeKind::Text | NodeKind::Attribute | NodeKind::Comment => {
                self.0.value.clone().unwrap_or_default()
            }
            NodeKind::Element | NodeKind::Document => {
                fn dfs(n: &SimpleNode, out: &mut String) {
                    if n.0.kind == NodeKind::Text
                        && let Some(v) = &n.0.value
                    {
                        out.push_str(v);
                    }
                    for c in &n.0.children {
                        dfs(c, out);
                    }
                }
                let mut out = String::new();
                dfs(self, &mut out);
                out
            }
        }
    }
    fn typed_value(&self) -> Vec<XdmAtomicValue> {
        match &self.0.typed {
            Some(values) => values.clone(),
            None => vec![XdmAtomicValue::UntypedAtomic(self.string_value())],
        }
    }
}
