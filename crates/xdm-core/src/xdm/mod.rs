//! Items, sequences and the atomic value universe.

use core::fmt;

pub mod atomic;
pub mod duration;
pub mod temporal;

pub use atomic::{AtomicType, IntegerType, StringType, XdmAtomicValue};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    pub fn ns(ns_uri: &str, local: impl Into<String>) -> Self {
        Self::new(Some(ns_uri.to_string()), local)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{ns}}}{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

pub type XdmSequence<N> = Vec<XdmItem<N>>;

#[derive(Debug, Clone, PartialEq)]
pub enum XdmItem<N> {
    Node(N),
    Atomic(XdmAtomicValue),
}

impl<N> XdmItem<N> {
    pub fn as_atomic(&self) -> Option<&XdmAtomicValue> {
        match self {
            XdmItem::Atomic(a) => Some(a),
            XdmItem::Node(_) => None,
        }
    }
}

// Allow passing a node directly where an XdmItem<N> is expected.
impl<N> From<N> for XdmItem<N> {
    fn from(n: N) -> Self {
        XdmItem::Node(n)
    }
}

impl<N> fmt::Display for XdmItem<N>
where
    N: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XdmItem::Node(_) => write!(f, "<node>"),
            XdmItem::Atomic(a) => write!(f, "{a}"),
        }
    }
}
