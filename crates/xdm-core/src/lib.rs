pub mod consts;
pub mod engine;
pub mod model;
pub mod simple_node;
pub mod xdm;

pub use engine::aggregate::{avg, distinct_values, max, min, sum, sum_with_zero};
pub use engine::collation::{Collation, CollationRegistry, resolve_collation};
pub use engine::comparison::{Comparator, ComparisonOp};
pub use engine::functions::default_function_registry;
pub use engine::runtime::{DynamicContext, DynamicContextBuilder, Error, ErrorCode};
pub use engine::scalar::{abs, ebv, substring_before};
pub use model::{NodeKind, QName, XdmNode};
pub use simple_node::{SimpleNode, SimpleNodeBuilder, attr, doc as simple_doc, elem, text};
pub use xdm::{AtomicType, ExpandedName, IntegerType, StringType, XdmAtomicValue, XdmItem, XdmSequence};
