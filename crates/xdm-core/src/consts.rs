//! Well-known namespace and collation URIs.

pub const FNS: &str = "http://www.w3.org/2005/xpath-functions";
pub const XS: &str = "http://www.w3.org/2001/XMLSchema";
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";

pub const CODEPOINT_URI: &str = "http://www.w3.org/2005/xpath-functions/collation/codepoint";
pub const SIMPLE_CASE_URI: &str = "urn:xdm-core:collation:simple-case";
pub const SIMPLE_ACCENT_URI: &str = "urn:xdm-core:collation:simple-accent";
pub const SIMPLE_CASE_ACCENT_URI: &str = "urn:xdm-core:collation:simple-case-accent";
