pub mod aggregate;
pub mod casting;
pub mod collation;
pub mod comparison;
pub mod eq;
pub mod functions;
pub mod numeric;
pub mod runtime;
pub mod scalar;
