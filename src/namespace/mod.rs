//! Namespace construction.
//!
//! Each loaded package gets an export table, an import table built against
//! its dependencies' export tables, and its private definitions. Together
//! they fix what the package's own code can see, independent of whatever is
//! attached to the search path later.

pub mod errors;
pub mod exports;
pub mod imports;
pub mod registry;

pub use errors::NamespaceError;
pub use exports::ExportTable;
pub use imports::{ImportBinding, ImportTable};
pub use registry::{build_namespace, Namespace, NamespaceRegistry};
