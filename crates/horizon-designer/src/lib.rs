//! Horizon Designer keeps a GUI component model and its hand-editable source
//! code in sync.
//!
//! A [`DesignSession`] parses one source file into a tree of components and
//! applies structural edits to both at once:
//!
//! - **Descriptions**: TOML [`DescriptorRegistry`] entries say how a type is
//!   constructed, which setters are properties and how children attach
//! - **Strategies**: every node carries a [`CreationSupport`], a
//!   [`VariableSupport`] and an [`Association`] that own its code fragments
//! - **Operations**: create, delete, move, reorder, rename, local/field
//!   conversion and regeneration, each atomic across source and model
//! - **Adapters**: [`SlotContainer`] and [`SequenceContainer`] views hide how
//!   a toolkit attaches children
//!
//! Structural changes are announced on the session's
//! [`Broadcast`](horizon_designer_core::Broadcast) bus.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_designer::{CreateRequest, DescriptorRegistry, DesignSession, SessionConfig};
//!
//! let source = "import javax.swing.*;\n\
//!               public class View extends JPanel {\n\
//!               \tpublic View() {\n\
//!               \t}\n\
//!               }\n";
//! let registry = Arc::new(DescriptorRegistry::builtin().unwrap());
//! let mut session = DesignSession::open(source, registry, SessionConfig::default()).unwrap();
//! let root = session.root().unwrap();
//!
//! let ok = session
//!     .create(root, 0, CreateRequest::new("javax.swing.JButton").with_creation("text"))
//!     .unwrap();
//! assert!(session.source().contains("JButton button = new JButton(\"New button\");"));
//!
//! session.rename(ok, "ok").unwrap();
//! assert!(session.source().contains("add(ok);"));
//! ```

mod association;
mod config;
mod creation;
pub mod description;
mod diagnostics;
mod error;
mod generic;
mod info;
pub mod naming;
mod ops;
mod parser;
mod resolve;
mod session;
mod variable;

pub use association::Association;
pub use config::SessionConfig;
pub use creation::{CreationSupport, ImplicitKind};
pub use description::{ComponentDescriptor, DescriptorLookup, DescriptorRegistry};
pub use diagnostics::{BadNode, DiagnosticsSink, SharedDiagnostics, TracingSink};
pub use error::{
    CapabilityError, ConfigError, DescriptionError, DesignerError, DesignerResult, ParseError,
    StructuralEditError,
};
pub use generic::{ChildSource, ContainerAdapter, SequenceContainer, SlotContainer};
pub use info::{ComponentInfo, PropertyValue};
pub use ops::{COMPONENT, Construction, CreateRequest, OperationState};
pub use resolve::TypeResolver;
pub use session::DesignSession;
pub use variable::{AnonymousAccess, VariableKind, VariableSupport};

static_assertions::assert_impl_all!(DesignSession: Send);
