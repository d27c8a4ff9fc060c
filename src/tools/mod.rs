//! Tool infrastructure — catalog, credentials, dispatch, envelopes.
//!
//! The catalog owns tool metadata and argument validation; the dispatcher
//! binds each tool to a [`SequenceClient`](crate::client::SequenceClient) call
//! and renders every outcome as an [`Envelope`].

pub mod catalog;
pub mod credentials;
pub mod dispatcher;
pub mod envelope;

pub use catalog::{ParamDef, ParamType, ToolCatalog, ToolDescriptor, ToolEntry, GET_ACCOUNTS, TRIGGER_RULE};
pub use credentials::{CredentialProvider, EnvCredentials, StaticCredentials};
pub use dispatcher::ToolDispatcher;
pub use envelope::{Envelope, ErrorEnvelope};
