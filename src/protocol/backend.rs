use thiserror::Error;

use crate::proto::{
    Concept, DataType, ValueObject,
    method::{method_iter_res, method_req, method_res},
    transaction::{Code, OpenReq},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    FailedPrecondition(String),
    #[error("operation {0} is not supported")]
    Unsupported(&'static str),
    #[error("internal error: {0}")]
    Internal(String),
}

impl BackendError {
    /// Status code reported to the client.
    pub fn code(&self) -> Code {
        match self {
            BackendError::InvalidArgument(_) => Code::InvalidArgument,
            BackendError::NotFound(_) => Code::NotFound,
            BackendError::FailedPrecondition(_) => Code::FailedPrecondition,
            BackendError::Unsupported(_) => Code::Unimplemented,
            BackendError::Internal(_) => Code::Internal,
        }
    }
}

pub type ConceptStream = Box<dyn Iterator<Item = Concept>>;

pub type ElementStream = Box<dyn Iterator<Item = method_iter_res::Res>>;

/// Answer to a concept method.
pub enum MethodReply {
    /// A complete response, in the slot of the request.
    Res(method_res::Res),
    /// Elements of an iterable operation. The server registers the stream and
    /// answers with an iterator id.
    Stream(ElementStream),
}

/// Storage engine served by a [`SessionServer`](super::SessionServer).
pub trait Backend: Send + Sync + 'static {
    type Tx: Transaction;

    fn open(&self, req: &OpenReq) -> Result<Self::Tx, BackendError>;
}

/// One open transaction. Lives on the connection's worker thread.
pub trait Transaction {
    fn commit(&mut self) -> Result<(), BackendError>;

    fn get_concept(&mut self, id: &str) -> Result<Option<Concept>, BackendError>;

    fn get_schema_concept(&mut self, label: &str) -> Result<Option<Concept>, BackendError>;

    fn get_attributes(&mut self, value: &ValueObject) -> Result<ConceptStream, BackendError>;

    fn put_entity_type(&mut self, label: &str) -> Result<Concept, BackendError>;

    fn put_relation_type(&mut self, label: &str) -> Result<Concept, BackendError>;

    fn put_attribute_type(
        &mut self,
        label: &str,
        data_type: DataType,
    ) -> Result<Concept, BackendError>;

    fn put_role(&mut self, label: &str) -> Result<Concept, BackendError>;

    fn put_rule(&mut self, label: &str, when: &str, then: &str) -> Result<Concept, BackendError>;

    fn concept_method(
        &mut self,
        id: &str,
        req: method_req::Req,
    ) -> Result<MethodReply, BackendError>;
}
