//! Transaction-level envelope.
//!
//! A transaction stream carries [`TxReq`] messages from the client and
//! [`TxRes`] messages back. Concept methods ride inside [`ConceptMethodReq`],
//! iterator pulls inside [`IterId`] under the `iterate` slot.
use super::{
    AttributeValue, Concept, DataType, Empty, IterId, Label, OneConcept, OptionalConcept,
    method::{MethodIterRes, MethodReq, MethodRes},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum TxType {
    Read = 0,
    Write = 1,
    Batch = 2,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct OpenReq {
    #[prost(string, tag = "1")]
    pub keyspace: String,
    #[prost(enumeration = "TxType", tag = "2")]
    pub tx_type: i32,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub password: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct ConceptId {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct PutAttributeType {
    #[prost(string, tag = "1")]
    pub label: String,
    #[prost(enumeration = "DataType", tag = "2")]
    pub data_type: i32,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct PutRule {
    #[prost(string, tag = "1")]
    pub label: String,
    #[prost(string, tag = "2")]
    pub when: String,
    #[prost(string, tag = "3")]
    pub then: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConceptMethodReq {
    /// Concept the method runs against.
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub method: Option<MethodReq>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConceptMethodRes {
    #[prost(message, optional, tag = "1")]
    pub response: Option<MethodRes>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxReq {
    #[prost(oneof = "tx_req::Req", tags = "1, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13")]
    pub req: Option<tx_req::Req>,
}

pub mod tx_req {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Req {
        #[prost(message, tag = "1")]
        Open(OpenReq),
        #[prost(message, tag = "2")]
        Commit(Empty),
        #[prost(message, tag = "4")]
        Iterate(IterId),
        #[prost(message, tag = "5")]
        GetSchemaConcept(Label),
        #[prost(message, tag = "6")]
        GetConcept(ConceptId),
        #[prost(message, tag = "7")]
        GetAttributes(AttributeValue),
        #[prost(message, tag = "8")]
        PutEntityType(Label),
        #[prost(message, tag = "9")]
        PutAttributeType(PutAttributeType),
        #[prost(message, tag = "10")]
        PutRelationType(Label),
        #[prost(message, tag = "11")]
        PutRole(Label),
        #[prost(message, tag = "12")]
        PutRule(PutRule),
        #[prost(message, tag = "13")]
        ConceptMethod(ConceptMethodReq),
    }

    impl Req {
        pub fn slot(&self) -> u32 {
            match self {
                Req::Open(_) => 1,
                Req::Commit(_) => 2,
                Req::Iterate(_) => 4,
                Req::GetSchemaConcept(_) => 5,
                Req::GetConcept(_) => 6,
                Req::GetAttributes(_) => 7,
                Req::PutEntityType(_) => 8,
                Req::PutAttributeType(_) => 9,
                Req::PutRelationType(_) => 10,
                Req::PutRole(_) => 11,
                Req::PutRule(_) => 12,
                Req::ConceptMethod(_) => 13,
            }
        }

        pub fn name(&self) -> &'static str {
            match self {
                Req::Open(_) => "Transaction.Open",
                Req::Commit(_) => "Transaction.Commit",
                Req::Iterate(_) => "Transaction.Iter",
                Req::GetSchemaConcept(_) => "Transaction.GetSchemaConcept",
                Req::GetConcept(_) => "Transaction.GetConcept",
                Req::GetAttributes(_) => "Transaction.GetAttributes",
                Req::PutEntityType(_) => "Transaction.PutEntityType",
                Req::PutAttributeType(_) => "Transaction.PutAttributeType",
                Req::PutRelationType(_) => "Transaction.PutRelationType",
                Req::PutRole(_) => "Transaction.PutRole",
                Req::PutRule(_) => "Transaction.PutRule",
                Req::ConceptMethod(_) => "Transaction.ConceptMethod",
            }
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRes {
    #[prost(oneof = "tx_res::Res", tags = "1, 2, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13")]
    pub res: Option<tx_res::Res>,
}

pub mod tx_res {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "1")]
        Open(Empty),
        #[prost(message, tag = "2")]
        Commit(Empty),
        #[prost(message, tag = "4")]
        Iterate(TxIterRes),
        #[prost(message, tag = "5")]
        GetSchemaConcept(OptionalConcept),
        #[prost(message, tag = "6")]
        GetConcept(OptionalConcept),
        #[prost(message, tag = "7")]
        GetAttributes(IterId),
        #[prost(message, tag = "8")]
        PutEntityType(OneConcept),
        #[prost(message, tag = "9")]
        PutAttributeType(OneConcept),
        #[prost(message, tag = "10")]
        PutRelationType(OneConcept),
        #[prost(message, tag = "11")]
        PutRole(OneConcept),
        #[prost(message, tag = "12")]
        PutRule(OneConcept),
        #[prost(message, tag = "13")]
        ConceptMethod(ConceptMethodRes),
    }

    impl Res {
        pub fn slot(&self) -> u32 {
            match self {
                Res::Open(_) => 1,
                Res::Commit(_) => 2,
                Res::Iterate(_) => 4,
                Res::GetSchemaConcept(_) => 5,
                Res::GetConcept(_) => 6,
                Res::GetAttributes(_) => 7,
                Res::PutEntityType(_) => 8,
                Res::PutAttributeType(_) => 9,
                Res::PutRelationType(_) => 10,
                Res::PutRole(_) => 11,
                Res::PutRule(_) => 12,
                Res::ConceptMethod(_) => 13,
            }
        }
    }
}

/// One pulled page: an element, or `done` once the iterator is exhausted.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxIterRes {
    #[prost(oneof = "tx_iter_res::Res", tags = "1, 3, 4")]
    pub res: Option<tx_iter_res::Res>,
}

pub mod tx_iter_res {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Res {
        #[prost(bool, tag = "1")]
        Done(bool),
        /// Element of a `GetAttributes` iterator.
        #[prost(message, tag = "3")]
        GetAttributes(OneConcept),
        #[prost(message, tag = "4")]
        ConceptMethod(MethodIterRes),
    }
}

/// gRPC-style status code, reported when the server aborts a transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Code {
    Ok = 0,
    Unknown = 2,
    InvalidArgument = 3,
    NotFound = 5,
    FailedPrecondition = 9,
    Unimplemented = 12,
    Internal = 13,
}

#[derive(Clone, PartialEq, Eq, ::prost::Message)]
pub struct Status {
    #[prost(enumeration = "Code", tag = "1")]
    pub code: i32,
    #[prost(string, tag = "2")]
    pub message: String,
}

/// Server-to-client frame on a stream transport.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerFrame {
    #[prost(oneof = "server_frame::Body", tags = "1, 2")]
    pub body: Option<server_frame::Body>,
}

pub mod server_frame {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Body {
        #[prost(message, tag = "1")]
        Res(TxRes),
        #[prost(message, tag = "2")]
        Status(Status),
    }
}

impl From<tx_req::Req> for TxReq {
    fn from(req: tx_req::Req) -> Self {
        Self { req: Some(req) }
    }
}

impl From<tx_res::Res> for TxRes {
    fn from(res: tx_res::Res) -> Self {
        Self { res: Some(res) }
    }
}

impl From<tx_iter_res::Res> for TxIterRes {
    fn from(res: tx_iter_res::Res) -> Self {
        Self { res: Some(res) }
    }
}

impl TxReq {
    /// Wraps a concept method call against `concept`.
    pub fn concept_method(concept: &Concept, method: MethodReq) -> Self {
        tx_req::Req::ConceptMethod(ConceptMethodReq {
            id: concept.id.clone(),
            method: Some(method),
        })
        .into()
    }

    pub fn iterate(id: i32) -> Self {
        tx_req::Req::Iterate(IterId { id }).into()
    }
}

impl TxRes {
    pub fn done() -> Self {
        tx_res::Res::Iterate(tx_iter_res::Res::Done(true).into()).into()
    }

    pub fn concept_method(res: MethodRes) -> Self {
        tx_res::Res::ConceptMethod(ConceptMethodRes {
            response: Some(res),
        })
        .into()
    }
}
