//! The `Method` envelope.
//!
//! One request message and one response message multiplex the whole catalog of
//! concept operations. The operation is identified by which oneof slot is
//! populated; a request slot and its response slot share the same number.
//! Iterable operations answer with an [`IterId`] in their response slot and deliver
//! their elements through [`MethodIterRes`], again under the same slot number.
use super::{
    AttributeValue, Concept, ConceptList, Empty, Flag, IterId, Label, OneConcept, OptionalConcept,
    OptionalDataType, OptionalPattern, Regex, RolePlayer,
};

/// Slots whose operation answers with an iterator.
pub const ITERABLE_SLOTS: [u32; 16] = [
    205, 206, 401, 402, 502, 503, 504, 505, 701, 902, 903, 904, 905, 1000, 1001, 1101,
];

/// Human readable operation name for a slot number.
pub fn operation_name(slot: u32) -> &'static str {
    match slot {
        100 => "Concept.Delete",
        200 => "SchemaConcept.IsImplicit",
        201 => "SchemaConcept.GetLabel",
        202 => "SchemaConcept.SetLabel",
        203 => "SchemaConcept.GetSup",
        204 => "SchemaConcept.SetSup",
        205 => "SchemaConcept.Sups",
        206 => "SchemaConcept.Subs",
        300 => "Rule.When",
        301 => "Rule.Then",
        401 => "Role.Relations",
        402 => "Role.Players",
        500 => "Type.IsAbstract",
        501 => "Type.SetAbstract",
        502 => "Type.Instances",
        503 => "Type.Keys",
        504 => "Type.Attributes",
        505 => "Type.Playing",
        506 => "Type.Has",
        507 => "Type.Key",
        508 => "Type.Plays",
        509 => "Type.Unhas",
        510 => "Type.Unkey",
        511 => "Type.Unplay",
        600 => "EntityType.Create",
        700 => "RelationType.Create",
        701 => "RelationType.Roles",
        702 => "RelationType.Relates",
        703 => "RelationType.Unrelate",
        800 => "AttributeType.Create",
        801 => "AttributeType.Attribute",
        802 => "AttributeType.DataType",
        803 => "AttributeType.GetRegex",
        804 => "AttributeType.SetRegex",
        900 => "Thing.Type",
        901 => "Thing.IsInferred",
        902 => "Thing.Keys",
        903 => "Thing.Attributes",
        904 => "Thing.Relations",
        905 => "Thing.Roles",
        906 => "Thing.Relhas",
        907 => "Thing.Unhas",
        1000 => "Relation.RolePlayersMap",
        1001 => "Relation.RolePlayers",
        1002 => "Relation.Assign",
        1003 => "Relation.Unassign",
        1100 => "Attribute.Value",
        1101 => "Attribute.Owners",
        _ => "Unknown",
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MethodReq {
    #[prost(
        oneof = "method_req::Req",
        tags = "100, 200, 201, 202, 203, 204, 205, 206, 300, 301, 401, 402, 500, 501, 502, 503, 504, 505, 506, 507, 508, 509, 510, 511, 600, 700, 701, 702, 703, 800, 801, 802, 803, 804, 900, 901, 902, 903, 904, 905, 906, 907, 1000, 1001, 1002, 1003, 1100, 1101"
    )]
    pub req: Option<method_req::Req>,
}

pub mod method_req {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Req {
        #[prost(message, tag = "100")]
        ConceptDelete(Empty),

        #[prost(message, tag = "200")]
        SchemaConceptIsImplicit(Empty),
        #[prost(message, tag = "201")]
        SchemaConceptGetLabel(Empty),
        #[prost(message, tag = "202")]
        SchemaConceptSetLabel(Label),
        #[prost(message, tag = "203")]
        SchemaConceptGetSup(Empty),
        #[prost(message, tag = "204")]
        SchemaConceptSetSup(OneConcept),
        #[prost(message, tag = "205")]
        SchemaConceptSups(Empty),
        #[prost(message, tag = "206")]
        SchemaConceptSubs(Empty),

        #[prost(message, tag = "300")]
        RuleWhen(Empty),
        #[prost(message, tag = "301")]
        RuleThen(Empty),

        #[prost(message, tag = "401")]
        RoleRelations(Empty),
        #[prost(message, tag = "402")]
        RolePlayers(Empty),

        #[prost(message, tag = "500")]
        TypeIsAbstract(Empty),
        #[prost(message, tag = "501")]
        TypeSetAbstract(Flag),
        #[prost(message, tag = "502")]
        TypeInstances(Empty),
        #[prost(message, tag = "503")]
        TypeKeys(Empty),
        #[prost(message, tag = "504")]
        TypeAttributes(Empty),
        #[prost(message, tag = "505")]
        TypePlaying(Empty),
        #[prost(message, tag = "506")]
        TypeHas(OneConcept),
        #[prost(message, tag = "507")]
        TypeKey(OneConcept),
        #[prost(message, tag = "508")]
        TypePlays(OneConcept),
        #[prost(message, tag = "509")]
        TypeUnhas(OneConcept),
        #[prost(message, tag = "510")]
        TypeUnkey(OneConcept),
        #[prost(message, tag = "511")]
        TypeUnplay(OneConcept),

        #[prost(message, tag = "600")]
        EntityTypeCreate(Empty),

        #[prost(message, tag = "700")]
        RelationTypeCreate(Empty),
        #[prost(message, tag = "701")]
        RelationTypeRoles(Empty),
        #[prost(message, tag = "702")]
        RelationTypeRelates(OneConcept),
        #[prost(message, tag = "703")]
        RelationTypeUnrelate(OneConcept),

        #[prost(message, tag = "800")]
        AttributeTypeCreate(AttributeValue),
        #[prost(message, tag = "801")]
        AttributeTypeAttribute(AttributeValue),
        #[prost(message, tag = "802")]
        AttributeTypeDataType(Empty),
        #[prost(message, tag = "803")]
        AttributeTypeGetRegex(Empty),
        #[prost(message, tag = "804")]
        AttributeTypeSetRegex(Regex),

        #[prost(message, tag = "900")]
        ThingType(Empty),
        #[prost(message, tag = "901")]
        ThingIsInferred(Empty),
        #[prost(message, tag = "902")]
        ThingKeys(ConceptList),
        #[prost(message, tag = "903")]
        ThingAttributes(ConceptList),
        #[prost(message, tag = "904")]
        ThingRelations(ConceptList),
        #[prost(message, tag = "905")]
        ThingRoles(Empty),
        #[prost(message, tag = "906")]
        ThingRelhas(OneConcept),
        #[prost(message, tag = "907")]
        ThingUnhas(OneConcept),

        #[prost(message, tag = "1000")]
        RelationRolePlayersMap(Empty),
        #[prost(message, tag = "1001")]
        RelationRolePlayers(ConceptList),
        #[prost(message, tag = "1002")]
        RelationAssign(RolePlayer),
        #[prost(message, tag = "1003")]
        RelationUnassign(RolePlayer),

        #[prost(message, tag = "1100")]
        AttributeValue(Empty),
        #[prost(message, tag = "1101")]
        AttributeOwners(Empty),
    }

    impl Req {
        /// Oneof field number of the populated slot.
        pub fn slot(&self) -> u32 {
            match self {
                Req::ConceptDelete(_) => 100,
                Req::SchemaConceptIsImplicit(_) => 200,
                Req::SchemaConceptGetLabel(_) => 201,
                Req::SchemaConceptSetLabel(_) => 202,
                Req::SchemaConceptGetSup(_) => 203,
                Req::SchemaConceptSetSup(_) => 204,
                Req::SchemaConceptSups(_) => 205,
                Req::SchemaConceptSubs(_) => 206,
                Req::RuleWhen(_) => 300,
                Req::RuleThen(_) => 301,
                Req::RoleRelations(_) => 401,
                Req::RolePlayers(_) => 402,
                Req::TypeIsAbstract(_) => 500,
                Req::TypeSetAbstract(_) => 501,
                Req::TypeInstances(_) => 502,
                Req::TypeKeys(_) => 503,
                Req::TypeAttributes(_) => 504,
                Req::TypePlaying(_) => 505,
                Req::TypeHas(_) => 506,
                Req::TypeKey(_) => 507,
                Req::TypePlays(_) => 508,
                Req::TypeUnhas(_) => 509,
                Req::TypeUnkey(_) => 510,
                Req::TypeUnplay(_) => 511,
                Req::EntityTypeCreate(_) => 600,
                Req::RelationTypeCreate(_) => 700,
                Req::RelationTypeRoles(_) => 701,
                Req::RelationTypeRelates(_) => 702,
                Req::RelationTypeUnrelate(_) => 703,
                Req::AttributeTypeCreate(_) => 800,
                Req::AttributeTypeAttribute(_) => 801,
                Req::AttributeTypeDataType(_) => 802,
                Req::AttributeTypeGetRegex(_) => 803,
                Req::AttributeTypeSetRegex(_) => 804,
                Req::ThingType(_) => 900,
                Req::ThingIsInferred(_) => 901,
                Req::ThingKeys(_) => 902,
                Req::ThingAttributes(_) => 903,
                Req::ThingRelations(_) => 904,
                Req::ThingRoles(_) => 905,
                Req::ThingRelhas(_) => 906,
                Req::ThingUnhas(_) => 907,
                Req::RelationRolePlayersMap(_) => 1000,
                Req::RelationRolePlayers(_) => 1001,
                Req::RelationAssign(_) => 1002,
                Req::RelationUnassign(_) => 1003,
                Req::AttributeValue(_) => 1100,
                Req::AttributeOwners(_) => 1101,
            }
        }

        pub fn name(&self) -> &'static str {
            operation_name(self.slot())
        }

        pub fn is_iterable(&self) -> bool {
            ITERABLE_SLOTS.contains(&self.slot())
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MethodRes {
    #[prost(
        oneof = "method_res::Res",
        tags = "100, 200, 201, 202, 203, 204, 205, 206, 300, 301, 401, 402, 500, 501, 502, 503, 504, 505, 506, 507, 508, 509, 510, 511, 600, 700, 701, 702, 703, 800, 801, 802, 803, 804, 900, 901, 902, 903, 904, 905, 906, 907, 1000, 1001, 1002, 1003, 1100, 1101"
    )]
    pub res: Option<method_res::Res>,
}

pub mod method_res {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "100")]
        ConceptDelete(Empty),

        #[prost(message, tag = "200")]
        SchemaConceptIsImplicit(Flag),
        #[prost(message, tag = "201")]
        SchemaConceptGetLabel(Label),
        #[prost(message, tag = "202")]
        SchemaConceptSetLabel(Empty),
        #[prost(message, tag = "203")]
        SchemaConceptGetSup(OptionalConcept),
        #[prost(message, tag = "204")]
        SchemaConceptSetSup(Empty),
        #[prost(message, tag = "205")]
        SchemaConceptSups(IterId),
        #[prost(message, tag = "206")]
        SchemaConceptSubs(IterId),

        #[prost(message, tag = "300")]
        RuleWhen(OptionalPattern),
        #[prost(message, tag = "301")]
        RuleThen(OptionalPattern),

        #[prost(message, tag = "401")]
        RoleRelations(IterId),
        #[prost(message, tag = "402")]
        RolePlayers(IterId),

        #[prost(message, tag = "500")]
        TypeIsAbstract(Flag),
        #[prost(message, tag = "501")]
        TypeSetAbstract(Empty),
        #[prost(message, tag = "502")]
        TypeInstances(IterId),
        #[prost(message, tag = "503")]
        TypeKeys(IterId),
        #[prost(message, tag = "504")]
        TypeAttributes(IterId),
        #[prost(message, tag = "505")]
        TypePlaying(IterId),
        #[prost(message, tag = "506")]
        TypeHas(Empty),
        #[prost(message, tag = "507")]
        TypeKey(Empty),
        #[prost(message, tag = "508")]
        TypePlays(Empty),
        #[prost(message, tag = "509")]
        TypeUnhas(Empty),
        #[prost(message, tag = "510")]
        TypeUnkey(Empty),
        #[prost(message, tag = "511")]
        TypeUnplay(Empty),

        #[prost(message, tag = "600")]
        EntityTypeCreate(OneConcept),

        #[prost(message, tag = "700")]
        RelationTypeCreate(OneConcept),
        #[prost(message, tag = "701")]
        RelationTypeRoles(IterId),
        #[prost(message, tag = "702")]
        RelationTypeRelates(Empty),
        #[prost(message, tag = "703")]
        RelationTypeUnrelate(Empty),

        #[prost(message, tag = "800")]
        AttributeTypeCreate(OneConcept),
        #[prost(message, tag = "801")]
        AttributeTypeAttribute(OptionalConcept),
        #[prost(message, tag = "802")]
        AttributeTypeDataType(OptionalDataType),
        #[prost(message, tag = "803")]
        AttributeTypeGetRegex(Regex),
        #[prost(message, tag = "804")]
        AttributeTypeSetRegex(Empty),

        #[prost(message, tag = "900")]
        ThingType(OneConcept),
        #[prost(message, tag = "901")]
        ThingIsInferred(Flag),
        #[prost(message, tag = "902")]
        ThingKeys(IterId),
        #[prost(message, tag = "903")]
        ThingAttributes(IterId),
        #[prost(message, tag = "904")]
        ThingRelations(IterId),
        #[prost(message, tag = "905")]
        ThingRoles(IterId),
        #[prost(message, tag = "906")]
        ThingRelhas(OneConcept),
        #[prost(message, tag = "907")]
        ThingUnhas(Empty),

        #[prost(message, tag = "1000")]
        RelationRolePlayersMap(IterId),
        #[prost(message, tag = "1001")]
        RelationRolePlayers(IterId),
        #[prost(message, tag = "1002")]
        RelationAssign(Empty),
        #[prost(message, tag = "1003")]
        RelationUnassign(Empty),

        #[prost(message, tag = "1100")]
        AttributeValue(AttributeValue),
        #[prost(message, tag = "1101")]
        AttributeOwners(IterId),
    }

    impl Res {
        pub fn slot(&self) -> u32 {
            match self {
                Res::ConceptDelete(_) => 100,
                Res::SchemaConceptIsImplicit(_) => 200,
                Res::SchemaConceptGetLabel(_) => 201,
                Res::SchemaConceptSetLabel(_) => 202,
                Res::SchemaConceptGetSup(_) => 203,
                Res::SchemaConceptSetSup(_) => 204,
                Res::SchemaConceptSups(_) => 205,
                Res::SchemaConceptSubs(_) => 206,
                Res::RuleWhen(_) => 300,
                Res::RuleThen(_) => 301,
                Res::RoleRelations(_) => 401,
                Res::RolePlayers(_) => 402,
                Res::TypeIsAbstract(_) => 500,
                Res::TypeSetAbstract(_) => 501,
                Res::TypeInstances(_) => 502,
                Res::TypeKeys(_) => 503,
                Res::TypeAttributes(_) => 504,
                Res::TypePlaying(_) => 505,
                Res::TypeHas(_) => 506,
                Res::TypeKey(_) => 507,
                Res::TypePlays(_) => 508,
                Res::TypeUnhas(_) => 509,
                Res::TypeUnkey(_) => 510,
                Res::TypeUnplay(_) => 511,
                Res::EntityTypeCreate(_) => 600,
                Res::RelationTypeCreate(_) => 700,
                Res::RelationTypeRoles(_) => 701,
                Res::RelationTypeRelates(_) => 702,
                Res::RelationTypeUnrelate(_) => 703,
                Res::AttributeTypeCreate(_) => 800,
                Res::AttributeTypeAttribute(_) => 801,
                Res::AttributeTypeDataType(_) => 802,
                Res::AttributeTypeGetRegex(_) => 803,
                Res::AttributeTypeSetRegex(_) => 804,
                Res::ThingType(_) => 900,
                Res::ThingIsInferred(_) => 901,
                Res::ThingKeys(_) => 902,
                Res::ThingAttributes(_) => 903,
                Res::ThingRelations(_) => 904,
                Res::ThingRoles(_) => 905,
                Res::ThingRelhas(_) => 906,
                Res::ThingUnhas(_) => 907,
                Res::RelationRolePlayersMap(_) => 1000,
                Res::RelationRolePlayers(_) => 1001,
                Res::RelationAssign(_) => 1002,
                Res::RelationUnassign(_) => 1003,
                Res::AttributeValue(_) => 1100,
                Res::AttributeOwners(_) => 1101,
            }
        }

        /// Iterator id carried by an iterable slot.
        pub fn iter_id(&self) -> Option<i32> {
            match self {
                Res::SchemaConceptSups(iter)
                | Res::SchemaConceptSubs(iter)
                | Res::RoleRelations(iter)
                | Res::RolePlayers(iter)
                | Res::TypeInstances(iter)
                | Res::TypeKeys(iter)
                | Res::TypeAttributes(iter)
                | Res::TypePlaying(iter)
                | Res::RelationTypeRoles(iter)
                | Res::ThingKeys(iter)
                | Res::ThingAttributes(iter)
                | Res::ThingRelations(iter)
                | Res::ThingRoles(iter)
                | Res::RelationRolePlayersMap(iter)
                | Res::RelationRolePlayers(iter)
                | Res::AttributeOwners(iter) => Some(iter.id),
                _ => None,
            }
        }

        /// Iterable response for `slot` carrying iterator `id`.
        pub fn iterator(slot: u32, id: i32) -> Option<Res> {
            let iter = IterId { id };
            Some(match slot {
                205 => Res::SchemaConceptSups(iter),
                206 => Res::SchemaConceptSubs(iter),
                401 => Res::RoleRelations(iter),
                402 => Res::RolePlayers(iter),
                502 => Res::TypeInstances(iter),
                503 => Res::TypeKeys(iter),
                504 => Res::TypeAttributes(iter),
                505 => Res::TypePlaying(iter),
                701 => Res::RelationTypeRoles(iter),
                902 => Res::ThingKeys(iter),
                903 => Res::ThingAttributes(iter),
                904 => Res::ThingRelations(iter),
                905 => Res::ThingRoles(iter),
                1000 => Res::RelationRolePlayersMap(iter),
                1001 => Res::RelationRolePlayers(iter),
                1101 => Res::AttributeOwners(iter),
                _ => return None,
            })
        }
    }
}

/// One element pulled from a concept-method iterator.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MethodIterRes {
    #[prost(
        oneof = "method_iter_res::Res",
        tags = "205, 206, 401, 402, 502, 503, 504, 505, 701, 902, 903, 904, 905, 1000, 1001, 1101"
    )]
    pub res: Option<method_iter_res::Res>,
}

pub mod method_iter_res {
    use super::*;

    #[derive(Clone, PartialEq, Eq, ::prost::Oneof)]
    pub enum Res {
        #[prost(message, tag = "205")]
        SchemaConceptSups(OneConcept),
        #[prost(message, tag = "206")]
        SchemaConceptSubs(OneConcept),
        #[prost(message, tag = "401")]
        RoleRelations(OneConcept),
        #[prost(message, tag = "402")]
        RolePlayers(OneConcept),
        #[prost(message, tag = "502")]
        TypeInstances(OneConcept),
        #[prost(message, tag = "503")]
        TypeKeys(OneConcept),
        #[prost(message, tag = "504")]
        TypeAttributes(OneConcept),
        #[prost(message, tag = "505")]
        TypePlaying(OneConcept),
        #[prost(message, tag = "701")]
        RelationTypeRoles(OneConcept),
        #[prost(message, tag = "902")]
        ThingKeys(OneConcept),
        #[prost(message, tag = "903")]
        ThingAttributes(OneConcept),
        #[prost(message, tag = "904")]
        ThingRelations(OneConcept),
        #[prost(message, tag = "905")]
        ThingRoles(OneConcept),
        #[prost(message, tag = "1000")]
        RelationRolePlayersMap(RolePlayer),
        #[prost(message, tag = "1001")]
        RelationRolePlayers(OneConcept),
        #[prost(message, tag = "1101")]
        AttributeOwners(OneConcept),
    }

    impl Res {
        pub fn slot(&self) -> u32 {
            match self {
                Res::SchemaConceptSups(_) => 205,
                Res::SchemaConceptSubs(_) => 206,
                Res::RoleRelations(_) => 401,
                Res::RolePlayers(_) => 402,
                Res::TypeInstances(_) => 502,
                Res::TypeKeys(_) => 503,
                Res::TypeAttributes(_) => 504,
                Res::TypePlaying(_) => 505,
                Res::RelationTypeRoles(_) => 701,
                Res::ThingKeys(_) => 902,
                Res::ThingAttributes(_) => 903,
                Res::ThingRelations(_) => 904,
                Res::ThingRoles(_) => 905,
                Res::RelationRolePlayersMap(_) => 1000,
                Res::RelationRolePlayers(_) => 1001,
                Res::AttributeOwners(_) => 1101,
            }
        }

        /// The single concept element, for every slot except `Relation.RolePlayersMap`.
        pub fn into_concept(self) -> Option<Concept> {
            match self {
                Res::RelationRolePlayersMap(_) => None,
                Res::SchemaConceptSups(one)
                | Res::SchemaConceptSubs(one)
                | Res::RoleRelations(one)
                | Res::RolePlayers(one)
                | Res::TypeInstances(one)
                | Res::TypeKeys(one)
                | Res::TypeAttributes(one)
                | Res::TypePlaying(one)
                | Res::RelationTypeRoles(one)
                | Res::ThingKeys(one)
                | Res::ThingAttributes(one)
                | Res::ThingRelations(one)
                | Res::ThingRoles(one)
                | Res::RelationRolePlayers(one)
                | Res::AttributeOwners(one) => one.concept,
            }
        }

        /// Wraps a concept element under the iterable `slot`.
        pub fn concept(slot: u32, concept: Concept) -> Option<Res> {
            let one = OneConcept::from(concept);
            Some(match slot {
                205 => Res::SchemaConceptSups(one),
                206 => Res::SchemaConceptSubs(one),
                401 => Res::RoleRelations(one),
                402 => Res::RolePlayers(one),
                502 => Res::TypeInstances(one),
                503 => Res::TypeKeys(one),
                504 => Res::TypeAttributes(one),
                505 => Res::TypePlaying(one),
                701 => Res::RelationTypeRoles(one),
                902 => Res::ThingKeys(one),
                903 => Res::ThingAttributes(one),
                904 => Res::ThingRelations(one),
                905 => Res::ThingRoles(one),
                1001 => Res::RelationRolePlayers(one),
                1101 => Res::AttributeOwners(one),
                _ => return None,
            })
        }
    }
}

impl From<method_req::Req> for MethodReq {
    fn from(req: method_req::Req) -> Self {
        Self { req: Some(req) }
    }
}

impl From<method_res::Res> for MethodRes {
    fn from(res: method_res::Res) -> Self {
        Self { res: Some(res) }
    }
}

impl From<method_iter_res::Res> for MethodIterRes {
    fn from(res: method_iter_res::Res) -> Self {
        Self { res: Some(res) }
    }
}
