//! Views over schema concepts: labels, hierarchy, rules, roles and types.
use super::{RemoteIter, Session, SessionError, concept_element, required};
use crate::{
    proto::{
        AttributeValue, Concept, DataType, Empty, Flag, Label, OneConcept, Regex, ValueObject,
        method::{method_req::Req, method_res::Res},
    },
    protocol::Transport,
};

macro_rules! view {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        pub struct $name<'a, T: Transport> {
            session: &'a Session<T>,
            concept: &'a Concept,
        }

        impl<'a, T: Transport> $name<'a, T> {
            pub(crate) fn new(session: &'a Session<T>, concept: &'a Concept) -> Self {
                Self { session, concept }
            }

            pub fn concept(&self) -> &'a Concept {
                self.concept
            }
        }
    };
}
pub(crate) use view;

view!(
    /// Operations shared by every schema concept.
    SchemaConcept
);
view!(Rule);
view!(Role);
view!(
    /// Operations shared by entity, relation and attribute types.
    Type
);
view!(EntityType);
view!(RelationType);
view!(AttributeType);

impl<'a, T: Transport> SchemaConcept<'a, T> {
    pub fn is_implicit(&self) -> Result<bool, SessionError> {
        let flag = self.session.call(
            self.concept,
            Req::SchemaConceptIsImplicit(Empty {}),
            |res| match res {
                Res::SchemaConceptIsImplicit(flag) => Ok(flag),
                other => Err(other),
            },
        )?;
        Ok(flag.value)
    }

    pub fn get_label(&self) -> Result<String, SessionError> {
        let label = self.session.call(
            self.concept,
            Req::SchemaConceptGetLabel(Empty {}),
            |res| match res {
                Res::SchemaConceptGetLabel(label) => Ok(label),
                other => Err(other),
            },
        )?;
        Ok(label.label)
    }

    pub fn set_label(&self, label: &str) -> Result<(), SessionError> {
        let req = Req::SchemaConceptSetLabel(Label {
            label: label.to_string(),
        });
        self.session.call(self.concept, req, |res| match res {
            Res::SchemaConceptSetLabel(_) => Ok(()),
            other => Err(other),
        })
    }

    /// Direct supertype; `None` for a root type.
    pub fn get_sup(&self) -> Result<Option<Concept>, SessionError> {
        let sup = self.session.call(
            self.concept,
            Req::SchemaConceptGetSup(Empty {}),
            |res| match res {
                Res::SchemaConceptGetSup(sup) => Ok(sup),
                other => Err(other),
            },
        )?;
        Ok(sup.into_option())
    }

    pub fn set_sup(&self, sup: &Concept) -> Result<(), SessionError> {
        let req = Req::SchemaConceptSetSup(OneConcept::from(sup.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::SchemaConceptSetSup(_) => Ok(()),
            other => Err(other),
        })
    }

    /// Every supertype, this concept included.
    pub fn sups(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::SchemaConceptSups(Empty {}), concept_element)
    }

    /// Every subtype, this concept included.
    pub fn subs(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::SchemaConceptSubs(Empty {}), concept_element)
    }
}

impl<T: Transport> Rule<'_, T> {
    /// Body pattern; `None` for the meta rule.
    pub fn when(&self) -> Result<Option<String>, SessionError> {
        let pattern = self
            .session
            .call(self.concept, Req::RuleWhen(Empty {}), |res| match res {
                Res::RuleWhen(pattern) => Ok(pattern),
                other => Err(other),
            })?;
        Ok(pattern.into_option())
    }

    /// Head pattern; `None` for the meta rule.
    pub fn then(&self) -> Result<Option<String>, SessionError> {
        let pattern = self
            .session
            .call(self.concept, Req::RuleThen(Empty {}), |res| match res {
                Res::RuleThen(pattern) => Ok(pattern),
                other => Err(other),
            })?;
        Ok(pattern.into_option())
    }
}

impl<'a, T: Transport> Role<'a, T> {
    /// Relation types that relate this role.
    pub fn relations(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::RoleRelations(Empty {}), concept_element)
    }

    /// Types allowed to play this role.
    pub fn players(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::RolePlayers(Empty {}), concept_element)
    }
}

impl<'a, T: Transport> Type<'a, T> {
    pub fn is_abstract(&self) -> Result<bool, SessionError> {
        let flag = self
            .session
            .call(self.concept, Req::TypeIsAbstract(Empty {}), |res| match res {
                Res::TypeIsAbstract(flag) => Ok(flag),
                other => Err(other),
            })?;
        Ok(flag.value)
    }

    pub fn set_abstract(&self, value: bool) -> Result<(), SessionError> {
        let req = Req::TypeSetAbstract(Flag { value });
        self.session.call(self.concept, req, |res| match res {
            Res::TypeSetAbstract(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn instances(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::TypeInstances(Empty {}), concept_element)
    }

    /// Attribute types declared as keys.
    pub fn keys(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::TypeKeys(Empty {}), concept_element)
    }

    /// Attribute types instances may own.
    pub fn attributes(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::TypeAttributes(Empty {}), concept_element)
    }

    /// Roles instances may play.
    pub fn playing(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::TypePlaying(Empty {}), concept_element)
    }

    pub fn has(&self, attribute_type: &Concept) -> Result<(), SessionError> {
        let req = Req::TypeHas(OneConcept::from(attribute_type.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::TypeHas(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn key(&self, attribute_type: &Concept) -> Result<(), SessionError> {
        let req = Req::TypeKey(OneConcept::from(attribute_type.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::TypeKey(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn plays(&self, role: &Concept) -> Result<(), SessionError> {
        let req = Req::TypePlays(OneConcept::from(role.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::TypePlays(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn unhas(&self, attribute_type: &Concept) -> Result<(), SessionError> {
        let req = Req::TypeUnhas(OneConcept::from(attribute_type.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::TypeUnhas(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn unkey(&self, attribute_type: &Concept) -> Result<(), SessionError> {
        let req = Req::TypeUnkey(OneConcept::from(attribute_type.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::TypeUnkey(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn unplay(&self, role: &Concept) -> Result<(), SessionError> {
        let req = Req::TypeUnplay(OneConcept::from(role.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::TypeUnplay(_) => Ok(()),
            other => Err(other),
        })
    }
}

impl<T: Transport> EntityType<'_, T> {
    /// Creates a new entity of this type.
    pub fn create(&self) -> Result<Concept, SessionError> {
        let req = Req::EntityTypeCreate(Empty {});
        let operation = req.name();
        let one = self.session.call(self.concept, req, |res| match res {
            Res::EntityTypeCreate(one) => Ok(one),
            other => Err(other),
        })?;
        required(operation, "entity", one.concept)
    }
}

impl<'a, T: Transport> RelationType<'a, T> {
    /// Creates a new relation of this type.
    pub fn create(&self) -> Result<Concept, SessionError> {
        let req = Req::RelationTypeCreate(Empty {});
        let operation = req.name();
        let one = self.session.call(self.concept, req, |res| match res {
            Res::RelationTypeCreate(one) => Ok(one),
            other => Err(other),
        })?;
        required(operation, "relation", one.concept)
    }

    /// Roles this relation type relates.
    pub fn roles(&self) -> Result<RemoteIter<'a, T, Concept>, SessionError> {
        self.session
            .iterate(self.concept, Req::RelationTypeRoles(Empty {}), concept_element)
    }

    pub fn relates(&self, role: &Concept) -> Result<(), SessionError> {
        let req = Req::RelationTypeRelates(OneConcept::from(role.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::RelationTypeRelates(_) => Ok(()),
            other => Err(other),
        })
    }

    pub fn unrelate(&self, role: &Concept) -> Result<(), SessionError> {
        let req = Req::RelationTypeUnrelate(OneConcept::from(role.clone()));
        self.session.call(self.concept, req, |res| match res {
            Res::RelationTypeUnrelate(_) => Ok(()),
            other => Err(other),
        })
    }
}

impl<T: Transport> AttributeType<'_, T> {
    /// Creates (or finds) the attribute of this type holding `value`.
    pub fn create(&self, value: impl Into<ValueObject>) -> Result<Concept, SessionError> {
        let req = Req::AttributeTypeCreate(AttributeValue::from(value.into()));
        let operation = req.name();
        let one = self.session.call(self.concept, req, |res| match res {
            Res::AttributeTypeCreate(one) => Ok(one),
            other => Err(other),
        })?;
        required(operation, "attribute", one.concept)
    }

    /// The attribute of this type holding `value`, if one exists.
    pub fn attribute(
        &self,
        value: impl Into<ValueObject>,
    ) -> Result<Option<Concept>, SessionError> {
        let req = Req::AttributeTypeAttribute(AttributeValue::from(value.into()));
        let found = self.session.call(self.concept, req, |res| match res {
            Res::AttributeTypeAttribute(found) => Ok(found),
            other => Err(other),
        })?;
        Ok(found.into_option())
    }

    /// Value type; `None` for the meta attribute type.
    pub fn data_type(&self) -> Result<Option<DataType>, SessionError> {
        let req = Req::AttributeTypeDataType(Empty {});
        let operation = req.name();
        let data_type = self.session.call(self.concept, req, |res| match res {
            Res::AttributeTypeDataType(data_type) => Ok(data_type),
            other => Err(other),
        })?;
        data_type
            .into_option()
            .map_err(|value| SessionError::UnknownDataType {
                operation,
                concept: self.concept.id.clone(),
                value,
            })
    }

    /// Value constraint; `None` when unset, which the server reports as an empty string.
    pub fn get_regex(&self) -> Result<Option<String>, SessionError> {
        let regex = self.session.call(
            self.concept,
            Req::AttributeTypeGetRegex(Empty {}),
            |res| match res {
                Res::AttributeTypeGetRegex(regex) => Ok(regex),
                other => Err(other),
            },
        )?;
        Ok(Some(regex.regex).filter(|regex| !regex.is_empty()))
    }

    /// Sets the value constraint; an empty string clears it.
    pub fn set_regex(&self, regex: &str) -> Result<(), SessionError> {
        let req = Req::AttributeTypeSetRegex(Regex {
            regex: regex.to_string(),
        });
        self.session.call(self.concept, req, |res| match res {
            Res::AttributeTypeSetRegex(_) => Ok(()),
            other => Err(other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        proto::{
            BaseType, OptionalConcept, OptionalDataType, OptionalPattern,
            method::{MethodIterRes, MethodReq, MethodRes, method_iter_res, method_req, method_res},
            optional_data_type,
            transaction::{TxIterRes, TxRes, tx_iter_res, tx_req, tx_res},
        },
        session::testing::ScriptedTransport,
    };

    fn reply(res: method_res::Res) -> TxRes {
        TxRes::concept_method(MethodRes::from(res))
    }

    fn sent_method(transport: &ScriptedTransport, index: usize) -> (String, method_req::Req) {
        match &transport.sent[index].req {
            Some(tx_req::Req::ConceptMethod(call)) => match &call.method {
                Some(MethodReq { req: Some(req) }) => (call.id.clone(), req.clone()),
                other => panic!("concept method without payload: {other:?}"),
            },
            other => panic!("expected concept method, got {other:?}"),
        }
    }

    #[test]
    fn get_label_reads_label() {
        let person = Concept::new("V1", BaseType::EntityType);
        let session = Session::new(ScriptedTransport::new([reply(
            Res::SchemaConceptGetLabel(Label {
                label: "person".into(),
            }),
        )]));

        assert_eq!(session.as_schema_concept(&person).get_label().unwrap(), "person");

        let transport = session.into_transport().unwrap();
        let (id, req) = sent_method(&transport, 0);
        assert_eq!(id, "V1");
        assert_eq!(req, Req::SchemaConceptGetLabel(Empty {}));
    }

    #[test]
    fn get_sup_of_root_is_none() {
        let thing = Concept::new("V0", BaseType::MetaType);
        let session = Session::new(ScriptedTransport::new([reply(Res::SchemaConceptGetSup(
            OptionalConcept::from(None),
        ))]));

        assert_eq!(session.as_schema_concept(&thing).get_sup().unwrap(), None);
    }

    #[test]
    fn set_sup_carries_the_supertype() {
        let man = Concept::new("V2", BaseType::EntityType);
        let person = Concept::new("V1", BaseType::EntityType);
        let session = Session::new(ScriptedTransport::new([reply(Res::SchemaConceptSetSup(
            Empty {},
        ))]));

        session.as_schema_concept(&man).set_sup(&person).unwrap();

        let transport = session.into_transport().unwrap();
        let (id, req) = sent_method(&transport, 0);
        assert_eq!(id, "V2");
        assert_eq!(req, Req::SchemaConceptSetSup(OneConcept::from(person)));
    }

    #[test]
    fn rule_patterns_are_nullable() {
        let rule = Concept::new("V5", BaseType::Rule);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::RuleWhen(OptionalPattern::from(Some(
                "{$x isa person;}".to_string(),
            )))),
            reply(Res::RuleThen(OptionalPattern::from(None))),
        ]));

        let view = session.as_rule(&rule);
        assert_eq!(view.when().unwrap().as_deref(), Some("{$x isa person;}"));
        assert_eq!(view.then().unwrap(), None);
    }

    #[test]
    fn set_abstract_sends_flag() {
        let person = Concept::new("V1", BaseType::EntityType);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::TypeSetAbstract(Empty {})),
            reply(Res::TypeIsAbstract(Flag { value: true })),
        ]));

        let view = session.as_type(&person);
        view.set_abstract(true).unwrap();
        assert!(view.is_abstract().unwrap());

        let transport = session.into_transport().unwrap();
        assert_eq!(
            sent_method(&transport, 0).1,
            Req::TypeSetAbstract(Flag { value: true })
        );
    }

    #[test]
    fn type_mutations_reference_their_argument() {
        let person = Concept::new("V1", BaseType::EntityType);
        let name = Concept::new("V9", BaseType::AttributeType);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::TypeHas(Empty {})),
            reply(Res::TypeKey(Empty {})),
            reply(Res::TypeUnkey(Empty {})),
        ]));

        let view = session.as_type(&person);
        view.has(&name).unwrap();
        view.key(&name).unwrap();
        view.unkey(&name).unwrap();

        let transport = session.into_transport().unwrap();
        let slots: Vec<u32> = (0..3).map(|i| sent_method(&transport, i).1.slot()).collect();
        assert_eq!(slots, vec![506, 507, 510]);
        assert_eq!(sent_method(&transport, 1).1, Req::TypeKey(name.into()));
    }

    #[test]
    fn entity_type_create_returns_entity() {
        let person = Concept::new("V1", BaseType::EntityType);
        let alice = Concept::new("V40", BaseType::Entity);
        let session = Session::new(ScriptedTransport::new([reply(Res::EntityTypeCreate(
            alice.clone().into(),
        ))]));

        assert_eq!(session.as_entity_type(&person).create().unwrap(), alice);
    }

    #[test]
    fn attribute_lookup_is_nullable() {
        let age = Concept::new("V3", BaseType::AttributeType);
        let session = Session::new(ScriptedTransport::new([reply(
            Res::AttributeTypeAttribute(OptionalConcept::from(None)),
        )]));

        assert_eq!(session.as_attribute_type(&age).attribute(30).unwrap(), None);

        let transport = session.into_transport().unwrap();
        assert_eq!(
            sent_method(&transport, 0).1,
            Req::AttributeTypeAttribute(AttributeValue::from(ValueObject::from(30)))
        );
    }

    #[test]
    fn data_type_handles_null_and_unknown_values() {
        let age = Concept::new("V3", BaseType::AttributeType);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::AttributeTypeDataType(OptionalDataType::from(Some(
                DataType::Long,
            )))),
            reply(Res::AttributeTypeDataType(OptionalDataType::from(None))),
            reply(Res::AttributeTypeDataType(OptionalDataType {
                res: Some(optional_data_type::Res::DataType(42)),
            })),
        ]));

        let view = session.as_attribute_type(&age);
        assert_eq!(view.data_type().unwrap(), Some(DataType::Long));
        assert_eq!(view.data_type().unwrap(), None);
        assert!(matches!(
            view.data_type(),
            Err(SessionError::UnknownDataType { value: 42, .. })
        ));
    }

    #[test]
    fn empty_regex_means_unset() {
        let name = Concept::new("V9", BaseType::AttributeType);
        let session = Session::new(ScriptedTransport::new([
            reply(Res::AttributeTypeGetRegex(Regex::default())),
            reply(Res::AttributeTypeGetRegex(Regex {
                regex: "[a-z]+".into(),
            })),
        ]));

        let view = session.as_attribute_type(&name);
        assert_eq!(view.get_regex().unwrap(), None);
        assert_eq!(view.get_regex().unwrap().as_deref(), Some("[a-z]+"));
    }

    #[test]
    fn relation_type_roles_iterates() {
        let friendship = Concept::new("V10", BaseType::RelationshipType);
        let friend = Concept::new("V11", BaseType::Role);
        let session = Session::new(ScriptedTransport::new([
            reply(method_res::Res::iterator(701, 1).unwrap()),
            TxRes::from(tx_res::Res::Iterate(TxIterRes::from(
                tx_iter_res::Res::ConceptMethod(MethodIterRes::from(
                    method_iter_res::Res::RelationTypeRoles(friend.clone().into()),
                )),
            ))),
            TxRes::done(),
        ]));

        let roles: Vec<_> = session
            .as_relation_type(&friendship)
            .roles()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(roles, vec![friend]);
    }
}
