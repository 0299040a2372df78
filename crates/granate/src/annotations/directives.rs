use async_graphql_parser::{
    types::{
        ConstDirective, EnumValueDefinition, FieldDefinition, InputValueDefinition, SchemaDefinition, ServiceDocument,
        TypeDefinition, TypeKind, TypeSystemDefinition,
    },
    Positioned,
};

/// A node of the schema document which can carry directives, or contain nodes which do.
#[derive(Debug, Clone, Copy)]
pub enum AstNode<'a> {
    Document(&'a ServiceDocument),
    Schema(&'a SchemaDefinition),
    Type(&'a TypeDefinition),
    Field(&'a FieldDefinition),
    InputValue(&'a InputValueDefinition),
    EnumValue(&'a EnumValueDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    SchemaDefinition,
    ScalarTypeDefinition,
    ObjectTypeDefinition,
    InterfaceTypeDefinition,
    UnionTypeDefinition,
    EnumTypeDefinition,
    InputObjectTypeDefinition,
    FieldDefinition,
    InputValueDefinition,
    EnumValueDefinition,
}

impl NodeKind {
    /// Type definitions and `extend type` both count.
    pub fn is_type_definition(self) -> bool {
        matches!(
            self,
            NodeKind::ScalarTypeDefinition
                | NodeKind::ObjectTypeDefinition
                | NodeKind::InterfaceTypeDefinition
                | NodeKind::UnionTypeDefinition
                | NodeKind::EnumTypeDefinition
                | NodeKind::InputObjectTypeDefinition
        )
    }
}

impl<'a> AstNode<'a> {
    pub fn kind(&self) -> NodeKind {
        match self {
            AstNode::Document(_) => NodeKind::Document,
            AstNode::Schema(_) => NodeKind::SchemaDefinition,
            AstNode::Type(definition) => match definition.kind {
                TypeKind::Scalar => NodeKind::ScalarTypeDefinition,
                TypeKind::Object(_) => NodeKind::ObjectTypeDefinition,
                TypeKind::Interface(_) => NodeKind::InterfaceTypeDefinition,
                TypeKind::Union(_) => NodeKind::UnionTypeDefinition,
                TypeKind::Enum(_) => NodeKind::EnumTypeDefinition,
                TypeKind::InputObject(_) => NodeKind::InputObjectTypeDefinition,
            },
            AstNode::Field(_) => NodeKind::FieldDefinition,
            AstNode::InputValue(_) => NodeKind::InputValueDefinition,
            AstNode::EnumValue(_) => NodeKind::EnumValueDefinition,
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        match self {
            AstNode::Document(_) | AstNode::Schema(_) => None,
            AstNode::Type(definition) => Some(definition.name.node.as_str()),
            AstNode::Field(field) => Some(field.name.node.as_str()),
            AstNode::InputValue(input) => Some(input.name.node.as_str()),
            AstNode::EnumValue(value) => Some(value.value.node.as_str()),
        }
    }

    fn directives(&self) -> &'a [Positioned<ConstDirective>] {
        match self {
            AstNode::Document(_) => &[],
            AstNode::Schema(schema) => &schema.directives,
            AstNode::Type(definition) => &definition.directives,
            AstNode::Field(field) => &field.directives,
            AstNode::InputValue(input) => &input.directives,
            AstNode::EnumValue(value) => &value.directives,
        }
    }
}

/// One directive together with the node it is attached to.
#[derive(Debug, Clone)]
pub struct DirectiveContext<'a> {
    pub directive: &'a ConstDirective,
    pub target: AstNode<'a>,
    /// Nearest ancestor first, the document is always last.
    pub ancestors: Vec<AstNode<'a>>,
}

impl<'a> DirectiveContext<'a> {
    /// The nearest enclosing type definition.
    pub fn enclosing_type(&self) -> Option<&'a str> {
        self.ancestors
            .iter()
            .find(|node| node.kind().is_type_definition())
            .and_then(AstNode::name)
    }

    /// Resolves the type and field names an annotation is built for.
    ///
    /// Fields and input object fields belong to their enclosing type. Every other node is its own
    /// type, without a field.
    pub fn target_names(&self) -> (Option<&'a str>, Option<&'a str>) {
        let parent_kind = self.ancestors.first().map(AstNode::kind);

        match self.target {
            AstNode::Field(_) => (self.enclosing_type(), self.target.name()),
            AstNode::InputValue(_) if parent_kind == Some(NodeKind::InputObjectTypeDefinition) => {
                (self.enclosing_type(), self.target.name())
            }
            target => (target.name(), None),
        }
    }
}

struct WalkContext<'a> {
    stack: Vec<AstNode<'a>>,
    contexts: Vec<DirectiveContext<'a>>,
}

impl<'a> WalkContext<'a> {
    fn with_node(&mut self, node: AstNode<'a>, visit_children: impl FnOnce(&mut Self)) {
        for directive in node.directives() {
            self.contexts.push(DirectiveContext {
                directive: &directive.node,
                target: node,
                ancestors: self.stack.iter().rev().copied().collect(),
            });
        }

        self.stack.push(node);
        visit_children(self);
        self.stack.pop();
    }
}

/// Collects every directive of the document, in document order. The directives of a node come
/// before the directives of its children.
pub fn extract_directive_contexts(document: &ServiceDocument) -> Vec<DirectiveContext<'_>> {
    let mut ctx = WalkContext {
        stack: Vec::new(),
        contexts: Vec::new(),
    };

    ctx.with_node(AstNode::Document(document), |ctx| {
        for definition in &document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => ctx.with_node(AstNode::Schema(&schema.node), |_| ()),
                TypeSystemDefinition::Type(definition) => visit_type_definition(ctx, &definition.node),
                TypeSystemDefinition::Directive(_) => (),
            }
        }
    });

    ctx.contexts
}

fn visit_type_definition<'a>(ctx: &mut WalkContext<'a>, definition: &'a TypeDefinition) {
    ctx.with_node(AstNode::Type(definition), |ctx| match &definition.kind {
        TypeKind::Object(object) => visit_fields(ctx, &object.fields),
        TypeKind::Interface(interface) => visit_fields(ctx, &interface.fields),
        TypeKind::InputObject(input_object) => visit_input_values(ctx, &input_object.fields),
        TypeKind::Enum(r#enum) => {
            for value in &r#enum.values {
                ctx.with_node(AstNode::EnumValue(&value.node), |_| ());
            }
        }
        TypeKind::Union(_) | TypeKind::Scalar => (),
    });
}

fn visit_fields<'a>(ctx: &mut WalkContext<'a>, fields: &'a [Positioned<FieldDefinition>]) {
    for field in fields {
        ctx.with_node(AstNode::Field(&field.node), |ctx| {
            visit_input_values(ctx, &field.node.arguments);
        });
    }
}

fn visit_input_values<'a>(ctx: &mut WalkContext<'a>, values: &'a [Positioned<InputValueDefinition>]) {
    for value in values {
        ctx.with_node(AstNode::InputValue(&value.node), |_| ());
    }
}
