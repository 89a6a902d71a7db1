use serde::Serialize;
use std::fmt;

/// The construct an annotation describes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BindingTarget {
    ModuleScope,
    VariableDeclaration { name: String },
    Parameter { function: String, index: usize },
    FunctionReturn { function: String },
    ClassMember { class: String, member: String },
    ClassConstructorParameter { class: String, index: usize },
    ImportSpecifier { module: String, name: String },
    ExportSpecifier { name: String },
}

impl BindingTarget {
    pub fn variable(name: impl Into<String>) -> Self {
        BindingTarget::VariableDeclaration { name: name.into() }
    }

    pub fn parameter(function: impl Into<String>, index: usize) -> Self {
        BindingTarget::Parameter { function: function.into(), index }
    }

    pub fn function_return(function: impl Into<String>) -> Self {
        BindingTarget::FunctionReturn { function: function.into() }
    }

    pub fn class_member(class: impl Into<String>, member: impl Into<String>) -> Self {
        BindingTarget::ClassMember { class: class.into(), member: member.into() }
    }

    pub fn constructor_parameter(class: impl Into<String>, index: usize) -> Self {
        BindingTarget::ClassConstructorParameter { class: class.into(), index }
    }

    pub fn import(module: impl Into<String>, name: impl Into<String>) -> Self {
        BindingTarget::ImportSpecifier { module: module.into(), name: name.into() }
    }

    pub fn export(name: impl Into<String>) -> Self {
        BindingTarget::ExportSpecifier { name: name.into() }
    }

    pub fn is_module_scope(&self) -> bool {
        matches!(self, BindingTarget::ModuleScope)
    }
}

impl fmt::Display for BindingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingTarget::ModuleScope => write!(f, "ModuleScope"),
            BindingTarget::VariableDeclaration { name } => write!(f, "VariableDeclaration({})", name),
            BindingTarget::Parameter { function, index } => {
                write!(f, "Parameter({}, {})", function, index)
            }
            BindingTarget::FunctionReturn { function } => write!(f, "FunctionReturn({})", function),
            BindingTarget::ClassMember { class, member } => {
                write!(f, "ClassMember({}, {})", class, member)
            }
            BindingTarget::ClassConstructorParameter { class, index } => {
                write!(f, "ClassConstructorParameter({}, {})", class, index)
            }
            BindingTarget::ImportSpecifier { module, name } => {
                write!(f, "ImportSpecifier({}, {})", module, name)
            }
            BindingTarget::ExportSpecifier { name } => write!(f, "ExportSpecifier({})", name),
        }
    }
}
