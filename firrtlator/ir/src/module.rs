//! Circuits, modules, ports, and external-module parameters.
use crate::{Direction, Info, Stmt, StmtGroup, Type};
use firrtlator_utils::{Error, FirrtlatorResult, Id};
use std::fmt;

/// The top-level container: an ordered list of modules. The circuit
/// identifier doubles as the top module name.
#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    pub id: Id,
    pub info: Option<Info>,
    pub modules: Vec<Module>,
}

impl Circuit {
    pub fn new<I: Into<Id>>(id: I) -> Self {
        Self {
            id: id.into(),
            info: None,
            modules: Vec::new(),
        }
    }

    pub fn add_module(&mut self, module: Module) {
        self.modules.push(module);
    }
}

/// A hardware unit. Internal modules carry a statement body; external
/// modules are black boxes with an optional `defname` and parameters. The
/// two payloads are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: Id,
    pub info: Option<Info>,
    pub ports: Vec<Port>,
    pub kind: ModuleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModuleKind {
    Internal {
        body: StmtGroup,
    },
    External {
        defname: Option<Id>,
        parameters: Vec<Parameter>,
    },
}

impl Module {
    pub fn internal<I: Into<Id>>(id: I) -> Self {
        Self {
            id: id.into(),
            info: None,
            ports: Vec::new(),
            kind: ModuleKind::Internal {
                body: StmtGroup::default(),
            },
        }
    }

    pub fn external<I: Into<Id>>(id: I) -> Self {
        Self {
            id: id.into(),
            info: None,
            ports: Vec::new(),
            kind: ModuleKind::External {
                defname: None,
                parameters: Vec::new(),
            },
        }
    }

    pub fn is_external(&self) -> bool {
        matches!(self.kind, ModuleKind::External { .. })
    }

    pub fn add_port(&mut self, port: Port) {
        self.ports.push(port);
    }

    /// Statements only exist on internal modules.
    pub fn add_stmt(&mut self, stmt: Stmt) -> FirrtlatorResult<()> {
        match &mut self.kind {
            ModuleKind::Internal { body } => {
                body.push(stmt);
                Ok(())
            }
            ModuleKind::External { .. } => Err(Error::semantic(format!(
                "cannot add statements to extmodule `{}'",
                self.id
            ))),
        }
    }

    /// Replaces the body of an internal module.
    pub fn set_body(&mut self, group: StmtGroup) -> FirrtlatorResult<()> {
        match &mut self.kind {
            ModuleKind::Internal { body } => {
                *body = group;
                Ok(())
            }
            ModuleKind::External { .. } => Err(Error::semantic(format!(
                "cannot add statements to extmodule `{}'",
                self.id
            ))),
        }
    }

    /// A `defname` only exists on external modules.
    pub fn set_defname<I: Into<Id>>(&mut self, name: I) -> FirrtlatorResult<()> {
        match &mut self.kind {
            ModuleKind::External { defname, .. } => {
                *defname = Some(name.into());
                Ok(())
            }
            ModuleKind::Internal { .. } => Err(Error::semantic(format!(
                "cannot assign defname to module `{}'",
                self.id
            ))),
        }
    }

    /// Parameters only exist on external modules.
    pub fn add_parameter(&mut self, param: Parameter) -> FirrtlatorResult<()> {
        match &mut self.kind {
            ModuleKind::External { parameters, .. } => {
                parameters.push(param);
                Ok(())
            }
            ModuleKind::Internal { .. } => Err(Error::semantic(format!(
                "cannot add parameter to module `{}'",
                self.id
            ))),
        }
    }

    pub fn body(&self) -> Option<&StmtGroup> {
        match &self.kind {
            ModuleKind::Internal { body } => Some(body),
            ModuleKind::External { .. } => None,
        }
    }

    pub fn defname(&self) -> Option<Id> {
        match &self.kind {
            ModuleKind::External { defname, .. } => *defname,
            ModuleKind::Internal { .. } => None,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        match &self.kind {
            ModuleKind::External { parameters, .. } => parameters,
            ModuleKind::Internal { .. } => &[],
        }
    }
}

/// A typed, directed module boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: Id,
    pub info: Option<Info>,
    pub direction: Direction,
    pub ty: Type,
}

impl Port {
    pub fn new<I: Into<Id>>(id: I, direction: Direction, ty: Type) -> Self {
        Self {
            id: id.into(),
            info: None,
            direction,
            ty,
        }
    }
}

/// `parameter NAME = value` on an external module.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub id: Id,
    pub value: ParamValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Double(f64),
    String(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Double(v) => write!(f, "{}", v),
            ParamValue::String(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Empty;

    #[test]
    fn extmodule_rejects_statements() {
        let mut m = Module::external("m");
        let err = m.add_stmt(Stmt::Empty(Empty::default())).unwrap_err();
        assert!(err.is_semantic());
    }

    #[test]
    fn module_rejects_defname_and_parameters() {
        let mut m = Module::internal("m");
        assert!(m.set_defname("foo").unwrap_err().is_semantic());
        let param = Parameter {
            id: "WIDTH".into(),
            value: ParamValue::Int(8),
        };
        assert!(m.add_parameter(param).unwrap_err().is_semantic());
    }

    #[test]
    fn extmodule_accepts_defname_and_parameters() {
        let mut m = Module::external("m");
        m.set_defname("foo").unwrap();
        m.add_parameter(Parameter {
            id: "WIDTH".into(),
            value: ParamValue::Int(8),
        })
        .unwrap();
        assert_eq!(m.defname().unwrap(), "foo");
        assert_eq!(m.parameters().len(), 1);
    }
}
