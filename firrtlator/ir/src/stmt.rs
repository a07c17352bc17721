//! Statements: declarations, connections, conditionals, and memories.
use crate::{Expr, Field, Info, Reference, Type, TypeBundle, TypeClock, TypeInt};
use firrtlator_utils::{Error, FirrtlatorResult, Id};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Wire(Wire),
    Reg(Reg),
    Memory(Memory),
    Instance(Instance),
    Node(Node),
    Connect(Connect),
    Invalid(Invalid),
    Conditional(Conditional),
    Stop(Stop),
    Printf(Printf),
    Empty(Empty),
    Group(StmtGroup),
}

/// An ordered sequence of statements acting as a body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StmtGroup {
    pub stmts: Vec<Stmt>,
}

impl StmtGroup {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

/// `wire w : <type>`
#[derive(Debug, Clone, PartialEq)]
pub struct Wire {
    pub id: Id,
    pub info: Option<Info>,
    pub ty: Type,
}

/// `reg r : <type> <clock>` with an optional reset clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Reg {
    pub id: Id,
    pub info: Option<Info>,
    pub ty: Type,
    pub clock: Expr,
    pub reset: Option<RegReset>,
}

/// The `with : ( reset => ( <trigger>, <value> ) )` clause of a register.
#[derive(Debug, Clone, PartialEq)]
pub struct RegReset {
    pub trigger: Expr,
    pub value: Expr,
}

/// `inst i of M`
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub id: Id,
    pub info: Option<Info>,
    pub of: Reference,
}

/// `node n = <expr>`
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: Id,
    pub info: Option<Info>,
    pub value: Expr,
}

/// `to <= from` or, when `partial`, `to <- from`.
#[derive(Debug, Clone, PartialEq)]
pub struct Connect {
    pub info: Option<Info>,
    pub to: Expr,
    pub from: Expr,
    pub partial: bool,
}

/// `<expr> is invalid`
#[derive(Debug, Clone, PartialEq)]
pub struct Invalid {
    pub info: Option<Info>,
    pub expr: Expr,
}

/// `when <cond> : ... else ...`. An `else when` chain nests the next
/// conditional as the sole statement of the else body.
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub info: Option<Info>,
    pub cond: Expr,
    pub then: StmtGroup,
    pub otherwise: Option<ConditionalElse>,
}

/// The else branch of a [Conditional], carrying its own info annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalElse {
    pub info: Option<Info>,
    pub body: StmtGroup,
}

/// `stop(<clock>, <cond>, <code>)`
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub info: Option<Info>,
    pub clock: Expr,
    pub cond: Expr,
    pub code: i64,
}

/// `printf(<clock>, <cond>, "<format>", <args>...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Printf {
    pub info: Option<Info>,
    pub clock: Expr,
    pub cond: Expr,
    pub format: String,
    pub args: Vec<Expr>,
}

/// `skip`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Empty {
    pub info: Option<Info>,
}

/// Read-under-write behavior of a [Memory].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuwFlag {
    Old,
    New,
    Undefined,
}

impl fmt::Display for RuwFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuwFlag::Old => write!(f, "old"),
            RuwFlag::New => write!(f, "new"),
            RuwFlag::Undefined => write!(f, "undefined"),
        }
    }
}

/// `mem m :` with an indented bag of scalar fields and port names. Scalar
/// fields are set-once; port names are unique within their set.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    pub id: Id,
    pub info: Option<Info>,
    dtype: Option<Type>,
    depth: Option<u64>,
    read_latency: Option<u64>,
    write_latency: Option<u64>,
    ruw: Option<RuwFlag>,
    readers: Vec<Id>,
    writers: Vec<Id>,
    read_writers: Vec<Id>,
}

impl Memory {
    pub fn new<I: Into<Id>>(id: I) -> Self {
        Self {
            id: id.into(),
            info: None,
            dtype: None,
            depth: None,
            read_latency: None,
            write_latency: None,
            ruw: None,
            readers: Vec::new(),
            writers: Vec::new(),
            read_writers: Vec::new(),
        }
    }

    pub fn set_dtype(&mut self, ty: Type) -> FirrtlatorResult<()> {
        if self.dtype.is_some() {
            return Err(Error::semantic("memory datatype already set"));
        }
        self.dtype = Some(ty);
        Ok(())
    }

    pub fn set_depth(&mut self, depth: u64) -> FirrtlatorResult<()> {
        if self.depth.is_some() {
            return Err(Error::semantic("memory depth already set"));
        }
        self.depth = Some(depth);
        Ok(())
    }

    pub fn set_read_latency(&mut self, latency: u64) -> FirrtlatorResult<()> {
        if self.read_latency.is_some() {
            return Err(Error::semantic("memory read latency already set"));
        }
        self.read_latency = Some(latency);
        Ok(())
    }

    pub fn set_write_latency(&mut self, latency: u64) -> FirrtlatorResult<()> {
        if self.write_latency.is_some() {
            return Err(Error::semantic("memory write latency already set"));
        }
        self.write_latency = Some(latency);
        Ok(())
    }

    pub fn set_ruw(&mut self, flag: RuwFlag) -> FirrtlatorResult<()> {
        if self.ruw.is_some() {
            return Err(Error::semantic(
                "memory read-under-write flag already set",
            ));
        }
        self.ruw = Some(flag);
        Ok(())
    }

    pub fn add_reader<I: Into<Id>>(&mut self, id: I) -> FirrtlatorResult<()> {
        let id = id.into();
        if self.readers.contains(&id) {
            return Err(Error::semantic(format!(
                "reader `{}' already defined",
                id
            )));
        }
        self.readers.push(id);
        Ok(())
    }

    pub fn add_writer<I: Into<Id>>(&mut self, id: I) -> FirrtlatorResult<()> {
        let id = id.into();
        if self.writers.contains(&id) {
            return Err(Error::semantic(format!(
                "writer `{}' already defined",
                id
            )));
        }
        self.writers.push(id);
        Ok(())
    }

    pub fn add_read_writer<I: Into<Id>>(
        &mut self,
        id: I,
    ) -> FirrtlatorResult<()> {
        let id = id.into();
        if self.read_writers.contains(&id) {
            return Err(Error::semantic(format!(
                "readwriter `{}' already defined",
                id
            )));
        }
        self.read_writers.push(id);
        Ok(())
    }

    pub fn dtype(&self) -> Option<&Type> {
        self.dtype.as_ref()
    }

    pub fn dtype_mut(&mut self) -> Option<&mut Type> {
        self.dtype.as_mut()
    }

    pub fn depth(&self) -> Option<u64> {
        self.depth
    }

    pub fn read_latency(&self) -> Option<u64> {
        self.read_latency
    }

    pub fn write_latency(&self) -> Option<u64> {
        self.write_latency
    }

    pub fn ruw(&self) -> Option<RuwFlag> {
        self.ruw
    }

    pub fn readers(&self) -> &[Id] {
        &self.readers
    }

    pub fn writers(&self) -> &[Id] {
        &self.writers
    }

    pub fn read_writers(&self) -> &[Id] {
        &self.read_writers
    }

    /// The derived bundle view of the memory's ports. Recomputed on every
    /// call so it can never go stale under mutation; `None` until the
    /// datatype is known. `addr`, `mask`, and the data widths stay
    /// uninferred.
    pub fn bundle_type(&self) -> Option<TypeBundle> {
        let dtype = self.dtype.as_ref()?;
        let mut bundle = TypeBundle::default();
        for r in &self.readers {
            bundle.add_field(Field::new(
                *r,
                Type::Bundle(Self::port_type(dtype, false, false)),
            ));
        }
        for w in &self.writers {
            bundle.add_field(Field::new(
                *w,
                Type::Bundle(Self::port_type(dtype, true, false)),
            ));
        }
        for rw in &self.read_writers {
            bundle.add_field(Field::new(
                *rw,
                Type::Bundle(Self::port_type(dtype, true, true)),
            ));
        }
        Some(bundle)
    }

    fn port_type(dtype: &Type, masked: bool, read_write: bool) -> TypeBundle {
        let mut bundle = TypeBundle::default();
        bundle.add_field(Field::new(
            "en",
            Type::Int(TypeInt::with_width(false, 1)),
        ));
        bundle.add_field(Field::new("clk", Type::Clock(TypeClock)));
        bundle.add_field(Field::new("addr", Type::Int(TypeInt::new(false))));
        bundle.add_field(Field::new("data", dtype.clone()));
        if masked {
            bundle
                .add_field(Field::new("mask", Type::Int(TypeInt::new(false))));
        }
        if read_write {
            bundle.add_field(Field::new(
                "wmode",
                Type::Int(TypeInt::with_width(false, 1)),
            ));
        }
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_fields_are_set_once() {
        let mut mem = Memory::new("m");
        mem.set_depth(16).unwrap();
        assert!(mem.set_depth(32).unwrap_err().is_semantic());
        mem.set_ruw(RuwFlag::Old).unwrap();
        assert!(mem.set_ruw(RuwFlag::New).unwrap_err().is_semantic());
    }

    #[test]
    fn port_names_are_unique_per_set() {
        let mut mem = Memory::new("m");
        mem.add_reader("r0").unwrap();
        assert!(mem.add_reader("r0").unwrap_err().is_semantic());
        // The same name in a different set is fine.
        mem.add_writer("r0").unwrap();
        mem.add_read_writer("r0").unwrap();
    }

    #[test]
    fn bundle_type_requires_dtype() {
        let mut mem = Memory::new("m");
        mem.add_reader("r0").unwrap();
        assert!(mem.bundle_type().is_none());
        mem.set_dtype(Type::Int(TypeInt::with_width(false, 8))).unwrap();
        let bundle = mem.bundle_type().unwrap();
        assert_eq!(bundle.fields.len(), 1);
        let Type::Bundle(port) = &bundle.fields[0].ty else {
            panic!("reader port is not a bundle");
        };
        let names: Vec<&str> =
            port.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(names, ["en", "clk", "addr", "data"]);
        // addr width stays uninferred
        let Type::Int(addr) = &port.fields[2].ty else {
            panic!("addr is not an int");
        };
        assert_eq!(addr.width, None);
    }

    #[test]
    fn read_writer_ports_carry_mask_and_wmode() {
        let mut mem = Memory::new("m");
        mem.set_dtype(Type::Int(TypeInt::with_width(true, 4))).unwrap();
        mem.add_read_writer("rw0").unwrap();
        let bundle = mem.bundle_type().unwrap();
        let Type::Bundle(port) = &bundle.fields[0].ty else {
            panic!("port is not a bundle");
        };
        let names: Vec<&str> =
            port.fields.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(names, ["en", "clk", "addr", "data", "mask", "wmode"]);
    }
}
