// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The AST produced by [`crate::parser`] over the PL/SQL subset named in
//! SPEC_FULL.md §4.6: block structure, `IF`/`LOOP`/`FOR`/`WHILE`,
//! `OPEN`/`FETCH`/`CLOSE`, DML, `RAISE`, assignment, calls, and the
//! dotted-access/method-call expression grammar of spec.md §4.7.5–4.7.6.
//!
//! This is not a general SQL AST: there is exactly enough structure here for
//! the visitor pipeline (`crate::visitor`) to find and rewrite the
//! constructs spec.md names. Anything else round-trips as opaque text
//! (`Expr::Raw`) rather than being modeled and re-printed.

/// A parameter mode, used by `RoutineSig` (spec.md §4.3's "exact signature
/// metadata").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    In,
    Out,
    InOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub mode: ParamMode,
    pub type_name: String,
}

/// A routine signature, extracted by parsing a stub or a full routine
/// (spec.md §4.3, §8 property 1: "round-trip stubification").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineSig {
    pub name: String,
    pub params: Vec<Param>,
    /// `None` for a procedure; `Some(type)` for a function, including
    /// `SELF AS RESULT` constructors where the type name is the owning
    /// type (callers fill that in — the grammar only sees the literal
    /// `SELF AS RESULT` marker here as `Some("SELF".to_string())`).
    pub return_type: Option<String>,
    pub is_self_as_result: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub declares: Vec<Decl>,
    pub body: Vec<Stmt>,
    pub exception_handlers: Vec<ExceptionHandler>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Variable {
        name: String,
        type_name: String,
        default: Option<Expr>,
    },
    /// `name EXCEPTION;` — paired with a following `PRAGMA
    /// EXCEPTION_INIT(name, -20NNN)` to populate the routine's
    /// `ExceptionMap` (spec.md §4.7.4). Removed from the emitted DECLARE
    /// section once consumed (spec.md §4.7.4).
    Exception { name: String },
    PragmaExceptionInit { name: String, oracle_code: i32 },
    /// An explicit cursor declaration; the query text is kept verbatim
    /// because cursor SELECT bodies are already covered by the statement
    /// visitor when the cursor is opened into a `SELECT ... INTO` context,
    /// and duplicating full SELECT-AST modeling here is out of scope.
    Cursor { name: String, query: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExceptionCond {
    Named(String),
    Others,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub conditions: Vec<ExceptionCond>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Block(Block),
    If {
        cond: Expr,
        then_body: Vec<Stmt>,
        elsifs: Vec<(Expr, Vec<Stmt>)>,
        else_body: Option<Vec<Stmt>>,
    },
    Loop {
        label: Option<String>,
        body: Vec<Stmt>,
    },
    WhileLoop {
        cond: Expr,
        body: Vec<Stmt>,
    },
    ForRangeLoop {
        var: String,
        lower: Expr,
        upper: Expr,
        reverse: bool,
        body: Vec<Stmt>,
    },
    ForCursorLoop {
        var: String,
        cursor: String,
        body: Vec<Stmt>,
    },
    Open {
        cursor: String,
    },
    Fetch {
        cursor: String,
        into: Vec<String>,
    },
    Close {
        cursor: String,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    SelectInto(SelectIntoStmt),
    Raise(RaiseStmt),
    /// A standalone call used as a statement: `proc_name(args);` or
    /// `DBMS_OUTPUT.PUT_LINE(x);`.
    Call {
        target: Expr,
    },
    Null,
    Return(Option<Expr>),
    Exit {
        label: Option<String>,
        when: Option<Expr>,
    },
    /// Any statement kind outside this subset; preserved verbatim so a
    /// construct the visitor pipeline doesn't understand still round-trips
    /// instead of being silently dropped.
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStmt {
    pub items: Vec<SelectItem>,
    pub from: Vec<TableRef>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectIntoStmt {
    pub select: SelectStmt,
    pub into: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertSource {
    Values(Vec<Vec<Expr>>),
    Select(SelectStmt),
    /// `INSERT INTO t VALUES rec;` — a single record-typed expression used
    /// as the whole row (spec.md §4.7.2: "Record-variable source... is
    /// preserved").
    Record(Expr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStmt {
    pub table: String,
    pub columns: Vec<String>,
    pub source: InsertSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStmt {
    pub table: String,
    pub alias: Option<String>,
    pub set: Vec<Assignment>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStmt {
    pub table: String,
    pub alias: Option<String>,
    /// Tracks whether the source text had an explicit `FROM` so the
    /// `DELETE target` → `DELETE FROM target` normalization (spec.md
    /// §4.7.2) is only cosmetic, never semantic.
    pub had_explicit_from: bool,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaiseStmt {
    /// `RAISE;` re-raise.
    Reraise,
    /// `RAISE name;` — a user-defined or standard exception name.
    Named(String),
    /// `RAISE_APPLICATION_ERROR(-20NNN, msg)`.
    ApplicationError { oracle_code: i32, message: Expr },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorAttr {
    Found,
    NotFound,
    RowCount,
    IsOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Number(String),
    String(String),
    Null,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Ident(String),
    /// A dotted chain of length >= 2, e.g. `l.langy.de` or `self.x`. Kept
    /// flat (not nested field accesses) until the object-field-access
    /// visitor (spec.md §4.7.5) decides how much of the chain is a table
    /// alias / object-field path versus ordinary column access.
    Dotted(Vec<String>),
    /// `cursor_name%FOUND` etc. (spec.md §4.7.3); `cursor_name == "SQL"`
    /// (case-insensitive) denotes the implicit cursor.
    CursorAttr { cursor: String, attr: CursorAttr },
    Literal(Literal),
    BinaryOp {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    UnaryOp {
        op: String,
        expr: Box<Expr>,
    },
    FuncCall {
        name: String,
        args: Vec<Expr>,
    },
    /// `target.method(args)` where `target` is itself an expression (not
    /// just a bare identifier) — the form type-method dispatch (spec.md
    /// §4.7.6) and method chaining both produce.
    MethodCall {
        target: Box<Expr>,
        method: String,
        args: Vec<Expr>,
    },
    Paren(Box<Expr>),
    /// Opaque text for expression grammar this subset doesn't model
    /// (collection constructors, `CASE`, etc.); preserved verbatim.
    Raw(String),
}
