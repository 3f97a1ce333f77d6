use crate::engines::evaluation::interpreter::ExecContext;
use crate::error::RuntimeFailure;
use crate::functions::traits::{check_arity, expect_bool, Operator};
use crate::types::{TypeTag, Value};

enum Operands {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn as_float(alias: &str, value: &Value) -> Result<f64, RuntimeFailure> {
    match value {
        Value::Integer(i) => Ok(*i as f64),
        Value::Float(f) => Ok(*f),
        other => Err(RuntimeFailure::TypeMismatch {
            operator: alias.to_string(),
            expected: TypeTag::num(),
            actual: other.type_tag(),
        }),
    }
}

fn numeric_operands(alias: &str, args: &[Value]) -> Result<Operands, RuntimeFailure> {
    check_arity(alias, args, 2)?;
    match (&args[0], &args[1]) {
        (Value::Integer(a), Value::Integer(b)) => Ok(Operands::Ints(*a, *b)),
        (a, b) => Ok(Operands::Floats(as_float(alias, a)?, as_float(alias, b)?)),
    }
}

fn finite(alias: &str, x: f64) -> Result<Value, RuntimeFailure> {
    if x.is_finite() {
        Ok(Value::Float(x))
    } else {
        Err(RuntimeFailure::Overflow(alias.to_string()))
    }
}

// --- Arithmetic ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

pub struct Arithmetic {
    pub op: ArithOp,
}

impl Arithmetic {
    pub fn new(op: ArithOp) -> Self {
        Self { op }
    }
}

impl Operator for Arithmetic {
    fn alias(&self) -> &str {
        match self.op {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
            ArithOp::Modulo => "mod",
        }
    }
    fn input_types(&self) -> Vec<TypeTag> {
        vec![TypeTag::num(), TypeTag::num()]
    }
    fn output_type(&self) -> TypeTag {
        TypeTag::num()
    }
    fn execute(&self, args: &[Value], _ctx: &mut ExecContext) -> Result<Value, RuntimeFailure> {
        let alias = self.alias();
        let overflow = || RuntimeFailure::Overflow(alias.to_string());
        match numeric_operands(alias, args)? {
            Operands::Ints(a, b) => {
                let result = match self.op {
                    ArithOp::Add => a.checked_add(b).ok_or_else(overflow)?,
                    ArithOp::Subtract => a.checked_sub(b).ok_or_else(overflow)?,
                    ArithOp::Multiply => a.checked_mul(b).ok_or_else(overflow)?,
                    ArithOp::Divide => {
                        if b == 0 {
                            return Err(RuntimeFailure::DivisionByZero);
                        }
                        a.checked_div(b).ok_or_else(overflow)?
                    }
                    ArithOp::Modulo => {
                        if b == 0 {
                            return Err(RuntimeFailure::DivisionByZero);
                        }
                        a.checked_rem(b).ok_or_else(overflow)?
                    }
                };
                Ok(Value::Integer(result))
            }
            Operands::Floats(a, b) => match self.op {
                ArithOp::Add => finite(alias, a + b),
                ArithOp::Subtract => finite(alias, a - b),
                ArithOp::Multiply => finite(alias, a * b),
                ArithOp::Divide | ArithOp::Modulo if b == 0.0 => {
                    Err(RuntimeFailure::DivisionByZero)
                }
                ArithOp::Divide => finite(alias, a / b),
                ArithOp::Modulo => finite(alias, a % b),
            },
        }
    }
}

// --- Comparison ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Less,
    Greater,
    Equal,
}

pub struct Comparison {
    pub op: CompareOp,
}

impl Comparison {
    pub fn new(op: CompareOp) -> Self {
        Self { op }
    }
}

impl Operator for Comparison {
    fn alias(&self) -> &str {
        match self.op {
            CompareOp::Less => "<",
            CompareOp::Greater => ">",
            CompareOp::Equal => "=",
        }
    }
    fn input_types(&self) -> Vec<TypeTag> {
        vec![TypeTag::num(), TypeTag::num()]
    }
    fn output_type(&self) -> TypeTag {
        TypeTag::boolean()
    }
    fn execute(&self, args: &[Value], _ctx: &mut ExecContext) -> Result<Value, RuntimeFailure> {
        let (a, b) = match numeric_operands(self.alias(), args)? {
            Operands::Ints(a, b) => (a as f64, b as f64),
            Operands::Floats(a, b) => (a, b),
        };
        let result = match self.op {
            CompareOp::Less => a < b,
            CompareOp::Greater => a > b,
            CompareOp::Equal => a == b,
        };
        Ok(Value::Bool(result))
    }
}

// --- Logical operators ---
pub struct And;
impl Operator for And {
    fn alias(&self) -> &str {
        "and"
    }
    fn input_types(&self) -> Vec<TypeTag> {
        vec![TypeTag::boolean(), TypeTag::boolean()]
    }
    fn output_type(&self) -> TypeTag {
        TypeTag::boolean()
    }
    fn execute(&self, args: &[Value], _ctx: &mut ExecContext) -> Result<Value, RuntimeFailure> {
        check_arity(self.alias(), args, 2)?;
        let a = expect_bool(self.alias(), &args[0])?;
        let b = expect_bool(self.alias(), &args[1])?;
        Ok(Value::Bool(a && b))
    }
}

pub struct Or;
impl Operator for Or {
    fn alias(&self) -> &str {
        "or"
    }
    fn input_types(&self) -> Vec<TypeTag> {
        vec![TypeTag::boolean(), TypeTag::boolean()]
    }
    fn output_type(&self) -> TypeTag {
        TypeTag::boolean()
    }
    fn execute(&self, args: &[Value], _ctx: &mut ExecContext) -> Result<Value, RuntimeFailure> {
        check_arity(self.alias(), args, 2)?;
        let a = expect_bool(self.alias(), &args[0])?;
        let b = expect_bool(self.alias(), &args[1])?;
        Ok(Value::Bool(a || b))
    }
}

pub struct Not;
impl Operator for Not {
    fn alias(&self) -> &str {
        "not"
    }
    fn input_types(&self) -> Vec<TypeTag> {
        vec![TypeTag::boolean()]
    }
    fn output_type(&self) -> TypeTag {
        TypeTag::boolean()
    }
    fn execute(&self, args: &[Value], _ctx: &mut ExecContext) -> Result<Value, RuntimeFailure> {
        check_arity(self.alias(), args, 1)?;
        Ok(Value::Bool(!expect_bool(self.alias(), &args[0])?))
    }
}

// --- Control ---
/// Numeric conditional. Both branches are evaluated before selection.
pub struct If;
impl Operator for If {
    fn alias(&self) -> &str {
        "if"
    }
    fn input_types(&self) -> Vec<TypeTag> {
        vec![TypeTag::boolean(), TypeTag::num(), TypeTag::num()]
    }
    fn output_type(&self) -> TypeTag {
        TypeTag::num()
    }
    fn execute(&self, args: &[Value], _ctx: &mut ExecContext) -> Result<Value, RuntimeFailure> {
        check_arity(self.alias(), args, 3)?;
        let branch = if expect_bool(self.alias(), &args[0])? { &args[1] } else { &args[2] };
        Ok(branch.clone())
    }
}
