//! Common test utilities for MIR tests
//!
//! Besides lowering helpers this provides a small interpreter for lowered
//! modules, so tests can check what a program *does* rather than how its
//! blocks are laid out.

#![allow(dead_code)]

use std::collections::HashMap;

use mana_compiler_ast::{Program, Spanned, Statement};
use mana_compiler_diagnostics::{DiagnosticCollection, DiagnosticSeverity};
use mana_compiler_mir::{
    lower_program, BasicBlockId, BinaryOp, CastKind, ComparePredicate, FunctionId,
    InstructionKind, Literal, LoweringConfig, MirFunction, MirModule, NumericKind, Terminator,
    UnaryOp, Value, ValueId,
};

/// Lowers `statements` with the default configuration
pub fn lower(statements: Vec<Spanned<Statement>>) -> (MirModule, DiagnosticCollection) {
    lower_with(&LoweringConfig::default(), statements)
}

pub fn lower_with(
    config: &LoweringConfig,
    statements: Vec<Spanned<Statement>>,
) -> (MirModule, DiagnosticCollection) {
    let mut diagnostics = DiagnosticCollection::new();
    let module = lower_program(&Program::new(statements), config, &mut diagnostics);
    (module, diagnostics)
}

/// Lowers `statements`, asserting that no diagnostic at all was produced
pub fn lower_clean(statements: Vec<Spanned<Statement>>) -> MirModule {
    let (module, diagnostics) = lower(statements);
    assert!(
        diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        diagnostics.all()
    );
    module
}

/// The messages of all diagnostics of `severity`
pub fn messages(diagnostics: &DiagnosticCollection, severity: DiagnosticSeverity) -> Vec<String> {
    diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == severity)
        .map(|diagnostic| diagnostic.message.clone())
        .collect()
}

pub fn main_function(module: &MirModule) -> &MirFunction {
    module
        .function_by_name("main")
        .expect("entry point should exist")
}

/// Checks the CFG invariants directly, independently of `validate`:
/// every attached block has a terminator, recorded predecessors match the
/// edges, and every phi has one incoming value per predecessor.
pub fn assert_well_formed(function: &MirFunction) {
    let mut incoming: HashMap<BasicBlockId, Vec<BasicBlockId>> = HashMap::new();
    for (id, block) in function.blocks() {
        assert!(
            block.is_terminated(),
            "block{} of '{}' is not terminated",
            id.index(),
            function.name
        );
        for target in block.terminator.target_blocks() {
            assert!(function.is_attached(target));
            incoming.entry(target).or_default().push(id);
        }
    }

    for (id, block) in function.blocks() {
        let mut expected = incoming.remove(&id).unwrap_or_default();
        let mut recorded = block.preds.clone();
        expected.sort();
        recorded.sort();
        assert_eq!(recorded, expected, "predecessors of block{}", id.index());

        for instruction in block.instructions() {
            if let InstructionKind::Phi { sources, .. } = &instruction.kind {
                assert_eq!(sources.len(), block.preds.len());
                for (source, _) in sources {
                    assert!(block.preds.contains(source));
                }
            }
        }
    }
}

/// A runtime value of the interpreter
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeValue {
    Int(i32),
    Float(f64),
    Bool(bool),
    Str(Option<String>),
    Function(FunctionId),
    Unit,
}

impl RuntimeValue {
    pub fn as_int(&self) -> i32 {
        match self {
            Self::Int(value) => *value,
            other => panic!("expected int, got {other:?}"),
        }
    }

    pub fn as_float(&self) -> f64 {
        match self {
            Self::Float(value) => *value,
            other => panic!("expected float, got {other:?}"),
        }
    }
}

/// Executes lowered modules
pub struct Interpreter<'m> {
    module: &'m MirModule,
    /// Arguments passed to `print`, in order
    pub output: Vec<String>,
    /// Names of the defined functions called, in order
    pub calls: Vec<String>,
    steps: usize,
    step_limit: usize,
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m MirModule) -> Self {
        Self {
            module,
            output: Vec::new(),
            calls: Vec::new(),
            steps: 0,
            step_limit: 100_000,
        }
    }

    /// Runs the function called `name`
    pub fn run(&mut self, name: &str, args: Vec<RuntimeValue>) -> Result<RuntimeValue, String> {
        let id = self
            .module
            .lookup_function(name)
            .ok_or_else(|| format!("no function '{name}'"))?;
        self.call(id, args)
    }

    fn call(&mut self, id: FunctionId, args: Vec<RuntimeValue>) -> Result<RuntimeValue, String> {
        let module = self.module;
        let function = module
            .get_function(id)
            .ok_or_else(|| format!("call to missing function {}", id.index()))?;

        if function.is_external() {
            return match (function.name.as_str(), args.as_slice()) {
                ("print", [RuntimeValue::Str(text)]) => {
                    self.output.push(text.clone().unwrap_or_default());
                    Ok(RuntimeValue::Unit)
                }
                (name, _) => Err(format!("unknown external '{name}'")),
            };
        }

        self.calls.push(function.name.clone());
        if args.len() != function.parameters.len() {
            return Err(format!("arity mismatch calling '{}'", function.name));
        }

        let mut frame = Frame::default();
        for (param, arg) in function.parameters.iter().zip(args) {
            if let Some(value) = param.value {
                frame.values.insert(value, arg);
            }
        }

        let mut block_id = function.entry_block;
        let mut previous = None;
        loop {
            self.steps += 1;
            if self.steps > self.step_limit {
                return Err("step limit exceeded".to_string());
            }

            let block = function
                .get_basic_block(block_id)
                .ok_or("jump to missing block")?;
            for instruction in block.instructions() {
                self.execute(&mut frame, &instruction.kind, previous)?;
            }

            match &block.terminator {
                Terminator::Jump { target } => {
                    previous = Some(block_id);
                    block_id = *target;
                }
                Terminator::If {
                    condition,
                    then_target,
                    else_target,
                } => {
                    let taken = match self.eval(&frame, condition)? {
                        RuntimeValue::Bool(value) => value,
                        other => return Err(format!("branch on {other:?}")),
                    };
                    previous = Some(block_id);
                    block_id = if taken { *then_target } else { *else_target };
                }
                Terminator::Return { value } => {
                    return match value {
                        Some(value) => self.eval(&frame, value),
                        None => Ok(RuntimeValue::Unit),
                    };
                }
                Terminator::Unreachable => return Err("reached unreachable".to_string()),
            }
        }
    }

    fn eval(&self, frame: &Frame, value: &Value) -> Result<RuntimeValue, String> {
        Ok(match value {
            Value::Literal(Literal::Integer(value)) => RuntimeValue::Int(*value),
            Value::Literal(Literal::Float(value)) => RuntimeValue::Float(*value),
            Value::Literal(Literal::Boolean(value)) => RuntimeValue::Bool(*value),
            Value::Literal(Literal::String(id)) => {
                RuntimeValue::Str(self.module.string(*id).map(str::to_string))
            }
            Value::Literal(Literal::Null) => RuntimeValue::Str(None),
            Value::Literal(Literal::Function(id)) => RuntimeValue::Function(*id),
            Value::Literal(Literal::Unit) => RuntimeValue::Unit,
            Value::Operand(id) => frame
                .values
                .get(id)
                .cloned()
                .ok_or_else(|| format!("read of undefined %{}", id.index()))?,
            Value::Error => return Err("evaluated the error sentinel".to_string()),
        })
    }

    fn execute(
        &mut self,
        frame: &mut Frame,
        kind: &InstructionKind,
        previous: Option<BasicBlockId>,
    ) -> Result<(), String> {
        match kind {
            InstructionKind::Alloca { .. } => {}
            InstructionKind::Load { dest, slot } => {
                let value = frame
                    .slots
                    .get(&slot.index())
                    .cloned()
                    .ok_or_else(|| format!("load of uninitialized ${}", slot.index()))?;
                frame.values.insert(*dest, value);
            }
            InstructionKind::Store { slot, value } => {
                let value = self.eval(frame, value)?;
                frame.slots.insert(slot.index(), value);
            }
            InstructionKind::Binary {
                op,
                dest,
                left,
                right,
            } => {
                let result = binary(*op, self.eval(frame, left)?, self.eval(frame, right)?)?;
                frame.values.insert(*dest, result);
            }
            InstructionKind::Compare {
                pred,
                kind,
                dest,
                left,
                right,
            } => {
                let result = compare(*pred, *kind, self.eval(frame, left)?, self.eval(frame, right)?)?;
                frame.values.insert(*dest, RuntimeValue::Bool(result));
            }
            InstructionKind::Unary { op, dest, source } => {
                let result = match (op, self.eval(frame, source)?) {
                    (UnaryOp::Neg, RuntimeValue::Int(value)) => RuntimeValue::Int(value.wrapping_neg()),
                    (UnaryOp::FNeg, RuntimeValue::Float(value)) => RuntimeValue::Float(-value),
                    (UnaryOp::Not, RuntimeValue::Bool(value)) => RuntimeValue::Bool(!value),
                    (op, value) => return Err(format!("{op:?} on {value:?}")),
                };
                frame.values.insert(*dest, result);
            }
            InstructionKind::Cast { kind, dest, source } => {
                let result = match (kind, self.eval(frame, source)?) {
                    (CastKind::IntToFloat, RuntimeValue::Int(value)) => {
                        RuntimeValue::Float(f64::from(value))
                    }
                    (CastKind::BoolToInt, RuntimeValue::Bool(value)) => {
                        RuntimeValue::Int(i32::from(value))
                    }
                    (kind, value) => return Err(format!("{kind:?} on {value:?}")),
                };
                frame.values.insert(*dest, result);
            }
            InstructionKind::Call { dest, callee, args } => {
                let args = self.eval_all(frame, args)?;
                let result = self.call(*callee, args)?;
                if let Some(dest) = dest {
                    frame.values.insert(*dest, result);
                }
            }
            InstructionKind::CallIndirect { dest, callee, args } => {
                let RuntimeValue::Function(callee) = self.eval(frame, callee)? else {
                    return Err("indirect call of a non-function".to_string());
                };
                let args = self.eval_all(frame, args)?;
                let result = self.call(callee, args)?;
                if let Some(dest) = dest {
                    frame.values.insert(*dest, result);
                }
            }
            InstructionKind::Phi { dest, sources, .. } => {
                let previous = previous.ok_or("phi in a block entered without a predecessor")?;
                let (_, value) = sources
                    .iter()
                    .find(|(block, _)| *block == previous)
                    .ok_or("phi has no value for the incoming edge")?;
                let value = self.eval(frame, value)?;
                frame.values.insert(*dest, value);
            }
        }
        Ok(())
    }

    fn eval_all(&self, frame: &Frame, values: &[Value]) -> Result<Vec<RuntimeValue>, String> {
        values.iter().map(|value| self.eval(frame, value)).collect()
    }
}

#[derive(Default)]
struct Frame {
    values: HashMap<ValueId, RuntimeValue>,
    slots: HashMap<usize, RuntimeValue>,
}

fn binary(op: BinaryOp, left: RuntimeValue, right: RuntimeValue) -> Result<RuntimeValue, String> {
    use RuntimeValue::{Float, Int};
    Ok(match (op, left, right) {
        (BinaryOp::Add, Int(a), Int(b)) => Int(a.wrapping_add(b)),
        (BinaryOp::Sub, Int(a), Int(b)) => Int(a.wrapping_sub(b)),
        (BinaryOp::Mul, Int(a), Int(b)) => Int(a.wrapping_mul(b)),
        (BinaryOp::Div, Int(a), Int(b)) => {
            Int(a.checked_div(b).ok_or("integer division by zero")?)
        }
        (BinaryOp::Rem, Int(a), Int(b)) => {
            Int(a.checked_rem(b).ok_or("integer remainder by zero")?)
        }
        (BinaryOp::FAdd, Float(a), Float(b)) => Float(a + b),
        (BinaryOp::FSub, Float(a), Float(b)) => Float(a - b),
        (BinaryOp::FMul, Float(a), Float(b)) => Float(a * b),
        (BinaryOp::FDiv, Float(a), Float(b)) => Float(a / b),
        (op, a, b) => return Err(format!("{op:?} on {a:?} and {b:?}")),
    })
}

fn compare(
    pred: ComparePredicate,
    kind: NumericKind,
    left: RuntimeValue,
    right: RuntimeValue,
) -> Result<bool, String> {
    use std::cmp::Ordering;

    let ordering = match (kind, left, right) {
        (NumericKind::Int, RuntimeValue::Int(a), RuntimeValue::Int(b)) => Some(a.cmp(&b)),
        (NumericKind::Int, RuntimeValue::Bool(a), RuntimeValue::Bool(b)) => Some(a.cmp(&b)),
        (NumericKind::Float, RuntimeValue::Float(a), RuntimeValue::Float(b)) => a.partial_cmp(&b),
        (kind, a, b) => return Err(format!("{kind:?} comparison of {a:?} and {b:?}")),
    };

    // Ordered float predicates are false on NaN
    let Some(ordering) = ordering else {
        return Ok(false);
    };
    Ok(match pred {
        ComparePredicate::Eq => ordering == Ordering::Equal,
        ComparePredicate::Ne => ordering != Ordering::Equal,
        ComparePredicate::Lt => ordering == Ordering::Less,
        ComparePredicate::Le => ordering != Ordering::Greater,
        ComparePredicate::Gt => ordering == Ordering::Greater,
        ComparePredicate::Ge => ordering != Ordering::Less,
    })
}

/// Runs `main` of a module and returns its exit value and printed output
pub fn run_main(module: &MirModule) -> (i32, Vec<String>) {
    let mut interpreter = Interpreter::new(module);
    let result = interpreter
        .run("main", vec![])
        .unwrap_or_else(|error| panic!("execution failed: {error}\n{}", module.dump()));
    (result.as_int(), interpreter.output)
}
