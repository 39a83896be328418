//! Binary expressions.
//!
//! Operand preparation happens here, before operator resolution:
//!
//! - `&&` and `||` require `bool` operands
//! - `??` requires a left side that can be `null`
//! - `+` with a string operand becomes a flattened `String.Concat` call
//! - enum operands are unwrapped to their underlying type and, for
//!   non-comparisons, the result is wrapped back
//! - shift operands are widened to `int`, and `>>>` is rewritten as an
//!   unsigned shift
//! - numeric operands go through binary numeric promotion

use std::sync::Arc;

use sharpexpr_core::{BinaryOp, BindError, DataType, MethodEntry, PrimitiveKind, primitives};
use sharpexpr_syntax::{Expr, Identifier};

use super::{ExpressionBuilder, Result, convert_to, retype_null};
use crate::operators::{OperatorResolution, resolve_binary};
use crate::overload::{Resolution, resolve};
use crate::typed::TypedExpr;

pub(super) fn build_binary(
    builder: &ExpressionBuilder<'_>,
    op: &Identifier,
    left: &Expr,
    right: &Expr,
) -> Result<TypedExpr> {
    let left = builder.build(left)?;
    let right = builder.build(right)?;
    let Some(parsed) = BinaryOp::from_token(op.name()) else {
        return Err(BindError::generic(format!("Operator '{op}' is not supported.")));
    };
    let site = Site {
        builder,
        op: parsed,
        left_type: left.data_type(),
        right_type: right.data_type(),
    };

    match parsed {
        BinaryOp::AndAlso | BinaryOp::OrElse => {
            let left = builder.require_implicit(left, &DataType::bool())?;
            let right = builder.require_implicit(right, &DataType::bool())?;
            site.make(parsed, left, right)
        }
        BinaryOp::Coalesce => site.coalesce(left, right),
        BinaryOp::Add if site.left_type.is_string() || site.right_type.is_string() => {
            concat(builder, left, right)
        }
        _ => site.apply(left, right),
    }
}

/// One binary operator being bound, with the operand types as written.
struct Site<'b, 'a> {
    builder: &'b ExpressionBuilder<'a>,
    op: BinaryOp,
    left_type: DataType,
    right_type: DataType,
}

impl Site<'_, '_> {
    fn not_applicable(&self) -> BindError {
        BindError::UnsupportedBinaryOperator {
            op: self.op.token().to_string(),
            left: self.builder.type_name(&self.left_type),
            right: self.builder.type_name(&self.right_type),
        }
    }

    fn coalesce(&self, left: TypedExpr, right: TypedExpr) -> Result<TypedExpr> {
        let registry = self.builder.registry();
        if registry.is_value_type(&self.left_type) && !self.left_type.is_nullable() {
            return Err(self.not_applicable());
        }
        let right = self
            .builder
            .try_implicit(right, &self.left_type)
            .map_err(|_| self.not_applicable())?;
        Ok(TypedExpr::Coalesce {
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    fn apply(&self, mut left: TypedExpr, mut right: TypedExpr) -> Result<TypedExpr> {
        let registry = self.builder.registry();

        if left.is_null_constant() && !right.is_null_constant() && registry.accepts_null(&self.right_type) {
            left = retype_null(self.right_type);
        } else if right.is_null_constant() && !left.is_null_constant() && registry.accepts_null(&self.left_type) {
            right = retype_null(self.left_type);
        }

        let enum_info = [self.left_type, self.right_type]
            .into_iter()
            .find_map(|t| registry.enum_underlying(&t).map(|kind| (t, DataType::primitive(kind))));

        if let Some((enum_type, underlying)) = enum_info {
            if self.left_type != self.right_type {
                let other = if enum_type == self.left_type {
                    self.right_type
                } else {
                    self.left_type
                };
                if other != underlying {
                    return Err(self.not_applicable());
                }
            }
            left = convert_to(left, underlying);
            right = convert_to(right, underlying);
        } else if self.op.is_shift() && left.data_type().primitive_kind().is_some() {
            return self.shift(left, right);
        }

        let (left, right) = self.promote(left, right)?;
        let result = self.make(self.op, left, right)?;

        match enum_info {
            Some((enum_type, _)) if !self.op.is_comparison() => Ok(TypedExpr::convert(result, enum_type)),
            _ => Ok(result),
        }
    }

    fn shift(&self, mut left: TypedExpr, mut right: TypedExpr) -> Result<TypedExpr> {
        let int = DataType::int32();
        if !left.data_type().is_integer() {
            return Err(self.not_applicable());
        }
        if is_small_integer(&right.data_type()) {
            right = TypedExpr::convert(right, int);
        }
        if right.data_type() != int {
            return Err(self.not_applicable());
        }
        if is_small_integer(&left.data_type()) {
            left = TypedExpr::convert(left, int);
        }

        if self.op != BinaryOp::UShr {
            return self.make(self.op, left, right);
        }
        let signed = left.data_type();
        let unsigned = match signed.primitive_kind() {
            Some(PrimitiveKind::Int32) => PrimitiveKind::UInt32,
            Some(PrimitiveKind::Int64) => PrimitiveKind::UInt64,
            _ => return self.make(BinaryOp::Shr, left, right),
        };
        let left = TypedExpr::convert(left, DataType::primitive(unsigned));
        let shifted = self.make(BinaryOp::Shr, left, right)?;
        Ok(TypedExpr::convert(shifted, signed))
    }

    /// Binary numeric promotion.
    fn promote(&self, left: TypedExpr, right: TypedExpr) -> Result<(TypedExpr, TypedExpr)> {
        let (l, r) = match (left.data_type().primitive_kind(), right.data_type().primitive_kind()) {
            (Some(l), Some(r)) if l.is_numeric() && r.is_numeric() => (l, r),
            _ => return Ok((left, right)),
        };
        let target = DataType::primitive(promoted_kind(l, r).ok_or_else(|| self.not_applicable())?);
        Ok((convert_to(left, target), convert_to(right, target)))
    }

    fn make(&self, op: BinaryOp, left: TypedExpr, right: TypedExpr) -> Result<TypedExpr> {
        let registry = self.builder.registry();
        let resolution = resolve_binary(registry, op, &left.data_type(), &right.data_type())?;
        match resolution {
            Some(OperatorResolution::Primitive { result_type }) => Ok(TypedExpr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                data_type: result_type,
                method: None,
            }),
            Some(OperatorResolution::Method { method }) => {
                let mut args = self
                    .builder
                    .adapt_arguments(&method.params, vec![left, right])?
                    .into_iter();
                let (Some(left), Some(right)) = (args.next(), args.next()) else {
                    return Err(self.not_applicable());
                };
                Ok(TypedExpr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                    data_type: method.return_type,
                    method: Some(method),
                })
            }
            None => Err(self.not_applicable()),
        }
    }
}

fn is_small_integer(data_type: &DataType) -> bool {
    matches!(
        data_type.primitive_kind(),
        Some(PrimitiveKind::Int8 | PrimitiveKind::UInt8 | PrimitiveKind::Int16 | PrimitiveKind::UInt16)
    )
}

/// The common type of two numeric operands, or `None` when mixing them is an
/// error (`decimal` with a floating type, `ulong` with a signed integer).
fn promoted_kind(l: PrimitiveKind, r: PrimitiveKind) -> Option<PrimitiveKind> {
    use PrimitiveKind::*;

    let either = |k: PrimitiveKind| l == k || r == k;
    let any_of = |ks: &[PrimitiveKind]| ks.contains(&l) || ks.contains(&r);

    if either(Decimal) {
        return (!any_of(&[Float, Double])).then_some(Decimal);
    }
    if either(Double) {
        return Some(Double);
    }
    if either(Float) {
        return Some(Float);
    }
    if either(UInt64) {
        return (!any_of(&[Int8, Int16, Int32, Int64])).then_some(UInt64);
    }
    if either(Int64) {
        return Some(Int64);
    }
    if either(UInt32) {
        return Some(if any_of(&[Int8, Int16, Int32]) { Int64 } else { UInt32 });
    }
    Some(Int32)
}

// =============================================================================
// String concatenation
// =============================================================================

fn is_concat(method: &MethodEntry) -> bool {
    method.declaring_type == primitives::STRING && method.name == "Concat"
}

/// Splice the arguments of an earlier `Concat` into this one.
fn flatten(expr: TypedExpr, out: &mut Vec<TypedExpr>) {
    match expr {
        TypedExpr::Call {
            instance: None,
            method,
            mut args,
        } if is_concat(&method) => {
            if args.len() == 1 && matches!(args[0], TypedExpr::NewArray { .. }) {
                if let Some(TypedExpr::NewArray { items, .. }) = args.pop() {
                    out.extend(items);
                }
            } else {
                out.extend(args);
            }
        }
        other => out.push(other),
    }
}

fn concat(builder: &ExpressionBuilder<'_>, left: TypedExpr, right: TypedExpr) -> Result<TypedExpr> {
    let registry = builder.registry();
    let mut args = Vec::new();
    flatten(left, &mut args);
    flatten(right, &mut args);

    let mut arg_types: Vec<DataType> = args.iter().map(TypedExpr::data_type).collect();
    if arg_types.iter().any(|t| !t.is_string()) {
        let object = DataType::object();
        args = args
            .into_iter()
            .map(|arg| {
                if registry.is_value_type(&arg.data_type()) {
                    TypedExpr::convert(arg, object)
                } else {
                    arg
                }
            })
            .collect();
        arg_types = vec![object; args.len()];
    }

    let overloads = registry.find_methods(&DataType::string(), "Concat", true);
    let Resolution::Match { index, .. } = resolve(registry, &overloads, &arg_types) else {
        return Err(BindError::generic("Unable to resolve a method: String.Concat."));
    };
    let method: Arc<MethodEntry> = Arc::clone(&overloads[index]);
    let args = builder.adapt_arguments(&method.params, args)?;
    Ok(TypedExpr::call(None, method, args))
}
