//! `test ? a : b`

use sharpexpr_core::DataType;
use sharpexpr_syntax::Expr;

use super::{ExpressionBuilder, Result};
use crate::typed::TypedExpr;

pub(super) fn build_conditional(
    builder: &ExpressionBuilder<'_>,
    test: &Expr,
    if_true: &Expr,
    if_false: &Expr,
) -> Result<TypedExpr> {
    let test = builder.build(test)?;
    let if_true = builder.build(if_true)?;
    let if_false = builder.build(if_false)?;
    let test = builder.require_implicit(test, &DataType::bool())?;
    TypedExpr::conditional(builder.registry(), test, if_true, if_false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sharpexpr_core::BindError;

    use crate::binder::DefaultBinder;

    #[test]
    fn conditional_branches() {
        let registry = Arc::new(sharpexpr_modules::standard_registry().unwrap());
        let binder = DefaultBinder::new(Arc::clone(&registry));
        let builder = ExpressionBuilder::new(&binder);

        let typed = builder
            .build(&Expr::conditional(Expr::literal(true), Expr::literal(1), Expr::literal(2)))
            .unwrap();
        assert_eq!(typed.display(&registry).to_string(), "IIF(True, 1, 2)");
        assert_eq!(typed.data_type(), DataType::int32());

        let err = builder
            .build(&Expr::conditional(Expr::literal(1), Expr::literal(1), Expr::literal(2)))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot implicitly convert type 'System.Int32' to 'System.Boolean'."
        );

        let err = builder
            .build(&Expr::conditional(Expr::literal(true), Expr::literal(1), Expr::literal(2.0)))
            .unwrap_err();
        assert!(matches!(err, BindError::Generic { .. }));
    }
}
