use crate::symbolic::rational::Rational;
use crate::symbolic::symbolic_arithmetic::{add, divide, multiply, pow};
use crate::symbolic::symbolic_context::{Context, NativeFn};
use crate::symbolic::symbolic_engine::{Children, Expr, Group, Power};
use crate::symbolic::symbolic_errors::{DomainError, KernelError, KernelResult};
//___________________________________TESTS____________________________________

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::Arc;
    use strum::IntoEnumIterator;

    fn sample(ctx: &Context) -> Vec<Expr> {
        [
            "x",
            "2x",
            "x^2",
            "x+1",
            "x*y",
            "sqrt(2)",
            "1/3",
            "sin(x)",
            "2^x",
            "(x+y)^2",
            "-y^(1/2)",
        ]
        .iter()
        .map(|text| ctx.parse(text).unwrap())
        .collect()
    }

    #[test]
    fn test_round_trip() {
        let ctx = Context::new();
        let inputs = [
            "2x+3x",
            "(x+1)^2",
            "x*y+y*x",
            "x^2+x+1",
            "2*x*(x+y)",
            "x^y",
            "x^(y+1)",
            "(x+1)^y",
            "3x^y",
            "2^(1/3)",
            "sqrt(2)",
            "sqrt(12)",
            "sin(x)^2+cos(x)",
            "-x^2",
            "x/y",
            "1/2*x-3/4",
            "-x+y",
            "3*i",
            "(x+y)^(1/2)",
            "(x+1)^(-1)",
            "exp(2)",
            "e^x",
            "log(x+1,2)",
            "f_1*max(x,y)",
            "x!",
            "2*x^2*y-y/3",
        ];
        for input in inputs {
            let e = ctx.parse(input).unwrap();
            let text = e.text();
            let back = ctx.parse(&text).unwrap();
            assert_eq!(back, e, "{} printed as {}", input, text);
        }
    }

    #[test]
    fn test_commutativity() {
        let ctx = Context::new();
        let values = sample(&ctx);
        for a in &values {
            for b in &values {
                assert_eq!(
                    add(a.clone(), b.clone(), &ctx).unwrap(),
                    add(b.clone(), a.clone(), &ctx).unwrap(),
                    "{} + {}",
                    a,
                    b
                );
                assert_eq!(
                    multiply(a.clone(), b.clone(), &ctx).unwrap(),
                    multiply(b.clone(), a.clone(), &ctx).unwrap(),
                    "{} * {}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_identity_laws() {
        let ctx = Context::new();
        for a in sample(&ctx) {
            assert_eq!(add(a.clone(), Expr::zero(), &ctx).unwrap(), a);
            assert_eq!(multiply(a.clone(), Expr::one(), &ctx).unwrap(), a);
            assert_eq!(pow(a.clone(), Expr::one(), &ctx).unwrap(), a);
            assert_eq!(pow(a.clone(), Expr::zero(), &ctx).unwrap(), Expr::one());
        }
    }

    #[test]
    fn test_like_terms_and_exact_rationals() {
        let ctx = Context::new();
        assert_eq!(ctx.parse("x+x").unwrap(), ctx.parse("2*x").unwrap());
        assert_eq!(ctx.parse("x*x").unwrap(), ctx.parse("x^2").unwrap());
        assert_eq!(ctx.parse("1/3 + 1/6").unwrap(), ctx.parse("1/2").unwrap());
        assert_eq!(ctx.parse("0.1+0.2").unwrap(), ctx.parse("3/10").unwrap());
    }

    #[test]
    fn test_division_by_zero() {
        let ctx = Context::new();
        let one = ctx.parse("1").unwrap();
        let zero = ctx.parse("0").unwrap();
        assert_eq!(
            divide(one, zero, &ctx),
            Err(KernelError::Domain(DomainError::DivisionByZero))
        );
    }

    #[test]
    fn test_scenario_like_terms() {
        let e = Context::new().parse("2x+3x").unwrap();
        assert_eq!(e.group(), Group::S);
        assert_eq!(e.value(), "x");
        assert_eq!(e.multiplier(), &Rational::from_integer(5));
        assert_eq!(e.power(), Power::Rational(Rational::one()));
    }

    #[test]
    fn test_scenario_power_of_sum() {
        let e = Context::new().parse("(x+1)^2").unwrap();
        assert_eq!(e.group(), Group::CP);
        assert_eq!(e.power(), Power::Rational(Rational::from_integer(2)));
        match e.children() {
            Children::Terms(terms) => assert_eq!(terms.len(), 2),
            _ => panic!("a sum has terms"),
        }
        assert_eq!(e.text(), "(x+1)^2");
    }

    #[test]
    fn test_scenario_square_root() {
        let ctx = Context::new();
        let exact = ctx.parse("2^(1/2)").unwrap();
        assert_eq!(exact.group(), Group::FN);
        assert_eq!(exact.value(), "sqrt");
        let _numeric = ctx.numeric_scope(true);
        let approx = ctx.parse("2^(1/2)").unwrap();
        assert_eq!(approx.group(), Group::N);
        assert_relative_eq!(approx.to_f64().unwrap(), 2f64.sqrt(), epsilon = 1e-13);
    }

    #[test]
    fn test_scenario_product_terms_merge() {
        let e = Context::new().parse("x*y+y*x").unwrap();
        assert_eq!(e.group(), Group::CB);
        assert_eq!(e.multiplier(), &Rational::from_integer(2));
        assert_eq!(e.value(), "x*y");
        assert_eq!(e.text(), "2*x*y");
    }

    #[test]
    fn test_inspection() {
        let ctx = Context::new();
        let call = ctx.parse("sin(x+1)").unwrap();
        match call.children() {
            Children::Arguments(args) => assert_eq!(args[0].text(), "x+1"),
            _ => panic!("a call has arguments"),
        }
        let ex = ctx.parse("(x+1)^y").unwrap();
        assert_eq!(ex.group(), Group::EX);
        assert_eq!(ex.base().map(Expr::text), Some("x+1".to_string()));
        assert_eq!(ex.power(), Power::Symbolic(Expr::variable("y")));
        let e = ctx.parse("sin(x)+y").unwrap();
        assert!(e.contains("x"));
        assert!(!e.contains("sin"));
        assert!(!e.is_constant());
        assert!(ctx.parse("pi*sqrt(2)").unwrap().is_constant());
    }

    #[test]
    fn test_operands_are_not_aliased() {
        let ctx = Context::new();
        let a = ctx.parse("x+1").unwrap();
        let kept = a.clone();
        let grown = add(a, Expr::variable("x"), &ctx).unwrap();
        assert_eq!(kept.text(), "x+1");
        assert_eq!(grown.text(), "2*x+1");
    }

    #[test]
    fn test_suppressed_fallbacks() {
        let ctx = Context::new();
        {
            let _suppress = ctx.suppress_scope(true);
            assert_eq!(ctx.parse("log(0)").unwrap().text(), "-Infinity");
            assert_eq!(ctx.parse("tan(pi/2)").unwrap(), Expr::infinity());
            assert_eq!(ctx.parse("mod(5,0)").unwrap(), Expr::integer(5));
            assert_eq!(ctx.parse("factorial(-1)").unwrap(), Expr::infinity());
            assert_eq!(ctx.parse("0^0").unwrap(), Expr::one());
        }
        assert!(matches!(ctx.parse("log(0)"), Err(KernelError::Domain(_))));
        assert!(!ctx.suppresses_errors());
    }

    #[test]
    fn test_suppressed_infinity_arithmetic() {
        let ctx = Context::new();
        {
            let _suppress = ctx.suppress_scope(true);
            assert_eq!(ctx.parse("1/0-1/0").unwrap(), Expr::infinity());
            assert_eq!(ctx.parse("0*(1/0)").unwrap(), Expr::infinity());
            assert_eq!(ctx.parse("log(0)+log(0)*(-1)").unwrap(), Expr::infinity());
            assert_eq!(ctx.parse("1/(1/0)").unwrap(), Expr::zero());
            assert_eq!(ctx.parse("1/0+1").unwrap(), Expr::infinity());
            assert_eq!(ctx.parse("log(0)*2+x").unwrap().text(), "-Infinity");
            assert_eq!(ctx.parse("(1/0)^0").unwrap(), Expr::one());
        }
        assert!(matches!(
            ctx.parse("Infinity-Infinity"),
            Err(KernelError::Domain(DomainError::Undefined(_)))
        ));
        assert_eq!(ctx.parse("Infinity+1").unwrap(), Expr::infinity());
        assert_eq!(ctx.parse("3/Infinity").unwrap(), Expr::zero());
    }

    #[test]
    fn test_square_roots_are_canonical() {
        let ctx = Context::new();
        assert_eq!(ctx.parse("sqrt(2)*sqrt(3)").unwrap(), ctx.parse("sqrt(6)").unwrap());
        assert_eq!(ctx.parse("(2/3)^(1/2)").unwrap(), ctx.parse("sqrt(6)/3").unwrap());
        assert_eq!(ctx.parse("sqrt(2)*sqrt(6)").unwrap().text(), "2*sqrt(3)");
        assert_eq!(ctx.parse("sqrt(2)*x*sqrt(8)").unwrap().text(), "4*x");
        let e = ctx.parse("sqrt(5)*sqrt(7)").unwrap();
        assert_eq!(e.group(), Group::FN);
        assert_relative_eq!(e.to_f64().unwrap(), 35f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_native_function() {
        let mut ctx = Context::new();
        let native: NativeFn = Arc::new(
            |args: &[Expr], ctx: &Context| -> KernelResult<Option<Expr>> {
                if args[0].is_number() {
                    multiply(args[0].clone(), Expr::integer(2), ctx).map(Some)
                } else {
                    Ok(None)
                }
            },
        );
        ctx.register_function("double", 1, Some(1), Some(native)).unwrap();
        assert_eq!(ctx.parse("double(21)").unwrap(), Expr::integer(42));
        assert_eq!(ctx.parse("double(x)^2").unwrap().text(), "double(x)^2");
    }

    #[test]
    fn test_group_listing() {
        let names: Vec<String> = Group::iter().map(|group| group.to_string()).collect();
        assert_eq!(names, ["N", "P", "S", "EX", "FN", "PL", "CB", "CP"]);
    }
}
