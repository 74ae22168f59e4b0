//! partial evaluation of template expressions
//!
//! Every attribute expression in a template is either evaluated fully
//! against the known namespaces or preserved untouched as source text for
//! the downstream toolchain. The decision is made per attribute over the
//! whole expression tree: one unknown traversal root anywhere (or a call to
//! a function the engine does not own) keeps the entire expression as-is.
//!
//! A reference that *looks* resolvable — its root is a known namespace —
//! but fails to resolve is a hard error, not a pass-through: it signals an
//! authoring mistake rather than an intentional downstream reference.
use crate::value;
use crate::visit::VisitExpressions;
use hcl::eval::{Context, Evaluate};
use hcl_edit::structure::{Attribute, Body, Structure};

/// Namespace roots the engine may resolve
pub const KNOWN_ROOTS: [&str; 2] = ["global", "strata"];

/// Functions the engine evaluates itself; every other call is downstream
const KNOWN_FUNCS: [&str; 1] = ["try"];

/// Stack metadata exposed as the `strata` namespace
#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct StackMeta {
    /// Project-rooted stack directory, e.g. `/stacks/production`
    pub path: String,
    /// Stack name, by convention the last path component
    pub name: String,
}

/// Read-only snapshot of the data sources of one resolution request
///
/// The snapshot is owned and [Clone], so concurrent per-stack resolutions
/// can each hold their own copy without any shared state.
#[derive(Debug, Clone)]
pub struct EvalContext {
    globals: hcl::value::Map<String, hcl::Value>,
    meta: StackMeta,
}

impl EvalContext {
    pub fn new(globals: hcl::value::Map<String, hcl::Value>, meta: StackMeta) -> Self {
        Self { globals, meta }
    }

    pub fn meta(&self) -> &StackMeta {
        &self.meta
    }

    fn scope(&self) -> Context {
        let mut scope = Context::new();
        scope.declare_var("global", hcl::Value::Object(self.globals.clone()));

        let mut meta = hcl::value::Map::new();
        meta.insert("path".to_string(), hcl::Value::from(self.meta.path.clone()));
        meta.insert("name".to_string(), hcl::Value::from(self.meta.name.clone()));
        scope.declare_var("strata", hcl::Value::Object(meta));

        scope
    }
}

/// Partially evaluates every attribute of `body` in place
///
/// Nested blocks are recursed into but never evaluated themselves; their
/// identifiers and labels are copied verbatim.
pub fn partial_eval(body: &mut Body, context: &EvalContext) -> Result<(), EvalError> {
    let scope = context.scope();
    eval_body(body, &scope)
}

fn eval_body(body: &mut Body, scope: &Context) -> Result<(), EvalError> {
    for i in 0..body.len() {
        match body.get_mut(i).expect("index within body length") {
            Structure::Attribute(attribute) => eval_attribute(attribute, scope)?,
            Structure::Block(block) => eval_body(&mut block.body, scope)?,
        }
    }

    Ok(())
}

fn eval_attribute(attribute: &mut Attribute, scope: &Context) -> Result<(), EvalError> {
    let mut expr: hcl::Expression = attribute.value.clone().into();

    if !should_evaluate(&expr) {
        tracing::trace!(attribute = %attribute.key.value(), "unknown reference, keeping source text");
        return Ok(());
    }

    resolve_fallbacks(&mut expr, scope).map_err(|reason| eval_error(attribute, reason))?;

    let evaluated = expr
        .evaluate(scope)
        .map_err(|error| eval_error(attribute, error.to_string()))?;

    attribute.value = value::encode(&evaluated)
        .parse()
        .expect("encoded literal must be valid hcl");

    tracing::trace!(attribute = %attribute.key.value(), "evaluated");
    Ok(())
}

/// An expression is evaluated only when every traversal root it references
/// is a known namespace and every function it calls is owned by the engine.
fn should_evaluate(expr: &hcl::Expression) -> bool {
    let mut known = true;

    expr.visit_expressions(&mut |expr: &hcl::Expression| match expr {
        hcl::Expression::Variable(variable)
            if !KNOWN_ROOTS.contains(&variable.as_str()) =>
        {
            known = false;
        }
        hcl::Expression::FuncCall(func_call)
            if !KNOWN_FUNCS.contains(&func_call.name.as_str()) =>
        {
            known = false;
        }
        _ => {}
    });

    known
}

/// Resolves `try` calls bottom-up with real fallback semantics: the first
/// argument that evaluates wins, a failing argument falls through to the
/// next one. Plain evaluation cannot do this because it evaluates function
/// arguments eagerly and would surface the error `try` is meant to swallow.
fn resolve_fallbacks(expr: &mut hcl::Expression, scope: &Context) -> Result<(), String> {
    use hcl::Expression;

    match expr {
        Expression::FuncCall(func_call) if func_call.name.as_str() == "try" => {
            let mut resolved = None;
            for arg in &mut func_call.args {
                if resolve_fallbacks(arg, scope).is_err() {
                    continue;
                }

                if let Ok(value) = arg.evaluate(scope) {
                    resolved = Some(value);
                    break;
                }
            }

            match resolved {
                Some(value) => {
                    *expr = value.into();
                    Ok(())
                }
                None => Err("no try() argument could be evaluated".to_string()),
            }
        }
        Expression::FuncCall(func_call) => func_call
            .args
            .iter_mut()
            .try_for_each(|arg| resolve_fallbacks(arg, scope)),
        Expression::Array(array) => array
            .iter_mut()
            .try_for_each(|item| resolve_fallbacks(item, scope)),
        Expression::Object(object) => object
            .values_mut()
            .try_for_each(|item| resolve_fallbacks(item, scope)),
        Expression::Parenthesis(inner) => resolve_fallbacks(inner, scope),
        Expression::Conditional(cond) => {
            resolve_fallbacks(&mut cond.cond_expr, scope)?;
            resolve_fallbacks(&mut cond.true_expr, scope)?;
            resolve_fallbacks(&mut cond.false_expr, scope)
        }
        Expression::Operation(operation) => match operation.as_mut() {
            hcl::Operation::Binary(binop) => {
                resolve_fallbacks(&mut binop.lhs_expr, scope)?;
                resolve_fallbacks(&mut binop.rhs_expr, scope)
            }
            hcl::Operation::Unary(unop) => resolve_fallbacks(&mut unop.expr, scope),
        },
        Expression::ForExpr(forexpr) => {
            resolve_fallbacks(&mut forexpr.collection_expr, scope)?;
            if let Some(key_expr) = &mut forexpr.key_expr {
                resolve_fallbacks(key_expr, scope)?;
            }
            resolve_fallbacks(&mut forexpr.value_expr, scope)?;
            if let Some(cond_expr) = &mut forexpr.cond_expr {
                resolve_fallbacks(cond_expr, scope)?;
            }
            Ok(())
        }
        Expression::Traversal(traversal) => {
            resolve_fallbacks(&mut traversal.expr, scope)?;
            traversal.operators.iter_mut().try_for_each(|operator| {
                if let hcl::TraversalOperator::Index(index) = operator {
                    resolve_fallbacks(index, scope)
                } else {
                    Ok(())
                }
            })
        }
        _ => Ok(()),
    }
}

fn eval_error(attribute: &Attribute, reason: String) -> EvalError {
    EvalError {
        attribute: attribute.key.value().to_string(),
        expression: attribute.value.to_string().trim().to_string(),
        reason,
    }
}

/// A known-namespace expression failed to resolve against the context
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to evaluate `{expression}` of attribute \"{attribute}\": {reason}")]
pub struct EvalError {
    pub attribute: String,
    pub expression: String,
    pub reason: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context() -> EvalContext {
        let mut globals = hcl::value::Map::new();
        globals.insert("some_string".to_string(), hcl::Value::from("string"));
        globals.insert("some_number".to_string(), hcl::Value::from(777));
        globals.insert("some_bool".to_string(), hcl::Value::from(true));

        let mut obj = hcl::value::Map::new();
        obj.insert("field_a".to_string(), hcl::Value::from("a"));
        globals.insert("obj".to_string(), hcl::Value::Object(obj));

        EvalContext::new(
            globals,
            StackMeta::new("/stacks/stack".to_string(), "stack".to_string()),
        )
    }

    fn eval(input: &str) -> Result<Body, EvalError> {
        let mut body = hcl_edit::parser::parse_body(input).expect("body must parse");
        partial_eval(&mut body, &context())?;
        Ok(body)
    }

    fn attribute_text(body: &Body, key: &str) -> String {
        let attribute = body
            .attributes()
            .find(|attribute| attribute.key.value().as_str() == key)
            .expect("attribute must exist");

        attribute.value.to_string().trim().to_string()
    }

    #[test]
    fn evaluates_known_roots() {
        let body = eval(
            "bool = global.some_bool\nnumber = global.some_number\nstring = global.some_string",
        )
        .expect("must evaluate");

        assert_eq!(attribute_text(&body, "bool"), "true");
        assert_eq!(attribute_text(&body, "number"), "777");
        assert_eq!(attribute_text(&body, "string"), "\"string\"");
    }

    #[test]
    fn evaluates_metadata() {
        let body = eval("path = strata.path\nname = strata.name").expect("must evaluate");

        assert_eq!(attribute_text(&body, "path"), "\"/stacks/stack\"");
        assert_eq!(attribute_text(&body, "name"), "\"stack\"");
    }

    #[test]
    fn evaluates_compound_values_with_sorted_keys() {
        let body = eval(
            "obj = {\n  string = global.some_string\n  number = global.some_number\n  bool = global.some_bool\n}",
        )
        .expect("must evaluate");

        assert_eq!(
            attribute_text(&body, "obj"),
            "{ bool = true, number = 777, string = \"string\" }"
        );
    }

    #[test]
    fn evaluates_string_templates() {
        let body = eval(r#"greeting = "hello ${strata.name}""#).expect("must evaluate");
        assert_eq!(attribute_text(&body, "greeting"), "\"hello stack\"");
    }

    #[test]
    fn preserves_unknown_roots_byte_for_byte() {
        let input = "value = {\n    port  = local.port\n  }";
        let body = eval(input).expect("must evaluate");

        assert_eq!(
            attribute_text(&body, "value"),
            "{\n    port  = local.port\n  }"
        );
    }

    #[test]
    fn preserves_expressions_mixing_known_and_unknown_roots() {
        let body =
            eval("value = [global.some_string, local.other]").expect("must evaluate");
        assert_eq!(
            attribute_text(&body, "value"),
            "[global.some_string, local.other]"
        );
    }

    #[test]
    fn preserves_calls_to_downstream_functions() {
        let body = eval("value = upper(global.some_string)").expect("must evaluate");
        assert_eq!(attribute_text(&body, "value"), "upper(global.some_string)");
    }

    #[test]
    fn try_picks_the_first_resolvable_argument() {
        let body = eval("value = try(global.obj.field_a, null)").expect("must evaluate");
        assert_eq!(attribute_text(&body, "value"), "\"a\"");
    }

    #[test]
    fn try_falls_back_on_missing_fields() {
        let body = eval("value = try(global.obj.field_d, null)").expect("must evaluate");
        assert_eq!(attribute_text(&body, "value"), "null");
    }

    #[test]
    fn try_catches_failures_of_nested_try_calls() {
        let body =
            eval(r#"value = try(try(global.obj.field_d), "fallback")"#).expect("must evaluate");
        assert_eq!(attribute_text(&body, "value"), "\"fallback\"");
    }

    #[test]
    fn try_with_no_resolvable_argument_fails() {
        let error = eval("value = try(global.obj.field_d)").expect_err("must fail");
        assert_eq!(error.attribute, "value");
        assert!(error.reason.contains("try"));
    }

    #[test]
    fn undefined_global_fails() {
        let error = eval("required_version = global.undefined").expect_err("must fail");

        assert_eq!(error.attribute, "required_version");
        assert_eq!(error.expression, "global.undefined");
    }

    #[test]
    fn undefined_metadata_fails() {
        let error = eval("much_wrong = strata.undefined").expect_err("must fail");
        assert_eq!(error.attribute, "much_wrong");
    }

    #[test]
    fn recurses_into_nested_blocks() {
        let body = eval(
            "outer \"label\" {\n  inner {\n    number = global.some_number\n    keep = local.thing\n  }\n}",
        )
        .expect("must evaluate");

        let outer = body.blocks().next().expect("outer block");
        assert_eq!(outer.ident.value().as_str(), "outer");
        assert_eq!(outer.labels[0].as_str(), "label");

        let inner = outer.body.blocks().next().expect("inner block");
        assert_eq!(attribute_text(&inner.body, "number"), "777");
        assert_eq!(attribute_text(&inner.body, "keep"), "local.thing");
    }

    #[test]
    fn literals_are_reencoded_canonically() {
        let body = eval("num = 666\nstr = \"hi\"").expect("must evaluate");
        assert_eq!(attribute_text(&body, "num"), "666");
        assert_eq!(attribute_text(&body, "str"), "\"hi\"");
    }
}
