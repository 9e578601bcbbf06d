//! Generic unparsing of syntax trees back into dialect source text.
//!
//! The translator falls back to this rendering whenever no mapping applies, and
//! log messages use it to show the offending node.

use super::{
    Arg, Arguments, BinaryOperator, BooleanOperator, Comprehension, Constant, Keyword, Node,
    NodeKind, UnaryOperator,
};
use std::fmt;

const SHIFTWIDTH: &str = "    ";

impl Node {
    /// Renders the node as host-language source.
    ///
    /// Statements render as one or more lines (joined by `\n`), expressions as
    /// a single line.
    pub fn unparse(&self) -> String {
        if self.is_statement() {
            let mut printer = Printer::default();
            printer.statement(self);
            printer.lines.join("\n")
        } else {
            expression(self)
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::None => f.write_str("None"),
            Constant::Bool(true) => f.write_str("True"),
            Constant::Bool(false) => f.write_str("False"),
            Constant::Int(value) => write!(f, "{value}"),
            Constant::Float(value) => f.write_str(&python_float(*value)),
            Constant::Str(text) => f.write_str(&python_string(text)),
            Constant::Ellipsis => f.write_str("..."),
        }
    }
}

/// Quotes a string the way the host language's `repr` does.
pub fn python_string(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(quote);
    for character in text.chars() {
        match character {
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c == quote => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(quote);
    quoted
}

/// Quotes a string as a Julia string literal, escaping interpolation.
pub fn julia_string(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for character in text.chars() {
        match character {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '$' => quoted.push_str("\\$"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn python_float(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}inf")
    } else if value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

// Binding strength, loosest first.
const TUPLE: u8 = 0;
const NAMED: u8 = 1;
const LAMBDA: u8 = 2;
const TERNARY: u8 = 3;
const OR: u8 = 4;
const AND: u8 = 5;
const NOT: u8 = 6;
const COMPARE: u8 = 7;
const BIT_OR: u8 = 8;
const BIT_XOR: u8 = 9;
const BIT_AND: u8 = 10;
const SHIFT: u8 = 11;
const ARITH: u8 = 12;
const TERM: u8 = 13;
const FACTOR: u8 = 14;
const POWER: u8 = 15;
const AWAIT: u8 = 16;
const ATOM: u8 = 17;

fn binary_precedence(op: BinaryOperator) -> u8 {
    match op {
        BinaryOperator::Add | BinaryOperator::Sub => ARITH,
        BinaryOperator::Mult
        | BinaryOperator::MatMult
        | BinaryOperator::Div
        | BinaryOperator::Mod
        | BinaryOperator::FloorDiv => TERM,
        BinaryOperator::Pow => POWER,
        BinaryOperator::LShift | BinaryOperator::RShift => SHIFT,
        BinaryOperator::BitOr => BIT_OR,
        BinaryOperator::BitXor => BIT_XOR,
        BinaryOperator::BitAnd => BIT_AND,
    }
}

fn precedence(node: &Node) -> u8 {
    match &node.kind {
        NodeKind::NamedExpr { .. } => NAMED,
        NodeKind::Lambda { .. } => LAMBDA,
        NodeKind::IfExp { .. } => TERNARY,
        NodeKind::BoolOp {
            op: BooleanOperator::Or,
            ..
        } => OR,
        NodeKind::BoolOp {
            op: BooleanOperator::And,
            ..
        } => AND,
        NodeKind::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => NOT,
        NodeKind::UnaryOp { .. } => FACTOR,
        NodeKind::Compare { .. } => COMPARE,
        NodeKind::BinOp { op, .. } => binary_precedence(*op),
        NodeKind::Await { .. } => AWAIT,
        NodeKind::Tuple { elts } if elts.is_empty() => ATOM,
        NodeKind::Starred { .. } => TUPLE,
        _ => ATOM,
    }
}

/// Renders `node`, parenthesized when it binds looser than `minimum`.
fn operand(node: &Node, minimum: u8) -> String {
    let text = expression(node);
    if precedence(node) < minimum {
        format!("({text})")
    } else {
        text
    }
}

fn joined(nodes: &[Node]) -> String {
    nodes.iter().map(expression).collect::<Vec<_>>().join(", ")
}

fn expression(node: &Node) -> String {
    match &node.kind {
        NodeKind::BoolOp { op, values } => {
            let own = precedence(node);
            values
                .iter()
                .map(|value| operand(value, own + 1))
                .collect::<Vec<_>>()
                .join(&format!(" {} ", op.symbol()))
        }
        NodeKind::NamedExpr { target, value } => {
            format!("({} := {})", expression(target), operand(value, TERNARY))
        }
        NodeKind::BinOp { left, op, right } => {
            let own = binary_precedence(*op);
            let (left_minimum, right_minimum) = if *op == BinaryOperator::Pow {
                (own + 1, own)
            } else {
                (own, own + 1)
            };
            format!(
                "{} {} {}",
                operand(left, left_minimum),
                op.symbol(),
                operand(right, right_minimum)
            )
        }
        NodeKind::UnaryOp { op, operand: inner } => match op {
            UnaryOperator::Not => format!("not {}", operand(inner, NOT)),
            _ => format!("{}{}", op.symbol(), operand(inner, FACTOR)),
        },
        NodeKind::Lambda { args, body } => {
            let parameters = parameters(args);
            if parameters.is_empty() {
                format!("lambda: {}", operand(body, TERNARY))
            } else {
                format!("lambda {parameters}: {}", operand(body, TERNARY))
            }
        }
        NodeKind::IfExp { test, body, orelse } => format!(
            "{} if {} else {}",
            operand(body, OR),
            operand(test, OR),
            operand(orelse, TERNARY)
        ),
        NodeKind::Dict { keys, values } => {
            let entries: Vec<String> = keys
                .iter()
                .zip(values)
                .map(|(key, value)| match key {
                    Some(key) => format!("{}: {}", expression(key), expression(value)),
                    None => format!("**{}", operand(value, BIT_OR)),
                })
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        NodeKind::Set { elts } if elts.is_empty() => "set()".to_string(),
        NodeKind::Set { elts } => format!("{{{}}}", joined(elts)),
        NodeKind::ListComp { elt, generators } => {
            format!("[{}{}]", expression(elt), comprehensions(generators))
        }
        NodeKind::SetComp { elt, generators } => {
            format!("{{{}{}}}", expression(elt), comprehensions(generators))
        }
        NodeKind::DictComp {
            key,
            value,
            generators,
        } => format!(
            "{{{}: {}{}}}",
            expression(key),
            expression(value),
            comprehensions(generators)
        ),
        NodeKind::GeneratorExp { elt, generators } => {
            format!("({}{})", expression(elt), comprehensions(generators))
        }
        NodeKind::Await { value } => format!("await {}", operand(value, ATOM)),
        NodeKind::Yield { value: None } => "(yield)".to_string(),
        NodeKind::Yield { value: Some(value) } => format!("(yield {})", expression(value)),
        NodeKind::YieldFrom { value } => format!("(yield from {})", expression(value)),
        NodeKind::Compare {
            left,
            ops,
            comparators,
        } => {
            let mut text = operand(left, COMPARE + 1);
            for (op, comparator) in ops.iter().zip(comparators) {
                text.push_str(&format!(" {} {}", op.symbol(), operand(comparator, COMPARE + 1)));
            }
            text
        }
        NodeKind::Call {
            func,
            args,
            keywords,
        } => {
            let mut arguments: Vec<String> = args.iter().map(expression).collect();
            arguments.extend(keywords.iter().map(keyword));
            format!("{}({})", operand(func, ATOM), arguments.join(", "))
        }
        NodeKind::FormattedValue { .. } => format!("f'{}'", fstring_part(node)),
        NodeKind::JoinedStr { values } => {
            let parts: String = values.iter().map(fstring_part).collect();
            format!("f'{parts}'")
        }
        NodeKind::Constant { value } => value.to_string(),
        NodeKind::Attribute { value, attr } => format!("{}.{attr}", operand(value, ATOM)),
        NodeKind::Subscript { value, slice } => {
            let index = match &slice.kind {
                NodeKind::Tuple { elts } if !elts.is_empty() => joined(elts),
                _ => expression(slice),
            };
            format!("{}[{index}]", operand(value, ATOM))
        }
        NodeKind::Starred { value } => format!("*{}", operand(value, BIT_OR)),
        NodeKind::Name { id } => id.clone(),
        NodeKind::List { elts } => format!("[{}]", joined(elts)),
        NodeKind::Tuple { elts } if elts.len() == 1 => format!("({},)", expression(&elts[0])),
        NodeKind::Tuple { elts } => format!("({})", joined(elts)),
        NodeKind::Slice { lower, upper, step } => {
            let part = |bound: &Option<Box<Node>>| bound.as_deref().map(expression).unwrap_or_default();
            match step {
                Some(step) => format!("{}:{}:{}", part(lower), part(upper), expression(step)),
                None => format!("{}:{}", part(lower), part(upper)),
            }
        }
        NodeKind::TypeVar {
            name,
            bound: Some(bound),
        } => format!("{name}: {}", expression(bound)),
        NodeKind::TypeVar { name, bound: None } => name.clone(),
        NodeKind::ParamSpec { name } => format!("**{name}"),
        NodeKind::TypeVarTuple { name } => format!("*{name}"),
        _ => {
            let mut printer = Printer::default();
            printer.statement(node);
            printer.lines.join("\n")
        }
    }
}

fn keyword(keyword: &Keyword) -> String {
    match &keyword.arg {
        Some(name) => format!("{name}={}", expression(&keyword.value)),
        None => format!("**{}", expression(&keyword.value)),
    }
}

fn comprehensions(generators: &[Comprehension]) -> String {
    let mut text = String::new();
    for generator in generators {
        let prefix = if generator.is_async { " async for " } else { " for " };
        text.push_str(prefix);
        text.push_str(&expression(&generator.target));
        text.push_str(" in ");
        text.push_str(&operand(&generator.iter, OR));
        for condition in &generator.ifs {
            text.push_str(" if ");
            text.push_str(&operand(condition, OR));
        }
    }
    text
}

fn fstring_part(node: &Node) -> String {
    match &node.kind {
        NodeKind::Constant {
            value: Constant::Str(text),
        } => text
            .replace('{', "{{")
            .replace('}', "}}")
            .replace('\'', "\\'"),
        NodeKind::FormattedValue {
            value,
            conversion,
            format_spec,
        } => {
            let mut text = format!("{{{}", expression(value));
            if let Some(conversion) = conversion {
                text.push('!');
                text.push(*conversion);
            }
            if let Some(NodeKind::JoinedStr { values }) = format_spec.as_deref().map(|spec| &spec.kind) {
                text.push(':');
                text.extend(values.iter().map(fstring_part));
            }
            text.push('}');
            text
        }
        _ => format!("{{{}}}", expression(node)),
    }
}

fn parameter(arg: &Arg) -> String {
    match &arg.annotation {
        Some(annotation) => format!("{}: {}", arg.name, expression(annotation)),
        None => arg.name.clone(),
    }
}

fn parameters(arguments: &Arguments) -> String {
    let mut rendered = Vec::new();
    let positional: Vec<&Arg> = arguments.posonlyargs.iter().chain(&arguments.args).collect();
    let first_default = positional.len().saturating_sub(arguments.defaults.len());
    for (index, arg) in positional.iter().enumerate() {
        let mut text = parameter(arg);
        if index >= first_default {
            text.push('=');
            text.push_str(&expression(&arguments.defaults[index - first_default]));
        }
        rendered.push(text);
        if index + 1 == arguments.posonlyargs.len() {
            rendered.push("/".to_string());
        }
    }
    match &arguments.vararg {
        Some(vararg) => rendered.push(format!("*{}", parameter(vararg))),
        None if !arguments.kwonlyargs.is_empty() => rendered.push("*".to_string()),
        None => {}
    }
    for (index, arg) in arguments.kwonlyargs.iter().enumerate() {
        let mut text = parameter(arg);
        if let Some(Some(default)) = arguments.kw_defaults.get(index) {
            text.push('=');
            text.push_str(&expression(default));
        }
        rendered.push(text);
    }
    if let Some(kwarg) = &arguments.kwarg {
        rendered.push(format!("**{}", parameter(kwarg)));
    }
    rendered.join(", ")
}

fn type_parameters(type_params: &[Node]) -> String {
    if type_params.is_empty() {
        String::new()
    } else {
        format!("[{}]", joined(type_params))
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

#[derive(Default)]
struct Printer {
    lines: Vec<String>,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", SHIFTWIDTH.repeat(self.depth), text.as_ref()));
    }

    fn block(&mut self, statements: &[Node]) {
        self.depth += 1;
        if statements.is_empty() {
            self.line("pass");
        }
        for statement in statements {
            self.statement(statement);
        }
        self.depth -= 1;
    }

    fn else_block(&mut self, orelse: &[Node]) {
        if !orelse.is_empty() {
            self.line("else:");
            self.block(orelse);
        }
    }

    fn statement(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Module { body } => {
                for statement in body {
                    self.statement(statement);
                }
            }
            NodeKind::FunctionDef {
                name,
                args,
                body,
                decorators,
                returns,
                type_params,
                is_async,
            } => {
                for decorator in decorators {
                    self.line(format!("@{}", expression(decorator)));
                }
                let prefix = if *is_async { "async def" } else { "def" };
                let returns = returns
                    .as_deref()
                    .map(|annotation| format!(" -> {}", expression(annotation)))
                    .unwrap_or_default();
                self.line(format!(
                    "{prefix} {name}{}({}){returns}:",
                    type_parameters(type_params),
                    parameters(args)
                ));
                self.block(body);
            }
            NodeKind::ClassDef {
                name,
                bases,
                keywords,
                body,
                decorators,
                type_params,
            } => {
                for decorator in decorators {
                    self.line(format!("@{}", expression(decorator)));
                }
                let mut arguments: Vec<String> = bases.iter().map(expression).collect();
                arguments.extend(keywords.iter().map(keyword));
                let arguments = if arguments.is_empty() {
                    String::new()
                } else {
                    format!("({})", arguments.join(", "))
                };
                self.line(format!("class {name}{}{arguments}:", type_parameters(type_params)));
                self.block(body);
            }
            NodeKind::Return { value: None } => self.line("return"),
            NodeKind::Return { value: Some(value) } => {
                self.line(format!("return {}", expression(value)))
            }
            NodeKind::Delete { targets } => self.line(format!("del {}", joined(targets))),
            NodeKind::Assign { targets, value } => {
                let mut text = String::new();
                for target in targets {
                    text.push_str(&expression(target));
                    text.push_str(" = ");
                }
                text.push_str(&expression(value));
                self.line(text);
            }
            NodeKind::TypeAlias {
                name,
                type_params,
                value,
            } => self.line(format!(
                "type {}{} = {}",
                expression(name),
                type_parameters(type_params),
                expression(value)
            )),
            NodeKind::AugAssign { target, op, value } => self.line(format!(
                "{} {}= {}",
                expression(target),
                op.symbol(),
                expression(value)
            )),
            NodeKind::AnnAssign {
                target,
                annotation,
                value,
            } => {
                let value = value
                    .as_deref()
                    .map(|value| format!(" = {}", expression(value)))
                    .unwrap_or_default();
                self.line(format!(
                    "{}: {}{value}",
                    expression(target),
                    expression(annotation)
                ));
            }
            NodeKind::For {
                target,
                iter,
                body,
                orelse,
                is_async,
            } => {
                let prefix = if *is_async { "async for" } else { "for" };
                self.line(format!(
                    "{prefix} {} in {}:",
                    expression(target),
                    expression(iter)
                ));
                self.block(body);
                self.else_block(orelse);
            }
            NodeKind::While { test, body, orelse } => {
                self.line(format!("while {}:", expression(test)));
                self.block(body);
                self.else_block(orelse);
            }
            NodeKind::If { test, body, orelse } => {
                self.line(format!("if {}:", expression(test)));
                self.block(body);
                self.elif_chain(orelse);
            }
            NodeKind::With {
                items,
                body,
                is_async,
            } => {
                let items: Vec<String> = items
                    .iter()
                    .map(|item| match &item.optional_vars {
                        Some(vars) => {
                            format!("{} as {}", expression(&item.context_expr), expression(vars))
                        }
                        None => expression(&item.context_expr),
                    })
                    .collect();
                let prefix = if *is_async { "async with" } else { "with" };
                self.line(format!("{prefix} {}:", items.join(", ")));
                self.block(body);
            }
            NodeKind::Match { subject, cases } => {
                self.line(format!("match {}:", expression(subject)));
                self.depth += 1;
                for case in cases {
                    let guard = case
                        .guard
                        .as_ref()
                        .map(|guard| format!(" if {}", expression(guard)))
                        .unwrap_or_default();
                    self.line(format!("case {}{guard}:", expression(&case.pattern)));
                    self.block(&case.body);
                }
                self.depth -= 1;
            }
            NodeKind::Raise { exc, cause } => {
                let mut text = "raise".to_string();
                if let Some(exc) = exc {
                    text.push(' ');
                    text.push_str(&expression(exc));
                }
                if let Some(cause) = cause {
                    text.push_str(" from ");
                    text.push_str(&expression(cause));
                }
                self.line(text);
            }
            NodeKind::Try {
                body,
                handlers,
                orelse,
                finalbody,
                is_star,
            } => {
                self.line("try:");
                self.block(body);
                for handler in handlers {
                    self.handler(handler, *is_star);
                }
                self.else_block(orelse);
                if !finalbody.is_empty() {
                    self.line("finally:");
                    self.block(finalbody);
                }
            }
            NodeKind::ExceptHandler { .. } => self.handler(node, false),
            NodeKind::Assert { test, msg } => match msg {
                Some(msg) => self.line(format!("assert {}, {}", expression(test), expression(msg))),
                None => self.line(format!("assert {}", expression(test))),
            },
            NodeKind::Import { names } => {
                let names: Vec<String> = names.iter().map(alias).collect();
                self.line(format!("import {}", names.join(", ")));
            }
            NodeKind::ImportFrom {
                module,
                names,
                level,
            } => {
                let names: Vec<String> = names.iter().map(alias).collect();
                self.line(format!(
                    "from {}{} import {}",
                    ".".repeat(*level as usize),
                    module.as_deref().unwrap_or_default(),
                    names.join(", ")
                ));
            }
            NodeKind::Global { names } => self.line(format!("global {}", names.join(", "))),
            NodeKind::Nonlocal { names } => self.line(format!("nonlocal {}", names.join(", "))),
            NodeKind::Expr { value } => self.line(expression(value)),
            NodeKind::Pass => self.line("pass"),
            NodeKind::Break => self.line("break"),
            NodeKind::Continue => self.line("continue"),
            _ => self.line(expression(node)),
        }
    }

    fn elif_chain(&mut self, orelse: &[Node]) {
        match orelse {
            [] => {}
            [Node {
                kind: NodeKind::If { test, body, orelse },
                ..
            }] => {
                self.line(format!("elif {}:", expression(test)));
                self.block(body);
                self.elif_chain(orelse);
            }
            _ => {
                self.line("else:");
                self.block(orelse);
            }
        }
    }

    fn handler(&mut self, node: &Node, is_star: bool) {
        let NodeKind::ExceptHandler {
            exception,
            name,
            body,
        } = &node.kind
        else {
            return self.statement(node);
        };
        let mut text = if is_star { "except*" } else { "except" }.to_string();
        if let Some(exception) = exception {
            text.push(' ');
            text.push_str(&expression(exception));
        }
        if let Some(name) = name {
            text.push_str(" as ");
            text.push_str(name);
        }
        text.push(':');
        self.line(text);
        self.block(body);
    }
}

fn alias(alias: &super::Alias) -> String {
    match &alias.asname {
        Some(asname) => format!("{} as {asname}", alias.name),
        None => alias.name.clone(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
