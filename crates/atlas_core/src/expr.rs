//! Symbolic coordinate expressions.
//!
//! Embedding coordinate functions are written in terms of chart coordinates,
//! e.g. `sin(u)*cos(v)`. A string is parsed into an [`Expr`] tree, compiled
//! against a chart's coordinate symbols into stack-machine [`Bytecode`], and
//! evaluated by [`Vm`] over any [`Scalar`] (plain `f64` or [`Dual`] for
//! derivatives).
//!
//! [`Dual`]: crate::autodiff::Dual

use crate::error::{GeometryError, Result};
use crate::traits::Scalar;
use std::collections::HashMap;
use std::fmt;

/// OpCodes for the Stack-based Virtual Machine.
/// The VM operates on a stack of `Scalar` values (f64 or Dual).
#[derive(Debug, Clone, Copy)]
pub enum OpCode {
    /// Pushes a constant `f64` value onto the stack.
    LoadConst(f64),
    /// Pushes the value of a chart coordinate (by index) onto the stack.
    /// Indices correspond to the order coordinates were declared in the chart.
    LoadCoord(usize),
    /// Pops top two values (b, a), pushes (a + b).
    Add,
    /// Pops top two values (b, a), pushes (a - b).
    Sub,
    /// Pops top two values (b, a), pushes (a * b).
    Mul,
    /// Pops top two values (b, a), pushes (a / b).
    Div,
    /// Pops top two values (b, a), pushes (a ^ b).
    Pow,
    /// Pops top value (a), pushes -a.
    Neg,
    Sin,
    Cos,
    Tan,
    Exp,
    Ln,
    Sqrt,
    Sinh,
    Cosh,
    Tanh,
}

/// Represents a compiled sequence of operations.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub ops: Vec<OpCode>,
}

/// Stack-based Virtual Machine for evaluating coordinate expressions.
///
/// The VM is stateless; `eval` takes all necessary context:
/// - `bytecode`: Instructions to run.
/// - `coords`: Chart coordinate values (read-only).
/// - `stack`: A mutable buffer for intermediate computations.
///
/// Returns the result of the evaluation (the value left on the stack).
pub struct Vm;

impl Vm {
    /// Executes the bytecode.
    ///
    /// # Type Parameters
    /// * `T`: The scalar type (e.g., `f64` or `Dual`).
    pub fn eval<T: Scalar>(bytecode: &Bytecode, coords: &[T], stack: &mut Vec<T>) -> T {
        stack.clear();

        for op in &bytecode.ops {
            match op {
                OpCode::LoadConst(val) => {
                    stack.push(T::from_f64(*val).unwrap());
                }
                OpCode::LoadCoord(idx) => {
                    stack.push(coords[*idx]);
                }
                OpCode::Add => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a + b);
                }
                OpCode::Sub => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a - b);
                }
                OpCode::Mul => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a * b);
                }
                OpCode::Div => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a / b);
                }
                OpCode::Pow => {
                    let b = stack.pop().unwrap();
                    let a = stack.pop().unwrap();
                    stack.push(a.powf(b));
                }
                OpCode::Neg => {
                    let a = stack.pop().unwrap();
                    stack.push(-a);
                }
                OpCode::Sin => {
                    let a = stack.pop().unwrap();
                    stack.push(a.sin());
                }
                OpCode::Cos => {
                    let a = stack.pop().unwrap();
                    stack.push(a.cos());
                }
                OpCode::Tan => {
                    let a = stack.pop().unwrap();
                    stack.push(a.tan());
                }
                OpCode::Exp => {
                    let a = stack.pop().unwrap();
                    stack.push(a.exp());
                }
                OpCode::Ln => {
                    let a = stack.pop().unwrap();
                    stack.push(a.ln());
                }
                OpCode::Sqrt => {
                    let a = stack.pop().unwrap();
                    stack.push(a.sqrt());
                }
                OpCode::Sinh => {
                    let a = stack.pop().unwrap();
                    stack.push(a.sinh());
                }
                OpCode::Cosh => {
                    let a = stack.pop().unwrap();
                    stack.push(a.cosh());
                }
                OpCode::Tanh => {
                    let a = stack.pop().unwrap();
                    stack.push(a.tanh());
                }
            }
        }

        // The result is the last item on the stack. Default to 0.0 if empty (shouldn't happen in valid code).
        stack.pop().unwrap_or_else(|| T::from_f64(0.0).unwrap())
    }
}

// --- AST ---

/// Abstract Syntax Tree nodes for coordinate expressions.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Symbol(String),
    Binary(Box<Expr>, char, Box<Expr>), // char is operator +, -, *, /, ^
    Unary(char, Box<Expr>),             // -
    Call(String, Box<Expr>),            // functions like sin(x)
}

impl Expr {
    fn precedence(&self) -> u8 {
        match self {
            Expr::Binary(_, '+', _) | Expr::Binary(_, '-', _) => 1,
            Expr::Binary(_, '*', _) | Expr::Binary(_, '/', _) => 2,
            Expr::Binary(_, '^', _) => 3,
            Expr::Unary(_, _) => 2,
            _ => 4,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Symbol(s) => write!(f, "{}", s),
            Expr::Unary(_, inner) => {
                if inner.precedence() < 2 {
                    write!(f, "-({})", inner)
                } else {
                    write!(f, "-{}", inner)
                }
            }
            Expr::Binary(left, op, right) => {
                let prec = self.precedence();
                if left.precedence() < prec {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }
                write!(f, "{}", op)?;
                let wrap = right.precedence() < prec
                    || (right.precedence() == prec && matches!(op, '-' | '/' | '^'));
                if wrap {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
            Expr::Call(name, arg) => write!(f, "{}({})", name, arg),
        }
    }
}

/// A coordinate expression given either as a pre-built AST or as a string
/// still to be parsed. Embedding constructors accept both.
#[derive(Debug, Clone)]
pub enum ExprSource {
    Text(String),
    Ast(Expr),
}

impl ExprSource {
    pub fn into_expr(self) -> Result<Expr> {
        match self {
            ExprSource::Text(text) => parse(&text),
            ExprSource::Ast(expr) => Ok(expr),
        }
    }
}

impl From<&str> for ExprSource {
    fn from(text: &str) -> Self {
        ExprSource::Text(text.to_string())
    }
}

impl From<String> for ExprSource {
    fn from(text: String) -> Self {
        ExprSource::Text(text)
    }
}

impl From<Expr> for ExprSource {
    fn from(expr: Expr) -> Self {
        ExprSource::Ast(expr)
    }
}

// --- Compiler ---

/// Compiles an AST (`Expr`) into `Bytecode`.
/// Resolves symbol names to chart coordinate indices.
pub struct Compiler {
    coord_map: HashMap<String, usize>,
}

impl Compiler {
    pub fn new(coord_symbols: &[String]) -> Self {
        let mut coord_map = HashMap::new();
        for (i, name) in coord_symbols.iter().enumerate() {
            coord_map.insert(name.clone(), i);
        }
        Self { coord_map }
    }

    pub fn compile(&self, expr: &Expr) -> Result<Bytecode> {
        let mut ops = Vec::new();
        self.compile_recursive(expr, &mut ops)?;
        Ok(Bytecode { ops })
    }

    fn compile_recursive(&self, expr: &Expr, ops: &mut Vec<OpCode>) -> Result<()> {
        match expr {
            Expr::Number(n) => ops.push(OpCode::LoadConst(*n)),
            Expr::Symbol(name) => match self.coord_map.get(name) {
                Some(&idx) => ops.push(OpCode::LoadCoord(idx)),
                None => return Err(GeometryError::UnknownSymbol(name.clone())),
            },
            Expr::Binary(left, op, right) => {
                self.compile_recursive(left, ops)?;
                self.compile_recursive(right, ops)?;
                match op {
                    '+' => ops.push(OpCode::Add),
                    '-' => ops.push(OpCode::Sub),
                    '*' => ops.push(OpCode::Mul),
                    '/' => ops.push(OpCode::Div),
                    '^' => ops.push(OpCode::Pow),
                    _ => {
                        return Err(GeometryError::Parse {
                            input: expr.to_string(),
                            reason: format!("unknown binary operator '{}'", op),
                        })
                    }
                }
            }
            Expr::Unary(_, operand) => {
                self.compile_recursive(operand, ops)?;
                ops.push(OpCode::Neg);
            }
            Expr::Call(func, arg) => {
                self.compile_recursive(arg, ops)?;
                match func.as_str() {
                    "sin" => ops.push(OpCode::Sin),
                    "cos" => ops.push(OpCode::Cos),
                    "tan" => ops.push(OpCode::Tan),
                    "exp" => ops.push(OpCode::Exp),
                    "ln" | "log" => ops.push(OpCode::Ln),
                    "sqrt" => ops.push(OpCode::Sqrt),
                    "sinh" => ops.push(OpCode::Sinh),
                    "cosh" => ops.push(OpCode::Cosh),
                    "tanh" => ops.push(OpCode::Tanh),
                    _ => return Err(GeometryError::UnknownFunction(func.clone())),
                }
            }
        }
        Ok(())
    }
}

// --- Parser ---

/// Parses a string expression into an AST.
pub fn parse(input: &str) -> Result<Expr> {
    let wrap = |reason: String| GeometryError::Parse {
        input: input.to_string(),
        reason,
    };
    let tokens = tokenize(input).map_err(wrap)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expression().map_err(wrap)?;
    if parser.pos != parser.tokens.len() {
        return Err(wrap("unexpected trailing input".to_string()));
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c.is_ascii_digit() || c == '.' {
            let mut num_str = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_ascii_digit() || d == '.' {
                    num_str.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            let value: f64 = num_str
                .parse()
                .map_err(|_| format!("invalid number literal '{}'", num_str))?;
            tokens.push(Token::Number(value));
        } else if c.is_alphabetic() || c == '_' {
            let mut ident = String::new();
            while let Some(&d) = chars.peek() {
                if d.is_alphanumeric() || d == '_' {
                    ident.push(d);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token::Identifier(ident));
        } else {
            match c {
                '+' => tokens.push(Token::Plus),
                '-' => tokens.push(Token::Minus),
                '*' => tokens.push(Token::Star),
                '/' => tokens.push(Token::Slash),
                '^' => tokens.push(Token::Caret),
                '(' => tokens.push(Token::LParen),
                ')' => tokens.push(Token::RParen),
                _ => return Err(format!("unexpected character '{}'", c)),
            }
            chars.next();
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn consume(&mut self) -> Option<Token> {
        if self.pos < self.tokens.len() {
            let t = self.tokens[self.pos].clone();
            self.pos += 1;
            Some(t)
        } else {
            None
        }
    }

    fn parse_expression(&mut self) -> std::result::Result<Expr, String> {
        self.parse_term()
    }

    fn parse_term(&mut self) -> std::result::Result<Expr, String> {
        let mut left = self.parse_factor()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Plus => {
                    self.consume();
                    let right = self.parse_factor()?;
                    left = Expr::Binary(Box::new(left), '+', Box::new(right));
                }
                Token::Minus => {
                    self.consume();
                    let right = self.parse_factor()?;
                    left = Expr::Binary(Box::new(left), '-', Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> std::result::Result<Expr, String> {
        let mut left = self.parse_power()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Star => {
                    self.consume();
                    let right = self.parse_power()?;
                    left = Expr::Binary(Box::new(left), '*', Box::new(right));
                }
                Token::Slash => {
                    self.consume();
                    let right = self.parse_power()?;
                    left = Expr::Binary(Box::new(left), '/', Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_power(&mut self) -> std::result::Result<Expr, String> {
        let mut left = self.parse_unary()?;

        while let Some(token) = self.peek() {
            match token {
                Token::Caret => {
                    self.consume();
                    let right = self.parse_unary()?;
                    left = Expr::Binary(Box::new(left), '^', Box::new(right));
                }
                _ => break,
            }
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> std::result::Result<Expr, String> {
        if let Some(Token::Minus) = self.peek() {
            self.consume();
            let expr = self.parse_unary()?;
            return Ok(Expr::Unary('-', Box::new(expr)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> std::result::Result<Expr, String> {
        match self.consume() {
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Identifier(name)) => {
                if let Some(Token::LParen) = self.peek() {
                    self.consume(); // eat '('
                    let arg = self.parse_expression()?;
                    if let Some(Token::RParen) = self.consume() {
                        Ok(Expr::Call(name, Box::new(arg)))
                    } else {
                        Err("expected ')'".to_string())
                    }
                } else {
                    Ok(Expr::Symbol(name))
                }
            }
            Some(Token::LParen) => {
                let expr = self.parse_expression()?;
                if let Some(Token::RParen) = self.consume() {
                    Ok(expr)
                } else {
                    Err("expected ')'".to_string())
                }
            }
            _ => Err("unexpected end of input".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, Compiler, Expr, ExprSource, Vm};
    use crate::autodiff::Dual;
    use crate::error::GeometryError;

    fn symbols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn eval_f64(input: &str, names: &[&str], coords: &[f64]) -> f64 {
        let expr = parse(input).expect("expression should parse");
        let compiler = Compiler::new(&symbols(names));
        let code = compiler.compile(&expr).expect("expression should compile");
        let mut stack = Vec::new();
        Vm::eval(&code, coords, &mut stack)
    }

    #[test]
    fn parses_and_prints_embedding_expression() {
        let expr = parse("sin(u)*cos(v)").expect("should parse");
        assert_eq!(expr.to_string(), "sin(u)*cos(v)");
    }

    #[test]
    fn display_inserts_parentheses_by_precedence() {
        let expr = parse("(2+cos(u))*cos(v)").expect("should parse");
        assert_eq!(expr.to_string(), "(2+cos(u))*cos(v)");

        let expr = parse("u - (v - 1)").expect("should parse");
        assert_eq!(expr.to_string(), "u-(v-1)");

        let expr = parse("-(u + v)").expect("should parse");
        assert_eq!(expr.to_string(), "-(u+v)");
    }

    #[test]
    fn parse_display_round_trips() {
        for input in [
            "sin(u)*cos(v)",
            "sinh(r)*sin(ph)",
            "t*cos(t)",
            "u^2/(1+v)",
            "exp(-u)*ln(v)",
        ] {
            let expr = parse(input).expect("should parse");
            let reparsed = parse(&expr.to_string()).expect("printed form should parse");
            assert_eq!(expr, reparsed);
        }
    }

    #[test]
    fn evaluates_sphere_coordinate_function() {
        let u = std::f64::consts::FRAC_PI_3;
        let v = std::f64::consts::FRAC_PI_6;
        let value = eval_f64("sin(u)*cos(v)", &["u", "v"], &[u, v]);
        assert!((value - u.sin() * v.cos()).abs() < 1e-12);
    }

    #[test]
    fn evaluates_powers_and_unary_minus() {
        let value = eval_f64("-u^2 + 3*u - 1", &["u"], &[2.0]);
        // -u^2 parses as (-u)^2 with the engine's unary binding.
        assert!((value - (4.0 + 6.0 - 1.0)).abs() < 1e-12);

        let value = eval_f64("sqrt(u)/2", &["u"], &[9.0]);
        assert!((value - 1.5).abs() < 1e-12);
    }

    #[test]
    fn evaluates_over_dual_numbers() {
        let expr = parse("sin(u)*cos(v)").expect("should parse");
        let compiler = Compiler::new(&symbols(&["u", "v"]));
        let code = compiler.compile(&expr).expect("should compile");

        let u = 0.7;
        let v = 0.3;
        let mut stack = Vec::new();
        let d = Vm::eval(
            &code,
            &[Dual::variable(u), Dual::constant(v)],
            &mut stack,
        );
        assert!((d.val - u.sin() * v.cos()).abs() < 1e-12);
        assert!((d.eps - u.cos() * v.cos()).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_symbol() {
        let expr = parse("sin(w)").expect("should parse");
        let compiler = Compiler::new(&symbols(&["u", "v"]));
        let err = compiler.compile(&expr).expect_err("expected error");
        assert!(matches!(err, GeometryError::UnknownSymbol(ref s) if s == "w"));
    }

    #[test]
    fn rejects_unknown_function() {
        let expr = parse("gamma(u)").expect("should parse");
        let compiler = Compiler::new(&symbols(&["u"]));
        let err = compiler.compile(&expr).expect_err("expected error");
        assert!(matches!(err, GeometryError::UnknownFunction(ref s) if s == "gamma"));
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse("sin(u").is_err());
        assert!(parse("u +").is_err());
        assert!(parse("u v").is_err());
        assert!(parse("u $ v").is_err());
        assert!(parse("1.2.3").is_err());
    }

    #[test]
    fn expr_source_accepts_strings_and_asts() {
        let from_text: ExprSource = "cos(t)".into();
        let parsed = from_text.into_expr().expect("should parse");
        assert_eq!(parsed.to_string(), "cos(t)");

        let from_ast: ExprSource = parsed.clone().into();
        assert_eq!(from_ast.into_expr().expect("already built"), parsed);
    }
}
