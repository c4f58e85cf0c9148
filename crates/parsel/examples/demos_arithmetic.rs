//! A four-operator arithmetic grammar (`+ - * /` with parentheses and the
//! usual precedence), demonstrating forward references between mutually
//! dependent nonterminals. Run with:
//!
//! ```text
//! cargo run --example demos_arithmetic
//! ```

use parsel::{Grammar, Token, TokenCode, TokenStream, Var, VecTokenStream};

const NUM: TokenCode = 1;
const PLUS: TokenCode = 2;
const MINUS: TokenCode = 3;
const STAR: TokenCode = 4;
const SLASH: TokenCode = 5;
const LPAREN: TokenCode = 6;
const RPAREN: TokenCode = 7;

fn lex(s: &str) -> VecTokenStream {
    let mut tokens = Vec::new();
    let mut chars = s.chars().peekable();
    let mut col = 1u32;
    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' => {
                let mut num = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        num.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::new(NUM, num, 1, col));
                continue;
            }
            '+' => tokens.push(Token::new(PLUS, "+", 1, col)),
            '-' => tokens.push(Token::new(MINUS, "-", 1, col)),
            '*' => tokens.push(Token::new(STAR, "*", 1, col)),
            '/' => tokens.push(Token::new(SLASH, "/", 1, col)),
            '(' => tokens.push(Token::new(LPAREN, "(", 1, col)),
            ')' => tokens.push(Token::new(RPAREN, ")", 1, col)),
            other if other.is_whitespace() => {}
            other => panic!("unexpected character '{other}'"),
        }
        chars.next();
        col += 1;
    }
    VecTokenStream::new(tokens)
}

fn eval(expr: &str) -> i32 {
    let g = Grammar::new();

    // Handles are created up front so `factor` can reference `expr` before
    // `expr` itself is defined -- the recursive-descent equivalent of a
    // forward declaration.
    let expr_nt = g.nonterminal::<(), i32>("expr");
    let term = g.nonterminal::<(), i32>("term");
    let factor = g.nonterminal::<(), i32>("factor");

    // factor = NUM | '(' expr ')'
    let factor_out: Var<i32> = Var::new(0);
    let factor_body = g.token_with(NUM, &factor_out)
        | (g.token(LPAREN) & expr_nt.with_output(&factor_out).into_expr() & g.token(RPAREN));
    factor
        .with_output(&factor_out)
        .define(factor_body)
        .expect("factor is defined exactly once with consistent cells");

    // term = factor (('*' | '/') factor)*
    let term_out: Var<i32> = Var::new(0);
    let term_rhs: Var<i32> = Var::new(0);
    let first_factor = factor.with_output(&term_out).into_expr();
    let mul_step = g.token(STAR) & factor.with_output(&term_rhs).into_expr() & g.action({
        let term_out = term_out.clone();
        let term_rhs = term_rhs.clone();
        move || {
            term_out.set(term_out.get() * term_rhs.get());
            true
        }
    });
    let div_step = g.token(SLASH) & factor.with_output(&term_rhs).into_expr() & g.action({
        let term_out = term_out.clone();
        let term_rhs = term_rhs.clone();
        move || {
            term_out.set(term_out.get() / term_rhs.get());
            true
        }
    });
    term.with_output(&term_out)
        .define(first_factor & (mul_step | div_step).star())
        .expect("term is defined exactly once with consistent cells");

    // expr = term (('+' | '-') term)*
    let expr_out: Var<i32> = Var::new(0);
    let expr_rhs: Var<i32> = Var::new(0);
    let first_term = term.with_output(&expr_out).into_expr();
    let add_step = g.token(PLUS) & term.with_output(&expr_rhs).into_expr() & g.action({
        let expr_out = expr_out.clone();
        let expr_rhs = expr_rhs.clone();
        move || {
            expr_out.set(expr_out.get() + expr_rhs.get());
            true
        }
    });
    let sub_step = g.token(MINUS) & term.with_output(&expr_rhs).into_expr() & g.action({
        let expr_out = expr_out.clone();
        let expr_rhs = expr_rhs.clone();
        move || {
            expr_out.set(expr_out.get() - expr_rhs.get());
            true
        }
    });
    expr_nt
        .with_output(&expr_out)
        .define(first_term & (add_step | sub_step).star())
        .expect("expr is defined exactly once with consistent cells");

    let result: Var<i32> = Var::new(0);
    let start = expr_nt.with_output(&result).into_expr();
    let tokens = lex(expr);
    let mut pos = 0;
    let matched = start.parse(&tokens, &mut pos).expect("fuel is not exhausted");
    assert!(matched && !tokens.has(pos), "malformed expression: {expr}");
    result.get()
}

fn main() {
    env_logger::init();
    for expr in ["4+3*2", "(7-2)/5", "2*(3+4)-1", "10/2/5", "1+2+3+4+5"] {
        println!("{expr:>14} = {}", eval(expr));
    }
}
